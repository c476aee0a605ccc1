use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::overlay::{Modification, ModificationSet, OccurrenceMeta, OccurrenceState};
use super::pattern::MAX_SCAN_OCCURRENCES;
use crate::errors::ForecastError;
use crate::ledger::series::{OperationKind, Series, SplitSet};

/// Days ahead of the reference date within which a pending occurrence counts
/// as due soon.
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// How an occurrence sits relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    DueSoon,
    Upcoming,
}

impl DueStatus {
    pub fn classify(scheduled: NaiveDate, reference: NaiveDate) -> DueStatus {
        if scheduled < reference {
            return DueStatus::Overdue;
        }
        if scheduled <= reference + Duration::days(DUE_SOON_WINDOW_DAYS) {
            DueStatus::DueSoon
        } else {
            DueStatus::Upcoming
        }
    }
}

/// One effective occurrence after the overlay merge: pattern defaults with
/// any per-occurrence overrides applied. Recomputed per query, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOccurrence {
    pub series_id: Uuid,
    pub sequence_index: u32,
    pub original_date: NaiveDate,
    pub date: NaiveDate,
    pub state: OccurrenceState,
    pub kind: OperationKind,
    pub splits: SplitSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<OccurrenceMeta>,
}

impl ResolvedOccurrence {
    pub fn is_pending(&self) -> bool {
        self.state == OccurrenceState::Pending
    }

    pub fn is_rescheduled(&self) -> bool {
        self.date != self.original_date
    }

    pub fn due_status(&self, reference: NaiveDate) -> DueStatus {
        DueStatus::classify(self.date, reference)
    }
}

/// Merges a series' raw dates with its overlay into the pending view up to
/// `bound`: completed and skipped occurrences are dropped, PENDING overrides
/// are applied, and the result is ordered by effective date (a rescheduled
/// occurrence sorts at its new date) with ties broken by sequence index,
/// then series id.
pub fn resolve(
    series: &Series,
    modifications: &ModificationSet,
    bound: NaiveDate,
) -> Vec<ResolvedOccurrence> {
    let mut occurrences = merge_series(series, modifications, bound);
    occurrences.retain(ResolvedOccurrence::is_pending);
    sort_occurrences(&mut occurrences);
    occurrences
}

/// Same merge as [`resolve`], but terminal occurrences are retained with
/// their recorded state, for audit and history views.
pub fn resolve_history(
    series: &Series,
    modifications: &ModificationSet,
    bound: NaiveDate,
) -> Vec<ResolvedOccurrence> {
    let mut occurrences = merge_series(series, modifications, bound);
    sort_occurrences(&mut occurrences);
    occurrences
}

/// Pending view across several series, deterministically interleaved and
/// ready for balance projection.
pub fn resolve_many(
    series_list: &[Series],
    modifications: &ModificationSet,
    bound: NaiveDate,
) -> Vec<ResolvedOccurrence> {
    let mut occurrences = Vec::new();
    for series in series_list {
        let mut merged = merge_series(series, modifications, bound);
        merged.retain(ResolvedOccurrence::is_pending);
        occurrences.append(&mut merged);
    }
    sort_occurrences(&mut occurrences);
    occurrences
}

/// Resolves occurrence `index` of a series directly, for "record occurrence
/// #N" style actions that do not need the full list.
pub fn occurrence_at(
    series: &Series,
    modifications: &ModificationSet,
    index: u32,
) -> Result<ResolvedOccurrence, ForecastError> {
    let date = series
        .pattern
        .nth_occurrence(index)
        .ok_or(ForecastError::OccurrenceNotFound(index))?;
    Ok(resolve_one(
        series,
        index,
        date,
        modifications.get(series.id, date),
    ))
}

/// Finds the first effectively-PENDING occurrence of a series, scanning
/// indices from 0 and giving up at [`MAX_SCAN_OCCURRENCES`]. `None` means
/// the series terminated or the scan cap was exhausted; callers must treat
/// it as a final answer, not a transient failure.
pub fn find_next_pending(
    series: &Series,
    modifications: &ModificationSet,
) -> Option<ResolvedOccurrence> {
    for index in 0..MAX_SCAN_OCCURRENCES {
        let date = series.pattern.nth_occurrence(index)?;
        let resolved = resolve_one(series, index, date, modifications.get(series.id, date));
        if resolved.is_pending() {
            return Some(resolved);
        }
    }
    None
}

fn merge_series(
    series: &Series,
    modifications: &ModificationSet,
    bound: NaiveDate,
) -> Vec<ResolvedOccurrence> {
    let by_date: HashMap<NaiveDate, &Modification> = modifications
        .for_series(series.id)
        .into_iter()
        .map(|record| (record.original_date, record))
        .collect();

    series
        .pattern
        .occurrences_until(bound)
        .into_iter()
        .enumerate()
        .map(|(index, date)| resolve_one(series, index as u32, date, by_date.get(&date).copied()))
        .collect()
}

fn resolve_one(
    series: &Series,
    sequence_index: u32,
    original_date: NaiveDate,
    modification: Option<&Modification>,
) -> ResolvedOccurrence {
    match modification {
        Some(record) => ResolvedOccurrence {
            series_id: series.id,
            sequence_index,
            original_date,
            date: record.effective_date(),
            state: record.state,
            kind: series.kind,
            splits: record
                .override_splits
                .clone()
                .unwrap_or_else(|| series.splits.clone()),
            meta: record.override_meta.clone(),
        },
        None => ResolvedOccurrence {
            series_id: series.id,
            sequence_index,
            original_date,
            date: original_date,
            state: OccurrenceState::Pending,
            kind: series.kind,
            splits: series.splits.clone(),
            meta: None,
        },
    }
}

fn sort_occurrences(occurrences: &mut [ResolvedOccurrence]) {
    occurrences.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.sequence_index.cmp(&b.sequence_index))
            .then(a.series_id.cmp(&b.series_id))
    });
}
