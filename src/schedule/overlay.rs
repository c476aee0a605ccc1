use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ForecastError;
use crate::ledger::series::SplitSet;

/// Lifecycle of a single occurrence. `Completed` and `Skipped` are terminal:
/// once recorded, an occurrence never changes state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OccurrenceState {
    #[default]
    Pending,
    Completed,
    Skipped,
}

impl OccurrenceState {
    pub fn is_terminal(self) -> bool {
        matches!(self, OccurrenceState::Completed | OccurrenceState::Skipped)
    }
}

/// Descriptive overrides attached to one occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A sparse exception record for one occurrence of one series, keyed by
/// `(series_id, original_date)`. Created lazily on the first edit and kept
/// forever, both as history and as an idempotency guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub series_id: Uuid,
    pub original_date: NaiveDate,
    #[serde(default)]
    pub state: OccurrenceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_splits: Option<SplitSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_meta: Option<OccurrenceMeta>,
}

impl Modification {
    fn pending(series_id: Uuid, original_date: NaiveDate) -> Self {
        Self {
            series_id,
            original_date,
            state: OccurrenceState::Pending,
            override_date: None,
            override_splits: None,
            override_meta: None,
        }
    }

    /// The date the occurrence effectively falls on, honoring a reschedule.
    pub fn effective_date(&self) -> NaiveDate {
        self.override_date.unwrap_or(self.original_date)
    }
}

/// Patch applied through [`ModificationSet::upsert`]. `None` fields leave
/// the stored record untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationPatch {
    pub override_date: Option<NaiveDate>,
    pub override_splits: Option<SplitSet>,
    pub override_meta: Option<OccurrenceMeta>,
}

impl ModificationPatch {
    pub fn reschedule(date: NaiveDate) -> Self {
        Self {
            override_date: Some(date),
            ..Self::default()
        }
    }
}

/// The overlay snapshot consulted during resolution. The engine mutates an
/// in-memory copy; persisting accepted records is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationSet {
    records: Vec<Modification>,
}

impl ModificationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Modification>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Modification] {
        &self.records
    }

    pub fn get(&self, series_id: Uuid, original_date: NaiveDate) -> Option<&Modification> {
        self.records
            .iter()
            .find(|m| m.series_id == series_id && m.original_date == original_date)
    }

    pub fn for_series(&self, series_id: Uuid) -> Vec<&Modification> {
        self.records
            .iter()
            .filter(|m| m.series_id == series_id)
            .collect()
    }

    /// Creates a PENDING record if none exists for the key, then merges the
    /// patch into it. Terminal records reject further edits.
    pub fn upsert(
        &mut self,
        series_id: Uuid,
        original_date: NaiveDate,
        patch: ModificationPatch,
    ) -> Result<&Modification, ForecastError> {
        let index = self.ensure_record(series_id, original_date);
        let record = &mut self.records[index];
        if record.state.is_terminal() {
            return Err(ForecastError::StateConflict {
                state: record.state,
            });
        }
        if let Some(date) = patch.override_date {
            record.override_date = Some(date);
        }
        if let Some(splits) = patch.override_splits {
            record.override_splits = Some(splits);
        }
        if let Some(meta) = patch.override_meta {
            record.override_meta = Some(meta);
        }
        Ok(&self.records[index])
    }

    /// Marks the occurrence COMPLETED. Completing an already-completed
    /// occurrence is a no-op; a skipped occurrence cannot be completed.
    pub fn mark_completed(
        &mut self,
        series_id: Uuid,
        original_date: NaiveDate,
    ) -> Result<(), ForecastError> {
        self.transition(series_id, original_date, OccurrenceState::Completed)
    }

    /// Marks the occurrence SKIPPED. Re-skipping is a no-op; a completed
    /// occurrence cannot be skipped.
    pub fn mark_skipped(
        &mut self,
        series_id: Uuid,
        original_date: NaiveDate,
    ) -> Result<(), ForecastError> {
        self.transition(series_id, original_date, OccurrenceState::Skipped)
    }

    fn transition(
        &mut self,
        series_id: Uuid,
        original_date: NaiveDate,
        target: OccurrenceState,
    ) -> Result<(), ForecastError> {
        let index = self.ensure_record(series_id, original_date);
        let record = &mut self.records[index];
        if record.state == target {
            return Ok(());
        }
        if record.state.is_terminal() {
            return Err(ForecastError::StateConflict {
                state: record.state,
            });
        }
        record.state = target;
        Ok(())
    }

    fn ensure_record(&mut self, series_id: Uuid, original_date: NaiveDate) -> usize {
        match self
            .records
            .iter()
            .position(|m| m.series_id == series_id && m.original_date == original_date)
        {
            Some(position) => position,
            None => {
                self.records.push(Modification::pending(series_id, original_date));
                self.records.len() - 1
            }
        }
    }
}
