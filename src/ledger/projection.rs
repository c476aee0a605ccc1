use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::series::OperationKind;
use crate::schedule::resolver::ResolvedOccurrence;

/// Running-balance delta for one account caused by one occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalanceProjection {
    pub account_id: Uuid,
    pub series_id: Uuid,
    pub sequence_index: u32,
    pub date: NaiveDate,
    pub previous_balance: f64,
    pub new_balance: f64,
}

/// Aggregate flow over a set of occurrences. Transfers move money between
/// tracked accounts and contribute nothing to either side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub occurrences: usize,
    pub projected_inflow: f64,
    pub projected_outflow: f64,
    pub net: f64,
}

impl ProjectionTotals {
    pub fn from_occurrences(occurrences: &[ResolvedOccurrence]) -> Self {
        let mut totals = ProjectionTotals {
            occurrences: occurrences.len(),
            ..ProjectionTotals::default()
        };
        for occurrence in occurrences {
            match occurrence.kind {
                OperationKind::Expense => {
                    totals.projected_outflow += occurrence.splits.origin_total();
                }
                OperationKind::Income => {
                    totals.projected_inflow += occurrence.splits.destination_total();
                }
                OperationKind::Transfer => {}
            }
        }
        totals.net = totals.projected_inflow - totals.projected_outflow;
        totals
    }
}

/// Walks occurrences in chronological order (effective date, then sequence
/// index, then series id) and emits a `(previous, new)` balance row per
/// touched account per occurrence. Transfers emit two rows. The opening
/// snapshot is never mutated; a cloned running map carries state forward.
///
/// An occurrence touching an account missing from the snapshot is logged
/// and omitted in full; it never aborts the rest of the projection. Empty
/// input yields empty output.
pub fn project(
    occurrences: &[ResolvedOccurrence],
    opening_balances: &HashMap<Uuid, f64>,
) -> Vec<AccountBalanceProjection> {
    let mut ordered: Vec<&ResolvedOccurrence> = occurrences.iter().collect();
    ordered.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.sequence_index.cmp(&b.sequence_index))
            .then(a.series_id.cmp(&b.series_id))
    });

    let mut running = opening_balances.clone();
    let mut rows = Vec::new();

    for occurrence in ordered {
        let legs = signed_legs(occurrence);
        if let Some((missing, _)) = legs
            .iter()
            .find(|(account_id, _)| !running.contains_key(account_id))
        {
            warn!(
                "occurrence {}#{} references unknown account {}; omitted from projection",
                occurrence.series_id, occurrence.sequence_index, missing
            );
            continue;
        }
        for (account_id, signed_amount) in legs {
            let previous = running[&account_id];
            let updated = previous + signed_amount;
            rows.push(AccountBalanceProjection {
                account_id,
                series_id: occurrence.series_id,
                sequence_index: occurrence.sequence_index,
                date: occurrence.date,
                previous_balance: previous,
                new_balance: updated,
            });
            running.insert(account_id, updated);
        }
    }

    rows
}

/// Signed amount per touched account: origin legs debit, destination legs
/// credit.
fn signed_legs(occurrence: &ResolvedOccurrence) -> Vec<(Uuid, f64)> {
    let mut legs = Vec::new();
    match occurrence.kind {
        OperationKind::Expense => {
            for split in &occurrence.splits.origin {
                legs.push((split.account_id, -split.amount));
            }
        }
        OperationKind::Income => {
            for split in &occurrence.splits.destination {
                legs.push((split.account_id, split.amount));
            }
        }
        OperationKind::Transfer => {
            for split in &occurrence.splits.origin {
                legs.push((split.account_id, -split.amount));
            }
            for split in &occurrence.splits.destination {
                legs.push((split.account_id, split.amount));
            }
        }
    }
    legs
}
