#![doc(test(attr(deny(warnings))))]

//! Forecast Core provides recurring-transaction scheduling and multi-account
//! balance projection primitives for budgeting front ends: a compact frequency
//! grammar, lazy occurrence generation, a sparse per-occurrence exception
//! overlay, and chronological running-balance projection.

pub mod errors;
pub mod ledger;
pub mod schedule;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Forecast Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
