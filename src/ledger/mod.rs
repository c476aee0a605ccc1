//! Ledger-facing snapshot types and the running-balance projector.

pub mod projection;
pub mod series;

pub use projection::{project, AccountBalanceProjection, ProjectionTotals};
pub use series::{OperationKind, Series, Split, SplitSet};
