//! Recurrence scheduling: the compact frequency grammar, pattern occurrence
//! generation, the per-occurrence exception overlay, and resolution of the
//! two into effective occurrences.

pub mod frequency;
pub mod overlay;
pub mod pattern;
pub mod resolver;

pub use frequency::{Frequency, AVERAGE_DAYS_PER_MONTH};
pub use overlay::{
    Modification, ModificationPatch, ModificationSet, OccurrenceMeta, OccurrenceState,
};
pub use pattern::{PatternKind, RecurrencePattern, TerminationPolicy, MAX_SCAN_OCCURRENCES};
pub use resolver::{
    find_next_pending, occurrence_at, resolve, resolve_history, resolve_many, DueStatus,
    ResolvedOccurrence, DUE_SOON_WINDOW_DAYS,
};
