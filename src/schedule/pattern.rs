use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::frequency::Frequency;
use crate::errors::ForecastError;

/// Hard ceiling on forward scans over a series, so infinite patterns always
/// terminate. Exhausting the cap is a "no answer", never an error.
pub const MAX_SCAN_OCCURRENCES: u32 = 10_000;

/// Termination policy tag, the shape collaborators store alongside the
/// optional pattern fields (see [`RecurrencePattern::from_parts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationPolicy {
    OneTime,
    Infinite,
    UntilDate,
    NOccurrences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    OneTime,
    Infinite {
        frequency: Frequency,
    },
    UntilDate {
        frequency: Frequency,
        end_date: NaiveDate,
    },
    NOccurrences {
        frequency: Frequency,
        max_occurrences: u32,
    },
}

/// An immutable recurrence description: a start date plus a termination
/// policy. Editing a series replaces its pattern wholesale; patterns are
/// never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    start_date: NaiveDate,
    kind: PatternKind,
}

impl RecurrencePattern {
    pub fn one_time(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            kind: PatternKind::OneTime,
        }
    }

    pub fn infinite(start_date: NaiveDate, frequency: Frequency) -> Self {
        Self {
            start_date,
            kind: PatternKind::Infinite { frequency },
        }
    }

    pub fn until_date(
        start_date: NaiveDate,
        frequency: Frequency,
        end_date: NaiveDate,
    ) -> Result<Self, ForecastError> {
        if end_date < start_date {
            return Err(ForecastError::InvalidPattern(format!(
                "end date {end_date} precedes start date {start_date}"
            )));
        }
        Ok(Self {
            start_date,
            kind: PatternKind::UntilDate {
                frequency,
                end_date,
            },
        })
    }

    pub fn until_n_occurrences(
        start_date: NaiveDate,
        frequency: Frequency,
        max_occurrences: u32,
    ) -> Result<Self, ForecastError> {
        if max_occurrences == 0 {
            return Err(ForecastError::InvalidPattern(
                "occurrence count must be positive".into(),
            ));
        }
        Ok(Self {
            start_date,
            kind: PatternKind::NOccurrences {
                frequency,
                max_occurrences,
            },
        })
    }

    /// Builds a pattern from the loosely-typed shape collaborators persist: a
    /// policy tag plus optional fields. Enforces the field/policy pairing in
    /// both directions, so no inconsistent pattern can exist.
    pub fn from_parts(
        start_date: NaiveDate,
        policy: TerminationPolicy,
        frequency: Option<Frequency>,
        end_date: Option<NaiveDate>,
        max_occurrences: Option<u32>,
    ) -> Result<Self, ForecastError> {
        if end_date.is_some() && policy != TerminationPolicy::UntilDate {
            return Err(ForecastError::InvalidPattern(
                "end date is only valid with the until-date policy".into(),
            ));
        }
        if max_occurrences.is_some() && policy != TerminationPolicy::NOccurrences {
            return Err(ForecastError::InvalidPattern(
                "occurrence count is only valid with the n-occurrences policy".into(),
            ));
        }
        match policy {
            TerminationPolicy::OneTime => {
                if frequency.is_some() {
                    return Err(ForecastError::InvalidPattern(
                        "one-time pattern must not carry a frequency".into(),
                    ));
                }
                Ok(Self::one_time(start_date))
            }
            TerminationPolicy::Infinite => {
                Ok(Self::infinite(start_date, require_frequency(frequency)?))
            }
            TerminationPolicy::UntilDate => {
                let end = end_date.ok_or_else(|| {
                    ForecastError::InvalidPattern("until-date pattern requires an end date".into())
                })?;
                Self::until_date(start_date, require_frequency(frequency)?, end)
            }
            TerminationPolicy::NOccurrences => {
                let max = max_occurrences.ok_or_else(|| {
                    ForecastError::InvalidPattern(
                        "n-occurrences pattern requires an occurrence count".into(),
                    )
                })?;
                Self::until_n_occurrences(start_date, require_frequency(frequency)?, max)
            }
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn policy(&self) -> TerminationPolicy {
        match self.kind {
            PatternKind::OneTime => TerminationPolicy::OneTime,
            PatternKind::Infinite { .. } => TerminationPolicy::Infinite,
            PatternKind::UntilDate { .. } => TerminationPolicy::UntilDate,
            PatternKind::NOccurrences { .. } => TerminationPolicy::NOccurrences,
        }
    }

    pub fn frequency(&self) -> Option<&Frequency> {
        match &self.kind {
            PatternKind::OneTime => None,
            PatternKind::Infinite { frequency }
            | PatternKind::UntilDate { frequency, .. }
            | PatternKind::NOccurrences { frequency, .. } => Some(frequency),
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match &self.kind {
            PatternKind::UntilDate { end_date, .. } => Some(*end_date),
            _ => None,
        }
    }

    pub fn max_occurrences(&self) -> Option<u32> {
        match &self.kind {
            PatternKind::NOccurrences {
                max_occurrences, ..
            } => Some(*max_occurrences),
            _ => None,
        }
    }

    /// Generates the raw date sequence from `start_date` up to `bound`
    /// inclusive, stopping early when the pattern's own termination policy
    /// ends the series. Pure: the same pattern and bound always yield the
    /// same sequence.
    pub fn occurrences_until(&self, bound: NaiveDate) -> Vec<NaiveDate> {
        let frequency = match &self.kind {
            PatternKind::OneTime => {
                return if self.start_date <= bound {
                    vec![self.start_date]
                } else {
                    Vec::new()
                };
            }
            PatternKind::Infinite { frequency }
            | PatternKind::UntilDate { frequency, .. }
            | PatternKind::NOccurrences { frequency, .. } => frequency,
        };

        let mut dates = Vec::new();
        let mut date = self.start_date;
        while date <= bound && self.allows(dates.len() as u32, date) {
            dates.push(date);
            if dates.len() as u32 >= MAX_SCAN_OCCURRENCES {
                break;
            }
            date = frequency.advance(date);
        }
        dates
    }

    /// Computes the date of occurrence `index` (0-based) directly, without
    /// materializing the prefix. `None` when the series ends before that
    /// index or the index is past [`MAX_SCAN_OCCURRENCES`].
    pub fn nth_occurrence(&self, index: u32) -> Option<NaiveDate> {
        if index >= MAX_SCAN_OCCURRENCES {
            return None;
        }
        let frequency = match &self.kind {
            PatternKind::OneTime => return (index == 0).then_some(self.start_date),
            PatternKind::Infinite { frequency }
            | PatternKind::UntilDate { frequency, .. }
            | PatternKind::NOccurrences { frequency, .. } => frequency,
        };
        if let PatternKind::NOccurrences {
            max_occurrences, ..
        } = &self.kind
        {
            if index >= *max_occurrences {
                return None;
            }
        }
        let mut date = self.start_date;
        for _ in 0..index {
            date = frequency.advance(date);
        }
        if let PatternKind::UntilDate { end_date, .. } = &self.kind {
            if date > *end_date {
                return None;
            }
        }
        Some(date)
    }

    /// `-1` for infinite series, `1` for one-time, the finite count
    /// otherwise.
    pub fn total_occurrences(&self) -> i64 {
        match &self.kind {
            PatternKind::OneTime => 1,
            PatternKind::Infinite { .. } => -1,
            PatternKind::NOccurrences {
                max_occurrences, ..
            } => *max_occurrences as i64,
            PatternKind::UntilDate {
                frequency,
                end_date,
            } => {
                let mut count = 0i64;
                let mut date = self.start_date;
                while date <= *end_date && count < MAX_SCAN_OCCURRENCES as i64 {
                    count += 1;
                    date = frequency.advance(date);
                }
                count
            }
        }
    }

    fn allows(&self, index: u32, candidate: NaiveDate) -> bool {
        match &self.kind {
            PatternKind::OneTime => index == 0,
            PatternKind::Infinite { .. } => true,
            PatternKind::UntilDate { end_date, .. } => candidate <= *end_date,
            PatternKind::NOccurrences {
                max_occurrences, ..
            } => index < *max_occurrences,
        }
    }
}

fn require_frequency(frequency: Option<Frequency>) -> Result<Frequency, ForecastError> {
    frequency.ok_or_else(|| {
        ForecastError::InvalidPattern("recurring pattern requires a frequency".into())
    })
}
