use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ForecastError;

/// Average length of a calendar month in days. Only used for per-month rate
/// approximations, never for date arithmetic.
pub const AVERAGE_DAYS_PER_MONTH: f64 = 30.4368;

/// A compact repeat interval such as `"3d"`, `"2w"`, `"6mo"`, `"1y"` or any
/// combination (`"2w3d"`). At least one unit is non-zero.
///
/// Input accepts the components in any order; the canonical text order is
/// days, weeks, months, years, and that is also the serde representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency {
    pub days: u32,
    pub weeks: u32,
    pub months: u32,
    pub years: u32,
}

impl Frequency {
    pub fn new(days: u32, weeks: u32, months: u32, years: u32) -> Result<Self, ForecastError> {
        if days == 0 && weeks == 0 && months == 0 && years == 0 {
            return Err(ForecastError::FrequencyFormat(
                "at least one unit must be non-zero".into(),
            ));
        }
        Ok(Self {
            days,
            weeks,
            months,
            years,
        })
    }

    /// Parses frequency text. Each unit may appear at most once; the overall
    /// interval must be non-zero.
    pub fn parse(text: &str) -> Result<Self, ForecastError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ForecastError::FrequencyFormat("empty frequency".into()));
        }

        let mut days: Option<u32> = None;
        let mut weeks: Option<u32> = None;
        let mut months: Option<u32> = None;
        let mut years: Option<u32> = None;

        let mut chars = trimmed.chars().peekable();
        while let Some(&ch) = chars.peek() {
            if !ch.is_ascii_digit() {
                return Err(ForecastError::FrequencyFormat(format!(
                    "unexpected `{ch}` in `{trimmed}`"
                )));
            }
            let mut value: u32 = 0;
            while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or_else(|| {
                        ForecastError::FrequencyFormat(format!("count overflow in `{trimmed}`"))
                    })?;
                chars.next();
            }
            let slot = match chars.next() {
                Some('d') => &mut days,
                Some('w') => &mut weeks,
                Some('y') => &mut years,
                Some('m') => match chars.next() {
                    Some('o') => &mut months,
                    _ => {
                        return Err(ForecastError::FrequencyFormat(format!(
                            "months are written `mo` in `{trimmed}`"
                        )))
                    }
                },
                Some(other) => {
                    return Err(ForecastError::FrequencyFormat(format!(
                        "unknown unit `{other}` in `{trimmed}`"
                    )))
                }
                None => {
                    return Err(ForecastError::FrequencyFormat(format!(
                        "missing unit after count in `{trimmed}`"
                    )))
                }
            };
            if slot.is_some() {
                return Err(ForecastError::FrequencyFormat(format!(
                    "duplicate unit in `{trimmed}`"
                )));
            }
            *slot = Some(value);
        }

        Self::new(
            days.unwrap_or(0),
            weeks.unwrap_or(0),
            months.unwrap_or(0),
            years.unwrap_or(0),
        )
    }

    /// Advances `from` by one interval: years first, then months, then
    /// `weeks * 7 + days` as a day offset. The year and month steps clamp to
    /// the last valid day of the target month, so Jan 31 + 1mo lands on
    /// Feb 28/29. The order is fixed to keep mixed intervals unambiguous.
    pub fn advance(&self, from: NaiveDate) -> NaiveDate {
        let mut date = shift_years(from, self.years as i32);
        date = shift_months(date, self.months as i32);
        date + Duration::days((self.weeks as i64) * 7 + self.days as i64)
    }

    /// Average repetitions per calendar month, using the 30.4368-day month
    /// constant. An approximation, intended for "amount per month" style
    /// projections only.
    pub fn occurrences_per_month(&self) -> f64 {
        let interval_days = self.days as f64
            + self.weeks as f64 * 7.0
            + self.months as f64 * AVERAGE_DAYS_PER_MONTH
            + self.years as f64 * 12.0 * AVERAGE_DAYS_PER_MONTH;
        AVERAGE_DAYS_PER_MONTH / interval_days
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d", self.days)?;
        }
        if self.weeks > 0 {
            write!(f, "{}w", self.weeks)?;
        }
        if self.months > 0 {
            write!(f, "{}mo", self.months)?;
        }
        if self.years > 0 {
            write!(f, "{}y", self.years)?;
        }
        Ok(())
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Frequency {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> String {
        frequency.to_string()
    }
}

fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    if months == 0 {
        return date;
    }
    let total = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    if years == 0 {
        return date;
    }
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    (first_of_next - Duration::days(1)).day()
}
