//! Calendar month and year of an event.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const EVENT_DATE: &str = "Event Date";
pub const EVENT_ID: &str = "Event Id";

const MONTHS: [(&str, &str); 12] = [
    ("01", "January"),
    ("02", "February"),
    ("03", "March"),
    ("04", "April"),
    ("05", "May"),
    ("06", "June"),
    ("07", "July"),
    ("08", "August"),
    ("09", "September"),
    ("10", "October"),
    ("11", "November"),
    ("12", "December"),
];

/// Month name for a two-digit month code such as `"02"`.
pub fn month_name(code: &str) -> Option<&'static str> {
    MONTHS.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonthYear<'a> {
    pub month: &'static str,
    pub year: &'a str,
}

impl fmt::Display for MonthYear<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// Where the month came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// From the event date, `MM/DD/YYYY`.
    Primary(MonthYear<'a>),
    /// From the event id, `YYYYMMDD...`.
    Fallback(MonthYear<'a>),
    Unresolved,
}

impl<'a> Resolution<'a> {
    pub fn key(&self) -> Option<MonthYear<'a>> {
        match self {
            Resolution::Primary(k) | Resolution::Fallback(k) => Some(*k),
            Resolution::Unresolved => None,
        }
    }
}

/// What to do with a record whose month cannot be resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MonthPolicy {
    /// Leave the record out and count it.
    #[default]
    Skip,
    /// Fail the whole aggregation.
    Abort,
}

impl fmt::Display for MonthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MonthPolicy::Skip => write!(f, "skip"),
            MonthPolicy::Abort => write!(f, "abort"),
        }
    }
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

fn from_date(date: &str) -> Option<MonthYear<'_>> {
    if date.is_empty() {
        return None;
    }
    let month = month_name(date.get(0..2)?)?;
    let year = date.get(date.len().checked_sub(4)?..)?;
    is_year(year).then_some(MonthYear { month, year })
}

fn from_id(id: &str) -> Option<MonthYear<'_>> {
    let month = month_name(id.get(4..6)?)?;
    let year = id.get(0..4)?;
    is_year(year).then_some(MonthYear { month, year })
}

/// Resolve the month of an event from its date, falling back to its id.
///
/// Month and year always come from the same field.
pub fn resolve<'a>(date: &'a str, id: &'a str) -> Resolution<'a> {
    if let Some(k) = from_date(date) {
        Resolution::Primary(k)
    } else if let Some(k) = from_id(id) {
        Resolution::Fallback(k)
    } else {
        Resolution::Unresolved
    }
}
