//! Counting accidents and injuries by state and by month.

use crate::errors::{self, BadInjuryCount, Result, UnresolvedMonth};
use crate::input::{RecordSet, Row};
use crate::months::{self, EVENT_DATE, EVENT_ID, MonthPolicy, Resolution};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const COUNTRY: &str = "Country";
pub const LOCATION: &str = "Location";
pub const FATAL: &str = "Total Fatal Injuries";
pub const SERIOUS: &str = "Total Serious Injuries";

/// Counts per key, remembering the order in which keys were first seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, u64)>,
    positions: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Tally {
        Tally::default()
    }

    fn slot(&mut self, key: &str) -> &mut u64 {
        let i = match self.positions.get(key) {
            Some(&i) => i,
            None => {
                self.entries.push((key.to_owned(), 0));
                self.positions.insert(key.to_owned(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    /// Add to the count and return the new count.
    /// On overflow, returns `None` and leaves the count unchanged.
    pub fn add(&mut self, key: &str, n: u64) -> Option<u64> {
        let slot = self.slot(key);
        *slot = slot.checked_add(n)?;
        Some(*slot)
    }

    /// Replace the count; a new key goes last, an existing key keeps its place.
    pub fn set(&mut self, key: &str, n: u64) {
        *self.slot(key) = n;
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.positions.get(key).map(|&i| self.entries[i].1)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), *n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, (_, n)| acc.saturating_add(*n))
    }

    /// The key with the largest count; the first one seen wins a tie.
    pub fn max(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (k, n) in self.iter() {
            match best {
                Some((_, b)) if b >= n => (),
                _ => best = Some((k, n)),
            }
        }
        best
    }

    /// The `k` largest counts in descending order; ties keep first-seen order.
    pub fn top(&self, k: usize) -> Vec<(&str, u64)> {
        self.iter()
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(k)
            .collect_vec()
    }

    pub fn to_vec(&self) -> Vec<(String, u64)> {
        self.entries.clone()
    }
}

/// State code of a location such as `"Dallas, TX"`.
///
/// This is the part after the first `", "`, up to the next one if any.
pub fn region_of(location: &str) -> Option<&str> {
    location.split(", ").nth(1)
}

/// Number of accidents per state, for records in `country`.
/// Records whose location has no state part are left out.
pub fn region_counts(set: &RecordSet, country: &str) -> Result<Tally> {
    set.require_fields(&[COUNTRY, LOCATION])?;
    let mut tally = Tally::new();
    for row in set.rows() {
        if row.get_or_empty(COUNTRY) != country {
            continue;
        }
        if let Some(region) = region_of(row.get_or_empty(LOCATION)) {
            tally.add(region, 1);
        }
    }
    debug!("{} regions in {country}", tally.len());
    Ok(tally)
}

/// How to combine injury totals of records that fall in the same month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InjuryPolicy {
    /// Add them up.
    #[default]
    Sum,
    /// Keep only the total of the last record seen for that month.
    Overwrite,
}

impl fmt::Display for InjuryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InjuryPolicy::Sum => write!(f, "sum"),
            InjuryPolicy::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Per-month result together with what happened to records along the way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonthTally {
    pub tally: Tally,
    /// Records left out because no month could be resolved.
    pub unresolved: usize,
    /// Records whose month came from the event id.
    pub fallbacks: usize,
}

fn month_key(row: &Row, policy: MonthPolicy, result: &mut MonthTally) -> Result<Option<String>> {
    let date = row.get_or_empty(EVENT_DATE);
    let id = row.get_or_empty(EVENT_ID);
    match months::resolve(date, id) {
        Resolution::Primary(k) => Ok(Some(k.to_string())),
        Resolution::Fallback(k) => {
            result.fallbacks += 1;
            Ok(Some(k.to_string()))
        }
        Resolution::Unresolved => match policy {
            MonthPolicy::Abort => Err(UnresolvedMonth {
                line: row.line(),
                date: date.to_owned(),
                id: id.to_owned(),
            }
            .into()),
            MonthPolicy::Skip => {
                debug!(
                    "line {}: no month in date '{date}' or id '{id}', skipped",
                    row.line()
                );
                result.unresolved += 1;
                Ok(None)
            }
        },
    }
}

/// Number of accidents per month.
pub fn month_counts(set: &RecordSet, policy: MonthPolicy) -> Result<MonthTally> {
    set.require_fields(&[EVENT_DATE, EVENT_ID])?;
    let mut result = MonthTally::default();
    for row in set.rows() {
        if let Some(key) = month_key(&row, policy, &mut result)? {
            result.tally.add(&key, 1);
        }
    }
    debug!(
        "{} months, {} from event ids, {} unresolved",
        result.tally.len(),
        result.fallbacks,
        result.unresolved
    );
    Ok(result)
}

/// Parse an injury count; an empty field counts as zero.
/// Anything else must be a non-negative integer.
pub fn parse_injuries(row: &Row, field: &str) -> Result<u64> {
    let value = row.get_or_empty(field);
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| {
        BadInjuryCount {
            line: row.line(),
            field: field.to_owned(),
            value: value.to_owned(),
        }
        .into()
    })
}

/// Fatal plus serious injuries of one record.
pub fn injuries(row: &Row) -> Result<u64> {
    parse_injuries(row, FATAL)?
        .checked_add(parse_injuries(row, SERIOUS)?)
        .ok_or_else(|| errors::invalid_input(format!("line {}: too many injuries", row.line())))
}

/// Number of fatal and serious injuries per month.
pub fn month_injuries(
    set: &RecordSet,
    injury_policy: InjuryPolicy,
    month_policy: MonthPolicy,
) -> Result<MonthTally> {
    set.require_fields(&[EVENT_DATE, EVENT_ID, FATAL, SERIOUS])?;
    let mut result = MonthTally::default();
    for row in set.rows() {
        let Some(key) = month_key(&row, month_policy, &mut result)? else {
            continue;
        };
        let n = injuries(&row)?;
        match injury_policy {
            InjuryPolicy::Sum => {
                if result.tally.add(&key, n).is_none() {
                    return Err(errors::invalid_input(format!(
                        "line {}: too many injuries in {key}",
                        row.line()
                    )));
                }
            }
            InjuryPolicy::Overwrite => result.tally.set(&key, n),
        }
    }
    debug!(
        "{} months, {} injuries ({})",
        result.tally.len(),
        result.tally.total(),
        injury_policy
    );
    Ok(result)
}
