//! Looking up records by value.
//!
//! There are three ways to find the records that carry a given value:
//!
//! - [membership_scan] looks at every field of every record,
//!   which is what one has to do without knowing which column holds the value.
//! - [field_scan] looks at one column of every record.
//! - [Index] pays for one pass over the records up front,
//!   after which each lookup is a single hash map access.
//!
//! All of them return the same records in input order.
//! [line_scan] works on the raw text instead and matches substrings,
//! so it may also find the header or partial values.

use crate::errors::{self, Result};
use crate::input::{RecordSet, Row};
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

/// Records where any field equals `value`.
pub fn membership_scan<'a>(set: &'a RecordSet, value: &str) -> Vec<Row<'a>> {
    set.rows()
        .filter(|row| row.values().iter().any(|v| v == value))
        .collect_vec()
}

/// Records where `field` equals `value`.
pub fn field_scan<'a>(set: &'a RecordSet, field: &str, value: &str) -> Result<Vec<Row<'a>>> {
    let i = set
        .field_position(field)
        .ok_or_else(|| errors::missing_field(field))?;
    Ok(set
        .rows()
        .filter(|row| row.values()[i] == value)
        .collect_vec())
}

/// Line numbers (from 1) of the raw lines of `text` that contain `needle`
/// anywhere, header included.
pub fn line_scan(text: &str, needle: &str) -> Vec<usize> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.contains(needle))
        .map(|(i, _)| i + 1)
        .collect_vec()
}

/// Map from field value to the positions of the records that carry it.
pub struct Index<'a> {
    set: &'a RecordSet,
    field: Option<String>,
    map: HashMap<&'a str, Vec<usize>>,
}

impl<'a> Index<'a> {
    /// Index the values of one column.
    pub fn build(set: &'a RecordSet, field: &str) -> Result<Index<'a>> {
        let i = set
            .field_position(field)
            .ok_or_else(|| errors::missing_field(field))?;
        let mut map: HashMap<&str, Vec<usize>> = HashMap::new();
        for (pos, row) in set.rows().enumerate() {
            map.entry(&row.values()[i]).or_default().push(pos);
        }
        debug!("index on '{field}': {} distinct values", map.len());
        Ok(Index {
            set,
            field: Some(field.to_owned()),
            map,
        })
    }

    /// Index the values of all columns.
    /// A record is listed once per distinct value it carries.
    pub fn build_any(set: &'a RecordSet) -> Index<'a> {
        let mut map: HashMap<&str, Vec<usize>> = HashMap::new();
        for (pos, row) in set.rows().enumerate() {
            for v in row.values().iter().unique() {
                map.entry(v).or_default().push(pos);
            }
        }
        debug!("index on all fields: {} distinct values", map.len());
        Index {
            set,
            field: None,
            map,
        }
    }

    /// The indexed column, or `None` for an index over all columns.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn lookup(&self, value: &str) -> Vec<Row<'a>> {
        match self.map.get(value) {
            None => vec![],
            Some(positions) => positions.iter().map(|&p| self.set.row(p)).collect_vec(),
        }
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
