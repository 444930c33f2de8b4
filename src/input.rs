//! Reading delimited accident logs into memory.

use crate::errors::{self, Result};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One data line of the input, with fields in header order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Line number in the input file, starting from 1.
    pub line: usize,
    pub values: Vec<String>,
}

/// What happened while loading, for logging and reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoadStats {
    pub records: usize,
    pub blank_lines: usize,
    pub padded: usize,
    pub truncated: usize,
}

/// All records of one input file, in input order.
///
/// A record set is never modified after [parse] has built it;
/// indexes and aggregations only borrow it.
#[derive(Debug)]
pub struct RecordSet {
    header: Vec<String>,
    positions: HashMap<String, usize>,
    records: Vec<Record>,
    stats: LoadStats,
}

/// A read-only view of a record that knows the header.
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    set: &'a RecordSet,
    record: &'a Record,
}

impl<'a> Row<'a> {
    pub fn line(&self) -> usize {
        self.record.line
    }

    pub fn values(&self) -> &'a [String] {
        &self.record.values
    }

    /// Value of the named field, or `None` if the header has no such field.
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.set
            .field_position(field)
            .map(|i| self.record.values[i].as_str())
    }

    /// Value of the named field, treating an unknown field as empty.
    pub fn get_or_empty(&self, field: &str) -> &'a str {
        self.get(field).unwrap_or("")
    }

    pub fn join(&self, delimiter: char) -> String {
        self.record.values.join(&delimiter.to_string())
    }
}

impl RecordSet {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Position of the named field in the header.
    /// With duplicate header names, the first one wins.
    pub fn field_position(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.positions.contains_key(field)
    }

    /// Fails with [errors::MissingField] unless every field is in the header.
    pub fn require_fields(&self, fields: &[&str]) -> Result<()> {
        match fields.iter().find(|f| !self.has_field(f)) {
            None => Ok(()),
            Some(f) => Err(errors::missing_field(f)),
        }
    }

    pub fn row(&self, i: usize) -> Row<'_> {
        Row {
            set: self,
            record: &self.records[i],
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row { set: self, record })
    }
}

fn split_line(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .map(|x| x.trim().to_owned())
        .collect_vec()
}

/// Parse delimited text.
///
/// The first non-blank line is the header.
/// Rows with too few fields are padded with empty strings,
/// rows with too many fields are truncated.
pub fn parse(text: &str, delimiter: char) -> Result<RecordSet> {
    let mut lines = text.lines().enumerate();
    let mut stats = LoadStats::default();
    let header = loop {
        match lines.next() {
            None => return Err(errors::invalid_input_ref("no header line")),
            Some((_, line)) if line.trim().is_empty() => stats.blank_lines += 1,
            Some((_, line)) => break split_line(line, delimiter),
        }
    };
    let mut positions = HashMap::new();
    for (i, name) in header.iter().enumerate() {
        positions.entry(name.clone()).or_insert(i);
    }
    let width = header.len();
    let mut records = Vec::new();
    for (i, raw) in lines {
        let line = i + 1;
        if raw.trim().is_empty() {
            stats.blank_lines += 1;
            continue;
        }
        let mut values = split_line(raw, delimiter);
        if values.len() < width {
            debug!(target: "avstats", "line {line}: {} fields, padding to {width}", values.len());
            stats.padded += 1;
            values.resize(width, String::new());
        } else if values.len() > width {
            debug!(target: "avstats", "line {line}: {} fields, truncating to {width}", values.len());
            stats.truncated += 1;
            values.truncate(width);
        }
        records.push(Record { line, values });
    }
    stats.records = records.len();
    Ok(RecordSet {
        header,
        positions,
        records,
        stats,
    })
}

/// Read a whole file as text.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    info!(target: "avstats", "read: {}", path.display());
    Ok(fs::read_to_string(path)?)
}

/// Read and parse a whole file.
pub fn read(path: impl AsRef<Path>, delimiter: char) -> Result<RecordSet> {
    load(&read_text(path)?, delimiter)
}

/// Like [parse], and log what was loaded.
pub fn load(text: &str, delimiter: char) -> Result<RecordSet> {
    let set = parse(text, delimiter)?;
    let stats = set.stats();
    info!(target: "avstats", "records: {}", stats.records);
    info!(target: "avstats", "fields: {}", set.header().join(", "));
    if stats.padded > 0 || stats.truncated > 0 {
        info!(
            target: "avstats",
            "rows padded: {}, rows truncated: {}", stats.padded, stats.truncated
        );
    }
    if stats.blank_lines > 0 {
        debug!(target: "avstats", "blank lines skipped: {}", stats.blank_lines);
    }
    Ok(set)
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "\
Event Id | Event Date | Location | Country
20001218X45444 | 01/15/1994 | Los Angeles, CA | United States
20001218X45447 | | Houston, TX | United States
";

    #[test]
    fn parse_basic() {
        let set = parse(SAMPLE, '|').unwrap();
        assert_eq!(set.header(), ["Event Id", "Event Date", "Location", "Country"]);
        assert_eq!(set.len(), 2);
        let rows = set.rows().collect_vec();
        assert_eq!(rows[0].line(), 2);
        assert_eq!(rows[0].get("Event Date"), Some("01/15/1994"));
        assert_eq!(rows[1].get("Event Date"), Some(""));
        assert_eq!(rows[1].get("Location"), Some("Houston, TX"));
        assert_eq!(rows[1].get("Nope"), None);
        assert_eq!(rows[1].get_or_empty("Nope"), "");
        assert_eq!(set.stats().padded, 0);
        assert_eq!(set.stats().truncated, 0);
    }

    #[test]
    fn parse_pad_and_truncate() {
        let set = parse("a|b|c\n1|2\n1|2|3|4\n1|2|3\n", '|').unwrap();
        assert_eq!(set.row(0).values(), ["1", "2", ""]);
        assert_eq!(set.row(1).values(), ["1", "2", "3"]);
        assert_eq!(set.row(2).values(), ["1", "2", "3"]);
        assert_eq!(
            set.stats(),
            LoadStats {
                records: 3,
                blank_lines: 0,
                padded: 1,
                truncated: 1,
            }
        );
    }

    #[test]
    fn parse_blank_lines() {
        let set = parse("\n  \na b\n\nx y\r\n\n", ' ').unwrap();
        assert_eq!(set.header(), ["a", "b"]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.row(0).line(), 5);
        assert_eq!(set.row(0).values(), ["x", "y"]);
        assert_eq!(set.stats().blank_lines, 4);
    }

    #[test]
    fn parse_empty() {
        assert!(parse("", '|').is_err());
        assert!(parse("\n \n", '|').is_err());
        let set = parse("a|b\n", '|').unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn parse_duplicate_header() {
        let set = parse("a|a|b\n1|2|3\n", '|').unwrap();
        assert_eq!(set.field_position("a"), Some(0));
        assert_eq!(set.row(0).get("a"), Some("1"));
    }

    #[test]
    fn require_fields() {
        let set = parse(SAMPLE, '|').unwrap();
        assert!(set.require_fields(&["Country", "Location"]).is_ok());
        let e = set.require_fields(&["Country", "Total Fatal Injuries"]).unwrap_err();
        assert_eq!(
            e.to_string(),
            "missing field: 'Total Fatal Injuries' is not in the header"
        );
    }

    #[test]
    fn join_round_trip() {
        for line in SAMPLE.lines().skip(1) {
            let set = parse(&format!("{}\n{}\n", SAMPLE.lines().next().unwrap(), line), '|')
                .unwrap();
            let expected = line.split('|').map(str::trim).join("|");
            assert_eq!(set.row(0).join('|'), expected);
        }
    }
}
