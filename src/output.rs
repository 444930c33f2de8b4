//! Data structures for representing the output, and ways of writing it.

use crate::aggregate::InjuryPolicy;
use crate::errors::Result;
use crate::input::LoadStats;
use crate::months::MonthPolicy;
use itertools::Itertools;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub type Counts = Vec<(String, u64)>;

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Lookup {
    pub value: String,
    pub field: Option<String>,
    /// Input line numbers of the matching records.
    pub lines: Vec<usize>,
    /// Input line numbers where the value occurs anywhere in the raw text.
    pub text_lines: Vec<usize>,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Regions {
    pub country: String,
    pub counts: Counts,
    pub max: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct MonthTable {
    pub counts: Counts,
    pub top: Counts,
    pub unresolved: usize,
    pub fallbacks: usize,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Report {
    pub load: LoadStats,
    pub lookups: Vec<Lookup>,
    pub regions: Regions,
    pub accidents: MonthTable,
    pub injuries: MonthTable,
    pub injury_policy: InjuryPolicy,
    pub month_policy: MonthPolicy,
    pub top: usize,
}

pub fn counts_string(counts: &[(String, u64)]) -> String {
    counts.iter().map(|(k, n)| format!("{k}: {n}")).join(", ")
}

pub fn lines_string(lines: &[usize]) -> String {
    if lines.is_empty() {
        "no matches".to_owned()
    } else if lines.len() > 10 {
        format!(
            "{} matches, lines {}, ...",
            lines.len(),
            lines[..10].iter().join(", ")
        )
    } else {
        format!("lines {}", lines.iter().join(", "))
    }
}

/// Human-readable summary.
pub fn print_report(out: &mut impl Write, report: &Report) -> io::Result<()> {
    for lookup in &report.lookups {
        let place = match &lookup.field {
            None => "any field".to_owned(),
            Some(field) => format!("'{field}'"),
        };
        writeln!(
            out,
            "{} in {}: {}",
            lookup.value,
            place,
            lines_string(&lookup.lines)
        )?;
        writeln!(
            out,
            "{} anywhere in the text: {}",
            lookup.value,
            lines_string(&lookup.text_lines)
        )?;
    }
    writeln!(
        out,
        "accidents by state ({}): {}",
        report.regions.country,
        counts_string(&report.regions.counts)
    )?;
    writeln!(
        out,
        "most accidents: {}",
        report.regions.max.as_deref().unwrap_or("-")
    )?;
    writeln!(
        out,
        "worst {} months for accidents: {}",
        report.top,
        counts_string(&report.accidents.top)
    )?;
    writeln!(
        out,
        "worst {} months for injuries ({}): {}",
        report.top,
        report.injury_policy,
        counts_string(&report.injuries.top)
    )?;
    if report.accidents.unresolved > 0 {
        writeln!(
            out,
            "records without a month: {}",
            report.accidents.unresolved
        )?;
    }
    Ok(())
}

pub fn write_json(path: &Path, report: &Report, pretty: bool) -> Result<()> {
    let file = fs::File::create(path)?;
    let writer = io::BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(writer, report)?;
    } else {
        serde_json::to_writer(writer, report)?;
    }
    Ok(())
}

fn write_counts(
    sheet: &mut Worksheet,
    bold: &Format,
    key: &str,
    counts: &[(String, u64)],
) -> Result<()> {
    sheet.write_string_with_format(0, 0, key, bold)?;
    sheet.write_string_with_format(0, 1, "count", bold)?;
    for (i, (k, n)) in counts.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, k)?;
        sheet.write_number(row, 1, *n as f64)?;
    }
    Ok(())
}

/// One worksheet per table.
pub fn write_xlsx(path: &Path, report: &Report) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("states")?;
    write_counts(sheet, &bold, "state", &report.regions.counts)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("accidents")?;
    write_counts(sheet, &bold, "month", &report.accidents.counts)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("injuries")?;
    write_counts(sheet, &bold, "month", &report.injuries.counts)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("lookups")?;
    sheet.write_string_with_format(0, 0, "value", &bold)?;
    sheet.write_string_with_format(0, 1, "field", &bold)?;
    sheet.write_string_with_format(0, 2, "lines", &bold)?;
    sheet.write_string_with_format(0, 3, "text lines", &bold)?;
    for (i, lookup) in report.lookups.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &lookup.value)?;
        sheet.write_string(row, 1, lookup.field.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 2, lookup.lines.iter().join(" "))?;
        sheet.write_string(row, 3, lookup.text_lines.iter().join(" "))?;
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn counts(l: &[(&str, u64)]) -> Counts {
        l.iter().map(|&(k, n)| (k.to_owned(), n)).collect_vec()
    }

    fn report() -> Report {
        Report {
            load: LoadStats {
                records: 3,
                blank_lines: 0,
                padded: 1,
                truncated: 0,
            },
            lookups: vec![Lookup {
                value: "LAX94LA336".to_owned(),
                field: None,
                lines: vec![2],
                text_lines: vec![2, 4],
            }],
            regions: Regions {
                country: "United States".to_owned(),
                counts: counts(&[("CA", 2), ("TX", 1)]),
                max: Some("CA".to_owned()),
            },
            accidents: MonthTable {
                counts: counts(&[("January 1994", 2), ("February 1994", 1)]),
                top: counts(&[("January 1994", 2), ("February 1994", 1)]),
                unresolved: 0,
                fallbacks: 1,
            },
            injuries: MonthTable {
                counts: counts(&[("January 1994", 2), ("February 1994", 0)]),
                top: counts(&[("January 1994", 2), ("February 1994", 0)]),
                unresolved: 0,
                fallbacks: 1,
            },
            injury_policy: InjuryPolicy::Sum,
            month_policy: MonthPolicy::Skip,
            top: 3,
        }
    }

    #[test]
    fn counts_string_basic() {
        assert_eq!(counts_string(&[]), "");
        assert_eq!(counts_string(&counts(&[("CA", 2), ("TX", 1)])), "CA: 2, TX: 1");
    }

    #[test]
    fn lines_string_basic() {
        assert_eq!(lines_string(&[]), "no matches");
        assert_eq!(lines_string(&[2, 5]), "lines 2, 5");
        assert_eq!(
            lines_string(&(1..=12).collect_vec()),
            "12 matches, lines 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ..."
        );
    }

    #[test]
    fn print_report_basic() {
        let mut out = Vec::new();
        print_report(&mut out, &report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\
LAX94LA336 in any field: lines 2
LAX94LA336 anywhere in the text: lines 2, 4
accidents by state (United States): CA: 2, TX: 1
most accidents: CA
worst 3 months for accidents: January 1994: 2, February 1994: 1
worst 3 months for injuries (sum): January 1994: 2, February 1994: 0
"
        );
    }

    #[test]
    fn json_round_trip() {
        let r = report();
        let s = serde_json::to_string(&r).unwrap();
        let r2: Report = serde_json::from_str(&s).unwrap();
        assert_eq!(r, r2);
        assert!(s.contains("\"injury_policy\":\"sum\""));
    }
}
