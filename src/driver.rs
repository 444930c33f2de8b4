//! Main entry point for building the whole report.

use crate::aggregate::{self, InjuryPolicy, MonthTally};
use crate::errors::{self, Result};
use crate::index::{self, Index};
use crate::information;
use crate::input::{RecordSet, Row};
use crate::months::MonthPolicy;
use crate::output::{Lookup, MonthTable, Regions, Report};
use itertools::Itertools;
use log::{info, warn};

/// What to calculate?
pub struct ReportArgs<'a> {
    /// Values to look up.
    pub find: &'a [String],

    /// Restrict lookups to this column.
    /// If not specified, a value matches in any column.
    pub field: Option<&'a str>,

    /// Only accidents in this country are counted per state.
    pub country: &'a str,

    /// Length of the ranked lists.
    pub top: usize,

    pub injury_policy: InjuryPolicy,

    pub month_policy: MonthPolicy,
}

fn line_numbers(rows: &[Row]) -> Vec<usize> {
    rows.iter().map(|r| r.line()).collect_vec()
}

fn lookup(text: &str, set: &RecordSet, index: &Index, value: &str) -> Result<Lookup> {
    let scanned = match index.field() {
        None => index::membership_scan(set, value),
        Some(field) => index::field_scan(set, field, value)?,
    };
    let indexed = index.lookup(value);
    let scanned = line_numbers(&scanned);
    let indexed = line_numbers(&indexed);
    if scanned != indexed {
        return Err(errors::invalid_input(format!(
            "lookup of '{value}' disagrees: scan found lines {scanned:?}, index found lines {indexed:?}"
        )));
    }
    let text_lines = index::line_scan(text, value);
    info!(
        target: "avstats",
        "'{value}': {} matching records, {} matching lines of text",
        indexed.len(),
        text_lines.len()
    );
    Ok(Lookup {
        value: value.to_owned(),
        field: index.field().map(str::to_owned),
        lines: indexed,
        text_lines,
    })
}

fn month_table(result: MonthTally, top: usize) -> MonthTable {
    MonthTable {
        top: result
            .tally
            .top(top)
            .into_iter()
            .map(|(k, n)| (k.to_owned(), n))
            .collect_vec(),
        counts: result.tally.to_vec(),
        unresolved: result.unresolved,
        fallbacks: result.fallbacks,
    }
}

/// Calculate everything.
///
/// This is the main entry point for the library.
/// `set` should be parsed from `text`; the raw text is only searched for lookups.
pub fn run(args: &ReportArgs, text: &str, set: &RecordSet) -> Result<Report> {
    if args.top == 0 {
        return Err(errors::invalid_argument("top should be at least 1".to_owned()));
    }
    information::statistics(set);

    let index = match args.field {
        None => Index::build_any(set),
        Some(field) => Index::build(set, field)?,
    };
    let lookups = args
        .find
        .iter()
        .map(|value| lookup(text, set, &index, value))
        .collect::<Result<Vec<_>>>()?;

    let regions = aggregate::region_counts(set, args.country)?;
    let regions = Regions {
        country: args.country.to_owned(),
        max: regions.max().map(|(k, _)| k.to_owned()),
        counts: regions.to_vec(),
    };
    info!(
        target: "avstats",
        "states: {}, most accidents: {}",
        regions.counts.len(),
        regions.max.as_deref().unwrap_or("-")
    );

    let accidents = month_table(aggregate::month_counts(set, args.month_policy)?, args.top);
    let injuries = month_table(
        aggregate::month_injuries(set, args.injury_policy, args.month_policy)?,
        args.top,
    );
    info!(target: "avstats", "months: {}", accidents.counts.len());
    if accidents.unresolved > 0 {
        warn!(
            target: "avstats",
            "{} records without a usable month were skipped",
            accidents.unresolved
        );
    }

    Ok(Report {
        load: set.stats(),
        lookups,
        regions,
        accidents,
        injuries,
        injury_policy: args.injury_policy,
        month_policy: args.month_policy,
        top: args.top,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::input::parse;

    const SAMPLE: &str = "\
Event Id|Accident Number|Event Date|Location|Country|Total Fatal Injuries|Total Serious Injuries
20001218X45444|LAX94LA336|07/19/1994|Los Angeles, CA|United States|1|
20001218X45447|NYC94LA001|07/02/1994|New York, NY|United States||3
19940812X00001|DEN94FA012||Denver, CO|United States|2|2
20001218X45449|LAX94LA336|08/30/1994|Toronto, ON|Canada||
";

    fn build_args<'a>(find: &'a [String], field: Option<&'a str>) -> ReportArgs<'a> {
        ReportArgs {
            find,
            field,
            country: "United States",
            top: 3,
            injury_policy: InjuryPolicy::Sum,
            month_policy: MonthPolicy::Skip,
        }
    }

    #[test]
    fn run_basic() {
        let set = parse(SAMPLE, '|').unwrap();
        let find = vec!["LAX94LA336".to_owned(), "absent".to_owned()];
        let report = run(&build_args(&find, None), SAMPLE, &set).unwrap();
        assert_eq!(report.lookups.len(), 2);
        assert_eq!(report.lookups[0].lines, [2, 5]);
        assert_eq!(report.lookups[0].text_lines, [2, 5]);
        assert_eq!(report.lookups[0].field, None);
        assert!(report.lookups[1].lines.is_empty());
        assert!(report.lookups[1].text_lines.is_empty());
        assert_eq!(report.regions.counts.len(), 3);
        assert_eq!(report.regions.max.as_deref(), Some("CA"));
        assert_eq!(
            report.accidents.top,
            [("July 1994".to_owned(), 2), ("August 1994".to_owned(), 2)]
        );
        assert_eq!(report.accidents.fallbacks, 1);
        assert_eq!(
            report.injuries.counts,
            [("July 1994".to_owned(), 4), ("August 1994".to_owned(), 4)]
        );
    }

    #[test]
    fn run_field_lookup() {
        let set = parse(SAMPLE, '|').unwrap();
        let find = vec!["Canada".to_owned()];
        let report = run(&build_args(&find, Some("Country")), SAMPLE, &set).unwrap();
        assert_eq!(report.lookups[0].field.as_deref(), Some("Country"));
        assert_eq!(report.lookups[0].lines, [5]);
        assert_eq!(report.lookups[0].text_lines, [5]);
        assert!(run(&build_args(&find, Some("Nope")), SAMPLE, &set).is_err());
    }

    #[test]
    fn run_text_lines() {
        let set = parse(SAMPLE, '|').unwrap();
        // substrings of fields and the header are found only in the raw text
        let find = vec!["LAX94".to_owned(), "Country".to_owned()];
        let report = run(&build_args(&find, None), SAMPLE, &set).unwrap();
        assert!(report.lookups[0].lines.is_empty());
        assert_eq!(report.lookups[0].text_lines, [2, 5]);
        assert!(report.lookups[1].lines.is_empty());
        assert_eq!(report.lookups[1].text_lines, [1]);
    }

    #[test]
    fn run_bad_top() {
        let set = parse(SAMPLE, '|').unwrap();
        let mut args = build_args(&[], None);
        args.top = 0;
        assert!(run(&args, SAMPLE, &set).is_err());
    }
}
