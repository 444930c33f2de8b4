use anyhow::{Context, Result, anyhow};
use avstats::index::Index;
use avstats::input::{self, RecordSet, Row};
use clap::Parser;
use cliclack::log;
use itertools::Itertools;
use std::collections::HashMap;
use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::fs;

/// Look up records interactively
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input file
    #[arg(default_value = "AviationData.txt")]
    infile: String,
    /// Field delimiter
    #[arg(short, long, default_value_t = '|')]
    delimiter: char,
}

const SHOW_ROWS: usize = 10;

#[derive(Clone, PartialEq, Eq)]
enum Action {
    AnyField,
    OneField,
    Quit,
}

fn select_field(set: &RecordSet) -> Result<Option<&str>> {
    let mut items = vec![];
    items.push((None, "Oops, go back".to_owned(), ""));
    for field in set.header() {
        items.push((Some(field.as_str()), field.clone(), ""));
    }
    let choice = cliclack::select("Which field?").items(&items).interact()?;
    Ok(choice)
}

fn show(rows: &[Row]) -> String {
    let options = textwrap::Options::new(70).subsequent_indent("    ");
    let mut lines = rows
        .iter()
        .take(SHOW_ROWS)
        .map(|row| textwrap::fill(&format!("{}: {}", row.line(), row.join('|')), &options))
        .collect_vec();
    if rows.len() > SHOW_ROWS {
        lines.push(format!("... and {} more", rows.len() - SHOW_ROWS));
    }
    lines.join("\n")
}

fn main() -> Result<()> {
    let args = Args::parse();
    cliclack::intro("avstats-lookup")?;
    log::info(format!("Reading {}...", args.infile))?;
    let text =
        fs::read_to_string(&args.infile).with_context(|| format!("cannot read {}", args.infile))?;
    let set = input::parse(&text, args.delimiter)
        .map_err(|e| anyhow!("cannot parse {}: {e}", args.infile))?;
    let stats = set.stats();
    log::info(format!(
        "{} records, {} fields, {} rows padded, {} rows truncated",
        stats.records,
        set.header().len(),
        stats.padded,
        stats.truncated
    ))?;

    let mut any_index: Option<Index> = None;
    let mut field_indexes: HashMap<&str, Index> = HashMap::new();
    loop {
        let items = [
            (Action::AnyField, "Find a value in any field", ""),
            (Action::OneField, "Find a value in one field", ""),
            (Action::Quit, "Quit", ""),
        ];
        let choice = cliclack::select("Action?").items(&items).interact()?;
        let index = match choice {
            Action::Quit => break,
            Action::AnyField => any_index.get_or_insert_with(|| Index::build_any(&set)),
            Action::OneField => match select_field(&set)? {
                None => continue,
                Some(field) => match field_indexes.entry(field) {
                    Occupied(e) => e.into_mut(),
                    Vacant(e) => {
                        e.insert(Index::build(&set, field).map_err(|err| anyhow!("{err}"))?)
                    }
                },
            },
        };
        let value: String = cliclack::input("Value?").interact()?;
        let rows = index.lookup(&value);
        let place = match index.field() {
            None => "any field".to_owned(),
            Some(field) => format!("'{field}'"),
        };
        if rows.is_empty() {
            log::warning(format!("'{value}' not found in {place}"))?;
        } else {
            cliclack::note(
                format!("'{value}' in {place}: {} records", rows.len()),
                show(&rows),
            )?;
        }
    }
    cliclack::outro("Bye!")?;
    Ok(())
}
