use crate::input::RecordSet;
use itertools::Itertools;
use log::{Level, debug, info, log_enabled};
use std::collections::HashSet;

fn explain_field(name: &str, distinct: usize, empty: usize, total: usize) -> String {
    format!("{name} = {distinct} distinct, {empty}/{total} empty")
}

pub fn statistics(set: &RecordSet) {
    let stats = set.stats();
    info!(target: "avstats", "before aggregation: records: {}", stats.records);
    if stats.padded > 0 || stats.truncated > 0 {
        info!(
            target: "avstats",
            "records with a wrong number of fields: {} short, {} long",
            stats.padded, stats.truncated
        );
    }
    if !log_enabled!(target: "avstats", Level::Debug) {
        return;
    }
    let mut distinct: Vec<HashSet<&str>> = vec![HashSet::new(); set.header().len()];
    let mut empty = vec![0; set.header().len()];
    for row in set.rows() {
        for (i, v) in row.values().iter().enumerate() {
            if v.is_empty() {
                empty[i] += 1;
            }
            distinct[i].insert(v);
        }
    }
    debug!(
        target: "avstats",
        "fields: {}",
        set.header()
            .iter()
            .enumerate()
            .map(|(i, name)| explain_field(name, distinct[i].len(), empty[i], set.len()))
            .join("; ")
    );
}
