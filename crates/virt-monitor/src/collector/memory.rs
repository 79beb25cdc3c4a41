//! Balloon driver memory counters

use error_stack::Report;

use super::context::MetricContext;
use super::registry::Collector;
use super::value::FieldValue;
use super::value::MetricMap;
use crate::domain::QueryError;

pub const COLLECTOR: Collector = Collector::new("memory", collect);

/// Report key and the counter it is read from.
const COUNTERS: [(&str, &str); 9] = [
    ("mem.rss", "rss"),
    ("mem.actual", "actual"),
    ("mem.actual.balloon", "actual_balloon"),
    ("mem.unused", "unused"),
    ("mem.available", "available"),
    ("mem.swap.in", "swap_in"),
    ("mem.swap.out", "swap_out"),
    ("mem.fault.major", "major_fault"),
    ("mem.fault.minor", "minor_fault"),
];

fn collect(context: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
    let stats = context.domain.memory_stats()?;
    Ok(COUNTERS
        .iter()
        .map(|(key, counter)| {
            let value = stats.get(*counter).copied().map(FieldValue::from);
            (key.to_string(), value)
        })
        .collect())
}
