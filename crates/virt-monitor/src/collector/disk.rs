//! Counters for the first disk in the descriptor

use error_stack::Report;

use super::context::MetricContext;
use super::registry::Collector;
use super::value::FieldValue;
use super::value::MetricMap;
use crate::domain::BlockStats;
use crate::domain::QueryError;

pub const COLLECTOR: Collector = Collector::new("disk", collect);

/// Field suffix for each position of [`BlockStats`].
const FIELDS: [&str; 5] = [
    "read.requests",
    "read.bytes",
    "write.requests",
    "write.bytes",
    "errors",
];

fn collect(context: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
    let device = context.descriptor.device_target("disk");
    let values: [Option<i64>; 5] = if device.is_empty() {
        [None; 5]
    } else {
        let stats: BlockStats = context.domain.block_stats(device)?;
        stats.map(Some)
    };

    Ok(FIELDS
        .iter()
        .zip(values)
        .map(|(field, value)| (format!("disk[{device}].{field}"), value.map(FieldValue::from)))
        .collect())
}
