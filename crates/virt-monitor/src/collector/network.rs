//! Counters for the first network interface in the descriptor
//!
//! Additional interfaces are not reported.

use error_stack::Report;

use super::context::MetricContext;
use super::registry::Collector;
use super::value::FieldValue;
use super::value::MetricMap;
use crate::domain::InterfaceStats;
use crate::domain::QueryError;

pub const COLLECTOR: Collector = Collector::new("network", collect);

/// Field suffix for each position of [`InterfaceStats`].
const FIELDS: [&str; 8] = [
    "read.bytes",
    "read.packets",
    "read.errors",
    "read.drops",
    "write.bytes",
    "write.packets",
    "write.errors",
    "write.drops",
];

fn collect(context: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
    let device = context.descriptor.device_target("interface");
    let values: [Option<i64>; 8] = if device.is_empty() {
        [None; 8]
    } else {
        let stats: InterfaceStats = context.domain.interface_stats(device)?;
        stats.map(Some)
    };

    Ok(FIELDS
        .iter()
        .zip(values)
        .map(|(field, value)| {
            (
                format!("iface[{device}].{field}"),
                value.map(FieldValue::from),
            )
        })
        .collect())
}
