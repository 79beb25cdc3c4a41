//! CPU time and virtual CPU count

use error_stack::Report;

use super::context::MetricContext;
use super::registry::Collector;
use super::value::FieldValue;
use super::value::MetricMap;
use crate::domain::QueryError;

pub const COLLECTOR: Collector = Collector::new("cpu", collect);

fn collect(context: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
    // only the aggregate snapshot is reported
    let stats = context
        .domain
        .cpu_stats()?
        .into_iter()
        .next()
        .unwrap_or_default();
    let vcpu_count = context.domain.vcpu_count()?;

    let time = |name: &str| stats.get(name).copied().map(FieldValue::from);
    Ok(MetricMap::from([
        ("cpu.vcpu.count".to_string(), Some(vcpu_count.into())),
        ("cpu.time".to_string(), time("cpu_time")),
        ("cpu.time.system".to_string(), time("system_time")),
        ("cpu.time.user".to_string(), time("user_time")),
    ]))
}
