use std::collections::BTreeMap;

use serde_json::json;

use super::ReportEncoder;
use crate::collector::MetricReport;

/// JSON encoder for reports
///
/// Fields keep report order; entries without a value become `null`.
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl ReportEncoder for JsonEncoder {
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &BTreeMap<String, String>,
        report: &MetricReport,
        timestamp: i64,
    ) -> String {
        let metrics = json!({
            "measure": measurement,
            "ts": timestamp,
            "tag": tags,
            "field": report,
        });
        metrics.to_string() + "\n"
    }
}
