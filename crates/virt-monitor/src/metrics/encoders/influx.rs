use std::collections::BTreeMap;

use influxdb_line_protocol::LineProtocolBuilder;

use super::ReportEncoder;
use crate::collector::FieldValue;
use crate::collector::MetricReport;

/// InfluxDB line protocol encoder
///
/// Line protocol has no null, so entries without a value are left out.
pub struct InfluxEncoder;

impl InfluxEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl ReportEncoder for InfluxEncoder {
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &BTreeMap<String, String>,
        report: &MetricReport,
        timestamp: i64,
    ) -> String {
        // Start with measurement
        let mut builder = LineProtocolBuilder::new().measurement(measurement);

        // Add all tags
        for (key, value) in tags {
            builder = builder.tag(key, value);
        }

        let field_entries: Vec<(&String, &FieldValue)> = report
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|value| (key, value)))
            .collect();

        let lp_built = if let Some((first_key, first_value)) = field_entries.first() {
            // Add the first field to transition to AfterField state
            let mut after_first_field = match first_value {
                FieldValue::String(s) => builder.field(first_key, s.as_str()),
                FieldValue::Integer(i) => builder.field(first_key, *i),
                FieldValue::UnsignedInteger(u) => builder.field(first_key, *u),
            };

            // Add remaining fields
            for (key, value) in field_entries.iter().skip(1) {
                after_first_field = match value {
                    FieldValue::String(s) => after_first_field.field(key, s.as_str()),
                    FieldValue::Integer(i) => after_first_field.field(key, *i),
                    FieldValue::UnsignedInteger(u) => after_first_field.field(key, *u),
                };
            }

            after_first_field.timestamp(timestamp).close_line().build()
        } else {
            // Nothing had a value
            builder
                .field("_empty", true)
                .timestamp(timestamp)
                .close_line()
                .build()
        };

        String::from_utf8_lossy(&lp_built).into_owned()
    }
}
