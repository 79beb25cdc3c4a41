use std::collections::BTreeMap;

use crate::collector::MetricReport;

pub mod console;
pub mod influx;
pub mod json;

/// Measurement name used for per-domain reports.
pub const DOMAIN_MEASUREMENT: &str = "virt_domain";

/// Output formats understood by [`create_encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `key value` lines
    #[default]
    Console,
    /// One JSON object per report
    Json,
    /// InfluxDB line protocol
    Influx,
}

/// Trait for encoding a report into different formats
pub trait ReportEncoder: Send + Sync {
    /// Encode a report with measurement name, tags and timestamp
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &BTreeMap<String, String>,
        report: &MetricReport,
        timestamp: i64,
    ) -> String;

    /// Encode the report of one domain, tagged with its identifier
    fn encode_domain_report(&self, target_id: &str, report: &MetricReport, timestamp: i64) -> String {
        let mut tags = BTreeMap::new();
        tags.insert("uuid".to_string(), target_id.to_string());

        self.encode_metrics(DOMAIN_MEASUREMENT, &tags, report, timestamp)
    }
}

/// Factory function to create encoders based on format
pub fn create_encoder(format: OutputFormat) -> Box<dyn ReportEncoder> {
    match format {
        OutputFormat::Console => Box::new(console::ConsoleEncoder::new()),
        OutputFormat::Json => Box::new(json::JsonEncoder::new()),
        OutputFormat::Influx => Box::new(influx::InfluxEncoder::new()),
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::collector::FieldValue;
    use crate::collector::MetricMap;

    fn report() -> MetricReport {
        MetricReport::from(MetricMap::from([
            ("name".to_string(), Some(FieldValue::from("test-vm"))),
            ("mem.rss".to_string(), Some(FieldValue::UnsignedInteger(1024))),
            ("mem.actual".to_string(), None),
        ]))
    }

    #[test]
    fn create_encoder_console() {
        let result = create_encoder(OutputFormat::Console).encode_domain_report("vm", &report(), 1);
        assert_eq!(result, "name test-vm\nmem.rss 1024\nmem.actual None\n");
    }

    #[test]
    fn create_encoder_json() {
        let result = create_encoder(OutputFormat::Json).encode_domain_report("vm", &report(), 1);
        assert!(result.contains(DOMAIN_MEASUREMENT));
        assert!(result.contains(r#""uuid":"vm""#));
    }

    #[test]
    fn create_encoder_influx() {
        let result = create_encoder(OutputFormat::Influx).encode_domain_report("vm", &report(), 1);
        assert!(result.starts_with("virt_domain,uuid=vm "));
    }

    #[test]
    fn default_format_is_console() {
        assert_eq!(OutputFormat::default(), OutputFormat::Console);
    }
}
