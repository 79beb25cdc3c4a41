use std::collections::BTreeMap;
use std::fmt::Write;

use super::ReportEncoder;
use crate::collector::MetricReport;

/// Plain `key value` lines in report order
///
/// Measurement, tags and timestamp are not printed.
pub struct ConsoleEncoder;

impl ConsoleEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl ReportEncoder for ConsoleEncoder {
    fn encode_metrics(
        &self,
        _measurement: &str,
        _tags: &BTreeMap<String, String>,
        report: &MetricReport,
        _timestamp: i64,
    ) -> String {
        let mut out = String::new();
        for (key, value) in report {
            let _ = match value {
                Some(value) => writeln!(out, "{key} {value}"),
                None => writeln!(out, "{key} None"),
            };
        }
        out
    }
}
