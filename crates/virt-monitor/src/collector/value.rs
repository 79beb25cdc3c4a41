use std::fmt;

use indexmap::map::Iter;
use indexmap::IndexMap;
use serde::Serialize;

/// Represents a metric value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    UnsignedInteger(u64),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::UnsignedInteger(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::UnsignedInteger(u64::from(value))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::UnsignedInteger(u) => write!(f, "{u}"),
        }
    }
}

/// Output of a single collector. `None` means the metric is not available.
pub type MetricMap = IndexMap<String, Option<FieldValue>>;

/// Merged output of every collector in one cycle.
///
/// Keys keep the position of their first insertion; a later value for the
/// same key replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetricReport(MetricMap);

impl MetricReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert every entry of `metrics`, in its order.
    pub fn merge(&mut self, metrics: MetricMap) {
        for (key, value) in metrics {
            self.0.insert(key, value);
        }
    }

    /// `None` if the key is absent, `Some(None)` if it is present without a value.
    pub fn get(&self, key: &str) -> Option<Option<&FieldValue>> {
        self.0.get(key).map(Option::as_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, Option<FieldValue>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a MetricReport {
    type Item = (&'a String, &'a Option<FieldValue>);
    type IntoIter = Iter<'a, String, Option<FieldValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<MetricMap> for MetricReport {
    fn from(metrics: MetricMap) -> Self {
        Self(metrics)
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;

    fn map(entries: &[(&str, Option<i64>)]) -> MetricMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(FieldValue::from)))
            .collect()
    }

    #[test]
    fn later_value_wins_at_first_position() {
        let mut report = MetricReport::new();
        report.merge(map(&[("a", Some(1)), ("k", Some(2))]));
        report.merge(map(&[("b", Some(3)), ("k", Some(9))]));

        assert_eq!(report.keys().collect::<Vec<_>>(), vec!["a", "k", "b"]);
        assert_eq!(report.get("k"), Some(Some(&FieldValue::Integer(9))));
    }

    #[test]
    fn later_none_overwrites_value() {
        let mut report = MetricReport::new();
        report.merge(map(&[("k", Some(2))]));
        report.merge(map(&[("k", None)]));

        assert_eq!(report.get("k"), Some(None));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn absent_key_differs_from_no_value() {
        let report = MetricReport::from(map(&[("present", None)]));

        assert_eq!(report.get("present"), Some(None));
        assert_eq!(report.get("missing"), None);
    }

    #[test]
    fn display_values() {
        assert_eq!(FieldValue::from("kvm").to_string(), "kvm");
        assert_eq!(FieldValue::from(-1i64).to_string(), "-1");
        assert_eq!(FieldValue::from(7u32).to_string(), "7");
    }

    #[test]
    fn serializes_in_insertion_order() {
        let report = MetricReport::from(map(&[("z", Some(1)), ("a", None)]));
        let json = serde_json::to_string(&report).expect("serialize");
        assert_eq!(json, r#"{"z":1,"a":null}"#);
    }
}
