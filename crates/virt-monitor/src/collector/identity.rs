//! Domain identity taken straight from the descriptor

use error_stack::Report;

use super::context::MetricContext;
use super::registry::Collector;
use super::value::FieldValue;
use super::value::MetricMap;
use crate::domain::QueryError;

pub const COLLECTOR: Collector = Collector::new("identity", collect);

fn collect(context: &MetricContext<'_>) -> Result<MetricMap, Report<QueryError>> {
    let descriptor = context.descriptor;
    if descriptor.root_tag() != "domain" {
        return Err(Report::new(QueryError::InvalidDescriptor {
            message: format!("expected <domain> root, found <{}>", descriptor.root_tag()),
        }));
    }

    Ok(MetricMap::from([
        ("id".to_string(), text(descriptor.root_attribute("id"))),
        ("uuid".to_string(), text(descriptor.child_text("uuid"))),
        ("name".to_string(), text(descriptor.child_text("name"))),
        ("type".to_string(), text(descriptor.root_attribute("type"))),
    ]))
}

fn text(value: Option<&str>) -> Option<FieldValue> {
    value.map(FieldValue::from)
}
