//! Per-cycle inputs shared by every collector

use error_stack::Report;
use error_stack::ResultExt;
use roxmltree::Document;
use roxmltree::Node;

use crate::domain::DomainHandle;
use crate::domain::MonitorError;

/// Parsed domain descriptor document.
pub struct DomainDescriptor<'input> {
    doc: Document<'input>,
}

impl<'input> DomainDescriptor<'input> {
    /// Parse a descriptor document.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::MalformedDescriptor`] if `xml` is not well-formed
    pub fn parse(target_id: &str, xml: &'input str) -> Result<Self, Report<MonitorError>> {
        let doc = Document::parse(xml).change_context(MonitorError::MalformedDescriptor {
            target_id: target_id.to_string(),
        })?;
        Ok(Self { doc })
    }

    pub fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    pub fn root_tag(&self) -> &str {
        self.root().tag_name().name()
    }

    pub fn root_attribute(&self, name: &str) -> Option<&str> {
        self.root().attribute(name)
    }

    /// Text of the first direct child of the root named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.root()
            .children()
            .find(|child| child.has_tag_name(name))
            .and_then(|child| child.text())
    }

    /// First element matching a `/`-separated path of child tag names,
    /// searched depth first in document order.
    pub fn find(&self, path: &str) -> Option<Node<'_, 'input>> {
        let segments: Vec<&str> = path.split('/').collect();
        find_path(self.root(), &segments)
    }

    /// `dev` attribute of the first `devices/<kind>/target` element.
    ///
    /// Empty when the element or attribute is missing.
    pub fn device_target(&self, kind: &str) -> &str {
        self.find(&format!("devices/{kind}/target"))
            .and_then(|target| target.attribute("dev"))
            .unwrap_or("")
    }
}

fn find_path<'a, 'input>(node: Node<'a, 'input>, segments: &[&str]) -> Option<Node<'a, 'input>> {
    match segments.split_first() {
        None => Some(node),
        Some((head, rest)) => node
            .children()
            .filter(|child| child.has_tag_name(*head))
            .find_map(|child| find_path(child, rest)),
    }
}

/// Immutable inputs for one collection cycle.
#[derive(Clone, Copy)]
pub struct MetricContext<'a> {
    pub target_id: &'a str,
    pub domain: &'a dyn DomainHandle,
    pub descriptor: &'a DomainDescriptor<'a>,
}

impl<'a> MetricContext<'a> {
    pub fn new(
        target_id: &'a str,
        domain: &'a dyn DomainHandle,
        descriptor: &'a DomainDescriptor<'a>,
    ) -> Self {
        Self {
            target_id,
            domain,
            descriptor,
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;

    const XML: &str = r#"<domain type="kvm" id="3">
  <uuid>abc-123</uuid>
  <name>test-vm</name>
  <devices>
    <interface type="network"><mac address="52:54:00:00:00:01"/></interface>
    <interface type="network"><target dev="vnet1"/></interface>
    <disk type="file"><target dev="vda" bus="virtio"/></disk>
    <disk type="file"><target dev="vdb" bus="virtio"/></disk>
  </devices>
</domain>"#;

    #[test]
    fn reads_root_and_children() {
        let descriptor = DomainDescriptor::parse("abc-123", XML).expect("should parse");

        assert_eq!(descriptor.root_tag(), "domain");
        assert_eq!(descriptor.root_attribute("type"), Some("kvm"));
        assert_eq!(descriptor.root_attribute("id"), Some("3"));
        assert_eq!(descriptor.child_text("uuid"), Some("abc-123"));
        assert_eq!(descriptor.child_text("name"), Some("test-vm"));
        assert_eq!(descriptor.child_text("title"), None);
    }

    #[test]
    fn device_target_takes_first_match_in_document_order() {
        let descriptor = DomainDescriptor::parse("abc-123", XML).expect("should parse");

        // the first interface has no target, so the second one is found
        assert_eq!(descriptor.device_target("interface"), "vnet1");
        assert_eq!(descriptor.device_target("disk"), "vda");
        assert_eq!(descriptor.device_target("hostdev"), "");
    }

    #[test]
    fn target_without_dev_is_empty() {
        let xml = r#"<domain><devices><disk><target bus="sata"/></disk></devices></domain>"#;
        let descriptor = DomainDescriptor::parse("x", xml).expect("should parse");

        assert_eq!(descriptor.device_target("disk"), "");
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let err = DomainDescriptor::parse("abc-123", "<domain><uuid>")
            .err()
            .expect("should fail");

        assert!(matches!(
            err.current_context(),
            MonitorError::MalformedDescriptor { target_id } if target_id == "abc-123"
        ));
    }
}
