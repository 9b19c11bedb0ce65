//! Reading serialized HCF objects back into a node tree.

use crate::error::{HcfError, Result};
use crate::generator::BINARY_APPENDIX_MARKER;
use crate::node::{HcfNode, HcfValue, BINARY_NODE_NAME};

/// A parsed HCF object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HcfObject {
    root: HcfNode,
    appendix: Vec<u8>,
}

impl HcfObject {
    /// Parse the bytes produced by [`HcfGenerator::serialize`](crate::HcfGenerator::serialize).
    ///
    /// Attribute values that parse as a signed 64-bit integer are read back
    /// as [`HcfValue::Int`]; everything else is text.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let marker = BINARY_APPENDIX_MARKER.as_bytes();
        let split = data
            .windows(marker.len())
            .position(|w| w == marker)
            .ok_or_else(|| malformed("missing binary appendix marker"))?;

        let text = std::str::from_utf8(&data[..split])
            .map_err(|e| malformed(format!("node tree is not UTF-8: {e}")))?;
        let appendix = data[split + marker.len()..].to_vec();

        let root = parse_tree(text)?;
        log::debug!(
            "parsed HCF object: {} top-level node(s), {} appendix byte(s)",
            root.children().len(),
            appendix.len()
        );
        Ok(Self { root, appendix })
    }

    pub fn root(&self) -> &HcfNode {
        &self.root
    }

    pub fn appendix(&self) -> &[u8] {
        &self.appendix
    }

    /// The payload described by a `__binary` node.
    pub fn binary(&self, node: &HcfNode) -> Result<&[u8]> {
        if node.name() != BINARY_NODE_NAME {
            return Err(malformed(format!(
                "node '{}' is not a binary attachment",
                node.name()
            )));
        }
        let start = range_attribute(node, "start")?;
        let size = range_attribute(node, "size")?;
        let out_of_range = HcfError::AttachmentOutOfRange {
            start,
            size,
            len: self.appendix.len(),
        };
        let (Ok(begin), Ok(len)) = (usize::try_from(start), usize::try_from(size)) else {
            return Err(out_of_range);
        };
        let end = begin.checked_add(len).ok_or_else(|| malformed("attachment range overflows"))?;
        self.appendix.get(begin..end).ok_or(out_of_range)
    }

    /// Payloads attached directly to `node`, in attachment order.
    pub fn binaries<'a>(&'a self, node: &'a HcfNode) -> Result<Vec<&'a [u8]>> {
        node.children()
            .iter()
            .filter(|c| c.name() == BINARY_NODE_NAME)
            .map(|c| self.binary(c))
            .collect()
    }
}

fn malformed(detail: impl Into<String>) -> HcfError {
    HcfError::Malformed {
        detail: detail.into(),
    }
}

fn range_attribute(node: &HcfNode, key: &str) -> Result<u64> {
    let value = node
        .int_attribute(key)
        .ok_or_else(|| malformed(format!("binary attachment lacks integer '{key}'")))?;
    u64::try_from(value).map_err(|_| malformed(format!("negative '{key}' in binary attachment")))
}

fn parse_value(raw: &str) -> HcfValue {
    match raw.parse::<i64>() {
        Ok(i) => HcfValue::Int(i),
        Err(_) => HcfValue::Text(raw.to_string()),
    }
}

fn parse_tree(text: &str) -> Result<HcfNode> {
    // Open nodes from the root down; the last entry receives new lines.
    let mut stack = vec![HcfNode::root()];

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_start_matches(' ');
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_prefix("{.") {
            let depth = stack.len();
            stack.push(HcfNode::new_parsed(name, depth));
        } else if let Some(name) = line.strip_prefix("}.") {
            if stack.len() < 2 {
                return Err(malformed(format!(
                    "line {}: closing '{name}' without an open node",
                    lineno + 1
                )));
            }
            let node = stack.pop().ok_or_else(|| malformed("node stack underflow"))?;
            if node.name() != name {
                return Err(malformed(format!(
                    "line {}: expected '}}.{}', found '}}.{name}'",
                    lineno + 1,
                    node.name()
                )));
            }
            if let Some(parent) = stack.last_mut() {
                parent.push_parsed_child(node);
            }
        } else if let Some((key, value)) = line.split_once('=') {
            if key.is_empty() {
                return Err(malformed(format!("line {}: attribute without a key", lineno + 1)));
            }
            if let Some(current) = stack.last_mut() {
                current.set_attribute(key, parse_value(value));
            }
        } else {
            return Err(malformed(format!(
                "line {}: expected attribute or node bracket, found '{line}'",
                lineno + 1
            )));
        }
    }

    if stack.len() != 1 {
        let open = stack.last().map(|n| n.name().to_string()).unwrap_or_default();
        return Err(malformed(format!("node '{open}' is never closed")));
    }
    stack.pop().ok_or_else(|| malformed("node stack underflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HcfGenerator;

    fn sample() -> HcfGenerator {
        let mut hcf = HcfGenerator::new();
        hcf.root_mut().set_attribute("generator", "acpp");
        let (root, appendix) = hcf.split_mut();
        let image = root.make_subnode("image");
        image.set_attribute("format", "ptx");
        appendix.attach_text(image, "first");
        appendix.attach_binary(image, &[0, 1, 2, 255]);
        let kernel = root.make_subnode("kernel");
        kernel.set_attribute("name", "vec_add");
        appendix.attach_text(kernel, "");
        hcf
    }

    #[test]
    fn parses_generated_object() {
        let hcf = sample();
        let object = HcfObject::parse(&hcf.serialize()).unwrap();
        assert_eq!(object.root(), hcf.root());
        assert_eq!(object.appendix(), hcf.appendix().as_bytes());

        let image = object.root().child("image").unwrap();
        let payloads = object.binaries(image).unwrap();
        assert_eq!(payloads, vec![&b"first"[..], &[0, 1, 2, 255][..]]);

        let kernel = object.root().child("kernel").unwrap();
        assert_eq!(object.binaries(kernel).unwrap(), vec![&b""[..]]);
    }

    #[test]
    fn numeric_text_reads_back_as_integer() {
        let mut hcf = HcfGenerator::new();
        hcf.root_mut().set_attribute("object-id", "1234");
        let object = HcfObject::parse(&hcf.serialize()).unwrap();
        assert_eq!(object.root().int_attribute("object-id"), Some(1234));
    }

    #[test]
    fn missing_marker_is_malformed() {
        let err = HcfObject::parse(b"generator=acpp\n").unwrap_err();
        assert!(matches!(err, HcfError::Malformed { .. }));
    }

    #[test]
    fn unbalanced_brackets_are_malformed() {
        let data = format!("{{.image\n size=1\n{BINARY_APPENDIX_MARKER}");
        assert!(matches!(
            HcfObject::parse(data.as_bytes()),
            Err(HcfError::Malformed { .. })
        ));

        let data = format!("{{.image\n}}.kernel\n{BINARY_APPENDIX_MARKER}");
        assert!(matches!(
            HcfObject::parse(data.as_bytes()),
            Err(HcfError::Malformed { .. })
        ));

        let data = format!("}}.image\n{BINARY_APPENDIX_MARKER}");
        assert!(matches!(
            HcfObject::parse(data.as_bytes()),
            Err(HcfError::Malformed { .. })
        ));
    }

    #[test]
    fn attribute_without_key_is_malformed() {
        let data = format!("=orphan\n{BINARY_APPENDIX_MARKER}");
        assert!(matches!(
            HcfObject::parse(data.as_bytes()),
            Err(HcfError::Malformed { .. })
        ));
    }

    #[test]
    fn out_of_range_attachment_is_rejected() {
        let data = format!("{{.__binary\n start=2\n size=10\n}}.__binary\n{BINARY_APPENDIX_MARKER}abcd");
        let object = HcfObject::parse(data.as_bytes()).unwrap();
        let err = object.binaries(object.root()).unwrap_err();
        assert!(matches!(
            err,
            HcfError::AttachmentOutOfRange { start: 2, size: 10, len: 4 }
        ));
    }

    #[test]
    fn non_binary_node_is_not_an_attachment() {
        let object = HcfObject::parse(&sample().serialize()).unwrap();
        let image = object.root().child("image").unwrap();
        assert!(matches!(object.binary(image), Err(HcfError::Malformed { .. })));
    }
}
