//! HCF object generation.
//!
//! An HCF object is the text form of its node tree, a fixed marker, and a
//! binary appendix holding every attached payload back to back:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Node tree (text)             │
//! ├──────────────────────────────┤
//! │ "__acpp_hcf_binary_appendix" │
//! ├──────────────────────────────┤
//! │ Binary appendix              │
//! └──────────────────────────────┘
//! ```
//!
//! Nodes never hold payload bytes. An attachment is a `__binary` child with
//! `start` and `size` attributes addressing the range `[start, start+size)`
//! of the appendix.

use crate::node::{HcfNode, BINARY_NODE_NAME};

/// Marker separating the node tree from the binary appendix.
pub const BINARY_APPENDIX_MARKER: &str = "__acpp_hcf_binary_appendix";

/// The shared buffer that attachments point into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryAppendix {
    bytes: Vec<u8>,
}

impl BinaryAppendix {
    /// Append `content` and record its range as a `__binary` child of `node`.
    ///
    /// Ranges are issued in increasing offset order and never overlap.
    pub fn attach_binary(&mut self, node: &mut HcfNode, content: &[u8]) {
        let start = self.bytes.len();
        let attachment = node.make_subnode(BINARY_NODE_NAME);
        attachment.set_attribute("start", start as i64);
        attachment.set_attribute("size", content.len() as i64);
        self.bytes.extend_from_slice(content);
        log::trace!(
            "attached {} byte(s) at offset {start} to node '{}'",
            content.len(),
            node.name()
        );
    }

    /// Attach text as its UTF-8 bytes (one byte per character for ASCII).
    pub fn attach_text(&mut self, node: &mut HcfNode, content: &str) {
        self.attach_binary(node, content.as_bytes());
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds one HCF object: a node tree plus its binary appendix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HcfGenerator {
    root: HcfNode,
    appendix: BinaryAppendix,
}

impl Default for HcfGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HcfGenerator {
    /// An empty object with a `root` node.
    pub fn new() -> Self {
        Self {
            root: HcfNode::root(),
            appendix: BinaryAppendix::default(),
        }
    }

    pub fn root(&self) -> &HcfNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut HcfNode {
        &mut self.root
    }

    pub fn appendix(&self) -> &BinaryAppendix {
        &self.appendix
    }

    /// Borrow the tree and the appendix at the same time, so payloads can be
    /// attached to any node:
    ///
    /// ```
    /// use acpp_hcf::HcfGenerator;
    ///
    /// let mut hcf = HcfGenerator::new();
    /// let (root, appendix) = hcf.split_mut();
    /// let image = root.make_subnode("image");
    /// appendix.attach_text(image, "ptx code");
    /// assert_eq!(hcf.appendix().len(), 8);
    /// ```
    pub fn split_mut(&mut self) -> (&mut HcfNode, &mut BinaryAppendix) {
        (&mut self.root, &mut self.appendix)
    }

    /// Attach a payload directly to the root node.
    pub fn attach_binary_to_root(&mut self, content: &[u8]) {
        let (root, appendix) = self.split_mut();
        appendix.attach_binary(root, content);
    }

    /// The text part of the object, including the appendix marker.
    pub fn serialize_text(&self) -> String {
        let mut text = self.root.serialize_text();
        text.push_str(BINARY_APPENDIX_MARKER);
        text
    }

    /// The complete object as bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let text = self.serialize_text();
        let mut bytes = Vec::with_capacity(text.len() + self.appendix.len());
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(self.appendix.as_bytes());
        bytes
    }

    /// The serialized object as a C byte array initializer body.
    ///
    /// Every byte becomes `0x` plus two lowercase hex digits followed by a
    /// comma, so the result is exactly five characters per byte.
    pub fn hex_escape(&self) -> String {
        hex_escape_bytes(&self.serialize())
    }
}

/// Render bytes as `0xNN,` items.
pub fn hex_escape_bytes(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 5);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "0x{b:02x},");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_hex(escaped: &str) -> Vec<u8> {
        escaped
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| u8::from_str_radix(s.trim_start_matches("0x"), 16).unwrap())
            .collect()
    }

    #[test]
    fn text_payload_ends_the_stream() {
        let mut hcf = HcfGenerator::new();
        let (root, appendix) = hcf.split_mut();
        appendix.attach_text(root, "hello");

        let bytes = hcf.serialize();
        assert!(bytes.ends_with(b"hello"));
        let text = hcf.serialize_text();
        assert!(text.ends_with(BINARY_APPENDIX_MARKER));
        assert_eq!(bytes.len(), text.len() + 5);
    }

    #[test]
    fn hex_escape_length_and_decoding() {
        let mut hcf = HcfGenerator::new();
        let (root, appendix) = hcf.split_mut();
        appendix.attach_text(root, "hello");

        let bytes = hcf.serialize();
        let escaped = hcf.hex_escape();
        assert_eq!(escaped.len(), 5 * bytes.len());
        assert!(escaped.starts_with("0x"));
        assert!(escaped.ends_with(','));
        assert_eq!(decode_hex(&escaped), bytes);
    }

    #[test]
    fn hex_digits_are_lowercase() {
        assert_eq!(hex_escape_bytes(&[0x00, 0xab, 0xff]), "0x00,0xab,0xff,");
        assert_eq!(hex_escape_bytes(&[]), "");
    }

    #[test]
    fn attachments_are_monotonic_and_disjoint() {
        let mut hcf = HcfGenerator::new();
        let (root, appendix) = hcf.split_mut();
        let image = root.make_subnode("image");
        appendix.attach_binary(image, &[1, 2, 3]);
        appendix.attach_binary(image, &[]);
        appendix.attach_binary(image, &[4, 5]);
        appendix.attach_text(root, "abcd");

        let mut ranges = Vec::new();
        let image = &hcf.root().children()[0];
        for node in image.children().iter().chain(hcf.root().children().iter().skip(1)) {
            assert_eq!(node.name(), BINARY_NODE_NAME);
            ranges.push((
                node.int_attribute("start").unwrap(),
                node.int_attribute("size").unwrap(),
            ));
        }
        assert_eq!(ranges, vec![(0, 3), (3, 0), (3, 2), (5, 4)]);
        for pair in ranges.windows(2) {
            assert!(pair[0].0 + pair[0].1 <= pair[1].0);
        }
        assert_eq!(hcf.appendix().as_bytes(), &[1, 2, 3, 4, 5, b'a', b'b', b'c', b'd']);
    }

    #[test]
    fn serialization_is_repeatable() {
        let mut hcf = HcfGenerator::new();
        hcf.root_mut().set_attribute("generator", "acpp");
        hcf.attach_binary_to_root(&[0xde, 0xad]);
        assert_eq!(hcf.serialize(), hcf.serialize());
        assert_eq!(hcf.hex_escape(), hcf.hex_escape());
    }

    #[test]
    fn serialized_text_layout() {
        let mut hcf = HcfGenerator::new();
        hcf.root_mut().set_attribute("generator", "acpp");
        hcf.attach_binary_to_root(b"xy");
        assert_eq!(
            hcf.serialize_text(),
            "generator=acpp\n{.__binary\n start=0\n size=2\n}.__binary\n__acpp_hcf_binary_appendix"
        );
    }
}
