//! The HCF node tree.
//!
//! A node has a name, ordered key/value attributes and ordered children.
//! Children can only be created through [`HcfNode::make_subnode`], so the
//! structure is always a tree owned from the root down.
//!
//! Text form of a node at depth `d` (indent is `d` spaces):
//!
//! ```text
//! key=value
//! {.child
//!  key=value
//! }.child
//! ```

use std::fmt;

/// Name of the child node that describes a binary attachment.
pub const BINARY_NODE_NAME: &str = "__binary";

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HcfValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for HcfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HcfValue::Int(i) => write!(f, "{i}"),
            HcfValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for HcfValue {
    fn from(v: i64) -> Self {
        HcfValue::Int(v)
    }
}

impl From<i32> for HcfValue {
    fn from(v: i32) -> Self {
        HcfValue::Int(v.into())
    }
}

impl From<&str> for HcfValue {
    fn from(v: &str) -> Self {
        HcfValue::Text(v.to_string())
    }
}

impl From<String> for HcfValue {
    fn from(v: String) -> Self {
        HcfValue::Text(v)
    }
}

/// A node of the HCF tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HcfNode {
    name: String,
    depth: usize,
    attributes: Vec<(String, HcfValue)>,
    children: Vec<HcfNode>,
}

impl HcfNode {
    /// A new root node (depth 0).
    pub fn root() -> Self {
        Self::with_depth("root", 0)
    }

    fn with_depth(name: impl Into<String>, depth: usize) -> Self {
        Self {
            name: name.into(),
            depth,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Append a child and return it for further population.
    pub fn make_subnode(&mut self, name: impl Into<String>) -> &mut HcfNode {
        let child = Self::with_depth(name, self.depth + 1);
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Set an attribute. An existing key keeps its position and takes the new value.
    ///
    /// Keys must be non-empty and free of `=` and newlines, and values must
    /// not contain newlines, since neither survives the text form. Debug
    /// builds panic on violations.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<HcfValue>) {
        let key = key.into();
        let value = value.into();
        debug_assert!(
            !key.is_empty() && !key.contains(['=', '\n']),
            "HCF attribute key {key:?} must be non-empty without '=' or newlines"
        );
        debug_assert!(
            !matches!(&value, HcfValue::Text(t) if t.contains('\n')),
            "HCF attribute {key:?} has a value containing a newline"
        );
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&HcfValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Integer attribute, or `None` if absent or textual.
    pub fn int_attribute(&self, key: &str) -> Option<i64> {
        match self.attribute(key)? {
            HcfValue::Int(i) => Some(*i),
            HcfValue::Text(_) => None,
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &HcfValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn children(&self) -> &[HcfNode] {
        &self.children
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&HcfNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Render this node's attributes and children in text form.
    ///
    /// The node's own name is not part of its rendering; the parent emits
    /// the `{.name` / `}.name` brackets around it.
    pub fn serialize_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        let indent = " ".repeat(self.depth);
        for (key, value) in &self.attributes {
            out.push_str(&format!("{indent}{key}={value}\n"));
        }
        for child in &self.children {
            out.push_str(&format!("{indent}{{.{}\n", child.name));
            child.write_text(out);
            out.push_str(&format!("{indent}}}.{}\n", child.name));
        }
    }

    pub(crate) fn push_parsed_child(&mut self, child: HcfNode) {
        self.children.push(child);
    }

    pub(crate) fn new_parsed(name: &str, depth: usize) -> Self {
        Self::with_depth(name, depth)
    }
}
