//! Node types for KeyValues documents.
//!
//! Every node has a key and exactly one payload:
//! - `"name" "value"` is `KeyValue { key: "name", payload: Payload::Value("value") }`
//! - `"name" { ... }` is `KeyValue { key: "name", payload: Payload::Block(children) }`
//!
//! Children are kept in source order.

/// A key with either a string value or a block of child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
pub struct KeyValue {
    /// The key. May be empty.
    pub key: String,
    /// The value or the children.
    pub payload: Payload,
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
#[repr(u8)]
pub enum Payload {
    /// Leaf string value.
    Value(String),
    /// Child nodes `{ ... }`, possibly empty.
    Block(Vec<KeyValue>),
}

/// A parsed document: the top-level nodes in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
pub struct Document {
    /// Top-level nodes.
    pub entries: Vec<KeyValue>,
}

impl KeyValue {
    /// Create a leaf node.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            payload: Payload::Value(value.into()),
        }
    }

    /// Create a block node with the given children.
    pub fn block(key: impl Into<String>, children: Vec<KeyValue>) -> Self {
        KeyValue {
            key: key.into(),
            payload: Payload::Block(children),
        }
    }

    /// Whether this node carries a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        matches!(self.payload, Payload::Value(_))
    }

    /// Whether this node is a block.
    #[inline]
    pub fn is_block(&self) -> bool {
        matches!(self.payload, Payload::Block(_))
    }

    /// The value of a leaf node.
    pub fn value(&self) -> Option<&str> {
        match &self.payload {
            Payload::Value(v) => Some(v),
            Payload::Block(_) => None,
        }
    }

    /// Direct children. Empty for leaves.
    pub fn children(&self) -> &[KeyValue] {
        match &self.payload {
            Payload::Value(_) => &[],
            Payload::Block(children) => children,
        }
    }

    /// Mutable children of a block node.
    pub fn children_mut(&mut self) -> Option<&mut Vec<KeyValue>> {
        match &mut self.payload {
            Payload::Value(_) => None,
            Payload::Block(children) => Some(children),
        }
    }

    /// First descendant with the given key, searched depth-first in document
    /// order. The node itself is not considered.
    pub fn find(&self, key: &str) -> Option<&KeyValue> {
        find_in(self.children(), key)
    }

    /// Direct child with the given key.
    pub fn item(&self, key: &str) -> Option<&KeyValue> {
        self.children().iter().find(|kv| kv.key == key)
    }

    /// Call `f` once for every direct child.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &KeyValue),
    {
        for kv in self.children() {
            f(&kv.key, kv);
        }
    }

    /// Call `f` for this node and then for every descendant, depth-first.
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(&str, &KeyValue),
    {
        walk_node(self, &mut f);
    }

    /// Follow a `/`-separated path of direct-child keys.
    ///
    /// An empty path returns the node itself.
    pub fn get(&self, path: &str) -> Option<&KeyValue> {
        if path.is_empty() {
            return Some(self);
        }
        let (segment, rest) = split_path(path);
        let child = self.item(segment)?;
        if rest.is_empty() {
            Some(child)
        } else {
            child.get(rest)
        }
    }
}

impl Document {
    /// Create a document from top-level nodes.
    pub fn new(entries: Vec<KeyValue>) -> Self {
        Self { entries }
    }

    /// The first top-level node, or `None` for an empty document.
    pub fn root(&self) -> Option<&KeyValue> {
        self.entries.first()
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no top-level nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the top-level nodes.
    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.entries.iter()
    }

    /// First node anywhere in the document with the given key, in document order.
    pub fn find(&self, key: &str) -> Option<&KeyValue> {
        find_in(&self.entries, key)
    }

    /// Top-level node with the given key.
    pub fn item(&self, key: &str) -> Option<&KeyValue> {
        self.entries.iter().find(|kv| kv.key == key)
    }

    /// Call `f` once for every top-level node.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &KeyValue),
    {
        for kv in &self.entries {
            f(&kv.key, kv);
        }
    }

    /// Call `f` for every node in the document, depth-first.
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(&str, &KeyValue),
    {
        for kv in &self.entries {
            walk_node(kv, &mut f);
        }
    }

    /// Follow a `/`-separated path starting at the top-level nodes.
    pub fn get(&self, path: &str) -> Option<&KeyValue> {
        if path.is_empty() {
            return None;
        }
        let (segment, rest) = split_path(path);
        let kv = self.item(segment)?;
        if rest.is_empty() { Some(kv) } else { kv.get(rest) }
    }

    /// Take the top-level nodes.
    pub fn into_entries(self) -> Vec<KeyValue> {
        self.entries
    }
}

impl From<Vec<KeyValue>> for Document {
    fn from(entries: Vec<KeyValue>) -> Self {
        Self::new(entries)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a KeyValue;
    type IntoIter = std::slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Document {
    type Item = KeyValue;
    type IntoIter = std::vec::IntoIter<KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn find_in<'a>(nodes: &'a [KeyValue], key: &str) -> Option<&'a KeyValue> {
    for kv in nodes {
        if kv.key == key {
            return Some(kv);
        }
        if let Some(found) = kv.find(key) {
            return Some(found);
        }
    }
    None
}

fn walk_node<F>(kv: &KeyValue, f: &mut F)
where
    F: FnMut(&str, &KeyValue),
{
    f(&kv.key, kv);
    for child in kv.children() {
        walk_node(child, f);
    }
}

/// Split path at the first `/`.
fn split_path(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((segment, rest)) => (segment, rest),
        None => (path, ""),
    }
}
