//! The parsed document tree.
//!
//! Nodes are immutable once the parser has built them. A node reached through
//! more than one path (because of an alias or a merge key) is shared through
//! its [`Rc`] handle rather than copied; the handle count pairs ownership
//! increments and decrements automatically at scope boundaries, so a
//! traversal can never free a shared node twice.

use std::fmt;
use std::rc::Rc;

/// Shared handle to a [`Node`]. The strong count minus one is the number of
/// additional owners beyond the node's structural parent.
pub type NodeRef<'a> = Rc<Node<'a>>;

/// A document value. String text borrows from the parse [`Arena`](crate::Arena).
pub enum Node<'a> {
    /// Insertion-ordered key-value map.
    Map(Map<'a>),
    /// Ordered list of values.
    List(Vec<NodeRef<'a>>),
    /// Text, already un-escaped if it came from a double-quoted literal.
    Str(&'a str),
    /// Double-precision number.
    Number(f64),
    /// `true` or `false`.
    Boolean(bool),
}

impl<'a> Node<'a> {
    /// Human description of the node kind, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Map(..) => "a map",
            Node::List(..) => "a list",
            Node::Str(..) => "a string",
            Node::Number(..) => "a number",
            Node::Boolean(..) => "a boolean",
        }
    }

    /// Returns the map if this is a `Map`.
    pub fn as_map(&self) -> Option<&Map<'a>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the items if this is a `List`.
    pub fn as_list(&self) -> Option<&[NodeRef<'a>]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the text if this is a `Str`.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Node::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value if this is a `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Keyed lookup on a `Map` node. Returns `None` for other kinds as well
    /// as for absent keys.
    pub fn get(&self, key: &str) -> Option<&NodeRef<'a>> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Map(map) => map.fmt(f),
            Node::List(items) => f.debug_list().entries(items).finish(),
            Node::Str(s) => fmt::Debug::fmt(s, f),
            Node::Number(n) => fmt::Display::fmt(n, f),
            Node::Boolean(b) => fmt::Display::fmt(b, f),
        }
    }
}

type MapEntry<'a> = (&'a str, NodeRef<'a>);

/// An insertion-ordered map: a flat list of key-value pairs with linear
/// lookup. Keys are not required to be unique; duplicates are retained in
/// source order and [`get`](Map::get) answers with the first match.
pub struct Map<'a> {
    entries: Vec<MapEntry<'a>>,
}

impl<'a> Map<'a> {
    /// Creates an empty map.
    #[inline]
    pub fn new() -> Self {
        Map {
            entries: Vec::new(),
        }
    }

    /// Appends a key-value pair. Does **not** check for duplicates.
    #[inline]
    pub fn insert(&mut self, key: &'a str, value: NodeRef<'a>) {
        self.entries.push((key, value));
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linear scan for a key; first match wins.
    pub fn get(&self, name: &str) -> Option<&NodeRef<'a>> {
        for (key, value) in &self.entries {
            if *key == name {
                return Some(value);
            }
        }
        None
    }

    /// Returns `true` if the map contains the key.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All entries in insertion order.
    #[inline]
    pub fn entries(&self) -> &[MapEntry<'a>] {
        &self.entries
    }

    /// Consumes the map, yielding its entries in insertion order.
    #[inline]
    pub fn into_entries(self) -> Vec<MapEntry<'a>> {
        self.entries
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &NodeRef<'a>)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl<'a> Default for Map<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Extend<MapEntry<'a>> for Map<'a> {
    fn extend<T: IntoIterator<Item = MapEntry<'a>>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl fmt::Debug for Map<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.entries {
            map.entry(k, v);
        }
        map.finish()
    }
}

#[cfg(test)]
#[path = "./node_tests.rs"]
mod tests;
