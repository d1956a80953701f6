//! Typed projection of parsed trees.
//!
//! Callers pull named fields out of a `Map` node through a [`MapHelper`] and
//! convert them with [`FromNode`] implementations, instead of re-walking the
//! tree by hand. Nodes are shared and immutable, so projection borrows; it
//! never consumes the tree.

use std::rc::Rc;

use crate::error::{Error, ErrorKind, Span};
use crate::node::{Map, Node, NodeRef};

/// Conversion from a document node into a concrete value.
pub trait FromNode<'a>: Sized {
    /// Converts the node, failing with [`ErrorKind::WrongType`] on a kind
    /// mismatch.
    fn from_node(node: &NodeRef<'a>) -> Result<Self, Error>;
}

fn wrong_type(expected: &'static str, found: &Node<'_>) -> Error {
    Error {
        kind: ErrorKind::WrongType {
            expected,
            found: found.type_name(),
        },
        span: Span::default(),
        line_info: None,
    }
}

impl<'a> FromNode<'a> for bool {
    fn from_node(node: &NodeRef<'a>) -> Result<Self, Error> {
        node.as_bool().ok_or_else(|| wrong_type("a boolean", node))
    }
}

impl<'a> FromNode<'a> for f64 {
    fn from_node(node: &NodeRef<'a>) -> Result<Self, Error> {
        node.as_number().ok_or_else(|| wrong_type("a number", node))
    }
}

impl<'a> FromNode<'a> for &'a str {
    fn from_node(node: &NodeRef<'a>) -> Result<Self, Error> {
        node.as_str().ok_or_else(|| wrong_type("a string", node))
    }
}

impl<'a> FromNode<'a> for String {
    fn from_node(node: &NodeRef<'a>) -> Result<Self, Error> {
        match node.as_str() {
            Some(s) => Ok(s.to_owned()),
            None => Err(wrong_type("a string", node)),
        }
    }
}

impl<'a, T: FromNode<'a>> FromNode<'a> for Vec<T> {
    fn from_node(node: &NodeRef<'a>) -> Result<Self, Error> {
        let items = match node.as_list() {
            Some(items) => items,
            None => return Err(wrong_type("a list", node)),
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(T::from_node(item)?);
        }
        Ok(out)
    }
}

impl<'a> FromNode<'a> for NodeRef<'a> {
    fn from_node(node: &NodeRef<'a>) -> Result<Self, Error> {
        Ok(Rc::clone(node))
    }
}

/// A helper for projecting the fields of a `Map` node.
pub struct MapHelper<'n, 'a> {
    map: &'n Map<'a>,
}

impl std::fmt::Debug for MapHelper<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapHelper").finish_non_exhaustive()
    }
}

impl<'n, 'a> MapHelper<'n, 'a> {
    /// Creates a helper for the node, failing if it is not a map.
    pub fn new(node: &'n NodeRef<'a>) -> Result<Self, Error> {
        match node.as_map() {
            Some(map) => Ok(Self { map }),
            None => Err(wrong_type("a map", node)),
        }
    }

    /// Wraps an already-unwrapped map.
    pub fn from_map(map: &'n Map<'a>) -> Self {
        Self { map }
    }

    /// Returns true if the map contains the key.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Projects a field that must be present.
    pub fn required<T: FromNode<'a>>(&self, name: &'static str) -> Result<T, Error> {
        match self.map.get(name) {
            Some(node) => T::from_node(node),
            None => Err(Error {
                kind: ErrorKind::MissingField(name),
                span: Span::default(),
                line_info: None,
            }),
        }
    }

    /// Projects a field if present; an absent key is `None`, a present key of
    /// the wrong kind is still an error.
    pub fn optional<T: FromNode<'a>>(&self, name: &'static str) -> Result<Option<T>, Error> {
        match self.map.get(name) {
            Some(node) => T::from_node(node).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "./de_tests.rs"]
mod tests;
