//! Immutable tree nodes.
//!
//! A [`Node`] is a kind tag, an opaque attribute map and an ordered list of
//! children. Nodes are shared through [`NodeRef`] (`Rc<Node>`) and never
//! mutated once built: a rewrite either hands back the node it was given or
//! builds new nodes, so subtrees that nothing touched stay shared between a
//! traversal's input and output.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::kind::Kind;

/// Shared handle to an immutable node.
pub type NodeRef = Rc<Node>;

/// Node attributes. Opaque to the engine.
pub type Attrs = Map<String, Value>;

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: Kind,
    attrs: Attrs,
    children: Vec<NodeRef>,
}

impl Node {
    /// Create a leaf node with no attributes.
    pub fn new(kind: Kind) -> Self {
        Node {
            kind,
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: NodeRef) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = NodeRef>,
    {
        self.children.extend(children);
        self
    }

    /// Copy of this node's kind and attributes over a new child list.
    pub fn rebuilt(&self, children: Vec<NodeRef>) -> Self {
        Node {
            kind: self.kind,
            attrs: self.attrs.clone(),
            children,
        }
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> NodeRef {
        Rc::new(self)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is(&self, kind: Kind) -> bool {
        self.kind == kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// String attribute, if present and a string.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&NodeRef> {
        self.children.get(index)
    }

    /// First direct child of the given kind.
    pub fn first_child_of(&self, kind: Kind) -> Option<&NodeRef> {
        self.children.iter().find(|child| child.is(kind))
    }

    /// Direct children of the given kind, in order.
    pub fn children_of(&self, kind: Kind) -> impl Iterator<Item = &NodeRef> {
        self.children.iter().filter(move |child| child.is(kind))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|child| child.count()).sum::<usize>()
    }
}

/// Returns true if both handles point at the same node.
pub fn same(a: &NodeRef, b: &NodeRef) -> bool {
    Rc::ptr_eq(a, b)
}
