//! Named collections of output trees.
//!
//! A pass that turns one input into several artifacts (a source file plus
//! generated companions) returns a bundle node: a node of the `Bundle` kind
//! whose children are the individual trees. [`Bundle`] is the owned view of
//! such a node, with each tree named by its `fileName` attribute.

use std::rc::Rc;

use crate::kind::Kind;
use crate::node::{Node, NodeRef};

/// Attribute naming the file a tree belongs to.
pub const FILE_NAME_ATTR: &str = "fileName";

/// Named output trees, in production order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    entries: Vec<(String, NodeRef)>,
}

impl Bundle {
    pub fn new() -> Self {
        Bundle::default()
    }

    /// View a bundle node's children as named trees.
    ///
    /// Children of the bundle node's own kind are bundles produced by an
    /// earlier pass and are flattened in place, at any depth.
    pub fn from_node(node: &Node) -> Self {
        let mut bundle = Bundle::new();
        bundle.extend_from(node, node.kind());
        bundle
    }

    fn extend_from(&mut self, node: &Node, bundle_kind: Kind) {
        for child in node.children() {
            if child.is(bundle_kind) {
                self.extend_from(child, bundle_kind);
            } else {
                self.push_tree(Rc::clone(child));
            }
        }
    }

    /// A bundle holding a single tree.
    pub fn single(tree: NodeRef) -> Self {
        let mut bundle = Bundle::new();
        bundle.push_tree(tree);
        bundle
    }

    /// Add a tree under an explicit name.
    pub fn push(&mut self, name: impl Into<String>, tree: NodeRef) {
        self.entries.push((name.into(), tree));
    }

    /// Add a tree named by its `fileName` attribute, or `output-<index>`.
    pub fn push_tree(&mut self, tree: NodeRef) {
        let name = match tree.attr_str(FILE_NAME_ATTR) {
            Some(name) => name.to_string(),
            None => format!("output-{}", self.entries.len()),
        };
        self.entries.push((name, tree));
    }

    /// First tree, which is the rewritten input by convention.
    pub fn primary(&self) -> Option<&NodeRef> {
        self.entries.first().map(|(_, tree)| tree)
    }

    pub fn get(&self, name: &str) -> Option<&NodeRef> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, tree)| tree)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeRef)> {
        self.entries.iter().map(|(name, tree)| (name.as_str(), tree))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the bundle node for this bundle.
    pub fn into_node(self, bundle_kind: Kind) -> NodeRef {
        Node::new(bundle_kind)
            .with_children(self.entries.into_iter().map(|(_, tree)| tree))
            .into_ref()
    }
}

impl IntoIterator for Bundle {
    type Item = (String, NodeRef);
    type IntoIter = std::vec::IntoIter<(String, NodeRef)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::same;

    const FILE: Kind = Kind::new(265);
    const BUNDLE: Kind = Kind::new(266);

    fn file(name: &str) -> NodeRef {
        Node::new(FILE).with_attr(FILE_NAME_ATTR, name).into_ref()
    }

    #[test]
    fn names_come_from_file_name_attr() {
        let node = Node::new(BUNDLE)
            .with_child(file("foo.service.ts"))
            .with_child(Node::new(FILE).into_ref())
            .with_child(file("foo.mock.ts"));
        let bundle = Bundle::from_node(&node);
        let names: Vec<&str> = bundle.names().collect();
        assert_eq!(names, ["foo.service.ts", "output-1", "foo.mock.ts"]);
        assert_eq!(
            bundle.primary().unwrap().attr_str(FILE_NAME_ATTR),
            Some("foo.service.ts")
        );
    }

    #[test]
    fn trees_are_shared_with_the_node() {
        let tree = file("a.ts");
        let node = Node::new(BUNDLE).with_child(tree.clone());
        let bundle = Bundle::from_node(&node);
        assert!(same(bundle.get("a.ts").unwrap(), &tree));
        assert!(bundle.get("b.ts").is_none());
    }

    #[test]
    fn into_node_keeps_order() {
        let mut bundle = Bundle::single(file("a.ts"));
        bundle.push("b.ts", file("b.ts"));
        let node = bundle.into_node(BUNDLE);
        assert_eq!(node.kind(), BUNDLE);
        assert_eq!(node.children()[1].attr_str(FILE_NAME_ATTR), Some("b.ts"));
    }

    #[test]
    fn nested_bundles_are_flattened() {
        let inner = Node::new(BUNDLE)
            .with_child(file("a.ts"))
            .with_child(Node::new(BUNDLE).with_child(file("a.mock.ts")).into_ref())
            .into_ref();
        let node = Node::new(BUNDLE).with_child(inner).with_child(file("b.mock.ts"));
        let bundle = Bundle::from_node(&node);
        let names: Vec<&str> = bundle.names().collect();
        assert_eq!(names, ["a.ts", "a.mock.ts", "b.mock.ts"]);
        assert_eq!(
            bundle.primary().unwrap().attr_str(FILE_NAME_ATTR),
            Some("a.ts")
        );
    }

    #[test]
    fn empty_bundle_has_no_primary() {
        let bundle = Bundle::from_node(&Node::new(BUNDLE));
        assert!(bundle.is_empty());
        assert!(bundle.primary().is_none());
    }
}
