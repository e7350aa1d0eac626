//! JSON representation of trees.
//!
//! Trees cross process boundaries as JSON documents keyed by kind *name*:
//!
//! ```json
//! {
//!   "kind": "ClassDeclaration",
//!   "attrs": { "name": "FooController" },
//!   "children": [ { "kind": "Constructor", "children": [] } ]
//! }
//! ```
//!
//! `attrs` and `children` may be omitted on input and are omitted on output
//! when empty.
//!
//! Every node takes two JSON nesting levels, so decoding runs without
//! serde_json's recursion limit. Depth is bounded by the tree alone, the same
//! as for encoding and traversal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CodecError;
use crate::kind::KindTable;
use crate::node::{Attrs, Node, NodeRef};

#[derive(Debug, Serialize, Deserialize)]
struct NodeRepr {
    kind: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeRepr>,
}

/// Decode a tree from JSON text.
pub fn decode(json: &str, kinds: &KindTable) -> Result<NodeRef, CodecError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let repr = NodeRepr::deserialize(&mut deserializer)?;
    deserializer.end()?;
    from_repr(repr, kinds)
}

/// Decode a tree from a parsed JSON value.
pub fn decode_value(value: Value, kinds: &KindTable) -> Result<NodeRef, CodecError> {
    let repr: NodeRepr = serde_json::from_value(value)?;
    from_repr(repr, kinds)
}

/// Encode a tree as pretty-printed JSON text.
pub fn encode(node: &Node, kinds: &KindTable) -> Result<String, CodecError> {
    let repr = to_repr(node, kinds)?;
    Ok(serde_json::to_string_pretty(&repr)?)
}

/// Encode a tree as a JSON value.
pub fn encode_value(node: &Node, kinds: &KindTable) -> Result<Value, CodecError> {
    let repr = to_repr(node, kinds)?;
    Ok(serde_json::to_value(&repr)?)
}

fn from_repr(repr: NodeRepr, kinds: &KindTable) -> Result<NodeRef, CodecError> {
    let kind = kinds
        .kind_of(&repr.kind)
        .ok_or(CodecError::UnknownKind { name: repr.kind })?;
    let children = repr
        .children
        .into_iter()
        .map(|child| from_repr(child, kinds))
        .collect::<Result<Vec<_>, _>>()?;
    let mut node = Node::new(kind).with_children(children);
    for (key, value) in repr.attrs {
        node = node.with_attr(key, value);
    }
    Ok(node.into_ref())
}

fn to_repr(node: &Node, kinds: &KindTable) -> Result<NodeRepr, CodecError> {
    let kind = kinds
        .name_of(node.kind())
        .ok_or(CodecError::UnknownCode {
            code: node.kind().code(),
        })?;
    let children = node
        .children()
        .iter()
        .map(|child| to_repr(child, kinds))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NodeRepr {
        kind: kind.to_string(),
        attrs: node.attrs().clone(),
        children,
    })
}
