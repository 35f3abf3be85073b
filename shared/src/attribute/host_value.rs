use crate::constants::ASSET_REF_MARKER;

use super::value::{Quaternion, Value, Vec3};

/// Arena index of a [`HostNode`]. Two members pointing at the same index
/// share structure; a member pointing at one of its ancestors is a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HostRef(usize);

impl HostRef {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One node of a value graph as a render host hands it over, before
/// normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum HostNode {
    Number(f64),
    Text(String),
    Bool(bool),
    Vec3(Vec3),
    Quaternion(Quaternion),
    List(Vec<HostRef>),
    Map(Vec<(String, HostRef)>),
    /// Live reference to a render node or asset element, by id
    NodeRef(String),
    /// Callable member
    Function,
    /// Any other host object with no replicated form
    Opaque,
}

impl HostNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostNode::Number(_) => "number",
            HostNode::Text(_) => "text",
            HostNode::Bool(_) => "bool",
            HostNode::Vec3(_) => "vec3",
            HostNode::Quaternion(_) => "quaternion",
            HostNode::List(_) => "list",
            HostNode::Map(_) => "map",
            HostNode::NodeRef(_) => "node-ref",
            HostNode::Function => "function",
            HostNode::Opaque => "opaque",
        }
    }
}

/// A possibly cyclic value graph read from a render host.
#[derive(Clone, Debug, PartialEq)]
pub struct HostValue {
    arena: Vec<HostNode>,
    root: HostRef,
}

impl HostValue {
    /// Single-node value
    pub fn leaf(node: HostNode) -> Self {
        Self {
            arena: vec![node],
            root: HostRef(0),
        }
    }

    /// Tree-shaped host value mirroring an already replication-safe value
    pub fn from_value(value: &Value) -> Self {
        let mut builder = HostValueBuilder::new();
        let root = builder.push_value(value);
        builder.build(root)
    }

    pub fn root(&self) -> HostRef {
        self.root
    }

    pub fn node(&self, node_ref: HostRef) -> Option<&HostNode> {
        self.arena.get(node_ref.0)
    }

    pub fn root_node(&self) -> Option<&HostNode> {
        self.node(self.root)
    }
}

/// Builds a [`HostValue`] arena. Nodes may be filled in after being
/// referenced, which is how cyclic graphs are expressed.
pub struct HostValueBuilder {
    arena: Vec<HostNode>,
}

impl HostValueBuilder {
    pub fn new() -> Self {
        Self { arena: Vec::new() }
    }

    pub fn push(&mut self, node: HostNode) -> HostRef {
        self.arena.push(node);
        HostRef(self.arena.len() - 1)
    }

    /// Replaces the node at `node_ref`. Returns false if the index is out of range.
    pub fn set(&mut self, node_ref: HostRef, node: HostNode) -> bool {
        match self.arena.get_mut(node_ref.0) {
            Some(slot) => {
                *slot = node;
                true
            }
            None => false,
        }
    }

    pub fn push_value(&mut self, value: &Value) -> HostRef {
        let node = match value {
            Value::Scalar(number) => HostNode::Number(*number),
            Value::Text(text) => HostNode::Text(text.clone()),
            Value::Bool(flag) => HostNode::Bool(*flag),
            Value::Vec3(vector) => HostNode::Vec3(*vector),
            Value::Quaternion(quaternion) => HostNode::Quaternion(*quaternion),
            Value::AssetRef(reference) => HostNode::NodeRef(
                reference
                    .strip_prefix(ASSET_REF_MARKER)
                    .unwrap_or(reference)
                    .to_string(),
            ),
            Value::List(items) => {
                let children = items.iter().map(|item| self.push_value(item)).collect();
                HostNode::List(children)
            }
            Value::Map(map) => {
                let members = map
                    .iter()
                    .map(|(key, item)| (key.clone(), self.push_value(item)))
                    .collect();
                HostNode::Map(members)
            }
        };
        self.push(node)
    }

    pub fn build(self, root: HostRef) -> HostValue {
        HostValue {
            arena: self.arena,
            root,
        }
    }
}

impl Default for HostValueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        HostValue::from_value(&value)
    }
}
