use log::{debug, warn};

use crate::{
    constants::{MAX_NORMALIZE_DEPTH, SYNCABLE_ATTRIBUTES},
    error::FilterError,
};

use super::{
    host_value::{HostNode, HostRef, HostValue},
    value::{AttributeMap, Value},
};

/// Decides which attributes replicate and turns host values into
/// replication-safe [`Value`]s.
///
/// Avatars replicate only their allow-list; ordinary entities replicate
/// every attribute. Apart from logging, filtering is a pure function.
#[derive(Clone, Debug)]
pub struct AttributeFilter {
    avatar_allow_list: Vec<String>,
    max_depth: usize,
}

impl AttributeFilter {
    pub fn new(avatar_allow_list: Vec<String>) -> Self {
        Self {
            avatar_allow_list,
            max_depth: MAX_NORMALIZE_DEPTH,
        }
    }

    pub fn is_syncable(&self, is_avatar: bool, attribute: &str) -> bool {
        !is_avatar || self.avatar_allow_list.iter().any(|allowed| allowed == attribute)
    }

    /// Recursively copies `value` into replication-safe form.
    ///
    /// * node references become `#<id>` asset references
    /// * functions and opaque host objects are dropped from their parent
    /// * a member that appears in its own ancestry is omitted
    ///
    /// Fails if the root itself has no replicated form, is non-finite, or
    /// nests deeper than the configured limit.
    pub fn normalize(&self, value: &HostValue) -> Result<Value, FilterError> {
        let root = Ancestry {
            node: value.root(),
            depth: 1,
            parent: None,
        };
        self.normalize_node(value, &root)
    }

    /// Filter and normalize one attribute
    pub fn try_filter(
        &self,
        is_avatar: bool,
        attribute: &str,
        value: &HostValue,
    ) -> Result<Value, FilterError> {
        if !self.is_syncable(is_avatar, attribute) {
            return Err(FilterError::NotSyncable {
                attribute: attribute.to_string(),
            });
        }
        self.normalize(value)
    }

    /// Like [`try_filter`](Self::try_filter) but logs and swallows the failure
    pub fn filter(&self, is_avatar: bool, attribute: &str, value: &HostValue) -> Option<Value> {
        match self.try_filter(is_avatar, attribute, value) {
            Ok(value) => Some(value),
            Err(FilterError::NotSyncable { .. }) => {
                debug!("AttributeFilter: not syncing non-syncable attribute {}", attribute);
                None
            }
            Err(err) => {
                warn!("AttributeFilter: dropping attribute {}: {}", attribute, err);
                None
            }
        }
    }

    /// Filters a full attribute set, keeping only what may replicate
    pub fn filter_all(
        &self,
        is_avatar: bool,
        attributes: impl IntoIterator<Item = (String, HostValue)>,
    ) -> AttributeMap {
        let mut output = AttributeMap::new();
        for (attribute, value) in attributes {
            if let Some(value) = self.filter(is_avatar, &attribute, &value) {
                output.insert(attribute, value);
            }
        }
        output
    }

    fn normalize_node(&self, value: &HostValue, ancestry: &Ancestry) -> Result<Value, FilterError> {
        if ancestry.depth > self.max_depth {
            return Err(FilterError::TooDeep {
                max_depth: self.max_depth,
            });
        }
        let Some(node) = value.node(ancestry.node) else {
            return Err(FilterError::NonSerializable { kind: "dangling" });
        };

        match node {
            HostNode::Number(number) => {
                if number.is_finite() {
                    Ok(Value::Scalar(*number))
                } else {
                    Err(FilterError::NonFinite)
                }
            }
            HostNode::Text(text) => Ok(Value::Text(text.clone())),
            HostNode::Bool(flag) => Ok(Value::Bool(*flag)),
            HostNode::Vec3(vector) => {
                if vector.is_finite() {
                    Ok(Value::Vec3(*vector))
                } else {
                    Err(FilterError::NonFinite)
                }
            }
            HostNode::Quaternion(quaternion) => {
                if quaternion.is_finite() {
                    Ok(Value::Quaternion(*quaternion))
                } else {
                    Err(FilterError::NonFinite)
                }
            }
            HostNode::NodeRef(id) => Ok(Value::asset_ref(id)),
            HostNode::Function | HostNode::Opaque => Err(FilterError::NonSerializable {
                kind: node.kind_name(),
            }),
            HostNode::List(children) => {
                let mut items = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(item) = self.normalize_child(value, ancestry, *child, "[]")? {
                        items.push(item);
                    }
                }
                Ok(Value::List(items))
            }
            HostNode::Map(members) => {
                let mut map = AttributeMap::new();
                for (key, child) in members {
                    if let Some(item) = self.normalize_child(value, ancestry, *child, key)? {
                        map.insert(key.clone(), item);
                    }
                }
                Ok(Value::Map(map))
            }
        }
    }

    // Ok(None) means the member is omitted from its parent
    fn normalize_child(
        &self,
        value: &HostValue,
        ancestry: &Ancestry,
        child: HostRef,
        key: &str,
    ) -> Result<Option<Value>, FilterError> {
        if ancestry.contains(child) {
            debug!("AttributeFilter: omitting cyclic member {}", key);
            return Ok(None);
        }
        let link = Ancestry {
            node: child,
            depth: ancestry.depth + 1,
            parent: Some(ancestry),
        };
        match self.normalize_node(value, &link) {
            Ok(item) => Ok(Some(item)),
            Err(err @ FilterError::TooDeep { .. }) => Err(err),
            Err(err) => {
                debug!("AttributeFilter: omitting member {}: {}", key, err);
                Ok(None)
            }
        }
    }
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self::new(SYNCABLE_ATTRIBUTES.iter().map(|name| name.to_string()).collect())
    }
}

// Chain of arena indices from the root down to the node being copied
struct Ancestry<'a> {
    node: HostRef,
    depth: usize,
    parent: Option<&'a Ancestry<'a>>,
}

impl Ancestry<'_> {
    fn contains(&self, node: HostRef) -> bool {
        let mut link = Some(self);
        while let Some(current) = link {
            if current.node == node {
                return true;
            }
            link = current.parent;
        }
        false
    }
}
