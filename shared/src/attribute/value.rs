use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::ASSET_REF_MARKER;

/// Attribute bag of an entity, or a structured attribute value.
/// Insertion ordered so iteration is identical on every replica.
pub type AttributeMap = IndexMap<String, Value>;

// Vec3
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Quaternion
/// Replicated as `[x, y, z, w]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from([x, y, z, w]: [f64; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> Self {
        [q.x, q.y, q.z, q.w]
    }
}

// Value
/// A replication-safe attribute value.
///
/// Holds no render-node ownership and cannot form cycles: anything a
/// render host hands over goes through
/// [`AttributeFilter::normalize`](crate::AttributeFilter::normalize) first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(f64),
    Text(String),
    Bool(bool),
    /// Atomic: replaced wholesale by merge, never merged per component
    Vec3(Vec3),
    /// Atomic: replaced wholesale by merge, never merged per component
    Quaternion(Quaternion),
    /// Replaced wholesale by merge
    List(Vec<Value>),
    /// Deep-merged key by key
    Map(AttributeMap),
    /// Reference to another node or asset, as `#<id>`
    AssetRef(String),
}

impl Value {
    pub fn empty_map() -> Self {
        Value::Map(AttributeMap::new())
    }

    /// Reference to the render node or asset with the given id
    pub fn asset_ref(id: &str) -> Self {
        Value::AssetRef(format!("{}{}", ASSET_REF_MARKER, id))
    }

    /// True if every number reachable from this value is finite
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Scalar(number) => number.is_finite(),
            Value::Vec3(vector) => vector.is_finite(),
            Value::Quaternion(quaternion) => quaternion.is_finite(),
            Value::List(items) => items.iter().all(Value::is_finite),
            Value::Map(map) => map.values().all(Value::is_finite),
            Value::Text(_) | Value::Bool(_) | Value::AssetRef(_) => true,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Vec3(_) => "vec3",
            Value::Quaternion(_) => "quaternion",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::AssetRef(_) => "asset-ref",
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Value::Vec3(vector) => Some(*vector),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(number) => Some(*number),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec3> for Value {
    fn from(value: Vec3) -> Self {
        Value::Vec3(value)
    }
}

impl From<Quaternion> for Value {
    fn from(value: Quaternion) -> Self {
        Value::Quaternion(value)
    }
}

impl From<AttributeMap> for Value {
    fn from(value: AttributeMap) -> Self {
        Value::Map(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}
