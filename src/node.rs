//! The tagged node tree shared by parser and writer.

use crate::descriptor::NodeType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One sample of a 3D path: position, normal, and an auxiliary scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub px: f32,
    pub py: f32,
    pub pz: f32,
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
    pub arg: f32,
}

/// A decoded BYML/CRG1 value.
///
/// `StringTable` and `PathTable` are on-disk artifacts only; they are
/// consumed during parsing and never appear as values in a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i32),
    UInt(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Float64(f64),
    String(String),
    Path(Vec<PathPoint>),
    Array(Vec<Node>),
    Dictionary(BTreeMap<String, Node>),
    Binary(Vec<u8>),
    FloatArray(Vec<f32>),
}

impl Node {
    /// The on-disk type code this value serializes as.
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Null => NodeType::Null,
            Node::Bool(_) => NodeType::Bool,
            Node::Int(_) => NodeType::Int,
            Node::UInt(_) => NodeType::UInt,
            Node::Int64(_) => NodeType::Int64,
            Node::UInt64(_) => NodeType::UInt64,
            Node::Float(_) => NodeType::Float,
            Node::Float64(_) => NodeType::Float64,
            Node::String(_) => NodeType::String,
            Node::Path(_) => NodeType::Path,
            Node::Array(_) => NodeType::Array,
            Node::Dictionary(_) => NodeType::Dictionary,
            Node::Binary(_) => NodeType::BinaryData,
            Node::FloatArray(_) => NodeType::FloatArray,
        }
    }

    /// An empty dictionary, the decoded form of a file with no root node.
    pub fn empty_dict() -> Self {
        Node::Dictionary(BTreeMap::new())
    }

    /// Look up a dictionary entry. `None` for missing keys and non-dictionary
    /// nodes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Dictionary(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Node::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Node::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Node::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Node::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Dictionary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Node::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Node::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&[PathPoint]> {
        match self {
            Node::Path(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Int(v)
    }
}

impl From<u32> for Node {
    fn from(v: u32) -> Self {
        Node::UInt(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int64(v)
    }
}

impl From<u64> for Node {
    fn from(v: u64) -> Self {
        Node::UInt64(v)
    }
}

impl From<f32> for Node {
    fn from(v: f32) -> Self {
        Node::Float(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float64(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

impl From<Vec<Node>> for Node {
    fn from(v: Vec<Node>) -> Self {
        Node::Array(v)
    }
}

impl From<BTreeMap<String, Node>> for Node {
    fn from(v: BTreeMap<String, Node>) -> Self {
        Node::Dictionary(v)
    }
}

impl From<Vec<u8>> for Node {
    fn from(v: Vec<u8>) -> Self {
        Node::Binary(v)
    }
}

impl From<Vec<f32>> for Node {
    fn from(v: Vec<f32>) -> Self {
        Node::FloatArray(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        let mut map = BTreeMap::new();
        map.insert("count".to_string(), Node::from(7));
        map.insert("name".to_string(), Node::from("door"));
        let dict = Node::Dictionary(map);

        assert_eq!(dict.get("count").and_then(Node::as_i32), Some(7));
        assert_eq!(dict.get("name").and_then(Node::as_str), Some("door"));
        assert_eq!(dict.get("missing"), None);
        assert_eq!(dict.as_str(), None);
        assert_eq!(dict.node_type(), NodeType::Dictionary);
    }

    #[test]
    fn conversions_pick_expected_variant() {
        assert_eq!(Node::from(1i32).node_type(), NodeType::Int);
        assert_eq!(Node::from(1u32).node_type(), NodeType::UInt);
        assert_eq!(Node::from(1.0f32).node_type(), NodeType::Float);
        assert_eq!(Node::from(vec![1.0f32]).node_type(), NodeType::FloatArray);
        assert_eq!(Node::from(vec![1u8]).node_type(), NodeType::BinaryData);
        assert_eq!(
            Node::from(vec![Node::Null]).node_type(),
            NodeType::Array
        );
    }
}
