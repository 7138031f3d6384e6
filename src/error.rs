use crate::descriptor::{FileKind, NodeType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BymlError {
    #[error("unrecognized magic signature {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("node type {node_type:?} is not allowed in {kind:?} files")]
    DisallowedNodeType { kind: FileKind, node_type: NodeType },

    #[error("unknown node type byte {value:#04x} at offset {offset:#x}")]
    UnknownNodeType { offset: usize, value: u8 },

    #[error("expected {expected:?} node at offset {offset:#x}, found {found:?}")]
    UnexpectedNodeType {
        offset: usize,
        expected: NodeType,
        found: NodeType,
    },

    #[error("{node_type:?} node at offset {offset:#x} may only appear at the top level")]
    NestedTableNode { offset: usize, node_type: NodeType },

    #[error("invalid boolean encoding {value:#x} at offset {offset:#x} (must be 0 or 1)")]
    InvalidBool { offset: usize, value: u32 },

    #[error("string {value:?} missing from the {table} string table")]
    MissingStringTableEntry { table: &'static str, value: String },

    #[error("index {index} out of range for the {table} table of {len} entries")]
    InvalidTableIndex {
        table: &'static str,
        index: u32,
        len: usize,
    },

    #[error("out of range access at offset {offset:#x} (need {need} bytes, have {have})")]
    OutOfRange {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidString {
        offset: usize,
        source: std::str::Utf8Error,
    },

    #[error("value of type {node_type:?} has no writer encoding")]
    UnsupportedValueType { node_type: NodeType },

    #[error("root value must be a dictionary")]
    RootNotDictionary,

    #[error("complex node payload at offset {offset:#x} is not 4-byte aligned")]
    MisalignedPayload { offset: usize },
}

pub type Result<T> = std::result::Result<T, BymlError>;
