//! Offset-resolution recursive descent over an immutable input buffer.
//!
//! Parsing is a single pass: resolve the magic and endianness, decode the
//! shared string/path tables, then walk the node graph from the root offset.
//! Any structural violation aborts immediately; no partial tree is returned.

use crate::buffer::{BufferView, Endianness};
use crate::descriptor::{endianness_of_magic, FileKind, NodeType};
use crate::error::{BymlError, Result};
use crate::node::{Node, PathPoint};
use crate::{path_table, string_table};
use std::collections::BTreeMap;
use tracing::debug;

/// Per-parse configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Whether the header carries a path-table offset field at 0x0C,
    /// shifting the root offset to 0x10.
    pub has_path_table: bool,
}

/// Read-only state shared by the recursive decoders.
struct ParseContext {
    kind: FileKind,
    endian: Endianness,
    key_table: Option<Vec<String>>,
    value_table: Option<Vec<String>>,
    path_table: Option<Vec<Vec<PathPoint>>>,
}

impl ParseContext {
    fn key_string(&self, index: u32) -> Result<&str> {
        lookup_string(self.key_table.as_deref(), index, "key")
    }

    fn value_string(&self, index: u32) -> Result<&str> {
        lookup_string(self.value_table.as_deref(), index, "value")
    }

    fn path(&self, index: u32) -> Result<&[PathPoint]> {
        let table = self.path_table.as_deref().unwrap_or(&[]);
        table
            .get(index as usize)
            .map(Vec::as_slice)
            .ok_or(BymlError::InvalidTableIndex {
                table: "path",
                index,
                len: table.len(),
            })
    }
}

fn lookup_string<'a>(
    table: Option<&'a [String]>,
    index: u32,
    label: &'static str,
) -> Result<&'a str> {
    let table = table.unwrap_or(&[]);
    table
        .get(index as usize)
        .map(String::as_str)
        .ok_or(BymlError::InvalidTableIndex {
            table: label,
            index,
            len: table.len(),
        })
}

/// Parse a BYML/CRG1 buffer into its node tree.
pub fn parse(data: &[u8], kind: FileKind) -> Result<Node> {
    parse_with_options(data, kind, ParseOptions::default())
}

pub fn parse_with_options(data: &[u8], kind: FileKind, options: ParseOptions) -> Result<Node> {
    let view = BufferView::new(data);

    let magic_bytes = view.bytes_at(0, 4)?;
    let magic = [magic_bytes[0], magic_bytes[1], magic_bytes[2], magic_bytes[3]];
    if !kind.accepts_magic(&magic) {
        return Err(BymlError::BadMagic { found: magic });
    }
    let endian = endianness_of_magic(&magic);

    let key_table_offset = view.u32_at(0x04, endian)? as usize;
    let value_table_offset = view.u32_at(0x08, endian)? as usize;
    let (path_table_offset, root_field) = if options.has_path_table {
        (view.u32_at(0x0C, endian)? as usize, 0x10)
    } else {
        (0, 0x0C)
    };
    let root_offset = view.u32_at(root_field, endian)? as usize;

    debug!(
        ?kind,
        ?endian,
        key_table_offset,
        value_table_offset,
        path_table_offset,
        root_offset,
        "parsing buffer of {} bytes",
        data.len()
    );

    if root_offset == 0 {
        return Ok(Node::empty_dict());
    }

    let context = ParseContext {
        kind,
        endian,
        key_table: (key_table_offset != 0)
            .then(|| string_table::decode(&view, key_table_offset, endian))
            .transpose()?,
        value_table: (value_table_offset != 0)
            .then(|| string_table::decode(&view, value_table_offset, endian))
            .transpose()?,
        path_table: (path_table_offset != 0)
            .then(|| path_table::decode(&view, path_table_offset, endian))
            .transpose()?,
    };

    parse_complex(&context, &view, root_offset, None)
}

/// Read and gate a type byte against the active file descriptor.
fn read_type(context: &ParseContext, view: &BufferView, offset: usize) -> Result<NodeType> {
    let value = view.u8_at(offset)?;
    let node_type = NodeType::from_u8(value).ok_or(BymlError::UnknownNodeType { offset, value })?;
    if !context.kind.allows(node_type) {
        return Err(BymlError::DisallowedNodeType {
            kind: context.kind,
            node_type,
        });
    }
    Ok(node_type)
}

fn align4(value: usize) -> usize {
    (value + 3) & !3
}

/// Decode the complex node at an absolute offset: one type byte, a 24-bit
/// count, then the kind-specific payload.
fn parse_complex(
    context: &ParseContext,
    view: &BufferView,
    offset: usize,
    expected: Option<NodeType>,
) -> Result<Node> {
    let node_type = read_type(context, view, offset)?;
    let count = view.u24_at(offset + 1, context.endian)? as usize;

    if let Some(expected) = expected {
        if expected != node_type {
            return Err(BymlError::UnexpectedNodeType {
                offset,
                expected,
                found: node_type,
            });
        }
    }

    match node_type {
        NodeType::Dictionary => {
            let mut map = BTreeMap::new();
            let mut entry = offset + 4;
            for _ in 0..count {
                let key_index = view.u24_at(entry, context.endian)?;
                let key = context.key_string(key_index)?.to_string();
                let entry_type = read_type(context, view, entry + 3)?;
                let value = parse_inline(context, view, entry_type, entry + 4)?;
                map.insert(key, value);
                entry += 8;
            }
            Ok(Node::Dictionary(map))
        }
        NodeType::Array => {
            let mut items = Vec::with_capacity(count);
            let mut type_at = offset + 4;
            let mut slot = align4(offset + 4 + count);
            for _ in 0..count {
                let entry_type = read_type(context, view, type_at)?;
                items.push(parse_inline(context, view, entry_type, slot)?);
                type_at += 1;
                slot += 4;
            }
            Ok(Node::Array(items))
        }
        NodeType::BinaryData => {
            // Counts at the sentinel carry the excess in an extra u32.
            if count == 0x00FF_FFFF {
                let extra = view.u32_at(offset + 4, context.endian)? as usize;
                Ok(Node::Binary(view.bytes_at(offset + 8, count + extra)?.to_vec()))
            } else {
                Ok(Node::Binary(view.bytes_at(offset + 4, count)?.to_vec()))
            }
        }
        NodeType::FloatArray => {
            let mut values = Vec::with_capacity(count);
            for i in 0..count {
                values.push(view.f32_at(offset + 4 + 4 * i, context.endian)?);
            }
            Ok(Node::FloatArray(values))
        }
        NodeType::StringTable | NodeType::PathTable => {
            Err(BymlError::NestedTableNode { offset, node_type })
        }
        found => Err(BymlError::UnexpectedNodeType {
            offset,
            expected: NodeType::Dictionary,
            found,
        }),
    }
}

/// Decode an inline node from its 4-byte value slot (or, for 64-bit
/// scalars, the full 8-byte field at the entry's value position).
fn parse_inline(
    context: &ParseContext,
    view: &BufferView,
    node_type: NodeType,
    slot: usize,
) -> Result<Node> {
    let endian = context.endian;
    match node_type {
        NodeType::Dictionary | NodeType::Array | NodeType::BinaryData | NodeType::FloatArray => {
            let offset = view.u32_at(slot, endian)? as usize;
            parse_complex(context, view, offset, Some(node_type))
        }
        NodeType::StringTable | NodeType::PathTable => Err(BymlError::NestedTableNode {
            offset: slot,
            node_type,
        }),
        NodeType::String => {
            let index = view.u32_at(slot, endian)?;
            Ok(Node::String(context.value_string(index)?.to_string()))
        }
        NodeType::Path => {
            let index = view.u32_at(slot, endian)?;
            Ok(Node::Path(context.path(index)?.to_vec()))
        }
        NodeType::Bool => {
            let value = view.u32_at(slot, endian)?;
            if value > 1 {
                return Err(BymlError::InvalidBool {
                    offset: slot,
                    value,
                });
            }
            Ok(Node::Bool(value == 1))
        }
        NodeType::Int => Ok(Node::Int(view.i32_at(slot, endian)?)),
        NodeType::UInt => Ok(Node::UInt(view.u32_at(slot, endian)?)),
        NodeType::Float => Ok(Node::Float(view.f32_at(slot, endian)?)),
        NodeType::Int64 => Ok(Node::Int64(view.i64_at(slot, endian)?)),
        NodeType::UInt64 => Ok(Node::UInt64(view.u64_at(slot, endian)?)),
        NodeType::Float64 => Ok(Node::Float64(view.f64_at(slot, endian)?)),
        NodeType::Null => Ok(Node::Null),
    }
}
