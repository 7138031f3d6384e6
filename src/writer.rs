//! Two-phase layout writer.
//!
//! String tables are collected and sorted with a full tree walk before any
//! byte is emitted, because entry encoding needs final table indices. Each
//! container then writes its fixed header, reserves the per-entry value-slot
//! region, and serializes children after it, patching each child's absolute
//! offset back into its reserved slot.

use crate::buffer::{Endianness, GrowableBuffer};
use crate::descriptor::{endianness_of_magic, FileKind, NodeType};
use crate::error::{BymlError, Result};
use crate::node::Node;
use crate::string_table::{byml_str_cmp, collect_strings, StringTable};
use std::collections::BTreeMap;
use tracing::debug;

const BINARY_LENGTH_SENTINEL: u32 = 0x00FF_FFFF;

/// Per-write configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    magic: Option<[u8; 4]>,
    initial_capacity: Option<usize>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the output magic. Must be one of the variant's accepted
    /// signatures; also selects the output endianness.
    pub fn magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = Some(magic);
        self
    }

    /// Pre-size the output buffer (it grows as needed regardless).
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }
}

/// Mutable state shared by the recursive writers.
struct WriteContext {
    kind: FileKind,
    endian: Endianness,
    key_table: StringTable,
    value_table: StringTable,
}

impl WriteContext {
    /// Classify a value's node kind and gate it against the variant.
    fn classify(&self, node: &Node) -> Result<NodeType> {
        let node_type = node.node_type();
        if !self.kind.allows(node_type) {
            return Err(BymlError::DisallowedNodeType {
                kind: self.kind,
                node_type,
            });
        }
        Ok(node_type)
    }
}

/// Serialize a tree under the given variant's default magic.
pub fn write(root: &Node, kind: FileKind) -> Result<Vec<u8>> {
    write_with_options(root, kind, WriteOptions::default())
}

pub fn write_with_options(root: &Node, kind: FileKind, options: WriteOptions) -> Result<Vec<u8>> {
    let magic = match options.magic {
        Some(magic) => {
            if !kind.accepts_magic(&magic) {
                return Err(BymlError::BadMagic { found: magic });
            }
            magic
        }
        None => kind.default_magic(),
    };
    let endian = endianness_of_magic(&magic);

    let dict = match root {
        Node::Dictionary(map) => map,
        _ => return Err(BymlError::RootNotDictionary),
    };

    let (keys, values) = collect_strings(root);
    let context = WriteContext {
        kind,
        endian,
        key_table: StringTable::from_set("key", keys),
        value_table: StringTable::from_set("value", values),
    };

    debug!(
        ?kind,
        ?endian,
        keys = context.key_table.strings().len(),
        values = context.value_table.strings().len(),
        entries = dict.len(),
        "writing tree"
    );

    let mut buf = GrowableBuffer::with_capacity(options.initial_capacity.unwrap_or(0x10000));
    buf.put_bytes(&magic);
    // Fixed header region: magic + three offset fields, padded to 16 bytes.
    buf.seek(0x10);

    let key_table_offset = buf.position();
    buf.write_u32_at(0x04, key_table_offset as u32, endian);
    context.key_table.encode(&mut buf, endian);
    buf.align(4);

    let value_table_offset = buf.position();
    buf.write_u32_at(0x08, value_table_offset as u32, endian);
    context.value_table.encode(&mut buf, endian);
    buf.align(4);

    let root_offset = buf.position();
    buf.write_u32_at(0x0C, root_offset as u32, endian);
    write_complex_dict(&context, &mut buf, dict)?;

    Ok(buf.into_bytes())
}

fn ensure_aligned(buf: &GrowableBuffer) -> Result<()> {
    let offset = buf.position();
    if offset % 4 != 0 {
        return Err(BymlError::MisalignedPayload { offset });
    }
    Ok(())
}

fn write_header(buf: &mut GrowableBuffer, node_type: NodeType, count: usize, endian: Endianness) {
    buf.put_u8(node_type as u8);
    buf.put_u24(count as u32, endian);
}

fn write_complex_dict(
    context: &WriteContext,
    buf: &mut GrowableBuffer,
    map: &BTreeMap<String, Node>,
) -> Result<()> {
    ensure_aligned(buf)?;
    write_header(buf, NodeType::Dictionary, map.len(), context.endian);

    // Entries in table order keeps output deterministic and key indices
    // monotone.
    let mut entries: Vec<(&String, &Node)> = map.iter().collect();
    entries.sort_by(|a, b| byml_str_cmp(a.0, b.0));

    let mut entry = buf.position();
    buf.skip(8 * entries.len());

    for (key, value) in entries {
        let node_type = context.classify(value)?;
        let key_index = context.key_table.index_of(key)?;
        buf.write_u24_at(entry, key_index, context.endian);
        buf.write_u8_at(entry + 3, node_type as u8);
        write_value(context, buf, value, entry + 4)?;
        entry += 8;
    }
    Ok(())
}

fn write_complex_array(context: &WriteContext, buf: &mut GrowableBuffer, items: &[Node]) -> Result<()> {
    ensure_aligned(buf)?;
    write_header(buf, NodeType::Array, items.len(), context.endian);

    for item in items {
        buf.put_u8(context.classify(item)? as u8);
    }
    buf.align(4);

    let mut slot = buf.position();
    buf.skip(4 * items.len());

    for item in items {
        write_value(context, buf, item, slot)?;
        slot += 4;
    }
    Ok(())
}

fn write_complex_float_array(
    context: &WriteContext,
    buf: &mut GrowableBuffer,
    values: &[f32],
) -> Result<()> {
    ensure_aligned(buf)?;
    write_header(buf, NodeType::FloatArray, values.len(), context.endian);
    for value in values {
        buf.put_f32(*value, context.endian);
    }
    Ok(())
}

fn write_complex_binary(context: &WriteContext, buf: &mut GrowableBuffer, data: &[u8]) -> Result<()> {
    ensure_aligned(buf)?;
    if data.len() >= BINARY_LENGTH_SENTINEL as usize {
        write_header(buf, NodeType::BinaryData, BINARY_LENGTH_SENTINEL as usize, context.endian);
        buf.put_u32(data.len() as u32 - BINARY_LENGTH_SENTINEL, context.endian);
    } else {
        write_header(buf, NodeType::BinaryData, data.len(), context.endian);
    }
    buf.put_bytes(data);
    // Padding is not part of the logical blob length.
    buf.align(4);
    Ok(())
}

/// Serialize one value into its reserved slot: inline for scalars and table
/// indices, offset-patched indirection for complex kinds.
fn write_value(context: &WriteContext, buf: &mut GrowableBuffer, node: &Node, slot: usize) -> Result<()> {
    let endian = context.endian;
    match node {
        Node::Null => buf.write_u32_at(slot, 0, endian),
        Node::Bool(v) => buf.write_u32_at(slot, u32::from(*v), endian),
        Node::Int(v) => buf.write_i32_at(slot, *v, endian),
        Node::UInt(v) => buf.write_u32_at(slot, *v, endian),
        Node::Float(v) => buf.write_f32_at(slot, *v, endian),
        Node::Int64(v) => buf.write_i64_at(slot, *v, endian),
        Node::UInt64(v) => buf.write_u64_at(slot, *v, endian),
        Node::Float64(v) => buf.write_f64_at(slot, *v, endian),
        Node::String(s) => {
            let index = context.value_table.index_of(s)?;
            buf.write_u32_at(slot, index, endian);
        }
        Node::FloatArray(values) => {
            let offset = buf.position();
            buf.write_u32_at(slot, offset as u32, endian);
            write_complex_float_array(context, buf, values)?;
        }
        Node::Binary(data) => {
            let offset = buf.position();
            buf.write_u32_at(slot, offset as u32, endian);
            write_complex_binary(context, buf, data)?;
        }
        Node::Array(items) => {
            let offset = buf.position();
            buf.write_u32_at(slot, offset as u32, endian);
            write_complex_array(context, buf, items)?;
        }
        Node::Dictionary(map) => {
            let offset = buf.position();
            buf.write_u32_at(slot, offset as u32, endian);
            write_complex_dict(context, buf, map)?;
        }
        // No write layout is specified for path tables.
        Node::Path(_) => {
            return Err(BymlError::UnsupportedValueType {
                node_type: NodeType::Path,
            })
        }
    }
    Ok(())
}
