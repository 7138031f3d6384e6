//! String table codec.
//!
//! On disk a string table is a complex node: a `StringTable` header whose
//! count is `N-1`, then `N` offsets relative to the table start, then the
//! NUL-terminated UTF-8 string data. The extra, uncounted final offset
//! bounds the last real string. Tables are written deduplicated and sorted
//! with the empty string last, so the sentinel is always the final member.

use crate::buffer::{BufferView, Endianness, GrowableBuffer};
use crate::descriptor::NodeType;
use crate::error::{BymlError, Result};
use crate::node::Node;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Table sort order: the empty string sorts after every non-empty string;
/// non-empty strings compare byte-wise.
pub fn byml_str_cmp(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.as_bytes().cmp(b.as_bytes()),
    }
}

/// Decode the string table at `offset`.
///
/// Returns the `count` real strings plus the trailing empty-string sentinel,
/// so the sentinel's index stays resolvable by `String` and key lookups.
pub fn decode(view: &BufferView, offset: usize, endian: Endianness) -> Result<Vec<String>> {
    let type_byte = view.u8_at(offset)?;
    let node_type = NodeType::from_u8(type_byte).ok_or(BymlError::UnknownNodeType {
        offset,
        value: type_byte,
    })?;
    if node_type != NodeType::StringTable {
        return Err(BymlError::UnexpectedNodeType {
            offset,
            expected: NodeType::StringTable,
            found: node_type,
        });
    }

    let count = view.u24_at(offset + 1, endian)? as usize;
    let mut strings = Vec::with_capacity(count + 1);
    for i in 0..count {
        let rel = view.u32_at(offset + 4 + 4 * i, endian)? as usize;
        strings.push(view.cstr_at(offset + rel)?.to_string());
    }
    strings.push(String::new());
    Ok(strings)
}

/// A deduplicated, sorted string table ready for writing.
pub struct StringTable {
    label: &'static str,
    strings: Vec<String>,
    index: HashMap<String, u32>,
}

impl StringTable {
    pub fn from_set(label: &'static str, set: HashSet<String>) -> Self {
        let mut strings: Vec<String> = set.into_iter().collect();
        strings.sort_by(|a, b| byml_str_cmp(a, b));
        let index = strings
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as u32))
            .collect();
        Self {
            label,
            strings,
            index,
        }
    }

    /// Final table index of `value`. Absence is an internal invariant
    /// violation: collection walked the same tree the writer serializes.
    pub fn index_of(&self, value: &str) -> Result<u32> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| BymlError::MissingStringTableEntry {
                table: self.label,
                value: value.to_string(),
            })
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Emit the table at the current cursor: header with `count = N-1`, the
    /// `N` table-relative offsets, then the string data.
    pub fn encode(&self, buf: &mut GrowableBuffer, endian: Endianness) {
        buf.put_u8(NodeType::StringTable as u8);
        buf.put_u24(self.strings.len() as u32 - 1, endian);

        let mut data_offset = 4u32 + 4 * self.strings.len() as u32;
        for s in &self.strings {
            buf.put_u32(data_offset, endian);
            data_offset += s.len() as u32 + 1;
        }
        for s in &self.strings {
            buf.put_bytes(s.as_bytes());
            buf.put_u8(0);
        }
    }
}

/// Walk a tree collecting every distinct dictionary key and string-valued
/// leaf, each set pre-seeded with the empty-string sentinel.
pub fn collect_strings(root: &Node) -> (HashSet<String>, HashSet<String>) {
    let mut keys = HashSet::new();
    let mut values = HashSet::new();
    keys.insert(String::new());
    values.insert(String::new());
    gather(root, &mut keys, &mut values);
    (keys, values)
}

fn gather(node: &Node, keys: &mut HashSet<String>, values: &mut HashSet<String>) {
    match node {
        Node::String(s) => {
            values.insert(s.clone());
        }
        Node::Array(items) => {
            for item in items {
                gather(item, keys, values);
            }
        }
        Node::Dictionary(map) => {
            for (key, value) in map {
                keys.insert(key.clone());
                gather(value, keys, values);
            }
        }
        _ => {}
    }
}
