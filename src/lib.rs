//! # byml-rs — BYML / CRG1 compact binary tree codec
//!
//! BYML is a compact, offset-addressed binary tree format used to package
//! heterogeneous game-asset data; CRG1 is an extended variant adding raw
//! binary blobs and float arrays. This crate is the codec: it parses a byte
//! buffer into a [`Node`] tree and serializes a tree back to bytes, with the
//! format's string-deduplication, alignment, and forward-reference-patching
//! rules handled for you.
//!
//! ## Quick Start
//!
//! ```rust
//! use byml_rs::{parse, write, FileKind, Node};
//! use std::collections::BTreeMap;
//!
//! # fn main() -> byml_rs::Result<()> {
//! let mut root = BTreeMap::new();
//! root.insert("Name".to_string(), Node::from(7));
//! root.insert("Tag".to_string(), Node::from("hello"));
//!
//! let bytes = write(&Node::Dictionary(root), FileKind::Crg1)?;
//!
//! let tree = parse(&bytes, FileKind::Crg1)?;
//! assert_eq!(tree.get("Name").and_then(Node::as_i32), Some(7));
//! assert_eq!(tree.get("Tag").and_then(Node::as_str), Some("hello"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Format notes
//!
//! - The 4-byte magic selects both the file variant and its endianness;
//!   every multi-byte field is read and written in the file's own order.
//! - Dictionary keys and string values live in deduplicated, sorted string
//!   tables; the empty string is always present as the final sentinel entry.
//! - Complex nodes (arrays, dictionaries, blobs, float arrays) are stored
//!   out-of-line at 4-byte-aligned absolute offsets.
//! - Node kinds are gated per variant: writing a float array into a base
//!   BYML file is a hard error, never a silent drop.

pub mod buffer;
pub mod descriptor;
pub mod error;
pub mod node;
pub mod parser;
pub mod path_table;
pub mod string_table;
pub mod writer;

pub use buffer::{BufferView, Endianness, GrowableBuffer};
pub use descriptor::{endianness_of_magic, FileDescription, FileKind, NodeType};
pub use error::{BymlError, Result};
pub use node::{Node, PathPoint};
pub use parser::{parse, parse_with_options, ParseOptions};
pub use writer::{write, write_with_options, WriteOptions};
