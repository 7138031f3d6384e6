//! Byte-level layout assertions: exact output bytes for a known tree,
//! alignment of every complex node, sentinel placement, and determinism.

use byml_rs::{
    parse, write, write_with_options, BufferView, Endianness, FileKind, Node, NodeType,
    WriteOptions,
};
use std::collections::BTreeMap;

fn dict(pairs: Vec<(&str, Node)>) -> Node {
    Node::Dictionary(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    )
}

#[test]
fn exact_bytes_for_known_tree() {
    let root = dict(vec![("Name", Node::from(7))]);
    let bytes = write(&root, FileKind::Crg1).unwrap();

    #[rustfmt::skip]
    let expected: Vec<u8> = vec![
        // magic + header (big-endian)
        b'C', b'R', b'G', b'1',
        0x00, 0x00, 0x00, 0x10, // key table offset
        0x00, 0x00, 0x00, 0x24, // value table offset
        0x00, 0x00, 0x00, 0x30, // root node offset
        // key table: ["Name", ""] with count = 1
        0xC2, 0x00, 0x00, 0x01,
        0x00, 0x00, 0x00, 0x0C, // offset of "Name"
        0x00, 0x00, 0x00, 0x11, // offset of "" (sentinel bound)
        b'N', b'a', b'm', b'e',
        0x00, 0x00, 0x00, 0x00, // terminators + pad to 4
        // value table: [""] with count = 0
        0xC2, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x08,
        0x00, 0x00, 0x00, 0x00, // terminator + pad
        // root dictionary, one entry
        0xC1, 0x00, 0x00, 0x01,
        0x00, 0x00, 0x00, 0xD1, // key index 0, type Int
        0x00, 0x00, 0x00, 0x07, // value 7
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn little_endian_header_fields() {
    let root = dict(vec![("Name", Node::from(7))]);
    let bytes =
        write_with_options(&root, FileKind::Byml, WriteOptions::new().magic(*b"YB\x01\x00"))
            .unwrap();
    assert_eq!(&bytes[0x04..0x08], &[0x10, 0x00, 0x00, 0x00]);
    // Count fields follow file endianness too: u24 count of 1.
    assert_eq!(&bytes[0x10..0x14], &[0xC2, 0x01, 0x00, 0x00]);
}

/// Walk every complex node reachable from the root and assert its start
/// offset is 4-byte aligned.
fn check_complex(view: &BufferView, offset: usize, endian: Endianness) {
    assert_eq!(offset % 4, 0, "complex node at {:#x} misaligned", offset);
    let node_type = NodeType::from_u8(view.u8_at(offset).unwrap()).unwrap();
    let count = view.u24_at(offset + 1, endian).unwrap() as usize;
    match node_type {
        NodeType::Dictionary => {
            for i in 0..count {
                let entry = offset + 4 + 8 * i;
                let entry_type = NodeType::from_u8(view.u8_at(entry + 3).unwrap()).unwrap();
                if entry_type.is_complex() {
                    let child = view.u32_at(entry + 4, endian).unwrap() as usize;
                    check_complex(view, child, endian);
                }
            }
        }
        NodeType::Array => {
            let slots = (offset + 4 + count + 3) & !3;
            for i in 0..count {
                let entry_type = NodeType::from_u8(view.u8_at(offset + 4 + i).unwrap()).unwrap();
                if entry_type.is_complex() {
                    let child = view.u32_at(slots + 4 * i, endian).unwrap() as usize;
                    check_complex(view, child, endian);
                }
            }
        }
        _ => {}
    }
}

#[test]
fn every_complex_node_is_aligned() {
    // Odd-length strings and blobs push unaligned end positions everywhere.
    let root = dict(vec![
        ("a", Node::from("xyz")),
        ("blob", Node::Binary(vec![1, 2, 3, 4, 5])),
        (
            "list",
            Node::Array(vec![
                Node::from(1i32),
                Node::Binary(vec![7; 3]),
                dict(vec![("inner", Node::FloatArray(vec![1.0, 2.0]))]),
                Node::from("odd"),
                Node::from(true),
            ]),
        ),
        ("more", dict(vec![("x", Node::Array(vec![Node::Null]))])),
    ]);

    let bytes = write(&root, FileKind::Crg1).unwrap();
    let view = BufferView::new(&bytes);
    let endian = Endianness::Big;

    for field in [0x04usize, 0x08, 0x0C] {
        let offset = view.u32_at(field, endian).unwrap() as usize;
        assert_eq!(offset % 4, 0);
    }
    let root_offset = view.u32_at(0x0C, endian).unwrap() as usize;
    check_complex(&view, root_offset, endian);
}

#[test]
fn string_tables_end_with_the_sentinel() {
    let root = dict(vec![
        ("zz", Node::from("omega")),
        ("aa", Node::from("alpha")),
        ("mm", Node::from("")),
    ]);
    let bytes = write(&root, FileKind::Crg1).unwrap();
    let view = BufferView::new(&bytes);
    let endian = Endianness::Big;

    for field in [0x04usize, 0x08] {
        let table = view.u32_at(field, endian).unwrap() as usize;
        let count = view.u24_at(table + 1, endian).unwrap() as usize;
        // The extra, uncounted final offset points at the "" sentinel.
        let last = view.u32_at(table + 4 + 4 * count, endian).unwrap() as usize;
        assert_eq!(view.cstr_at(table + last).unwrap(), "");
        // Real entries are sorted byte-wise ahead of it.
        let mut previous = String::new();
        for i in 0..count {
            let rel = view.u32_at(table + 4 + 4 * i, endian).unwrap() as usize;
            let s = view.cstr_at(table + rel).unwrap();
            assert!(!s.is_empty());
            if i > 0 {
                assert!(previous.as_bytes() < s.as_bytes());
            }
            previous = s.to_string();
        }
    }
}

#[test]
fn writing_is_deterministic() {
    let root = dict(vec![
        ("b", Node::from("shared")),
        ("a", Node::from("shared")),
        ("c", Node::Array(vec![Node::from("zeta"), Node::from("alpha")])),
    ]);
    let first = write(&root, FileKind::Crg1).unwrap();
    let second = write(&root, FileKind::Crg1).unwrap();
    assert_eq!(first, second);
    assert_eq!(parse(&first, FileKind::Crg1).unwrap(), root);
}

#[test]
fn sentinel_blob_header_encoding() {
    // A blob exactly at the sentinel length stores count = sentinel and an
    // extra length field of zero.
    let len = 0x00FF_FFFF_usize;
    let root = dict(vec![("blob", Node::Binary(vec![0xAB; len]))]);
    let bytes = write(&root, FileKind::Crg1).unwrap();
    let view = BufferView::new(&bytes);
    let endian = Endianness::Big;

    let root_offset = view.u32_at(0x0C, endian).unwrap() as usize;
    let blob_offset = view.u32_at(root_offset + 4 + 4, endian).unwrap() as usize;
    assert_eq!(view.u8_at(blob_offset).unwrap(), NodeType::BinaryData as u8);
    assert_eq!(view.u24_at(blob_offset + 1, endian).unwrap(), 0x00FF_FFFF);
    assert_eq!(view.u32_at(blob_offset + 4, endian).unwrap(), 0);
    assert_eq!(view.u8_at(blob_offset + 8).unwrap(), 0xAB);
}
