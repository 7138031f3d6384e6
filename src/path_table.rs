//! Path table decoder.
//!
//! A `PathTable` header with `count` paths is followed by `count + 1`
//! boundary offsets relative to the table start; the i-th path spans
//! `[offset[i], offset[i+1])` as a run of fixed 0x1C-byte point records.
//! There is no write path: no producer emits path tables today.

use crate::buffer::{BufferView, Endianness};
use crate::descriptor::NodeType;
use crate::error::{BymlError, Result};
use crate::node::PathPoint;

/// Size of one packed point record: seven 32-bit floats.
pub const POINT_STRIDE: usize = 0x1C;

pub fn decode(
    view: &BufferView,
    offset: usize,
    endian: Endianness,
) -> Result<Vec<Vec<PathPoint>>> {
    let type_byte = view.u8_at(offset)?;
    let node_type = NodeType::from_u8(type_byte).ok_or(BymlError::UnknownNodeType {
        offset,
        value: type_byte,
    })?;
    if node_type != NodeType::PathTable {
        return Err(BymlError::UnexpectedNodeType {
            offset,
            expected: NodeType::PathTable,
            found: node_type,
        });
    }

    let count = view.u24_at(offset + 1, endian)? as usize;
    let mut paths = Vec::with_capacity(count);
    for i in 0..count {
        let start = offset + view.u32_at(offset + 4 + 4 * i, endian)? as usize;
        let end = offset + view.u32_at(offset + 4 + 4 * (i + 1), endian)? as usize;

        let mut path = Vec::new();
        let mut at = start;
        while at < end {
            path.push(PathPoint {
                px: view.f32_at(at, endian)?,
                py: view.f32_at(at + 0x04, endian)?,
                pz: view.f32_at(at + 0x08, endian)?,
                nx: view.f32_at(at + 0x0C, endian)?,
                ny: view.f32_at(at + 0x10, endian)?,
                nz: view.f32_at(at + 0x14, endian)?,
                arg: view.f32_at(at + 0x18, endian)?,
            });
            at += POINT_STRIDE;
        }
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::GrowableBuffer;

    fn build_table(paths: &[&[PathPoint]], endian: Endianness) -> Vec<u8> {
        let mut buf = GrowableBuffer::new();
        buf.put_u8(NodeType::PathTable as u8);
        buf.put_u24(paths.len() as u32, endian);

        // count + 1 boundary offsets, relative to the table start.
        let mut data_offset = 4 + 4 * (paths.len() as u32 + 1);
        for path in paths {
            buf.put_u32(data_offset, endian);
            data_offset += (path.len() * POINT_STRIDE) as u32;
        }
        buf.put_u32(data_offset, endian);

        for path in paths {
            for p in *path {
                for f in [p.px, p.py, p.pz, p.nx, p.ny, p.nz, p.arg] {
                    buf.put_f32(f, endian);
                }
            }
        }
        buf.into_bytes()
    }

    fn point(seed: f32) -> PathPoint {
        PathPoint {
            px: seed,
            py: seed + 1.0,
            pz: seed + 2.0,
            nx: 0.0,
            ny: 1.0,
            nz: 0.0,
            arg: seed * 0.5,
        }
    }

    #[test]
    fn decodes_boundary_spans() {
        let a = [point(1.0), point(2.0), point(3.0)];
        let b = [point(10.0)];
        for endian in [Endianness::Big, Endianness::Little] {
            let bytes = build_table(&[&a, &b, &[]], endian);
            let paths = decode(&BufferView::new(&bytes), 0, endian).unwrap();
            assert_eq!(paths.len(), 3);
            assert_eq!(paths[0], a);
            assert_eq!(paths[1], b);
            assert!(paths[2].is_empty());
        }
    }

    #[test]
    fn wrong_header_type_rejected() {
        let bytes = [NodeType::Dictionary as u8, 0, 0, 0];
        let err = decode(&BufferView::new(&bytes), 0, Endianness::Big).unwrap_err();
        assert!(matches!(err, BymlError::UnexpectedNodeType { .. }));
    }

    #[test]
    fn truncated_point_data_rejected() {
        let a = [point(1.0)];
        let mut bytes = build_table(&[&a], Endianness::Big);
        bytes.truncate(bytes.len() - 4);
        let err = decode(&BufferView::new(&bytes), 0, Endianness::Big).unwrap_err();
        assert!(matches!(err, BymlError::OutOfRange { .. }));
    }
}
