//! File variant registry: magic signatures and allowed node kinds.
//!
//! Each file variant is described by an immutable [`FileDescription`]: the
//! 4-byte magics it accepts and the node kinds it may contain. Validating a
//! node kind is a pure membership test; a violation is always a hard error,
//! never silently ignored.

use crate::buffer::Endianness;

/// On-disk node type codes. Stable for interoperability.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    String = 0xA0,
    Path = 0xA1,
    Array = 0xC0,
    Dictionary = 0xC1,
    StringTable = 0xC2,
    PathTable = 0xC3,
    /// CRG1 extension.
    BinaryData = 0xCB,
    Bool = 0xD0,
    Int = 0xD1,
    Float = 0xD2,
    UInt = 0xD3,
    /// CRG1 extension.
    FloatArray = 0xE2,
    Int64 = 0xE4,
    UInt64 = 0xE5,
    Float64 = 0xE6,
    Null = 0xFF,
}

impl NodeType {
    /// Parse a type byte. Unknown values are a decode error for the caller,
    /// never a silent default.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0xA0 => Some(Self::String),
            0xA1 => Some(Self::Path),
            0xC0 => Some(Self::Array),
            0xC1 => Some(Self::Dictionary),
            0xC2 => Some(Self::StringTable),
            0xC3 => Some(Self::PathTable),
            0xCB => Some(Self::BinaryData),
            0xD0 => Some(Self::Bool),
            0xD1 => Some(Self::Int),
            0xD2 => Some(Self::Float),
            0xD3 => Some(Self::UInt),
            0xE2 => Some(Self::FloatArray),
            0xE4 => Some(Self::Int64),
            0xE5 => Some(Self::UInt64),
            0xE6 => Some(Self::Float64),
            0xFF => Some(Self::Null),
            _ => None,
        }
    }

    /// Whether values of this kind are stored out-of-line and referenced by
    /// offset.
    pub fn is_complex(self) -> bool {
        matches!(
            self,
            Self::Array
                | Self::Dictionary
                | Self::StringTable
                | Self::PathTable
                | Self::BinaryData
                | Self::FloatArray
        )
    }
}

/// Supported file variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Base format: no binary blobs, no float arrays.
    Byml,
    /// Extended variant adding `BinaryData` and `FloatArray`.
    Crg1,
}

/// Immutable per-variant record: accepted magics and permitted node kinds.
pub struct FileDescription {
    pub magics: &'static [[u8; 4]],
    pub allowed: &'static [NodeType],
}

static BYML_DESCRIPTION: FileDescription = FileDescription {
    magics: &[*b"BY\x00\x01", *b"BY\x00\x02", *b"YB\x03\x00", *b"YB\x01\x00"],
    allowed: &[
        NodeType::String,
        NodeType::Path,
        NodeType::Array,
        NodeType::Dictionary,
        NodeType::StringTable,
        NodeType::PathTable,
        NodeType::Bool,
        NodeType::Int,
        NodeType::UInt,
        NodeType::Float,
        NodeType::Null,
    ],
};

static CRG1_DESCRIPTION: FileDescription = FileDescription {
    magics: &[*b"CRG1"],
    allowed: &[
        NodeType::String,
        NodeType::Path,
        NodeType::Array,
        NodeType::Dictionary,
        NodeType::StringTable,
        NodeType::PathTable,
        NodeType::Bool,
        NodeType::Int,
        NodeType::UInt,
        NodeType::Float,
        NodeType::Null,
        NodeType::FloatArray,
        NodeType::BinaryData,
    ],
};

impl FileKind {
    pub fn description(self) -> &'static FileDescription {
        match self {
            Self::Byml => &BYML_DESCRIPTION,
            Self::Crg1 => &CRG1_DESCRIPTION,
        }
    }

    /// Membership test against this variant's allowed node kinds.
    pub fn allows(self, node_type: NodeType) -> bool {
        self.description().allowed.contains(&node_type)
    }

    /// The magic the writer uses when none is given: the variant's
    /// last-listed signature.
    pub fn default_magic(self) -> [u8; 4] {
        *self
            .description()
            .magics
            .last()
            .expect("every variant declares at least one magic")
    }

    /// Whether `magic` is one of this variant's accepted signatures.
    pub fn accepts_magic(self, magic: &[u8; 4]) -> bool {
        self.description().magics.contains(magic)
    }
}

/// Byte order implied by a magic signature: the reversed `YB` prefix marks
/// little-endian files, everything else is big-endian.
pub fn endianness_of_magic(magic: &[u8; 4]) -> Endianness {
    if &magic[..2] == b"YB" {
        Endianness::Little
    } else {
        Endianness::Big
    }
}
