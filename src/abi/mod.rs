//! DRM UAPI source-of-truth table
//!
//! The table describes the kernel interface as data: the structures passed
//! to each ioctl (field by field, so their size can be computed for any
//! target), the ioctl tuples themselves and the flag/enum constant groups.
//! It is tagged with the UAPI revision it was transcribed from and can also
//! be loaded from a JSON document with the same schema.

mod constants;
mod ioctls;
mod structs;

pub use constants::{builtin_groups, fourcc_code};
pub use ioctls::builtin_ioctls;
pub use structs::builtin_structs;

use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::Direction;
use crate::error::{RegistryError, RegistryResult};

/// Type byte shared by every DRM ioctl
pub const DRM_IOCTL_BASE: u8 = b'd';

/// Kernel UAPI revision the built-in table was transcribed from
pub const DRM_UAPI_VERSION: &str = "linux-4.19";

/// C type of a structure field or of a scalar ioctl payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// `__u8`, `char`
    U8,
    /// `__u16`, `unsigned short`
    U16,
    /// `__u32`, `unsigned int`
    U32,
    /// `__u64`, `unsigned long long`
    U64,
    /// `__s32`
    I32,
    /// `__s64`
    I64,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `unsigned long`
    Ulong,
    /// `size_t`
    Size,
    /// Any data pointer
    Ptr,
    /// A C enum, always `int`-sized in the DRM headers
    Enum,
    /// Nested structure or union, by name
    Struct(String),
}

impl FieldType {
    /// Reference a named structure
    pub fn named(name: &str) -> Self {
        FieldType::Struct(name.to_string())
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::named(name)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            FieldType::U8 => "u8",
            FieldType::U16 => "u16",
            FieldType::U32 => "u32",
            FieldType::U64 => "u64",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Ulong => "ulong",
            FieldType::Size => "size",
            FieldType::Ptr => "ptr",
            FieldType::Enum => "enum",
            FieldType::Struct(name) => name,
        };
        write!(f, "{}", s)
    }
}

fn one() -> u32 {
    1
}

fn is_one(n: &u32) -> bool {
    *n == 1
}

/// One member of a structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Member name as in the kernel header
    pub name: String,
    /// Member type
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Array length, 1 for plain members
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub count: u32,
}

impl FieldDef {
    /// Plain member
    pub fn new(name: &str, ty: FieldType) -> Self {
        FieldDef {
            name: name.to_string(),
            ty,
            count: 1,
        }
    }

    /// Fixed-size array member
    pub fn array(name: &str, ty: FieldType, count: u32) -> Self {
        FieldDef {
            name: name.to_string(),
            ty,
            count,
        }
    }
}

/// Whether members follow each other or overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructKind {
    /// C `struct`
    #[default]
    Struct,
    /// C `union`
    Union,
}

/// Description of a C structure or union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDef {
    /// Tag name, e.g. `drm_mode_card_res`
    pub name: String,
    /// Struct or union
    #[serde(default)]
    pub kind: StructKind,
    /// Members in declaration order
    pub fields: Vec<FieldDef>,
}

/// One ioctl as declared by `DRM_IO*` in the headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoctlDef {
    /// Name without the `DRM_IOCTL_` prefix
    pub name: String,
    /// Transfer direction
    pub direction: Direction,
    /// Command number
    pub nr: u32,
    /// Argument type, absent for `DRM_IO`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<FieldType>,
    /// Kept for decoding only
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl IoctlDef {
    /// Mark this ioctl deprecated
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// How the constants of a group may be combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Single-bit or multi-bit flags, combinable with OR
    Bitmask,
    /// Mutually exclusive codes
    Exclusive,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            GroupKind::Bitmask => "bitmask",
            GroupKind::Exclusive => "exclusive",
        })
    }
}

/// A named constant inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDef {
    /// Name without the group's header prefix
    pub name: String,
    /// Kernel-assigned value
    pub value: u32,
}

/// An ordered group of related constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    /// Group name, e.g. `connector_type`
    pub name: String,
    /// Combination rule
    pub kind: GroupKind,
    /// Constants in header order
    pub constants: Vec<ConstantDef>,
}

fn default_magic() -> u8 {
    DRM_IOCTL_BASE
}

/// A complete, version-tagged UAPI description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiTable {
    /// UAPI revision tag
    pub version: String,
    /// Ioctl type byte
    #[serde(default = "default_magic")]
    pub magic: u8,
    /// Structures referenced by ioctl payloads
    pub structs: Vec<StructDef>,
    /// Ioctls in table order
    pub ioctls: Vec<IoctlDef>,
    /// Constant groups
    pub groups: Vec<GroupDef>,
}

impl AbiTable {
    /// The table compiled into the crate
    pub fn builtin() -> Self {
        AbiTable {
            version: DRM_UAPI_VERSION.to_string(),
            magic: DRM_IOCTL_BASE,
            structs: builtin_structs(),
            ioctls: builtin_ioctls(),
            groups: builtin_groups(),
        }
    }

    /// Parse a table from JSON
    ///
    /// Any parse failure is reported as [`RegistryError::TableCorruption`];
    /// consistency is checked later, when a registry is built from it.
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let table: AbiTable = serde_json::from_str(json).map_err(|e| {
            RegistryError::TableCorruption(format!("unparseable ABI table: {}", e))
        })?;
        debug!(
            "Parsed ABI table {} ({} structs, {} ioctls, {} groups)",
            table.version,
            table.structs.len(),
            table.ioctls.len(),
            table.groups.len()
        );
        Ok(table)
    }

    /// Read and parse a table file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Find a structure description by name
    pub fn find_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Find an ioctl description by name
    pub fn find_ioctl(&self, name: &str) -> Option<&IoctlDef> {
        self.ioctls.iter().find(|i| i.name == name)
    }
}

impl Default for AbiTable {
    fn default() -> Self {
        AbiTable::builtin()
    }
}

fn ioctl(name: &str, direction: Direction, nr: u32, payload: Option<FieldType>) -> IoctlDef {
    IoctlDef {
        name: name.to_string(),
        direction,
        nr,
        payload,
        deprecated: false,
    }
}

/// `DRM_IO(nr)`
pub fn io(nr: u32, name: &str) -> IoctlDef {
    ioctl(name, Direction::None, nr, None)
}

/// `DRM_IOR(nr, type)`
pub fn ior(nr: u32, name: &str, payload: impl Into<FieldType>) -> IoctlDef {
    ioctl(name, Direction::Read, nr, Some(payload.into()))
}

/// `DRM_IOW(nr, type)`
pub fn iow(nr: u32, name: &str, payload: impl Into<FieldType>) -> IoctlDef {
    ioctl(name, Direction::Write, nr, Some(payload.into()))
}

/// `DRM_IOWR(nr, type)`
pub fn iowr(nr: u32, name: &str, payload: impl Into<FieldType>) -> IoctlDef {
    ioctl(name, Direction::ReadWrite, nr, Some(payload.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_table_shape() {
        let table = AbiTable::builtin();
        assert_eq!(table.version, DRM_UAPI_VERSION);
        assert_eq!(table.magic, b'd');
        assert_eq!(table.ioctls.len(), 101);
        assert_eq!(table.groups.len(), 17);

        // Every referenced structure is described
        for def in &table.ioctls {
            if let Some(FieldType::Struct(name)) = &def.payload {
                assert!(table.find_struct(name).is_some(), "{} missing", name);
            }
        }
    }

    #[test]
    fn test_field_json_form() {
        let field = FieldDef::array("name", FieldType::U8, 32);
        assert_eq!(
            serde_json::to_string(&field).unwrap(),
            r#"{"name":"name","type":"u8","count":32}"#
        );

        let nested: FieldDef =
            serde_json::from_str(r#"{"name":"mode","type":{"struct":"drm_mode_modeinfo"}}"#)
                .unwrap();
        assert_eq!(nested, FieldDef::new("mode", FieldType::named("drm_mode_modeinfo")));
    }

    #[test]
    fn test_json_round_trip() {
        let table = AbiTable::builtin();
        let json = table.to_json().unwrap();
        let back = AbiTable::from_json(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_unparseable_table() {
        let err = AbiTable::from_json("{\"version\": 3}").unwrap_err();
        assert!(matches!(err, RegistryError::TableCorruption(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        fs::write(&path, AbiTable::builtin().to_json().unwrap()).unwrap();
        assert_eq!(AbiTable::from_file(&path).unwrap(), AbiTable::builtin());

        let err = AbiTable::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }

    #[test]
    fn test_helpers() {
        let def = iowr(0xA8, "MODE_ATTACHMODE", "drm_mode_mode_cmd").deprecated();
        assert_eq!(def.direction, Direction::ReadWrite);
        assert!(def.deprecated);
        assert_eq!(io(0x1e, "SET_MASTER").payload, None);
        assert_eq!(FieldType::named("drm_auth").to_string(), "drm_auth");
        assert_eq!(FieldType::Ulong.to_string(), "ulong");
    }
}
