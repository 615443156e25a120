//! Ioctl request code encoding and decoding
//!
//! A request code packs four fields into 32 bits, from least to most
//! significant: command number, type (magic byte), argument size and
//! direction. The widths of those fields and the numeric direction values
//! differ between architectures, so they are carried by an [`IoctlLayout`]
//! owned by the target profile instead of being hard-coded here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Data transfer direction of an ioctl, seen from user space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// No argument is transferred
    None,
    /// The kernel writes into the argument (`_IOR`)
    Read,
    /// The kernel reads the argument (`_IOW`)
    Write,
    /// Both (`_IOWR`)
    ReadWrite,
}

impl Direction {
    /// Whether user space reads data back from the kernel
    pub fn reads(self) -> bool {
        matches!(self, Direction::Read | Direction::ReadWrite)
    }

    /// Whether user space passes data to the kernel
    pub fn writes(self) -> bool {
        matches!(self, Direction::Write | Direction::ReadWrite)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::None => "NONE",
            Direction::Read => "READ",
            Direction::Write => "WRITE",
            Direction::ReadWrite => "READ_WRITE",
        };
        write!(f, "{}", s)
    }
}

/// Bit layout of ioctl request codes on one architecture family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoctlLayout {
    /// Width of the command number field
    pub nr_bits: u32,
    /// Width of the type (magic) field
    pub type_bits: u32,
    /// Width of the argument size field
    pub size_bits: u32,
    /// Width of the direction field
    pub dir_bits: u32,
    /// Direction value for [`Direction::None`]
    pub dir_none: u32,
    /// Direction bit for [`Direction::Write`]
    pub dir_write: u32,
    /// Direction bit for [`Direction::Read`]
    pub dir_read: u32,
}

impl IoctlLayout {
    /// asm-generic layout (x86, arm, arm64, riscv, ...)
    pub const GENERIC: IoctlLayout = IoctlLayout {
        nr_bits: 8,
        type_bits: 8,
        size_bits: 14,
        dir_bits: 2,
        dir_none: 0,
        dir_write: 1,
        dir_read: 2,
    };

    /// powerpc, mips and sparc layout: 13 size bits, 3 direction bits
    pub const LEGACY: IoctlLayout = IoctlLayout {
        nr_bits: 8,
        type_bits: 8,
        size_bits: 13,
        dir_bits: 3,
        dir_none: 1,
        dir_write: 4,
        dir_read: 2,
    };

    /// Shift of the command number field
    pub const fn nr_shift(&self) -> u32 {
        0
    }

    /// Shift of the type field
    pub const fn type_shift(&self) -> u32 {
        self.nr_shift() + self.nr_bits
    }

    /// Shift of the size field
    pub const fn size_shift(&self) -> u32 {
        self.type_shift() + self.type_bits
    }

    /// Shift of the direction field
    pub const fn dir_shift(&self) -> u32 {
        self.size_shift() + self.size_bits
    }

    /// Largest argument size the size field can hold
    pub const fn max_size(&self) -> u32 {
        mask(self.size_bits)
    }

    /// Check that the fields tile 32 bits and the direction values are usable
    pub fn validate(&self) -> RegistryResult<()> {
        let total = self.nr_bits + self.type_bits + self.size_bits + self.dir_bits;
        if total != 32 {
            return Err(RegistryError::TableCorruption(format!(
                "ioctl layout fields cover {} bits, expected 32",
                total
            )));
        }
        if self.nr_bits == 0 || self.type_bits == 0 || self.size_bits == 0 || self.dir_bits == 0 {
            return Err(RegistryError::TableCorruption(
                "ioctl layout has an empty field".into(),
            ));
        }

        let values = [
            self.direction_bits(Direction::None),
            self.direction_bits(Direction::Read),
            self.direction_bits(Direction::Write),
            self.direction_bits(Direction::ReadWrite),
        ];
        for (i, v) in values.iter().enumerate() {
            if v & !mask(self.dir_bits) != 0 {
                return Err(RegistryError::TableCorruption(format!(
                    "direction value {:#x} does not fit {} bits",
                    v, self.dir_bits
                )));
            }
            if values[..i].contains(v) {
                return Err(RegistryError::TableCorruption(format!(
                    "direction value {:#x} is used twice",
                    v
                )));
            }
        }
        Ok(())
    }

    /// Numeric value placed in the direction field for `dir`
    pub const fn direction_bits(&self, dir: Direction) -> u32 {
        match dir {
            Direction::None => self.dir_none,
            Direction::Read => self.dir_read,
            Direction::Write => self.dir_write,
            Direction::ReadWrite => self.dir_read | self.dir_write,
        }
    }

    /// Inverse of [`direction_bits`](Self::direction_bits)
    pub fn direction_from_bits(&self, bits: u32) -> Option<Direction> {
        [
            Direction::None,
            Direction::Read,
            Direction::Write,
            Direction::ReadWrite,
        ]
        .into_iter()
        .find(|d| self.direction_bits(*d) == bits)
    }

    /// Pack a request code, rejecting fields that do not fit
    pub fn encode(&self, dir: Direction, ty: u32, nr: u32, size: u32) -> RegistryResult<IoctlCode> {
        check_field("nr", nr, self.nr_bits)?;
        check_field("type", ty, self.type_bits)?;
        check_field("size", size, self.size_bits)?;
        let dir_bits = self.direction_bits(dir);
        check_field("dir", dir_bits, self.dir_bits)?;

        let code = (dir_bits << self.dir_shift())
            | (size << self.size_shift())
            | (ty << self.type_shift())
            | (nr << self.nr_shift());
        Ok(IoctlCode(code))
    }

    /// Split a request code into its fields
    ///
    /// Returns `None` when the direction field holds a value this layout
    /// does not assign (for example 0 on powerpc).
    pub fn decode(&self, code: IoctlCode) -> Option<Decoded> {
        let raw = code.0;
        let direction = self.direction_from_bits((raw >> self.dir_shift()) & mask(self.dir_bits))?;
        Some(Decoded {
            direction,
            ty: (raw >> self.type_shift()) & mask(self.type_bits),
            nr: (raw >> self.nr_shift()) & mask(self.nr_bits),
            size: (raw >> self.size_shift()) & mask(self.size_bits),
        })
    }
}

impl Default for IoctlLayout {
    fn default() -> Self {
        IoctlLayout::GENERIC
    }
}

/// Fields recovered from a request code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    /// Transfer direction
    pub direction: Direction,
    /// Type (magic) byte
    pub ty: u32,
    /// Command number
    pub nr: u32,
    /// Argument size in bytes
    pub size: u32,
}

const fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

fn check_field(field: &'static str, value: u32, bits: u32) -> RegistryResult<()> {
    if value & !mask(bits) != 0 {
        return Err(RegistryError::FieldOverflow {
            field,
            value: u64::from(value),
            bits,
        });
    }
    Ok(())
}

/// Ioctl request code, the second argument of `ioctl(2)`
///
/// Serialized as a `0x`-prefixed, zero-padded hex string so that snapshot
/// and reference files read like the kernel headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IoctlCode(u32);

impl IoctlCode {
    /// Wrap a raw code
    pub const fn new(raw: u32) -> Self {
        IoctlCode(raw)
    }

    /// The code as a plain integer
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The code as the request type `libc::ioctl` takes
    pub fn as_raw(self) -> libc::c_ulong {
        libc::c_ulong::from(self.0)
    }
}

impl fmt::Display for IoctlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::LowerHex for IoctlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for IoctlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl FromStr for IoctlCode {
    type Err = RegistryError;

    /// Accepts `0x`-prefixed hex or plain decimal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => s.parse::<u32>(),
        };
        parsed
            .map(IoctlCode)
            .map_err(|_| RegistryError::InvalidCode(s.to_string()))
    }
}

impl TryFrom<String> for IoctlCode {
    type Error = RegistryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IoctlCode> for String {
    fn from(code: IoctlCode) -> Self {
        code.to_string()
    }
}

impl From<IoctlCode> for u32 {
    fn from(code: IoctlCode) -> Self {
        code.0
    }
}

impl From<u32> for IoctlCode {
    fn from(raw: u32) -> Self {
        IoctlCode(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC: u32 = b'd' as u32;

    #[test]
    fn test_generic_encoding() {
        let layout = IoctlLayout::GENERIC;
        assert_eq!(layout.dir_shift(), 30);
        assert_eq!(layout.size_shift(), 16);

        let code = layout.encode(Direction::ReadWrite, MAGIC, 0xA0, 64).unwrap();
        assert_eq!(code.value(), 0xC040_64A0);

        let code = layout.encode(Direction::Read, MAGIC, 0x02, 4).unwrap();
        assert_eq!(code.value(), 0x8004_6402);

        let code = layout.encode(Direction::None, MAGIC, 0x1e, 0).unwrap();
        assert_eq!(code.value(), 0x0000_641e);
    }

    #[test]
    fn test_legacy_encoding() {
        let layout = IoctlLayout::LEGACY;
        assert_eq!(layout.dir_shift(), 29);

        let code = layout.encode(Direction::None, MAGIC, 0x1e, 0).unwrap();
        assert_eq!(code.value(), 0x2000_641e);

        let code = layout.encode(Direction::Read, MAGIC, 0x02, 4).unwrap();
        assert_eq!(code.value(), 0x4004_6402);

        let code = layout.encode(Direction::Write, MAGIC, 0x0d, 16).unwrap();
        assert_eq!(code.value(), 0x8010_640d);
    }

    #[test]
    fn test_field_overflow() {
        let err = IoctlLayout::LEGACY
            .encode(Direction::Read, MAGIC, 0x01, 0x2000)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::FieldOverflow { field: "size", bits: 13, .. }
        ));

        // Same size fits the generic 14-bit field
        assert!(IoctlLayout::GENERIC
            .encode(Direction::Read, MAGIC, 0x01, 0x2000)
            .is_ok());

        let err = IoctlLayout::GENERIC
            .encode(Direction::None, MAGIC, 0x100, 0)
            .unwrap_err();
        assert!(matches!(err, RegistryError::FieldOverflow { field: "nr", .. }));
    }

    #[test]
    fn test_decode() {
        let decoded = IoctlLayout::GENERIC.decode(IoctlCode::new(0xC040_64A0)).unwrap();
        assert_eq!(
            decoded,
            Decoded {
                direction: Direction::ReadWrite,
                ty: MAGIC,
                nr: 0xA0,
                size: 64,
            }
        );

        // Direction 0 is not assigned on powerpc
        assert!(IoctlLayout::LEGACY.decode(IoctlCode::new(0x0000_641e)).is_none());
    }

    #[test]
    fn test_layout_validation() {
        assert!(IoctlLayout::GENERIC.validate().is_ok());
        assert!(IoctlLayout::LEGACY.validate().is_ok());

        let bad = IoctlLayout {
            size_bits: 12,
            ..IoctlLayout::GENERIC
        };
        assert!(bad.validate().is_err());

        let clash = IoctlLayout {
            dir_none: 2,
            ..IoctlLayout::GENERIC
        };
        assert!(clash.validate().is_err());
    }

    #[test]
    fn test_direction_helpers() {
        assert!(Direction::ReadWrite.reads() && Direction::ReadWrite.writes());
        assert!(!Direction::None.reads() && !Direction::None.writes());
        assert!(Direction::Read.reads() && !Direction::Read.writes());
        assert_eq!(Direction::ReadWrite.to_string(), "READ_WRITE");
    }

    #[test]
    fn test_code_text_forms() {
        let code = IoctlCode::new(0x641e);
        assert_eq!(code.to_string(), "0x0000641e");
        assert_eq!("0x0000641e".parse::<IoctlCode>().unwrap(), code);
        assert_eq!("25630".parse::<IoctlCode>().unwrap(), code);
        assert!(matches!(
            "0xzz".parse::<IoctlCode>(),
            Err(RegistryError::InvalidCode(text)) if text == "0xzz"
        ));
        assert!(matches!(
            "4294967296".parse::<IoctlCode>(),
            Err(RegistryError::InvalidCode(_))
        ));

        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"0x0000641e\"");
        let back: IoctlCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert_eq!(code.as_raw(), 0x641e);
    }
}
