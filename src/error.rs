//! Error types for the drmreg library

use std::io;
use thiserror::Error;

/// Main error type for registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No operation with this name exists in the table
    #[error("Unknown ioctl operation: {0}")]
    UnknownOperation(String),

    /// The group exists but has no constant with this name
    #[error("Unknown constant {name} in group {group}")]
    UnknownConstant {
        /// Group that was searched
        group: String,
        /// Constant name that was requested
        name: String,
    },

    /// No constant group with this name exists
    #[error("Unknown constant group: {0}")]
    UnknownGroup(String),

    /// The source table is inconsistent; the registry cannot be built
    #[error("ABI table corruption: {0}")]
    TableCorruption(String),

    /// Flags from an exclusive group were combined
    #[error("Cannot combine {names:?} from exclusive group {group}")]
    InvalidCombination {
        /// Group the names belong to
        group: String,
        /// Names that were passed in
        names: Vec<String>,
    },

    /// No target profile matches the requested architecture
    #[error("Unsupported target: {0}")]
    UnsupportedTarget(String),

    /// A value does not fit its ioctl bit field
    #[error("Value {value:#x} does not fit the {bits}-bit {field} field")]
    FieldOverflow {
        /// Field name (`nr`, `type`, `size` or `dir`)
        field: &'static str,
        /// Offending value
        value: u64,
        /// Width of the field in bits
        bits: u32,
    },

    /// Text that is not a hex or decimal ioctl code
    #[error("Invalid ioctl code {0:?}")]
    InvalidCode(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot or reference file I/O failed
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for RegistryError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidData => RegistryError::TableCorruption(err.to_string()),
            _ => RegistryError::Io(err),
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
