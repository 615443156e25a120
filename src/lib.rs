//! # DRMREG - DRM ioctl code and constant registry
//!
//! An ABI-stable registry of the Linux DRM (Direct Rendering Manager) device
//! interface: the request codes of every generic DRM ioctl and the flag and
//! enum constants of drm.h, drm_mode.h and drm_fourcc.h, as typed values
//! addressable by name.
//!
//! ## Features
//!
//! - **Exact ioctl encoding** for the asm-generic and powerpc/mips layouts
//! - **Computed payload sizes** from structure descriptions, per target
//! - **Version-tagged source table** checked into the crate, or loaded from JSON
//! - **Flag helpers** that refuse to OR mutually exclusive codes
//! - **Verification** against codes captured from compiled kernel headers
//!
//! ## Quick Start
//!
//! ```rust
//! fn main() -> Result<(), drmreg::RegistryError> {
//!     let registry = drmreg::Registry::for_target("x86_64")?;
//!     let code = registry.lookup("MODE_GETRESOURCES")?;
//!     println!("DRM_IOCTL_MODE_GETRESOURCES = {}", code);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod abi;
pub mod codec;
pub mod error;
pub mod flags;
pub mod layout;
pub mod profiles;
pub mod registry;
pub mod verify;

// Re-export main API for easy access
pub use abi::{AbiTable, GroupKind, DRM_IOCTL_BASE, DRM_UAPI_VERSION};
pub use codec::{Direction, IoctlCode, IoctlLayout};
pub use error::{RegistryError, RegistryResult};
pub use profiles::{load_profiles, TargetProfile};
pub use registry::{ConstantGroup, EnumConstant, IoctlSpec, Registry};
pub use verify::{diff_targets, verify_against, ReferenceCodes, Snapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the registry for the architecture this crate was compiled for
///
/// Calling this is optional; the registry is otherwise built on the first
/// call to [`lookup`]. Doing it at startup surfaces an unsupported target
/// early.
///
/// # Example
///
/// ```no_run
/// let registry = drmreg::init()?;
/// println!("{} ioctls on {}", registry.operations().count(), registry.profile().name);
/// # Ok::<(), drmreg::RegistryError>(())
/// ```
pub fn init() -> RegistryResult<&'static Registry> {
    Registry::native()
}

/// Request code of an operation on the native target
///
/// # Example
///
/// ```no_run
/// let code = drmreg::lookup("MODE_GETRESOURCES")?;
/// // unsafe { libc::ioctl(fd, code.as_raw(), &mut res) };
/// # Ok::<(), drmreg::RegistryError>(())
/// ```
pub fn lookup(name: &str) -> RegistryResult<IoctlCode> {
    Registry::native()?.lookup(name)
}

/// Get library information
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!version().is_empty());
    }

    #[test]
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64"))]
    fn test_native_lookup() {
        let registry = init().unwrap();
        assert_eq!(lookup("MODE_GETRESOURCES").unwrap().value(), 0xC040_64A0);
        assert_eq!(registry.version(), DRM_UAPI_VERSION);
    }
}

/// Prelude module for convenient imports
///
/// # Example
///
/// ```no_run
/// use drmreg::prelude::*;
///
/// let code = lookup("SET_MASTER")?;
/// # Ok::<(), RegistryError>(())
/// ```
pub mod prelude {
    pub use crate::codec::{Direction, IoctlCode};
    pub use crate::error::{RegistryError, RegistryResult};
    pub use crate::registry::{IoctlSpec, Registry};
    pub use crate::{init, lookup, version};
}
