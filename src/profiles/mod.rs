//! Target architecture profiles
//!
//! A profile carries everything that makes the same UAPI table produce
//! different request codes on different machines: the C data model used to
//! size structures and the ioctl bit layout. Profiles are chosen by name or
//! by the architecture the crate was compiled for; nothing is probed at
//! runtime.

mod generic;
mod legacy;

pub use generic::load_generic_profiles;
pub use legacy::load_legacy_profiles;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::IoctlLayout;
use crate::error::{RegistryError, RegistryResult};

/// C data model and ioctl layout of one target architecture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    /// Canonical name, matching Rust's `target_arch` where one exists
    pub name: String,
    /// Other names accepted by [`by_name`]
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Size of a pointer and of `size_t`, in bytes
    pub pointer_width: u32,
    /// Size of C `long`, in bytes
    pub long_width: u32,
    /// Alignment of 64-bit integer fields inside structures
    pub u64_align: u32,
    /// Ioctl request code layout
    pub ioctl: IoctlLayout,
}

impl TargetProfile {
    /// Whether `name` refers to this profile
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Reject data models the layout engine cannot represent
    pub fn validate(&self) -> RegistryResult<()> {
        for (what, value) in [
            ("pointer_width", self.pointer_width),
            ("long_width", self.long_width),
            ("u64_align", self.u64_align),
        ] {
            if value != 4 && value != 8 {
                return Err(RegistryError::UnsupportedTarget(format!(
                    "{}: {} must be 4 or 8, got {}",
                    self.name, what, value
                )));
            }
        }
        self.ioctl.validate()
    }

    /// Load a custom profile from JSON
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let profile: TargetProfile = serde_json::from_str(json)?;
        profile.validate()?;
        debug!("Loaded custom target profile {}", profile.name);
        Ok(profile)
    }

    /// Serialize this profile to pretty JSON
    pub fn to_json(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Profile of the architecture this crate was compiled for
    pub fn native() -> RegistryResult<Self> {
        by_name(std::env::consts::ARCH)
    }
}

/// Load all built-in profiles
pub fn load_profiles() -> Vec<TargetProfile> {
    let mut profiles = load_generic_profiles();
    profiles.extend(load_legacy_profiles());
    profiles
}

/// Find a built-in profile by name or alias (case-insensitive)
pub fn by_name(name: &str) -> RegistryResult<TargetProfile> {
    load_profiles()
        .into_iter()
        .find(|p| p.matches(name))
        .ok_or_else(|| RegistryError::UnsupportedTarget(name.to_string()))
}

fn profile(
    name: &str,
    aliases: &[&str],
    pointer_width: u32,
    long_width: u32,
    u64_align: u32,
    ioctl: IoctlLayout,
) -> TargetProfile {
    TargetProfile {
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        pointer_width,
        long_width,
        u64_align,
        ioctl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        let profiles = load_profiles();
        assert!(profiles.len() >= 8);
        for p in &profiles {
            p.validate().unwrap();
        }
    }

    #[test]
    fn test_names_are_unique() {
        let profiles = load_profiles();
        for (i, p) in profiles.iter().enumerate() {
            for other in &profiles[i + 1..] {
                assert!(!other.matches(&p.name), "{} shadows {}", other.name, p.name);
                for alias in &p.aliases {
                    assert!(!other.matches(alias), "alias {} is ambiguous", alias);
                }
            }
        }
    }

    #[test]
    fn test_by_name_and_alias() {
        assert_eq!(by_name("x86_64").unwrap().pointer_width, 8);
        assert_eq!(by_name("AMD64").unwrap().name, "x86_64");
        assert_eq!(by_name("i386").unwrap().u64_align, 4);
        assert_eq!(by_name("arm").unwrap().u64_align, 8);
        assert_eq!(by_name("ppc").unwrap().ioctl, IoctlLayout::LEGACY);
        assert!(matches!(
            by_name("vax"),
            Err(RegistryError::UnsupportedTarget(_))
        ));
    }

    #[test]
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    fn test_native() {
        let native = TargetProfile::native().unwrap();
        assert_eq!(native.pointer_width as usize, std::mem::size_of::<usize>());
        assert_eq!(native.long_width as usize, std::mem::size_of::<libc::c_long>());
    }

    #[test]
    fn test_json_profile() {
        let json = by_name("riscv64").unwrap().to_json().unwrap();
        let custom = json.replace("riscv64", "riscv64-custom");
        let profile = TargetProfile::from_json(&custom).unwrap();
        assert_eq!(profile.name, "riscv64-custom");

        let broken = custom.replace("\"long_width\": 8", "\"long_width\": 2");
        assert!(matches!(
            TargetProfile::from_json(&broken),
            Err(RegistryError::UnsupportedTarget(_))
        ));
    }
}
