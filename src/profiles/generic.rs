//! Architectures using the asm-generic ioctl layout

use super::{profile, TargetProfile};
use crate::codec::IoctlLayout;

/// Load all built-in profiles with the 2-bit direction / 14-bit size layout
pub fn load_generic_profiles() -> Vec<TargetProfile> {
    vec![
        profile("x86_64", &["amd64", "x86-64"], 8, 8, 8, IoctlLayout::GENERIC),
        profile("aarch64", &["arm64"], 8, 8, 8, IoctlLayout::GENERIC),
        profile("riscv64", &["riscv64gc"], 8, 8, 8, IoctlLayout::GENERIC),
        // i386 System V ABI aligns 64-bit members to 4 bytes
        profile("i686", &["x86", "i386", "i586"], 4, 4, 4, IoctlLayout::GENERIC),
        profile("armv7", &["arm", "armhf", "armv7l"], 4, 4, 8, IoctlLayout::GENERIC),
    ]
}
