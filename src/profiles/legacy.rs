//! Architectures with their own ioctl layout
//!
//! powerpc, mips and sparc keep 3 direction bits (NONE=1, READ=2, WRITE=4)
//! at the cost of one size bit.

use super::{profile, TargetProfile};
use crate::codec::IoctlLayout;

/// Load all built-in profiles with the 3-bit direction / 13-bit size layout
pub fn load_legacy_profiles() -> Vec<TargetProfile> {
    vec![
        profile("powerpc64", &["ppc64", "ppc64le", "powerpc64le"], 8, 8, 8, IoctlLayout::LEGACY),
        profile("powerpc", &["ppc"], 4, 4, 8, IoctlLayout::LEGACY),
        profile("mips64", &["mips64el"], 8, 8, 8, IoctlLayout::LEGACY),
        profile("mips", &["mipsel"], 4, 4, 8, IoctlLayout::LEGACY),
        profile("sparc64", &[], 8, 8, 8, IoctlLayout::LEGACY),
    ]
}
