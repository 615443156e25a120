//! Flag and enum constant groups from drm.h, drm_mode.h and drm_fourcc.h

use super::{ConstantDef, GroupDef, GroupKind};

/// Pack four characters into a little-endian fourcc, as `fourcc_code()` does
pub const fn fourcc_code(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

const fn fourcc(code: &[u8; 4]) -> u32 {
    fourcc_code(code[0], code[1], code[2], code[3])
}

static PIXEL_FORMAT: &[(&str, u32)] = &[
    ("C8", fourcc(b"C8  ")),
    ("R8", fourcc(b"R8  ")),
    ("RG88", fourcc(b"RG88")),
    ("GR88", fourcc(b"GR88")),
    ("RGB332", fourcc(b"RGB8")),
    ("BGR233", fourcc(b"BGR8")),
    ("XRGB4444", fourcc(b"XR12")),
    ("XBGR4444", fourcc(b"XB12")),
    ("RGBX4444", fourcc(b"RX12")),
    ("BGRX4444", fourcc(b"BX12")),
    ("ARGB4444", fourcc(b"AR12")),
    ("ABGR4444", fourcc(b"AB12")),
    ("RGBA4444", fourcc(b"RA12")),
    ("BGRA4444", fourcc(b"BA12")),
    ("XRGB1555", fourcc(b"XR15")),
    ("XBGR1555", fourcc(b"XB15")),
    ("RGBX5551", fourcc(b"RX15")),
    ("BGRX5551", fourcc(b"BX15")),
    ("ARGB1555", fourcc(b"AR15")),
    ("ABGR1555", fourcc(b"AB15")),
    ("RGBA5551", fourcc(b"RA15")),
    ("BGRA5551", fourcc(b"BA15")),
    ("RGB565", fourcc(b"RG16")),
    ("BGR565", fourcc(b"BG16")),
    ("RGB888", fourcc(b"RG24")),
    ("BGR888", fourcc(b"BG24")),
    ("XRGB8888", fourcc(b"XR24")),
    ("XBGR8888", fourcc(b"XB24")),
    ("RGBX8888", fourcc(b"RX24")),
    ("BGRX8888", fourcc(b"BX24")),
    ("ARGB8888", fourcc(b"AR24")),
    ("ABGR8888", fourcc(b"AB24")),
    ("RGBA8888", fourcc(b"RA24")),
    ("BGRA8888", fourcc(b"BA24")),
    ("XRGB2101010", fourcc(b"XR30")),
    ("XBGR2101010", fourcc(b"XB30")),
    ("RGBX1010102", fourcc(b"RX30")),
    ("BGRX1010102", fourcc(b"BX30")),
    ("ARGB2101010", fourcc(b"AR30")),
    ("ABGR2101010", fourcc(b"AB30")),
    ("RGBA1010102", fourcc(b"RA30")),
    ("BGRA1010102", fourcc(b"BA30")),
    ("YUYV", fourcc(b"YUYV")),
    ("YVYU", fourcc(b"YVYU")),
    ("UYVY", fourcc(b"UYVY")),
    ("VYUY", fourcc(b"VYUY")),
    ("AYUV", fourcc(b"AYUV")),
    ("NV12", fourcc(b"NV12")),
    ("NV21", fourcc(b"NV21")),
    ("NV16", fourcc(b"NV16")),
    ("NV61", fourcc(b"NV61")),
    ("NV24", fourcc(b"NV24")),
    ("NV42", fourcc(b"NV42")),
    ("YUV410", fourcc(b"YUV9")),
    ("YVU410", fourcc(b"YVU9")),
    ("YUV411", fourcc(b"YU11")),
    ("YVU411", fourcc(b"YV11")),
    ("YUV420", fourcc(b"YU12")),
    ("YVU420", fourcc(b"YV12")),
    ("YUV422", fourcc(b"YU16")),
    ("YVU422", fourcc(b"YV16")),
    ("YUV444", fourcc(b"YU24")),
    ("YVU444", fourcc(b"YV24")),
];

static MODE_TYPE: &[(&str, u32)] = &[
    ("BUILTIN", 1 << 0),
    ("CLOCK_C", (1 << 1) | 1),
    ("CRTC_C", (1 << 2) | 1),
    ("PREFERRED", 1 << 3),
    ("DEFAULT", 1 << 4),
    ("USERDEF", 1 << 5),
    ("DRIVER", 1 << 6),
];

static MODE_FLAG: &[(&str, u32)] = &[
    ("PHSYNC", 1 << 0),
    ("NHSYNC", 1 << 1),
    ("PVSYNC", 1 << 2),
    ("NVSYNC", 1 << 3),
    ("INTERLACE", 1 << 4),
    ("DBLSCAN", 1 << 5),
    ("CSYNC", 1 << 6),
    ("PCSYNC", 1 << 7),
    ("NCSYNC", 1 << 8),
    ("HSKEW", 1 << 9),
    ("BCAST", 1 << 10),
    ("PIXMUX", 1 << 11),
    ("DBLCLK", 1 << 12),
    ("CLKDIV2", 1 << 13),
];

// Enumerated fields inside the mode flags word, already shifted; the
// field masks are 0x1f << 14 and 0x0f << 19
static MODE_FLAG_3D: &[(&str, u32)] = &[
    ("NONE", 0),
    ("FRAME_PACKING", 1 << 14),
    ("FIELD_ALTERNATIVE", 2 << 14),
    ("LINE_ALTERNATIVE", 3 << 14),
    ("SIDE_BY_SIDE_FULL", 4 << 14),
    ("L_DEPTH", 5 << 14),
    ("L_DEPTH_GFX_GFX_DEPTH", 6 << 14),
    ("TOP_AND_BOTTOM", 7 << 14),
    ("SIDE_BY_SIDE_HALF", 8 << 14),
];

static MODE_FLAG_PIC_AR: &[(&str, u32)] = &[
    ("NONE", 0),
    ("4_3", 1 << 19),
    ("16_9", 2 << 19),
    ("64_27", 3 << 19),
    ("256_135", 4 << 19),
];

static ENCODER_TYPE: &[(&str, u32)] = &[
    ("NONE", 0),
    ("DAC", 1),
    ("TMDS", 2),
    ("LVDS", 3),
    ("TVDAC", 4),
    ("VIRTUAL", 5),
    ("DSI", 6),
    ("DPMST", 7),
    ("DPI", 8),
];

static CONNECTOR_TYPE: &[(&str, u32)] = &[
    ("Unknown", 0),
    ("VGA", 1),
    ("DVII", 2),
    ("DVID", 3),
    ("DVIA", 4),
    ("Composite", 5),
    ("SVIDEO", 6),
    ("LVDS", 7),
    ("Component", 8),
    ("9PinDIN", 9),
    ("DisplayPort", 10),
    ("HDMIA", 11),
    ("HDMIB", 12),
    ("TV", 13),
    ("eDP", 14),
    ("VIRTUAL", 15),
    ("DSI", 16),
    ("DPI", 17),
    ("WRITEBACK", 18),
];

static CONNECTION_STATUS: &[(&str, u32)] = &[
    ("CONNECTED", 1),
    ("DISCONNECTED", 2),
    ("UNKNOWN", 3),
];

static OBJECT_TYPE: &[(&str, u32)] = &[
    ("CRTC", 0xcccc_cccc),
    ("CONNECTOR", 0xc0c0_c0c0),
    ("ENCODER", 0xe0e0_e0e0),
    ("MODE", 0xdede_dede),
    ("PROPERTY", 0xb0b0_b0b0),
    ("FB", 0xfbfb_fbfb),
    ("BLOB", 0xbbbb_bbbb),
    ("PLANE", 0xeeee_eeee),
    ("ANY", 0),
];

// EXTENDED_TYPE is a field mask covering OBJECT and SIGNED_RANGE
static PROPERTY_TYPE: &[(&str, u32)] = &[
    ("PENDING", 1 << 0),
    ("RANGE", 1 << 1),
    ("IMMUTABLE", 1 << 2),
    ("ENUM", 1 << 3),
    ("BLOB", 1 << 4),
    ("BITMASK", 1 << 5),
    ("EXTENDED_TYPE", 0x0000_ffc0),
    ("OBJECT", 1 << 6),
    ("SIGNED_RANGE", 2 << 6),
    ("ATOMIC", 0x8000_0000),
];

static ATOMIC_FLAG: &[(&str, u32)] = &[
    ("PAGE_FLIP_EVENT", 0x01),
    ("PAGE_FLIP_ASYNC", 0x02),
    ("TEST_ONLY", 0x0100),
    ("NONBLOCK", 0x0200),
    ("ALLOW_MODESET", 0x0400),
];

static PAGE_FLIP_FLAG: &[(&str, u32)] = &[
    ("EVENT", 0x01),
    ("ASYNC", 0x02),
    ("TARGET_ABSOLUTE", 0x04),
    ("TARGET_RELATIVE", 0x08),
];

static DRIVER_CAP: &[(&str, u32)] = &[
    ("DUMB_BUFFER", 0x1),
    ("VBLANK_HIGH_CRTC", 0x2),
    ("DUMB_PREFERRED_DEPTH", 0x3),
    ("DUMB_PREFER_SHADOW", 0x4),
    ("PRIME", 0x5),
    ("TIMESTAMP_MONOTONIC", 0x6),
    ("ASYNC_PAGE_FLIP", 0x7),
    ("CURSOR_WIDTH", 0x8),
    ("CURSOR_HEIGHT", 0x9),
    ("ADDFB2_MODIFIERS", 0x10),
    ("PAGE_FLIP_TARGET", 0x11),
    ("CRTC_IN_VBLANK_EVENT", 0x12),
    ("SYNCOBJ", 0x13),
];

static CRTC_SEQUENCE_FLAG: &[(&str, u32)] = &[("RELATIVE", 0x1), ("NEXT_ON_MISS", 0x2)];

static SYNCOBJ_WAIT_FLAG: &[(&str, u32)] = &[("WAIT_ALL", 1 << 0), ("WAIT_FOR_SUBMIT", 1 << 1)];

static PRIME_CAP: &[(&str, u32)] = &[("IMPORT", 0x1), ("EXPORT", 0x2)];

static CLIENT_CAP: &[(&str, u32)] = &[
    ("STEREO_3D", 1),
    ("UNIVERSAL_PLANES", 2),
    ("ATOMIC", 3),
    ("ASPECT_RATIO", 4),
    ("WRITEBACK_CONNECTORS", 5),
];

fn group(name: &str, kind: GroupKind, constants: &[(&str, u32)]) -> GroupDef {
    GroupDef {
        name: name.to_string(),
        kind,
        constants: constants
            .iter()
            .map(|(name, value)| ConstantDef {
                name: name.to_string(),
                value: *value,
            })
            .collect(),
    }
}

/// Load all built-in constant groups
pub fn builtin_groups() -> Vec<GroupDef> {
    use GroupKind::*;

    vec![
        // fourccs are not flags; OR-combining them is only meaningful as a
        // set of supported formats
        group("pixel_format", Bitmask, PIXEL_FORMAT),
        group("mode_type", Bitmask, MODE_TYPE),
        group("mode_flag", Bitmask, MODE_FLAG),
        group("mode_flag_3d", Exclusive, MODE_FLAG_3D),
        group("mode_flag_pic_ar", Exclusive, MODE_FLAG_PIC_AR),
        group("encoder_type", Exclusive, ENCODER_TYPE),
        group("connector_type", Exclusive, CONNECTOR_TYPE),
        group("connection_status", Exclusive, CONNECTION_STATUS),
        group("object_type", Exclusive, OBJECT_TYPE),
        group("property_type", Bitmask, PROPERTY_TYPE),
        group("atomic_flag", Bitmask, ATOMIC_FLAG),
        group("page_flip_flag", Bitmask, PAGE_FLIP_FLAG),
        group("crtc_sequence_flag", Bitmask, CRTC_SEQUENCE_FLAG),
        group("syncobj_wait_flag", Bitmask, SYNCOBJ_WAIT_FLAG),
        group("driver_cap", Exclusive, DRIVER_CAP),
        group("prime_cap", Bitmask, PRIME_CAP),
        group("client_cap", Exclusive, CLIENT_CAP),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc() {
        assert_eq!(fourcc_code(b'X', b'R', b'2', b'4'), 0x3432_5258);
        assert_eq!(fourcc(b"NV12"), 0x3231_564e);
    }

    #[test]
    fn test_exclusive_groups_have_distinct_values() {
        for g in builtin_groups().iter().filter(|g| g.kind == GroupKind::Exclusive) {
            for (i, c) in g.constants.iter().enumerate() {
                assert!(
                    g.constants[i + 1..].iter().all(|o| o.value != c.value),
                    "{}::{} collides",
                    g.name,
                    c.name
                );
            }
        }
    }

    #[test]
    fn test_mode_type_composites() {
        let groups = builtin_groups();
        let mode_type = groups.iter().find(|g| g.name == "mode_type").unwrap();
        let value = |n: &str| mode_type.constants.iter().find(|c| c.name == n).unwrap().value;
        assert_eq!(value("CLOCK_C"), 3);
        assert_eq!(value("CRTC_C"), 5);
    }

    #[test]
    fn test_mode_flag_fields_stay_in_their_masks() {
        let groups = builtin_groups();
        for (name, mask) in [("mode_flag_3d", 0x1f << 14), ("mode_flag_pic_ar", 0x0f << 19)] {
            let g = groups.iter().find(|g| g.name == name).unwrap();
            assert!(g.constants.iter().all(|c| c.value & !mask == 0), "{}", name);
        }
        let flags = groups.iter().find(|g| g.name == "mode_flag").unwrap();
        assert!(flags.constants.iter().all(|c| c.value < 1 << 14));
    }
}
