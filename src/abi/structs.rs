//! Structures passed to DRM ioctls, as declared in drm.h and drm_mode.h

use super::{FieldDef, FieldType, StructDef, StructKind};
use FieldType::*;

fn f(name: &str, ty: FieldType) -> FieldDef {
    FieldDef::new(name, ty)
}

fn s(name: &str, fields: Vec<FieldDef>) -> StructDef {
    StructDef {
        name: name.to_string(),
        kind: StructKind::Struct,
        fields,
    }
}

fn u(name: &str, fields: Vec<FieldDef>) -> StructDef {
    StructDef {
        name: name.to_string(),
        kind: StructKind::Union,
        fields,
    }
}

/// Load all built-in structure descriptions
pub fn builtin_structs() -> Vec<StructDef> {
    let mut structs = core_structs();
    structs.extend(legacy_structs());
    structs.extend(mode_structs());
    structs.extend(syncobj_lease_structs());
    structs
}

/// Structures of the core (non-legacy) ioctls in drm.h
fn core_structs() -> Vec<StructDef> {
    vec![
        s(
            "drm_version",
            vec![
                f("version_major", Int),
                f("version_minor", Int),
                f("version_patchlevel", Int),
                f("name_len", Size),
                f("name", Ptr),
                f("date_len", Size),
                f("date", Ptr),
                f("desc_len", Size),
                f("desc", Ptr),
            ],
        ),
        s("drm_unique", vec![f("unique_len", Size), f("unique", Ptr)]),
        s("drm_auth", vec![f("magic", U32)]),
        s(
            "drm_irq_busid",
            vec![f("irq", Int), f("busnum", Int), f("devnum", Int), f("funcnum", Int)],
        ),
        s(
            "drm_set_version",
            vec![
                f("drm_di_major", Int),
                f("drm_di_minor", Int),
                f("drm_dd_major", Int),
                f("drm_dd_minor", Int),
            ],
        ),
        s("drm_modeset_ctl", vec![f("crtc", U32), f("cmd", U32)]),
        s("drm_gem_close", vec![f("handle", U32), f("pad", U32)]),
        s("drm_gem_flink", vec![f("handle", U32), f("name", U32)]),
        s("drm_gem_open", vec![f("name", U32), f("handle", U32), f("size", U64)]),
        s("drm_get_cap", vec![f("capability", U64), f("value", U64)]),
        s("drm_set_client_cap", vec![f("capability", U64), f("value", U64)]),
        s("drm_prime_handle", vec![f("handle", U32), f("flags", U32), f("fd", I32)]),
        s(
            "drm_wait_vblank_request",
            vec![f("type", Enum), f("sequence", U32), f("signal", Ulong)],
        ),
        s(
            "drm_wait_vblank_reply",
            vec![
                f("type", Enum),
                f("sequence", U32),
                f("tval_sec", Long),
                f("tval_usec", Long),
            ],
        ),
        u(
            "drm_wait_vblank",
            vec![
                f("request", "drm_wait_vblank_request".into()),
                f("reply", "drm_wait_vblank_reply".into()),
            ],
        ),
        s(
            "drm_crtc_get_sequence",
            vec![
                f("crtc_id", U32),
                f("active", U32),
                f("sequence", U64),
                f("sequence_ns", I64),
            ],
        ),
        s(
            "drm_crtc_queue_sequence",
            vec![
                f("crtc_id", U32),
                f("flags", U32),
                f("sequence", U64),
                f("user_data", U64),
            ],
        ),
    ]
}

/// Structures of the DRI1-era ioctls (maps, buffers, contexts, AGP)
fn legacy_structs() -> Vec<StructDef> {
    vec![
        s(
            "drm_map",
            vec![
                f("offset", Ulong),
                f("size", Ulong),
                f("type", Enum),
                f("flags", Enum),
                f("handle", Ptr),
                f("mtrr", Int),
            ],
        ),
        s(
            "drm_client",
            vec![
                f("idx", Int),
                f("auth", Int),
                f("pid", Ulong),
                f("uid", Ulong),
                f("magic", Ulong),
                f("iocs", Ulong),
            ],
        ),
        // anonymous in the header
        s("drm_stats_data", vec![f("value", Ulong), f("type", Enum)]),
        s(
            "drm_stats",
            vec![
                f("count", Ulong),
                FieldDef::array("data", "drm_stats_data".into(), 15),
            ],
        ),
        s("drm_block", vec![f("unused", Int)]),
        s("drm_control", vec![f("func", Enum), f("irq", Int)]),
        s(
            "drm_buf_desc",
            vec![
                f("count", Int),
                f("size", Int),
                f("low_mark", Int),
                f("high_mark", Int),
                f("flags", Enum),
                f("agp_start", Ulong),
            ],
        ),
        s("drm_buf_info", vec![f("count", Int), f("list", Ptr)]),
        s("drm_buf_map", vec![f("count", Int), f("virtual", Ptr), f("list", Ptr)]),
        s("drm_buf_free", vec![f("count", Int), f("list", Ptr)]),
        s("drm_ctx_priv_map", vec![f("ctx_id", U32), f("handle", Ptr)]),
        s("drm_ctx", vec![f("handle", U32), f("flags", Enum)]),
        s("drm_ctx_res", vec![f("count", Int), f("contexts", Ptr)]),
        s("drm_draw", vec![f("handle", U32)]),
        s(
            "drm_dma",
            vec![
                f("context", Int),
                f("send_count", Int),
                f("send_indices", Ptr),
                f("send_sizes", Ptr),
                f("flags", Enum),
                f("request_count", Int),
                f("request_size", Int),
                f("request_indices", Ptr),
                f("request_sizes", Ptr),
                f("granted_count", Int),
            ],
        ),
        s("drm_lock", vec![f("context", Int), f("flags", Enum)]),
        s("drm_agp_mode", vec![f("mode", Ulong)]),
        s(
            "drm_agp_info",
            vec![
                f("agp_version_major", Int),
                f("agp_version_minor", Int),
                f("mode", Ulong),
                f("aperture_base", Ulong),
                f("aperture_size", Ulong),
                f("memory_allowed", Ulong),
                f("memory_used", Ulong),
                f("id_vendor", U16),
                f("id_device", U16),
            ],
        ),
        s(
            "drm_agp_buffer",
            vec![
                f("size", Ulong),
                f("handle", Ulong),
                f("type", Ulong),
                f("physical", Ulong),
            ],
        ),
        s("drm_agp_binding", vec![f("handle", Ulong), f("offset", Ulong)]),
        s("drm_scatter_gather", vec![f("size", Ulong), f("handle", Ulong)]),
        s(
            "drm_update_draw",
            vec![f("handle", U32), f("type", U32), f("num", U32), f("data", U64)],
        ),
    ]
}

/// Kernel mode-setting structures from drm_mode.h
fn mode_structs() -> Vec<StructDef> {
    vec![
        s(
            "drm_mode_card_res",
            vec![
                f("fb_id_ptr", U64),
                f("crtc_id_ptr", U64),
                f("connector_id_ptr", U64),
                f("encoder_id_ptr", U64),
                f("count_fbs", U32),
                f("count_crtcs", U32),
                f("count_connectors", U32),
                f("count_encoders", U32),
                f("min_width", U32),
                f("max_width", U32),
                f("min_height", U32),
                f("max_height", U32),
            ],
        ),
        s(
            "drm_mode_modeinfo",
            vec![
                f("clock", U32),
                f("hdisplay", U16),
                f("hsync_start", U16),
                f("hsync_end", U16),
                f("htotal", U16),
                f("hskew", U16),
                f("vdisplay", U16),
                f("vsync_start", U16),
                f("vsync_end", U16),
                f("vtotal", U16),
                f("vscan", U16),
                f("vrefresh", U32),
                f("flags", U32),
                f("type", U32),
                FieldDef::array("name", U8, 32),
            ],
        ),
        s(
            "drm_mode_crtc",
            vec![
                f("set_connectors_ptr", U64),
                f("count_connectors", U32),
                f("crtc_id", U32),
                f("fb_id", U32),
                f("x", U32),
                f("y", U32),
                f("gamma_size", U32),
                f("mode_valid", U32),
                f("mode", "drm_mode_modeinfo".into()),
            ],
        ),
        s(
            "drm_mode_cursor",
            vec![
                f("flags", U32),
                f("crtc_id", U32),
                f("x", I32),
                f("y", I32),
                f("width", U32),
                f("height", U32),
                f("handle", U32),
            ],
        ),
        s(
            "drm_mode_crtc_lut",
            vec![
                f("crtc_id", U32),
                f("gamma_size", U32),
                f("red", U64),
                f("green", U64),
                f("blue", U64),
            ],
        ),
        s(
            "drm_mode_get_encoder",
            vec![
                f("encoder_id", U32),
                f("encoder_type", U32),
                f("crtc_id", U32),
                f("possible_crtcs", U32),
                f("possible_clones", U32),
            ],
        ),
        s(
            "drm_mode_get_connector",
            vec![
                f("encoders_ptr", U64),
                f("modes_ptr", U64),
                f("props_ptr", U64),
                f("prop_values_ptr", U64),
                f("count_modes", U32),
                f("count_props", U32),
                f("count_encoders", U32),
                f("encoder_id", U32),
                f("connector_id", U32),
                f("connector_type", U32),
                f("connector_type_id", U32),
                f("connection", U32),
                f("mm_width", U32),
                f("mm_height", U32),
                f("subpixel", U32),
                f("pad", U32),
            ],
        ),
        s(
            "drm_mode_mode_cmd",
            vec![f("connector_id", U32), f("mode", "drm_mode_modeinfo".into())],
        ),
        s(
            "drm_mode_get_property",
            vec![
                f("values_ptr", U64),
                f("enum_blob_ptr", U64),
                f("prop_id", U32),
                f("flags", U32),
                FieldDef::array("name", U8, 32),
                f("count_values", U32),
                f("count_enum_blobs", U32),
            ],
        ),
        s(
            "drm_mode_connector_set_property",
            vec![f("value", U64), f("prop_id", U32), f("connector_id", U32)],
        ),
        s(
            "drm_mode_get_blob",
            vec![f("blob_id", U32), f("length", U32), f("data", U64)],
        ),
        s(
            "drm_mode_fb_cmd",
            vec![
                f("fb_id", U32),
                f("width", U32),
                f("height", U32),
                f("pitch", U32),
                f("bpp", U32),
                f("depth", U32),
                f("handle", U32),
            ],
        ),
        s(
            "drm_mode_crtc_page_flip",
            vec![
                f("crtc_id", U32),
                f("fb_id", U32),
                f("flags", U32),
                f("reserved", U32),
                f("user_data", U64),
            ],
        ),
        s(
            "drm_mode_fb_dirty_cmd",
            vec![
                f("fb_id", U32),
                f("flags", U32),
                f("color", U32),
                f("num_clips", U32),
                f("clips_ptr", U64),
            ],
        ),
        s(
            "drm_mode_create_dumb",
            vec![
                f("height", U32),
                f("width", U32),
                f("bpp", U32),
                f("flags", U32),
                f("handle", U32),
                f("pitch", U32),
                f("size", U64),
            ],
        ),
        s(
            "drm_mode_map_dumb",
            vec![f("handle", U32), f("pad", U32), f("offset", U64)],
        ),
        s("drm_mode_destroy_dumb", vec![f("handle", U32)]),
        s(
            "drm_mode_get_plane_res",
            vec![f("plane_id_ptr", U64), f("count_planes", U32)],
        ),
        s(
            "drm_mode_get_plane",
            vec![
                f("plane_id", U32),
                f("crtc_id", U32),
                f("fb_id", U32),
                f("possible_crtcs", U32),
                f("gamma_size", U32),
                f("count_format_types", U32),
                f("format_type_ptr", U64),
            ],
        ),
        s(
            "drm_mode_set_plane",
            vec![
                f("plane_id", U32),
                f("crtc_id", U32),
                f("fb_id", U32),
                f("flags", U32),
                f("crtc_x", I32),
                f("crtc_y", I32),
                f("crtc_w", U32),
                f("crtc_h", U32),
                f("src_x", U32),
                f("src_y", U32),
                f("src_h", U32),
                f("src_w", U32),
            ],
        ),
        s(
            "drm_mode_fb_cmd2",
            vec![
                f("fb_id", U32),
                f("width", U32),
                f("height", U32),
                f("pixel_format", U32),
                f("flags", U32),
                FieldDef::array("handles", U32, 4),
                FieldDef::array("pitches", U32, 4),
                FieldDef::array("offsets", U32, 4),
                FieldDef::array("modifier", U64, 4),
            ],
        ),
        s(
            "drm_mode_obj_get_properties",
            vec![
                f("props_ptr", U64),
                f("prop_values_ptr", U64),
                f("count_props", U32),
                f("obj_id", U32),
                f("obj_type", U32),
            ],
        ),
        s(
            "drm_mode_obj_set_property",
            vec![
                f("value", U64),
                f("prop_id", U32),
                f("obj_id", U32),
                f("obj_type", U32),
            ],
        ),
        s(
            "drm_mode_cursor2",
            vec![
                f("flags", U32),
                f("crtc_id", U32),
                f("x", I32),
                f("y", I32),
                f("width", U32),
                f("height", U32),
                f("handle", U32),
                f("hot_x", I32),
                f("hot_y", I32),
            ],
        ),
        s(
            "drm_mode_atomic",
            vec![
                f("flags", U32),
                f("count_objs", U32),
                f("objs_ptr", U64),
                f("count_props_ptr", U64),
                f("props_ptr", U64),
                f("prop_values_ptr", U64),
                f("reserved", U64),
                f("user_data", U64),
            ],
        ),
        s(
            "drm_mode_create_blob",
            vec![f("data", U64), f("length", U32), f("blob_id", U32)],
        ),
        s("drm_mode_destroy_blob", vec![f("blob_id", U32)]),
    ]
}

/// Sync objects from drm.h and lease objects from drm_mode.h
fn syncobj_lease_structs() -> Vec<StructDef> {
    vec![
        s("drm_syncobj_create", vec![f("handle", U32), f("flags", U32)]),
        s("drm_syncobj_destroy", vec![f("handle", U32), f("pad", U32)]),
        s(
            "drm_syncobj_handle",
            vec![f("handle", U32), f("flags", U32), f("fd", I32), f("pad", U32)],
        ),
        s(
            "drm_syncobj_wait",
            vec![
                f("handles", U64),
                f("timeout_nsec", I64),
                f("count_handles", U32),
                f("flags", U32),
                f("first_signaled", U32),
                f("pad", U32),
            ],
        ),
        s(
            "drm_syncobj_array",
            vec![f("handles", U64), f("count_handles", U32), f("pad", U32)],
        ),
        s(
            "drm_mode_create_lease",
            vec![
                f("object_ids", U64),
                f("object_count", U32),
                f("flags", U32),
                f("lessee_id", U32),
                f("fd", U32),
            ],
        ),
        s(
            "drm_mode_list_lessees",
            vec![f("count_lessees", U32), f("pad", U32), f("lessees_ptr", U64)],
        ),
        s(
            "drm_mode_get_lease",
            vec![f("count_objects", U32), f("pad", U32), f("objects_ptr", U64)],
        ),
        s("drm_mode_revoke_lease", vec![f("lessee_id", U32)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_names_unique() {
        let structs = builtin_structs();
        for (i, a) in structs.iter().enumerate() {
            assert!(!a.fields.is_empty(), "{} has no fields", a.name);
            assert!(
                structs[i + 1..].iter().all(|b| b.name != a.name),
                "{} declared twice",
                a.name
            );
        }
    }

    #[test]
    fn test_wait_vblank_is_union() {
        let structs = builtin_structs();
        let vblank = structs.iter().find(|s| s.name == "drm_wait_vblank").unwrap();
        assert_eq!(vblank.kind, StructKind::Union);
        assert_eq!(vblank.fields.len(), 2);
    }
}
