//! DRM ioctl numbers
//!
//! Core and legacy ioctls use 0x00..0x3f, mode-setting ioctls 0xA0 upwards
//! with sync objects and leases at the top (up to 0xC9 in 4.19).
//! Driver-private ioctls (0x40..0x9f) are not part of the generic table.

use super::{io, ior, iow, iowr, FieldType, IoctlDef};

/// Load all built-in ioctl descriptions in header order
pub fn builtin_ioctls() -> Vec<IoctlDef> {
    let mut ioctls = core_ioctls();
    ioctls.extend(mode_ioctls());
    ioctls.extend(syncobj_lease_ioctls());
    ioctls
}

fn core_ioctls() -> Vec<IoctlDef> {
    vec![
        iowr(0x00, "VERSION", "drm_version"),
        iowr(0x01, "GET_UNIQUE", "drm_unique"),
        ior(0x02, "GET_MAGIC", "drm_auth"),
        iowr(0x03, "IRQ_BUSID", "drm_irq_busid"),
        iowr(0x04, "GET_MAP", "drm_map"),
        iowr(0x05, "GET_CLIENT", "drm_client"),
        ior(0x06, "GET_STATS", "drm_stats"),
        iowr(0x07, "SET_VERSION", "drm_set_version"),
        iow(0x08, "MODESET_CTL", "drm_modeset_ctl"),
        iow(0x09, "GEM_CLOSE", "drm_gem_close"),
        iowr(0x0a, "GEM_FLINK", "drm_gem_flink"),
        iowr(0x0b, "GEM_OPEN", "drm_gem_open"),
        iowr(0x0c, "GET_CAP", "drm_get_cap"),
        iow(0x0d, "SET_CLIENT_CAP", "drm_set_client_cap"),
        iow(0x10, "SET_UNIQUE", "drm_unique"),
        iow(0x11, "AUTH_MAGIC", "drm_auth"),
        iowr(0x12, "BLOCK", "drm_block"),
        iowr(0x13, "UNBLOCK", "drm_block"),
        iow(0x14, "CONTROL", "drm_control"),
        iowr(0x15, "ADD_MAP", "drm_map"),
        iowr(0x16, "ADD_BUFS", "drm_buf_desc"),
        iow(0x17, "MARK_BUFS", "drm_buf_desc"),
        iowr(0x18, "INFO_BUFS", "drm_buf_info"),
        iowr(0x19, "MAP_BUFS", "drm_buf_map"),
        iow(0x1a, "FREE_BUFS", "drm_buf_free"),
        iow(0x1b, "RM_MAP", "drm_map"),
        iow(0x1c, "SET_SAREA_CTX", "drm_ctx_priv_map"),
        iowr(0x1d, "GET_SAREA_CTX", "drm_ctx_priv_map"),
        io(0x1e, "SET_MASTER"),
        io(0x1f, "DROP_MASTER"),
        iowr(0x20, "ADD_CTX", "drm_ctx"),
        iowr(0x21, "RM_CTX", "drm_ctx"),
        iow(0x22, "MOD_CTX", "drm_ctx"),
        iowr(0x23, "GET_CTX", "drm_ctx"),
        iow(0x24, "SWITCH_CTX", "drm_ctx"),
        iow(0x25, "NEW_CTX", "drm_ctx"),
        iowr(0x26, "RES_CTX", "drm_ctx_res"),
        iowr(0x27, "ADD_DRAW", "drm_draw"),
        iowr(0x28, "RM_DRAW", "drm_draw"),
        iowr(0x29, "DMA", "drm_dma"),
        iow(0x2a, "LOCK", "drm_lock"),
        iow(0x2b, "UNLOCK", "drm_lock"),
        iow(0x2c, "FINISH", "drm_lock"),
        iowr(0x2d, "PRIME_HANDLE_TO_FD", "drm_prime_handle"),
        iowr(0x2e, "PRIME_FD_TO_HANDLE", "drm_prime_handle"),
        io(0x30, "AGP_ACQUIRE"),
        io(0x31, "AGP_RELEASE"),
        iow(0x32, "AGP_ENABLE", "drm_agp_mode"),
        ior(0x33, "AGP_INFO", "drm_agp_info"),
        iowr(0x34, "AGP_ALLOC", "drm_agp_buffer"),
        iow(0x35, "AGP_FREE", "drm_agp_buffer"),
        iow(0x36, "AGP_BIND", "drm_agp_binding"),
        iow(0x37, "AGP_UNBIND", "drm_agp_binding"),
        iowr(0x38, "SG_ALLOC", "drm_scatter_gather"),
        iow(0x39, "SG_FREE", "drm_scatter_gather"),
        iowr(0x3a, "WAIT_VBLANK", "drm_wait_vblank"),
        iowr(0x3b, "CRTC_GET_SEQUENCE", "drm_crtc_get_sequence"),
        iowr(0x3c, "CRTC_QUEUE_SEQUENCE", "drm_crtc_queue_sequence"),
        iow(0x3f, "UPDATE_DRAW", "drm_update_draw"),
    ]
}

fn mode_ioctls() -> Vec<IoctlDef> {
    vec![
        iowr(0xA0, "MODE_GETRESOURCES", "drm_mode_card_res"),
        iowr(0xA1, "MODE_GETCRTC", "drm_mode_crtc"),
        iowr(0xA2, "MODE_SETCRTC", "drm_mode_crtc"),
        iowr(0xA3, "MODE_CURSOR", "drm_mode_cursor"),
        iowr(0xA4, "MODE_GETGAMMA", "drm_mode_crtc_lut"),
        iowr(0xA5, "MODE_SETGAMMA", "drm_mode_crtc_lut"),
        iowr(0xA6, "MODE_GETENCODER", "drm_mode_get_encoder"),
        iowr(0xA7, "MODE_GETCONNECTOR", "drm_mode_get_connector"),
        iowr(0xA8, "MODE_ATTACHMODE", "drm_mode_mode_cmd").deprecated(),
        iowr(0xA9, "MODE_DETACHMODE", "drm_mode_mode_cmd").deprecated(),
        iowr(0xAA, "MODE_GETPROPERTY", "drm_mode_get_property"),
        iowr(0xAB, "MODE_SETPROPERTY", "drm_mode_connector_set_property"),
        iowr(0xAC, "MODE_GETPROPBLOB", "drm_mode_get_blob"),
        iowr(0xAD, "MODE_GETFB", "drm_mode_fb_cmd"),
        iowr(0xAE, "MODE_ADDFB", "drm_mode_fb_cmd"),
        iowr(0xAF, "MODE_RMFB", FieldType::U32),
        iowr(0xB0, "MODE_PAGE_FLIP", "drm_mode_crtc_page_flip"),
        iowr(0xB1, "MODE_DIRTYFB", "drm_mode_fb_dirty_cmd"),
        iowr(0xB2, "MODE_CREATE_DUMB", "drm_mode_create_dumb"),
        iowr(0xB3, "MODE_MAP_DUMB", "drm_mode_map_dumb"),
        iowr(0xB4, "MODE_DESTROY_DUMB", "drm_mode_destroy_dumb"),
        iowr(0xB5, "MODE_GETPLANERESOURCES", "drm_mode_get_plane_res"),
        iowr(0xB6, "MODE_GETPLANE", "drm_mode_get_plane"),
        iowr(0xB7, "MODE_SETPLANE", "drm_mode_set_plane"),
        iowr(0xB8, "MODE_ADDFB2", "drm_mode_fb_cmd2"),
        iowr(0xB9, "MODE_OBJ_GETPROPERTIES", "drm_mode_obj_get_properties"),
        iowr(0xBA, "MODE_OBJ_SETPROPERTY", "drm_mode_obj_set_property"),
        iowr(0xBB, "MODE_CURSOR2", "drm_mode_cursor2"),
        iowr(0xBC, "MODE_ATOMIC", "drm_mode_atomic"),
        iowr(0xBD, "MODE_CREATEPROPBLOB", "drm_mode_create_blob"),
        iowr(0xBE, "MODE_DESTROYPROPBLOB", "drm_mode_destroy_blob"),
    ]
}

fn syncobj_lease_ioctls() -> Vec<IoctlDef> {
    vec![
        iowr(0xBF, "SYNCOBJ_CREATE", "drm_syncobj_create"),
        iowr(0xC0, "SYNCOBJ_DESTROY", "drm_syncobj_destroy"),
        iowr(0xC1, "SYNCOBJ_HANDLE_TO_FD", "drm_syncobj_handle"),
        iowr(0xC2, "SYNCOBJ_FD_TO_HANDLE", "drm_syncobj_handle"),
        iowr(0xC3, "SYNCOBJ_WAIT", "drm_syncobj_wait"),
        iowr(0xC4, "SYNCOBJ_RESET", "drm_syncobj_array"),
        iowr(0xC5, "SYNCOBJ_SIGNAL", "drm_syncobj_array"),
        iowr(0xC6, "MODE_CREATE_LEASE", "drm_mode_create_lease"),
        iowr(0xC7, "MODE_LIST_LESSEES", "drm_mode_list_lessees"),
        iowr(0xC8, "MODE_GET_LEASE", "drm_mode_get_lease"),
        iowr(0xC9, "MODE_REVOKE_LEASE", "drm_mode_revoke_lease"),
    ]
}
