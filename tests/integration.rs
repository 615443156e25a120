use drmreg::abi::{iow, FieldType};
use drmreg::codec::{Direction, IoctlCode};
use drmreg::verify::{diff_targets, verify_against, ReferenceCodes, Snapshot};
use drmreg::{profiles, AbiTable, Registry, RegistryError};
use pretty_assertions::assert_eq;
use rstest::rstest;

const X86_64_REFERENCE: &str = include_str!("../reference/x86_64.json");
const I686_REFERENCE: &str = include_str!("../reference/i686.json");

fn registry(target: &str) -> Registry {
    Registry::for_target(target).unwrap()
}

#[rstest]
#[case("x86_64", "VERSION", 0xc040_6400)]
#[case("x86_64", "GET_MAGIC", 0x8004_6402)]
#[case("x86_64", "SET_MASTER", 0x0000_641e)]
#[case("x86_64", "SET_CLIENT_CAP", 0x4010_640d)]
#[case("x86_64", "MODE_GETRESOURCES", 0xc040_64a0)]
#[case("x86_64", "MODE_GETCRTC", 0xc068_64a1)]
#[case("x86_64", "MODE_GETCONNECTOR", 0xc050_64a7)]
#[case("x86_64", "MODE_RMFB", 0xc004_64af)]
#[case("x86_64", "MODE_PAGE_FLIP", 0xc018_64b0)]
#[case("x86_64", "MODE_CREATE_DUMB", 0xc020_64b2)]
#[case("x86_64", "MODE_ADDFB2", 0xc068_64b8)]
#[case("x86_64", "MODE_ATOMIC", 0xc038_64bc)]
#[case("x86_64", "WAIT_VBLANK", 0xc018_643a)]
#[case("x86_64", "CRTC_GET_SEQUENCE", 0xc018_643b)]
#[case("x86_64", "SYNCOBJ_HANDLE_TO_FD", 0xc010_64c1)]
#[case("x86_64", "MODE_LIST_LESSEES", 0xc010_64c7)]
#[case("i686", "VERSION", 0xc024_6400)]
#[case("i686", "SYNCOBJ_WAIT", 0xc020_64c3)]
#[case("i686", "MODE_GETPLANERESOURCES", 0xc00c_64b5)]
#[case("i686", "MODE_OBJ_GETPROPERTIES", 0xc01c_64b9)]
#[case("i686", "WAIT_VBLANK", 0xc010_643a)]
#[case("powerpc64", "SET_MASTER", 0x2000_641e)]
#[case("powerpc64", "GET_MAGIC", 0x4004_6402)]
#[case("powerpc64", "SET_CLIENT_CAP", 0x8010_640d)]
#[case("powerpc64", "MODE_GETRESOURCES", 0xc040_64a0)]
#[case("powerpc64", "MODE_REVOKE_LEASE", 0xc004_64c9)]
fn test_known_codes(#[case] target: &str, #[case] name: &str, #[case] expected: u32) {
    assert_eq!(registry(target).lookup(name).unwrap().value(), expected);
}

#[rstest]
#[case("x86_64", X86_64_REFERENCE)]
#[case("i686", I686_REFERENCE)]
fn test_matches_compiled_headers(#[case] target: &str, #[case] json: &str) {
    let reference = ReferenceCodes::from_json(json).unwrap();
    assert_eq!(reference.target, target);

    let report = verify_against(&registry(target), &reference).unwrap();
    assert!(report.mismatches.is_empty(), "{:?}", report.mismatches);
    assert!(report.missing.is_empty());
    assert!(report.uncovered.is_empty());
    assert_eq!(report.checked, 101);
}

#[test]
fn test_decoding_reproduces_table() {
    for target in ["x86_64", "i686", "armv7", "powerpc", "mips64"] {
        let reg = registry(target);
        let layout = reg.profile().ioctl;
        for spec in reg.operations() {
            let d = layout.decode(spec.code).unwrap();
            assert_eq!(d.direction, spec.direction, "{} on {}", spec.name, target);
            assert_eq!(d.nr, spec.command_number);
            assert_eq!(d.size, spec.payload_size);
            assert_eq!(d.ty, u32::from(b'd'));
            assert_eq!(reg.decode(spec.code).unwrap().name, spec.name);
        }
    }
}

#[test]
fn test_codes_are_unique() {
    let reg = registry("x86_64");
    let mut codes: Vec<IoctlCode> = reg.operations().map(|s| s.code).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), reg.operations().count());
}

#[test]
fn test_lookup_is_idempotent() {
    let reg = registry("aarch64");
    let first = reg.lookup("MODE_SETPLANE").unwrap();
    for _ in 0..3 {
        assert_eq!(reg.lookup("MODE_SETPLANE").unwrap(), first);
    }
}

#[test]
fn test_none_ioctls_have_no_size() {
    let reg = registry("x86_64");
    for spec in reg.operations().filter(|s| s.direction == Direction::None) {
        assert_eq!(spec.payload_size, 0, "{}", spec.name);
        assert_eq!(spec.payload, None);
    }
}

#[test]
fn test_other_target_changes_only_sizes() {
    let x86_64 = registry("x86_64");
    let i686 = registry("i686");
    let diff = diff_targets(&x86_64, &i686);

    assert_eq!(diff.changed.len(), 31);
    assert!(diff.only_left.is_empty() && diff.only_right.is_empty());
    assert!(diff.constants.is_empty());

    let layout = x86_64.profile().ioctl;
    for change in &diff.changed {
        let l = layout.decode(change.left).unwrap();
        let r = layout.decode(change.right).unwrap();
        assert_eq!(l.nr, r.nr);
        assert_eq!(l.direction, r.direction);
        assert_ne!(l.size, r.size);
        assert!(x86_64.spec(&change.name).unwrap().arch_dependent);
    }
}

#[test]
fn test_pixel_formats_combine() {
    let reg = registry("x86_64");
    let mask = reg
        .combine("pixel_format", &["XRGB8888", "ARGB8888"])
        .unwrap();
    assert_eq!(
        mask,
        reg.constant("pixel_format", "XRGB8888").unwrap()
            | reg.constant("pixel_format", "ARGB8888").unwrap()
    );
    assert!(reg.contains("pixel_format", mask, "XRGB8888").unwrap());
    assert!(reg.contains("pixel_format", mask, "ARGB8888").unwrap());
}

#[test]
fn test_connector_types_do_not_combine() {
    let reg = registry("x86_64");
    match reg.combine("connector_type", &["HDMIA", "VGA"]) {
        Err(RegistryError::InvalidCombination { group, names }) => {
            assert_eq!(group, "connector_type");
            assert_eq!(names, vec!["HDMIA", "VGA"]);
        }
        other => panic!("expected InvalidCombination, got {:?}", other),
    }
}

#[test]
fn test_json_table_builds_identical_registry() {
    let json = AbiTable::builtin().to_json().unwrap();
    let table = AbiTable::from_json(&json).unwrap();
    let profile = profiles::by_name("x86_64").unwrap();

    let from_json = Registry::build(&table, profile.clone()).unwrap();
    let builtin = Registry::builtin(&profile).unwrap();

    let a: Vec<_> = from_json.operations().cloned().collect();
    let b: Vec<_> = builtin.operations().cloned().collect();
    assert_eq!(a, b);
    let a: Vec<_> = from_json.groups().cloned().collect();
    let b: Vec<_> = builtin.groups().cloned().collect();
    assert_eq!(a, b);
}

#[test]
fn test_corrupt_json_table() {
    let profile = profiles::by_name("x86_64").unwrap();

    let err = AbiTable::from_json("not json").unwrap_err();
    assert!(matches!(err, RegistryError::TableCorruption(_)));

    // A NONE ioctl with a payload
    let mut table = AbiTable::builtin();
    if let Some(def) = table.ioctls.iter_mut().find(|d| d.name == "MODE_GETCRTC") {
        def.direction = Direction::None;
    }
    assert!(matches!(
        Registry::build(&table, profile.clone()),
        Err(RegistryError::TableCorruption(_))
    ));

    // A payload that is not described
    let mut table = AbiTable::builtin();
    table.structs.retain(|s| s.name != "drm_mode_modeinfo");
    let err = Registry::build(&table, profile.clone()).unwrap_err();
    assert!(err.to_string().contains("drm_mode_modeinfo"));

    // Two names for one command number
    let mut table = AbiTable::builtin();
    table
        .ioctls
        .push(iow(0x0d, "SET_CLIENT_CAP_NARROW", FieldType::U32));
    assert!(Registry::build(&table, profile).is_err());
}

#[test]
fn test_snapshot_export() {
    let reg = registry("x86_64");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    Snapshot::from_registry(&reg).export_json(&path).unwrap();

    let snapshot = Snapshot::load(&path).unwrap();
    assert_eq!(snapshot.version, drmreg::DRM_UAPI_VERSION);
    assert_eq!(snapshot.profile.name, "x86_64");
    assert_eq!(snapshot.ioctls.len(), 101);
    let getres = snapshot
        .ioctls
        .iter()
        .find(|s| s.name == "MODE_GETRESOURCES")
        .unwrap();
    assert_eq!(getres.code, IoctlCode::new(0xc040_64a0));
}

#[test]
fn test_reference_file_round_trip() {
    let reg = registry("riscv64");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("riscv64.json");
    std::fs::write(&path, ReferenceCodes::from_registry(&reg).to_json().unwrap()).unwrap();

    let reference = ReferenceCodes::load(&path).unwrap();
    assert!(verify_against(&reg, &reference).unwrap().is_ok());
    // riscv64 shares the x86_64 data model
    let x86_64 = ReferenceCodes::from_json(X86_64_REFERENCE).unwrap();
    assert_eq!(reference.codes, x86_64.codes);
}
