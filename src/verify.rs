//! Snapshots and diffs of built registries
//!
//! The offline check for the hand-maintained table: request codes captured
//! by compiling the kernel headers for a target are stored as a
//! [`ReferenceCodes`] file and compared with what a [`Registry`] computes for
//! the same target.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::codec::IoctlCode;
use crate::error::{RegistryError, RegistryResult};
use crate::profiles::TargetProfile;
use crate::registry::{ConstantGroup, IoctlSpec, Registry};

/// Everything a registry computed, for archiving or external diffing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// UAPI revision of the source table
    pub version: String,
    /// Version of this crate
    pub generator: String,
    /// Creation time
    pub generated_at: DateTime<Utc>,
    /// Target the codes were computed for
    pub profile: TargetProfile,
    /// Resolved ioctls in table order
    pub ioctls: Vec<IoctlSpec>,
    /// Constant groups in table order
    pub groups: Vec<ConstantGroup>,
}

impl Snapshot {
    /// Capture a registry
    pub fn from_registry(registry: &Registry) -> Self {
        Snapshot {
            version: registry.version().to_string(),
            generator: format!("drmreg {}", crate::VERSION),
            generated_at: Utc::now(),
            profile: registry.profile().clone(),
            ioctls: registry.operations().cloned().collect(),
            groups: registry.groups().cloned().collect(),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to a file as pretty JSON
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> RegistryResult<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self)?;
        info!(
            "Wrote snapshot of {} ioctls for {} to {}",
            self.ioctls.len(),
            self.profile.name,
            path.as_ref().display()
        );
        Ok(())
    }

    /// Read a previously exported snapshot
    pub fn load<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Request codes captured from compiled kernel headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCodes {
    /// Target the headers were compiled for
    pub target: String,
    /// How the codes were produced
    #[serde(default)]
    pub source: String,
    /// Code per ioctl name
    pub codes: BTreeMap<String, IoctlCode>,
}

impl ReferenceCodes {
    /// Parse a reference file's contents
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let reference: ReferenceCodes = serde_json::from_str(json)?;
        debug!(
            "Loaded {} reference codes for {}",
            reference.codes.len(),
            reference.target
        );
        Ok(reference)
    }

    /// Read a reference file
    pub fn load<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Codes of a registry in reference form
    pub fn from_registry(registry: &Registry) -> Self {
        ReferenceCodes {
            target: registry.profile().name.clone(),
            source: format!("drmreg {} ({})", crate::VERSION, registry.version()),
            codes: registry
                .operations()
                .map(|s| (s.name.clone(), s.code))
                .collect(),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> RegistryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One ioctl whose code disagrees with the reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Ioctl name
    pub name: String,
    /// Code from the reference
    pub expected: IoctlCode,
    /// Code from the registry
    pub actual: IoctlCode,
}

/// Result of [`verify_against`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    /// Ioctls present on both sides
    pub checked: usize,
    /// Ioctls whose codes differ
    pub mismatches: Vec<Mismatch>,
    /// In the reference but unknown to the registry
    pub missing: Vec<String>,
    /// In the registry but not covered by the reference
    pub uncovered: Vec<String>,
}

impl VerifyReport {
    /// No mismatches and nothing missing
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty() && self.missing.is_empty()
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} checked, {} mismatched, {} missing, {} uncovered",
            self.checked,
            self.mismatches.len(),
            self.missing.len(),
            self.uncovered.len()
        )?;
        for m in &self.mismatches {
            writeln!(f, "  {:<28} expected {} got {}", m.name, m.expected, m.actual)?;
        }
        for name in &self.missing {
            writeln!(f, "  {:<28} missing from registry", name)?;
        }
        Ok(())
    }
}

/// Compare a registry with captured reference codes
///
/// Fails with [`RegistryError::UnsupportedTarget`] when the reference was
/// captured for a different target than the registry was built for.
pub fn verify_against(registry: &Registry, reference: &ReferenceCodes) -> RegistryResult<VerifyReport> {
    if !registry.profile().matches(&reference.target) {
        return Err(RegistryError::UnsupportedTarget(format!(
            "reference is for {}, registry is for {}",
            reference.target,
            registry.profile().name
        )));
    }

    let mut report = VerifyReport::default();
    for (name, &expected) in &reference.codes {
        match registry.spec(name) {
            Ok(spec) => {
                report.checked += 1;
                if spec.code != expected {
                    warn!("{}: expected {}, computed {}", name, expected, spec.code);
                    report.mismatches.push(Mismatch {
                        name: name.clone(),
                        expected,
                        actual: spec.code,
                    });
                }
            }
            Err(_) => report.missing.push(name.clone()),
        }
    }
    report.uncovered = registry
        .operations()
        .filter(|s| !reference.codes.contains_key(&s.name))
        .map(|s| s.name.clone())
        .collect();
    Ok(report)
}

/// An ioctl whose code differs between two targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeChange {
    /// Ioctl name
    pub name: String,
    /// Code on the left target
    pub left: IoctlCode,
    /// Code on the right target
    pub right: IoctlCode,
    /// Payload size on the left target
    pub left_size: u32,
    /// Payload size on the right target
    pub right_size: u32,
}

/// A constant whose value differs between two registries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantChange {
    /// Group name
    pub group: String,
    /// Constant name
    pub name: String,
    /// Value on the left
    pub left: Option<u32>,
    /// Value on the right
    pub right: Option<u32>,
}

/// Result of [`diff_targets`]
#[derive(Debug, Clone, Serialize)]
pub struct TargetDiff {
    /// Left target name
    pub left: String,
    /// Right target name
    pub right: String,
    /// Ioctls with different codes, in left table order
    pub changed: Vec<CodeChange>,
    /// Ioctls only known on the left
    pub only_left: Vec<String>,
    /// Ioctls only known on the right
    pub only_right: Vec<String>,
    /// Constants that differ
    pub constants: Vec<ConstantChange>,
}

impl TargetDiff {
    /// Whether both registries agree completely
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
            && self.only_left.is_empty()
            && self.only_right.is_empty()
            && self.constants.is_empty()
    }
}

impl fmt::Display for TargetDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} vs {}: {} codes differ",
            self.left,
            self.right,
            self.changed.len()
        )?;
        for c in &self.changed {
            writeln!(
                f,
                "  {:<28} {} ({:>3} bytes)  {} ({:>3} bytes)",
                c.name, c.left, c.left_size, c.right, c.right_size
            )?;
        }
        for name in &self.only_left {
            writeln!(f, "  {:<28} only on {}", name, self.left)?;
        }
        for name in &self.only_right {
            writeln!(f, "  {:<28} only on {}", name, self.right)?;
        }
        for c in &self.constants {
            writeln!(f, "  {}::{} {:?} vs {:?}", c.group, c.name, c.left, c.right)?;
        }
        Ok(())
    }
}

/// Compare two registries, typically the same table on two targets
pub fn diff_targets(left: &Registry, right: &Registry) -> TargetDiff {
    let mut changed = Vec::new();
    let mut only_left = Vec::new();
    for l in left.operations() {
        match right.spec(&l.name) {
            Ok(r) if r.code != l.code => changed.push(CodeChange {
                name: l.name.clone(),
                left: l.code,
                right: r.code,
                left_size: l.payload_size,
                right_size: r.payload_size,
            }),
            Ok(_) => {}
            Err(_) => only_left.push(l.name.clone()),
        }
    }
    let only_right = right
        .operations()
        .filter(|r| left.spec(&r.name).is_err())
        .map(|r| r.name.clone())
        .collect();

    let mut constants = Vec::new();
    let mut seen = Vec::new();
    for g in left.groups() {
        for c in &g.constants {
            let other = right.constant(&g.name, &c.name).ok();
            if other != Some(c.value) {
                constants.push(ConstantChange {
                    group: g.name.clone(),
                    name: c.name.clone(),
                    left: Some(c.value),
                    right: other,
                });
            }
            seen.push((g.name.as_str(), c.name.as_str()));
        }
    }
    for g in right.groups() {
        for c in &g.constants {
            if !seen.contains(&(g.name.as_str(), c.name.as_str())) {
                constants.push(ConstantChange {
                    group: g.name.clone(),
                    name: c.name.clone(),
                    left: None,
                    right: Some(c.value),
                });
            }
        }
    }

    TargetDiff {
        left: left.profile().name.clone(),
        right: right.profile().name.clone(),
        changed,
        only_left,
        only_right,
        constants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_self_reference_verifies() {
        let reg = Registry::for_target("aarch64").unwrap();
        let reference = ReferenceCodes::from_registry(&reg);
        let report = verify_against(&reg, &reference).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.checked, 101);
        assert!(report.uncovered.is_empty());
    }

    #[test]
    fn test_mismatch_and_missing() {
        let reg = Registry::for_target("x86_64").unwrap();
        let mut reference = ReferenceCodes::from_registry(&reg);
        reference
            .codes
            .insert("VERSION".into(), IoctlCode::new(0xc024_6400));
        reference
            .codes
            .insert("SYNCOBJ_CREATE".into(), IoctlCode::new(0xc00864bf));
        reference.codes.remove("GET_MAGIC");

        let report = verify_against(&reg, &reference).unwrap();
        assert!(!report.is_ok());
        assert_eq!(
            report.mismatches,
            vec![Mismatch {
                name: "VERSION".into(),
                expected: IoctlCode::new(0xc024_6400),
                actual: IoctlCode::new(0xc040_6400),
            }]
        );
        assert_eq!(report.missing, vec!["SYNCOBJ_CREATE".to_string()]);
        assert_eq!(report.uncovered, vec!["GET_MAGIC".to_string()]);
        assert!(report.to_string().contains("1 mismatched"));
    }

    #[test]
    fn test_wrong_target() {
        let reg = Registry::for_target("x86_64").unwrap();
        let mut reference = ReferenceCodes::from_registry(&reg);
        reference.target = "i686".into();
        assert!(matches!(
            verify_against(&reg, &reference),
            Err(RegistryError::UnsupportedTarget(_))
        ));
    }

    #[test]
    fn test_diff_same_target_is_empty() {
        let a = Registry::for_target("riscv64").unwrap();
        let b = Registry::for_target("aarch64").unwrap();
        assert!(diff_targets(&a, &b).is_empty());
    }

    #[test]
    fn test_snapshot_file() {
        let reg = Registry::for_target("armv7").unwrap();
        let snapshot = Snapshot::from_registry(&reg);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("armv7.json");
        snapshot.export_json(&path).unwrap();

        let back = Snapshot::load(&path).unwrap();
        assert_eq!(back.version, snapshot.version);
        assert_eq!(back.generated_at, snapshot.generated_at);
        assert_eq!(back.profile, snapshot.profile);
        assert_eq!(back.ioctls, snapshot.ioctls);
        assert_eq!(back.groups, snapshot.groups);
    }
}
