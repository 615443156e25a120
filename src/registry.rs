//! The ioctl code and constant registry
//!
//! A [`Registry`] is built once from an [`AbiTable`] and a [`TargetProfile`].
//! Construction computes every payload size, encodes every request code and
//! checks the table for consistency; afterwards the registry is immutable
//! and every lookup is a hash map access.
//!
//! ```
//! use drmreg::{Registry, profiles};
//!
//! let registry = Registry::builtin(&profiles::by_name("x86_64")?)?;
//! let code = registry.lookup("MODE_GETRESOURCES")?;
//! assert_eq!(code.value(), 0xC040_64A0);
//! # Ok::<(), drmreg::RegistryError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::abi::{AbiTable, GroupKind, IoctlDef};
use crate::codec::{Direction, IoctlCode};
use crate::error::{RegistryError, RegistryResult};
use crate::layout::LayoutEngine;
use crate::profiles::{load_profiles, TargetProfile};

/// A fully resolved ioctl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoctlSpec {
    /// Name without the `DRM_IOCTL_` prefix
    pub name: String,
    /// Transfer direction
    pub direction: Direction,
    /// Command number
    pub command_number: u32,
    /// Argument type name, absent for NONE ioctls
    pub payload: Option<String>,
    /// Argument size on the registry's target, 0 for NONE ioctls
    pub payload_size: u32,
    /// Still decodes, must not be used by new code
    pub deprecated: bool,
    /// The argument size differs between at least two known targets
    pub arch_dependent: bool,
    /// Request code on the registry's target
    pub code: IoctlCode,
}

/// A named constant with its group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    /// Constant name
    pub name: String,
    /// Owning group
    pub group: String,
    /// Kernel-assigned value
    pub value: u32,
}

/// An ordered, validated group of constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantGroup {
    /// Group name
    pub name: String,
    /// Combination rule
    pub kind: GroupKind,
    /// Constants in table order
    pub constants: Vec<EnumConstant>,
}

impl ConstantGroup {
    /// Value of a member
    pub fn get(&self, name: &str) -> RegistryResult<u32> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
            .ok_or_else(|| RegistryError::UnknownConstant {
                group: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// First member with this exact value
    pub fn name_of(&self, value: u32) -> Option<&str> {
        self.constants
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.name.as_str())
    }

    /// `(name, value)` pairs in table order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, u32)> {
        self.constants.iter().map(|c| (c.name.as_str(), c.value))
    }
}

/// Immutable lookup tables for one ABI table on one target
#[derive(Debug, Clone)]
pub struct Registry {
    version: String,
    magic: u8,
    profile: TargetProfile,
    specs: Vec<IoctlSpec>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<IoctlCode, usize>,
    groups: Vec<ConstantGroup>,
    groups_by_name: HashMap<String, usize>,
}

static NATIVE: OnceLock<Registry> = OnceLock::new();

fn corruption(msg: String) -> RegistryError {
    error!("ABI table rejected: {}", msg);
    RegistryError::TableCorruption(msg)
}

fn in_context(name: &str, err: RegistryError) -> RegistryError {
    match err {
        RegistryError::TableCorruption(msg) => corruption(format!("{}: {}", name, msg)),
        other => other,
    }
}

impl Registry {
    /// Build a registry, rejecting any inconsistency in the table
    pub fn build(table: &AbiTable, profile: TargetProfile) -> RegistryResult<Self> {
        profile.validate()?;

        let mut engine =
            LayoutEngine::new(&table.structs, &profile).map_err(|e| in_context("structs", e))?;

        // Sizes on every other known data model, for arch_dependent. A custom
        // profile reusing a built-in name is still compared with the original.
        let others: Vec<TargetProfile> = load_profiles()
            .into_iter()
            .filter(|p| p != &profile)
            .collect();
        let mut other_engines = Vec::with_capacity(others.len());
        for other in &others {
            other_engines.push(LayoutEngine::new(&table.structs, other)?);
        }

        let mut specs: Vec<IoctlSpec> = Vec::with_capacity(table.ioctls.len());
        let mut by_name: HashMap<String, usize> = HashMap::with_capacity(table.ioctls.len());
        let mut by_code: HashMap<IoctlCode, usize> = HashMap::with_capacity(table.ioctls.len());
        let mut numbers: HashSet<u32> = HashSet::with_capacity(table.ioctls.len());

        for def in &table.ioctls {
            if by_name.contains_key(&def.name) {
                return Err(corruption(format!("ioctl {} is declared twice", def.name)));
            }
            if !numbers.insert(def.nr) {
                return Err(corruption(format!(
                    "{}: command number {:#04x} is already taken",
                    def.name, def.nr
                )));
            }

            let size = payload_size(&mut engine, def).map_err(|e| in_context(&def.name, e))?;
            if size > profile.ioctl.max_size() {
                return Err(corruption(format!(
                    "{}: payload of {} bytes exceeds the {}-bit size field",
                    def.name, size, profile.ioctl.size_bits
                )));
            }

            let mut arch_dependent = false;
            for other in other_engines.iter_mut() {
                if payload_size(other, def)? != size {
                    arch_dependent = true;
                    break;
                }
            }

            let code = profile
                .ioctl
                .encode(def.direction, u32::from(table.magic), def.nr, size)
                .map_err(|e| corruption(format!("{}: {}", def.name, e)))?;
            // Implied by unique numbers under one type byte; still checked so
            // by_code can never shadow an entry
            if let Some(&i) = by_code.get(&code) {
                return Err(corruption(format!(
                    "{} and {} both encode to {}",
                    specs[i].name, def.name, code
                )));
            }

            by_name.insert(def.name.clone(), specs.len());
            by_code.insert(code, specs.len());
            specs.push(IoctlSpec {
                name: def.name.clone(),
                direction: def.direction,
                command_number: def.nr,
                payload: def.payload.as_ref().map(|p| p.to_string()),
                payload_size: size,
                deprecated: def.deprecated,
                arch_dependent,
                code,
            });
        }

        let mut groups: Vec<ConstantGroup> = Vec::with_capacity(table.groups.len());
        let mut groups_by_name: HashMap<String, usize> = HashMap::with_capacity(table.groups.len());
        for def in &table.groups {
            if groups_by_name.contains_key(&def.name) {
                return Err(corruption(format!("group {} is declared twice", def.name)));
            }
            let mut names = HashSet::new();
            let mut values = HashSet::new();
            let mut constants = Vec::with_capacity(def.constants.len());
            for c in &def.constants {
                if !names.insert(c.name.as_str()) {
                    return Err(corruption(format!(
                        "{}::{} is declared twice",
                        def.name, c.name
                    )));
                }
                if def.kind == GroupKind::Exclusive && !values.insert(c.value) {
                    return Err(corruption(format!(
                        "{}::{} reuses value {:#x} in an exclusive group",
                        def.name, c.name, c.value
                    )));
                }
                constants.push(EnumConstant {
                    name: c.name.clone(),
                    group: def.name.clone(),
                    value: c.value,
                });
            }
            groups_by_name.insert(def.name.clone(), groups.len());
            groups.push(ConstantGroup {
                name: def.name.clone(),
                kind: def.kind,
                constants,
            });
        }

        debug!(
            "Built registry for {} on {}: {} ioctls ({} arch-dependent), {} groups",
            table.version,
            profile.name,
            specs.len(),
            specs.iter().filter(|s| s.arch_dependent).count(),
            groups.len()
        );

        Ok(Registry {
            version: table.version.clone(),
            magic: table.magic,
            profile,
            specs,
            by_name,
            by_code,
            groups,
            groups_by_name,
        })
    }

    /// Registry of the built-in table for `profile`
    pub fn builtin(profile: &TargetProfile) -> RegistryResult<Self> {
        Self::build(&AbiTable::builtin(), profile.clone())
    }

    /// Registry of the built-in table for a named target
    pub fn for_target(name: &str) -> RegistryResult<Self> {
        Self::builtin(&crate::profiles::by_name(name)?)
    }

    /// Process-wide registry for the architecture this crate was compiled for
    ///
    /// Built on first use; concurrent first callers may both build, but all
    /// of them observe the same stored registry.
    pub fn native() -> RegistryResult<&'static Registry> {
        if let Some(registry) = NATIVE.get() {
            return Ok(registry);
        }
        let registry = Self::builtin(&TargetProfile::native()?)?;
        let _ = NATIVE.set(registry);
        NATIVE
            .get()
            .ok_or_else(|| RegistryError::TableCorruption("native registry was not stored".into()))
    }

    /// Request code of an operation
    pub fn lookup(&self, name: &str) -> RegistryResult<IoctlCode> {
        let spec = self.spec(name)?;
        if spec.deprecated {
            warn!("DRM_IOCTL_{} is deprecated", spec.name);
        }
        Ok(spec.code)
    }

    /// Full description of an operation
    pub fn spec(&self, name: &str) -> RegistryResult<&IoctlSpec> {
        self.by_name
            .get(name)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| RegistryError::UnknownOperation(name.to_string()))
    }

    /// Whether an operation is deprecated; unknown names are not
    pub fn is_deprecated(&self, name: &str) -> bool {
        self.spec(name).map(|s| s.deprecated).unwrap_or(false)
    }

    /// Identify a raw request code
    pub fn decode(&self, code: IoctlCode) -> Option<&IoctlSpec> {
        self.by_code.get(&code).map(|&i| &self.specs[i])
    }

    /// All operations in table order
    pub fn operations(&self) -> impl Iterator<Item = &IoctlSpec> {
        self.specs.iter()
    }

    /// A constant group
    pub fn group(&self, group: &str) -> RegistryResult<&ConstantGroup> {
        self.groups_by_name
            .get(group)
            .map(|&i| &self.groups[i])
            .ok_or_else(|| RegistryError::UnknownGroup(group.to_string()))
    }

    /// `(name, value)` pairs of a group in table order
    pub fn lookup_group(&self, group: &str) -> RegistryResult<Vec<(&str, u32)>> {
        Ok(self.group(group)?.pairs().collect())
    }

    /// Value of one constant
    pub fn constant(&self, group: &str, name: &str) -> RegistryResult<u32> {
        self.group(group)?.get(name)
    }

    /// Name of a value, for diagnostics
    pub fn constant_name(&self, group: &str, value: u32) -> RegistryResult<Option<&str>> {
        Ok(self.group(group)?.name_of(value))
    }

    /// All constant groups in table order
    pub fn groups(&self) -> impl Iterator<Item = &ConstantGroup> {
        self.groups.iter()
    }

    /// UAPI revision tag of the source table
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Target the codes were computed for
    pub fn profile(&self) -> &TargetProfile {
        &self.profile
    }

    /// Ioctl type byte
    pub fn magic(&self) -> u8 {
        self.magic
    }
}

fn payload_size(engine: &mut LayoutEngine<'_>, def: &IoctlDef) -> RegistryResult<u32> {
    match (def.direction, &def.payload) {
        (Direction::None, None) => Ok(0),
        (Direction::None, Some(ty)) => Err(RegistryError::TableCorruption(format!(
            "NONE ioctl carries a {} payload",
            ty
        ))),
        (_, None) => Err(RegistryError::TableCorruption(format!(
            "{} ioctl has no payload",
            def.direction
        ))),
        (_, Some(ty)) => Ok(engine.type_layout(ty)?.size),
    }
}
