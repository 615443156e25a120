//! C structure layout for a target profile
//!
//! Sizes are computed the way a C compiler for the target would lay the
//! structure out: every member is placed at the next multiple of its
//! alignment, the aggregate is aligned to its strictest member and its size
//! is rounded up to that alignment. Union members all start at offset 0.

use std::collections::HashMap;

use serde::Serialize;

use crate::abi::{FieldType, StructDef, StructKind};
use crate::error::{RegistryError, RegistryResult};
use crate::profiles::TargetProfile;

/// Size and alignment of a type, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeLayout {
    /// `sizeof`
    pub size: u32,
    /// `_Alignof`
    pub align: u32,
}

/// Position of one member inside a structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOffset {
    /// Member name
    pub name: String,
    /// `offsetof`
    pub offset: u32,
    /// Size of the member including array length
    pub size: u32,
}

/// Computes and caches structure layouts against one profile
pub struct LayoutEngine<'a> {
    profile: &'a TargetProfile,
    structs: HashMap<&'a str, &'a StructDef>,
    cache: HashMap<String, TypeLayout>,
    in_progress: Vec<String>,
}

impl<'a> LayoutEngine<'a> {
    /// Index `structs` by name; duplicate names are table corruption
    ///
    /// The profile is validated first, so alignments are never zero.
    pub fn new(structs: &'a [StructDef], profile: &'a TargetProfile) -> RegistryResult<Self> {
        profile.validate()?;
        let mut index = HashMap::with_capacity(structs.len());
        for def in structs {
            if index.insert(def.name.as_str(), def).is_some() {
                return Err(RegistryError::TableCorruption(format!(
                    "structure {} is declared twice",
                    def.name
                )));
            }
        }
        Ok(LayoutEngine {
            profile,
            structs: index,
            cache: HashMap::new(),
            in_progress: Vec::new(),
        })
    }

    /// Layout of any field type
    pub fn type_layout(&mut self, ty: &FieldType) -> RegistryResult<TypeLayout> {
        let p = self.profile;
        let scalar = |n: u32| Ok(TypeLayout { size: n, align: n });
        match ty {
            FieldType::U8 => scalar(1),
            FieldType::U16 => scalar(2),
            FieldType::U32 | FieldType::I32 | FieldType::Int | FieldType::Enum => scalar(4),
            FieldType::U64 | FieldType::I64 => Ok(TypeLayout {
                size: 8,
                align: p.u64_align,
            }),
            FieldType::Long | FieldType::Ulong => scalar(p.long_width),
            FieldType::Size | FieldType::Ptr => scalar(p.pointer_width),
            FieldType::Struct(name) => self.struct_layout(name),
        }
    }

    /// Layout of a named structure or union
    pub fn struct_layout(&mut self, name: &str) -> RegistryResult<TypeLayout> {
        if let Some(layout) = self.cache.get(name) {
            return Ok(*layout);
        }
        let def = *self.structs.get(name).ok_or_else(|| {
            RegistryError::TableCorruption(format!("structure {} is not described", name))
        })?;
        if self.in_progress.iter().any(|n| n == name) {
            return Err(RegistryError::TableCorruption(format!(
                "structure {} contains itself",
                name
            )));
        }

        self.in_progress.push(name.to_string());
        let result = self.compute(def);
        self.in_progress.pop();

        let layout = result?;
        self.cache.insert(name.to_string(), layout);
        Ok(layout)
    }

    /// Member offsets of a structure, in declaration order
    pub fn field_offsets(&mut self, name: &str) -> RegistryResult<Vec<FieldOffset>> {
        let def = *self.structs.get(name).ok_or_else(|| {
            RegistryError::TableCorruption(format!("structure {} is not described", name))
        })?;
        let mut offsets = Vec::with_capacity(def.fields.len());
        let mut cursor = 0u32;
        for field in &def.fields {
            let layout = self.type_layout(&field.ty)?;
            let size = array_size(&def.name, &field.name, layout.size, field.count)?;
            let offset = match def.kind {
                StructKind::Struct => align_up(&def.name, cursor, layout.align)?,
                StructKind::Union => 0,
            };
            cursor = checked(&def.name, offset.checked_add(size))?;
            offsets.push(FieldOffset {
                name: field.name.clone(),
                offset,
                size,
            });
        }
        Ok(offsets)
    }

    fn compute(&mut self, def: &StructDef) -> RegistryResult<TypeLayout> {
        if def.fields.is_empty() {
            return Err(RegistryError::TableCorruption(format!(
                "structure {} has no fields",
                def.name
            )));
        }

        let mut size = 0u32;
        let mut align = 1u32;
        for field in &def.fields {
            let layout = self.type_layout(&field.ty)?;
            let field_size = array_size(&def.name, &field.name, layout.size, field.count)?;
            align = align.max(layout.align);
            size = match def.kind {
                StructKind::Struct => {
                    let offset = align_up(&def.name, size, layout.align)?;
                    checked(&def.name, offset.checked_add(field_size))?
                }
                StructKind::Union => size.max(field_size),
            };
        }

        Ok(TypeLayout {
            size: align_up(&def.name, size, align)?,
            align,
        })
    }
}

fn array_size(owner: &str, field: &str, size: u32, count: u32) -> RegistryResult<u32> {
    if count == 0 {
        return Err(RegistryError::TableCorruption(format!(
            "{}.{} has zero length",
            owner, field
        )));
    }
    checked(owner, size.checked_mul(count))
}

fn align_up(owner: &str, value: u32, align: u32) -> RegistryResult<u32> {
    let rounded = value.checked_add(align - 1).map(|v| v / align * align);
    checked(owner, rounded)
}

fn checked(owner: &str, value: Option<u32>) -> RegistryResult<u32> {
    value.ok_or_else(|| RegistryError::TableCorruption(format!("structure {} is too large", owner)))
}
