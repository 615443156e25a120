//! Combining and testing flag constants
//!
//! Bitmask groups combine with OR and test membership with AND. Exclusive
//! groups hold codes that are never OR-ed together, so combining more than
//! one of them is an error and membership means equality.

use crate::abi::GroupKind;
use crate::error::{RegistryError, RegistryResult};
use crate::registry::{ConstantGroup, Registry};

impl ConstantGroup {
    /// OR the named members together
    ///
    /// An exclusive group accepts exactly one name.
    pub fn combine(&self, names: &[&str]) -> RegistryResult<u32> {
        if self.kind == GroupKind::Exclusive && names.len() != 1 {
            return Err(RegistryError::InvalidCombination {
                group: self.name.clone(),
                names: names.iter().map(|n| n.to_string()).collect(),
            });
        }
        names
            .iter()
            .try_fold(0u32, |mask, name| -> RegistryResult<u32> {
                Ok(mask | self.get(name)?)
            })
    }

    /// Whether `mask` holds the named member
    pub fn contains(&self, mask: u32, name: &str) -> RegistryResult<bool> {
        let value = self.get(name)?;
        Ok(match self.kind {
            GroupKind::Exclusive => mask == value,
            GroupKind::Bitmask if value == 0 => mask == 0,
            GroupKind::Bitmask => mask & value == value,
        })
    }

    /// Names of all members present in `mask`, in table order
    pub fn decompose(&self, mask: u32) -> Vec<&str> {
        self.constants
            .iter()
            .filter(|c| match self.kind {
                GroupKind::Exclusive => c.value == mask,
                GroupKind::Bitmask if c.value == 0 => mask == 0,
                GroupKind::Bitmask => mask & c.value == c.value,
            })
            .map(|c| c.name.as_str())
            .collect()
    }
}

impl Registry {
    /// Combine constants of a group, see [`ConstantGroup::combine`]
    pub fn combine(&self, group: &str, names: &[&str]) -> RegistryResult<u32> {
        self.group(group)?.combine(names)
    }

    /// Test a mask for a constant, see [`ConstantGroup::contains`]
    pub fn contains(&self, group: &str, mask: u32, name: &str) -> RegistryResult<bool> {
        self.group(group)?.contains(mask, name)
    }

    /// Explain a mask, see [`ConstantGroup::decompose`]
    pub fn decompose(&self, group: &str, mask: u32) -> RegistryResult<Vec<&str>> {
        Ok(self.group(group)?.decompose(mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        Registry::for_target("x86_64").unwrap()
    }

    #[test]
    fn test_bitmask_combine() {
        let reg = registry();
        let mask = reg
            .combine("atomic_flag", &["TEST_ONLY", "ALLOW_MODESET"])
            .unwrap();
        assert_eq!(mask, 0x0500);
        assert!(reg.contains("atomic_flag", mask, "TEST_ONLY").unwrap());
        assert!(!reg.contains("atomic_flag", mask, "NONBLOCK").unwrap());
        assert_eq!(reg.combine("atomic_flag", &[]).unwrap(), 0);
    }

    #[test]
    fn test_multi_bit_members() {
        let reg = registry();
        // CLOCK_C is BUILTIN | bit 1
        let mask = reg.combine("mode_type", &["BUILTIN"]).unwrap();
        assert!(!reg.contains("mode_type", mask, "CLOCK_C").unwrap());
        assert_eq!(
            reg.decompose("mode_type", 3 | 8).unwrap(),
            vec!["BUILTIN", "CLOCK_C", "PREFERRED"]
        );
    }

    #[test]
    fn test_exclusive_rejects_combination() {
        let reg = registry();
        let err = reg
            .combine("connector_type", &["HDMIA", "DisplayPort"])
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCombination { .. }));

        assert_eq!(reg.combine("connector_type", &["eDP"]).unwrap(), 14);
        assert!(reg.contains("connector_type", 14, "eDP").unwrap());
        assert!(!reg.contains("connector_type", 15, "eDP").unwrap());
        assert_eq!(reg.decompose("encoder_type", 0).unwrap(), vec!["NONE"]);
    }

    #[test]
    fn test_unknown_names() {
        let reg = registry();
        assert!(matches!(
            reg.combine("atomic_flag", &["TEST_ONLY", "FAST"]),
            Err(RegistryError::UnknownConstant { .. })
        ));
        assert!(matches!(
            reg.contains("flavours", 0, "X"),
            Err(RegistryError::UnknownGroup(_))
        ));
    }
}
