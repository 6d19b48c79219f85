/*!
Runtime configuration for the core.

`NesConfig` is handed to `Nes::new` and from there to the cartridge mappers.
Everything has a sensible default, so most callers use `NesConfig::default()`
and override a field or two with the `with_*` helpers.
*/

use crate::error::MemoryError;

/// What to do when a mapper rejects an access (CHR-ROM write, disabled
/// PRG-RAM). Addressing errors are always fatal regardless of policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Surface access violations to the caller.
    Strict,
    /// Log at `warn` level and drop the access.
    #[default]
    Lenient,
}

impl AccessPolicy {
    /// Apply the policy to the result of a mapper access.
    ///
    /// Under `Lenient`, an `AccessViolation` becomes `Ok(fallback)`.
    pub fn filter<T>(self, result: Result<T, MemoryError>, fallback: T) -> Result<T, MemoryError> {
        match result {
            Err(err @ MemoryError::AccessViolation { .. }) if self == AccessPolicy::Lenient => {
                log::warn!("{err} (discarded)");
                Ok(fallback)
            }
            other => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NesConfig {
    pub access_policy: AccessPolicy,
    /// Start execution here instead of the reset vector.
    pub entry_point: Option<u16>,
    /// Initial PRG-RAM enable state for mappers that gate it.
    pub prg_ram_enabled_at_power_on: bool,
}

impl Default for NesConfig {
    fn default() -> Self {
        Self {
            access_policy: AccessPolicy::Lenient,
            entry_point: None,
            prg_ram_enabled_at_power_on: true,
        }
    }
}

impl NesConfig {
    pub fn with_access_policy(mut self, policy: AccessPolicy) -> Self {
        self.access_policy = policy;
        self
    }

    pub fn with_entry_point(mut self, pc: u16) -> Self {
        self.entry_point = Some(pc);
        self
    }

    pub fn with_prg_ram_enabled(mut self, enabled: bool) -> Self {
        self.prg_ram_enabled_at_power_on = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AccessKind, AddressSpace};

    #[test]
    fn lenient_swallows_only_access_violations() {
        let violation: Result<u8, MemoryError> = Err(MemoryError::AccessViolation {
            addr: 0x6000,
            kind: AccessKind::PrgRamDisabled,
        });
        assert_eq!(AccessPolicy::Lenient.filter(violation.clone(), 0), Ok(0));
        assert!(AccessPolicy::Strict.filter(violation, 0).is_err());

        let unmapped: Result<u8, MemoryError> = Err(MemoryError::Unmapped {
            space: AddressSpace::Cartridge,
            addr: 0x4000,
        });
        assert!(AccessPolicy::Lenient.filter(unmapped, 0).is_err());
    }

    #[test]
    fn builder_helpers_override_defaults() {
        let cfg = NesConfig::default()
            .with_access_policy(AccessPolicy::Strict)
            .with_entry_point(0xC000)
            .with_prg_ram_enabled(false);
        assert_eq!(cfg.access_policy, AccessPolicy::Strict);
        assert_eq!(cfg.entry_point, Some(0xC000));
        assert!(!cfg.prg_ram_enabled_at_power_on);
    }
}
