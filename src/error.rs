/*!
Error taxonomy for the emulation core.

Three kinds of failure exist and none of them is transient:

- Addressing errors (`MemoryError::Unmapped`): an offset outside the range a
  bus or mapper documents. These point at a core invariant violation.
- Access violations (`MemoryError::AccessViolation`): a well-formed address
  whose storage refuses the access (CHR-ROM writes, disabled PRG-RAM). Some
  test ROMs probe this boundary on purpose, so it is kept distinct and the
  `AccessPolicy` in `config` decides whether it is fatal.
- Configuration errors (`ConfigError`): unknown opcode, an addressing mode
  that has no memory address, unsupported mapper id, malformed ROM image.
*/

use std::fmt;

use thiserror::Error;

/// Which address space an unmapped access was aimed at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressSpace {
    Cpu,
    Ppu,
    Cartridge,
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressSpace::Cpu => "CPU",
            AddressSpace::Ppu => "PPU",
            AddressSpace::Cartridge => "cartridge",
        };
        f.write_str(name)
    }
}

/// Storage that rejected an access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessKind {
    ChrRomWrite,
    PrgRomWrite,
    PrgRamDisabled,
    PrgRamWriteProtected,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            AccessKind::ChrRomWrite => "write to CHR-ROM",
            AccessKind::PrgRomWrite => "write to PRG-ROM",
            AccessKind::PrgRamDisabled => "PRG-RAM access while disabled",
            AccessKind::PrgRamWriteProtected => "write to write-protected PRG-RAM",
        };
        f.write_str(what)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address ${addr:04X} is outside the {space} address space")]
    Unmapped { space: AddressSpace, addr: u16 },

    #[error("access violation at ${addr:04X}: {kind}")]
    AccessViolation { addr: u16, kind: AccessKind },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown opcode ${opcode:02X} at ${pc:04X}")]
    UnknownOpcode { opcode: u8, pc: u16 },

    #[error("addressing mode {0} does not resolve to a memory address")]
    UnresolvableMode(&'static str),

    #[error("unsupported mapper: {0}")]
    UnsupportedMapper(u16),

    #[error("invalid iNES image: {0}")]
    InvalidRom(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error returned by the CPU, PPU and orchestrator ticks.
#[derive(Debug, Error)]
pub enum NesError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_address() {
        let e = MemoryError::Unmapped {
            space: AddressSpace::Ppu,
            addr: 0x4000,
        };
        assert_eq!(e.to_string(), "address $4000 is outside the PPU address space");

        let e = MemoryError::AccessViolation {
            addr: 0x0010,
            kind: AccessKind::ChrRomWrite,
        };
        assert_eq!(e.to_string(), "access violation at $0010: write to CHR-ROM");
    }

    #[test]
    fn umbrella_wraps_both_kinds() {
        let e: NesError = ConfigError::UnknownOpcode {
            opcode: 0x02,
            pc: 0x8000,
        }
        .into();
        assert!(matches!(e, NesError::Config(_)));
        assert_eq!(e.to_string(), "unknown opcode $02 at $8000");
    }
}
