//! Per-revision register access rights and revision-specific constants

use crate::registers::names::{BANSHEE_REGISTER_NAMES, VOODOO_REGISTER_NAMES};
use crate::registers::NUM_REGISTERS;
use bincode::{Decode, Encode};
use proc_bitfield::bitfield;
use std::fmt::{Display, Formatter};

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct RegisterAccess(u8): Debug, FromStorage, IntoStorage {
        pub read: bool @ 0,
        pub write: bool @ 1,
        // Writes wait for in-flight rendering before taking effect
        pub pipelined: bool @ 2,
        // Writes go through the PCI FIFO
        pub fifo: bool @ 3,
        // Writes reach the register file regardless of chip select
        pub write_through: bool @ 4,
    }
}

const READ: u8 = 0x01;
const WRITE: u8 = 0x02;
const PIPELINED: u8 = 0x04;
const FIFO: u8 = 0x08;
const WRITE_THROUGH: u8 = 0x10;

const NONE: RegisterAccess = RegisterAccess(0);
const R: RegisterAccess = RegisterAccess(READ);
const W: RegisterAccess = RegisterAccess(WRITE);
const RW: RegisterAccess = RegisterAccess(READ | WRITE);
const WT: RegisterAccess = RegisterAccess(WRITE | WRITE_THROUGH);
const RWT: RegisterAccess = RegisterAccess(READ | WRITE | WRITE_THROUGH);
const WF: RegisterAccess = RegisterAccess(WRITE | FIFO);
const RWF: RegisterAccess = RegisterAccess(READ | WRITE | FIFO);
const WPF: RegisterAccess = RegisterAccess(WRITE | PIPELINED | FIFO);
const RWPF: RegisterAccess = RegisterAccess(READ | WRITE | PIPELINED | FIFO);

#[rustfmt::skip]
const VOODOO1_ACCESS: [RegisterAccess; NUM_REGISTERS] = [
    // 0x000
    R,    NONE, WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x040
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x080
    WPF,  NONE, WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x0C0
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x100
    WPF,  RWPF, RWPF, RWPF, RWF,  RWPF, RWPF, RWPF, WPF,  WPF,  WPF,  WF,   WF,   WF,   NONE, NONE,
    // 0x140
    RWPF, RWPF, RWPF, R,    R,    R,    R,    R,    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x180
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x1C0
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x200
    RW,   R,    RW,   RW,   RW,   RW,   RW,   RW,   W,    W,    W,    W,    W,    NONE, NONE, NONE,
    // 0x240
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x280
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x2C0
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x300
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x340
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x380
    WF,   NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x3C0
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
];

#[rustfmt::skip]
const VOODOO2_ACCESS: [RegisterAccess; NUM_REGISTERS] = [
    // 0x000
    R,    RWT,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x040
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x080
    WPF,  NONE, WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x0C0
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x100
    WPF,  RWPF, RWPF, RWPF, RWF,  RWPF, RWPF, RWPF, WPF,  WPF,  WPF,  WF,   WF,   WF,   WF,   WPF,
    // 0x140
    RWPF, RWPF, RWPF, R,    R,    R,    R,    R,    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x180
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x1C0
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   RWT,  RWT,  RWT,  RWT,  RWT,  RWT,  RWT,  NONE,
    // 0x200
    RWT,  R,    RWT,  RWT,  RWT,  RWT,  RWT,  RWT,  WT,   WT,   WF,   WT,   WT,   WT,   WT,   WT,
    // 0x240
    R,    RWT,  RWT,  RWT,  NONE, NONE, R,    R,    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x280
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x2C0
    RWPF, RWPF, RWPF, RWPF, RWPF, RWPF, RWPF, NONE, RWPF, RWPF, RWPF, RWPF, RWPF, NONE, RWPF, WPF,
    // 0x300
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x340
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x380
    WF,   NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x3C0
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
];

#[rustfmt::skip]
const BANSHEE_ACCESS: [RegisterAccess; NUM_REGISTERS] = [
    // 0x000
    R,    NONE, WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x040
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x080
    WPF,  NONE, WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x0C0
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x100
    WPF,  RWPF, RWPF, RWPF, RWF,  RWPF, RWPF, RWPF, WPF,  WPF,  WPF,  WF,   WF,   WF,   WF,   WPF,
    // 0x140
    RWPF, RWPF, RWPF, R,    R,    R,    R,    R,    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x180
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x1C0
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   NONE, NONE, NONE, RWPF, RWPF, RWPF, RWPF, NONE,
    // 0x200
    RWPF, RWPF, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x240
    NONE, NONE, NONE, WT,   RWF,  RWF,  R,    R,    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,
    // 0x280
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x2C0
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x300
    WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WPF,  WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x340
    WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,   WF,
    // 0x380
    WF,   NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
    // 0x3C0
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Revision {
    Voodoo1,
    #[default]
    Voodoo2,
    Banshee,
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Voodoo1 => write!(f, "Voodoo Graphics"),
            Self::Voodoo2 => write!(f, "Voodoo 2"),
            Self::Banshee => write!(f, "Voodoo Banshee"),
        }
    }
}

impl Revision {
    pub fn config(self) -> &'static RevisionConfig {
        match self {
            Self::Voodoo1 => &VOODOO1_CONFIG,
            Self::Voodoo2 => &VOODOO2_CONFIG,
            Self::Banshee => &BANSHEE_CONFIG,
        }
    }

    pub fn is_voodoo2_or_later(self) -> bool {
        self != Self::Voodoo1
    }
}

// Immutable description of one chip revision, selected once at construction
#[derive(Debug)]
pub struct RevisionConfig {
    pub revision: Revision,
    access: &'static [RegisterAccess; NUM_REGISTERS],
    names: &'static [&'static str; NUM_REGISTERS],
    // Mask applied to fog table deltas before the per-pixel multiply
    pub fog_delta_mask: i32,
    // Fractional bits kept for bilinear filtering weights
    pub bilinear_mask: i32,
    pub texture_address_mask: u32,
    pub texture_address_shift: u32,
    // Frame buffer tile width used to derive the row pitch from fbiInit1
    pub tile_width: u32,
    pub palette_alpha: bool,
    pub banshee_layout: bool,
}

static VOODOO1_CONFIG: RevisionConfig = RevisionConfig {
    revision: Revision::Voodoo1,
    access: &VOODOO1_ACCESS,
    names: &VOODOO_REGISTER_NAMES,
    fog_delta_mask: 0xFF,
    bilinear_mask: 0xF0,
    texture_address_mask: 0x0FFFFF,
    texture_address_shift: 3,
    tile_width: 64,
    palette_alpha: false,
    banshee_layout: false,
};

static VOODOO2_CONFIG: RevisionConfig = RevisionConfig {
    revision: Revision::Voodoo2,
    access: &VOODOO2_ACCESS,
    names: &VOODOO_REGISTER_NAMES,
    fog_delta_mask: 0xFC,
    bilinear_mask: 0xFF,
    texture_address_mask: 0x0FFFFF,
    texture_address_shift: 3,
    tile_width: 32,
    palette_alpha: true,
    banshee_layout: false,
};

static BANSHEE_CONFIG: RevisionConfig = RevisionConfig {
    revision: Revision::Banshee,
    access: &BANSHEE_ACCESS,
    names: &BANSHEE_REGISTER_NAMES,
    fog_delta_mask: 0xFC,
    bilinear_mask: 0xFF,
    texture_address_mask: 0xFFFFF0,
    texture_address_shift: 0,
    tile_width: 32,
    palette_alpha: true,
    banshee_layout: true,
};

impl RevisionConfig {
    pub fn access(&self, register: usize) -> RegisterAccess {
        self.access[register & (NUM_REGISTERS - 1)]
    }

    pub fn name(&self, register: usize) -> &'static str {
        self.names[register & (NUM_REGISTERS - 1)]
    }

    // Case-insensitive reverse lookup, used by trace tooling
    pub fn find_register(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Register;

    #[test]
    fn statistics_registers_are_read_only() {
        for revision in [Revision::Voodoo1, Revision::Voodoo2, Revision::Banshee] {
            let config = revision.config();
            for register in Register::FBI_PIXELS_IN..=Register::FBI_PIXELS_OUT {
                let access = config.access(register);
                assert!(access.read(), "{revision} {}", config.name(register));
                assert!(!access.write(), "{revision} {}", config.name(register));
            }
        }
    }

    #[test]
    fn triangle_registers_are_fifo_pipelined() {
        for revision in [Revision::Voodoo1, Revision::Voodoo2, Revision::Banshee] {
            let config = revision.config();
            for register in [Register::TRIANGLE_CMD, Register::FTRIANGLE_CMD, Register::START_R] {
                let access = config.access(register);
                assert!(access.write() && access.fifo() && access.pipelined());
            }
        }
    }

    #[test]
    fn revision_differences() {
        let chroma_range = Register::CHROMA_RANGE;
        assert!(!Revision::Voodoo1.config().access(chroma_range).write());
        assert!(Revision::Voodoo2.config().access(chroma_range).write());

        let setup_mode = Register::S_SETUP_MODE;
        assert!(!Revision::Voodoo1.config().access(setup_mode).write());
        assert!(Revision::Voodoo2.config().access(setup_mode).write());

        let col_buffer_addr = Register::COL_BUFFER_ADDR;
        assert_eq!(Revision::Voodoo2.config().name(col_buffer_addr), "cmdFifoAMin");
        assert_eq!(Revision::Banshee.config().name(col_buffer_addr), "colBufferAddr");
        assert!(Revision::Voodoo2.config().access(Register::FBI_INIT0).write_through());
    }

    #[test]
    fn name_lookup() {
        let config = Revision::Voodoo2.config();
        assert_eq!(config.find_register("fbzColorPath"), Some(Register::FBZ_COLOR_PATH));
        assert_eq!(config.find_register("FBZMODE"), Some(Register::FBZ_MODE));
        assert_eq!(config.find_register("nccTable1.b"), Some(Register::NCC_TABLE + 23));
        assert_eq!(config.find_register("notARegister"), None);
    }
}
