//! Register file layout and mode register decoding
//!
//! Offsets are dword indices (byte offset / 4) into the 256-entry register block. The same
//! block is decoded by the FBI and by each TMU; chip select bits above the index choose which
//! chips observe a write.

mod access;
mod names;

pub use access::{RegisterAccess, Revision, RevisionConfig};

use crate::color::Argb;
use bincode::{Decode, Encode};
use proc_bitfield::bitfield;

pub const NUM_REGISTERS: usize = 0x100;

pub struct Register;

impl Register {
    // Status
    pub const STATUS: usize = 0x000 / 4;
    // Integer triangle vertices (12.4)
    pub const VERTEX_AX: usize = 0x008 / 4;
    pub const VERTEX_AY: usize = 0x00C / 4;
    pub const VERTEX_BX: usize = 0x010 / 4;
    pub const VERTEX_BY: usize = 0x014 / 4;
    pub const VERTEX_CX: usize = 0x018 / 4;
    pub const VERTEX_CY: usize = 0x01C / 4;
    // Integer parameter starts and gradients
    pub const START_R: usize = 0x020 / 4;
    pub const START_G: usize = 0x024 / 4;
    pub const START_B: usize = 0x028 / 4;
    pub const START_Z: usize = 0x02C / 4;
    pub const START_A: usize = 0x030 / 4;
    pub const START_S: usize = 0x034 / 4;
    pub const START_W: usize = 0x03C / 4;
    pub const D_R_DX: usize = 0x040 / 4;
    pub const D_G_DX: usize = 0x044 / 4;
    pub const D_W_DX: usize = 0x05C / 4;
    pub const D_R_DY: usize = 0x060 / 4;
    pub const D_A_DY: usize = 0x070 / 4;
    pub const D_T_DY: usize = 0x078 / 4;
    pub const D_W_DY: usize = 0x07C / 4;
    pub const TRIANGLE_CMD: usize = 0x080 / 4;
    // Floating-point vertices, starts and gradients
    pub const FVERTEX_AX: usize = 0x088 / 4;
    pub const FVERTEX_BY: usize = 0x094 / 4;
    pub const FVERTEX_CY: usize = 0x09C / 4;
    pub const FSTART_R: usize = 0x0A0 / 4;
    pub const FSTART_G: usize = 0x0A4 / 4;
    pub const FSTART_B: usize = 0x0A8 / 4;
    pub const FSTART_T: usize = 0x0B8 / 4;
    pub const FD_Z_DX: usize = 0x0CC / 4;
    pub const FD_W_DY: usize = 0x0FC / 4;
    pub const FTRIANGLE_CMD: usize = 0x100 / 4;
    // Rendering modes
    pub const FBZ_COLOR_PATH: usize = 0x104 / 4;
    pub const FOG_MODE: usize = 0x108 / 4;
    pub const ALPHA_MODE: usize = 0x10C / 4;
    pub const FBZ_MODE: usize = 0x110 / 4;
    pub const LFB_MODE: usize = 0x114 / 4;
    pub const CLIP_LEFT_RIGHT: usize = 0x118 / 4;
    pub const CLIP_LOW_Y_HIGH_Y: usize = 0x11C / 4;
    // FBI commands
    pub const NOP_CMD: usize = 0x120 / 4;
    pub const FASTFILL_CMD: usize = 0x124 / 4;
    pub const SWAPBUFFER_CMD: usize = 0x128 / 4;
    // Constant colors
    pub const FOG_COLOR: usize = 0x12C / 4;
    pub const ZA_COLOR: usize = 0x130 / 4;
    pub const CHROMA_KEY: usize = 0x134 / 4;
    pub const CHROMA_RANGE: usize = 0x138 / 4;
    pub const STIPPLE: usize = 0x140 / 4;
    pub const COLOR0: usize = 0x144 / 4;
    pub const COLOR1: usize = 0x148 / 4;
    // Statistics counters (24-bit)
    pub const FBI_PIXELS_IN: usize = 0x14C / 4;
    pub const FBI_CHROMA_FAIL: usize = 0x150 / 4;
    pub const FBI_ZFUNC_FAIL: usize = 0x154 / 4;
    pub const FBI_AFUNC_FAIL: usize = 0x158 / 4;
    pub const FBI_PIXELS_OUT: usize = 0x15C / 4;
    // Fog table: 32 registers of two packed entries each
    pub const FOG_TABLE: usize = 0x160 / 4;
    pub const FOG_TABLE_LEN: usize = 32;
    pub const FOG_TABLE_END: usize = Self::FOG_TABLE + Self::FOG_TABLE_LEN;
    // Banshee color/aux buffer layout (overlaps the command FIFO registers)
    pub const COL_BUFFER_ADDR: usize = 0x1EC / 4;
    pub const COL_BUFFER_STRIDE: usize = 0x1F0 / 4;
    pub const AUX_BUFFER_ADDR: usize = 0x1F4 / 4;
    pub const AUX_BUFFER_STRIDE: usize = 0x1F8 / 4;
    // Initialization
    pub const FBI_INIT4: usize = 0x200 / 4;
    pub const FBI_INIT0: usize = 0x210 / 4;
    pub const FBI_INIT1: usize = 0x214 / 4;
    pub const FBI_INIT2: usize = 0x218 / 4;
    pub const FBI_INIT3: usize = 0x21C / 4;
    pub const FBI_INIT5: usize = 0x244 / 4;
    pub const FBI_INIT6: usize = 0x248 / 4;
    // Banshee swap control
    pub const SWAP_PENDING: usize = 0x24C / 4;
    pub const LEFT_OVERLAY_BUF: usize = 0x250 / 4;
    pub const FBI_SWAP_HISTORY: usize = 0x258 / 4;
    pub const FBI_TRIANGLES_OUT: usize = 0x25C / 4;
    // Triangle setup unit (Voodoo 2)
    pub const S_SETUP_MODE: usize = 0x260 / 4;
    pub const S_VX: usize = 0x264 / 4;
    pub const S_VY: usize = 0x268 / 4;
    pub const S_ARGB: usize = 0x26C / 4;
    pub const S_RED: usize = 0x270 / 4;
    pub const S_GREEN: usize = 0x274 / 4;
    pub const S_BLUE: usize = 0x278 / 4;
    pub const S_ALPHA: usize = 0x27C / 4;
    pub const S_VZ: usize = 0x280 / 4;
    pub const S_WB: usize = 0x284 / 4;
    pub const S_WTMU0: usize = 0x288 / 4;
    pub const S_S_W0: usize = 0x28C / 4;
    pub const S_T_W0: usize = 0x290 / 4;
    pub const S_WTMU1: usize = 0x294 / 4;
    pub const S_S_WTMU1: usize = 0x298 / 4;
    pub const S_T_WTMU1: usize = 0x29C / 4;
    pub const S_DRAW_TRI_CMD: usize = 0x2A0 / 4;
    pub const S_BEGIN_TRI_CMD: usize = 0x2A4 / 4;
    // TMU registers
    pub const TEXTURE_MODE: usize = 0x300 / 4;
    pub const T_LOD: usize = 0x304 / 4;
    pub const T_DETAIL: usize = 0x308 / 4;
    pub const TEX_BASE_ADDR: usize = 0x30C / 4;
    pub const TEX_BASE_ADDR_1: usize = 0x310 / 4;
    pub const TEX_BASE_ADDR_2: usize = 0x314 / 4;
    pub const TEX_BASE_ADDR_3_8: usize = 0x318 / 4;
    // NCC tables: 2 tables of 12 registers each
    pub const NCC_TABLE: usize = 0x324 / 4;
    pub const NCC_TABLE_LEN: usize = 24;
    pub const NCC_END: usize = Self::NCC_TABLE + Self::NCC_TABLE_LEN;
}

// One 32-bit register; the hardware reinterprets the same bits as integer or float
// depending on the register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct RegisterCell(u32);

impl RegisterCell {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn u32(self) -> u32 {
        self.0
    }

    pub const fn i32(self) -> i32 {
        self.0 as i32
    }

    pub fn f32(self) -> f32 {
        f32::from_bits(self.0)
    }

    pub const fn argb(self) -> Argb {
        Argb::from_u32(self.0)
    }

    pub fn set_u32(&mut self, value: u32) {
        self.0 = value;
    }

    pub fn set_f32(&mut self, value: f32) {
        self.0 = value.to_bits();
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct FbzColorPath(pub u32): Debug, FromStorage, IntoStorage {
        pub cc_rgb_select: u8 @ 0..=1,
        pub cc_a_select: u8 @ 2..=3,
        pub cc_local_select: bool @ 4,
        pub cca_local_select: u8 @ 5..=6,
        pub cc_local_select_override: bool @ 7,
        pub cc_zero_other: bool @ 8,
        pub cc_sub_clocal: bool @ 9,
        pub cc_mselect: u8 @ 10..=12,
        pub cc_reverse_blend: bool @ 13,
        pub cc_add_aclocal: u8 @ 14..=15,
        pub cc_invert_output: bool @ 16,
        pub cca_zero_other: bool @ 17,
        pub cca_sub_clocal: bool @ 18,
        pub cca_mselect: u8 @ 19..=21,
        pub cca_reverse_blend: bool @ 22,
        pub cca_add_aclocal: u8 @ 23..=24,
        pub cca_invert_output: bool @ 25,
        pub subpixel_adjust: bool @ 26,
        pub texture_enable: bool @ 27,
        // Voodoo 2 only
        pub rgbzw_clamp: bool @ 28,
        pub anti_alias: bool @ 29,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct FbzMode(pub u32): Debug, FromStorage, IntoStorage {
        pub enable_clipping: bool @ 0,
        pub enable_chromakey: bool @ 1,
        pub enable_stipple: bool @ 2,
        pub wbuffer_select: bool @ 3,
        pub enable_depthbuf: bool @ 4,
        pub depth_function: u8 @ 5..=7,
        pub enable_dithering: bool @ 8,
        pub rgb_buffer_mask: bool @ 9,
        pub aux_buffer_mask: bool @ 10,
        pub dither_type: bool @ 11,
        pub stipple_pattern: bool @ 12,
        pub enable_alpha_mask: bool @ 13,
        pub draw_buffer: u8 @ 14..=15,
        pub enable_depth_bias: bool @ 16,
        pub y_origin: bool @ 17,
        pub enable_alpha_planes: bool @ 18,
        pub alpha_dither_subtract: bool @ 19,
        pub depth_source_compare: bool @ 20,
        // Voodoo 2 only
        pub depth_float_select: bool @ 21,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct AlphaMode(pub u32): Debug, FromStorage, IntoStorage {
        pub alpha_test: bool @ 0,
        pub alpha_function: u8 @ 1..=3,
        pub alpha_blend: bool @ 4,
        pub anti_alias: bool @ 5,
        pub src_rgb_blend: u8 @ 8..=11,
        pub dst_rgb_blend: u8 @ 12..=15,
        pub src_alpha_blend: u8 @ 16..=19,
        pub dst_alpha_blend: u8 @ 20..=23,
        pub alpha_ref: u8 @ 24..=31,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct FogMode(pub u32): Debug, FromStorage, IntoStorage {
        pub enable_fog: bool @ 0,
        pub fog_add: bool @ 1,
        pub fog_mult: bool @ 2,
        pub fog_zalpha: u8 @ 3..=4,
        pub fog_constant: bool @ 5,
        // Voodoo 2 only
        pub fog_dither: bool @ 6,
        pub fog_zones: bool @ 7,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct TextureMode(pub u32): Debug, FromStorage, IntoStorage {
        pub enable_perspective: bool @ 0,
        pub minification_filter: bool @ 1,
        pub magnification_filter: bool @ 2,
        pub clamp_neg_w: bool @ 3,
        pub enable_lod_dither: bool @ 4,
        pub ncc_table_select: bool @ 5,
        pub clamp_s: bool @ 6,
        pub clamp_t: bool @ 7,
        pub format: u8 @ 8..=11,
        pub tc_zero_other: bool @ 12,
        pub tc_sub_clocal: bool @ 13,
        pub tc_mselect: u8 @ 14..=16,
        pub tc_reverse_blend: bool @ 17,
        pub tc_add_aclocal: u8 @ 18..=19,
        pub tc_invert_output: bool @ 20,
        pub tca_zero_other: bool @ 21,
        pub tca_sub_clocal: bool @ 22,
        pub tca_mselect: u8 @ 23..=25,
        pub tca_reverse_blend: bool @ 26,
        pub tca_add_aclocal: u8 @ 27..=28,
        pub tca_invert_output: bool @ 29,
        pub trilinear: bool @ 30,
        pub seq_8_downld: bool @ 31,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct TexLod(pub u32): Debug, FromStorage, IntoStorage {
        pub lod_min: u8 @ 0..=5,
        pub lod_max: u8 @ 6..=11,
        pub lod_bias: u8 @ 12..=17,
        pub lod_odd: bool @ 18,
        pub lod_tsplit: bool @ 19,
        pub lod_s_is_wider: bool @ 20,
        pub lod_aspect: u8 @ 21..=22,
        pub lod_zerofrac: bool @ 23,
        pub tmultibaseaddr: bool @ 24,
        pub tdata_swizzle: bool @ 25,
        pub tdata_swap: bool @ 26,
        // Voodoo 2 only
        pub tdirect_write: bool @ 27,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct TexDetail(pub u32): Debug, FromStorage, IntoStorage {
        pub detail_max: u8 @ 0..=7,
        pub detail_bias: u8 @ 8..=13,
        pub detail_scale: u8 @ 14..=16,
        // Voodoo 2 only
        pub rgb_min_filter: bool @ 17,
        pub rgb_mag_filter: bool @ 18,
        pub alpha_min_filter: bool @ 19,
        pub alpha_mag_filter: bool @ 20,
        pub separate_rgba_filter: bool @ 21,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChromaRange(pub u32): Debug, FromStorage, IntoStorage {
        pub blue: u8 @ 0..=7,
        pub green: u8 @ 8..=15,
        pub red: u8 @ 16..=23,
        pub blue_exclusive: bool @ 24,
        pub green_exclusive: bool @ 25,
        pub red_exclusive: bool @ 26,
        pub union_mode: bool @ 27,
        pub enable: bool @ 28,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct LfbMode(pub u32): Debug, FromStorage, IntoStorage {
        pub write_format: u8 @ 0..=3,
        pub write_buffer_select: u8 @ 4..=5,
        pub read_buffer_select: u8 @ 6..=7,
        pub enable_pixel_pipeline: bool @ 8,
        pub rgba_lanes: u8 @ 9..=10,
        pub word_swap_writes: bool @ 11,
        pub byte_swizzle_writes: bool @ 12,
        pub y_origin: bool @ 13,
        pub write_w_select: bool @ 14,
        pub word_swap_reads: bool @ 15,
        pub byte_swizzle_reads: bool @ 16,
    }
}

// Clip rectangle packed as (min << 16) | max with 10-bit fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipRect {
    pub left: i32,
    pub right: i32,
    pub low_y: i32,
    pub high_y: i32,
}

impl ClipRect {
    pub fn from_registers(left_right: u32, low_y_high_y: u32) -> Self {
        Self {
            left: ((left_right >> 16) & 0x3FF) as i32,
            right: (left_right & 0x3FF) as i32,
            low_y: ((low_y_high_y >> 16) & 0x3FF) as i32,
            high_y: (low_y_high_y & 0x3FF) as i32,
        }
    }

    pub fn contains(self, x: i32, y: i32) -> bool {
        (self.left..self.right).contains(&x) && (self.low_y..self.high_y).contains(&y)
    }
}
