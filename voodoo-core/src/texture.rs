//! Texture mapping units
//!
//! Each TMU owns its texture RAM, its own copy of the TMU register block, two NCC tables and a
//! 256-entry palette. Derived per-LOD state is recomputed lazily when a texture register changes.
//! Per pixel, a TMU computes S/T/LOD (optionally perspective corrected through the reciprocal
//! unit), fetches one texel or four bilinearly filtered texels, and runs the texture combine
//! equation against the output of the previous TMU.

mod ncc;

#[cfg(test)]
mod tests;

use crate::color::{self, Argb};
use crate::combine::{CombineUnit, FactorInputs};
use crate::dither::Dither;
use crate::memory::Ram;
use crate::num::U32Ext;
use crate::reciplog::{fast_reciplog, RecipLog};
use crate::registers::{
    Register, RegisterCell, RevisionConfig, TexDetail, TexLod, TextureMode, NUM_REGISTERS,
};
use bincode::{Decode, Encode};
use ncc::{NccTable, NCC_REGISTERS};

pub const MAX_TMU: usize = 2;

// A TMU whose minimum LOD is at or above this is treated as disabled
pub const LOD_DISABLED: i32 = 8 << 8;

const NUM_LODS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TextureParams {
    // LOD values are 4.8 fixed point
    pub lod_min: i32,
    pub lod_max: i32,
    pub lod_bias: i32,
    // Bit N set if LOD N is resident
    pub lod_mask: u32,
    pub lod_offset: [u32; NUM_LODS],
    pub wmask: u32,
    pub hmask: u32,
    pub detail_max: i32,
    pub detail_bias: i32,
    pub detail_scale: u32,
}

impl TextureParams {
    fn new() -> Self {
        Self {
            lod_min: 0,
            lod_max: 0,
            lod_bias: 0,
            lod_mask: 0x1FF,
            lod_offset: [0; NUM_LODS],
            wmask: 0xFF,
            hmask: 0xFF,
            detail_max: 0,
            detail_bias: 0,
            detail_scale: 0,
        }
    }
}

// Iterated S/T (14.32) and W (16.32) for one TMU
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct TmuIterators {
    pub start_s: i64,
    pub start_t: i64,
    pub start_w: i64,
    pub ds_dx: i64,
    pub dt_dx: i64,
    pub dw_dx: i64,
    pub ds_dy: i64,
    pub dt_dy: i64,
    pub dw_dy: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexCoords {
    pub s: i64,
    pub t: i64,
    pub w: i64,
}

impl TmuIterators {
    pub fn at(&self, dx: i64, dy: i64) -> TexCoords {
        let eval = |start: i64, d_dx: i64, d_dy: i64| {
            start.wrapping_add(dy.wrapping_mul(d_dy)).wrapping_add(dx.wrapping_mul(d_dx))
        };

        TexCoords {
            s: eval(self.start_s, self.ds_dx, self.ds_dy),
            t: eval(self.start_t, self.dt_dx, self.dt_dy),
            w: eval(self.start_w, self.dw_dx, self.dw_dy),
        }
    }

    pub fn step_x(&self, coords: &mut TexCoords) {
        coords.s = coords.s.wrapping_add(self.ds_dx);
        coords.t = coords.t.wrapping_add(self.dt_dx);
        coords.w = coords.w.wrapping_add(self.dw_dx);
    }

    // log2 of the larger of the X and Y texel footprints, as a 4.8 LOD
    pub fn lod_base(&self) -> i32 {
        let footprint = |ds: i64, dt: i64| {
            (ds >> 14).wrapping_mul(ds >> 14).wrapping_add((dt >> 14).wrapping_mul(dt >> 14))
        };
        let tex_dx = footprint(self.ds_dx, self.dt_dx);
        let tex_dy = footprint(self.ds_dy, self.dt_dy);

        let RecipLog { log2, .. } = fast_reciplog(tex_dx.max(tex_dy) >> 16);

        // log2 of the reciprocal of a square: negate, undo the extra 12-bit exponent, halve
        (-log2 + (12 << 8)) / 2
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Tmu {
    index: usize,
    ram: Ram,
    regs: [RegisterCell; NUM_REGISTERS],
    pub iterators: TmuIterators,
    params: TextureParams,
    params_dirty: bool,
    ncc: [NccTable; 2],
    palette: [u32; 256],
    palette_alpha: [u32; 256],
    has_palette_alpha: bool,
    bilinear_mask: i32,
    address_mask: u32,
    address_shift: u32,
    linear_writes: bool,
}

fn pal6bit(value: u32) -> u32 {
    let value = value & 0x3F;
    (value << 2) | (value >> 4)
}

// Blends packed ARGB texels two channels at a time, reproducing the carries of the hardware's
// lane-packed arithmetic
fn bilinear_filter(texels: [u32; 4], sfrac: u32, tfrac: u32) -> u32 {
    let lerp = |a: u32, b: u32, frac: u32| {
        let a = a & 0x00FF_00FF;
        let b = b & 0x00FF_00FF;
        a.wrapping_add(b.wrapping_sub(a).wrapping_mul(frac) >> 8)
    };

    let [t00, t01, t10, t11] = texels;
    let rb0 = lerp(t00, t01, sfrac);
    let rb1 = lerp(t10, t11, sfrac);
    let ag0 = lerp(t00 >> 8, t01 >> 8, sfrac);
    let ag1 = lerp(t10 >> 8, t11 >> 8, sfrac);

    let rb = lerp(rb0, rb1, tfrac);
    let ag = lerp(ag0, ag1, tfrac);
    ((ag << 8) & 0xFF00_FF00) | (rb & 0x00FF_00FF)
}

impl Tmu {
    pub fn new(index: usize, ram_len: usize, config: &RevisionConfig) -> Self {
        Self {
            index,
            ram: Ram::new(ram_len),
            regs: [RegisterCell::default(); NUM_REGISTERS],
            iterators: TmuIterators::default(),
            params: TextureParams::new(),
            params_dirty: true,
            ncc: [NccTable::new(), NccTable::new()],
            palette: [0; 256],
            palette_alpha: [0; 256],
            has_palette_alpha: config.palette_alpha,
            bilinear_mask: config.bilinear_mask,
            address_mask: config.texture_address_mask,
            address_shift: config.texture_address_shift,
            linear_writes: config.banshee_layout,
        }
    }

    pub fn register(&self, index: usize) -> u32 {
        self.regs[index].u32()
    }

    pub fn texture_mode(&self) -> TextureMode {
        TextureMode(self.regs[Register::TEXTURE_MODE].u32())
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn write_register(&mut self, register: usize, data: u32) {
        match register {
            Register::TEXTURE_MODE..=Register::TEX_BASE_ADDR_3_8 => {
                self.regs[register].set_u32(data);
                self.params_dirty = true;
            }
            Register::NCC_TABLE..Register::NCC_END => {
                let offset = register - Register::NCC_TABLE;
                let (table, table_register) = (offset / NCC_REGISTERS, offset % NCC_REGISTERS);

                // I/Q writes to table 0 with bit 31 set load the palette instead
                if table == 0 && table_register >= 4 && data.sign_bit() {
                    self.write_palette(table_register, data);
                    return;
                }

                self.regs[register].set_u32(data);
                self.ncc[table].write(table_register, data);
            }
            _ => self.regs[register].set_u32(data),
        }
    }

    fn write_palette(&mut self, table_register: usize, data: u32) {
        let index = (((data >> 23) & 0xFE) | (table_register as u32 & 1)) as usize;
        self.palette[index] = 0xFF00_0000 | data;
        if self.has_palette_alpha {
            self.palette_alpha[index] = (pal6bit(data >> 18) << 24)
                | (pal6bit(data >> 12) << 16)
                | (pal6bit(data >> 6) << 8)
                | pal6bit(data);
        }

        log::trace!("TMU{} palette[{index}] = {data:08X}", self.index);
    }

    pub fn params(&mut self) -> &TextureParams {
        if self.params_dirty {
            self.recompute_params();
        }
        &self.params
    }

    fn recompute_params(&mut self) {
        let tex_lod = TexLod(self.regs[Register::T_LOD].u32());
        let tex_detail = TexDetail(self.regs[Register::T_DETAIL].u32());
        let texture_mode = self.texture_mode();

        let params = &mut self.params;
        params.lod_min = i32::from(tex_lod.lod_min()) << 6;
        params.lod_max = i32::from(tex_lod.lod_max()) << 6;
        params.lod_bias = i32::from((tex_lod.lod_bias() << 2) as i8) << 4;

        params.lod_mask = match (tex_lod.lod_tsplit(), tex_lod.lod_odd()) {
            (false, _) => 0x1FF,
            (true, false) => 0x155,
            (true, true) => 0x0AA,
        };

        params.wmask = 0xFF;
        params.hmask = 0xFF;
        if tex_lod.lod_s_is_wider() {
            params.hmask >>= tex_lod.lod_aspect();
        } else {
            params.wmask >>= tex_lod.lod_aspect();
        }

        params.detail_max = tex_detail.detail_max().into();
        params.detail_bias = i32::from((tex_detail.detail_bias() << 2) as i8) << 6;
        params.detail_scale = tex_detail.detail_scale().into();

        let bpp_scale = u32::from(texture_mode.format() >> 3);
        let base_address = |register: usize| {
            (self.regs[register].u32() & self.address_mask) << self.address_shift
        };
        let ram_mask = self.ram.mask();

        let mut base = base_address(Register::TEX_BASE_ADDR);
        params.lod_offset[0] = base & ram_mask;

        let first_accumulated = if tex_lod.tmultibaseaddr() {
            params.lod_offset[1] = base_address(Register::TEX_BASE_ADDR_1) & ram_mask;
            params.lod_offset[2] = base_address(Register::TEX_BASE_ADDR_2) & ram_mask;
            base = base_address(Register::TEX_BASE_ADDR_3_8);
            params.lod_offset[3] = base & ram_mask;
            4
        } else {
            1
        };

        for lod in first_accumulated..NUM_LODS {
            if params.lod_mask.bit((lod - 1) as u8) {
                let size = ((params.wmask >> (lod - 1)) + 1) * ((params.hmask >> (lod - 1)) + 1);
                base = base.wrapping_add(size.max(4) << bpp_scale);
            }
            params.lod_offset[lod] = base & ram_mask;
        }

        for table in &mut self.ncc {
            table.update();
        }

        self.params_dirty = false;
        log::debug!("TMU{} texture params recomputed: {:X?}", self.index, self.params);
    }

    // Refreshes derived state for a new triangle; returns the LOD base, or None if disabled
    pub fn begin_triangle(&mut self) -> Option<i32> {
        if self.params_dirty {
            self.recompute_params();
        }
        for table in &mut self.ncc {
            table.update();
        }

        (self.params.lod_min < LOD_DISABLED).then(|| self.iterators.lod_base())
    }

    fn decode_8bit(&self, format: u8, value: u8) -> u32 {
        let ncc_table = usize::from(self.texture_mode().ncc_table_select());
        let v = u32::from(value);
        match format {
            // RGB332 / ARGB8332
            0 | 8 => color::rgb332_to_argb(value).to_u32(),
            // YIQ422 / AYIQ8422
            1 | 9 => self.ncc[ncc_table].lookup(value),
            // A8
            2 => v * 0x0101_0101,
            // I8 / AI88
            3 | 13 => 0xFF00_0000 | (v * 0x0001_0101),
            // AI44
            4 => {
                let a = (v >> 4) * 0x11;
                let i = (v & 0xF) * 0x11;
                (a << 24) | (i * 0x0001_0101)
            }
            // P8 / AP88
            5 | 14 => self.palette[value as usize],
            // AP8
            6 if self.has_palette_alpha => self.palette_alpha[value as usize],
            _ => 0,
        }
    }

    pub fn decode_texel(&self, format: u8, raw: u32) -> u32 {
        match format {
            0..=7 => self.decode_8bit(format, raw as u8),
            10 => color::rgb565_to_argb(raw as u16).to_u32(),
            11 => color::argb1555_to_argb(raw as u16).to_u32(),
            12 => color::argb4444_to_argb(raw as u16).to_u32(),
            // 8-bit color with an 8-bit alpha in the high byte
            8 | 9 | 13 | 14 => {
                (self.decode_8bit(format, raw as u8) & 0x00FF_FFFF) | ((raw & 0xFF00) << 16)
            }
            _ => 0,
        }
    }

    fn fetch(&self, format: u8, base: u32, index: u32) -> u32 {
        let raw = if format < 8 {
            self.ram.read_u8(base.wrapping_add(index)).into()
        } else {
            self.ram.read_u16(base.wrapping_add(index.wrapping_mul(2))).into()
        };
        self.decode_texel(format, raw)
    }

    // Returns the texel and the final clamped LOD
    pub fn sample(
        &self,
        mode: TextureMode,
        x: i32,
        dither: &Dither,
        coords: TexCoords,
        lod_base: i32,
    ) -> (Argb, i32) {
        let params = &self.params;

        let (mut s, mut t, mut lod) = if mode.enable_perspective() {
            let RecipLog { recip: oow, log2 } = fast_reciplog(coords.w);
            // Large S/T over a tiny W overflows 64 bits and wraps like the hardware multiplier
            (
                (i64::from(oow).wrapping_mul(coords.s) >> 29) as i32,
                (i64::from(oow).wrapping_mul(coords.t) >> 29) as i32,
                lod_base + log2,
            )
        } else {
            ((coords.s >> 14) as i32, (coords.t >> 14) as i32, lod_base)
        };

        if mode.clamp_neg_w() && coords.w < 0 {
            s = 0;
            t = 0;
        }

        lod += params.lod_bias;
        if mode.enable_lod_dither() {
            lod += dither.matrix_4x4_value(x) << 4;
        }
        // Not Ord::clamp; min can exceed max with arbitrary register contents
        if lod < params.lod_min {
            lod = params.lod_min;
        }
        if lod > params.lod_max {
            lod = params.lod_max;
        }

        // Fall through to the next smaller LOD if this one is not resident
        let mut ilod = (lod >> 8) as u32;
        if !params.lod_mask.bit(ilod as u8) {
            ilod += 1;
        }
        let ilod = ilod.min(NUM_LODS as u32 - 1);

        let base = params.lod_offset[ilod as usize];
        let smax = (params.wmask >> ilod) as i32;
        let tmax = (params.hmask >> ilod) as i32;
        let format = mode.format();

        let point_sampled = if lod == params.lod_min {
            !mode.magnification_filter()
        } else {
            !mode.minification_filter()
        };

        let texel = if point_sampled {
            s >>= ilod + 18;
            t >>= ilod + 18;

            if mode.clamp_s() {
                s = s.clamp(0, smax);
            }
            if mode.clamp_t() {
                t = t.clamp(0, tmax);
            }
            s &= smax;
            t &= tmax;
            t *= smax + 1;

            self.fetch(format, base, (t + s) as u32)
        } else {
            // Keep 8 fractional bits and shift by half a texel so that texel centers are exact
            s = (s >> (ilod + 10)) - 0x80;
            t = (t >> (ilod + 10)) - 0x80;

            let sfrac = (s & self.bilinear_mask) as u32;
            let tfrac = (t & self.bilinear_mask) as u32;

            s >>= 8;
            t >>= 8;
            let mut s1 = s + 1;
            let mut t1 = t + 1;

            if mode.clamp_s() {
                s = s.clamp(0, smax);
                s1 = s1.clamp(0, smax);
            }
            if mode.clamp_t() {
                t = t.clamp(0, tmax);
                t1 = t1.clamp(0, tmax);
            }
            s &= smax;
            s1 &= smax;
            t = (t & tmax) * (smax + 1);
            t1 = (t1 & tmax) * (smax + 1);

            let texels = [
                self.fetch(format, base, (t + s) as u32),
                self.fetch(format, base, (t + s1) as u32),
                self.fetch(format, base, (t1 + s) as u32),
                self.fetch(format, base, (t1 + s1) as u32),
            ];
            bilinear_filter(texels, sfrac, tfrac)
        };

        (Argb::from_u32(texel), lod)
    }

    fn detail_factor(&self, lod: i32) -> i32 {
        let params = &self.params;
        if params.detail_bias <= lod {
            0
        } else {
            (((params.detail_bias - lod) << params.detail_scale) >> 8).min(params.detail_max)
        }
    }

    // `offset` is a dword offset into the texture aperture
    pub fn write_texture(&mut self, offset: u32, data: u32, seq_8_downld: bool) {
        if self.params_dirty {
            self.recompute_params();
        }

        let tex_lod = TexLod(self.regs[Register::T_LOD].u32());
        let mut data = data;
        if tex_lod.tdata_swizzle() {
            data = data.swap_bytes();
        }
        if tex_lod.tdata_swap() {
            data = data.rotate_left(16);
        }

        let lod = ((offset >> 15) & 0xF) as usize;
        let t = (offset >> 7) & 0xFF;
        let eight_bit = self.texture_mode().format() < 8;

        let address = if self.linear_writes {
            self.params.lod_offset[0].wrapping_add(offset << 2)
        } else {
            if lod >= NUM_LODS {
                log::debug!("TMU{} texture write to invalid LOD {lod} ignored", self.index);
                return;
            }

            let row_texels = (self.params.wmask >> lod) + 1;
            let base = self.params.lod_offset[lod];
            if eight_bit {
                let s = if seq_8_downld { (offset << 2) & 0xFC } else { (offset << 1) & 0xFC };
                base.wrapping_add(t * row_texels + s)
            } else {
                let s = (offset << 1) & 0xFE;
                base.wrapping_add(2 * (t * row_texels + s))
            }
        };

        for (i, byte) in data.to_le_bytes().into_iter().enumerate() {
            self.ram.write_u8(address.wrapping_add(i as u32), byte);
        }
    }
}

// One enabled TMU's per-triangle state, with combine decoding hoisted out of the pixel loop
#[derive(Debug, Clone, Copy)]
pub struct TextureStage<'a> {
    tmu: &'a Tmu,
    mode: TextureMode,
    combine: CombineUnit,
    lod_base: i32,
}

impl<'a> TextureStage<'a> {
    // `combine` is the decoded texture combine equation for this TMU's textureMode
    pub fn new(tmu: &'a Tmu, lod_base: i32, combine: CombineUnit) -> Self {
        Self { tmu, mode: tmu.texture_mode(), combine, lod_base }
    }

    pub fn iterators(&self) -> &TmuIterators {
        &self.tmu.iterators
    }

    pub fn process(&self, x: i32, dither: &Dither, coords: TexCoords, c_other: Argb) -> Argb {
        let (texel, lod) = self.tmu.sample(self.mode, x, dither, coords, self.lod_base);
        let inputs = FactorInputs { texel, detail: self.tmu.detail_factor(lod), lod };
        self.combine.combine(c_other, texel, &inputs)
    }
}
