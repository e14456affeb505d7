//! Per-pixel pipeline: clip, stipple, depth, color combine, fog, alpha blend, dither and write
//!
//! A pixel passes through two halves. `begin` performs the clip, stipple and depth tests and
//! computes the depth value; the caller then produces a source color (through texturing and
//! the color combine unit for triangles, or directly for linear frame buffer writes), and `end`
//! applies fog and alpha blending and writes the result. Every early exit increments exactly one
//! failure counter and leaves both buffers untouched.


use crate::color::Argb;
use crate::combine::{CombineUnit, FactorInputs};
use crate::dither::Dither;
use crate::fbi::FogTable;
use crate::memory::Ram;
use crate::registers::{
    AlphaMode, ChromaRange, ClipRect, FbzColorPath, FbzMode, FogMode, Register, RegisterCell,
    RevisionConfig, NUM_REGISTERS,
};
use bincode::{Decode, Encode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct Statistics {
    pub pixels_in: u32,
    pub pixels_out: u32,
    pub chroma_fail: u32,
    pub zfunc_fail: u32,
    pub afunc_fail: u32,
    pub clipped: u32,
    pub stippled: u32,
}

impl Statistics {
    // Clears the counters that back the fbiPixelsIn..fbiPixelsOut registers
    pub fn reset_registers(&mut self) {
        self.pixels_in = 0;
        self.pixels_out = 0;
        self.chroma_fail = 0;
        self.zfunc_fail = 0;
        self.afunc_fail = 0;
    }
}

fn increment(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}

// Shared by the depth and alpha tests: 0 never, 1 less, 2 equal, 3 less-or-equal, 4 greater,
// 5 not equal, 6 greater-or-equal, 7 always
fn compare(function: u8, source: i32, reference: i32) -> bool {
    match function & 7 {
        0 => false,
        1 => source < reference,
        2 => source == reference,
        3 => source <= reference,
        4 => source > reference,
        5 => source != reference,
        6 => source >= reference,
        _ => true,
    }
}

// Iterated 12.12 color channel to 8 bits; without clamping the hardware wraps, except for the
// two values just outside the range
fn clamp_channel(iterated: i32, clamp: bool) -> u8 {
    let value = iterated >> 12;
    if clamp {
        return value.clamp(0, 0xFF) as u8;
    }

    match value & 0xFFF {
        0xFFF => 0,
        0x100 => 0xFF,
        value => value as u8,
    }
}

pub fn clamped_argb(r: i32, g: i32, b: i32, a: i32, clamp: bool) -> Argb {
    Argb::new(
        clamp_channel(a, clamp),
        clamp_channel(r, clamp),
        clamp_channel(g, clamp),
        clamp_channel(b, clamp),
    )
}

pub fn clamped_z(iter_z: i32, clamp: bool) -> i32 {
    let value = iter_z >> 12;
    if clamp {
        return value.clamp(0, 0xFFFF);
    }

    match value & 0xFFFFF {
        0xFFFFF => 0,
        0x10000 => 0xFFFF,
        value => value & 0xFFFF,
    }
}

pub fn clamped_w(iter_w: i64, clamp: bool) -> i32 {
    let value = i32::from((iter_w >> 32) as i16);
    if clamp {
        return value.clamp(0, 0xFF);
    }

    match value & 0xFFFF {
        0xFFFF => 0,
        0x100 => 0xFF,
        value => value & 0xFF,
    }
}

// 4.12 floating point encoding of 1/W used for W-buffering and fog table lookups
pub fn float_w(iter_w: i64) -> i32 {
    if iter_w & 0xFFFF_0000_0000 != 0 {
        return 0;
    }
    float_depth(iter_w as u32)
}

fn float_depth(value: u32) -> i32 {
    if value & 0xFFFF_0000 == 0 {
        return 0xFFFF;
    }

    let exp = value.leading_zeros();
    (((exp << 12) | ((!value >> (19 - exp)) & 0xFFF)) + 1) as i32
}

// Voodoo 2 floating point Z, built from the 20.12 Z the same way as W
fn float_z(iter_z: i32) -> i32 {
    if iter_z as u32 & 0xF000_0000 != 0 {
        return 0;
    }
    float_depth((iter_z as u32) << 4)
}

fn apply_chroma_key(color: Argb, key: u32, range: ChromaRange) -> bool {
    if !range.enable() {
        return (color.to_u32() ^ key) & 0x00FF_FFFF == 0;
    }

    let key = Argb::from_u32(key);
    let in_range = |value: u8, low: u8, high: u8, exclusive: bool| {
        ((low..=high).contains(&value) != exclusive) as u8
    };

    let results = (in_range(color.b, key.b, range.blue(), range.blue_exclusive()) << 2)
        | (in_range(color.g, key.g, range.green(), range.green_exclusive()) << 1)
        | in_range(color.r, key.r, range.red(), range.red_exclusive());

    if range.union_mode() {
        results != 0
    } else {
        results == 7
    }
}

// Register state that stays constant for a triangle, a fast fill or an LFB write burst
#[derive(Debug, Clone)]
pub struct PixelConfig {
    pub fbz_mode: FbzMode,
    pub color_path: FbzColorPath,
    pub alpha_mode: AlphaMode,
    pub fog_mode: FogMode,
    pub color_combine: CombineUnit,
    pub clip: ClipRect,
    pub color0: Argb,
    pub color1: Argb,
    pub fog_color: Argb,
    pub za_color: u32,
    pub chroma_key: u32,
    pub chroma_range: ChromaRange,
    pub fog_delta_mask: i32,
    pub float_z_available: bool,
}

impl PixelConfig {
    pub fn from_registers(
        regs: &[RegisterCell; NUM_REGISTERS],
        config: &RevisionConfig,
        color_combine: CombineUnit,
    ) -> Self {
        Self {
            fbz_mode: FbzMode(regs[Register::FBZ_MODE].u32()),
            color_path: FbzColorPath(regs[Register::FBZ_COLOR_PATH].u32()),
            alpha_mode: AlphaMode(regs[Register::ALPHA_MODE].u32()),
            fog_mode: FogMode(regs[Register::FOG_MODE].u32()),
            color_combine,
            clip: ClipRect::from_registers(
                regs[Register::CLIP_LEFT_RIGHT].u32(),
                regs[Register::CLIP_LOW_Y_HIGH_Y].u32(),
            ),
            color0: regs[Register::COLOR0].argb(),
            color1: regs[Register::COLOR1].argb(),
            fog_color: regs[Register::FOG_COLOR].argb(),
            za_color: regs[Register::ZA_COLOR].u32(),
            chroma_key: regs[Register::CHROMA_KEY].u32(),
            chroma_range: ChromaRange(regs[Register::CHROMA_RANGE].u32()),
            fog_delta_mask: config.fog_delta_mask,
            float_z_available: config.revision.is_voodoo2_or_later(),
        }
    }
}

// The color buffer being drawn and the optional aux (depth/alpha) buffer
#[derive(Debug)]
pub struct FrameTarget<'a> {
    pub ram: &'a mut Ram,
    pub draw_base: u32,
    pub aux_base: Option<u32>,
    pub row_pixels: u32,
}

impl FrameTarget<'_> {
    fn pixel_offset(&self, x: i32, screen_y: i32) -> u32 {
        (screen_y as u32).wrapping_mul(self.row_pixels).wrapping_add(x as u32).wrapping_mul(2)
    }

    pub fn read_color(&self, x: i32, screen_y: i32) -> u16 {
        self.ram.read_u16(self.draw_base.wrapping_add(self.pixel_offset(x, screen_y)))
    }

    pub fn write_color(&mut self, x: i32, screen_y: i32, value: u16) {
        let address = self.draw_base.wrapping_add(self.pixel_offset(x, screen_y));
        self.ram.write_u16(address, value);
    }

    pub fn read_aux(&self, x: i32, screen_y: i32) -> Option<u16> {
        self.aux_base
            .map(|base| self.ram.read_u16(base.wrapping_add(self.pixel_offset(x, screen_y))))
    }

    pub fn write_aux(&mut self, x: i32, screen_y: i32, value: u16) {
        if let Some(base) = self.aux_base {
            let address = base.wrapping_add(self.pixel_offset(x, screen_y));
            self.ram.write_u16(address, value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDepth {
    pub depth: i32,
    pub wfloat: i32,
}

// Position of one pixel: `x`/`y` in raster space for dithering and stippling, `screen_y` after
// the Y origin flip for clipping and addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPosition {
    pub x: i32,
    pub y: i32,
    pub screen_y: i32,
}

// Iterated per-pixel inputs: clamped ARGB, 20.12 Z, 16.32 W
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Iterated {
    pub color: Argb,
    pub z: i32,
    pub w: i64,
}

pub struct PixelPipeline<'a> {
    config: &'a PixelConfig,
    fog_table: &'a FogTable,
    target: FrameTarget<'a>,
    stipple: u32,
    stats: &'a mut Statistics,
}

impl<'a> PixelPipeline<'a> {
    pub fn new(
        config: &'a PixelConfig,
        fog_table: &'a FogTable,
        target: FrameTarget<'a>,
        stipple: u32,
        stats: &'a mut Statistics,
    ) -> Self {
        Self { config, fog_table, target, stipple, stats }
    }

    pub fn config(&self) -> &'a PixelConfig {
        self.config
    }

    // Current stipple register value; the rotating pattern advances once per stippled pixel
    pub fn stipple(&self) -> u32 {
        self.stipple
    }

    pub fn begin(&mut self, position: PixelPosition, iterated: &Iterated) -> Option<PixelDepth> {
        let PixelPosition { x, y, screen_y } = position;
        let config = self.config;
        let fbz_mode = config.fbz_mode;

        increment(&mut self.stats.pixels_in);

        if fbz_mode.enable_clipping() && !config.clip.contains(x, screen_y) {
            increment(&mut self.stats.clipped);
            return None;
        }

        if fbz_mode.enable_stipple() {
            let pass = if fbz_mode.stipple_pattern() {
                let index = ((y & 3) << 3) | (!x & 7);
                self.stipple & (1 << index) != 0
            } else {
                self.stipple = self.stipple.rotate_left(1);
                self.stipple & 0x8000_0000 != 0
            };

            if !pass {
                increment(&mut self.stats.stippled);
                return None;
            }
        }

        let clamp = config.color_path.rgbzw_clamp();
        let wfloat = float_w(iterated.w);
        let mut depth = if !fbz_mode.wbuffer_select() {
            clamped_z(iterated.z, clamp)
        } else if config.float_z_available && fbz_mode.depth_float_select() {
            float_z(iterated.z)
        } else {
            wfloat
        };

        if fbz_mode.enable_depth_bias() {
            depth = (depth + i32::from(config.za_color as i16)).clamp(0, 0xFFFF);
        }

        if fbz_mode.enable_depthbuf() {
            if let Some(stored) = self.target.read_aux(x, screen_y) {
                let source = if fbz_mode.depth_source_compare() {
                    i32::from(config.za_color as u16)
                } else {
                    depth
                };

                if !compare(fbz_mode.depth_function(), source, stored.into()) {
                    increment(&mut self.stats.zfunc_fail);
                    return None;
                }
            }
        }

        Some(PixelDepth { depth, wfloat })
    }

    fn chroma_key_fails(&mut self, color: Argb) -> bool {
        let config = self.config;
        let fails = config.fbz_mode.enable_chromakey()
            && apply_chroma_key(color, config.chroma_key, config.chroma_range);
        if fails {
            increment(&mut self.stats.chroma_fail);
        }
        fails
    }

    fn alpha_mask_fails(&mut self, alpha: u8) -> bool {
        let fails = self.config.fbz_mode.enable_alpha_mask() && alpha & 1 == 0;
        if fails {
            increment(&mut self.stats.afunc_fail);
        }
        fails
    }

    fn alpha_test_fails(&mut self, alpha: u8) -> bool {
        let alpha_mode = self.config.alpha_mode;
        let fails = alpha_mode.alpha_test()
            && !compare(alpha_mode.alpha_function(), alpha.into(), alpha_mode.alpha_ref().into());
        if fails {
            increment(&mut self.stats.afunc_fail);
        }
        fails
    }

    // Color combine unit: select, chroma key, alpha mask, combine, alpha test
    pub fn color_path(&mut self, iterated: &Iterated, texel: Argb) -> Option<Argb> {
        let config = self.config;
        let color_path = config.color_path;
        let iter_color = iterated.color;

        let mut c_other = match color_path.cc_rgb_select() {
            0 => iter_color,
            1 => texel,
            2 => config.color1,
            _ => Argb::BLACK,
        };

        if self.chroma_key_fails(c_other) {
            return None;
        }

        c_other.a = match color_path.cc_a_select() {
            0 => iter_color.a,
            1 => texel.a,
            2 => config.color1.a,
            _ => 0,
        };

        if self.alpha_mask_fails(c_other.a) {
            return None;
        }

        let local_is_color0 = if color_path.cc_local_select_override() {
            texel.a & 0x80 != 0
        } else {
            color_path.cc_local_select()
        };
        let mut c_local = if local_is_color0 { config.color0 } else { iter_color };

        let clamp = color_path.rgbzw_clamp();
        c_local.a = match color_path.cca_local_select() {
            0 => iter_color.a,
            1 => config.color0.a,
            2 => clamped_z(iterated.z, clamp) as u8,
            _ => clamped_w(iterated.w, clamp) as u8,
        };

        let inputs = FactorInputs { texel, ..FactorInputs::default() };
        let color = config.color_combine.combine(c_other, c_local, &inputs);

        if self.alpha_test_fails(color.a) {
            return None;
        }

        Some(color)
    }

    // Tests applied to a color that bypasses the combine unit (linear frame buffer writes)
    pub fn color_tests(&mut self, color: Argb) -> Option<Argb> {
        if self.chroma_key_fails(color) || self.alpha_mask_fails(color.a) {
            return None;
        }
        if self.alpha_test_fails(color.a) {
            return None;
        }
        Some(color)
    }

    fn fog_blend(&self, x: i32, dither: &Dither, depth: PixelDepth, iterated: &Iterated) -> i32 {
        let config = self.config;
        let fog_mode = config.fog_mode;
        let clamp = config.color_path.rgbzw_clamp();

        match fog_mode.fog_zalpha() {
            0 => {
                let index = (depth.wfloat >> 10) as usize & 0x3F;
                let delta = i32::from(self.fog_table.delta[index]);

                let mut delta_value = (delta & config.fog_delta_mask) * ((depth.wfloat >> 2) & 0xFF);
                if fog_mode.fog_zones() && delta & 2 != 0 {
                    delta_value = -delta_value;
                }
                delta_value >>= 6;
                if fog_mode.fog_dither() {
                    delta_value += dither.matrix_4x4_value(x);
                }
                delta_value >>= 4;

                i32::from(self.fog_table.blend[index]) + delta_value
            }
            1 => iterated.color.a.into(),
            2 => clamped_z(iterated.z, clamp) >> 8,
            _ => clamped_w(iterated.w, clamp),
        }
    }

    fn apply_fog(
        &self,
        x: i32,
        dither: &Dither,
        depth: PixelDepth,
        iterated: &Iterated,
        color: [i32; 3],
    ) -> [i32; 3] {
        let fog_mode = self.config.fog_mode;
        let fog_color = self.config.fog_color;
        let fog_color = [fog_color.r, fog_color.g, fog_color.b].map(i32::from);

        let fog = if fog_mode.fog_constant() {
            fog_color
        } else {
            let mut fog = if fog_mode.fog_add() { [0; 3] } else { fog_color };
            if !fog_mode.fog_mult() {
                for (f, c) in fog.iter_mut().zip(color) {
                    *f -= c;
                }
            }

            let blend = self.fog_blend(x, dither, depth, iterated) + 1;
            fog.map(|f| (f * blend) >> 8)
        };

        if fog_mode.fog_mult() {
            fog.map(|f| f.clamp(0, 0xFF))
        } else {
            [0, 1, 2].map(|i| (color[i] + fog[i]).clamp(0, 0xFF))
        }
    }

    fn alpha_blend(
        &self,
        position: PixelPosition,
        dither: &Dither,
        source: [i32; 4],
        pre_fog: [i32; 3],
    ) -> [i32; 4] {
        let PixelPosition { x, screen_y, .. } = position;
        let config = self.config;
        let alpha_mode = config.alpha_mode;

        let dest = self.target.read_color(x, screen_y);
        let mut dr = i32::from((dest >> 8) & 0xF8);
        let mut dg = i32::from((dest >> 3) & 0xFC);
        let mut db = i32::from((dest << 3) & 0xF8);
        let da = match self.target.read_aux(x, screen_y) {
            Some(aux) if config.fbz_mode.enable_alpha_planes() => i32::from(aux),
            _ => 0xFF,
        };

        if config.fbz_mode.alpha_dither_subtract() {
            let d = dither.matrix_value(x);
            dr = ((dr << 1) + 15 - d) >> 1;
            dg = ((dg << 2) + 15 - d) >> 2;
            db = ((db << 1) + 15 - d) >> 1;
        }

        let [sr, sg, sb, sa] = source;
        let src = [sr, sg, sb];
        let dst = [dr, dg, db];

        let source_term = |i: usize| {
            let s = src[i];
            match alpha_mode.src_rgb_blend() {
                1 => (s * (sa + 1)) >> 8,
                2 => (s * (dst[i] + 1)) >> 8,
                3 => (s * (da + 1)) >> 8,
                4 => s,
                5 => (s * (0x100 - sa)) >> 8,
                6 => (s * (0x100 - dst[i])) >> 8,
                7 => (s * (0x100 - da)) >> 8,
                15 => {
                    let saturate = sa.min(0x100 - da);
                    (s * (saturate + 1)) >> 8
                }
                _ => 0,
            }
        };

        let dest_term = |i: usize| {
            let d = dst[i];
            match alpha_mode.dst_rgb_blend() {
                1 => (d * (sa + 1)) >> 8,
                2 => (d * (src[i] + 1)) >> 8,
                3 => (d * (da + 1)) >> 8,
                4 => d,
                5 => (d * (0x100 - sa)) >> 8,
                6 => (d * (0x100 - src[i])) >> 8,
                7 => (d * (0x100 - da)) >> 8,
                15 => (d * (pre_fog[i] + 1)) >> 8,
                _ => 0,
            }
        };

        // Alpha only supports ONE and ZERO factors
        let mut a = 0;
        if alpha_mode.src_alpha_blend() == 4 {
            a = sa;
        }
        if alpha_mode.dst_alpha_blend() == 4 {
            a += da;
        }

        let [r, g, b] = [0, 1, 2].map(|i| (source_term(i) + dest_term(i)).clamp(0, 0xFF));
        [r, g, b, a.clamp(0, 0xFF)]
    }

    // Fog, alpha blend, dither and write-back
    pub fn end(
        &mut self,
        position: PixelPosition,
        dither: &Dither,
        depth: PixelDepth,
        color: Argb,
        iterated: &Iterated,
    ) {
        let PixelPosition { x, screen_y, .. } = position;
        let config = self.config;
        let fbz_mode = config.fbz_mode;

        let pre_fog = [color.r, color.g, color.b].map(i32::from);
        let mut rgb = pre_fog;
        if config.fog_mode.enable_fog() {
            rgb = self.apply_fog(x, dither, depth, iterated, rgb);
        }

        let mut argb = [rgb[0], rgb[1], rgb[2], color.a.into()];
        if config.alpha_mode.alpha_blend() {
            argb = self.alpha_blend(position, dither, argb, pre_fog);
        }
        let [r, g, b, a] = argb;

        if fbz_mode.rgb_buffer_mask() {
            let value = dither.apply(x, r, g, b);
            self.target.write_color(x, screen_y, value);
        }

        if fbz_mode.aux_buffer_mask() {
            let value = if fbz_mode.enable_alpha_planes() { a } else { depth.depth };
            self.target.write_aux(x, screen_y, value as u16);
        }

        increment(&mut self.stats.pixels_out);
    }
}
