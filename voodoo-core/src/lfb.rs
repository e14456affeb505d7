//! Linear frame buffer access
//!
//! Writes decode one 32-bit bus value into up to two pixels according to `lfbMode`, then either
//! store them directly or run each through the pixel pipeline. Reads return two 16-bit pixels
//! from the selected buffer.

#[cfg(test)]
mod tests;

use crate::api::Voodoo;
use crate::color::{self, Argb};
use crate::combine::CombineUnit;
use crate::dither::Dither;
use crate::fbi::BufferSelect;
use crate::pixel::{Iterated, PixelConfig, PixelPosition};
use crate::registers::{FbzMode, LfbMode, Register};

// Pixels per row of the LFB address space
const LFB_STRIDE_SHIFT: u32 = 10;

// Per-pixel nibble of data present in a write; pixel 1 uses the same bits shifted by 4
const RGB: u8 = 1 << 0;
const ALPHA: u8 = 1 << 1;
const DEPTH: u8 = 1 << 2;
// Depth from the upper half of a 32-bit depth+color write
const DEPTH_MSW: u8 = 1 << 3;

// Decoded contents of one LFB write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LfbPixels {
    colors: [Argb; 2],
    depths: [u16; 2],
    // Two nibbles of presence bits, pixel 0 in the low nibble
    present: u8,
    // Number of pixels packed into the bus value
    count: u32,
}

fn x555_to_argb(value: u16) -> Argb {
    color::argb1555_to_argb(value).with_alpha(0xFF)
}

// RGBA lane orders put alpha (or padding) in the low bits of 16-bit formats
fn unpack_16bit(format: u8, value: u16, alpha_low: bool) -> Argb {
    match (format, alpha_low) {
        (1, false) => x555_to_argb(value),
        (1, true) => x555_to_argb(value >> 1),
        (2, false) => color::argb1555_to_argb(value),
        (2, true) => {
            let alpha = if value & 1 != 0 { 0xFF } else { 0 };
            x555_to_argb(value >> 1).with_alpha(alpha)
        }
        _ => color::rgb565_to_argb(value),
    }
}

fn unpack_32bit(value: u32, alpha_low: bool) -> Argb {
    if alpha_low { Argb::from_u32(value.rotate_right(8)) } else { Argb::from_u32(value) }
}

fn swap_red_blue(color: Argb) -> Argb {
    Argb { r: color.b, b: color.r, ..color }
}

impl LfbPixels {
    // Returns None for reserved write formats
    fn decode(mode: LfbMode, data: u32, za_color: u32) -> Option<Self> {
        let lanes = mode.rgba_lanes();
        let alpha_low = lanes & 2 != 0;
        let swap = lanes & 1 != 0;

        let default_alpha = (za_color >> 24) as u8;
        let default_depth = za_color as u16;
        let low = data as u16;
        let high = (data >> 16) as u16;

        let finish = |color: Argb, has_alpha: bool| {
            let color = if has_alpha { color } else { color.with_alpha(default_alpha) };
            if swap { swap_red_blue(color) } else { color }
        };

        let format = mode.write_format();
        let pixels = match format {
            // Two 16-bit color pixels
            0..=2 => {
                let has_alpha = format == 2;
                let present = if has_alpha { RGB | ALPHA } else { RGB };
                Self {
                    colors: [low, high].map(|value| {
                        finish(unpack_16bit(format, value, alpha_low), has_alpha)
                    }),
                    depths: [default_depth; 2],
                    present: present | (present << 4),
                    count: 2,
                }
            }
            // One 32-bit color pixel
            4 | 5 => {
                let has_alpha = format == 5;
                Self {
                    colors: [finish(unpack_32bit(data, alpha_low), has_alpha); 2],
                    depths: [default_depth; 2],
                    present: if has_alpha { RGB | ALPHA } else { RGB },
                    count: 1,
                }
            }
            // 16-bit depth in the upper half, 16-bit color in the lower half
            12..=14 => {
                let color_format = format - 12;
                let has_alpha = color_format == 2;
                let color = finish(unpack_16bit(color_format, low, alpha_low), has_alpha);
                Self {
                    colors: [color; 2],
                    depths: [high, default_depth],
                    present: RGB | DEPTH_MSW | if has_alpha { ALPHA } else { 0 },
                    count: 1,
                }
            }
            // Two 16-bit depth pixels
            15 => Self {
                colors: [Argb::BLACK.with_alpha(default_alpha); 2],
                depths: [low, high],
                present: DEPTH | (DEPTH << 4),
                count: 2,
            },
            _ => return None,
        };

        Some(pixels)
    }

    // Drops the pixels whose half of the bus value is not being written; the depth of a
    // depth+color write lives in the upper half
    fn apply_mem_mask(&mut self, mem_mask: u32) {
        if mem_mask & 0x0000_FFFF == 0 {
            self.present &= !(0x0F - DEPTH_MSW);
        }
        if mem_mask & 0xFFFF_0000 == 0 {
            self.present &= !(0xF0 + DEPTH_MSW);
        }
    }
}

impl Voodoo {
    // `offset` is a dword offset into the LFB aperture; `mem_mask` selects the bus bytes written
    pub fn write_lfb(&mut self, offset: u32, data: u32, mem_mask: u32) {
        self.flush();

        let mode = LfbMode(self.regs[Register::LFB_MODE].u32());
        let (mut data, mut mem_mask) = (data, mem_mask);
        if mode.byte_swizzle_writes() {
            data = data.swap_bytes();
            mem_mask = mem_mask.swap_bytes();
        }
        if mode.word_swap_writes() {
            data = data.rotate_left(16);
            mem_mask = mem_mask.rotate_left(16);
        }

        let za_color = self.regs[Register::ZA_COLOR].u32();
        let Some(mut pixels) = LfbPixels::decode(mode, data, za_color) else {
            log::debug!("LFB write with reserved format {} ignored", mode.write_format());
            return;
        };
        pixels.apply_mem_mask(mem_mask);

        let pixel_offset = if pixels.count == 2 { offset << 1 } else { offset };
        let x = (pixel_offset & ((1 << LFB_STRIDE_SHIFT) - 1)) as i32;
        let y = ((pixel_offset >> LFB_STRIDE_SHIFT) & 0x3FF) as i32;

        let config = self.revision_config();
        let select = if config.banshee_layout {
            Some(BufferSelect::Back)
        } else {
            BufferSelect::from_bits(mode.write_buffer_select())
        };
        let Some(draw_offset) = select
            .filter(|select| *select != BufferSelect::Aux)
            .and_then(|select| self.fbi.buffer_offset(select))
        else {
            log::debug!("LFB write to reserved buffer {} ignored", mode.write_buffer_select());
            return;
        };

        let screen_y = self.fbi.layout().screen_y(y, mode.y_origin());
        log::trace!("LFB write ({x}, {y}) {data:08X} mask {mem_mask:08X} format {mode:?}");

        if mode.enable_pixel_pipeline() {
            self.write_lfb_pipeline(mode, &pixels, draw_offset, (x, y, screen_y));
        } else {
            self.write_lfb_direct(&pixels, draw_offset, (x, y, screen_y));
        }
    }

    fn write_lfb_direct(
        &mut self,
        pixels: &LfbPixels,
        draw_offset: u32,
        (x, y, screen_y): (i32, i32, i32),
    ) {
        let fbz_mode = FbzMode(self.regs[Register::FBZ_MODE].u32());
        let dither = Dither::new(fbz_mode, y);
        let row_pixels = self.fbi.layout().row_pixels;
        let aux_offset = self.fbi.layout().aux_offset;
        let ram_len = u64::from(self.fbi.ram().mask()) + 1;

        // Pixels past the end of frame buffer memory are dropped rather than wrapped
        let in_bounds = |base: u32, pixel: u32| u64::from(base) + 2 * u64::from(pixel) < ram_len;

        let mut present = pixels.present;
        let mut pixel = (screen_y as u32).wrapping_mul(row_pixels).wrapping_add(x as u32);
        for i in 0..2 {
            let flags = present & 0xF;
            if flags != 0 {
                let color = pixels.colors[i];
                let px = x + i as i32;
                let ram = self.fbi.ram_mut();

                if flags & RGB != 0 && in_bounds(draw_offset, pixel) {
                    let value = dither.apply(px, color.r.into(), color.g.into(), color.b.into());
                    ram.write_u16(draw_offset + 2 * pixel, value);
                }

                if let Some(aux) = aux_offset.filter(|&aux| in_bounds(aux, pixel)) {
                    if fbz_mode.enable_alpha_planes() {
                        if flags & ALPHA != 0 {
                            ram.write_u16(aux + 2 * pixel, color.a.into());
                        }
                    } else if flags & (DEPTH | DEPTH_MSW) != 0 {
                        ram.write_u16(aux + 2 * pixel, pixels.depths[i]);
                    }
                }

                // Counted whether or not anything was written
                self.fbi.stats.pixels_out = self.fbi.stats.pixels_out.wrapping_add(1);
            }

            present >>= 4;
            pixel = pixel.wrapping_add(1);
        }
    }

    fn write_lfb_pipeline(
        &mut self,
        mode: LfbMode,
        pixels: &LfbPixels,
        draw_offset: u32,
        (x, y, screen_y): (i32, i32, i32),
    ) {
        let config = self.revision_config();
        let pixel_config = PixelConfig::from_registers(&self.regs, config, CombineUnit::default());
        let dither = Dither::new(pixel_config.fbz_mode, y);
        let za_color = self.regs[Register::ZA_COLOR].u32();
        let stipple = self.regs[Register::STIPPLE].u32();

        let mut pipeline = self.fbi.pixel_pipeline(&pixel_config, draw_offset, stipple);
        let mut present = pixels.present;
        for i in 0..2 {
            if present & 0xF != 0 {
                let depth = pixels.depths[i];
                // The LFB depth supplies both Z and the top of W's fraction unless W comes from
                // zaColor
                let w = if mode.write_w_select() { za_color << 16 } else { u32::from(depth) << 16 };
                let iterated = Iterated {
                    color: pixels.colors[i],
                    z: i32::from(depth) << 12,
                    w: i64::from(w),
                };
                let position = PixelPosition { x: x + i as i32, y, screen_y };

                if let Some(depth) = pipeline.begin(position, &iterated) {
                    if let Some(color) = pipeline.color_tests(iterated.color) {
                        pipeline.end(position, &dither, depth, color, &iterated);
                    }
                }
            }

            present >>= 4;
        }

        let stipple = pipeline.stipple();
        self.regs[Register::STIPPLE].set_u32(stipple);
    }

    // Returns two 16-bit pixels from the buffer selected by lfbMode, or all ones if unavailable
    pub fn read_lfb(&mut self, offset: u32) -> u32 {
        self.flush();

        let mode = LfbMode(self.regs[Register::LFB_MODE].u32());
        let x = (offset << 1) & 0x3FE;
        let y = (offset >> (LFB_STRIDE_SHIFT - 1)) & 0x3FF;

        let select = if self.revision_config().banshee_layout {
            Some(BufferSelect::Back)
        } else {
            BufferSelect::from_bits(mode.read_buffer_select())
        };
        let Some(base) = select.and_then(|select| self.fbi.buffer_offset(select)) else {
            return 0xFFFF_FFFF;
        };

        let layout = self.fbi.layout();
        let screen_y = layout.screen_y(y as i32, mode.y_origin()) as u32;
        let pixel = screen_y.wrapping_mul(layout.row_pixels).wrapping_add(x);

        let ram = self.fbi.ram();
        let address = u64::from(base) + 2 * u64::from(pixel);
        if address >= u64::from(ram.mask()) + 1 {
            return 0xFFFF_FFFF;
        }

        let address = address as u32;
        let mut data =
            u32::from(ram.read_u16(address)) | (u32::from(ram.read_u16(address + 2)) << 16);
        if mode.word_swap_reads() {
            data = data.rotate_left(16);
        }
        if mode.byte_swizzle_reads() {
            data = data.swap_bytes();
        }

        data
    }
}
