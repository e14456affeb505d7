//! Ordered dithering from 8-bit channels down to the 5-6-5 frame buffer format

#[cfg(test)]
mod tests;

use crate::registers::FbzMode;

const DITHER_MATRIX_4X4: [u8; 16] = [0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5];

// The 2x2 matrix is stored expanded to 4x4 so both share the same indexing
const DITHER_MATRIX_2X2: [u8; 16] = [2, 10, 2, 10, 14, 6, 14, 6, 2, 10, 2, 10, 14, 6, 14, 6];

const LOOKUP_ROW_LEN: usize = 1 << 11;
const LOOKUP_LEN: usize = 4 * LOOKUP_ROW_LEN;

const fn dither_rb(value: u32, dither: u32) -> u8 {
    ((((value << 1) - (value >> 4) + (value >> 7) + dither) >> 1) >> 3) as u8
}

const fn dither_g(value: u32, dither: u32) -> u8 {
    ((((value << 2) - (value >> 4) + (value >> 6) + dither) >> 2) >> 2) as u8
}

// Index layout: (y & 3) << 11 | color << 3 | (x & 3) << 1 | is_green
const fn build_lookup(matrix: &[u8; 16]) -> [u8; LOOKUP_LEN] {
    let mut table = [0; LOOKUP_LEN];

    let mut i = 0;
    while i < LOOKUP_LEN {
        let y = (i >> 11) & 3;
        let color = ((i >> 3) & 0xFF) as u32;
        let x = (i >> 1) & 3;
        let dither = matrix[y * 4 + x] as u32;

        table[i] = if i & 1 == 0 { dither_rb(color, dither) } else { dither_g(color, dither) };

        i += 1;
    }

    table
}

static DITHER4_LOOKUP: [u8; LOOKUP_LEN] = build_lookup(&DITHER_MATRIX_4X4);
static DITHER2_LOOKUP: [u8; LOOKUP_LEN] = build_lookup(&DITHER_MATRIX_2X2);

// Per-scanline dither state; cheap to construct once per row
#[derive(Debug, Clone, Copy)]
pub struct Dither {
    // None when dithering is disabled and channels are truncated instead
    lookup: Option<&'static [u8]>,
    matrix: &'static [u8],
    matrix_4x4: &'static [u8],
}

impl Dither {
    pub fn new(fbz_mode: FbzMode, y: i32) -> Self {
        let row = (y & 3) as usize;
        let (lookup_table, matrix) = if fbz_mode.dither_type() {
            (&DITHER2_LOOKUP, &DITHER_MATRIX_2X2)
        } else {
            (&DITHER4_LOOKUP, &DITHER_MATRIX_4X4)
        };

        Self {
            lookup: fbz_mode
                .enable_dithering()
                .then(|| &lookup_table[row * LOOKUP_ROW_LEN..(row + 1) * LOOKUP_ROW_LEN]),
            matrix: &matrix[row * 4..row * 4 + 4],
            matrix_4x4: &DITHER_MATRIX_4X4[row * 4..row * 4 + 4],
        }
    }

    // Matrix value of the selected dither type, used by the alpha blend dither subtract
    pub fn matrix_value(&self, x: i32) -> i32 {
        self.matrix[(x & 3) as usize].into()
    }

    // LOD and fog dithering always use the 4x4 matrix regardless of dither type
    pub fn matrix_4x4_value(&self, x: i32) -> i32 {
        self.matrix_4x4[(x & 3) as usize].into()
    }

    // Quantize 8-bit channels (already clamped to 0..=255) to RGB565
    pub fn apply(&self, x: i32, r: i32, g: i32, b: i32) -> u16 {
        let (r, g, b) = match self.lookup {
            Some(lookup) => {
                let x = ((x & 3) << 1) as usize;
                (
                    lookup[((r as usize) << 3) + x],
                    lookup[((g as usize) << 3) + x + 1],
                    lookup[((b as usize) << 3) + x],
                )
            }
            None => ((r >> 3) as u8, (g >> 2) as u8, (b >> 3) as u8),
        };

        (u16::from(r) << 11) | (u16::from(g) << 5) | u16::from(b)
    }
}
