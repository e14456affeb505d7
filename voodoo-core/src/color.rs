use bincode::{Decode, Encode};

// 32-bit ARGB color as stored in color registers and produced by texel lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const BLACK: Self = Self::new(0, 0, 0, 0);

    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn from_u32(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn rgb(self) -> u32 {
        self.to_u32() & 0x00FF_FFFF
    }

    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

pub const fn rgb332_to_argb(value: u8) -> Argb {
    let v = value;
    let r = (v & 0xE0) | ((v >> 3) & 0x1C) | ((v >> 6) & 0x03);
    let g = ((v << 3) & 0xE0) | (v & 0x1C) | ((v >> 3) & 0x03);
    let b = ((v << 6) & 0xC0) | ((v << 4) & 0x30) | ((v << 2) & 0x0C) | (v & 0x03);
    Argb::new(0xFF, r, g, b)
}

pub const fn rgb565_to_argb(value: u16) -> Argb {
    let v = value;
    let r = (((v >> 8) & 0xF8) | ((v >> 13) & 0x07)) as u8;
    let g = (((v >> 3) & 0xFC) | ((v >> 9) & 0x03)) as u8;
    let b = (((v << 3) & 0xF8) | ((v >> 2) & 0x07)) as u8;
    Argb::new(0xFF, r, g, b)
}

pub const fn argb1555_to_argb(value: u16) -> Argb {
    let v = value;
    let a = if v & 0x8000 != 0 { 0xFF } else { 0x00 };
    let r = (((v >> 7) & 0xF8) | ((v >> 12) & 0x07)) as u8;
    let g = (((v >> 2) & 0xF8) | ((v >> 7) & 0x07)) as u8;
    let b = (((v << 3) & 0xF8) | ((v >> 2) & 0x07)) as u8;
    Argb::new(a, r, g, b)
}

pub const fn argb4444_to_argb(value: u16) -> Argb {
    let v = value;
    let a = (((v >> 8) & 0xF0) | ((v >> 12) & 0x0F)) as u8;
    let r = (((v >> 4) & 0xF0) | ((v >> 8) & 0x0F)) as u8;
    let g = ((v & 0xF0) | ((v >> 4) & 0x0F)) as u8;
    let b = (((v << 4) & 0xF0) | (v & 0x0F)) as u8;
    Argb::new(a, r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let color = Argb::from_u32(0x80FF4010);
        assert_eq!(color, Argb::new(0x80, 0xFF, 0x40, 0x10));
        assert_eq!(color.to_u32(), 0x80FF4010);
        assert_eq!(color.rgb(), 0xFF4010);
    }

    #[test]
    fn expansion_replicates_high_bits() {
        assert_eq!(rgb565_to_argb(0xFFFF), Argb::new(0xFF, 0xFF, 0xFF, 0xFF));
        assert_eq!(rgb565_to_argb(0x0000), Argb::new(0xFF, 0, 0, 0));
        assert_eq!(rgb565_to_argb(0xF800), Argb::new(0xFF, 0xFF, 0, 0));
        assert_eq!(argb1555_to_argb(0x7C00), Argb::new(0, 0xFF, 0, 0));
        assert_eq!(argb4444_to_argb(0xF0F0), Argb::new(0xFF, 0, 0xFF, 0));
        assert_eq!(rgb332_to_argb(0xE0), Argb::new(0xFF, 0xFF, 0, 0));
        assert_eq!(rgb332_to_argb(0x03), Argb::new(0xFF, 0, 0, 0xFF));
    }
}
