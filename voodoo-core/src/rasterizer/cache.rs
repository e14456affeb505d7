//! Cache of decoded rasterizer configurations
//!
//! Entries are keyed on the mode registers after clearing bits that cannot change the per-pixel
//! result, so that e.g. moving the alpha reference value or switching NCC tables reuses the same
//! entry. Buckets keep the most recently used entry at the front.

use crate::combine::CombineUnit;
use crate::registers::{AlphaMode, FogMode, TextureMode};
use crate::texture::MAX_TMU;
use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};

const HASH_SIZE: usize = 97;
pub const MAX_RASTERIZERS: usize = 1024;

// Marks a TMU that does not take part in the triangle
const NO_TEXTURE: u32 = 0xFFFF_FFFF;

fn normalize_color_path(value: u32) -> u32 {
    // Subpixel adjust and texture enable only affect setup
    value & !((1 << 26) | (1 << 27))
}

fn normalize_alpha_mode(value: u32) -> u32 {
    let mode = AlphaMode(value);
    let mut value = value & !(0xFF << 24);
    if !mode.alpha_test() {
        value &= !(7 << 1);
    }
    if !mode.alpha_blend() {
        value &= !((0xF << 8) | (0xF << 12) | (0xF << 16) | (0xF << 20));
    }
    value
}

fn normalize_fog_mode(value: u32) -> u32 {
    if FogMode(value).enable_fog() { value } else { 0 }
}

fn normalize_fbz_mode(value: u32) -> u32 {
    value & !(3 << 14)
}

fn normalize_texture_mode(value: u32) -> u32 {
    let value = value & !((1 << 5) | (1 << 31));
    // Formats only matter by class: 8-bit, 16-bit palette-ish, other 16-bit
    let format_class = match TextureMode(value).format() {
        0..=7 => 0,
        10..=12 => 10,
        _ => 8,
    };
    TextureMode(value).with_format(format_class).0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterKey {
    pub color_path: u32,
    pub alpha_mode: u32,
    pub fog_mode: u32,
    pub fbz_mode: u32,
    pub texture_modes: [u32; MAX_TMU],
}

impl RasterKey {
    pub fn new(
        color_path: u32,
        alpha_mode: u32,
        fog_mode: u32,
        fbz_mode: u32,
        texture_modes: [Option<u32>; MAX_TMU],
    ) -> Self {
        Self {
            color_path: normalize_color_path(color_path),
            alpha_mode: normalize_alpha_mode(alpha_mode),
            fog_mode: normalize_fog_mode(fog_mode),
            fbz_mode: normalize_fbz_mode(fbz_mode),
            texture_modes: texture_modes.map(|mode| mode.map_or(NO_TEXTURE, normalize_texture_mode)),
        }
    }

    fn bucket(&self) -> usize {
        let mut hash = self.color_path;
        for value in [
            self.fbz_mode,
            self.alpha_mode,
            self.fog_mode,
            self.texture_modes[0],
            self.texture_modes[1],
        ] {
            hash = hash.rotate_left(1) ^ value;
        }
        hash as usize % HASH_SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterEntry {
    pub key: RasterKey,
    pub color_combine: CombineUnit,
    pub texture_combine: [CombineUnit; MAX_TMU],
    pub polygons: u32,
    pub pixels: u64,
}

impl RasterEntry {
    pub fn new(key: RasterKey) -> Self {
        Self {
            key,
            color_combine: CombineUnit::from_color_path(key.color_path.into()),
            texture_combine: key.texture_modes.map(|mode| CombineUnit::from_texture_mode(mode.into())),
            polygons: 0,
            pixels: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RasterCache {
    buckets: Vec<Vec<RasterEntry>>,
    len: usize,
    full_warned: bool,
}

impl RasterCache {
    pub fn new() -> Self {
        Self { buckets: vec![Vec::new(); HASH_SIZE], len: 0, full_warned: false }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &RasterEntry> {
        self.buckets.iter().flatten()
    }

    // Returns the entry for `key`, creating it on first use. Returns None only when the key is
    // new and the cache is full; the caller then decodes an uncached entry.
    pub fn find_or_insert(&mut self, key: RasterKey) -> Option<&mut RasterEntry> {
        let bucket = &mut self.buckets[key.bucket()];

        if let Some(position) = bucket.iter().position(|entry| entry.key == key) {
            if position != 0 {
                let entry = bucket.remove(position);
                bucket.insert(0, entry);
            }
            return bucket.first_mut();
        }

        if self.len >= MAX_RASTERIZERS {
            if !self.full_warned {
                log::warn!("Rasterizer cache is full ({MAX_RASTERIZERS} entries); decoding uncached");
                self.full_warned = true;
            }
            return None;
        }

        log::debug!("New rasterizer configuration: {key:08X?}");
        bucket.insert(0, RasterEntry::new(key));
        self.len += 1;
        bucket.first_mut()
    }
}

impl Default for RasterCache {
    fn default() -> Self {
        Self::new()
    }
}

// The cache is derived state; snapshots skip it and restore an empty cache
impl Encode for RasterCache {
    fn encode<E: Encoder>(&self, _encoder: &mut E) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl Decode for RasterCache {
    fn decode<D: Decoder>(_decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(Self::new())
    }
}

impl<'de> BorrowDecode<'de> for RasterCache {
    fn borrow_decode<D: BorrowDecoder<'de>>(_decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(Self::new())
    }
}
