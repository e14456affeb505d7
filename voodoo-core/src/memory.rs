//! Masked RAM used for frame buffer and texture memory
//!
//! All addressing wraps through `len - 1`, so any address the pipeline computes is valid. The
//! `Decode` implementation reads directly into a heap allocation rather than decoding byte by
//! byte through the generic `Vec<u8>` path, which matters for multi-megabyte save states.

use bincode::de::read::Reader;
use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    data: Box<[u8]>,
    mask: u32,
}

impl Ram {
    // `len` must be a power of two; callers validate sizes before construction
    pub fn new(len: usize) -> Self {
        debug_assert!(len.is_power_of_two());

        Self { data: vec![0; len].into_boxed_slice(), mask: (len - 1) as u32 }
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn read_u8(&self, address: u32) -> u8 {
        self.data[(address & self.mask) as usize]
    }

    pub fn write_u8(&mut self, address: u32, value: u8) {
        self.data[(address & self.mask) as usize] = value;
    }

    // Little-endian; each byte is masked separately so a halfword can straddle the wrap point
    pub fn read_u16(&self, address: u32) -> u16 {
        u16::from_le_bytes([self.read_u8(address), self.read_u8(address.wrapping_add(1))])
    }

    pub fn write_u16(&mut self, address: u32, value: u16) {
        let [lsb, msb] = value.to_le_bytes();
        self.write_u8(address, lsb);
        self.write_u8(address.wrapping_add(1), msb);
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }
}

impl Encode for Ram {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.data.encode(encoder)
    }
}

fn decode_ram<R: Reader>(len: usize, reader: &mut R) -> Result<Ram, DecodeError> {
    if !len.is_power_of_two() {
        return Err(DecodeError::OtherString(format!("RAM length {len} is not a power of two")));
    }

    let mut data = vec![0; len].into_boxed_slice();
    reader.read(&mut data)?;
    Ok(Ram { data, mask: (len - 1) as u32 })
}

impl Decode for Ram {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let len = usize::decode(decoder)?;
        decoder.claim_container_read::<u8>(len)?;
        decode_ram(len, decoder.reader())
    }
}

impl<'de> BorrowDecode<'de> for Ram {
    fn borrow_decode<D: BorrowDecoder<'de>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let len = usize::decode(decoder)?;
        decoder.claim_container_read::<u8>(len)?;
        decode_ram(len, decoder.reader())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_wrap() {
        let mut ram = Ram::new(0x1000);
        ram.write_u16(0x1FFF, 0xABCD);
        assert_eq!(ram.read_u8(0x0FFF), 0xCD);
        assert_eq!(ram.read_u8(0x0000), 0xAB);
        assert_eq!(ram.read_u16(0xFFFF_FFFF), 0xABCD);
    }

    #[test]
    fn encode_decode() {
        let mut ram = Ram::new(0x100);
        for i in 0..0x100 {
            ram.write_u8(i, rand::random());
        }

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&ram, config).unwrap();
        let (decoded, _): (Ram, usize) = bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(decoded, ram);
    }
}
