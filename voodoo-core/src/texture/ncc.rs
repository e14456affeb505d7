//! NCC ("narrow channel compression") tables: 8-bit YIQ-like texels decoded through 12 registers

use crate::num::U32Ext;
use bincode::{Decode, Encode};

pub const NCC_REGISTERS: usize = 12;

#[derive(Debug, Clone, Encode, Decode)]
pub struct NccTable {
    registers: [u32; NCC_REGISTERS],
    y: [i32; 16],
    // [R, G, B] components for each of the 4 I and 4 Q entries
    i: [[i32; 3]; 4],
    q: [[i32; 3]; 4],
    texels: [u32; 256],
    dirty: bool,
}

fn unpack_iq(data: u32) -> [i32; 3] {
    [(data >> 18).sign_extend(9), (data >> 9).sign_extend(9), data.sign_extend(9)]
}

impl NccTable {
    pub fn new() -> Self {
        Self {
            registers: [0; NCC_REGISTERS],
            y: [0; 16],
            i: [[0; 3]; 4],
            q: [[0; 3]; 4],
            texels: [0xFF00_0000; 256],
            dirty: true,
        }
    }

    pub fn register(&self, index: usize) -> u32 {
        self.registers[index]
    }

    pub fn write(&mut self, index: usize, data: u32) {
        match index {
            0..=3 => {
                for (y, byte) in self.y[index * 4..index * 4 + 4].iter_mut().zip(data.to_le_bytes()) {
                    *y = byte.into();
                }
            }
            4..=7 => self.i[index - 4] = unpack_iq(data),
            8..=11 => self.q[index - 8] = unpack_iq(data),
            _ => return,
        }

        self.registers[index] = data;
        self.dirty = true;
    }

    pub fn update(&mut self) {
        if !self.dirty {
            return;
        }

        for (index, texel) in self.texels.iter_mut().enumerate() {
            let y = self.y[index >> 4];
            let i = self.i[(index >> 2) & 3];
            let q = self.q[index & 3];

            let r = (y + i[0] + q[0]).clamp(0, 255) as u32;
            let g = (y + i[1] + q[1]).clamp(0, 255) as u32;
            let b = (y + i[2] + q[2]).clamp(0, 255) as u32;
            *texel = 0xFF00_0000 | (r << 16) | (g << 8) | b;
        }

        self.dirty = false;
        log::debug!("Recomputed NCC table");
    }

    pub fn lookup(&self, index: u8) -> u32 {
        self.texels[index as usize]
    }
}
