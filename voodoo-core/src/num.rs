pub trait U32Ext {
    fn bit(self, i: u8) -> bool;

    fn sign_bit(self) -> bool;

    // Interpret the lowest `bits` bits as a two's complement value
    fn sign_extend(self, bits: u8) -> i32;
}

impl U32Ext for u32 {
    fn bit(self, i: u8) -> bool {
        self & (1 << i) != 0
    }

    fn sign_bit(self) -> bool {
        self.bit(31)
    }

    fn sign_extend(self, bits: u8) -> i32 {
        let shift = 32 - u32::from(bits);
        ((self << shift) as i32) >> shift
    }
}

// Convert an IEEE single to signed fixed-point with `fixed_bits` fractional bits, truncating
// towards zero the way the chip's float interface does. Out-of-range exponents saturate to the
// largest positive value before the sign is applied.
pub fn float_to_fixed32(data: u32, fixed_bits: i32) -> i32 {
    let exponent = ((data >> 23) & 0xFF) as i32 - 127 - 23 + fixed_bits;
    let mut result = ((data & 0x7FFFFF) | 0x800000) as i32;

    if exponent < 0 {
        result = if exponent > -32 { result >> -exponent } else { 0 };
    } else {
        result = if exponent < 32 { result << exponent } else { 0x7FFFFFFF };
    }

    if data.sign_bit() {
        result.wrapping_neg()
    } else {
        result
    }
}

pub fn float_to_fixed64(data: u32, fixed_bits: i32) -> i64 {
    let exponent = ((data >> 23) & 0xFF) as i32 - 127 - 23 + fixed_bits;
    let mut result = i64::from((data & 0x7FFFFF) | 0x800000);

    if exponent < 0 {
        result = if exponent > -64 { result >> -exponent } else { 0 };
    } else {
        result = if exponent < 64 { result << exponent } else { 0x7FFFFFFFFFFFFFFF };
    }

    if data.sign_bit() {
        result.wrapping_neg()
    } else {
        result
    }
}
