//! Fixed-point reciprocal and base-2 logarithm unit
//!
//! The chip never divides. Perspective correction and LOD selection both go through a
//! table-driven approximation: the input is normalized by its leading zero count, the top
//! mantissa bits index a 513-entry table of (reciprocal, log2) pairs, and the next 8 bits
//! linearly interpolate between neighboring entries.


use std::sync::LazyLock;

pub const RECIPLOG_LOOKUP_BITS: u32 = 9;
pub const LOG_OUTPUT_PREC: u32 = 8;

const RECIPLOG_INPUT_PREC: i32 = 32;
const RECIPLOG_LOOKUP_PREC: u32 = 22;
const RECIP_OUTPUT_PREC: i32 = 15;

const TABLE_LEN: usize = (2 << RECIPLOG_LOOKUP_BITS) + 2;

// Interleaved (reciprocal, log2) pairs for mantissas 1.0 through 2.0 inclusive
static RECIPLOG_TABLE: LazyLock<[u32; TABLE_LEN]> = LazyLock::new(|| {
    let mut table = [0; TABLE_LEN];

    for i in 0..=(1_u32 << RECIPLOG_LOOKUP_BITS) {
        let value = (1 << RECIPLOG_LOOKUP_BITS) + i;
        let mantissa = f64::from(value) / f64::from(1_u32 << RECIPLOG_LOOKUP_BITS);

        table[2 * i as usize] = (1 << (RECIPLOG_LOOKUP_PREC + RECIPLOG_LOOKUP_BITS)) / value;
        table[2 * i as usize + 1] =
            (mantissa.ln() / 2.0_f64.ln() * f64::from(1_u32 << RECIPLOG_LOOKUP_PREC)) as u32;
    }

    table
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipLog {
    // 1/x with 15 fractional bits, x being a 16.32 value
    pub recip: i32,
    // log2(1/|x|) with 8 fractional bits
    pub log2: i32,
}

impl RecipLog {
    // Returned for inputs that are zero after range reduction
    pub const INFINITE_LOG2: i32 = 1000 << LOG_OUTPUT_PREC;
}

pub fn fast_reciplog(value: i64) -> RecipLog {
    let negative = value < 0;
    let magnitude = value.unsigned_abs();

    // Push values that spill out of 32 bits back under 32 bits
    let mut exp: i32 = 0;
    let mut temp = if magnitude & 0xFFFF_0000_0000 != 0 {
        exp -= 16;
        (magnitude >> 16) as u32
    } else {
        magnitude as u32
    };

    if temp == 0 {
        return RecipLog {
            recip: if negative { i32::MIN } else { i32::MAX },
            log2: RecipLog::INFINITE_LOG2,
        };
    }

    let lz = temp.leading_zeros();
    temp <<= lz;
    exp += lz as i32;

    // Shift one less than needed since every table entry is a pair
    let table = &*RECIPLOG_TABLE;
    let index = ((temp >> (31 - RECIPLOG_LOOKUP_BITS - 1)) & ((2 << RECIPLOG_LOOKUP_BITS) - 2))
        as usize;
    let interp = (temp >> (31 - RECIPLOG_LOOKUP_BITS - 8)) & 0xFF;

    let rlog = (table[index + 1] * (0x100 - interp) + table[index + 3] * interp) >> 8;
    let mut recip = (table[index] * (0x100 - interp) + table[index + 2] * interp) >> 8;

    // Round the fractional log to the output precision
    let rlog = (rlog + (1 << (RECIPLOG_LOOKUP_PREC - LOG_OUTPUT_PREC - 1)))
        >> (RECIPLOG_LOOKUP_PREC - LOG_OUTPUT_PREC);

    // log(1/x) = -log(x), so the fraction is subtracted from the exponent instead of added
    let log2 = ((exp - (31 - RECIPLOG_INPUT_PREC)) << LOG_OUTPUT_PREC) - rlog as i32;

    exp += (RECIP_OUTPUT_PREC - RECIPLOG_LOOKUP_PREC as i32) - (31 - RECIPLOG_INPUT_PREC);
    if exp < 0 {
        recip >>= -exp;
    } else {
        recip <<= exp;
    }

    let recip = recip as i32;
    RecipLog { recip: if negative { recip.wrapping_neg() } else { recip }, log2 }
}
