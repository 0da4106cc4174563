// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use std::fmt;

use thiserror::Error;

const SIGN_MASK: u32 = 0x8000_0000;
const SCALE_MASK: u32 = 0x00FF_0000;
const SCALE_SHIFT: u32 = 16;
pub const MAX_SCALE: u32 = 28;
const MAX_MANTISSA: u128 = (1 << 96) - 1;

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum DecimalError {
    #[error("decimal scale {0} exceeds {MAX_SCALE}")]
    Scale(u32),
    #[error("decimal mantissa does not fit in 96 bits")]
    Overflow,
    #[error("decimal flags {0:#010x} have reserved bits set")]
    Flags(u32),
}

/// A 96-bit mantissa with a power-of-ten scale, kept as the four 32-bit
/// fields it is transmitted as.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        lo: 0,
        mid: 0,
        hi: 0,
        flags: 0,
    };

    /// `mantissa * 10^-scale`.
    pub fn new(mantissa: i128, scale: u32) -> Result<Decimal, DecimalError> {
        if scale > MAX_SCALE {
            return Err(DecimalError::Scale(scale));
        }
        let magnitude = mantissa.unsigned_abs();
        if magnitude > MAX_MANTISSA {
            return Err(DecimalError::Overflow);
        }
        let mut flags = scale << SCALE_SHIFT;
        if mantissa < 0 {
            flags |= SIGN_MASK;
        }
        Ok(Decimal {
            lo: magnitude as u32,
            mid: (magnitude >> 32) as u32,
            hi: (magnitude >> 64) as u32,
            flags,
        })
    }

    pub fn from_raw(parts: [u32; 4]) -> Result<Decimal, DecimalError> {
        let [lo, mid, hi, flags] = parts;
        if flags & !(SIGN_MASK | SCALE_MASK) != 0 {
            return Err(DecimalError::Flags(flags));
        }
        let scale = (flags & SCALE_MASK) >> SCALE_SHIFT;
        if scale > MAX_SCALE {
            return Err(DecimalError::Scale(scale));
        }
        Ok(Decimal { lo, mid, hi, flags })
    }

    /// The `lo`, `mid`, `hi`, `flags` fields in wire order.
    pub fn to_raw(self) -> [u32; 4] {
        [self.lo, self.mid, self.hi, self.flags]
    }

    pub fn scale(self) -> u32 {
        (self.flags & SCALE_MASK) >> SCALE_SHIFT
    }

    pub fn is_negative(self) -> bool {
        self.flags & SIGN_MASK != 0
    }

    pub fn mantissa(self) -> i128 {
        let magnitude =
            (self.lo as i128) | ((self.mid as i128) << 32) | ((self.hi as i128) << 64);
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({self})")
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa().unsigned_abs().to_string();
        let scale = self.scale() as usize;
        if self.is_negative() {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}
