//! Big-endian packed BCD
//!
//! The FT-857D carries every numeric CAT parameter as packed binary-coded
//! decimal, two digits per byte, most significant digit first.
//!
//! ```text
//! 14.070.00 MHz in 10 Hz steps = 01407000
//!                              = [0x01, 0x40, 0x70, 0x00]
//! ```
//!
//! Neither direction validates its input. Encoding keeps only the low
//! `digits` decimal digits of the value, and decoding accepts nibbles above
//! 9 as they are, which is exactly as lenient as the radio itself.

/// Number of bytes needed to hold `digits` packed BCD digits
pub const fn packed_len(digits: usize) -> usize {
    digits.div_ceil(2)
}

/// Pack `digits` decimal digits of `value` into `buf`, big-endian
///
/// When `digits` is odd the last digit lands in the high nibble of
/// `buf[digits / 2]` and the low nibble of that byte is left untouched, so
/// callers that care about it must zero the buffer first.
///
/// # Panics
///
/// Panics if `buf` is shorter than [`packed_len`]`(digits)`.
pub fn to_bcd_be(buf: &mut [u8], value: u64, digits: usize) {
    let mut remaining = value;

    if digits % 2 == 1 {
        let last = digits / 2;
        buf[last] &= 0x0F;
        buf[last] |= ((remaining % 10) as u8) << 4;
        remaining /= 10;
    }

    for i in (0..digits / 2).rev() {
        let low = (remaining % 10) as u8;
        remaining /= 10;
        let high = (remaining % 10) as u8;
        remaining /= 10;
        buf[i] = (high << 4) | low;
    }
}

/// Read `digits` packed BCD digits from `bytes`, big-endian
///
/// Accumulation wraps on overflow rather than panicking; that only happens
/// for digit counts beyond what a `u64` can represent.
///
/// # Panics
///
/// Panics if `bytes` is shorter than [`packed_len`]`(digits)`.
pub fn from_bcd_be(bytes: &[u8], digits: usize) -> u64 {
    let mut value: u64 = 0;

    for &byte in &bytes[..digits / 2] {
        value = push_digit(value, byte >> 4);
        value = push_digit(value, byte & 0x0F);
    }

    if digits % 2 == 1 {
        value = push_digit(value, bytes[digits / 2] >> 4);
    }

    value
}

fn push_digit(value: u64, digit: u8) -> u64 {
    value.wrapping_mul(10).wrapping_add(u64::from(digit))
}

/// Encode `value` into a freshly zeroed buffer of [`packed_len`]`(digits)` bytes
pub fn encode(value: u64, digits: usize) -> Vec<u8> {
    let mut buf = vec![0u8; packed_len(digits)];
    to_bcd_be(&mut buf, value, digits);
    buf
}

/// Decode `digits` BCD digits from the front of `bytes`
///
/// Alias of [`from_bcd_be`], kept for symmetry with [`encode`].
pub fn decode(bytes: &[u8], digits: usize) -> u64 {
    from_bcd_be(bytes, digits)
}
