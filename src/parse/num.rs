//! Parsing of numeric literals in ASCII PLY bodies.
//!
//! These functions are intentionally forgiving: they never fail and never
//! panic. Overflow wraps around and bytes that are not digits produce garbage
//! values. The caller is responsible for only passing numeric tokens.

use num_traits::{AsPrimitive, Float, Zero};

use super::trim;


fn digit_value(b: u8) -> u64 {
    u64::from(b.wrapping_sub(b'0'))
}

/// Accumulates the decimal digits in `digits` (no trimming, no sign).
fn accumulate(digits: &[u8]) -> u64 {
    digits.iter().fold(0u64, |acc, &b| acc.wrapping_mul(10).wrapping_add(digit_value(b)))
}

/// Splits an optional leading `+` or `-` off. Returns `true` if the sign was
/// negative.
fn split_sign(token: &[u8]) -> (bool, &[u8]) {
    match token.first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    }
}

/// Parses an unsigned decimal integer. Surrounding spaces and tabs are
/// ignored.
pub fn parse_unsigned(token: &[u8]) -> u64 {
    accumulate(trim(token))
}

/// Parses a signed decimal integer with optional `+` or `-` prefix.
pub fn parse_signed(token: &[u8]) -> i64 {
    let (negative, digits) = split_sign(trim(token));
    let v = accumulate(digits) as i64;
    if negative {
        v.wrapping_neg()
    } else {
        v
    }
}

/// Parses a decimal floating point literal like `-12.375` or `1.5e-3`.
///
/// The value is computed as `int + frac / 10^n` where `int` and `frac` are the
/// digits before and after the `.` (read as unsigned integers) and `n` is the
/// number of fractional digits. Without a `.` the fraction is skipped
/// entirely. An exponent is applied afterwards as power of ten.
pub fn parse_float<F>(token: &[u8]) -> F
where
    F: Float + 'static,
    u64: AsPrimitive<F>,
{
    let (negative, body) = split_sign(trim(token));
    let (mantissa, exponent) = match body.iter().position(|&b| b == b'e' || b == b'E') {
        Some(pos) => (&body[..pos], Some(parse_signed(&body[pos + 1..]))),
        None => (body, None),
    };

    let ten: F = 10u64.as_();
    let mut v = match mantissa.iter().position(|&b| b == b'.') {
        Some(dot) => {
            let int_part: F = accumulate(&mantissa[..dot]).as_();
            let frac_digits = &mantissa[dot + 1..];
            if frac_digits.is_empty() {
                int_part
            } else {
                let frac: F = accumulate(frac_digits).as_();
                int_part + frac / ten.powi(frac_digits.len() as i32)
            }
        }
        None => accumulate(mantissa).as_(),
    };

    // Exponents beyond the `i32` range saturate, which gives infinity or zero
    // for any non-zero mantissa.
    if let Some(exp) = exponent.filter(|_| !v.is_zero()) {
        let exp = exp.max(i32::min_value().into()).min(i32::max_value().into()) as i32;
        v = v * ten.powi(exp);
    }

    if negative {
        -v
    } else {
        v
    }
}

/// Returns `true` if `token` consists of at least one byte and only ASCII
/// digits.
pub fn is_decimal(token: &[u8]) -> bool {
    !token.is_empty() && token.iter().all(u8::is_ascii_digit)
}
