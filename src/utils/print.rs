/*
 * Numeric Printers
 *
 * Integer, float and hex output for the console layer, usable with any
 * `core::fmt::Write` sink (typically a `Writer` over a device handle).
 * Digits are produced into a fixed `heapless` buffer; nothing allocates.
 */

use core::fmt::{self, Write};

use heapless::Vec;

/// Enough digits for a u32 in base 2
const DIGITS_MAX: usize = 32;

/// Print `n` in `base` (2..=36), upper-case digits above 9.
pub fn print_integer_in_base<W: Write>(out: &mut W, mut n: u32, base: u32) -> fmt::Result {
    if !(2..=36).contains(&base) {
        return Err(fmt::Error);
    }
    if n == 0 {
        return out.write_char('0');
    }

    let mut digits: Vec<u8, DIGITS_MAX> = Vec::new();
    while n > 0 {
        let d = (n % base) as u8;
        digits.push(if d < 10 { b'0' + d } else { b'A' + d - 10 }).map_err(|_| fmt::Error)?;
        n /= base;
    }
    for &c in digits.iter().rev() {
        out.write_char(c as char)?;
    }
    Ok(())
}

/// Print a signed decimal integer.
pub fn print_integer<W: Write>(out: &mut W, n: i32) -> fmt::Result {
    if n < 0 {
        out.write_char('-')?;
    }
    print_integer_in_base(out, n.unsigned_abs(), 10)
}

/// Print a float with three decimals, rounded to nearest.
pub fn print_float<W: Write>(out: &mut W, n: f32) -> fmt::Result {
    if n.is_nan() {
        return out.write_str("nan");
    }
    if n < 0.0 {
        out.write_char('-')?;
    }
    let n = if n < 0.0 { -n } else { n };
    if n.is_infinite() {
        return out.write_str("inf");
    }

    let mut integer = n as u32;
    let mut thousandths = ((n - integer as f32) * 1000.0 + 0.5) as u32;
    if thousandths >= 1000 {
        integer = integer.saturating_add(1);
        thousandths -= 1000;
    }

    print_integer_in_base(out, integer, 10)?;
    out.write_char('.')?;
    // zero-pad the fraction: 1.05 is "1.050", not "1.50"
    if thousandths < 100 {
        out.write_char('0')?;
    }
    if thousandths < 10 {
        out.write_char('0')?;
    }
    print_integer_in_base(out, thousandths, 10)
}

pub fn print_hex<W: Write>(out: &mut W, n: u32) -> fmt::Result {
    print_integer_in_base(out, n, 16)
}
