//! Decoding of the signed `size` argument of read() and write().

use super::device::Errno;

/// Read / write by exact size
pub const SIZE_MODE: i16 = 0;
/// Read / write to a line delimiter
pub const LINE_MODE: i16 = -1;
/// Read / write to NUL
pub const STR_MODE: i16 = -2;
/// Write a program-memory string to NUL
pub const PSTR_MODE: i16 = -3;

/// ASCII NUL, the string terminator
pub const NUL: u8 = 0;

/// Check whether `c` ends a line: `\r`, `\n` or `;`.
#[inline(always)]
pub const fn is_delimiter(c: u8) -> bool {
    matches!(c, b'\r' | b'\n' | b';')
}

/// Transfer mode selected by a `size` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `size == 0`: nothing to do
    Empty,
    /// Exactly this many bytes
    Exact(u16),
    /// Up to and including a line delimiter or NUL
    Line,
    /// Up to a NUL
    Str,
    /// Up to a NUL, sourced from program memory (write only)
    PgmStr,
}

impl Mode {
    /// Decode the size argument of a read().
    pub const fn for_read(size: i16) -> Result<Mode, Errno> {
        match Mode::decode(size) {
            Ok(Mode::PgmStr) => Err(Errno::InvalidArgument),
            other => other,
        }
    }

    /// Decode the size argument of a write().
    pub const fn for_write(size: i16) -> Result<Mode, Errno> {
        Mode::decode(size)
    }

    const fn decode(size: i16) -> Result<Mode, Errno> {
        match size {
            SIZE_MODE => Ok(Mode::Empty),
            1.. => Ok(Mode::Exact(size as u16)),
            LINE_MODE => Ok(Mode::Line),
            STR_MODE => Ok(Mode::Str),
            PSTR_MODE => Ok(Mode::PgmStr),
            _ => Err(Errno::InvalidArgument),
        }
    }
}
