/*
 * Device Abstraction Layer
 *
 * Character-level contract every serial device variant supplies, and the
 * error numbers the I/O core reports.
 *
 * A device variant only knows how to bring its hardware up, change its
 * baud rate, put one byte on the wire and fetch the byte the receiver just
 * latched. Buffering, blocking, echo and the read/write modes are handled
 * once, above this trait.
 */

use core::fmt;

use super::control::Baud;

/// Character-level operations of a serial device
pub trait SerialDevice: Sync {
    /// Program registers and pins for use at `baud`.
    fn init(&self, baud: Baud);

    /// Reprogram the baud rate of an initialized device.
    fn set_baud(&self, baud: Baud);

    /// Transmit one byte.
    ///
    /// Spins on the transmitter-ready condition. The wait is bounded by one
    /// character time, so this is not a scheduling point.
    fn send(&self, byte: u8);

    /// Fetch the byte the receiver has latched.
    ///
    /// Called from the receive interrupt only.
    fn recv(&self) -> u8;

    /// Called from the receive interrupt when the ring had no room for the
    /// byte just received. This is where flow control would be asserted.
    fn rx_full(&self) {}

    /// Release the device.
    ///
    /// Devices are opened once and stay open, so the default is a no-op.
    fn close(&self) {}
}

/// Error numbers reported by the I/O core
///
/// Values follow the conventional errno numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Errno {
    BadHandle = 9,       // EBADF: not an open handle, or direction not enabled
    WouldBlock = 11,     // EAGAIN: non-blocking operation could not complete
    NoSuchDevice = 19,   // ENODEV: unknown or not independently openable
    InvalidArgument = 22, // EINVAL: conflicting flags or unknown size mode
    TooLarge = 27,       // EFBIG: rejected before any byte moved
    MessageTooLong = 90, // EMSGSIZE: transferred up to the limit, then stopped
    Unreachable = 255,   // internal dispatch fell through
}

impl Errno {
    /// Numeric errno value
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Map a numeric errno value back to its kind.
    pub const fn from_code(code: u8) -> Option<Errno> {
        match code {
            9 => Some(Errno::BadHandle),
            11 => Some(Errno::WouldBlock),
            19 => Some(Errno::NoSuchDevice),
            22 => Some(Errno::InvalidArgument),
            27 => Some(Errno::TooLarge),
            90 => Some(Errno::MessageTooLong),
            255 => Some(Errno::Unreachable),
            _ => None,
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Errno::BadHandle => "bad handle",
            Errno::WouldBlock => "operation would block",
            Errno::NoSuchDevice => "no such device",
            Errno::InvalidArgument => "invalid argument",
            Errno::TooLarge => "request too large",
            Errno::MessageTooLong => "message too long",
            Errno::Unreachable => "internal error",
        };
        f.write_str(msg)
    }
}
