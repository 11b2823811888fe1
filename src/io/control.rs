/*
 * Device Control Parameters
 *
 * The control word passed to open() and control(), the per-device flag
 * set it is folded into, the baud-rate selector and the transfer size
 * limits.
 *
 * Control word layout:
 *  - bits 0..3   baud rate selector (0 = unspecified / device default)
 *  - bits 8..19  one bit per request (read-only, echo on, echo off, ...)
 *
 * Requests come in on/off pairs. Bits that name no request are ignored.
 */

use bitflags::bitflags;

use super::device::Errno;

bitflags! {
    /// Requests accepted by open() and control()
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlBits: u32 {
        /// Baud rate enumeration mask
        const BAUD_MASK = 0x0000_000F;

        const RDONLY = 1 << 8;
        const WRONLY = 1 << 9;

        const ECHO = 1 << 10;
        const NOECHO = 1 << 11;

        const RDBLOCK = 1 << 12;
        const WRBLOCK = 1 << 13;
        const RDNONBLOCK = 1 << 14;
        const WRNONBLOCK = 1 << 15;

        /// Argument carries the new `rx_size_max`
        const RD_SIZE_MAX = 1 << 16;
        /// Argument carries the new `tx_size_max`
        const WR_SIZE_MAX = 1 << 17;

        const CRLF = 1 << 18;
        const NOCRLF = 1 << 19;

        const RDWRBLOCK = Self::RDBLOCK.bits() | Self::WRBLOCK.bits();
        const RDWRNONBLOCK = Self::RDNONBLOCK.bits() | Self::WRNONBLOCK.bits();

        // keep unknown bits: they are ignored, not rejected
        const _ = !0;
    }
}

impl ControlBits {
    /// Read and write enabled (the absence of RDONLY and WRONLY)
    pub const RDWR: ControlBits = ControlBits::empty();

    /// Build a control word with a baud selector in the low nibble.
    pub const fn with_baud(self, baud: Baud) -> ControlBits {
        ControlBits::from_bits_retain(
            (self.bits() & !ControlBits::BAUD_MASK.bits()) | baud as u32,
        )
    }

    /// Raw value of the baud selector field.
    pub const fn baud_selector(self) -> u8 {
        (self.bits() & ControlBits::BAUD_MASK.bits()) as u8
    }
}

impl From<Baud> for ControlBits {
    fn from(baud: Baud) -> Self {
        ControlBits::empty().with_baud(baud)
    }
}

bitflags! {
    /// Per-device state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFlags: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const READ_BLOCK = 1 << 2;
        const WRITE_BLOCK = 1 << 3;
        const ECHO = 1 << 4;
        const CRLF = 1 << 5;
    }
}

impl DeviceFlags {
    /// Fold the on/off request pairs of `control` into the flags.
    ///
    /// An "off" request wins over the matching "on" request in the same
    /// word.
    pub fn apply(&mut self, control: ControlBits) {
        let pairs = [
            (ControlBits::ECHO, ControlBits::NOECHO, DeviceFlags::ECHO),
            (ControlBits::RDBLOCK, ControlBits::RDNONBLOCK, DeviceFlags::READ_BLOCK),
            (ControlBits::WRBLOCK, ControlBits::WRNONBLOCK, DeviceFlags::WRITE_BLOCK),
            (ControlBits::CRLF, ControlBits::NOCRLF, DeviceFlags::CRLF),
        ];
        for (on, off, flag) in pairs {
            if control.contains(on) {
                self.insert(flag);
            }
            if control.contains(off) {
                self.remove(flag);
            }
        }
    }
}

/// Baud rate selector
///
/// Discriminants are the values of the control word's baud field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Baud {
    Unspecified = 0,
    B9600 = 1,
    B19200 = 2,
    B38400 = 3,
    B57600 = 4,
    B115200 = 5,
    B230400 = 6,
    B460800 = 7,
    B921600 = 8,
    B500000 = 9,
    B1000000 = 10,
}

// USART baud register values for a 32 MHz peripheral clock, by selector
const BSEL: [u8; 11] = [0, 207, 103, 51, 34, 33, 31, 27, 19, 1, 1];
const BSCALE: [u8; 11] = [
    0,
    0,
    0,
    0,
    0,
    0xF0, // -1 << 4
    0xE0, // -2 << 4
    0xD0, // -3 << 4
    0xC0, // -4 << 4
    1 << 4,
    1,
];

impl Baud {
    /// Decode the baud field of a control word.
    ///
    /// Returns `InvalidArgument` for selector values with no rate behind
    /// them.
    pub const fn from_selector(selector: u8) -> Result<Baud, Errno> {
        Ok(match selector {
            0 => Baud::Unspecified,
            1 => Baud::B9600,
            2 => Baud::B19200,
            3 => Baud::B38400,
            4 => Baud::B57600,
            5 => Baud::B115200,
            6 => Baud::B230400,
            7 => Baud::B460800,
            8 => Baud::B921600,
            9 => Baud::B500000,
            10 => Baud::B1000000,
            _ => return Err(Errno::InvalidArgument),
        })
    }

    /// Nominal bits per second, `None` for `Unspecified`.
    pub const fn bps(self) -> Option<u32> {
        match self {
            Baud::Unspecified => None,
            Baud::B9600 => Some(9_600),
            Baud::B19200 => Some(19_200),
            Baud::B38400 => Some(38_400),
            Baud::B57600 => Some(57_600),
            Baud::B115200 => Some(115_200),
            Baud::B230400 => Some(230_400),
            Baud::B460800 => Some(460_800),
            Baud::B921600 => Some(921_600),
            Baud::B500000 => Some(500_000),
            Baud::B1000000 => Some(1_000_000),
        }
    }

    /// Value for the BAUDCTRLA register
    pub const fn bsel(self) -> u8 {
        BSEL[self as usize]
    }

    /// Value for the BAUDCTRLB register
    pub const fn bscale(self) -> u8 {
        BSCALE[self as usize]
    }

    /// Replace `Unspecified` with `default`.
    pub const fn or(self, default: Baud) -> Baud {
        match self {
            Baud::Unspecified => default,
            baud => baud,
        }
    }
}

/// `control()` argument meaning "no size limit"
pub const NO_LIMIT: i16 = -1;

/// Ceiling on line/string transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMax {
    Limit(u16),
    Unlimited,
}

impl SizeMax {
    /// Decode a `control()` size argument: `1..=32767` or [`NO_LIMIT`].
    pub const fn from_arg(arg: i16) -> Result<SizeMax, Errno> {
        match arg {
            NO_LIMIT => Ok(SizeMax::Unlimited),
            1.. => Ok(SizeMax::Limit(arg as u16)),
            _ => Err(Errno::InvalidArgument),
        }
    }

    /// Clamp to `available` bytes of caller storage.
    pub fn cap(self, available: usize) -> usize {
        match self {
            SizeMax::Limit(max) => (max as usize).min(available),
            SizeMax::Unlimited => available,
        }
    }

    /// Check whether an exact-count request of `size` bytes is allowed.
    pub fn admits(self, size: usize) -> bool {
        match self {
            SizeMax::Limit(max) => size <= max as usize,
            SizeMax::Unlimited => true,
        }
    }
}
