/*
 * Static Configuration
 *
 * Compile-time sizing of the I/O core. Nothing here is allocated at
 * runtime: the receive rings, the descriptor table and the default
 * transfer limits are all fixed when the firmware is built.
 */

use crate::io::{Baud, DeviceFlags};

/// Receive ring size per device. Two slots are never usable (index 0 and
/// the full/empty disambiguation slot), so a ring holds `RX_BUFSIZE - 2`
/// bytes.
pub const RX_BUFSIZE: usize = 32;

/// Transmit ring size per device. 1 means transmission is unbuffered and
/// register-polled.
pub const TX_BUFSIZE: usize = 1;

/// Size of the descriptor table: null device, USB, RS-485.
pub const FD_MAX: usize = 3;

/// Size of the caller-side line buffer the default read limit is tuned for.
pub const READ_BUFFER_SIZE: usize = 80;

/// Default `rx_size_max`, leaving room for the terminating NUL.
pub const RX_SIZE_MAX_DEFAULT: u16 = (READ_BUFFER_SIZE - 1) as u16;

/// Baud rate applied when open() does not specify one.
pub const BAUD_DEFAULT: Baud = Baud::B115200;

/// Flags a freshly opened device starts with before the open-time control
/// bits are applied.
pub const FLAGS_DEFAULT: DeviceFlags = DeviceFlags::READ
    .union(DeviceFlags::WRITE)
    .union(DeviceFlags::READ_BLOCK)
    .union(DeviceFlags::ECHO);
