/*
 * XIO - Device I/O Core
 *
 * This crate is the device-I/O layer of the motion-controller firmware. It
 * lets command processing read and write the on-chip and synthetic serial
 * devices (USB bridge, RS-485 bus) through one small UNIX-like interface:
 * open(), close(), control(), read(), write(), get_char(), put_char().
 *
 * Why this is important:
 * - Everything is pre-allocated: no heap, fixed descriptor table, fixed rings
 * - Receive interrupts and foreground reads share a lock-free SPSC ring
 * - read()/write() interpret one signed size argument as an exact byte
 *   count, a delimiter-terminated line or a NUL-terminated string
 * - Device variants only supply character-level primitives; the mode
 *   logic lives in exactly one place
 *
 * The crate is `no_std` on the target and links `std` only for unit tests.
 */

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod drivers;
pub mod io;
pub mod utils;

#[cfg(test)]
mod testing;

pub use io::{
    Baud, ControlBits, DeviceFlags, Errno, Fd, FileDescriptorTable, Idle, PgmStr, SizeMax,
};
