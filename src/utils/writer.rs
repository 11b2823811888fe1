use core::fmt;

use crate::io::{Errno, Fd, FileDescriptorTable, Idle, SerialDevice};

/// A simple writer that writes to one device of a descriptor table.
pub struct Writer<'a, D: SerialDevice, W: Idle> {
    table: &'a FileDescriptorTable<D, W>,
    fd: Fd,
}

impl<'a, D: SerialDevice, W: Idle> Writer<'a, D, W> {
    pub fn new(table: &'a FileDescriptorTable<D, W>, fd: Fd) -> Self {
        Writer { table, fd }
    }

    /// Writes a byte to the device.
    pub fn write(&mut self, byte: u8) -> Result<u8, Errno> {
        self.table.put_char(self.fd, byte)
    }
}

impl<D: SerialDevice, W: Idle> fmt::Write for Writer<'_, D, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.write(byte).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}
