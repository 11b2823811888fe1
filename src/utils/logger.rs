/*
 * Console Logging
 *
 * `log` backend that prints records to a device of the descriptor table,
 * normally the console.
 *
 * Why this is important:
 * - Lets the I/O core and its callers use the standard `log` macros
 * - Output goes through the same put_char path as any other console text
 * - Nothing is printed until the console device has been opened
 *
 * The receive interrupt never logs, so the logger is only ever entered from
 * the foreground.
 */

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::io::{Fd, FileDescriptorTable, Idle, SerialDevice};

/// Logger writing `[LEVEL] message` lines to one device
pub struct ConsoleLogger<D: SerialDevice + 'static, W: Idle + 'static> {
    table: &'static FileDescriptorTable<D, W>,
    fd: Fd,
    level: LevelFilter,
}

impl<D: SerialDevice + 'static, W: Idle + 'static> ConsoleLogger<D, W> {
    pub const fn new(table: &'static FileDescriptorTable<D, W>, fd: Fd, level: LevelFilter) -> Self {
        ConsoleLogger { table, fd, level }
    }
}

impl<D: SerialDevice + 'static, W: Idle + 'static> log::Log for ConsoleLogger<D, W> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || !self.table.is_open(self.fd) {
            return;
        }
        // a failed log line has nowhere to be reported
        let _ = crate::xio_print!(self.table, self.fd, "[{}] {}\r\n", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Install `logger` as the global logger.
///
/// Fails if a logger has already been installed.
pub fn init<D, W>(logger: &'static ConsoleLogger<D, W>) -> Result<(), SetLoggerError>
where
    D: SerialDevice + 'static,
    W: Idle + 'static,
{
    log::set_logger(logger).map(|()| log::set_max_level(logger.level))
}
