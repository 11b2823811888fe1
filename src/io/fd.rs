/*
 * File Descriptor Table
 *
 * The device registry: a fixed table of device descriptors addressed by
 * small integer handles, and the UNIX-like calls command processing uses
 * on them.
 *
 * Standard FDs:
 * - 0: null device (reserved, never dereferenced)
 * - 1: USB port (also the console)
 * - 2: RS-485 port
 *
 * Logical device identifiers (see `dev`) are resolved to a handle at
 * open() time. Raw USARTs that are only reachable through a synthetic
 * device are refused.
 *
 * Every failing call records its error in the table's last-error cell.
 */

use core::sync::atomic::{AtomicU8, Ordering};

use log::{debug, info, warn};

use super::control::{ControlBits, DeviceFlags};
use super::descriptor::{Descriptor, Settings};
use super::device::{Errno, SerialDevice};
use super::engine::{self, ByteSource, CharIo, PgmStr};
use super::idle::Idle;
use super::mode::{Mode, LINE_MODE, PSTR_MODE, STR_MODE};
use crate::config::FD_MAX;

/// Handle of an open device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fd(pub u8);

impl Fd {
    /// Slot in the descriptor array, `None` for the null device.
    const fn slot(self) -> Option<usize> {
        match self.0 {
            0 => None,
            n => Some(n as usize - 1),
        }
    }
}

pub const FD_NULL: Fd = Fd(0);
pub const FD_USB: Fd = Fd(1);
pub const FD_RS485: Fd = Fd(2);

/// Handle echoed reads are mirrored to
pub const FD_CONSOLE: Fd = FD_USB;

/// Logical device identifiers
pub mod dev {
    use super::{Errno, Fd, FD_NULL, FD_RS485, FD_USB};

    pub const NULL: u8 = 0;

    // I/O ports (no I or O)
    pub const PORTA: u8 = 1;
    pub const PORTB: u8 = 2;
    pub const PORTC: u8 = 3;
    pub const PORTD: u8 = 4;
    pub const PORTE: u8 = 5;
    pub const PORTF: u8 = 6;
    pub const PORTG: u8 = 7;
    pub const PORTH: u8 = 8;
    pub const PORTJ: u8 = 9;
    pub const PORTK: u8 = 10;
    pub const PORTL: u8 = 11;
    pub const PORTM: u8 = 12;
    pub const PORTN: u8 = 13;
    pub const PORTP: u8 = 14;
    pub const PORTQ: u8 = 15;
    pub const PORTR: u8 = 16;

    pub const USARTC0: u8 = 17;
    pub const USARTC1: u8 = 18;
    pub const USARTD0: u8 = 19;
    pub const USARTD1: u8 = 20;
    pub const USARTE0: u8 = 21;
    pub const USARTE1: u8 = 22;
    pub const USARTF0: u8 = 23;
    pub const USARTF1: u8 = 24;

    pub const SPIC: u8 = 25;
    pub const SPID: u8 = 26;
    pub const SPIE: u8 = 27;
    pub const SPIF: u8 = 28;

    pub const TWIC: u8 = 29;
    pub const TWIE: u8 = 30;

    pub const IRCOM: u8 = 31;
    pub const AES: u8 = 32;

    pub const ADCA: u8 = 33;
    pub const ADCB: u8 = 34;
    pub const DACA: u8 = 35;
    pub const DACB: u8 = 36;

    // strings in memory
    pub const SRAM: u8 = 37;
    pub const EEPROM: u8 = 38;
    pub const PROGMEM: u8 = 39;
    pub const TABLEMEM: u8 = 40;
    pub const BOOTMEM: u8 = 41;

    // synthetic devices
    pub const CONSOLE: u8 = 42;
    pub const USB: u8 = 43;
    pub const RS485: u8 = 44;
    pub const ENCODERS: u8 = 45;
    pub const BRIDGE: u8 = 46;

    pub const COUNT: usize = 47;

    /// Handle for each identifier, 0 where the device cannot be opened
    const FDES: [u8; COUNT] = {
        let mut table = [FD_NULL.0; COUNT];
        table[CONSOLE as usize] = FD_USB.0;
        table[USB as usize] = FD_USB.0;
        table[RS485 as usize] = FD_RS485.0;
        table
    };

    /// Resolve a device identifier to the handle it opens as.
    ///
    /// USARTC0 and USARTC1 are wired to the USB bridge and the RS-485
    /// transceiver; they can only be opened through those devices.
    pub fn lookup(id: u8) -> Result<Fd, Errno> {
        match FDES.get(id as usize) {
            Some(&fd) if fd != FD_NULL.0 => Ok(Fd(fd)),
            _ => Err(Errno::NoSuchDevice),
        }
    }

    /// Short name for log output
    pub fn name(id: u8) -> &'static str {
        match id {
            CONSOLE => "console",
            USB => "usb",
            RS485 => "rs485",
            USARTC0..=USARTF1 => "usart",
            _ => "unsupported",
        }
    }
}

/// Device registry
///
/// Owns the descriptor of every openable device plus the idle strategy
/// blocking reads park in. Lives for the whole firmware run; devices are
/// opened once and kept open.
pub struct FileDescriptorTable<D: SerialDevice, W: Idle> {
    devices: [Descriptor<D>; FD_MAX - 1],
    idle: W,
    errno: AtomicU8,
}

impl<D: SerialDevice, W: Idle> FileDescriptorTable<D, W> {
    /// Create the table with the USB and RS-485 device variants bound.
    ///
    /// Nothing is opened yet.
    pub const fn new(usb: D, rs485: D, idle: W) -> Self {
        Self {
            devices: [Descriptor::new(FD_USB, usb), Descriptor::new(FD_RS485, rs485)],
            idle,
            errno: AtomicU8::new(0),
        }
    }

    /// Descriptor behind a handle, open or not
    fn slot(&self, fd: Fd) -> Result<&Descriptor<D>, Errno> {
        fd.slot()
            .and_then(|slot| self.devices.get(slot))
            .ok_or(Errno::BadHandle)
    }

    /// Descriptor behind an open handle
    fn get(&self, fd: Fd) -> Result<&Descriptor<D>, Errno> {
        let desc = self.slot(fd)?;
        match desc.is_open() {
            true => Ok(desc),
            false => Err(Errno::BadHandle),
        }
    }

    /// Store the error of a failing call.
    fn record<T>(&self, result: Result<T, Errno>) -> Result<T, Errno> {
        if let Err(errno) = result {
            self.errno.store(errno.code(), Ordering::Relaxed);
        }
        result
    }

    /// Error of the most recent failing call
    pub fn last_error(&self) -> Option<Errno> {
        Errno::from_code(self.errno.load(Ordering::Relaxed))
    }

    pub fn clear_error(&self) {
        self.errno.store(0, Ordering::Relaxed);
    }

    /// Check if a handle refers to an open device
    pub fn is_open(&self, fd: Fd) -> bool {
        self.get(fd).is_ok()
    }

    /// Open a device by logical identifier.
    ///
    /// Opening an already open device re-initializes it. Returns the
    /// device's handle.
    pub fn open(&self, id: u8, control: ControlBits) -> Result<Fd, Errno> {
        let result = dev::lookup(id).and_then(|fd| {
            self.slot(fd)?.open(control)?;
            Ok(fd)
        });
        match result {
            Ok(fd) => info!("xio: opened {} as fd {}", dev::name(id), fd.0),
            Err(errno) => warn!("xio: open of {} (device {}) failed: {}", dev::name(id), id, errno),
        }
        self.record(result)
    }

    /// Close a handle.
    ///
    /// Devices own no dynamic resources, so this always succeeds and the
    /// handle stays usable.
    pub fn close(&self, fd: Fd) -> Result<(), Errno> {
        if let Ok(desc) = self.slot(fd) {
            desc.close();
        }
        Ok(())
    }

    /// Change the settings of an open device. See `ControlBits`.
    pub fn control(&self, fd: Fd, control: ControlBits, arg: i16) -> Result<(), Errno> {
        let result = self.get(fd).and_then(|desc| desc.control(control, arg));
        match result {
            Ok(()) => debug!("xio: fd {} control {:#x} arg {}", fd.0, control.bits(), arg),
            Err(errno) => warn!("xio: fd {} control {:#x} failed: {}", fd.0, control.bits(), errno),
        }
        self.record(result)
    }

    /// Read from a device.
    ///
    /// `size` selects the mode: 0 nothing, N > 0 exactly N bytes,
    /// `LINE_MODE` up to a delimiter, `STR_MODE` up to a NUL. Line and
    /// string reads NUL-terminate `buf`.
    pub fn read(&self, fd: Fd, buf: &mut [u8], size: i16) -> Result<usize, Errno> {
        if size == 0 {
            return Ok(0);
        }
        let result = self.readable(fd).and_then(|(desc, settings)| {
            let mode = Mode::for_read(size)?;
            engine::read(&self.channel(desc, settings), buf, mode, settings.rx_size_max)
        });
        self.record(result)
    }

    /// Write to a device.
    ///
    /// `size` selects the mode: 0 nothing, N > 0 exactly N bytes,
    /// `LINE_MODE` through a delimiter, `STR_MODE`/`PSTR_MODE` up to a NUL.
    /// The NUL is never sent.
    pub fn write<S: ByteSource + ?Sized>(&self, fd: Fd, src: &S, size: i16) -> Result<usize, Errno> {
        if size == 0 {
            return Ok(0);
        }
        let result = self.writable(fd).and_then(|(desc, settings)| {
            let mode = Mode::for_write(size)?;
            engine::write(&self.channel(desc, settings), src, mode, settings.tx_size_max)
        });
        self.record(result)
    }

    /// Read one character.
    pub fn get_char(&self, fd: Fd) -> Result<u8, Errno> {
        let result = self
            .readable(fd)
            .and_then(|(desc, settings)| self.channel(desc, settings).getc());
        self.record(result)
    }

    /// Write one character. Returns the character written.
    pub fn put_char(&self, fd: Fd, c: u8) -> Result<u8, Errno> {
        let result = self
            .writable(fd)
            .and_then(|(desc, settings)| self.channel(desc, settings).putc(c));
        self.record(result)
    }

    pub fn readln(&self, fd: Fd, buf: &mut [u8]) -> Result<usize, Errno> {
        self.read(fd, buf, LINE_MODE)
    }

    pub fn readstr(&self, fd: Fd, buf: &mut [u8]) -> Result<usize, Errno> {
        self.read(fd, buf, STR_MODE)
    }

    pub fn writeln<S: ByteSource + ?Sized>(&self, fd: Fd, src: &S) -> Result<usize, Errno> {
        self.write(fd, src, LINE_MODE)
    }

    pub fn writestr<S: ByteSource + ?Sized>(&self, fd: Fd, src: &S) -> Result<usize, Errno> {
        self.write(fd, src, STR_MODE)
    }

    /// Write a program-memory string up to its NUL.
    pub fn writepstr(&self, fd: Fd, src: PgmStr) -> Result<usize, Errno> {
        self.write(fd, &src, PSTR_MODE)
    }

    /// Receive-complete interrupt entry point for `fd`.
    ///
    /// Lock-free; safe to call from interrupt context. Returns whether the
    /// byte was stored.
    pub fn rx_interrupt(&self, fd: Fd) -> bool {
        match self.slot(fd) {
            Ok(desc) => desc.on_rx_complete(),
            Err(_) => false,
        }
    }

    /// Number of received bytes dropped on a full ring since open
    pub fn overruns(&self, fd: Fd) -> Result<usize, Errno> {
        self.record(self.get(fd).map(Descriptor::overruns))
    }

    fn readable(&self, fd: Fd) -> Result<(&Descriptor<D>, Settings), Errno> {
        self.enabled(fd, DeviceFlags::READ)
    }

    fn writable(&self, fd: Fd) -> Result<(&Descriptor<D>, Settings), Errno> {
        self.enabled(fd, DeviceFlags::WRITE)
    }

    fn enabled(&self, fd: Fd, direction: DeviceFlags) -> Result<(&Descriptor<D>, Settings), Errno> {
        let desc = self.get(fd)?;
        let settings = desc.settings();
        if !settings.flags.contains(direction) {
            return Err(Errno::BadHandle);
        }
        Ok((desc, settings))
    }

    fn channel<'a>(&'a self, desc: &'a Descriptor<D>, settings: Settings) -> Channel<'a, D, W> {
        Channel {
            table: self,
            desc,
            flags: settings.flags,
        }
    }

    /// Mirror a received byte to the console, if it is open.
    fn echo(&self, c: u8) {
        if let Ok(console) = self.get(FD_CONSOLE) {
            console.device().send(c);
        }
    }
}

/// Character-level view of one open device for the duration of a call
struct Channel<'a, D: SerialDevice, W: Idle> {
    table: &'a FileDescriptorTable<D, W>,
    desc: &'a Descriptor<D>,
    flags: DeviceFlags,
}

impl<D: SerialDevice, W: Idle> CharIo for Channel<'_, D, W> {
    fn getc(&self) -> Result<u8, Errno> {
        let blocking = self.flags.contains(DeviceFlags::READ_BLOCK);
        let c = self.desc.rx().pop_or_wait(blocking, &self.table.idle)?;
        if self.flags.contains(DeviceFlags::ECHO) {
            self.table.echo(c);
        }
        Ok(c)
    }

    fn putc(&self, c: u8) -> Result<u8, Errno> {
        self.desc.transmit(c, self.flags);
        Ok(c)
    }
}
