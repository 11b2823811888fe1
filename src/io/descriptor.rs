/*
 * Device Descriptor
 *
 * One record per device: its settings, its receive and transmit rings, its
 * overrun counter and the device variant that moves bytes on and off the
 * wire. The registry owns one descriptor per handle for the life of the
 * firmware.
 *
 * Two execution contexts touch a descriptor:
 * - the receive interrupt calls `on_rx_complete`, which only produces into
 *   the receive ring and bumps the overrun counter; it never locks
 * - the foreground takes the settings lock for open/control and snapshots
 *   the settings for a transfer, so no lock is held while a blocking read
 *   sleeps
 */

use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use super::control::{Baud, ControlBits, DeviceFlags, SizeMax};
use super::device::{Errno, SerialDevice};
use super::fd::Fd;
use super::ring::CircularBuffer;
use crate::config::{BAUD_DEFAULT, FLAGS_DEFAULT, RX_BUFSIZE, RX_SIZE_MAX_DEFAULT, TX_BUFSIZE};

/// Foreground-owned device settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub open: bool,
    pub flags: DeviceFlags,
    pub baud: Baud,
    pub rx_size_max: SizeMax,
    pub tx_size_max: SizeMax,
}

impl Settings {
    const CLOSED: Settings = Settings {
        open: false,
        flags: DeviceFlags::empty(),
        baud: Baud::Unspecified,
        rx_size_max: SizeMax::Limit(RX_SIZE_MAX_DEFAULT),
        tx_size_max: SizeMax::Unlimited,
    };
}

/// Per-device record
pub struct Descriptor<D: SerialDevice> {
    fd: Fd,
    settings: Mutex<Settings>,
    rx: CircularBuffer<RX_BUFSIZE>,
    // degenerate while transmit is register-polled
    tx: CircularBuffer<TX_BUFSIZE>,
    overruns: AtomicUsize,
    device: D,
}

impl<D: SerialDevice> Descriptor<D> {
    pub const fn new(fd: Fd, device: D) -> Self {
        Self {
            fd,
            settings: Mutex::new(Settings::CLOSED),
            rx: CircularBuffer::new(),
            tx: CircularBuffer::new(),
            overruns: AtomicUsize::new(0),
            device,
        }
    }

    pub fn fd(&self) -> Fd {
        self.fd
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn rx(&self) -> &CircularBuffer<RX_BUFSIZE> {
        &self.rx
    }

    /// Copy of the current settings
    pub fn settings(&self) -> Settings {
        *self.settings.lock()
    }

    pub fn is_open(&self) -> bool {
        self.settings.lock().open
    }

    /// Bytes dropped by the receive interrupt because the ring was full
    pub fn overruns(&self) -> usize {
        self.overruns.load(Ordering::Relaxed)
    }

    /// (Re)initialize the device from defaults overridden by `control`.
    ///
    /// Asking for both RDONLY and WRONLY is rejected before anything is
    /// touched.
    pub fn open(&self, control: ControlBits) -> Result<(), Errno> {
        if control.contains(ControlBits::RDONLY | ControlBits::WRONLY) {
            return Err(Errno::InvalidArgument);
        }
        let baud = Baud::from_selector(control.baud_selector())?.or(BAUD_DEFAULT);

        let mut flags = FLAGS_DEFAULT;
        if control.contains(ControlBits::RDONLY) {
            flags.remove(DeviceFlags::WRITE);
        } else if control.contains(ControlBits::WRONLY) {
            flags.remove(DeviceFlags::READ);
        }
        flags.apply(control);

        let mut settings = self.settings.lock();
        self.rx.reset();
        self.tx.reset();
        self.overruns.store(0, Ordering::Relaxed);
        self.device.init(baud);

        *settings = Settings {
            open: true,
            flags,
            baud,
            rx_size_max: SizeMax::Limit(RX_SIZE_MAX_DEFAULT),
            tx_size_max: SizeMax::Unlimited,
        };
        Ok(())
    }

    /// Apply a control() request.
    ///
    /// Flag pairs are folded in first. RD_SIZE_MAX and WR_SIZE_MAX each end
    /// the call after storing `arg`, so only RD_SIZE_MAX takes effect when
    /// both are set.
    pub fn control(&self, control: ControlBits, arg: i16) -> Result<(), Errno> {
        let baud = Baud::from_selector(control.baud_selector())?;

        let mut settings = self.settings.lock();
        if !settings.open {
            return Err(Errno::BadHandle);
        }
        // decode the argument before any flag changes land
        let size_max = if control.intersects(ControlBits::RD_SIZE_MAX | ControlBits::WR_SIZE_MAX) {
            Some(SizeMax::from_arg(arg)?)
        } else {
            None
        };

        if baud != Baud::Unspecified {
            settings.baud = baud;
            self.device.set_baud(baud);
        }
        settings.flags.apply(control);

        if let Some(size_max) = size_max {
            if control.contains(ControlBits::RD_SIZE_MAX) {
                settings.rx_size_max = size_max;
                return Ok(());
            }
            settings.tx_size_max = size_max;
        }
        Ok(())
    }

    /// Release the device. The descriptor stays open; see `SerialDevice::close`.
    pub fn close(&self) {
        self.device.close();
    }

    /// Receive-complete interrupt body.
    ///
    /// Fetches the latched byte and stores it if the ring has room. On a
    /// full ring the byte is dropped, counted, and the device is told so it
    /// can signal flow control. Returns whether the byte was stored.
    pub fn on_rx_complete(&self) -> bool {
        let byte = self.device.recv();
        if self.rx.push_if_space(byte) {
            return true;
        }
        self.overruns.fetch_add(1, Ordering::Relaxed);
        self.device.rx_full();
        false
    }

    /// Transmit one byte, expanding `\n` to `\r\n` when CRLF is set.
    pub fn transmit(&self, byte: u8, flags: DeviceFlags) {
        if byte == b'\n' && flags.contains(DeviceFlags::CRLF) {
            self.device.send(b'\r');
        }
        self.device.send(byte);
    }
}
