use bitflags::bitflags;

use crate::io::{Baud, Io, Mmio, ReadOnly};

bitflags! {
    /// USART status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const PERR = 1 << 2;        // parity error
        const BUFOVF = 1 << 3;      // receive buffer overflow
        const FERR = 1 << 4;        // frame error
        const DREIF = 1 << 5;       // data register empty
        const TXCIF = 1 << 6;       // transmit complete
        const RXCIF = 1 << 7;       // receive complete
    }
}

bitflags! {
    /// Control register B: transmitter / receiver enable
    struct CtrlB: u8 {
        const TXEN = 1 << 3;
        const RXEN = 1 << 4;
    }
}

/// Receive-complete interrupt at medium level
const RXCINTLVL_MED: u8 = 0x20;

// register offsets from the USART base
const DATA: usize = 0x00;
const STATUS: usize = 0x01;
const CTRLA: usize = 0x03;
const CTRLB: usize = 0x04;
const BAUDCTRLA: usize = 0x06;
const BAUDCTRLB: usize = 0x07;

pub const USARTC0_BASE: usize = 0x08A0;
pub const USARTC1_BASE: usize = 0x08B0;
pub const PORTC_BASE: usize = 0x0640;

/// USART register block
pub struct Usart<T: Io<Value = u8>> {
    data: T,              // read to receive, write to send
    status: T,            // flags; TXCIF is cleared by writing it
    ctrla: T,             // interrupt levels
    ctrlb: T,             // transmitter / receiver enable
    baudctrla: T,         // BSEL low byte
    baudctrlb: T,         // BSCALE | BSEL high nibble
}

impl Usart<Mmio<u8>> {
    /// Map the USART whose registers start at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the data-space address of a USART register block.
    pub const unsafe fn new(base: usize) -> Usart<Mmio<u8>> {
        unsafe {
            Usart {
                data: Mmio::new(base + DATA),
                status: Mmio::new(base + STATUS),
                ctrla: Mmio::new(base + CTRLA),
                ctrlb: Mmio::new(base + CTRLB),
                baudctrla: Mmio::new(base + BAUDCTRLA),
                baudctrlb: Mmio::new(base + BAUDCTRLB),
            }
        }
    }
}

impl<T: Io<Value = u8>> Usart<T> {
    /// Build the register block from a per-address register constructor.
    pub fn from_fn(base: usize, mut reg: impl FnMut(usize) -> T) -> Self {
        Usart {
            data: reg(base + DATA),
            status: reg(base + STATUS),
            ctrla: reg(base + CTRLA),
            ctrlb: reg(base + CTRLB),
            baudctrla: reg(base + BAUDCTRLA),
            baudctrlb: reg(base + BAUDCTRLB),
        }
    }

    /// Program the baud rate, enable both directions and the receive
    /// interrupt.
    pub fn init(&self, baud: Baud) {
        self.set_baud(baud);
        self.ctrlb.write((CtrlB::TXEN | CtrlB::RXEN).bits());
        self.ctrla.write(RXCINTLVL_MED);
    }

    pub fn set_baud(&self, baud: Baud) {
        self.baudctrla.write(baud.bsel());
        self.baudctrlb.write(baud.bscale());
    }

    pub fn status(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.status.read())
    }

    /// Sends a byte once the data register is free.
    pub fn send(&self, byte: u8) {
        while !self.status().contains(StatusFlags::DREIF) {
            core::hint::spin_loop();
        }
        self.data.write(byte);
    }

    /// Wait until the last byte has left the shift register, then clear
    /// the transmit-complete flag.
    pub fn flush(&self) {
        while !self.status().contains(StatusFlags::TXCIF) {
            core::hint::spin_loop();
        }
        self.status.write(StatusFlags::TXCIF.bits());
    }

    pub fn recv(&self) -> u8 {
        self.data.read()
    }
}

// PORT register offsets
const DIRSET: usize = 0x01;
const DIRCLR: usize = 0x02;
const OUT: usize = 0x04;
const OUTSET: usize = 0x05;
const OUTCLR: usize = 0x06;

/// Set/clear view of an I/O port
pub struct Pins<T: Io<Value = u8>> {
    dirset: T,
    dirclr: T,
    out: ReadOnly<T>,
    outset: T,
    outclr: T,
}

impl Pins<Mmio<u8>> {
    /// Map the port whose registers start at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the data-space address of a PORT register block.
    pub const unsafe fn new(base: usize) -> Pins<Mmio<u8>> {
        unsafe {
            Pins {
                dirset: Mmio::new(base + DIRSET),
                dirclr: Mmio::new(base + DIRCLR),
                out: ReadOnly::new(Mmio::new(base + OUT)),
                outset: Mmio::new(base + OUTSET),
                outclr: Mmio::new(base + OUTCLR),
            }
        }
    }
}

impl<T: Io<Value = u8>> Pins<T> {
    pub fn from_fn(base: usize, mut reg: impl FnMut(usize) -> T) -> Self {
        Pins {
            dirset: reg(base + DIRSET),
            dirclr: reg(base + DIRCLR),
            out: ReadOnly::new(reg(base + OUT)),
            outset: reg(base + OUTSET),
            outclr: reg(base + OUTCLR),
        }
    }

    pub fn output(&self, mask: u8) {
        self.dirset.write(mask);
    }

    pub fn input(&self, mask: u8) {
        self.dirclr.write(mask);
    }

    pub fn set(&self, mask: u8) {
        self.outset.write(mask);
    }

    pub fn clear(&self, mask: u8) {
        self.outclr.write(mask);
    }

    /// Check if every pin in `mask` is driven high
    pub fn is_high(&self, mask: u8) -> bool {
        self.out.readf(mask)
    }
}
