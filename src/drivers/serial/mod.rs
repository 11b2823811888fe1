/*
 * Serial Communication Drivers
 *
 * The device variants the I/O core can open. Both are built on an on-chip
 * USART and differ in the pins wrapped around it:
 *
 * - USB: USARTC0 wired to a USB-serial bridge, with RTS/CTS lines
 * - RS-485: USARTC1 wired to a half-duplex transceiver; the driver is only
 *   enabled while a byte is on the wire
 *
 * `Port` is the closed set of variants the descriptor table is built with.
 */

use crate::io::{Baud, Io, Mmio, SerialDevice};

pub mod usart;

pub use usart::{Pins, StatusFlags, Usart, PORTC_BASE, USARTC0_BASE, USARTC1_BASE};

// USARTC0 pins on PORTC (even USART)
const USB_CTS: u8 = 1 << 0;
const USB_RTS: u8 = 1 << 1;
const USB_RX: u8 = 1 << 2;
const USB_TX: u8 = 1 << 3;

// USARTC1 pins on PORTC (odd USART)
const RS485_RE: u8 = 1 << 4; // receive enable, active low
const RS485_DE: u8 = 1 << 5; // driver enable, active high
const RS485_RX: u8 = 1 << 6;
const RS485_TX: u8 = 1 << 7;

/// USB bridge port
pub struct Usb<T: Io<Value = u8>> {
    usart: Usart<T>,
    pins: Pins<T>,
}

impl<T: Io<Value = u8>> Usb<T> {
    pub const fn new(usart: Usart<T>, pins: Pins<T>) -> Self {
        Usb { usart, pins }
    }
}

impl<T: Io<Value = u8> + Sync> SerialDevice for Usb<T> {
    fn init(&self, baud: Baud) {
        self.usart.init(baud);
        self.pins.input(USB_RX);
        self.pins.output(USB_TX);
        self.pins.set(USB_TX);

        self.pins.input(USB_CTS);
        self.pins.output(USB_RTS);
        self.pins.set(USB_RTS);
    }

    fn set_baud(&self, baud: Baud) {
        self.usart.set_baud(baud);
    }

    fn send(&self, byte: u8) {
        self.usart.send(byte);
    }

    fn recv(&self) -> u8 {
        self.usart.recv()
    }
}

/// RS-485 port
pub struct Rs485<T: Io<Value = u8>> {
    usart: Usart<T>,
    pins: Pins<T>,
}

impl<T: Io<Value = u8>> Rs485<T> {
    pub const fn new(usart: Usart<T>, pins: Pins<T>) -> Self {
        Rs485 { usart, pins }
    }

    /// Check if the transceiver is currently driving the bus
    pub fn driver_enabled(&self) -> bool {
        self.pins.is_high(RS485_DE)
    }
}

impl<T: Io<Value = u8> + Sync> SerialDevice for Rs485<T> {
    fn init(&self, baud: Baud) {
        self.usart.init(baud);
        self.pins.input(RS485_RX);
        self.pins.output(RS485_TX);
        self.pins.set(RS485_TX);

        // listen by default: driver off, receiver on
        self.pins.output(RS485_DE | RS485_RE);
        self.pins.clear(RS485_DE | RS485_RE);
    }

    fn set_baud(&self, baud: Baud) {
        self.usart.set_baud(baud);
    }

    fn send(&self, byte: u8) {
        self.pins.set(RS485_DE);
        self.usart.send(byte);
        self.usart.flush();
        self.pins.clear(RS485_DE);
    }

    fn recv(&self) -> u8 {
        self.usart.recv()
    }
}

/// Device variants the descriptor table can hold
pub enum Port<T: Io<Value = u8>> {
    Usb(Usb<T>),
    Rs485(Rs485<T>),
}

impl Port<Mmio<u8>> {
    /// USB port on USARTC0.
    ///
    /// # Safety
    ///
    /// Must only be called on the target part, where the USART and PORT
    /// register blocks live at their documented addresses.
    pub const unsafe fn usb() -> Self {
        unsafe { Port::Usb(Usb::new(Usart::new(USARTC0_BASE), Pins::new(PORTC_BASE))) }
    }

    /// RS-485 port on USARTC1.
    ///
    /// # Safety
    ///
    /// Same as [`Port::usb`].
    pub const unsafe fn rs485() -> Self {
        unsafe { Port::Rs485(Rs485::new(Usart::new(USARTC1_BASE), Pins::new(PORTC_BASE))) }
    }
}

impl<T: Io<Value = u8> + Sync> SerialDevice for Port<T> {
    fn init(&self, baud: Baud) {
        match self {
            Port::Usb(usb) => usb.init(baud),
            Port::Rs485(rs485) => rs485.init(baud),
        }
    }

    fn set_baud(&self, baud: Baud) {
        match self {
            Port::Usb(usb) => usb.set_baud(baud),
            Port::Rs485(rs485) => rs485.set_baud(baud),
        }
    }

    fn send(&self, byte: u8) {
        match self {
            Port::Usb(usb) => usb.send(byte),
            Port::Rs485(rs485) => rs485.send(byte),
        }
    }

    fn recv(&self) -> u8 {
        match self {
            Port::Usb(usb) => usb.recv(),
            Port::Rs485(rs485) => rs485.recv(),
        }
    }
}
