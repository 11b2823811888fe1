//! Test doubles: a register bus, a character device, an idle strategy that
//! plays the receive interrupt, and a board wiring them into a table.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use crate::drivers::serial::{Pins, Port, Rs485, Usart, Usb, PORTC_BASE, USARTC0_BASE, USARTC1_BASE};
use crate::io::{Baud, CircularBuffer, Fd, FileDescriptorTable, Idle, Io, SerialDevice, FD_RS485, FD_USB};

const BUS_SIZE: usize = 0x1000;
const PORT_REGION: core::ops::Range<usize> = 0x0600..0x0800;
const STATUS_READY: u8 = 0x60; // DREIF | TXCIF

struct BusState {
    mem: Vec<u8>,
    writes: Vec<(usize, u8)>,
}

/// Data-space model with just enough peripheral behaviour for the drivers:
/// USART status registers always report ready, PORT set/clear registers
/// update DIR and OUT.
#[derive(Clone)]
pub struct MockBus {
    state: Arc<Mutex<BusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        let mut mem = std::vec![0u8; BUS_SIZE];
        mem[USARTC0_BASE + 1] = STATUS_READY;
        mem[USARTC1_BASE + 1] = STATUS_READY;
        MockBus {
            state: Arc::new(Mutex::new(BusState { mem, writes: Vec::new() })),
        }
    }

    pub fn reg(&self, addr: usize) -> MockReg {
        MockReg { bus: self.clone(), addr }
    }

    pub fn peek(&self, addr: usize) -> u8 {
        self.state.lock().unwrap().mem[addr]
    }

    /// Store without logging, as the hardware would.
    pub fn poke(&self, addr: usize, value: u8) {
        self.state.lock().unwrap().mem[addr] = value;
    }

    /// Every value written to `addr`, oldest first
    pub fn written(&self, addr: usize) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        state
            .writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    fn store(&self, addr: usize, value: u8) {
        let mut state = self.state.lock().unwrap();
        state.writes.push((addr, value));

        if addr == USARTC0_BASE + 1 || addr == USARTC1_BASE + 1 {
            return;
        }
        if PORT_REGION.contains(&addr) {
            let base = addr & !0x1F;
            match addr & 0x1F {
                0x01 => state.mem[base] |= value,
                0x02 => state.mem[base] &= !value,
                0x05 => state.mem[base + 4] |= value,
                0x06 => state.mem[base + 4] &= !value,
                _ => state.mem[addr] = value,
            }
            return;
        }
        state.mem[addr] = value;
    }
}

/// One register on a `MockBus`
pub struct MockReg {
    bus: MockBus,
    addr: usize,
}

impl Io for MockReg {
    type Value = u8;

    fn read(&self) -> u8 {
        self.bus.peek(self.addr)
    }

    fn write(&self, value: u8) {
        self.bus.store(self.addr, value);
    }
}

/// Character device recording everything done to it
pub struct MockDevice {
    inits: Mutex<Vec<Baud>>,
    bauds: Mutex<Vec<Baud>>,
    sent: Mutex<Vec<u8>>,
    latched: AtomicU8,
    rx_full: AtomicUsize,
}

impl MockDevice {
    pub fn new() -> Self {
        MockDevice {
            inits: Mutex::new(Vec::new()),
            bauds: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            latched: AtomicU8::new(0),
            rx_full: AtomicUsize::new(0),
        }
    }

    pub fn inits(&self) -> Vec<Baud> {
        self.inits.lock().unwrap().clone()
    }

    pub fn baud_changes(&self) -> Vec<Baud> {
        self.bauds.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().unwrap().clone()
    }

    /// Put a byte in the receiver for the next `recv`.
    pub fn latch(&self, byte: u8) {
        self.latched.store(byte, Ordering::Relaxed);
    }

    pub fn rx_full_signals(&self) -> usize {
        self.rx_full.load(Ordering::Relaxed)
    }
}

impl SerialDevice for MockDevice {
    fn init(&self, baud: Baud) {
        self.inits.lock().unwrap().push(baud);
    }

    fn set_baud(&self, baud: Baud) {
        self.bauds.lock().unwrap().push(baud);
    }

    fn send(&self, byte: u8) {
        self.sent.lock().unwrap().push(byte);
    }

    fn recv(&self) -> u8 {
        self.latched.load(Ordering::Relaxed)
    }

    fn rx_full(&self) {
        self.rx_full.fetch_add(1, Ordering::Relaxed);
    }
}

struct IdleState {
    pending: Mutex<VecDeque<u8>>,
    sleeps: AtomicUsize,
}

/// Idle strategy that delivers one queued byte per sleep, standing in for
/// the receive interrupt. Sleeping with nothing queued would hang a real
/// device, so it panics instead.
#[derive(Clone)]
pub struct MockIdle {
    state: Arc<IdleState>,
}

impl MockIdle {
    pub fn new() -> Self {
        Self::with_pending(&[])
    }

    pub fn with_pending(bytes: &[u8]) -> Self {
        MockIdle {
            state: Arc::new(IdleState {
                pending: Mutex::new(bytes.iter().copied().collect()),
                sleeps: AtomicUsize::new(0),
            }),
        }
    }

    pub fn sleeps(&self) -> usize {
        self.state.sleeps.load(Ordering::Relaxed)
    }
}

impl Idle for MockIdle {
    fn sleep_until_interrupt<const N: usize>(&self, rx: &CircularBuffer<N>) {
        self.state.sleeps.fetch_add(1, Ordering::Relaxed);
        let byte = self.state.pending.lock().unwrap().pop_front();
        match byte {
            Some(byte) => assert!(rx.push_if_space(byte)),
            None => panic!("blocking read with no input left"),
        }
    }
}

/// Register-level view of one port on the board
pub struct PortProbe {
    bus: MockBus,
    usart: usize,
}

impl PortProbe {
    /// Bytes written to the USART data register
    pub fn sent(&self) -> Vec<u8> {
        self.bus.written(self.usart)
    }

    pub fn baudctrla(&self) -> u8 {
        self.bus.peek(self.usart + 0x06)
    }

    pub fn baudctrlb(&self) -> u8 {
        self.bus.peek(self.usart + 0x07)
    }

    pub fn driver_enabled(&self) -> bool {
        self.bus.peek(PORTC_BASE + 0x04) & (1 << 5) != 0
    }
}

/// USB and RS-485 ports on one mock bus, bound into a descriptor table
pub struct MockBoard {
    pub table: FileDescriptorTable<Port<MockReg>, MockIdle>,
    pub usb: PortProbe,
    pub rs485: PortProbe,
    pub idle: MockIdle,
    bus: MockBus,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::with_idle(MockIdle::new())
    }

    pub fn with_idle(idle: MockIdle) -> Self {
        let bus = MockBus::new();
        let usb = Port::Usb(Usb::new(
            Usart::from_fn(USARTC0_BASE, |addr| bus.reg(addr)),
            Pins::from_fn(PORTC_BASE, |addr| bus.reg(addr)),
        ));
        let rs485 = Port::Rs485(Rs485::new(
            Usart::from_fn(USARTC1_BASE, |addr| bus.reg(addr)),
            Pins::from_fn(PORTC_BASE, |addr| bus.reg(addr)),
        ));

        MockBoard {
            table: FileDescriptorTable::new(usb, rs485, idle.clone()),
            usb: PortProbe { bus: bus.clone(), usart: USARTC0_BASE },
            rs485: PortProbe { bus: bus.clone(), usart: USARTC1_BASE },
            idle,
            bus,
        }
    }

    /// Deliver `bytes` through the receive interrupt of `fd`.
    pub fn receive(&self, fd: Fd, bytes: &[u8]) {
        let usart = match fd {
            FD_USB => USARTC0_BASE,
            FD_RS485 => USARTC1_BASE,
            _ => panic!("no port behind fd {}", fd.0),
        };
        for &byte in bytes {
            self.bus.poke(usart, byte);
            self.table.rx_interrupt(fd);
        }
    }
}
