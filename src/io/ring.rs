/*
 * Lock-Free Circular Buffer
 *
 * This module implements the fixed-capacity byte ring each device uses for
 * its receive (and, when buffered, transmit) path. The receive interrupt
 * writes into it and the foreground read path drains it.
 *
 * Design:
 * - Fixed-size storage, sized at compile time, never heap-allocated
 * - Cursors count DOWN from the top of the array and wrap from index 1
 *   back to N - 1; index 0 never holds data
 * - Both cursors are pre-decremented: head points at the last byte
 *   written, tail at the last byte read
 * - head == tail means empty; a write that would make head == tail means
 *   full, so one more slot is given up to tell the two apart
 * - Usable capacity is N - 2
 *
 * Thread Safety:
 * - Single producer, single consumer: the producer is the only writer of
 *   `head` and of the slot it is about to publish, the consumer is the only
 *   writer of `tail`
 * - Publishing uses Release stores and observing uses Acquire loads, so the
 *   consumer never sees a cursor before the byte it covers
 * - Safe to call from interrupt context
 * - No heap allocations, no mutexes or locks
 */

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use super::device::Errno;
use super::idle::Idle;

/// Fixed-capacity byte ring with independent read and write cursors.
pub struct CircularBuffer<const N: usize> {
    /// Ring storage, slot 0 unused
    buf: [AtomicU8; N],

    /// Write cursor (producer index)
    head: AtomicUsize,

    /// Read cursor (consumer index)
    tail: AtomicUsize,
}

impl<const N: usize> CircularBuffer<N> {
    /// Rings smaller than this cannot hold a single byte.
    const MIN_SIZE: usize = 3;

    /// Create a new empty ring
    pub const fn new() -> Self {
        Self {
            buf: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(1),
            tail: AtomicUsize::new(1),
        }
    }

    /// Step a cursor one slot down, wrapping from 1 to the top.
    #[inline(always)]
    const fn step(index: usize) -> usize {
        if index <= 1 { N - 1 } else { index - 1 }
    }

    /// Put both cursors back at their initial position.
    ///
    /// Only valid while neither side is running, i.e. when the device is
    /// (re)opened with its receive interrupt not yet producing.
    pub fn reset(&self) {
        self.head.store(1, Ordering::Relaxed);
        self.tail.store(1, Ordering::Release);
    }

    /// Store a byte unless the ring is full.
    ///
    /// Returns `false` without touching the stored data or the write cursor
    /// when there is no space. This is the point at which a device would
    /// signal flow control.
    pub fn push_if_space(&self, byte: u8) -> bool {
        if N < Self::MIN_SIZE {
            return false;
        }

        let head = Self::step(self.head.load(Ordering::Relaxed));
        if head == self.tail.load(Ordering::Acquire) {
            // full: the write cursor is left at its pre-call value
            return false;
        }

        self.buf[head].store(byte, Ordering::Relaxed);
        self.head.store(head, Ordering::Release);
        true
    }

    /// Take the oldest byte, if any.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        let tail = Self::step(tail);
        let byte = self.buf[tail].load(Ordering::Relaxed);
        self.tail.store(tail, Ordering::Release);
        Some(byte)
    }

    /// Take the oldest byte, honoring the caller's blocking policy.
    ///
    /// With `blocking` set an empty ring parks the caller in `idle` until
    /// the next interrupt and tries again; there is no timeout. Without it
    /// an empty ring is `WouldBlock`.
    pub fn pop_or_wait<W: Idle>(&self, blocking: bool, idle: &W) -> Result<u8, Errno> {
        loop {
            if let Some(byte) = self.pop() {
                return Ok(byte);
            }
            if !blocking {
                return Err(Errno::WouldBlock);
            }
            idle.sleep_until_interrupt(self);
        }
    }

    /// Check if the ring is empty
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Check if the next push would fail
    pub fn is_full(&self) -> bool {
        N < Self::MIN_SIZE || Self::step(self.head.load(Ordering::Acquire)) == self.tail.load(Ordering::Acquire)
    }

    /// Number of bytes a ring of this size can hold
    pub const fn capacity(&self) -> usize {
        N.saturating_sub(2)
    }

    /// Get the number of bytes currently in the ring
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);

        // cursors run downwards, so the unread span goes from tail to head
        if tail >= head {
            tail - head
        } else {
            tail + (N - 1) - head
        }
    }
}

impl<const N: usize> Default for CircularBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
