/*
 * Idle Wait for Blocking Reads
 *
 * A blocking read against an empty receive ring parks the foreground until
 * the next interrupt instead of returning `WouldBlock`. How the CPU is
 * parked is platform specific (sleep mode, WFI, ...), so the registry is
 * generic over this trait.
 *
 * ## Contract
 *
 * - `sleep_until_interrupt` returns after *some* interrupt has run, not
 *   necessarily the receive interrupt of this device; the caller re-checks
 *   the ring and sleeps again if it is still empty
 * - no timeout exists: a blocking read with no incoming data waits forever
 * - the caller holds no lock while sleeping, so the receive interrupt can
 *   always make progress
 */

use super::ring::CircularBuffer;

/// Parks the foreground until the next interrupt.
pub trait Idle: Sync {
    /// Sleep until an interrupt occurs.
    ///
    /// `rx` is the ring the caller is waiting on. Hardware implementations
    /// ignore it; test doubles use it to deliver the "interrupt".
    fn sleep_until_interrupt<const N: usize>(&self, rx: &CircularBuffer<N>);
}

/// Portable fallback that spins once per wait.
///
/// Correct on any target because the caller loops until data shows up, but
/// it burns power; firmware images should supply a sleep-mode `Idle`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinIdle;

impl Idle for SpinIdle {
    #[inline(always)]
    fn sleep_until_interrupt<const N: usize>(&self, _rx: &CircularBuffer<N>) {
        core::hint::spin_loop();
    }
}
