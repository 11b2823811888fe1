/*
 * Hardware Drivers
 *
 * This module contains the hardware-specific side of the I/O core: the
 * register-level drivers behind each device variant.
 *
 * Why this is important:
 * - Keeps register layouts and pin assignments out of the I/O engine
 * - Drivers are written against the `Io` trait, so they run unchanged
 *   against memory-mapped registers and test doubles
 *
 * Driver categories:
 * - Serial: USART and the USB / RS-485 devices built on it
 */

pub mod serial;
