/*
 * Memory-Mapped I/O (MMIO) Implementation
 *
 * This module provides a safe Rust interface to memory-mapped peripheral
 * registers. The USART, PORT and status registers of the target part all
 * live in the data address space and are reached with volatile loads and
 * stores.
 *
 * Why this is important:
 * - Provides type-safe access to hardware registers
 * - Keeps the compiler from caching or eliding register accesses
 * - Lets drivers be written against the `Io` trait, so the same driver
 *   code runs against real registers and against test doubles
 *
 * Registers are accessed through `&self`: an MMIO store does not need
 * exclusive access to the Rust value describing the register, which lets
 * the receive interrupt read the data register while the foreground owns
 * the rest of the device.
 */

use core::marker::PhantomData;
use core::ops::{BitAnd, BitOr, Not};
use core::ptr::NonNull;

use volatile::VolatilePtr;

/// I/O interface trait
pub trait Io {
    /// The value type used for I/O operations.
    type Value: Copy
        + PartialEq
        + BitAnd<Output = Self::Value>
        + BitOr<Output = Self::Value>
        + Not<Output = Self::Value>;

    /// Reads the value from the I/O interface.
    fn read(&self) -> Self::Value;

    /// Writes the value to the I/O interface.
    fn write(&self, value: Self::Value);

    /// Reads the value from the I/O interface and checks if the specified flags are set.
    #[inline(always)]
    fn readf(&self, flags: Self::Value) -> bool {
        (self.read() & flags) == flags
    }

    /// Writes the value to the I/O interface with the specified flags set or cleared.
    #[inline(always)]
    fn writef(&self, flags: Self::Value, value: bool) {
        let tmp: Self::Value = match value {
            true => self.read() | flags,
            false => self.read() & !flags,
        };
        self.write(tmp);
    }
}

/// Wrapper for an I/O interface providing read-only access.
pub struct ReadOnly<I> {
    inner: I,
}

impl<I> ReadOnly<I> {
    /// Creates a new `ReadOnly` wrapper instance.
    pub const fn new(inner: I) -> ReadOnly<I> {
        ReadOnly { inner }
    }
}

impl<I: Io> ReadOnly<I> {
    /// Reads the value from the I/O interface.
    #[inline(always)]
    pub fn read(&self) -> I::Value {
        self.inner.read()
    }

    /// Reads the value from the I/O interface and checks if the specified flags are set.
    #[inline(always)]
    pub fn readf(&self, flags: I::Value) -> bool {
        self.inner.readf(flags)
    }
}

/// Generic memory-mapped register
pub struct Mmio<T> {
    ptr: NonNull<T>,
    value: PhantomData<T>,
}

impl<T> Mmio<T> {
    /// Create a register handle for the given data-space address.
    ///
    /// # Safety
    ///
    /// `addr` must be the non-null, properly aligned address of a register
    /// of type `T` that stays mapped for the life of the firmware.
    pub const unsafe fn new(addr: usize) -> Self {
        Mmio {
            ptr: unsafe { NonNull::new_unchecked(addr as *mut T) },
            value: PhantomData,
        }
    }

    /// Create a register handle from an existing pointer.
    ///
    /// # Safety
    ///
    /// Same contract as [`Mmio::new`]: the pointee must stay valid for as
    /// long as the handle is used.
    pub const unsafe fn from_ptr(ptr: NonNull<T>) -> Self {
        Mmio {
            ptr,
            value: PhantomData,
        }
    }
}

impl<T> Io for Mmio<T>
where
    T: Copy + PartialEq + BitAnd<Output = T> + BitOr<Output = T> + Not<Output = T>,
{
    type Value = T;

    #[inline(always)]
    fn read(&self) -> T {
        // SAFETY: the constructor contract guarantees a live, aligned register
        unsafe { VolatilePtr::new_read_only(self.ptr) }.read()
    }

    #[inline(always)]
    fn write(&self, value: T) {
        // SAFETY: the constructor contract guarantees a live, aligned register
        unsafe { VolatilePtr::new(self.ptr) }.write(value)
    }
}

// SAFETY: a register handle is only an address; every access is a single
// volatile load or store of a naturally aligned value.
unsafe impl<T> Send for Mmio<T> {}
unsafe impl<T> Sync for Mmio<T> {}
