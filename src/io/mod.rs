/*
 * Input/Output System
 *
 * This module provides the device abstraction layer of the firmware:
 * register access, the interrupt-fed circular buffers, the device
 * descriptors and the file descriptor table that command processing
 * talks to.
 */

pub mod control;
pub mod descriptor;
pub mod device;
pub mod engine;
pub mod fd;
pub mod idle;
pub mod mmio;
pub mod mode;
pub mod ring;

pub use control::{Baud, ControlBits, DeviceFlags, SizeMax, NO_LIMIT};
pub use descriptor::{Descriptor, Settings};
pub use device::{Errno, SerialDevice};
pub use engine::{ByteSource, CharIo, PgmStr};
pub use fd::{dev, Fd, FileDescriptorTable, FD_CONSOLE, FD_NULL, FD_RS485, FD_USB};
pub use idle::{Idle, SpinIdle};
pub use mmio::{Io, Mmio, ReadOnly};
pub use mode::{Mode, LINE_MODE, PSTR_MODE, SIZE_MODE, STR_MODE};
pub use ring::CircularBuffer;
