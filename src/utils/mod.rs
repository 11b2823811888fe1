/*
 * Utilities
 *
 * Formatted output on top of the descriptor table: a `core::fmt::Write`
 * adapter, the print macros, numeric printers and the `log` backend.
 */

pub use self::logger::*;
pub use self::print::*;
pub use self::writer::*;

pub mod logger;
#[macro_use]
pub mod macros;
pub mod print;
pub mod writer;
