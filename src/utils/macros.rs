/// Print to a device of a descriptor table.
///
/// Evaluates to the `core::fmt::Result` of the write.
#[macro_export]
macro_rules! xio_print {
    ($table:expr, $fd:expr, $($arg:tt)*) => ({
        use core::fmt::Write;
        $crate::utils::writer::Writer::new($table, $fd).write_fmt(format_args!($($arg)*))
    });
}

/// Print with new line to a device of a descriptor table
#[macro_export]
macro_rules! xio_println {
    ($table:expr, $fd:expr) => ($crate::xio_print!($table, $fd, "\n"));
    ($table:expr, $fd:expr, $fmt:expr) => ($crate::xio_print!($table, $fd, concat!($fmt, "\n")));
    ($table:expr, $fd:expr, $fmt:expr, $($arg:tt)*) => (
        $crate::xio_print!($table, $fd, concat!($fmt, "\n"), $($arg)*)
    );
}
