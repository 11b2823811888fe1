/*
 * Mode-Dispatching Read/Write Engine
 *
 * The transfer loops behind read() and write(). They are written once,
 * against a character-level interface, and shared by every device.
 *
 * Modes (see `Mode`):
 *
 *  Exact   Read or write exactly N bytes. NULs are not special. If the
 *          character source fails part way (e.g. non-blocking and empty)
 *          the error is returned and no partial count is reported.
 *
 *  Line    Read until a delimiter (\r, \n, ;) or a NUL has been read. The
 *          delimiter is stored and the buffer is NUL-terminated after it.
 *          Write until a delimiter or NUL is found in the source; the
 *          delimiter is sent, the NUL is not.
 *
 *  Str     Read until a NUL has been read; the NUL is stored and counted.
 *          Write until a NUL is found in the source; the NUL is not sent.
 *
 *  PgmStr  Write only. Same as Str, but the source is an immutable
 *          program-memory string.
 *
 * Line and string transfers stop at the device's size limit. A read that
 * hits it leaves the buffer filled to the limit and NUL-terminated; a write
 * that hits it has already sent everything up to the limit. Both report
 * `MessageTooLong`.
 */

use super::control::SizeMax;
use super::device::Errno;
use super::mode::{is_delimiter, Mode, NUL};

/// Character-level access to one open device
pub trait CharIo {
    /// Read one character, honoring the device's blocking and echo policy.
    fn getc(&self) -> Result<u8, Errno>;

    /// Write one character. Returns the character written.
    fn putc(&self, c: u8) -> Result<u8, Errno>;
}

/// Where the bytes of a write come from
pub trait ByteSource {
    fn len(&self) -> usize;

    fn byte_at(&self, index: usize) -> u8;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteSource for [u8] {
    #[inline(always)]
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    #[inline(always)]
    fn byte_at(&self, index: usize) -> u8 {
        self[index]
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    #[inline(always)]
    fn len(&self) -> usize {
        N
    }

    #[inline(always)]
    fn byte_at(&self, index: usize) -> u8 {
        self[index]
    }
}

/// String constant placed in program memory
///
/// Typically used to embed string literals in a print statement without
/// copying them to RAM first.
#[derive(Debug, Clone, Copy)]
pub struct PgmStr(&'static [u8]);

impl PgmStr {
    pub const fn new(bytes: &'static [u8]) -> Self {
        PgmStr(bytes)
    }

    pub const fn as_bytes(&self) -> &'static [u8] {
        self.0
    }
}

impl ByteSource for PgmStr {
    #[inline(always)]
    fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    fn byte_at(&self, index: usize) -> u8 {
        self.0[index]
    }
}

/// Read into `buf` according to `mode`, stopping at `max` for line and
/// string modes.
pub fn read<C: CharIo + ?Sized>(
    io: &C,
    buf: &mut [u8],
    mode: Mode,
    max: SizeMax,
) -> Result<usize, Errno> {
    match mode {
        Mode::Empty => Ok(0),
        Mode::Exact(size) => read_exact(io, buf, size as usize, max),
        Mode::Line => read_until(io, buf, max, |c| is_delimiter(c) || c == NUL),
        Mode::Str => read_until(io, buf, max, |c| c == NUL),
        // rejected by Mode::for_read
        Mode::PgmStr => Err(Errno::Unreachable),
    }
}

/// Write from `src` according to `mode`, stopping at `max` for line and
/// string modes.
pub fn write<C, S>(io: &C, src: &S, mode: Mode, max: SizeMax) -> Result<usize, Errno>
where
    C: CharIo + ?Sized,
    S: ByteSource + ?Sized,
{
    match mode {
        Mode::Empty => Ok(0),
        Mode::Exact(size) => write_exact(io, src, size as usize, max),
        Mode::Line => write_until(io, src, max, true),
        Mode::Str | Mode::PgmStr => write_until(io, src, max, false),
    }
}

fn read_exact<C: CharIo + ?Sized>(
    io: &C,
    buf: &mut [u8],
    size: usize,
    max: SizeMax,
) -> Result<usize, Errno> {
    if !max.admits(size) || size > buf.len() {
        return Err(Errno::TooLarge);
    }
    for slot in &mut buf[..size] {
        *slot = io.getc()?;
    }
    Ok(size)
}

fn read_until<C, F>(io: &C, buf: &mut [u8], max: SizeMax, done: F) -> Result<usize, Errno>
where
    C: CharIo + ?Sized,
    F: Fn(u8) -> bool,
{
    if buf.is_empty() {
        return Err(Errno::InvalidArgument);
    }

    // one byte is always kept back for the terminator
    let cap = max.cap(buf.len() - 1);
    let mut len = 0;
    loop {
        if len == cap {
            buf[len] = NUL;
            return Err(Errno::MessageTooLong);
        }
        let c = io.getc()?;
        buf[len] = c;
        len += 1;
        if done(c) {
            buf[len] = NUL;
            return Ok(len);
        }
    }
}

fn write_exact<C, S>(io: &C, src: &S, size: usize, max: SizeMax) -> Result<usize, Errno>
where
    C: CharIo + ?Sized,
    S: ByteSource + ?Sized,
{
    if !max.admits(size) || size > src.len() {
        return Err(Errno::TooLarge);
    }
    for i in 0..size {
        io.putc(src.byte_at(i))?;
    }
    Ok(size)
}

fn write_until<C, S>(io: &C, src: &S, max: SizeMax, line: bool) -> Result<usize, Errno>
where
    C: CharIo + ?Sized,
    S: ByteSource + ?Sized,
{
    let cap = max.cap(usize::MAX);
    let mut sent = 0;
    for i in 0..src.len() {
        let c = src.byte_at(i);
        if c == NUL {
            return Ok(sent);
        }
        if sent == cap {
            // truncated write
            return Err(Errno::MessageTooLong);
        }
        io.putc(c)?;
        sent += 1;
        if line && is_delimiter(c) {
            return Ok(sent);
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Character source/sink scripted by the test
    struct Script {
        input: RefCell<VecDeque<u8>>,
        output: RefCell<Vec<u8>>,
        reads: RefCell<usize>,
    }

    impl Script {
        fn new(input: &[u8]) -> Self {
            Script {
                input: RefCell::new(input.iter().copied().collect()),
                output: RefCell::new(Vec::new()),
                reads: RefCell::new(0),
            }
        }

        fn remaining(&self) -> Vec<u8> {
            self.input.borrow().iter().copied().collect()
        }
    }

    impl CharIo for Script {
        fn getc(&self) -> Result<u8, Errno> {
            *self.reads.borrow_mut() += 1;
            self.input.borrow_mut().pop_front().ok_or(Errno::WouldBlock)
        }

        fn putc(&self, c: u8) -> Result<u8, Errno> {
            self.output.borrow_mut().push(c);
            Ok(c)
        }
    }

    const MAX: SizeMax = SizeMax::Limit(79);

    #[test]
    fn test_empty_mode_touches_nothing() {
        let io = Script::new(b"abc");
        let mut buf = [0u8; 4];
        assert_eq!(read(&io, &mut buf, Mode::Empty, MAX), Ok(0));
        assert_eq!(*io.reads.borrow(), 0);
        assert_eq!(write(&io, &b"abc"[..], Mode::Empty, MAX), Ok(0));
        assert!(io.output.borrow().is_empty());
    }

    #[test]
    fn test_line_read_stops_at_delimiter() {
        let io = Script::new(b"AB;CD");
        let mut buf = [0xFFu8; 16];

        assert_eq!(read(&io, &mut buf, Mode::Line, MAX), Ok(3));
        assert_eq!(&buf[..4], b"AB;\0");
        assert_eq!(io.remaining(), b"CD");
    }

    #[test]
    fn test_line_read_stops_at_nul() {
        let io = Script::new(b"AB\0CD\n");
        let mut buf = [0xFFu8; 16];

        assert_eq!(read(&io, &mut buf, Mode::Line, MAX), Ok(3));
        assert_eq!(&buf[..3], b"AB\0");
        assert_eq!(io.remaining(), b"CD\n");
    }

    #[test]
    fn test_string_read_keeps_nul() {
        let io = Script::new(b"hello\0world");
        let mut buf = [0xFFu8; 16];

        assert_eq!(read(&io, &mut buf, Mode::Str, MAX), Ok(6));
        assert_eq!(&buf[..6], b"hello\0");
        assert_eq!(io.remaining(), b"world");
    }

    #[test]
    fn test_string_read_ignores_delimiters() {
        let io = Script::new(b"a;b\r\0");
        let mut buf = [0u8; 16];
        assert_eq!(read(&io, &mut buf, Mode::Str, MAX), Ok(5));
        assert_eq!(&buf[..5], b"a;b\r\0");
    }

    #[test]
    fn test_line_read_too_long() {
        let io = Script::new(b"0123456789");
        let mut buf = [0xFFu8; 16];

        assert_eq!(
            read(&io, &mut buf, Mode::Line, SizeMax::Limit(4)),
            Err(Errno::MessageTooLong)
        );
        assert_eq!(&buf[..5], b"0123\0");
        assert_eq!(io.remaining(), b"456789");
    }

    #[test]
    fn test_line_read_delimiter_on_limit() {
        let io = Script::new(b"abc\nrest");
        let mut buf = [0u8; 16];
        assert_eq!(read(&io, &mut buf, Mode::Line, SizeMax::Limit(4)), Ok(4));
        assert_eq!(&buf[..5], b"abc\n\0");
    }

    #[test]
    fn test_line_read_capped_by_buffer() {
        let io = Script::new(b"abcdef;");
        let mut buf = [0xFFu8; 4];
        assert_eq!(
            read(&io, &mut buf, Mode::Line, SizeMax::Unlimited),
            Err(Errno::MessageTooLong)
        );
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn test_line_read_empty_buffer() {
        let io = Script::new(b"x\n");
        let mut buf = [0u8; 0];
        assert_eq!(
            read(&io, &mut buf, Mode::Line, MAX),
            Err(Errno::InvalidArgument)
        );
        assert_eq!(*io.reads.borrow(), 0);
    }

    #[test]
    fn test_line_read_source_error_passes_through() {
        let io = Script::new(b"ab");
        let mut buf = [0u8; 8];
        assert_eq!(read(&io, &mut buf, Mode::Line, MAX), Err(Errno::WouldBlock));
    }

    #[test]
    fn test_exact_read() {
        let io = Script::new(b"a\0;bcd");
        let mut buf = [0u8; 8];
        assert_eq!(read(&io, &mut buf, Mode::Exact(4), MAX), Ok(4));
        assert_eq!(&buf[..4], b"a\0;b");
        assert_eq!(io.remaining(), b"cd");
    }

    #[test]
    fn test_exact_read_all_or_error() {
        let io = Script::new(b"ab");
        let mut buf = [0u8; 8];
        assert_eq!(
            read(&io, &mut buf, Mode::Exact(3), MAX),
            Err(Errno::WouldBlock)
        );
    }

    #[test]
    fn test_exact_read_too_large() {
        let io = Script::new(b"abcdef");
        let mut buf = [0u8; 8];
        assert_eq!(
            read(&io, &mut buf, Mode::Exact(5), SizeMax::Limit(4)),
            Err(Errno::TooLarge)
        );
        assert_eq!(
            read(&io, &mut buf, Mode::Exact(9), SizeMax::Unlimited),
            Err(Errno::TooLarge)
        );
        assert_eq!(*io.reads.borrow(), 0);
    }

    #[test]
    fn test_string_write_drops_nul() {
        let io = Script::new(b"");
        assert_eq!(write(&io, &b"ok\0"[..], Mode::Str, MAX), Ok(2));
        assert_eq!(*io.output.borrow(), b"ok");
    }

    #[test]
    fn test_string_write_without_nul() {
        let io = Script::new(b"");
        assert_eq!(write(&io, &b"abc"[..], Mode::Str, MAX), Ok(3));
        assert_eq!(*io.output.borrow(), b"abc");
    }

    #[test]
    fn test_line_write_sends_delimiter() {
        let io = Script::new(b"");
        assert_eq!(write(&io, &b"G0 X1\nG1"[..], Mode::Line, MAX), Ok(6));
        assert_eq!(*io.output.borrow(), b"G0 X1\n");
    }

    #[test]
    fn test_line_write_stops_at_nul() {
        let io = Script::new(b"");
        assert_eq!(write(&io, &b"ab\0c;"[..], Mode::Line, MAX), Ok(2));
        assert_eq!(*io.output.borrow(), b"ab");
    }

    #[test]
    fn test_truncated_write() {
        let io = Script::new(b"");
        assert_eq!(
            write(&io, &b"abcdef\0"[..], Mode::Str, SizeMax::Limit(4)),
            Err(Errno::MessageTooLong)
        );
        assert_eq!(*io.output.borrow(), b"abcd");
    }

    #[test]
    fn test_write_exactly_at_limit() {
        let io = Script::new(b"");
        assert_eq!(
            write(&io, &b"abcd\0"[..], Mode::Str, SizeMax::Limit(4)),
            Ok(4)
        );
    }

    #[test]
    fn test_exact_write_passes_nul() {
        let io = Script::new(b"");
        assert_eq!(write(&io, &b"a\0b;c"[..], Mode::Exact(4), MAX), Ok(4));
        assert_eq!(*io.output.borrow(), b"a\0b;");
    }

    #[test]
    fn test_exact_write_too_large() {
        let io = Script::new(b"");
        assert_eq!(
            write(&io, &b"abc"[..], Mode::Exact(4), MAX),
            Err(Errno::TooLarge)
        );
        assert_eq!(
            write(&io, &b"abcdef"[..], Mode::Exact(5), SizeMax::Limit(4)),
            Err(Errno::TooLarge)
        );
        assert!(io.output.borrow().is_empty());
    }

    #[test]
    fn test_pgm_write() {
        const BANNER: PgmStr = PgmStr::new(b"xio ready\0ignored");
        let io = Script::new(b"");
        assert_eq!(write(&io, &BANNER, Mode::PgmStr, SizeMax::Unlimited), Ok(9));
        assert_eq!(*io.output.borrow(), b"xio ready");
    }

    #[test]
    fn test_pgm_mode_not_readable() {
        let io = Script::new(b"abc");
        let mut buf = [0u8; 4];
        assert_eq!(
            read(&io, &mut buf, Mode::PgmStr, MAX),
            Err(Errno::Unreachable)
        );
    }
}
