//! The input abstraction the PLY reader pulls its bytes from.

use super::{read_line, Span};


/// Supplies lines (header, ASCII body) and raw byte chunks (binary body).
///
/// Both methods advance the same internal position. `None` signals that the
/// input is exhausted (or, for `read_data`, that fewer than `n` bytes are
/// left).
pub trait LineReader {
    /// Returns the next line without its terminator.
    fn read_line(&mut self) -> Option<Span<'_>>;

    /// Returns exactly the next `n` bytes.
    fn read_data(&mut self, n: usize) -> Option<&[u8]>;
}

impl<R: LineReader + ?Sized> LineReader for &mut R {
    fn read_line(&mut self) -> Option<Span<'_>> {
        (**self).read_line()
    }

    fn read_data(&mut self, n: usize) -> Option<&[u8]> {
        (**self).read_data(n)
    }
}

/// A `LineReader` over bytes held in memory.
///
/// `B` can be anything byte-like, e.g. `&[u8]` to read borrowed data or
/// `Vec<u8>` to own the input.
#[derive(Debug, Clone)]
pub struct SliceReader<B> {
    data: B,
    pos: usize,
}

impl<B: AsRef<[u8]>> SliceReader<B> {
    pub fn new(data: B) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes already consumed.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Returns `true` if all input was consumed.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.as_ref().len()
    }

    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]>> LineReader for SliceReader<B> {
    fn read_line(&mut self) -> Option<Span<'_>> {
        let all = self.data.as_ref();
        let rest = &all[self.pos..];
        let (line, remaining) = read_line(rest)?;
        self.pos = all.len() - remaining.len();
        Some(line)
    }

    fn read_data(&mut self, n: usize) -> Option<&[u8]> {
        let all = self.data.as_ref();
        let end = self.pos.checked_add(n)?;
        if end > all.len() {
            return None;
        }

        let out = &all[self.pos..end];
        self.pos = end;
        Some(out)
    }
}
