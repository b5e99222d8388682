//! Low level scanning of PLY text: splitting into lines and tokens.
//!
//! Nothing in here allocates. Lines and tokens are [`Span`]s, views into the
//! input buffer that compare case-insensitively.

use std::{
    cmp::Ordering,
    fmt,
};


pub mod buf;
pub mod num;

#[cfg(test)]
mod tests;


/// An immutable view into some input bytes, e.g. a line or a single token.
///
/// Equality and ordering ignore ASCII case: `Span::new(b"Float32") ==
/// "float32"`. Non-letter bytes are compared as they are.
#[derive(Clone, Copy, Default)]
pub struct Span<'a>(&'a [u8]);

impl<'a> Span<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Span(data)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the span with leading and trailing spaces and tabs removed.
    pub fn trim(&self) -> Span<'a> {
        Span(trim(self.0))
    }

    /// Returns the span as string. Non-UTF8 bytes are replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.0).into_owned()
    }
}

impl PartialEq for Span<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }
}

impl Eq for Span<'_> {}

impl PartialEq<str> for Span<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.as_bytes())
    }
}

impl PartialEq<&str> for Span<'_> {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl PartialOrd for Span<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Span<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.0.iter().map(u8::to_ascii_lowercase);
        let b = other.0.iter().map(u8::to_ascii_lowercase);
        a.cmp(b)
    }
}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&debug_fmt_bytes(self.0))
    }
}

impl fmt::Display for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.0))
    }
}

fn is_line_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Splits off the first line of `input`.
///
/// Returns the line (without its terminator) and the remaining input, or
/// `None` if `input` is empty. A terminator is `"\r\n"`, `"\n"` or `"\r"`;
/// only one terminator is consumed, so an empty line following it is returned
/// by the next call.
pub fn read_line(input: &[u8]) -> Option<(Span<'_>, &[u8])> {
    if input.is_empty() {
        return None;
    }

    let end = input.iter().position(|&b| is_line_break(b)).unwrap_or(input.len());
    let line = &input[..end];
    let rest = &input[end..];
    let rest = if rest.starts_with(b"\r\n") {
        &rest[2..]
    } else if rest.is_empty() {
        rest
    } else {
        &rest[1..]
    };

    Some((Span(line), rest))
}

/// Reads the next token from `line` and advances `line` past it.
///
/// Leading spaces and tabs are skipped, then the longest run of non-blank
/// bytes is returned. Whitespace after the token is left in `line`. If only
/// whitespace remains, an empty span is returned.
pub fn read_token<'a>(line: &mut Span<'a>) -> Span<'a> {
    let data = line.0;
    let start = data.iter().position(|&b| !is_blank(b)).unwrap_or(data.len());
    let len = data[start..].iter().position(|&b| is_blank(b)).unwrap_or(data.len() - start);

    line.0 = &data[start + len..];
    Span(&data[start..start + len])
}

/// Removes leading and trailing spaces and tabs.
pub fn trim(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|&b| !is_blank(b)).unwrap_or(data.len());
    let end = data.iter().rposition(|&b| !is_blank(b)).map(|p| p + 1).unwrap_or(start);
    &data[start..end]
}

/// Formats bytes for error and debug messages: as string if they are valid
/// UTF8, as byte list otherwise.
pub fn debug_fmt_bytes(data: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(data) {
        format!("{:?}", s)
    } else {
        format!("{:?}", data)
    }
}
