//! The error type of this crate.

use std::io;

use failure::Fail;


/// Everything that can go wrong while reading a PLY file.
///
/// Errors about the header carry the (1-based) line number at which the
/// problem was detected. Errors about the body name the element group.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "IO error: {}", _0)]
    Io(io::Error),

    #[fail(display = "malformed PLY header: {} (line {})", msg, line)]
    Header {
        line: usize,
        msg: String,
    },

    #[fail(display = "property definition without preceding element definition (line {})", line)]
    PropertyWithoutElement {
        line: usize,
    },

    #[fail(display = "\"{}\" is not a valid PLY scalar type (line {})", name, line)]
    UnknownType {
        line: usize,
        name: String,
    },

    #[fail(
        display = "element '{}' has more than {} properties (that's not supported)",
        element,
        max
    )]
    TooManyProperties {
        element: String,
        max: usize,
    },

    #[fail(display = "unexpected end of input while reading {}", _0)]
    UnexpectedEof(String),

    #[fail(
        display = "missing value for property '{}' in element '{}' #{}",
        property,
        element,
        instance
    )]
    MissingValue {
        element: String,
        instance: u64,
        property: String,
    },

    #[fail(display = "no element '{}' in PLY header", _0)]
    UnknownElement(String),

    #[fail(display = "element '{}' has no property '{}'", element, property)]
    UnknownProperty {
        element: String,
        property: String,
    },

    #[fail(
        display = "invalid destination type for property '{}' of element '{}'",
        property,
        element
    )]
    InvalidDestination {
        element: String,
        property: String,
    },

    #[fail(display = "the PLY header has to be read before this operation")]
    HeaderNotRead,

    #[fail(display = "the PLY body was already read")]
    DataAlreadyRead,

    #[fail(
        display = "list in element '{}' has {} entries, but {} were expected",
        element,
        actual,
        expected
    )]
    ListArity {
        element: String,
        expected: u32,
        actual: u32,
    },

    #[fail(
        display = "list length {} of property '{}' in element '{}' #{} is not a valid '{}'",
        len,
        property,
        element,
        instance,
        len_type
    )]
    InvalidListLength {
        element: String,
        instance: u64,
        property: String,
        len: String,
        len_type: &'static str,
    },

    #[fail(
        display = "allocator out of memory ({} bytes requested, {} bytes available)",
        requested,
        available
    )]
    OutOfMemory {
        requested: usize,
        available: usize,
    },

    #[fail(display = "records of element '{}' don't fit into memory", _0)]
    RecordTooLarge(String),
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}

/// Shorthand for creating an `Error::Header` with a formatted message.
macro_rules! malformed {
    ($line:expr, $($t:tt)+) => {
        crate::error::Error::Header {
            line: $line,
            msg: format!($($t)+),
        }
    };
}
