//! Parsing the PLY header into a schema of elements and properties.

use log::{debug, trace, warn};

use crate::{
    error::Error,
    parse::{
        Span, read_token,
        buf::LineReader,
        num::{is_decimal, parse_unsigned},
    },
};
use super::{
    Config,
    layout::{PropIndex, PropVec, Projection},
    ty::{PropertyType, ScalarType},
};


/// The encoding of the PLY body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl Format {
    /// Parses the format keyword of the `format` line (ignoring ASCII case).
    pub fn from_name(name: Span<'_>) -> Option<Self> {
        if name == "ascii" {
            Some(Format::Ascii)
        } else if name == "binary_little_endian" {
            Some(Format::BinaryLittleEndian)
        } else if name == "binary_big_endian" {
            Some(Format::BinaryBigEndian)
        } else {
            None
        }
    }

    /// Returns `true` if binary values of this format have to be byte-swapped
    /// to be read on this machine.
    pub fn needs_swap(&self) -> bool {
        match self {
            Format::Ascii => false,
            Format::BinaryLittleEndian => cfg!(target_endian = "big"),
            Format::BinaryBigEndian => cfg!(target_endian = "little"),
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Ascii
    }
}

/// Everything stored in the header of a PLY file.
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub format: Format,
    pub version: String,
    pub comments: Vec<String>,
    pub obj_infos: Vec<String>,

    /// All element groups in the order they appear in the file (which is also
    /// the order of the data in the body).
    pub elements: Vec<ElementDef>,
}

impl Header {
    /// Finds the element group with the given name (ignoring ASCII case).
    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut ElementDef> {
        self.elements.iter_mut().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Returns the declared number of elements in the group `name` or 0 if
    /// there is no such group.
    pub fn element_count(&self, name: &str) -> u64 {
        self.element(name).map(|e| e.count).unwrap_or(0)
    }
}

/// The header definition of one element group.
#[derive(Debug, Clone)]
pub struct ElementDef {
    pub name: String,

    /// Number of elements in this group. Taken from the header as is.
    pub count: u64,

    /// Definitions for all properties of elements in this group.
    pub property_defs: PropVec<PropertyDef>,
}

impl ElementDef {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
            property_defs: PropVec::new(),
        }
    }

    pub fn prop_pos(&self, prop_name: &str) -> Option<PropIndex> {
        self.property_defs.iter()
            .position(|p| p.name.eq_ignore_ascii_case(prop_name))
            .map(|idx| PropIndex(idx as u8))
    }
}

/// The header definition of one property of an element, plus where the caller
/// wants its values to end up.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,

    /// The type as declared in the file.
    pub ty: PropertyType,

    /// Destination type and placement in the packed record. Defaults to the
    /// declared type, auto-packed.
    pub projection: Projection,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        Self {
            name: name.into(),
            ty,
            projection: Projection::Auto(ty.scalar_type()),
        }
    }
}


/// Parses the header from `reader`, consuming everything up to and including
/// the `end_header` line.
pub fn parse_header(reader: &mut impl LineReader, config: &Config) -> Result<Header, Error> {
    let mut header = Header::default();
    let mut line_no = 0;
    let mut started = false;

    // Whether `property` lines still belong to the last element. `obj_info`
    // closes its property list.
    let mut in_element = false;

    loop {
        let mut line = match reader.read_line() {
            Some(line) => line,
            None => return Err(Error::UnexpectedEof("PLY header (no 'end_header' found)".into())),
        };
        line_no += 1;

        let keyword = read_token(&mut line);
        if keyword.is_empty() {
            continue;
        }
        trace!("PLY header line {}: {}", line_no, keyword);

        // The magic `ply` is only accepted before anything else.
        if !started {
            started = true;
            if keyword == "ply" {
                continue;
            }

            if config.require_magic {
                return Err(malformed!(line_no, "not a PLY file (does not start with 'ply')"));
            }
            warn!("PLY header does not start with 'ply', continuing anyway");
        } else if keyword == "ply" {
            return Err(malformed!(line_no, "'ply' is only allowed in the very first line"));
        }

        if keyword == "comment" {
            header.comments.push(line.trim().to_string_lossy());
        } else if keyword == "obj_info" {
            header.obj_infos.push(line.trim().to_string_lossy());
            in_element = false;
        } else if keyword == "format" {
            let format = read_token(&mut line);
            match Format::from_name(format) {
                Some(f) => header.format = f,
                None => warn!("unknown PLY format {:?}, keeping {:?}", format, header.format),
            }
            header.version = read_token(&mut line).to_string_lossy();
        } else if keyword == "element" {
            let name = read_token(&mut line);
            let count = read_token(&mut line);
            if name.is_empty() {
                return Err(malformed!(line_no, "element definition without name"));
            }
            if !is_decimal(count.as_bytes()) {
                return Err(malformed!(
                    line_no,
                    "invalid element count {:?} for element '{}'",
                    count,
                    name,
                ));
            }

            header.elements.push(ElementDef::new(
                name.to_string_lossy(),
                parse_unsigned(count.as_bytes()),
            ));
            in_element = true;
        } else if keyword == "property" {
            let elem = header.elements.last_mut()
                .filter(|_| in_element)
                .ok_or(Error::PropertyWithoutElement { line: line_no })?;

            if elem.property_defs.len() >= config.max_properties {
                return Err(Error::TooManyProperties {
                    element: elem.name.clone(),
                    max: config.max_properties,
                });
            }

            let def = parse_property(&mut line, line_no)?;
            elem.property_defs.push(def);
        } else if keyword == "end_header" {
            break;
        } else {
            return Err(malformed!(
                line_no,
                "expected 'comment', 'format', 'element', 'property', 'obj_info' or \
                    'end_header', found {:?}",
                keyword,
            ));
        }
    }

    debug!(
        "parsed PLY header: format {:?} {}, {} elements, {} comments",
        header.format,
        header.version,
        header.elements.len(),
        header.comments.len(),
    );

    Ok(header)
}

/// Parses the rest of a `property` line, e.g. `float x` or
/// `list uchar int vertex_indices`.
fn parse_property(line: &mut Span<'_>, line_no: usize) -> Result<PropertyDef, Error> {
    let first = read_token(line);
    let ty = if first == "list" {
        let len_type = parse_type(read_token(line), line_no)?;
        let scalar_type = parse_type(read_token(line), line_no)?;

        // Lengths stored as floats don't make any sense.
        if !len_type.is_integer() {
            return Err(malformed!(
                line_no,
                "list length type has to be an integer type, but is '{}'",
                len_type,
            ));
        }

        PropertyType::List { len_type, scalar_type }
    } else {
        PropertyType::Scalar(parse_type(first, line_no)?)
    };

    let name = read_token(line);
    if name.is_empty() {
        return Err(malformed!(line_no, "property definition without name"));
    }

    Ok(PropertyDef::new(name.to_string_lossy(), ty))
}

fn parse_type(token: Span<'_>, line_no: usize) -> Result<ScalarType, Error> {
    match ScalarType::from_name(token) {
        ScalarType::Invalid if token.is_empty() => {
            Err(malformed!(line_no, "missing type in property definition"))
        }
        ScalarType::Invalid => Err(Error::UnknownType {
            line: line_no,
            name: token.to_string_lossy(),
        }),
        ty => Ok(ty),
    }
}
