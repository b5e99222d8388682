//! Reading PLY files.
//!
//! A PLY file consists of an ASCII header describing a number of element
//! groups (each with a count and a list of typed properties) followed by the
//! body holding the values of all elements, either as ASCII text or as
//! binary data in little or big endian.
//!
//! Reading happens in a [`Ply`] session:
//!
//! 1. [`Ply::read_header`] parses the header into a [`Header`].
//! 2. Optionally, the caller changes where properties end up in the packed
//!    records ([`Ply::set_ignore_property`], [`Ply::set_property_type`],
//!    [`Ply::set_destination_property`]).
//! 3. [`Ply::read_data`] decodes the body and hands every record to the
//!    [`Handler`]s that claimed its element group.
//!
//! ```
//! use lox_ply::ply::{Ply, VertexHandler, TriangleHandler};
//!
//! let src = b"ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
//!     property float y\nproperty float z\nend_header\n1 2 3\n";
//!
//! let mut ply = Ply::from_bytes(src);
//! ply.read_header()?;
//! assert_eq!(ply.element_count("vertex"), 1);
//!
//! let mut vertices = VertexHandler::new();
//! let mut triangles = TriangleHandler::new();
//! ply.read_data(&mut [&mut vertices, &mut triangles])?;
//! assert_eq!(vertices.positions().len(), 1);
//! # Ok::<(), lox_ply::Error>(())
//! ```

#[cfg(feature = "fs")]
use std::path::Path;

use log::{debug, trace};
use smallvec::SmallVec;

use crate::{
    error::Error,
    memory::{Allocator, Heap},
    parse::buf::{LineReader, SliceReader},
};

mod decode;
mod endian;
mod handler;
mod header;
mod layout;
mod record;
mod ty;


pub use self::{
    decode::{decode_element, ElementData},
    endian::Swap,
    handler::{
        Handler, TriangleHandler, VertexHandler,
        FACE_ELEMENT_NAMES, VERTEX_ELEMENT_NAMES, VERTEX_INDICES_NAMES,
    },
    header::{parse_header, ElementDef, Format, Header, PropertyDef},
    layout::{
        ElementLayout, PropertyLayout, Projection, PropIndex, PropVec, RawOffset, Target,
        LIST_POINTER_LEN, MAX_PROPERTIES,
    },
    record::{ListView, Record, Value},
    ty::{PropertyType, ScalarType},
};


// ===========================================================================
// ===== Config
// ===========================================================================

/// Settings for reading PLY files.
///
/// Use [`Config::into_reader`] to start a [`Ply`] session with these
/// settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) max_properties: usize,
    pub(crate) require_magic: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            max_properties: MAX_PROPERTIES,
            require_magic: false,
        }
    }

    /// Sets the maximum number of properties a single element may have.
    /// Values above [`MAX_PROPERTIES`] are clamped.
    pub fn max_properties(mut self, max: usize) -> Self {
        self.max_properties = max.min(MAX_PROPERTIES);
        self
    }

    /// If `true`, files that don't start with the `ply` line are rejected.
    /// By default, a missing `ply` line only emits a warning.
    pub fn require_magic(mut self, require: bool) -> Self {
        self.require_magic = require;
        self
    }

    /// Creates a [`Ply`] session with this config.
    pub fn into_reader<R: LineReader, A: Allocator>(self, alloc: A, reader: R) -> Ply<R, A> {
        Ply {
            config: self,
            reader,
            alloc,
            header: None,
            data_read: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}


// ===========================================================================
// ===== Ply
// ===========================================================================

/// A session reading one PLY file.
#[derive(Debug)]
pub struct Ply<R, A = Heap> {
    config: Config,
    reader: R,
    alloc: A,
    header: Option<Header>,
    data_read: bool,
}

#[cfg(feature = "fs")]
impl Ply<SliceReader<Vec<u8>>> {
    /// Reads the whole file at `path` into memory and creates a session for
    /// it. The header is not parsed yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        debug!("read {} bytes from '{}'", data.len(), path.display());

        Ok(Self::new(Heap::new(), SliceReader::new(data)))
    }
}

impl<'a> Ply<SliceReader<&'a [u8]>> {
    /// Creates a session over PLY data in memory.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(Heap::new(), SliceReader::new(data))
    }
}

impl<R: LineReader, A: Allocator> Ply<R, A> {
    /// Creates a session with the default [`Config`].
    pub fn new(alloc: A, reader: R) -> Self {
        Config::default().into_reader(alloc, reader)
    }

    /// Parses the header. Calling this again returns the already parsed
    /// header.
    pub fn read_header(&mut self) -> Result<&Header, Error> {
        let header = match self.header.take() {
            Some(header) => header,
            None => parse_header(&mut self.reader, &self.config)?,
        };

        Ok(&*self.header.get_or_insert(header))
    }

    /// Returns the header if it was already read.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn format(&self) -> Option<Format> {
        self.header.as_ref().map(|h| h.format)
    }

    /// All `comment` lines of the header (without the keyword). Empty if the
    /// header wasn't read yet.
    pub fn comments(&self) -> &[String] {
        self.header.as_ref().map(|h| &h.comments[..]).unwrap_or(&[])
    }

    /// All `obj_info` lines of the header (without the keyword).
    pub fn obj_infos(&self) -> &[String] {
        self.header.as_ref().map(|h| &h.obj_infos[..]).unwrap_or(&[])
    }

    /// Returns the declared number of elements in the group `name` (ignoring
    /// ASCII case) or 0 if there is no such group or the header wasn't read.
    pub fn element_count(&self, name: &str) -> u64 {
        self.header.as_ref().map(|h| h.element_count(name)).unwrap_or(0)
    }

    /// Looks up a property definition for modification. Nothing is changed on
    /// error.
    fn property_mut(&mut self, element: &str, property: &str) -> Result<&mut PropertyDef, Error> {
        if self.data_read {
            return Err(Error::DataAlreadyRead);
        }

        let header = self.header.as_mut().ok_or(Error::HeaderNotRead)?;
        let elem = header.element_mut(element)
            .ok_or_else(|| Error::UnknownElement(element.to_string()))?;
        let idx = elem.prop_pos(property).ok_or_else(|| Error::UnknownProperty {
            element: elem.name.clone(),
            property: property.to_string(),
        })?;

        Ok(&mut elem.property_defs[idx])
    }

    /// The values of the given property are still parsed, but not stored.
    /// The property doesn't take any space in the packed record.
    pub fn set_ignore_property(&mut self, element: &str, property: &str) -> Result<(), Error> {
        let prop = self.property_mut(element, property)?;
        prop.projection = Projection::Ignored;
        trace!("ignoring property '{}' of '{}'", property, element);
        Ok(())
    }

    /// Converts the values of the given property to `ty`, keeping the
    /// automatic placement. For lists, `ty` is the item type.
    pub fn set_property_type(
        &mut self,
        element: &str,
        property: &str,
        ty: ScalarType,
    ) -> Result<(), Error> {
        if !ty.is_valid() {
            return Err(invalid_destination(element, property));
        }

        let prop = self.property_mut(element, property)?;
        prop.projection = Projection::Auto(ty);
        trace!("property '{}' of '{}' is stored as {}", property, element, ty);
        Ok(())
    }

    /// Converts the values of the given property to `ty` and writes them at
    /// byte `offset` of the packed record. Such properties are skipped when
    /// placing the others automatically; overlaps are not checked.
    pub fn set_destination_property(
        &mut self,
        element: &str,
        property: &str,
        ty: ScalarType,
        offset: u32,
    ) -> Result<(), Error> {
        if !ty.is_valid() {
            return Err(invalid_destination(element, property));
        }

        let prop = self.property_mut(element, property)?;
        prop.projection = Projection::Fixed { ty, offset: RawOffset(offset) };
        trace!("property '{}' of '{}' is stored as {} at {}", property, element, ty, offset);
        Ok(())
    }

    /// Computes the packed record layouts of all element groups with the
    /// current projections.
    pub fn layouts(&self) -> Result<Vec<ElementLayout>, Error> {
        let header = self.header.as_ref().ok_or(Error::HeaderNotRead)?;
        let layouts = header.elements.iter()
            .enumerate()
            .map(|(i, def)| ElementLayout::new(i, def))
            .collect();

        Ok(layouts)
    }

    /// Decodes the body and passes every record to the handlers that claimed
    /// its element group.
    ///
    /// First, all handlers are set up with every element layout (in header
    /// order). Then each element group is decoded completely before its
    /// records are dispatched. Errors abort the whole operation; the body
    /// can't be read a second time.
    pub fn read_data(&mut self, handlers: &mut [&mut dyn Handler]) -> Result<(), Error> {
        if self.data_read {
            return Err(Error::DataAlreadyRead);
        }
        let layouts = self.layouts()?;
        let format = self.format().unwrap_or_default();
        self.data_read = true;

        let claims = layouts.iter().map(|layout| {
            handlers.iter_mut()
                .enumerate()
                .filter_map(|(i, h)| if h.setup(layout) { Some(i) } else { None })
                .collect::<SmallVec<[usize; 4]>>()
        }).collect::<Vec<_>>();

        for (layout, claimed) in layouts.iter().zip(&claims) {
            trace!("element '{}' claimed by handlers {:?}", layout.name, claimed);

            let data = decode_element(&mut self.reader, &self.alloc, format, layout)?;
            if claimed.is_empty() {
                continue;
            }

            for record in data.records(layout) {
                for &i in claimed {
                    handlers[i].read(&record)?;
                }
            }
        }

        debug!("finished reading PLY body ({} element groups)", layouts.len());
        Ok(())
    }
}

fn invalid_destination(element: &str, property: &str) -> Error {
    Error::InvalidDestination {
        element: element.to_string(),
        property: property.to_string(),
    }
}
