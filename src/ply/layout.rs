//! Where each property lands inside the packed record of its element.
//!
//! Before the body is read, the caller can change the projection of every
//! property: ignore it, convert it to another type or put it at a fixed byte
//! offset. When reading starts, [`ElementLayout::new`] turns the projections of
//! one element into final byte offsets and the record length.

use std::{cmp::max, ops};

use derive_more::From;

use super::{
    header::ElementDef,
    ty::{PropertyType, ScalarType},
};


/// Number of bytes of the slot that follows a list's length inside the
/// record. It stores the byte offset of the list's items in the list pool of
/// the element (native endian `u32`).
pub const LIST_POINTER_LEN: usize = 4;

/// The maximum number of properties per element. Limited by the size of
/// [`PropIndex`].
pub const MAX_PROPERTIES: usize = 256;


/// A byte offset into the packed record of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, From)]
pub struct RawOffset(pub u32);

impl RawOffset {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Index of a specific property in the ordered list of properties of one
/// element group. Can be used to index a [`PropVec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
pub struct PropIndex(pub u8);

impl PropIndex {
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// A vector that holds data for each property. Can be indexed by
/// [`PropIndex`].
///
/// This is simply a wrapper around a `Vec` to use strong typing.
#[derive(Debug, Clone, From)]
pub struct PropVec<T>(Vec<T>);

impl<T> PropVec<T> {
    pub fn new() -> Self {
        PropVec(Vec::new())
    }

    /// Iterates over all entries together with their index.
    pub fn indexed(&self) -> impl Iterator<Item = (PropIndex, &T)> {
        self.0.iter().enumerate().map(|(i, t)| (PropIndex(i as u8), t))
    }
}

impl<T> ops::Index<PropIndex> for PropVec<T> {
    type Output = T;
    fn index(&self, idx: PropIndex) -> &Self::Output {
        &self.0[idx.as_usize()]
    }
}

impl<T> ops::IndexMut<PropIndex> for PropVec<T> {
    fn index_mut(&mut self, idx: PropIndex) -> &mut Self::Output {
        &mut self.0[idx.as_usize()]
    }
}

impl<T> ops::Deref for PropVec<T> {
    type Target = Vec<T>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> ops::DerefMut for PropVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}


/// What should happen with the values of one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Convert to the given type, place right after the previous packed
    /// property.
    Auto(ScalarType),

    /// Convert to the given type, place at the given offset. Overlaps with
    /// other properties are not checked.
    Fixed {
        ty: ScalarType,
        offset: RawOffset,
    },

    /// Parse, but don't store anywhere.
    Ignored,
}

/// The final placement of a property inside the packed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// The destination type. For lists, the length keeps its declared type
    /// and only the item type is converted.
    pub ty: PropertyType,
    pub offset: RawOffset,
}

impl Target {
    /// Number of bytes this property occupies in the record. For lists that's
    /// the length plus the pointer slot; the items live in the list pool.
    pub fn len(&self) -> usize {
        match self.ty {
            PropertyType::Scalar(ty) => ty.len(),
            PropertyType::List { len_type, .. } => len_type.len() + LIST_POINTER_LEN,
        }
    }

    pub fn end(&self) -> usize {
        self.offset.as_usize() + self.len()
    }
}

/// Layout information about one property.
#[derive(Debug, Clone)]
pub struct PropertyLayout {
    pub name: String,

    /// The type declared in the file, used for parsing.
    pub declared: PropertyType,

    /// `None` if the property is ignored.
    pub target: Option<Target>,
}

/// The packed record layout of one element group. This is what handlers
/// inspect during setup.
#[derive(Debug, Clone)]
pub struct ElementLayout {
    /// Position of the element group in the header.
    pub index: usize,
    pub name: String,
    pub count: u64,

    /// Length of one packed record in bytes.
    pub record_len: usize,
    pub properties: PropVec<PropertyLayout>,
}

impl ElementLayout {
    /// Computes the final layout for the element `def`.
    ///
    /// Auto-packed properties are placed one after another in declaration
    /// order, ignoring properties with fixed offsets. The record length is
    /// the end of the property reaching furthest, so fixed offsets always fit.
    pub fn new(index: usize, def: &ElementDef) -> Self {
        let mut cursor = 0;
        let mut record_len = 0;

        let properties = def.property_defs.iter().map(|prop| {
            let target = match prop.projection {
                Projection::Ignored => None,
                Projection::Auto(ty) => {
                    let target = Target {
                        ty: prop.ty.with_scalar_type(ty),
                        offset: RawOffset(cursor as u32),
                    };
                    cursor += target.len();
                    Some(target)
                }
                Projection::Fixed { ty, offset } => Some(Target {
                    ty: prop.ty.with_scalar_type(ty),
                    offset,
                }),
            };

            if let Some(target) = &target {
                record_len = max(record_len, target.end());
            }

            PropertyLayout {
                name: prop.name.clone(),
                declared: prop.ty,
                target,
            }
        }).collect::<Vec<_>>();

        Self {
            index,
            name: def.name.clone(),
            count: def.count,
            record_len,
            properties: properties.into(),
        }
    }

    /// Finds a property by name (ignoring ASCII case).
    pub fn prop_pos(&self, name: &str) -> Option<PropIndex> {
        self.properties.indexed()
            .find(|(_, p)| p.name.eq_ignore_ascii_case(name))
            .map(|(idx, _)| idx)
    }

    /// Returns the placement of the given property or `None` if it's ignored.
    pub fn target(&self, idx: PropIndex) -> Option<Target> {
        self.properties.get(idx.as_usize()).and_then(|p| p.target)
    }

    /// Returns `true` if the element's name matches one of `names` (ignoring
    /// ASCII case).
    pub fn is_named(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.name.eq_ignore_ascii_case(n))
    }
}
