//! Typed access to packed records.
//!
//! All conversions between raw record bytes and numbers happen in this
//! module. Records are stored in native endianness.

use byteorder::{ByteOrder, NativeEndian};
use num_traits::AsPrimitive;
use smallvec::SmallVec;

use super::{
    layout::{ElementLayout, PropIndex, RawOffset, LIST_POINTER_LEN},
    ty::{PropertyType, ScalarType},
};


/// A single numeric value, as parsed from the file or read from a record.
///
/// Integers are widened to 64 bit, floats to `f64`. Converting into a concrete
/// type uses the semantics of `as` casts (truncating and saturating).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Value {
    /// Converts the value to `T` like an `as` cast would.
    pub fn cast<T>(self) -> T
    where
        T: Copy + 'static,
        i64: AsPrimitive<T>,
        u64: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        match self {
            Value::Int(v) => v.as_(),
            Value::UInt(v) => v.as_(),
            Value::Float(v) => v.as_(),
        }
    }

    /// Reads a value of type `ty` from the start of `buf`. Returns `None` if
    /// `ty` is `Invalid` or `buf` is too short.
    pub fn read(ty: ScalarType, buf: &[u8]) -> Option<Value> {
        if !ty.is_valid() || buf.len() < ty.len() {
            return None;
        }

        let v = match ty {
            ScalarType::Int8 => Value::Int((buf[0] as i8).into()),
            ScalarType::UInt8 => Value::UInt(buf[0].into()),
            ScalarType::Int16 => Value::Int(NativeEndian::read_i16(buf).into()),
            ScalarType::UInt16 => Value::UInt(NativeEndian::read_u16(buf).into()),
            ScalarType::Int32 => Value::Int(NativeEndian::read_i32(buf).into()),
            ScalarType::UInt32 => Value::UInt(NativeEndian::read_u32(buf).into()),
            ScalarType::Float32 => Value::Float(NativeEndian::read_f32(buf).into()),
            ScalarType::Float64 => Value::Float(NativeEndian::read_f64(buf)),
            ScalarType::Invalid => return None,
        };

        Some(v)
    }

    /// Converts the value to `ty` and writes it to the start of `out`.
    ///
    /// Panics if `out` is shorter than `ty.len()`. Writing `Invalid` does
    /// nothing.
    pub fn write(self, ty: ScalarType, out: &mut [u8]) {
        match ty {
            ScalarType::Int8 => out[0] = self.cast::<i8>() as u8,
            ScalarType::UInt8 => out[0] = self.cast::<u8>(),
            ScalarType::Int16 => NativeEndian::write_i16(out, self.cast()),
            ScalarType::UInt16 => NativeEndian::write_u16(out, self.cast()),
            ScalarType::Int32 => NativeEndian::write_i32(out, self.cast()),
            ScalarType::UInt32 => NativeEndian::write_u32(out, self.cast()),
            ScalarType::Float32 => NativeEndian::write_f32(out, self.cast()),
            ScalarType::Float64 => NativeEndian::write_f64(out, self.cast()),
            ScalarType::Invalid => {}
        }
    }
}


/// A view of one packed record together with the layout of its element.
///
/// This is what handlers get for each element instance.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    layout: &'a ElementLayout,
    index: u64,
    data: &'a [u8],
    lists: &'a [u8],
}

impl<'a> Record<'a> {
    /// `data` is the packed record, `lists` the list pool of the whole
    /// element group.
    pub fn new(layout: &'a ElementLayout, index: u64, data: &'a [u8], lists: &'a [u8]) -> Self {
        Self { layout, index, data, lists }
    }

    pub fn layout(&self) -> &'a ElementLayout {
        self.layout
    }

    /// Index of this instance inside its element group.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The packed bytes of this record.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Reads a value of type `ty` at an arbitrary byte offset.
    pub fn read_at(&self, ty: ScalarType, offset: RawOffset) -> Option<Value> {
        Value::read(ty, self.data.get(offset.as_usize()..)?)
    }

    /// Returns the value of the scalar property `idx`, or `None` if it is
    /// ignored or a list.
    pub fn get(&self, idx: PropIndex) -> Option<Value> {
        let target = self.layout.target(idx)?;
        match target.ty {
            PropertyType::Scalar(ty) => self.read_at(ty, target.offset),
            PropertyType::List { .. } => None,
        }
    }

    /// Like [`Record::get`], but converts the value to `T`.
    pub fn get_as<T>(&self, idx: PropIndex) -> Option<T>
    where
        T: Copy + 'static,
        i64: AsPrimitive<T>,
        u64: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        self.get(idx).map(Value::cast)
    }

    /// Returns the list stored in property `idx`, or `None` if it is ignored
    /// or a scalar.
    pub fn list(&self, idx: PropIndex) -> Option<ListView<'a>> {
        let target = self.layout.target(idx)?;
        let (len_type, scalar_type) = match target.ty {
            PropertyType::Scalar(_) => return None,
            PropertyType::List { len_type, scalar_type } => (len_type, scalar_type),
        };

        let len = self.read_at(len_type, target.offset)?.cast::<u32>();
        let ptr_offset = target.offset.as_usize() + len_type.len();
        let ptr_bytes = self.data.get(ptr_offset..ptr_offset + LIST_POINTER_LEN)?;
        let start = NativeEndian::read_u32(ptr_bytes) as usize;
        let end = start.checked_add(len as usize * scalar_type.len())?;

        Some(ListView {
            len,
            ty: scalar_type,
            items: self.lists.get(start..end)?,
        })
    }
}

/// A list property of a record. Items are stored in their destination type.
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    len: u32,
    ty: ScalarType,
    items: &'a [u8],
}

impl<'a> ListView<'a> {
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.ty
    }

    /// Returns the item at `i` or `None` if `i` is out of bounds.
    pub fn get(&self, i: u32) -> Option<Value> {
        if i >= self.len {
            return None;
        }
        Value::read(self.ty, &self.items[i as usize * self.ty.len()..])
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + 'a {
        let ty = self.ty;
        self.items.chunks_exact(ty.len().max(1)).filter_map(move |chunk| Value::read(ty, chunk))
    }

    /// Collects all items converted to `T`.
    pub fn to_vec<T>(&self) -> SmallVec<[T; 4]>
    where
        T: Copy + 'static,
        i64: AsPrimitive<T>,
        u64: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        self.iter().map(Value::cast).collect()
    }
}
