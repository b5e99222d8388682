//! Decoding the PLY body into packed records.

use std::{cmp::max, convert::TryFrom};

use byteorder::{ByteOrder, NativeEndian};
use log::{debug, trace};

use crate::{
    error::Error,
    memory::Allocator,
    parse::{
        Span, read_token,
        buf::LineReader,
        num::{parse_float, parse_signed, parse_unsigned},
    },
};
use super::{
    endian::Swap,
    header::Format,
    layout::{ElementLayout, PropertyLayout, Target},
    record::{Record, Value},
    ty::{PropertyType, ScalarType},
};


/// All decoded records of one element group. The bytes live in the
/// allocator the element was decoded with.
#[derive(Debug, Clone, Copy)]
pub struct ElementData<'a> {
    records: &'a [u8],
    lists: &'a [u8],
    record_len: usize,
    count: u64,
}

impl<'a> ElementData<'a> {
    /// Number of records.
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The list pool of this group: all list items, in file order.
    pub fn lists(&self) -> &'a [u8] {
        self.lists
    }

    /// Returns the record with index `i`. Panics if `i >= self.len()`.
    pub fn record<'l>(&self, layout: &'l ElementLayout, i: u64) -> Record<'l>
    where
        'a: 'l,
    {
        assert!(i < self.count, "record index out of bounds");
        let start = i as usize * self.record_len;
        let data = &self.records[start..start + self.record_len];
        Record::new(layout, i, data, self.lists)
    }

    pub fn records<'l>(&self, layout: &'l ElementLayout) -> impl Iterator<Item = Record<'l>>
    where
        'a: 'l,
    {
        let data: ElementData<'l> = *self;
        (0..data.count).map(move |i| data.record(layout, i))
    }
}


/// Smallest chunk requested for a list pool.
const MIN_POOL_CHUNK: usize = 64;

/// Growable storage for the list items of one element group.
///
/// Every chunk comes from the allocator. When a chunk is full, a chunk of
/// twice the size is requested and the items are moved over.
struct ListPool<'a, A: ?Sized> {
    alloc: &'a A,
    buf: &'a mut [u8],
    len: usize,
}

impl<'a, A: Allocator + ?Sized> ListPool<'a, A> {
    fn new(alloc: &'a A) -> Self {
        Self { alloc, buf: &mut [], len: 0 }
    }

    fn len(&self) -> usize {
        self.len
    }

    /// Appends `n` zero bytes and returns them.
    fn push(&mut self, n: usize) -> Result<&mut [u8], Error> {
        let end = self.len.saturating_add(n);
        if end > self.buf.len() {
            let capacity = max(end, self.buf.len().saturating_mul(2)).max(MIN_POOL_CHUNK);
            let alloc = self.alloc;
            let chunk = alloc.alloc(capacity)?;
            chunk[..self.len].copy_from_slice(&self.buf[..self.len]);
            self.buf = chunk;
        }

        let start = self.len;
        self.len = end;
        Ok(&mut self.buf[start..end])
    }

    fn into_slice(self) -> &'a [u8] {
        let buf: &'a [u8] = self.buf;
        &buf[..self.len]
    }
}


/// Reads all instances of the element group described by `layout`.
///
/// One buffer for all records is requested from `alloc` up front, list
/// items go to a pool that grows through `alloc` as well. If the input ends
/// before `layout.count` instances were read, an error is returned.
pub fn decode_element<'a, A: Allocator + ?Sized>(
    reader: &mut impl LineReader,
    alloc: &'a A,
    format: Format,
    layout: &ElementLayout,
) -> Result<ElementData<'a>, Error> {
    let size = usize::try_from(layout.count)
        .ok()
        .and_then(|count| count.checked_mul(layout.record_len))
        .ok_or_else(|| Error::RecordTooLarge(layout.name.clone()))?;

    debug!(
        "decoding {} '{}' elements ({} bytes per record)",
        layout.count,
        layout.name,
        layout.record_len,
    );

    let records = alloc.alloc(size)?;
    let mut lists = ListPool::new(alloc);
    let swap = format.needs_swap();

    // Binary instances without properties occupy no bytes at all, so there is
    // nothing to read, no matter how large the count is.
    let count = if format != Format::Ascii && layout.properties.is_empty() {
        0
    } else {
        layout.count
    };

    let len = layout.record_len;
    for i in 0..count {
        let start = i as usize * len;
        let record = &mut records[start..start + len];
        match format {
            Format::Ascii => decode_ascii_instance(reader, layout, i, record, &mut lists)?,
            _ => decode_binary_instance(reader, layout, i, swap, record, &mut lists)?,
        }
    }

    let records: &'a [u8] = records;
    Ok(ElementData {
        records,
        lists: lists.into_slice(),
        record_len: len,
        count: layout.count,
    })
}

fn truncated(layout: &ElementLayout, i: u64) -> Error {
    Error::UnexpectedEof(format!(
        "element '{}' (got {} of {} instances)",
        layout.name,
        i,
        layout.count,
    ))
}

/// Checks that a list length read from the file is a non-negative value
/// that fits its declared length type.
fn list_len(
    len: Value,
    len_type: ScalarType,
    layout: &ElementLayout,
    prop: &PropertyLayout,
    i: u64,
) -> Result<u32, Error> {
    let max_len = match len_type {
        ScalarType::Int8 => i8::max_value() as u64,
        ScalarType::UInt8 => u8::max_value().into(),
        ScalarType::Int16 => i16::max_value() as u64,
        ScalarType::UInt16 => u16::max_value().into(),
        ScalarType::Int32 => i32::max_value() as u64,
        _ => u32::max_value().into(),
    };

    match len {
        Value::Int(v) if v >= 0 && v as u64 <= max_len => Ok(v as u32),
        Value::UInt(v) if v <= max_len => Ok(v as u32),
        _ => Err(Error::InvalidListLength {
            element: layout.name.clone(),
            instance: i,
            property: prop.name.clone(),
            len: match len {
                Value::Int(v) => v.to_string(),
                Value::UInt(v) => v.to_string(),
                Value::Float(v) => v.to_string(),
            },
            len_type: len_type.ply_type_name(),
        }),
    }
}

/// Writes the length of a list and the position of its first item in the
/// list pool into the record.
fn start_list(
    target: &Target,
    len: u32,
    record: &mut [u8],
    pool_len: usize,
    layout: &ElementLayout,
) -> Result<(), Error> {
    let len_type = target.ty.len_type().unwrap_or(ScalarType::UInt32);
    let offset = target.offset.as_usize();
    let pool_pos = u32::try_from(pool_len)
        .map_err(|_| Error::RecordTooLarge(layout.name.clone()))?;

    Value::UInt(len.into()).write(len_type, &mut record[offset..]);
    NativeEndian::write_u32(&mut record[offset + len_type.len()..], pool_pos);
    Ok(())
}

/// Appends one list item (converted to the target item type) to the pool.
fn push_item<A: Allocator + ?Sized>(
    target: &Target,
    v: Value,
    lists: &mut ListPool<'_, A>,
) -> Result<(), Error> {
    let ty = target.ty.scalar_type();
    v.write(ty, lists.push(ty.len())?);
    Ok(())
}

fn store_scalar(target: &Option<Target>, v: Value, record: &mut [u8]) {
    if let Some(target) = target {
        v.write(target.ty.scalar_type(), &mut record[target.offset.as_usize()..]);
    }
}


// ===========================================================================
// ===== ASCII
// ===========================================================================

/// Parses an ASCII token according to the declared type.
fn parse_ascii(token: Span<'_>, ty: ScalarType) -> Value {
    let bytes = token.as_bytes();
    match ty {
        ScalarType::Float32 => Value::Float(parse_float::<f32>(bytes).into()),
        ScalarType::Float64 => Value::Float(parse_float::<f64>(bytes)),
        _ if ty.is_signed_integer() => Value::Int(parse_signed(bytes)),
        _ => Value::UInt(parse_unsigned(bytes)),
    }
}

fn decode_ascii_instance<A: Allocator + ?Sized>(
    reader: &mut impl LineReader,
    layout: &ElementLayout,
    i: u64,
    record: &mut [u8],
    lists: &mut ListPool<'_, A>,
) -> Result<(), Error> {
    // Blank lines between instances are skipped.
    loop {
        match reader.read_line() {
            None => return Err(truncated(layout, i)),
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => return decode_ascii_line(line, layout, i, record, lists),
        }
    }
}

fn decode_ascii_line<A: Allocator + ?Sized>(
    mut line: Span<'_>,
    layout: &ElementLayout,
    i: u64,
    record: &mut [u8],
    lists: &mut ListPool<'_, A>,
) -> Result<(), Error> {
    for prop in layout.properties.iter() {
        let mut next_value = || {
            let token = read_token(&mut line);
            if token.is_empty() {
                Err(missing_value(layout, prop, i))
            } else {
                Ok(token)
            }
        };

        match prop.declared {
            PropertyType::Scalar(ty) => {
                let v = parse_ascii(next_value()?, ty);
                store_scalar(&prop.target, v, record);
            }
            PropertyType::List { len_type, scalar_type } => {
                let len = parse_ascii(next_value()?, len_type);
                let len = list_len(len, len_type, layout, prop, i)?;
                if let Some(target) = &prop.target {
                    start_list(target, len, record, lists.len(), layout)?;
                }

                for _ in 0..len {
                    let v = parse_ascii(next_value()?, scalar_type);
                    if let Some(target) = &prop.target {
                        push_item(target, v, lists)?;
                    }
                }
            }
        }
    }

    if !line.trim().is_empty() {
        trace!("ignoring trailing data {:?} in '{}' #{}", line.trim(), layout.name, i);
    }

    Ok(())
}

fn missing_value(layout: &ElementLayout, prop: &PropertyLayout, i: u64) -> Error {
    Error::MissingValue {
        element: layout.name.clone(),
        instance: i,
        property: prop.name.clone(),
    }
}


// ===========================================================================
// ===== Binary
// ===========================================================================

/// Decodes one binary value of type `ty` from `buf` (which has exactly
/// `ty.len()` bytes), byte-swapping if requested.
fn parse_binary(buf: &[u8], ty: ScalarType, swap: bool) -> Value {
    match ty {
        ScalarType::Int8 => Value::Int((buf[0] as i8).into()),
        ScalarType::UInt8 => Value::UInt(buf[0].into()),
        ScalarType::Int16 => Value::Int(NativeEndian::read_i16(buf).swap_if(swap).into()),
        ScalarType::UInt16 => Value::UInt(NativeEndian::read_u16(buf).swap_if(swap).into()),
        ScalarType::Int32 => Value::Int(NativeEndian::read_i32(buf).swap_if(swap).into()),
        ScalarType::UInt32 => Value::UInt(NativeEndian::read_u32(buf).swap_if(swap).into()),
        ScalarType::Float32 => Value::Float(NativeEndian::read_f32(buf).swap_if(swap).into()),
        ScalarType::Float64 => Value::Float(NativeEndian::read_f64(buf).swap_if(swap)),
        ScalarType::Invalid => Value::UInt(0),
    }
}

fn read_binary(
    reader: &mut impl LineReader,
    ty: ScalarType,
    swap: bool,
    layout: &ElementLayout,
    i: u64,
) -> Result<Value, Error> {
    reader.read_data(ty.len())
        .map(|buf| parse_binary(buf, ty, swap))
        .ok_or_else(|| truncated(layout, i))
}

fn decode_binary_instance<A: Allocator + ?Sized>(
    reader: &mut impl LineReader,
    layout: &ElementLayout,
    i: u64,
    swap: bool,
    record: &mut [u8],
    lists: &mut ListPool<'_, A>,
) -> Result<(), Error> {
    for prop in layout.properties.iter() {
        match prop.declared {
            PropertyType::Scalar(ty) => {
                let v = read_binary(reader, ty, swap, layout, i)?;
                store_scalar(&prop.target, v, record);
            }
            PropertyType::List { len_type, scalar_type } => {
                let len = read_binary(reader, len_type, swap, layout, i)?;
                let len = list_len(len, len_type, layout, prop, i)?;
                if let Some(target) = &prop.target {
                    start_list(target, len, record, lists.len(), layout)?;
                }

                for _ in 0..len {
                    let v = read_binary(reader, scalar_type, swap, layout, i)?;
                    if let Some(target) = &prop.target {
                        push_item(target, v, lists)?;
                    }
                }
            }
        }
    }

    Ok(())
}
