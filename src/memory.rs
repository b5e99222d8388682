//! Memory for decoded records.
//!
//! All buffers of a session (the packed records of every element group and
//! their list pools) come from a `bumpalo` arena owned by the allocator.
//! Buffers are never handed back individually; they live until the
//! allocator is reset or dropped.

use std::{alloc::Layout, cell::Cell, ptr, slice};

use bumpalo::Bump;
use log::debug;

use crate::error::Error;


/// Supplies zero-initialized buffers that live as long as the allocator.
pub trait Allocator {
    /// Returns a buffer of exactly `size` bytes, all zero.
    fn alloc(&self, size: usize) -> Result<&mut [u8], Error>;
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn alloc(&self, size: usize) -> Result<&mut [u8], Error> {
        (**self).alloc(size)
    }
}

/// Allocates `size` zeroed bytes aligned to `align` from `arena`. Returns
/// `None` if the layout is invalid or the arena can't grow.
fn alloc_zeroed(arena: &Bump, size: usize, align: usize) -> Option<&mut [u8]> {
    if size == 0 {
        return Some(&mut []);
    }

    let layout = Layout::from_size_align(size, align).ok()?;
    let ptr = arena.try_alloc_layout(layout).ok()?.as_ptr();

    // SAFETY: `ptr` points to `size` bytes freshly allocated in `arena` and
    // not handed out before. They are initialized here, and the returned
    // slice borrows `arena`, so it can't outlive the chunk.
    unsafe {
        ptr::write_bytes(ptr, 0, size);
        Some(slice::from_raw_parts_mut(ptr, size))
    }
}


/// An unbounded arena on the global heap. Fails gracefully instead of
/// aborting if the system can't serve a request.
#[derive(Debug, Default)]
pub struct Heap {
    arena: Bump,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes the arena currently holds from the system.
    pub fn allocated_bytes(&self) -> usize {
        self.arena.allocated_bytes()
    }

    /// Frees all buffers at once.
    pub fn reset(&mut self) {
        self.arena.reset();
    }
}

impl Allocator for Heap {
    fn alloc(&self, size: usize) -> Result<&mut [u8], Error> {
        alloc_zeroed(&self.arena, size, Budget::DEFAULT_ALIGN)
            .ok_or(Error::OutOfMemory { requested: size, available: 0 })
    }
}


/// An arena over a fixed byte budget.
///
/// Every request is rounded up to the alignment and counted against the
/// capacity; the memory is only given back with [`Budget::reset`]. Useful to
/// bound the memory a (potentially hostile) file can make the reader
/// allocate.
#[derive(Debug)]
pub struct Budget {
    arena: Bump,
    capacity: usize,
    used: Cell<usize>,
    align: usize,
}

impl Budget {
    pub const DEFAULT_ALIGN: usize = 16;

    pub fn new(capacity: usize) -> Self {
        Self::with_alignment(capacity, Self::DEFAULT_ALIGN)
    }

    /// `align` is rounded up to the next power of two.
    pub fn with_alignment(capacity: usize, align: usize) -> Self {
        Self {
            arena: Bump::new(),
            capacity,
            used: Cell::new(0),
            align: align.max(1).next_power_of_two(),
        }
    }

    pub fn used(&self) -> usize {
        self.used.get()
    }

    pub fn available(&self) -> usize {
        self.capacity - self.used.get()
    }

    /// Frees all buffers and makes the whole budget available again.
    pub fn reset(&mut self) {
        self.arena.reset();
        self.used.set(0);
    }

    fn round_up(&self, size: usize) -> Option<usize> {
        let mask = self.align - 1;
        size.checked_add(mask).map(|s| s & !mask)
    }
}

impl Allocator for Budget {
    fn alloc(&self, size: usize) -> Result<&mut [u8], Error> {
        let available = self.available();
        let out_of_memory = Error::OutOfMemory { requested: size, available };

        let rounded = match self.round_up(size) {
            Some(rounded) if rounded <= available => rounded,
            _ => return Err(out_of_memory),
        };

        let buf = alloc_zeroed(&self.arena, size, self.align).ok_or(out_of_memory)?;
        self.used.set(self.used.get() + rounded);
        debug!("allocated {} bytes ({} of {} used)", size, self.used.get(), self.capacity);

        Ok(buf)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_zeroed() {
        let heap = Heap::new();
        let a = heap.alloc(24).unwrap();
        a.copy_from_slice(&[0xff; 24]);
        let b = heap.alloc(24).unwrap();
        assert_eq!(b.len(), 24);
        assert!(b.iter().all(|&x| x == 0));
        assert!(a.iter().all(|&x| x == 0xff));
        assert!(heap.allocated_bytes() >= 48);
    }

    #[test]
    fn buffers_are_aligned() {
        let budget = Budget::new(256);
        for size in &[1, 3, 17, 40] {
            let buf = budget.alloc(*size).unwrap();
            assert_eq!(buf.as_ptr() as usize % Budget::DEFAULT_ALIGN, 0);
        }
    }

    #[test]
    fn budget_rounds_up() {
        let budget = Budget::new(64);
        assert_eq!(budget.alloc(1).unwrap().len(), 1);
        assert_eq!(budget.used(), 16);
        budget.alloc(17).unwrap();
        assert_eq!(budget.used(), 48);
        assert!(budget.alloc(0).unwrap().is_empty());
        assert_eq!(budget.used(), 48);
    }

    #[test]
    fn budget_exhausted() {
        let mut budget = Budget::with_alignment(10, 3);
        assert_eq!(budget.align, 4);
        budget.alloc(8).unwrap();
        match budget.alloc(3) {
            Err(Error::OutOfMemory { requested: 3, available: 2 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        budget.reset();
        assert_eq!(budget.available(), 10);
        budget.alloc(3).unwrap();
    }

    #[test]
    fn buffers_outlive_each_other() {
        let budget = Budget::new(64);
        let a = budget.alloc(4).unwrap();
        let b = budget.alloc(4).unwrap();
        a.copy_from_slice(&[1, 2, 3, 4]);
        b.copy_from_slice(&[5, 6, 7, 8]);
        assert_eq!(a, &[1, 2, 3, 4]);
        assert_eq!(b, &[5, 6, 7, 8]);
    }

    #[test]
    fn huge_request_fails() {
        assert!(Budget::new(1024).alloc(usize::max_value()).is_err());
        assert!(Heap::new().alloc(usize::max_value()).is_err());
    }
}
