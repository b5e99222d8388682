//! Schema-driven reader for PLY files.
//!
//! The header of a PLY file is parsed into a schema of element groups and
//! typed properties. The caller can then decide, per property, whether and
//! where its values should be stored, and the body (ASCII or binary) is
//! decoded into compact records. Consumers implement [`ply::Handler`] and get
//! offered all records of the element groups they claim.
//!
//! See the [`ply`] module for an example.

#[macro_use]
mod error;

#[cfg(test)]
#[macro_use]
mod test_utils;

pub mod memory;
pub mod parse;
pub mod ply;

pub use self::{
    error::Error,
    memory::{Allocator, Budget, Heap},
    ply::{Config, Ply},
};
