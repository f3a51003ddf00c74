mod bhead;
mod block;
mod bytes;
mod compression;
mod decl;
mod dna;
mod error;
mod file;
mod header;
mod pointer;

/// Parsed block header record.
pub use bhead::BHead;
/// Block container and iterator types.
pub use block::{Block, BlockIter};
/// Repositionable binary reader.
pub use bytes::Cursor;
/// Compression detection result.
pub use compression::Compression;
/// SDNA schema representation and resolved layouts.
pub use dna::{Dna, DnaField, DnaStruct, Field, Structure};
/// Error and result aliases.
pub use error::{BlendError, Result};
/// File abstraction and block statistics.
pub use file::{BlendFile, BlockStats};
/// File header representation.
pub use header::{BlendHeader, Endianness};
/// Address-range block index.
pub use pointer::{BlockIndex, FileBlock};
