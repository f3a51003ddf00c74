//! Schema-driven loader for Blender `.blend` files.
//!
//! The [`blend`] layer reads the container and its embedded DNA schema, the
//! [`convert`] engine turns raw blocks into a typed object graph, and
//! [`scene`] defines the domain objects populated from a file.

/// Container parsing: header, blocks, DNA, and address lookup.
pub mod blend;
/// Field access, pointer resolution, and the identity-cached object arena.
pub mod convert;
/// Scene-level domain objects and their population routines.
pub mod scene;
