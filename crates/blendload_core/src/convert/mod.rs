mod arena;
mod cache;
mod options;
mod policy;
mod primitive;
mod registry;
mod session;
mod walk;

/// Object storage and links.
pub use arena::{AnyHandle, Arena, Handle};
/// Session configuration and counters.
pub use options::{ConvertOptions, Statistics};
/// Per-field error policy and recovered-fault records.
pub use policy::{ConvertWarning, ErrorPolicy};
/// Primitive encodings and scalar destinations.
pub use primitive::{Encoding, Scalar, Stored};
/// Conversion dispatch table.
pub use registry::{Convert, Converter, ConverterRegistry, PopulateFn};
/// Conversion session and its results.
pub use session::{Session, SessionOutput};
/// Iterative forward-list traversal.
pub use walk::{ChainNode, walk_chain};
