/// SDNA inspection command.
pub mod dna;
/// File-level information command.
pub mod info;
/// Scene conversion command.
pub mod scene;
/// Shared formatting helpers.
pub(crate) mod util;
