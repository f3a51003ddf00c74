use std::any::Any;
use std::collections::HashMap;

use crate::blend::{BlendError, Result, Structure};
use crate::convert::Session;

/// A Rust type populated from one DNA structure.
pub trait Convert: Default + 'static {
	/// DNA structure name this type is read from.
	const DNA_NAME: &'static str;

	/// Populate `self` from the structure instance at the session cursor.
	///
	/// The cursor sits at the first byte of the instance on entry and must be
	/// back there on return.
	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()>;
}

/// Field population routine for a type-erased object.
pub type PopulateFn = fn(&mut Session<'_>, &Structure, &mut dyn Any) -> Result<()>;

/// Allocator and populator pair for one DNA structure.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
	/// Create an empty object.
	pub allocate: fn() -> Box<dyn Any>,
	/// Fill an object allocated by `allocate`.
	pub populate: PopulateFn,
}

impl Converter {
	/// Converter backed by `T`'s [`Convert`] impl.
	pub fn of<T: Convert>() -> Self {
		Self {
			allocate: allocate::<T>,
			populate: populate::<T>,
		}
	}
}

fn allocate<T: Convert>() -> Box<dyn Any> {
	Box::new(T::default())
}

fn populate<T: Convert>(session: &mut Session<'_>, structure: &Structure, out: &mut dyn Any) -> Result<()> {
	match out.downcast_mut::<T>() {
		Some(out) => out.convert(session, structure),
		None => Err(BlendError::TypeMismatch {
			expected: T::DNA_NAME.to_owned(),
			got: format!("foreign object for {}", structure.name()),
		}),
	}
}

/// Dispatch table from DNA structure name to converter.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
	by_name: HashMap<&'static str, Converter>,
}

impl ConverterRegistry {
	/// Empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `T` under its DNA name, replacing any previous entry.
	pub fn register<T: Convert>(&mut self) -> &mut Self {
		self.insert(T::DNA_NAME, Converter::of::<T>())
	}

	/// Register a converter under an explicit DNA name.
	pub fn insert(&mut self, dna_name: &'static str, converter: Converter) -> &mut Self {
		if self.by_name.insert(dna_name, converter).is_some() {
			tracing::debug!(structure = dna_name, "converter replaced");
		}
		self
	}

	/// Converter registered for `dna_name`.
	pub fn get(&self, dna_name: &str) -> Option<Converter> {
		self.by_name.get(dna_name).copied()
	}

	/// Whether `dna_name` has a converter.
	pub fn contains(&self, dna_name: &str) -> bool {
		self.by_name.contains_key(dna_name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.by_name.keys().copied().collect();
		names.sort_unstable();
		names
	}

	/// Number of registered converters.
	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	/// Whether no converter is registered.
	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}
