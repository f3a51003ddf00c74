use crate::blend::{BlendError, FileBlock, Result, Structure};
use crate::convert::registry::Converter;
use crate::convert::{AnyHandle, Convert, ErrorPolicy, Handle, Session};

use super::describe;

/// Outcome of resolving one raw pointer.
struct Resolution {
	index: Option<usize>,
	from_cache: bool,
}

impl Resolution {
	const NULL: Self = Self {
		index: None,
		from_cache: false,
	};
}

impl<'a> Session<'a> {
	/// Resolve a typed pointer field to a single object.
	///
	/// Returns `true` when the object came from the identity cache. A null
	/// pointer clears `out`.
	pub fn read_pointer<T: Convert>(&mut self, policy: ErrorPolicy, out: &mut Option<Handle<T>>, structure: &Structure, name: &str) -> Result<bool> {
		let result = self.scoped(|session| {
			let ptr = session.pointer_value(structure, name)?;
			session.resolve_typed::<T>(ptr, false)
		});
		self.assign(policy, structure, name, result, out, Handle::new)
	}

	/// Resolve a typed pointer field without populating the target.
	///
	/// On a fresh allocation the cursor is left at the first byte of the new
	/// object so the caller can populate it; otherwise it is restored.
	pub fn read_pointer_non_recursive<T: Convert>(
		&mut self,
		policy: ErrorPolicy,
		out: &mut Option<Handle<T>>,
		structure: &Structure,
		name: &str,
	) -> Result<bool> {
		let saved = self.cursor.pos();
		let result = self.pointer_value(structure, name).and_then(|ptr| self.resolve_typed::<T>(ptr, true));
		let fresh = matches!(result, Ok(Resolution { index: Some(_), from_cache: false }));
		if !fresh {
			self.cursor.restore(saved);
		}
		self.assign(policy, structure, name, result, out, Handle::new)
	}

	/// Resolve a polymorphic pointer field, accepting the block's own type.
	///
	/// `accept` optionally restricts the dynamic types the caller can use.
	/// A dynamic type without a registered converter yields `None` and one
	/// warning instead of an error.
	pub fn read_any_pointer(
		&mut self,
		policy: ErrorPolicy,
		out: &mut Option<AnyHandle>,
		structure: &Structure,
		name: &str,
		accept: Option<&[&str]>,
	) -> Result<bool> {
		let result = self.scoped(|session| {
			let ptr = session.pointer_value(structure, name)?;
			session.resolve_any(ptr, accept)
		});
		let result = match result {
			Err(BlendError::UnknownType { type_name }) => {
				self.stats.fields_read += 1;
				self.warn(structure.name(), name, format!("no converter for {type_name}, link dropped"));
				*out = None;
				return Ok(false);
			}
			other => other,
		};
		self.assign(policy, structure, name, result, out, AnyHandle::new)
	}

	/// Materialise every `T` from the pointed-to element to the end of its block.
	///
	/// Elements are owned by `out` and are not entered into the identity cache.
	pub fn read_pointer_vec<T: Convert>(&mut self, policy: ErrorPolicy, out: &mut Vec<T>, structure: &Structure, name: &str) -> Result<()> {
		let result = self.scoped(|session| {
			let ptr = session.pointer_value(structure, name)?;
			if ptr == 0 {
				return Ok(Vec::new());
			}
			let (block, target) = session.locate(ptr)?;
			expect_type::<T>(target)?;
			session.stats.pointers_resolved += 1;

			let size = target.size();
			let count = ((block.end() - ptr) as usize).checked_div(size).unwrap_or(0);
			let start = block.stream_offset(ptr);
			let mut items = Vec::with_capacity(count);
			for idx in 0..count {
				session.cursor.seek(start + idx * size)?;
				let mut item = T::default();
				session.nested(|session| item.convert(session, target))?;
				items.push(item);
			}
			Ok(items)
		});
		if let Some(items) = self.recover(policy, structure, name, result)? {
			*out = items;
		}
		Ok(())
	}

	/// Resolve a `**name` field: a pointer to a block of typed pointers.
	///
	/// Every pointer from the addressed slot to the end of the block is
	/// resolved; null entries stay `None`.
	pub fn read_pointer_array<T: Convert>(&mut self, policy: ErrorPolicy, out: &mut Vec<Option<Handle<T>>>, structure: &Structure, name: &str) -> Result<()> {
		let result = self.scoped(|session| {
			let ptr = session.pointer_value(structure, name)?;
			if ptr == 0 {
				return Ok(Vec::new());
			}
			let block = *session.blocks.locate(ptr)?;
			let width = session.cursor.pointer_size();
			let count = (block.end() - ptr) as usize / width;
			session.cursor.seek(block.stream_offset(ptr))?;
			let raw = (0..count).map(|_| session.cursor.read_ptr()).collect::<Result<Vec<_>>>()?;
			raw.into_iter()
				.map(|item| session.resolve_typed::<T>(item, false).map(|res| res.index.map(Handle::new)))
				.collect::<Result<Vec<_>>>()
		});
		if let Some(items) = self.recover(policy, structure, name, result)? {
			*out = items;
		}
		Ok(())
	}

	/// Resolve a `*name[N]` field: an in-structure array of typed pointers.
	///
	/// Slots past `min(declared, out.len())` are left as they were.
	pub fn read_pointer_slots<T: Convert>(&mut self, policy: ErrorPolicy, out: &mut [Option<Handle<T>>], structure: &Structure, name: &str) -> Result<()> {
		let capacity = out.len();
		let result = self.scoped(|session| {
			let field = structure.field(name)?;
			if !field.is_pointer || !field.is_array {
				return Err(BlendError::TypeMismatch {
					expected: format!("pointer array field {}.{name}", structure.name()),
					got: describe(field),
				});
			}
			session.seek_field(field)?;
			let raw = (0..field.element_count().min(capacity)).map(|_| session.cursor.read_ptr()).collect::<Result<Vec<_>>>()?;
			raw.into_iter()
				.map(|item| session.resolve_typed::<T>(item, false).map(|res| res.index.map(Handle::new)))
				.collect::<Result<Vec<_>>>()
		});
		if let Some(items) = self.recover(policy, structure, name, result)? {
			out[..items.len()].copy_from_slice(&items);
		}
		Ok(())
	}

	/// Populate an object that a non-recursive read left unpopulated.
	///
	/// The cursor must sit at the object's first byte.
	pub(crate) fn populate_handle<T: Convert, V>(&mut self, handle: Handle<T>, f: impl FnOnce(&mut Self, &mut T) -> Result<V>) -> Result<V> {
		let index = handle.index();
		let mut value = self.arena.take(index);
		let result = match value.downcast_mut::<T>() {
			Some(item) => self.nested(|session| f(session, item)),
			None => Err(BlendError::TypeMismatch {
				expected: T::DNA_NAME.to_owned(),
				got: self.arena.dna_type(handle.erase()).unwrap_or("?").to_owned(),
			}),
		};
		self.arena.restore(index, value);
		result
	}

	fn pointer_value(&mut self, structure: &Structure, name: &str) -> Result<u64> {
		let field = structure.field(name)?;
		if !field.is_pointer {
			return Err(BlendError::TypeMismatch {
				expected: format!("pointer field {}.{name}", structure.name()),
				got: describe(field),
			});
		}
		self.seek_field(field)?;
		self.cursor.read_ptr()
	}

	fn locate(&self, ptr: u64) -> Result<(FileBlock, &'a Structure)> {
		let block = *self.blocks.locate(ptr)?;
		let dna = self.dna;
		let structure = dna.structure(block.sdna_nr)?;
		Ok((block, structure))
	}

	fn resolve_typed<T: Convert>(&mut self, ptr: u64, non_recursive: bool) -> Result<Resolution> {
		if ptr == 0 {
			return Ok(Resolution::NULL);
		}
		let (block, target) = self.locate(ptr)?;
		expect_type::<T>(target)?;

		if let Some(index) = self.cached(target, ptr) {
			if !self.arena.holds::<T>(index) {
				return Err(BlendError::TypeMismatch {
					expected: T::DNA_NAME.to_owned(),
					got: format!("cached {} of another Rust type", target.name()),
				});
			}
			return Ok(Resolution {
				index: Some(index),
				from_cache: true,
			});
		}
		self.materialize(Converter::of::<T>(), block, target, ptr, non_recursive)
	}

	fn resolve_any(&mut self, ptr: u64, accept: Option<&[&str]>) -> Result<Resolution> {
		if ptr == 0 {
			return Ok(Resolution::NULL);
		}
		let (block, target) = self.locate(ptr)?;
		if let Some(accept) = accept
			&& !accept.iter().any(|name| *name == target.name())
		{
			return Err(BlendError::TypeMismatch {
				expected: accept.join(" | "),
				got: target.name().to_owned(),
			});
		}

		if let Some(index) = self.cached(target, ptr) {
			return Ok(Resolution {
				index: Some(index),
				from_cache: true,
			});
		}
		let converter = self.registry.get(target.name()).ok_or_else(|| BlendError::UnknownType {
			type_name: target.name().to_owned(),
		})?;
		self.materialize(converter, block, target, ptr, false)
	}

	fn cached(&mut self, target: &Structure, ptr: u64) -> Option<usize> {
		self.stats.pointers_resolved += 1;
		let slot = self.dna.cache_slot_of(target);
		let hit = self.cache.get(slot, ptr);
		if hit.is_some() {
			self.stats.cache_hits += 1;
			tracing::trace!(structure = target.name(), ptr = format_args!("0x{ptr:x}"), "identity cache hit");
		}
		hit
	}

	/// Allocate, cache, then populate unless `non_recursive`.
	///
	/// The cache entry is created before population so that cycles back to
	/// this address resolve to the object under construction.
	fn materialize(&mut self, converter: Converter, block: FileBlock, target: &Structure, ptr: u64, non_recursive: bool) -> Result<Resolution> {
		let index = self.arena.alloc((converter.allocate)(), target.name());
		let slot = self.dna.cache_slot_of(target);
		self.cache.insert(slot, ptr, index);
		self.stats.cached_objects += 1;
		tracing::trace!(structure = target.name(), ptr = format_args!("0x{ptr:x}"), index, "allocated");

		let saved = self.cursor.pos();
		self.cursor.seek(block.stream_offset(ptr))?;
		if !non_recursive {
			let mut value = self.arena.take(index);
			let outcome = self.nested(|session| (converter.populate)(session, target, value.as_mut()));
			self.arena.restore(index, value);
			self.cursor.restore(saved);
			if let Err(err) = &outcome {
				tracing::debug!(
					structure = target.name(),
					ptr = format_args!("0x{ptr:x}"),
					index,
					error = %err,
					"population failed, object stays cached partially populated"
				);
			}
			outcome?;
		}
		Ok(Resolution {
			index: Some(index),
			from_cache: false,
		})
	}

	/// Store a resolved pointer into `out` under the field's policy.
	fn assign<H>(
		&mut self,
		policy: ErrorPolicy,
		structure: &Structure,
		name: &str,
		result: Result<Resolution>,
		out: &mut Option<H>,
		wrap: fn(usize) -> H,
	) -> Result<bool> {
		match self.recover(policy, structure, name, result)? {
			Some(resolution) => {
				*out = resolution.index.map(wrap);
				Ok(resolution.from_cache)
			}
			None => Ok(false),
		}
	}
}

fn expect_type<T: Convert>(target: &Structure) -> Result<()> {
	if target.name() != T::DNA_NAME {
		return Err(BlendError::TypeMismatch {
			expected: T::DNA_NAME.to_owned(),
			got: target.name().to_owned(),
		});
	}
	Ok(())
}
