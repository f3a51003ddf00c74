use crate::blend::{BlendError, BlockIndex, Cursor, Dna, Field, Result, Structure};
use crate::convert::cache::ObjectCache;
use crate::convert::primitive::{Encoding, Scalar, Stored};
use crate::convert::{Arena, Convert, ConvertOptions, ConvertWarning, ConverterRegistry, ErrorPolicy, Statistics};

mod resolve;

/// State of one conversion run over one file.
///
/// A session owns its cursor, identity cache, arena, and counters, and only
/// borrows the read-only schema, block index, and converter table. Separate
/// sessions are independent and may run on separate threads.
pub struct Session<'a> {
	cursor: Cursor<'a>,
	dna: &'a Dna,
	blocks: &'a BlockIndex,
	registry: &'a ConverterRegistry,
	options: ConvertOptions,
	cache: ObjectCache,
	arena: Arena,
	stats: Statistics,
	warnings: Vec<ConvertWarning>,
	depth: u32,
}

/// Everything a finished session produced.
#[derive(Debug, Default)]
pub struct SessionOutput {
	/// Objects materialised through pointers.
	pub arena: Arena,
	/// Engine counters.
	pub statistics: Statistics,
	/// Recovered faults in the order they occurred.
	pub warnings: Vec<ConvertWarning>,
}

impl<'a> Session<'a> {
	/// Start a session over the decoded file bytes.
	pub fn new(bytes: &'a [u8], dna: &'a Dna, blocks: &'a BlockIndex, registry: &'a ConverterRegistry, options: ConvertOptions) -> Self {
		Self {
			cursor: Cursor::with_layout(bytes, dna.endianness, dna.pointer_size),
			dna,
			blocks,
			registry,
			options,
			cache: ObjectCache::default(),
			arena: Arena::new(),
			stats: Statistics::default(),
			warnings: Vec::new(),
			depth: 0,
		}
	}

	/// Schema the session reads with.
	pub fn dna(&self) -> &'a Dna {
		self.dna
	}

	/// Options the session was started with.
	pub fn options(&self) -> ConvertOptions {
		self.options
	}

	/// Current absolute stream position.
	pub fn position(&self) -> usize {
		self.cursor.pos()
	}

	/// Move the cursor to an absolute stream position.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		self.cursor.seek(pos)
	}

	/// Objects allocated so far.
	pub fn arena(&self) -> &Arena {
		&self.arena
	}

	/// Counters so far.
	pub fn statistics(&self) -> Statistics {
		self.stats
	}

	/// Recovered faults so far.
	pub fn warnings(&self) -> &[ConvertWarning] {
		&self.warnings
	}

	/// Finish the session and hand over its results.
	pub fn finish(self) -> SessionOutput {
		tracing::debug!(
			objects = self.arena.len(),
			cached = self.cache.len(),
			fields_read = self.stats.fields_read,
			pointers_resolved = self.stats.pointers_resolved,
			cache_hits = self.stats.cache_hits,
			warnings = self.warnings.len(),
			"conversion finished"
		);
		SessionOutput {
			arena: self.arena,
			statistics: self.stats,
			warnings: self.warnings,
		}
	}

	/// Populate `out` from the `structure` instance at the cursor.
	///
	/// This is the entry point for top-level objects. The cursor is restored
	/// afterwards.
	pub fn populate<T: Convert>(&mut self, out: &mut T, structure: &Structure) -> Result<()> {
		if structure.name() != T::DNA_NAME {
			return Err(BlendError::TypeMismatch {
				expected: T::DNA_NAME.to_owned(),
				got: structure.name().to_owned(),
			});
		}
		self.scoped(|session| session.nested(|session| out.convert(session, structure)))
	}

	/// Convert a fresh `T` from the instance starting at `offset`.
	pub fn convert_at<T: Convert>(&mut self, offset: usize) -> Result<T> {
		let dna = self.dna;
		let structure = dna.lookup(T::DNA_NAME)?;
		self.scoped(|session| {
			session.cursor.seek(offset)?;
			let mut out = T::default();
			session.populate(&mut out, structure)?;
			Ok(out)
		})
	}

	/// Read one primitive field into `out`.
	pub fn read_scalar<V: Scalar>(&mut self, policy: ErrorPolicy, out: &mut V, structure: &Structure, name: &str) -> Result<()> {
		let result = self.scoped(|session| {
			let field = structure.field(name)?;
			let encoding = Encoding::of_field(field, V::NAME)?;
			session.seek_field(field)?;
			Ok(V::from_stored(Stored::read(&mut session.cursor, encoding)?))
		});
		if let Some(value) = self.recover(policy, structure, name, result)? {
			*out = value;
		}
		Ok(())
	}

	/// Read a NUL-terminated `char` array field.
	///
	/// At most the declared array length is consumed.
	pub fn read_string(&mut self, policy: ErrorPolicy, out: &mut String, structure: &Structure, name: &str) -> Result<()> {
		let result = self.scoped(|session| {
			let field = array_field(structure, name)?;
			if Encoding::of_field(field, "string")? != Encoding::Char {
				return Err(BlendError::UnsupportedConversion {
					from: field.type_name.to_string(),
					to: "string",
				});
			}
			session.seek_field(field)?;
			let raw = session.cursor.read_exact(field.element_count())?;
			let end = raw.iter().position(|byte| *byte == 0).unwrap_or(raw.len());
			Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
		});
		if let Some(value) = self.recover(policy, structure, name, result)? {
			*out = value;
		}
		Ok(())
	}

	/// Read a numeric array field into `out`.
	///
	/// Copies `min(declared, out.len())` elements in storage order. Trailing
	/// destination slots are left as they were.
	pub fn read_array<V: Scalar>(&mut self, policy: ErrorPolicy, out: &mut [V], structure: &Structure, name: &str) -> Result<()> {
		let capacity = out.len();
		let result = self.scoped(|session| {
			let field = array_field(structure, name)?;
			let encoding = Encoding::of_field(field, V::NAME)?;
			session.seek_field(field)?;
			let count = field.element_count().min(capacity);
			(0..count).map(|_| Ok(V::from_stored(Stored::read(&mut session.cursor, encoding)?))).collect::<Result<Vec<_>>>()
		});
		if let Some(values) = self.recover(policy, structure, name, result)? {
			out[..values.len()].copy_from_slice(&values);
		}
		Ok(())
	}

	/// Read a two-dimensional numeric array field into `out`.
	///
	/// Both dimensions are capped independently; element `[i][j]` comes from
	/// storage position `i * declared_columns + j`.
	pub fn read_array_2d<V: Scalar, const N: usize>(&mut self, policy: ErrorPolicy, out: &mut [[V; N]], structure: &Structure, name: &str) -> Result<()> {
		let rows_out = out.len();
		let result = self.scoped(|session| {
			let field = array_field(structure, name)?;
			let encoding = Encoding::of_field(field, V::NAME)?;
			let [rows, cols] = field.dims;
			let base = session.cursor.pos() + field.offset;
			let stride = encoding.width();

			let mut values = Vec::with_capacity(rows.min(rows_out));
			for row in 0..rows.min(rows_out) {
				let mut line = [V::default(); N];
				for (col, slot) in line.iter_mut().enumerate().take(cols) {
					let at = row
						.checked_mul(cols)
						.and_then(|idx| idx.checked_add(col))
						.and_then(|idx| idx.checked_mul(stride))
						.and_then(|rel| rel.checked_add(base))
						.ok_or_else(|| BlendError::DnaLayoutOverflow {
							struct_name: structure.name().to_owned(),
							field: name.to_owned(),
							end: usize::MAX,
							size: structure.size(),
						})?;
					session.cursor.seek(at)?;
					*slot = V::from_stored(Stored::read(&mut session.cursor, encoding)?);
				}
				values.push((line, cols.min(N)));
			}
			Ok(values)
		});
		if let Some(values) = self.recover(policy, structure, name, result)? {
			for (dst, (line, filled)) in out.iter_mut().zip(values) {
				dst[..filled].copy_from_slice(&line[..filled]);
			}
		}
		Ok(())
	}

	/// Populate an embedded (non-pointer) structure field in place.
	pub fn read_struct<T: Convert>(&mut self, policy: ErrorPolicy, out: &mut T, structure: &Structure, name: &str) -> Result<()> {
		let dna = self.dna;
		let result = self.scoped(|session| {
			let field = structure.field(name)?;
			if field.is_pointer || field.type_name.as_ref() != T::DNA_NAME {
				return Err(BlendError::TypeMismatch {
					expected: T::DNA_NAME.to_owned(),
					got: describe(field),
				});
			}
			let nested = dna.lookup(T::DNA_NAME)?;
			session.seek_field(field)?;
			let mut value = T::default();
			session.nested(|session| value.convert(session, nested))?;
			Ok(value)
		});
		if let Some(value) = self.recover(policy, structure, name, result)? {
			*out = value;
		}
		Ok(())
	}

	/// Run `f` and put the cursor back where it was, on success or error.
	fn scoped<V>(&mut self, f: impl FnOnce(&mut Self) -> Result<V>) -> Result<V> {
		let saved = self.cursor.pos();
		let out = f(self);
		self.cursor.restore(saved);
		out
	}

	/// Run `f` one population level deeper, enforcing the depth ceiling.
	fn nested<V>(&mut self, f: impl FnOnce(&mut Self) -> Result<V>) -> Result<V> {
		if self.depth >= self.options.max_depth {
			return Err(BlendError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}
		self.depth += 1;
		let out = f(self);
		self.depth -= 1;
		out
	}

	fn seek_field(&mut self, field: &Field) -> Result<()> {
		let at = self.cursor.pos() + field.offset;
		self.cursor.seek(at)
	}

	/// Apply the field's error policy to a read result.
	///
	/// `Ok(None)` means the fault was absorbed and the destination must stay
	/// untouched.
	fn recover<V>(&mut self, policy: ErrorPolicy, structure: &Structure, field: &str, result: Result<V>) -> Result<Option<V>> {
		self.stats.fields_read += 1;
		let err = match result {
			Ok(value) => return Ok(Some(value)),
			Err(err) if !err.is_recoverable() => return Err(err),
			Err(err) => err,
		};

		match policy.escalate(self.options.strict) {
			ErrorPolicy::Fail => Err(err),
			ErrorPolicy::Warn => {
				self.warn(structure.name(), field, err.to_string());
				Ok(None)
			}
			ErrorPolicy::Ignore => {
				tracing::trace!(structure = structure.name(), field, error = %err, "field read failed, ignored");
				Ok(None)
			}
		}
	}

	fn warn(&mut self, structure: &str, field: &str, message: String) {
		tracing::warn!(structure, field, "{message}");
		self.warnings.push(ConvertWarning {
			structure: structure.to_owned(),
			field: field.to_owned(),
			message,
		});
	}
}

fn array_field<'s>(structure: &'s Structure, name: &str) -> Result<&'s Field> {
	let field = structure.field(name)?;
	if !field.is_array {
		return Err(BlendError::TypeMismatch {
			expected: format!("array field {}.{name}", structure.name()),
			got: describe(field),
		});
	}
	Ok(field)
}

fn describe(field: &Field) -> String {
	let stars = if field.is_pointer { "*" } else { "" };
	match field.dims {
		_ if !field.is_array => format!("{} {stars}{}", field.type_name, field.name),
		[n, 1] => format!("{} {stars}{}[{n}]", field.type_name, field.name),
		[a, b] => format!("{} {stars}{}[{a}][{b}]", field.type_name, field.name),
	}
}
