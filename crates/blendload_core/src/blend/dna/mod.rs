use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::blend::bytes::Cursor;
use crate::blend::decl::parse_field_decl;
use crate::blend::{BlendError, Endianness, Result};
use crate::convert::Encoding;

/// Parsed SDNA schema: raw tables plus resolved structure layouts.
#[derive(Debug)]
pub struct Dna {
	/// Byte order the schema was written in.
	pub endianness: Endianness,
	/// Pointer width used for pointer-typed fields.
	pub pointer_size: usize,
	/// Field declarator strings from `NAME`.
	pub names: Vec<Box<str>>,
	/// Type name strings from `TYPE`.
	pub types: Vec<Box<str>>,
	/// Type byte sizes from `TLEN`.
	pub tlen: Vec<u16>,
	/// Raw struct declarations from `STRC`.
	pub structs: Vec<DnaStruct>,
	structures: Vec<Structure>,
	by_name: HashMap<Box<str>, usize>,
	next_cache_slot: Cell<usize>,
}

/// One raw struct declaration from SDNA.
#[derive(Debug, Clone)]
pub struct DnaStruct {
	/// Type index for this struct's name.
	pub type_idx: u16,
	/// Field declarations in source order.
	pub fields: Vec<DnaField>,
}

/// One raw SDNA field declaration.
#[derive(Debug, Clone, Copy)]
pub struct DnaField {
	/// Type table index for the field type.
	pub type_idx: u16,
	/// Name table index for the field declarator.
	pub name_idx: u16,
}

/// Resolved layout of one field inside its owning structure.
#[derive(Debug, Clone)]
pub struct Field {
	/// Identifier, stripped of pointer stars and array extents.
	pub name: Box<str>,
	/// Declared DNA type name.
	pub type_name: Box<str>,
	/// Byte offset from the start of the owning structure.
	pub offset: usize,
	/// Total byte size including all array elements.
	pub size: usize,
	/// Array extents; unused dimensions are `1`.
	pub dims: [usize; 2],
	/// Declarator carries array extents.
	pub is_array: bool,
	/// Declarator stores pointers.
	pub is_pointer: bool,
}

impl Field {
	/// Number of stored elements (`dims[0] * dims[1]`).
	pub fn element_count(&self) -> usize {
		self.dims[0].saturating_mul(self.dims[1])
	}

	/// Byte size of one element.
	pub fn element_size(&self) -> usize {
		self.size.checked_div(self.element_count()).unwrap_or(0)
	}
}

/// Resolved structure layout. Identity is the structure name.
#[derive(Debug)]
pub struct Structure {
	name: Box<str>,
	sdna_nr: u32,
	size: usize,
	fields: Vec<Field>,
	index: HashMap<Box<str>, usize>,
	cache_slot: OnceCell<usize>,
}

impl Structure {
	/// Structure name as declared in the `TYPE` table.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// SDNA index of this structure.
	pub fn sdna_nr(&self) -> u32 {
		self.sdna_nr
	}

	/// Declared byte size.
	pub fn size(&self) -> usize {
		self.size
	}

	/// Fields in declaration order.
	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	/// Look up a field by identifier.
	pub fn get(&self, name: &str) -> Option<&Field> {
		self.index.get(name).map(|idx| &self.fields[*idx])
	}

	/// Look up a field by identifier, failing with `FieldNotFound`.
	pub fn field(&self, name: &str) -> Result<&Field> {
		self.get(name).ok_or_else(|| BlendError::FieldNotFound {
			struct_name: self.name.to_string(),
			field: name.to_owned(),
		})
	}

	/// Cache slot, if one was assigned already.
	pub fn cache_slot(&self) -> Option<usize> {
		self.cache_slot.get().copied()
	}

	/// Return the cache slot, assigning it with `next` on first use.
	pub(crate) fn cache_slot_or_assign(&self, next: impl FnOnce() -> usize) -> usize {
		*self.cache_slot.get_or_init(next)
	}
}

impl PartialEq for Structure {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

impl Eq for Structure {}

impl Hash for Structure {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.name.hash(state);
	}
}

impl Dna {
	/// Parse a `DNA1` payload written with the given byte order and pointer width.
	pub fn parse(payload: &[u8], endianness: Endianness, pointer_size: usize) -> Result<Self> {
		let mut cursor = Cursor::with_layout(payload, endianness, pointer_size);

		expect_tag(&mut cursor, *b"SDNA")?;
		expect_tag(&mut cursor, *b"NAME")?;
		let names = read_string_table(&mut cursor)?;

		expect_tag(&mut cursor, *b"TYPE")?;
		let types = read_string_table(&mut cursor)?;

		expect_tag(&mut cursor, *b"TLEN")?;
		let tlen = (0..types.len()).map(|_| cursor.read_u16()).collect::<Result<Vec<_>>>()?;
		cursor.align4()?;

		check_primitive_sizes(&types, &tlen)?;

		expect_tag(&mut cursor, *b"STRC")?;
		let struct_count = cursor.read_u32()? as usize;
		let mut structs = Vec::with_capacity(struct_count.min(payload.len()));
		for _ in 0..struct_count {
			let type_idx = cursor.read_u16()?;
			check_index("struct.type_idx", u32::from(type_idx), types.len())?;

			let field_count = usize::from(cursor.read_u16()?);
			let mut fields = Vec::with_capacity(field_count);
			for _ in 0..field_count {
				let field = DnaField {
					type_idx: cursor.read_u16()?,
					name_idx: cursor.read_u16()?,
				};
				check_index("field.type_idx", u32::from(field.type_idx), types.len())?;
				check_index("field.name_idx", u32::from(field.name_idx), names.len())?;
				fields.push(field);
			}
			structs.push(DnaStruct { type_idx, fields });
		}

		let mut struct_for_type = vec![None; types.len()];
		for (idx, item) in structs.iter().enumerate() {
			let slot = &mut struct_for_type[usize::from(item.type_idx)];
			if let Some(first) = *slot {
				return Err(BlendError::DnaDuplicateStructType {
					type_idx: item.type_idx,
					first,
					second: idx as u32,
				});
			}
			*slot = Some(idx as u32);
		}

		let mut dna = Self {
			endianness,
			pointer_size,
			names,
			types,
			tlen,
			structs,
			structures: Vec::new(),
			by_name: HashMap::new(),
			next_cache_slot: Cell::new(0),
		};
		dna.resolve_layouts()?;
		Ok(dna)
	}

	fn resolve_layouts(&mut self) -> Result<()> {
		let mut structures = Vec::with_capacity(self.structs.len());
		for (sdna_nr, raw) in self.structs.iter().enumerate() {
			let name = self.types[usize::from(raw.type_idx)].clone();
			let size = usize::from(self.tlen[usize::from(raw.type_idx)]);

			let mut offset = 0_usize;
			let mut fields = Vec::with_capacity(raw.fields.len());
			let mut index = HashMap::with_capacity(raw.fields.len());
			for item in &raw.fields {
				let decl = parse_field_decl(&self.names[usize::from(item.name_idx)]);
				let elem_size = if decl.is_pointer {
					self.pointer_size
				} else {
					usize::from(self.tlen[usize::from(item.type_idx)])
				};
				let field_size = elem_size.saturating_mul(decl.element_count());
				let end = offset.saturating_add(field_size);
				if end > size {
					return Err(BlendError::DnaLayoutOverflow {
						struct_name: name.to_string(),
						field: decl.ident.to_owned(),
						end,
						size,
					});
				}

				if index.insert(Box::<str>::from(decl.ident), fields.len()).is_some() {
					tracing::debug!(structure = %name, field = decl.ident, "duplicate field identifier, last declaration wins");
				}
				fields.push(Field {
					name: decl.ident.into(),
					type_name: self.types[usize::from(item.type_idx)].clone(),
					offset,
					size: field_size,
					dims: decl.dims,
					is_array: decl.is_array,
					is_pointer: decl.is_pointer,
				});
				offset = end;
			}
			if offset < size {
				tracing::debug!(structure = %name, laid_out = offset, declared = size, "structure has trailing bytes");
			}

			self.by_name.entry(name.clone()).or_insert(sdna_nr);
			structures.push(Structure {
				name,
				sdna_nr: sdna_nr as u32,
				size,
				fields,
				index,
				cache_slot: OnceCell::new(),
			});
		}
		self.structures = structures;
		Ok(())
	}

	/// Look up a structure by name, failing with `SchemaNotFound`.
	pub fn lookup(&self, name: &str) -> Result<&Structure> {
		self.by_name
			.get(name)
			.map(|idx| &self.structures[*idx])
			.ok_or_else(|| BlendError::SchemaNotFound { name: name.to_owned() })
	}

	/// Look up a structure by SDNA index.
	pub fn structure(&self, sdna_nr: u32) -> Result<&Structure> {
		self.structures.get(sdna_nr as usize).ok_or(BlendError::UnknownSdna { sdna_nr })
	}

	/// Dense cache slot for `structure`, assigned on first request.
	pub(crate) fn cache_slot_of(&self, structure: &Structure) -> usize {
		structure.cache_slot_or_assign(|| {
			let slot = self.next_cache_slot.get();
			self.next_cache_slot.set(slot + 1);
			slot
		})
	}

	/// All resolved structures in SDNA order.
	pub fn structures(&self) -> &[Structure] {
		&self.structures
	}
}

fn expect_tag(cursor: &mut Cursor<'_>, expected: [u8; 4]) -> Result<()> {
	let at = cursor.pos();
	let got = cursor.read_code4()?;
	if got != expected {
		return Err(BlendError::DnaBadTag { expected, got, at });
	}
	Ok(())
}

fn read_string_table(cursor: &mut Cursor<'_>) -> Result<Vec<Box<str>>> {
	let count = cursor.read_u32()? as usize;
	let mut out = Vec::with_capacity(count.min(cursor.remaining()));
	for _ in 0..count {
		let bytes = cursor.read_cstring_bytes()?;
		out.push(String::from_utf8_lossy(bytes).into_owned().into_boxed_str());
	}
	cursor.align4()?;
	Ok(out)
}

/// Readers step through primitive arrays by encoding width, so `TLEN` must agree.
fn check_primitive_sizes(types: &[Box<str>], tlen: &[u16]) -> Result<()> {
	for (name, declared) in types.iter().zip(tlen) {
		let Some(encoding) = Encoding::of(name) else {
			continue;
		};
		let declared = usize::from(*declared);
		if declared != encoding.width() {
			return Err(BlendError::DnaPrimitiveSize {
				type_name: name.to_string(),
				declared,
				expected: encoding.width(),
			});
		}
	}
	Ok(())
}

fn check_index(kind: &'static str, idx: u32, len: usize) -> Result<()> {
	if (idx as usize) >= len {
		return Err(BlendError::DnaIndexOutOfRange {
			kind,
			idx,
			max: len.saturating_sub(1) as u32,
		});
	}
	Ok(())
}
