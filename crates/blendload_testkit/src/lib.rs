//! Shared test helpers: a writer for small synthetic `.blend` files.
//!
//! The writer produces a file header, user blocks, a `DNA1` schema block
//! and the `ENDB` terminator, in either byte order and pointer width.

use std::path::PathBuf;

const PRIMITIVES: &[(&str, u16)] = &[
	("char", 1),
	("uchar", 1),
	("short", 2),
	("ushort", 2),
	("int", 4),
	("long", 4),
	("ulong", 4),
	("float", 4),
	("double", 8),
	("int64_t", 8),
	("uint64_t", 8),
	("void", 0),
];

struct RawBlock {
	code: [u8; 4],
	sdna_nr: u32,
	old: u64,
	nr: u32,
	payload: Vec<u8>,
}

/// Builder for synthetic `.blend` byte streams.
pub struct BlendBuilder {
	pointer_size: usize,
	big_endian: bool,
	large_headers: bool,
	names: Vec<String>,
	types: Vec<String>,
	tlen: Vec<u16>,
	structs: Vec<(u16, Vec<(u16, u16)>)>,
	blocks: Vec<RawBlock>,
}

impl Default for BlendBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl BlendBuilder {
	/// Little-endian file with 8-byte pointers and legacy block headers.
	pub fn new() -> Self {
		Self::with_layout(8, false)
	}

	/// File with explicit pointer width (4 or 8) and byte order.
	pub fn with_layout(pointer_size: usize, big_endian: bool) -> Self {
		assert!(pointer_size == 4 || pointer_size == 8, "pointer width must be 4 or 8");
		Self {
			pointer_size,
			big_endian,
			large_headers: false,
			names: Vec::new(),
			types: PRIMITIVES.iter().map(|(name, _)| (*name).to_owned()).collect(),
			tlen: PRIMITIVES.iter().map(|(_, size)| *size).collect(),
			structs: Vec::new(),
			blocks: Vec::new(),
		}
	}

	/// Switch to the 17-byte v1 header with 32-byte block headers.
	pub fn large_headers(mut self) -> Self {
		assert_eq!(self.pointer_size, 8, "large block headers imply 8-byte pointers");
		assert!(!self.big_endian, "large block headers are little-endian only here");
		self.large_headers = true;
		self
	}

	/// Pointer width in bytes.
	pub fn pointer_size(&self) -> usize {
		self.pointer_size
	}

	/// Declare a structure from `(type, declarator)` pairs and return its SDNA index.
	///
	/// Types referenced only through pointers may be declared later.
	pub fn define(&mut self, name: &str, fields: &[(&str, &str)]) -> u32 {
		let type_idx = self.type_index(name);
		let mut size = 0_usize;
		let mut entries = Vec::with_capacity(fields.len());
		for (type_name, decl) in fields {
			let field_type = self.type_index(type_name);
			let (is_pointer, count) = parse_decl(decl);
			let elem = if is_pointer {
				self.pointer_size
			} else {
				usize::from(self.tlen[usize::from(field_type)])
			};
			size += elem * count;
			let name_idx = self.name_index(decl);
			entries.push((field_type, name_idx));
		}

		self.tlen[usize::from(type_idx)] = u16::try_from(size).expect("struct size fits u16");
		self.structs.push((type_idx, entries));
		(self.structs.len() - 1) as u32
	}

	/// Declare or override the `TLEN` entry of a type.
	pub fn type_size(&mut self, name: &str, size: u16) -> &mut Self {
		let idx = self.type_index(name);
		self.tlen[usize::from(idx)] = size;
		self
	}

	/// Byte size of a previously defined type.
	pub fn size_of(&self, name: &str) -> usize {
		let idx = self.types.iter().position(|item| item == name).expect("type is defined");
		usize::from(self.tlen[idx])
	}

	/// Start a payload writer in this file's layout.
	pub fn payload(&self) -> Payload {
		Payload {
			bytes: Vec::new(),
			big_endian: self.big_endian,
			pointer_size: self.pointer_size,
		}
	}

	/// Append a data block. `code` is padded with zero bytes to four.
	pub fn block(&mut self, code: &str, sdna_nr: u32, old: u64, nr: u32, payload: Vec<u8>) -> &mut Self {
		let mut padded = [0_u8; 4];
		padded[..code.len()].copy_from_slice(code.as_bytes());
		self.blocks.push(RawBlock {
			code: padded,
			sdna_nr,
			old,
			nr,
			payload,
		});
		self
	}

	/// Encode the `DNA1` payload on its own.
	pub fn dna_bytes(&self) -> Vec<u8> {
		let mut out = self.payload();
		out.bytes.extend_from_slice(b"SDNANAME");
		out = out.uint(self.names.len() as u32);
		for name in &self.names {
			out = out.cstr(name);
		}
		out = out.align4();

		out.bytes.extend_from_slice(b"TYPE");
		out = out.uint(self.types.len() as u32);
		for name in &self.types {
			out = out.cstr(name);
		}
		out = out.align4();

		out.bytes.extend_from_slice(b"TLEN");
		for size in &self.tlen {
			out = out.short(*size as i16);
		}
		out = out.align4();

		out.bytes.extend_from_slice(b"STRC");
		out = out.uint(self.structs.len() as u32);
		for (type_idx, fields) in &self.structs {
			out = out.short(*type_idx as i16).short(fields.len() as i16);
			for (field_type, name_idx) in fields {
				out = out.short(*field_type as i16).short(*name_idx as i16);
			}
		}
		out.finish()
	}

	/// Encode the complete file.
	pub fn build(&self) -> Vec<u8> {
		let mut out = Vec::new();
		if self.large_headers {
			out.extend_from_slice(b"BLENDER17-01v0500");
		} else {
			out.extend_from_slice(b"BLENDER");
			out.push(if self.pointer_size == 8 { b'-' } else { b'_' });
			out.push(if self.big_endian { b'V' } else { b'v' });
			out.extend_from_slice(b"279");
		}

		for block in &self.blocks {
			self.write_block(&mut out, block.code, block.sdna_nr, block.old, block.nr, &block.payload);
		}
		self.write_block(&mut out, *b"DNA1", 0, 0, 1, &self.dna_bytes());
		self.write_block(&mut out, *b"ENDB", 0, 0, 0, &[]);
		out
	}

	fn write_block(&self, out: &mut Vec<u8>, code: [u8; 4], sdna_nr: u32, old: u64, nr: u32, payload: &[u8]) {
		let mut head = self.payload();
		head.bytes.extend_from_slice(&code);
		if self.large_headers {
			head = head.uint(sdna_nr).int64(old as i64).int64(payload.len() as i64).int64(i64::from(nr));
		} else {
			head = head.int(payload.len() as i32).ptr(old).uint(sdna_nr).int(nr as i32);
		}
		out.extend_from_slice(&head.finish());
		out.extend_from_slice(payload);
	}

	fn type_index(&mut self, name: &str) -> u16 {
		if let Some(idx) = self.types.iter().position(|item| item == name) {
			return idx as u16;
		}
		self.types.push(name.to_owned());
		self.tlen.push(0);
		(self.types.len() - 1) as u16
	}

	fn name_index(&mut self, decl: &str) -> u16 {
		if let Some(idx) = self.names.iter().position(|item| item == decl) {
			return idx as u16;
		}
		self.names.push(decl.to_owned());
		(self.names.len() - 1) as u16
	}
}

fn parse_decl(decl: &str) -> (bool, usize) {
	let is_pointer = decl.starts_with('*') || decl.starts_with("(*");
	if decl.starts_with("(*") {
		return (true, 1);
	}
	let mut count = 1;
	let mut rest = decl;
	while let Some(start) = rest.find('[') {
		let end = rest[start..].find(']').expect("closing bracket") + start;
		count *= rest[start + 1..end].parse::<usize>().expect("numeric extent");
		rest = &rest[end + 1..];
	}
	(is_pointer, count)
}

/// Field-by-field payload writer honouring byte order and pointer width.
pub struct Payload {
	bytes: Vec<u8>,
	big_endian: bool,
	pointer_size: usize,
}

impl Payload {
	fn put(mut self, le: &[u8], be: &[u8]) -> Self {
		self.bytes.extend_from_slice(if self.big_endian { be } else { le });
		self
	}

	/// One byte.
	pub fn char(mut self, value: u8) -> Self {
		self.bytes.push(value);
		self
	}

	/// Two-byte signed integer.
	pub fn short(self, value: i16) -> Self {
		self.put(&value.to_le_bytes(), &value.to_be_bytes())
	}

	/// Four-byte signed integer.
	pub fn int(self, value: i32) -> Self {
		self.put(&value.to_le_bytes(), &value.to_be_bytes())
	}

	/// Four-byte unsigned integer.
	pub fn uint(self, value: u32) -> Self {
		self.put(&value.to_le_bytes(), &value.to_be_bytes())
	}

	/// Eight-byte signed integer.
	pub fn int64(self, value: i64) -> Self {
		self.put(&value.to_le_bytes(), &value.to_be_bytes())
	}

	/// Single-precision float.
	pub fn float(self, value: f32) -> Self {
		self.put(&value.to_le_bytes(), &value.to_be_bytes())
	}

	/// Several single-precision floats.
	pub fn floats(self, values: &[f32]) -> Self {
		values.iter().fold(self, |out, value| out.float(*value))
	}

	/// Double-precision float.
	pub fn double(self, value: f64) -> Self {
		self.put(&value.to_le_bytes(), &value.to_be_bytes())
	}

	/// Pointer in the file's pointer width.
	pub fn ptr(self, value: u64) -> Self {
		if self.pointer_size == 4 {
			self.uint(value as u32)
		} else {
			self.put(&value.to_le_bytes(), &value.to_be_bytes())
		}
	}

	/// Fixed-width character array, zero padded or truncated to `len`.
	pub fn chars(mut self, text: &str, len: usize) -> Self {
		let mut raw = text.as_bytes().to_vec();
		raw.resize(len, 0);
		self.bytes.extend_from_slice(&raw);
		self
	}

	/// `len` zero bytes.
	pub fn zeros(mut self, len: usize) -> Self {
		self.bytes.resize(self.bytes.len() + len, 0);
		self
	}

	fn cstr(mut self, text: &str) -> Self {
		self.bytes.extend_from_slice(text.as_bytes());
		self.bytes.push(0);
		self
	}

	fn align4(mut self) -> Self {
		while self.bytes.len() % 4 != 0 {
			self.bytes.push(0);
		}
		self
	}

	/// Bytes written so far.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether nothing was written yet.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Finish and return the encoded bytes.
	pub fn finish(self) -> Vec<u8> {
		self.bytes
	}
}

/// Write bytes to a unique file under the system temp directory.
pub fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("blendload-test-{}", std::process::id()));
	std::fs::create_dir_all(&dir).expect("temp dir");
	let path = dir.join(name);
	std::fs::write(&path, bytes).expect("temp file written");
	path
}
