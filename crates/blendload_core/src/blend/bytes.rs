use crate::blend::{BlendError, Endianness, Result};

/// Repositionable reader over an immutable byte slice.
///
/// Byte order and pointer width are fixed at construction and apply to every
/// multi-byte read for the lifetime of the cursor.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	endianness: Endianness,
	pointer_size: usize,
}

impl<'a> Cursor<'a> {
	/// Create a little-endian, 8-byte-pointer cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self::with_layout(bytes, Endianness::Little, 8)
	}

	/// Create a cursor with explicit byte order and pointer width.
	pub fn with_layout(bytes: &'a [u8], endianness: Endianness, pointer_size: usize) -> Self {
		Self {
			bytes,
			pos: 0,
			endianness,
			pointer_size,
		}
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Move to an absolute byte offset. Seeking to the end is allowed.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(BlendError::SeekOutOfRange { pos, len: self.bytes.len() });
		}
		self.pos = pos;
		Ok(())
	}

	/// Return to a position previously obtained from [`Cursor::pos`].
	pub fn restore(&mut self, pos: usize) {
		self.pos = pos.min(self.bytes.len());
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Byte order used for multi-byte reads.
	pub fn endianness(&self) -> Endianness {
		self.endianness
	}

	/// Pointer width in bytes.
	pub fn pointer_size(&self) -> usize {
		self.pointer_size
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(BlendError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		self.read_array::<4>()
	}

	/// Read one unsigned byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read one signed byte.
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(self.read_u8()? as i8)
	}

	/// Read a `u16`.
	pub fn read_u16(&mut self) -> Result<u16> {
		let buf = self.read_array::<2>()?;
		Ok(match self.endianness {
			Endianness::Little => u16::from_le_bytes(buf),
			Endianness::Big => u16::from_be_bytes(buf),
		})
	}

	/// Read an `i16`.
	pub fn read_i16(&mut self) -> Result<i16> {
		Ok(self.read_u16()? as i16)
	}

	/// Read a `u32`.
	pub fn read_u32(&mut self) -> Result<u32> {
		let buf = self.read_array::<4>()?;
		Ok(match self.endianness {
			Endianness::Little => u32::from_le_bytes(buf),
			Endianness::Big => u32::from_be_bytes(buf),
		})
	}

	/// Read an `i32`.
	pub fn read_i32(&mut self) -> Result<i32> {
		Ok(self.read_u32()? as i32)
	}

	/// Read a `u64`.
	pub fn read_u64(&mut self) -> Result<u64> {
		let buf = self.read_array::<8>()?;
		Ok(match self.endianness {
			Endianness::Little => u64::from_le_bytes(buf),
			Endianness::Big => u64::from_be_bytes(buf),
		})
	}

	/// Read an `i64`.
	pub fn read_i64(&mut self) -> Result<i64> {
		Ok(self.read_u64()? as i64)
	}

	/// Read an IEEE-754 single.
	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(f32::from_bits(self.read_u32()?))
	}

	/// Read an IEEE-754 double.
	pub fn read_f64(&mut self) -> Result<f64> {
		Ok(f64::from_bits(self.read_u64()?))
	}

	/// Read a pointer-width unsigned integer and widen to `u64`.
	pub fn read_ptr(&mut self) -> Result<u64> {
		if self.pointer_size == 4 {
			Ok(u64::from(self.read_u32()?))
		} else {
			self.read_u64()
		}
	}

	/// Advance to the next 4-byte aligned position.
	pub fn align4(&mut self) -> Result<()> {
		let aligned = (self.pos + 3) & !3;
		let skip = aligned.saturating_sub(self.pos);
		let _ = self.read_exact(skip)?;
		Ok(())
	}

	/// Read a zero-terminated byte string without the terminator.
	pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8]> {
		let start = self.pos;
		let rem = &self.bytes[self.pos..];
		let Some(rel_end) = rem.iter().position(|byte| *byte == 0) else {
			return Err(BlendError::UnexpectedEof {
				at: self.pos,
				need: 1,
				rem: self.remaining(),
			});
		};

		let end = start + rel_end;
		self.pos = end + 1;
		Ok(&self.bytes[start..end])
	}
}
