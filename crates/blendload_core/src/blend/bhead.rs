use crate::blend::bytes::Cursor;
use crate::blend::{BlendError, BlendHeader, Result};

/// Parsed block header, normalised across legacy and large layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BHead {
	/// Four-byte block code.
	pub code: [u8; 4],
	/// SDNA struct index describing the payload.
	pub sdna_nr: u32,
	/// Virtual base address the payload had when the file was written.
	pub old: u64,
	/// Payload byte length.
	pub len: u64,
	/// Number of structure instances stored back to back in the payload.
	pub nr: u64,
}

impl BHead {
	/// Parse one block header; the cursor carries byte order and pointer width.
	pub fn parse(cursor: &mut Cursor<'_>, header: &BlendHeader) -> Result<Self> {
		if header.format_version == BlendHeader::LEGACY_FORMAT_VERSION {
			Self::parse_legacy(cursor)
		} else {
			Self::parse_large(cursor)
		}
	}

	fn parse_large(cursor: &mut Cursor<'_>) -> Result<Self> {
		let code = cursor.read_code4()?;
		let sdna_nr = cursor.read_u32()?;
		let old = cursor.read_u64()?;
		let len = non_negative_len(cursor.read_i64()?)?;
		let nr = non_negative_nr(cursor.read_i64()?)?;
		Ok(Self { code, sdna_nr, old, len, nr })
	}

	fn parse_legacy(cursor: &mut Cursor<'_>) -> Result<Self> {
		let code = cursor.read_code4()?;
		let len = non_negative_len(i64::from(cursor.read_i32()?))?;
		let old = cursor.read_ptr()?;
		let sdna_nr = cursor.read_u32()?;
		let nr = non_negative_nr(i64::from(cursor.read_i32()?))?;
		Ok(Self { code, sdna_nr, old, len, nr })
	}

	/// Return `true` for the terminal `ENDB` block.
	pub fn is_endb(&self) -> bool {
		self.code == *b"ENDB"
	}

	/// Return `true` for the embedded schema block.
	pub fn is_dna(&self) -> bool {
		self.code == *b"DNA1"
	}
}

fn non_negative_len(len: i64) -> Result<u64> {
	u64::try_from(len).map_err(|_| BlendError::NegativeBlockLength { len })
}

fn non_negative_nr(nr: i64) -> Result<u64> {
	u64::try_from(nr).map_err(|_| BlendError::NegativeBlockCount { nr })
}
