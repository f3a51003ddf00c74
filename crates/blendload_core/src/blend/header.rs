use crate::blend::{BlendError, Result};

/// Byte order declared by the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
	/// Little-endian byte order (`v` marker).
	Little,
	/// Big-endian byte order (`V` marker).
	Big,
}

impl Endianness {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}

	fn from_marker(byte: u8) -> Option<Self> {
		match byte {
			b'v' => Some(Self::Little),
			b'V' => Some(Self::Big),
			_ => None,
		}
	}
}

/// Parsed file header: everything needed to lay out the rest of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendHeader {
	/// Total file header size in bytes.
	pub header_size: usize,
	/// Container format version (`0` legacy, `1` large block headers).
	pub format_version: u16,
	/// Blender version as decimal digits (for example `279` or `500`).
	pub version: u16,
	/// Pointer width in bytes, fixed for the whole file.
	pub pointer_size: usize,
	/// File byte order.
	pub endianness: Endianness,
}

impl BlendHeader {
	/// Exact size of legacy headers (`BLENDER-v279` style).
	pub const LEGACY_SIZE: usize = 12;
	/// Exact size of v1 headers (`BLENDER17-01v0500` style).
	pub const V1_SIZE: usize = 17;
	/// Format marker for legacy headers.
	pub const LEGACY_FORMAT_VERSION: u16 = 0;
	/// Format marker for v1 headers.
	pub const V1_FORMAT_VERSION: u16 = 1;

	/// Parse a header from the beginning of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		if bytes.get(0..7) != Some(b"BLENDER".as_slice()) {
			return Err(BlendError::InvalidHeader);
		}

		match bytes.get(7).copied() {
			Some(kind) if kind.is_ascii_digit() => Self::parse_v1(bytes),
			Some(_) => Self::parse_legacy(bytes),
			None => Err(BlendError::InvalidHeader),
		}
	}

	/// Size in bytes of one block header in this file.
	pub fn bhead_size(self) -> usize {
		if self.format_version == Self::LEGACY_FORMAT_VERSION {
			16 + self.pointer_size
		} else {
			32
		}
	}

	fn parse_v1(bytes: &[u8]) -> Result<Self> {
		let header = bytes.get(0..Self::V1_SIZE).ok_or(BlendError::InvalidHeader)?;

		let header_size = usize::from(parse_digits(&header[7..9]).ok_or(BlendError::InvalidHeader)?);
		if header_size != Self::V1_SIZE {
			return Err(BlendError::UnsupportedPointerSize { header_size });
		}
		if header[9] != b'-' {
			return Err(BlendError::InvalidHeader);
		}

		let format_version = parse_digits(&header[10..12]).ok_or(BlendError::InvalidHeader)?;
		if format_version != Self::V1_FORMAT_VERSION {
			return Err(BlendError::UnsupportedFormatVersion { version: format_version });
		}

		let endianness = Endianness::from_marker(header[12]).ok_or(BlendError::InvalidHeader)?;
		let version = parse_digits(&header[13..17]).ok_or(BlendError::InvalidHeader)?;

		Ok(Self {
			header_size,
			format_version,
			version,
			pointer_size: 8,
			endianness,
		})
	}

	fn parse_legacy(bytes: &[u8]) -> Result<Self> {
		let header = bytes.get(0..Self::LEGACY_SIZE).ok_or(BlendError::InvalidHeader)?;
		let pointer_size = match header[7] {
			b'_' => 4,
			b'-' => 8,
			_ => return Err(BlendError::InvalidHeader),
		};
		let endianness = Endianness::from_marker(header[8]).ok_or(BlendError::InvalidHeader)?;
		let version = parse_digits(&header[9..12]).ok_or(BlendError::InvalidHeader)?;

		Ok(Self {
			header_size: Self::LEGACY_SIZE,
			format_version: Self::LEGACY_FORMAT_VERSION,
			version,
			pointer_size,
			endianness,
		})
	}
}

fn parse_digits(bytes: &[u8]) -> Option<u16> {
	if bytes.is_empty() {
		return None;
	}

	bytes.iter().try_fold(0_u16, |acc, byte| {
		if byte.is_ascii_digit() {
			acc.checked_mul(10)?.checked_add(u16::from(*byte - b'0'))
		} else {
			None
		}
	})
}

#[cfg(test)]
mod tests {
	use crate::blend::{BlendError, BlendHeader, Endianness};

	#[test]
	fn parses_v1_header() {
		let header = BlendHeader::parse(b"BLENDER17-01v0500").expect("header parses");
		assert_eq!(header.header_size, 17);
		assert_eq!(header.format_version, 1);
		assert_eq!(header.version, 500);
		assert_eq!(header.pointer_size, 8);
		assert_eq!(header.endianness, Endianness::Little);
		assert_eq!(header.bhead_size(), 32);
	}

	#[test]
	fn rejects_unknown_v1_size_marker() {
		let err = BlendHeader::parse(b"BLENDER18-01v0500X").expect_err("non-17 size marker should fail");
		assert!(matches!(err, BlendError::UnsupportedPointerSize { header_size: 18 }));
	}

	#[test]
	fn parses_legacy_64bit_little_endian() {
		let header = BlendHeader::parse(b"BLENDER-v279").expect("legacy header parses");
		assert_eq!(header.header_size, BlendHeader::LEGACY_SIZE);
		assert_eq!(header.format_version, BlendHeader::LEGACY_FORMAT_VERSION);
		assert_eq!(header.version, 279);
		assert_eq!(header.pointer_size, 8);
		assert_eq!(header.endianness, Endianness::Little);
		assert_eq!(header.bhead_size(), 24);
	}

	#[test]
	fn parses_legacy_32bit_big_endian() {
		let header = BlendHeader::parse(b"BLENDER_V248").expect("legacy header parses");
		assert_eq!(header.pointer_size, 4);
		assert_eq!(header.endianness, Endianness::Big);
		assert_eq!(header.bhead_size(), 20);
	}

	#[test]
	fn rejects_garbage() {
		assert!(matches!(BlendHeader::parse(b"NOTBLEND"), Err(BlendError::InvalidHeader)));
		assert!(matches!(BlendHeader::parse(b"BLENDER?v279"), Err(BlendError::InvalidHeader)));
	}
}
