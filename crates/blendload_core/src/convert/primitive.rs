use crate::blend::{BlendError, Cursor, Field, Result};

/// Storage encoding of a primitive DNA type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
	/// One byte.
	Char,
	/// Two-byte signed integer.
	Short,
	/// Four-byte integer.
	Int,
	/// Eight-byte integer.
	Int64,
	/// IEEE single precision.
	Float,
	/// IEEE double precision.
	Double,
}

impl Encoding {
	/// Map a DNA type name onto its encoding, aliases included.
	pub fn of(type_name: &str) -> Option<Self> {
		Some(match type_name {
			"char" | "uchar" | "int8_t" | "uint8_t" | "bool" => Self::Char,
			"short" | "ushort" | "int16_t" | "uint16_t" => Self::Short,
			"int" | "uint" | "int32_t" | "uint32_t" => Self::Int,
			"int64_t" | "uint64_t" => Self::Int64,
			"float" => Self::Float,
			"double" => Self::Double,
			_ => return None,
		})
	}

	/// Encoding of a field's stored elements, rejecting pointers and structures.
	pub fn of_field(field: &Field, to: &'static str) -> Result<Self> {
		let unsupported = || BlendError::UnsupportedConversion {
			from: if field.is_pointer {
				format!("*{}", field.type_name)
			} else {
				field.type_name.to_string()
			},
			to,
		};
		if field.is_pointer {
			return Err(unsupported());
		}
		Self::of(&field.type_name).ok_or_else(unsupported)
	}

	/// Stored width in bytes.
	pub fn width(self) -> usize {
		match self {
			Self::Char => 1,
			Self::Short => 2,
			Self::Int | Self::Float => 4,
			Self::Int64 | Self::Double => 8,
		}
	}
}

/// One value as stored in the file, before conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stored {
	/// Byte, treated as unsigned.
	Char(u8),
	/// Signed short.
	Short(i16),
	/// Signed int.
	Int(i32),
	/// Signed 64-bit int.
	Int64(i64),
	/// Single-precision float.
	Float(f32),
	/// Double-precision float.
	Double(f64),
}

impl Stored {
	/// Read one value at the cursor.
	pub fn read(cursor: &mut Cursor<'_>, encoding: Encoding) -> Result<Self> {
		Ok(match encoding {
			Encoding::Char => Self::Char(cursor.read_u8()?),
			Encoding::Short => Self::Short(cursor.read_i16()?),
			Encoding::Int => Self::Int(cursor.read_i32()?),
			Encoding::Int64 => Self::Int64(cursor.read_i64()?),
			Encoding::Float => Self::Float(cursor.read_f32()?),
			Encoding::Double => Self::Double(cursor.read_f64()?),
		})
	}
}

/// Destination type for primitive field reads.
///
/// `u8` is the char destination and `i16` the short destination: both apply
/// the colour and normal rescale rules. Float to integer casts saturate.
pub trait Scalar: Copy + Default + 'static {
	/// Destination name used in conversion errors.
	const NAME: &'static str;

	/// Convert a stored value into this type.
	fn from_stored(value: Stored) -> Self;
}

impl Scalar for u8 {
	const NAME: &'static str = "char";

	fn from_stored(value: Stored) -> Self {
		match value {
			Stored::Char(v) => v,
			Stored::Short(v) => v as u8,
			Stored::Int(v) => v as u8,
			Stored::Int64(v) => v as u8,
			Stored::Float(v) => (v * 255.0) as u8,
			Stored::Double(v) => (v * 255.0) as u8,
		}
	}
}

impl Scalar for i16 {
	const NAME: &'static str = "short";

	fn from_stored(value: Stored) -> Self {
		match value {
			Stored::Char(v) => i16::from(v),
			Stored::Short(v) => v,
			Stored::Int(v) => v as i16,
			Stored::Int64(v) => v as i16,
			Stored::Float(v) => (v.min(1.0) * 32767.0) as i16,
			Stored::Double(v) => (v * 32767.0) as i16,
		}
	}
}

impl Scalar for f32 {
	const NAME: &'static str = "float";

	fn from_stored(value: Stored) -> Self {
		match value {
			Stored::Char(v) => f32::from(v) / 255.0,
			Stored::Short(v) => f32::from(v) / 32767.0,
			Stored::Int(v) => v as f32,
			Stored::Int64(v) => v as f32,
			Stored::Float(v) => v,
			Stored::Double(v) => v as f32,
		}
	}
}

impl Scalar for f64 {
	const NAME: &'static str = "double";

	fn from_stored(value: Stored) -> Self {
		match value {
			Stored::Char(v) => f64::from(v) / 255.0,
			Stored::Short(v) => f64::from(v) / 32767.0,
			Stored::Int(v) => f64::from(v),
			Stored::Int64(v) => v as f64,
			Stored::Float(v) => f64::from(v),
			Stored::Double(v) => v,
		}
	}
}

macro_rules! plain_scalar {
	($($ty:ty => $name:literal),* $(,)?) => {$(
		impl Scalar for $ty {
			const NAME: &'static str = $name;

			#[allow(clippy::unnecessary_cast)]
			fn from_stored(value: Stored) -> Self {
				match value {
					Stored::Char(v) => v as $ty,
					Stored::Short(v) => v as $ty,
					Stored::Int(v) => v as $ty,
					Stored::Int64(v) => v as $ty,
					Stored::Float(v) => v as $ty,
					Stored::Double(v) => v as $ty,
				}
			}
		}
	)*};
}

plain_scalar!(i8 => "int8", i32 => "int", u32 => "uint", i64 => "int64");

#[cfg(test)]
mod tests {
	use super::{Encoding, Scalar, Stored};

	#[test]
	fn aliases_share_encodings() {
		assert_eq!(Encoding::of("uchar"), Some(Encoding::Char));
		assert_eq!(Encoding::of("bool"), Some(Encoding::Char));
		assert_eq!(Encoding::of("uint16_t"), Some(Encoding::Short));
		assert_eq!(Encoding::of("uint"), Some(Encoding::Int));
		assert_eq!(Encoding::of("uint64_t"), Some(Encoding::Int64));
		assert_eq!(Encoding::of("Object"), None);
		assert_eq!(Encoding::of("void"), None);
	}

	#[test]
	fn float_to_char_scales_by_255() {
		assert_eq!(u8::from_stored(Stored::Float(1.0)), 255);
		assert_eq!(u8::from_stored(Stored::Double(0.5)), 127);
		assert_eq!(u8::from_stored(Stored::Float(3.0)), 255);
	}

	#[test]
	fn char_to_float_divides_by_255() {
		assert_eq!(f32::from_stored(Stored::Char(255)), 1.0);
		assert_eq!(f64::from_stored(Stored::Char(0)), 0.0);
		assert!((f32::from_stored(Stored::Char(51)) - 0.2).abs() < 1e-6);
	}

	#[test]
	fn float_to_short_clamps_before_scaling() {
		assert_eq!(i16::from_stored(Stored::Float(2.0)), 32767);
		assert_eq!(i16::from_stored(Stored::Float(1.0)), 32767);
		assert_eq!(i16::from_stored(Stored::Float(-0.5)), -16383);
		assert_eq!(i16::from_stored(Stored::Double(0.5)), 16383);
	}

	#[test]
	fn short_to_float_divides_by_32767() {
		assert_eq!(f32::from_stored(Stored::Short(32767)), 1.0);
		assert_eq!(f64::from_stored(Stored::Short(-32767)), -1.0);
	}

	#[test]
	fn plain_numeric_casts() {
		assert_eq!(i32::from_stored(Stored::Short(-3)), -3);
		assert_eq!(i32::from_stored(Stored::Float(2.75)), 2);
		assert_eq!(i32::from_stored(Stored::Double(1e20)), i32::MAX);
		assert_eq!(u32::from_stored(Stored::Int(7)), 7);
		assert_eq!(i64::from_stored(Stored::Int64(-9)), -9);
		assert_eq!(f32::from_stored(Stored::Int(12)), 12.0);
		assert_eq!(i16::from_stored(Stored::Char(200)), 200);
	}
}
