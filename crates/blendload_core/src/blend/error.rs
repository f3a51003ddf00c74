use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BlendError>;

/// Errors produced while reading `.blend` containers and converting their object graph.
#[derive(Debug, Error)]
pub enum BlendError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Unknown leading file magic.
	#[error("unsupported compression or not a .blend (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompressed stream did not start with `BLENDER`.
	#[error("decompressed data does not start with BLENDER magic")]
	NotBlendAfterDecompress,
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Invalid or malformed file header.
	#[error("invalid header")]
	InvalidHeader,
	/// Unsupported container format version.
	#[error("unsupported file format version {version} (expected 0 or 1)")]
	UnsupportedFormatVersion {
		/// Parsed format version.
		version: u16,
	},
	/// Header size marker implies an unsupported pointer layout.
	#[error("unsupported pointer layout (header size {header_size})")]
	UnsupportedPointerSize {
		/// Header size or pointer width that was rejected.
		header_size: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Seek target lies beyond the end of the stream.
	#[error("seek to {pos} outside stream of {len} bytes")]
	SeekOutOfRange {
		/// Requested absolute position.
		pos: usize,
		/// Stream length.
		len: usize,
	},
	/// Block payload length was negative.
	#[error("negative block length {len}")]
	NegativeBlockLength {
		/// Parsed signed length.
		len: i64,
	},
	/// Block element count was negative.
	#[error("negative block count {nr}")]
	NegativeBlockCount {
		/// Parsed signed element count.
		nr: i64,
	},
	/// Block payload would exceed remaining file data.
	#[error("block length {len} at offset {at} exceeds remaining {rem}")]
	BlockLenOutOfRange {
		/// Block header file offset.
		at: usize,
		/// Declared payload length.
		len: u64,
		/// Remaining bytes in cursor.
		rem: usize,
	},
	/// Requested block code was not found.
	#[error("block not found: {code:?}")]
	BlockNotFound {
		/// Requested 4-byte block code.
		code: [u8; 4],
	},
	/// No DNA1 block was found.
	#[error("DNA1 block not found")]
	DnaNotFound,
	/// Unexpected DNA section tag.
	#[error("DNA tag mismatch at {at}: expected {expected:?}, got {got:?}")]
	DnaBadTag {
		/// Expected section tag.
		expected: [u8; 4],
		/// Actual section tag.
		got: [u8; 4],
		/// Cursor offset of the tag read.
		at: usize,
	},
	/// Out-of-range index inside DNA tables.
	#[error("DNA index out of range for {kind}: idx={idx}, max={max}")]
	DnaIndexOutOfRange {
		/// Logical index kind being validated.
		kind: &'static str,
		/// Offending index value.
		idx: u32,
		/// Maximum valid index.
		max: u32,
	},
	/// Duplicate type->struct mapping in DNA `STRC` section.
	#[error("DNA duplicate struct type index {type_idx}: first={first}, second={second}")]
	DnaDuplicateStructType {
		/// Duplicate type index.
		type_idx: u16,
		/// First struct index observed.
		first: u32,
		/// Second struct index observed.
		second: u32,
	},
	/// Field layout runs past the structure's declared byte size.
	#[error("DNA layout overflow in {struct_name}.{field}: end={end}, size={size}")]
	DnaLayoutOverflow {
		/// Structure being laid out.
		struct_name: String,
		/// Field that crossed the boundary.
		field: String,
		/// Computed end offset of the field.
		end: usize,
		/// Declared structure size.
		size: usize,
	},
	/// Primitive type declares a size that disagrees with its encoding.
	#[error("DNA primitive {type_name} declares {declared} bytes, expected {expected}")]
	DnaPrimitiveSize {
		/// Primitive type name from the `TYPE` table.
		type_name: String,
		/// Size found in `TLEN`.
		declared: usize,
		/// Width of the stored encoding.
		expected: usize,
	},
	/// Requested structure name is not part of the schema.
	#[error("schema structure not found: {name}")]
	SchemaNotFound {
		/// Requested structure name.
		name: String,
	},
	/// Block declares an SDNA index with no structure behind it.
	#[error("block references missing SDNA struct index {sdna_nr}")]
	UnknownSdna {
		/// Missing SDNA struct index.
		sdna_nr: u32,
	},
	/// Structure has no field with the requested name.
	#[error("field {field} not found in {struct_name}")]
	FieldNotFound {
		/// Structure that was searched.
		struct_name: String,
		/// Requested field name.
		field: String,
	},
	/// Declared and expected types disagree.
	#[error("type mismatch: expected {expected}, got {got}")]
	TypeMismatch {
		/// What the reader expected.
		expected: String,
		/// What the file declares.
		got: String,
	},
	/// No conversion rule between stored and destination encodings.
	#[error("unsupported conversion from {from} to {to}")]
	UnsupportedConversion {
		/// Declared DNA type of the stored value.
		from: String,
		/// Destination scalar type.
		to: &'static str,
	},
	/// Pointer does not land inside any indexed block.
	#[error("invalid pointer 0x{ptr:016x}")]
	InvalidPointer {
		/// Pointer value that failed to resolve.
		ptr: u64,
	},
	/// Dynamic type has no registered converter.
	#[error("no converter registered for {type_name}")]
	UnknownType {
		/// DNA structure name declared by the target block.
		type_name: String,
	},
	/// Recursive population exceeded the configured depth.
	#[error("conversion depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Root block stores a different structure than requested.
	#[error("root block stores {got}, expected {expected}")]
	RootTypeMismatch {
		/// Requested root structure.
		expected: &'static str,
		/// Structure declared by the block.
		got: String,
	},
}

impl BlendError {
	/// Whether a per-field error policy may absorb this error.
	///
	/// Corruption, missing schema, and resource limits always propagate.
	pub fn is_recoverable(&self) -> bool {
		matches!(
			self,
			Self::FieldNotFound { .. } | Self::TypeMismatch { .. } | Self::UnsupportedConversion { .. } | Self::UnknownType { .. }
		)
	}
}
