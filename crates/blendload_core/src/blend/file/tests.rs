use blendload_testkit::{BlendBuilder, write_temp};

use crate::blend::{BlendError, BlendFile, Compression, Endianness};

fn two_block_file(builder: BlendBuilder) -> Vec<u8> {
	let mut builder = builder;
	let sdna = builder.define("Pair", &[("int", "a"), ("float", "b")]);
	let first = builder.payload().int(7).float(0.5).finish();
	let second = builder.payload().int(8).float(1.5).int(9).float(2.5).finish();
	builder.block("DATA", sdna, 0x1000, 1, first).block("DATA", sdna, 0x2000, 2, second);
	builder.build()
}

#[test]
fn legacy_file_scans_blocks_and_dna() {
	let blend = BlendFile::from_bytes(two_block_file(BlendBuilder::new())).expect("opens");
	assert_eq!(blend.compression, Compression::None);
	assert_eq!(blend.header.header_size, 12);
	assert_eq!(blend.header.pointer_size, 8);

	let stats = blend.scan_block_stats().expect("scan");
	assert_eq!(stats.block_count, 4);
	assert!(stats.has_dna1);
	assert!(stats.has_endb);
	assert_eq!(stats.last_code, *b"ENDB");
	assert_eq!(stats.codes.get(b"DATA"), Some(&2));

	let dna = blend.dna().expect("dna");
	assert_eq!(dna.lookup("Pair").expect("Pair").size(), 8);
}

#[test]
fn block_index_excludes_dna_and_terminator() {
	let blend = BlendFile::from_bytes(two_block_file(BlendBuilder::new())).expect("opens");
	let index = blend.block_index().expect("index");
	assert_eq!(index.len(), 2);

	let second = index.locate(0x2008).expect("second element");
	assert_eq!(second.address, 0x2000);
	assert_eq!(second.count, 2);
	assert_eq!(second.size, 16);
	assert_eq!(&blend.bytes()[second.start..second.start + 4], 8_i32.to_le_bytes().as_slice());
}

#[test]
fn large_headers_are_read() {
	let blend = BlendFile::from_bytes(two_block_file(BlendBuilder::new().large_headers())).expect("opens");
	assert_eq!(blend.header.header_size, 17);
	assert_eq!(blend.header.format_version, 1);
	assert_eq!(blend.block_index().expect("index").len(), 2);
}

#[test]
fn big_endian_32bit_file_is_read() {
	let blend = BlendFile::from_bytes(two_block_file(BlendBuilder::with_layout(4, true))).expect("opens");
	assert_eq!(blend.header.pointer_size, 4);
	assert_eq!(blend.header.endianness, Endianness::Big);
	let index = blend.block_index().expect("index");
	let first = index.locate(0x1000).expect("first");
	assert_eq!(&blend.bytes()[first.start..first.start + 4], 7_i32.to_be_bytes().as_slice());
}

#[test]
fn zstd_file_opens_from_disk() {
	let raw = two_block_file(BlendBuilder::new());
	let packed = zstd::stream::encode_all(raw.as_slice(), 3).expect("encode");
	let path = write_temp("zstd_file_opens_from_disk.blend", &packed);

	let blend = BlendFile::open(&path).expect("opens");
	assert_eq!(blend.compression, Compression::Zstd);
	assert_eq!(blend.bytes(), raw.as_slice());
}

#[test]
fn missing_dna_is_reported() {
	let mut raw = b"BLENDER-v279".to_vec();
	raw.extend_from_slice(b"ENDB");
	raw.extend_from_slice(&[0_u8; 20]);
	let blend = BlendFile::from_bytes(raw).expect("header parses");
	assert!(matches!(blend.dna(), Err(BlendError::DnaNotFound)));
}

#[test]
fn truncated_block_is_reported() {
	let mut raw = two_block_file(BlendBuilder::new());
	raw.truncate(12 + 24 + 4);
	let blend = BlendFile::from_bytes(raw).expect("header parses");
	assert!(matches!(blend.scan_block_stats(), Err(BlendError::BlockLenOutOfRange { .. })));
}
