use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::blend::compression::decode_bytes;
use crate::blend::{BlendError, BlendHeader, Block, BlockIndex, BlockIter, Compression, Dna, Result};

/// Decoded `.blend` stream with its parsed header.
pub struct BlendFile {
	/// Parsed file header.
	pub header: BlendHeader,
	/// Compression detected on the source bytes.
	pub compression: Compression,
	bytes: Vec<u8>,
}

impl BlendFile {
	/// Read, decompress, and parse the header of a file on disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let raw = fs::read(path)?;
		tracing::debug!(path = %path.display(), bytes = raw.len(), "read blend file");
		Self::from_bytes(raw)
	}

	/// Decompress and parse an in-memory stream.
	pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
		let (compression, bytes) = decode_bytes(raw)?;
		let header = BlendHeader::parse(&bytes)?;
		if header.header_size > bytes.len() {
			return Err(BlendError::InvalidHeader);
		}
		tracing::debug!(
			compression = compression.as_str(),
			version = header.version,
			pointer_size = header.pointer_size,
			endianness = header.endianness.as_str(),
			"parsed blend header"
		);

		Ok(Self { header, compression, bytes })
	}

	/// Decoded bytes backing this file.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Iterate blocks from the end of the file header through `ENDB`.
	pub fn blocks(&self) -> BlockIter<'_> {
		BlockIter::new(&self.bytes, self.header.header_size, self.header)
	}

	/// Parse the first `DNA1` block into a schema.
	pub fn dna(&self) -> Result<Dna> {
		let block = self.find_first_block_by_code(*b"DNA1")?.ok_or(BlendError::DnaNotFound)?;
		let dna = Dna::parse(block.payload, self.header.endianness, self.header.pointer_size)?;
		tracing::debug!(structures = dna.structures().len(), types = dna.types.len(), "parsed DNA");
		Ok(dna)
	}

	/// Build the address index over all data blocks.
	pub fn block_index(&self) -> Result<BlockIndex> {
		let index = BlockIndex::build(self.blocks())?;
		tracing::debug!(blocks = index.len(), "built block index");
		Ok(index)
	}

	/// Find the first block carrying a four-byte code.
	pub fn find_first_block_by_code(&self, code: [u8; 4]) -> Result<Option<Block<'_>>> {
		for block in self.blocks() {
			let block = block?;
			if block.head.code == code {
				return Ok(Some(block));
			}
		}
		Ok(None)
	}

	/// Count blocks by code in one linear pass.
	pub fn scan_block_stats(&self) -> Result<BlockStats> {
		let mut stats = BlockStats::default();
		for block in self.blocks() {
			let block = block?;
			stats.block_count += 1;
			stats.last_code = block.head.code;
			*stats.codes.entry(block.head.code).or_insert(0) += 1;
			stats.has_dna1 |= block.head.is_dna();
			stats.has_endb |= block.head.is_endb();
		}
		Ok(stats)
	}
}

/// Block counts gathered by [`BlendFile::scan_block_stats`].
#[derive(Debug, Default)]
pub struct BlockStats {
	/// Number of parsed blocks, `ENDB` included.
	pub block_count: u32,
	/// A `DNA1` block was seen.
	pub has_dna1: bool,
	/// The `ENDB` terminator was seen.
	pub has_endb: bool,
	/// Code of the final block visited.
	pub last_code: [u8; 4],
	/// Frequency table by block code.
	pub codes: HashMap<[u8; 4], u32>,
}

#[cfg(test)]
mod tests;
