use crate::blend::{BlendError, Block, Result};

/// One addressable block: a virtual address range mapped onto the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileBlock {
	/// Four-byte block code.
	pub code: [u8; 4],
	/// Absolute stream offset of the first payload byte.
	pub start: usize,
	/// Virtual base address of the payload.
	pub address: u64,
	/// Payload size in bytes.
	pub size: usize,
	/// SDNA index of the structure stored in the payload.
	pub sdna_nr: u32,
	/// Number of consecutive structure instances.
	pub count: u64,
}

impl FileBlock {
	/// Exclusive end of the address range.
	pub fn end(&self) -> u64 {
		self.address.saturating_add(self.size as u64)
	}

	/// Stream offset corresponding to `address`, which must lie in this block.
	pub fn stream_offset(&self, address: u64) -> usize {
		self.start + (address - self.address) as usize
	}
}

impl From<&Block<'_>> for FileBlock {
	fn from(block: &Block<'_>) -> Self {
		Self {
			code: block.head.code,
			start: block.payload_offset,
			address: block.head.old,
			size: block.payload.len(),
			sdna_nr: block.head.sdna_nr,
			count: block.head.nr,
		}
	}
}

/// Blocks sorted by virtual address, with disjoint address ranges.
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
	entries: Vec<FileBlock>,
}

impl BlockIndex {
	/// Build an index from arbitrary blocks.
	///
	/// Blocks without an address or payload are skipped. When ranges overlap
	/// the lower block keeps its range and the overlapping one is dropped.
	pub fn new(blocks: impl IntoIterator<Item = FileBlock>) -> Self {
		let mut entries: Vec<FileBlock> = blocks.into_iter().filter(|block| block.address != 0 && block.size > 0).collect();
		entries.sort_by_key(|block| block.address);

		let mut kept: Vec<FileBlock> = Vec::with_capacity(entries.len());
		for block in entries {
			if let Some(prev) = kept.last()
				&& block.address < prev.end()
			{
				tracing::warn!(
					address = format_args!("0x{:016x}", block.address),
					previous = format_args!("0x{:016x}", prev.address),
					"overlapping block address range dropped"
				);
				continue;
			}
			kept.push(block);
		}

		Self { entries: kept }
	}

	/// Build the index from a block iterator, excluding `DNA1` and `ENDB`.
	pub fn build<'a>(blocks: impl IntoIterator<Item = Result<Block<'a>>>) -> Result<Self> {
		let mut out = Vec::new();
		for block in blocks {
			let block = block?;
			if block.head.is_dna() || block.head.is_endb() {
				continue;
			}
			out.push(FileBlock::from(&block));
		}
		Ok(Self::new(out))
	}

	/// Find the block whose half-open range `[address, address + size)` holds `ptr`.
	pub fn locate(&self, ptr: u64) -> Result<&FileBlock> {
		let idx = self.entries.partition_point(|block| block.address <= ptr);
		let block = idx.checked_sub(1).map(|idx| &self.entries[idx]).ok_or(BlendError::InvalidPointer { ptr })?;
		if ptr >= block.end() {
			return Err(BlendError::InvalidPointer { ptr });
		}
		Ok(block)
	}

	/// All indexed blocks in address order.
	pub fn entries(&self) -> &[FileBlock] {
		&self.entries
	}

	/// Number of indexed blocks.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the index holds no blocks.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
