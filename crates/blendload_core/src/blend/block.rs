use crate::blend::bytes::Cursor;
use crate::blend::{BHead, BlendError, BlendHeader, Result};

/// Borrowed view over one block record.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
	/// Parsed block header.
	pub head: BHead,
	/// Raw payload bytes.
	pub payload: &'a [u8],
	/// Absolute offset of the block header.
	pub file_offset: usize,
	/// Absolute offset of the first payload byte.
	pub payload_offset: usize,
}

/// Iterator over contiguous block records, stopping after `ENDB`.
pub struct BlockIter<'a> {
	cursor: Cursor<'a>,
	header: BlendHeader,
	done: bool,
}

impl<'a> BlockIter<'a> {
	/// Create a block iterator over the whole stream, starting at `offset`.
	pub fn new(bytes: &'a [u8], offset: usize, header: BlendHeader) -> Self {
		let mut cursor = Cursor::with_layout(bytes, header.endianness, header.pointer_size);
		let done = cursor.seek(offset).is_err();
		Self { cursor, header, done }
	}

	fn next_block(&mut self) -> Result<Block<'a>> {
		let file_offset = self.cursor.pos();
		let head = BHead::parse(&mut self.cursor, &self.header)?;

		let rem = self.cursor.remaining();
		let payload_len = usize::try_from(head.len).ok().filter(|len| *len <= rem).ok_or(BlendError::BlockLenOutOfRange {
			at: file_offset,
			len: head.len,
			rem,
		})?;

		let payload_offset = self.cursor.pos();
		let payload = self.cursor.read_exact(payload_len)?;
		Ok(Block {
			head,
			payload,
			file_offset,
			payload_offset,
		})
	}
}

impl<'a> Iterator for BlockIter<'a> {
	type Item = Result<Block<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done || self.cursor.remaining() == 0 {
			self.done = true;
			return None;
		}

		let block = self.next_block();
		match &block {
			Ok(item) if !item.head.is_endb() => {}
			_ => self.done = true,
		}
		Some(block)
	}
}
