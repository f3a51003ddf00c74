use std::collections::HashMap;

/// Identity map from `(structure cache slot, address)` to arena index.
///
/// An entry exists from the moment an object is allocated, before its
/// fields are populated.
#[derive(Debug, Default)]
pub(crate) struct ObjectCache {
	slots: Vec<HashMap<u64, usize>>,
	len: usize,
}

impl ObjectCache {
	pub fn get(&self, slot: usize, address: u64) -> Option<usize> {
		self.slots.get(slot)?.get(&address).copied()
	}

	pub fn insert(&mut self, slot: usize, address: u64, index: usize) {
		if self.slots.len() <= slot {
			self.slots.resize_with(slot + 1, HashMap::new);
		}
		if self.slots[slot].insert(address, index).is_none() {
			self.len += 1;
		}
	}

	pub fn len(&self) -> usize {
		self.len
	}
}
