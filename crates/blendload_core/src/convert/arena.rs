use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed link to an object stored in an [`Arena`].
pub struct Handle<T> {
	index: usize,
	marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
	pub(crate) fn new(index: usize) -> Self {
		Self { index, marker: PhantomData }
	}

	/// Arena slot index.
	pub fn index(self) -> usize {
		self.index
	}

	/// Forget the static type.
	pub fn erase(self) -> AnyHandle {
		AnyHandle { index: self.index }
	}
}

impl<T> Clone for Handle<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
	fn eq(&self, other: &Self) -> bool {
		self.index == other.index
	}
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.index.hash(state);
	}
}

impl<T> fmt::Debug for Handle<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = type_name::<T>().rsplit("::").next().unwrap_or("?");
		write!(f, "Handle<{name}>({})", self.index)
	}
}

/// Link whose static type is only known at resolution time.
///
/// The dynamic DNA type is recorded in the arena slot and read back with
/// [`Arena::dna_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnyHandle {
	index: usize,
}

impl AnyHandle {
	pub(crate) fn new(index: usize) -> Self {
		Self { index }
	}

	/// Arena slot index.
	pub fn index(self) -> usize {
		self.index
	}

	/// Recover a typed handle when the stored object is a `T`.
	pub fn downcast<T: 'static>(self, arena: &Arena) -> Option<Handle<T>> {
		arena.holds::<T>(self.index).then(|| Handle::new(self.index))
	}
}

struct Slot {
	value: Box<dyn Any>,
	type_id: TypeId,
	dna_type: Box<str>,
}

/// Owner of every object materialised through pointer resolution.
///
/// Objects link to each other by index, so reference cycles need no
/// shared ownership.
#[derive(Default)]
pub struct Arena {
	slots: Vec<Slot>,
}

impl fmt::Debug for Arena {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.slots.iter().map(|slot| &slot.dna_type)).finish()
	}
}

impl Arena {
	/// Empty arena.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn alloc(&mut self, value: Box<dyn Any>, dna_type: &str) -> usize {
		self.slots.push(Slot {
			type_id: (*value).type_id(),
			value,
			dna_type: dna_type.into(),
		});
		self.slots.len() - 1
	}

	/// Move an object out for population; the slot holds `()` until restored
	/// but still reports the original type through `holds`.
	pub(crate) fn take(&mut self, index: usize) -> Box<dyn Any> {
		std::mem::replace(&mut self.slots[index].value, Box::new(()))
	}

	pub(crate) fn restore(&mut self, index: usize, value: Box<dyn Any>) {
		self.slots[index].value = value;
	}

	pub(crate) fn holds<T: 'static>(&self, index: usize) -> bool {
		self.slots.get(index).is_some_and(|slot| slot.type_id == TypeId::of::<T>())
	}

	/// Borrow a typed object.
	pub fn get<T: 'static>(&self, handle: Handle<T>) -> Option<&T> {
		self.slots.get(handle.index)?.value.downcast_ref()
	}

	/// Borrow an untyped object as `T`.
	pub fn downcast<T: 'static>(&self, handle: AnyHandle) -> Option<&T> {
		self.slots.get(handle.index)?.value.downcast_ref()
	}

	/// DNA structure name recorded when the object was allocated.
	pub fn dna_type(&self, handle: AnyHandle) -> Option<&str> {
		self.slots.get(handle.index).map(|slot| slot.dna_type.as_ref())
	}

	/// All objects of type `T` in allocation order.
	pub fn iter<T: 'static>(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
		self.slots
			.iter()
			.enumerate()
			.filter_map(|(index, slot)| slot.value.downcast_ref::<T>().map(|value| (Handle::new(index), value)))
	}

	/// Number of allocated objects.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether nothing was allocated.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::{Arena, Handle};

	#[test]
	fn typed_and_untyped_access() {
		let mut arena = Arena::new();
		let index = arena.alloc(Box::new(41_u32), "Counter");
		let handle: Handle<u32> = Handle::new(index);

		assert_eq!(arena.get(handle), Some(&41));
		let any = handle.erase();
		assert_eq!(arena.dna_type(any), Some("Counter"));
		assert_eq!(any.downcast::<u32>(&arena), Some(handle));
		assert_eq!(any.downcast::<i64>(&arena), None);
		assert_eq!(arena.downcast::<i64>(any), None);
	}

	#[test]
	fn take_and_restore_keep_the_slot() {
		let mut arena = Arena::new();
		let index = arena.alloc(Box::new(String::from("a")), "Name");
		let mut value = arena.take(index);
		assert!(arena.holds::<String>(index), "type survives while taken");
		assert_eq!(arena.get(Handle::<String>::new(index)), None);
		if let Some(text) = value.downcast_mut::<String>() {
			text.push('b');
		}
		arena.restore(index, value);
		assert_eq!(arena.get(Handle::<String>::new(index)).map(String::as_str), Some("ab"));
	}

	#[test]
	fn iter_filters_by_type() {
		let mut arena = Arena::new();
		arena.alloc(Box::new(1_u8), "A");
		arena.alloc(Box::new(2_u16), "B");
		arena.alloc(Box::new(3_u8), "A");
		let found: Vec<_> = arena.iter::<u8>().map(|(handle, value)| (handle.index(), *value)).collect();
		assert_eq!(found, vec![(0, 1), (2, 3)]);
		assert_eq!(format!("{:?}", Handle::<u8>::new(2)), "Handle<u8>(2)");
	}
}
