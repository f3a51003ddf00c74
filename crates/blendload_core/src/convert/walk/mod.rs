use crate::blend::{Result, Structure};
use crate::convert::{Convert, ErrorPolicy, Handle, Session};

/// Node of a doubly-linked, circular list that is only walked forward.
pub trait ChainNode: Convert {
	/// Field holding the forward link.
	const NEXT_FIELD: &'static str;

	/// Populate every field except the forward and backward links.
	fn convert_payload(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()>;

	/// Store the resolved forward link.
	fn set_next(&mut self, next: Option<Handle<Self>>);

	/// Null the backward link; it is never resolved.
	fn clear_prev(&mut self);
}

/// Populate `head` and every node reachable through its forward links.
///
/// The walk keeps one pending `(node, offset)` pair instead of recursing, so
/// list length does not grow the stack. It stops at a null link, a failed
/// link, or a node that is already in the identity cache. The cursor is
/// restored to the head on return.
pub fn walk_chain<T: ChainNode>(session: &mut Session<'_>, head: &mut T, structure: &Structure) -> Result<usize> {
	let start = session.position();
	let mut visited = 1;
	let mut pending = step(session, head, structure);

	while let Ok(Some((handle, offset))) = pending {
		session.seek(offset)?;
		pending = session.populate_handle(handle, |session, node| step(session, node, structure));
		visited += 1;
	}

	session.seek(start)?;
	pending.map(|_| visited)
}

/// Convert one node in place and return the next fresh node, if any.
fn step<T: ChainNode>(session: &mut Session<'_>, node: &mut T, structure: &Structure) -> Result<Option<(Handle<T>, usize)>> {
	let here = session.position();
	node.clear_prev();
	node.convert_payload(session, structure)?;

	let mut next = None;
	let from_cache = session.read_pointer_non_recursive(ErrorPolicy::Warn, &mut next, structure, T::NEXT_FIELD)?;
	node.set_next(next);

	match next {
		Some(handle) if !from_cache => Ok(Some((handle, session.position()))),
		_ => {
			session.seek(here)?;
			Ok(None)
		}
	}
}

#[cfg(test)]
mod tests;
