/// Parsed SDNA field declarator (`*next`, `mat[4][4]`, `(*func)()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldDecl<'a> {
	/// Identifier without pointer stars or array extents.
	pub ident: &'a str,
	/// Declarator stores a pointer (data or function).
	pub is_pointer: bool,
	/// Declarator carries at least one `[n]` extent.
	pub is_array: bool,
	/// Array extents; unused dimensions are `1`.
	pub dims: [usize; 2],
}

impl FieldDecl<'_> {
	/// Total number of stored elements.
	pub fn element_count(&self) -> usize {
		self.dims[0].saturating_mul(self.dims[1])
	}
}

/// Parse SDNA declarator text into identifier, pointer, and array metadata.
pub(crate) fn parse_field_decl(raw: &str) -> FieldDecl<'_> {
	let trimmed = raw.trim();

	if let Some(after) = trimmed.strip_prefix("(*") {
		let inside = after.split(')').next().unwrap_or(after);
		let ident = inside.trim_start_matches('*').trim();
		return FieldDecl {
			ident: if ident.is_empty() { trimmed } else { ident },
			is_pointer: true,
			is_array: false,
			dims: [1, 1],
		};
	}

	let stars = trimmed.chars().take_while(|c| *c == '*').count();
	let tail = &trimmed[stars..];
	let ident_end = tail.find('[').unwrap_or(tail.len());
	let ident = tail[..ident_end].trim();

	let mut dims = [1_usize; 2];
	let mut found = 0;
	let mut rest = &tail[ident_end..];
	while let Some(start) = rest.find('[') {
		let Some(len) = rest[start + 1..].find(']') else {
			break;
		};
		let end = start + 1 + len;
		let dim = rest[start + 1..end].trim().parse::<usize>().unwrap_or(1);
		if found < 2 {
			dims[found] = dim;
		} else {
			dims[1] = dims[1].saturating_mul(dim);
		}
		found += 1;
		rest = &rest[end + 1..];
	}

	FieldDecl {
		ident: if ident.is_empty() { trimmed } else { ident },
		is_pointer: stars > 0,
		is_array: found > 0,
		dims,
	}
}
