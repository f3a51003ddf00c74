/// Conversion limits and policy overrides for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
	/// Maximum nesting of recursive structure population.
	pub max_depth: u32,
	/// Treat every `Warn` policy as `Fail`.
	pub strict: bool,
}

impl Default for ConvertOptions {
	fn default() -> Self {
		Self { max_depth: 256, strict: false }
	}
}

impl ConvertOptions {
	/// Default limits with warnings escalated to failures.
	pub fn strict() -> Self {
		Self {
			strict: true,
			..Self::default()
		}
	}
}

/// Counters updated while converting. Purely observational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
	/// Field read calls, successful or recovered.
	pub fields_read: u64,
	/// Non-null pointers resolved to an object, cached or fresh.
	pub pointers_resolved: u64,
	/// Resolutions answered by the identity cache.
	pub cache_hits: u64,
	/// Objects inserted into the identity cache.
	pub cached_objects: u64,
}
