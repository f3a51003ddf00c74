use std::fmt;

/// Per-field fault handling, chosen at each read call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorPolicy {
	/// Abort population of the surrounding structure.
	Fail,
	/// Log, record a [`ConvertWarning`], keep the destination unchanged.
	Warn,
	/// Keep the destination unchanged without logging.
	Ignore,
}

impl ErrorPolicy {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Fail => "fail",
			Self::Warn => "warn",
			Self::Ignore => "ignore",
		}
	}

	/// Policy after applying strict mode, which turns `Warn` into `Fail`.
	pub fn escalate(self, strict: bool) -> Self {
		match self {
			Self::Warn if strict => Self::Fail,
			other => other,
		}
	}
}

/// One recovered fault, recorded alongside the `tracing` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertWarning {
	/// Structure whose field was being read.
	pub structure: String,
	/// Field identifier.
	pub field: String,
	/// Rendered error or degradation message.
	pub message: String,
}

impl fmt::Display for ConvertWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}: {}", self.structure, self.field, self.message)
	}
}

#[cfg(test)]
mod tests {
	use super::{ConvertWarning, ErrorPolicy};

	#[test]
	fn strict_only_escalates_warn() {
		assert_eq!(ErrorPolicy::Warn.escalate(true), ErrorPolicy::Fail);
		assert_eq!(ErrorPolicy::Warn.escalate(false), ErrorPolicy::Warn);
		assert_eq!(ErrorPolicy::Ignore.escalate(true), ErrorPolicy::Ignore);
		assert_eq!(ErrorPolicy::Fail.escalate(false), ErrorPolicy::Fail);
	}

	#[test]
	fn warning_renders_location() {
		let warning = ConvertWarning {
			structure: "Object".to_owned(),
			field: "parent".to_owned(),
			message: "invalid".to_owned(),
		};
		assert_eq!(warning.to_string(), "Object.parent: invalid");
	}
}
