use crate::blend::{Result, Structure};
use crate::convert::ErrorPolicy::{Fail, Ignore};
use crate::convert::{AnyHandle, Convert, Session};

/// Common header of every datablock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id {
	/// Datablock name including its two-letter type prefix (`OBCube`).
	pub name: String,
	/// Raw flag bits.
	pub flag: i16,
}

impl Id {
	/// Name without the two-letter type prefix.
	pub fn short_name(&self) -> &str {
		self.name.get(2..).unwrap_or(&self.name)
	}
}

impl Convert for Id {
	const DNA_NAME: &'static str = "ID";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_string(Fail, &mut self.name, structure, "name")?;
		session.read_scalar(Ignore, &mut self.flag, structure, "flag")?;
		Ok(())
	}
}

/// Head and tail of an intrusive list whose element type is only known per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListBase {
	/// First element.
	pub first: Option<AnyHandle>,
	/// Last element.
	pub last: Option<AnyHandle>,
}

impl Convert for ListBase {
	const DNA_NAME: &'static str = "ListBase";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_any_pointer(Ignore, &mut self.first, structure, "first", None)?;
		session.read_any_pointer(Ignore, &mut self.last, structure, "last", None)?;
		Ok(())
	}
}
