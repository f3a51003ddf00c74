use crate::blend::{Result, Structure};
use crate::convert::ErrorPolicy::{Fail, Ignore, Warn};
use crate::convert::{AnyHandle, Convert, Handle, Session};
use crate::scene::{Id, Object};

/// Environment datablock.
#[derive(Debug, Default)]
pub struct World {
	/// Datablock header.
	pub id: Id,
	/// Horizon colour.
	pub horizon: [f32; 3],
	/// Ambient colour.
	pub ambient: [f32; 3],
}

impl Convert for World {
	const DNA_NAME: &'static str = "World";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		for (channel, name) in self.horizon.iter_mut().zip(["horr", "horg", "horb"]) {
			session.read_scalar(Warn, channel, structure, name)?;
		}
		for (channel, name) in self.ambient.iter_mut().zip(["ambr", "ambg", "ambb"]) {
			session.read_scalar(Ignore, channel, structure, name)?;
		}
		Ok(())
	}
}

/// Header shared by every modifier, embedded as the first member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierData {
	/// Next modifier in the stack, of any modifier type.
	pub next: Option<AnyHandle>,
	/// Previous modifier in the stack.
	pub prev: Option<AnyHandle>,
	/// Modifier kind.
	pub kind: i32,
	/// Viewport/render enable bits.
	pub mode: i32,
	/// User-visible name.
	pub name: String,
}

impl Convert for ModifierData {
	const DNA_NAME: &'static str = "ModifierData";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_any_pointer(Warn, &mut self.next, structure, "next", None)?;
		session.read_any_pointer(Warn, &mut self.prev, structure, "prev", None)?;
		session.read_scalar(Ignore, &mut self.kind, structure, "type")?;
		session.read_scalar(Ignore, &mut self.mode, structure, "mode")?;
		session.read_string(Ignore, &mut self.name, structure, "name")?;
		Ok(())
	}
}

/// Subdivision surface modifier.
#[derive(Debug, Default)]
pub struct SubsurfModifierData {
	/// Modifier header.
	pub modifier: ModifierData,
	/// Subdivision scheme.
	pub subdiv_type: i16,
	/// Viewport levels.
	pub levels: i16,
	/// Render levels.
	pub render_levels: i16,
	/// Flags.
	pub flags: i16,
}

impl Convert for SubsurfModifierData {
	const DNA_NAME: &'static str = "SubsurfModifierData";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.modifier, structure, "modifier")?;
		session.read_scalar(Warn, &mut self.subdiv_type, structure, "subdivType")?;
		session.read_scalar(Fail, &mut self.levels, structure, "levels")?;
		session.read_scalar(Ignore, &mut self.render_levels, structure, "renderLevels")?;
		session.read_scalar(Ignore, &mut self.flags, structure, "flags")?;
		Ok(())
	}
}

/// Mirror modifier.
#[derive(Debug, Default)]
pub struct MirrorModifierData {
	/// Modifier header.
	pub modifier: ModifierData,
	/// Mirror axis bits.
	pub axis: i16,
	/// Flags.
	pub flag: i16,
	/// Merge distance.
	pub tolerance: f32,
	/// Object used as the mirror centre.
	pub mirror_ob: Option<Handle<Object>>,
}

impl Convert for MirrorModifierData {
	const DNA_NAME: &'static str = "MirrorModifierData";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.modifier, structure, "modifier")?;
		session.read_scalar(Fail, &mut self.axis, structure, "axis")?;
		session.read_scalar(Ignore, &mut self.flag, structure, "flag")?;
		session.read_scalar(Warn, &mut self.tolerance, structure, "tolerance")?;
		session.read_pointer(Ignore, &mut self.mirror_ob, structure, "mirror_ob")?;
		Ok(())
	}
}
