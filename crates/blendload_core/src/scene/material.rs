use crate::blend::{Result, Structure};
use crate::convert::ErrorPolicy::{Fail, Ignore, Warn};
use crate::convert::{Convert, Handle, Session};
use crate::scene::Id;

/// Number of texture slots on a material.
pub const MAX_MTEX: usize = 18;

/// Surface material.
#[derive(Debug, Default)]
pub struct Material {
	/// Datablock header.
	pub id: Id,
	/// Diffuse colour.
	pub diffuse: [f32; 3],
	/// Specular colour.
	pub specular: [f32; 3],
	/// Ambient colour.
	pub ambient: [f32; 3],
	/// Opacity.
	pub alpha: f32,
	/// Emission strength.
	pub emit: f32,
	/// Texture slots.
	pub mtex: [Option<Handle<MTex>>; MAX_MTEX],
}

impl Convert for Material {
	const DNA_NAME: &'static str = "Material";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		let colours = [
			(&mut self.diffuse, ["r", "g", "b"]),
			(&mut self.specular, ["specr", "specg", "specb"]),
			(&mut self.ambient, ["ambr", "ambg", "ambb"]),
		];
		for (rgb, names) in colours {
			for (channel, name) in rgb.iter_mut().zip(names) {
				session.read_scalar(Warn, channel, structure, name)?;
			}
		}
		session.read_scalar(Warn, &mut self.alpha, structure, "alpha")?;
		session.read_scalar(Warn, &mut self.emit, structure, "emit")?;
		session.read_pointer_slots(Ignore, &mut self.mtex, structure, "mtex")?;
		Ok(())
	}
}

/// Texture slot: how a texture is mapped onto a material.
#[derive(Debug, Default)]
pub struct MTex {
	/// Texture coordinate source bits.
	pub texco: i16,
	/// Material channels affected.
	pub mapto: i16,
	/// Blend mode.
	pub blendtype: i16,
	/// Mapped texture.
	pub tex: Option<Handle<Tex>>,
	/// UV layer name.
	pub uvname: String,
	/// Coordinate offset.
	pub ofs: [f32; 3],
	/// Coordinate scale.
	pub size: [f32; 3],
	/// Colour influence.
	pub colfac: f32,
	/// Normal influence.
	pub norfac: f32,
}

impl Convert for MTex {
	const DNA_NAME: &'static str = "MTex";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_scalar(Ignore, &mut self.texco, structure, "texco")?;
		session.read_scalar(Ignore, &mut self.mapto, structure, "mapto")?;
		session.read_scalar(Ignore, &mut self.blendtype, structure, "blendtype")?;
		session.read_pointer(Ignore, &mut self.tex, structure, "tex")?;
		session.read_string(Ignore, &mut self.uvname, structure, "uvname")?;
		session.read_array(Ignore, &mut self.ofs, structure, "ofs")?;
		session.read_array(Ignore, &mut self.size, structure, "size")?;
		session.read_scalar(Ignore, &mut self.colfac, structure, "colfac")?;
		session.read_scalar(Ignore, &mut self.norfac, structure, "norfac")?;
		Ok(())
	}
}

/// Texture datablock.
#[derive(Debug, Default)]
pub struct Tex {
	/// Datablock header.
	pub id: Id,
	/// Texture kind (`8` is an image texture).
	pub kind: i16,
	/// Image flags.
	pub imaflag: i16,
	/// Source image for image textures.
	pub ima: Option<Handle<Image>>,
}

impl Convert for Tex {
	const DNA_NAME: &'static str = "Tex";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Warn, &mut self.id, structure, "id")?;
		session.read_scalar(Fail, &mut self.kind, structure, "type")?;
		session.read_scalar(Ignore, &mut self.imaflag, structure, "imaflag")?;
		session.read_pointer(Warn, &mut self.ima, structure, "ima")?;
		Ok(())
	}
}

/// Image datablock.
#[derive(Debug, Default)]
pub struct Image {
	/// Datablock header.
	pub id: Id,
	/// File path, often relative with a `//` prefix.
	pub filepath: String,
	/// Image source kind.
	pub source: i16,
	/// Image type.
	pub kind: i16,
}

impl Convert for Image {
	const DNA_NAME: &'static str = "Image";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		session.read_string(Warn, &mut self.filepath, structure, "name")?;
		session.read_scalar(Ignore, &mut self.source, structure, "source")?;
		session.read_scalar(Ignore, &mut self.kind, structure, "type")?;
		Ok(())
	}
}
