use crate::blend::{Result, Structure};
use crate::convert::ErrorPolicy::{Fail, Ignore, Warn};
use crate::convert::{Convert, Handle, Session};
use crate::scene::{Id, Material};

/// Polygon mesh datablock.
#[derive(Debug, Default)]
pub struct Mesh {
	/// Datablock header.
	pub id: Id,
	/// Declared vertex count.
	pub totvert: i32,
	/// Declared edge count.
	pub totedge: i32,
	/// Declared legacy face count.
	pub totface: i32,
	/// Declared loop count.
	pub totloop: i32,
	/// Declared polygon count.
	pub totpoly: i32,
	/// Vertices.
	pub mvert: Vec<MVert>,
	/// Edges.
	pub medge: Vec<MEdge>,
	/// Legacy tessellated faces.
	pub mface: Vec<MFace>,
	/// Face corners.
	pub mloop: Vec<MLoop>,
	/// Polygons over `mloop`.
	pub mpoly: Vec<MPoly>,
	/// Active UV layer, one entry per loop.
	pub mloopuv: Vec<MLoopUV>,
	/// Active colour layer, one entry per loop.
	pub mloopcol: Vec<MLoopCol>,
	/// Material slots.
	pub mat: Vec<Option<Handle<Material>>>,
}

impl Convert for Mesh {
	const DNA_NAME: &'static str = "Mesh";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		session.read_scalar(Fail, &mut self.totvert, structure, "totvert")?;
		session.read_scalar(Fail, &mut self.totedge, structure, "totedge")?;
		session.read_scalar(Fail, &mut self.totface, structure, "totface")?;
		session.read_scalar(Ignore, &mut self.totloop, structure, "totloop")?;
		session.read_scalar(Ignore, &mut self.totpoly, structure, "totpoly")?;

		session.read_pointer_vec(Fail, &mut self.mvert, structure, "mvert")?;
		session.read_pointer_vec(Warn, &mut self.medge, structure, "medge")?;
		session.read_pointer_vec(Fail, &mut self.mface, structure, "mface")?;
		session.read_pointer_vec(Ignore, &mut self.mloop, structure, "mloop")?;
		session.read_pointer_vec(Ignore, &mut self.mpoly, structure, "mpoly")?;
		session.read_pointer_vec(Ignore, &mut self.mloopuv, structure, "mloopuv")?;
		session.read_pointer_vec(Ignore, &mut self.mloopcol, structure, "mloopcol")?;
		session.read_pointer_array(Fail, &mut self.mat, structure, "mat")?;
		Ok(())
	}
}

/// Vertex position and normal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MVert {
	/// Position.
	pub co: [f32; 3],
	/// Normal, rescaled from the stored shorts.
	pub no: [f32; 3],
	/// Selection and visibility bits.
	pub flag: u8,
}

impl Convert for MVert {
	const DNA_NAME: &'static str = "MVert";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_array(Fail, &mut self.co, structure, "co")?;
		session.read_array(Ignore, &mut self.no, structure, "no")?;
		session.read_scalar(Ignore, &mut self.flag, structure, "flag")?;
		Ok(())
	}
}

/// Edge between two vertices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MEdge {
	/// First vertex index.
	pub v1: i32,
	/// Second vertex index.
	pub v2: i32,
	/// Subdivision crease weight.
	pub crease: u8,
	/// Edge flags.
	pub flag: i16,
}

impl Convert for MEdge {
	const DNA_NAME: &'static str = "MEdge";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_scalar(Fail, &mut self.v1, structure, "v1")?;
		session.read_scalar(Fail, &mut self.v2, structure, "v2")?;
		session.read_scalar(Ignore, &mut self.crease, structure, "crease")?;
		session.read_scalar(Warn, &mut self.flag, structure, "flag")?;
		Ok(())
	}
}

/// Legacy triangle or quad; `v4 == 0` marks a triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MFace {
	/// Vertex indices.
	pub v: [i32; 4],
	/// Material slot.
	pub mat_nr: i16,
	/// Face flags.
	pub flag: u8,
}

impl Convert for MFace {
	const DNA_NAME: &'static str = "MFace";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		for (slot, name) in self.v.iter_mut().zip(["v1", "v2", "v3", "v4"]) {
			session.read_scalar(Fail, slot, structure, name)?;
		}
		session.read_scalar(Fail, &mut self.mat_nr, structure, "mat_nr")?;
		session.read_scalar(Ignore, &mut self.flag, structure, "flag")?;
		Ok(())
	}
}

/// Face corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MLoop {
	/// Vertex index.
	pub v: i32,
	/// Edge index.
	pub e: i32,
}

impl Convert for MLoop {
	const DNA_NAME: &'static str = "MLoop";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_scalar(Ignore, &mut self.v, structure, "v")?;
		session.read_scalar(Ignore, &mut self.e, structure, "e")?;
		Ok(())
	}
}

/// Polygon as a run of loops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MPoly {
	/// First loop index.
	pub loopstart: i32,
	/// Number of loops.
	pub totloop: i32,
	/// Material slot.
	pub mat_nr: i16,
	/// Polygon flags.
	pub flag: u8,
}

impl Convert for MPoly {
	const DNA_NAME: &'static str = "MPoly";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_scalar(Ignore, &mut self.loopstart, structure, "loopstart")?;
		session.read_scalar(Ignore, &mut self.totloop, structure, "totloop")?;
		session.read_scalar(Ignore, &mut self.mat_nr, structure, "mat_nr")?;
		session.read_scalar(Ignore, &mut self.flag, structure, "flag")?;
		Ok(())
	}
}

/// Per-loop texture coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MLoopUV {
	/// UV coordinate.
	pub uv: [f32; 2],
	/// Selection bits.
	pub flag: i32,
}

impl Convert for MLoopUV {
	const DNA_NAME: &'static str = "MLoopUV";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_array(Ignore, &mut self.uv, structure, "uv")?;
		session.read_scalar(Ignore, &mut self.flag, structure, "flag")?;
		Ok(())
	}
}

/// Per-loop byte colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MLoopCol {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha.
	pub a: u8,
}

impl Convert for MLoopCol {
	const DNA_NAME: &'static str = "MLoopCol";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_scalar(Ignore, &mut self.r, structure, "r")?;
		session.read_scalar(Ignore, &mut self.g, structure, "g")?;
		session.read_scalar(Ignore, &mut self.b, structure, "b")?;
		session.read_scalar(Ignore, &mut self.a, structure, "a")?;
		Ok(())
	}
}
