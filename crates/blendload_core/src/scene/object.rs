use crate::blend::{Result, Structure};
use crate::convert::ErrorPolicy::{Fail, Ignore, Warn};
use crate::convert::{AnyHandle, ChainNode, Convert, Handle, Session, walk_chain};
use crate::scene::{Id, ListBase, Material, World};

/// Scene root.
#[derive(Debug, Default)]
pub struct Scene {
	/// Datablock header.
	pub id: Id,
	/// Active camera object.
	pub camera: Option<Handle<Object>>,
	/// Environment settings.
	pub world: Option<Handle<World>>,
	/// Active base.
	pub basact: Option<Handle<Base>>,
	/// Object instances placed in the scene (`Base` elements).
	pub base: ListBase,
}

impl Convert for Scene {
	const DNA_NAME: &'static str = "Scene";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		session.read_pointer(Warn, &mut self.camera, structure, "camera")?;
		session.read_pointer(Warn, &mut self.world, structure, "world")?;
		session.read_pointer(Warn, &mut self.basact, structure, "basact")?;
		session.read_struct(Ignore, &mut self.base, structure, "base")?;
		Ok(())
	}
}

/// One object placement in a scene's circular base list.
#[derive(Debug, Default)]
pub struct Base {
	/// Following base; the last one links back to the first.
	pub next: Option<Handle<Base>>,
	/// Always `None`: the list is only read forward.
	pub prev: Option<Handle<Base>>,
	/// Placed object.
	pub object: Option<Handle<Object>>,
}

impl Convert for Base {
	const DNA_NAME: &'static str = "Base";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		walk_chain(session, self, structure).map(|_| ())
	}
}

impl ChainNode for Base {
	const NEXT_FIELD: &'static str = "next";

	fn convert_payload(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_pointer(Warn, &mut self.object, structure, "object")?;
		Ok(())
	}

	fn set_next(&mut self, next: Option<Handle<Self>>) {
		self.next = next;
	}

	fn clear_prev(&mut self) {
		self.prev = None;
	}
}

/// Object kind stored in `Object.type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObjectType {
	/// Transform only, no data.
	#[default]
	Empty,
	/// Polygon mesh.
	Mesh,
	/// Curve.
	Curve,
	/// NURBS surface.
	Surface,
	/// Text.
	Font,
	/// Metaball.
	MetaBall,
	/// Light source.
	Lamp,
	/// Camera.
	Camera,
	/// Any other raw value.
	Other(i16),
}

impl ObjectType {
	/// Decode the raw `type` value.
	pub fn from_raw(raw: i16) -> Self {
		match raw {
			0 => Self::Empty,
			1 => Self::Mesh,
			2 => Self::Curve,
			3 => Self::Surface,
			4 => Self::Font,
			5 => Self::MetaBall,
			10 => Self::Lamp,
			11 => Self::Camera,
			other => Self::Other(other),
		}
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Empty => "empty",
			Self::Mesh => "mesh",
			Self::Curve => "curve",
			Self::Surface => "surface",
			Self::Font => "font",
			Self::MetaBall => "metaball",
			Self::Lamp => "lamp",
			Self::Camera => "camera",
			Self::Other(_) => "other",
		}
	}

	/// DNA types `Object.data` may point to for this kind, if it is read at all.
	pub fn data_types(self) -> Option<&'static [&'static str]> {
		match self {
			Self::Mesh => Some(&["Mesh"]),
			Self::Lamp => Some(&["Lamp"]),
			Self::Camera => Some(&["Camera"]),
			_ => None,
		}
	}
}

/// Placed object with transform, hierarchy, and data link.
#[derive(Debug, Default)]
pub struct Object {
	/// Datablock header.
	pub id: Id,
	/// Object kind.
	pub kind: ObjectType,
	/// World matrix, row per basis vector.
	pub obmat: [[f32; 4]; 4],
	/// Inverse parent matrix at parenting time.
	pub parentinv: [[f32; 4]; 4],
	/// Location.
	pub loc: [f32; 3],
	/// Euler rotation in radians.
	pub rot: [f32; 3],
	/// Scale.
	pub size: [f32; 3],
	/// Parent object.
	pub parent: Option<Handle<Object>>,
	/// Kind-specific data (`Mesh`, `Lamp`, `Camera`).
	pub data: Option<AnyHandle>,
	/// Object-level material slots.
	pub mat: Vec<Option<Handle<Material>>>,
	/// Modifier stack (`*ModifierData` elements).
	pub modifiers: ListBase,
}

impl Convert for Object {
	const DNA_NAME: &'static str = "Object";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		let mut raw_type = 0_i16;
		session.read_scalar(Fail, &mut raw_type, structure, "type")?;
		self.kind = ObjectType::from_raw(raw_type);

		session.read_array_2d(Warn, &mut self.obmat, structure, "obmat")?;
		session.read_array_2d(Warn, &mut self.parentinv, structure, "parentinv")?;
		session.read_array(Warn, &mut self.loc, structure, "loc")?;
		session.read_array(Warn, &mut self.rot, structure, "rot")?;
		session.read_array(Warn, &mut self.size, structure, "size")?;
		session.read_pointer(Warn, &mut self.parent, structure, "parent")?;
		if let Some(accept) = self.kind.data_types() {
			session.read_any_pointer(Fail, &mut self.data, structure, "data", Some(accept))?;
		}
		session.read_pointer_array(Ignore, &mut self.mat, structure, "mat")?;
		session.read_struct(Ignore, &mut self.modifiers, structure, "modifiers")?;
		Ok(())
	}
}

/// Camera datablock.
#[derive(Debug, Default)]
pub struct Camera {
	/// Datablock header.
	pub id: Id,
	/// Projection (`0` perspective, `1` orthographic).
	pub kind: i16,
	/// Flags.
	pub flag: i16,
	/// Focal length in millimetres.
	pub lens: f32,
	/// Sensor width in millimetres.
	pub sensor_x: f32,
	/// Near clip distance.
	pub clip_start: f32,
	/// Far clip distance.
	pub clip_end: f32,
}

impl Convert for Camera {
	const DNA_NAME: &'static str = "Camera";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		session.read_scalar(Warn, &mut self.kind, structure, "type")?;
		session.read_scalar(Warn, &mut self.flag, structure, "flag")?;
		session.read_scalar(Warn, &mut self.lens, structure, "lens")?;
		session.read_scalar(Warn, &mut self.sensor_x, structure, "sensor_x")?;
		session.read_scalar(Ignore, &mut self.clip_start, structure, "clipsta")?;
		session.read_scalar(Ignore, &mut self.clip_end, structure, "clipend")?;
		Ok(())
	}
}

/// Light datablock.
#[derive(Debug, Default)]
pub struct Lamp {
	/// Datablock header.
	pub id: Id,
	/// Light kind (`0` point, `1` sun, `2` spot, `4` area).
	pub kind: i16,
	/// Flags.
	pub flag: i16,
	/// Colour.
	pub colour: [f32; 3],
	/// Intensity.
	pub energy: f32,
	/// Falloff distance.
	pub dist: f32,
	/// Spot cone angle.
	pub spotsize: f32,
	/// Spot edge softness.
	pub spotblend: f32,
}

impl Convert for Lamp {
	const DNA_NAME: &'static str = "Lamp";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_struct(Fail, &mut self.id, structure, "id")?;
		session.read_scalar(Fail, &mut self.kind, structure, "type")?;
		session.read_scalar(Ignore, &mut self.flag, structure, "flag")?;
		for (channel, name) in self.colour.iter_mut().zip(["r", "g", "b"]) {
			session.read_scalar(Warn, channel, structure, name)?;
		}
		session.read_scalar(Warn, &mut self.energy, structure, "energy")?;
		session.read_scalar(Ignore, &mut self.dist, structure, "dist")?;
		session.read_scalar(Ignore, &mut self.spotsize, structure, "spotsize")?;
		session.read_scalar(Ignore, &mut self.spotblend, structure, "spotblend")?;
		Ok(())
	}
}
