//! Scene-graph types for the subset of Blender data an importer consumes,
//! and the entry point that loads them from a file.

use std::collections::HashSet;

use crate::blend::{BlendError, BlendFile, Result};
use crate::convert::{AnyHandle, Arena, ConvertOptions, ConvertWarning, ConverterRegistry, Handle, Session, Statistics};

mod id;
mod material;
mod mesh;
mod object;
mod world;

/// Datablock header and untyped list head.
pub use id::{Id, ListBase};
/// Materials and their texture chain.
pub use material::{Image, MAX_MTEX, MTex, Material, Tex};
/// Mesh data and its element arrays.
pub use mesh::{MEdge, MFace, MLoop, MLoopCol, MLoopUV, MPoly, MVert, Mesh};
/// Scene, placements, objects, and object data.
pub use object::{Base, Camera, Lamp, Object, ObjectType, Scene};
/// Environment and modifiers.
pub use world::{MirrorModifierData, ModifierData, SubsurfModifierData, World};

const SCENE_CODE: [u8; 4] = *b"SC\0\0";

/// Register a converter for every scene-graph type.
pub fn register_converters(registry: &mut ConverterRegistry) -> &mut ConverterRegistry {
	registry
		.register::<Id>()
		.register::<ListBase>()
		.register::<Scene>()
		.register::<Base>()
		.register::<Object>()
		.register::<Camera>()
		.register::<Lamp>()
		.register::<World>()
		.register::<Mesh>()
		.register::<MVert>()
		.register::<MEdge>()
		.register::<MFace>()
		.register::<MLoop>()
		.register::<MPoly>()
		.register::<MLoopUV>()
		.register::<MLoopCol>()
		.register::<Material>()
		.register::<MTex>()
		.register::<Tex>()
		.register::<Image>()
		.register::<ModifierData>()
		.register::<SubsurfModifierData>()
		.register::<MirrorModifierData>()
}

/// Registry holding every scene-graph converter.
pub fn scene_registry() -> ConverterRegistry {
	let mut registry = ConverterRegistry::new();
	register_converters(&mut registry);
	registry
}

/// Result of [`load_scene`]: the root scene plus everything it reaches.
#[derive(Debug)]
pub struct LoadedScene {
	/// Root scene, owned directly.
	pub scene: Scene,
	/// Objects reached through pointers.
	pub arena: Arena,
	/// Engine counters.
	pub statistics: Statistics,
	/// Recovered faults.
	pub warnings: Vec<ConvertWarning>,
}

impl LoadedScene {
	/// Borrow a typed object.
	pub fn get<T: 'static>(&self, handle: Handle<T>) -> Option<&T> {
		self.arena.get(handle)
	}

	/// Bases in list order, starting at `scene.base.first`.
	///
	/// Stops at a null link or the first repeated node.
	pub fn bases(&self) -> Vec<&Base> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		let mut next = self.scene.base.first.and_then(|first| first.downcast::<Base>(&self.arena));
		while let Some(handle) = next
			&& seen.insert(handle)
		{
			let Some(base) = self.arena.get(handle) else {
				break;
			};
			out.push(base);
			next = base.next;
		}
		out
	}

	/// Objects placed in the scene, in base order.
	pub fn objects(&self) -> Vec<&Object> {
		self.bases()
			.into_iter()
			.filter_map(|base| base.object.and_then(|handle| self.arena.get(handle)))
			.collect()
	}

	/// Modifier stack of `object` as `(dna type, handle)` pairs.
	///
	/// Modifiers whose type had no converter are absent.
	pub fn modifiers(&self, object: &Object) -> Vec<(&str, AnyHandle)> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		let mut next = object.modifiers.first;
		while let Some(handle) = next
			&& seen.insert(handle)
		{
			let Some(kind) = self.arena.dna_type(handle) else {
				break;
			};
			out.push((kind, handle));
			next = self.modifier_header(handle).and_then(|header| header.next);
		}
		out
	}

	fn modifier_header(&self, handle: AnyHandle) -> Option<&ModifierData> {
		if let Some(subsurf) = self.arena.downcast::<SubsurfModifierData>(handle) {
			return Some(&subsurf.modifier);
		}
		if let Some(mirror) = self.arena.downcast::<MirrorModifierData>(handle) {
			return Some(&mirror.modifier);
		}
		self.arena.downcast::<ModifierData>(handle)
	}
}

/// Load the first `SC` block of `file` as a [`Scene`] and resolve everything
/// it references.
pub fn load_scene(file: &BlendFile, options: ConvertOptions) -> Result<LoadedScene> {
	let dna = file.dna()?;
	let index = file.block_index()?;
	let registry = scene_registry();

	let block = file.find_first_block_by_code(SCENE_CODE)?.ok_or(BlendError::BlockNotFound { code: SCENE_CODE })?;
	let structure = dna.structure(block.head.sdna_nr)?;
	if structure.name() != "Scene" {
		return Err(BlendError::RootTypeMismatch {
			expected: "Scene",
			got: structure.name().to_owned(),
		});
	}
	tracing::debug!(offset = block.payload_offset, "loading scene root");

	let mut session = Session::new(file.bytes(), &dna, &index, &registry, options);
	session.seek(block.payload_offset)?;
	let mut scene = Scene::default();
	session.populate(&mut scene, structure)?;

	let output = session.finish();
	Ok(LoadedScene {
		scene,
		arena: output.arena,
		statistics: output.statistics,
		warnings: output.warnings,
	})
}

#[cfg(test)]
mod tests;
