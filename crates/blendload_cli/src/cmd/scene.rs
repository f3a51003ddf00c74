use std::path::PathBuf;

use blendload::blend::{BlendFile, Result};
use blendload::convert::ConvertOptions;
use blendload::scene::{LoadedScene, Mesh, Object, load_scene};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	/// Escalate every warn-level field failure to a hard error.
	#[arg(long)]
	pub strict: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

/// Convert the first scene and print its objects.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		json,
		strict,
		max_depth,
	} = args;

	let mut options = if strict { ConvertOptions::strict() } else { ConvertOptions::default() };
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}

	let blend = BlendFile::open(&path)?;
	let loaded = load_scene(&blend, options)?;
	let objects: Vec<_> = loaded.objects().into_iter().map(|object| object_summary(&loaded, object)).collect();
	let stats = loaded.statistics;

	if json {
		let payload = SceneJson {
			path: path.display().to_string(),
			scene: loaded.scene.id.short_name().to_owned(),
			camera: loaded.scene.camera.and_then(|handle| loaded.get(handle)).map(|item| item.id.short_name().to_owned()),
			objects,
			statistics: StatisticsJson {
				fields_read: stats.fields_read,
				pointers_resolved: stats.pointers_resolved,
				cache_hits: stats.cache_hits,
				cached_objects: stats.cached_objects,
			},
			warnings: loaded.warnings.iter().map(ToString::to_string).collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("scene: {}", loaded.scene.id.short_name());
	println!("objects: {}", objects.len());
	for object in &objects {
		println!(
			"  {} type={} parent={} data={}",
			object.name,
			object.kind,
			object.parent.as_deref().unwrap_or("-"),
			object.data.as_deref().unwrap_or("-")
		);
		if let Some(mesh) = &object.mesh {
			println!("    mesh verts={} edges={} faces={} materials=[{}]", mesh.verts, mesh.edges, mesh.faces, mesh.materials.join(", "));
		}
		if !object.modifiers.is_empty() {
			println!("    modifiers=[{}]", object.modifiers.join(", "));
		}
	}
	println!(
		"statistics: fields_read={} pointers_resolved={} cache_hits={} cached_objects={}",
		stats.fields_read, stats.pointers_resolved, stats.cache_hits, stats.cached_objects
	);
	println!("warnings: {}", loaded.warnings.len());
	for warning in &loaded.warnings {
		println!("  {warning}");
	}

	Ok(())
}

fn object_summary(loaded: &LoadedScene, object: &Object) -> ObjectJson {
	let mesh = object.data.and_then(|data| loaded.arena.downcast::<Mesh>(data));
	ObjectJson {
		name: object.id.short_name().to_owned(),
		kind: object.kind.as_str(),
		parent: object.parent.and_then(|handle| loaded.get(handle)).map(|item| item.id.short_name().to_owned()),
		data: object.data.and_then(|data| loaded.arena.dna_type(data)).map(str::to_owned),
		location: object.loc,
		mesh: mesh.map(|mesh| mesh_summary(loaded, mesh)),
		modifiers: loaded.modifiers(object).into_iter().map(|(kind, _)| kind.to_owned()).collect(),
	}
}

fn mesh_summary(loaded: &LoadedScene, mesh: &Mesh) -> MeshJson {
	MeshJson {
		verts: mesh.mvert.len(),
		edges: mesh.medge.len(),
		faces: mesh.mface.len().max(mesh.mpoly.len()),
		materials: mesh
			.mat
			.iter()
			.map(|slot| {
				slot.and_then(|handle| loaded.get(handle))
					.map(|material| material.id.short_name().to_owned())
					.unwrap_or_else(|| "-".to_owned())
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct MeshJson {
	verts: usize,
	edges: usize,
	faces: usize,
	materials: Vec<String>,
}

#[derive(serde::Serialize)]
struct ObjectJson {
	name: String,
	#[serde(rename = "type")]
	kind: &'static str,
	parent: Option<String>,
	data: Option<String>,
	location: [f32; 3],
	mesh: Option<MeshJson>,
	modifiers: Vec<String>,
}

#[derive(serde::Serialize)]
struct StatisticsJson {
	fields_read: u64,
	pointers_resolved: u64,
	cache_hits: u64,
	cached_objects: u64,
}

#[derive(serde::Serialize)]
struct SceneJson {
	path: String,
	scene: String,
	camera: Option<String>,
	objects: Vec<ObjectJson>,
	statistics: StatisticsJson,
	warnings: Vec<String>,
}
