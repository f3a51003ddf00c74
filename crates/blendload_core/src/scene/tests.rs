use blendload_testkit::{BlendBuilder, Payload};

use crate::blend::{BlendError, BlendFile};
use crate::convert::{ConvertOptions, Handle};
use crate::scene::{
	Camera, Image, Lamp, LoadedScene, MAX_MTEX, MTex, Material, Mesh, MirrorModifierData, ObjectType, SubsurfModifierData, Tex, World,
	load_scene,
};

const SCENE: u64 = 0x1000;
const BASES: [u64; 3] = [0x2000, 0x2100, 0x2200];
const OB_CUBE: u64 = 0x3000;
const OB_CAMERA: u64 = 0x3100;
const OB_LAMP: u64 = 0x3200;
const MESH: u64 = 0x4000;
const MVERTS: u64 = 0x4100;
const MEDGES: u64 = 0x4200;
const MFACES: u64 = 0x4300;
const MESH_MATS: u64 = 0x4400;
const MATERIAL: u64 = 0x5000;
const MTEX: u64 = 0x5100;
const TEX: u64 = 0x5200;
const IMAGE: u64 = 0x5300;
const CAMERA: u64 = 0x6000;
const LAMP: u64 = 0x6100;
const WORLD: u64 = 0x6200;
const SUBSURF: u64 = 0x7000;
const MIRROR: u64 = 0x7100;
const ARRAY: u64 = 0x7200;

const IDENTITY: [f32; 16] = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];

struct Variant {
	pointer_size: usize,
	big_endian: bool,
	cube_type: i16,
	array_modifier: bool,
	root_code: &'static str,
}

impl Default for Variant {
	fn default() -> Self {
		Self {
			pointer_size: 8,
			big_endian: false,
			cube_type: 1,
			array_modifier: false,
			root_code: "SC",
		}
	}
}

fn id(payload: Payload, name: &str) -> Payload {
	payload.ptr(0).ptr(0).chars(name, 24).short(0).short(0)
}

fn object(payload: Payload, name: &str, kind: i16, loc: [f32; 3], data: u64, modifiers: (u64, u64)) -> Vec<u8> {
	id(payload, name)
		.short(kind)
		.short(0)
		.floats(&IDENTITY)
		.floats(&IDENTITY)
		.floats(&loc)
		.floats(&[0.0, 0.0, 0.0])
		.floats(&[1.0, 1.0, 1.0])
		.ptr(0)
		.ptr(data)
		.ptr(0)
		.ptr(modifiers.0)
		.ptr(modifiers.1)
		.finish()
}

fn modifier_header(payload: Payload, next: u64, prev: u64, kind: i32, name: &str) -> Payload {
	payload.ptr(next).ptr(prev).int(kind).int(3).chars(name, 32)
}

/// A scene with a textured mesh, a camera, and a lamp, each on its own base.
fn scene_file(variant: &Variant) -> Vec<u8> {
	let mut b = BlendBuilder::with_layout(variant.pointer_size, variant.big_endian);
	b.define("ID", &[("void", "*next"), ("void", "*prev"), ("char", "name[24]"), ("short", "flag"), ("short", "pad")]);
	b.define("ListBase", &[("void", "*first"), ("void", "*last")]);
	let scene = b.define(
		"Scene",
		&[("ID", "id"), ("Object", "*camera"), ("World", "*world"), ("Base", "*basact"), ("ListBase", "base")],
	);
	let base = b.define("Base", &[("Base", "*next"), ("Base", "*prev"), ("Object", "*object")]);
	let object_nr = b.define(
		"Object",
		&[
			("ID", "id"),
			("short", "type"),
			("short", "pad"),
			("float", "obmat[4][4]"),
			("float", "parentinv[4][4]"),
			("float", "loc[3]"),
			("float", "rot[3]"),
			("float", "size[3]"),
			("Object", "*parent"),
			("void", "*data"),
			("Material", "**mat"),
			("ListBase", "modifiers"),
		],
	);
	let mesh = b.define(
		"Mesh",
		&[
			("ID", "id"),
			("int", "totvert"),
			("int", "totedge"),
			("int", "totface"),
			("MVert", "*mvert"),
			("MEdge", "*medge"),
			("MFace", "*mface"),
			("Material", "**mat"),
		],
	);
	let mvert = b.define("MVert", &[("float", "co[3]"), ("short", "no[3]"), ("char", "flag"), ("char", "pad")]);
	let medge = b.define("MEdge", &[("int", "v1"), ("int", "v2"), ("char", "crease"), ("char", "pad"), ("short", "flag")]);
	let mface = b.define(
		"MFace",
		&[("int", "v1"), ("int", "v2"), ("int", "v3"), ("int", "v4"), ("short", "mat_nr"), ("char", "edcode"), ("char", "flag")],
	);
	let material = b.define(
		"Material",
		&[
			("ID", "id"),
			("float", "r"),
			("float", "g"),
			("float", "b"),
			("float", "specr"),
			("float", "specg"),
			("float", "specb"),
			("float", "ambr"),
			("float", "ambg"),
			("float", "ambb"),
			("float", "alpha"),
			("float", "emit"),
			("MTex", "*mtex[18]"),
		],
	);
	let mtex = b.define(
		"MTex",
		&[
			("short", "texco"),
			("short", "mapto"),
			("short", "blendtype"),
			("short", "pad"),
			("Tex", "*tex"),
			("char", "uvname[32]"),
			("float", "ofs[3]"),
			("float", "size[3]"),
			("float", "colfac"),
			("float", "norfac"),
		],
	);
	let tex = b.define("Tex", &[("ID", "id"), ("short", "type"), ("short", "imaflag"), ("Image", "*ima")]);
	let image = b.define("Image", &[("ID", "id"), ("char", "name[64]"), ("short", "source"), ("short", "type")]);
	let camera = b.define(
		"Camera",
		&[
			("ID", "id"),
			("short", "type"),
			("short", "flag"),
			("float", "lens"),
			("float", "sensor_x"),
			("float", "clipsta"),
			("float", "clipend"),
		],
	);
	let lamp = b.define(
		"Lamp",
		&[("ID", "id"), ("short", "type"), ("short", "flag"), ("float", "r"), ("float", "g"), ("float", "b"), ("float", "energy")],
	);
	let world = b.define("World", &[("ID", "id"), ("float", "horr"), ("float", "horg"), ("float", "horb")]);
	b.define(
		"ModifierData",
		&[("ModifierData", "*next"), ("ModifierData", "*prev"), ("int", "type"), ("int", "mode"), ("char", "name[32]")],
	);
	let subsurf = b.define(
		"SubsurfModifierData",
		&[("ModifierData", "modifier"), ("short", "subdivType"), ("short", "levels"), ("short", "renderLevels"), ("short", "flags")],
	);
	let mirror = b.define(
		"MirrorModifierData",
		&[("ModifierData", "modifier"), ("short", "axis"), ("short", "flag"), ("float", "tolerance"), ("Object", "*mirror_ob")],
	);
	let array = b.define("ArrayModifierData", &[("ModifierData", "modifier"), ("int", "count"), ("int", "pad")]);

	let root_sdna = if variant.root_code == "SC" { scene } else { world };
	let scene_payload = id(b.payload(), "SCScene").ptr(OB_CAMERA).ptr(WORLD).ptr(BASES[0]).ptr(BASES[0]).ptr(BASES[2]).finish();
	b.block(variant.root_code, root_sdna, SCENE, 1, scene_payload);

	let placed = [OB_CUBE, OB_CAMERA, OB_LAMP];
	for (idx, addr) in BASES.iter().enumerate() {
		let next = BASES.get(idx + 1).copied().unwrap_or(0);
		let prev = if idx == 0 { 0 } else { BASES[idx - 1] };
		let payload = b.payload().ptr(next).ptr(prev).ptr(placed[idx]).finish();
		b.block("DATA", base, *addr, 1, payload);
	}

	let cube = object(b.payload(), "OBCube", variant.cube_type, [1.0, 2.0, 3.0], MESH, (SUBSURF, MIRROR));
	b.block("OB", object_nr, OB_CUBE, 1, cube);
	let cam = object(b.payload(), "OBCamera", 11, [0.0, -10.0, 5.0], CAMERA, (0, 0));
	b.block("OB", object_nr, OB_CAMERA, 1, cam);
	let light = object(b.payload(), "OBLamp", 10, [4.0, 1.0, 6.0], LAMP, (0, 0));
	b.block("OB", object_nr, OB_LAMP, 1, light);

	let mesh_payload = id(b.payload(), "MECube").int(4).int(2).int(1).ptr(MVERTS).ptr(MEDGES).ptr(MFACES).ptr(MESH_MATS).finish();
	b.block("ME", mesh, MESH, 1, mesh_payload);

	let corners = [[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]];
	let mut verts = b.payload();
	for co in corners {
		verts = verts.floats(&co).short(0).short(0).short(32767).char(1).char(0);
	}
	b.block("DATA", mvert, MVERTS, 4, verts.finish());

	let edges = b.payload().int(0).int(1).char(0).char(0).short(3).int(1).int(2).char(255).char(0).short(0).finish();
	b.block("DATA", medge, MEDGES, 2, edges);
	let faces = b.payload().int(0).int(1).int(2).int(3).short(0).char(0).char(2).finish();
	b.block("DATA", mface, MFACES, 1, faces);
	let mats = b.payload().ptr(MATERIAL).finish();
	b.block("DATA", 0, MESH_MATS, 1, mats);

	let mut material_payload = id(b.payload(), "MAWood")
		.floats(&[0.8, 0.5, 0.2])
		.floats(&[1.0, 1.0, 1.0])
		.floats(&[0.0, 0.0, 0.0])
		.float(1.0)
		.float(0.0)
		.ptr(MTEX);
	for _ in 1..MAX_MTEX {
		material_payload = material_payload.ptr(0);
	}
	b.block("MA", material, MATERIAL, 1, material_payload.finish());

	let mtex_payload = b
		.payload()
		.short(16)
		.short(1)
		.short(0)
		.short(0)
		.ptr(TEX)
		.chars("UVMap", 32)
		.floats(&[0.0, 0.0, 0.0])
		.floats(&[1.0, 1.0, 1.0])
		.float(1.0)
		.float(0.5)
		.finish();
	b.block("DATA", mtex, MTEX, 1, mtex_payload);
	let tex_payload = id(b.payload(), "TEGrain").short(8).short(0).ptr(IMAGE).finish();
	b.block("TE", tex, TEX, 1, tex_payload);
	let image_payload = id(b.payload(), "IMwood.png").chars("//textures/wood.png", 64).short(1).short(0).finish();
	b.block("IM", image, IMAGE, 1, image_payload);

	let camera_payload = id(b.payload(), "CACamera").short(0).short(0).float(35.0).float(36.0).float(0.1).float(100.0).finish();
	b.block("CA", camera, CAMERA, 1, camera_payload);
	let lamp_payload = id(b.payload(), "LALight").short(0).short(0).floats(&[1.0, 0.9, 0.8]).float(2.5).finish();
	b.block("LA", lamp, LAMP, 1, lamp_payload);
	let world_payload = id(b.payload(), "WOWorld").floats(&[0.05, 0.1, 0.2]).finish();
	b.block("WO", world, WORLD, 1, world_payload);

	let subsurf_payload = modifier_header(b.payload(), MIRROR, 0, 1, "Subsurf").short(0).short(2).short(3).short(0).finish();
	b.block("DATA", subsurf, SUBSURF, 1, subsurf_payload);
	let after_mirror = if variant.array_modifier { ARRAY } else { 0 };
	let mirror_payload = modifier_header(b.payload(), after_mirror, SUBSURF, 5, "Mirror")
		.short(1)
		.short(0)
		.float(0.001)
		.ptr(0)
		.finish();
	b.block("DATA", mirror, MIRROR, 1, mirror_payload);
	if variant.array_modifier {
		let array_payload = modifier_header(b.payload(), 0, MIRROR, 12, "Array").int(4).int(0).finish();
		b.block("DATA", array, ARRAY, 1, array_payload);
	}

	b.build()
}

fn load(variant: &Variant, options: ConvertOptions) -> crate::blend::Result<LoadedScene> {
	let file = BlendFile::from_bytes(scene_file(variant)).expect("file parses");
	load_scene(&file, options)
}

fn assert_full_scene(loaded: &LoadedScene) {
	assert_eq!(loaded.scene.id.name, "SCScene");
	let names: Vec<_> = loaded.objects().iter().map(|item| item.id.short_name().to_owned()).collect();
	assert_eq!(names, ["Cube", "Camera", "Lamp"]);

	let bases = loaded.bases();
	assert_eq!(bases.len(), 3);
	assert!(bases.iter().all(|base| base.prev.is_none()), "backward links are never resolved");
	assert_eq!(loaded.scene.camera, bases[1].object, "scene camera and base share one object");
	assert_eq!(loaded.scene.basact.and_then(|handle| loaded.get(handle)).map(|base| base.object), Some(bases[0].object));

	let cube = loaded.objects()[0];
	assert_eq!(cube.kind, ObjectType::Mesh);
	assert_eq!(cube.loc, [1.0, 2.0, 3.0]);
	assert_eq!(cube.obmat[3], [0.0, 0.0, 0.0, 1.0]);
	let mesh = cube.data.and_then(|data| loaded.arena.downcast::<Mesh>(data)).expect("cube carries a mesh");
	assert_eq!(mesh.id.name, "MECube");
	assert_eq!((mesh.totvert, mesh.totedge, mesh.totface), (4, 2, 1));
	assert_eq!(mesh.mvert.len(), 4);
	assert_eq!(mesh.mvert[2].co, [1.0, 1.0, 0.0]);
	assert_eq!(mesh.mvert[0].no, [0.0, 0.0, 1.0]);
	assert_eq!(mesh.medge.len(), 2);
	assert_eq!((mesh.medge[1].v1, mesh.medge[1].v2, mesh.medge[1].crease), (1, 2, 255));
	assert_eq!(mesh.mface[0].v, [0, 1, 2, 3]);
	assert!(mesh.mloop.is_empty());

	let material = mesh.mat[0].and_then(|handle| loaded.get(handle)).expect("material slot");
	assert_eq!(material.id.short_name(), "Wood");
	assert_eq!(material.diffuse, [0.8, 0.5, 0.2]);
	assert!(material.mtex[1..].iter().all(Option::is_none));
	let slot: &MTex = material.mtex[0].and_then(|handle| loaded.get(handle)).expect("texture slot");
	assert_eq!(slot.uvname, "UVMap");
	assert_eq!(slot.norfac, 0.5);
	let texture: &Tex = slot.tex.and_then(|handle| loaded.get(handle)).expect("texture");
	assert_eq!(texture.kind, 8);
	let image: &Image = texture.ima.and_then(|handle| loaded.get(handle)).expect("image");
	assert_eq!(image.filepath, "//textures/wood.png");

	let camera_ob = loaded.objects()[1];
	assert_eq!(camera_ob.kind, ObjectType::Camera);
	let camera = camera_ob.data.and_then(|data| loaded.arena.downcast::<Camera>(data)).expect("camera data");
	assert_eq!((camera.lens, camera.sensor_x, camera.clip_end), (35.0, 36.0, 100.0));

	let lamp = loaded.objects()[2].data.and_then(|data| loaded.arena.downcast::<Lamp>(data)).expect("lamp data");
	assert_eq!(lamp.colour, [1.0, 0.9, 0.8]);
	assert_eq!(lamp.energy, 2.5);

	let world: &World = loaded.scene.world.and_then(|handle| loaded.get(handle)).expect("world");
	assert_eq!(world.horizon, [0.05, 0.1, 0.2]);
	assert_eq!(world.ambient, [0.0, 0.0, 0.0]);
}

#[test]
fn loads_full_scene_graph() {
	let loaded = load(&Variant::default(), ConvertOptions::default()).expect("scene loads");
	assert_full_scene(&loaded);
	assert!(loaded.warnings.is_empty(), "unexpected warnings: {:?}", loaded.warnings);
	assert!(loaded.statistics.cache_hits > 0);
	assert!(loaded.statistics.cached_objects > 0);
}

#[test]
fn big_endian_32_bit_file_reads_the_same() {
	let variant = Variant {
		pointer_size: 4,
		big_endian: true,
		..Variant::default()
	};
	let loaded = load(&variant, ConvertOptions::default()).expect("scene loads");
	assert_full_scene(&loaded);
	assert!(loaded.warnings.is_empty());
}

#[test]
fn modifier_stack_follows_dynamic_types() {
	let loaded = load(&Variant::default(), ConvertOptions::default()).expect("scene loads");
	let cube = loaded.objects()[0];
	let stack = loaded.modifiers(cube);
	let kinds: Vec<_> = stack.iter().map(|(kind, _)| *kind).collect();
	assert_eq!(kinds, ["SubsurfModifierData", "MirrorModifierData"]);

	let subsurf = loaded.arena.downcast::<SubsurfModifierData>(stack[0].1).expect("subsurf");
	assert_eq!((subsurf.levels, subsurf.render_levels), (2, 3));
	assert_eq!(subsurf.modifier.name, "Subsurf");
	let mirror = loaded.arena.downcast::<MirrorModifierData>(stack[1].1).expect("mirror");
	assert_eq!(mirror.axis, 1);
	assert_eq!(mirror.modifier.prev, Some(stack[0].1), "back link hits the identity cache");
}

#[test]
fn unknown_modifier_type_drops_the_link_with_one_warning() {
	let variant = Variant {
		array_modifier: true,
		..Variant::default()
	};
	let loaded = load(&variant, ConvertOptions::strict()).expect("unknown types never fail the load");
	assert_eq!(loaded.modifiers(loaded.objects()[0]).len(), 2);
	assert_eq!(loaded.warnings.len(), 1, "{:?}", loaded.warnings);
	let warning = &loaded.warnings[0];
	assert_eq!((warning.structure.as_str(), warning.field.as_str()), ("ModifierData", "next"));
	assert!(warning.message.contains("ArrayModifierData"));
}

#[test]
fn object_data_outside_the_accept_list_drops_the_object() {
	let variant = Variant {
		cube_type: 11,
		..Variant::default()
	};
	let loaded = load(&variant, ConvertOptions::default()).expect("base.object recovers");
	assert_eq!(loaded.warnings.len(), 1, "{:?}", loaded.warnings);
	assert_eq!(loaded.warnings[0].structure, "Base");
	assert_eq!(loaded.warnings[0].field, "object");
	assert!(loaded.bases()[0].object.is_none());
	assert_eq!(loaded.objects().len(), 2);

	let err = load(&variant, ConvertOptions::strict()).expect_err("strict escalates");
	assert!(matches!(err, BlendError::TypeMismatch { ref got, .. } if got == "Mesh"));
}

#[test]
fn empty_object_skips_its_data_link() {
	let variant = Variant {
		cube_type: 0,
		..Variant::default()
	};
	let loaded = load(&variant, ConvertOptions::default()).expect("scene loads");
	let cube = loaded.objects()[0];
	assert_eq!(cube.kind, ObjectType::Empty);
	assert!(cube.data.is_none());
	assert_eq!(loaded.arena.iter::<Mesh>().count(), 0);
	assert!(loaded.warnings.is_empty());
}

#[test]
fn missing_scene_block_is_reported() {
	let variant = Variant {
		root_code: "WO",
		..Variant::default()
	};
	let file = BlendFile::from_bytes(scene_file(&variant)).expect("file parses");
	let err = load_scene(&file, ConvertOptions::default()).expect_err("no SC block");
	assert!(matches!(err, BlendError::BlockNotFound { code } if code == *b"SC\0\0"));
}

#[test]
fn scene_block_with_foreign_struct_is_rejected() {
	let mut b = BlendBuilder::new();
	let world = b.define("World", &[("float", "horr")]);
	let payload = b.payload().float(0.5).finish();
	b.block("SC", world, 0x10, 1, payload);
	let file = BlendFile::from_bytes(b.build()).expect("file parses");
	let err = load_scene(&file, ConvertOptions::default()).expect_err("wrong root type");
	assert!(matches!(err, BlendError::RootTypeMismatch { expected: "Scene", ref got } if got == "World"));
}

#[test]
fn object_type_codes() {
	assert_eq!(ObjectType::from_raw(1), ObjectType::Mesh);
	assert_eq!(ObjectType::from_raw(10), ObjectType::Lamp);
	assert_eq!(ObjectType::from_raw(25), ObjectType::Other(25));
	assert_eq!(ObjectType::Camera.data_types(), Some(&["Camera"][..]));
	assert_eq!(ObjectType::Curve.data_types(), None);
	assert_eq!(ObjectType::MetaBall.as_str(), "metaball");
}

#[test]
fn handles_compare_by_slot() {
	let loaded = load(&Variant::default(), ConvertOptions::default()).expect("scene loads");
	let materials: Vec<Handle<Material>> = loaded.arena.iter::<Material>().map(|(handle, _)| handle).collect();
	assert_eq!(materials.len(), 1, "one material no matter how many links reach it");
}
