use std::path::PathBuf;

use blendload::blend::{BlendFile, Field, Result, Structure};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long = "struct")]
	pub struct_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// Print the schema summary, or one structure's resolved layout.
pub fn run(args: Args) -> Result<()> {
	let Args { path, struct_name, json } = args;

	let blend = BlendFile::open(&path)?;
	let dna = blend.dna()?;
	let selected = struct_name.as_deref().map(|name| dna.lookup(name)).transpose()?;

	if json {
		let payload = DnaJson {
			path: path.display().to_string(),
			endianness: dna.endianness.as_str(),
			pointer_size: dna.pointer_size,
			names: dna.names.len(),
			types: dna.types.len(),
			structs: dna.structs.len(),
			structure: selected.map(structure_json),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("endianness: {}", dna.endianness.as_str());
	println!("pointer_size: {}", dna.pointer_size);
	println!("dna_names: {}", dna.names.len());
	println!("dna_types: {}", dna.types.len());
	println!("dna_structs: {}", dna.structs.len());

	if let Some(item) = selected {
		println!("struct: {}", item.name());
		println!("sdna_index: {}", item.sdna_nr());
		println!("size: {}", item.size());
		println!("field_count: {}", item.fields().len());
		for field in item.fields() {
			println!("  +{:<5} {:>5}  {} {}", field.offset, field.size, field.type_name, declarator(field));
		}
	}

	Ok(())
}

/// Rebuild a C-like declarator (`*next`, `obmat[4][4]`) from resolved metadata.
fn declarator(field: &Field) -> String {
	let mut out = String::new();
	if field.is_pointer {
		out.push('*');
	}
	out.push_str(&field.name);
	if field.is_array {
		out.push_str(&format!("[{}]", field.dims[0]));
		if field.dims[1] > 1 {
			out.push_str(&format!("[{}]", field.dims[1]));
		}
	}
	out
}

fn structure_json(item: &Structure) -> StructureJson {
	StructureJson {
		name: item.name().to_owned(),
		sdna_index: item.sdna_nr(),
		size: item.size(),
		fields: item
			.fields()
			.iter()
			.map(|field| FieldJson {
				name: field.name.to_string(),
				type_name: field.type_name.to_string(),
				offset: field.offset,
				size: field.size,
				dims: field.dims,
				is_pointer: field.is_pointer,
				is_array: field.is_array,
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	offset: usize,
	size: usize,
	dims: [usize; 2],
	is_pointer: bool,
	is_array: bool,
}

#[derive(serde::Serialize)]
struct StructureJson {
	name: String,
	sdna_index: u32,
	size: usize,
	fields: Vec<FieldJson>,
}

#[derive(serde::Serialize)]
struct DnaJson {
	path: String,
	endianness: &'static str,
	pointer_size: usize,
	names: usize,
	types: usize,
	structs: usize,
	structure: Option<StructureJson>,
}
