use std::path::PathBuf;

use blendload::blend::{BlendFile, Result};

use crate::cmd::util::{emit_json, render_code};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print header fields and block statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let blend = BlendFile::open(&path)?;
	let stats = blend.scan_block_stats()?;
	let index = blend.block_index()?;
	let header = blend.header;

	let mut entries: Vec<_> = stats.codes.into_iter().collect();
	entries.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			compression: blend.compression.as_str(),
			header_size: header.header_size,
			format_version: header.format_version,
			version: header.version,
			endianness: header.endianness.as_str(),
			pointer_size: header.pointer_size,
			block_count: stats.block_count,
			indexed_blocks: index.len(),
			has_dna1: stats.has_dna1,
			has_endb: stats.has_endb,
			last_code: render_code(stats.last_code),
			top_codes: entries
				.iter()
				.take(12)
				.map(|(code, count)| CodeCountJson {
					code: render_code(*code),
					count: *count,
				})
				.collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("compression: {}", blend.compression.as_str());
	println!("header_size: {}", header.header_size);
	println!("format_version: {}", header.format_version);
	println!("version: {}", header.version);
	println!("endianness: {}", header.endianness.as_str());
	println!("pointer_size: {}", header.pointer_size);
	println!("block_count: {}", stats.block_count);
	println!("indexed_blocks: {}", index.len());
	println!("has_dna1: {}", stats.has_dna1);
	println!("has_endb: {}", stats.has_endb);
	println!("last_code: {}", render_code(stats.last_code));

	println!("top_codes:");
	for (code, count) in entries.into_iter().take(12) {
		println!("  {}: {}", render_code(code), count);
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct CodeCountJson {
	code: String,
	count: u32,
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	compression: &'static str,
	header_size: usize,
	format_version: u16,
	version: u16,
	endianness: &'static str,
	pointer_size: usize,
	block_count: u32,
	indexed_blocks: usize,
	has_dna1: bool,
	has_endb: bool,
	last_code: String,
	top_codes: Vec<CodeCountJson>,
}
