use blendload_testkit::BlendBuilder;

use crate::blend::{BlendFile, Result, Structure};
use crate::convert::{ChainNode, Convert, ConvertOptions, ConverterRegistry, ErrorPolicy, Handle, Session, walk_chain};

#[derive(Debug, Default)]
struct Link {
	next: Option<Handle<Link>>,
	prev: Option<Handle<Link>>,
	value: i32,
	steps: usize,
}

impl Convert for Link {
	const DNA_NAME: &'static str = "Link";

	fn convert(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		self.steps = walk_chain(session, self, structure)?;
		Ok(())
	}
}

impl ChainNode for Link {
	const NEXT_FIELD: &'static str = "next";

	fn convert_payload(&mut self, session: &mut Session<'_>, structure: &Structure) -> Result<()> {
		session.read_scalar(ErrorPolicy::Fail, &mut self.value, structure, "value")
	}

	fn set_next(&mut self, next: Option<Handle<Self>>) {
		self.next = next;
	}

	fn clear_prev(&mut self) {
		self.prev = None;
	}
}

const HEAD: u64 = 0x100;
const BASE: u64 = 0x1000;
const STRIDE: u64 = 0x100;

/// `count` links in separate blocks; the last points back to the first when `circular`.
fn chain(count: u64, circular: bool) -> Vec<u8> {
	let mut builder = BlendBuilder::new();
	let link = builder.define("Link", &[("Link", "*next"), ("Link", "*prev"), ("int", "value"), ("int", "pad")]);
	let head = builder.define("Head", &[("Link", "*first")]);

	let head_payload = builder.payload().ptr(BASE).finish();
	let mut payloads = Vec::new();
	for idx in 0..count {
		let addr = BASE + idx * STRIDE;
		let next = if idx + 1 < count {
			addr + STRIDE
		} else if circular {
			BASE
		} else {
			0
		};
		let prev = if idx == 0 { BASE + (count - 1) * STRIDE } else { addr - STRIDE };
		payloads.push((addr, builder.payload().ptr(next).ptr(prev).int(idx as i32 * 10).int(0).finish()));
	}

	builder.block("DATA", head, HEAD, 1, head_payload);
	for (addr, payload) in payloads {
		builder.block("DATA", link, addr, 1, payload);
	}
	builder.build()
}

fn walk(bytes: Vec<u8>, options: ConvertOptions) -> (Vec<(i32, bool, bool)>, Option<usize>, usize) {
	let file = BlendFile::from_bytes(bytes).expect("file");
	let dna = file.dna().expect("dna");
	let index = file.block_index().expect("index");
	let registry = ConverterRegistry::new();
	let head = dna.lookup("Head").expect("Head");

	let mut session = Session::new(file.bytes(), &dna, &index, &registry, options);
	let start = index.locate(HEAD).expect("head").start;
	session.seek(start).expect("seek");
	let mut first: Option<Handle<Link>> = None;
	session.read_pointer(ErrorPolicy::Fail, &mut first, head, "first").expect("walk");
	assert_eq!(session.position(), start);

	let output = session.finish();
	let steps = first.and_then(|handle| output.arena.get(handle)).map(|link| link.steps);
	let nodes = output
		.arena
		.iter::<Link>()
		.map(|(_, link)| (link.value, link.next.is_some(), link.prev.is_some()))
		.collect();
	(nodes, steps, output.warnings.len())
}

#[test]
fn circular_list_stops_at_the_cached_head() {
	let (nodes, steps, warnings) = walk(chain(3, true), ConvertOptions::default());
	assert_eq!(nodes, vec![(0, true, false), (10, true, false), (20, true, false)]);
	assert_eq!(steps, Some(3));
	assert_eq!(warnings, 0);
}

#[test]
fn open_list_stops_at_null() {
	let (nodes, steps, _) = walk(chain(2, false), ConvertOptions::default());
	assert_eq!(nodes, vec![(0, true, false), (10, false, false)]);
	assert_eq!(steps, Some(2));
}

#[test]
fn long_list_does_not_deepen_recursion() {
	let options = ConvertOptions {
		max_depth: 3,
		..ConvertOptions::default()
	};
	let (nodes, steps, _) = walk(chain(500, true), options);
	assert_eq!(nodes.len(), 500);
	assert_eq!(steps, Some(500));
	assert!(nodes.iter().all(|(_, _, prev)| !prev), "back links are never resolved");
}
