use scion_dom::{
	memory::{MemoryDom, NodeId, Op},
	Key, Module, Patcher, VNode,
};
use std::{cell::Cell, collections::HashMap, rc::Rc};
use tracing_subscriber::EnvFilter;

type Node = VNode<NodeId>;

fn init_logging() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

fn setup(modules: Vec<Module<MemoryDom>>) -> (Patcher<MemoryDom>, Node) {
	init_logging();
	let mut dom = MemoryDom::new();
	let root = dom.create_root("ul");
	let patcher = Patcher::new(dom, modules);
	let mount = patcher.mount_point(root);
	(patcher, mount)
}

fn keyed(keys: &[u32]) -> Node {
	VNode::element("ul").children(keys.iter().map(|&key| VNode::element("li").key(key).with_text(key.to_string())))
}

fn rendered_texts(patcher: &Patcher<MemoryDom>, vnode: &Node) -> Vec<String> {
	let dom = patcher.platform();
	dom.children(vnode.elm.unwrap()).iter().map(|&child| dom.text_content(child)).collect()
}

fn live_nodes(vnode: &Node) -> HashMap<Key, NodeId> {
	vnode.children.iter().map(|child| (child.key.clone().unwrap(), child.elm.unwrap())).collect()
}

struct Reordered {
	ops: Vec<Op>,
}

impl Reordered {
	fn count(&self, predicate: impl Fn(&Op) -> bool) -> usize {
		self.ops.iter().filter(|op| predicate(*op)).count()
	}

	fn moves(&self) -> usize {
		self.count(Op::is_move)
	}

	fn removals(&self) -> usize {
		self.count(Op::is_remove)
	}

	fn created_elements(&self) -> usize {
		self.count(|op| matches!(op, Op::CreateElement(..)))
	}
}

/// Patches `from` into `to` and checks the result for order, identity and consistency.
fn reorder(from: &[u32], to: &[u32]) -> Reordered {
	let (mut patcher, mount) = setup(vec![]);
	let first = patcher.patch(mount, keyed(from)).unwrap();
	assert_eq!(rendered_texts(&patcher, &first), from.iter().map(ToString::to_string).collect::<Vec<_>>());
	let before = live_nodes(&first);
	patcher.platform_mut().take_ops();

	let second = patcher.patch(first, keyed(to)).unwrap();
	assert_eq!(rendered_texts(&patcher, &second), to.iter().map(ToString::to_string).collect::<Vec<_>>());
	assert_eq!(
		patcher.platform().children(second.elm.unwrap()),
		second.children.iter().map(|child| child.elm.unwrap()).collect::<Vec<_>>().as_slice()
	);

	let after = live_nodes(&second);
	for (key, node) in &before {
		match after.get(key) {
			Some(kept) => assert_eq!(kept, node, "{} was recreated", key),
			None => assert_eq!(patcher.platform().parent(*node), None, "{} is still attached", key),
		}
	}

	Reordered {
		ops: patcher.platform_mut().take_ops(),
	}
}

#[test]
fn rotation_only_moves() {
	let result = reorder(&[1, 2, 3], &[3, 1, 2]);
	assert_eq!(result.moves(), 1);
	assert_eq!(result.created_elements(), 0);
	assert_eq!(result.removals(), 0);
}

#[test]
fn replacing_the_middle_creates_one_and_removes_one() {
	let result = reorder(&[1, 2, 3], &[1, 4, 3]);
	assert_eq!(result.created_elements(), 1);
	assert_eq!(result.removals(), 1);
	assert_eq!(result.moves(), 0);
}

#[test]
fn reversal_keeps_every_node() {
	let result = reorder(&[1, 2, 3, 4, 5, 6], &[6, 5, 4, 3, 2, 1]);
	assert_eq!(result.created_elements(), 0);
	assert_eq!(result.removals(), 0);
	assert_eq!(result.moves(), 5);
}

#[test]
fn swapping_the_ends() {
	let result = reorder(&[1, 2, 3, 4], &[4, 2, 3, 1]);
	assert_eq!(result.created_elements(), 0);
	assert_eq!(result.removals(), 0);
	assert_eq!(result.moves(), 2);
}

#[test]
fn additions() {
	assert_eq!(reorder(&[1, 2], &[1, 2, 3, 4]).created_elements(), 2);
	assert_eq!(reorder(&[3, 4], &[1, 2, 3, 4]).created_elements(), 2);
	assert_eq!(reorder(&[1, 4], &[1, 2, 3, 4]).created_elements(), 2);
	assert_eq!(reorder(&[2, 3], &[1, 2, 3, 4]).created_elements(), 2);
	assert_eq!(reorder(&[], &[1, 2, 3]).created_elements(), 3);
}

#[test]
fn removals() {
	assert_eq!(reorder(&[1, 2, 3, 4], &[1, 2]).removals(), 2);
	assert_eq!(reorder(&[1, 2, 3, 4], &[3, 4]).removals(), 2);
	assert_eq!(reorder(&[1, 2, 3, 4], &[1, 4]).removals(), 2);
	assert_eq!(reorder(&[1, 2, 3, 4], &[2, 3]).removals(), 2);
	assert_eq!(reorder(&[1, 2, 3], &[]).removals(), 3);
}

#[test]
fn moves_with_additions_and_removals() {
	let result = reorder(&[1, 2, 3, 4, 5], &[6, 4, 2, 7]);
	assert_eq!(result.created_elements(), 2);
	assert_eq!(result.removals(), 3);
}

#[test]
fn same_key_with_different_selector_is_replaced() {
	let (mut patcher, mount) = setup(vec![]);
	let first = patcher.patch(mount, VNode::element("ul").child(VNode::element("li").key(1))).unwrap();
	let li = first.children[0].elm.unwrap();
	patcher.platform_mut().take_ops();

	let second = patcher
		.patch(first, VNode::element("ul").children(vec![VNode::element("p").key(1), VNode::element("li").key(2)]))
		.unwrap();
	assert_ne!(second.children[0].elm, Some(li));
	assert_eq!(patcher.platform().parent(li), None);
	assert_eq!(patcher.platform().to_html(second.elm.unwrap()), "<ul><p></p><li></li></ul>");
}

#[test]
fn unkeyed_children_are_patched_by_position() {
	let (mut patcher, mount) = setup(vec![]);
	let list = |items: &[&str]| VNode::element("ul").children(items.iter().map(|item| VNode::element("li").with_text(*item)));

	let first = patcher.patch(mount, list(&["a", "b"])).unwrap();
	let nodes: Vec<_> = first.children.iter().map(|child| child.elm).collect();
	patcher.platform_mut().take_ops();

	let second = patcher.patch(first, list(&["b", "a", "c"])).unwrap();
	assert_eq!(rendered_texts(&patcher, &second), ["b", "a", "c"]);
	assert_eq!(second.children[0].elm, nodes[0]);
	assert_eq!(second.children[1].elm, nodes[1]);
	assert!(!patcher.platform().ops().iter().any(Op::is_move));
}

#[test]
fn mixed_text_and_keyed_children() {
	let (mut patcher, mount) = setup(vec![]);
	let tree = |keys: &[u32]| {
		let mut children = vec![VNode::text("head")];
		children.extend(keys.iter().map(|&key| VNode::element("li").key(key).with_text(key.to_string())));
		children.push(VNode::text("tail"));
		VNode::element("ul").children(children)
	};

	let first = patcher.patch(mount, tree(&[1, 2, 3])).unwrap();
	let second = patcher.patch(first, tree(&[3, 2, 1])).unwrap();
	assert_eq!(patcher.platform().to_html(second.elm.unwrap()), "<ul>head<li>3</li><li>2</li><li>1</li>tail</ul>");
}

#[test]
fn moved_hook_fires_per_relocated_node() {
	let moved = Rc::new(Cell::new(0));
	let counter = {
		let moved = Rc::clone(&moved);
		Module::new("counter").on_moved(move |_, _| {
			moved.set(moved.get() + 1);
			Ok(())
		})
	};
	let (mut patcher, mount) = setup(vec![counter]);

	let first = patcher.patch(mount, keyed(&[1, 2, 3])).unwrap();
	assert_eq!(moved.get(), 0);
	let second = patcher.patch(first, keyed(&[3, 1, 2])).unwrap();
	assert_eq!(moved.get(), 1);
	patcher.patch(second, keyed(&[2, 5, 3, 1])).unwrap();
	assert_eq!(patcher.platform().ops().iter().filter(|op| op.is_move()).count(), moved.get());
}

#[test]
fn live_children_match_the_vnode_children() {
	let (mut patcher, mount) = setup(vec![]);
	let mut tree = patcher.patch(mount, keyed(&[1, 2, 3])).unwrap();
	for keys in [&[2, 1][..], &[], &[4, 3, 2, 1], &[1, 5, 4], &[5]] {
		tree = patcher.patch(tree, keyed(keys)).unwrap();
		let live = patcher.platform().children(tree.elm.unwrap()).to_vec();
		let bound: Vec<_> = tree.children.iter().map(|child| child.elm.unwrap()).collect();
		assert_eq!(live, bound);
	}
}

/// Deterministic xorshift, so failures reproduce.
struct Rng(u64);

impl Rng {
	fn next(&mut self) -> u64 {
		let mut x = self.0;
		x ^= x << 13;
		x ^= x >> 7;
		x ^= x << 17;
		self.0 = x;
		x
	}

	fn below(&mut self, bound: usize) -> usize {
		(self.next() % bound as u64) as usize
	}

	fn keys(&mut self) -> Vec<u32> {
		let mut keys: Vec<u32> = (0..12).filter(|_| self.below(3) != 0).collect();
		for i in (1..keys.len()).rev() {
			keys.swap(i, self.below(i + 1));
		}
		keys
	}
}

#[test]
fn random_reorderings() {
	let mut rng = Rng(0x2545_f491_4f6c_dd1d);
	for _ in 0..200 {
		let (from, to) = (rng.keys(), rng.keys());
		let result = reorder(&from, &to);

		let added = to.iter().filter(|key| !from.contains(*key)).count();
		let removed = from.iter().filter(|key| !to.contains(*key)).count();
		assert_eq!(result.created_elements(), added, "{:?} -> {:?}", from, to);
		assert_eq!(result.removals(), removed, "{:?} -> {:?}", from, to);
	}
}
