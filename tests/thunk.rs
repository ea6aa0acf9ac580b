use scion_dom::{
	memory::{MemoryDom, NodeId, Op},
	thunk, thunk_args, thunk_unkeyed, thunk_with, Hooks, Key, Patcher, Platform, ThunkArg, ThunkOptions, VNode,
};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};
use tracing_subscriber::EnvFilter;

type Node = VNode<NodeId>;

fn init_logging() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

fn setup() -> (Patcher<MemoryDom>, Node) {
	init_logging();
	let mut dom = MemoryDom::new();
	let root = dom.create_root("div");
	let patcher = Patcher::new(dom, vec![]);
	let mount = patcher.mount_point(root);
	(patcher, mount)
}

fn number_in_span(calls: &Rc<Cell<usize>>) -> impl Fn(&[ThunkArg]) -> Node + 'static {
	let calls = Rc::clone(calls);
	move |args: &[ThunkArg]| {
		calls.set(calls.get() + 1);
		let n: &i32 = args[0].downcast_ref().unwrap();
		VNode::element("span").key("num").with_text(format!("Number is {}", n))
	}
}

fn odd_even(args: &[ThunkArg]) -> Node {
	let n: &i32 = args[0].downcast_ref().unwrap();
	let prefix = if n % 2 == 0 { "Even" } else { "Odd" };
	VNode::element("div").key("oddEven").with_text(format!("{}: {}", prefix, n))
}

fn in_div(child: Node) -> Node {
	VNode::element("div").child(child)
}

fn html(patcher: &Patcher<MemoryDom>, vnode: &Node) -> String {
	patcher.platform().to_html(vnode.elm.unwrap())
}

#[test]
fn describes_its_selector_key_and_arguments() {
	let calls = Rc::new(Cell::new(0));
	let vnode: Node = thunk("span", "num", number_in_span(&calls), thunk_args![22]);
	assert_eq!(vnode.sel.as_deref(), Some("span"));
	assert_eq!(vnode.key, Some(Key::from("num")));
	assert!(vnode.is_thunk());

	let thunk = vnode.data.thunk().unwrap();
	assert_eq!(thunk.sel(), "span");
	assert_eq!(thunk.args()[0].downcast_ref::<i32>(), Some(&22));
	assert_eq!(calls.get(), 0);
}

#[test]
fn calls_render_once_on_argument_change() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	assert_eq!(calls.get(), 1);
	patcher.patch(first, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![2]))).unwrap();
	assert_eq!(calls.get(), 2);
}

#[test]
fn skips_render_on_unchanged_arguments() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	let span = first.children[0].elm;
	let second = patcher.patch(first, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	assert_eq!(calls.get(), 1);
	assert_eq!(second.children[0].elm, span);

	let third = patcher.patch(second, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	assert_eq!(calls.get(), 1);
	assert_eq!(third.children[0].elm, span);
}

#[test]
fn calls_render_once_on_argument_count_change() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	patcher.patch(first, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1, 2]))).unwrap();
	assert_eq!(calls.get(), 2);
}

#[test]
fn render_function_identity_is_not_compared() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	let second = patcher.patch(first, in_div(thunk("span", "num", odd_even, thunk_args![1]))).unwrap();
	assert_eq!(calls.get(), 1);
	assert_eq!(html(&patcher, &second), "<div><span>Number is 1</span></div>");
}

#[test]
fn renders_correctly() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	assert_eq!(html(&patcher, &first), "<div><span>Number is 1</span></div>");
	let second = patcher.patch(first, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	assert_eq!(html(&patcher, &second), "<div><span>Number is 1</span></div>");
	let third = patcher.patch(second, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![2]))).unwrap();
	assert_eq!(html(&patcher, &third), "<div><span>Number is 2</span></div>");
	assert_eq!(calls.get(), 2);
}

#[test]
fn supports_leaving_out_the_key() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk_unkeyed("span", number_in_span(&calls), thunk_args![1]))).unwrap();
	let second = patcher.patch(first, in_div(thunk_unkeyed("span", number_in_span(&calls), thunk_args![1]))).unwrap();
	assert_eq!(calls.get(), 1);
	assert_eq!(html(&patcher, &second), "<div><span>Number is 1</span></div>");
}

#[test]
fn unkeyed_thunks_only_match_at_the_same_index() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk_unkeyed("span", number_in_span(&calls), thunk_args![1]))).unwrap();
	let second = patcher
		.patch(
			first,
			VNode::element("div").children(vec![VNode::element("hr"), thunk_unkeyed("span", number_in_span(&calls), thunk_args![1])]),
		)
		.unwrap();
	assert_eq!(calls.get(), 2);
	assert_eq!(html(&patcher, &second), "<div><hr></hr><span>Number is 1</span></div>");
}

#[test]
fn renders_correctly_when_root() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, thunk("span", "num", number_in_span(&calls), thunk_args![1])).unwrap();
	assert_eq!(html(&patcher, &first), "<span>Number is 1</span>");
	let span = first.elm;

	let second = patcher.patch(first, thunk("span", "num", number_in_span(&calls), thunk_args![1])).unwrap();
	assert_eq!(second.elm, span);
	assert_eq!(calls.get(), 1);

	let third = patcher.patch(second, thunk("span", "num", number_in_span(&calls), thunk_args![2])).unwrap();
	assert_eq!(third.elm, span);
	assert_eq!(html(&patcher, &third), "<span>Number is 2</span>");
	assert_eq!(calls.get(), 2);
}

#[test]
fn can_be_replaced_and_removed() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, in_div(thunk("span", "num", number_in_span(&calls), thunk_args![1]))).unwrap();
	assert_eq!(patcher.platform().tag_name(&first.children[0].elm.unwrap()).as_deref(), Some("span"));

	let second = patcher.patch(first, in_div(thunk("div", "oddEven", odd_even, thunk_args![4]))).unwrap();
	assert_eq!(second.children.len(), 1);
	assert_eq!(html(&patcher, &second), "<div><div>Even: 4</div></div>");
}

#[test]
fn can_be_replaced_and_removed_when_root() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let first = patcher.patch(mount, thunk("span", "num", number_in_span(&calls), thunk_args![1])).unwrap();
	let span = first.elm.unwrap();
	let body = patcher.platform().parent(span).unwrap();

	let second = patcher.patch(first, thunk("div", "oddEven", odd_even, thunk_args![4])).unwrap();
	assert_eq!(html(&patcher, &second), "<div>Even: 4</div>");
	assert_eq!(patcher.platform().children(body), &[second.elm.unwrap()]);
	assert_eq!(patcher.platform().parent(span), None);
}

#[test]
fn invokes_destroy_hook_on_thunks() {
	let (mut patcher, mount) = setup();
	let destroyed = Rc::new(Cell::new(0));

	let render = {
		let destroyed = Rc::clone(&destroyed);
		move |args: &[ThunkArg]| {
			let destroyed = Rc::clone(&destroyed);
			let n: &i32 = args[0].downcast_ref().unwrap();
			VNode::element("span")
				.with_text(format!("Number is {}", n))
				.hooks(Hooks::new().on_destroy(move |_| destroyed.set(destroyed.get() + 1)))
		}
	};
	let vnode1 = VNode::element("div").children(vec![
		VNode::element("div").with_text("Foo"),
		thunk("span", "num", render, thunk_args![1]),
		VNode::element("div").with_text("Foo"),
	]);
	let vnode2 = VNode::element("div").children(vec![VNode::element("div").with_text("Foo"), VNode::element("div").with_text("Foo")]);

	let first = patcher.patch(mount, vnode1).unwrap();
	patcher.patch(first, vnode2).unwrap();
	assert_eq!(destroyed.get(), 1);
}

#[test]
fn invokes_remove_hook_on_thunks() {
	let (mut patcher, mount) = setup();
	let removed = Rc::new(Cell::new(0));

	let render = {
		let removed = Rc::clone(&removed);
		move |args: &[ThunkArg]| {
			let removed = Rc::clone(&removed);
			let n: &i32 = args[0].downcast_ref().unwrap();
			VNode::element("span")
				.with_text(format!("Number is {}", n))
				.hooks(Hooks::new().on_remove(move |_| removed.set(removed.get() + 1)))
		}
	};
	let vnode1 = VNode::element("div").children(vec![
		VNode::element("div").with_text("Foo"),
		thunk("span", "num", render, thunk_args![1]),
		VNode::element("div").with_text("Foo"),
	]);
	let vnode2 = VNode::element("div").children(vec![VNode::element("div").with_text("Foo"), VNode::element("div").with_text("Foo")]);

	let first = patcher.patch(mount, vnode1).unwrap();
	patcher.patch(first, vnode2).unwrap();
	assert_eq!(removed.get(), 1);
}

#[test]
fn equality_function_overrides_argument_comparison() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let options = |label: &'static str| {
		ThunkOptions::new(number_in_span(&calls), thunk_args![1, label])
			.key("num")
			.equality(|previous: &[ThunkArg], next: &[ThunkArg]| previous[0].matches(&next[0]))
	};

	let first = patcher.patch(mount, in_div(thunk_with("span", options("a")))).unwrap();
	let second = patcher.patch(first, in_div(thunk_with("span", options("b")))).unwrap();
	assert_eq!(calls.get(), 1);
	assert_eq!(second.children[0].data.thunk().unwrap().args()[1].downcast_ref::<&str>(), Some(&"b"));
}

#[test]
fn permissive_equality_function_never_rerenders() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));
	let memo = |n: i32| thunk_with("span", ThunkOptions::new(number_in_span(&calls), thunk_args![n]).key("num").equality(|_, _| true));

	let first = patcher.patch(mount, in_div(memo(1))).unwrap();
	let second = patcher.patch(first, in_div(memo(2))).unwrap();
	let third = patcher.patch(second, in_div(memo(3))).unwrap();
	assert_eq!(calls.get(), 1);
	assert_eq!(html(&patcher, &third), "<div><span>Number is 1</span></div>");
}

#[test]
fn root_replacement_tears_down_the_old_output() {
	let (mut patcher, mount) = setup();
	let events = Rc::new(RefCell::new(Vec::new()));
	let render = {
		let events = Rc::clone(&events);
		move |_: &[ThunkArg]| {
			let (destroyed, removed) = (Rc::clone(&events), Rc::clone(&events));
			VNode::element("span").key("num").hooks(
				Hooks::new()
					.on_destroy(move |_| destroyed.borrow_mut().push("destroy"))
					.on_remove(move |_| removed.borrow_mut().push("remove")),
			)
		}
	};

	let first = patcher.patch(mount, thunk("span", "num", render, thunk_args![1])).unwrap();
	let second = patcher.patch(first, thunk("div", "oddEven", odd_even, thunk_args![1])).unwrap();
	assert_eq!(patcher.platform().tag_name(&second.elm.unwrap()).as_deref(), Some("div"));
	assert_eq!(*events.borrow(), ["destroy", "remove"]);
}

#[test]
fn keyed_thunks_move_without_rendering() {
	let (mut patcher, mount) = setup();
	let calls = Rc::new(Cell::new(0));

	let item = |n: i32| thunk("span", n, number_in_span(&calls), thunk_args![n]);
	let first = patcher.patch(mount, VNode::element("div").children(vec![item(1), item(2)])).unwrap();
	let (one, two) = (first.children[0].elm, first.children[1].elm);
	patcher.platform_mut().take_ops();

	let second = patcher.patch(first, VNode::element("div").children(vec![item(2), item(1)])).unwrap();
	assert_eq!(calls.get(), 2);
	assert_eq!(second.children[0].elm, two);
	assert_eq!(second.children[1].elm, one);
	assert_eq!(html(&patcher, &second), "<div><span>Number is 2</span><span>Number is 1</span></div>");

	let ops = patcher.platform().ops();
	assert_eq!(ops.iter().filter(|op| op.is_move()).count(), 1);
	assert!(!ops.iter().any(|op| op.is_create() || op.is_remove() || matches!(op, Op::SetText(_))));
}

#[test]
fn arguments_match_by_value_or_instance() {
	let shared = ThunkArg::new(vec![1, 2, 3]);
	assert!(shared.matches(&shared.clone()));
	assert!(shared.matches(&ThunkArg::new(vec![1, 2, 3])));
	assert!(!shared.matches(&ThunkArg::new(vec![1, 2])));
	assert!(!ThunkArg::new(1_i32).matches(&ThunkArg::new(1_i64)));
}
