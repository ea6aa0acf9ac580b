//! Memoized subtrees.
//!
//! A thunk is a vnode that defers its content to a render function.
//! When the patch engine meets a thunk, it looks for the thunk's prior (the thunk with the same selector and key
//! that was rendered at this position during the previous patch) and compares the arguments:
//!
//! - If they match, the prior's rendered subtree is moved forward as-is. The render function isn't called.
//! - Otherwise, or if there is no prior, the render function is called and its output takes the thunk's place.
//!
//! Keyed thunks find their prior among the old siblings by key.
//! Thunks without key only match an unkeyed thunk at the same index.
//!
//! ```
//! use scion_dom::{memory::MemoryDom, thunk, thunk_args, Patcher, VNode};
//!
//! let mut dom = MemoryDom::new();
//! let root = dom.create_root("div");
//! let mut patcher = Patcher::new(dom, vec![]);
//!
//! let number = |args: &[scion_dom::ThunkArg]| {
//! 	let n: &i32 = args[0].downcast_ref().unwrap();
//! 	VNode::element("span").with_text(format!("Number is {}", n))
//! };
//!
//! let mount = patcher.mount_point(root);
//! let first = patcher.patch(mount, VNode::element("div").child(thunk("span", "num", number, thunk_args![1]))).unwrap();
//! let second = patcher.patch(first, VNode::element("div").child(thunk("span", "num", number, thunk_args![1]))).unwrap();
//! assert_eq!(patcher.platform().to_html(second.elm.unwrap()), "<div><span>Number is 1</span></div>");
//! ```

use crate::vnode::{Key, VNode, VNodeData};
use core::{
	any::Any,
	fmt::{self, Debug, Formatter},
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{trace, trace_span};

trait ArgValue: Debug {
	fn as_any(&self) -> &dyn Any;
	fn dyn_eq(&self, other: &dyn ArgValue) -> bool;
}

impl<T: Any + Debug + PartialEq> ArgValue for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn dyn_eq(&self, other: &dyn ArgValue) -> bool {
		other.as_any().downcast_ref::<T>().map_or(false, |other| self == other)
	}
}

/// A type-erased, comparable thunk argument.
///
/// Arguments match if they are the same instance, or if they have the same type and compare equal.
#[derive(Clone)]
pub struct ThunkArg(Rc<dyn ArgValue>);

impl ThunkArg {
	pub fn new<T: Any + Debug + PartialEq>(value: T) -> Self {
		Self(Rc::new(value))
	}

	#[must_use]
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.as_any().downcast_ref()
	}

	#[must_use]
	pub fn matches(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0) || self.0.dyn_eq(&*other.0)
	}
}

impl<T: Any + Debug + PartialEq> From<T> for ThunkArg {
	fn from(value: T) -> Self {
		Self::new(value)
	}
}

impl Debug for ThunkArg {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Debug::fmt(&*self.0, f)
	}
}

/// Builds a [`Vec`]`<`[`ThunkArg`]`>`.
#[macro_export]
macro_rules! thunk_args {
	($($arg:expr),* $(,)?) => {
		vec![$($crate::ThunkArg::new($arg)),*]
	};
}

pub type RenderFn<N> = Rc<dyn Fn(&[ThunkArg]) -> VNode<N>>;
pub type EqualityFn = Rc<dyn Fn(&[ThunkArg], &[ThunkArg]) -> bool>;

#[derive(Clone)]
enum Resolution {
	Pending,
	/// The token identifies this particular render output.
	Rendered(Rc<()>),
	/// Stands in for the output of the old thunk rendered with this token.
	Reused(Rc<()>),
}

/// The thunk payload of a vnode, see [`VNodeData::thunk`].
pub struct Thunk<N> {
	sel: String,
	key: Option<Key>,
	render: RenderFn<N>,
	args: Vec<ThunkArg>,
	equality: Option<EqualityFn>,
	resolution: Resolution,
}

impl<N> Clone for Thunk<N> {
	fn clone(&self) -> Self {
		Self {
			sel: self.sel.clone(),
			key: self.key.clone(),
			render: self.render.clone(),
			args: self.args.clone(),
			equality: self.equality.clone(),
			resolution: self.resolution.clone(),
		}
	}
}

impl<N> Debug for Thunk<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Thunk")
			.field("sel", &self.sel)
			.field("key", &self.key)
			.field("args", &self.args)
			.field("equality", &self.equality.is_some())
			.field(
				"resolution",
				&match self.resolution {
					Resolution::Pending => "pending",
					Resolution::Rendered(_) => "rendered",
					Resolution::Reused(_) => "reused",
				},
			)
			.finish()
	}
}

impl<N> Thunk<N> {
	/// The selector the thunk was declared with. The rendered selector may differ.
	#[must_use]
	pub fn sel(&self) -> &str {
		&self.sel
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	#[must_use]
	pub fn args(&self) -> &[ThunkArg] {
		&self.args
	}

	fn is_pending(&self) -> bool {
		matches!(self.resolution, Resolution::Pending)
	}

	fn is_prior(&self, previous: &Self) -> bool {
		self.sel == previous.sel && self.key == previous.key
	}

	fn args_match(&self, previous: &Self) -> bool {
		match &self.equality {
			Some(equality) => equality(&previous.args, &self.args),
			None => previous.args.len() == self.args.len() && previous.args.iter().zip(&self.args).all(|(a, b)| a.matches(b)),
		}
	}

	/// The render token of `prior` if its output can be reused for `self`.
	fn reusable_from(&self, prior: &VNode<N>) -> Option<Rc<()>> {
		let previous = prior.data.thunk.as_ref()?;
		match &previous.resolution {
			Resolution::Rendered(token) if self.is_prior(previous) && self.args_match(previous) => Some(token.clone()),
			_ => None,
		}
	}
}

/// Object parameter form of [`thunk`].
pub struct ThunkOptions<N> {
	pub render: RenderFn<N>,
	pub args: Vec<ThunkArg>,
	pub key: Option<Key>,
	/// Replaces the default pairwise comparison. Called with (previous arguments, new arguments).
	pub equality: Option<EqualityFn>,
}

impl<N> ThunkOptions<N> {
	pub fn new(render: impl Fn(&[ThunkArg]) -> VNode<N> + 'static, args: Vec<ThunkArg>) -> Self {
		Self {
			render: Rc::new(render),
			args,
			key: None,
			equality: None,
		}
	}

	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn equality(mut self, equality: impl Fn(&[ThunkArg], &[ThunkArg]) -> bool + 'static) -> Self {
		self.equality = Some(Rc::new(equality));
		self
	}
}

/// A keyed thunk.
pub fn thunk<N>(sel: impl Into<String>, key: impl Into<Key>, render: impl Fn(&[ThunkArg]) -> VNode<N> + 'static, args: Vec<ThunkArg>) -> VNode<N> {
	thunk_with(sel, ThunkOptions::new(render, args).key(key))
}

/// A thunk that only matches the unkeyed thunk at the same position in the previous tree.
pub fn thunk_unkeyed<N>(sel: impl Into<String>, render: impl Fn(&[ThunkArg]) -> VNode<N> + 'static, args: Vec<ThunkArg>) -> VNode<N> {
	thunk_with(sel, ThunkOptions::new(render, args))
}

pub fn thunk_with<N>(sel: impl Into<String>, ThunkOptions { render, args, key, equality }: ThunkOptions<N>) -> VNode<N> {
	let sel = sel.into();
	VNode {
		key: key.clone(),
		data: VNodeData {
			thunk: Some(Thunk {
				sel: sel.clone(),
				key,
				render,
				args,
				equality,
				resolution: Resolution::Pending,
			}),
			..VNodeData::default()
		},
		..VNode::element(sel)
	}
}

/// Resolves `vnode` if it is a pending thunk. Other vnodes are returned unchanged.
///
/// If `prior` is the previous output of the same thunk and the arguments match,
/// the result is a placeholder that [`patch`](`crate::Patcher::patch`) swaps for `prior` itself.
pub(crate) fn resolve<N>(prior: Option<&VNode<N>>, mut vnode: VNode<N>) -> VNode<N> {
	let mut thunk = match vnode.data.thunk.take() {
		Some(thunk) if thunk.is_pending() => thunk,
		thunk => {
			vnode.data.thunk = thunk;
			return vnode;
		}
	};

	if let Some(prior) = prior {
		if let Some(token) = thunk.reusable_from(prior) {
			trace!(sel = %thunk.sel, key = ?thunk.key, "Thunk arguments matched. Reusing previous output.");
			thunk.resolution = Resolution::Reused(token);
			return VNode {
				sel: prior.sel.clone(),
				key: prior.key.clone(),
				data: VNodeData {
					thunk: Some(thunk),
					..VNodeData::default()
				},
				..VNode::element(String::new())
			};
		}
	}

	render(thunk)
}

fn render<N>(mut thunk: Thunk<N>) -> VNode<N> {
	let span = trace_span!("Rendering thunk", sel = %thunk.sel, key = ?thunk.key, args = thunk.args.len());
	let _enter = span.enter();

	let mut rendered = resolve(None, (thunk.render)(&thunk.args));
	if thunk.key.is_some() {
		rendered.key = thunk.key.clone();
	}
	thunk.resolution = Resolution::Rendered(Rc::new(()));
	rendered.data.thunk = Some(thunk);
	rendered
}

/// Resolves pending thunks among `new`, finding their priors in `old`.
pub(crate) fn resolve_children<N>(old: &[VNode<N>], new: Vec<VNode<N>>) -> Vec<VNode<N>> {
	if !new.iter().any(|vnode| vnode.data.thunk.as_ref().map_or(false, Thunk::is_pending)) {
		return new;
	}

	let mut keyed_priors: Option<HashMap<&Key, &VNode<N>>> = None;
	new.into_iter()
		.enumerate()
		.map(|(i, vnode)| {
			let prior = match vnode.data.thunk.as_ref() {
				Some(thunk) if thunk.is_pending() => match &thunk.key {
					Some(key) => keyed_priors.get_or_insert_with(|| keyed_thunks(old)).get(key).copied(),
					None => old.get(i).filter(|old| old.data.thunk.as_ref().map_or(false, |previous| previous.key.is_none())),
				},
				_ => None,
			};
			resolve(prior, vnode)
		})
		.collect()
}

fn keyed_thunks<N>(old: &[VNode<N>]) -> HashMap<&Key, &VNode<N>> {
	old.iter().filter_map(|old| Some((old.data.thunk.as_ref()?.key.as_ref()?, old))).collect()
}

/// Whether `vnode` stands in for exactly `old`'s rendered output.
pub(crate) fn reuses<N>(vnode: &VNode<N>, old: &VNode<N>) -> bool {
	match (vnode.data.thunk.as_ref().map(|thunk| &thunk.resolution), old.data.thunk.as_ref().map(|thunk| &thunk.resolution)) {
		(Some(Resolution::Reused(token)), Some(Resolution::Rendered(previous))) => Rc::ptr_eq(token, previous),
		_ => false,
	}
}

/// Moves `old` forward in place of `vnode`, keeping `vnode`'s render function and arguments.
pub(crate) fn adopt<N>(mut old: VNode<N>, mut vnode: VNode<N>) -> VNode<N> {
	if let Some(mut thunk) = vnode.data.thunk.take() {
		if let Resolution::Reused(token) = thunk.resolution {
			thunk.resolution = Resolution::Rendered(token);
		}
		old.data.thunk = Some(thunk);
	}
	old
}

/// Renders `vnode` after all if it's a reuse placeholder that didn't meet its prior.
pub(crate) fn materialize<N>(mut vnode: VNode<N>) -> VNode<N> {
	match vnode.data.thunk.take() {
		Some(thunk) if matches!(thunk.resolution, Resolution::Reused(_)) => {
			trace!(sel = %thunk.sel, key = ?thunk.key, "Reused thunk output was not paired with its prior. Rendering.");
			render(thunk)
		}
		thunk => {
			vnode.data.thunk = thunk;
			vnode
		}
	}
}
