//! The vnode model: an owned description of one tree position, optionally bound to a live node.

use crate::{
	error::{Error, Result},
	hooks::Hooks,
	platform::Platform,
	thunk::Thunk,
};
use core::{
	cmp::min,
	fmt::{self, Display, Formatter},
};
use std::collections::BTreeMap;

/// The selector of comment vnodes. Their [`VNode::text`] is the comment data.
pub const COMMENT_SELECTOR: &str = "!";

/// Stable sibling identity for keyed reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	Text(String),
	Number(i64),
}

impl Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Key::Text(text) => write!(f, "{:?}", text),
			Key::Number(number) => write!(f, "{}", number),
		}
	}
}

impl From<&str> for Key {
	fn from(text: &str) -> Self {
		Key::Text(text.to_owned())
	}
}

impl From<String> for Key {
	fn from(text: String) -> Self {
		Key::Text(text)
	}
}

impl From<i64> for Key {
	fn from(number: i64) -> Self {
		Key::Number(number)
	}
}

impl From<i32> for Key {
	fn from(number: i32) -> Self {
		Key::Number(number.into())
	}
}

impl From<u32> for Key {
	fn from(number: u32) -> Self {
		Key::Number(number.into())
	}
}

/// An attribute or property value.
///
/// As attribute, [`Value::Bool(true)`](`Value::Bool`) is set as empty attribute and [`Value::Bool(false)`](`Value::Bool`) removes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Text(String),
	Number(f64),
	Bool(bool),
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Text(text) => f.write_str(text),
			Value::Number(number) => write!(f, "{}", number),
			Value::Bool(flag) => write!(f, "{}", flag),
		}
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Value::Text(text.to_owned())
	}
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Value::Text(text)
	}
}

impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Value::Number(number)
	}
}

impl From<i32> for Value {
	fn from(number: i32) -> Self {
		Value::Number(number.into())
	}
}

impl From<bool> for Value {
	fn from(flag: bool) -> Self {
		Value::Bool(flag)
	}
}

/// A parsed `tag#id.class.class` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector<'a> {
	pub tag: &'a str,
	pub id: Option<&'a str>,
	class_list: Option<&'a str>,
}

impl<'a> Selector<'a> {
	#[must_use]
	pub fn parse(sel: &'a str) -> Self {
		let len = sel.len();
		let hash = sel.find('#');
		let dot = match hash {
			Some(hash) => sel[hash..].find('.').map(|dot| hash + dot),
			None => sel.find('.'),
		};
		let (hash_end, dot_end) = (hash.unwrap_or(len), dot.unwrap_or(len));

		Self {
			tag: &sel[..min(hash_end, dot_end)],
			id: hash.filter(|&hash| hash < dot_end).map(|hash| &sel[hash + 1..dot_end]),
			class_list: dot.map(|dot| &sel[dot + 1..]).filter(|classes| !classes.is_empty()),
		}
	}

	pub fn classes(&self) -> impl Iterator<Item = &'a str> {
		self.class_list.into_iter().flat_map(|classes| classes.split('.')).filter(|class| !class.is_empty())
	}

	/// The value of the `class` attribute implied by this selector, if any.
	#[must_use]
	pub fn class_attribute(&self) -> Option<String> {
		self.class_list.map(|_| self.classes().collect::<Vec<_>>().join(" "))
	}
}

/// Per-concern configuration of a vnode. The patch engine itself only reads [`VNodeData::namespace`] and [`VNodeData::hook`].
#[derive(Debug, Clone)]
pub struct VNodeData<N> {
	/// Creates the element with `createElementNS` semantics if set.
	pub namespace: Option<String>,
	pub attrs: BTreeMap<String, Value>,
	pub props: BTreeMap<String, Value>,
	/// Class toggles, applied by [`modules::class`](`crate::modules::class`).
	pub class: BTreeMap<String, bool>,
	pub hook: Hooks<N>,
	pub(crate) thunk: Option<Thunk<N>>,
}

impl<N> Default for VNodeData<N> {
	fn default() -> Self {
		Self {
			namespace: None,
			attrs: BTreeMap::new(),
			props: BTreeMap::new(),
			class: BTreeMap::new(),
			hook: Hooks::default(),
			thunk: None,
		}
	}
}

impl<N> VNodeData<N> {
	#[must_use]
	pub fn thunk(&self) -> Option<&Thunk<N>> {
		self.thunk.as_ref()
	}
}

/// Text or child content for [`VNode::new`].
pub enum Content<N> {
	Empty,
	Children(Vec<VNode<N>>),
	Text(String),
}

impl<N> From<()> for Content<N> {
	fn from((): ()) -> Self {
		Content::Empty
	}
}

impl<N> From<Vec<VNode<N>>> for Content<N> {
	fn from(children: Vec<VNode<N>>) -> Self {
		Content::Children(children)
	}
}

impl<N> From<&str> for Content<N> {
	fn from(text: &str) -> Self {
		Content::Text(text.to_owned())
	}
}

impl<N> From<String> for Content<N> {
	fn from(text: String) -> Self {
		Content::Text(text)
	}
}

/// A description of one node to render.
///
/// `sel` being [`None`] makes this a text node. At most one of `children` and `text` may be populated.
/// `elm` is set by [`Patcher::patch`](`crate::Patcher::patch`) once the vnode is rendered.
#[derive(Debug, Clone)]
pub struct VNode<N> {
	pub sel: Option<String>,
	pub key: Option<Key>,
	pub data: VNodeData<N>,
	pub children: Vec<VNode<N>>,
	pub text: Option<String>,
	pub elm: Option<N>,
}

impl<N> VNode<N> {
	#[must_use]
	pub fn new(sel: Option<String>, data: VNodeData<N>, content: impl Into<Content<N>>) -> Self {
		let (children, text) = match content.into() {
			Content::Empty => (Vec::new(), None),
			Content::Children(children) => (children, None),
			Content::Text(text) => (Vec::new(), Some(text)),
		};
		Self {
			sel,
			key: None,
			data,
			children,
			text,
			elm: None,
		}
	}

	#[must_use]
	pub fn element(sel: impl Into<String>) -> Self {
		Self::new(Some(sel.into()), VNodeData::default(), ())
	}

	#[must_use]
	pub fn text(text: impl Into<String>) -> Self {
		Self::new(None, VNodeData::default(), Content::Text(text.into()))
	}

	#[must_use]
	pub fn comment(text: impl Into<String>) -> Self {
		Self::new(Some(COMMENT_SELECTOR.to_owned()), VNodeData::default(), Content::Text(text.into()))
	}

	/// Describes an existing live element for a first mount.
	///
	/// The selector is reconstructed as `tag#id.class.class` from the element,
	/// so that a matching new root is patched in place instead of replaced.
	pub fn from_element<P: Platform<Node = N>>(platform: &P, elm: N) -> Self {
		let mut sel = platform.tag_name(&elm).unwrap_or_default().to_lowercase();
		if let Some(id) = platform.get_attribute(&elm, "id").filter(|id| !id.is_empty()) {
			sel.push('#');
			sel.push_str(&id);
		}
		if let Some(class) = platform.get_attribute(&elm, "class") {
			for class in class.split_whitespace() {
				sel.push('.');
				sel.push_str(class);
			}
		}
		Self {
			elm: Some(elm),
			..Self::element(sel)
		}
	}

	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn child(mut self, child: VNode<N>) -> Self {
		self.children.push(child);
		self
	}

	#[must_use]
	pub fn children(mut self, children: impl IntoIterator<Item = VNode<N>>) -> Self {
		self.children.extend(children);
		self
	}

	#[must_use]
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	#[must_use]
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.data.attrs.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.data.props.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn class(mut self, name: impl Into<String>, enabled: bool) -> Self {
		self.data.class.insert(name.into(), enabled);
		self
	}

	#[must_use]
	pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
		self.data.namespace = Some(namespace.into());
		self
	}

	#[must_use]
	pub fn hooks(mut self, hook: Hooks<N>) -> Self {
		self.data.hook = hook;
		self
	}

	#[must_use]
	pub fn selector(&self) -> Option<Selector<'_>> {
		self.sel.as_deref().map(Selector::parse)
	}

	#[must_use]
	pub fn is_comment(&self) -> bool {
		self.sel.as_deref() == Some(COMMENT_SELECTOR)
	}

	#[must_use]
	pub fn is_thunk(&self) -> bool {
		self.data.thunk.is_some()
	}

	/// The same-node test used by the patch engine and the children reconciler.
	///
	/// Text nodes always match each other. Other nodes match on equal selector and equal key,
	/// where two missing keys count as equal.
	#[must_use]
	pub fn is_same(&self, other: &Self) -> bool {
		match (&self.sel, &other.sel) {
			(None, None) => true,
			(Some(a), Some(b)) => a == b && self.key == other.key,
			_ => false,
		}
	}

	/// Checks this vnode (but not its descendants) for structural validity.
	///
	/// # Errors
	///
	/// Iff the vnode has both `text` and `children`, or is a text node with children.
	pub fn validate(&self) -> Result<()> {
		if self.text.is_some() && !self.children.is_empty() {
			return Err(Error::MalformedVNode {
				selector: self.sel.clone(),
				reason: "both `text` and `children` are set",
			});
		}
		if self.sel.is_none() && !self.children.is_empty() {
			return Err(Error::MalformedVNode {
				selector: None,
				reason: "text nodes can't have children",
			});
		}
		Ok(())
	}
}
