use crate::{
	error::{Error, Result},
	hooks::{Module, ModuleHooks, NodeHook},
	platform::Platform,
	reconcile::ensure_unique_keys,
	thunk,
	vnode::{Selector, VNode, COMMENT_SELECTOR},
};
use core::{
	fmt::{self, Debug, Formatter},
	mem,
};
use tracing::{debug, instrument, trace, trace_span};

/// `insert` hooks and shallow copies of the created vnodes they belong to, in creation order.
pub(crate) type InsertQueue<N> = Vec<(NodeHook<N>, VNode<N>)>;

/// Formats text content only with the `"dangerous-logging"` feature.
pub(crate) struct Redacted<'a>(pub &'a str);

impl Debug for Redacted<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if cfg!(feature = "dangerous-logging") {
			Debug::fmt(self.0, f)
		} else {
			write!(f, "<{} byte(s)>", self.0.len())
		}
	}
}

pub(crate) fn elm_of<N>(vnode: &VNode<N>) -> Result<&N> {
	vnode.elm.as_ref().ok_or_else(|| Error::NotMounted(vnode.sel.clone()))
}

/// Patches a live tree from one vnode tree to the next.
///
/// A [`Patcher`] owns its [`Platform`] adapter and the module hooks it was created with.
/// Each [`Patcher::patch`] runs to completion synchronously.
///
/// # Correct Use
///
/// Always pass the vnode returned by the previous [`Patcher::patch`] call as `old`.
/// Other vnodes that are bound to the same live tree must not be patched in the meantime.
pub struct Patcher<P: Platform> {
	pub(crate) platform: P,
	pub(crate) modules: ModuleHooks<P>,
}

impl<P: Platform + Debug> Debug for Patcher<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Patcher").field("platform", &self.platform).finish_non_exhaustive()
	}
}

impl<P: Platform> Patcher<P> {
	#[must_use]
	pub fn new(platform: P, modules: impl IntoIterator<Item = Module<P>>) -> Self {
		Self {
			platform,
			modules: ModuleHooks::new(modules),
		}
	}

	#[must_use]
	pub fn platform(&self) -> &P {
		&self.platform
	}

	pub fn platform_mut(&mut self) -> &mut P {
		&mut self.platform
	}

	#[must_use]
	pub fn into_platform(self) -> P {
		self.platform
	}

	/// A placeholder vnode for `element`, to be passed as `old` to the first [`Patcher::patch`].
	#[must_use]
	pub fn mount_point(&self, element: P::Node) -> VNode<P::Node> {
		VNode::from_element(&self.platform, element)
	}

	/// Converges the live tree bound to `old` towards `new` and returns `new` bound to its live nodes.
	///
	/// If `old` and `new` (after resolving a root thunk) aren't the same node, the root is replaced:
	/// The new root element is inserted where the old one was, and the returned vnode is bound to it.
	///
	/// # Errors
	///
	/// Iff a vnode is malformed, the platform adapter fails or lacks a needed capability, or `old` isn't bound.
	/// The live tree may be partially patched in that case.
	#[instrument(skip(self, old, new), fields(old = ?old.sel, new = ?new.sel))]
	pub fn patch(&mut self, old: VNode<P::Node>, new: VNode<P::Node>) -> Result<VNode<P::Node>> {
		let mut inserted = InsertQueue::new();
		self.modules.pre(&mut self.platform)?;

		let new = thunk::resolve(Some(&old), new);
		let patched = self.patch_vnode(old, new, &mut inserted)?;

		debug!("Running {} queued insert hook(s).", inserted.len());
		for (hook, vnode) in inserted {
			hook(&vnode);
		}

		self.modules.post(&mut self.platform)?;
		Ok(patched)
	}

	/// Patches `old` into `new` in place if they are the same node, and replaces it otherwise.
	pub(crate) fn patch_vnode(&mut self, mut old: VNode<P::Node>, new: VNode<P::Node>, inserted: &mut InsertQueue<P::Node>) -> Result<VNode<P::Node>> {
		if thunk::reuses(&new, &old) {
			trace!(sel = ?old.sel, key = ?old.key, "Moving memoized subtree forward.");
			return Ok(thunk::adopt(old, new));
		}

		let mut new = thunk::materialize(new);
		if !old.is_same(&new) {
			return self.replace(old, new, inserted);
		}
		new.validate()?;

		let span = trace_span!("Patching", sel = ?new.sel, key = ?new.key);
		let _enter = span.enter();

		if let Some(prepatch) = new.data.hook.prepatch.clone() {
			prepatch(&old, &new);
		}

		let elm = elm_of(&old)?.clone();
		new.elm = Some(elm.clone());

		if new.sel.is_some() {
			self.modules.update(&mut self.platform, &old, &new)?;
			if let Some(update) = new.data.hook.update.clone() {
				update(&old, &new);
			}
		}

		if new.text.is_none() {
			let new_children = mem::take(&mut new.children);
			if !old.children.is_empty() && !new_children.is_empty() {
				new.children = self.update_children(&elm, new.sel.as_deref(), mem::take(&mut old.children), new_children, inserted)?;
			} else if !new_children.is_empty() {
				if old.text.is_some() {
					self.platform.set_text_content(&elm, "")?;
				}
				ensure_unique_keys(&new_children, new.sel.as_deref())?;
				new.children = self.add_vnodes(&elm, None, new_children, inserted)?;
			} else if !old.children.is_empty() {
				self.remove_vnodes(&elm, mem::take(&mut old.children))?;
			} else if old.text.is_some() {
				self.platform.set_text_content(&elm, "")?;
			}
		} else if old.text != new.text {
			if !old.children.is_empty() {
				self.remove_vnodes(&elm, mem::take(&mut old.children))?;
			}
			let text = new.text.as_deref().unwrap_or_default();
			trace!(text = ?Redacted(text), "Setting text content.");
			self.platform.set_text_content(&elm, text)?;
		}

		if let Some(postpatch) = new.data.hook.postpatch.clone() {
			postpatch(&old, &new);
		}
		Ok(new)
	}

	/// Creates `new` before `old`'s element and removes `old`.
	///
	/// If `old`'s element has no parent, nothing is inserted or removed.
	fn replace(&mut self, old: VNode<P::Node>, new: VNode<P::Node>, inserted: &mut InsertQueue<P::Node>) -> Result<VNode<P::Node>> {
		let span = trace_span!("Replacing", old = ?old.sel, new = ?new.sel);
		let _enter = span.enter();

		let elm = elm_of(&old)?.clone();
		let parent = self.platform.parent_node(&elm);
		let new = self.create_elm(new, inserted)?;
		match parent {
			Some(parent) => {
				self.platform.insert_before(&parent, elm_of(&new)?, Some(&elm))?;
				self.remove_vnodes(&parent, Some(old))?;
			}
			None => debug!("Replaced node had no parent. The new node stays detached."),
		}
		Ok(new)
	}

	/// Creates the live subtree for `vnode`, resolving thunks along the way. Doesn't insert the root.
	pub(crate) fn create_elm(&mut self, vnode: VNode<P::Node>, inserted: &mut InsertQueue<P::Node>) -> Result<VNode<P::Node>> {
		let mut vnode = thunk::materialize(thunk::resolve(None, vnode));
		vnode.validate()?;
		if let Some(init) = vnode.data.hook.init.clone() {
			init(&mut vnode);
			vnode.validate()?;
		}

		let sel = match vnode.sel.as_deref() {
			None => {
				let text = vnode.text.as_deref().unwrap_or_default();
				trace!(text = ?Redacted(text), "Creating text node.");
				vnode.elm = Some(self.platform.create_text_node(text)?);
				return Ok(vnode);
			}
			Some(COMMENT_SELECTOR) => {
				let text = vnode.text.as_deref().unwrap_or_default();
				trace!(text = ?Redacted(text), "Creating comment.");
				vnode.elm = Some(self.platform.create_comment(text)?);
				return Ok(vnode);
			}
			Some(sel) => sel,
		};

		let span = trace_span!("Creating element", sel, key = ?vnode.key);
		let _enter = span.enter();

		let selector = Selector::parse(sel);
		let elm = self.platform.create_element(selector.tag, vnode.data.namespace.as_deref())?;
		if let Some(id) = selector.id {
			self.platform.set_attribute(&elm, "id", id)?;
		}
		if let Some(class) = selector.class_attribute() {
			self.platform.set_attribute(&elm, "class", &class)?;
		}

		if !vnode.children.is_empty() {
			ensure_unique_keys(&vnode.children, vnode.sel.as_deref())?;
			let children = mem::take(&mut vnode.children);
			vnode.children = self.add_vnodes(&elm, None, children, inserted)?;
		} else if let Some(text) = &vnode.text {
			let text = self.platform.create_text_node(text)?;
			self.platform.append_child(&elm, &text)?;
		}

		vnode.elm = Some(elm);
		self.modules.create(&mut self.platform, &vnode)?;
		if let Some(create) = vnode.data.hook.create.clone() {
			create(None, &vnode);
		}
		if let Some(insert) = vnode.data.hook.insert.clone() {
			inserted.push((insert, vnode.clone()));
		}
		Ok(vnode)
	}

	/// Creates each of `vnodes` and inserts them in order before `before` (or at the end).
	pub(crate) fn add_vnodes(
		&mut self,
		parent: &P::Node,
		before: Option<&P::Node>,
		vnodes: impl IntoIterator<Item = VNode<P::Node>>,
		inserted: &mut InsertQueue<P::Node>,
	) -> Result<Vec<VNode<P::Node>>> {
		vnodes
			.into_iter()
			.map(|vnode| {
				let vnode = self.create_elm(vnode, inserted)?;
				self.platform.insert_before(parent, elm_of(&vnode)?, before)?;
				Ok(vnode)
			})
			.collect()
	}

	/// Tears down and detaches each of `vnodes` from `parent`.
	pub(crate) fn remove_vnodes(&mut self, parent: &P::Node, vnodes: impl IntoIterator<Item = VNode<P::Node>>) -> Result<()> {
		for vnode in vnodes {
			let span = trace_span!("Removing", sel = ?vnode.sel, key = ?vnode.key);
			let _enter = span.enter();

			let elm = elm_of(&vnode)?.clone();
			if vnode.sel.is_some() {
				self.invoke_destroy_hooks(&vnode)?;
				self.modules.remove(&mut self.platform, &vnode)?;
				if let Some(remove) = &vnode.data.hook.remove {
					remove(&vnode);
				}
			}
			self.platform.remove_child(parent, &elm)?;
		}
		Ok(())
	}

	fn invoke_destroy_hooks(&mut self, vnode: &VNode<P::Node>) -> Result<()> {
		if vnode.sel.is_none() {
			return Ok(());
		}
		if let Some(destroy) = &vnode.data.hook.destroy {
			destroy(vnode);
		}
		self.modules.destroy(&mut self.platform, vnode)?;
		for child in &vnode.children {
			self.invoke_destroy_hooks(child)?;
		}
		Ok(())
	}
}
