//! Lifecycle callbacks.
//!
//! There are two kinds: [`Hooks`] travel with an individual [`VNode`] in its [`VNodeData::hook`](`crate::VNodeData::hook`),
//! while [`Module`]s are configured once per [`Patcher`](`crate::Patcher`) and see every node.
//!
//! # Order
//!
//! - `init` (vnode only) runs before a node is created and may still modify it.
//! - `create` runs after the node's element and its children were created: modules first, then the vnode's hook.
//! - `insert` (vnode only) is queued and runs after the whole patch, in creation order.
//! - `prepatch`, `update` (modules first) and `postpatch` bracket a node that is patched in place.
//! - `moved` (modules only) runs whenever the children reconciler relocates an existing element.
//! - `destroy` runs on each removed node (vnode hook, then modules), parents before children.
//! - `remove` runs once on the root of a removed subtree (modules, then the vnode's hook), after all `destroy` hooks in that subtree.
//!   The element is detached right after.
//! - `pre` and `post` (modules only) bracket each [`Patcher::patch`](`crate::Patcher::patch`) call.
//!
//! Text nodes receive no hooks. Comment nodes skip `create` and `insert`.

use crate::{error::Result, platform::Platform, vnode::VNode};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use tracing::trace_span;

pub type InitHook<N> = Rc<dyn Fn(&mut VNode<N>)>;
pub type CreateHook<N> = Rc<dyn Fn(Option<&VNode<N>>, &VNode<N>)>;
pub type PatchHook<N> = Rc<dyn Fn(&VNode<N>, &VNode<N>)>;
pub type NodeHook<N> = Rc<dyn Fn(&VNode<N>)>;

/// Callbacks attached to a single vnode.
pub struct Hooks<N> {
	pub init: Option<InitHook<N>>,
	pub create: Option<CreateHook<N>>,
	pub insert: Option<NodeHook<N>>,
	pub prepatch: Option<PatchHook<N>>,
	pub update: Option<PatchHook<N>>,
	pub postpatch: Option<PatchHook<N>>,
	pub destroy: Option<NodeHook<N>>,
	pub remove: Option<NodeHook<N>>,
}

impl<N> Default for Hooks<N> {
	fn default() -> Self {
		Self {
			init: None,
			create: None,
			insert: None,
			prepatch: None,
			update: None,
			postpatch: None,
			destroy: None,
			remove: None,
		}
	}
}

impl<N> Clone for Hooks<N> {
	fn clone(&self) -> Self {
		Self {
			init: self.init.clone(),
			create: self.create.clone(),
			insert: self.insert.clone(),
			prepatch: self.prepatch.clone(),
			update: self.update.clone(),
			postpatch: self.postpatch.clone(),
			destroy: self.destroy.clone(),
			remove: self.remove.clone(),
		}
	}
}

impl<N> Debug for Hooks<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let slots = [
			("init", self.init.is_some()),
			("create", self.create.is_some()),
			("insert", self.insert.is_some()),
			("prepatch", self.prepatch.is_some()),
			("update", self.update.is_some()),
			("postpatch", self.postpatch.is_some()),
			("destroy", self.destroy.is_some()),
			("remove", self.remove.is_some()),
		];
		f.debug_list().entries(slots.iter().filter(|(_, set)| *set).map(|(name, _)| name)).finish()
	}
}

impl<N> Hooks<N> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn on_init(mut self, hook: impl Fn(&mut VNode<N>) + 'static) -> Self {
		self.init = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_create(mut self, hook: impl Fn(Option<&VNode<N>>, &VNode<N>) + 'static) -> Self {
		self.create = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_insert(mut self, hook: impl Fn(&VNode<N>) + 'static) -> Self {
		self.insert = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_prepatch(mut self, hook: impl Fn(&VNode<N>, &VNode<N>) + 'static) -> Self {
		self.prepatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_update(mut self, hook: impl Fn(&VNode<N>, &VNode<N>) + 'static) -> Self {
		self.update = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_postpatch(mut self, hook: impl Fn(&VNode<N>, &VNode<N>) + 'static) -> Self {
		self.postpatch = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_destroy(mut self, hook: impl Fn(&VNode<N>) + 'static) -> Self {
		self.destroy = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn on_remove(mut self, hook: impl Fn(&VNode<N>) + 'static) -> Self {
		self.remove = Some(Rc::new(hook));
		self
	}
}

type LiveNode<P> = VNode<<P as Platform>::Node>;
pub type PhaseHook<P> = Box<dyn FnMut(&mut P) -> Result<()>>;
pub type ModuleCreateHook<P> = Box<dyn FnMut(&mut P, Option<&LiveNode<P>>, &LiveNode<P>) -> Result<()>>;
pub type ModuleUpdateHook<P> = Box<dyn FnMut(&mut P, &LiveNode<P>, &LiveNode<P>) -> Result<()>>;
pub type ModuleNodeHook<P> = Box<dyn FnMut(&mut P, &LiveNode<P>) -> Result<()>>;

/// A named set of optional engine-wide hook slots.
///
/// Modules are handed to [`Patcher::new`](`crate::Patcher::new`) in order, and that order is kept within each phase.
pub struct Module<P: Platform> {
	name: &'static str,
	pre: Option<PhaseHook<P>>,
	create: Option<ModuleCreateHook<P>>,
	update: Option<ModuleUpdateHook<P>>,
	moved: Option<ModuleNodeHook<P>>,
	destroy: Option<ModuleNodeHook<P>>,
	remove: Option<ModuleNodeHook<P>>,
	post: Option<PhaseHook<P>>,
}

impl<P: Platform> Debug for Module<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module")
			.field("name", &self.name)
			.field("pre", &self.pre.is_some())
			.field("create", &self.create.is_some())
			.field("update", &self.update.is_some())
			.field("moved", &self.moved.is_some())
			.field("destroy", &self.destroy.is_some())
			.field("remove", &self.remove.is_some())
			.field("post", &self.post.is_some())
			.finish()
	}
}

impl<P: Platform> Module<P> {
	#[must_use]
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			pre: None,
			create: None,
			update: None,
			moved: None,
			destroy: None,
			remove: None,
			post: None,
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}

	#[must_use]
	pub fn on_pre(mut self, hook: impl FnMut(&mut P) -> Result<()> + 'static) -> Self {
		self.pre = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_create(mut self, hook: impl FnMut(&mut P, Option<&LiveNode<P>>, &LiveNode<P>) -> Result<()> + 'static) -> Self {
		self.create = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_update(mut self, hook: impl FnMut(&mut P, &LiveNode<P>, &LiveNode<P>) -> Result<()> + 'static) -> Self {
		self.update = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_moved(mut self, hook: impl FnMut(&mut P, &LiveNode<P>) -> Result<()> + 'static) -> Self {
		self.moved = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_destroy(mut self, hook: impl FnMut(&mut P, &LiveNode<P>) -> Result<()> + 'static) -> Self {
		self.destroy = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_remove(mut self, hook: impl FnMut(&mut P, &LiveNode<P>) -> Result<()> + 'static) -> Self {
		self.remove = Some(Box::new(hook));
		self
	}

	#[must_use]
	pub fn on_post(mut self, hook: impl FnMut(&mut P) -> Result<()> + 'static) -> Self {
		self.post = Some(Box::new(hook));
		self
	}
}

/// Module hooks merged into per-phase invocation lists.
pub(crate) struct ModuleHooks<P: Platform> {
	pre: Vec<(&'static str, PhaseHook<P>)>,
	create: Vec<(&'static str, ModuleCreateHook<P>)>,
	update: Vec<(&'static str, ModuleUpdateHook<P>)>,
	moved: Vec<(&'static str, ModuleNodeHook<P>)>,
	destroy: Vec<(&'static str, ModuleNodeHook<P>)>,
	remove: Vec<(&'static str, ModuleNodeHook<P>)>,
	post: Vec<(&'static str, PhaseHook<P>)>,
}

impl<P: Platform> ModuleHooks<P> {
	pub(crate) fn new(modules: impl IntoIterator<Item = Module<P>>) -> Self {
		let mut hooks = Self {
			pre: Vec::new(),
			create: Vec::new(),
			update: Vec::new(),
			moved: Vec::new(),
			destroy: Vec::new(),
			remove: Vec::new(),
			post: Vec::new(),
		};
		for module in modules {
			let name = module.name;
			hooks.pre.extend(module.pre.map(|hook| (name, hook)));
			hooks.create.extend(module.create.map(|hook| (name, hook)));
			hooks.update.extend(module.update.map(|hook| (name, hook)));
			hooks.moved.extend(module.moved.map(|hook| (name, hook)));
			hooks.destroy.extend(module.destroy.map(|hook| (name, hook)));
			hooks.remove.extend(module.remove.map(|hook| (name, hook)));
			hooks.post.extend(module.post.map(|hook| (name, hook)));
		}
		hooks
	}

	pub(crate) fn pre(&mut self, platform: &mut P) -> Result<()> {
		for (module, hook) in &mut self.pre {
			let span = trace_span!("pre", module = *module);
			let _enter = span.enter();
			hook(platform)?;
		}
		Ok(())
	}

	pub(crate) fn create(&mut self, platform: &mut P, vnode: &LiveNode<P>) -> Result<()> {
		for (module, hook) in &mut self.create {
			let span = trace_span!("create", module = *module);
			let _enter = span.enter();
			hook(platform, None, vnode)?;
		}
		Ok(())
	}

	pub(crate) fn update(&mut self, platform: &mut P, old: &LiveNode<P>, vnode: &LiveNode<P>) -> Result<()> {
		for (module, hook) in &mut self.update {
			let span = trace_span!("update", module = *module);
			let _enter = span.enter();
			hook(platform, old, vnode)?;
		}
		Ok(())
	}

	pub(crate) fn moved(&mut self, platform: &mut P, vnode: &LiveNode<P>) -> Result<()> {
		for (module, hook) in &mut self.moved {
			let span = trace_span!("moved", module = *module);
			let _enter = span.enter();
			hook(platform, vnode)?;
		}
		Ok(())
	}

	pub(crate) fn destroy(&mut self, platform: &mut P, vnode: &LiveNode<P>) -> Result<()> {
		for (module, hook) in &mut self.destroy {
			let span = trace_span!("destroy", module = *module);
			let _enter = span.enter();
			hook(platform, vnode)?;
		}
		Ok(())
	}

	pub(crate) fn remove(&mut self, platform: &mut P, vnode: &LiveNode<P>) -> Result<()> {
		for (module, hook) in &mut self.remove {
			let span = trace_span!("remove", module = *module);
			let _enter = span.enter();
			hook(platform, vnode)?;
		}
		Ok(())
	}

	pub(crate) fn post(&mut self, platform: &mut P) -> Result<()> {
		for (module, hook) in &mut self.post {
			let span = trace_span!("post", module = *module);
			let _enter = span.enter();
			hook(platform)?;
		}
		Ok(())
	}
}
