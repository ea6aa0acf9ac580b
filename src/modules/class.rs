use super::bound;
use crate::{error::Result, hooks::Module, platform::Platform, vnode::VNode};
use std::collections::BTreeMap;
use tracing::trace;

/// Toggles the classes in [`VNodeData::class`](`crate::VNodeData::class`) on the element's class list.
///
/// Classes that come from the selector are left alone unless the map names them.
/// A class that disappears from the map is removed.
#[must_use]
pub fn class<P: Platform + 'static>() -> Module<P> {
	Module::new("class")
		.on_create(|platform, _, vnode| update(platform, None, vnode))
		.on_update(|platform, old, vnode| update(platform, Some(old), vnode))
}

fn update<P: Platform>(platform: &mut P, old: Option<&VNode<P::Node>>, vnode: &VNode<P::Node>) -> Result<()> {
	let elm = match bound(vnode) {
		Some(elm) => elm,
		None => return Ok(()),
	};
	let empty = BTreeMap::new();
	let old = old.map_or(&empty, |old| &old.data.class);
	let new = &vnode.data.class;

	for name in old.keys().filter(|name| !new.contains_key(*name)) {
		trace!(name = name.as_str(), "Removing class.");
		platform.set_class(elm, name, false)?;
	}
	for (name, &enabled) in new {
		if old.get(name) != Some(&enabled) {
			trace!(name = name.as_str(), enabled, "Toggling class.");
			platform.set_class(elm, name, enabled)?;
		}
	}
	Ok(())
}
