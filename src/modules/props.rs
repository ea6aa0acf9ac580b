use super::bound;
use crate::{error::Result, hooks::Module, platform::Platform, vnode::VNode};
use std::collections::BTreeMap;
use tracing::trace;

/// Syncs [`VNodeData::props`](`crate::VNodeData::props`) as element properties.
#[must_use]
pub fn props<P: Platform + 'static>() -> Module<P> {
	Module::new("props")
		.on_create(|platform, _, vnode| update(platform, None, vnode))
		.on_update(|platform, old, vnode| update(platform, Some(old), vnode))
}

fn update<P: Platform>(platform: &mut P, old: Option<&VNode<P::Node>>, vnode: &VNode<P::Node>) -> Result<()> {
	let elm = match bound(vnode) {
		Some(elm) => elm,
		None => return Ok(()),
	};
	let empty = BTreeMap::new();
	let old = old.map_or(&empty, |old| &old.data.props);
	let new = &vnode.data.props;

	for name in old.keys().filter(|name| !new.contains_key(*name)) {
		trace!(name = name.as_str(), "Removing property.");
		platform.remove_property(elm, name)?;
	}
	for (name, value) in new.iter().filter(|(name, value)| old.get(*name) != Some(*value)) {
		trace!(name = name.as_str(), "Setting property.");
		platform.set_property(elm, name, value)?;
	}
	Ok(())
}
