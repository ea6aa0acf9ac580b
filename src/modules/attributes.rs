use super::bound;
use crate::{
	error::Result,
	hooks::Module,
	patch::Redacted,
	platform::Platform,
	vnode::{VNode, Value},
};
use std::collections::BTreeMap;
use tracing::trace;

/// Syncs [`VNodeData::attrs`](`crate::VNodeData::attrs`).
///
/// `true` sets an empty attribute and `false` removes it. Other values are set as their [`Display`](`core::fmt::Display`) text.
/// Attributes that disappear from the map are removed.
#[must_use]
pub fn attributes<P: Platform + 'static>() -> Module<P> {
	Module::new("attributes")
		.on_create(|platform, _, vnode| update(platform, None, vnode))
		.on_update(|platform, old, vnode| update(platform, Some(old), vnode))
}

fn update<P: Platform>(platform: &mut P, old: Option<&VNode<P::Node>>, vnode: &VNode<P::Node>) -> Result<()> {
	let elm = match bound(vnode) {
		Some(elm) => elm,
		None => return Ok(()),
	};
	let empty = BTreeMap::new();
	let old = old.map_or(&empty, |old| &old.data.attrs);
	let new = &vnode.data.attrs;

	for (name, value) in new {
		if old.get(name) == Some(value) {
			continue;
		}
		match value {
			Value::Bool(true) => platform.set_attribute(elm, name, "")?,
			Value::Bool(false) => platform.remove_attribute(elm, name)?,
			value => {
				let value = value.to_string();
				trace!(name = name.as_str(), value = ?Redacted(&value), "Setting attribute.");
				platform.set_attribute(elm, name, &value)?;
			}
		}
	}

	for name in old.keys().filter(|name| !new.contains_key(*name)) {
		trace!(name = name.as_str(), "Removing attribute.");
		platform.remove_attribute(elm, name)?;
	}
	Ok(())
}
