//! Stock [`Module`](`crate::Module`)s that keep element state in sync with [`VNodeData`](`crate::VNodeData`).
//!
//! Pass any of these to [`Patcher::new`](`crate::Patcher::new`). Each compares the old and new vnode's map
//! and only touches the entries that changed.

mod attributes;
mod class;
mod props;

pub use attributes::attributes;
pub use class::class;
pub use props::props;

use crate::{platform::Platform, vnode::VNode};

/// All stock modules, in the order they run.
#[must_use]
pub fn defaults<P: Platform + 'static>() -> Vec<crate::Module<P>> {
	vec![attributes(), class(), props()]
}

fn bound<N>(vnode: &VNode<N>) -> Option<&N> {
	if vnode.sel.is_none() || vnode.is_comment() {
		None
	} else {
		vnode.elm.as_ref()
	}
}
