//! Keyed children reconciliation.
//!
//! [`Patcher::update_children`] walks the old and new child lists from both ends at once.
//! Matching pairs at the heads or tails are patched in place, crosswise matches are patched and moved,
//! and everything else goes through a key lookup over the remaining old range.
//! Old children are consumed by slot: A `None` in `old` marks a child that was already patched into the new list.

use crate::{
	error::{Error, Result},
	patch::{elm_of, InsertQueue, Patcher},
	platform::Platform,
	thunk,
	vnode::{Key, VNode},
};
use hashbrown::{HashMap, HashSet};
use tracing::{trace, trace_span};

/// Fails with [`Error::DuplicateKey`] iff two of `children` carry the same key.
pub(crate) fn ensure_unique_keys<N>(children: &[VNode<N>], parent: Option<&str>) -> Result<()> {
	let mut seen = HashSet::with_capacity(children.len());
	for key in children.iter().filter_map(|child| child.key.as_ref()) {
		if !seen.insert(key) {
			return Err(Error::DuplicateKey {
				key: key.clone(),
				parent: parent.map(ToOwned::to_owned),
			});
		}
	}
	Ok(())
}

/// Indexes the keyed children in `old[range]` that haven't been consumed yet.
fn key_map<N>(old: &[Option<VNode<N>>], start: usize, end: usize, parent: Option<&str>) -> Result<HashMap<Key, usize>> {
	let mut map = HashMap::new();
	for (i, vnode) in old.iter().enumerate().take(end).skip(start) {
		if let Some(key) = vnode.as_ref().and_then(|vnode| vnode.key.as_ref()) {
			if map.insert(key.clone(), i).is_some() {
				return Err(Error::DuplicateKey {
					key: key.clone(),
					parent: parent.map(ToOwned::to_owned),
				});
			}
		}
	}
	Ok(map)
}

/// Takes both vnodes iff they are present and the same node.
fn take_if_same<N>(old: &mut Option<VNode<N>>, new: &mut Option<VNode<N>>) -> Option<(VNode<N>, VNode<N>)> {
	match (old.as_ref(), new.as_ref()) {
		(Some(o), Some(n)) if o.is_same(n) => old.take().zip(new.take()),
		_ => None,
	}
}

impl<P: Platform> Patcher<P> {
	/// Reconciles `old` into `new` below `parent` and returns the new children bound to their live nodes.
	///
	/// Afterwards, `parent`'s children are exactly the new children's live nodes, in order.
	pub(crate) fn update_children(
		&mut self,
		parent: &P::Node,
		parent_sel: Option<&str>,
		old: Vec<VNode<P::Node>>,
		new: Vec<VNode<P::Node>>,
		inserted: &mut InsertQueue<P::Node>,
	) -> Result<Vec<VNode<P::Node>>> {
		let span = trace_span!("Updating children", parent = ?parent_sel, old = old.len(), new = new.len());
		let _enter = span.enter();

		ensure_unique_keys(&new, parent_sel)?;
		let new = thunk::resolve_children(&old, new);

		let mut old: Vec<_> = old.into_iter().map(Some).collect();
		let mut new: Vec<_> = new.into_iter().map(Some).collect();
		let mut patched: Vec<Option<VNode<P::Node>>> = new.iter().map(|_| None).collect();

		// Ranges are `start..end`.
		let (mut old_start, mut old_end) = (0, old.len());
		let (mut new_start, mut new_end) = (0, new.len());
		let mut keys: Option<HashMap<Key, usize>> = None;

		while old_start < old_end && new_start < new_end {
			if old[old_start].is_none() {
				old_start += 1;
			} else if old[old_end - 1].is_none() {
				old_end -= 1;
			} else if new[new_start].is_none() {
				new_start += 1;
			} else if new[new_end - 1].is_none() {
				new_end -= 1;
			} else if let Some((old_vnode, new_vnode)) = take_if_same(&mut old[old_start], &mut new[new_start]) {
				trace!(index = new_start, "Patching at start.");
				patched[new_start] = Some(self.patch_vnode(old_vnode, new_vnode, inserted)?);
				old_start += 1;
				new_start += 1;
			} else if let Some((old_vnode, new_vnode)) = take_if_same(&mut old[old_end - 1], &mut new[new_end - 1]) {
				trace!(index = new_end - 1, "Patching at end.");
				patched[new_end - 1] = Some(self.patch_vnode(old_vnode, new_vnode, inserted)?);
				old_end -= 1;
				new_end -= 1;
			} else if let Some((old_vnode, new_vnode)) = take_if_same(&mut old[old_start], &mut new[new_end - 1]) {
				trace!(index = new_end - 1, "Moving right.");
				let vnode = self.patch_vnode(old_vnode, new_vnode, inserted)?;
				let reference = match &old[old_end - 1] {
					Some(old_end_vnode) => self.platform.next_sibling(elm_of(old_end_vnode)?),
					None => None,
				};
				self.platform.insert_before(parent, elm_of(&vnode)?, reference.as_ref())?;
				self.modules.moved(&mut self.platform, &vnode)?;
				patched[new_end - 1] = Some(vnode);
				old_start += 1;
				new_end -= 1;
			} else if let Some((old_vnode, new_vnode)) = take_if_same(&mut old[old_end - 1], &mut new[new_start]) {
				trace!(index = new_start, "Moving left.");
				let reference = match &old[old_start] {
					Some(old_start_vnode) => Some(elm_of(old_start_vnode)?.clone()),
					None => None,
				};
				let vnode = self.patch_vnode(old_vnode, new_vnode, inserted)?;
				self.platform.insert_before(parent, elm_of(&vnode)?, reference.as_ref())?;
				self.modules.moved(&mut self.platform, &vnode)?;
				patched[new_start] = Some(vnode);
				old_end -= 1;
				new_start += 1;
			} else {
				if keys.is_none() {
					keys = Some(key_map(&old, old_start, old_end, parent_sel)?);
				}
				let reference = match &old[old_start] {
					Some(old_start_vnode) => Some(elm_of(old_start_vnode)?.clone()),
					None => None,
				};

				let found = match (&keys, &new[new_start]) {
					(Some(keys), Some(new_vnode)) => new_vnode.key.as_ref().and_then(|key| keys.get(key).copied()),
					_ => None,
				};
				let vnode = match found.and_then(|i| take_if_same(&mut old[i], &mut new[new_start])) {
					Some((old_vnode, new_vnode)) => {
						trace!(index = new_start, "Moving keyed node.");
						let vnode = self.patch_vnode(old_vnode, new_vnode, inserted)?;
						self.platform.insert_before(parent, elm_of(&vnode)?, reference.as_ref())?;
						self.modules.moved(&mut self.platform, &vnode)?;
						vnode
					}
					None => match new[new_start].take() {
						Some(new_vnode) => {
							trace!(index = new_start, "Creating.");
							let vnode = self.create_elm(new_vnode, inserted)?;
							self.platform.insert_before(parent, elm_of(&vnode)?, reference.as_ref())?;
							vnode
						}
						None => {
							new_start += 1;
							continue;
						}
					},
				};
				patched[new_start] = Some(vnode);
				new_start += 1;
			}
		}

		if old_start >= old_end {
			let before = patched.get(new_end).and_then(Option::as_ref).and_then(|vnode| vnode.elm.clone());
			for i in new_start..new_end {
				if let Some(new_vnode) = new[i].take() {
					trace!(index = i, "Adding.");
					let vnode = self.create_elm(new_vnode, inserted)?;
					self.platform.insert_before(parent, elm_of(&vnode)?, before.as_ref())?;
					patched[i] = Some(vnode);
				}
			}
		} else if new_start >= new_end {
			let remaining: Vec<_> = old[old_start..old_end].iter_mut().filter_map(Option::take).collect();
			trace!("Removing {} remaining old node(s).", remaining.len());
			self.remove_vnodes(parent, remaining)?;
		}

		debug_assert!(patched.iter().all(Option::is_some));
		Ok(patched.into_iter().flatten().collect())
	}
}
