//! The capabilities the patch engine needs from a live tree.
//!
//! Implement [`Platform`] to drive anything node-shaped. [`MemoryDom`](`crate::memory::MemoryDom`) and
//! [`WebPlatform`](`crate::web::WebPlatform`) are included.
//!
//! Only the required methods are used for every tree. The provided methods fail with
//! [`Error::MissingCapability`] by default and are only called when a vnode actually needs them,
//! for example [`Platform::create_comment`] for comment vnodes or [`Platform::set_attribute`] for selectors with an id.

use crate::{
	error::{Error, Result},
	vnode::Value,
};
use core::fmt::Debug;

pub trait Platform {
	/// A cheaply clonable handle to a live node.
	type Node: Clone + PartialEq + Debug;

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<Self::Node>;
	fn create_text_node(&mut self, text: &str) -> Result<Self::Node>;

	/// Inserts or moves `node` into `parent`, before `reference` or at the end.
	fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) -> Result<()>;
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
	fn tag_name(&self, element: &Self::Node) -> Option<String>;

	/// On elements, replaces all children with a single text node (or none if `text` is empty).
	/// On text and comment nodes, replaces their data.
	fn set_text_content(&mut self, node: &Self::Node, text: &str) -> Result<()>;

	fn append_child(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<()> {
		self.insert_before(parent, node, None)
	}

	fn create_comment(&mut self, _text: &str) -> Result<Self::Node> {
		Err(Error::MissingCapability("create_comment"))
	}

	fn get_attribute(&self, _element: &Self::Node, _name: &str) -> Option<String> {
		None
	}

	fn set_attribute(&mut self, _element: &Self::Node, _name: &str, _value: &str) -> Result<()> {
		Err(Error::MissingCapability("set_attribute"))
	}

	fn remove_attribute(&mut self, _element: &Self::Node, _name: &str) -> Result<()> {
		Err(Error::MissingCapability("remove_attribute"))
	}

	fn set_property(&mut self, _element: &Self::Node, _name: &str, _value: &Value) -> Result<()> {
		Err(Error::MissingCapability("set_property"))
	}

	fn remove_property(&mut self, _element: &Self::Node, _name: &str) -> Result<()> {
		Err(Error::MissingCapability("remove_property"))
	}

	/// Adds `class` to or removes it from the element's class list.
	fn set_class(&mut self, _element: &Self::Node, _class: &str, _enabled: bool) -> Result<()> {
		Err(Error::MissingCapability("set_class"))
	}
}
