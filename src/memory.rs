//! An in-process [`Platform`] that keeps its nodes in an arena.
//!
//! Every mutation is recorded as [`Op`], which makes [`MemoryDom`] suitable for asserting exactly
//! what a patch did. [`MemoryDom::to_html`] serializes a subtree.

use crate::{
	error::{Error, Result},
	platform::Platform,
	vnode::Value,
};
use core::fmt::{self, Display, Formatter};
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
	Element {
		tag: String,
		namespace: Option<String>,
		attributes: BTreeMap<String, String>,
		properties: BTreeMap<String, Value>,
	},
	Text(String),
	Comment(String),
}

/// A recorded mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
	CreateElement(NodeId, String),
	CreateText(NodeId),
	CreateComment(NodeId),
	/// `moved` is `true` iff `node` had a parent before.
	Insert {
		parent: NodeId,
		node: NodeId,
		before: Option<NodeId>,
		moved: bool,
	},
	Remove {
		parent: NodeId,
		node: NodeId,
	},
	SetText(NodeId),
	SetAttribute(NodeId, String),
	RemoveAttribute(NodeId, String),
	SetProperty(NodeId, String),
	RemoveProperty(NodeId, String),
	SetClass(NodeId, String, bool),
}

impl Op {
	#[must_use]
	pub fn is_create(&self) -> bool {
		matches!(self, Op::CreateElement(..) | Op::CreateText(_) | Op::CreateComment(_))
	}

	#[must_use]
	pub fn is_move(&self) -> bool {
		matches!(self, Op::Insert { moved: true, .. })
	}

	#[must_use]
	pub fn is_remove(&self) -> bool {
		matches!(self, Op::Remove { .. })
	}
}

#[derive(Debug)]
struct Entry {
	kind: NodeKind,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct MemoryDom {
	nodes: Vec<Entry>,
	ops: Vec<Op>,
}

impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a `body` element containing a single empty `tag` element and returns the latter.
	///
	/// This isn't recorded as [`Op`]s.
	pub fn create_root(&mut self, tag: &str) -> NodeId {
		let body = self.push(NodeKind::Element {
			tag: "body".to_owned(),
			namespace: None,
			attributes: BTreeMap::new(),
			properties: BTreeMap::new(),
		});
		let root = self.push(NodeKind::Element {
			tag: tag.to_owned(),
			namespace: None,
			attributes: BTreeMap::new(),
			properties: BTreeMap::new(),
		});
		self.nodes[root.0].parent = Some(body);
		self.nodes[body.0].children.push(root);
		root
	}

	#[must_use]
	pub fn ops(&self) -> &[Op] {
		&self.ops
	}

	pub fn take_ops(&mut self) -> Vec<Op> {
		std::mem::take(&mut self.ops)
	}

	#[must_use]
	pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
		self.nodes.get(node.0).map(|entry| &entry.kind)
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> &[NodeId] {
		self.nodes.get(node.0).map_or(&[][..], |entry| entry.children.as_slice())
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.nodes.get(node.0)?.parent
	}

	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		match self.kind(node)? {
			NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
			_ => None,
		}
	}

	#[must_use]
	pub fn property(&self, node: NodeId, name: &str) -> Option<&Value> {
		match self.kind(node)? {
			NodeKind::Element { properties, .. } => properties.get(name),
			_ => None,
		}
	}

	#[must_use]
	pub fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.attribute(node, "class").map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
	}

	/// The concatenated text of all text node descendants.
	#[must_use]
	pub fn text_content(&self, node: NodeId) -> String {
		match self.kind(node) {
			Some(NodeKind::Text(text)) | Some(NodeKind::Comment(text)) => text.clone(),
			Some(NodeKind::Element { .. }) => self
				.children(node)
				.iter()
				.filter(|&&child| !matches!(self.kind(child), Some(NodeKind::Comment(_))))
				.map(|&child| self.text_content(child))
				.collect(),
			None => String::new(),
		}
	}

	#[must_use]
	pub fn to_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		match self.kind(node) {
			Some(NodeKind::Element { tag, attributes, .. }) => {
				html.push('<');
				html.push_str(tag);
				for (name, value) in attributes {
					html.push(' ');
					html.push_str(name);
					if !value.is_empty() {
						html.push_str("=\"");
						html.push_str(&escape(value).replace('"', "&quot;"));
						html.push('"');
					}
				}
				html.push('>');
				for &child in self.children(node) {
					self.write_html(child, html);
				}
				html.push_str("</");
				html.push_str(tag);
				html.push('>');
			}
			Some(NodeKind::Text(text)) => html.push_str(&escape(text)),
			Some(NodeKind::Comment(text)) => {
				html.push_str("<!--");
				html.push_str(text);
				html.push_str("-->");
			}
			None => (),
		}
	}

	fn push(&mut self, kind: NodeKind) -> NodeId {
		self.nodes.push(Entry {
			kind,
			parent: None,
			children: Vec::new(),
		});
		NodeId(self.nodes.len() - 1)
	}

	fn entry(&self, node: NodeId, operation: &'static str) -> Result<&Entry> {
		self.nodes.get(node.0).ok_or_else(|| Error::platform(operation, format!("unknown node {}", node)))
	}

	fn element_mut(&mut self, node: NodeId, operation: &'static str) -> Result<(&mut BTreeMap<String, String>, &mut BTreeMap<String, Value>)> {
		match self.nodes.get_mut(node.0).map(|entry| &mut entry.kind) {
			Some(NodeKind::Element { attributes, properties, .. }) => Ok((attributes, properties)),
			Some(_) => Err(Error::platform(operation, format!("{} is not an element", node))),
			None => Err(Error::platform(operation, format!("unknown node {}", node))),
		}
	}

	fn detach(&mut self, node: NodeId) {
		if let Some(parent) = self.nodes[node.0].parent.take() {
			self.nodes[parent.0].children.retain(|&child| child != node);
		}
	}

	fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == candidate {
				return true;
			}
			match self.nodes[node.0].parent {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}
}

fn escape(text: &str) -> String {
	text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl Platform for MemoryDom {
	type Node = NodeId;

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<NodeId> {
		let node = self.push(NodeKind::Element {
			tag: tag.to_owned(),
			namespace: namespace.map(str::to_owned),
			attributes: BTreeMap::new(),
			properties: BTreeMap::new(),
		});
		self.ops.push(Op::CreateElement(node, tag.to_owned()));
		Ok(node)
	}

	fn create_text_node(&mut self, text: &str) -> Result<NodeId> {
		let node = self.push(NodeKind::Text(text.to_owned()));
		self.ops.push(Op::CreateText(node));
		Ok(node)
	}

	fn create_comment(&mut self, text: &str) -> Result<NodeId> {
		let node = self.push(NodeKind::Comment(text.to_owned()));
		self.ops.push(Op::CreateComment(node));
		Ok(node)
	}

	fn insert_before(&mut self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) -> Result<()> {
		let (parent, node) = (*parent, *node);
		if !matches!(self.entry(parent, "insert_before")?.kind, NodeKind::Element { .. }) {
			return Err(Error::platform("insert_before", format!("{} is not an element", parent)));
		}
		self.entry(node, "insert_before")?;
		if self.is_ancestor_or_self(node, parent) {
			return Err(Error::platform("insert_before", format!("{} would become its own descendant", node)));
		}
		if let Some(&reference) = reference {
			if self.nodes[reference.0].parent != Some(parent) || reference == node {
				return Err(Error::platform("insert_before", format!("{} is not a child of {}", reference, parent)));
			}
		}

		let moved = self.nodes[node.0].parent.is_some();
		self.detach(node);
		let children = &mut self.nodes[parent.0].children;
		let index = match reference {
			Some(reference) => children.iter().position(|child| child == reference).unwrap_or(children.len()),
			None => children.len(),
		};
		children.insert(index, node);
		self.nodes[node.0].parent = Some(parent);

		trace!(%parent, %node, moved, "Inserted.");
		self.ops.push(Op::Insert {
			parent,
			node,
			before: reference.copied(),
			moved,
		});
		Ok(())
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
		if self.entry(*child, "remove_child")?.parent != Some(*parent) {
			return Err(Error::platform("remove_child", format!("{} is not a child of {}", child, parent)));
		}
		self.detach(*child);
		self.ops.push(Op::Remove { parent: *parent, node: *child });
		Ok(())
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.parent(*node)
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		let siblings = self.children(self.parent(*node)?);
		let index = siblings.iter().position(|sibling| sibling == node)?;
		siblings.get(index + 1).copied()
	}

	fn tag_name(&self, element: &NodeId) -> Option<String> {
		match self.kind(*element)? {
			NodeKind::Element { tag, .. } => Some(tag.clone()),
			_ => None,
		}
	}

	fn set_text_content(&mut self, node: &NodeId, text: &str) -> Result<()> {
		let node = *node;
		if matches!(self.entry(node, "set_text_content")?.kind, NodeKind::Element { .. }) {
			for child in std::mem::take(&mut self.nodes[node.0].children) {
				self.nodes[child.0].parent = None;
			}
			if !text.is_empty() {
				let text = self.push(NodeKind::Text(text.to_owned()));
				self.nodes[text.0].parent = Some(node);
				self.nodes[node.0].children.push(text);
			}
		} else if let NodeKind::Text(data) | NodeKind::Comment(data) = &mut self.nodes[node.0].kind {
			*data = text.to_owned();
		}
		self.ops.push(Op::SetText(node));
		Ok(())
	}

	fn get_attribute(&self, element: &NodeId, name: &str) -> Option<String> {
		self.attribute(*element, name).map(str::to_owned)
	}

	fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) -> Result<()> {
		let (attributes, _) = self.element_mut(*element, "set_attribute")?;
		attributes.insert(name.to_owned(), value.to_owned());
		self.ops.push(Op::SetAttribute(*element, name.to_owned()));
		Ok(())
	}

	fn remove_attribute(&mut self, element: &NodeId, name: &str) -> Result<()> {
		let (attributes, _) = self.element_mut(*element, "remove_attribute")?;
		attributes.remove(name);
		self.ops.push(Op::RemoveAttribute(*element, name.to_owned()));
		Ok(())
	}

	fn set_property(&mut self, element: &NodeId, name: &str, value: &Value) -> Result<()> {
		let (_, properties) = self.element_mut(*element, "set_property")?;
		properties.insert(name.to_owned(), value.clone());
		self.ops.push(Op::SetProperty(*element, name.to_owned()));
		Ok(())
	}

	fn remove_property(&mut self, element: &NodeId, name: &str) -> Result<()> {
		let (_, properties) = self.element_mut(*element, "remove_property")?;
		properties.remove(name);
		self.ops.push(Op::RemoveProperty(*element, name.to_owned()));
		Ok(())
	}

	fn set_class(&mut self, element: &NodeId, class: &str, enabled: bool) -> Result<()> {
		let (attributes, _) = self.element_mut(*element, "set_class")?;
		let mut classes: Vec<&str> = attributes.get("class").map_or_else(Vec::new, |classes| classes.split_whitespace().filter(|&c| c != class).collect());
		if enabled {
			classes.push(class);
		}
		let classes = classes.join(" ");
		if classes.is_empty() {
			attributes.remove("class");
		} else {
			attributes.insert("class".to_owned(), classes);
		}
		self.ops.push(Op::SetClass(*element, class.to_owned(), enabled));
		Ok(())
	}
}
