//! A [`Platform`] over the browser DOM via [`web_sys`].

use crate::{
	error::{Error, Result},
	platform::Platform,
	vnode::Value,
};
use js_sys::Reflect;
use tracing::{instrument, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node};

/// Creates nodes in a [`web_sys::Document`].
///
/// Properties are set with [***Reflect.set()***](https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Reflect/set)
/// and class changes go through the element's [***classList***](https://developer.mozilla.org/en-US/docs/Web/API/Element/classList).
#[derive(Debug, Clone)]
pub struct WebPlatform {
	document: Document,
}

impl WebPlatform {
	/// Uses the current window's document.
	///
	/// # Errors
	///
	/// Iff there is no window or it has no document.
	#[instrument]
	pub fn new() -> Result<Self> {
		let document = web_sys::window().and_then(|window| window.document()).ok_or(Error::MissingCapability("window.document"))?;
		Ok(Self { document })
	}

	#[must_use]
	pub fn with_document(document: Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}
}

fn js_error(operation: &'static str) -> impl FnOnce(JsValue) -> Error {
	move |error| Error::platform(operation, format!("{:?}", error))
}

fn element<'a>(node: &'a Node, operation: &'static str) -> Result<&'a Element> {
	node.dyn_ref::<Element>().ok_or_else(|| Error::platform(operation, format!("{:?} is not an element", node.node_name())))
}

impl Platform for WebPlatform {
	type Node = Node;

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<Node> {
		match namespace {
			Some(namespace) => self.document.create_element_ns(Some(namespace), tag),
			None => self.document.create_element(tag),
		}
		.map(Into::into)
		.map_err(js_error("create_element"))
	}

	fn create_text_node(&mut self, text: &str) -> Result<Node> {
		Ok(self.document.create_text_node(text).into())
	}

	fn create_comment(&mut self, text: &str) -> Result<Node> {
		Ok(self.document.create_comment(text).into())
	}

	fn insert_before(&mut self, parent: &Node, node: &Node, reference: Option<&Node>) -> Result<()> {
		parent.insert_before(node, reference).map(drop).map_err(js_error("insert_before"))
	}

	fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<()> {
		parent.remove_child(child).map(drop).map_err(js_error("remove_child"))
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn next_sibling(&self, node: &Node) -> Option<Node> {
		node.next_sibling()
	}

	fn tag_name(&self, element: &Node) -> Option<String> {
		element.dyn_ref::<Element>().map(Element::tag_name)
	}

	fn set_text_content(&mut self, node: &Node, text: &str) -> Result<()> {
		node.set_text_content(Some(text));
		Ok(())
	}

	fn get_attribute(&self, node: &Node, name: &str) -> Option<String> {
		node.dyn_ref::<Element>()?.get_attribute(name)
	}

	fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<()> {
		element(node, "set_attribute")?.set_attribute(name, value).map_err(js_error("set_attribute"))
	}

	fn remove_attribute(&mut self, node: &Node, name: &str) -> Result<()> {
		element(node, "remove_attribute")?.remove_attribute(name).map_err(js_error("remove_attribute"))
	}

	fn set_property(&mut self, node: &Node, name: &str, value: &Value) -> Result<()> {
		let value = match value {
			Value::Text(text) => JsValue::from_str(text),
			Value::Number(number) => JsValue::from_f64(*number),
			Value::Bool(flag) => JsValue::from_bool(*flag),
		};
		if Reflect::set(node, &JsValue::from_str(name), &value).map_err(js_error("set_property"))? {
			Ok(())
		} else {
			warn!(name, "Property is read-only.");
			Err(Error::platform("set_property", format!("{:?} is read-only", name)))
		}
	}

	fn remove_property(&mut self, node: &Node, name: &str) -> Result<()> {
		Reflect::delete_property(node, &JsValue::from_str(name)).map(drop).map_err(js_error("remove_property"))
	}

	fn set_class(&mut self, node: &Node, class: &str, enabled: bool) -> Result<()> {
		element(node, "set_class")?
			.class_list()
			.toggle_with_force(class, enabled)
			.map(drop)
			.map_err(js_error("set_class"))
	}
}
