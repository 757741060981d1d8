//! [`Document`] implementation over the browser DOM, via [`web_sys`].

use crate::{
	document::{Listener, Scalar, SVG_NAMESPACE},
	Document, Error,
};
use core::{
	cell::Cell,
	hash::{Hash, Hasher},
};
use hashbrown::HashMap;
use js_sys::Reflect;
use std::fmt::{self, Debug, Formatter};
use tracing::{trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Element, HtmlElement, Node, SvgElement};

const ID_PROPERTY: &str = "__vtreeDomId";

thread_local! {
	// Shared by every `WebDocument`, since the ids live on the page.
	static NEXT_ID: Cell<u32> = Cell::new(1);
}

/// A live node, identified by an id stored on it as an expando property.
#[derive(Clone)]
pub struct WebNode {
	id: u32,
	node: Node,
}

impl WebNode {
	#[must_use]
	pub fn node(&self) -> &Node {
		&self.node
	}
}

impl PartialEq for WebNode {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}
impl Eq for WebNode {}

impl Hash for WebNode {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl Debug for WebNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}#{}", self.node.node_name(), self.id)
	}
}

type ListenerClosure = Closure<dyn Fn(web_sys::Event)>;

pub struct WebDocument {
	document: web_sys::Document,
	closures: HashMap<(WebNode, String, bool), ListenerClosure>,
}

impl WebDocument {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			closures: HashMap::new(),
		}
	}

	/// # Errors
	///
	/// Iff there is no global `window.document`.
	pub fn from_window() -> Result<Self, Error> {
		let document = web_sys::window()
			.and_then(|window| window.document())
			.ok_or_else(|| Error::dom("from_window", "no global document"))?;
		Ok(Self::new(document))
	}

	/// Wraps a live node, giving it an identity if it had none yet.
	pub fn wrap(&self, node: impl Into<Node>) -> WebNode {
		let node = node.into();
		let key = JsValue::from_str(ID_PROPERTY);
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let existing = Reflect::get(&node, &key).ok().and_then(|id| id.as_f64()).map(|id| id as u32);
		let id = existing.unwrap_or_else(|| {
			let id = NEXT_ID.with(|next_id| next_id.replace(next_id.get() + 1));
			if Reflect::set(&node, &key, &JsValue::from(id)).is_err() {
				warn!("Could not store node identity.");
			}
			id
		});
		WebNode { id, node }
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}
}

impl Debug for WebDocument {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebDocument")
			.field("listeners", &self.closures.len())
			.finish_non_exhaustive()
	}
}

fn js_error(operation: &'static str) -> impl FnOnce(JsValue) -> Error {
	move |error| Error::dom(operation, format!("{:?}", error))
}

fn element<'a>(node: &'a WebNode, operation: &'static str) -> Result<&'a Element, Error> {
	node.node.dyn_ref::<Element>().ok_or_else(|| Error::dom(operation, format!("{:?} is not an element", node)))
}

fn style(node: &WebNode, operation: &'static str) -> Result<CssStyleDeclaration, Error> {
	if let Some(html_element) = node.node.dyn_ref::<HtmlElement>() {
		Ok(html_element.style())
	} else if let Some(svg_element) = node.node.dyn_ref::<SvgElement>() {
		Ok(svg_element.style())
	} else {
		Err(Error::dom(operation, format!("{:?} has no inline style", node)))
	}
}

impl Document for WebDocument {
	type Node = WebNode;
	type Event = web_sys::Event;

	fn create_text_node(&mut self, text: &str) -> Result<WebNode, Error> {
		Ok(self.wrap(self.document.create_text_node(text)))
	}

	fn create_element(&mut self, tag: &str) -> Result<WebNode, Error> {
		let element = self.document.create_element(tag).map_err(js_error("create_element"))?;
		Ok(self.wrap(element))
	}

	fn create_element_ns(&mut self, namespace: &str, tag: &str) -> Result<WebNode, Error> {
		let element = self.document.create_element_ns(Some(namespace), tag).map_err(js_error("create_element_ns"))?;
		Ok(self.wrap(element))
	}

	fn is_text(&self, node: &WebNode) -> bool {
		node.node.node_type() == Node::TEXT_NODE
	}

	fn local_name(&self, node: &WebNode) -> Option<String> {
		node.node.dyn_ref::<Element>().map(Element::local_name)
	}

	fn text(&self, node: &WebNode) -> Option<String> {
		node.node.dyn_ref::<web_sys::Text>().map(|text| text.data())
	}

	fn attributes(&self, node: &WebNode) -> Vec<(String, String)> {
		let element = match node.node.dyn_ref::<Element>() {
			Some(element) => element,
			None => return Vec::new(),
		};
		let attributes = element.attributes();
		(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| (attribute.name(), attribute.value())).collect()
	}

	fn parent_node(&self, node: &WebNode) -> Option<WebNode> {
		node.node.parent_node().map(|parent| self.wrap(parent))
	}

	fn next_sibling(&self, node: &WebNode) -> Option<WebNode> {
		node.node.next_sibling().map(|sibling| self.wrap(sibling))
	}

	fn child_nodes(&self, parent: &WebNode) -> Vec<WebNode> {
		let child_nodes = parent.node.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).map(|child| self.wrap(child)).collect()
	}

	fn is_within_svg(&self, node: &WebNode) -> bool {
		node.node
			.dyn_ref::<Element>()
			.map_or(false, |element| element.namespace_uri().as_deref() == Some(SVG_NAMESPACE) && element.local_name() != "foreignObject")
	}

	fn has_property(&self, node: &WebNode, name: &str) -> bool {
		Reflect::has(&node.node, &JsValue::from_str(name)).unwrap_or(false)
	}

	fn set_text(&mut self, node: &WebNode, text: &str) -> Result<(), Error> {
		let character_data = node
			.node
			.dyn_ref::<web_sys::CharacterData>()
			.ok_or_else(|| Error::dom("set_text", format!("{:?} is not character data", node)))?;
		character_data.set_data(text);
		Ok(())
	}

	fn insert_before(&mut self, parent: &WebNode, node: &WebNode, reference: Option<&WebNode>) -> Result<(), Error> {
		parent
			.node
			.insert_before(&node.node, reference.map(|reference| &reference.node))
			.map_err(js_error("insert_before"))?;
		Ok(())
	}

	fn remove(&mut self, node: &WebNode) -> Result<(), Error> {
		if let Some(parent) = node.node.parent_node() {
			parent.remove_child(&node.node).map_err(js_error("remove"))?;
		}
		Ok(())
	}

	fn set_inner_html(&mut self, node: &WebNode, html: &str) -> Result<(), Error> {
		element(node, "set_inner_html")?.set_inner_html(html);
		Ok(())
	}

	fn set_property(&mut self, node: &WebNode, name: &str, value: Scalar) -> Result<(), Error> {
		let value = match value {
			Scalar::Str(value) => JsValue::from_str(&value),
			Scalar::Number(value) => JsValue::from_f64(value),
			Scalar::Bool(value) => JsValue::from_bool(value),
		};
		if !Reflect::set(&node.node, &JsValue::from_str(name), &value).map_err(js_error("set_property"))? {
			trace!(name, "Property assignment was rejected.");
		}
		Ok(())
	}

	fn set_style_text(&mut self, node: &WebNode, css_text: &str) -> Result<(), Error> {
		style(node, "set_style_text")?.set_css_text(css_text);
		Ok(())
	}

	fn set_style_property(&mut self, node: &WebNode, name: &str, value: &str) -> Result<(), Error> {
		let style = style(node, "set_style_property")?;
		if value.is_empty() {
			style.remove_property(name).map_err(js_error("set_style_property"))?;
		} else {
			style.set_property(name, value).map_err(js_error("set_style_property"))?;
		}
		Ok(())
	}

	fn add_event_listener(&mut self, node: &WebNode, event: &str, capture: bool, listener: Listener<web_sys::Event>) -> Result<(), Error> {
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| listener(event)) as Box<dyn Fn(web_sys::Event)>);
		node.node
			.add_event_listener_with_callback_and_bool(event, closure.as_ref().unchecked_ref(), capture)
			.map_err(js_error("add_event_listener"))?;
		if let Some(previous) = self.closures.insert((node.clone(), event.to_owned(), capture), closure) {
			warn!(?node, event, capture, "Replaced a listener that was still registered.");
			node.node
				.remove_event_listener_with_callback_and_bool(event, previous.as_ref().unchecked_ref(), capture)
				.map_err(js_error("add_event_listener"))?;
		}
		Ok(())
	}

	fn remove_event_listener(&mut self, node: &WebNode, event: &str, capture: bool) -> Result<(), Error> {
		match self.closures.remove(&(node.clone(), event.to_owned(), capture)) {
			Some(closure) => node
				.node
				.remove_event_listener_with_callback_and_bool(event, closure.as_ref().unchecked_ref(), capture)
				.map_err(js_error("remove_event_listener")),
			None => {
				trace!(?node, event, capture, "No listener to remove.");
				Ok(())
			}
		}
	}
}
