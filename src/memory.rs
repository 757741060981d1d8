//! A headless live tree.
//!
//! [`MemoryDocument`] keeps its nodes in an arena and logs every mutation the reconciler makes,
//! which is what the integration tests assert on.

use crate::{
	document::{Listener, Scalar, SVG_NAMESPACE},
	Document, Error,
};
use hashbrown::HashMap;
use indextree::{Arena, Node};
use std::{
	collections::BTreeMap,
	fmt::{self, Debug, Formatter},
};
use tracing::trace;

/// Lower-cased event handler properties that elements expose natively.
const EVENT_PROPERTIES: [&str; 29] = [
	"onabort",
	"onblur",
	"onchange",
	"onclick",
	"oncontextmenu",
	"ondblclick",
	"onfocus",
	"oninput",
	"onkeydown",
	"onkeypress",
	"onkeyup",
	"onload",
	"onmousedown",
	"onmouseenter",
	"onmouseleave",
	"onmousemove",
	"onmouseout",
	"onmouseover",
	"onmouseup",
	"onpointerdown",
	"onpointermove",
	"onpointerup",
	"onreset",
	"onscroll",
	"onsubmit",
	"ontouchend",
	"ontouchmove",
	"ontouchstart",
	"onwheel",
];

/// Identity of a node in a [`MemoryDocument`]. Nodes are never removed from the arena, only detached.
pub use indextree::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEvent {
	pub kind: String,
	pub target: NodeId,
	/// The node whose listener is currently running.
	pub current_target: NodeId,
	/// Set by event hooks, for tests.
	pub detail: Option<String>,
}

/// One logged mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
	CreateText(NodeId),
	CreateElement { node: NodeId, tag: String, namespace: Option<String> },
	SetText { node: NodeId, text: String },
	Insert { parent: NodeId, node: NodeId, before: Option<NodeId> },
	Remove(NodeId),
	SetInnerHtml { node: NodeId, html: String },
	SetProperty { node: NodeId, name: String, value: Scalar },
	SetStyleText { node: NodeId, css_text: String },
	SetStyleProperty { node: NodeId, name: String, value: String },
	AddListener { node: NodeId, event: String, capture: bool },
	RemoveListener { node: NodeId, event: String, capture: bool },
}

impl Mutation {
	#[must_use]
	pub fn is_creation(&self) -> bool {
		matches!(self, Self::CreateText(_) | Self::CreateElement { .. })
	}
}

#[derive(Debug)]
enum Content {
	Text(String),
	Element {
		tag: String,
		namespace: Option<String>,
		attributes: Vec<(String, String)>,
		properties: BTreeMap<String, Scalar>,
		style: Vec<(String, String)>,
		inner_html: Option<String>,
	},
}

#[derive(Default)]
pub struct MemoryDocument {
	arena: Arena<Content>,
	listeners: HashMap<(NodeId, String, bool), Listener<MemoryEvent>>,
	mutations: Vec<Mutation>,
}

impl MemoryDocument {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn element_content(tag: &str, namespace: Option<&str>) -> Content {
		Content::Element {
			tag: tag.to_owned(),
			namespace: namespace.map(ToOwned::to_owned),
			attributes: Vec::new(),
			properties: BTreeMap::new(),
			style: Vec::new(),
			inner_html: None,
		}
	}

	fn get(&self, node: NodeId) -> Option<&Content> {
		self.arena.get(node).map(Node::get)
	}

	fn get_mut(&mut self, node: NodeId, operation: &'static str) -> Result<&mut Content, Error> {
		self.arena
			.get_mut(node)
			.map(Node::get_mut)
			.ok_or_else(|| Error::dom(operation, format!("unknown node {}", node)))
	}

	fn element_mut(&mut self, node: NodeId, operation: &'static str) -> Result<&mut Content, Error> {
		match self.get_mut(node, operation)? {
			content @ Content::Element { .. } => Ok(content),
			Content::Text(_) => Err(Error::dom(operation, format!("{} is not an element", node))),
		}
	}

	fn detach(&mut self, node: NodeId) -> bool {
		if self.parent(&node).is_none() {
			return false;
		}
		node.detach(&mut self.arena);
		true
	}

	// Fixture helpers. These are not logged.

	/// Creates a detached element without logging it.
	pub fn build_element(&mut self, tag: &str) -> NodeId {
		self.arena.new_node(Self::element_content(tag, None))
	}

	/// Creates a detached text node without logging it.
	pub fn build_text(&mut self, text: &str) -> NodeId {
		self.arena.new_node(Content::Text(text.to_owned()))
	}

	pub fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
		if let Ok(Content::Element { attributes, .. }) = self.element_mut(*node, "setAttribute") {
			match attributes.iter_mut().find(|(n, _)| n == name) {
				Some((_, v)) => *v = value.to_owned(),
				None => attributes.push((name.to_owned(), value.to_owned())),
			}
		}
	}

	/// Appends `child` to `parent` without logging it.
	pub fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), Error> {
		self.attach(*parent, *child, None).map(drop)
	}

	fn attach(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) -> Result<Option<NodeId>, Error> {
		const OPERATION: &str = "insertBefore";
		self.element_mut(parent, OPERATION)?;
		self.get_mut(node, OPERATION)?;
		if parent.ancestors(&self.arena).any(|ancestor| ancestor == node) {
			return Err(Error::dom(OPERATION, format!("{} contains the new parent {}", node, parent)));
		}
		let reference = match reference {
			Some(reference) if reference == node => self.next_sibling(&node),
			reference => reference,
		};
		if let Some(reference) = reference {
			if self.parent(&reference) != Some(parent) {
				return Err(Error::dom(OPERATION, format!("reference {} is not a child of {}", reference, parent)));
			}
		}

		let inserted = match reference {
			Some(reference) => reference.checked_insert_before(node, &mut self.arena),
			None => parent.checked_append(node, &mut self.arena),
		};
		inserted.map_err(|error| Error::dom(OPERATION, error.to_string()))?;
		Ok(reference)
	}

	// Inspection.

	pub fn mutations(&self) -> &[Mutation] {
		&self.mutations
	}

	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		std::mem::take(&mut self.mutations)
	}

	pub fn clear_mutations(&mut self) {
		self.mutations.clear();
	}

	pub fn tag(&self, node: &NodeId) -> Option<&str> {
		match self.get(*node)? {
			Content::Element { tag, .. } => Some(tag),
			Content::Text(_) => None,
		}
	}

	pub fn namespace(&self, node: &NodeId) -> Option<&str> {
		match self.get(*node)? {
			Content::Element { namespace, .. } => namespace.as_deref(),
			Content::Text(_) => None,
		}
	}

	/// Text data of a text node.
	pub fn data(&self, node: &NodeId) -> Option<&str> {
		match self.get(*node)? {
			Content::Text(text) => Some(text),
			Content::Element { .. } => None,
		}
	}

	pub fn children(&self, node: &NodeId) -> Vec<NodeId> {
		match self.get(*node) {
			Some(_) => node.children(&self.arena).collect(),
			None => Vec::new(),
		}
	}

	pub fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.arena.get(*node)?.parent()
	}

	pub fn property(&self, node: &NodeId, name: &str) -> Option<&Scalar> {
		match self.get(*node)? {
			Content::Element { properties, .. } => properties.get(name),
			Content::Text(_) => None,
		}
	}

	pub fn style_property(&self, node: &NodeId, name: &str) -> Option<&str> {
		match self.get(*node)? {
			Content::Element { style, .. } => style.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str()),
			Content::Text(_) => None,
		}
	}

	/// The inline style as style text, like `color: red; font-size: 10px`.
	pub fn style_text(&self, node: &NodeId) -> String {
		match self.get(*node) {
			Some(Content::Element { style, .. }) => style.iter().map(|(name, value)| format!("{}: {}", name, value)).collect::<Vec<_>>().join("; "),
			_ => String::new(),
		}
	}

	pub fn raw_html(&self, node: &NodeId) -> Option<&str> {
		match self.get(*node)? {
			Content::Element { inner_html, .. } => inner_html.as_deref(),
			Content::Text(_) => None,
		}
	}

	/// Number of listeners registered on `node`, across events and phases.
	pub fn listener_count(&self, node: &NodeId) -> usize {
		self.listeners.keys().filter(|(n, _, _)| n == node).count()
	}

	/// Serialises the content of `node`, like `<p>hi</p> there`. Attributes and properties are left out.
	pub fn inner_html(&self, node: &NodeId) -> String {
		let mut html = String::new();
		if let Some(raw) = self.raw_html(node) {
			html.push_str(raw);
		}
		for child in self.children(node) {
			self.write_outer_html(child, &mut html);
		}
		html
	}

	fn write_outer_html(&self, node: NodeId, html: &mut String) {
		match self.get(node) {
			Some(Content::Text(text)) => {
				for c in text.chars() {
					match c {
						'&' => html.push_str("&amp;"),
						'<' => html.push_str("&lt;"),
						'>' => html.push_str("&gt;"),
						c => html.push(c),
					}
				}
			}
			Some(Content::Element { tag, .. }) => {
				html.push('<');
				html.push_str(tag);
				html.push('>');
				html.push_str(&self.inner_html(&node));
				html.push_str("</");
				html.push_str(tag);
				html.push('>');
			}
			None => (),
		}
	}

	/// Dispatches an event at `target`: capture listeners from the root down, then bubble listeners back up.
	///
	/// Returns the number of listeners that ran.
	pub fn dispatch(&self, target: &NodeId, kind: &str) -> usize {
		let path: Vec<NodeId> = match self.get(*target) {
			Some(_) => target.ancestors(&self.arena).collect(),
			None => Vec::new(),
		};

		let mut calls = Vec::new();
		for &node in path.iter().rev() {
			if let Some(listener) = self.listeners.get(&(node, kind.to_owned(), true)) {
				calls.push((node, listener.clone()));
			}
		}
		for &node in &path {
			if let Some(listener) = self.listeners.get(&(node, kind.to_owned(), false)) {
				calls.push((node, listener.clone()));
			}
		}

		trace!(kind, listeners = calls.len(), "Dispatching.");
		for (current_target, listener) in &calls {
			listener(MemoryEvent {
				kind: kind.to_owned(),
				target: *target,
				current_target: *current_target,
				detail: None,
			});
		}
		calls.len()
	}
}

impl Debug for MemoryDocument {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryDocument")
			.field("nodes", &self.arena.count())
			.field("listeners", &self.listeners.keys().collect::<Vec<_>>())
			.field("mutations", &self.mutations.len())
			.finish()
	}
}

impl Document for MemoryDocument {
	type Node = NodeId;
	type Event = MemoryEvent;

	fn create_text_node(&mut self, text: &str) -> Result<NodeId, Error> {
		let node = self.build_text(text);
		self.mutations.push(Mutation::CreateText(node));
		Ok(node)
	}

	fn create_element(&mut self, tag: &str) -> Result<NodeId, Error> {
		validate_tag("createElement", tag)?;
		let node = self.build_element(tag);
		self.mutations.push(Mutation::CreateElement {
			node,
			tag: tag.to_owned(),
			namespace: None,
		});
		Ok(node)
	}

	fn create_element_ns(&mut self, namespace: &str, tag: &str) -> Result<NodeId, Error> {
		validate_tag("createElementNS", tag)?;
		let node = self.arena.new_node(Self::element_content(tag, Some(namespace)));
		self.mutations.push(Mutation::CreateElement {
			node,
			tag: tag.to_owned(),
			namespace: Some(namespace.to_owned()),
		});
		Ok(node)
	}

	fn is_text(&self, node: &NodeId) -> bool {
		self.data(node).is_some()
	}

	fn local_name(&self, node: &NodeId) -> Option<String> {
		self.tag(node).map(ToOwned::to_owned)
	}

	fn text(&self, node: &NodeId) -> Option<String> {
		self.data(node).map(ToOwned::to_owned)
	}

	fn attributes(&self, node: &NodeId) -> Vec<(String, String)> {
		match self.get(*node) {
			Some(Content::Element { attributes, .. }) => attributes.clone(),
			_ => Vec::new(),
		}
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.parent(node)
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		self.arena.get(*node)?.next_sibling()
	}

	fn child_nodes(&self, parent: &NodeId) -> Vec<NodeId> {
		self.children(parent)
	}

	fn is_within_svg(&self, node: &NodeId) -> bool {
		self.namespace(node) == Some(SVG_NAMESPACE) && self.tag(node) != Some("foreignObject")
	}

	fn has_property(&self, node: &NodeId, name: &str) -> bool {
		match self.get(*node) {
			Some(Content::Element { properties, .. }) => EVENT_PROPERTIES.contains(&name) || properties.contains_key(name),
			_ => false,
		}
	}

	fn set_text(&mut self, node: &NodeId, text: &str) -> Result<(), Error> {
		match self.get_mut(*node, "setData")? {
			Content::Text(data) => *data = text.to_owned(),
			Content::Element { .. } => return Err(Error::dom("setData", format!("{} is not a text node", node))),
		}
		self.mutations.push(Mutation::SetText {
			node: *node,
			text: text.to_owned(),
		});
		Ok(())
	}

	fn insert_before(&mut self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) -> Result<(), Error> {
		let before = self.attach(*parent, *node, reference.copied())?;
		self.mutations.push(Mutation::Insert {
			parent: *parent,
			node: *node,
			before,
		});
		Ok(())
	}

	fn remove(&mut self, node: &NodeId) -> Result<(), Error> {
		self.get_mut(*node, "remove")?;
		if self.detach(*node) {
			self.mutations.push(Mutation::Remove(*node));
		}
		Ok(())
	}

	fn set_inner_html(&mut self, node: &NodeId, html: &str) -> Result<(), Error> {
		if let Content::Element { inner_html, .. } = self.element_mut(*node, "innerHTML")? {
			*inner_html = if html.is_empty() { None } else { Some(html.to_owned()) };
		}
		for child in self.children(node) {
			child.detach(&mut self.arena);
		}
		self.mutations.push(Mutation::SetInnerHtml {
			node: *node,
			html: html.to_owned(),
		});
		Ok(())
	}

	fn set_property(&mut self, node: &NodeId, name: &str, value: Scalar) -> Result<(), Error> {
		if let Content::Element { properties, .. } = self.element_mut(*node, "setProperty")? {
			properties.insert(name.to_owned(), value.clone());
		}
		self.mutations.push(Mutation::SetProperty {
			node: *node,
			name: name.to_owned(),
			value,
		});
		Ok(())
	}

	fn set_style_text(&mut self, node: &NodeId, css_text: &str) -> Result<(), Error> {
		if let Content::Element { style, .. } = self.element_mut(*node, "cssText")? {
			*style = css_text
				.split(';')
				.filter_map(|declaration| {
					let (name, value) = declaration.split_once(':')?;
					Some((name.trim().to_owned(), value.trim().to_owned()))
				})
				.filter(|(name, value)| !name.is_empty() && !value.is_empty())
				.collect();
		}
		self.mutations.push(Mutation::SetStyleText {
			node: *node,
			css_text: css_text.to_owned(),
		});
		Ok(())
	}

	fn set_style_property(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), Error> {
		if let Content::Element { style, .. } = self.element_mut(*node, "setProperty")? {
			let existing = style.iter().position(|(n, _)| n == name);
			match (existing, value.is_empty()) {
				(Some(index), true) => drop(style.remove(index)),
				(Some(index), false) => style[index].1 = value.to_owned(),
				(None, true) => (),
				(None, false) => style.push((name.to_owned(), value.to_owned())),
			}
		}
		self.mutations.push(Mutation::SetStyleProperty {
			node: *node,
			name: name.to_owned(),
			value: value.to_owned(),
		});
		Ok(())
	}

	fn add_event_listener(&mut self, node: &NodeId, event: &str, capture: bool, listener: Listener<MemoryEvent>) -> Result<(), Error> {
		self.get_mut(*node, "addEventListener")?;
		self.listeners.insert((*node, event.to_owned(), capture), listener);
		self.mutations.push(Mutation::AddListener {
			node: *node,
			event: event.to_owned(),
			capture,
		});
		Ok(())
	}

	fn remove_event_listener(&mut self, node: &NodeId, event: &str, capture: bool) -> Result<(), Error> {
		if self.listeners.remove(&(*node, event.to_owned(), capture)).is_some() {
			self.mutations.push(Mutation::RemoveListener {
				node: *node,
				event: event.to_owned(),
				capture,
			});
		}
		Ok(())
	}
}

fn validate_tag(operation: &'static str, tag: &str) -> Result<(), Error> {
	if tag.is_empty() || tag.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '=')) {
		Err(Error::dom(operation, format!("invalid tag name {:?}", tag)))
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::{cell::RefCell, rc::Rc};

	#[test]
	fn insert_moves_and_validates() {
		let mut document = MemoryDocument::new();
		let root = document.build_element("div");
		let a = document.create_element("a").unwrap();
		let b = document.create_text_node("b").unwrap();
		document.insert_before(&root, &a, None).unwrap();
		document.insert_before(&root, &b, Some(&a)).unwrap();
		assert_eq!(document.inner_html(&root), "b<a></a>");
		assert_eq!(document.next_sibling(&b), Some(a));

		assert!(document.insert_before(&a, &root, None).is_err());
		assert!(document.insert_before(&b, &a, None).is_err());
		let stray = document.build_element("i");
		assert!(document.insert_before(&root, &stray, Some(&root)).is_err());
	}

	#[test]
	fn insert_before_itself_stays() {
		let mut document = MemoryDocument::new();
		let root = document.build_element("div");
		let a = document.build_element("a");
		let b = document.build_element("b");
		document.append_child(&root, &a).unwrap();
		document.append_child(&root, &b).unwrap();

		document.insert_before(&root, &a, Some(&a)).unwrap();
		assert_eq!(document.children(&root), [a, b]);
		assert_eq!(document.mutations(), [Mutation::Insert { parent: root, node: a, before: Some(b) }]);
		assert_eq!(document.next_sibling(&b), None);
	}

	#[test]
	fn remove_detached_is_noop() {
		let mut document = MemoryDocument::new();
		let node = document.build_element("div");
		document.remove(&node).unwrap();
		assert!(document.mutations().is_empty());
	}

	#[test]
	fn invalid_tags_fail() {
		let mut document = MemoryDocument::new();
		assert!(document.create_element("").is_err());
		assert!(document.create_element("not a tag").is_err());
		assert!(document.create_element_ns(SVG_NAMESPACE, "<svg>").is_err());
	}

	#[test]
	fn inline_style() {
		let mut document = MemoryDocument::new();
		let node = document.build_element("div");
		document.set_style_text(&node, "color: red; font-size: 10px").unwrap();
		assert_eq!(document.style_property(&node, "font-size"), Some("10px"));
		document.set_style_property(&node, "color", "").unwrap();
		document.set_style_property(&node, "width", "1px").unwrap();
		assert_eq!(document.style_text(&node), "font-size: 10px; width: 1px");
	}

	#[test]
	fn dispatch_order() {
		let mut document = MemoryDocument::new();
		let outer = document.build_element("div");
		let inner = document.build_element("button");
		document.append_child(&outer, &inner).unwrap();

		let log = Rc::new(RefCell::new(Vec::new()));
		for (node, capture, label) in [(outer, true, "outer capture"), (outer, false, "outer bubble"), (inner, false, "inner bubble")] {
			let log = Rc::clone(&log);
			document
				.add_event_listener(&node, "click", capture, Rc::new(move |_: MemoryEvent| log.borrow_mut().push(label)))
				.unwrap();
		}

		assert_eq!(document.dispatch(&inner, "click"), 3);
		assert_eq!(*log.borrow(), ["outer capture", "inner bubble", "outer bubble"]);
		assert_eq!(document.dispatch(&inner, "keydown"), 0);
	}

	#[test]
	fn inner_html_detaches_children() {
		let mut document = MemoryDocument::new();
		let node = document.build_element("div");
		let child = document.build_text("old");
		document.append_child(&node, &child).unwrap();
		document.set_inner_html(&node, "<b>new</b>").unwrap();
		assert_eq!(document.parent(&child), None);
		assert_eq!(document.inner_html(&node), "<b>new</b>");
	}
}
