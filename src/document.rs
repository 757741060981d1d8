//! The seam between the reconciler and a concrete live tree.

use crate::Error;
use core::{fmt::Debug, hash::Hash};
use std::rc::Rc;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A long-lived native listener, as registered with [`Document::add_event_listener`].
pub type Listener<E> = Rc<dyn Fn(E)>;

/// A value assigned directly as a live property.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	Str(String),
	Number(f64),
	Bool(bool),
}

impl Scalar {
	/// What cleared properties are set to.
	#[must_use]
	pub fn empty() -> Self {
		Self::Str(String::new())
	}
}

/// A mutable tree of live nodes, like the browser DOM.
///
/// The reconciler is expected to be the only mutator of any subtree it manages.
/// All mutations may fail. Failures are contained by the caller at the boundary of the vnode being diffed.
pub trait Document {
	/// A cheap handle to a live node. Handle equality is node identity.
	type Node: Clone + Eq + Hash + Debug + 'static;
	type Event: 'static;

	fn create_text_node(&mut self, text: &str) -> Result<Self::Node, Error>;
	fn create_element(&mut self, tag: &str) -> Result<Self::Node, Error>;
	fn create_element_ns(&mut self, namespace: &str, tag: &str) -> Result<Self::Node, Error>;

	fn is_text(&self, node: &Self::Node) -> bool;
	/// `None` for anything that isn't an element.
	fn local_name(&self, node: &Self::Node) -> Option<String>;
	/// `None` for anything that isn't a text node.
	fn text(&self, node: &Self::Node) -> Option<String>;
	fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
	fn child_nodes(&self, parent: &Self::Node) -> Vec<Self::Node>;
	/// Whether children of `node` live in the SVG namespace.
	fn is_within_svg(&self, node: &Self::Node) -> bool;
	/// Whether `node` exposes a live property called `name`, like `onclick`.
	fn has_property(&self, node: &Self::Node, name: &str) -> bool;

	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), Error>;
	/// Moves `node` (which may be attached elsewhere) into `parent`, before `reference` or at the end.
	fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) -> Result<(), Error>;
	/// Detaches `node` from its parent. Detaching an already detached node does nothing.
	fn remove(&mut self, node: &Self::Node) -> Result<(), Error>;
	fn set_inner_html(&mut self, node: &Self::Node, html: &str) -> Result<(), Error>;
	fn set_property(&mut self, node: &Self::Node, name: &str, value: Scalar) -> Result<(), Error>;
	/// Replaces the whole inline style.
	fn set_style_text(&mut self, node: &Self::Node, css_text: &str) -> Result<(), Error>;
	/// Sets one hyphenated inline style property. An empty `value` removes it.
	fn set_style_property(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), Error>;

	fn add_event_listener(&mut self, node: &Self::Node, event: &str, capture: bool, listener: Listener<Self::Event>) -> Result<(), Error>;
	fn remove_event_listener(&mut self, node: &Self::Node, event: &str, capture: bool) -> Result<(), Error>;
}
