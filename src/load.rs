//! Reading state back from existing live nodes, for hydration.

use crate::{
	vnode::{PropValue, Props, VNodeType},
	Document,
};
use tracing::trace;

/// Live nodes eligible for reuse during one pass, at one level of the tree.
///
/// Claimed nodes are taken out immediately, so no two vnodes can claim the same node.
#[derive(Debug)]
pub struct ReusePool<N>(Vec<Option<N>>);

impl<N> ReusePool<N> {
	#[must_use]
	pub fn new(nodes: Vec<N>) -> Self {
		Self(nodes.into_iter().map(Some).collect())
	}

	/// Takes the first remaining node accepted by `matches`.
	pub fn claim(&mut self, mut matches: impl FnMut(&N) -> bool) -> Option<N> {
		self.0.iter_mut().find(|slot| slot.as_ref().map_or(false, &mut matches)).and_then(Option::take)
	}

	pub fn remaining(&self) -> impl Iterator<Item = &N> {
		self.0.iter().flatten()
	}

	pub fn len(&self) -> usize {
		self.remaining().count()
	}

	pub fn is_empty(&self) -> bool {
		self.remaining().next().is_none()
	}
}

/// The current child nodes of `parent`, as a fresh reuse pool.
pub fn load_child_nodes<D: Document>(document: &D, parent: &D::Node) -> ReusePool<D::Node> {
	let child_nodes = document.child_nodes(parent);
	trace!(count = child_nodes.len(), "Loaded child nodes into reuse pool.");
	ReusePool::new(child_nodes)
}

/// Whether `node` has the shape `kind` asks for.
pub fn matches_shape<D: Document>(document: &D, node: &D::Node, kind: &VNodeType) -> bool {
	match kind {
		VNodeType::Text => document.is_text(node),
		VNodeType::Element(tag) => document.local_name(node).as_deref() == Some(&**tag),
		VNodeType::Fragment => false,
	}
}

/// Stand-in old props for a node that was never diffed before, read from its attributes.
///
/// `class` is renamed to `className` if that's what `new_props` uses.
pub fn load_props<D: Document>(document: &D, node: &D::Node, new_props: &Props<D::Event>) -> Props<D::Event> {
	let class_name = new_props.contains_key("className");
	let mut props = Props::new();
	for (name, value) in document.attributes(node) {
		let name = if class_name && name == "class" { "className".to_owned() } else { name };
		props.insert(name, PropValue::Str(value.into()));
	}
	props
}
