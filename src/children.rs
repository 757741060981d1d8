//! Child list reconciliation.

use crate::{
	load::ReusePool,
	vnode::{Key, VNode},
	Document, DomDiffer, Error,
};
use hashbrown::{HashMap, HashSet};
use std::mem;
use tracing::{trace, trace_span, warn};

/// Reconciles the children of one vnode against those of its previous version.
///
/// Implementations pair new and old children, [`DomDiffer::diff`] each pair,
/// [`DomDiffer::unmount`] unpaired old children and finally place the resulting live nodes under `parent`.
/// For fragment parents, the new live nodes must end up where the old ones were.
pub trait ChildReconciler<D: Document> {
	/// # Errors
	///
	/// Only for failures that make the placement of the whole list impossible.
	/// Failures of individual children are contained by [`DomDiffer::diff`].
	#[allow(clippy::too_many_arguments)]
	fn diff_children(
		&self,
		differ: &mut DomDiffer<D>,
		parent: &D::Node,
		new_parent: &mut VNode<D>,
		old_parent: Option<&mut VNode<D>>,
		is_svg: bool,
		pool: Option<&mut ReusePool<D::Node>>,
	) -> Result<(), Error>;
}

/// The default [`ChildReconciler`].
///
/// Keyed children pair with the old child of the same key and type, wherever it was.
/// Unkeyed children pair with the unkeyed old child of the same type at the same index if there is one,
/// otherwise with the first remaining unkeyed old child of that type.
/// Old children without a live node are never paired.
///
/// Duplicate sibling keys are reported as contained failures. Past the first, they're mounted as new.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedChildren;

impl<D: Document> ChildReconciler<D> for KeyedChildren {
	fn diff_children(
		&self,
		differ: &mut DomDiffer<D>,
		parent: &D::Node,
		new_parent: &mut VNode<D>,
		old_parent: Option<&mut VNode<D>>,
		is_svg: bool,
		mut pool: Option<&mut ReusePool<D::Node>>,
	) -> Result<(), Error> {
		let span = trace_span!("Diffing children", count = new_parent.children.len());
		let _enter = span.enter();

		let duplicates: Vec<Key> = {
			let mut seen = HashSet::new();
			new_parent
				.children
				.iter()
				.filter_map(|child| child.key.as_ref())
				.filter(|&key| !seen.insert(key))
				.cloned()
				.collect()
		};
		for key in duplicates {
			warn!(%key, "Duplicate sibling key. Only its first occurrence can be matched.");
			differ.contain(new_parent, Error::DuplicateKey(key.into_owned()));
		}

		// Must be read before anything moves.
		let end = match &old_parent {
			Some(old) if old.is_fragment() => old.last_live_node().and_then(|last| differ.document().next_sibling(&last)),
			_ => None,
		};

		let mut old_children: Vec<Option<VNode<D>>> = match old_parent {
			Some(old) => mem::take(&mut old.children).into_iter().map(Some).collect(),
			None => Vec::new(),
		};
		let keyed: HashMap<Key, usize> = old_children
			.iter()
			.enumerate()
			.filter_map(|(index, old)| Some((old.as_ref()?.key.clone()?, index)))
			.collect();

		let mut matched: Vec<Option<VNode<D>>> = Vec::with_capacity(new_parent.children.len());
		for (index, child) in new_parent.children.iter().enumerate() {
			let slot = match &child.key {
				Some(key) => keyed
					.get(key)
					.copied()
					.filter(|&index| old_children[index].as_ref().map_or(false, |old| old.kind == child.kind && old.is_mounted())),
				None => {
					let same = |old: &Option<VNode<D>>| old.as_ref().map_or(false, |old| old.key.is_none() && old.kind == child.kind && old.is_mounted());
					if old_children.get(index).map_or(false, &same) {
						Some(index)
					} else {
						old_children.iter().position(&same)
					}
				}
			};
			matched.push(slot.and_then(|index| old_children[index].take()));
		}

		for old in old_children.iter_mut().flatten() {
			differ.unmount(old, false);
		}

		for (child, old) in new_parent.children.iter_mut().zip(&mut matched) {
			let dom = old.as_ref().and_then(|old| old.dom.clone());
			differ.diff(dom, parent, Some(child), old.as_mut(), is_svg, pool.as_deref_mut());
		}

		// Back to front, so each node's successor is already in place.
		let nodes: Vec<D::Node> = new_parent.children.iter().flat_map(VNode::live_nodes).collect();
		let document = differ.document_mut();
		let mut next = end;
		for node in nodes.iter().rev() {
			let in_place = document.parent_node(node).as_ref() == Some(parent) && document.next_sibling(node) == next;
			if !in_place {
				trace!(?node, before = ?next, "Placing child.");
				document.insert_before(parent, node, next.as_ref())?;
			}
			next = Some(node.clone());
		}
		Ok(())
	}
}
