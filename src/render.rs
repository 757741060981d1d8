use crate::{error::Report, load, Document, DomDiffer, VNode};
use std::rc::Rc;
use tracing::{info, instrument, trace, warn};

impl<D: Document> DomDiffer<D> {
	/// Renders `vnode` into `container`, diffing against what was rendered there before.
	///
	/// On the first render into a container, its existing child nodes are reused where their shape matches.
	/// Unclaimed ones stay where they are.
	///
	/// Failures below the root are contained and returned in the [`Report`].
	#[instrument(skip_all, fields(container = ?container))]
	pub fn render(&mut self, vnode: VNode<D>, container: &D::Node) -> Report {
		let mut old = self.roots.remove(container);
		let mut root = VNode::fragment([vnode]);
		let mut pool = match old {
			Some(_) => None,
			None => Some(load::load_child_nodes(&self.document, container)),
		};
		let is_svg = self.document.is_within_svg(container);

		let children = Rc::clone(&self.children);
		if let Err(error) = children.diff_children(self, container, &mut root, old.as_mut(), is_svg, pool.as_mut()) {
			self.contain(&root, error);
		}
		root.dom = root.first_live_node();
		root.last_dom_child = root.last_live_node();

		if let Some(pool) = &pool {
			if !pool.is_empty() {
				trace!(count = pool.len(), "Left unclaimed live nodes in place.");
			}
		}
		self.roots.insert(container.clone(), root);
		self.finish_pass()
	}

	/// Like [`render`](`DomDiffer::render`), but forgets any previous tree first so that `container`'s
	/// existing child nodes are adopted where possible.
	#[instrument(skip_all, fields(container = ?container))]
	pub fn hydrate(&mut self, vnode: VNode<D>, container: &D::Node) -> Report {
		if self.roots.remove(container).is_some() {
			trace!("Forgot previous root without unmounting it.");
		}
		self.render(vnode, container)
	}

	/// Unmounts whatever was rendered into `container`.
	#[instrument(skip_all, fields(container = ?container))]
	pub fn clear(&mut self, container: &D::Node) -> Report {
		if let Some(mut old) = self.roots.remove(container) {
			for child in &mut old.children {
				self.unmount(child, false);
			}
		}
		self.finish_pass()
	}

	fn finish_pass(&mut self) -> Report {
		let failures = self.take_failures();
		info!(failures = failures.len(), roots = self.roots.len(), listeners = self.patcher.listener_count(), "Pass complete.");
		if !failures.is_empty() {
			warn!("{} failure(s) were contained during this pass.", failures.len());
		}
		Report::new(failures)
	}
}
