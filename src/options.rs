use crate::{Document, VNode};
use std::{
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

pub type VNodeHook<D> = Rc<dyn Fn(&VNode<D>)>;
pub type EventHook<E> = Rc<dyn Fn(E) -> E>;

/// Optional observability hooks, passed to [`DomDiffer::with_options`](`crate::DomDiffer::with_options`).
///
/// Panics in vnode hooks are contained at the boundary of the vnode they were called for.
pub struct Options<D: Document> {
	pub(crate) diff: Option<VNodeHook<D>>,
	pub(crate) diffed: Option<VNodeHook<D>>,
	pub(crate) unmount: Option<VNodeHook<D>>,
	pub(crate) event: Option<EventHook<D::Event>>,
}

impl<D: Document> Options<D> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			diff: None,
			diffed: None,
			unmount: None,
			event: None,
		}
	}

	/// Called with each vnode before it is diffed.
	#[must_use]
	pub fn on_diff(mut self, hook: impl Fn(&VNode<D>) + 'static) -> Self {
		self.diff = Some(Rc::new(hook));
		self
	}

	/// Called with each vnode after it was diffed and attached to its live node.
	#[must_use]
	pub fn on_diffed(mut self, hook: impl Fn(&VNode<D>) + 'static) -> Self {
		self.diffed = Some(Rc::new(hook));
		self
	}

	/// Called with each vnode before it is torn down.
	#[must_use]
	pub fn on_unmount(mut self, hook: impl Fn(&VNode<D>) + 'static) -> Self {
		self.unmount = Some(Rc::new(hook));
		self
	}

	/// Transforms native events before the bound handler sees them.
	#[must_use]
	pub fn on_event(mut self, hook: impl Fn(D::Event) -> D::Event + 'static) -> Self {
		self.event = Some(Rc::new(hook));
		self
	}
}

impl<D: Document> Default for Options<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D: Document> Debug for Options<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Options")
			.field("diff", &self.diff.is_some())
			.field("diffed", &self.diffed.is_some())
			.field("unmount", &self.unmount.is_some())
			.field("event", &self.event.is_some())
			.finish()
	}
}
