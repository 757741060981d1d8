use crate::{
	children::{ChildReconciler, KeyedChildren},
	document::{Scalar, SVG_NAMESPACE},
	error::{panic_message, Failure},
	load::{self, ReusePool},
	loggable,
	options::{Options, VNodeHook},
	props::PropertyPatcher,
	refs::{self, Ref},
	vnode::{Props, VNode, VNodeType},
	Document, Error,
};
use hashbrown::HashMap;
use std::{
	fmt::{self, Debug, Formatter},
	mem,
	panic::{self, AssertUnwindSafe},
	rc::Rc,
};
use tracing::{error, instrument, trace, trace_span};

/// Reconciles vnode trees against the live tree of one [`Document`].
///
/// The previous tree of each container rendered into is kept between passes,
/// together with the side-table of event handlers bound to live nodes.
///
/// # Correct Use
///
/// The differ must be the only mutator of the subtrees it manages, and passes over the same container must not overlap.
/// Event handlers keep working for as long as the live nodes they're bound to are tracked.
pub struct DomDiffer<D: Document> {
	pub(crate) document: D,
	pub(crate) options: Options<D>,
	pub(crate) patcher: PropertyPatcher<D>,
	pub(crate) children: Rc<dyn ChildReconciler<D>>,
	pub(crate) roots: HashMap<D::Node, VNode<D>>,
	failures: Vec<Failure>,
	path: Vec<String>,
}

impl<D: Document> DomDiffer<D> {
	#[must_use]
	pub fn new(document: D) -> Self {
		Self::with_options(document, Options::new())
	}

	#[must_use]
	#[instrument(skip_all, fields(options = ?options))]
	pub fn with_options(document: D, options: Options<D>) -> Self {
		Self {
			document,
			patcher: PropertyPatcher::new(options.event.clone()),
			options,
			children: Rc::new(KeyedChildren),
			roots: HashMap::new(),
			failures: Vec::new(),
			path: Vec::new(),
		}
	}

	/// Replaces the default [`KeyedChildren`] reconciler.
	#[must_use]
	pub fn with_child_reconciler(mut self, reconciler: impl ChildReconciler<D> + 'static) -> Self {
		self.children = Rc::new(reconciler);
		self
	}

	pub fn document(&self) -> &D {
		&self.document
	}

	pub fn document_mut(&mut self) -> &mut D {
		&mut self.document
	}

	pub fn into_document(self) -> D {
		self.document
	}

	/// The root fragment last rendered into `container`.
	pub fn root(&self, container: &D::Node) -> Option<&VNode<D>> {
		self.roots.get(container)
	}

	/// Diffs one vnode against its previous version and returns the live node now associated with it.
	///
	/// If `old` is missing or of a different type, it is unmounted and `new` is mounted from scratch,
	/// ignoring `dom`. For fragments, the return value is only the first of their live nodes.
	///
	/// Failures are contained here: they are recorded for the current pass, logged,
	/// and leave `new` with whatever live node it had been assigned up to that point.
	#[allow(clippy::too_many_arguments)]
	pub fn diff(
		&mut self,
		dom: Option<D::Node>,
		parent: &D::Node,
		new: Option<&mut VNode<D>>,
		mut old: Option<&mut VNode<D>>,
		is_svg: bool,
		pool: Option<&mut ReusePool<D::Node>>,
	) -> Option<D::Node> {
		let mut dom = dom;
		// An old vnode that never got its live node (after a contained failure) has nothing applied to diff against.
		let replace = match (&new, &old) {
			(Some(new), Some(old)) => new.kind != old.kind || !old.is_mounted(),
			_ => true,
		};
		if replace {
			if let Some(old) = old.take() {
				let span = trace_span!("Replacing mismatching", old = %old.describe());
				let _enter = span.enter();
				self.unmount(old, false);
			}
			dom = None;
		}
		let new = new?;

		let span = trace_span!("Diffing", vnode = %new.describe(), is_svg);
		let _enter = span.enter();
		if cfg!(feature = "log-paths") {
			self.path.push(new.describe());
		}
		let dom = match self.diff_node(dom, parent, new, old, is_svg, pool) {
			Ok(dom) => dom,
			Err(error) => {
				self.contain(new, error);
				new.dom.clone()
			}
		};
		if cfg!(feature = "log-paths") {
			self.path.pop();
		}
		dom
	}

	fn diff_node(&mut self, dom: Option<D::Node>, parent: &D::Node, new: &mut VNode<D>, old: Option<&mut VNode<D>>, is_svg: bool, pool: Option<&mut ReusePool<D::Node>>) -> Result<Option<D::Node>, Error> {
		call_hook(self.options.diff.as_ref(), "diff", new)?;

		let dom = if new.is_fragment() {
			let children = Rc::clone(&self.children);
			children.diff_children(self, parent, new, old, is_svg, pool)?;
			new.last_dom_child = new.last_live_node();
			new.first_live_node()
		} else {
			let old_ref = old.as_ref().and_then(|old| old.r#ref.clone());
			let dom = self.diff_element_nodes(dom, new, old, is_svg, pool)?;
			if refs::changed(old_ref.as_ref(), new.r#ref.as_ref()) {
				if let Some(old_ref) = &old_ref {
					self.apply_ref(old_ref, None, new);
				}
				if let Some(new_ref) = &new.r#ref {
					self.apply_ref(new_ref, Some(&dom), new);
				}
			}
			Some(dom)
		};

		new.dom = dom.clone();
		call_hook(self.options.diffed.as_ref(), "diffed", new)?;
		Ok(dom)
	}

	/// Reconciles a text or element vnode: acquires its live node, then syncs text or children and props.
	#[allow(clippy::too_many_lines)]
	fn diff_element_nodes(&mut self, dom: Option<D::Node>, new: &mut VNode<D>, mut old: Option<&mut VNode<D>>, is_svg: bool, mut pool: Option<&mut ReusePool<D::Node>>) -> Result<D::Node, Error> {
		let is_svg = new.is_tag("svg") || is_svg;

		let mut claimed = false;
		let dom = match dom {
			Some(dom) => Some(dom),
			None => {
				let document = &self.document;
				let kind = &new.kind;
				let claim = pool.as_deref_mut().and_then(|pool| pool.claim(|node| load::matches_shape(document, node, kind)));
				if claim.is_some() {
					trace!("Claimed live node from reuse pool.");
					claimed = true;
				}
				claim
			}
		};
		let (dom, created) = match dom {
			Some(dom) => (dom, false),
			None => (self.create(new, is_svg)?, true),
		};
		new.dom = Some(dom.clone());

		if new.kind == VNodeType::Text {
			if !created {
				let unchanged = match old.as_deref() {
					Some(old) => old.text == new.text,
					None => self.document.text(&dom).as_deref() == Some(&*new.text),
				};
				if unchanged {
					trace!("Text unchanged.");
				} else {
					trace!(text = loggable(&new.text), "Updating text.");
					self.document.set_text(&dom, &new.text)?;
				}
			}
			return Ok(dom);
		}

		// A freshly created node has no children worth reusing.
		let mut child_pool = if created || pool.is_none() { None } else { Some(load::load_child_nodes(&self.document, &dom)) };

		let old_props = match old.as_deref_mut() {
			Some(old) => mem::take(&mut old.props),
			None if claimed => load::load_props(&self.document, &dom, &new.props),
			None => Props::new(),
		};

		let has_html = new.props.raw_html().is_some();
		if has_html || old_props.raw_html().is_some() {
			let html = new.props.raw_html();
			if html == old_props.raw_html() {
				trace!("Raw HTML unchanged.");
			} else {
				trace!(html = loggable(html.unwrap_or_default()), "Replacing inner HTML.");
				self.document.set_inner_html(&dom, html.unwrap_or_default())?;
			}
		}

		if new.props.get("multiple").map_or(false, |multiple| multiple.is_truthy()) {
			self.document.set_property(&dom, "multiple", Scalar::Bool(true))?;
		}

		if has_html {
			if let Some(old) = old.as_deref_mut() {
				// Already detached along with the previous inner HTML.
				for child in &mut old.children {
					self.unmount(child, true);
				}
			}
			if !new.children.is_empty() {
				trace!(count = new.children.len(), "Dropping children of raw HTML element.");
				// Never mounted, so they must not become the old children of the next pass.
				new.children.clear();
			}
		} else {
			let child_svg = is_svg && !new.is_tag("foreignObject");
			let children = Rc::clone(&self.children);
			children.diff_children(self, &dom, new, old, child_svg, child_pool.as_mut())?;
		}

		// After children, since some properties (like a selection's value) depend on them.
		self.patcher.diff_props(&mut self.document, &dom, &new.props, &old_props, is_svg)?;

		if let Some(pool) = &child_pool {
			if !pool.is_empty() {
				trace!(count = pool.len(), "Leaving unclaimed child nodes in place.");
			}
		}
		Ok(dom)
	}

	fn create(&mut self, new: &VNode<D>, is_svg: bool) -> Result<D::Node, Error> {
		match &new.kind {
			VNodeType::Text => {
				trace!(text = loggable(&new.text), "Creating text node.");
				self.document.create_text_node(&new.text)
			}
			VNodeType::Element(tag) if is_svg => {
				trace!(%tag, "Creating SVG element.");
				self.document.create_element_ns(SVG_NAMESPACE, tag)
			}
			VNodeType::Element(tag) => {
				trace!(%tag, "Creating element.");
				self.document.create_element(tag)
			}
			VNodeType::Fragment => Err(Error::dom("create", "fragments own no live node")),
		}
	}

	/// Tears down `vnode` and its subtree: calls the unmount hook, detaches refs and removes live nodes.
	///
	/// `skip_remove` means an ancestor's live node was already removed, which took this subtree with it.
	pub fn unmount(&mut self, vnode: &mut VNode<D>, skip_remove: bool) {
		let span = trace_span!("Unmounting", vnode = %vnode.describe(), skip_remove);
		let _enter = span.enter();
		if cfg!(feature = "log-paths") {
			self.path.push(vnode.describe());
		}

		if let Err(error) = call_hook(self.options.unmount.as_ref(), "unmount", vnode) {
			self.contain(vnode, error);
		}
		if let Some(r#ref) = vnode.r#ref.clone() {
			self.apply_ref(&r#ref, None, vnode);
		}

		let mut skip_remove = skip_remove;
		if !vnode.is_fragment() {
			if let Some(dom) = vnode.dom.take() {
				if let Err(error) = self.patcher.release(&mut self.document, &dom) {
					self.contain(vnode, error);
				}
				if !skip_remove {
					skip_remove = true;
					if let Err(error) = self.document.remove(&dom) {
						self.contain(vnode, error);
					}
				}
			}
		}
		vnode.dom = None;
		vnode.last_dom_child = None;

		for child in &mut vnode.children {
			self.unmount(child, skip_remove);
		}
		if cfg!(feature = "log-paths") {
			self.path.pop();
		}
	}

	/// Invokes or assigns `r#ref`. Failures are contained at `owner` without interrupting the caller.
	fn apply_ref(&mut self, r#ref: &Ref<D::Node>, value: Option<&D::Node>, owner: &VNode<D>) {
		trace!(?r#ref, attached = value.is_some(), "Applying ref.");
		if let Err(error) = r#ref.apply(value) {
			self.contain(owner, error);
		}
	}

	/// Records `error` as a failure at the boundary of `vnode`, which is the innermost vnode currently being worked on.
	pub(crate) fn contain(&mut self, vnode: &VNode<D>, error: Error) {
		let description = if cfg!(feature = "log-paths") && !self.path.is_empty() {
			self.path.join(" > ")
		} else {
			vnode.describe()
		};
		error!(vnode = %description, %error, "Contained failure.");
		self.failures.push(Failure { vnode: description, error });
	}

	pub(crate) fn take_failures(&mut self) -> Vec<Failure> {
		mem::take(&mut self.failures)
	}
}

impl<D: Document> Debug for DomDiffer<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("DomDiffer")
			.field("options", &self.options)
			.field("patcher", &self.patcher)
			.field("roots", &self.roots.len())
			.field("failures", &self.failures)
			.finish_non_exhaustive()
	}
}

fn call_hook<D: Document>(hook: Option<&VNodeHook<D>>, name: &'static str, vnode: &VNode<D>) -> Result<(), Error> {
	match hook {
		Some(hook) => panic::catch_unwind(AssertUnwindSafe(|| hook(vnode))).map_err(|payload| Error::Hook {
			hook: name,
			message: panic_message(&*payload),
		}),
		None => Ok(()),
	}
}
