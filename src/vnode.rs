//! Vnodes and their props.

use crate::{Document, Ref};
use std::{
	borrow::Cow,
	collections::{btree_map, BTreeMap},
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

pub type Key = Cow<'static, str>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VNodeType {
	Text,
	Element(Cow<'static, str>),
	/// An ordered list of children without a live node of its own.
	Fragment,
}

/// A description of one desired node, valid for one pass.
///
/// After a pass, the vnode records which live node it claimed. It is then kept by the [`DomDiffer`](`crate::DomDiffer`)
/// as the previous tree until the next pass over the same container.
pub struct VNode<D: Document> {
	pub(crate) kind: VNodeType,
	pub(crate) text: Cow<'static, str>,
	pub(crate) props: Props<D::Event>,
	pub(crate) key: Option<Key>,
	pub(crate) r#ref: Option<Ref<D::Node>>,
	pub(crate) children: Vec<VNode<D>>,
	pub(crate) dom: Option<D::Node>,
	pub(crate) last_dom_child: Option<D::Node>,
}

impl<D: Document> VNode<D> {
	fn new(kind: VNodeType) -> Self {
		Self {
			kind,
			text: Cow::Borrowed(""),
			props: Props::new(),
			key: None,
			r#ref: None,
			children: Vec::new(),
			dom: None,
			last_dom_child: None,
		}
	}

	#[must_use]
	pub fn text(text: impl Into<Cow<'static, str>>) -> Self {
		Self {
			text: text.into(),
			..Self::new(VNodeType::Text)
		}
	}

	#[must_use]
	pub fn element(tag: impl Into<Cow<'static, str>>) -> Self {
		Self::new(VNodeType::Element(tag.into()))
	}

	#[must_use]
	pub fn fragment(children: impl IntoIterator<Item = Self>) -> Self {
		Self::new(VNodeType::Fragment).with_children(children)
	}

	#[must_use]
	pub fn with_key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	#[must_use]
	pub fn with_ref(mut self, r#ref: Ref<D::Node>) -> Self {
		self.r#ref = Some(r#ref);
		self
	}

	#[must_use]
	pub fn with_prop(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<PropValue<D::Event>>) -> Self {
		self.props.insert(name, value);
		self
	}

	#[must_use]
	pub fn with_style(self, style: impl Into<Style>) -> Self {
		self.with_prop("style", PropValue::Style(style.into()))
	}

	#[must_use]
	pub fn with_raw_html(self, html: impl Into<String>) -> Self {
		self.with_prop("dangerouslySetInnerHTML", PropValue::RawHtml(html.into()))
	}

	/// Binds `handler` under an event prop name like `onClick` or `onClickCapture`.
	#[must_use]
	pub fn on(self, name: impl Into<Cow<'static, str>>, handler: impl Fn(&D::Event) + 'static) -> Self {
		self.with_prop(name, PropValue::Handler(Handler::new(handler)))
	}

	#[must_use]
	pub fn with_child(mut self, child: Self) -> Self {
		self.children.push(child);
		self
	}

	#[must_use]
	pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
		self.children.extend(children);
		self
	}

	pub fn node_type(&self) -> &VNodeType {
		&self.kind
	}

	pub fn text_content(&self) -> &str {
		&self.text
	}

	pub fn props(&self) -> &Props<D::Event> {
		&self.props
	}

	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	pub fn get_ref(&self) -> Option<&Ref<D::Node>> {
		self.r#ref.as_ref()
	}

	pub fn children(&self) -> &[Self] {
		&self.children
	}

	/// For [`ChildReconciler`](`crate::ChildReconciler`)s, which must leave the children in final document order.
	pub fn children_mut(&mut self) -> &mut Vec<Self> {
		&mut self.children
	}

	/// The claimed live node, or for fragments the first live node among their flattened children.
	///
	/// `None` before mounting and after unmounting.
	pub fn dom(&self) -> Option<&D::Node> {
		self.dom.as_ref()
	}

	/// Fragments only: the last live node among their flattened children.
	pub fn last_dom_child(&self) -> Option<&D::Node> {
		self.last_dom_child.as_ref()
	}

	#[must_use]
	pub fn is_fragment(&self) -> bool {
		self.kind == VNodeType::Fragment
	}

	/// Fragments always count as mounted. Other vnodes iff they hold a live node.
	pub(crate) fn is_mounted(&self) -> bool {
		self.is_fragment() || self.dom.is_some()
	}

	pub(crate) fn is_tag(&self, tag: &str) -> bool {
		matches!(&self.kind, VNodeType::Element(name) if name == tag)
	}

	/// Live nodes in document order, looking through fragments.
	#[must_use]
	pub fn live_nodes(&self) -> Vec<D::Node> {
		let mut nodes = Vec::new();
		self.collect_live_nodes(&mut nodes);
		nodes
	}

	fn collect_live_nodes(&self, nodes: &mut Vec<D::Node>) {
		if self.is_fragment() {
			for child in &self.children {
				child.collect_live_nodes(nodes);
			}
		} else if let Some(dom) = &self.dom {
			nodes.push(dom.clone());
		}
	}

	pub(crate) fn first_live_node(&self) -> Option<D::Node> {
		if self.is_fragment() {
			self.children.iter().find_map(Self::first_live_node)
		} else {
			self.dom.clone()
		}
	}

	pub(crate) fn last_live_node(&self) -> Option<D::Node> {
		if self.is_fragment() {
			self.children.iter().rev().find_map(Self::last_live_node)
		} else {
			self.dom.clone()
		}
	}

	/// Like `<div key="a">`, `#text` or `#fragment`.
	#[must_use]
	pub fn describe(&self) -> String {
		match (&self.kind, &self.key) {
			(VNodeType::Element(tag), Some(key)) => format!("<{} key={:?}>", tag, key),
			(VNodeType::Element(tag), None) => format!("<{}>", tag),
			(VNodeType::Text, Some(key)) => format!("#text[key={:?}]", key),
			(VNodeType::Text, None) => "#text".to_owned(),
			(VNodeType::Fragment, Some(key)) => format!("#fragment[key={:?}]", key),
			(VNodeType::Fragment, None) => "#fragment".to_owned(),
		}
	}
}

impl<D: Document> Debug for VNode<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("VNode")
			.field("kind", &self.kind)
			.field("key", &self.key)
			.field("props", &self.props)
			.field("children", &self.children)
			.field("dom", &self.dom)
			.finish_non_exhaustive()
	}
}

/// An event handler prop. Compares by identity.
pub struct Handler<E>(Rc<dyn Fn(&E)>);

impl<E> Handler<E> {
	pub fn new(handler: impl Fn(&E) + 'static) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &E) {
		(self.0)(event);
	}
}

impl<E> Clone for Handler<E> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<E> PartialEq for Handler<E> {
	fn eq(&self, other: &Self) -> bool {
		Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
	}
}

impl<E> Debug for Handler<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Handler({:p})", Rc::as_ptr(&self.0).cast::<()>())
	}
}

pub enum PropValue<E> {
	Null,
	Str(Cow<'static, str>),
	Number(f64),
	Bool(bool),
	Handler(Handler<E>),
	Style(Style),
	/// The `{ __html }` payload of `dangerouslySetInnerHTML`.
	RawHtml(String),
}

impl<E> PropValue<E> {
	/// JavaScript-like truthiness.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Str(s) => !s.is_empty(),
			Self::Number(n) => *n != 0.0 && !n.is_nan(),
			Self::Bool(b) => *b,
			Self::Handler(_) | Self::Style(_) | Self::RawHtml(_) => true,
		}
	}
}

impl<E> Clone for PropValue<E> {
	fn clone(&self) -> Self {
		match self {
			Self::Null => Self::Null,
			Self::Str(s) => Self::Str(s.clone()),
			Self::Number(n) => Self::Number(*n),
			Self::Bool(b) => Self::Bool(*b),
			Self::Handler(h) => Self::Handler(h.clone()),
			Self::Style(s) => Self::Style(s.clone()),
			Self::RawHtml(html) => Self::RawHtml(html.clone()),
		}
	}
}

impl<E> PartialEq for PropValue<E> {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::Number(a), Self::Number(b)) => a == b,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Handler(a), Self::Handler(b)) => a == b,
			(Self::Style(a), Self::Style(b)) => a == b,
			(Self::RawHtml(a), Self::RawHtml(b)) => a == b,
			_ => false,
		}
	}
}

impl<E> Debug for PropValue<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("Null"),
			Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
			Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
			Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
			Self::Handler(h) => h.fmt(f),
			Self::Style(s) => f.debug_tuple("Style").field(s).finish(),
			Self::RawHtml(html) => f.debug_tuple("RawHtml").field(html).finish(),
		}
	}
}

impl<E> From<&'static str> for PropValue<E> {
	fn from(value: &'static str) -> Self {
		Self::Str(Cow::Borrowed(value))
	}
}

impl<E> From<String> for PropValue<E> {
	fn from(value: String) -> Self {
		Self::Str(Cow::Owned(value))
	}
}

impl<E> From<f64> for PropValue<E> {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl<E> From<i32> for PropValue<E> {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}

impl<E> From<bool> for PropValue<E> {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl<E> From<Style> for PropValue<E> {
	fn from(value: Style) -> Self {
		Self::Style(value)
	}
}

impl<E> From<Handler<E>> for PropValue<E> {
	fn from(value: Handler<E>) -> Self {
		Self::Handler(value)
	}
}

impl<E, T: Into<PropValue<E>>> From<Option<T>> for PropValue<E> {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

/// Ordered prop map. Iteration order is by name.
pub struct Props<E>(BTreeMap<Cow<'static, str>, PropValue<E>>);

impl<E> Props<E> {
	#[must_use]
	pub fn new() -> Self {
		Self(BTreeMap::new())
	}

	pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<PropValue<E>>) -> Option<PropValue<E>> {
		self.0.insert(name.into(), value.into())
	}

	pub fn get(&self, name: &str) -> Option<&PropValue<E>> {
		self.0.get(name)
	}

	pub fn contains_key(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn iter(&self) -> btree_map::Iter<'_, Cow<'static, str>, PropValue<E>> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The `dangerouslySetInnerHTML` payload, if any.
	pub fn raw_html(&self) -> Option<&str> {
		match self.get("dangerouslySetInnerHTML") {
			Some(PropValue::RawHtml(html)) => Some(html),
			_ => None,
		}
	}
}

impl<E> Default for Props<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> Debug for Props<E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.0.iter()).finish()
	}
}

impl<'a, E> IntoIterator for &'a Props<E> {
	type Item = (&'a Cow<'static, str>, &'a PropValue<E>);
	type IntoIter = btree_map::Iter<'a, Cow<'static, str>, PropValue<E>>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// The `style` prop: either style text replacing the whole inline style, or a mapping from camel-cased names.
#[derive(Debug, Clone, PartialEq)]
pub enum Style {
	Text(String),
	Map(BTreeMap<String, StyleValue>),
}

impl Style {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for Style {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

impl<K: Into<String>, V: Into<StyleValue>, const N: usize> From<[(K, V); N]> for Style {
	fn from(entries: [(K, V); N]) -> Self {
		entries.into_iter().collect()
	}
}

impl From<&str> for Style {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
	Null,
	Str(String),
	Number(f64),
}

impl StyleValue {
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}

impl From<&str> for StyleValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

impl From<String> for StyleValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<f64> for StyleValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<i32> for StyleValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}
