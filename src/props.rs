//! Property Patcher: diffs and applies props on one live node.

use crate::{
	document::{Listener, Scalar},
	error::panic_message,
	options::EventHook,
	vnode::{Handler, PropValue, Props, Style, StyleValue},
	Document, Error,
};
use hashbrown::{hash_map::Entry, HashMap};
use std::{
	borrow::Cow,
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	panic::{self, AssertUnwindSafe},
	rc::Rc,
};
use tracing::{error, trace, trace_span, warn};

/// Never diffed as props.
const RESERVED: [&str; 2] = ["children", "key"];

/// Never assigned as live properties.
const EXCLUDED_PROPERTIES: [&str; 2] = ["list", "tagName"];

/// Style properties whose bare numbers are not lengths. Sorted.
const NON_DIMENSIONAL: [&str; 38] = [
	"animationIterationCount",
	"aspectRatio",
	"boxFlex",
	"boxFlexGroup",
	"boxOrdinalGroup",
	"columnCount",
	"columns",
	"fillOpacity",
	"flex",
	"flexGrow",
	"flexNegative",
	"flexOrder",
	"flexPositive",
	"flexShrink",
	"floodOpacity",
	"fontWeight",
	"gridArea",
	"gridColumn",
	"gridColumnEnd",
	"gridColumnStart",
	"gridRow",
	"gridRowEnd",
	"gridRowStart",
	"lineClamp",
	"lineHeight",
	"opacity",
	"order",
	"orphans",
	"stopOpacity",
	"strokeDasharray",
	"strokeDashoffset",
	"strokeMiterlimit",
	"strokeOpacity",
	"strokeWidth",
	"tabSize",
	"widows",
	"zIndex",
	"zoom",
];

/// How a prop is applied, decided once per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind<'a> {
	ClassName,
	Style,
	/// Handled by the element reconciler, never as a property.
	RawHtml,
	/// `name` still carries the `on` prefix but not the `Capture` suffix.
	EventHandler { name: &'a str, capture: bool },
	DirectProperty(&'a str),
}

impl<'a> PropKind<'a> {
	#[must_use]
	pub fn classify(name: &'a str) -> Self {
		match name {
			"class" | "className" => Self::ClassName,
			"style" => Self::Style,
			"dangerouslySetInnerHTML" => Self::RawHtml,
			_ if name.starts_with("on") => match name.strip_suffix("Capture") {
				Some(name) => Self::EventHandler { name, capture: true },
				None => Self::EventHandler { name, capture: false },
			},
			_ => Self::DirectProperty(name),
		}
	}
}

type HandlerSlot<E> = Rc<RefCell<Option<Handler<E>>>>;

/// Applies props to live nodes and owns the side-table of event handlers bound to them.
///
/// Each (node, event, phase) gets exactly one native proxy listener for as long as a handler is bound.
/// Swapping the handler only swaps the slot the proxy reads at dispatch time.
pub struct PropertyPatcher<D: Document> {
	listeners: HashMap<D::Node, HashMap<(String, bool), HandlerSlot<D::Event>>>,
	event_hook: Option<EventHook<D::Event>>,
}

impl<D: Document> PropertyPatcher<D> {
	#[must_use]
	pub fn new(event_hook: Option<EventHook<D::Event>>) -> Self {
		Self {
			listeners: HashMap::new(),
			event_hook,
		}
	}

	/// Number of (node, event, phase) proxies currently registered.
	pub fn listener_count(&self) -> usize {
		self.listeners.values().map(HashMap::len).sum()
	}

	/// Applies every changed prop, then clears every removed one.
	pub fn diff_props(&mut self, document: &mut D, node: &D::Node, new: &Props<D::Event>, old: &Props<D::Event>, is_svg: bool) -> Result<(), Error> {
		for (name, value) in new {
			if RESERVED.contains(&&**name) {
				continue;
			}
			let previous = old.get(name);
			if previous != Some(value) {
				self.set_property(document, node, name, Some(value), previous, is_svg)?;
			}
		}
		for (name, previous) in old {
			if !RESERVED.contains(&&**name) && !new.contains_key(name) {
				self.set_property(document, node, name, None, Some(previous), is_svg)?;
			}
		}
		Ok(())
	}

	pub fn set_property(
		&mut self,
		document: &mut D,
		node: &D::Node,
		name: &str,
		value: Option<&PropValue<D::Event>>,
		old: Option<&PropValue<D::Event>>,
		is_svg: bool,
	) -> Result<(), Error> {
		let span = trace_span!("Setting property", name, removed = value.is_none());
		let _enter = span.enter();
		match PropKind::classify(name) {
			PropKind::ClassName => Self::assign(document, node, if is_svg { "class" } else { "className" }, value, is_svg),
			PropKind::Style => Self::set_style(document, node, value, old),
			PropKind::RawHtml => Ok(()),
			PropKind::EventHandler { name, capture } => self.set_handler(document, node, name, capture, value),
			PropKind::DirectProperty(name) => Self::assign(document, node, name, value, is_svg),
		}
	}

	/// Unregisters every proxy on `node`, which is being discarded.
	pub fn release(&mut self, document: &mut D, node: &D::Node) -> Result<(), Error> {
		let mut result = Ok(());
		if let Some(slots) = self.listeners.remove(node) {
			trace!(count = slots.len(), "Releasing event listeners.");
			for (event, capture) in slots.keys() {
				result = result.and(document.remove_event_listener(node, event, *capture));
			}
		}
		result
	}

	fn assign(document: &mut D, node: &D::Node, name: &str, value: Option<&PropValue<D::Event>>, is_svg: bool) -> Result<(), Error> {
		if is_svg || EXCLUDED_PROPERTIES.contains(&name) {
			trace!("Left to attribute-level handling.");
			return Ok(());
		}
		let scalar = match value {
			None | Some(PropValue::Null) => Scalar::empty(),
			Some(PropValue::Str(value)) => Scalar::Str(value.to_string()),
			Some(&PropValue::Number(value)) => Scalar::Number(value),
			Some(&PropValue::Bool(value)) => Scalar::Bool(value),
			Some(PropValue::Handler(_) | PropValue::Style(_) | PropValue::RawHtml(_)) => {
				warn!(name, "Can't assign a non-scalar value as live property. Skipping.");
				return Ok(());
			}
		};
		document.set_property(node, name, scalar)
	}

	fn set_style(document: &mut D, node: &D::Node, value: Option<&PropValue<D::Event>>, old: Option<&PropValue<D::Event>>) -> Result<(), Error> {
		let new_map = match value {
			Some(PropValue::Style(Style::Text(text))) => return document.set_style_text(node, text),
			Some(PropValue::Str(text)) => return document.set_style_text(node, text),
			Some(PropValue::Style(Style::Map(map))) => Some(map),
			None | Some(PropValue::Null) => None,
			Some(_) => {
				warn!("Unexpected `style` value. Clearing the inline style instead.");
				None
			}
		};

		let old_map = match old {
			Some(PropValue::Style(Style::Text(_)) | PropValue::Str(_)) => {
				document.set_style_text(node, "")?;
				None
			}
			Some(PropValue::Style(Style::Map(old_map))) => {
				for (name, old_value) in old_map {
					let kept = new_map.and_then(|new_map| new_map.get(name)).map_or(false, |value| !value.is_null());
					if !kept && !old_value.is_null() {
						document.set_style_property(node, &hyphenate(name), "")?;
					}
				}
				Some(old_map)
			}
			_ => None,
		};

		if let Some(new_map) = new_map {
			for (name, value) in new_map {
				if !value.is_null() && old_map.and_then(|old_map| old_map.get(name)) != Some(value) {
					document.set_style_property(node, &hyphenate(name), &css_value(name, value))?;
				}
			}
		}
		Ok(())
	}

	fn set_handler(&mut self, document: &mut D, node: &D::Node, name: &str, capture: bool, value: Option<&PropValue<D::Event>>) -> Result<(), Error> {
		let lower = name.to_ascii_lowercase();
		let event = if document.has_property(node, &lower) { &lower[2..] } else { &name[2..] };
		if event.is_empty() {
			warn!(name, "Event prop without event name. Skipping.");
			return Ok(());
		}

		let handler = match value {
			Some(PropValue::Handler(handler)) => Some(handler.clone()),
			None | Some(PropValue::Null) => None,
			Some(_) => {
				warn!(name, "Event prop without handler value. Treating it as unbound.");
				None
			}
		};

		match handler {
			Some(handler) => match self.listeners.entry(node.clone()).or_default().entry((event.to_owned(), capture)) {
				Entry::Occupied(occupied) => {
					trace!(event, capture, "Swapping handler behind existing proxy.");
					*occupied.get().borrow_mut() = Some(handler);
				}
				Entry::Vacant(vacant) => {
					let slot = Rc::new(RefCell::new(Some(handler)));
					document.add_event_listener(node, event, capture, proxy(event, Rc::clone(&slot), self.event_hook.clone()))?;
					vacant.insert(slot);
				}
			},
			None => {
				if let Some(slots) = self.listeners.get_mut(node) {
					if slots.remove(&(event.to_owned(), capture)).is_some() {
						document.remove_event_listener(node, event, capture)?;
					}
					if slots.is_empty() {
						self.listeners.remove(node);
					}
				}
			}
		}
		Ok(())
	}
}

impl<D: Document> Debug for PropertyPatcher<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("PropertyPatcher")
			.field("listener_count", &self.listener_count())
			.field("event_hook", &self.event_hook.is_some())
			.finish()
	}
}

fn proxy<E: 'static>(event: &str, slot: HandlerSlot<E>, normalize: Option<EventHook<E>>) -> Listener<E> {
	let event_name = event.to_owned();
	Rc::new(move |event: E| {
		let handler = slot.borrow().clone();
		let handler = match handler {
			Some(handler) => handler,
			None => return trace!(event = %event_name, "No handler bound. Ignoring event."),
		};

		let span = trace_span!("Dispatching", event = %event_name);
		let _enter = span.enter();
		let dispatched = panic::catch_unwind(AssertUnwindSafe(|| {
			let event = match &normalize {
				Some(normalize) => normalize(event),
				None => event,
			};
			handler.call(&event);
		}));
		if let Err(payload) = dispatched {
			error!(event = %event_name, "Event handler panicked: {}", panic_message(&*payload));
		}
	})
}

/// `fontSize` -> `font-size`. Custom properties are kept as-is.
fn hyphenate(name: &str) -> Cow<'_, str> {
	if name.starts_with("--") || !name.bytes().any(|b| b.is_ascii_uppercase()) {
		return Cow::Borrowed(name);
	}
	let mut hyphenated = String::with_capacity(name.len() + 4);
	for c in name.chars() {
		if c.is_ascii_uppercase() {
			if !hyphenated.ends_with('-') {
				hyphenated.push('-');
			}
			hyphenated.push(c.to_ascii_lowercase());
		} else {
			hyphenated.push(c);
		}
	}
	Cow::Owned(hyphenated)
}

fn css_value(name: &str, value: &StyleValue) -> String {
	match value {
		StyleValue::Null => String::new(),
		StyleValue::Str(value) => value.clone(),
		StyleValue::Number(value) if name.starts_with("--") || NON_DIMENSIONAL.binary_search(&name).is_ok() => value.to_string(),
		StyleValue::Number(value) => format!("{}px", value),
	}
}
