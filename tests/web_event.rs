#![cfg(target_arch = "wasm32")]

use std::{cell::RefCell, rc::Rc, sync::Once};
use vtree_dom::{
	web::{WebDocument, WebNode},
	DomDiffer, Options, VNode,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

type V = VNode<WebDocument>;

static LOG_INIT: Once = Once::new();

fn init_log() {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);
}

fn container(document: &WebDocument) -> WebNode {
	let body = document.document().body().unwrap();
	let div = document.document().create_element("div").unwrap();
	body.append_child(&div).unwrap();
	document.wrap(div)
}

fn button(id: &str) -> HtmlElement {
	window().unwrap().document().unwrap().get_element_by_id(id).unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn click() {
	init_log();

	let document = WebDocument::from_window().unwrap();
	let root = container(&document);
	let mut differ = DomDiffer::new(document);

	let click_count = Rc::new(RefCell::new(0));
	let vdom = || {
		let click_count = Rc::clone(&click_count);
		V::element("button")
			.with_key("button")
			.with_prop("id", "test-button")
			.on("onClick", move |event: &web_sys::Event| {
				assert_eq!(event.type_(), "click");
				*click_count.borrow_mut() += 1;
			})
	};

	assert!(differ.render(vdom(), &root).is_clean());
	assert_eq!(*click_count.borrow(), 0);

	button("test-button").click();
	assert_eq!(*click_count.borrow(), 1);

	// Swapping the handler must not double-register.
	assert!(differ.render(vdom(), &root).is_clean());
	button("test-button").click();
	assert_eq!(*click_count.borrow(), 2);

	assert!(differ.clear(&root).is_clean());
	assert!(window().unwrap().document().unwrap().get_element_by_id("test-button").is_none());
}

#[wasm_bindgen_test]
fn event_hook() {
	init_log();

	let seen = Rc::new(RefCell::new(Vec::new()));
	let document = WebDocument::from_window().unwrap();
	let root = container(&document);
	let mut differ = DomDiffer::with_options(
		document,
		Options::new().on_event({
			let seen = Rc::clone(&seen);
			move |event: web_sys::Event| {
				seen.borrow_mut().push(event.type_());
				event
			}
		}),
	);

	let report = differ.render(V::element("button").with_prop("id", "hooked-button").on("onClick", |_: &web_sys::Event| ()), &root);
	assert!(report.is_clean());
	button("hooked-button").click();
	assert_eq!(*seen.borrow(), ["click"]);

	assert!(differ.clear(&root).is_clean());
}
