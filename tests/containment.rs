use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};
use vtree_dom::{
	memory::{MemoryDocument, NodeId},
	DomDiffer, Error, Options, Scalar, VNode,
};

type V = VNode<MemoryDocument>;

fn setup_with(options: Options<MemoryDocument>) -> (DomDiffer<MemoryDocument>, NodeId) {
	let mut document = MemoryDocument::new();
	let body = document.build_element("body");
	(DomDiffer::with_options(document, options), body)
}

#[test]
fn invalid_tag_does_not_stop_siblings() {
	let (mut differ, body) = setup_with(Options::new());
	let report = differ.render(
		V::fragment([V::element("div"), V::element("not a tag").with_child(V::text("lost")), V::element("span")]),
		&body,
	);

	assert!(!report.is_clean());
	let failures = report.failures();
	assert_eq!(failures.len(), 1);
	assert!(failures[0].vnode.ends_with("<not a tag>"));
	assert!(matches!(failures[0].error, Error::Dom { operation: "createElement", .. }));
	assert_eq!(differ.document().inner_html(&body), "<div></div><span></span>");

	// The next pass starts from a clean slate.
	let report = differ.render(V::fragment([V::element("div"), V::element("p"), V::element("span")]), &body);
	assert!(report.is_clean());
	assert_eq!(differ.document().inner_html(&body), "<div></div><p></p><span></span>");
}

#[test]
fn diff_hook_panic_is_contained_at_its_vnode() {
	let (mut differ, body) = setup_with(Options::new().on_diff(|vnode| {
		if vnode.key().map_or(false, |key| key == "boom") {
			panic!("diff hook failure");
		}
	}));

	let report = differ.render(
		V::element("ul").with_children([
			V::element("li").with_key("a"),
			V::element("li").with_key("boom"),
			V::element("li").with_key("c"),
		]),
		&body,
	);

	let failures = report.into_failures();
	assert_eq!(failures.len(), 1);
	assert!(failures[0].vnode.ends_with("<li key=\"boom\">"));
	assert!(matches!(&failures[0].error, Error::Hook { hook: "diff", message } if message == "diff hook failure"));
	assert_eq!(differ.document().inner_html(&body), "<ul><li></li><li></li></ul>");
}

#[test]
fn unmount_hook_panic_still_removes() {
	let (mut differ, body) = setup_with(Options::new().on_unmount(|_| panic!("unmount hook failure")));

	assert!(differ.render(V::element("p").with_child(V::text("x")), &body).is_clean());
	let report = differ.clear(&body);

	assert_eq!(report.failures().len(), 2);
	assert!(report
		.failures()
		.iter()
		.all(|failure| matches!(&failure.error, Error::Hook { hook: "unmount", .. })));
	assert_eq!(differ.document().inner_html(&body), "");
}

#[test]
fn diffed_hook_sees_failures_of_others_only_through_the_report() {
	let diffed = Rc::new(RefCell::new(Vec::new()));
	let (mut differ, body) = setup_with(Options::new().on_diffed({
		let diffed = Rc::clone(&diffed);
		move |vnode| diffed.borrow_mut().push(vnode.describe())
	}));

	let report = differ.render(V::fragment([V::element("a b"), V::element("b")]), &body);
	assert_eq!(report.failures().len(), 1);
	assert_eq!(*diffed.borrow(), ["<b>", "#fragment"]);
}

#[test]
fn failure_display() {
	let (mut differ, body) = setup_with(Options::new());
	let report = differ.render(V::element("<script>"), &body);
	let failure = &report.failures()[0];
	assert_eq!(
		failure.error.to_string(),
		"live-tree operation `createElement` failed: invalid tag name \"<script>\""
	);
}

#[test]
fn failed_vnode_is_mounted_fully_by_the_next_pass() {
	let failing = Rc::new(Cell::new(true));
	let (mut differ, body) = setup_with(Options::new().on_diff({
		let failing = Rc::clone(&failing);
		move |vnode| {
			if failing.get() && vnode.key().map_or(false, |key| key == "x") {
				panic!("diff hook failure");
			}
		}
	}));
	let tree = || V::fragment([V::element("p").with_key("x").with_prop("title", "t"), V::element("span")]);

	assert_eq!(differ.render(tree(), &body).failures().len(), 1);
	assert_eq!(differ.document().inner_html(&body), "<span></span>");

	failing.set(false);
	assert!(differ.render(tree(), &body).is_clean());
	assert_eq!(differ.document().inner_html(&body), "<p></p><span></span>");
	let p = differ.document().children(&body)[0];
	assert_eq!(differ.document().property(&p, "title"), Some(&Scalar::Str("t".to_owned())));
}
