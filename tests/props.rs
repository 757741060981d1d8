use vtree_dom::{
	document::SVG_NAMESPACE,
	memory::{MemoryDocument, Mutation, NodeId},
	Document, DomDiffer, Scalar, Style, StyleValue, VNode,
};

type V = VNode<MemoryDocument>;

fn setup() -> (DomDiffer<MemoryDocument>, NodeId) {
	let mut document = MemoryDocument::new();
	let body = document.build_element("body");
	(DomDiffer::new(document), body)
}

fn first_child(differ: &DomDiffer<MemoryDocument>, node: &NodeId) -> NodeId {
	differ.document().children(node)[0]
}

#[test]
fn style_map_changes_are_minimal() {
	let (mut differ, body) = setup();
	let style: Style = [("color", StyleValue::from("red")), ("fontSize", StyleValue::from(10))].into();
	assert!(differ.render(V::element("div").with_style(style), &body).is_clean());
	let div = first_child(&differ, &body);
	assert_eq!(differ.document().style_property(&div, "color"), Some("red"));
	assert_eq!(differ.document().style_property(&div, "font-size"), Some("10px"));

	differ.document_mut().clear_mutations();
	assert!(differ.render(V::element("div").with_style([("color", "blue")]), &body).is_clean());
	assert_eq!(
		differ.document().mutations(),
		[
			Mutation::SetStyleProperty {
				node: div,
				name: "font-size".to_owned(),
				value: String::new()
			},
			Mutation::SetStyleProperty {
				node: div,
				name: "color".to_owned(),
				value: "blue".to_owned()
			},
		]
	);
	assert_eq!(differ.document().style_text(&div), "color: blue");
}

#[test]
fn unitless_and_custom_style_properties() {
	let (mut differ, body) = setup();
	let style: Style = [
		("opacity", StyleValue::from(0.5)),
		("zIndex", StyleValue::from(2)),
		("--gap", StyleValue::from(4)),
		("marginTop", StyleValue::from(0)),
		("display", StyleValue::Null),
	]
	.into();
	assert!(differ.render(V::element("div").with_style(style), &body).is_clean());
	let div = first_child(&differ, &body);

	assert_eq!(differ.document().style_property(&div, "opacity"), Some("0.5"));
	assert_eq!(differ.document().style_property(&div, "z-index"), Some("2"));
	assert_eq!(differ.document().style_property(&div, "--gap"), Some("4"));
	assert_eq!(differ.document().style_property(&div, "margin-top"), Some("0px"));
	assert_eq!(differ.document().style_property(&div, "display"), None);
}

#[test]
fn style_text_and_map_transitions() {
	let (mut differ, body) = setup();
	assert!(differ.render(V::element("div").with_style("color: red; width: 1px"), &body).is_clean());
	let div = first_child(&differ, &body);
	assert_eq!(differ.document().style_text(&div), "color: red; width: 1px");

	assert!(differ.render(V::element("div").with_style([("height", "2px")]), &body).is_clean());
	assert_eq!(differ.document().style_text(&div), "height: 2px");

	assert!(differ.render(V::element("div").with_style("top: 0"), &body).is_clean());
	assert_eq!(differ.document().style_text(&div), "top: 0");

	differ.document_mut().clear_mutations();
	assert!(differ.render(V::element("div"), &body).is_clean());
	assert_eq!(
		differ.document().mutations(),
		[Mutation::SetStyleText {
			node: div,
			css_text: String::new()
		}]
	);
}

#[test]
fn class_and_removed_props() {
	let (mut differ, body) = setup();
	let report = differ.render(V::element("input").with_prop("class", "wide").with_prop("checked", true).with_prop("value", 3), &body);
	assert!(report.is_clean());
	let input = first_child(&differ, &body);
	assert_eq!(differ.document().property(&input, "className"), Some(&Scalar::Str("wide".to_owned())));
	assert_eq!(differ.document().property(&input, "checked"), Some(&Scalar::Bool(true)));
	assert_eq!(differ.document().property(&input, "value"), Some(&Scalar::Number(3.0)));

	differ.document_mut().clear_mutations();
	assert!(differ.render(V::element("input").with_prop("checked", true), &body).is_clean());
	assert_eq!(differ.document().property(&input, "className"), Some(&Scalar::empty()));
	assert_eq!(differ.document().property(&input, "value"), Some(&Scalar::empty()));
	assert_eq!(differ.document().mutations().len(), 2);
}

#[test]
fn excluded_and_reserved_props_are_skipped() {
	let (mut differ, body) = setup();
	let report = differ.render(
		V::element("input")
			.with_prop("list", "options")
			.with_prop("tagName", "nope")
			.with_prop("children", "ignored"),
		&body,
	);
	assert!(report.is_clean());
	assert!(!differ.document().mutations().iter().any(|mutation| matches!(mutation, Mutation::SetProperty { .. })));
}

#[test]
fn multiple_precedes_children() {
	let (mut differ, body) = setup();
	let report = differ.render(
		V::element("select")
			.with_prop("multiple", true)
			.with_child(V::element("option").with_prop("selected", true)),
		&body,
	);
	assert!(report.is_clean());

	let mutations = differ.document().mutations();
	let multiple = mutations
		.iter()
		.position(|mutation| matches!(mutation, Mutation::SetProperty { name, .. } if name == "multiple"))
		.unwrap();
	let selected = mutations
		.iter()
		.position(|mutation| matches!(mutation, Mutation::SetProperty { name, .. } if name == "selected"))
		.unwrap();
	assert!(multiple < selected);
}

#[test]
fn raw_html_is_only_written_on_change() {
	let (mut differ, body) = setup();
	assert!(differ.render(V::element("div").with_raw_html("<b>x</b>"), &body).is_clean());
	let div = first_child(&differ, &body);
	assert_eq!(differ.document().inner_html(&body), "<div><b>x</b></div>");

	differ.document_mut().clear_mutations();
	assert!(differ.render(V::element("div").with_raw_html("<b>x</b>"), &body).is_clean());
	assert!(differ.document().mutations().is_empty());

	assert!(differ.render(V::element("div").with_raw_html("<i>y</i>"), &body).is_clean());
	assert_eq!(
		differ.document().mutations(),
		[Mutation::SetInnerHtml {
			node: div,
			html: "<i>y</i>".to_owned()
		}]
	);

	assert!(differ.render(V::element("div").with_child(V::text("plain")), &body).is_clean());
	assert_eq!(differ.document().inner_html(&body), "<div>plain</div>");
}

#[test]
fn raw_html_replaces_children() {
	let (mut differ, body) = setup();
	assert!(differ.render(V::element("div").with_child(V::element("p")), &body).is_clean());
	let div = first_child(&differ, &body);
	let p = first_child(&differ, &div);

	assert!(differ.render(V::element("div").with_raw_html("raw"), &body).is_clean());
	assert_eq!(differ.document().inner_html(&body), "<div>raw</div>");
	assert!(differ.document().parent(&p).is_none());
	assert!(!differ.document().mutations().contains(&Mutation::Remove(p)));
}

#[test]
fn svg_namespace_and_foreign_object() {
	let (mut differ, body) = setup();
	let report = differ.render(
		V::element("svg").with_children([
			V::element("circle").with_prop("className", "dot"),
			V::element("foreignObject").with_child(V::element("div")),
		]),
		&body,
	);
	assert!(report.is_clean());

	let document = differ.document();
	let svg = document.children(&body)[0];
	let circle = document.children(&svg)[0];
	let foreign_object = document.children(&svg)[1];
	let div = document.children(&foreign_object)[0];
	assert_eq!(document.namespace(&svg), Some(SVG_NAMESPACE));
	assert_eq!(document.namespace(&circle), Some(SVG_NAMESPACE));
	assert_eq!(document.namespace(&foreign_object), Some(SVG_NAMESPACE));
	assert_eq!(document.namespace(&div), None);
	assert_eq!(document.property(&circle, "className"), None);
}

#[test]
fn rendering_into_svg_container() {
	let mut document = MemoryDocument::new();
	let svg = document.create_element_ns(SVG_NAMESPACE, "svg").unwrap();
	let mut differ = DomDiffer::new(document);

	assert!(differ.render(V::element("g"), &svg).is_clean());
	let g = first_child(&differ, &svg);
	assert_eq!(differ.document().namespace(&g), Some(SVG_NAMESPACE));
}

#[test]
fn children_declared_beside_raw_html_mount_once_it_is_gone() {
	let (mut differ, body) = setup();
	let report = differ.render(
		V::element("div").with_raw_html("<b>x</b>").with_child(V::element("p").with_prop("id", "a")),
		&body,
	);
	assert!(report.is_clean());
	assert_eq!(differ.document().inner_html(&body), "<div><b>x</b></div>");
	assert!(differ.root(&body).unwrap().children()[0].children().is_empty());
	let div = first_child(&differ, &body);

	assert!(differ.render(V::element("div").with_child(V::element("p").with_prop("id", "a")), &body).is_clean());
	assert_eq!(differ.document().inner_html(&body), "<div><p></p></div>");
	let p = first_child(&differ, &div);
	assert_eq!(differ.document().property(&p, "id"), Some(&Scalar::Str("a".to_owned())));
}
