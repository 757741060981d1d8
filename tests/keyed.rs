use vtree_dom::{
	memory::{MemoryDocument, Mutation, NodeId},
	DomDiffer, Error, VNode,
};

type V = VNode<MemoryDocument>;

fn setup() -> (DomDiffer<MemoryDocument>, NodeId) {
	let mut document = MemoryDocument::new();
	let body = document.build_element("body");
	(DomDiffer::new(document), body)
}

fn list(keys: &[&'static str]) -> V {
	V::element("ul").with_children(keys.iter().map(|&key| V::element("li").with_key(key).with_child(V::text(key))))
}

fn items(differ: &DomDiffer<MemoryDocument>, body: &NodeId) -> Vec<NodeId> {
	let ul = differ.document().children(body)[0];
	differ.document().children(&ul)
}

#[test]
fn reorder_keeps_nodes() {
	let (mut differ, body) = setup();
	assert!(differ.render(list(&["a", "b", "c"]), &body).is_clean());
	let before = items(&differ, &body);

	differ.document_mut().clear_mutations();
	assert!(differ.render(list(&["c", "a", "b"]), &body).is_clean());
	assert_eq!(differ.document().inner_html(&body), "<ul><li>c</li><li>a</li><li>b</li></ul>");
	assert_eq!(items(&differ, &body), [before[2], before[0], before[1]]);
	assert!(differ
		.document()
		.mutations()
		.iter()
		.all(|mutation| matches!(mutation, Mutation::Insert { .. })));
}

#[test]
fn insert_in_the_middle() {
	let (mut differ, body) = setup();
	assert!(differ.render(list(&["a", "c"]), &body).is_clean());
	let before = items(&differ, &body);

	differ.document_mut().clear_mutations();
	assert!(differ.render(list(&["a", "b", "c"]), &body).is_clean());
	assert_eq!(differ.document().inner_html(&body), "<ul><li>a</li><li>b</li><li>c</li></ul>");

	let after = items(&differ, &body);
	assert_eq!((after[0], after[2]), (before[0], before[1]));
	assert_eq!(differ.document().mutations().iter().filter(|mutation| mutation.is_creation()).count(), 2);
	assert!(!differ.document().mutations().iter().any(|mutation| matches!(mutation, Mutation::Remove(_))));
}

#[test]
fn remove_from_the_middle() {
	let (mut differ, body) = setup();
	assert!(differ.render(list(&["a", "b", "c"]), &body).is_clean());
	let before = items(&differ, &body);

	differ.document_mut().clear_mutations();
	assert!(differ.render(list(&["a", "c"]), &body).is_clean());
	assert_eq!(items(&differ, &body), [before[0], before[2]]);
	assert_eq!(differ.document().mutations(), [Mutation::Remove(before[1])]);
}

#[test]
fn same_key_different_type_is_recreated() {
	let (mut differ, body) = setup();
	assert!(differ.render(V::fragment([V::element("p").with_key("x")]), &body).is_clean());
	let p = differ.document().children(&body)[0];

	assert!(differ.render(V::fragment([V::element("div").with_key("x")]), &body).is_clean());
	assert_eq!(differ.document().inner_html(&body), "<div></div>");
	assert!(differ.document().parent(&p).is_none());
}

#[test]
fn unkeyed_fall_back_to_first_of_same_type() {
	let (mut differ, body) = setup();
	assert!(differ.render(V::fragment([V::element("p"), V::element("span")]), &body).is_clean());
	let span = differ.document().children(&body)[1];

	differ.document_mut().clear_mutations();
	assert!(differ.render(V::fragment([V::element("span")]), &body).is_clean());
	assert_eq!(differ.document().children(&body), [span]);
	assert!(!differ.document().mutations().iter().any(Mutation::is_creation));
}

#[test]
fn keyed_and_unkeyed_do_not_mix() {
	let (mut differ, body) = setup();
	assert!(differ.render(V::fragment([V::element("i").with_key("k")]), &body).is_clean());
	let keyed = differ.document().children(&body)[0];

	assert!(differ.render(V::fragment([V::element("i")]), &body).is_clean());
	let unkeyed = differ.document().children(&body)[0];
	assert_ne!(keyed, unkeyed);
	assert!(differ.document().parent(&keyed).is_none());
}

#[test]
fn swap_two_of_many() {
	let (mut differ, body) = setup();
	let keys = ["a", "b", "c", "d", "e"];
	assert!(differ.render(list(&keys), &body).is_clean());
	let before = items(&differ, &body);

	assert!(differ.render(list(&["a", "d", "c", "b", "e"]), &body).is_clean());
	assert_eq!(items(&differ, &body), [before[0], before[3], before[2], before[1], before[4]]);
	assert_eq!(differ.document().inner_html(&body), "<ul><li>a</li><li>d</li><li>c</li><li>b</li><li>e</li></ul>");
}

#[test]
fn duplicate_keys_are_contained() {
	let (mut differ, body) = setup();
	let failures = differ.render(list(&["a", "a", "b"]), &body).into_failures();
	assert_eq!(failures.len(), 1);
	assert!(failures[0].vnode.ends_with("<ul>"));
	assert!(matches!(&failures[0].error, Error::DuplicateKey(key) if key == "a"));
	assert_eq!(differ.document().inner_html(&body), "<ul><li>a</li><li>a</li><li>b</li></ul>");
	let before = items(&differ, &body);

	// Only one old "a" can be matched, the other is unmounted and the second new "a" is created.
	let report = differ.render(list(&["b", "a", "a"]), &body);
	assert_eq!(report.failures().len(), 1);
	assert_eq!(differ.document().inner_html(&body), "<ul><li>b</li><li>a</li><li>a</li></ul>");
	let after = items(&differ, &body);
	assert_eq!(after[..2], [before[2], before[1]]);
	assert_eq!(differ.document().parent(&before[0]), None);
}
