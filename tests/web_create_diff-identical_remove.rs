#![cfg(target_arch = "wasm32")]

use twig_dom::{h, load::load_node, Backend, Element, Listener, Reconciler, VirtualNode};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

mod web_body_;

#[wasm_bindgen_test]
fn text() {
	test_create_diff_identical_remove("Hello twig-dom text!".into());
}

#[wasm_bindgen_test]
fn minimal_div() {
	test_create_diff_identical_remove(h("div", None, vec![]));
}

#[wasm_bindgen_test]
fn attributes_and_children() {
	test_create_diff_identical_remove(
		Element::new("ul")
			.with_prop("className", "list")
			.with_prop("id", "the-list")
			.with_child(h("li", None, vec!["item 1".into()]))
			.with_child("item 2")
			.into(),
	);
}

#[wasm_bindgen_test]
fn clickable_div() {
	test_create_diff_identical_remove(Element::new("div").with_prop("onClick", Listener::new(|_| ())).into());
}

fn test_create_diff_identical_remove(vdom: VirtualNode) {
	let (backend, body) = web_body_::setup();
	let mut reconciler = Reconciler::new(backend);

	reconciler.render(&body, Some(&vdom), None).unwrap();
	let live = reconciler.backend().child_at(&body, 0).unwrap();
	let loaded = load_node(reconciler.backend(), &live);

	reconciler.render(&body, Some(&vdom), Some(&vdom)).unwrap();
	assert!(reconciler.backend().child_at(&body, 0).unwrap().is_same_node(Some(&live)));
	assert_eq!(load_node(reconciler.backend(), &live), loaded);

	reconciler.render(&body, None, Some(&vdom)).unwrap();
	assert_eq!(reconciler.backend().child_count(&body), 0);
	assert_eq!(reconciler.backend().listener_closure_count(), 0);
}
