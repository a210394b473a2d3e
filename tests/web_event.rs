#![cfg(target_arch = "wasm32")]

use std::{cell::Cell, rc::Rc};
use twig_dom::{Backend, Element, Listener, Reconciler, VirtualNode};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

mod web_body_;

fn counting_listener(count: &Rc<Cell<usize>>) -> Listener {
	let count = Rc::clone(count);
	Listener::new(move |event| {
		event.downcast_ref::<web_sys::Event>().expect("Expected the browser event as payload.");
		count.set(count.get() + 1)
	})
}

#[wasm_bindgen_test]
fn click() {
	let (backend, body) = web_body_::setup();
	let mut reconciler = Reconciler::new(backend);
	let click_count = Rc::new(Cell::new(0));

	let vdom: VirtualNode = Element::new("button").with_prop("id", "test-button").with_prop("onClick", counting_listener(&click_count)).into();

	reconciler.render(&body, Some(&vdom), None).unwrap();
	assert_eq!(click_count.get(), 0);

	let button: HtmlElement = reconciler.backend().child_at(&body, 0).unwrap().dyn_into().unwrap();
	button.click();
	assert_eq!(click_count.get(), 1);

	reconciler.render(&body, None, Some(&vdom)).unwrap();
	assert_eq!(reconciler.backend().listener_closure_count(), 0);
	button.click();
	assert_eq!(click_count.get(), 1);
}

#[wasm_bindgen_test]
fn force_update_rebinds() {
	let (backend, body) = web_body_::setup();
	let mut reconciler = Reconciler::new(backend);
	let (first_count, second_count) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));

	let first: VirtualNode = Element::new("button").with_prop("forceUpdate", true).with_prop("onClick", counting_listener(&first_count)).into();
	let second: VirtualNode = Element::new("button").with_prop("onClick", counting_listener(&second_count)).into();

	reconciler.render(&body, Some(&first), None).unwrap();
	reconciler.render(&body, Some(&second), Some(&first)).unwrap();
	assert_eq!(reconciler.backend().listener_closure_count(), 1);

	let button: HtmlElement = reconciler.backend().child_at(&body, 0).unwrap().dyn_into().unwrap();
	button.click();
	assert_eq!((first_count.get(), second_count.get()), (0, 1));
}

#[wasm_bindgen_test]
fn checked_flag() {
	let (backend, body) = web_body_::setup();
	let mut reconciler = Reconciler::new(backend);

	let on: VirtualNode = Element::new("input").with_prop("type", "checkbox").with_prop("checked", true).into();
	let off: VirtualNode = Element::new("input").with_prop("type", "checkbox").with_prop("checked", false).into();

	reconciler.render(&body, Some(&on), None).unwrap();
	let input: web_sys::HtmlInputElement = reconciler.backend().child_at(&body, 0).unwrap().dyn_into().unwrap();
	assert!(input.checked());
	assert!(input.has_attribute("checked"));

	reconciler.render(&body, Some(&off), Some(&on)).unwrap();
	assert!(!input.checked());
	assert!(!input.has_attribute("checked"));
}
