#![cfg(target_arch = "wasm32")]

use std::sync::Once;
use twig_dom::web::WebBackend;
use wasm_bindgen::JsCast;
use web_sys::HtmlBodyElement;

static LOG_INIT: Once = Once::new();

/// A fresh backend and the (emptied) document body.
pub fn setup() -> (WebBackend, web_sys::Node) {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let backend = WebBackend::for_window().unwrap();
	let body = backend.document().body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	body.set_inner_html("");
	(backend, body.into())
}
