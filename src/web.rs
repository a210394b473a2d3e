//! A [`Backend`] for browser DOMs, via [`web_sys`].
//!
//! Each distinct [`Listener`] is wrapped into a single [`Closure`] that is shared across all its registrations.
//! Closures are reference-counted and freed on [`Backend::flush`] once they aren't registered anywhere anymore.
//!
//! Removing or replacing a child also releases every registration within the detached subtree,
//! so the reconciler doesn't have to unregister listeners of nodes it merely drops.

use crate::{
	backend::{Backend, Inspect, LiveKind},
	node::{Event, Listener},
	rc_hash_map::RcHashMap,
};
use core::convert::TryFrom;
use tracing::{error, info, instrument, trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

pub struct WebBackend {
	document: web_sys::Document,
	handler_handles: RcHashMap<Listener, u16, Closure<dyn Fn(web_sys::Event)>>,
	registrations: Vec<Registration>,
}

struct Registration {
	node: web_sys::Node,
	event_name: String,
	listener: Listener,
}

impl core::fmt::Debug for WebBackend {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("WebBackend")
			.field("document", &self.document)
			.field("handler_handles.len()", &self.handler_handles.len())
			.field("registrations.len()", &self.registrations.len())
			.finish()
	}
}

impl WebBackend {
	#[must_use]
	#[instrument]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document, handler_handles: RcHashMap::new(), registrations: Vec::new() }
	}

	/// [`None`] outside of a browser window.
	#[must_use]
	pub fn for_window() -> Option<Self> {
		web_sys::window()?.document().map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// How many distinct listeners currently have a live closure, including ones that are pending release.
	#[must_use]
	pub fn listener_closure_count(&self) -> usize {
		self.handler_handles.len()
	}

	fn get_or_create_closure<'a>(
		handler_handles: &'a mut RcHashMap<Listener, u16, Closure<dyn Fn(web_sys::Event)>>,
		listener: &Listener,
	) -> Result<&'a Closure<dyn Fn(web_sys::Event)>, JsValue> {
		handler_handles
			.increment_or_insert_with(listener.clone(), |listener| {
				let listener = listener.clone();
				Closure::wrap(Box::new(move |event: web_sys::Event| {
					let span = trace_span!("Dispatching", event = %event.type_());
					let _enter = span.enter();
					listener.call(&Event::new(event.type_()).with_payload(event))
				}) as Box<dyn Fn(web_sys::Event)>)
			})
			.map(|closure| &*closure)
			.map_err(|_| JsValue::from_str("Too many (more than 65k) active registrations of the same `Listener`"))
	}

	fn release(&mut self, registration: &Registration) -> Result<(), JsValue> {
		match self.handler_handles.weak_decrement(&registration.listener) {
			Ok(Some(closure)) => registration.node.remove_event_listener_with_callback(&registration.event_name, closure.as_ref().unchecked_ref()),
			Ok(None) => Err(JsValue::from_str("Tried to remove a listener that was never added.")),
			Err(_) => Err(JsValue::from_str("Tried to remove a listener more often than it was added.")),
		}
	}

	/// Releases the registrations of `detached` and all its descendants.
	#[instrument(skip(self))]
	fn release_within(&mut self, detached: &web_sys::Node) -> Result<(), JsValue> {
		let (released, kept) = core::mem::take(&mut self.registrations).into_iter().partition::<Vec<_>, _>(|registration| detached.contains(Some(&registration.node)));
		self.registrations = kept;
		trace!("Releasing {} registration(s) of a detached subtree.", released.len());
		released.iter().try_for_each(|registration| self.release(registration))
	}
}

fn as_element(node: &web_sys::Node) -> Result<&web_sys::Element, JsValue> {
	node.dyn_ref::<web_sys::Element>().ok_or_else(|| JsValue::from_str("Expected an element."))
}

fn dom_index(index: usize) -> Result<u32, JsValue> {
	u32::try_from(index).map_err(|_| JsValue::from_str("Child index out of range."))
}

fn existing_child(parent: &web_sys::Node, index: usize) -> Result<web_sys::Node, JsValue> {
	parent.child_nodes().get(dom_index(index)?).ok_or_else(|| JsValue::from_str("No child at that index."))
}

impl Backend for WebBackend {
	type Node = web_sys::Node;
	type Error = JsValue;

	fn create_leaf(&mut self, text: &str) -> Result<web_sys::Node, JsValue> {
		Ok(self.document.create_text_node(text).into())
	}

	fn create_container(&mut self, tag: &str) -> Result<web_sys::Node, JsValue> {
		Ok(self.document.create_element(tag)?.into())
	}

	fn append_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), JsValue> {
		parent.append_child(child).map(drop)
	}

	fn replace_child_at(&mut self, parent: &web_sys::Node, index: usize, child: &web_sys::Node) -> Result<(), JsValue> {
		let replaced = existing_child(parent, index)?;
		parent.replace_child(child, &replaced)?;
		self.release_within(&replaced)
	}

	fn remove_child_at(&mut self, parent: &web_sys::Node, index: usize) -> Result<(), JsValue> {
		let removed = existing_child(parent, index)?;
		parent.remove_child(&removed)?;
		self.release_within(&removed)
	}

	fn child_at(&self, parent: &web_sys::Node, index: usize) -> Option<web_sys::Node> {
		parent.child_nodes().get(u32::try_from(index).ok()?)
	}

	fn child_count(&self, parent: &web_sys::Node) -> usize {
		parent.child_nodes().length() as usize
	}

	fn set_attribute(&mut self, node: &web_sys::Node, name: &str, value: &str) -> Result<(), JsValue> {
		as_element(node)?.set_attribute(name, value)
	}

	fn remove_attribute(&mut self, node: &web_sys::Node, name: &str) -> Result<(), JsValue> {
		as_element(node)?.remove_attribute(name)
	}

	fn set_boolean_property(&mut self, node: &web_sys::Node, name: &str, value: bool) -> Result<(), JsValue> {
		let target: &JsValue = node.as_ref();
		if !js_sys::Reflect::set(target, &JsValue::from_str(name), &JsValue::from_bool(value))? {
			error!("Could not set property {:?} to {}.", name, value);
		}
		if value {
			as_element(node)?.set_attribute(name, "true")?
		}
		Ok(())
	}

	#[instrument(skip(self))]
	fn add_listener(&mut self, node: &web_sys::Node, event_name: &str, listener: &Listener) -> Result<(), JsValue> {
		let closure = Self::get_or_create_closure(&mut self.handler_handles, listener)?;
		node.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
		self.registrations.push(Registration { node: node.clone(), event_name: event_name.to_owned(), listener: listener.clone() });
		Ok(())
	}

	#[instrument(skip(self))]
	fn remove_listener(&mut self, node: &web_sys::Node, event_name: &str, listener: &Listener) -> Result<(), JsValue> {
		let position = self
			.registrations
			.iter()
			.position(|registration| &registration.node == node && registration.event_name == event_name && &registration.listener == listener)
			.ok_or_else(|| JsValue::from_str("Tried to remove a listener that was never added."))?;
		let registration = self.registrations.swap_remove(position);
		self.release(&registration)
	}

	fn flush(&mut self) {
		{
			let drain = self.handler_handles.drain_weak();
			trace!("Freed {} listener closure(s).", drain.count());
		}
		info!("Listener closure count/cached capacity: {}/{}", self.handler_handles.len(), self.handler_handles.capacity());
	}
}

impl Inspect for WebBackend {
	fn inspect(&self, node: &web_sys::Node) -> Option<LiveKind> {
		if let Some(text) = node.dyn_ref::<web_sys::Text>() {
			Some(LiveKind::Text(text.data()))
		} else if let Some(element) = node.dyn_ref::<web_sys::Element>() {
			let attributes = element.attributes();
			Some(LiveKind::Element {
				tag: element.local_name(),
				attributes: (0..attributes.length())
					.filter_map(|i| attributes.item(i))
					.map(|attribute| (attribute.local_name(), attribute.value()))
					.collect(),
			})
		} else {
			None
		}
	}
}
