//! Creation and teardown of live subtrees.

use crate::{
	backend::{expect_child, Backend},
	node::{PropValue, VirtualNode},
	props::{set_props, PropKind},
	redact, Depth, Error, DEFAULT_DEPTH_LIMIT,
};
use tracing::{instrument, trace_span};

/// Builds a brand-new live subtree for `node`.
///
/// The returned node isn't attached to anything yet.
/// Its children correspond 1:1, in order, to those of `node`.
#[instrument(skip(backend, node))]
pub fn materialize<B: Backend>(backend: &mut B, node: &VirtualNode) -> Result<B::Node, Error<B::Error>> {
	materialize_within(backend, node, Depth::new(DEFAULT_DEPTH_LIMIT))
}

pub(crate) fn materialize_within<B: Backend>(backend: &mut B, node: &VirtualNode, depth: Depth) -> Result<B::Node, Error<B::Error>> {
	let depth = depth.descend::<B::Error>()?;
	match node {
		VirtualNode::Text(text) => {
			let span = trace_span!("Creating text node", text = redact(text));
			let _enter = span.enter();
			Ok(backend.create_leaf(text)?)
		}
		VirtualNode::Element(element) => {
			let span = trace_span!("Creating element", tag = element.tag.as_str(), "children.len()" = element.children.len());
			let _enter = span.enter();
			let live = backend.create_container(&element.tag)?;
			set_props(backend, &live, &element.props)?;
			for child in &element.children {
				let live_child = materialize_within(backend, child, depth)?;
				backend.append_child(&live, &live_child)?;
			}
			Ok(live)
		}
	}
}

/// Unregisters every listener that `node` and its descendants attached to the live subtree `live`.
///
/// Used right before `live` is detached. Nothing else about the live subtree is touched.
pub(crate) fn unbind_within<B: Backend>(backend: &mut B, node: &VirtualNode, live: &B::Node, depth: Depth) -> Result<(), Error<B::Error>> {
	let element = match node {
		VirtualNode::Text(_) => return Ok(()),
		VirtualNode::Element(element) => element,
	};
	let depth = depth.descend::<B::Error>()?;

	let span = trace_span!("Unbinding element", tag = element.tag.as_str());
	let _enter = span.enter();

	for (name, value) in &element.props {
		if let (PropKind::Listener { event }, PropValue::Listener(listener)) = (PropKind::classify(name), value) {
			backend.remove_listener(live, &event, listener)?
		}
	}

	for (index, child) in element.children.iter().enumerate() {
		if let VirtualNode::Element(_) = child {
			let live_child = expect_child(backend, live, index)?;
			unbind_within(backend, child, &live_child, depth)?
		}
	}
	Ok(())
}
