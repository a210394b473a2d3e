//! Reads live trees back into virtual trees.
//!
//! Listeners and boolean flags that were never mirrored as attributes aren't observable and aren't loaded.
//! Every attribute is loaded as a [`PropValue::Str`], with `class` renamed back to `className`.

use crate::{
	backend::{Inspect, LiveKind},
	node::{Element, PropValue, VirtualNode},
	redact,
};
use tracing::{instrument, trace, warn};

/// [`None`] if `node` has no virtual counterpart.
#[instrument(skip(backend))]
pub fn load_node<B: Inspect>(backend: &B, node: &B::Node) -> Option<VirtualNode> {
	match backend.inspect(node)? {
		LiveKind::Text(text) => {
			trace!(text = redact(&text), "Loaded text node.");
			Some(VirtualNode::Text(text))
		}
		LiveKind::Element { tag, attributes } => Some(VirtualNode::Element(Element {
			props: attributes.into_iter().map(|(name, value)| (load_attribute_name(name), PropValue::Str(value))).collect(),
			children: load_child_nodes(backend, node),
			tag,
		})),
	}
}

/// Loads all children of `parent` in live order.
///
/// Children without virtual counterpart are skipped, which shifts the positions of all following ones.
pub fn load_child_nodes<B: Inspect>(backend: &B, parent: &B::Node) -> Vec<VirtualNode> {
	(0..backend.child_count(parent))
		.filter_map(|index| {
			let child = backend.child_at(parent, index)?;
			let loaded = load_node(backend, &child);
			if loaded.is_none() {
				warn!("Skipping unrecognised live child {:?} at index {}.", child, index);
			}
			loaded
		})
		.collect()
}

fn load_attribute_name(name: String) -> String {
	if name == "class" {
		"className".to_owned()
	} else {
		name
	}
}
