//! A deterministic, in-memory live tree.
//!
//! [`MemoryDom`] journals every primitive it executes as a [`Mutation`],
//! which makes it suitable for checking exactly what a reconciliation did.

use crate::{
	backend::{Backend, Inspect, LiveKind},
	node::{Event, Listener},
};
use core::fmt::Write as _;
use hashbrown::HashMap;
use indexmap::IndexMap;
use tracing::{trace, trace_span};

/// Index of a node in a [`MemoryDom`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One executed backend primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
	CreateLeaf { node: NodeId, text: String },
	CreateContainer { node: NodeId, tag: String },
	AppendChild { parent: NodeId, child: NodeId },
	ReplaceChildAt { parent: NodeId, index: usize, child: NodeId },
	RemoveChildAt { parent: NodeId, index: usize },
	SetAttribute { node: NodeId, name: String, value: String },
	RemoveAttribute { node: NodeId, name: String },
	SetBooleanProperty { node: NodeId, name: String, value: bool },
	AddListener { node: NodeId, event: String },
	RemoveListener { node: NodeId, event: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
	#[error("unknown node {0:?}")]
	UnknownNode(NodeId),
	#[error("{0:?} is a text node and can't have children, attributes or listeners")]
	NotAContainer(NodeId),
	#[error("{child:?} already has a parent")]
	AlreadyAttached { child: NodeId },
	#[error("index {index} is out of bounds for {len} children")]
	OutOfBounds { index: usize, len: usize },
	#[error("no {event:?} listener like that on {node:?}")]
	UnknownListener { node: NodeId, event: String },
}

#[derive(Debug)]
enum Kind {
	Text(String),
	Element(ElementData),
}

#[derive(Debug, Default)]
struct ElementData {
	tag: String,
	attributes: IndexMap<String, String>,
	properties: HashMap<String, bool>,
	listeners: Vec<(String, Listener)>,
	children: Vec<NodeId>,
}

#[derive(Debug)]
struct NodeData {
	kind: Kind,
	parent: Option<NodeId>,
}

#[derive(Debug)]
pub struct MemoryDom {
	nodes: Vec<NodeData>,
	root: NodeId,
	journal: Vec<Mutation>,
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDom {
	/// Creates an empty tree that consists only of a `"root"` container to mount into.
	///
	/// Creating the root isn't journaled.
	#[must_use]
	pub fn new() -> Self {
		Self {
			nodes: vec![NodeData {
				kind: Kind::Element(ElementData { tag: "root".to_owned(), ..ElementData::default() }),
				parent: None,
			}],
			root: NodeId(0),
			journal: Vec::new(),
		}
	}

	#[must_use]
	pub fn root(&self) -> NodeId {
		self.root
	}

	#[must_use]
	pub fn mutations(&self) -> &[Mutation] {
		&self.journal
	}

	pub fn take_mutations(&mut self) -> Vec<Mutation> {
		core::mem::take(&mut self.journal)
	}

	pub fn clear_mutations(&mut self) {
		self.journal.clear()
	}

	#[must_use]
	pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
		self.nodes.get(node.0).and_then(|data| data.parent)
	}

	/// Empty for text nodes and unknown ids.
	#[must_use]
	pub fn children(&self, node: NodeId) -> &[NodeId] {
		self.element(node).map(|element| element.children.as_slice()).unwrap_or(&[])
	}

	#[must_use]
	pub fn text_of(&self, node: NodeId) -> Option<&str> {
		match &self.nodes.get(node.0)?.kind {
			Kind::Text(text) => Some(text),
			Kind::Element(_) => None,
		}
	}

	#[must_use]
	pub fn tag_of(&self, node: NodeId) -> Option<&str> {
		self.element(node).map(|element| element.tag.as_str())
	}

	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.element(node)?.attributes.get(name).map(String::as_str)
	}

	/// [`None`] if the flag was never set.
	#[must_use]
	pub fn boolean_property(&self, node: NodeId, name: &str) -> Option<bool> {
		self.element(node)?.properties.get(name).copied()
	}

	#[must_use]
	pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
		self.element(node).map_or(0, |element| element.listeners.iter().filter(|(name, _)| name == event).count())
	}

	/// Calls the `event` listeners registered directly on `node`, in registration order.
	///
	/// The [`Event`] carries `node` as payload. Returns how many listeners were called.
	pub fn dispatch(&self, node: NodeId, event: &str) -> usize {
		let span = trace_span!("Dispatching", ?node, event);
		let _enter = span.enter();
		let listeners: Vec<Listener> = match self.element(node) {
			Some(element) => element.listeners.iter().filter(|(name, _)| name == event).map(|(_, listener)| listener.clone()).collect(),
			None => return 0,
		};
		for listener in &listeners {
			listener.call(&Event::new(event).with_payload(node))
		}
		listeners.len()
	}

	/// Renders `node` as HTML-ish markup, for debugging and assertions.
	///
	/// Text isn't escaped and listeners aren't shown.
	#[must_use]
	pub fn to_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		match self.nodes.get(node.0).map(|data| &data.kind) {
			None => (),
			Some(Kind::Text(text)) => html.push_str(text),
			Some(Kind::Element(element)) => {
				html.push('<');
				html.push_str(&element.tag);
				for (name, value) in &element.attributes {
					let _ = write!(html, " {}={:?}", name, value);
				}
				html.push('>');
				for &child in &element.children {
					self.write_html(child, html);
				}
				let _ = write!(html, "</{}>", element.tag);
			}
		}
	}

	fn element(&self, node: NodeId) -> Option<&ElementData> {
		match &self.nodes.get(node.0)?.kind {
			Kind::Element(element) => Some(element),
			Kind::Text(_) => None,
		}
	}

	fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, MemoryError> {
		match &mut self.nodes.get_mut(node.0).ok_or(MemoryError::UnknownNode(node))?.kind {
			Kind::Element(element) => Ok(element),
			Kind::Text(_) => Err(MemoryError::NotAContainer(node)),
		}
	}

	fn push(&mut self, kind: Kind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData { kind, parent: None });
		id
	}

	fn detached(&self, child: NodeId) -> Result<(), MemoryError> {
		match self.nodes.get(child.0) {
			None => Err(MemoryError::UnknownNode(child)),
			Some(NodeData { parent: Some(_), .. }) => Err(MemoryError::AlreadyAttached { child }),
			Some(NodeData { parent: None, .. }) => Ok(()),
		}
	}

	fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
		if let Some(data) = self.nodes.get_mut(node.0) {
			data.parent = parent
		}
	}
}

impl Backend for MemoryDom {
	type Node = NodeId;
	type Error = MemoryError;

	fn create_leaf(&mut self, text: &str) -> Result<NodeId, MemoryError> {
		let node = self.push(Kind::Text(text.to_owned()));
		self.journal.push(Mutation::CreateLeaf { node, text: text.to_owned() });
		Ok(node)
	}

	fn create_container(&mut self, tag: &str) -> Result<NodeId, MemoryError> {
		let node = self.push(Kind::Element(ElementData { tag: tag.to_owned(), ..ElementData::default() }));
		self.journal.push(Mutation::CreateContainer { node, tag: tag.to_owned() });
		Ok(node)
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryError> {
		let (parent, child) = (*parent, *child);
		self.detached(child)?;
		self.element_mut(parent)?.children.push(child);
		self.set_parent(child, Some(parent));
		self.journal.push(Mutation::AppendChild { parent, child });
		Ok(())
	}

	fn replace_child_at(&mut self, parent: &NodeId, index: usize, child: &NodeId) -> Result<(), MemoryError> {
		let (parent, child) = (*parent, *child);
		self.detached(child)?;
		let children = &mut self.element_mut(parent)?.children;
		let len = children.len();
		let slot = children.get_mut(index).ok_or(MemoryError::OutOfBounds { index, len })?;
		let replaced = core::mem::replace(slot, child);
		self.set_parent(replaced, None);
		self.set_parent(child, Some(parent));
		trace!(?replaced, ?child, "Replaced child.");
		self.journal.push(Mutation::ReplaceChildAt { parent, index, child });
		Ok(())
	}

	fn remove_child_at(&mut self, parent: &NodeId, index: usize) -> Result<(), MemoryError> {
		let parent = *parent;
		let children = &mut self.element_mut(parent)?.children;
		let len = children.len();
		if index >= len {
			return Err(MemoryError::OutOfBounds { index, len });
		}
		let removed = children.remove(index);
		self.set_parent(removed, None);
		self.journal.push(Mutation::RemoveChildAt { parent, index });
		Ok(())
	}

	fn child_at(&self, parent: &NodeId, index: usize) -> Option<NodeId> {
		self.children(*parent).get(index).copied()
	}

	fn child_count(&self, parent: &NodeId) -> usize {
		self.children(*parent).len()
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), MemoryError> {
		self.element_mut(*node)?.attributes.insert(name.to_owned(), value.to_owned());
		self.journal.push(Mutation::SetAttribute { node: *node, name: name.to_owned(), value: value.to_owned() });
		Ok(())
	}

	fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), MemoryError> {
		self.element_mut(*node)?.attributes.shift_remove(name);
		self.journal.push(Mutation::RemoveAttribute { node: *node, name: name.to_owned() });
		Ok(())
	}

	fn set_boolean_property(&mut self, node: &NodeId, name: &str, value: bool) -> Result<(), MemoryError> {
		let element = self.element_mut(*node)?;
		element.properties.insert(name.to_owned(), value);
		if value {
			element.attributes.insert(name.to_owned(), "true".to_owned());
		}
		self.journal.push(Mutation::SetBooleanProperty { node: *node, name: name.to_owned(), value });
		Ok(())
	}

	fn add_listener(&mut self, node: &NodeId, event_name: &str, listener: &Listener) -> Result<(), MemoryError> {
		self.element_mut(*node)?.listeners.push((event_name.to_owned(), listener.clone()));
		self.journal.push(Mutation::AddListener { node: *node, event: event_name.to_owned() });
		Ok(())
	}

	fn remove_listener(&mut self, node: &NodeId, event_name: &str, listener: &Listener) -> Result<(), MemoryError> {
		let listeners = &mut self.element_mut(*node)?.listeners;
		let position = listeners
			.iter()
			.position(|(name, registered)| name == event_name && registered == listener)
			.ok_or_else(|| MemoryError::UnknownListener { node: *node, event: event_name.to_owned() })?;
		listeners.remove(position);
		self.journal.push(Mutation::RemoveListener { node: *node, event: event_name.to_owned() });
		Ok(())
	}
}

impl Inspect for MemoryDom {
	fn inspect(&self, node: &NodeId) -> Option<LiveKind> {
		match &self.nodes.get(node.0)?.kind {
			Kind::Text(text) => Some(LiveKind::Text(text.clone())),
			Kind::Element(element) => Some(LiveKind::Element {
				tag: element.tag.clone(),
				attributes: element.attributes.iter().map(|(name, value)| (name.clone(), value.clone())).collect(),
			}),
		}
	}
}
