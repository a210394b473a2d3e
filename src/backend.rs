//! The primitive operations the reconciler needs from whatever owns the live tree.

use crate::{node::Listener, Error};
use core::fmt::Debug;
use tracing::error;

/// A rendering collaborator that owns live nodes.
///
/// Live children are addressed strictly by their position under their parent.
/// The reconciler never keeps its own copy of live state, so every read goes through [`Backend::child_at`].
///
/// Failures are reported through [`Backend::Error`] and propagated unchanged.
/// The reconciler never retries a primitive.
pub trait Backend {
	/// An opaque handle to a live node.
	type Node: Clone + Debug;
	type Error: Debug;

	fn create_leaf(&mut self, text: &str) -> Result<Self::Node, Self::Error>;
	fn create_container(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;
	fn replace_child_at(&mut self, parent: &Self::Node, index: usize, child: &Self::Node) -> Result<(), Self::Error>;
	fn remove_child_at(&mut self, parent: &Self::Node, index: usize) -> Result<(), Self::Error>;

	/// [`None`] iff `parent` has no child at `index`.
	fn child_at(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;
	fn child_count(&self, parent: &Self::Node) -> usize;

	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error>;
	fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

	/// Sets the live flag `name`. When `value` is `true`, this also mirrors it as an attribute.
	fn set_boolean_property(&mut self, node: &Self::Node, name: &str, value: bool) -> Result<(), Self::Error>;

	fn add_listener(&mut self, node: &Self::Node, event_name: &str, listener: &Listener) -> Result<(), Self::Error>;
	fn remove_listener(&mut self, node: &Self::Node, event_name: &str, listener: &Listener) -> Result<(), Self::Error>;

	/// Called once after each completed top-level update.
	///
	/// Backends can release resources that became unreferenced during the update here.
	fn flush(&mut self) {}
}

/// Fails fast if the live tree doesn't have the child the previous virtual tree implies.
pub(crate) fn expect_child<B: Backend>(backend: &B, parent: &B::Node, index: usize) -> Result<B::Node, Error<B::Error>> {
	backend.child_at(parent, index).ok_or_else(|| {
		let len = backend.child_count(parent);
		error!("Expected a live child at index {} of {:?}, but found only {}.", index, parent, len);
		Error::MissingChild { index, len }
	})
}

/// What a live node looks like from the outside, as far as [`Inspect`] can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveKind {
	Text(String),
	Element { tag: String, attributes: Vec<(String, String)> },
}

/// Read access to live nodes, used to load virtual trees back from a live tree.
pub trait Inspect: Backend {
	/// [`None`] for live nodes that have no virtual counterpart (comments, for example).
	fn inspect(&self, node: &Self::Node) -> Option<LiveKind>;
}
