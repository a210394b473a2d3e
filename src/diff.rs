use crate::{
	backend::{expect_child, Backend},
	materialize::{materialize_within, unbind_within},
	node::{Element, VirtualNode},
	props::{update_props, FORCE_UPDATE},
	redact, Depth, Error, DEFAULT_DEPTH_LIMIT,
};
use core::cmp::max;
use tracing::{instrument, trace, trace_span};

/// Owns a [`Backend`] and brings the live children of a parent node in line with successive virtual trees.
///
/// # Correct Use
///
/// The `old` tree passed to each update must be exactly the `new` tree of the previous update to the same slot
/// (or [`None`] before the first one). The live tree must not be changed by anything else in between.
///
/// Calls must not overlap. In particular, don't update a subtree from a listener that fires during an update to it.
#[derive(Debug)]
pub struct Reconciler<B> {
	backend: B,
	depth_limit: usize,
}

impl<B: Backend> Reconciler<B> {
	#[must_use]
	pub fn new(backend: B) -> Self {
		Self { backend, depth_limit: DEFAULT_DEPTH_LIMIT }
	}

	/// Limits how deeply nested the virtual trees may be. Deeper trees fail with [`Error::DepthLimit`].
	#[must_use]
	pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	#[must_use]
	pub fn depth_limit(&self) -> usize {
		self.depth_limit
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn backend_mut(&mut self) -> &mut B {
		&mut self.backend
	}

	pub fn into_backend(self) -> B {
		self.backend
	}

	/// Builds an unattached live subtree for `node`. See [`materialize`](`crate::materialize::materialize`).
	pub fn materialize(&mut self, node: &VirtualNode) -> Result<B::Node, Error<B::Error>> {
		materialize_within(&mut self.backend, node, Depth::new(self.depth_limit))
	}

	/// Updates the `index`th live child of `parent` from `old` to `new`. See [`reconcile`].
	#[instrument(skip(self, new, old))]
	pub fn reconcile(&mut self, parent: &B::Node, new: Option<&VirtualNode>, old: Option<&VirtualNode>, index: usize) -> Result<(), Error<B::Error>> {
		reconcile_within(&mut self.backend, parent, new, old, index, Depth::new(self.depth_limit))?;
		self.backend.flush();
		Ok(())
	}

	/// Shorthand for [`Reconciler::reconcile`] on the first child slot of `parent`.
	pub fn render(&mut self, parent: &B::Node, new: Option<&VirtualNode>, old: Option<&VirtualNode>) -> Result<(), Error<B::Error>> {
		self.reconcile(parent, new, old, 0)
	}
}

/// Updates the `index`th live child of `parent` from `old` to `new` with as few mutations as this algorithm can find.
///
/// - Without `old`, `new` is materialized and appended to `parent`.
/// - Without `new`, the child at `index` is removed.
/// - If the two are [`changed`], the child at `index` is replaced by a materialization of `new`.
/// - Otherwise, an element is patched in place: its props are updated and its children reconciled position by position.
///
/// Children are matched purely by position. Inserting into or removing from the middle of a child list
/// replaces every following child that doesn't happen to match.
///
/// Listeners of replaced live nodes are unregistered before those nodes are detached.
/// Removal issues nothing but [`Backend::remove_child_at`]; releasing what the removed subtree held is up to the backend.
#[instrument(skip(backend, new, old))]
pub fn reconcile<B: Backend>(backend: &mut B, parent: &B::Node, new: Option<&VirtualNode>, old: Option<&VirtualNode>, index: usize) -> Result<(), Error<B::Error>> {
	reconcile_within(backend, parent, new, old, index, Depth::new(DEFAULT_DEPTH_LIMIT))?;
	backend.flush();
	Ok(())
}

/// Whether the live node for `old` can't be patched into one for `new` and has to be recreated.
///
/// That's the case if their kinds differ, if they are different texts, if they are elements with different tags,
/// or if either of them is an element with a truthy `forceUpdate` prop.
#[must_use]
pub fn changed(new: &VirtualNode, old: &VirtualNode) -> bool {
	match (new, old) {
		(VirtualNode::Text(new), VirtualNode::Text(old)) => new != old,
		(VirtualNode::Element(new), VirtualNode::Element(old)) => new.tag != old.tag || is_forced(new) || is_forced(old),
		_ => true,
	}
}

fn is_forced(element: &Element) -> bool {
	element.props.get(FORCE_UPDATE).map_or(false, |value| value.is_truthy())
}

fn reconcile_within<B: Backend>(backend: &mut B, parent: &B::Node, new: Option<&VirtualNode>, old: Option<&VirtualNode>, index: usize, depth: Depth) -> Result<(), Error<B::Error>> {
	match (new, old) {
		(None, None) => trace!(index, "Neither a new nor an old node. Nothing to do."),

		(Some(new), None) => {
			let span = trace_span!("Appending", index);
			let _enter = span.enter();
			let live = materialize_within(backend, new, depth)?;
			backend.append_child(parent, &live)?
		}

		(None, Some(_)) => {
			let span = trace_span!("Removing", index);
			let _enter = span.enter();
			expect_child(backend, parent, index)?;
			backend.remove_child_at(parent, index)?
		}

		(Some(new), Some(old)) if changed(new, old) => {
			let span = trace_span!("Replacing", index);
			let _enter = span.enter();
			let live = expect_child(backend, parent, index)?;
			unbind_within(backend, old, &live, depth)?;
			let replacement = materialize_within(backend, new, depth)?;
			backend.replace_child_at(parent, index, &replacement)?
		}

		(Some(VirtualNode::Element(new)), Some(VirtualNode::Element(old))) => {
			let depth = depth.descend::<B::Error>()?;
			let span = trace_span!("Patching element", index, tag = new.tag.as_str());
			let _enter = span.enter();
			let live = expect_child(backend, parent, index)?;
			update_props(backend, &live, &new.props, &old.props)?;

			// Removing a child shifts all following live children one position to the front.
			let mut removed = 0;
			for i in 0..max(new.children.len(), old.children.len()) {
				let (new_child, old_child) = (new.children.get(i), old.children.get(i));
				reconcile_within(backend, &live, new_child, old_child, i - removed, depth)?;
				if new_child.is_none() && old_child.is_some() {
					removed += 1;
				}
			}
		}

		(Some(new), Some(_)) => {
			depth.descend::<B::Error>()?;
			trace!(index, text = ?new.as_text().map(redact), "Unchanged text.")
		}
	}
	Ok(())
}
