use core::fmt::Debug;

/// Everything that can stop a render or an update.
///
/// None of these are recovered from. The live tree may be partially mutated when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error<E: Debug> {
	/// A backend primitive failed.
	#[error("backend operation failed: {0:?}")]
	Backend(E),

	/// The live tree is out of sync with the previous virtual tree.
	#[error("expected a live child at index {index}, but its parent has only {len}")]
	MissingChild { index: usize, len: usize },

	#[error("depth limit ({limit}) reached")]
	DepthLimit { limit: usize },
}

impl<E: Debug> From<E> for Error<E> {
	fn from(error: E) -> Self {
		Error::Backend(error)
	}
}
