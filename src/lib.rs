#![doc(html_root_url = "https://docs.rs/twig-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! A small, positional VDOM reconciler.
//!
//! Virtual trees ([`VirtualNode`]) are turned into live trees through a [`Backend`],
//! and later brought up to date with only the mutations needed to match a new virtual tree.
//!
//! Children are matched by position only. There are no keys.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod backend;
pub mod diff;
mod error;
pub mod load;
pub mod materialize;
pub mod memory;
pub mod node;
pub mod props;
mod rc_hash_map;
pub mod web;

pub use backend::{Backend, Inspect};
pub use diff::{changed, reconcile, Reconciler};
pub use error::Error;
pub use materialize::materialize;
pub use node::{h, text, Element, Event, Listener, PropValue, Props, VirtualNode};

/// How deeply nested virtual trees may be by default.
pub const DEFAULT_DEPTH_LIMIT: usize = 512;

/// Remaining recursion budget of a single render or update.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth {
	remaining: usize,
	limit: usize,
}

impl Depth {
	pub(crate) fn new(limit: usize) -> Self {
		Self { remaining: limit, limit }
	}

	pub(crate) fn descend<E: core::fmt::Debug>(self) -> Result<Self, Error<E>> {
		if self.remaining == 0 {
			tracing::error!("Depth limit reached");
			return Err(Error::DepthLimit { limit: self.limit });
		}
		Ok(Self { remaining: self.remaining - 1, ..self })
	}
}

/// Keeps page content out of log fields unless the `"dangerous-logging"` feature is enabled.
pub(crate) fn redact(value: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		value
	} else {
		"<redacted>"
	}
}
