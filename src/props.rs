//! Brings a single live node's attributes, boolean properties and listeners in line with its declared [`Props`].
//!
//! Listeners are only ever attached during materialization. Updating never re-diffs them;
//! [`FORCE_UPDATE`] is how a render asks for them to be rebuilt.

use crate::{
	backend::Backend,
	node::{PropValue, Props},
	redact, Error,
};
use tracing::{instrument, trace, warn};

/// Control key: recreates the element instead of patching it. Never written to the live node.
pub const FORCE_UPDATE: &str = "forceUpdate";

/// Keys with this prefix declare listeners. The rest of the key, lower-cased, is the event name.
pub const LISTENER_PREFIX: &str = "on";

/// How a prop key is applied to the live node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropKind<'a> {
	Listener { event: String },
	Control,
	/// The live attribute name, which differs from the key only for `className`.
	Attribute(&'a str),
}

impl<'a> PropKind<'a> {
	#[must_use]
	pub fn classify(key: &'a str) -> Self {
		if key == FORCE_UPDATE {
			PropKind::Control
		} else if let Some(event) = key.strip_prefix(LISTENER_PREFIX) {
			PropKind::Listener { event: event.to_lowercase() }
		} else if key == "className" {
			PropKind::Attribute("class")
		} else {
			PropKind::Attribute(key)
		}
	}

	/// Custom props are skipped by [`update_props`].
	#[must_use]
	pub fn is_custom(&self) -> bool {
		!matches!(self, PropKind::Attribute(_))
	}
}

/// Applies every prop to a freshly created node, listeners included.
#[instrument(skip(backend, props))]
pub fn set_props<B: Backend>(backend: &mut B, node: &B::Node, props: &Props) -> Result<(), Error<B::Error>> {
	for (name, value) in props {
		set_prop(backend, node, name, value)?
	}
	Ok(())
}

#[instrument(skip(backend, value))]
pub fn set_prop<B: Backend>(backend: &mut B, node: &B::Node, name: &str, value: &PropValue) -> Result<(), Error<B::Error>> {
	match (PropKind::classify(name), value) {
		(PropKind::Control, _) => trace!("Skipping control prop."),
		(PropKind::Listener { event }, PropValue::Listener(listener)) => backend.add_listener(node, &event, listener)?,
		(PropKind::Listener { event }, _) => warn!("Prop {:?} names event {:?} but its value isn't a listener. Skipping.", name, event),
		(PropKind::Attribute(attribute), PropValue::Bool(flag)) => backend.set_boolean_property(node, attribute, *flag)?,
		(PropKind::Attribute(attribute), PropValue::Str(value)) => {
			trace!(attribute, value = redact(value), "Setting attribute.");
			backend.set_attribute(node, attribute, value)?
		}
		(PropKind::Attribute(_), PropValue::Listener(_)) => warn!("Listener under non-listener key {:?}. Keys of listeners must start with {:?}. Skipping.", name, LISTENER_PREFIX),
	}
	Ok(())
}

/// Removes a prop, picking the strategy from the value it was last set to.
#[instrument(skip(backend, old_value))]
pub fn remove_prop<B: Backend>(backend: &mut B, node: &B::Node, name: &str, old_value: &PropValue) -> Result<(), Error<B::Error>> {
	match PropKind::classify(name) {
		PropKind::Attribute(attribute) => match old_value {
			PropValue::Bool(_) => remove_boolean(backend, node, attribute),
			PropValue::Str(_) => Ok(backend.remove_attribute(node, attribute)?),
			PropValue::Listener(_) => {
				trace!("Listener under non-listener key was never applied. Skipping.");
				Ok(())
			}
		},
		_ => {
			trace!("Skipping custom prop.");
			Ok(())
		}
	}
}

fn remove_boolean<B: Backend>(backend: &mut B, node: &B::Node, attribute: &str) -> Result<(), Error<B::Error>> {
	backend.remove_attribute(node, attribute)?;
	backend.set_boolean_property(node, attribute, false)?;
	Ok(())
}

/// Issues only the mutations needed to go from `old_props` to `new_props`.
///
/// Keys are visited in `new_props` order first, followed by the keys that only `old_props` has.
/// Listeners and control props are skipped.
#[instrument(skip(backend, new_props, old_props))]
pub fn update_props<B: Backend>(backend: &mut B, node: &B::Node, new_props: &Props, old_props: &Props) -> Result<(), Error<B::Error>> {
	let removed_keys = old_props.keys().filter(|key| !new_props.contains_key(key.as_str()));
	for name in new_props.keys().chain(removed_keys) {
		if PropKind::classify(name).is_custom() {
			continue;
		}
		update_prop(backend, node, name, new_props.get(name), old_props.get(name))?
	}
	Ok(())
}

fn update_prop<B: Backend>(backend: &mut B, node: &B::Node, name: &str, new_value: Option<&PropValue>, old_value: Option<&PropValue>) -> Result<(), Error<B::Error>> {
	match (new_value, old_value) {
		(None, None) => Ok(()),
		(None, Some(old_value)) => remove_prop(backend, node, name, old_value),
		(Some(new_value), Some(old_value)) if new_value == old_value => {
			trace!(name, "Unchanged.");
			Ok(())
		}
		// An explicit `false` turns the flag off, including its mirrored attribute.
		(Some(PropValue::Bool(false)), Some(_)) => match PropKind::classify(name) {
			PropKind::Attribute(attribute) => remove_boolean(backend, node, attribute),
			_ => Ok(()),
		},
		(Some(new_value), _) => set_prop(backend, node, name, new_value),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		memory::{MemoryDom, Mutation},
		node::Listener,
	};

	fn props(entries: &[(&str, PropValue)]) -> Props {
		entries.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
	}

	#[test]
	fn classification() {
		assert_eq!(PropKind::classify("onClick"), PropKind::Listener { event: "click".to_owned() });
		assert_eq!(PropKind::classify("forceUpdate"), PropKind::Control);
		assert_eq!(PropKind::classify("className"), PropKind::Attribute("class"));
		assert_eq!(PropKind::classify("id"), PropKind::Attribute("id"));
		assert!(PropKind::classify("onInput").is_custom());
		assert!(!PropKind::classify("title").is_custom());
	}

	#[test]
	fn set_path_applies_everything_but_control_props() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("input").unwrap();
		let listener = Listener::new(|_| ());
		let props = props(&[
			("className", "big".into()),
			("checked", true.into()),
			("onChange", listener.clone().into()),
			("forceUpdate", true.into()),
		]);

		dom.clear_mutations();
		set_props(&mut dom, &node, &props).unwrap();

		assert_eq!(
			dom.mutations(),
			&[
				Mutation::SetAttribute { node, name: "class".to_owned(), value: "big".to_owned() },
				Mutation::SetBooleanProperty { node, name: "checked".to_owned(), value: true },
				Mutation::AddListener { node, event: "change".to_owned() },
			]
		);
		assert_eq!(dom.attribute(node, "class"), Some("big"));
		assert_eq!(dom.listener_count(node, "change"), 1);
		assert_eq!(dom.attribute(node, "forceUpdate"), None);
	}

	#[test]
	fn falsy_boolean_on_set_path_leaves_attribute_alone() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("input").unwrap();
		dom.clear_mutations();

		set_prop(&mut dom, &node, "disabled", &false.into()).unwrap();

		assert_eq!(dom.mutations(), &[Mutation::SetBooleanProperty { node, name: "disabled".to_owned(), value: false }]);
		assert_eq!(dom.attribute(node, "disabled"), None);
		assert_eq!(dom.boolean_property(node, "disabled"), Some(false));
	}

	#[test]
	fn only_changed_attributes_are_written() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("div").unwrap();
		let old = props(&[("id", "a".into()), ("className", "x".into())]);
		let new = props(&[("id", "a".into()), ("className", "y".into())]);
		set_props(&mut dom, &node, &old).unwrap();
		dom.clear_mutations();

		update_props(&mut dom, &node, &new, &old).unwrap();

		assert_eq!(dom.mutations(), &[Mutation::SetAttribute { node, name: "class".to_owned(), value: "y".to_owned() }]);
		assert_eq!(dom.attribute(node, "id"), Some("a"));
	}

	#[test]
	fn absent_props_are_removed_by_old_type() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("input").unwrap();
		let old = props(&[("className", "x".into()), ("title", "t".into()), ("checked", true.into())]);
		set_props(&mut dom, &node, &old).unwrap();
		dom.clear_mutations();

		update_props(&mut dom, &node, &Props::new(), &old).unwrap();

		assert_eq!(
			dom.mutations(),
			&[
				Mutation::RemoveAttribute { node, name: "class".to_owned() },
				Mutation::RemoveAttribute { node, name: "title".to_owned() },
				Mutation::RemoveAttribute { node, name: "checked".to_owned() },
				Mutation::SetBooleanProperty { node, name: "checked".to_owned(), value: false },
			]
		);
	}

	#[test]
	fn boolean_flag_round_trip() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("input").unwrap();
		let on = props(&[("checked", true.into())]);
		let off = props(&[("checked", false.into())]);

		set_props(&mut dom, &node, &on).unwrap();
		assert_eq!(dom.attribute(node, "checked"), Some("true"));
		assert_eq!(dom.boolean_property(node, "checked"), Some(true));

		update_props(&mut dom, &node, &off, &on).unwrap();
		assert_eq!(dom.attribute(node, "checked"), None);
		assert_eq!(dom.boolean_property(node, "checked"), Some(false));

		update_props(&mut dom, &node, &on, &off).unwrap();
		assert_eq!(dom.attribute(node, "checked"), Some("true"));
		assert_eq!(dom.boolean_property(node, "checked"), Some(true));
	}

	#[test]
	fn empty_string_is_present() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("div").unwrap();
		let old = props(&[("title", "t".into())]);
		let new = props(&[("title", "".into())]);
		set_props(&mut dom, &node, &old).unwrap();
		dom.clear_mutations();

		update_props(&mut dom, &node, &new, &old).unwrap();

		assert_eq!(dom.mutations(), &[Mutation::SetAttribute { node, name: "title".to_owned(), value: String::new() }]);
		assert_eq!(dom.attribute(node, "title"), Some(""));
	}

	#[test]
	fn misplaced_listener_is_skipped_both_ways() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("div").unwrap();
		let old = props(&[("click", Listener::new(|_| ()).into())]);
		dom.clear_mutations();

		set_props(&mut dom, &node, &old).unwrap();
		update_props(&mut dom, &node, &Props::new(), &old).unwrap();

		assert!(dom.mutations().is_empty());
		assert_eq!(dom.listener_count(node, "click"), 0);
	}

	#[test]
	fn listeners_are_not_rediffed() {
		let mut dom = MemoryDom::new();
		let node = dom.create_container("button").unwrap();
		let old = props(&[("onClick", Listener::new(|_| ()).into())]);
		let new = props(&[("onClick", Listener::new(|_| ()).into())]);
		set_props(&mut dom, &node, &old).unwrap();
		dom.clear_mutations();

		update_props(&mut dom, &node, &new, &old).unwrap();
		update_props(&mut dom, &node, &Props::new(), &old).unwrap();

		assert!(dom.mutations().is_empty());
		assert_eq!(dom.listener_count(node, "click"), 1);
	}
}
