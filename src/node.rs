//! The virtual tree: cheap, immutable descriptions of what the live tree should look like.

use core::{
	any::Any,
	fmt::{self, Debug, Formatter},
	hash::{Hash, Hasher},
};
use indexmap::IndexMap;
use std::rc::Rc;

/// Declared properties of an [`Element`], in declaration order.
///
/// Mutations are issued in this order, which keeps them deterministic.
pub type Props = IndexMap<String, PropValue>;

/// A node of the virtual tree.
///
/// Children have no keys. Their position **is** their identity.
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualNode {
	Text(String),
	Element(Element),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
	pub tag: String,
	pub props: Props,
	pub children: Vec<VirtualNode>,
}

/// The value of a single declared property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
	Str(String),
	Bool(bool),
	Listener(Listener),
}

impl PropValue {
	/// `false` for `Bool(false)` and empty strings.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			PropValue::Str(value) => !value.is_empty(),
			PropValue::Bool(value) => *value,
			PropValue::Listener(_) => true,
		}
	}
}

impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		PropValue::Str(value.to_owned())
	}
}

impl From<String> for PropValue {
	fn from(value: String) -> Self {
		PropValue::Str(value)
	}
}

impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		PropValue::Bool(value)
	}
}

impl From<Listener> for PropValue {
	fn from(listener: Listener) -> Self {
		PropValue::Listener(listener)
	}
}

/// A shared event handler.
///
/// Two [`Listener`]s are equal only if they are clones of the same handler.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
	pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &Event) {
		(self.0)(event)
	}

	fn address(&self) -> *const u8 {
		Rc::as_ptr(&self.0).cast::<u8>()
	}
}

impl PartialEq for Listener {
	fn eq(&self, other: &Self) -> bool {
		self.address() == other.address()
	}
}
impl Eq for Listener {}

impl Hash for Listener {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.address().hash(state)
	}
}

impl Debug for Listener {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Listener").field(&self.address()).finish()
	}
}

/// What a [`Listener`] receives.
///
/// Backends may attach their native event object as payload.
pub struct Event {
	name: String,
	payload: Option<Box<dyn Any>>,
}

impl Event {
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), payload: None }
	}

	#[must_use]
	pub fn with_payload(mut self, payload: impl Any) -> Self {
		self.payload = Some(Box::new(payload));
		self
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.payload.as_deref().and_then(|payload| payload.downcast_ref::<T>())
	}
}

impl Debug for Event {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event").field("name", &self.name).field("has_payload", &self.payload.is_some()).finish()
	}
}

impl VirtualNode {
	#[must_use]
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			VirtualNode::Element(element) => Some(element),
			VirtualNode::Text(_) => None,
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			VirtualNode::Text(text) => Some(text),
			VirtualNode::Element(_) => None,
		}
	}
}

impl From<&str> for VirtualNode {
	fn from(text: &str) -> Self {
		VirtualNode::Text(text.to_owned())
	}
}

impl From<String> for VirtualNode {
	fn from(text: String) -> Self {
		VirtualNode::Text(text)
	}
}

impl From<Element> for VirtualNode {
	fn from(element: Element) -> Self {
		VirtualNode::Element(element)
	}
}

impl Element {
	#[must_use]
	pub fn new(tag: impl Into<String>) -> Self {
		Self { tag: tag.into(), props: Props::new(), children: Vec::new() }
	}

	#[must_use]
	pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.props.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn with_child(mut self, child: impl Into<VirtualNode>) -> Self {
		self.children.push(child.into());
		self
	}
}

/// Builds an element node. Omitted props default to an empty map.
///
/// ```
/// use twig_dom::node::{h, VirtualNode};
///
/// let list = h("ul", None, vec!["item 1".into(), h("li", None, vec!["item 2".into()])]);
/// assert!(matches!(list, VirtualNode::Element(ref e) if e.children.len() == 2));
/// ```
#[must_use]
pub fn h(tag: impl Into<String>, props: Option<Props>, children: Vec<VirtualNode>) -> VirtualNode {
	VirtualNode::Element(Element {
		tag: tag.into(),
		props: props.unwrap_or_default(),
		children,
	})
}

#[must_use]
pub fn text(value: impl Into<String>) -> VirtualNode {
	VirtualNode::Text(value.into())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn omitted_props_are_empty() {
		match h("div", None, vec![]) {
			VirtualNode::Element(element) => {
				assert!(element.props.is_empty());
				assert!(element.children.is_empty());
			}
			VirtualNode::Text(_) => panic!("expected an element"),
		}
	}

	#[test]
	fn listener_equality_is_identity() {
		let a = Listener::new(|_| ());
		let b = Listener::new(|_| ());
		assert_eq!(a, a.clone());
		assert_ne!(a, b);
	}

	#[test]
	fn truthiness() {
		assert!(!PropValue::from("").is_truthy());
		assert!(PropValue::from("x").is_truthy());
		assert!(!PropValue::from(false).is_truthy());
		assert!(PropValue::from(Listener::new(|_| ())).is_truthy());
	}

	#[test]
	fn event_payload_downcasts() {
		let event = Event::new("click").with_payload(7_u8);
		assert_eq!(event.name(), "click");
		assert_eq!(event.downcast_ref::<u8>(), Some(&7));
		assert_eq!(event.downcast_ref::<u16>(), None);
	}
}
