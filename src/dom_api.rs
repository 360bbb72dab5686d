//! Wrapping resolution
//!
//! [`DomApi`] is the capability handle for the Polymer shim: it holds the
//! `Polymer.DomApi` marker and the active [`BindingConfig`]. It is
//! established at most once per thread, explicitly through [`DomApi::init`] /
//! [`DomApi::init_with`] or lazily on first use, and cleared with
//! [`DomApi::teardown`].
//!
//! Whether a value still needs `Polymer.dom(..)` is decided by its type
//! through [`IntoElement`]. Only untyped boundary values
//! ([`HostValue`]) get the runtime `instanceof Polymer.DomApi` check.
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::{DomApi, wrap};
//!
//! DomApi::init()?;
//! let element = wrap(raw_node).expect("node is present");
//! assert_eq!(wrap(element.clone()), Some(element));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::BindingConfig;
use crate::element::{AutoBindGoTemplate, Element, WrappedElement};
use crate::error::{PolymerError, PolymerResult};
use crate::host::{ApiHandle, BoundaryValue, DomHost, Host, HostValue, Marker, RawNode};
use crate::node::Node;
use crate::{debug_log, error_log, info_log, warn_log};

thread_local! {
	static DOM_API: RefCell<Option<DomApi>> = const { RefCell::new(None) };
}

/// Capability handle for the Polymer shim
#[derive(Debug, Clone)]
pub struct DomApi {
	marker: Marker,
	config: Rc<BindingConfig>,
}

impl DomApi {
	/// Establishes the handle with the default configuration.
	///
	/// Returns the established handle if there already is one.
	pub fn init() -> PolymerResult<Self> {
		match Self::established() {
			Some(api) => Ok(api),
			None => Self::establish(BindingConfig::default()),
		}
	}

	/// Establishes the handle with `config`.
	///
	/// Returns the established handle if there already is one; a differing
	/// `config` is then ignored with a warning.
	pub fn init_with(config: BindingConfig) -> PolymerResult<Self> {
		config.validate()?;
		match Self::established() {
			Some(api) => {
				if *api.config != config {
					warn_log!(
						"DomApi is already established; ignoring configuration for `{}`",
						config.polymer_global
					);
				}
				Ok(api)
			}
			None => Self::establish(config),
		}
	}

	fn established() -> Option<Self> {
		DOM_API.with(|cell| cell.borrow().clone())
	}

	fn establish(config: BindingConfig) -> PolymerResult<Self> {
		let marker = Host::dom_api_marker(&config.polymer_global).ok_or_else(|| {
			PolymerError::NotInitialized {
				global: config.polymer_global.clone(),
			}
		})?;
		info_log!(
			"DomApi marker established from `{}.DomApi`",
			config.polymer_global
		);
		let api = Self {
			marker,
			config: Rc::new(config),
		};
		DOM_API.with(|cell| *cell.borrow_mut() = Some(api.clone()));
		Ok(api)
	}

	/// Returns the established handle, establishing it with the default
	/// configuration if needed.
	pub fn try_current() -> PolymerResult<Self> {
		Self::init()
	}

	/// Returns the established handle, establishing it with the default
	/// configuration if needed.
	///
	/// # Panics
	///
	/// Panics if the shim has not loaded yet (`Polymer.DomApi` is missing).
	pub fn current() -> Self {
		match Self::try_current() {
			Ok(api) => api,
			Err(err) => {
				error_log!("{}", err);
				panic!("{}", err);
			}
		}
	}

	/// Returns true if a handle is established on this thread.
	pub fn is_established() -> bool {
		DOM_API.with(|cell| cell.borrow().is_some())
	}

	/// Clears the established handle.
	pub fn teardown() {
		if DOM_API.with(|cell| cell.borrow_mut().take()).is_some() {
			debug_log!("DomApi torn down");
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &BindingConfig {
		&self.config
	}

	/// The `Polymer.DomApi` marker.
	pub fn marker(&self) -> &Marker {
		&self.marker
	}

	/// Returns true if `value` already is a `Polymer.dom` wrapper.
	pub fn is_wrapped(&self, value: &HostValue) -> bool {
		matches!(self.classify(value.clone()), BoundaryValue::Wrapped(_))
	}

	/// Wraps `value`, see [`IntoElement`].
	pub fn wrap<T: IntoElement>(&self, value: T) -> Option<Element> {
		value.into_element(self)
	}

	/// `Polymer.dom.flush()`
	pub fn flush(&self) {
		Host::flush(&self.config.polymer_global);
	}

	pub(crate) fn classify(&self, value: HostValue) -> BoundaryValue<RawNode, ApiHandle> {
		Host::classify(value, &self.marker)
	}

	/// Wraps a raw node through `Polymer.dom(node)`.
	///
	/// A failing `Polymer.dom` means the shim went away after the marker was
	/// read, which is the same fatal init-order error as a missing marker.
	pub(crate) fn wrap_raw(&self, node: RawNode) -> Element {
		match Host::polymer_dom(&self.config.polymer_global, &node) {
			Ok(dom) => self.type_element(WrappedElement::new(dom, node, self.clone())),
			Err(err) => {
				error_log!("{}", err);
				panic!("{}", err);
			}
		}
	}

	pub(crate) fn wrap_api(&self, dom: ApiHandle) -> Element {
		let node = Host::api_node(&dom);
		self.type_element(WrappedElement::new(dom, node, self.clone()))
	}

	pub(crate) fn wrap_all(&self, nodes: Vec<RawNode>) -> Vec<Element> {
		nodes.into_iter().map(|node| self.wrap_raw(node)).collect()
	}

	/// Picks the [`Element`] variant for an already wrapped element.
	pub(crate) fn type_element(&self, element: WrappedElement) -> Element {
		let is_bind_template = element.tag_name() == "TEMPLATE"
			&& element
				.get_attribute("is")
				.is_some_and(|is| self.config.is_bind_template(&is));
		if is_bind_template {
			debug_log!(
				"Wrapping binding template `{:?}`",
				element.get_attribute("is")
			);
			Element::AutoBindGo(AutoBindGoTemplate::new(element))
		} else {
			Element::Wrapped(element)
		}
	}
}

/// Values that resolve to an [`Element`].
///
/// The implementing type says whether `Polymer.dom(..)` still has to be
/// applied: an [`Element`] is returned as is, a raw node is wrapped once,
/// and an untyped [`HostValue`] is checked against the marker.
pub trait IntoElement {
	/// Resolves `self`; `None` for absent values.
	fn into_element(self, api: &DomApi) -> Option<Element>;
}

impl IntoElement for Element {
	fn into_element(self, _api: &DomApi) -> Option<Element> {
		Some(self)
	}
}

impl IntoElement for &Element {
	fn into_element(self, _api: &DomApi) -> Option<Element> {
		Some(self.clone())
	}
}

impl IntoElement for WrappedElement {
	fn into_element(self, api: &DomApi) -> Option<Element> {
		Some(api.type_element(self))
	}
}

impl IntoElement for RawNode {
	fn into_element(self, api: &DomApi) -> Option<Element> {
		Some(api.wrap_raw(self))
	}
}

impl IntoElement for &RawNode {
	fn into_element(self, api: &DomApi) -> Option<Element> {
		Some(api.wrap_raw(self.clone()))
	}
}

impl IntoElement for Node {
	fn into_element(self, api: &DomApi) -> Option<Element> {
		Some(api.wrap_raw(self.into_raw()))
	}
}

#[cfg(target_arch = "wasm32")]
impl IntoElement for web_sys::Element {
	fn into_element(self, api: &DomApi) -> Option<Element> {
		Some(api.wrap_raw(self.into()))
	}
}

impl IntoElement for HostValue {
	fn into_element(self, api: &DomApi) -> Option<Element> {
		match api.classify(self) {
			BoundaryValue::Missing => None,
			BoundaryValue::Wrapped(dom) => Some(api.wrap_api(dom)),
			BoundaryValue::Node(node) => Some(api.wrap_raw(node)),
			BoundaryValue::Other => {
				warn_log!("Cannot wrap a value that is not a DOM node");
				None
			}
		}
	}
}

impl<T: IntoElement> IntoElement for Option<T> {
	fn into_element(self, api: &DomApi) -> Option<Element> {
		self.and_then(|value| value.into_element(api))
	}
}

/// Wraps `value` with the established [`DomApi`].
///
/// # Panics
///
/// Panics if the shim has not loaded yet.
pub fn wrap<T: IntoElement>(value: T) -> Option<Element> {
	DomApi::current().wrap(value)
}

/// Flushes pending DOM changes (`Polymer.dom.flush()`).
///
/// Inserts, appends and removes are applied lazily in some cases; call this
/// before reading layout right after one of them.
pub fn flush_dom() {
	DomApi::current().flush();
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use super::*;
	use crate::host::headless;
	use rstest::rstest;

	#[rstest]
	fn test_init_is_established_once() {
		headless::reset();
		assert!(!DomApi::is_established());
		let first = DomApi::init().unwrap();
		let second =
			DomApi::init_with(BindingConfig::new().with_flush_before_layout(true)).unwrap();
		assert!(DomApi::is_established());
		assert_eq!(first.config(), second.config());
		assert!(!second.config().flush_before_layout);
	}

	#[rstest]
	fn test_init_without_shim_fails() {
		headless::reset();
		headless::uninstall_polymer();
		let err = DomApi::init().unwrap_err();
		assert_eq!(
			err,
			PolymerError::NotInitialized {
				global: "Polymer".to_string()
			}
		);
		assert!(!DomApi::is_established());
	}

	#[rstest]
	fn test_init_with_rejects_invalid_config() {
		headless::reset();
		let err = DomApi::init_with(BindingConfig::new().with_polymer_global("")).unwrap_err();
		assert!(matches!(err, PolymerError::InvalidConfiguration(_)));
	}

	#[rstest]
	#[should_panic(expected = "Polymer has not correctly initialized yet")]
	fn test_current_panics_without_shim() {
		headless::reset();
		headless::uninstall_polymer();
		let _ = DomApi::current();
	}

	#[rstest]
	fn test_teardown_allows_reinit_with_new_config() {
		headless::reset();
		DomApi::init().unwrap();
		DomApi::teardown();
		headless::install_polymer_as("PolymerNext");
		let api =
			DomApi::init_with(BindingConfig::new().with_polymer_global("PolymerNext")).unwrap();
		assert_eq!(api.config().polymer_global, "PolymerNext");
	}

	#[rstest]
	fn test_is_wrapped_checks_marker() {
		headless::reset();
		let api = DomApi::init().unwrap();
		let node = headless::NodeRef::element("div");
		assert!(api.is_wrapped(&headless::wrapped_value(&node)));
		assert!(!api.is_wrapped(&headless::node_value(&node)));
		assert!(!api.is_wrapped(&headless::null_value()));
	}
}
