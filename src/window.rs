//! Window facade

use serde::de::DeserializeOwned;

use crate::callback::IntoEventSink;
use crate::document::Document;
use crate::dom_api::DomApi;
use crate::event::{EventSubscription, subscribe};
use crate::host::{DomHost, Host, RawEventTarget};

/// The global window.
#[derive(Debug, Clone)]
pub struct Window {
	target: RawEventTarget,
	api: DomApi,
}

impl Window {
	/// The window of the current page.
	///
	/// # Panics
	///
	/// Panics if the shim has not loaded yet.
	pub fn current() -> Self {
		Self::with_api(DomApi::current())
	}

	pub(crate) fn with_api(api: DomApi) -> Self {
		Self {
			target: Host::window_target(),
			api,
		}
	}

	/// The window's document.
	pub fn document(&self) -> Document {
		Document::with_api(self.api.clone())
	}

	/// Subscribes `sink` to `event` on the window.
	///
	/// # Panics
	///
	/// The listener panics when a payload does not decode into `T`.
	pub fn subscribe_event<T, S>(&self, event: &str, sink: S) -> EventSubscription
	where
		T: DeserializeOwned + 'static,
		S: IntoEventSink<T>,
	{
		subscribe(self.target.clone(), event, sink)
	}

	/// Removes the listener and closes the channel, if any.
	pub fn unsubscribe_event(&self, subscription: EventSubscription) {
		subscription.unsubscribe();
	}

	/// `Polymer.dom.flush()`
	pub fn flush(&self) {
		self.api.flush();
	}
}

/// The window of the current page, see [`Window::current`].
pub fn window() -> Window {
	Window::current()
}
