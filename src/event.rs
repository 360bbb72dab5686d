//! Event subscription
//!
//! `subscribe_event::<T>(name, sink)` registers a native listener whose
//! payload (the `detail` of a `CustomEvent`, the event object otherwise) is
//! decoded into `T` and handed to the sink: one callback call or one channel
//! send per native event. The sink kind is fixed at compile time through
//! [`IntoEventSink`].
//!
//! A payload that does not decode into `T` is a programming error and
//! panics at delivery time.
//!
//! ## Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use polymer_dom::{event_channel, window};
//!
//! let (tx, mut rx) = event_channel::<Resize>();
//! let subscription = window().subscribe_event("iron-resize", tx);
//! while let Some(resize) = rx.next().await {
//!     // ...
//! }
//! // Removes the listener and closes the channel.
//! subscription.unsubscribe();
//! ```

use std::fmt;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::de::DeserializeOwned;

use crate::callback::{Callback, IntoEventSink};
use crate::element::WrappedElement;
use crate::error::PolymerError;
use crate::host::{DomHost, EventPayload, Host, Listener, RawEventTarget};
use crate::{debug_log, error_log, warn_log};

/// Where decoded event payloads go.
pub enum EventSink<T> {
	/// Called once per event
	Callback(Callback<T>),
	/// Receives one message per event
	Channel(UnboundedSender<T>),
}

impl<T> EventSink<T> {
	/// Returns true for channel-backed sinks.
	pub fn is_channel(&self) -> bool {
		matches!(self, Self::Channel(_))
	}

	pub(crate) fn deliver(&self, event: &str, value: T) {
		match self {
			Self::Callback(callback) => callback.call(value),
			Self::Channel(sender) => {
				if sender.unbounded_send(value).is_err() {
					warn_log!("Dropping `{}` payload: the receiver is gone", event);
				}
			}
		}
	}
}

impl<T> Clone for EventSink<T> {
	fn clone(&self) -> Self {
		match self {
			Self::Callback(callback) => Self::Callback(callback.clone()),
			Self::Channel(sender) => Self::Channel(sender.clone()),
		}
	}
}

impl<T> fmt::Debug for EventSink<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Callback(callback) => f.debug_tuple("Callback").field(callback).finish(),
			Self::Channel(sender) => f
				.debug_tuple("Channel")
				.field(&if sender.is_closed() { "closed" } else { "open" })
				.finish(),
		}
	}
}

/// Creates an unbounded channel for channel-backed subscriptions.
pub fn event_channel<T>() -> (UnboundedSender<T>, UnboundedReceiver<T>) {
	mpsc::unbounded()
}

/// A registered event listener.
///
/// Dropping the subscription or calling [`unsubscribe`](Self::unsubscribe)
/// removes the listener and, for channel-backed subscriptions, closes the
/// channel.
#[must_use = "dropping an EventSubscription removes the listener"]
pub struct EventSubscription {
	event: String,
	target: RawEventTarget,
	listener: Option<Listener>,
	closer: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for EventSubscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventSubscription")
			.field("event", &self.event)
			.field("target", &self.target)
			.field("active", &self.listener.is_some())
			.field("channel", &self.closer.is_some())
			.finish()
	}
}

impl EventSubscription {
	/// Event name the listener is registered for.
	pub fn event(&self) -> &str {
		&self.event
	}

	/// Returns true if the subscription feeds a channel.
	pub fn is_channel(&self) -> bool {
		self.closer.is_some()
	}

	/// Removes the listener and closes the channel, if any.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Keeps the listener registered for the life of the page.
	///
	/// The channel of a channel-backed subscription stays open.
	pub fn forget(mut self) {
		if let Some(listener) = self.listener.take() {
			Host::forget_listener(listener);
		}
		self.closer = None;
	}

	fn release(&mut self) {
		if let Some(listener) = self.listener.take() {
			Host::remove_event_listener(&self.target, &self.event, listener);
			debug_log!("Removed `{}` listener", self.event);
		}
		if let Some(close) = self.closer.take() {
			close();
		}
	}
}

impl Drop for EventSubscription {
	fn drop(&mut self) {
		self.release();
	}
}

/// Registers a listener for `event` on `target` feeding `sink`.
pub(crate) fn subscribe<T, S>(target: RawEventTarget, event: &str, sink: S) -> EventSubscription
where
	T: DeserializeOwned + 'static,
	S: IntoEventSink<T>,
{
	let sink = sink.into_event_sink();
	let closer = match &sink {
		EventSink::Channel(sender) => {
			let sender = sender.clone();
			Some(Box::new(move || sender.close_channel()) as Box<dyn FnOnce()>)
		}
		EventSink::Callback(_) => None,
	};
	let name = event.to_string();
	let handler = move |payload: EventPayload| match Host::decode_payload::<T>(&payload) {
		Ok(value) => sink.deliver(&name, value),
		Err(message) => {
			let err = PolymerError::Decode {
				event: name.clone(),
				target: std::any::type_name::<T>(),
				message,
			};
			error_log!("{}", err);
			panic!("{}", err);
		}
	};
	let listener = Host::add_event_listener(&target, event, Box::new(handler));
	debug_log!("Subscribed to `{}`", event);
	EventSubscription {
		event: event.to_string(),
		target,
		listener: Some(listener),
		closer,
	}
}

impl WrappedElement {
	/// Subscribes `sink` to `event` on this element.
	///
	/// # Panics
	///
	/// The listener panics when a payload does not decode into `T`.
	pub fn subscribe_event<T, S>(&self, event: &str, sink: S) -> EventSubscription
	where
		T: DeserializeOwned + 'static,
		S: IntoEventSink<T>,
	{
		subscribe(Host::node_target(self.unwrapped()), event, sink)
	}

	/// Removes the listener and closes the channel, if any.
	pub fn unsubscribe_event(&self, subscription: EventSubscription) {
		subscription.unsubscribe();
	}
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use super::*;
	use crate::host::headless;
	use futures::channel::mpsc::TryRecvError;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_event_sink_debug_shows_channel_state() {
		let (tx, rx) = event_channel::<u32>();
		let sink = EventSink::Channel(tx);
		assert!(format!("{:?}", sink).contains("open"));

		drop(rx);
		assert!(format!("{:?}", sink).contains("closed"));
	}

	#[rstest]
	fn test_subscription_on_raw_target() {
		headless::reset();
		let target = headless::window_target();
		let (tx, mut rx) = event_channel::<serde_json::Value>();

		let subscription = subscribe(target.clone(), "resize", tx);
		assert!(format!("{:?}", subscription).contains("resize"));
		headless::dispatch_event(&target, "resize", json!({ "width": 10 }));
		drop(subscription);

		assert_eq!(rx.try_recv(), Ok(json!({ "width": 10 })));
		assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
		assert_eq!(headless::listener_count(&target), 0);
	}
}
