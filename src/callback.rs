//! Callback types and event sink conversion traits.
//!
//! This module provides the cloneable [`Callback`] wrapper and the
//! [`IntoEventSink`] trait for turning closures, callbacks and channel
//! senders into an [`EventSink`].
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::Callback;
//!
//! let on_select = Callback::new(|index: u32| {
//!     debug_log!("selected {}", index);
//! });
//! let subscription = menu.subscribe_event("iron-select", on_select.clone());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::mpsc::UnboundedSender;

use crate::event::EventSink;
use crate::warn_log;

/// A cloneable callback wrapper.
///
/// `Callback` wraps a function in an `Rc`, so clones share one closure.
pub struct Callback<Args, Ret = ()> {
	inner: Rc<dyn Fn(Args) -> Ret + 'static>,
}

impl<Args, Ret> Callback<Args, Ret> {
	/// Creates a new Callback from a function or closure.
	///
	/// # Example
	///
	/// ```ignore
	/// let handler = Callback::new(|detail: serde_json::Value| {
	///     // Handle detail
	/// });
	/// ```
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Args) -> Ret + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Calls the callback with the given arguments.
	pub fn call(&self, args: Args) -> Ret {
		(self.inner)(args)
	}
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<Args, Ret> std::fmt::Debug for Callback<Args, Ret> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Callback")
			.field("inner", &"<function>")
			.finish()
	}
}

/// Trait for converting event targets of various kinds into an [`EventSink`].
///
/// This trait is implemented for:
/// - Closures taking the decoded payload
/// - [`Callback<T>`]
/// - [`UnboundedSender<T>`]
/// - [`EventSink<T>`] (identity conversion)
///
/// Which kind a subscription gets is fixed by the argument's type.
pub trait IntoEventSink<T> {
	/// Converts self into an [`EventSink`].
	fn into_event_sink(self) -> EventSink<T>;
}

/// Blanket implementation for closures taking the decoded payload.
///
/// A closure that re-enters itself (dispatching the same event from inside
/// its own handler) skips the nested delivery.
impl<T, F> IntoEventSink<T> for F
where
	F: FnMut(T) + 'static,
{
	fn into_event_sink(self) -> EventSink<T> {
		let cell = RefCell::new(self);
		EventSink::Callback(Callback::new(move |value: T| match cell.try_borrow_mut() {
			Ok(mut f) => (*f)(value),
			Err(_) => warn_log!("Skipping re-entrant event callback"),
		}))
	}
}

/// Implementation for Callback type.
impl<T> IntoEventSink<T> for Callback<T, ()> {
	fn into_event_sink(self) -> EventSink<T> {
		EventSink::Callback(self)
	}
}

/// Implementation for channel senders.
impl<T> IntoEventSink<T> for UnboundedSender<T> {
	fn into_event_sink(self) -> EventSink<T> {
		EventSink::Channel(self)
	}
}

/// Identity implementation for EventSink.
impl<T> IntoEventSink<T> for EventSink<T> {
	fn into_event_sink(self) -> EventSink<T> {
		self
	}
}

/// Convenience function for converting sinks in generic code.
pub fn into_event_sink<T, S: IntoEventSink<T>>(sink: S) -> EventSink<T> {
	sink.into_event_sink()
}
