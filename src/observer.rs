//! Node observation (`observeNodes` / `unobserveNodes`).
//!
//! An observer on a `<content>` insertion point fires when its distributed
//! nodes change; on any other element it fires when the effective children
//! change. Each call receives one [`ObservationInfo`] with the nodes added
//! and removed in that batch. The first batch reports the nodes already
//! present as added.
//!
//! ## Example
//!
//! ```ignore
//! let observer = list.observe_nodes(|info| {
//!     for node in &info.added_nodes {
//!         debug_log!("added {}", node.node_name());
//!     }
//! });
//! // ...
//! list.unobserve_nodes(observer);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::element::{Element, WrappedElement};
use crate::host::{DomHost, Host, Observation};
use crate::node::{Node, nodes};
use crate::{debug_log, warn_log};

static NEXT_OBSERVER_ID: AtomicUsize = AtomicUsize::new(1);

/// Process-unique identifier of an [`Observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(usize);

impl ObserverId {
	fn next() -> Self {
		Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
	}

	/// Numeric value of the identifier.
	pub fn as_usize(&self) -> usize {
		self.0
	}
}

impl fmt::Display for ObserverId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "observer-{}", self.0)
	}
}

/// One batch of observed changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationInfo {
	/// Observer the batch is delivered to
	pub observer: ObserverId,
	/// Observed element
	pub target: Element,
	/// Nodes added in this batch
	pub added_nodes: Vec<Node>,
	/// Nodes removed in this batch
	pub removed_nodes: Vec<Node>,
}

/// A live node observation. Dropping it stops the observation.
#[must_use = "dropping an Observer stops the observation"]
pub struct Observer {
	id: ObserverId,
	element: Element,
	handle: Option<Observation>,
}

impl fmt::Debug for Observer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Observer")
			.field("id", &self.id)
			.field("element", &self.element)
			.field("active", &self.handle.is_some())
			.finish()
	}
}

impl Observer {
	/// Identifier passed in every [`ObservationInfo`].
	pub fn id(&self) -> ObserverId {
		self.id
	}

	/// Observed element.
	pub fn element(&self) -> &Element {
		&self.element
	}

	fn release(&mut self) {
		if let Some(handle) = self.handle.take() {
			Host::unobserve_nodes(self.element.dom(), handle);
			debug_log!("Released {}", self.id);
		}
	}
}

impl Drop for Observer {
	fn drop(&mut self) {
		self.release();
	}
}

impl WrappedElement {
	/// Starts observing this element's children, see the module docs.
	pub fn observe_nodes<F>(&self, mut callback: F) -> Observer
	where
		F: FnMut(&ObservationInfo) + 'static,
	{
		let id = ObserverId::next();
		let element = self.api().type_element(self.clone());
		let target = element.clone();
		let handle = Host::observe_nodes(
			self.dom(),
			Box::new(move |added, removed| {
				let info = ObservationInfo {
					observer: id,
					target: target.clone(),
					added_nodes: nodes(added),
					removed_nodes: nodes(removed),
				};
				callback(&info);
			}),
		);
		debug_log!("Registered {} on <{}>", id, self.tag_name());
		Observer {
			id,
			element,
			handle: Some(handle),
		}
	}

	/// Stops `observer`.
	pub fn unobserve_nodes(&self, mut observer: Observer) {
		if observer.element.as_wrapped() != self {
			warn_log!(
				"{} observes <{}>, not <{}>",
				observer.id,
				observer.element.tag_name(),
				self.tag_name()
			);
		}
		observer.release();
	}
}
