//! Polymer DOM - typed bindings for the Polymer local DOM
//!
//! Polymer components keep two trees: the light DOM the page author writes
//! and the local (shadow) DOM the component renders, with `<content>`
//! insertion points that pull light children into place. `Polymer.dom(node)`
//! is the shim that reads and mutates the logical tree across both. This
//! crate wraps that shim in Rust types.
//!
//! ## Architecture
//!
//! - [`dom_api`]: the capability handle and wrapping resolution
//! - [`window`], [`document`], [`element`]: the facade
//! - [`observer`]: `observeNodes` with RAII observers
//! - [`event`], [`callback`]: event subscription to callbacks or channels
//! - [`config`]: binding configuration
//! - [`host`]: the seam between the facade and the page
//!
//! On `wasm32` the host is the live browser page. On every other target it
//! is the headless host ([`headless`]), an in-memory page with the shim
//! installed, which the native test suite runs against.
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::{DomApi, document, window};
//!
//! DomApi::init()?;
//! let drawer = document()
//!     .get_element_by_id("drawer")?
//!     .expect("drawer is in the page");
//!
//! let observer = drawer.observe_nodes(|info| {
//!     debug_log!("{} nodes distributed", info.added_nodes.len());
//! });
//!
//! let subscription = window().subscribe_event("iron-resize", |size: Size| {
//!     debug_log!("resized to {}x{}", size.width, size.height);
//! });
//! ```
//!
//! ## Feature Flags
//!
//! - `console_error_panic_hook`: enables [`install_panic_hook`]
//! - `debug-log`: enables [`debug_log!`] output in debug builds

#![warn(missing_docs)]

pub mod callback;
pub mod config;
pub(crate) mod css;
pub mod document;
pub mod dom_api;
pub mod element;
pub mod error;
pub mod event;
pub mod host;
pub mod logging;
pub mod node;
pub mod observer;
pub mod window;

pub use callback::{Callback, IntoEventSink, into_event_sink};
pub use config::{AUTO_BIND_GO, BindingConfig, DEFAULT_POLYMER_GLOBAL};
pub use document::{Document, document};
pub use dom_api::{DomApi, IntoElement, flush_dom, wrap};
pub use element::{AutoBindGoTemplate, Element, WrappedElement};
pub use error::{PolymerError, PolymerResult};
pub use event::{EventSink, EventSubscription, event_channel};
pub use host::{ClientRect, HostValue, RawNode};
pub use node::{AsRawNode, Node, NodeKind};
pub use observer::{ObservationInfo, Observer, ObserverId};
pub use window::{Window, window};

#[cfg(not(target_arch = "wasm32"))]
pub use host::headless;

/// Routes panics to the browser console.
///
/// The two fatal errors of this crate (using the bindings before the shim
/// has loaded, and an event payload that does not decode) are panics; with
/// the hook installed their message shows up in the console instead of as
/// `unreachable executed`.
#[cfg(feature = "console_error_panic_hook")]
pub fn install_panic_hook() {
	console_error_panic_hook::set_once();
}
