//! Logging abstraction layer for polymer-dom
//!
//! The macros log to the browser console on WASM and to `tracing` everywhere
//! else. All of them are no-ops in release builds.
//!
//! ## Macro Overview
//!
//! | Macro | Debug Assertions | Feature Required | WASM | Non-WASM |
//! |-------|------------------|------------------|------|----------|
//! | `debug_log!` | Required | `debug-log` | `console.debug` | `tracing::debug!` |
//! | `info_log!` | Required | None | `console.info` | `tracing::info!` |
//! | `warn_log!` | Required | None | `console.warn` | `tracing::warn!` |
//! | `error_log!` | Required | None | `console.error` | `tracing::error!` |
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::{debug_log, warn_log};
//!
//! debug_log!("wrapping <{}>", tag);
//! warn_log!("dropping `{}` event: receiver is gone", event);
//! ```

/// Logs a debug message (requires `debug-log` feature + `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-log", target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		web_sys::console::debug_1(&format!($($arg)*).into());
	}};
}

/// Logs a debug message (requires `debug-log` feature + `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-log", not(target_arch = "wasm32")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		tracing::debug!("{}", format!($($arg)*));
	}};
}

/// No-op debug_log when conditions are not met
#[macro_export]
#[cfg(not(all(debug_assertions, feature = "debug-log")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message (requires `debug_assertions`)
///
/// # Example
///
/// ```ignore
/// info_log!("DomApi marker established from `{}`", global);
/// ```
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		web_sys::console::info_1(&format!($($arg)*).into());
	}};
}

/// Logs an info message (requires `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		tracing::info!("{}", format!($($arg)*));
	}};
}

/// No-op info_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! info_log {
	($($arg:tt)*) => {{}};
}

/// Logs a warning message (requires `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		web_sys::console::warn_1(&format!($($arg)*).into());
	}};
}

/// Logs a warning message (requires `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		tracing::warn!("{}", format!($($arg)*));
	}};
}

/// No-op warn_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! warn_log {
	($($arg:tt)*) => {{}};
}

/// Logs an error message (requires `debug_assertions`)
///
/// Used right before the abort-category panics so the cause reaches the
/// console even without a panic hook.
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		web_sys::console::error_1(&format!($($arg)*).into());
	}};
}

/// Logs an error message (requires `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		tracing::error!("{}", format!($($arg)*));
	}};
}

/// No-op error_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! error_log {
	($($arg:tt)*) => {{}};
}
