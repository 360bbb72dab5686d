//! Error types for the Polymer bindings.
//!
//! Only two failure categories abort: a missing `Polymer.DomApi` marker
//! (the framework has not finished loading) and an event payload that does
//! not decode into the subscriber's declared type. Everything else is
//! returned as a [`PolymerError`].

use thiserror::Error;

/// Result type for Polymer binding operations
pub type PolymerResult<T> = Result<T, PolymerError>;

/// Errors raised by the binding layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolymerError {
	/// `<global>.DomApi` is absent, so the framework has not finished loading
	#[error("Polymer has not correctly initialized yet: `{global}.DomApi` is missing")]
	NotInitialized {
		/// Name of the global the framework was expected under.
		global: String,
	},

	/// The operation is deliberately not implemented
	#[error("Operation not supported: {operation}")]
	Unsupported {
		/// DOM name of the rejected operation.
		operation: &'static str,
	},

	/// An event payload did not decode into the subscriber's type
	#[error("Failed to decode `{event}` payload into `{target}`: {message}")]
	Decode {
		/// Event name the payload was delivered for.
		event: String,
		/// Rust type the payload was decoded into.
		target: &'static str,
		/// Decoder message.
		message: String,
	},

	/// The binding configuration is unusable
	#[error("Invalid binding configuration: {0}")]
	InvalidConfiguration(String),

	/// The host DOM rejected a call (bad selector, hierarchy error, ...)
	#[error("DOM operation `{operation}` failed: {message}")]
	Host {
		/// DOM name of the failing call.
		operation: &'static str,
		/// Message reported by the host.
		message: String,
	},
}

impl PolymerError {
	/// Create an unsupported-operation error
	pub fn unsupported(operation: &'static str) -> Self {
		Self::Unsupported { operation }
	}

	/// Create a host error
	pub fn host(operation: &'static str, message: impl Into<String>) -> Self {
		Self::Host {
			operation,
			message: message.into(),
		}
	}

	/// Returns true for errors that leave the page usable
	pub fn is_recoverable(&self) -> bool {
		!matches!(self, Self::NotInitialized { .. } | Self::Decode { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_not_initialized_message_names_global() {
		let err = PolymerError::NotInitialized {
			global: "Polymer".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Polymer has not correctly initialized yet: `Polymer.DomApi` is missing"
		);
	}

	#[rstest]
	#[case(PolymerError::unsupported("getElementsByTagNameNS"), true)]
	#[case(PolymerError::host("querySelector", "bad selector"), true)]
	#[case(PolymerError::InvalidConfiguration("empty".to_string()), true)]
	#[case(PolymerError::NotInitialized { global: "Polymer".to_string() }, false)]
	#[case(
		PolymerError::Decode {
			event: "tap".to_string(),
			target: "u32",
			message: "invalid type".to_string(),
		},
		false
	)]
	fn test_recoverable_categories(#[case] err: PolymerError, #[case] expected: bool) {
		assert_eq!(err.is_recoverable(), expected);
	}

	#[rstest]
	fn test_decode_message_names_event_and_type() {
		let err = PolymerError::Decode {
			event: "iron-select".to_string(),
			target: "alloc::string::String",
			message: "invalid type: integer `3`".to_string(),
		};
		let message = err.to_string();
		assert!(message.contains("iron-select"));
		assert!(message.contains("alloc::string::String"));
	}
}
