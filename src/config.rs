//! Binding configuration.
//!
//! [`BindingConfig`] names the global the framework lives under, the `is`
//! identifiers that mark binding templates, and whether geometry reads flush
//! pending DOM changes first. It is installed once through
//! [`DomApi::init_with`](crate::DomApi::init_with).
//!
//! ## Example
//!
//! ```ignore
//! use polymer_dom::{BindingConfig, DomApi};
//!
//! let config = BindingConfig::from_json(r#"{ "flush_before_layout": true }"#)?;
//! DomApi::init_with(config)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PolymerError, PolymerResult};

/// Global name the Polymer shim installs itself under.
pub const DEFAULT_POLYMER_GLOBAL: &str = "Polymer";

/// `is` attribute value of the Go-style auto-binding template.
pub const AUTO_BIND_GO: &str = "dom-bind-go";

/// Configuration of the binding layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
	/// Global object that carries `dom`, `dom.flush` and `DomApi`
	pub polymer_global: String,
	/// `is` identifiers of `<template>` elements that wrap as
	/// [`AutoBindGoTemplate`](crate::AutoBindGoTemplate)
	pub bind_templates: Vec<String>,
	/// Flush pending DOM changes before every geometry read
	pub flush_before_layout: bool,
}

impl Default for BindingConfig {
	fn default() -> Self {
		Self {
			polymer_global: DEFAULT_POLYMER_GLOBAL.to_string(),
			bind_templates: vec![AUTO_BIND_GO.to_string()],
			flush_before_layout: false,
		}
	}
}

impl BindingConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from JSON; missing fields take their defaults.
	pub fn from_json(json: &str) -> PolymerResult<Self> {
		let config: Self = serde_json::from_str(json)
			.map_err(|e| PolymerError::InvalidConfiguration(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Sets the framework global name.
	pub fn with_polymer_global(mut self, global: impl Into<String>) -> Self {
		self.polymer_global = global.into();
		self
	}

	/// Adds a binding-template identifier.
	pub fn with_bind_template(mut self, identifier: impl Into<String>) -> Self {
		let identifier = identifier.into();
		if !self.bind_templates.contains(&identifier) {
			self.bind_templates.push(identifier);
		}
		self
	}

	/// Sets whether geometry reads flush first.
	pub fn with_flush_before_layout(mut self, flush: bool) -> Self {
		self.flush_before_layout = flush;
		self
	}

	/// Returns true if `identifier` marks a binding template.
	pub fn is_bind_template(&self, identifier: &str) -> bool {
		self.bind_templates.iter().any(|known| known == identifier)
	}

	/// Checks that the configuration can be used.
	pub fn validate(&self) -> PolymerResult<()> {
		if self.polymer_global.trim().is_empty() {
			return Err(PolymerError::InvalidConfiguration(
				"polymer_global must not be empty".to_string(),
			));
		}
		if let Some(position) = self
			.bind_templates
			.iter()
			.position(|identifier| identifier.trim().is_empty())
		{
			return Err(PolymerError::InvalidConfiguration(format!(
				"bind_templates[{}] must not be empty",
				position
			)));
		}
		Ok(())
	}
}
