use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ModelError, PluginCategory, PluginConfiguration, Result};

/// Kind of component a directory entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
	/// Interactive UI entry point.
	Activity,
	/// Event receiver invoked per request.
	Receiver,
	/// Long-lived background service.
	Service,
}

impl ComponentKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Activity => "activity",
			Self::Receiver => "receiver",
			Self::Service => "service",
		}
	}
}

/// Derives the registry key for a plugin.
///
/// The key is stable across rescans as long as the owning package and the
/// editor component keep their identifiers.
pub fn registry_name(package_name: &str, editor_component: &str) -> String {
	format!("{package_name}:{editor_component}")
}

/// A discovered plugin.
///
/// Two plugins with the same category and registry name denote the same
/// plugin instance across rescans, even when other fields differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PluginWire", into = "PluginWire")]
pub struct Plugin {
	category: PluginCategory,
	package_name: String,
	editor_component: String,
	executor_kind: ComponentKind,
	executor_component: String,
	version_code: i64,
	configuration: PluginConfiguration,
	registry_name: String,
}

impl Plugin {
	/// Builds a plugin, rejecting empty identifiers.
	pub fn new(
		category: PluginCategory,
		package_name: impl Into<String>,
		editor_component: impl Into<String>,
		executor_kind: ComponentKind,
		executor_component: impl Into<String>,
		version_code: i64,
		configuration: PluginConfiguration,
	) -> Result<Self> {
		let package_name = package_name.into();
		let editor_component = editor_component.into();
		let executor_component = executor_component.into();

		if package_name.is_empty() {
			return Err(ModelError::EmptyField("package name"));
		}
		if editor_component.is_empty() {
			return Err(ModelError::EmptyField("editor component"));
		}
		if executor_component.is_empty() {
			return Err(ModelError::EmptyField("executor component"));
		}

		let registry_name = registry_name(&package_name, &editor_component);
		Ok(Self {
			category,
			package_name,
			editor_component,
			executor_kind,
			executor_component,
			version_code,
			configuration,
			registry_name,
		})
	}

	pub fn category(&self) -> PluginCategory {
		self.category
	}

	pub fn package_name(&self) -> &str {
		&self.package_name
	}

	/// Fully-qualified identifier of the UI entry point.
	pub fn editor_component(&self) -> &str {
		&self.editor_component
	}

	pub fn executor_kind(&self) -> ComponentKind {
		self.executor_kind
	}

	/// Fully-qualified identifier of the component invoked to run the plugin.
	pub fn executor_component(&self) -> &str {
		&self.executor_component
	}

	pub fn version_code(&self) -> i64 {
		self.version_code
	}

	pub fn configuration(&self) -> &PluginConfiguration {
		&self.configuration
	}

	/// Primary key across both category maps.
	pub fn registry_name(&self) -> &str {
		&self.registry_name
	}

	/// Encodes this plugin for cross-process transport.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_allocvec(self)?)
	}

	/// Decodes a plugin produced by [`Self::to_bytes`].
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}
}

impl fmt::Display for Plugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} (v{})", self.category, self.registry_name, self.version_code)
	}
}

/// Wire layout in fixed field order. The registry name is derived, never sent.
#[derive(Serialize, Deserialize)]
struct PluginWire {
	category: PluginCategory,
	package_name: String,
	editor_component: String,
	executor_kind: ComponentKind,
	executor_component: String,
	version_code: i64,
	configuration: PluginConfiguration,
}

impl TryFrom<PluginWire> for Plugin {
	type Error = ModelError;

	fn try_from(wire: PluginWire) -> Result<Self> {
		Plugin::new(
			wire.category,
			wire.package_name,
			wire.editor_component,
			wire.executor_kind,
			wire.executor_component,
			wire.version_code,
			wire.configuration,
		)
	}
}

impl From<Plugin> for PluginWire {
	fn from(plugin: Plugin) -> Self {
		Self {
			category: plugin.category,
			package_name: plugin.package_name,
			editor_component: plugin.editor_component,
			executor_kind: plugin.executor_kind,
			executor_component: plugin.executor_component,
			version_code: plugin.version_code,
			configuration: plugin.configuration,
		}
	}
}
