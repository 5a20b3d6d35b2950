//! Registry configuration and the change-notification channel it derives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base action id of the change notification.
pub const DEFAULT_CHANGE_ACTION: &str = "plugreg.intent.action.PLUGIN_REGISTRY_CHANGED";
/// Host package used when none is configured.
pub const DEFAULT_HOST_PACKAGE: &str = "plugreg.host";
/// Name of the registry worker thread.
pub const DEFAULT_WORKER_THREAD_NAME: &str = "plugin-registry";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or an unknown key.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Settings for one registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Package of the hosting application. Scopes the notification permission.
	pub host_package: String,
	/// Base action id of the change notification.
	pub change_action: String,
	/// Per-instance suffix of the action id. Defaults to the process id.
	pub instance_suffix: Option<String>,
	pub worker_thread_name: String,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			host_package: DEFAULT_HOST_PACKAGE.to_string(),
			change_action: DEFAULT_CHANGE_ACTION.to_string(),
			instance_suffix: None,
			worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
		}
	}
}

impl RegistryConfig {
	/// Parses a configuration from TOML text. Missing keys take their defaults.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	/// Derives the change-notification channel for this instance.
	pub fn change_channel(&self) -> ChangeChannel {
		let suffix = match &self.instance_suffix {
			Some(suffix) => suffix.clone(),
			None => std::process::id().to_string(),
		};
		ChangeChannel {
			action: format!("{}:{suffix}", self.change_action),
			permission: format!("{}.permission.internal", self.host_package),
		}
	}
}

/// Identity of the "registry changed" signal.
///
/// The signal carries no payload. Receivers re-read the registry when they
/// care about its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeChannel {
	action: String,
	permission: String,
}

impl ChangeChannel {
	/// Action id, scoped to one registry instance.
	pub fn action(&self) -> &str {
		&self.action
	}

	/// Permission a receiver must hold to observe the signal.
	pub fn permission(&self) -> &str {
		&self.permission
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let config = RegistryConfig::from_toml_str("").unwrap();
		assert_eq!(config, RegistryConfig::default());
	}

	#[test]
	fn channel_is_scoped_by_suffix_and_host() {
		let config = RegistryConfig::from_toml_str(
			r#"
host_package = "com.example.host"
instance_suffix = "7"
"#,
		)
		.unwrap();
		let channel = config.change_channel();
		assert_eq!(channel.action(), "plugreg.intent.action.PLUGIN_REGISTRY_CHANGED:7");
		assert_eq!(channel.permission(), "com.example.host.permission.internal");
	}

	#[test]
	fn default_suffix_is_process_id() {
		let channel = RegistryConfig::default().change_channel();
		assert!(channel.action().ends_with(&format!(":{}", std::process::id())));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let err = RegistryConfig::from_toml_str("worker_threads = 4").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[test]
	fn load_reports_missing_file_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing.toml");
		match RegistryConfig::load(&path) {
			Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected I/O error, got {other:?}"),
		}
	}

	#[test]
	fn load_reads_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("registry.toml");
		std::fs::write(&path, "worker_thread_name = \"plugins\"\n").unwrap();
		let config = RegistryConfig::load(&path).unwrap();
		assert_eq!(config.worker_thread_name, "plugins");
		assert_eq!(config.change_action, DEFAULT_CHANGE_ACTION);
	}
}
