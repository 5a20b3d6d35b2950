//! Immutable value types for discovered plugins.
//!
//! Everything in this crate is a plain value: constructed once by the scanner,
//! compared structurally, and shared freely across threads through published
//! registry snapshots.

/// Plugin categories and their directory actions.
pub mod category;
/// Static compatibility flags attached to a plugin.
pub mod configuration;
/// Per-package change classification.
pub mod diff;
/// Model construction and decoding errors.
pub mod error;
/// The plugin value and its registry key.
pub mod plugin;
/// Scanner validation error kinds.
pub mod validation;

use std::collections::HashMap;

pub use category::PluginCategory;
pub use configuration::{ConfigFlags, PluginConfiguration};
pub use diff::DiffResult;
pub use error::{ModelError, Result};
pub use plugin::{ComponentKind, Plugin, registry_name};
pub use validation::ValidationError;

/// Plugins of one category keyed by registry name.
pub type PluginMap = HashMap<String, Plugin>;
