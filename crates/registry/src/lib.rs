//! Live registry of third-party plugins.
//!
//! # Role
//!
//! Discovers plugin components exposed by installed packages, validates them,
//! and keeps a per-category map of valid plugins in sync with package
//! installs, removals and upgrades.
//!
//! # Structure
//!
//! - [`scanner`]: queries the component directory and validates candidates.
//! - [`diff`]: decides whether a per-package rescan added, removed or upgraded plugins.
//! - [`RegistryCore`]: working maps and per-message transitions.
//! - [`PluginRegistry`]: façade over a dedicated worker thread that owns the
//!   core, with blocking and non-blocking reads of published snapshots.
//!
//! # Invariants
//!
//! - Working maps are only mutated on the registry worker thread.
//! - A published snapshot never changes; every change publishes a new one.
//! - [`PluginRegistry::get_plugin_map`] returns only after the initial load,
//!   which releases its waiters even when the load fails.

mod actor;
pub mod config;
pub mod diff;
pub mod env;
mod error;
pub mod events;
mod index;
pub mod inventory;
mod registry;
pub mod scanner;
mod snapshot;

pub use actor::{RegistryEvent, RegistryState};
pub use config::{ChangeChannel, ConfigError, RegistryConfig};
pub use env::{
	ChangeBroadcaster, Characteristics, ComponentDescriptor, ComponentDirectory, Environment, InstallLocation, PackageEvents,
};
pub use error::{RegistryError, Result};
pub use events::{EventSink, PackageChange, PackageEvent, SubscriptionId};
pub use index::RegistryCore;
pub use inventory::{
	CharacteristicsTable, ComponentSpec, InMemoryDirectory, Inventory, InventoryError, LocalBroadcaster, ManualPackageEvents,
	PackageSpec,
};
pub use plugreg_model::{DiffResult, Plugin, PluginCategory, PluginMap};
pub use registry::{PluginRegistry, get_or_init_global, global};
pub use scanner::{Diagnostic, ScanReport, Scanner, load_plugin_map};
pub use snapshot::Snapshots;
