//! In-memory collaborators backed by a package inventory.
//!
//! The inventory is a TOML document listing installed packages, their
//! components and the characteristics table:
//!
//! ```toml
//! host_target_version = 21
//! granted_permissions = ["com.example.SECRET"]
//!
//! [[package]]
//! name = "com.example.wifi"
//! version = 3
//! target_version = 21
//!
//! [[package.component]]
//! id = "com.example.wifi.EditActivity"
//! kind = "activity"
//! actions = ["plugreg.intent.action.EDIT_CONDITION"]
//!
//! [[characteristic]]
//! category = "condition"
//! registry_name = "com.example.wifi:com.example.wifi.EditActivity"
//! requires_connectivity = true
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use plugreg_model::{ComponentKind, ConfigFlags, PluginCategory, PluginConfiguration};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::ChangeChannel;
use crate::env::{ChangeBroadcaster, Characteristics, ComponentDescriptor, ComponentDirectory, InstallLocation, PackageEvents};
use crate::events::{EventSink, PackageEvent, SubscriptionId};

/// Errors that can occur when loading an inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// The same package name appears twice.
	#[error("duplicate package in inventory: {0}")]
	DuplicatePackage(String),
}

fn default_true() -> bool {
	true
}

fn default_version() -> i64 {
	1
}

/// One component declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
	pub id: String,
	pub kind: ComponentKind,
	/// Actions the component responds to.
	#[serde(default)]
	pub actions: Vec<String>,
	#[serde(default = "default_true")]
	pub enabled: bool,
	#[serde(default = "default_true")]
	pub exported: bool,
	#[serde(default)]
	pub permission: Option<String>,
}

impl ComponentSpec {
	pub fn new(id: impl Into<String>, kind: ComponentKind, action: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			kind,
			actions: vec![action.into()],
			enabled: true,
			exported: true,
			permission: None,
		}
	}

	#[must_use]
	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}

	#[must_use]
	pub fn unexported(mut self) -> Self {
		self.exported = false;
		self
	}

	#[must_use]
	pub fn permission(mut self, permission: impl Into<String>) -> Self {
		self.permission = Some(permission.into());
		self
	}
}

/// One installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSpec {
	pub name: String,
	#[serde(default = "default_version")]
	pub version: i64,
	/// Whether the application as a whole is enabled.
	#[serde(default = "default_true")]
	pub enabled: bool,
	#[serde(default)]
	pub target_version: i32,
	#[serde(default)]
	pub on_removable_storage: bool,
	#[serde(default)]
	pub install_location: Option<InstallLocation>,
	#[serde(default, rename = "component")]
	pub components: Vec<ComponentSpec>,
}

impl PackageSpec {
	pub fn new(name: impl Into<String>, version: i64) -> Self {
		Self {
			name: name.into(),
			version,
			enabled: true,
			target_version: 0,
			on_removable_storage: false,
			install_location: Some(InstallLocation::InternalOnly),
			components: Vec::new(),
		}
	}

	#[must_use]
	pub fn component(mut self, component: ComponentSpec) -> Self {
		self.components.push(component);
		self
	}

	/// Adds an editor activity and an executor for `category`.
	///
	/// Conditions get a receiver executor and settings a service executor.
	#[must_use]
	pub fn plugin(self, category: PluginCategory, editor: impl Into<String>, executor: impl Into<String>) -> Self {
		let executor_kind = match category {
			PluginCategory::Condition => ComponentKind::Receiver,
			PluginCategory::Setting => ComponentKind::Service,
		};
		self.component(ComponentSpec::new(editor, ComponentKind::Activity, category.editor_action()))
			.component(ComponentSpec::new(executor, executor_kind, category.executor_action()))
	}

	#[must_use]
	pub fn target_version(mut self, version: i32) -> Self {
		self.target_version = version;
		self
	}

	#[must_use]
	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}

	#[must_use]
	pub fn install_location(mut self, location: Option<InstallLocation>) -> Self {
		self.install_location = location;
		self
	}

	#[must_use]
	pub fn on_removable_storage(mut self) -> Self {
		self.on_removable_storage = true;
		self
	}

	fn describe(&self, component: &ComponentSpec) -> ComponentDescriptor {
		ComponentDescriptor {
			package_name: self.name.clone(),
			component_id: component.id.clone(),
			kind: component.kind,
			application_enabled: self.enabled,
			enabled: component.enabled,
			exported: component.exported,
			permission: component.permission.clone(),
			target_version: self.target_version,
			on_removable_storage: self.on_removable_storage,
			install_location: self.install_location,
		}
	}
}

#[derive(Debug, Default)]
struct DirectoryState {
	host_target_version: i32,
	granted_permissions: BTreeSet<String>,
	packages: BTreeMap<String, PackageSpec>,
}

/// Mutable component directory held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
	state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
	pub fn new(host_target_version: i32) -> Self {
		Self {
			state: RwLock::new(DirectoryState {
				host_target_version,
				..DirectoryState::default()
			}),
		}
	}

	pub fn grant_permission(&self, permission: impl Into<String>) {
		self.state.write().granted_permissions.insert(permission.into());
	}

	/// Installs a package, replacing any package with the same name.
	pub fn install(&self, package: PackageSpec) -> Option<PackageSpec> {
		self.state.write().packages.insert(package.name.clone(), package)
	}

	pub fn uninstall(&self, package: &str) -> Option<PackageSpec> {
		self.state.write().packages.remove(package)
	}

	pub fn package(&self, package: &str) -> Option<PackageSpec> {
		self.state.read().packages.get(package).cloned()
	}
}

impl ComponentDirectory for InMemoryDirectory {
	fn query_components(&self, action: &str, package: Option<&str>) -> Vec<ComponentDescriptor> {
		let state = self.state.read();
		state
			.packages
			.values()
			.filter(|spec| package.is_none_or(|name| name == spec.name))
			.flat_map(|spec| {
				spec.components
					.iter()
					.filter(|c| c.actions.iter().any(|a| a == action))
					.map(|c| spec.describe(c))
			})
			.collect()
	}

	fn installed_version(&self, package: &str) -> Option<i64> {
		self.state.read().packages.get(package).map(|spec| spec.version)
	}

	fn host_target_version(&self) -> i32 {
		self.state.read().host_target_version
	}

	fn is_permission_granted(&self, permission: &str) -> bool {
		self.state.read().granted_permissions.contains(permission)
	}
}

/// Characteristics table held in memory.
#[derive(Debug, Clone, Default)]
pub struct CharacteristicsTable {
	entries: HashMap<(PluginCategory, String), PluginConfiguration>,
}

impl CharacteristicsTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, category: PluginCategory, registry_name: impl Into<String>, configuration: PluginConfiguration) {
		self.entries.insert((category, registry_name.into()), configuration);
	}

	#[must_use]
	pub fn with(mut self, category: PluginCategory, registry_name: impl Into<String>, configuration: PluginConfiguration) -> Self {
		self.insert(category, registry_name, configuration);
		self
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Characteristics for CharacteristicsTable {
	fn lookup(&self, category: PluginCategory, registry_name: &str) -> PluginConfiguration {
		self.entries
			.get(&(category, registry_name.to_string()))
			.cloned()
			.unwrap_or_default()
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CharacteristicSpec {
	category: PluginCategory,
	registry_name: String,
	#[serde(default)]
	backwards_compatible: bool,
	#[serde(default)]
	requires_connectivity: bool,
	#[serde(default)]
	disrupts_connectivity: bool,
	#[serde(default)]
	buggy: bool,
	#[serde(default)]
	drains_battery: bool,
	#[serde(default)]
	blacklisted: bool,
	#[serde(default)]
	alternatives: Vec<String>,
}

impl CharacteristicSpec {
	fn configuration(&self) -> PluginConfiguration {
		let mut flags = ConfigFlags::empty();
		flags.set(ConfigFlags::BACKWARDS_COMPATIBLE, self.backwards_compatible);
		flags.set(ConfigFlags::REQUIRES_CONNECTIVITY, self.requires_connectivity);
		flags.set(ConfigFlags::DISRUPTS_CONNECTIVITY, self.disrupts_connectivity);
		flags.set(ConfigFlags::BUGGY, self.buggy);
		flags.set(ConfigFlags::DRAINS_BATTERY, self.drains_battery);
		flags.set(ConfigFlags::BLACKLISTED, self.blacklisted);
		PluginConfiguration::new(flags, self.alternatives.iter().cloned())
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct InventoryFile {
	host_target_version: i32,
	granted_permissions: Vec<String>,
	#[serde(rename = "package")]
	packages: Vec<PackageSpec>,
	#[serde(rename = "characteristic")]
	characteristics: Vec<CharacteristicSpec>,
}

/// A parsed inventory document.
#[derive(Debug, Default)]
pub struct Inventory {
	pub directory: InMemoryDirectory,
	pub characteristics: CharacteristicsTable,
}

impl Inventory {
	pub fn from_toml_str(text: &str) -> Result<Self, InventoryError> {
		let file: InventoryFile = toml::from_str(text)?;

		let directory = InMemoryDirectory::new(file.host_target_version);
		for permission in file.granted_permissions {
			directory.grant_permission(permission);
		}
		for package in file.packages {
			let name = package.name.clone();
			if directory.install(package).is_some() {
				return Err(InventoryError::DuplicatePackage(name));
			}
		}

		let mut characteristics = CharacteristicsTable::new();
		for entry in &file.characteristics {
			characteristics.insert(entry.category, entry.registry_name.clone(), entry.configuration());
		}

		Ok(Self {
			directory,
			characteristics,
		})
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| InventoryError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}
}

/// Package event stream driven by explicit [`Self::emit`] calls.
#[derive(Debug, Default)]
pub struct ManualPackageEvents {
	next_id: AtomicU64,
	sinks: Mutex<Vec<(SubscriptionId, EventSink)>>,
}

impl ManualPackageEvents {
	pub fn new() -> Self {
		Self::default()
	}

	/// Delivers `event` to every subscriber on the calling thread.
	pub fn emit(&self, event: PackageEvent) {
		let sinks: Vec<EventSink> = self.sinks.lock().iter().map(|(_, sink)| sink.clone()).collect();
		for sink in sinks {
			sink.deliver(event.clone());
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.sinks.lock().len()
	}
}

impl PackageEvents for ManualPackageEvents {
	fn subscribe(&self, sink: EventSink) -> SubscriptionId {
		let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.sinks.lock().push((id, sink));
		id
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		self.sinks.lock().retain(|(sid, _)| *sid != id);
	}
}

/// In-process change broadcaster.
#[derive(Debug)]
pub struct LocalBroadcaster {
	sent: AtomicUsize,
	tx: broadcast::Sender<ChangeChannel>,
}

impl Default for LocalBroadcaster {
	fn default() -> Self {
		Self::new()
	}
}

impl LocalBroadcaster {
	pub fn new() -> Self {
		let (tx, _) = broadcast::channel(16);
		Self {
			sent: AtomicUsize::new(0),
			tx,
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ChangeChannel> {
		self.tx.subscribe()
	}

	/// Number of signals broadcast so far.
	pub fn sent(&self) -> usize {
		self.sent.load(Ordering::SeqCst)
	}
}

impl ChangeBroadcaster for LocalBroadcaster {
	fn broadcast(&self, channel: &ChangeChannel) {
		self.sent.fetch_add(1, Ordering::SeqCst);
		let receivers = self.tx.send(channel.clone()).unwrap_or(0);
		tracing::trace!(action = channel.action(), receivers, "registry.broadcast");
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	const INVENTORY: &str = r#"
host_target_version = 21
granted_permissions = ["com.example.SECRET"]

[[package]]
name = "com.example.wifi"
version = 3
target_version = 21

[[package.component]]
id = "com.example.wifi.EditActivity"
kind = "activity"
actions = ["plugreg.intent.action.EDIT_CONDITION"]

[[package.component]]
id = "com.example.wifi.QueryReceiver"
kind = "receiver"
actions = ["plugreg.intent.action.QUERY_CONDITION"]
permission = "com.example.SECRET"

[[characteristic]]
category = "condition"
registry_name = "com.example.wifi:com.example.wifi.EditActivity"
requires_connectivity = true
alternatives = ["host:builtin.Wifi"]
"#;

	#[test]
	fn parses_packages_and_characteristics() {
		let inventory = Inventory::from_toml_str(INVENTORY).unwrap();
		let dir = &inventory.directory;

		assert_eq!(dir.host_target_version(), 21);
		assert!(dir.is_permission_granted("com.example.SECRET"));
		assert_eq!(dir.installed_version("com.example.wifi"), Some(3));
		assert_eq!(dir.installed_version("com.example.gone"), None);

		let editors = dir.query_components(PluginCategory::Condition.editor_action(), None);
		assert_eq!(editors.len(), 1);
		assert_eq!(editors[0].component_id, "com.example.wifi.EditActivity");
		assert!(editors[0].enabled && editors[0].exported && editors[0].application_enabled);
		assert_eq!(editors[0].install_location, None);

		let config = inventory
			.characteristics
			.lookup(PluginCategory::Condition, "com.example.wifi:com.example.wifi.EditActivity");
		assert!(config.requires_connectivity());
		assert!(!config.is_buggy());
		assert_eq!(config.alternatives().len(), 1);
	}

	#[test]
	fn unknown_lookups_default() {
		let inventory = Inventory::from_toml_str(INVENTORY).unwrap();
		let config = inventory.characteristics.lookup(PluginCategory::Setting, "x:y");
		assert_eq!(config, PluginConfiguration::default());
	}

	#[test]
	fn duplicate_packages_are_rejected() {
		let text = "[[package]]\nname = \"a\"\n\n[[package]]\nname = \"a\"\n";
		assert!(matches!(Inventory::from_toml_str(text), Err(InventoryError::DuplicatePackage(name)) if name == "a"));
	}

	#[test]
	fn package_filter_limits_query() {
		let dir = InMemoryDirectory::new(0);
		dir.install(PackageSpec::new("a", 1).plugin(PluginCategory::Setting, "a.Edit", "a.Fire"));
		dir.install(PackageSpec::new("b", 1).plugin(PluginCategory::Setting, "b.Edit", "b.Fire"));

		let action = PluginCategory::Setting.executor_action();
		assert_eq!(dir.query_components(action, None).len(), 2);
		let only_b = dir.query_components(action, Some("b"));
		assert_eq!(only_b.len(), 1);
		assert_eq!(only_b[0].kind, ComponentKind::Service);
		assert!(dir.query_components(action, Some("c")).is_empty());
	}

	#[test]
	fn broadcaster_counts_signals() {
		let broadcaster = LocalBroadcaster::new();
		let mut rx = broadcaster.subscribe();
		let channel = crate::RegistryConfig::default().change_channel();

		broadcaster.broadcast(&channel);
		assert_eq!(broadcaster.sent(), 1);
		assert_eq!(rx.try_recv().unwrap(), channel);
	}
}
