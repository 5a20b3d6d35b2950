//! Collaborators the registry consults but does not own.

use std::sync::Arc;

use plugreg_model::{ComponentKind, PluginCategory, PluginConfiguration};
use serde::{Deserialize, Serialize};

use crate::config::ChangeChannel;
use crate::events::{EventSink, SubscriptionId};

/// Install location a package declares in its manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallLocation {
	InternalOnly,
	/// The system may move the package to removable storage.
	Auto,
	PreferExternal,
}

/// One component returned by a directory query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
	pub package_name: String,
	/// Fully-qualified component identifier.
	pub component_id: String,
	pub kind: ComponentKind,
	/// Whether the owning application is enabled.
	pub application_enabled: bool,
	pub enabled: bool,
	pub exported: bool,
	/// Permission a caller must hold to reach the component.
	pub permission: Option<String>,
	/// Host version the owning package targets.
	pub target_version: i32,
	/// Whether the owning package currently lives on removable storage.
	pub on_removable_storage: bool,
	/// Manifest install location. `None` when the manifest could not be read.
	pub install_location: Option<InstallLocation>,
}

/// Directory of installed components.
///
/// Queries reflect a live environment: a package listed by one call may be
/// gone by the next.
pub trait ComponentDirectory: Send + Sync {
	/// Lists components declaring `action`, optionally restricted to one package.
	fn query_components(&self, action: &str, package: Option<&str>) -> Vec<ComponentDescriptor>;

	/// Returns the installed version code, or `None` when the package is not installed.
	fn installed_version(&self, package: &str) -> Option<i64>;

	/// Host version the hosting application targets.
	fn host_target_version(&self) -> i32;

	/// Whether the hosting application holds `permission`.
	fn is_permission_granted(&self, permission: &str) -> bool;
}

/// Static compatibility quirks table.
pub trait Characteristics: Send + Sync {
	/// Looks up the configuration of one plugin. Unknown plugins get the default.
	fn lookup(&self, category: PluginCategory, registry_name: &str) -> PluginConfiguration;
}

/// Revocable subscription to package lifecycle events.
pub trait PackageEvents: Send + Sync {
	/// Starts delivering events to `sink`.
	fn subscribe(&self, sink: EventSink) -> SubscriptionId;

	/// Stops delivery for a subscription. Unknown ids are ignored.
	fn unsubscribe(&self, id: SubscriptionId);
}

/// Egress for the payload-free "registry changed" signal.
pub trait ChangeBroadcaster: Send + Sync {
	fn broadcast(&self, channel: &ChangeChannel);
}

/// Everything a registry instance talks to.
#[derive(Clone)]
pub struct Environment {
	pub directory: Arc<dyn ComponentDirectory>,
	pub characteristics: Arc<dyn Characteristics>,
	pub package_events: Arc<dyn PackageEvents>,
	pub broadcaster: Arc<dyn ChangeBroadcaster>,
}

impl Environment {
	pub fn new(
		directory: Arc<dyn ComponentDirectory>,
		characteristics: Arc<dyn Characteristics>,
		package_events: Arc<dyn PackageEvents>,
		broadcaster: Arc<dyn ChangeBroadcaster>,
	) -> Self {
		Self {
			directory,
			characteristics,
			package_events,
			broadcaster,
		}
	}
}
