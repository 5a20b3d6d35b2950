//! Registry façade and the process-wide instance.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use plugreg_model::{PluginCategory, PluginMap};
use plugreg_worker::{ActorHandle, ActorSpec, Gate, TaskClass, spawn_actor};
use tokio::sync::broadcast;

use crate::actor::{RegistryActor, RegistryEvent, RegistryMsg};
use crate::config::{ChangeChannel, RegistryConfig};
use crate::env::Environment;
use crate::error::{RegistryError, Result};
use crate::index::RegistryCore;
use crate::inventory::{Inventory, LocalBroadcaster, ManualPackageEvents};
use crate::snapshot::Snapshots;

/// Process-wide registry, set once on first access.
static GLOBAL: OnceLock<PluginRegistry> = OnceLock::new();

/// A live plugin registry.
///
/// Construction spawns the registry worker and queues the initial load.
/// Reads never block the worker: they load the latest published snapshot.
pub struct PluginRegistry {
	handle: ActorHandle<RegistryMsg, RegistryEvent>,
	snapshots: Arc<Snapshots>,
	loaded: Gate,
	channel: ChangeChannel,
	destroyed: AtomicBool,
}

impl PluginRegistry {
	/// Starts a registry over `env`.
	///
	/// Instances created here are independent of the process-wide one and may
	/// be torn down with [`Self::destroy`].
	pub fn new(env: Environment, config: &RegistryConfig) -> Result<Self> {
		let Environment {
			directory,
			characteristics,
			package_events,
			broadcaster,
		} = env;

		let snapshots = Arc::new(Snapshots::new());
		let channel = config.change_channel();
		let core = RegistryCore::new(directory, characteristics, Arc::clone(&snapshots));
		let actor = RegistryActor::new(core, package_events, broadcaster, channel.clone());
		let handle = spawn_actor(ActorSpec::new(config.worker_thread_name.clone(), TaskClass::IoBlocking, actor))
			.map_err(RegistryError::Spawn)?;

		let loaded = Gate::new();
		if handle.send(RegistryMsg::Init { gate: loaded.guard() }).is_err() {
			tracing::error!(actor = handle.name(), "registry worker exited before the initial load");
		}

		tracing::debug!(action = channel.action(), "plugin registry started");
		Ok(Self {
			handle,
			snapshots,
			loaded,
			channel,
			destroyed: AtomicBool::new(false),
		})
	}

	/// Starts a registry over an inventory file, with optional configuration file.
	///
	/// Package events are driven manually and change signals stay in-process.
	pub fn open_inventory(inventory: &Path, config: Option<&Path>) -> Result<Self> {
		let config = match config {
			Some(path) => RegistryConfig::load(path)?,
			None => RegistryConfig::default(),
		};
		let Inventory {
			directory,
			characteristics,
		} = Inventory::load(inventory)?;
		let env = Environment::new(
			Arc::new(directory),
			Arc::new(characteristics),
			Arc::new(ManualPackageEvents::new()),
			Arc::new(LocalBroadcaster::new()),
		);
		Self::new(env, &config)
	}

	fn current(&self, category: PluginCategory) -> Arc<PluginMap> {
		self.snapshots.load(category).unwrap_or_default()
	}

	/// Returns the latest snapshot of `category`, blocking until the initial
	/// load has completed.
	///
	/// A failed initial load yields an empty map rather than an error.
	pub fn get_plugin_map(&self, category: PluginCategory) -> Arc<PluginMap> {
		self.loaded.wait();
		self.current(category)
	}

	/// Like [`Self::get_plugin_map`], giving up after `timeout`.
	pub fn get_plugin_map_timeout(&self, category: PluginCategory, timeout: Duration) -> Option<Arc<PluginMap>> {
		self.loaded.wait_timeout(timeout).then(|| self.current(category))
	}

	/// Returns the latest snapshot of `category` without blocking.
	///
	/// `None` until the initial load has completed.
	pub fn peek_plugin_map(&self, category: PluginCategory) -> Option<Arc<PluginMap>> {
		self.loaded.is_open().then(|| self.current(category))
	}

	/// Whether the initial load has completed.
	pub fn is_loaded(&self) -> bool {
		self.loaded.is_open()
	}

	/// Identity of the payload-free signal sent after every change.
	pub fn change_channel(&self) -> &ChangeChannel {
		&self.channel
	}

	/// Subscribes to in-process reload events emitted after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
		self.handle.subscribe()
	}

	/// Stops the registry worker and revokes its event subscription.
	///
	/// Blocks until the message being handled completes. Later snapshots are
	/// never published, but the last ones stay readable.
	///
	/// # Panics
	///
	/// Panics when called on the process-wide registry or called twice.
	pub fn destroy(&self) {
		assert!(!self.is_global(), "the process-wide plugin registry cannot be destroyed");
		assert!(!self.destroyed.swap(true, Ordering::SeqCst), "plugin registry destroyed twice");

		if self.handle.send(RegistryMsg::Destroy).is_err() {
			tracing::debug!(actor = self.handle.name(), "registry worker already exited");
		}
		if let Some(exit) = self.handle.join() {
			tracing::debug!(actor = self.handle.name(), exit = ?exit, "plugin registry destroyed");
		}
		self.loaded.open();
	}

	fn is_global(&self) -> bool {
		GLOBAL.get().is_some_and(|global| std::ptr::eq(global, self))
	}
}

impl std::fmt::Debug for PluginRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PluginRegistry")
			.field("channel", &self.channel)
			.field("loaded", &self.is_loaded())
			.field("snapshots", &self.snapshots)
			.finish()
	}
}

/// Returns the process-wide registry if it was created.
pub fn global() -> Option<&'static PluginRegistry> {
	GLOBAL.get()
}

/// Returns the process-wide registry, creating it with `init` on first access.
///
/// Safe to call from any thread. `init` runs at most once per process; racing
/// callers block until it finishes.
///
/// # Panics
///
/// Panics if `init` fails, since the registry cannot start without a worker.
pub fn get_or_init_global<F>(init: F) -> &'static PluginRegistry
where
	F: FnOnce() -> Result<PluginRegistry>,
{
	GLOBAL.get_or_init(|| init().expect("failed to start the process-wide plugin registry"))
}
