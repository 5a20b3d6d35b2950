//! End-to-end registry behavior driven through package events.

use std::sync::Arc;
use std::time::{Duration, Instant};

use plugreg_registry::{
	CharacteristicsTable, DiffResult, Environment, InMemoryDirectory, LocalBroadcaster, ManualPackageEvents, PackageEvent, PackageSpec,
	PluginCategory, PluginRegistry, RegistryConfig, RegistryEvent,
};
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

struct Harness {
	directory: Arc<InMemoryDirectory>,
	events: Arc<ManualPackageEvents>,
	broadcaster: Arc<LocalBroadcaster>,
	registry: PluginRegistry,
}

impl Harness {
	fn start(directory: InMemoryDirectory) -> Self {
		let directory = Arc::new(directory);
		let events = Arc::new(ManualPackageEvents::new());
		let broadcaster = Arc::new(LocalBroadcaster::new());
		let env = Environment::new(
			directory.clone(),
			Arc::new(CharacteristicsTable::new()),
			events.clone(),
			broadcaster.clone(),
		);
		let config = RegistryConfig {
			instance_suffix: Some("it".to_string()),
			..RegistryConfig::default()
		};
		let registry = PluginRegistry::new(env, &config).unwrap();
		registry.get_plugin_map(PluginCategory::Condition);
		Self {
			directory,
			events,
			broadcaster,
			registry,
		}
	}
}

fn next_event(rx: &mut broadcast::Receiver<RegistryEvent>) -> RegistryEvent {
	let deadline = Instant::now() + Duration::from_secs(5);
	loop {
		match rx.try_recv() {
			Ok(event) => return event,
			Err(broadcast::error::TryRecvError::Empty) if Instant::now() < deadline => {
				std::thread::sleep(Duration::from_millis(5));
			}
			Err(err) => panic!("no registry event: {err:?}"),
		}
	}
}

fn condition(version: i64) -> PackageSpec {
	PackageSpec::new("com.example.wifi", version).plugin(PluginCategory::Condition, "wifi.Edit", "wifi.Query")
}

fn setting(version: i64) -> PackageSpec {
	PackageSpec::new("com.example.volume", version).plugin(PluginCategory::Setting, "vol.Edit", "vol.Fire")
}

#[test]
fn initial_load_broadcasts_once() {
	let directory = InMemoryDirectory::new(0);
	directory.install(condition(1));
	let harness = Harness::start(directory);

	assert_eq!(harness.registry.get_plugin_map(PluginCategory::Condition).len(), 1);
	assert_eq!(harness.broadcaster.sent(), 1);
	assert_eq!(harness.events.subscriber_count(), 1);
	harness.registry.destroy();
}

#[test]
fn package_lifecycle_republishes_snapshots() {
	let harness = Harness::start(InMemoryDirectory::new(0));
	let mut rx = harness.registry.subscribe();
	let mut signals = harness.broadcaster.subscribe();

	harness.directory.install(condition(1));
	harness.events.emit(PackageEvent::Added {
		package: "com.example.wifi".to_string(),
		replacing: false,
	});
	assert_eq!(next_event(&mut rx), RegistryEvent::Reloaded(DiffResult::ConditionsChanged));
	let conditions = harness.registry.peek_plugin_map(PluginCategory::Condition).unwrap();
	assert_eq!(conditions["com.example.wifi:wifi.Edit"].version_code(), 1);
	assert_eq!(signals.try_recv().unwrap(), *harness.registry.change_channel());

	harness.directory.install(condition(2));
	harness.events.emit(PackageEvent::Removed {
		package: "com.example.wifi".to_string(),
		replacing: true,
	});
	harness.events.emit(PackageEvent::Added {
		package: "com.example.wifi".to_string(),
		replacing: true,
	});
	harness.events.emit(PackageEvent::Replaced {
		package: "com.example.wifi".to_string(),
	});
	assert_eq!(next_event(&mut rx), RegistryEvent::Reloaded(DiffResult::ConditionsChanged));
	let upgraded = harness.registry.peek_plugin_map(PluginCategory::Condition).unwrap();
	assert_eq!(upgraded["com.example.wifi:wifi.Edit"].version_code(), 2);
	assert_eq!(conditions["com.example.wifi:wifi.Edit"].version_code(), 1);

	harness.directory.uninstall("com.example.wifi");
	harness.events.emit(PackageEvent::Removed {
		package: "com.example.wifi".to_string(),
		replacing: false,
	});
	assert_eq!(next_event(&mut rx), RegistryEvent::Reloaded(DiffResult::ConditionsChanged));
	assert!(harness.registry.peek_plugin_map(PluginCategory::Condition).unwrap().is_empty());
	assert_eq!(harness.broadcaster.sent(), 4);

	harness.registry.destroy();
}

#[test]
fn setting_upgrade_is_silent() {
	let directory = InMemoryDirectory::new(0);
	directory.install(setting(1));
	let harness = Harness::start(directory);
	let mut rx = harness.registry.subscribe();
	let before = harness.registry.get_plugin_map(PluginCategory::Setting);

	harness.directory.install(setting(2));
	harness.events.emit(PackageEvent::Replaced {
		package: "com.example.volume".to_string(),
	});
	// A condition install afterwards proves the upgrade was handled without a reload.
	harness.directory.install(condition(1));
	harness.events.emit(PackageEvent::Added {
		package: "com.example.wifi".to_string(),
		replacing: false,
	});

	assert_eq!(next_event(&mut rx), RegistryEvent::Reloaded(DiffResult::ConditionsChanged));
	let after = harness.registry.peek_plugin_map(PluginCategory::Setting).unwrap();
	assert!(Arc::ptr_eq(&before, &after));
	assert_eq!(after["com.example.volume:vol.Edit"].version_code(), 1);

	harness.registry.destroy();
}

#[test]
fn storage_unmount_rescans_each_package() {
	let directory = InMemoryDirectory::new(0);
	directory.install(condition(1));
	directory.install(setting(1));
	let harness = Harness::start(directory);
	let mut rx = harness.registry.subscribe();

	harness.directory.install(condition(1).on_removable_storage());
	harness.directory.install(setting(1).on_removable_storage());
	harness.events.emit(PackageEvent::StorageAvailability {
		packages: vec!["com.example.wifi".to_string(), "com.example.volume".to_string()],
		available: false,
	});

	assert_eq!(next_event(&mut rx), RegistryEvent::Reloaded(DiffResult::ConditionsChanged));
	assert_eq!(next_event(&mut rx), RegistryEvent::Reloaded(DiffResult::SettingsChanged));
	assert!(harness.registry.peek_plugin_map(PluginCategory::Condition).unwrap().is_empty());
	assert!(harness.registry.peek_plugin_map(PluginCategory::Setting).unwrap().is_empty());

	harness.registry.destroy();
}

#[test]
fn destroy_revokes_subscription() {
	let harness = Harness::start(InMemoryDirectory::new(0));
	assert_eq!(harness.events.subscriber_count(), 1);

	harness.registry.destroy();
	assert_eq!(harness.events.subscriber_count(), 0);

	harness.directory.install(condition(1));
	harness.events.emit(PackageEvent::Added {
		package: "com.example.wifi".to_string(),
		replacing: false,
	});
	assert!(harness.registry.peek_plugin_map(PluginCategory::Condition).unwrap().is_empty());
	assert_eq!(harness.broadcaster.sent(), 1);
}

#[test]
fn concurrent_readers_see_whole_snapshots() {
	let harness = Arc::new(Harness::start(InMemoryDirectory::new(0)));
	let mut rx = harness.registry.subscribe();

	let readers: Vec<_> = (0..4)
		.map(|_| {
			let harness = Arc::clone(&harness);
			std::thread::spawn(move || {
				for _ in 0..200 {
					let map = harness.registry.get_plugin_map(PluginCategory::Condition);
					assert!(map.is_empty() || map.len() == 2, "observed partial snapshot of {} plugins", map.len());
				}
			})
		})
		.collect();

	harness.directory.install(
		condition(1).component(plugreg_registry::ComponentSpec::new(
			"wifi.EditAdvanced",
			plugreg_model::ComponentKind::Activity,
			PluginCategory::Condition.editor_action(),
		)),
	);
	harness.events.emit(PackageEvent::Added {
		package: "com.example.wifi".to_string(),
		replacing: false,
	});
	assert_eq!(next_event(&mut rx), RegistryEvent::Reloaded(DiffResult::ConditionsChanged));

	for reader in readers {
		reader.join().unwrap();
	}
	harness.registry.destroy();
}
