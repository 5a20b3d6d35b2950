//! Incremental diffing of a per-package scan against the registry.
//!
//! Every check compares a fresh scan restricted to one package against the
//! full map of its category. The scan is the truth after the package event.

use plugreg_model::PluginMap;

/// Whether `scanned` holds a key that `current` lacks.
pub fn is_added(current: &PluginMap, scanned: &PluginMap) -> bool {
	scanned.keys().any(|key| !current.contains_key(key))
}

/// Whether `current` holds an entry of `package` that `scanned` lacks.
pub fn is_removed(current: &PluginMap, scanned: &PluginMap, package: &str) -> bool {
	current
		.iter()
		.any(|(key, plugin)| plugin.package_name() == package && !scanned.contains_key(key))
}

/// Whether a scanned plugin carries a different version code than its
/// published counterpart. Plugins absent from `published` are ignored.
pub fn is_version_changed(published: &PluginMap, scanned: &PluginMap) -> bool {
	scanned.iter().any(|(key, plugin)| {
		published
			.get(key)
			.is_some_and(|old| old.version_code() != plugin.version_code())
	})
}

/// Merges every scanned entry into `current` when the scan adds a key.
///
/// Colliding keys are overwritten with the scanned value. Returns whether the
/// map changed.
pub fn merge_added(current: &mut PluginMap, scanned: &PluginMap) -> bool {
	if !is_added(current, scanned) {
		return false;
	}
	overwrite(current, scanned);
	true
}

/// Drops entries of `package` that `scanned` no longer reports.
///
/// Returns whether the map changed.
pub fn prune_removed(current: &mut PluginMap, scanned: &PluginMap, package: &str) -> bool {
	let before = current.len();
	current.retain(|key, plugin| plugin.package_name() != package || scanned.contains_key(key));
	current.len() != before
}

/// Inserts every scanned entry, replacing colliding keys.
pub fn overwrite(current: &mut PluginMap, scanned: &PluginMap) {
	current.extend(scanned.iter().map(|(key, plugin)| (key.clone(), plugin.clone())));
}
