//! Text and JSON rendering of scan reports and registry maps.

use std::fmt::Write as _;

use plugreg_model::{Plugin, PluginCategory, PluginMap};
use plugreg_registry::{ChangeChannel, ScanReport};
use serde_json::{Value, json};

fn sorted(map: &PluginMap) -> Vec<&Plugin> {
	let mut plugins: Vec<_> = map.values().collect();
	plugins.sort_by(|a, b| a.registry_name().cmp(b.registry_name()));
	plugins
}

fn plugin_line(out: &mut String, plugin: &Plugin) {
	let config = plugin.configuration();
	let mut flags = Vec::new();
	for (set, name) in [
		(config.is_backwards_compatibility_enabled(), "backwards-compatible"),
		(config.requires_connectivity(), "requires-connectivity"),
		(config.disrupts_connectivity(), "disrupts-connectivity"),
		(config.is_buggy(), "buggy"),
		(config.drains_battery(), "drains-battery"),
		(config.is_blacklisted(), "blacklisted"),
	] {
		if set {
			flags.push(name);
		}
	}

	let _ = write!(
		out,
		"  {} v{} -> {} {}",
		plugin.registry_name(),
		plugin.version_code(),
		plugin.executor_kind().as_str(),
		plugin.executor_component()
	);
	if !flags.is_empty() {
		let _ = write!(out, " [{}]", flags.join(", "));
	}
	out.push('\n');
}

fn plugins_json(map: &PluginMap) -> serde_json::Result<Value> {
	let mut object = serde_json::Map::new();
	for plugin in sorted(map) {
		object.insert(plugin.registry_name().to_string(), serde_json::to_value(plugin)?);
	}
	Ok(Value::Object(object))
}

/// Renders scan reports, one per category.
pub fn render_scan(reports: &[(PluginCategory, ScanReport)], as_json: bool) -> serde_json::Result<String> {
	if as_json {
		let mut categories = serde_json::Map::new();
		for (category, report) in reports {
			let diagnostics: Vec<Value> = report
				.diagnostics
				.iter()
				.map(|d| {
					json!({
						"package": d.package_name,
						"component": d.component,
						"error": d.error.as_str(),
						"fatal": d.error.is_fatal(),
						"explanation": d.error.explanation(),
					})
				})
				.collect();
			categories.insert(
				category.as_str().to_string(),
				json!({ "plugins": plugins_json(&report.plugins)?, "diagnostics": diagnostics }),
			);
		}
		return serde_json::to_string_pretty(&Value::Object(categories));
	}

	let mut out = String::new();
	for (category, report) in reports {
		let _ = writeln!(out, "{category}: {} plugin(s)", report.plugins.len());
		for plugin in sorted(&report.plugins) {
			plugin_line(&mut out, plugin);
		}
		for diagnostic in &report.diagnostics {
			let severity = if diagnostic.error.is_fatal() { "rejected" } else { "warning" };
			let _ = writeln!(
				out,
				"  {severity}: {} ({}): {}",
				diagnostic.package_name,
				diagnostic.component,
				diagnostic.error.as_str()
			);
		}
	}
	Ok(out)
}

/// Renders the published maps of a live registry.
pub fn render_registry(channel: &ChangeChannel, maps: &[(PluginCategory, &PluginMap)], as_json: bool) -> serde_json::Result<String> {
	if as_json {
		let mut categories = serde_json::Map::new();
		for (category, map) in maps {
			categories.insert(category.as_str().to_string(), plugins_json(map)?);
		}
		let document = json!({
			"channel": serde_json::to_value(channel)?,
			"plugins": Value::Object(categories),
		});
		return serde_json::to_string_pretty(&document);
	}

	let mut out = String::new();
	let _ = writeln!(out, "change action: {}", channel.action());
	let _ = writeln!(out, "permission: {}", channel.permission());
	for (category, map) in maps {
		let _ = writeln!(out, "{category}: {} plugin(s)", map.len());
		for plugin in sorted(map) {
			plugin_line(&mut out, plugin);
		}
	}
	Ok(out)
}
