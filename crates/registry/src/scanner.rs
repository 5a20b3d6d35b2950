//! Package scanner and validator.
//!
//! Scanning queries the component directory for editor components of one
//! category, pairs each with the executor component of the same package, and
//! validates both against the host's compatibility rules. Scans touch no
//! registry state and may take seconds, so they only run on background threads.

use std::collections::BTreeSet;
use std::time::Instant;

use plugreg_model::{Plugin, PluginCategory, PluginMap, ValidationError, registry_name};

use crate::env::{Characteristics, ComponentDescriptor, ComponentDirectory, InstallLocation};

/// Version code reported for a package that vanished mid-scan.
pub const UNKNOWN_VERSION: i64 = -1;

/// A validation error attached to the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub category: PluginCategory,
	pub package_name: String,
	/// Editor component of the rejected or flagged candidate.
	pub component: String,
	pub error: ValidationError,
}

/// Result of one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
	/// Valid plugins keyed by registry name.
	pub plugins: PluginMap,
	/// Every fatal and advisory error, in candidate order.
	pub diagnostics: Vec<Diagnostic>,
}

impl ScanReport {
	pub fn fatal_count(&self) -> usize {
		self.diagnostics.iter().filter(|d| d.error.is_fatal()).count()
	}
}

/// Stateless scanner over a directory and a characteristics table.
#[derive(Clone, Copy)]
pub struct Scanner<'a> {
	directory: &'a dyn ComponentDirectory,
	characteristics: &'a dyn Characteristics,
}

impl<'a> Scanner<'a> {
	pub fn new(directory: &'a dyn ComponentDirectory, characteristics: &'a dyn Characteristics) -> Self {
		Self {
			directory,
			characteristics,
		}
	}

	/// Scans one category, optionally restricted to a single package.
	///
	/// Candidates with a fatal error are left out of the plugin map. Candidates
	/// are visited in package-name order so logs are reproducible.
	pub fn scan(&self, category: PluginCategory, package: Option<&str>) -> ScanReport {
		let started = Instant::now();
		let mut editors = self.directory.query_components(category.editor_action(), package);
		editors.sort_by(|a, b| a.package_name.cmp(&b.package_name));

		let mut report = ScanReport::default();
		for editor in &editors {
			let version = self.installed_version(&editor.package_name);
			let executors = self.directory.query_components(category.executor_action(), Some(&editor.package_name));

			tracing::info!(
				category = %category,
				package = %editor.package_name,
				editor = %editor.component_id,
				executors = executors.len(),
				version,
				"found plugin candidate"
			);

			let errors = self.check(editor, &executors);
			for &error in &errors {
				if error.is_fatal() {
					tracing::warn!(category = %category, package = %editor.package_name, error = error.as_str(), "{}", error.explanation());
				} else {
					tracing::info!(category = %category, package = %editor.package_name, error = error.as_str(), "{}", error.explanation());
				}
				report.diagnostics.push(Diagnostic {
					category,
					package_name: editor.package_name.clone(),
					component: editor.component_id.clone(),
					error,
				});
			}
			if errors.iter().any(|e| e.is_fatal()) {
				continue;
			}

			let Some(executor) = executors.first() else {
				continue;
			};
			let name = registry_name(&editor.package_name, &editor.component_id);
			let configuration = self.characteristics.lookup(category, &name);
			match Plugin::new(
				category,
				editor.package_name.clone(),
				editor.component_id.clone(),
				executor.kind,
				executor.component_id.clone(),
				version,
				configuration,
			) {
				Ok(plugin) => {
					report.plugins.insert(name, plugin);
				}
				Err(error) => {
					tracing::warn!(category = %category, package = %editor.package_name, %error, "skipping malformed plugin candidate");
				}
			}
		}

		tracing::debug!(
			category = %category,
			package = package.unwrap_or("*"),
			plugins = report.plugins.len(),
			elapsed = ?started.elapsed(),
			"loaded plugin map"
		);
		report
	}

	fn installed_version(&self, package: &str) -> i64 {
		match self.directory.installed_version(package) {
			Some(version) => version,
			None => {
				tracing::debug!(package, "package vanished before its version was read");
				UNKNOWN_VERSION
			}
		}
	}

	/// Applies every validation rule to one candidate.
	pub fn check(&self, editor: &ComponentDescriptor, executors: &[ComponentDescriptor]) -> BTreeSet<ValidationError> {
		let mut errors = BTreeSet::new();

		if editor.target_version < self.directory.host_target_version() {
			errors.insert(ValidationError::TargetVersionOutdated);
		}
		if !is_install_location_ok(editor) {
			errors.insert(ValidationError::InstallLocationBad);
		}
		if !editor.application_enabled {
			errors.insert(ValidationError::ApplicationNotEnabled);
		}
		if !editor.enabled {
			errors.insert(ValidationError::EditorNotEnabled);
		}
		if !editor.exported {
			errors.insert(ValidationError::EditorNotExported);
		}
		if !self.is_reachable(editor) {
			errors.insert(ValidationError::EditorRequiresPermission);
		}

		match executors {
			[executor] => {
				if !executor.enabled {
					errors.insert(ValidationError::ExecutorNotEnabled);
				}
				if !executor.exported {
					errors.insert(ValidationError::ExecutorNotExported);
				}
				if !self.is_reachable(executor) {
					errors.insert(ValidationError::ExecutorRequiresPermission);
				}
			}
			[] => {
				errors.insert(ValidationError::MissingExecutor);
			}
			_ => {
				errors.insert(ValidationError::DuplicateExecutor);
			}
		}

		errors
	}

	fn is_reachable(&self, component: &ComponentDescriptor) -> bool {
		component
			.permission
			.as_deref()
			.is_none_or(|permission| self.directory.is_permission_granted(permission))
	}
}

/// Packages must stay on internal storage for their components to be reachable
/// at all times.
fn is_install_location_ok(component: &ComponentDescriptor) -> bool {
	!component.on_removable_storage
		&& !matches!(
			component.install_location,
			Some(InstallLocation::Auto | InstallLocation::PreferExternal)
		)
}

/// Scans one category and keeps only the plugin map.
pub fn load_plugin_map(
	directory: &dyn ComponentDirectory,
	characteristics: &dyn Characteristics,
	category: PluginCategory,
	package: Option<&str>,
) -> PluginMap {
	Scanner::new(directory, characteristics).scan(category, package).plugins
}
