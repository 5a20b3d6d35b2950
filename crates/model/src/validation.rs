use std::fmt;

/// A problem found while validating a plugin candidate.
///
/// Fatal errors exclude the candidate from the registry. Non-fatal errors are
/// advisory and only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationError {
	/// Candidate targets an older host version and runs in compatibility mode.
	TargetVersionOutdated,
	/// Candidate is installed, or may be moved, to removable storage.
	InstallLocationBad,
	ApplicationNotEnabled,
	EditorNotEnabled,
	EditorNotExported,
	/// Editor requires a permission the host does not hold.
	EditorRequiresPermission,
	ExecutorNotEnabled,
	ExecutorNotExported,
	/// Executor requires a permission the host does not hold.
	ExecutorRequiresPermission,
	/// No executor component matched the category's executor action.
	MissingExecutor,
	/// More than one executor component matched the category's executor action.
	DuplicateExecutor,
}

impl ValidationError {
	pub const fn is_fatal(self) -> bool {
		!matches!(self, Self::TargetVersionOutdated)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TargetVersionOutdated => "target-version-outdated",
			Self::InstallLocationBad => "install-location-bad",
			Self::ApplicationNotEnabled => "application-not-enabled",
			Self::EditorNotEnabled => "editor-not-enabled",
			Self::EditorNotExported => "editor-not-exported",
			Self::EditorRequiresPermission => "editor-requires-permission",
			Self::ExecutorNotEnabled => "executor-not-enabled",
			Self::ExecutorNotExported => "executor-not-exported",
			Self::ExecutorRequiresPermission => "executor-requires-permission",
			Self::MissingExecutor => "missing-executor",
			Self::DuplicateExecutor => "duplicate-executor",
		}
	}

	/// Developer-facing explanation including how to resolve the problem.
	pub const fn explanation(self) -> &'static str {
		match self {
			Self::TargetVersionOutdated => {
				"The plugin targets an older host version than the host and will run in compatibility mode. To resolve this issue, raise the plugin's target version."
			}
			Self::InstallLocationBad => {
				"Plugins must be installed on internal storage. To resolve this issue, declare an internal-only install location and do not install to removable storage."
			}
			Self::ApplicationNotEnabled => "The application is disabled. To resolve this issue, enable the application in its manifest.",
			Self::EditorNotEnabled => "The editor component is disabled. To resolve this issue, enable the editor component in the manifest.",
			Self::EditorNotExported => "The editor component is not exported. To resolve this issue, export the editor component in the manifest.",
			Self::EditorRequiresPermission => {
				"The editor component requires a permission that is not granted to the host. To resolve this issue, remove the permission requirement from the editor component."
			}
			Self::ExecutorNotEnabled => "The executor component is disabled. To resolve this issue, enable the executor component in the manifest.",
			Self::ExecutorNotExported => "The executor component is not exported. To resolve this issue, export the executor component in the manifest.",
			Self::ExecutorRequiresPermission => {
				"The executor component requires a permission that is not granted to the host. To resolve this issue, remove the permission requirement from the executor component."
			}
			Self::MissingExecutor => "The plugin has no executor component for its category. To resolve this issue, declare exactly one executor component.",
			Self::DuplicateExecutor => {
				"The plugin has multiple executor components for its category. To resolve this issue, declare exactly one executor component."
			}
		}
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.as_str(), self.explanation())
	}
}

impl std::error::Error for ValidationError {}
