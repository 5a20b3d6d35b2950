use thiserror::Error;

use crate::config::ConfigError;
use crate::inventory::InventoryError;

/// Errors that can occur when starting a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
	/// The worker thread could not be spawned.
	#[error("failed to spawn registry worker: {0}")]
	Spawn(#[source] std::io::Error),

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Inventory(#[from] InventoryError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
