//! Error types for model construction and wire decoding.

use thiserror::Error;

/// Errors produced while building or decoding model values.
#[derive(Debug, Error)]
pub enum ModelError {
	/// A field that must be non-empty was empty.
	#[error("{0} must not be empty")]
	EmptyField(&'static str),

	/// The wire representation could not be encoded or decoded.
	#[error("plugin wire codec: {0}")]
	Codec(#[from] postcard::Error),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
