use thiserror::Error;

use crate::types::CredentialKind;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A failed generation, tagged with the credential kind that was requested.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} generation failed: {source}")]
pub struct GenerationError {
	pub kind: CredentialKind,
	#[source]
	pub source: corecred_crypto::Error,
}

impl GenerationError {
	pub fn new(kind: CredentialKind, source: corecred_crypto::Error) -> Self { Self { kind, source } }
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	#[error("serde: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("config: {0}")]
	Config(String),
	#[error(transparent)]
	Generation(#[from] GenerationError),
	#[error("{0} generation already in progress")]
	InProgress(CredentialKind),
	#[error("unknown credential kind: {0}")]
	UnknownKind(String),
}

impl Error {
	pub fn config(msg: impl Into<String>) -> Self { Self::Config(msg.into()) }
}
