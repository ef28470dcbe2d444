#![forbid(unsafe_code)]

//! Credential generation for the core configuration editor: typed results per
//! credential kind, the VLESS encryption string encoder, the per-dialog
//! generation cache, and read-only inspection of core config documents.

pub mod config;
pub mod core_config;
pub mod error;
pub mod generate;
pub mod inbounds;
pub mod session;
pub mod types;
pub mod vless;

pub use config::CoreConfig;
pub use core_config::{BackendType, CoreType, InboundSettings, SingBoxConfig};
pub use error::{Error, GenerationError, Result};
pub use generate::{generate_credential, CredentialGenerator, GenerationRequest, Generator};
pub use inbounds::extract_inbound_tags;
pub use session::GenerationSession;
pub use types::{
	Credential, CredentialKind, KeyPair, ShadowsocksCredential, ShortId, SignatureKeyMaterial,
};
pub use vless::{KeyAgreementVariant, Role, VariantStrings, VlessBuilderOptions, VlessEncryption};

pub use corecred_crypto::ShadowsocksMethod;
