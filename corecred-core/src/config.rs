use crate::error::{Error, Result};
use crate::generate::GenerationRequest;
use crate::vless::VlessBuilderOptions;
use corecred_crypto::ShadowsocksMethod;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Editor-level defaults: log verbosity and the initial generation inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
	pub log_level: String,
	pub shadowsocks_method: ShadowsocksMethod,
	pub vless: VlessBuilderOptions,
}

impl Default for CoreConfig {
	fn default() -> Self {
		Self { log_level: "info".into(), shadowsocks_method: ShadowsocksMethod::default(), vless: VlessBuilderOptions::default() }
	}
}

impl CoreConfig {
	pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
		let data = fs::read_to_string(path)?;
		let cfg: Self = toml::from_str(&data).map_err(|e| Error::config(format!("toml parse error: {e}")))?;
		cfg.validate()?;
		Ok(cfg)
	}

	/// Defaults overridden by `CORECRED_LOG_LEVEL` and `CORECRED_SS_METHOD`.
	pub fn from_env() -> Result<Self> {
		let mut cfg = Self::default();
		cfg.apply_env()?;
		cfg.validate()?;
		Ok(cfg)
	}

	pub fn apply_env(&mut self) -> Result<()> {
		if let Ok(v) = std::env::var("CORECRED_LOG_LEVEL") { self.log_level = v; }
		if let Ok(v) = std::env::var("CORECRED_SS_METHOD") {
			self.shadowsocks_method = v.parse().map_err(|e| Error::config(format!("CORECRED_SS_METHOD: {e}")))?;
		}
		Ok(())
	}

	pub fn validate(&self) -> Result<()> {
		let allowed = ["trace","debug","info","warn","error"];
		if !allowed.contains(&self.log_level.as_str()) {
			return Err(Error::config(format!("invalid log_level: {}", self.log_level)));
		}
		Ok(())
	}

	pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
		fs::write(path, self.to_toml()?)?;
		Ok(())
	}

	pub fn to_toml(&self) -> Result<String> {
		toml::to_string_pretty(self).map_err(|e| Error::config(format!("toml serialize error: {e}")))
	}

	/// Commented template for `config write-template`.
	pub fn template() -> Result<String> {
		let body = Self::default().to_toml()?;
		Ok(format!("# corecred configuration\n# log_level: trace | debug | info | warn | error\n# shadowsocks_method: 2022-blake3-aes-128-gcm | 2022-blake3-aes-256-gcm\n\n{body}"))
	}

	pub fn generation_request(&self) -> GenerationRequest {
		GenerationRequest { vless: self.vless.clone(), shadowsocks_method: self.shadowsocks_method }
	}
}
