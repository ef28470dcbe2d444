#![forbid(unsafe_code)]

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use corecred_core::{
	extract_inbound_tags, CoreConfig, CredentialKind, GenerationRequest, GenerationSession, SingBoxConfig,
};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "corecred.toml";

#[derive(Debug, Parser)]
#[command(name = "corecred", version, about = "Credential generator for proxy core configurations")]
struct Cli {
	/// Config file (TOML). Default: $CORECRED_CONFIG, then ./corecred.toml when present
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	/// Generate one credential and print it as JSON
	Generate {
		/// key-pair | short-id | shadowsocks-password | signature-key-pair | vless-encryption
		#[arg(value_parser = parse_kind)]
		kind: CredentialKind,
		#[command(flatten)]
		options: GenerateArgs,
	},
	/// Print the inbound tags of a core config document ("-" reads stdin)
	Inbounds { file: String },
	/// Validate a sing-box config and print its resolved inbounds
	Inspect {
		file: String,
		/// Inbound tag to leave out (repeatable)
		#[arg(long)]
		exclude: Vec<String>,
	},
	/// Config helpers
	Config {
		#[command(subcommand)]
		action: ConfigCmd,
	},
}

#[derive(Debug, Args)]
struct GenerateArgs {
	/// Shadowsocks 2022 method (2022-blake3-aes-128-gcm | 2022-blake3-aes-256-gcm)
	#[arg(long)]
	method: Option<String>,
	/// VLESS handshake method
	#[arg(long)]
	handshake: Option<String>,
	/// VLESS encryption method (native | xorpub | random)
	#[arg(long)]
	encryption: Option<String>,
	/// Server ticket, e.g. 600s
	#[arg(long)]
	server_ticket: Option<String>,
	/// Client resumption mode (0rtt | 1rtt)
	#[arg(long)]
	client_ticket: Option<String>,
	/// Server padding hints, dot separated
	#[arg(long)]
	server_padding: Option<String>,
	/// Client padding hints, dot separated
	#[arg(long)]
	client_padding: Option<String>,
	/// Append server padding (overrides the config file)
	#[arg(long, overrides_with = "no_include_server_padding")]
	include_server_padding: bool,
	#[arg(long, overrides_with = "include_server_padding")]
	no_include_server_padding: bool,
	/// Append client padding (overrides the config file)
	#[arg(long, overrides_with = "no_include_client_padding")]
	include_client_padding: bool,
	#[arg(long, overrides_with = "include_client_padding")]
	no_include_client_padding: bool,
}

// `--x` / `--no-x` pair; `None` keeps the configured value.
fn toggle(on: bool, off: bool) -> Option<bool> {
	match (on, off) {
		(true, _) => Some(true),
		(_, true) => Some(false),
		_ => None,
	}
}

#[derive(Debug, Subcommand)]
enum ConfigCmd {
	/// Show effective config (resolved from file/env)
	Show,
	/// Write a corecred.toml template
	WriteTemplate {
		/// Destination path (default: ./corecred.toml)
		#[arg(long)]
		path: Option<String>,
		/// Overwrite if file exists
		#[arg(long)]
		force: bool,
	},
}

fn parse_kind(s: &str) -> Result<CredentialKind, String> {
	s.parse().map_err(|e: corecred_core::Error| e.to_string())
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let cfg = load_config(cli.config.as_deref())?;
	init_tracing(&cfg.log_level);

	match cli.command {
		Commands::Generate { kind, options } => {
			let request = build_request(&cfg, options)?;
			let session = GenerationSession::open_default();
			match session.view(kind, &request) {
				Ok(credential) => println!("{}", serde_json::to_string_pretty(&credential)?),
				Err(e) => {
					eprintln!("error: {e}");
					std::process::exit(1);
				}
			}
			session.close();
			Ok(())
		}
		Commands::Inbounds { file } => {
			let text = read_input(&file)?;
			let tags = extract_inbound_tags(&text);
			if tags.is_empty() {
				warn!("no inbound tags found");
			}
			println!("{}", serde_json::to_string_pretty(&tags)?);
			Ok(())
		}
		Commands::Inspect { file, exclude } => {
			let text = read_input(&file)?;
			let core = SingBoxConfig::parse(&text, &exclude).context("invalid sing-box config")?;
			let inbounds: Vec<_> = core.resolved().collect();
			let out = json!({
				"core_type": core.core_type(),
				"backend_type": core.backend_type() as u8,
				"inbounds": inbounds,
			});
			println!("{}", serde_json::to_string_pretty(&out)?);
			Ok(())
		}
		Commands::Config { action } => match action {
			ConfigCmd::Show => {
				println!("{}", serde_json::to_string_pretty(&cfg)?);
				Ok(())
			}
			ConfigCmd::WriteTemplate { path, force } => {
				let p = PathBuf::from(path.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()));
				if p.exists() && !force {
					eprintln!("refusing to overwrite existing file: {} (use --force)", p.display());
					std::process::exit(2);
				}
				std::fs::write(&p, CoreConfig::template()?).with_context(|| format!("write {}", p.display()))?;
				eprintln!("wrote {}", p.display());
				Ok(())
			}
		},
	}
}

fn init_tracing(level: &str) {
	let filter = EnvFilter::try_from_env("CORECRED_LOG").unwrap_or_else(|_| EnvFilter::new(level));
	// A second init (tests, embedding) keeps the first subscriber.
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}

// Search order: --config -> $CORECRED_CONFIG -> ./corecred.toml -> defaults. Env vars override the file.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<CoreConfig> {
	let candidate = explicit
		.map(Path::to_path_buf)
		.or_else(|| std::env::var("CORECRED_CONFIG").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from))
		.or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()));

	let mut cfg = match candidate {
		Some(path) => CoreConfig::load_from_file(&path).with_context(|| format!("load config {}", path.display()))?,
		None => CoreConfig::default(),
	};
	cfg.apply_env()?;
	cfg.validate()?;
	Ok(cfg)
}

fn build_request(cfg: &CoreConfig, args: GenerateArgs) -> anyhow::Result<GenerationRequest> {
	let mut request = cfg.generation_request();
	if let Some(m) = args.method {
		request.shadowsocks_method = m.parse()?;
	}
	let vless = &mut request.vless;
	if let Some(v) = args.handshake { vless.handshake_method = v; }
	if let Some(v) = args.encryption { vless.encryption_method = v; }
	if let Some(v) = args.server_ticket { vless.server_ticket = v; }
	if let Some(v) = args.client_ticket { vless.client_ticket = v; }
	if let Some(v) = args.server_padding { vless.server_padding = v; }
	if let Some(v) = args.client_padding { vless.client_padding = v; }
	if let Some(v) = toggle(args.include_server_padding, args.no_include_server_padding) {
		vless.include_server_padding = v;
	}
	if let Some(v) = toggle(args.include_client_padding, args.no_include_client_padding) {
		vless.include_client_padding = v;
	}
	debug!(?request, "generation request");
	Ok(request)
}

fn read_input(file: &str) -> anyhow::Result<String> {
	if file == "-" {
		let mut buf = String::new();
		std::io::stdin().read_to_string(&mut buf)?;
		return Ok(buf);
	}
	std::fs::read_to_string(file).with_context(|| format!("read {file}"))
}
