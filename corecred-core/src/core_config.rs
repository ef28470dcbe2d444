//! Read-only inspection of a stored core configuration document.
//!
//! Validation rules and the resolved inbound view follow what the panel
//! backend accepts for sing-box cores. The generated credentials land in
//! these documents (REALITY `public_key`/`short_id`, `mldsa65Verify`, VLESS
//! `encryption`, Shadowsocks `method`/`password`), and the resolved view
//! exposes each of them back alongside the TLS and transport settings.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use json_comments::StripComments;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Proxy engine a stored core configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreType {
    Xray,
    SingBox,
}

/// Numeric backend identifier sent to nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BackendType {
    Xray = 0,
    SingBox = 1,
}

impl CoreType {
    pub const fn backend(self) -> BackendType {
        match self {
            Self::Xray => BackendType::Xray,
            Self::SingBox => BackendType::SingBox,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xray => "xray",
            Self::SingBox => "sing_box",
        }
    }
}

impl fmt::Display for CoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "xray" => Ok(Self::Xray),
            "sing_box" | "singbox" => Ok(Self::SingBox),
            other => Err(Error::config(format!("unknown core type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    #[default]
    None,
    Tls,
    Reality,
}

/// Flattened view of one inbound.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InboundSettings {
    pub tag: String,
    pub protocol: String,
    pub port: Option<Value>,
    pub network: String,
    pub tls: TlsMode,
    pub sni: Vec<String>,
    pub host: Vec<String>,
    pub path: String,
    pub header_type: String,
    pub fp: String,
    pub alpn: Vec<String>,
    #[serde(rename = "allowinsecure")]
    pub allow_insecure: bool,
    pub flow: String,
    /// VLESS `encryption` string, `none` when the inbound has no key set.
    pub encryption: String,
    pub method: String,
    pub password: String,
    pub is_2022: bool,
    pub public_key: String,
    /// First REALITY short id, empty when none is configured.
    pub sid: String,
    pub short_ids: Vec<String>,
    pub spx: String,
    #[serde(rename = "mldsa65Verify")]
    pub mldsa65_verify: Option<String>,
}

/// Validated sing-box configuration with its resolved inbounds.
#[derive(Debug, Clone)]
pub struct SingBoxConfig {
    document: Value,
    exclude_inbound_tags: HashSet<String>,
    inbounds: Vec<String>,
    inbounds_by_tag: BTreeMap<String, InboundSettings>,
}

impl SingBoxConfig {
    /// Parse a stored document. `//`, `/* */` and `#` comments are allowed.
    pub fn parse(text: &str, exclude_inbound_tags: &[String]) -> Result<Self> {
        let document: Value = serde_json::from_reader(StripComments::new(text.as_bytes()))?;
        Self::from_value(document, exclude_inbound_tags)
    }

    pub fn from_value(document: Value, exclude_inbound_tags: &[String]) -> Result<Self> {
        validate(&document)?;
        let exclude: HashSet<String> = exclude_inbound_tags.iter().cloned().collect();

        let mut inbounds = Vec::new();
        let mut inbounds_by_tag = BTreeMap::new();
        for inbound in document
            .get("inbounds")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
        {
            let settings = normalize(inbound);
            if exclude.contains(&settings.tag) {
                debug!(tag = %settings.tag, "inbound excluded");
                continue;
            }
            inbounds.push(settings.tag.clone());
            inbounds_by_tag.insert(settings.tag.clone(), settings);
        }

        Ok(Self {
            document,
            exclude_inbound_tags: exclude,
            inbounds,
            inbounds_by_tag,
        })
    }

    pub fn core_type(&self) -> CoreType {
        CoreType::SingBox
    }

    pub fn backend_type(&self) -> BackendType {
        self.core_type().backend()
    }

    /// Resolved inbound tags, document order, exclusions removed.
    pub fn inbounds(&self) -> &[String] {
        &self.inbounds
    }

    pub fn inbound(&self, tag: &str) -> Option<&InboundSettings> {
        self.inbounds_by_tag.get(tag)
    }

    pub fn resolved(&self) -> impl Iterator<Item = &InboundSettings> {
        self.inbounds.iter().filter_map(|t| self.inbounds_by_tag.get(t))
    }

    pub fn exclude_inbound_tags(&self) -> &HashSet<String> {
        &self.exclude_inbound_tags
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.document)?)
    }
}

fn validate(document: &Value) -> Result<()> {
    let inbounds = match document.get("inbounds").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => list,
        _ => return Err(Error::config("sing-box config doesn't have inbounds")),
    };
    let mut seen = HashSet::new();
    for inbound in inbounds {
        let Some(obj) = inbound.as_object() else {
            return Err(Error::config("each inbound entry must be a JSON object"));
        };
        let tag = obj.get("tag").and_then(Value::as_str).unwrap_or_default();
        if tag.is_empty() || !seen.insert(tag) {
            return Err(Error::config("all inbounds must have a unique tag"));
        }
        if tag.contains(',') {
            return Err(Error::config(format!("character «,» is not allowed in inbound tag '{tag}'")));
        }
        if tag.contains("<=>") {
            return Err(Error::config(format!("character «<=>» is not allowed in inbound tag '{tag}'")));
        }
        if protocol_of(obj).is_empty() {
            return Err(Error::config(format!("inbound '{tag}' must define a type/protocol")));
        }
    }
    Ok(())
}

/// Null, `false`, `0`, `""`, `[]` and `{}` count as unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// First of `keys` holding a set value.
fn first_set<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| obj.get(*key)).find(|v| is_set(v))
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn object_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

fn protocol_of(obj: &Map<String, Value>) -> &str {
    first_set(obj, &["type", "protocol"])
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                other => Some(plain(other)),
            })
            .collect(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(other) => vec![plain(other)],
    }
}

fn port_of(obj: &Map<String, Value>) -> Option<Value> {
    match first_set(obj, &["listen_port", "port"]) {
        Some(Value::Number(n)) => return Some(Value::Number(n.clone())),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            let s = s.trim();
            return Some(match s.parse::<u64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::from(s),
            });
        }
        _ => {}
    }
    match obj.get("listen_port_range") {
        Some(Value::Object(range)) => {
            let start = first_set(range, &["start", "from"]);
            let end = first_set(range, &["end", "to"]);
            match (start, end) {
                (Some(s), Some(e)) => Some(Value::from(format!("{}-{}", plain(s), plain(e)))),
                (Some(s), None) => Some(s.clone()),
                _ => None,
            }
        }
        Some(Value::String(s)) => Some(Value::from(s.as_str())),
        _ => None,
    }
}

fn plain(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn mldsa65_verify(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_set(obj, keys).map(plain)
}

fn normalize(inbound: &Map<String, Value>) -> InboundSettings {
    let method = str_field(inbound, "method").to_string();
    let tls = object_field(inbound, "tls");
    let mut settings = InboundSettings {
        tag: str_field(inbound, "tag").to_string(),
        protocol: protocol_of(inbound).to_ascii_lowercase(),
        port: port_of(inbound),
        network: "tcp".into(),
        flow: str_field(inbound, "flow").to_string(),
        encryption: inbound
            .get("encryption")
            .map_or_else(|| "none".to_string(), |v| v.as_str().unwrap_or_default().to_string()),
        password: str_field(inbound, "password").to_string(),
        is_2022: method.starts_with("2022-blake3"),
        method,
        mldsa65_verify: tls.and_then(|t| mldsa65_verify(t, &["mldsa65Verify"])),
        ..InboundSettings::default()
    };

    if let Some(tls) = tls {
        apply_tls(&mut settings, tls);
    }
    if let Some(transport) = object_field(inbound, "transport") {
        apply_transport(&mut settings, transport);
    }
    settings
}

fn apply_tls(settings: &mut InboundSettings, tls: &Map<String, Value>) {
    if !tls.get("enabled").is_some_and(is_set) {
        return;
    }
    let reality = object_field(tls, "reality").filter(|r| r.get("enabled").is_some_and(is_set));

    match reality {
        Some(reality) => {
            settings.tls = TlsMode::Reality;
            settings.sni = string_list(tls.get("server_name"));
            if settings.sni.is_empty() {
                settings.sni =
                    string_list(object_field(reality, "handshake").and_then(|h| h.get("server")));
            }
            settings.public_key = str_field(reality, "public_key").to_string();
            settings.short_ids = string_list(first_set(reality, &["short_id", "short_ids"]));
            settings.sid = settings.short_ids.first().cloned().unwrap_or_default();
            settings.spx = first_set(reality, &["spider_x", "spider_x_content"])
                .map(plain)
                .unwrap_or_default();
            // The REALITY block wins over the outer TLS key, even when unset.
            settings.mldsa65_verify = mldsa65_verify(reality, &["mldsa65Verify", "mldsa_65_verify"]);
        }
        None => {
            settings.tls = TlsMode::Tls;
            settings.sni = string_list(tls.get("server_name"));
            if settings.sni.is_empty() {
                settings.sni = string_list(tls.get("server_name_list"));
            }
            settings.alpn = string_list(tls.get("alpn"));
            settings.fp = str_field(tls, "fingerprint").to_string();
            settings.allow_insecure = tls.get("insecure").is_some_and(is_set);
        }
    }
}

fn apply_transport(settings: &mut InboundSettings, transport: &Map<String, Value>) {
    if let Some(network) = first_set(transport, &["type", "network"]).and_then(Value::as_str) {
        settings.network = network.to_ascii_lowercase();
    }
    let header_host = object_field(transport, "headers").and_then(|h| first_set(h, &["Host"]));

    match settings.network.as_str() {
        "ws" | "websocket" => {
            settings.path = str_field(transport, "path").to_string();
            settings.host = string_list(header_host.or_else(|| transport.get("host")));
        }
        "grpc" => {
            settings.path = str_field(transport, "service_name").to_string();
            if let Some(authority) = first_set(transport, &["authority"]) {
                settings.host = vec![plain(authority)];
            }
        }
        "http" | "h2" | "h3" | "splithttp" | "xhttp" => {
            settings.path = str_field(transport, "path").to_string();
            settings.host = string_list(transport.get("host"));
        }
        "quic" | "kcp" => {
            settings.header_type = str_field(transport, "header").to_string();
            if settings.network == "kcp" {
                settings.path = str_field(transport, "seed").to_string();
            }
        }
        _ => {
            if header_host.is_some() {
                settings.host = string_list(header_host);
            }
            if transport.contains_key("path") {
                settings.path = str_field(transport, "path").to_string();
            }
        }
    }
}
