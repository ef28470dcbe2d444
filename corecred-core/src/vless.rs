//! VLESS encryption string encoder.
//!
//! Both roles share one layout:
//!
//! ```text
//! <handshake>.<encryption>.<ticket>[.<padding>...].<token>
//! ```
//!
//! The server role produces `decryption`, the client role produces
//! `encryption`. Each key-agreement variant contributes one token per role,
//! and both tokens of a variant come from the same key pair.

use std::collections::BTreeMap;

use corecred_crypto::random::RandomSource;
use corecred_crypto::{kyber, x25519, MlKemKeyMaterial, X25519KeyPair};
use serde::{Deserialize, Serialize};

/// Handshake used when the option is blank.
pub const DEFAULT_HANDSHAKE_METHOD: &str = "mlkem768x25519plus";

/// Accepted encryption methods; the first is the default.
pub const ENCRYPTION_METHODS: [&str; 3] = ["native", "xorpub", "random"];

/// Server ticket lifetime used when the option is blank.
pub const DEFAULT_SERVER_TICKET: &str = "600s";

/// Client resumption modes; the first is the client ticket fallback.
pub const CLIENT_RESUMPTION_OPTIONS: [&str; 2] = ["0rtt", "1rtt"];

/// Padding hints shared by both roles when their own padding is blank.
pub const DEFAULT_PADDING: &str = "100-111-1111.75-0-111.50-0-3333";

const SEPARATOR: &str = ".";

/// User-edited builder state. Blank strings fall back to the defaults above
/// at encode time, so this never needs validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VlessBuilderOptions {
    pub handshake_method: String,
    pub encryption_method: String,
    pub server_ticket: String,
    pub client_ticket: String,
    pub server_padding: String,
    pub client_padding: String,
    pub include_server_padding: bool,
    pub include_client_padding: bool,
}

impl Default for VlessBuilderOptions {
    fn default() -> Self {
        Self {
            handshake_method: DEFAULT_HANDSHAKE_METHOD.into(),
            encryption_method: ENCRYPTION_METHODS[0].into(),
            server_ticket: DEFAULT_SERVER_TICKET.into(),
            client_ticket: CLIENT_RESUMPTION_OPTIONS[0].into(),
            server_padding: DEFAULT_PADDING.into(),
            client_padding: DEFAULT_PADDING.into(),
            include_server_padding: false,
            include_client_padding: false,
        }
    }
}

/// Which side of the connection a string is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Inbound `decryption`
    Server,
    /// Outbound `encryption`
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyAgreementVariant {
    #[serde(rename = "x25519")]
    X25519,
    #[serde(rename = "mlkem768")]
    MlKem768,
}

impl KeyAgreementVariant {
    pub const ALL: [KeyAgreementVariant; 2] = [Self::X25519, Self::MlKem768];
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    match value.trim() {
        "" => fallback,
        trimmed => trimmed,
    }
}

fn padding_segments(padding: &str) -> impl Iterator<Item = &str> {
    or_default(padding, DEFAULT_PADDING)
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
}

/// Build the configuration string for one role around `token`.
pub fn encode_role(options: &VlessBuilderOptions, role: Role, token: &str) -> String {
    let (ticket, padding, include_padding) = match role {
        Role::Server => (
            or_default(&options.server_ticket, DEFAULT_SERVER_TICKET),
            options.server_padding.as_str(),
            options.include_server_padding,
        ),
        Role::Client => (
            or_default(&options.client_ticket, CLIENT_RESUMPTION_OPTIONS[0]),
            options.client_padding.as_str(),
            options.include_client_padding,
        ),
    };

    let mut segments = vec![
        or_default(&options.handshake_method, DEFAULT_HANDSHAKE_METHOD),
        or_default(&options.encryption_method, ENCRYPTION_METHODS[0]),
        ticket,
    ];
    if include_padding {
        segments.extend(padding_segments(padding));
    }
    segments.push(token);
    segments.join(SEPARATOR)
}

/// One X25519 pair and one ML-KEM-768 seed, drawn together per generation.
#[derive(Debug, Clone)]
pub struct VlessKeyMaterial {
    pub x25519: X25519KeyPair,
    pub mlkem: MlKemKeyMaterial,
}

impl VlessKeyMaterial {
    pub fn generate<R: RandomSource>(rng: &mut R) -> corecred_crypto::Result<Self> {
        Ok(Self {
            x25519: x25519::generate(rng)?,
            mlkem: kyber::generate(rng)?,
        })
    }

    /// `(server token, client token)` for a variant. Both halves always come
    /// from the same key pair.
    pub fn tokens(&self, variant: KeyAgreementVariant) -> (String, String) {
        match variant {
            KeyAgreementVariant::X25519 => (
                self.x25519.private_key_encoded(),
                self.x25519.public_key_encoded(),
            ),
            KeyAgreementVariant::MlKem768 => (
                self.mlkem.seed_encoded(),
                self.mlkem.encapsulation_key_encoded(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantStrings {
    pub decryption: String,
    pub encryption: String,
}

/// Both variants' strings plus the key material behind them. Option changes
/// re-encode from the retained material via [`VlessEncryption::rebuild`].
#[derive(Debug, Clone, Serialize)]
pub struct VlessEncryption {
    pub variants: BTreeMap<KeyAgreementVariant, VariantStrings>,
    #[serde(skip)]
    material: VlessKeyMaterial,
}

impl VlessEncryption {
    pub fn from_material(material: VlessKeyMaterial, options: &VlessBuilderOptions) -> Self {
        let mut out = Self {
            variants: BTreeMap::new(),
            material,
        };
        out.rebuild(options);
        out
    }

    /// Re-encode every variant from one options value.
    pub fn rebuild(&mut self, options: &VlessBuilderOptions) {
        self.variants = KeyAgreementVariant::ALL
            .into_iter()
            .map(|variant| {
                let (server_token, client_token) = self.material.tokens(variant);
                let strings = VariantStrings {
                    decryption: encode_role(options, Role::Server, &server_token),
                    encryption: encode_role(options, Role::Client, &client_token),
                };
                (variant, strings)
            })
            .collect();
    }

    pub fn get(&self, variant: KeyAgreementVariant) -> Option<&VariantStrings> {
        self.variants.get(&variant)
    }

    pub fn material(&self) -> &VlessKeyMaterial {
        &self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corecred_crypto::random::SeededRandom;
    use proptest::prelude::*;

    fn server_opts() -> VlessBuilderOptions {
        VlessBuilderOptions {
            handshake_method: "mlkem768x25519plus".into(),
            encryption_method: "native".into(),
            server_ticket: "600s".into(),
            include_server_padding: false,
            ..VlessBuilderOptions::default()
        }
    }

    #[test]
    fn decryption_without_padding() {
        assert_eq!(
            encode_role(&server_opts(), Role::Server, "ABC"),
            "mlkem768x25519plus.native.600s.ABC"
        );
    }

    #[test]
    fn decryption_with_padding() {
        let opts = VlessBuilderOptions {
            include_server_padding: true,
            server_padding: "10-20.30-40".into(),
            ..server_opts()
        };
        assert_eq!(
            encode_role(&opts, Role::Server, "ABC"),
            "mlkem768x25519plus.native.600s.10-20.30-40.ABC"
        );
    }

    #[test]
    fn padding_ignored_when_flag_unset() {
        let opts = VlessBuilderOptions {
            server_padding: "1-2.3-4".into(),
            ..server_opts()
        };
        assert_eq!(
            encode_role(&opts, Role::Server, "T"),
            "mlkem768x25519plus.native.600s.T"
        );
    }

    #[test]
    fn padding_pieces_trimmed_and_empty_dropped() {
        let opts = VlessBuilderOptions {
            include_client_padding: true,
            client_padding: " 5-6 .. 7-8 . ".into(),
            ..VlessBuilderOptions::default()
        };
        assert_eq!(
            encode_role(&opts, Role::Client, "K"),
            "mlkem768x25519plus.native.0rtt.5-6.7-8.K"
        );
    }

    #[test]
    fn blank_padding_uses_shared_default() {
        let opts = VlessBuilderOptions {
            include_server_padding: true,
            server_padding: "   ".into(),
            ..server_opts()
        };
        assert_eq!(
            encode_role(&opts, Role::Server, "T"),
            format!("mlkem768x25519plus.native.600s.{DEFAULT_PADDING}.T")
        );
    }

    #[test]
    fn blank_fields_fall_back_per_role() {
        let opts = VlessBuilderOptions {
            handshake_method: "".into(),
            encryption_method: "  ".into(),
            server_ticket: " \t".into(),
            client_ticket: "".into(),
            ..VlessBuilderOptions::default()
        };
        assert_eq!(
            encode_role(&opts, Role::Server, "S"),
            "mlkem768x25519plus.native.600s.S"
        );
        assert_eq!(
            encode_role(&opts, Role::Client, "C"),
            format!("mlkem768x25519plus.native.{}.C", CLIENT_RESUMPTION_OPTIONS[0])
        );
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let opts = VlessBuilderOptions {
            encryption_method: " xorpub ".into(),
            client_ticket: "1rtt ".into(),
            ..VlessBuilderOptions::default()
        };
        assert_eq!(
            encode_role(&opts, Role::Client, "C"),
            "mlkem768x25519plus.xorpub.1rtt.C"
        );
    }

    #[test]
    fn variant_tokens_are_paired_halves() -> corecred_crypto::Result<()> {
        let material = VlessKeyMaterial::generate(&mut SeededRandom::from_seed([2u8; 32]))?;
        let result = VlessEncryption::from_material(material.clone(), &VlessBuilderOptions::default());

        let x = result.get(KeyAgreementVariant::X25519).ok_or_else(|| {
            corecred_crypto::Error::InvalidOption("missing x25519".into())
        })?;
        assert!(x.decryption.ends_with(&material.x25519.private_key_encoded()));
        assert!(x.encryption.ends_with(&material.x25519.public_key_encoded()));

        let pq = result.get(KeyAgreementVariant::MlKem768).ok_or_else(|| {
            corecred_crypto::Error::InvalidOption("missing mlkem768".into())
        })?;
        assert!(pq.decryption.ends_with(&material.mlkem.seed_encoded()));
        assert!(pq.encryption.ends_with(&material.mlkem.encapsulation_key_encoded()));
        Ok(())
    }

    #[test]
    fn client_padding_toggle_moves_both_variants() -> corecred_crypto::Result<()> {
        let material = VlessKeyMaterial::generate(&mut SeededRandom::from_seed([6u8; 32]))?;
        let mut opts = VlessBuilderOptions::default();
        let mut result = VlessEncryption::from_material(material, &opts);
        let before = result.variants.clone();

        opts.include_client_padding = true;
        result.rebuild(&opts);
        for variant in KeyAgreementVariant::ALL {
            let (old, new) = (&before[&variant], &result.variants[&variant]);
            assert_ne!(old.encryption, new.encryption, "{variant:?}");
            assert!(new.encryption.contains(DEFAULT_PADDING));
            assert_eq!(old.decryption, new.decryption, "{variant:?}");
        }
        Ok(())
    }

    #[test]
    fn serialized_variants_use_protocol_names() -> Result<(), Box<dyn std::error::Error>> {
        let material = VlessKeyMaterial::generate(&mut SeededRandom::from_seed([8u8; 32]))?;
        let result = VlessEncryption::from_material(material, &VlessBuilderOptions::default());
        let v = serde_json::to_value(&result)?;
        assert!(v["variants"]["x25519"]["decryption"].is_string());
        assert!(v["variants"]["mlkem768"]["encryption"].is_string());
        assert!(v.get("material").is_none());
        Ok(())
    }

    proptest! {
        #[test]
        fn segment_count_tracks_padding(
            pieces in proptest::collection::vec("[0-9]{1,3}-[0-9]{1,4}", 0..5),
            include in any::<bool>(),
        ) {
            let padding = pieces.join(".");
            let opts = VlessBuilderOptions {
                include_server_padding: include,
                server_padding: padding.clone(),
                ..VlessBuilderOptions::default()
            };
            let out = encode_role(&opts, Role::Server, "TOKEN");
            let expected_padding = match (include, pieces.is_empty()) {
                (false, _) => 0,
                (true, false) => pieces.len(),
                (true, true) => DEFAULT_PADDING.split('.').count(),
            };
            prop_assert_eq!(out.split('.').count(), 4 + expected_padding);
            prop_assert!(out.ends_with(".TOKEN"));
            let prefix = "mlkem768x25519plus.native.600s.";
            prop_assert!(out.starts_with(prefix));
        }
    }
}
