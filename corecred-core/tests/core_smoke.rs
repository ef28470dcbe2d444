use corecred_core::{
    extract_inbound_tags, CoreConfig, Credential, CredentialKind, GenerationRequest,
    GenerationSession, Generator, KeyAgreementVariant, VlessBuilderOptions,
};
use corecred_crypto::random::SeededRandom;
use std::{env, fs};

#[test]
fn config_default_is_valid_and_roundtrip_file() {
    let cfg = CoreConfig::default();
    assert!(cfg.validate().is_ok());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corecred.toml");
    cfg.write_to_file(&path).unwrap();
    let s = fs::read_to_string(&path).unwrap();
    assert!(s.contains("log_level"));
    assert!(s.contains("[vless]"));
    let loaded = CoreConfig::load_from_file(&path).unwrap();
    assert_eq!(cfg, loaded);
}

#[test]
fn config_env_override_and_validation() {
    let old_log = env::var("CORECRED_LOG_LEVEL").ok();
    let old_ss = env::var("CORECRED_SS_METHOD").ok();

    env::set_var("CORECRED_LOG_LEVEL", "debug");
    env::set_var("CORECRED_SS_METHOD", "2022-blake3-aes-128-gcm");
    let cfg = CoreConfig::from_env().unwrap();
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.shadowsocks_method.key_len(), 16);

    env::set_var("CORECRED_SS_METHOD", "rc4-md5");
    let err = CoreConfig::from_env().unwrap_err();
    assert!(format!("{err}").contains("CORECRED_SS_METHOD"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "log_level='nope'\n").unwrap();
    let err = CoreConfig::load_from_file(&path).unwrap_err();
    assert!(format!("{err}").contains("invalid log_level"));

    match old_log {
        Some(v) => env::set_var("CORECRED_LOG_LEVEL", v),
        None => env::remove_var("CORECRED_LOG_LEVEL"),
    }
    match old_ss {
        Some(v) => env::set_var("CORECRED_SS_METHOD", v),
        None => env::remove_var("CORECRED_SS_METHOD"),
    }
}

fn vless(c: Credential) -> corecred_core::VlessEncryption {
    match c {
        Credential::VlessEncryption(v) => v,
        other => panic!("expected vless encryption, got {other:?}"),
    }
}

#[test]
fn editor_dialog_lifecycle() {
    let session = GenerationSession::open(Generator::new(SeededRandom::from_seed([30u8; 32])));
    let mut request = GenerationRequest::default();

    let first = vless(session.view(CredentialKind::VlessEncryption, &request).unwrap());
    let x = first.get(KeyAgreementVariant::X25519).unwrap();
    assert!(x.decryption.starts_with("mlkem768x25519plus.native.600s."));
    assert!(x.encryption.starts_with("mlkem768x25519plus.native.0rtt."));

    request.vless = VlessBuilderOptions {
        include_server_padding: true,
        server_padding: "10-20.30-40".into(),
        ..request.vless.clone()
    };
    let updated = vless(session.apply_vless_options(&request.vless).unwrap());
    for variant in KeyAgreementVariant::ALL {
        let s = updated.get(variant).unwrap();
        assert!(s.decryption.starts_with("mlkem768x25519plus.native.600s.10-20.30-40."));
        assert_eq!(s.encryption, first.get(variant).unwrap().encryption);
    }

    let again = vless(session.view(CredentialKind::VlessEncryption, &request).unwrap());
    assert_eq!(again.variants, updated.variants);

    session.close();

    let next = GenerationSession::open(Generator::new(SeededRandom::from_seed([31u8; 32])));
    assert!(next.cached(CredentialKind::VlessEncryption).is_none());
}

#[test]
fn tags_for_inbound_picker() {
    let doc = r#"{"log":{},"inbounds":[{"type":"vless","tag":"A"},{"tag":""},{"notag":1}]}"#;
    assert_eq!(extract_inbound_tags(doc), vec!["A"]);
}
