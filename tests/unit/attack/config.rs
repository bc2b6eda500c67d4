use super::*;

#[test]
fn defaults_match_reference_configuration() {
    let cfg = AttackConfig::default();
    assert_eq!(cfg.eps, 3.0);
    let settings = cfg.validate().unwrap();
    assert_eq!(
        settings.path(),
        ExecutionPath::Reference {
            reuse: PixelReuse::AllowOverlap
        }
    );
    assert_eq!(settings, AttackSettings::default());
}

#[test]
fn unused_only_with_accelerated_path_is_unsupported() {
    let cfg = AttackConfig {
        unused_only: true,
        use_accelerated_path: true,
        ..AttackConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, AttackError::UnsupportedConfig(_)));
    assert!(AttackSettings::try_from(&cfg).is_err());
}

#[test]
fn unused_only_selects_reference_path() {
    let cfg = AttackConfig {
        unused_only: true,
        ..AttackConfig::default()
    };
    let settings = cfg.validate().unwrap();
    assert_eq!(settings.path().reuse(), PixelReuse::UnusedOnly);
}

#[test]
fn accelerated_path_carries_thread_override() {
    let cfg = AttackConfig {
        use_accelerated_path: true,
        threads: Some(2),
        ..AttackConfig::default()
    };
    let settings = cfg.validate().unwrap();
    assert_eq!(
        settings.path(),
        ExecutionPath::Accelerated { threads: Some(2) }
    );
    assert_eq!(settings.path().reuse(), PixelReuse::AllowOverlap);
}

#[test]
fn out_of_range_numbers_are_rejected() {
    for ratio in [-0.1, 1.5, f64::NAN] {
        let cfg = AttackConfig {
            allowed_ratio_of_change: ratio,
            ..AttackConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(AttackError::Validation(_))));
    }
    let cfg = AttackConfig {
        eps: -1.0,
        ..AttackConfig::default()
    };
    assert!(cfg.validate().is_err());
    let cfg = AttackConfig {
        threads: Some(0),
        ..AttackConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let json = r#"{ "unused_only": true, "allowed_ratio_of_change": 0.25 }"#;
    let cfg = AttackConfig::from_reader(json.as_bytes()).unwrap();
    assert!(cfg.unused_only);
    assert_eq!(cfg.allowed_ratio_of_change, 0.25);
    assert_eq!(cfg.eps, 3.0);
    assert!(!cfg.use_accelerated_path);
}

#[test]
fn json_rejects_unknown_fields() {
    let json = r#"{ "usecython": true }"#;
    let err = AttackConfig::from_reader(json.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("parse attack config JSON"));
}
