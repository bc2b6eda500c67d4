use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AttackError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        AttackError::unsupported_config("x")
            .to_string()
            .contains("unsupported configuration:")
    );
    assert!(
        AttackError::consistency("x")
            .to_string()
            .contains("internal consistency error:")
    );
    assert!(AttackError::image("x").to_string().contains("image error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AttackError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn anyhow_converts_via_question_mark() {
    fn fails() -> AttackResult<()> {
        Err(anyhow::anyhow!("decode failed"))?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert!(matches!(err, AttackError::Other(_)));
    assert!(err.to_string().contains("decode failed"));
}
