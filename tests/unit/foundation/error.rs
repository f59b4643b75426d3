use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LayerstackError::unsupported_shape("x")
            .to_string()
            .contains("unsupported image shape:")
    );
    assert!(
        LayerstackError::empty_document("x")
            .to_string()
            .contains("empty document:")
    );
    assert!(
        LayerstackError::unknown_blend_mode("glow")
            .to_string()
            .contains("unknown blend mode: 'glow'")
    );
    assert!(
        LayerstackError::codec("x")
            .to_string()
            .contains("codec error:")
    );
    assert!(
        LayerstackError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn exhausted_names_directory_and_probe_count() {
    let err = LayerstackError::PathResolutionExhausted {
        directory: PathBuf::from("out"),
        base: "doc".to_string(),
        probes: 3,
    };
    let msg = err.to_string();
    assert!(msg.contains("3 probes"));
    assert!(msg.contains("'doc'"));
    assert!(msg.contains("'out'"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LayerstackError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
