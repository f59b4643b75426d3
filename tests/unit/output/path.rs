use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "layerstack_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn touch(path: &Path) {
    std::fs::write(path, b"x").unwrap();
}

#[test]
fn first_free_suffix_is_chosen() {
    let dir = temp_dir("suffix");
    std::fs::create_dir_all(&dir).unwrap();
    touch(&dir.join("out.psd"));
    touch(&dir.join("out_1.psd"));

    let p = resolve_output_path(&dir, "out", "psd", false).unwrap();
    assert_eq!(p, dir.join("out_2.psd"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn overwrite_returns_unsuffixed_path() {
    let dir = temp_dir("overwrite");
    std::fs::create_dir_all(&dir).unwrap();
    touch(&dir.join("out.psd"));
    touch(&dir.join("out_1.psd"));

    let p = resolve_output_path(&dir, "out", "psd", true).unwrap();
    assert_eq!(p, dir.join("out.psd"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_directory_is_created() {
    let dir = temp_dir("mkdir").join("a").join("b");
    assert!(!dir.exists());

    let p = resolve_output_path(&dir, "doc", "psd", false).unwrap();
    assert!(dir.is_dir());
    assert_eq!(p, dir.join("doc.psd"));

    // Second call against an existing directory is fine.
    ensure_dir(&dir).unwrap();

    let _ = std::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap());
}

#[test]
fn create_output_file_never_reuses_a_path() {
    let dir = temp_dir("claim");
    let (a, _fa) = create_output_file(&dir, "out", "psd", false).unwrap();
    let (b, _fb) = create_output_file(&dir, "out", "psd", false).unwrap();
    let (c, _fc) = create_output_file(&dir, "out", "psd", false).unwrap();
    assert_eq!(a, dir.join("out.psd"));
    assert_eq!(b, dir.join("out_1.psd"));
    assert_eq!(c, dir.join("out_2.psd"));

    let (d, _fd) = create_output_file(&dir, "out", "psd", true).unwrap();
    assert_eq!(d, dir.join("out.psd"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn bad_base_names_are_rejected() {
    let dir = temp_dir("bad_base");
    for base in ["", "  ", "a/b", "a\\b"] {
        let err = resolve_output_path(&dir, base, "psd", false).unwrap_err();
        assert!(matches!(err, LayerstackError::Validation(_)), "{base:?}");
    }
    assert!(!dir.exists());
}

#[test]
fn candidate_names() {
    let d = Path::new("d");
    assert_eq!(candidate(d, "out", "psd", 0), d.join("out.psd"));
    assert_eq!(candidate(d, "out", "psd", 7), d.join("out_7.psd"));
    assert_eq!(candidate(d, "out", "", 2), d.join("out_2"));
}

#[test]
fn probing_stops_at_the_limit() {
    let dir = temp_dir("exhausted");
    std::fs::create_dir_all(&dir).unwrap();
    for name in ["out.psd", "out_1.psd", "out_2.psd"] {
        touch(&dir.join(name));
    }

    let err = probe_free_path(&dir, "out", "psd", 3).unwrap_err();
    assert!(matches!(
        err,
        LayerstackError::PathResolutionExhausted { probes: 3, ref base, .. } if base == "out"
    ));
    assert!(err.to_string().contains("3 probes"));

    let err = claim_free_file(&dir, "out", "psd", 3).unwrap_err();
    assert!(matches!(
        err,
        LayerstackError::PathResolutionExhausted { probes: 3, ref directory, .. } if *directory == dir
    ));
    assert!(!dir.join("out_3.psd").exists());

    // One more probe finds the free suffix.
    assert_eq!(
        probe_free_path(&dir, "out", "psd", 4).unwrap(),
        dir.join("out_3.psd")
    );
    let (claimed, _f) = claim_free_file(&dir, "out", "psd", 4).unwrap();
    assert_eq!(claimed, dir.join("out_3.psd"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn default_limit_is_reported_in_the_error() {
    let err = exhausted(Path::new("/tmp/x"), "out", MAX_PATH_PROBES);
    assert!(err.to_string().contains("10000 probes"));
}
