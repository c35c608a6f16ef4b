use super::*;

#[test]
fn output_path_swaps_the_extension() {
    assert_eq!(
        derive_output_path(Path::new("frames/a.caff")),
        PathBuf::from("frames/a.jpg")
    );
    assert_eq!(
        derive_output_path(Path::new("still.ciff")),
        PathBuf::from("still.jpg")
    );
}

#[test]
fn input_kind_follows_the_extension() {
    assert_eq!(
        InputKind::from_path(Path::new("x/y.ciff")),
        Some(InputKind::Ciff)
    );
    assert_eq!(
        InputKind::from_path(Path::new("y.caff")),
        Some(InputKind::Caff)
    );
    assert_eq!(InputKind::from_path(Path::new("y.jpg")), None);
    assert_eq!(InputKind::from_path(Path::new("caff")), None);
}

#[test]
fn mode_and_extension_must_agree() {
    validate_input_path(Path::new("a.ciff"), InputKind::Ciff).unwrap();
    validate_input_path(Path::new("a.caff"), InputKind::Caff).unwrap();

    for (path, kind) in [
        ("a.caff", InputKind::Ciff),
        ("a.ciff", InputKind::Caff),
        ("a.txt", InputKind::Caff),
    ] {
        let err = validate_input_path(Path::new(path), kind).unwrap_err();
        assert!(matches!(err, CaffError::Validation(_)), "{err}");
    }
}

#[test]
fn overlong_paths_are_rejected() {
    let long = format!("{}.caff", "a".repeat(MAX_PATH_LEN));
    let err = validate_input_path(Path::new(&long), InputKind::Caff).unwrap_err();
    assert!(err.to_string().contains("limit is 4096"));
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.ciff");
    let err = convert_file(&path, InputKind::Ciff, &ConvertOpts::default()).unwrap_err();
    match err {
        CaffError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!path.with_extension("jpg").exists());
}
