use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CaffError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CaffError::encode("x").to_string().contains("encode failed:"));
    assert!(
        CaffError::UnknownBlockId(9)
            .to_string()
            .contains("unknown block id 9")
    );
    assert!(
        CaffError::HeaderNotFirst { block: "credits" }
            .to_string()
            .starts_with("credits block")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CaffError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn output_open_failed_names_the_path() {
    let err = CaffError::OutputOpenFailed {
        path: PathBuf::from("out/frame.jpg"),
        source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    };
    assert!(err.to_string().contains("out/frame.jpg"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn unexpected_eof_is_detected() {
    let eof = CaffError::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
    assert!(eof.is_unexpected_eof());
    assert!(!CaffError::MultilineTag.is_unexpected_eof());
}
