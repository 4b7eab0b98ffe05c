use proptest::prelude::*;
use tailor_fs::NormalizedPath;

#[test]
fn test_sibling_keeps_parent() {
    let path = NormalizedPath::new("/home/user/.tailor/history.json");
    assert_eq!(
        path.sibling(".history.json.lock").as_str(),
        "/home/user/.tailor/.history.json.lock"
    );
}

#[test]
fn test_resolve_against_relative_and_absolute() {
    let base = NormalizedPath::new("/work/project");
    assert_eq!(
        NormalizedPath::new(".tailor/history.json")
            .resolve_against(&base)
            .as_str(),
        "/work/project/.tailor/history.json"
    );
    assert_eq!(
        NormalizedPath::new("/var/log.json").resolve_against(&base).as_str(),
        "/var/log.json"
    );
}

#[test]
fn test_extension() {
    assert_eq!(NormalizedPath::new("a/config.toml").extension(), Some("toml"));
    assert_eq!(NormalizedPath::new("a/.hidden").extension(), None);
}

proptest! {
    #[test]
    fn test_normalized_has_no_backslashes(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        prop_assert!(!path.as_str().contains('\\'));
        prop_assert_eq!(NormalizedPath::new(path.to_native()), path);
    }
}
