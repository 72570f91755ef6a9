use ace_error::DiagnosticCode;
use ace_span::SrcBufferStore;

use crate::{expand_src_path, load_package, PathMacro, PathPatternError};

fn write_temp(dir: &std::path::Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("ace-config-test-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_load_package_basic() {
    let dir = temp_dir("basic");
    write_temp(&dir, "src/main.ace", "main() { exit; }\n");
    let package_path = write_temp(
        &dir,
        "package.json",
        r#"{ "name": "demo", "src_files": ["src/*.ace"] }"#,
    );

    let mut store = SrcBufferStore::new();
    let (package, bag) = load_package(&mut store, &package_path, None).into_parts();
    assert!(!bag.has_errors(), "{:?}", bag);
    let package = package.unwrap();
    assert_eq!(package.name, "demo");
    assert_eq!(package.src_file_paths.len(), 1);
    assert!(package.src_file_paths[0].ends_with("main.ace"));
}

#[test]
fn test_load_package_recursive_glob_and_macro() {
    let dir = temp_dir("glob");
    write_temp(&dir, "code/a.ace", "\n");
    write_temp(&dir, "code/nested/b.ace", "\n");
    write_temp(&dir, "code/nested/ignored.txt", "\n");
    let package_path = write_temp(
        &dir,
        "package.json",
        r#"{
            "name": "demo",
            "path_macros": [{ "name": "root", "value": "code" }],
            "src_files": ["$root/**.ace"]
        }"#,
    );

    let mut store = SrcBufferStore::new();
    let (package, bag) = load_package(&mut store, &package_path, None).into_parts();
    assert!(!bag.has_errors(), "{:?}", bag);
    let package = package.unwrap();
    assert_eq!(package.src_file_paths.len(), 2);
}

#[test]
fn test_unknown_property_warns_and_wrong_type_errors() {
    let dir = temp_dir("props");
    let package_path = write_temp(
        &dir,
        "package.json",
        r#"{ "name": "demo", "src_files": ["a.ace"], "extra": 1, "dep_files": "nope" }"#,
    );

    let mut store = SrcBufferStore::new();
    let (package, bag) = load_package(&mut store, &package_path, None).into_parts();
    assert!(package.is_some());
    assert_eq!(bag.with_code(DiagnosticCode::UnexpectedPackageProperty).len(), 1);
    assert_eq!(
        bag.with_code(DiagnosticCode::UnexpectedPackagePropertyType).len(),
        1
    );
}

#[test]
fn test_missing_required_property() {
    let dir = temp_dir("missing");
    let package_path = write_temp(&dir, "package.json", r#"{ "name": "demo" }"#);
    let mut store = SrcBufferStore::new();
    let (package, bag) = load_package(&mut store, &package_path, None).into_parts();
    assert!(package.is_none());
    assert_eq!(bag.with_code(DiagnosticCode::MissingPackageProperty).len(), 1);
}

#[test]
fn test_package_file_not_found() {
    let mut store = SrcBufferStore::new();
    let (package, bag) =
        load_package(&mut store, std::path::Path::new("/nonexistent/p.json"), None).into_parts();
    assert!(package.is_none());
    assert_eq!(bag.with_code(DiagnosticCode::FileNotFound).len(), 1);
}

#[test]
fn test_undefined_macro_is_an_error() {
    let error = expand_src_path(std::path::Path::new("."), "$lib/*.ace", &[]).unwrap_err();
    assert!(matches!(error, PathPatternError::UndefinedMacro(name) if name == "lib"));
}

#[test]
fn test_trailing_slash_and_characters_are_errors() {
    let macros = [PathMacro {
        name: "m".to_string(),
        value: "x".to_string(),
    }];
    assert!(matches!(
        expand_src_path(std::path::Path::new("."), "src/", &macros),
        Err(PathPatternError::TrailingSlash(_))
    ));
    assert!(matches!(
        expand_src_path(std::path::Path::new("."), "src/**junk.ace", &macros),
        Err(PathPatternError::TrailingCharacters(_))
    ));
}
