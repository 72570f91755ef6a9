use ace_error::DiagnosticCode;
use ace_span::SrcBufferStore;

use crate::parse_args;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|arg| arg.to_string()).collect()
}

#[test]
fn test_parse_args_package_and_output() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&["pkg.json", "-o", "build"])).into_parts();
    assert!(!bag.has_errors());
    let cli = cli.unwrap();
    assert_eq!(cli.package_path.to_str(), Some("pkg.json"));
    assert_eq!(cli.output_dir.to_str(), Some("build"));
}

#[test]
fn test_parse_args_inline_option_value() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&["pkg.json", "-o=build"])).into_parts();
    assert!(!bag.has_errors());
    assert_eq!(cli.unwrap().output_dir.to_str(), Some("build"));
}

#[test]
fn test_parse_args_defaults_output_to_cwd() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&["pkg.json"])).into_parts();
    assert!(!bag.has_errors());
    assert_eq!(cli.unwrap().output_dir.to_str(), Some("."));
}

#[test]
fn test_parse_args_missing_package_path() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&[])).into_parts();
    assert!(cli.is_none());
    assert_eq!(bag.with_code(DiagnosticCode::MissingPackagePathArg).len(), 1);
}

#[test]
fn test_parse_args_multiple_package_paths() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&["a.json", "b.json"])).into_parts();
    assert!(cli.is_none());
    assert_eq!(
        bag.with_code(DiagnosticCode::MultiplePackagePathArgs).len(),
        1
    );
}

#[test]
fn test_parse_args_unknown_option() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&["pkg.json", "-z"])).into_parts();
    assert!(cli.is_none());
    assert_eq!(bag.with_code(DiagnosticCode::UnknownCLIOptionName).len(), 1);
}

#[test]
fn test_parse_args_missing_option_value() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&["pkg.json", "-o"])).into_parts();
    assert!(cli.is_none());
    assert_eq!(bag.with_code(DiagnosticCode::MissingCLIOptionValue).len(), 1);
}

#[test]
fn test_parse_args_missing_option_name() {
    let mut store = SrcBufferStore::new();
    let (cli, bag) = parse_args(&mut store, &args(&["pkg.json", "-"])).into_parts();
    assert!(cli.is_none());
    assert_eq!(bag.with_code(DiagnosticCode::MissingCLIOptionName).len(), 1);
}
