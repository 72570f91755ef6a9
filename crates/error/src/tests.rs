use ace_span::{SrcBufferStore, SrcLocation};

use crate::{
    render_group, Diagnosed, Diagnostic, DiagnosticBag, DiagnosticCode, DiagnosticGroup, Expected,
    Severity,
};

#[test]
fn test_bag_severity_is_max() {
    let mut bag = DiagnosticBag::new();
    assert_eq!(bag.severity(), Severity::Info);
    bag.add(Diagnostic::new(Severity::Warning, None, "w"));
    assert_eq!(bag.severity(), Severity::Warning);
    bag.add(Diagnostic::new(Severity::Note, None, "n"));
    assert_eq!(bag.severity(), Severity::Warning);
    bag.add(Diagnostic::new(Severity::Error, None, "e"));
    assert!(bag.has_errors());
    assert_eq!(bag.error_count(), 1);
}

#[test]
fn test_collect_preserves_order() {
    let mut outer = DiagnosticBag::new();
    outer.add(Diagnostic::new(Severity::Error, None, "first"));

    let mut inner = DiagnosticBag::new();
    inner.add(Diagnostic::new(Severity::Error, None, "second"));
    inner.add(Diagnostic::new(Severity::Error, None, "third"));

    let value = outer.collect(Diagnosed::new(7, inner));
    assert_eq!(value, 7);
    let messages: Vec<_> = outer
        .groups()
        .iter()
        .map(|group| group.primary.message.as_str())
        .collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}

#[test]
fn test_collect_opt_absence() {
    let mut bag = DiagnosticBag::new();
    let expected: Expected<i32> = Expected::fail(
        Diagnostic::new(Severity::Error, None, "no value").with_code(DiagnosticCode::FileNotFound),
    );
    assert!(bag.collect_opt(expected).is_none());
    assert_eq!(bag.with_code(DiagnosticCode::FileNotFound).len(), 1);
}

#[test]
fn test_render_group_underlines_snippet() {
    let mut store = SrcBufferStore::new();
    let id = store.add_file("m.ace", "pub x: i32;\n");
    let group = DiagnosticGroup::new(
        Diagnostic::error(SrcLocation::new(id, 4, 5), "undeclared symbol `x`")
            .with_code(DiagnosticCode::UndeclaredSymbolRef),
    )
    .with_note(Diagnostic::new(Severity::Note, None, "declared here"));

    let rendered = render_group(&store, &group, false);
    assert!(rendered.contains("undeclared symbol `x`"));
    assert!(rendered.contains("m.ace"));
    assert!(rendered.contains("note: declared here"));
}

#[test]
fn test_diagnostic_without_location_renders_plain() {
    let store = SrcBufferStore::new();
    let group = DiagnosticGroup::new(Diagnostic::new(
        Severity::Error,
        None,
        "missing package path argument",
    ));
    assert_eq!(
        render_group(&store, &group, false),
        "error: missing package path argument"
    );
}
