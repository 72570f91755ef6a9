use crate::{CliArgBuffer, FileBuffer, SrcBuffer, SrcBufferStore, SrcLocation};

#[test]
fn test_line_column() {
    let buffer = FileBuffer::new("main.ace", "module m {\n    pub x: i32;\n}\n");
    assert_eq!(buffer.line_column(0), (1, 0));
    assert_eq!(buffer.line_column(7), (1, 7));
    assert_eq!(buffer.line_column(11), (2, 0));
    assert_eq!(buffer.line_column(15), (2, 4));
    assert_eq!(buffer.line_text(2), "    pub x: i32;");
}

#[test]
fn test_store_position_and_snippet() {
    let mut store = SrcBufferStore::new();
    let id = store.add_file("lib.ace", "struct Pair {\n    first: i32,\n}\n");
    let location = SrcLocation::new(id, 7, 11);
    assert_eq!(store.snippet(location), Some("Pair"));
    let position = store.position(location);
    assert_eq!(position.filename, "lib.ace");
    assert_eq!(position.line, 1);
    assert_eq!(position.column, 7);
}

#[test]
fn test_cli_arg_buffer_ranges() {
    let args = vec!["package.json".to_string(), "-o".to_string(), "out".to_string()];
    let buffer = CliArgBuffer::new(&args);
    assert_eq!(buffer.text(), "package.json -o out");
    assert_eq!(buffer.arg_range(1), (13, 15));

    let mut store = SrcBufferStore::new();
    let id = store.add(SrcBuffer::CliArgs(buffer));
    let (start, end) = (16, 19);
    assert_eq!(store.snippet(SrcLocation::new(id, start, end)), Some("out"));
}

#[test]
fn test_dummy_location_resolves_to_default() {
    let store = SrcBufferStore::new();
    let position = store.position(SrcLocation::dummy());
    assert_eq!(position.filename, "");
}
