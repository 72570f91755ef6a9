//! Terminal rendering of diagnostic groups: severity, primary location,
//! the offending source line with an underline, and attached notes.

use ace_span::{SrcBuffer, SrcBufferStore, SrcLocation};
use annotate_snippets::{
    display_list::{DisplayList, FormatOptions},
    snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation},
};

use crate::{Diagnostic, DiagnosticGroup, Severity};

fn annotation_type(severity: Severity) -> AnnotationType {
    match severity {
        Severity::Info => AnnotationType::Info,
        Severity::Note => AnnotationType::Note,
        Severity::Warning => AnnotationType::Warning,
        Severity::Error => AnnotationType::Error,
    }
}

struct ResolvedSlice {
    origin: String,
    line_text: String,
    line_start: usize,
    // Char-based range of the underline within `line_text`.
    range: (usize, usize),
}

fn resolve_slice(store: &SrcBufferStore, location: SrcLocation) -> Option<ResolvedSlice> {
    let buffer = store.get(location.buffer)?;
    let position = store.position(location);
    match buffer {
        SrcBuffer::File(file) => {
            let line_text = file.line_text(position.line).to_string();
            let line_byte_start = file.line_start(position.line);
            // Clamp the underline to the primary line.
            let char_len = line_text.chars().count();
            let start_byte = (location.start - line_byte_start).min(line_text.len());
            let end_byte = (location.end.saturating_sub(line_byte_start)).min(line_text.len());
            let range = if char_len == 0 {
                (0, 0)
            } else {
                let start = line_text[..start_byte].chars().count().min(char_len - 1);
                let end = line_text[..end_byte].chars().count().clamp(start + 1, char_len);
                (start, end)
            };
            Some(ResolvedSlice {
                origin: position.filename,
                line_text,
                line_start: position.line,
                range,
            })
        }
        SrcBuffer::CliArgs(args) => {
            let line_text = args.text().to_string();
            let range = if line_text.is_empty() {
                (0, 0)
            } else {
                let start = location.start.min(line_text.len() - 1);
                let end = location.end.clamp(start + 1, line_text.len());
                (start, end)
            };
            Some(ResolvedSlice {
                origin: "<command line>".to_string(),
                line_text,
                line_start: 1,
                range,
            })
        }
    }
}

fn render_one(store: &SrcBufferStore, diagnostic: &Diagnostic, color: bool) -> String {
    let kind = annotation_type(diagnostic.severity);
    let resolved = diagnostic
        .location
        .filter(|location| !location.is_dummy())
        .and_then(|location| resolve_slice(store, location));

    match resolved {
        Some(slice) => {
            let snippet = Snippet {
                title: Some(Annotation {
                    id: None,
                    label: Some(&diagnostic.message),
                    annotation_type: kind,
                }),
                footer: vec![],
                slices: vec![Slice {
                    source: &slice.line_text,
                    line_start: slice.line_start,
                    origin: Some(&slice.origin),
                    annotations: vec![SourceAnnotation {
                        range: slice.range,
                        label: "",
                        annotation_type: kind,
                    }],
                    fold: false,
                }],
                opt: FormatOptions {
                    color,
                    anonymized_line_numbers: false,
                    margin: None,
                },
            };
            format!("{}", DisplayList::from(snippet))
        }
        None => format!("{}: {}", diagnostic.severity, diagnostic.message),
    }
}

/// Render one diagnostic group: the primary diagnostic followed by its
/// notes, each on its own snippet.
pub fn render_group(store: &SrcBufferStore, group: &DiagnosticGroup, color: bool) -> String {
    let mut output = render_one(store, &group.primary, color);
    for note in &group.notes {
        output.push('\n');
        output.push_str(&render_one(store, note, color));
    }
    output
}
