use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Position, SrcLocation};

/// Index of a buffer within the compilation's [`SrcBufferStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(pub(crate) u32);

impl BufferId {
    pub const DUMMY: BufferId = BufferId(u32::MAX);
}

/// An immutable UTF-8 source file with a line-start index, so byte offsets
/// resolve to `(path, line, column)` without rescanning.
#[derive(Debug, Clone)]
pub struct FileBuffer {
    path: PathBuf,
    text: String,
    line_starts: Vec<usize>,
}

impl FileBuffer {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            path: path.into(),
            text,
            line_starts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based line and 0-based column of a byte offset.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.text[line_start..offset.min(self.text.len())]
            .chars()
            .count();
        (line + 1, column)
    }

    /// The full text of the (1-based) line, without its newline.
    pub fn line_text(&self, line: usize) -> &str {
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        &self.text[start..end]
    }

    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts[line - 1]
    }
}

/// The synthetic buffer holding the command line, space-joined, so CLI
/// diagnostics can underline the offending argument.
#[derive(Debug, Clone)]
pub struct CliArgBuffer {
    text: String,
    arg_ranges: Vec<(usize, usize)>,
}

impl CliArgBuffer {
    pub fn new(args: &[String]) -> Self {
        let mut text = String::new();
        let mut arg_ranges = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(arg);
            arg_ranges.push((start, text.len()));
        }
        Self { text, arg_ranges }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The byte range of the `index`th argument.
    pub fn arg_range(&self, index: usize) -> (usize, usize) {
        self.arg_ranges[index]
    }
}

/// One buffer of the compilation: a source file or the command line.
#[derive(Debug, Clone)]
pub enum SrcBuffer {
    File(FileBuffer),
    CliArgs(CliArgBuffer),
}

impl SrcBuffer {
    pub fn text(&self) -> &str {
        match self {
            SrcBuffer::File(file) => file.text(),
            SrcBuffer::CliArgs(args) => args.text(),
        }
    }

    pub fn as_file(&self) -> Option<&FileBuffer> {
        match self {
            SrcBuffer::File(file) => Some(file),
            SrcBuffer::CliArgs(_) => None,
        }
    }
}

/// Append-only store of all buffers owned by one compilation.
#[derive(Debug, Default)]
pub struct SrcBufferStore {
    buffers: Vec<SrcBuffer>,
}

impl SrcBufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, buffer: SrcBuffer) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(buffer);
        id
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> BufferId {
        self.add(SrcBuffer::File(FileBuffer::new(path, text)))
    }

    pub fn get(&self, id: BufferId) -> Option<&SrcBuffer> {
        if id == BufferId::DUMMY {
            return None;
        }
        self.buffers.get(id.0 as usize)
    }

    /// Resolve a location to a printable position. Dummy locations and the
    /// CLI buffer resolve to synthetic filenames.
    pub fn position(&self, location: SrcLocation) -> Position {
        match self.get(location.buffer) {
            Some(SrcBuffer::File(file)) => {
                let (line, column) = file.line_column(location.start);
                Position {
                    filename: file.path().display().to_string(),
                    line,
                    column,
                }
            }
            Some(SrcBuffer::CliArgs(_)) => Position {
                filename: "<command line>".to_string(),
                line: 1,
                column: location.start,
            },
            None => Position::default(),
        }
    }

    /// The source text a location points at.
    pub fn snippet(&self, location: SrcLocation) -> Option<&str> {
        let text = self.get(location.buffer)?.text();
        text.get(location.start..location.end)
    }
}
