//! Source-path expansion: `$macro` substitution on the first segment, and
//! `*`/`**` glob segments filtered by extension. `src/*.ace` matches one
//! directory, `src/**.ace` recurses.

use std::path::{Path, PathBuf};

use ace_error::{Diagnostic, DiagnosticCode, DiagnosticGroup};
use ace_span::SrcLocation;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct PathMacro {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum PathPatternError {
    #[error("undefined reference to macro `${0}`")]
    UndefinedMacro(String),
    #[error("trailing characters in path before extension `{0}`")]
    TrailingCharacters(String),
    #[error("trailing `/` in path `{0}`")]
    TrailingSlash(String),
    #[error("invalid path pattern `{0}`")]
    InvalidPattern(String),
}

impl PathPatternError {
    pub fn into_diagnostic(self, location: SrcLocation) -> DiagnosticGroup {
        let code = match &self {
            PathPatternError::UndefinedMacro(_) => DiagnosticCode::UndefinedRefToPackagePathMacro,
            PathPatternError::TrailingCharacters(_) => {
                DiagnosticCode::TrailingPackagePathCharacters
            }
            PathPatternError::TrailingSlash(_) | PathPatternError::InvalidPattern(_) => {
                DiagnosticCode::TrailingPackagePathCharacters
            }
        };
        DiagnosticGroup::new(Diagnostic::error(location, self.to_string()).with_code(code))
    }
}

/// Expand one `src_files` entry into concrete file paths, relative to the
/// package file's directory.
pub fn expand_src_path(
    base_dir: &Path,
    pattern: &str,
    macros: &[PathMacro],
) -> Result<Vec<PathBuf>, PathPatternError> {
    if pattern.ends_with('/') {
        return Err(PathPatternError::TrailingSlash(pattern.to_string()));
    }

    let mut parts: Vec<String> = pattern.split('/').map(str::to_string).collect();

    if let Some(first) = parts.first() {
        if let Some(macro_name) = first.strip_prefix('$') {
            let expansion = macros
                .iter()
                .find(|candidate| candidate.name == macro_name)
                .ok_or_else(|| PathPatternError::UndefinedMacro(macro_name.to_string()))?;
            parts[0] = expansion.value.clone();
        }
    }

    let last = parts.last().cloned().unwrap_or_default();
    if !last.starts_with('*') {
        let mut path = base_dir.to_path_buf();
        for part in &parts {
            path.push(part);
        }
        return Ok(vec![path]);
    }

    // `*` or `**`, then the extension: anything between them is an error.
    let (stars, rest) = if let Some(rest) = last.strip_prefix("**") {
        ("**", rest)
    } else {
        ("*", last.strip_prefix('*').unwrap_or(""))
    };
    if !rest.is_empty() && !rest.starts_with('.') {
        let trailing = rest
            .split('.')
            .next()
            .unwrap_or(rest)
            .to_string();
        return Err(PathPatternError::TrailingCharacters(trailing));
    }

    let mut glob_pattern = base_dir.to_path_buf();
    for part in &parts[..parts.len() - 1] {
        glob_pattern.push(part);
    }
    match stars {
        "**" => {
            glob_pattern.push("**");
            glob_pattern.push(format!("*{}", rest));
        }
        _ => glob_pattern.push(format!("*{}", rest)),
    }

    let pattern_text = glob_pattern.to_string_lossy().to_string();
    let walker = glob::glob(&pattern_text)
        .map_err(|_| PathPatternError::InvalidPattern(pattern_text.clone()))?;

    let mut paths: Vec<PathBuf> = walker
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    Ok(paths)
}
