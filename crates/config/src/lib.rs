//! Package-manifest loading: a JSON file naming the package and its
//! source files, with `$macro` path substitutions and `*`/`**` file-set
//! expansion. Every shape mistake is a located diagnostic; only an
//! unreadable or unparsable manifest short-circuits.

mod path;

pub use path::{expand_src_path, PathMacro, PathPatternError};

use std::path::{Path, PathBuf};

use ace_error::{Diagnostic, DiagnosticBag, DiagnosticCode, Expected, Severity};
use ace_span::{SrcBufferStore, SrcLocation};
use serde_json::Value;

/// A loaded package description.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub path_macros: Vec<PathMacro>,
    pub src_file_paths: Vec<PathBuf>,
    pub dep_file_paths: Vec<PathBuf>,
}

mod property {
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const PATH_MACROS: &str = "path_macros";
    pub const SRC_FILES: &str = "src_files";
    pub const DEP_FILES: &str = "dep_files";
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn json_type_name_with_article(expected: &'static str) -> String {
    match expected {
        "array" | "object" => format!("an {}", expected),
        other => format!("a {}", other),
    }
}

fn unexpected_property_warning(location: SrcLocation, name: &str) -> Diagnostic {
    Diagnostic::new(
        Severity::Warning,
        Some(location),
        format!("unexpected property `{}`", name),
    )
    .with_code(DiagnosticCode::UnexpectedPackageProperty)
}

fn unexpected_property_type_error(
    location: SrcLocation,
    name: &str,
    value: &Value,
    expected: &'static str,
) -> Diagnostic {
    Diagnostic::error(
        location,
        format!(
            "unexpected `{}` of property `{}`, expected {}",
            json_type_name(value),
            name,
            json_type_name_with_article(expected)
        ),
    )
    .with_code(DiagnosticCode::UnexpectedPackagePropertyType)
}

fn missing_property_error(location: SrcLocation, name: &str) -> Diagnostic {
    Diagnostic::error(location, format!("missing property `{}`", name))
        .with_code(DiagnosticCode::MissingPackageProperty)
}

/// Load and expand a package file. `arg_location` is where the path was
/// written (the command line), so file errors point somewhere useful.
pub fn load_package(
    store: &mut SrcBufferStore,
    package_path: &Path,
    arg_location: Option<SrcLocation>,
) -> Expected<Package> {
    let mut bag = DiagnosticBag::new();

    let text = match std::fs::read_to_string(package_path) {
        Ok(text) => text,
        Err(error) => {
            let code = if error.kind() == std::io::ErrorKind::NotFound {
                DiagnosticCode::FileNotFound
            } else {
                DiagnosticCode::FileSystem
            };
            bag.add(
                Diagnostic::new(
                    Severity::Error,
                    arg_location,
                    format!("{}: {}", package_path.display(), error),
                )
                .with_code(code),
            );
            return Expected::none(bag);
        }
    };

    let buffer = store.add_file(package_path, text.clone());
    // Shape diagnostics all point at the start of the manifest.
    let first_location = SrcLocation::new(buffer, 0, 1.min(text.len().max(1)));

    let root: Value = match serde_json::from_str(&text) {
        Ok(root) => root,
        Err(error) => {
            bag.add(
                Diagnostic::error(first_location, format!("invalid package file: {}", error))
                    .with_code(DiagnosticCode::InvalidPackageJson),
            );
            return Expected::none(bag);
        }
    };
    let Value::Object(properties) = root else {
        bag.add(
            Diagnostic::error(first_location, "package file must be a JSON object")
                .with_code(DiagnosticCode::InvalidPackageJson),
        );
        return Expected::none(bag);
    };

    let mut name = None;
    let mut path_macros = Vec::new();
    let mut src_patterns: Vec<String> = Vec::new();
    let mut dep_patterns: Vec<String> = Vec::new();

    for (key, value) in &properties {
        match key.as_str() {
            property::NAME => match value {
                Value::String(value) => name = Some(value.clone()),
                other => bag_add_type(&mut bag, first_location, key, other, "string"),
            },
            property::PATH_MACROS => match value {
                Value::Array(entries) => {
                    for entry in entries {
                        match parse_path_macro(entry) {
                            Some(path_macro) => path_macros.push(path_macro),
                            None => {
                                bag_add_type(&mut bag, first_location, key, entry, "object")
                            }
                        }
                    }
                }
                other => bag_add_type(&mut bag, first_location, key, other, "array"),
            },
            property::SRC_FILES => match value {
                Value::Array(entries) => {
                    collect_strings(&mut bag, first_location, key, entries, &mut src_patterns)
                }
                other => bag_add_type(&mut bag, first_location, key, other, "array"),
            },
            property::DEP_FILES => match value {
                Value::Array(entries) => {
                    collect_strings(&mut bag, first_location, key, entries, &mut dep_patterns)
                }
                other => bag_add_type(&mut bag, first_location, key, other, "array"),
            },
            unknown => {
                bag.add(unexpected_property_warning(first_location, unknown));
            }
        }
    }

    let Some(name) = name else {
        bag.add(missing_property_error(first_location, property::NAME));
        return Expected::none(bag);
    };
    if !properties.contains_key(property::SRC_FILES) {
        bag.add(missing_property_error(first_location, property::SRC_FILES));
        return Expected::none(bag);
    }

    let base_dir = package_path.parent().unwrap_or(Path::new("."));
    let mut src_file_paths = Vec::new();
    for pattern in &src_patterns {
        match expand_src_path(base_dir, pattern, &path_macros) {
            Ok(mut paths) => src_file_paths.append(&mut paths),
            Err(error) => {
                bag.add(error.into_diagnostic(first_location));
            }
        }
    }
    let mut dep_file_paths = Vec::new();
    for pattern in &dep_patterns {
        match expand_src_path(base_dir, pattern, &path_macros) {
            Ok(mut paths) => dep_file_paths.append(&mut paths),
            Err(error) => {
                bag.add(error.into_diagnostic(first_location));
            }
        }
    }

    Expected::found_with(
        Package {
            name,
            path_macros,
            src_file_paths,
            dep_file_paths,
        },
        bag,
    )
}

fn bag_add_type(
    bag: &mut DiagnosticBag,
    location: SrcLocation,
    key: &str,
    value: &Value,
    expected: &'static str,
) {
    bag.add(unexpected_property_type_error(location, key, value, expected));
}

fn collect_strings(
    bag: &mut DiagnosticBag,
    location: SrcLocation,
    key: &str,
    entries: &[Value],
    out: &mut Vec<String>,
) {
    for entry in entries {
        match entry {
            Value::String(value) => out.push(value.clone()),
            other => bag_add_type(bag, location, key, other, "string"),
        }
    }
}

fn parse_path_macro(entry: &Value) -> Option<PathMacro> {
    let Value::Object(fields) = entry else {
        return None;
    };
    let name = fields.get(property::NAME)?.as_str()?.to_string();
    let value = fields.get(property::VALUE)?.as_str()?.to_string();
    Some(PathMacro { name, value })
}

#[cfg(test)]
mod tests;
