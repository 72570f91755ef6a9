//! The argument scanner. Arguments live in a synthetic source buffer so
//! every CLI diagnostic underlines the offending argument like any other
//! source snippet.

use std::path::PathBuf;

use ace_error::{Diagnostic, DiagnosticBag, DiagnosticCode, Expected, Severity};
use ace_span::{BufferId, CliArgBuffer, SrcBuffer, SrcBufferStore, SrcLocation};

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub package_path: PathBuf,
    pub package_path_location: SrcLocation,
    pub output_dir: PathBuf,
    pub buffer: BufferId,
}

/// The option table: name, takes-value. Growth is one line here.
const OPTIONS: &[(&str, bool)] = &[("o", true)];

pub fn parse_args(store: &mut SrcBufferStore, args: &[String]) -> Expected<CliArgs> {
    let mut bag = DiagnosticBag::new();
    let arg_buffer = CliArgBuffer::new(args);
    let buffer = store.add(SrcBuffer::CliArgs(arg_buffer.clone()));
    let location_of = |index: usize| {
        let (start, end) = arg_buffer.arg_range(index);
        SrcLocation::new(buffer, start, end)
    };

    let mut package: Option<(PathBuf, SrcLocation)> = None;
    let mut output_dir: Option<PathBuf> = None;

    let mut index = 0;
    while index < args.len() {
        let arg = &args[index];
        let location = location_of(index);
        if let Some(rest) = arg.strip_prefix('-') {
            if rest.is_empty() {
                bag.add(
                    Diagnostic::error(location, "missing option name")
                        .with_code(DiagnosticCode::MissingCLIOptionName),
                );
                index += 1;
                continue;
            }
            // `-name value` or `-name=value`.
            let (name, inline_value) = match rest.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (rest, None),
            };
            match OPTIONS.iter().find(|(option, _)| *option == name) {
                Some((_, true)) => {
                    if let Some(value) = inline_value {
                        output_dir = Some(PathBuf::from(value));
                    } else {
                        match args.get(index + 1) {
                            Some(value) if !value.starts_with('-') => {
                                output_dir = Some(PathBuf::from(value));
                                index += 2;
                                continue;
                            }
                            _ => {
                                bag.add(
                                    Diagnostic::error(location, "missing option argument")
                                        .with_code(DiagnosticCode::MissingCLIOptionValue),
                                );
                            }
                        }
                    }
                }
                Some((_, false)) => {
                    if inline_value.is_some() {
                        bag.add(
                            Diagnostic::error(location, "unexpected option argument")
                                .with_code(DiagnosticCode::UnexpectedCLIOptionValue),
                        );
                    }
                }
                None => {
                    bag.add(
                        Diagnostic::error(location, "unknown option name")
                            .with_code(DiagnosticCode::UnknownCLIOptionName),
                    );
                }
            }
            index += 1;
            continue;
        }

        match &package {
            None => package = Some((PathBuf::from(arg), location)),
            Some(_) => {
                bag.add(
                    Diagnostic::error(location, "multiple package path arguments")
                        .with_code(DiagnosticCode::MultiplePackagePathArgs),
                );
            }
        }
        index += 1;
    }

    let Some((package_path, package_path_location)) = package else {
        bag.add(
            Diagnostic::new(Severity::Error, None, "missing package path argument")
                .with_code(DiagnosticCode::MissingPackagePathArg),
        );
        return Expected::none(bag);
    };

    if bag.has_errors() {
        return Expected::none(bag);
    }

    Expected::found_with(
        CliArgs {
            package_path,
            package_path_location,
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(".")),
            buffer,
        },
        bag,
    )
}
