//! The compile driver: package file → source buffers → parse → core →
//! emission handoff. Always returns the buffer store so diagnostics can
//! render, however far it got.

use ace_ast::ItemSyntax;
use ace_error::{Diagnostic, DiagnosticBag, DiagnosticCode, Severity};
use ace_sema::{compile, Compilation, NullGlueProvider};
use ace_span::SrcBufferStore;
use termcolor::Color;

use crate::args::CliArgs;
use crate::print_status;

pub fn run_compiler(
    mut store: SrcBufferStore,
    bag: &mut DiagnosticBag,
    cli: &CliArgs,
) -> SrcBufferStore {
    let package = bag.collect_opt(ace_config::load_package(
        &mut store,
        &cli.package_path,
        Some(cli.package_path_location),
    ));
    let Some(package) = package else {
        return store;
    };

    print_status("Compiling", &package.name, Color::Green);

    // Read every source file into the store before parsing anything, so
    // diagnostics across files render uniformly.
    let mut parsed: Vec<ItemSyntax> = Vec::new();
    for path in &package.src_file_paths {
        let text = match std::fs::read_to_string(path) {
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
                        Some(cli.package_path_location),
                        format!("{}: {}", path.display(), error),
                    )
                    .with_code(code),
                );
                continue;
            }
        };
        let buffer = store.add_file(path, text);
        if let Some(items) = bag.collect_opt(ace_parser::parse_buffer(&store, buffer)) {
            parsed.extend(items);
        }
    }

    let mut comp =
        Compilation::with_buffers(package.name.clone(), cli.output_dir.clone(), store);
    let mut glue = NullGlueProvider;
    let model = bag.collect(compile(&mut comp, &parsed, &mut glue));

    if bag.has_errors() || model.is_none() {
        print_status("Failed", &package.name, Color::Red);
    } else {
        print_status("Finished", &package.name, Color::Green);
    }

    comp.buffers
}
