//! The `ace` command-line interface: argument scanning, the compile
//! driver, and diagnostic printing. Exit code 0 means the global bag
//! carried no errors.

mod args;
mod run;

pub use args::{parse_args, CliArgs};
pub use run::run_compiler;

use std::io::Write;

use ace_error::{render_group, DiagnosticBag};
use ace_span::SrcBufferStore;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Entry point used by the binary: compile and report, returning the
/// process exit code.
pub fn main(cli_args: &[String]) -> i32 {
    let mut store = SrcBufferStore::new();
    let mut bag = DiagnosticBag::new();

    let parsed = bag.collect_opt(parse_args(&mut store, cli_args));
    let Some(cli) = parsed else {
        print_diagnostics(&store, &bag);
        return 1;
    };

    let buffers = run_compiler(store, &mut bag, &cli);
    print_diagnostics(&buffers, &bag);
    if bag.has_errors() {
        1
    } else {
        0
    }
}

fn print_diagnostics(store: &SrcBufferStore, bag: &DiagnosticBag) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    for group in bag.groups() {
        let rendered = render_group(store, group, stderr.supports_color());
        let _ = writeln!(stderr, "{}", rendered);
    }
}

pub(crate) fn print_status(verb: &str, detail: &str, color: Color) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    let _ = stdout.set_color(&spec);
    let _ = write!(stdout, "{:>12}", verb);
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", detail);
}

#[cfg(test)]
mod tests;
