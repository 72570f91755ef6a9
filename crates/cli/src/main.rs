//! `ace <package_file> [-o <output_dir>]`

use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    ExitCode::from(ace_cmd::main(&args) as u8)
}
