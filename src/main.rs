//! Vecina CLI binary.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use vecina::cli::args::VecinaArgs;
use vecina::cli::commands::execute_command;

fn main() -> ExitCode {
    let args = VecinaArgs::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .format(|buf, record| writeln!(buf, "{:>5} {}", record.level(), record.args()))
        .init();

    match execute_command(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
