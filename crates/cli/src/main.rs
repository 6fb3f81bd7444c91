use std::process::ExitCode;

fn main() -> ExitCode {
    furnish_cli::run()
}
