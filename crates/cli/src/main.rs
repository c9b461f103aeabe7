use std::process::ExitCode;

fn main() -> ExitCode {
    aseobi_cli::run()
}
