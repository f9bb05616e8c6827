use std::process::ExitCode;

fn main() -> ExitCode {
    neuralbites_cli::run()
}
