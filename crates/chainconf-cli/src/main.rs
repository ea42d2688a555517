use std::process::ExitCode;

fn main() -> ExitCode {
    chainconf_cli::run()
}
