use std::process::ExitCode;

fn main() -> ExitCode {
    match banker_cli::run() {
        Ok(code) => code,
        Err(e) => {
            banker_cli::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
