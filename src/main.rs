use std::process::ExitCode;

fn main() -> ExitCode {
    match terracat::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
