use std::process::ExitCode;

fn main() -> ExitCode {
    match pump_diagnostics::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pdx: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
