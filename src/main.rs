use std::process::ExitCode;

fn main() -> ExitCode {
    match pdfpix::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
