use std::process::ExitCode;

fn main() -> ExitCode {
    syllabus_cli::run()
}
