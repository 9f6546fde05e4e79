use std::process::ExitCode;

fn main() -> ExitCode {
    pricer::run()
}
