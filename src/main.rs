use std::process::ExitCode;

fn main() -> ExitCode {
    skeleton_completer_lib::run()
}
