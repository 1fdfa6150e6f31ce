mod cli;

fn main() {
    let code = {
        // Logging is best effort; a read-only home must not block the command.
        let _log_guard = cabinet_core::logging::init().ok();

        match cli::run() {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{e:#}"); // pretty anyhow chain
                1
            }
        }
    };
    std::process::exit(code);
}
