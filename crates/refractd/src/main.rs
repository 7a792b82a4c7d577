//! Entry point for the refract protocol daemon.

use std::io::{self, Write};
use std::process::ExitCode;

use refractd::{SystemConfigLoader, bootstrap_with};

fn main() -> ExitCode {
    let mut daemon = match bootstrap_with(&SystemConfigLoader) {
        Ok(daemon) => daemon,
        Err(error) => {
            writeln!(io::stderr().lock(), "refractd: {error}").ok();
            return ExitCode::FAILURE;
        }
    };

    match daemon.serve(io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(
                target: concat!(env!("CARGO_PKG_NAME"), "::dispatch"),
                %error,
                "protocol stream failed"
            );
            ExitCode::FAILURE
        }
    }
}
