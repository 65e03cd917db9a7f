use std::process::ExitCode;

mod bootstrap;
mod config;
mod gameplay;
mod loop_runner;

pub(crate) fn run() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(error) => {
            tracing::error!(error = %error, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
