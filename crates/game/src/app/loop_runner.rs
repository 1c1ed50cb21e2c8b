use std::process::ExitCode;

use strata_engine::{run_app, AppError};
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_app(app.config, app.machine) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::TooManyFaults { limit }) => {
            error!(limit, "stopped_on_repeated_faults");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
