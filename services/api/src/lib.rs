mod cli;
mod infra;
mod lookup;
mod routes;
mod server;

use property_details::error::AppError;
use std::fmt;

/// Failure of one invocation, split by where it gets reported.
#[derive(Debug)]
pub enum RunError {
    /// One-shot address lookup; reported as `Error: <message>` on stdout.
    Lookup(AppError),
    /// Server startup or runtime failure; reported on stderr.
    Serve(AppError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Lookup(err) | RunError::Serve(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Lookup(err) | RunError::Serve(err) => Some(err),
        }
    }
}

pub async fn run() -> Result<(), RunError> {
    cli::run().await
}
