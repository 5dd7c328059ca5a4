pub mod commands;
pub mod pipeline;
use emissions::ReestimateError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Reestimate(#[from] ReestimateError),
    #[error("Invalid profile {}: {}", .path.display(), .source)]
    Profile {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
