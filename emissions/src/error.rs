use definitions::RegionLabel;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReestimateError {
    #[error("Input file {} does not exist", .0.display())]
    InputMissing(PathBuf),
    #[error("{}:{}: invalid value `{}` in column {}", .path.display(), .line, .value, .column)]
    Parse {
        path: PathBuf,
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("{}:{}: column {} is missing", .path.display(), .line, .column)]
    MissingColumn {
        path: PathBuf,
        line: usize,
        column: &'static str,
    },
    #[error("No new samples fall in the {0} region")]
    EmptyRegion(RegionLabel),
    #[error("No old log-likelihoods are labeled as {0}")]
    EmptyOldRegion(RegionLabel),
    #[error("{region} has only {len} samples, too few for a {k}-component mixture")]
    TooFewSamples {
        region: RegionLabel,
        len: usize,
        k: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
