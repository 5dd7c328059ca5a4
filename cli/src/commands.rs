use crate::pipeline::{load_profile, PipelineConfig};
use crate::CliError;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use emissions::fit::FitConfig;
use std::path::PathBuf;

/// Infer new poly(A) emission parameters.
///
/// The new samples are labeled by the segmentation of the old kmer models,
/// then a Gaussian (START, LEADER, POLYA) or a two-component Gaussian mixture (ADAPTER, TRANSCRIPT)
/// is fitted to each region.
#[derive(Parser, Debug)]
#[command(name = "reestimate_emissions")]
#[command(author, version, long_about = None)]
pub struct Args {
    /// Path to TSV file of old samples (`polya-samples` lines by the old kmer models).
    pub old_samples_tsv: PathBuf,
    /// Path to segmentations for reads (`polya-segmentation` lines by the old kmer models).
    pub segmentation_tsv: PathBuf,
    /// Path to TSV file of new samples (`polya-samples` lines by the new kmer models).
    pub new_samples_tsv: PathBuf,
    /// If false, only print the new estimated parameters.
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub benchmark: bool,
    /// Set the seed of the initial guess of the EM. Overrides the profile.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Set the maximum number of the EM iterations. Overrides the profile.
    #[arg(long)]
    pub max_iteration: Option<usize>,
    /// TOML file of the fitting parameters.
    #[arg(long, value_name = "TOML")]
    pub profile: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
    pub fn to_config(&self) -> Result<PipelineConfig, CliError> {
        let mut fit = match self.profile.as_ref() {
            Some(path) => load_profile(path)?,
            None => FitConfig::default(),
        };
        if let Some(seed) = self.seed {
            fit.seed = seed;
        }
        if let Some(max_iteration) = self.max_iteration {
            fit.max_iteration = max_iteration;
        }
        Ok(PipelineConfig::new(
            self.old_samples_tsv.clone(),
            self.segmentation_tsv.clone(),
            self.new_samples_tsv.clone(),
            self.benchmark,
            fit,
        ))
    }
}
