//! Pipeline -- the whole re-estimation, from the three TSV files to the report.
//!
//! 1. Read the old samples, the old segmentations, and the new samples.
//! 2. Label the new samples by the old segmentations.
//! 3. Fit the emissions of each region and print them.
//! 4. Optionally, compare the average log-likelihoods of the old and the new emissions.
use crate::CliError;
use emissions::aggregate::{aggregate_old_likelihoods, aggregate_samples};
use emissions::benchmark::{benchmark, write_benchmark, write_parameters};
use emissions::fit::{EmissionFitter, FitConfig, FittedEmissions, MaximumLikelihood};
use emissions::records::{read_samples, read_segmentations};
use emissions::segmentation::SegmentationIndex;
use emissions::{ReestimateError, Result};
use log::*;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The configuration of the pipeline.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// `polya-samples` lines generated by the old kmer models.
    old_samples: PathBuf,
    /// `polya-segmentation` lines generated by the old kmer models.
    segmentation: PathBuf,
    /// `polya-samples` lines generated by the new kmer models.
    new_samples: PathBuf,
    /// If false, only the parameters are reported.
    benchmark: bool,
    fit: FitConfig,
}

impl PipelineConfig {
    pub fn new(
        old_samples: PathBuf,
        segmentation: PathBuf,
        new_samples: PathBuf,
        benchmark: bool,
        fit: FitConfig,
    ) -> Self {
        Self {
            old_samples,
            segmentation,
            new_samples,
            benchmark,
            fit,
        }
    }
    pub fn fit_config(&self) -> &FitConfig {
        &self.fit
    }
    pub fn benchmark(&self) -> bool {
        self.benchmark
    }
}

/// Read a fitting profile. Keys not in the file take the default values.
pub fn load_profile<P: AsRef<Path>>(path: P) -> std::result::Result<FitConfig, CliError> {
    let path = path.as_ref();
    let profile = std::fs::read_to_string(path)?;
    toml::from_str(&profile).map_err(|source| CliError::Profile {
        path: path.to_path_buf(),
        source,
    })
}

pub fn run_pipeline<W: Write>(config: &PipelineConfig, wtr: &mut W) -> Result<()> {
    let fitter = MaximumLikelihood::new(config.fit);
    run_pipeline_with(config, &fitter, wtr)
}

/// Run the pipeline with an arbitrary fitting backend.
pub fn run_pipeline_with<F: EmissionFitter, W: Write>(
    config: &PipelineConfig,
    fitter: &F,
    wtr: &mut W,
) -> Result<()> {
    let PipelineConfig {
        old_samples,
        segmentation,
        new_samples,
        benchmark: to_benchmark,
        fit,
    } = config;
    for path in [old_samples, segmentation, new_samples].iter() {
        if !path.exists() {
            return Err(ReestimateError::InputMissing(path.to_path_buf()));
        }
    }
    debug!("START\tLoading");
    writeln!(wtr, "Loading data from TSV...")?;
    let old_llhs = aggregate_old_likelihoods(&read_samples(old_samples)?);
    let index = SegmentationIndex::new(read_segmentations(segmentation)?);
    let new_rows = read_samples(new_samples)?;
    let samples = aggregate_samples(&new_rows, &index);
    info!(
        "Loaded\t{} old samples\t{} reads\t{} new samples\t{} unlabeled",
        old_llhs.total(),
        index.len(),
        new_rows.len(),
        samples.unknown()
    );
    writeln!(wtr, "... Datasets loaded.")?;
    debug!("START\tFitting");
    writeln!(
        wtr,
        "Fitting gaussians to new scaled samples (this may take a while)..."
    )?;
    let emissions = FittedEmissions::fit(fitter, &samples, fit.component_num)?;
    write_parameters(wtr, &emissions)?;
    if !to_benchmark {
        return Ok(());
    }
    debug!("START\tBenchmark");
    let benchmarks = benchmark(&old_llhs, &samples, &emissions)?;
    write_benchmark(wtr, &benchmarks)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::RegionLabel;
    use std::io::BufWriter;
    // (read ID in the segmentation, read ID in the samples, boundaries)
    const READ: (&str, &str, [i64; 4]) = ("fc06a2b1-5c1e-4f3a", "fc06a2b1", [5, 10, 15, 19]);
    const LEVELS: [f64; 5] = [70.0, 110.0, 80.0, 108.0, 100.0];
    fn work_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "reestimate_emissions_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
    fn region_of(idx: i64) -> RegionLabel {
        let [l, a, p, e] = READ.2;
        match idx {
            x if x < l => RegionLabel::Start,
            x if x < a => RegionLabel::Leader,
            x if x < p => RegionLabel::Adapter,
            x if x <= e => RegionLabel::PolyA,
            _ => RegionLabel::Transcript,
        }
    }
    fn write_samples(path: &Path, read_id: &str, shift: f64) {
        let mut wtr = std::fs::File::create(path).map(BufWriter::new).unwrap();
        for idx in 0..25i64 {
            let region = region_of(idx);
            let slot = RegionLabel::REGIONS.iter().position(|&r| r == region).unwrap();
            let scaled = LEVELS[slot] + shift + ((idx * 7) % 5) as f64;
            let llhs: Vec<_> = (0..6).map(|i| format!("{:.2}", -1.5 - i as f64)).collect();
            writeln!(
                wtr,
                "polya-samples\t{}\tchr1\t{}\t{:.1}\t{:.3}\t{}\t{}",
                read_id,
                idx,
                scaled * 5.0,
                scaled,
                llhs.join("\t"),
                region
            )
            .unwrap();
        }
        // This read has no segmentation, and CLIFF is not benchmarked.
        writeln!(
            wtr,
            "polya-samples\tdeadbeef\tchr2\t0\t500.0\t100.0\t-1\t-1\t-1\t-1\t-1\t-1\tCLIFF"
        )
        .unwrap();
    }
    fn write_segmentation(path: &Path) {
        let mut wtr = std::fs::File::create(path).map(BufWriter::new).unwrap();
        let [l, a, p, e] = READ.2;
        writeln!(
            wtr,
            "polya-segmentation\t{}\t161684804\t{}.0\t{}.0\t{}.0\t{}.0\t73.76\t75.18\t35.23",
            READ.0, l, a, p, e
        )
        .unwrap();
        // Later segmentations of the same read are ignored.
        writeln!(
            wtr,
            "polya-segmentation\t{}\t161684804\t0.0\t0.0\t0.0\t0.0\t1.0\t1.0\t1.0",
            READ.0
        )
        .unwrap();
    }
    fn fixture(name: &str, benchmark: bool) -> PipelineConfig {
        let dir = work_dir(name);
        let old_samples = dir.join("samples.old.tsv");
        let segmentation = dir.join("seg.old.tsv");
        let new_samples = dir.join("samples.new.tsv");
        write_samples(&old_samples, READ.1, 0.0);
        write_segmentation(&segmentation);
        write_samples(&new_samples, READ.1, 3.0);
        PipelineConfig::new(
            old_samples,
            segmentation,
            new_samples,
            benchmark,
            FitConfig::default(),
        )
    }
    fn run(config: &PipelineConfig) -> Result<String> {
        let mut wtr: Vec<u8> = vec![];
        run_pipeline(config, &mut wtr)?;
        Ok(String::from_utf8(wtr).unwrap())
    }
    #[test]
    fn report_shape() {
        let report = run(&fixture("report_shape", true)).unwrap();
        let params: Vec<_> = report
            .lines()
            .filter(|l| l.starts_with("New params for "))
            .collect();
        let names: Vec<_> = params
            .iter()
            .map(|l| l.trim_start_matches("New params for ").split(':').next().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["START", "LEADER", "ADAPTER0", "ADAPTER1", "POLYA", "TRANSCR0", "TRANSCR1"]
        );
        let lines: Vec<_> = report.lines().collect();
        for &region in RegionLabel::REGIONS.iter() {
            let header = format!("> Average {} log-probs:", region);
            let pos = lines.iter().position(|l| *l == header).unwrap();
            assert!(lines[pos + 1].starts_with("> Old avg. log-likelihood: "));
            assert!(lines[pos + 1].contains(" | New avg. log-likelihood: "));
        }
        let pairs = lines
            .iter()
            .filter(|l| l.starts_with("> Old avg. log-likelihood"))
            .count();
        assert_eq!(pairs, 5);
        assert_eq!(lines[0], "Loading data from TSV...");
        assert_eq!(lines[1], "... Datasets loaded.");
    }
    #[test]
    fn fitted_values() {
        let report = run(&fixture("fitted_values", true)).unwrap();
        // START: 70 + 3 + {0,2,4,1,3}, so the mean is 75 and the variance is 2.
        let start = report
            .lines()
            .find(|l| l.starts_with("New params for START"))
            .unwrap();
        assert_eq!(start, "New params for START: mu = 75, var = 2, stdv = 1.4142135623730951");
        // The old average of START is the mean of the s_llh column, -1.5.
        let lines: Vec<_> = report.lines().collect();
        let pos = lines
            .iter()
            .position(|l| *l == "> Average START log-probs:")
            .unwrap();
        assert!(lines[pos + 1].starts_with("> Old avg. log-likelihood: -1.5 | "));
    }
    #[test]
    fn without_benchmark() {
        let report = run(&fixture("without_benchmark", false)).unwrap();
        let params = report
            .lines()
            .filter(|l| l.starts_with("New params for "))
            .count();
        assert_eq!(params, 7);
        assert!(!report.contains("Benchmarks"));
        assert!(!report.contains("avg. log-likelihood"));
    }
    #[test]
    fn missing_input() {
        let config = fixture("missing_input", true);
        let dir = work_dir("missing_input");
        let absent = dir.join("absent.tsv");
        let config = PipelineConfig {
            segmentation: absent.clone(),
            ..config
        };
        let mut wtr: Vec<u8> = vec![];
        match run_pipeline(&config, &mut wtr) {
            Err(ReestimateError::InputMissing(path)) => assert_eq!(path, absent),
            x => panic!("{:?}", x),
        }
        // Nothing is done before the check.
        assert!(wtr.is_empty());
    }
    #[test]
    fn malformed_input() {
        let config = fixture("malformed_input", true);
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&config.new_samples)
            .unwrap();
        writeln!(
            file,
            "polya-samples\tfc06a2b1\tchr1\t30\t500.0\tNaN?\t-1\t-1\t-1\t-1\t-1\t-1\tTRANSCRIPT"
        )
        .unwrap();
        drop(file);
        match run(&config) {
            Err(ReestimateError::Parse { line, column, .. }) => {
                assert_eq!((line, column), (27, "scaled_sample"));
            }
            x => panic!("{:?}", x),
        }
    }
    #[test]
    fn profile() {
        let dir = work_dir("profile");
        let path = dir.join("profile.toml");
        std::fs::write(&path, "seed = 7\nmax_iteration = 20\n").unwrap();
        let config = load_profile(&path).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_iteration, 20);
        assert_eq!(config.component_num, FitConfig::default().component_num);
        assert_eq!(config.threshold, FitConfig::default().threshold);
        std::fs::write(&path, "seed = \"seven\"\n").unwrap();
        assert!(matches!(load_profile(&path), Err(CliError::Profile { .. })));
    }
}
