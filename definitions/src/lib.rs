//! Definitions -- the records and parameters shared by the emission re-estimation tools.
//! The upstream poly(A) segmenter emits two kinds of TSV lines, `polya-samples` and `polya-segmentation`.
//! Each line is parsed into a [SampleRow](SampleRow) or a [SegmentRow](SegmentRow), and the fitted
//! emission parameters are represented by [FittedGaussian](FittedGaussian) and [FittedMixture](FittedMixture).

use serde::{Deserialize, Serialize};

/// ln(1/sqrt(2pi))
const LOG_INV_SQRT_2PI: f64 = -0.918_938_533_204_672_8;

/// One `polya-samples` line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleRow {
    pub tag: String,
    /// Read ID. It can be a prefix of the ID in the segmentation file.
    pub read_id: String,
    pub contig: String,
    /// 0-index position of the sample in the read.
    pub index: i64,
    pub sample: f64,
    pub scaled_sample: f64,
    pub start_llh: f64,
    pub leader_llh: f64,
    pub adapter_llh: f64,
    pub polya_llh: f64,
    pub cliff_llh: f64,
    pub transcript_llh: f64,
    /// The region label given by the segmenter, such as `POLYA`.
    pub region: String,
}

impl SampleRow {
    /// The log-likelihood of this sample under the model of `region`.
    /// Returns None for [RegionLabel::Unknown].
    pub fn llh_of(&self, region: RegionLabel) -> Option<f64> {
        match region {
            RegionLabel::Start => Some(self.start_llh),
            RegionLabel::Leader => Some(self.leader_llh),
            RegionLabel::Adapter => Some(self.adapter_llh),
            RegionLabel::PolyA => Some(self.polya_llh),
            RegionLabel::Transcript => Some(self.transcript_llh),
            RegionLabel::Unknown => None,
        }
    }
}

/// One `polya-segmentation` line.
/// The boundaries are sample indices. They should be non-decreasing, but it is not checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentRow {
    pub tag: String,
    pub read_id: String,
    pub position: i64,
    pub leader_start: i64,
    pub adapter_start: i64,
    pub polya_start: i64,
    pub polya_end: i64,
    pub rate: f64,
    pub polya_length: f64,
    pub adapter_length: f64,
}

impl SegmentRow {
    pub fn boundaries(&self) -> (i64, i64, i64, i64) {
        (
            self.leader_start,
            self.adapter_start,
            self.polya_start,
            self.polya_end,
        )
    }
}

/// Region of a sample. CLIFF is never produced, as we have no signal to detect it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RegionLabel {
    Start,
    Leader,
    Adapter,
    PolyA,
    Transcript,
    Unknown,
}

impl RegionLabel {
    /// Regions to be fitted, in the order of the report.
    pub const REGIONS: [RegionLabel; 5] = [
        RegionLabel::Start,
        RegionLabel::Leader,
        RegionLabel::Adapter,
        RegionLabel::PolyA,
        RegionLabel::Transcript,
    ];
    /// The name used in the `region` column.
    pub fn name(&self) -> &'static str {
        match self {
            RegionLabel::Start => "START",
            RegionLabel::Leader => "LEADER",
            RegionLabel::Adapter => "ADAPTER",
            RegionLabel::PolyA => "POLYA",
            RegionLabel::Transcript => "TRANSCRIPT",
            RegionLabel::Unknown => "UNKNOWN",
        }
    }
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "START" => Some(RegionLabel::Start),
            "LEADER" => Some(RegionLabel::Leader),
            "ADAPTER" => Some(RegionLabel::Adapter),
            "POLYA" => Some(RegionLabel::PolyA),
            "TRANSCRIPT" => Some(RegionLabel::Transcript),
            "UNKNOWN" => Some(RegionLabel::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A univariate normal distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FittedGaussian {
    pub mean: f64,
    pub variance: f64,
}

impl FittedGaussian {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self { mean, variance }
    }
    pub fn stdv(&self) -> f64 {
        self.variance.sqrt()
    }
    pub fn log_density(&self, x: f64) -> f64 {
        let sd = self.stdv();
        let alpha = (x - self.mean) / sd;
        LOG_INV_SQRT_2PI - sd.ln() - 0.5 * alpha * alpha
    }
}

impl std::fmt::Display for FittedGaussian {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "mu = {}, var = {}, stdv = {}",
            self.mean,
            self.variance,
            self.stdv()
        )
    }
}

/// A component of a Gaussian mixture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MixtureComponent {
    pub weight: f64,
    pub gaussian: FittedGaussian,
}

impl MixtureComponent {
    pub fn new(weight: f64, mean: f64, variance: f64) -> Self {
        Self {
            weight,
            gaussian: FittedGaussian::new(mean, variance),
        }
    }
}

impl std::fmt::Display for MixtureComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "pi = {}, {}", self.weight, self.gaussian)
    }
}

/// Gaussian mixture. The order of the components is the one the fitting routine returned.
/// Weights are not checked to sum up to one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FittedMixture {
    pub components: Vec<MixtureComponent>,
}

impl FittedMixture {
    pub fn new(components: Vec<MixtureComponent>) -> Self {
        Self { components }
    }
    /// log(sum_c w_c N(x|mu_c, var_c)), by log-sum-exp.
    pub fn log_density(&self, x: f64) -> f64 {
        let lks: Vec<_> = self
            .components
            .iter()
            .map(|c| c.weight.ln() + c.gaussian.log_density(x))
            .collect();
        logsumexp(&lks)
    }
}

fn logsumexp(xs: &[f64]) -> f64 {
    let max = xs.iter().fold(std::f64::NEG_INFINITY, |x, &y| x.max(y));
    if max.is_infinite() {
        return max;
    }
    let sum = xs.iter().map(|x| (x - max).exp()).sum::<f64>().ln();
    max + sum
}
