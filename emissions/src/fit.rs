//! Fitting emission distributions to the scaled samples.
//!
//! The pipeline talks to the numerical backend only through [EmissionFitter].
//! [MaximumLikelihood] is the default backend: closed form MLE for a Gaussian,
//! and EM for a Gaussian mixture, started from a seeded k-means++ style guess.
use crate::aggregate::RegionValues;
use crate::misc::{logsumexp, mean};
use crate::{ReestimateError, Result};
use definitions::{FittedGaussian, FittedMixture, MixtureComponent, RegionLabel};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

const SEED: u64 = 42;
const MAX_ITERATION: usize = 1000;
// If the average log-likelihood does not improve by this value, stop iteration.
const THRESHOLD: f64 = 0.0000001;
// Floor of the variance, to keep a collapsed component finite.
const MIN_VARIANCE: f64 = 0.000001;
const COMPONENT_NUM: usize = 2;

pub trait EmissionFitter {
    /// Maximum likelihood normal distribution. None if `xs` is empty.
    fn fit_gaussian(&self, xs: &[f64]) -> Option<FittedGaussian>;
    /// `k`-component Gaussian mixture. None if `xs` has fewer than `k` values.
    fn fit_mixture(&self, xs: &[f64], k: usize) -> Option<FittedMixture>;
}

/// Parameters of the fitting. Every field can be omitted in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Seed of the initial guess of the EM.
    pub seed: u64,
    pub max_iteration: usize,
    pub threshold: f64,
    pub min_variance: f64,
    /// The number of the components of the ADAPTER and TRANSCRIPT mixtures.
    pub component_num: usize,
}

impl std::default::Default for FitConfig {
    fn default() -> Self {
        Self {
            seed: SEED,
            max_iteration: MAX_ITERATION,
            threshold: THRESHOLD,
            min_variance: MIN_VARIANCE,
            component_num: COMPONENT_NUM,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaximumLikelihood {
    config: FitConfig,
}

impl MaximumLikelihood {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }
}

impl EmissionFitter for MaximumLikelihood {
    fn fit_gaussian(&self, xs: &[f64]) -> Option<FittedGaussian> {
        let mean = mean(xs)?;
        let variance = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64;
        Some(FittedGaussian::new(mean, variance))
    }
    fn fit_mixture(&self, xs: &[f64], k: usize) -> Option<FittedMixture> {
        if k == 0 || xs.len() < k {
            return None;
        }
        let FitConfig {
            seed,
            max_iteration,
            threshold,
            min_variance,
            ..
        } = self.config;
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let mut components = initial_components(xs, k, min_variance, &mut rng);
        let mut weights = vec![vec![0f64; k]; xs.len()];
        let len = xs.len() as f64;
        let mut lk = e_step(xs, &components, &mut weights);
        let mut iteration = 0;
        while iteration < max_iteration {
            iteration += 1;
            components = m_step(xs, &weights, &components, min_variance);
            let next_lk = e_step(xs, &components, &mut weights);
            trace!("EM\t{}\t{:.6}", iteration, next_lk / len);
            let diff = (next_lk - lk) / len;
            lk = next_lk;
            if diff < threshold {
                break;
            }
        }
        debug!("EM\t{}\t{}\t{}\t{:.6}", xs.len(), k, iteration, lk / len);
        Some(FittedMixture::new(components))
    }
}

// Means are drawn from `xs`, each one with probability proportional to
// the squared distance to the nearest mean already drawn.
fn initial_components<R: Rng>(
    xs: &[f64],
    k: usize,
    min_variance: f64,
    rng: &mut R,
) -> Vec<MixtureComponent> {
    let len = xs.len() as f64;
    let total_mean = xs.iter().sum::<f64>() / len;
    let variance = xs.iter().map(|x| (x - total_mean).powi(2)).sum::<f64>() / len;
    let variance = variance.max(min_variance);
    let mut centers = vec![xs[rng.gen_range(0..xs.len())]];
    while centers.len() < k {
        let dists: Vec<_> = xs
            .iter()
            .map(|x| {
                centers
                    .iter()
                    .map(|c| (x - c).powi(2))
                    .fold(std::f64::INFINITY, f64::min)
            })
            .collect();
        // All the values are the same as some center.
        let next = match WeightedIndex::new(&dists) {
            Ok(picker) => xs[picker.sample(rng)],
            Err(_) => xs[rng.gen_range(0..xs.len())],
        };
        centers.push(next);
    }
    let weight = (k as f64).recip();
    centers
        .into_iter()
        .map(|mean| MixtureComponent::new(weight, mean, variance))
        .collect()
}

// Update the responsibilities and return the log-likelihood of the data.
fn e_step(xs: &[f64], components: &[MixtureComponent], weights: &mut [Vec<f64>]) -> f64 {
    xs.iter()
        .zip(weights.iter_mut())
        .map(|(&x, ws)| {
            for (w, c) in ws.iter_mut().zip(components.iter()) {
                *w = c.weight.ln() + c.gaussian.log_density(x);
            }
            let total = logsumexp(ws.as_slice());
            ws.iter_mut().for_each(|w| *w = (*w - total).exp());
            total
        })
        .sum()
}

fn m_step(
    xs: &[f64],
    weights: &[Vec<f64>],
    components: &[MixtureComponent],
    min_variance: f64,
) -> Vec<MixtureComponent> {
    let len = xs.len() as f64;
    components
        .iter()
        .enumerate()
        .map(|(i, prev)| {
            let sum = weights.iter().map(|ws| ws[i]).sum::<f64>();
            if sum <= 0f64 {
                // This component is dead.
                return MixtureComponent::new(0f64, prev.gaussian.mean, prev.gaussian.variance);
            }
            let mean = xs
                .iter()
                .zip(weights.iter())
                .map(|(x, ws)| x * ws[i])
                .sum::<f64>()
                / sum;
            let variance = xs
                .iter()
                .zip(weights.iter())
                .map(|(x, ws)| (x - mean).powi(2) * ws[i])
                .sum::<f64>()
                / sum;
            MixtureComponent::new(sum / len, mean, variance.max(min_variance))
        })
        .collect()
}

/// Emission distributions of the five regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedEmissions {
    pub start: FittedGaussian,
    pub leader: FittedGaussian,
    pub adapter: FittedMixture,
    pub polya: FittedGaussian,
    pub transcript: FittedMixture,
}

impl FittedEmissions {
    /// Fit Gaussians to START, LEADER, POLYA, and `k`-component mixtures to ADAPTER and TRANSCRIPT.
    pub fn fit<F: EmissionFitter>(fitter: &F, samples: &RegionValues, k: usize) -> Result<Self> {
        let gaussian = |region: RegionLabel| {
            debug!("START\tFitting\t{}", region);
            fitter
                .fit_gaussian(samples.get(region))
                .ok_or(ReestimateError::EmptyRegion(region))
        };
        let mixture = |region: RegionLabel| {
            debug!("START\tFitting\t{}", region);
            let xs = samples.get(region);
            if xs.is_empty() {
                return Err(ReestimateError::EmptyRegion(region));
            }
            fitter
                .fit_mixture(xs, k)
                .ok_or(ReestimateError::TooFewSamples {
                    region,
                    len: xs.len(),
                    k,
                })
        };
        Ok(Self {
            start: gaussian(RegionLabel::Start)?,
            leader: gaussian(RegionLabel::Leader)?,
            adapter: mixture(RegionLabel::Adapter)?,
            polya: gaussian(RegionLabel::PolyA)?,
            transcript: mixture(RegionLabel::Transcript)?,
        })
    }
    /// Log-density of `x` under the emission of `region`. None for [RegionLabel::Unknown].
    pub fn log_density(&self, region: RegionLabel, x: f64) -> Option<f64> {
        match region {
            RegionLabel::Start => Some(self.start.log_density(x)),
            RegionLabel::Leader => Some(self.leader.log_density(x)),
            RegionLabel::Adapter => Some(self.adapter.log_density(x)),
            RegionLabel::PolyA => Some(self.polya.log_density(x)),
            RegionLabel::Transcript => Some(self.transcript.log_density(x)),
            RegionLabel::Unknown => None,
        }
    }
}
