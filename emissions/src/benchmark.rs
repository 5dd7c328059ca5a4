//! Report of the fitted parameters and the log-likelihood benchmark.
use crate::aggregate::RegionValues;
use crate::fit::FittedEmissions;
use crate::misc::mean;
use crate::{ReestimateError, Result};
use definitions::{FittedMixture, RegionLabel};
use std::io::Write;

/// Average log-likelihoods of a region under the old and the new emissions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Benchmark {
    pub region: RegionLabel,
    pub old_llh: f64,
    pub new_llh: f64,
}

impl std::fmt::Display for Benchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "> Average {} log-probs:", self.region)?;
        write!(
            f,
            "> Old avg. log-likelihood: {} | New avg. log-likelihood: {}",
            self.old_llh, self.new_llh
        )
    }
}

/// Compare the old log-likelihoods (labeled by the old segmenter) against
/// the new emissions evaluated at the new scaled samples, region by region.
pub fn benchmark(
    old_llhs: &RegionValues,
    new_samples: &RegionValues,
    emissions: &FittedEmissions,
) -> Result<Vec<Benchmark>> {
    RegionLabel::REGIONS
        .iter()
        .map(|&region| -> Result<Benchmark> {
            let old_llh =
                mean(old_llhs.get(region)).ok_or(ReestimateError::EmptyOldRegion(region))?;
            let new_llhs: Vec<_> = new_samples
                .get(region)
                .iter()
                .filter_map(|&x| emissions.log_density(region, x))
                .collect();
            let new_llh = mean(&new_llhs).ok_or(ReestimateError::EmptyRegion(region))?;
            debug!("Benchmark\t{}\t{}\t{}", region, old_llh, new_llh);
            Ok(Benchmark {
                region,
                old_llh,
                new_llh,
            })
        })
        .collect()
}

/// Write the parameters, one line for each Gaussian or mixture component.
pub fn write_parameters<W: Write>(wtr: &mut W, emissions: &FittedEmissions) -> std::io::Result<()> {
    writeln!(wtr, "New params for START: {}", emissions.start)?;
    writeln!(wtr, "New params for LEADER: {}", emissions.leader)?;
    write_mixture(wtr, "ADAPTER", &emissions.adapter)?;
    writeln!(wtr, "New params for POLYA: {}", emissions.polya)?;
    write_mixture(wtr, "TRANSCR", &emissions.transcript)
}

fn write_mixture<W: Write>(wtr: &mut W, name: &str, mixture: &FittedMixture) -> std::io::Result<()> {
    for (i, component) in mixture.components.iter().enumerate() {
        writeln!(wtr, "New params for {}{}: {}", name, i, component)?;
    }
    Ok(())
}

pub fn write_benchmark<W: Write>(wtr: &mut W, benchmarks: &[Benchmark]) -> std::io::Result<()> {
    writeln!(wtr, "===== Emission Log-Likelihood Benchmarks =====")?;
    for bench in benchmarks {
        writeln!(wtr, "{}", bench)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::{FittedGaussian, MixtureComponent};
    fn emissions() -> FittedEmissions {
        FittedEmissions {
            start: FittedGaussian::new(70.0, 4.0),
            leader: FittedGaussian::new(110.0, 25.0),
            adapter: FittedMixture::new(vec![
                MixtureComponent::new(0.8, 75.0, 16.0),
                MixtureComponent::new(0.2, 90.0, 9.0),
            ]),
            polya: FittedGaussian::new(108.0, 1.0),
            transcript: FittedMixture::new(vec![
                MixtureComponent::new(0.5, 100.0, 100.0),
                MixtureComponent::new(0.5, 120.0, 64.0),
            ]),
        }
    }
    fn values(xs: &[f64]) -> RegionValues {
        let mut values = RegionValues::default();
        for &region in RegionLabel::REGIONS.iter() {
            for &x in xs {
                values.push(region, x);
            }
        }
        values
    }
    #[test]
    fn averages() {
        let old = values(&[-1.0, -2.0, -3.0]);
        let new = values(&[100.0, 108.0]);
        let emissions = emissions();
        let result = benchmark(&old, &new, &emissions).unwrap();
        assert_eq!(result.len(), 5);
        for (bench, region) in result.iter().zip(RegionLabel::REGIONS.iter()) {
            assert_eq!(bench.region, *region);
            assert!((bench.old_llh + 2.0).abs() < 1e-12);
        }
        let polya = &result[3];
        let answer = (emissions.polya.log_density(100.0) + emissions.polya.log_density(108.0)) / 2.0;
        assert!((polya.new_llh - answer).abs() < 1e-9);
        // Log of the mixture density, not the sum of the log-densities of the components.
        let adapter = &result[2];
        let density = |x: f64| {
            emissions
                .adapter
                .components
                .iter()
                .map(|c| c.weight * c.gaussian.log_density(x).exp())
                .sum::<f64>()
                .ln()
        };
        let answer = (density(100.0) + density(108.0)) / 2.0;
        assert!((adapter.new_llh - answer).abs() < 1e-9);
    }
    #[test]
    fn empty_old_region() {
        let mut old = RegionValues::default();
        for &region in RegionLabel::REGIONS.iter() {
            if region != RegionLabel::Leader {
                old.push(region, -1.0);
            }
        }
        let new = values(&[100.0]);
        match benchmark(&old, &new, &emissions()) {
            Err(ReestimateError::EmptyOldRegion(RegionLabel::Leader)) => {}
            x => panic!("{:?}", x),
        }
    }
    #[test]
    fn report_lines() {
        let mut wtr: Vec<u8> = vec![];
        write_parameters(&mut wtr, &emissions()).unwrap();
        let benchmarks = benchmark(&values(&[-1.0]), &values(&[100.0]), &emissions()).unwrap();
        write_benchmark(&mut wtr, &benchmarks).unwrap();
        let report = String::from_utf8(wtr).unwrap();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 7 + 1 + 2 * 5);
        assert_eq!(lines[0], "New params for START: mu = 70, var = 4, stdv = 2");
        assert_eq!(
            lines[3],
            "New params for ADAPTER1: pi = 0.2, mu = 90, var = 9, stdv = 3"
        );
        assert!(lines[5].starts_with("New params for TRANSCR0: pi = 0.5, mu = 100,"));
        assert_eq!(lines[7], "===== Emission Log-Likelihood Benchmarks =====");
        assert_eq!(lines[8], "> Average START log-probs:");
        assert!(lines[9].starts_with("> Old avg. log-likelihood: -1 | New avg. log-likelihood: "));
        assert_eq!(lines[16], "> Average TRANSCRIPT log-probs:");
    }
}
