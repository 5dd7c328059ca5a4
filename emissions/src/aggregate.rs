//! Bucketing values by region.
use crate::segmentation::{region_of, SegmentationIndex};
use definitions::{RegionLabel, SampleRow, SegmentRow};
use std::collections::HashMap;

/// Values for each of START, LEADER, ADAPTER, POLYA, and TRANSCRIPT.
/// Values not belonging to any of them are only counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionValues {
    values: [Vec<f64>; 5],
    unknown: usize,
}

impl RegionValues {
    fn slot(region: RegionLabel) -> Option<usize> {
        RegionLabel::REGIONS.iter().position(|&r| r == region)
    }
    pub fn push(&mut self, region: RegionLabel, value: f64) {
        match Self::slot(region) {
            Some(slot) => self.values[slot].push(value),
            None => self.unknown += 1,
        }
    }
    /// Values of `region`. Empty for [RegionLabel::Unknown].
    pub fn get(&self, region: RegionLabel) -> &[f64] {
        match Self::slot(region) {
            Some(slot) => &self.values[slot],
            None => &[],
        }
    }
    pub fn unknown(&self) -> usize {
        self.unknown
    }
    /// The number of values pushed, including the unknown ones.
    pub fn total(&self) -> usize {
        self.values.iter().map(|xs| xs.len()).sum::<usize>() + self.unknown
    }
}

/// Label each new sample by the old segmentation and collect its scaled value.
/// Samples of reads without segmentation are dropped as UNKNOWN.
pub fn aggregate_samples(rows: &[SampleRow], index: &SegmentationIndex) -> RegionValues {
    // Resolving a read ID scans the whole index. Samples of a read share the same answer.
    let mut resolved: HashMap<&str, Option<&SegmentRow>> = HashMap::new();
    let mut samples = RegionValues::default();
    for row in rows {
        let segment = *resolved
            .entry(row.read_id.as_str())
            .or_insert_with(|| index.resolve(&row.read_id));
        let region = match segment {
            Some(segment) => region_of(segment, row.index),
            None => RegionLabel::Unknown,
        };
        samples.push(region, row.scaled_sample);
    }
    debug!(
        "Aggregate\t{}\tSTART:{}\tLEADER:{}\tADAPTER:{}\tPOLYA:{}\tTRANSCRIPT:{}\tUNKNOWN:{}",
        rows.len(),
        samples.get(RegionLabel::Start).len(),
        samples.get(RegionLabel::Leader).len(),
        samples.get(RegionLabel::Adapter).len(),
        samples.get(RegionLabel::PolyA).len(),
        samples.get(RegionLabel::Transcript).len(),
        samples.unknown(),
    );
    samples
}

/// Collect the old log-likelihoods by the `region` column of the old samples.
/// Each row contributes the log-likelihood of its own region. Rows labeled otherwise (e.g., CLIFF) are counted as unknown.
pub fn aggregate_old_likelihoods(rows: &[SampleRow]) -> RegionValues {
    let mut llhs = RegionValues::default();
    for row in rows {
        match RegionLabel::from_name(&row.region).and_then(|r| row.llh_of(r).map(|l| (r, l))) {
            Some((region, llh)) => llhs.push(region, llh),
            None => llhs.push(RegionLabel::Unknown, 0f64),
        }
    }
    llhs
}
