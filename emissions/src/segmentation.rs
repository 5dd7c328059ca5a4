//! Segmentation index and region classifier.
//!
//! The segmentation computed under the old kmer models is treated as the ground truth.
//! Each read keeps only its first segmentation; later lines with the same read ID are dropped.
use definitions::{RegionLabel, SegmentRow};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SegmentationIndex {
    // In the order of first occurrence.
    segments: Vec<SegmentRow>,
    ids: HashMap<String, usize>,
}

impl SegmentationIndex {
    pub fn new<I: IntoIterator<Item = SegmentRow>>(rows: I) -> Self {
        let mut index = Self::default();
        let mut dropped = 0;
        for row in rows {
            if index.ids.contains_key(&row.read_id) {
                dropped += 1;
                continue;
            }
            index.ids.insert(row.read_id.clone(), index.segments.len());
            index.segments.push(row);
        }
        debug!(
            "SegmentationIndex\t{} reads\t{} duplicates dropped",
            index.segments.len(),
            dropped
        );
        index
    }
    pub fn len(&self) -> usize {
        self.segments.len()
    }
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
    /// Segmentation of exactly `read_id`.
    pub fn get(&self, read_id: &str) -> Option<&SegmentRow> {
        self.ids.get(read_id).map(|&i| &self.segments[i])
    }
    pub fn iter(&self) -> impl std::iter::Iterator<Item = &SegmentRow> {
        self.segments.iter()
    }
    /// Find the segmentation of a read whose ID starts with `read_id`.
    /// All the reads are scanned and the last one matched is returned,
    /// so if several indexed IDs share the prefix, the one inserted last wins.
    pub fn resolve(&self, read_id: &str) -> Option<&SegmentRow> {
        self.segments
            .iter()
            .filter(|seg| seg.read_id.starts_with(read_id))
            .last()
    }
    pub fn classify(&self, read_id: &str, sample_index: i64) -> RegionLabel {
        match self.resolve(read_id) {
            Some(segment) => region_of(segment, sample_index),
            None => RegionLabel::Unknown,
        }
    }
}

/// Classify the sample at `sample_index` into a region of `read_id`.
pub fn classify(read_id: &str, sample_index: i64, index: &SegmentationIndex) -> RegionLabel {
    index.classify(read_id, sample_index)
}

/// The region `sample_index` falls in. The conditions are checked from the 5' end.
pub fn region_of(segment: &SegmentRow, sample_index: i64) -> RegionLabel {
    let (leader_start, adapter_start, polya_start, polya_end) = segment.boundaries();
    if sample_index < leader_start {
        RegionLabel::Start
    } else if sample_index < adapter_start {
        RegionLabel::Leader
    } else if sample_index < polya_start {
        RegionLabel::Adapter
    } else if sample_index <= polya_end {
        RegionLabel::PolyA
    } else if sample_index > polya_end {
        RegionLabel::Transcript
    } else {
        RegionLabel::Unknown
    }
}
