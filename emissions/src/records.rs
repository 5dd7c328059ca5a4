//! Readers of the TSV lines emitted by the segmenter.
//!
//! Both files are tab-delimited, without quoting and without a header line.
//! Columns are addressed by the fixed names below. A header line in a file would be read as
//! a record and rejected as a parse error, so strip it beforehand.
use crate::{ReestimateError, Result};
use definitions::{SampleRow, SegmentRow};
use std::io::BufRead;
use std::path::Path;

/// Columns of a `polya-samples` line.
pub const SAMPLE_COLUMNS: [&str; 13] = [
    "tag",
    "read_id",
    "chr",
    "idx",
    "sample",
    "scaled_sample",
    "s_llh",
    "l_llh",
    "a_llh",
    "p_llh",
    "c_llh",
    "t_llh",
    "region",
];

/// Columns of a `polya-segmentation` line.
pub const SEGMENT_COLUMNS: [&str; 10] = [
    "tag", "read_id", "pos", "L_start", "A_start", "P_start", "P_end", "rate", "plen", "alen",
];

pub fn read_samples<P: AsRef<Path>>(path: P) -> Result<Vec<SampleRow>> {
    let path = path.as_ref();
    let rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
    let samples = parse_samples(rdr, path)?;
    debug!("Read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

pub fn read_segmentations<P: AsRef<Path>>(path: P) -> Result<Vec<SegmentRow>> {
    let path = path.as_ref();
    let rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
    let segments = parse_segmentations(rdr, path)?;
    debug!("Read {} segmentations from {}", segments.len(), path.display());
    Ok(segments)
}

/// Parse `polya-samples` lines. `path` is only used in error messages.
pub fn parse_samples<R: BufRead>(rdr: R, path: &Path) -> Result<Vec<SampleRow>> {
    parse_tsv(rdr, path, &SAMPLE_COLUMNS, |fields| {
        Ok(SampleRow {
            tag: fields.text(0)?.to_string(),
            read_id: fields.text(1)?.to_string(),
            contig: fields.text(2)?.to_string(),
            index: fields.integer(3)?,
            sample: fields.float(4)?,
            scaled_sample: fields.float(5)?,
            start_llh: fields.float(6)?,
            leader_llh: fields.float(7)?,
            adapter_llh: fields.float(8)?,
            polya_llh: fields.float(9)?,
            cliff_llh: fields.float(10)?,
            transcript_llh: fields.float(11)?,
            region: fields.text(12)?.to_string(),
        })
    })
}

/// Parse `polya-segmentation` lines. The boundaries are written as floats and truncated toward zero.
pub fn parse_segmentations<R: BufRead>(rdr: R, path: &Path) -> Result<Vec<SegmentRow>> {
    parse_tsv(rdr, path, &SEGMENT_COLUMNS, |fields| {
        Ok(SegmentRow {
            tag: fields.text(0)?.to_string(),
            read_id: fields.text(1)?.to_string(),
            position: fields.integer(2)?,
            leader_start: fields.truncated(3)?,
            adapter_start: fields.truncated(4)?,
            polya_start: fields.truncated(5)?,
            polya_end: fields.truncated(6)?,
            rate: fields.float(7)?,
            polya_length: fields.float(8)?,
            adapter_length: fields.float(9)?,
        })
    })
}

fn parse_tsv<R, T, F>(rdr: R, path: &Path, columns: &[&'static str], parse: F) -> Result<Vec<T>>
where
    R: BufRead,
    F: Fn(&Fields) -> Result<T>,
{
    let mut records = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let fields = Fields {
            fields: line.split('\t').collect(),
            columns,
            path,
            line: i + 1,
        };
        records.push(parse(&fields)?);
    }
    Ok(records)
}

// A split line. Extra trailing fields are ignored.
struct Fields<'a> {
    fields: Vec<&'a str>,
    columns: &'a [&'static str],
    path: &'a Path,
    line: usize,
}

impl<'a> Fields<'a> {
    fn text(&self, i: usize) -> Result<&'a str> {
        self.fields
            .get(i)
            .copied()
            .ok_or_else(|| ReestimateError::MissingColumn {
                path: self.path.to_path_buf(),
                line: self.line,
                column: self.columns[i],
            })
    }
    fn invalid(&self, i: usize, value: &str) -> ReestimateError {
        ReestimateError::Parse {
            path: self.path.to_path_buf(),
            line: self.line,
            column: self.columns[i],
            value: value.to_string(),
        }
    }
    fn float(&self, i: usize) -> Result<f64> {
        let value = self.text(i)?;
        value.trim().parse().map_err(|_| self.invalid(i, value))
    }
    fn integer(&self, i: usize) -> Result<i64> {
        let value = self.text(i)?;
        value.trim().parse().map_err(|_| self.invalid(i, value))
    }
    fn truncated(&self, i: usize) -> Result<i64> {
        let value = self.float(i)?;
        if value.is_finite() {
            Ok(value.trunc() as i64)
        } else {
            Err(self.invalid(i, self.fields[i]))
        }
    }
}
