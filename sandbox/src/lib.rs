//! Mock `polya-samples` and `polya-segmentation` lines, to run the re-estimation by hand.
use definitions::{
    FittedGaussian, FittedMixture, MixtureComponent, RegionLabel, SampleRow, SegmentRow,
};
use emissions::fit::FittedEmissions;
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::io::Write;

// Log-likelihood of a CLIFF sample, uniform over the signal range.
const CLIFF_LLH: f64 = -5.0;
// Raw samples are `scaled * SCALE + SHIFT`.
const SCALE: f64 = 5.4;
const SHIFT: f64 = -20.0;

/// Emission parameters under which the mock "old" samples are drawn and scored.
pub fn old_model() -> FittedEmissions {
    FittedEmissions {
        start: FittedGaussian::new(70.2, 9.0),
        leader: FittedGaussian::new(110.9, 27.0),
        adapter: FittedMixture::new(vec![
            MixtureComponent::new(0.874, 79.3, 70.0),
            MixtureComponent::new(0.126, 63.6, 171.0),
        ]),
        polya: FittedGaussian::new(108.9, 9.2),
        transcript: FittedMixture::new(vec![
            MixtureComponent::new(0.5, 105.0, 100.0),
            MixtureComponent::new(0.5, 88.0, 300.0),
        ]),
    }
}

/// The old model with all the means moved by `shift`.
pub fn shifted_model(shift: f64) -> FittedEmissions {
    let mut model = old_model();
    for gaussian in vec![&mut model.start, &mut model.leader, &mut model.polya] {
        gaussian.mean += shift;
    }
    for mixture in vec![&mut model.adapter, &mut model.transcript] {
        for c in mixture.components.iter_mut() {
            c.gaussian.mean += shift;
        }
    }
    model
}

fn draw_gaussian<R: Rng>(gaussian: &FittedGaussian, rng: &mut R) -> f64 {
    Normal::new(gaussian.mean, gaussian.stdv())
        .map(|normal| normal.sample(rng))
        .unwrap_or(gaussian.mean)
}

fn draw_mixture<R: Rng>(mixture: &FittedMixture, rng: &mut R) -> f64 {
    let weights = mixture.components.iter().map(|c| c.weight);
    match WeightedIndex::new(weights) {
        Ok(picker) => draw_gaussian(&mixture.components[picker.sample(rng)].gaussian, rng),
        Err(_) => draw_gaussian(&mixture.components[0].gaussian, rng),
    }
}

/// Draw a scaled sample of `region`. Unknown falls back to the transcript.
pub fn draw<R: Rng>(model: &FittedEmissions, region: RegionLabel, rng: &mut R) -> f64 {
    match region {
        RegionLabel::Start => draw_gaussian(&model.start, rng),
        RegionLabel::Leader => draw_gaussian(&model.leader, rng),
        RegionLabel::Adapter => draw_mixture(&model.adapter, rng),
        RegionLabel::PolyA => draw_gaussian(&model.polya, rng),
        RegionLabel::Transcript | RegionLabel::Unknown => draw_mixture(&model.transcript, rng),
    }
}

/// A read ID and its segmentation. Region lengths are drawn uniformly.
pub fn gen_segment<R: Rng>(id: usize, rng: &mut R) -> SegmentRow {
    let read_id = format!("{:08x}-{:04x}-{:04x}", id, rng.gen::<u16>(), rng.gen::<u16>());
    let leader_start = rng.gen_range(20..60);
    let adapter_start = leader_start + rng.gen_range(100..300);
    let polya_start = adapter_start + rng.gen_range(500..1500);
    let polya_end = polya_start + rng.gen_range(200..1000);
    SegmentRow {
        tag: "polya-segmentation".to_string(),
        read_id,
        position: rng.gen_range(0..200_000_000),
        leader_start,
        adapter_start,
        polya_start,
        polya_end,
        rate: rng.gen_range(60f64..90f64),
        polya_length: (polya_end - polya_start) as f64 / 10f64,
        adapter_length: (polya_start - adapter_start) as f64 / 40f64,
    }
}

/// Samples of a read, drawn from `model` and scored by `scorer`.
/// The read ID of the samples is the first block of the one in `segment`.
pub fn gen_samples<R: Rng>(
    segment: &SegmentRow,
    model: &FittedEmissions,
    scorer: &FittedEmissions,
    rng: &mut R,
) -> Vec<SampleRow> {
    let read_id = segment.read_id.split('-').next().unwrap_or(segment.read_id.as_str());
    let length = segment.polya_end + rng.gen_range(500..2000);
    (0..length)
        .map(|index| {
            let region = emissions::segmentation::region_of(segment, index);
            let scaled_sample = draw(model, region, rng);
            let llh = |region| scorer.log_density(region, scaled_sample).unwrap_or(CLIFF_LLH);
            SampleRow {
                tag: "polya-samples".to_string(),
                read_id: read_id.to_string(),
                contig: "chrM".to_string(),
                index,
                sample: scaled_sample * SCALE + SHIFT,
                scaled_sample,
                start_llh: llh(RegionLabel::Start),
                leader_llh: llh(RegionLabel::Leader),
                adapter_llh: llh(RegionLabel::Adapter),
                polya_llh: llh(RegionLabel::PolyA),
                cliff_llh: CLIFF_LLH,
                transcript_llh: llh(RegionLabel::Transcript),
                region: region.to_string(),
            }
        })
        .collect()
}

pub fn write_samples<W: Write>(wtr: &mut W, samples: &[SampleRow]) -> std::io::Result<()> {
    for s in samples {
        writeln!(
            wtr,
            "{}\t{}\t{}\t{}\t{:.1}\t{:.3}\t{:.3}\t{:.3}\t{:.3}\t{:.3}\t{:.3}\t{:.3}\t{}",
            s.tag,
            s.read_id,
            s.contig,
            s.index,
            s.sample,
            s.scaled_sample,
            s.start_llh,
            s.leader_llh,
            s.adapter_llh,
            s.polya_llh,
            s.cliff_llh,
            s.transcript_llh,
            s.region
        )?;
    }
    Ok(())
}

pub fn write_segment<W: Write>(wtr: &mut W, seg: &SegmentRow) -> std::io::Result<()> {
    writeln!(
        wtr,
        "{}\t{}\t{}\t{:.1}\t{:.1}\t{:.1}\t{:.1}\t{:.2}\t{:.2}\t{:.2}",
        seg.tag,
        seg.read_id,
        seg.position,
        seg.leader_start as f64,
        seg.adapter_start as f64,
        seg.polya_start as f64,
        seg.polya_end as f64,
        seg.rate,
        seg.polya_length,
        seg.adapter_length
    )
}
