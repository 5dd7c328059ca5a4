use clap::Parser;
use rand_xoshiro::Xoroshiro128PlusPlus;
use sandbox::{gen_samples, gen_segment, old_model, shifted_model, write_samples, write_segment};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
#[macro_use]
extern crate log;

#[derive(Parser, Debug)]
#[command(name = "GenMockSamples")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the seed of a pseudorandom number generator.
    #[arg(short, long, default_value_t = 7)]
    seed: u64,
    /// Set the number of reads to be simulated.
    #[arg(short, long, default_value_t = 20)]
    read_num: usize,
    /// Set the shift of the means of the new emissions.
    #[arg(long, default_value_t = 4.0, allow_negative_numbers = true)]
    shift: f64,
    #[arg(short, long, default_value = "./")]
    output_dir: PathBuf,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    std::fs::create_dir_all(&args.output_dir)?;
    let mut rng: Xoroshiro128PlusPlus = rand::SeedableRng::seed_from_u64(args.seed);
    let (old, new) = (old_model(), shifted_model(args.shift));
    let open = |name: &str| std::fs::File::create(args.output_dir.join(name)).map(BufWriter::new);
    let mut old_wtr = open("samples.old.tsv")?;
    let mut seg_wtr = open("seg.old.tsv")?;
    let mut new_wtr = open("samples.new.tsv")?;
    for i in 0..args.read_num {
        let segment = gen_segment(i, &mut rng);
        write_segment(&mut seg_wtr, &segment)?;
        let old_samples = gen_samples(&segment, &old, &old, &mut rng);
        write_samples(&mut old_wtr, &old_samples)?;
        let new_samples = gen_samples(&segment, &new, &old, &mut rng);
        write_samples(&mut new_wtr, &new_samples)?;
        debug!("{}\t{}\t{}", segment.read_id, old_samples.len(), new_samples.len());
    }
    info!("Simulated {} reads", args.read_num);
    old_wtr.flush()?;
    seg_wtr.flush()?;
    new_wtr.flush()
}
