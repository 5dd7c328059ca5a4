use clap::Parser;
use emissions_cli::commands::Args;
use std::io::Write;
#[macro_use]
extern crate log;

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();
    let config = match args.to_config() {
        Ok(config) => config,
        Err(why) => {
            eprintln!("{}", why);
            std::process::exit(1);
        }
    };
    debug!("{:?}", config);
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    if let Err(why) = emissions_cli::pipeline::run_pipeline(&config, &mut wtr) {
        wtr.flush()?;
        eprintln!("{}", why);
        std::process::exit(1);
    }
    wtr.flush()
}
