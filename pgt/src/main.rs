use anyhow::Result;
use clap::Parser;
use pgt::run::{eval, train, RunConfig};
use std::path::PathBuf;

/// Train/eval PGT agent in point mass environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Train PGT agent, not evaluate
    #[arg(short, long, default_value_t = false)]
    train: bool,

    /// Evaluate PGT agent, not train
    #[arg(short, long, default_value_t = false)]
    eval: bool,

    /// Configuration of the run in YAML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of the trained model
    #[arg(short, long, default_value = "./model/pgt_point_mass")]
    model_dir: PathBuf,

    /// The number of episodes in evaluation
    #[arg(short, long, default_value_t = 5)]
    n_episodes: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let best = args.model_dir.join("best");

    if args.train {
        train(&config, &args.model_dir)?;
    } else if args.eval {
        eval(&config, &best, args.n_episodes)?;
    } else {
        train(&config, &args.model_dir)?;
        eval(&config, &best, args.n_episodes)?;
    }

    Ok(())
}
