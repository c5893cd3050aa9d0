//! `qsim` — batch driver for the screening-lane simulator.
//!
//! ```bash
//! # Pre-generate arrivals for 10 runs (needs n_gen_max > 0 in the params).
//! qsim generate-arrivals --params params.json --runs 10 --out arrivals/
//!
//! # Replay them and write the results to out/.
//! qsim run --params params.json --runs 10 --arrivals arrivals/ --out out/
//!
//! # Dynamic arrivals up to t=20000, debug output.
//! qsim run --params params.json --stop 20000 --out out/ --verbose
//! ```
//!
//! `RUST_LOG` overrides the log filter.

mod batch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qs_core::SimParams;

#[derive(Parser, Debug)]
#[command(name = "qsim", version, about = "Screening-lane queue simulator")]
struct Cli {
    /// Log at debug level (periodic lane status, borrows, ticket batches).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate one or more independent runs.
    Run(RunArgs),
    /// Write `arrivals-NNN.dat` schedule files for later replay.
    GenerateArrivals(GenerateArgs),
}

#[derive(Args, Debug)]
struct Common {
    /// JSON parameter file (missing fields take their defaults).
    #[arg(short, long, value_name = "FILE")]
    params: PathBuf,

    /// Number of runs.
    #[arg(short = 'n', long, default_value_t = 1)]
    runs: u32,

    /// Base seed; each run derives its own.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Output directory (created if missing).
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    common: Common,

    /// Stop at this simulated time instead of running until no customer is
    /// left.
    #[arg(long, value_name = "T")]
    stop: Option<u64>,

    /// Directory holding `arrivals-NNN.dat` files to replay.
    #[arg(long, value_name = "DIR")]
    arrivals: Option<PathBuf>,

    /// Worker threads (default: one per core).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    common: Common,

    /// Arrivals per lane; overrides `n_gen_max` from the parameter file.
    #[arg(long)]
    count: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Command::Run(args) => {
            let params = load_params(&args.common.params)?;
            prepare_out_dir(&args.common.out)?;
            if let Some(n) = args.threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build_global()
                    .context("configuring the worker pool")?;
            }
            let batch = batch::Batch {
                params,
                runs:     args.common.runs,
                seed:     args.common.seed,
                stop:     args.stop,
                arrivals: args.arrivals,
                out:      args.common.out,
            };
            batch.run()
        }
        Command::GenerateArrivals(args) => {
            let mut params = load_params(&args.common.params)?;
            if let Some(count) = args.count {
                params.n_gen_max = count;
            }
            prepare_out_dir(&args.common.out)?;
            batch::generate_arrivals(&params, args.common.runs, args.common.seed, &args.common.out)
        }
    }
}

fn load_params(path: &Path) -> Result<SimParams> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parameter file {}", path.display()))?;
    let params: SimParams = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing parameter file {}", path.display()))?;
    params
        .validate()
        .with_context(|| format!("invalid parameters in {}", path.display()))?;
    info!(
        lanes = params.lanes,
        profiles = params.profiles.len(),
        policy = %params.policy,
        "parameters loaded"
    );
    Ok(params)
}

fn prepare_out_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))
}
