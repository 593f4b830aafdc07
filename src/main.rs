//! nnga CLI: genetic hyperparameter search for a neural network on a CSV file.

use clap::{Parser, Subcommand};
use nnga::automl::{GeneticConfig, GeneticSearch, ParamGrid, TaskMode};
use nnga::data::DataFrame;
use nnga::PipelineAdaptor;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "nnga")]
#[command(about = "Genetic-algorithm hyperparameter search for neural networks")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search on a CSV file and report the best configuration
    Search {
        /// CSV file with a header row and numeric cells
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: String,

        /// JSON search configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of generations (overrides the config)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Individuals per generation (overrides the config)
        #[arg(short, long)]
        pop_size: Option<usize>,

        /// Task mode: regression or classification (inferred when omitted)
        #[arg(short, long)]
        mode: Option<String>,

        /// Random seed (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default hyperparameter grid as JSON
    Grid,
}

struct SearchArgs {
    data: PathBuf,
    target: String,
    config: Option<PathBuf>,
    generations: Option<usize>,
    pop_size: Option<usize>,
    mode: Option<String>,
    seed: Option<u64>,
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Search {
            data,
            target,
            config,
            generations,
            pop_size,
            mode,
            seed,
            output,
        } => cmd_search(SearchArgs {
            data,
            target,
            config,
            generations,
            pop_size,
            mode,
            seed,
            output,
        }),
        Commands::Grid => cmd_grid(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(args: &SearchArgs) -> nnga::Result<GeneticConfig> {
    let mut config = match &args.config {
        Some(path) => GeneticConfig::from_json_file(path)?,
        None => GeneticConfig::default(),
    };
    if let Some(n) = args.generations {
        config = config.with_n_generations(n);
    }
    if let Some(n) = args.pop_size {
        config = config.with_pop_size(n);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(mode) = &args.mode {
        config = config.with_mode(TaskMode::parse(mode)?);
    }
    config.validate()?;
    Ok(config)
}

fn cmd_search(args: SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let df = DataFrame::read_csv(&args.data)?;
    info!(
        path = %args.data.display(),
        rows = df.n_rows(),
        columns = df.n_cols(),
        "loaded data"
    );

    let mut search = GeneticSearch::new(config)?;
    search.fit(&df, &args.target)?;
    let report = serde_json::to_string_pretty(&search.report()?)?;

    match args.output.as_deref() {
        Some(path) => write_report(path, &report)?,
        None => println!("{report}"),
    }
    Ok(())
}

fn write_report(path: &Path, report: &str) -> std::io::Result<()> {
    std::fs::write(path, report)?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn cmd_grid() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&ParamGrid::default())?);
    Ok(())
}
