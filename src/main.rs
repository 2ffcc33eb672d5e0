use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use rate_my_vcc::rate::RateError;
use rate_my_vcc::sharding::PartitionError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_IO: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score the registry export and write sorted shards plus a lookup table (default)
    Shard {
        /// Registry export CSV (overrides config `input`)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for shards (overrides config `shard_dir`)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Number of shards (overrides config `partitions`)
        #[arg(short = 'n', long)]
        partitions: Option<usize>,
    },
    /// Merge all shards into allprojects.json and search-index.json
    Merge {
        /// Directory holding the shards (overrides config `shard_dir`)
        #[arg(short, long)]
        shard_dir: Option<PathBuf>,

        /// Output directory for the JSON files (overrides config `merge_dir`)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the stored score of one project
    Rate {
        /// Project ID
        id: u64,

        /// Directory holding the shards (overrides config `shard_dir`)
        #[arg(short, long)]
        shard_dir: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "rate-my-vcc")]
#[command(about = "Score VCS carbon-credit projects and shard the catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/rate-my-vcc/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let start_time = Instant::now();
    let command = cli.command.unwrap_or(Commands::Shard {
        input: None,
        out_dir: None,
        partitions: None,
    });

    // Load config
    let mut config = match rate_my_vcc::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Command-line flags win over the config file
    match &command {
        Commands::Shard {
            input,
            out_dir,
            partitions,
        } => {
            if let Some(input) = input {
                config.input = input.clone();
            }
            if let Some(out_dir) = out_dir {
                config.shard_dir = out_dir.clone();
            }
            if let Some(partitions) = partitions {
                config.partitions = *partitions;
            }
        }
        Commands::Merge { shard_dir, out_dir } => {
            if let Some(shard_dir) = shard_dir {
                config.shard_dir = shard_dir.clone();
            }
            if let Some(out_dir) = out_dir {
                config.merge_dir = out_dir.clone();
            }
        }
        Commands::Rate { shard_dir, .. } => {
            if let Some(shard_dir) = shard_dir {
                config.shard_dir = shard_dir.clone();
            }
        }
    }

    if let Err(errors) = rate_my_vcc::config::validate_config(&config) {
        error!("Config errors:");
        for e in errors {
            error!("  - {}", e);
        }
        std::process::exit(EXIT_CONFIG);
    }
    debug!(?config, "effective config");

    let use_colors = rate_my_vcc::output::should_use_colors();

    match command {
        Commands::Shard { .. } => {
            match rate_my_vcc::pipeline::run_shard(
                &config.input,
                &config.shard_dir,
                config.partitions,
            ) {
                Ok(summary) => {
                    println!(
                        "{}",
                        rate_my_vcc::output::format_shard_summary(
                            summary.projects,
                            summary.skipped,
                            summary.shards,
                            &config.shard_dir.display().to_string(),
                        )
                    );
                }
                Err(e) if e.downcast_ref::<PartitionError>().is_some() => {
                    error!("Cannot shard catalog: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
                Err(e) => {
                    error!("Shard run failed: {:#}", e);
                    std::process::exit(EXIT_IO);
                }
            }
        }
        Commands::Merge { .. } => {
            let today = chrono::Utc::now().date_naive();
            let result = rate_my_vcc::output::merge_shards(&config.shard_dir, today).and_then(
                |output| {
                    rate_my_vcc::output::write_merge_output(&output, &config.merge_dir)?;
                    Ok(output)
                },
            );
            match result {
                Ok(output) => {
                    println!(
                        "Merged {} unique projects into {}",
                        output.projects.len(),
                        config.merge_dir.display()
                    );
                    let stats = rate_my_vcc::output::ScoreStats::from_projects(&output.projects);
                    println!(
                        "{}",
                        rate_my_vcc::output::format_stats(stats.as_ref(), use_colors)
                    );
                }
                Err(e) => {
                    error!("Merge failed: {:#}", e);
                    std::process::exit(EXIT_IO);
                }
            }
        }
        Commands::Rate { id, .. } => match rate_my_vcc::rate::rating(&config.shard_dir, id) {
            Ok(rating) => {
                println!(
                    "{}",
                    rate_my_vcc::output::format_rating(id, rating.score, use_colors)
                );
                if cli.verbose {
                    // Recomputed as of today, so vintage may differ from the stored score
                    let today = chrono::Utc::now().date_naive();
                    let breakdown = rate_my_vcc::scoring::breakdown_at(&rating.record, today);
                    println!(
                        "{}",
                        rate_my_vcc::output::format_breakdown(&breakdown, use_colors)
                    );
                }
            }
            Err(e @ (RateError::NotIndexed(_) | RateError::NotInShard { .. })) => {
                error!("{}", e);
                std::process::exit(EXIT_NOT_FOUND);
            }
            Err(e) => {
                error!("Rate failed: {}", e);
                std::process::exit(EXIT_IO);
            }
        },
    }

    debug!("Finished in {:?}", start_time.elapsed());
    std::process::exit(EXIT_SUCCESS);
}
