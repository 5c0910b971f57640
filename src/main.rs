//! usercf CLI: fit, inspect and score user-based collaborative filtering.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use usercf::prelude::*;
use usercf::recommend::Neighborhoods;

#[derive(Parser)]
#[command(name = "usercf")]
#[command(about = "User-based collaborative filtering over rating files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (per-user progress)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Hyperparameters shared by every subcommand.
#[derive(Args)]
struct ModelArgs {
    /// Number of neighbors kept per user
    #[arg(short, long)]
    k: Option<usize>,

    /// Co-rated items a pair must exceed to be compared
    #[arg(long)]
    min_common: Option<usize>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit on training ratings and report train/test RMSE
    Evaluate {
        /// Training ratings (CSV: user,item,rating[,timestamp])
        #[arg(long)]
        train: PathBuf,

        /// Held-out ratings; split from --train when absent
        #[arg(long)]
        test: Option<PathBuf>,

        /// Fraction of --train held out when no --test is given
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,

        /// Random seed for the split
        #[arg(long)]
        seed: Option<u64>,

        /// Write a JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Predict one rating and show the contributing neighbors
    Predict {
        /// Ratings to fit on
        #[arg(long)]
        ratings: PathBuf,

        /// User to predict for
        #[arg(long)]
        user: usize,

        /// Item to predict
        #[arg(long)]
        item: usize,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Show a user's neighbor list
    Neighbors {
        /// Ratings to fit on
        #[arg(long)]
        ratings: PathBuf,

        /// User to inspect
        #[arg(long)]
        user: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        model: ModelArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Evaluate {
            train,
            test,
            test_fraction,
            seed,
            output,
            model,
        } => cmd_evaluate(
            &train,
            test.as_deref(),
            test_fraction,
            seed,
            output.as_deref(),
            &model,
        ),
        Commands::Predict {
            ratings,
            user,
            item,
            model,
        } => cmd_predict(&ratings, user, item, &model),
        Commands::Neighbors {
            ratings,
            user,
            json,
            model,
        } => cmd_neighbors(&ratings, user, json, &model),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &CfError) -> u8 {
    match err {
        CfError::Io(_) => 3,
        CfError::ParseError { .. } | CfError::MissingData(_) | CfError::UserIdOutOfRange { .. } => {
            4
        }
        CfError::Config(_) | CfError::InvalidHyperparameter { .. } => 5,
        CfError::UnknownUser { .. } => 6,
        CfError::Cancelled => 130,
        _ => 1,
    }
}

fn load_config(args: &ModelArgs) -> Result<CfConfig> {
    let mut config = match &args.config {
        Some(path) => CfConfig::from_toml_file(path)?,
        None => CfConfig::new(),
    };
    if let Some(k) = args.k {
        config = config.with_k(k);
    }
    if let Some(min_common) = args.min_common {
        config = config.with_min_common_items(min_common);
    }
    config.validate()?;
    Ok(config)
}

fn fit(samples: &[RatingSample], config: CfConfig) -> Result<Neighborhoods> {
    let index = RatingIndex::from_samples(samples)?;
    info!(
        users = index.num_users(),
        items = index.num_items(),
        ratings = index.len(),
        "rating index built"
    );
    Neighborhoods::fit(&index, config)
}

/// Summary written by `evaluate --output`.
#[derive(Serialize)]
struct Report<'a> {
    config: &'a CfConfig,
    train_samples: usize,
    test_samples: usize,
    skipped_test_samples: usize,
    train_rmse: f64,
    test_rmse: Option<f64>,
    fit_secs: f64,
}

fn cmd_evaluate(
    train_path: &Path,
    test_path: Option<&Path>,
    test_fraction: f64,
    seed: Option<u64>,
    output: Option<&Path>,
    args: &ModelArgs,
) -> Result<()> {
    let config = load_config(args)?;
    let loaded = RatingsParser::parse_file(train_path)?;

    let (train, test) = match test_path {
        Some(path) => (loaded, RatingsParser::parse_file(path)?),
        None => train_test_split(&loaded, test_fraction, seed)?,
    };

    let start = Instant::now();
    let model = fit(&train, config)?;
    let fit_secs = start.elapsed().as_secs_f64();

    // Users that only appear in the held-out set have no profile to predict from.
    let known: Vec<RatingSample> = test
        .iter()
        .filter(|s| model.profile(s.user).is_some())
        .copied()
        .collect();
    let skipped = test.len() - known.len();
    if skipped > 0 {
        warn!(skipped, "test samples for users without a profile were skipped");
    }

    let train_eval = evaluate(&train, &model)?;
    let test_eval = evaluate(&known, &model)?;
    let train_rmse = train_eval.rmse()?;
    let test_rmse = held_out_rmse(&test_eval)?;

    println!("Evaluation");
    println!("==========");
    println!("K:               {}", model.config().k);
    println!("Min common:      {}", model.config().min_common_items);
    println!("Train samples:   {}", train.len());
    println!("Test samples:    {}", known.len());
    println!("Fit time:        {fit_secs:.2}s");
    println!();
    println!("Train RMSE:      {train_rmse:.4}");
    match test_rmse {
        Some(rmse) => println!("Test RMSE:       {rmse:.4}"),
        None => println!("Test RMSE:       n/a (no held-out user has a profile)"),
    }

    if let Some(out_path) = output {
        let report = Report {
            config: model.config(),
            train_samples: train.len(),
            test_samples: known.len(),
            skipped_test_samples: skipped,
            train_rmse,
            test_rmse,
            fit_secs,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CfError::Config(format!("cannot serialize report: {e}")))?;
        std::fs::write(out_path, json)?;
        println!("\nOutput: {}", out_path.display());
    }

    Ok(())
}

/// RMSE over the held-out samples, or `None` when none could be scored.
fn held_out_rmse(eval: &Evaluation) -> Result<Option<f64>> {
    if eval.is_empty() {
        return Ok(None);
    }
    eval.rmse().map(Some)
}

fn cmd_predict(ratings: &Path, user: usize, item: usize, args: &ModelArgs) -> Result<()> {
    let config = load_config(args)?;
    let model = fit(&RatingsParser::parse_file(ratings)?, config)?;

    let rating = model.predict(user, item)?;
    let contributions = model.contributions(user, item)?;

    println!("Prediction");
    println!("==========");
    println!("User {user}, item {item}: {rating:.3}");
    if let Some(profile) = model.profile(user) {
        println!("User average:    {:.3}", profile.average());
    }
    println!();

    if contributions.is_empty() {
        println!("No neighbor rated this item; falling back to the user average.");
        return Ok(());
    }

    println!("{:<10} {:>10} {:>10}", "Neighbor", "Weight", "Deviation");
    println!("{}", "-".repeat(32));
    for (neighbor, deviation) in contributions {
        println!(
            "{:<10} {:>10.4} {:>10.4}",
            neighbor.user, neighbor.weight, deviation
        );
    }

    Ok(())
}

fn cmd_neighbors(ratings: &Path, user: usize, json: bool, args: &ModelArgs) -> Result<()> {
    let config = load_config(args)?;
    let model = fit(&RatingsParser::parse_file(ratings)?, config)?;

    let list = model
        .neighbors(user)
        .ok_or(CfError::UnknownUser { user })?;

    if json {
        let out = serde_json::to_string_pretty(list.as_slice())
            .map_err(|e| CfError::Config(format!("cannot serialize neighbors: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    println!("Neighbors of user {user} ({} of at most {})", list.len(), list.capacity());
    println!("{:<6} {:<10} {:>10}", "Rank", "User", "Weight");
    println!("{}", "-".repeat(28));
    for (rank, neighbor) in list.iter().enumerate() {
        println!("{:<6} {:<10} {:>10.4}", rank + 1, neighbor.user, neighbor.weight);
    }

    Ok(())
}
