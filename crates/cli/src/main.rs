//! chartdeck: inspect chart templates and stored applications.

mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chartdeck_lib::config::Settings;
use chartdeck_lib::value::Value;

use crate::output::{format_error_chain, print_error};

/// chartdeck - chart-based application lifecycle
#[derive(Parser)]
#[command(name = "chartdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Settings file (default: <config dir>/chartdeck/config.toml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Render a template revision and show the charts it deploys
  Render {
    /// Template revision file (YAML)
    revision: PathBuf,

    /// Set an input (repeatable), e.g. --set replicas=3
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = cmd::parse_assignment)]
    sets: Vec<(String, Value)>,

    /// YAML file with input values; --set wins on conflict
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Preview upgrading an application to a template revision
  Plan {
    /// Application id
    id: u64,

    /// Template revision file (YAML)
    revision: PathBuf,

    /// Owning organization id
    #[arg(long)]
    org: u64,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// List stored applications of an organization
  List {
    /// Owning organization id
    #[arg(long)]
    org: u64,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show one stored application
  Show {
    /// Application id
    id: u64,

    /// Owning organization id
    #[arg(long)]
    org: u64,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn init_tracing(verbose: bool, default_filter: &str) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
  init_tracing(cli.verbose, &settings.log.filter);
  debug!(store = %settings.store_path().display(), "settings loaded");

  match cli.command {
    Commands::Render {
      revision,
      sets,
      inputs,
      json,
    } => cmd::cmd_render(&revision, inputs.as_deref(), sets, json),
    Commands::Plan { id, revision, org, json } => cmd::cmd_plan(&settings, id, org, &revision, json),
    Commands::List { org, json } => cmd::cmd_list(&settings, org, json),
    Commands::Show { id, org, json } => cmd::cmd_show(&settings, id, org, json),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format_error_chain(&err));
      ExitCode::FAILURE
    }
  }
}
