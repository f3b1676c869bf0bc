//! Parley sidebar simulator binary.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario file
//! parley --script scripts/demo.parley
//!
//! # Read the scenario from stdin, counting every new message as unread
//! parley --policy accumulate < scenario.parley
//! ```

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use parley_app::{LocalUser, SessionConfig, UnreadPolicy};
use parley_cli::{CliError, RunOptions, Runner, parse_script};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parley sidebar simulator
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Replay a chat sidebar scenario against an in-process realtime database")]
#[command(version)]
struct Args {
    /// Scenario script. Reads stdin if omitted.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Id of the signed-in user
    #[arg(short, long, default_value = "me")]
    user: String,

    /// Display name of the signed-in user
    #[arg(short, long, default_value = "Me")]
    name: String,

    /// Session config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unread policy, overriding the config file
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Badge shows messages since the channel was last read
    Replace,
    /// Badge adds every newly observed message
    Accumulate,
}

impl From<Policy> for UnreadPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Replace => Self::Replace,
            Policy::Accumulate => Self::Accumulate,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        },
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    if let Some(policy) = args.policy {
        config.unread_policy = policy.into();
    }

    let source = match &args.script {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            source
        },
    };
    let commands = parse_script(&source)?;
    tracing::info!(commands = commands.len(), user = %args.user, "running scenario");

    let options = RunOptions { user: LocalUser::new(args.user, args.name), config };
    let mut runner = Runner::start(options, io::stdout().lock())?;
    runner.run(&commands)?;
    runner.finish();
    Ok(())
}

fn load_config(path: &Path) -> Result<SessionConfig, CliError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| CliError::Config { path: path.to_path_buf(), source })
}
