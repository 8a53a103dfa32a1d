//! gascd — the gasc scheduler daemon.
//!
//! Launches `-n` remote daemons through a cluster manager, writes their
//! `host:port` list once all of them run, and runs the tool with it.
//!
//! The cluster manager is reached through a JSON-lines driver: scheduler
//! events are read from stdin (or `--events`), driver calls are written to
//! stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! gascd run -n 16 -c 1 -m 128 --master 10.0.0.1:5050 -- mpirun -n 16 ./ring
//! gascd check-config gasc.toml
//! ```

mod transport;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use gasc_core::GascConfig;
use gasc_scheduler::run_framework;

use crate::transport::{JsonLinesDriver, spawn_event_reader, spawn_stdin_reader};

#[derive(Parser)]
#[command(name = "gascd", about = "gasc scheduler daemon")]
struct Cli {
    /// Log decline decisions and task transitions.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler until the daemons finish, the tool exits, or the
    /// run aborts.
    Run {
        /// Path to gasc.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of daemon instances.
        #[arg(short = 'n', long)]
        instances: Option<u32>,

        /// CPU share per instance.
        #[arg(short = 'c', long)]
        cpus: Option<f64>,

        /// Memory per instance in megabytes.
        #[arg(short = 'm', long)]
        memory: Option<i64>,

        /// Address of the cluster-manager master.
        #[arg(long)]
        master: Option<String>,

        /// Replay scheduler events from this file instead of stdin. A tool
        /// started before the end of the file runs to completion.
        #[arg(long)]
        events: Option<PathBuf>,

        /// Where to write the host list.
        #[arg(long)]
        hosts_file: Option<String>,

        /// Tool command, e.g. `-- mpirun -n 16 ./ring`.
        #[arg(last = true)]
        tool: Vec<String>,
    },
    /// Validate a gasc.toml and print the effective configuration.
    CheckConfig {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Command::Run {
            config,
            instances,
            cpus,
            memory,
            master,
            events,
            hosts_file,
            tool,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(instances) = instances {
                config.instance.count = instances;
            }
            if let Some(cpus) = cpus {
                config.instance.cpus = cpus;
            }
            if let Some(memory) = memory {
                config.instance.memory_mb = memory;
            }
            if let Some(master) = master {
                config.framework.master = master;
            }
            if let Some(hosts_file) = hosts_file {
                config.tool.hosts_file = hosts_file;
            }
            if !tool.is_empty() {
                config.tool.command = tool.join(" ");
            }
            if events.is_some() {
                config.tool.wait_on_eof = true;
            }
            config.validate().context("invalid configuration")?;
            run(config, events).await
        }
        Command::CheckConfig { path } => {
            let config = GascConfig::from_file(&path)?;
            config.validate().context("invalid configuration")?;
            print!("{}", config.to_toml_string()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "info,gascd=debug,gasc_scheduler=debug,gasc_placement=debug,gasc_state=debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<GascConfig> {
    match path {
        Some(path) => GascConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(GascConfig::default()),
    }
}

async fn run(config: GascConfig, events: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let framework = config.framework_info();
    info!(name = %framework.name, master = %framework.master, "gasc starting");

    let events = match events {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("opening events file {}", path.display()))?;
            spawn_event_reader(file)
        }
        None => spawn_stdin_reader().context("starting stdin reader")?,
    };

    let mut driver = JsonLinesDriver::new(std::io::stdout());
    driver
        .start(&framework)
        .context("writing start call to driver")?;

    let outcome = run_framework(&config, &mut driver, events).await?;

    if outcome.is_abort() {
        eprintln!("{outcome}");
        eprintln!("Aborting run: gasc can't recover!");
    }
    info!(%outcome, exit_code = outcome.exit_code(), "gasc stopped");
    Ok(ExitCode::from(outcome.exit_code()))
}
