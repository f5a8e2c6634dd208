use clap::{Parser, Subcommand};
use serde_json::Value;
use smo_comm::{Action, CommConfig, CommError, FetchOutcome, JobProgressEvent, TaskStatus};
use smo_core::format_number;
use smo_units::{UnitCatalog, UnitConverter, UnitsError, convert, convert_to_canonical};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error(transparent)]
    Comm(#[from] CommError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid --params JSON: {0}")]
    Params(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Job ended: {0:?}")]
    Job(TaskStatus),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "smo")]
#[command(about = "Unit conversion and model backend client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List quantity kinds and their units
    Kinds {
        /// Unit catalog JSON (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Convert a value between units of one quantity kind
    Convert {
        /// Quantity kind, e.g. Pressure
        kind: String,
        /// Value in the source unit
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Source unit
        from: String,
        /// Target unit; without it every unit of the kind is shown
        #[arg(long)]
        to: Option<String>,
        /// Unit catalog JSON (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Send one view action and print the response
    Fetch {
        /// Backend config YAML
        #[arg(long)]
        config: PathBuf,
        /// Action name, e.g. init
        #[arg(long)]
        action: String,
        /// Action parameters as JSON
        #[arg(long)]
        params: Option<String>,
    },
    /// Run a background computation and follow its progress (Ctrl-C aborts)
    Compute {
        /// Backend config YAML
        #[arg(long)]
        config: PathBuf,
        /// Model parameters as JSON
        #[arg(long)]
        params: Option<String>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Kinds { catalog } => cmd_kinds(catalog.as_deref()),
        Commands::Convert {
            kind,
            value,
            from,
            to,
            catalog,
        } => cmd_convert(&kind, value, &from, to.as_deref(), catalog.as_deref()),
        Commands::Fetch {
            config,
            action,
            params,
        } => cmd_fetch(&config, &action, params.as_deref()).await,
        Commands::Compute { config, params } => cmd_compute(&config, params.as_deref()).await,
    }
}

fn load_catalog(path: Option<&Path>) -> CliResult<UnitCatalog> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(UnitCatalog::from_json_str(&json)?)
        }
        None => Ok(UnitCatalog::builtin()?),
    }
}

fn parse_params(params: Option<&str>) -> CliResult<Value> {
    match params {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => Ok(Value::Object(Default::default())),
    }
}

fn cmd_kinds(catalog: Option<&Path>) -> CliResult<()> {
    let catalog = load_catalog(catalog)?;

    println!("Quantity kinds: {}", catalog.len());
    for kind in catalog.iter() {
        let units: Vec<&str> = kind.unit_names().collect();
        println!(
            "  {} ({}) SI: {}  units: {}",
            kind.name(),
            kind.title(),
            kind.si_unit_name(),
            units.join(", ")
        );
    }
    Ok(())
}

fn cmd_convert(
    kind_name: &str,
    value: f64,
    from: &str,
    to: Option<&str>,
    catalog: Option<&Path>,
) -> CliResult<()> {
    let catalog = load_catalog(catalog)?;
    let kind = catalog.get(kind_name)?;

    if let Some(to) = to {
        let converted = convert(value, from, to, &kind)?;
        println!(
            "{} {} = {} {}",
            format_number(value),
            from,
            format_number(converted),
            to
        );
        return Ok(());
    }

    let canonical = convert_to_canonical(value, from, &kind)?;
    let converter = UnitConverter::with_value(kind.clone(), canonical);
    println!("{} = {} {}", kind.title(), format_number(value), from);
    for row in converter.rows() {
        let marker = if row.unit == from { "*" } else { " " };
        println!("{} {:>14}  {}", marker, row.text, row.unit);
    }
    Ok(())
}

async fn cmd_fetch(config_path: &Path, action: &str, params: Option<&str>) -> CliResult<()> {
    let config = CommConfig::load(config_path)?;
    let mut comm = config.communicator()?;
    let params = parse_params(params)?;

    match comm.fetch_data(Action::named(action), params).await {
        FetchOutcome::Received => {
            println!("{}", serde_json::to_string_pretty(comm.data())?);
            Ok(())
        }
        FetchOutcome::ServerFailed | FetchOutcome::CommFailed => {
            let status = comm.status();
            if let Some(trace) = &status.stack_trace {
                eprintln!("{}", trace);
            }
            Err(CliError::Request(status.error_msg.clone()))
        }
    }
}

async fn cmd_compute(config_path: &Path, params: Option<&str>) -> CliResult<()> {
    let config = CommConfig::load(config_path)?;
    let mut comm = config.async_communicator()?;
    let params = parse_params(params)?;

    // The in-flight poll is never dropped; an abort is acted on between polls.
    let (interrupt_tx, mut interrupt_rx) = oneshot::channel();
    tokio::spawn(watch_interrupts(interrupt_tx));

    println!("Starting computation at {}", config.url);
    let started = Instant::now();
    comm.compute_async(params).await;
    render_cli_progress(&JobProgressEvent::from_job(comm.job(), comm.polls(), 0.0));

    let mut abort_sent = false;
    while comm.poll_scheduled() {
        if !abort_sent && interrupt_rx.try_recv().is_ok() {
            clear_progress_line();
            println!("Interrupted, aborting job");
            abort_sent = comm.abort_async().await;
            if !comm.poll_scheduled() {
                break;
            }
        }
        comm.poll_once().await;
        render_cli_progress(&JobProgressEvent::from_job(
            comm.job(),
            comm.polls(),
            started.elapsed().as_secs_f64(),
        ));
    }
    clear_progress_line();

    match comm.status() {
        TaskStatus::Resolved => {
            println!(
                "Job {} finished after {} polls",
                comm.job().job_id.as_deref().unwrap_or("?"),
                comm.polls()
            );
            if let Some(values) = &comm.job().result_payload {
                println!("{}", serde_json::to_string_pretty(values)?);
            }
            Ok(())
        }
        status => {
            let flags = comm.communicator().status();
            if !flags.error_msg.is_empty() {
                eprintln!("{}", flags.error_msg);
            }
            Err(CliError::Job(status))
        }
    }
}

/// What a Ctrl-C does, by how many have been received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Abort,
    Exit,
}

fn interrupt_action(count: u32) -> Interrupt {
    if count <= 1 {
        Interrupt::Abort
    } else {
        Interrupt::Exit
    }
}

/// First Ctrl-C requests an abort; the next one exits without waiting for the
/// server.
async fn watch_interrupts(abort_tx: oneshot::Sender<()>) {
    let mut abort_tx = Some(abort_tx);
    let mut count = 0;
    while tokio::signal::ctrl_c().await.is_ok() {
        count += 1;
        match interrupt_action(count) {
            Interrupt::Abort => {
                if let Some(tx) = abort_tx.take() {
                    let _ = tx.send(());
                }
            }
            Interrupt::Exit => {
                clear_progress_line();
                eprintln!("Interrupted again, exiting");
                std::process::exit(130);
            }
        }
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &JobProgressEvent) {
    let width = 28usize;
    let fraction = event.fraction.unwrap_or(0.0).clamp(0.0, 1.0);
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] {:<12} state={}  polls={}  elapsed={:.1}s",
        bar,
        event.label.as_deref().unwrap_or(""),
        event.state,
        event.polls,
        event.elapsed_wall_s
    );
    let _ = io::stdout().flush();
}
