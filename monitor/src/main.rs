use anyhow::Context;
use clap::Parser;
use commands::{Action, CommandInterpreter, HELP};
use config::MonitorConfig;
use display::ConsoleObserver;
use orbitcore::catalog::ObjectCatalog;
use orbitcore::session::{SessionCommand, SessionDriver, StreamSessionController};
use orbitcore::telemetry::StreamMetrics;
use reqwest::Client;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use transport::{load_catalog, HttpTransport};

mod commands;
mod config;
mod display;
mod transport;

#[derive(Parser)]
#[command(author, version, about = "Headless live-mode client for the orbital-object feed")]
struct Args {
    /// Load a monitor config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the live stream endpoint
    #[arg(long)]
    endpoint: Option<String>,
    /// Override the catalog source (file path or URL)
    #[arg(long)]
    catalog: Option<String>,
    /// Override the display capacity
    #[arg(long)]
    capacity: Option<usize>,
    /// Wait for `start` instead of entering live mode right away
    #[arg(long, default_value_t = false)]
    manual: bool,
    /// Print the altitude legend every N frames (0 disables)
    #[arg(long, default_value_t = 10)]
    legend_every: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.config.as_ref() {
        MonitorConfig::load(path)?
    } else {
        MonitorConfig::default()
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(catalog) = args.catalog {
        config.catalog = Some(catalog);
    }
    if let Some(capacity) = args.capacity {
        config.display.capacity = capacity;
    }
    if args.manual {
        config.autostart = false;
    }

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for the live session")?;
    LocalSet::new().block_on(&runtime, run(config, args.legend_every))
}

async fn run(config: MonitorConfig, legend_every: usize) -> anyhow::Result<()> {
    let client = Client::new();
    if config.catalog_is_remote() {
        log::info!("fetching catalog from the feed service");
    }
    let catalog = match config.catalog.as_deref() {
        Some(source) => load_catalog(&client, source).await?,
        None => ObjectCatalog::new(),
    };
    println!("[LIVE] catalog holds {} known objects", catalog.len());

    let metrics = StreamMetrics::new();
    let controller = StreamSessionController::new(
        config.display.clone(),
        catalog,
        ConsoleObserver::new(legend_every),
    )
    .with_metrics(metrics.clone());

    let (commands, commands_rx) = mpsc::unbounded_channel();
    let transport = HttpTransport::new(client, config.endpoint.clone());
    let driver =
        tokio::task::spawn_local(SessionDriver::new(controller, transport, commands_rx).run());

    if config.autostart {
        commands.send(SessionCommand::Enter(config.session))?;
    }
    println!("{}", HELP);

    let mut interpreter = CommandInterpreter::new(config.session, config.display.criteria.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("reading commands from stdin")? else {
                    stdin_open = false;
                    continue;
                };
                match interpreter.interpret(&line) {
                    Ok(Action::Send(SessionCommand::Shutdown)) => break,
                    Ok(Action::Send(command)) => commands.send(command)?,
                    Ok(Action::Metrics) => {
                        println!("{}", serde_json::to_string(&metrics.snapshot())?)
                    }
                    Ok(Action::Help) => println!("{}", HELP),
                    Ok(Action::Nothing) => {}
                    Err(err) => eprintln!("{:#}", err),
                }
            }
            result = signal::ctrl_c() => {
                result.context("awaiting Ctrl+C to exit")?;
                break;
            }
        }
    }

    commands.send(SessionCommand::Shutdown)?;
    let controller = driver.await.context("session driver stopped abnormally")?;
    println!(
        "[LIVE] final state {} | metrics {}",
        controller.state(),
        serde_json::to_string(&metrics.snapshot())?
    );
    Ok(())
}
