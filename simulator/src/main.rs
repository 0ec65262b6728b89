use anyhow::Context;
use clap::Parser;
use feed::server;
use orbitcore::session::SessionParameters;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::FeedConfig;
use workflow::runner::Runner;

mod feed;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic orbital-object feed for the live stream protocol")]
struct Args {
    /// Write one complete session as NDJSON and exit
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Destination of the offline capture
    #[arg(long, default_value = "tools/data/offline_feed.ndjson")]
    output: PathBuf,
    /// Load a feed config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 20_000)]
    objects: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 250)]
    tick_millis: u64,
    /// Session parameters for the offline capture
    #[arg(long, default_value_t = 1)]
    collision_threshold: u32,
    #[arg(long, default_value_t = 3_600)]
    length: u32,
    #[arg(long, default_value_t = 60)]
    step: u32,
    /// Serve the feed over HTTP until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let feed_config = if let Some(path) = args.workflow.as_ref() {
        FeedConfig::load(path)?
    } else {
        FeedConfig::from_args(args.objects, args.seed, args.tick_millis)
    };

    let runner = Runner::new(&feed_config);
    println!(
        "Generated {} objects (seed {})",
        runner.object_count(),
        feed_config.seed
    );

    if args.offline {
        let params = SessionParameters::new(args.collision_threshold, args.length, args.step)
            .context("validating offline session parameters")?;
        if let Some(parent) = args.output.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&args.output)
            .with_context(|| format!("creating {}", args.output.display()))?;
        let mut writer = BufWriter::new(file);
        let mut lines = 0;
        for line in runner.run(params) {
            writer.write_all(line.as_bytes())?;
            lines += 1;
        }
        writer.flush()?;
        println!(
            "Offline run -> {} lines ({} frames) written to {}",
            lines,
            params.step_count(),
            args.output.display()
        );
    }

    if args.serve {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the feed server")?;
        runtime.block_on(async {
            tokio::select! {
                _ = server::serve(runner, feed_config.tick(), feed_config.bind) => {}
                result = signal::ctrl_c() => {
                    result.context("awaiting Ctrl+C to exit")?;
                    println!("Feed server stopped.");
                }
            }
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
