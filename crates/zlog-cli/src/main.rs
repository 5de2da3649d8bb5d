//! `zlogctl` — a command-line sandbox for exercising the object class, view
//! store, striper, and sequencer against an in-memory log. There is no
//! durable or networked object store backing this tool, so every invocation
//! starts from an empty store; `demo` is the subcommand that actually shows
//! the stack working end to end in one process, the others are useful for
//! scripting a single op at a time.

mod log_session;

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::{debug, info};

use log_session::LogSession;
use zlog_backend::Backend;
use zlog_proto::ViewParams;
use zlog_sequencer::FakeSequencer;
use zlog_store::MemStore;

#[derive(Parser)]
#[command(name = "zlogctl")]
#[command(about = "Sandbox CLI for the shared-log storage engine", long_about = None)]
struct Cli {
    /// Log name (its metadata object is "<name>.meta")
    #[arg(short, long, default_value = "zlogctl")]
    log: String,

    /// Entry size in bytes, used when creating a new log
    #[arg(long, default_value = "4096", env = "ZLOG_ENTRY_SIZE")]
    entry_size: u32,

    /// Stripe width, used when creating a new log
    #[arg(long, default_value = "4", env = "ZLOG_STRIPE_WIDTH")]
    stripe_width: u32,

    /// Entries per object, used when creating a new log
    #[arg(long, default_value = "100", env = "ZLOG_ENTRIES_PER_OBJECT")]
    entries_per_object: u32,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a log and append one entry to it
    Append {
        /// Input file ("-" for stdin)
        file: String,
    },
    /// Create a log, write one entry, and read it straight back
    Echo {
        /// Input file ("-" for stdin)
        file: String,
    },
    /// Run an end-to-end session: create a log, append several entries
    /// (auto-extending the view sequence as needed), read them all back,
    /// invalidate one, and print a summary
    Demo {
        /// Number of entries to append
        #[arg(short, long, default_value = "20")]
        count: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let store = MemStore::new();
    let backend = Arc::new(Backend::new(store));
    let sequencer = Arc::new(FakeSequencer::new());

    let params = ViewParams {
        entry_size: cli.entry_size,
        stripe_width: cli.stripe_width,
        entries_per_object: cli.entries_per_object,
    };

    match cli.command {
        Commands::Append { file } => {
            let session = LogSession::create(backend, sequencer, cli.log.clone(), params, 1)
                .await
                .context("failed to create log")?;
            let data = read_input(&file).context("failed to read input")?;
            let position = session.append(data.clone()).await.context("append failed")?;
            println!("{position}");
            if cli.debug {
                eprintln!("wrote {} bytes to {} at position {position}", data.len(), session.name());
            }
        }
        Commands::Echo { file } => {
            let session = LogSession::create(backend, sequencer, cli.log.clone(), params, 1)
                .await
                .context("failed to create log")?;
            let data = read_input(&file).context("failed to read input")?;
            let position = session.append(data.clone()).await.context("append failed")?;
            let (outcome, read_back) = session.read(position).await.context("read failed")?;
            debug!(?outcome, "echo: read outcome");
            std::io::Write::write_all(&mut std::io::stdout(), &read_back[..data.len()])
                .context("failed to write output")?;
        }
        Commands::Demo { count } => run_demo(backend, sequencer, cli.log, params, count).await?,
    }

    Ok(())
}

async fn run_demo(
    backend: Arc<Backend>,
    sequencer: Arc<FakeSequencer>,
    name: String,
    params: ViewParams,
    count: u64,
) -> Result<()> {
    let session = LogSession::create(backend, sequencer, name, params, 1)
        .await
        .context("failed to create log")?;

    info!(log = session.name(), count, "starting demo session");

    let mut rng = rand::thread_rng();
    let mut positions = Vec::with_capacity(count as usize);
    for i in 0..count {
        let payload = format!("entry-{i}-{:08x}", rng.gen::<u32>());
        let position = session
            .append(Bytes::from(payload.clone().into_bytes()))
            .await
            .with_context(|| format!("append #{i} failed"))?;
        positions.push(position);
        println!("appended {payload:?} at position {position}");
    }

    for &position in &positions {
        let (outcome, data) = session.read(position).await?;
        let text = String::from_utf8_lossy(&data);
        println!("read position {position}: {outcome:?} {text:?}");
    }

    if let Some(&first) = positions.first() {
        session.invalidate(first, true).await?;
        let (outcome, _) = session.read(first).await?;
        println!("invalidated position {first}: now reads as {outcome:?}");
    }

    let views = session.view_read(0).await?;
    println!("view sequence has {} view(s); max epoch {}", views.len(), views.last().map(|v| v.epoch).unwrap_or(0));

    Ok(())
}

fn read_input(file: &str) -> Result<Bytes> {
    use std::io::Read;
    let data = if file == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read from stdin")?;
        buffer
    } else {
        std::fs::read(file).with_context(|| format!("failed to read file: {file}"))?
    };
    Ok(Bytes::from(data))
}
