//! SessionLens - command line host
//!
//! Replays a newline-delimited JSON event log through a recorder, either
//! uploading chunks to the collector or printing them to stdout.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sessionlens_rs::{
    backend::{ChannelCaptureEngine, ChannelVisibility},
    config::{app_data_dir, RecorderConfig, RecordingOptions, OPTIONS_FILE},
    session::{RecorderEnvironment, SessionRecorder},
    storage::FileStore,
    CapturedEvent,
};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sessionlens", version, about = "Session recording host")]
struct Cli {
    /// Directory for daily rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a recorded event log through a recorder
    Replay {
        /// Newline-delimited JSON events
        events: PathBuf,

        /// Recording options (TOML); defaults to the data directory
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Mode::Manual)]
        mode: Mode,

        /// Collector write code (auto mode)
        #[arg(long, default_value = "")]
        write_code: String,

        /// User id attached to uploads (auto mode)
        #[arg(long, default_value = "")]
        user_id: String,

        /// Storage file; defaults to the data directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Upload chunks to the collector
    Auto,
    /// Print chunks to stdout
    Manual,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_dir.as_deref())?;

    match cli.command {
        Command::Replay {
            events,
            config,
            mode,
            write_code,
            user_id,
            store,
        } => replay(&events, config, mode, write_code, user_id, store),
    }
}

fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sessionlens_rs=debug"));
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sessionlens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file)
                .try_init()
                .context("failed to install log subscriber")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .try_init()
                .context("failed to install log subscriber")?;
            Ok(None)
        }
    }
}

fn load_options(path: Option<PathBuf>) -> Result<RecordingOptions> {
    match path {
        Some(path) => RecordingOptions::load(&path)
            .with_context(|| format!("failed to load options from {}", path.display())),
        None => Ok(app_data_dir()
            .map(|dir| RecordingOptions::load_or_default(dir.join(OPTIONS_FILE)))
            .unwrap_or_default()),
    }
}

fn replay(
    events: &Path,
    config: Option<PathBuf>,
    mode: Mode,
    write_code: String,
    user_id: String,
    store: Option<PathBuf>,
) -> Result<()> {
    let options = load_options(config)?;
    let store = match store {
        Some(path) => FileStore::open(path)?,
        None => FileStore::open_default()?,
    };

    let config = match mode {
        Mode::Auto => RecorderConfig::auto(write_code, user_id),
        Mode::Manual => RecorderConfig::manual(|chunk| {
            let line = serde_json::to_string(&chunk)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", line)?;
            Ok(())
        }),
    }
    .with_options(options);

    let capture = ChannelCaptureEngine::new();
    let handle = capture.handle();
    let env = RecorderEnvironment::new()
        .with_store(store)
        .with_capture(capture)
        .with_visibility(ChannelVisibility::new());

    let mut recorder = SessionRecorder::new(config, env);
    if let Some(reason) = recorder.inert_reason() {
        bail!("recorder did not start: {}", reason);
    }
    tracing::info!(
        "Replaying {} into session {}",
        events.display(),
        recorder.session_id().unwrap_or_default()
    );

    let file = std::fs::File::open(events)
        .with_context(|| format!("failed to open {}", events.display()))?;
    let mut replayed = 0usize;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: CapturedEvent = serde_json::from_str(&line)
            .with_context(|| format!("line {}: not a captured event", index + 1))?;
        handle.emit(event);
        replayed += recorder.pump();
    }

    recorder.flush_now();
    recorder.stop();

    match recorder.delivery_stats() {
        Some(stats) => tracing::info!(
            "Replayed {} events: {} chunks delivered, {} failed, {} skipped, {} dropped",
            replayed,
            stats.delivered,
            stats.failed,
            stats.skipped,
            stats.dropped
        ),
        None => tracing::info!("Replayed {} events", replayed),
    }

    Ok(())
}
