//! Cadence entrypoint.
use anyhow::Result;
use clap::Parser;
use core_config::load_from;
use core_input::InputQueue;
use core_keymap::KeyMap;
use core_state::LocalLibrary;
use core_terminal::{CrosstermBackend, TerminalBackend};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod runtime;

use runtime::{UiRuntime, log_shutdown_stage};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Terminal music player")]
struct Args {
    /// Configuration file path (overrides discovery of `cadence.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Grid rows per column, overriding `[layout] rows`.
    #[arg(long)]
    pub rows: Option<u32>,
    /// Grid columns, overriding `[layout] cols`.
    #[arg(long)]
    pub cols: Option<u32>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("cadence.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "cadence.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed; drop guard so writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let mut layout = config.layout();
    if let Some(rows) = args.rows {
        layout.rows = rows;
    }
    if let Some(cols) = args.cols {
        layout.cols = cols;
    }
    let layout = layout.normalized();
    let keymap = KeyMap::from_mappings(&config.key_mappings());
    info!(
        target: "runtime.startup",
        config_override = args.config.is_some(),
        rows = layout.rows,
        cols = layout.cols,
        pages = layout.pages.len(),
        bindings = keymap.len(),
        "bootstrap_complete"
    );

    let mut backend = CrosstermBackend::from_terminal_size()?;
    backend.set_title("Cadence")?;
    let mut guard = backend.enter_guard()?;

    let queue = InputQueue::new();
    let (input_task, input_shutdown) = core_input::spawn_async_input(queue.clone());
    let mut ui = UiRuntime::new(
        &mut *guard,
        &layout,
        config.render(),
        keymap,
        LocalLibrary::demo(),
        queue,
    )?;
    ui.attach_input(input_task, input_shutdown);
    let reason = ui.run().await?;
    drop(ui);
    drop(guard);
    log_shutdown_stage(reason, "terminal_restored");
    Ok(())
}
