//! File watcher: runs `check` on startup, then re-runs on source changes.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands;
use crate::config::{CONFIG_FILE, Config};
use crate::diagnostics;
use crate::error;
use crate::paths::DocStructure;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that signals on the channel whenever a
/// supported, non-excluded source file is created, modified or removed.
/// Build output under `_build/` never triggers a re-check.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    structure: DocStructure,
    config: Config,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return is_relevant(p, &structure, &config))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::Watch { reason: format!("watcher setup failed: {e}") };
    });
}

/// Whether a changed path can affect the check result: a supported
/// source file, or the config file, outside excluded directories.
fn is_relevant(path: &Path, structure: &DocStructure, config: &Config) -> bool {
    if structure.is_excluded(path, config) {
        return false;
    }
    let is_config = path.file_name().is_some_and(|n| return n == CONFIG_FILE);
    return is_config || config.is_supported(path);
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches the documentation root recursively
/// and re-checks on changes. Each run is a fresh batch pass.
///
/// # Errors
///
/// Returns errors from layout resolution or watcher setup.
pub fn run(docs_dir: Option<&Path>) -> Result<ExitCode, error::Error> {
    let (config, structure) = commands::load_layout(docs_dir)?;
    let root = structure.root.clone();

    eprintln!("watch: initial check");
    let mut last_code = run_check(&root);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, structure, config)?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|e| return error::Error::Watch { reason: format!("cannot watch {}: {e}", root.display()) })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", root.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(&root);
    }

    return Ok(last_code);
}

/// Run check once and print result. Returns the exit code from check.
fn run_check(root: &Path) -> ExitCode {
    return match commands::check(Some(root)) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}
