//! CLI command handlers.
//!
//! One-shot commands drive the same engine as the panel, rendering into a
//! throwaway [`PanelView`].

use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;

use crate::cli::args::Commands;
use crate::constants;
use crate::core::{ConnectionSource, EngineOptions, ReconciliationEngine};
use crate::state::{ProfileKey, SwitchEntry};
use crate::ui::view::PanelView;

/// Runs a one-shot command against `source`.
pub fn handle_command<S: ConnectionSource>(
    command: &Commands,
    source: S,
    mut options: EngineOptions,
) -> Result<()> {
    // One-shot commands leave profile settings alone.
    options.normalize_autoconnect = false;
    let mut engine = ReconciliationEngine::new(source, options);
    let mut view = PanelView::default();

    match command {
        Commands::List { json } => {
            engine.load(&mut view, Instant::now())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(engine.registry().entries())?);
            } else {
                print!("{}", format_table(engine.registry().entries()));
            }
            Ok(())
        }
        Commands::Up { name } => switch(&mut engine, &mut view, name, true),
        Commands::Down { name } => switch(&mut engine, &mut view, name, false),
    }
}

fn switch<S: ConnectionSource>(
    engine: &mut ReconciliationEngine<S>,
    view: &mut PanelView,
    name: &str,
    desired: bool,
) -> Result<()> {
    engine.enable(view, Instant::now())?;
    let result = drive(engine, view, name, desired);
    engine.disable(view);
    result
}

fn drive<S: ConnectionSource>(
    engine: &mut ReconciliationEngine<S>,
    view: &mut PanelView,
    name: &str,
    desired: bool,
) -> Result<()> {
    let entry = engine
        .registry()
        .find_by_label(name)
        .ok_or_else(|| eyre!("{}{name}", constants::CLI_MSG_UNKNOWN_PROFILE))?;
    let key = entry.profile.clone();
    let state = if desired { "up" } else { "down" };

    if entry.toggled == desired {
        println!("{name} is already {state}");
        return Ok(());
    }

    if engine.toggle(&key, desired) == 0 {
        bail!("{name}: nothing to {}", if desired { "activate" } else { "deactivate" });
    }

    if wait_for(
        engine,
        view,
        &key,
        desired,
        constants::CLI_WAIT_TIMEOUT,
        constants::EVENT_DRAIN_INTERVAL,
    ) {
        println!("{name} is {state}");
        Ok(())
    } else {
        bail!("{} ({name})", constants::CLI_MSG_TIMEOUT)
    }
}

/// Pumps events until the switch for `key` reads `desired` or `timeout` passes.
fn wait_for<S: ConnectionSource>(
    engine: &mut ReconciliationEngine<S>,
    view: &mut PanelView,
    key: &ProfileKey,
    desired: bool,
    timeout: Duration,
    poll: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        engine.pump(view, Instant::now());
        if engine.registry().get(key).is_some_and(|e| e.toggled == desired) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(poll);
    }
}

fn format_table(entries: &[SwitchEntry]) -> String {
    if entries.is_empty() {
        return format!("{}\n", constants::MSG_NO_PROFILES);
    }

    let name_width = entries
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let iface_width = entries
        .iter()
        .map(|e| e.interface_name.len())
        .max()
        .unwrap_or(0)
        .max(9);

    let mut out = format!("{:<name_width$}  {:<iface_width$}  STATE\n", "NAME", "INTERFACE");
    for entry in entries {
        out.push_str(&format!(
            "{:<name_width$}  {:<iface_width$}  {}\n",
            entry.label,
            entry.interface_name,
            if entry.toggled { "up" } else { "down" }
        ));
    }
    out
}

/// Dumps the in-memory log to stderr (`--verbose`).
pub fn print_logs() {
    for entry in crate::logger::get_logs() {
        eprintln!("{}", entry.format());
    }
}
