//! # wg-indicator
//!
//! Terminal panel that mirrors NetworkManager's `WireGuard` connections as a
//! list of on/off switches, with an animated lock icon for overall status.
//!
//! ## Modules
//! - [`app`]: Panel state and key handling.
//! - [`cli`]: Argument parsing and one-shot commands.
//! - [`config`]: Configuration management.
//! - [`core`]: Switch registry, icon animator and reconciliation engine.
//! - [`nm`]: `nmcli`-backed connection source.
//! - [`ui`]: TUI rendering.

mod app;
mod cli;
mod config;
mod constants;
mod core;
mod error;
mod event;
mod logger;
mod nm;
mod state;
mod theme;
mod ui;
mod utils;

use std::time::Instant;

use app::App;
use clap::Parser;
use cli::args::Args;
use color_eyre::Result;
use event::{Event, EventHandler};
use nm::NmcliSource;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let config_dir = config::resolve_config_dir(args.config_dir.as_ref())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to resolve config directory: {e}"))?;

    let app_config = match config::load_config(&config_dir) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}{e}", constants::CLI_MSG_ERROR);
            eprintln!();
            eprintln!("Fix the file or remove it to use defaults:");
            eprintln!(
                "  rm {}",
                config_dir.join(constants::CONFIG_FILE_NAME).display()
            );
            std::process::exit(1);
        }
    };

    logger::configure(&app_config.log_level, app_config.max_log_entries);
    if args.verbose {
        logger::set_min_level(logger::LogLevel::Debug);
    }

    let source = NmcliSource::new(
        app_config.nmcli_path.clone(),
        app_config.category(),
        app_config.poll_interval(),
    );

    if let Some(command) = &args.command {
        let result = cli::commands::handle_command(command, source, app_config.engine_options());
        if args.verbose {
            cli::commands::print_logs();
        }
        return result;
    }

    let mut app = App::new(source, app_config.engine_options());
    app.start()?;

    let terminal = ratatui::init();
    let result = run_tui(terminal, &mut app, app_config.tick_rate);
    ratatui::restore();
    app.shutdown();

    result
}

fn run_tui(
    mut terminal: ratatui::DefaultTerminal,
    app: &mut App<NmcliSource>,
    tick_rate: u64,
) -> Result<()> {
    let events = EventHandler::new(tick_rate);
    let size = terminal.size()?;
    app.on_resize(size.width, size.height);

    terminal.draw(|frame| ui::render(frame, app))?;

    while !app.should_quit {
        match events.next_timeout(app.next_wait(Instant::now()))? {
            Some(Event::Key(key_event)) => app.handle_key(key_event),
            Some(Event::Resize(width, height)) => app.on_resize(width, height),
            Some(Event::Tick) | None => {}
        }

        // Connection events and due icon frames land before every draw.
        app.service(Instant::now());
        terminal.draw(|frame| ui::render(frame, app))?;
    }

    Ok(())
}
