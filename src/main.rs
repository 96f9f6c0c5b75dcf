#![deny(unsafe_code)]

//! # Csel
//!
//! TUI color launcher: pick a preset, gradient or ad-hoc HEX value and
//! cover the screen with it via an external overlay renderer.

/// Central UI state
mod app;
/// Built-in presets
mod catalog;
/// CLI parser
mod cli;
/// TOML config
mod config;
/// HEX parsing
mod hex;
/// Terminal input helpers
mod input;
/// Search matching
mod matcher;
/// Color records
mod model;
/// Renderer launching
mod overlay;
/// Persistent document store
mod store;
/// UI renderer
mod ui;

use std::io;
use std::process;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use eyre::{eyre, Result, WrapErr};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use scopeguard::defer;
use tokio::sync::mpsc;

use app::{Action, Mode, State};
use input::Event;
use overlay::Overlay;

fn main() {
    if let Err(error) = real_main() {
        shutdown_terminal();
        eprintln!("{error:?}");
        process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let cli = cli::parse().map_err(|e| eyre!("{}", e))?;

    let (db, data_dir) = store::open_db()?;

    let script = cli
        .renderer_script
        .clone()
        .unwrap_or_else(|| data_dir.join("overlay.swift"));
    let overlay = Overlay::new(cli.renderer_runtime.clone(), script);

    // One-shot paths run their store writes synchronously, before any
    // runtime exists, so nothing is lost at shutdown.
    if cli.clear_recent {
        let mut recents = store::RecentColors::load(db);
        recents.clear();
        println!("Recent color history cleared");
        return Ok(());
    }

    if let Some(fill) = cli.fill.clone() {
        return direct_fill(&cli, db, &overlay, &fill);
    }

    let runtime = tokio::runtime::Runtime::new().wrap_err("Failed to start async runtime")?;
    runtime.block_on(run_tui(cli, db, overlay))
}

/// Direct fill bypasses the TUI entirely
fn direct_fill(
    cli: &cli::Opts,
    db: std::sync::Arc<redb::Database>,
    overlay: &Overlay,
    fill: &str,
) -> Result<()> {
    let quick = hex::parse_quick(fill)
        .ok_or_else(|| eyre!("invalid fill value {:?}: expected '#hex' or '#hex,#hex'", fill))?;

    if cli.no_exec {
        match quick.hex2() {
            Some(hex2) => println!("{} {}", quick.hex(), hex2),
            None => println!("{}", quick.hex()),
        }
        return Ok(());
    }

    if cli.verbose.unwrap_or(0) > 0 {
        eprintln!(
            "renderer: {} {}",
            cli.renderer_runtime,
            overlay.script().display()
        );
    }

    let mut recents = store::RecentColors::load(db);
    let option = model::ColorOption {
        title: fill.to_string(),
        hex: quick.hex().to_string(),
        hex2: quick.hex2().map(str::to_string),
        keywords: Vec::new(),
        id: None,
        favorite: false,
        created_at: 0,
        last_used: 0,
    };
    recents.record(&option, model::Origin::Adhoc);

    let runtime = tokio::runtime::Runtime::new().wrap_err("Failed to start async runtime")?;
    runtime
        .block_on(overlay.launch(quick.hex(), quick.hex2()))
        .wrap_err("Overlay launch failed")
}

fn setup_terminal() -> Result<()> {
    enable_raw_mode().wrap_err("Failed to enable raw mode")?;
    io::stderr()
        .execute(EnterAlternateScreen)
        .wrap_err("Failed to enter alternate screen")?;
    Ok(())
}

fn shutdown_terminal() {
    let _ = io::stderr().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

async fn run_tui(cli: cli::Opts, db: std::sync::Arc<redb::Database>, overlay: Overlay) -> Result<()> {
    let mut state = State::new(db, cli.hard_stop, cli.search_string.clone());

    setup_terminal()?;
    defer! {
        shutdown_terminal();
    }

    let backend = CrosstermBackend::new(io::stderr());
    let mut terminal = Terminal::new(backend).wrap_err("Failed to create terminal")?;

    let mut events = input::Config::default().init();
    let (launch_tx, mut launch_rx) = mpsc::unbounded_channel::<String>();
    let ui = ui::UI::new();

    loop {
        terminal
            .draw(|f| ui.render(f, &state, &cli))
            .wrap_err("Failed to draw UI")?;

        tokio::select! {
            event = events.next() => {
                match event {
                    Some(Event::Input(key)) => handle_key(&mut state, key, &overlay, &launch_tx, &cli),
                    Some(Event::Tick) | Some(Event::Render) => {}
                    None => break,
                }
            }
            message = launch_rx.recv() => {
                if let Some(message) = message {
                    state.status = message;
                }
            }
        }

        if state.should_exit {
            break;
        }
    }

    Ok(())
}

fn handle_key(
    state: &mut State,
    key: KeyEvent,
    overlay: &Overlay,
    launch_tx: &mpsc::UnboundedSender<String>,
    cli: &cli::Opts,
) {
    if matches!(state.mode, Mode::Form(_)) {
        handle_form_key(state, key);
        return;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => state.should_exit = true,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => state.should_exit = true,
        (KeyCode::Up, _) => state.move_up(),
        (KeyCode::Down, _) => state.move_down(),
        (KeyCode::Tab, _) => state.cycle_category(),
        (KeyCode::Enter, _) => {
            if let Action::Launch { hex, hex2 } = state.activate() {
                spawn_launch(state, overlay, launch_tx, cli, hex, hex2);
            }
        }
        (KeyCode::Char('f'), KeyModifiers::CONTROL) => state.toggle_favorite(),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => state.delete_selected(),
        (KeyCode::Char('e'), KeyModifiers::CONTROL) => state.edit_selected(),
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => state.open_form(None),
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
            state.clear_recents();
            state.status = "Recent color history cleared".to_string();
        }
        (KeyCode::Backspace, _) => state.pop_query(),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => state.push_query(c),
        _ => {}
    }
}

fn handle_form_key(state: &mut State, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => state.close_form(),
        (KeyCode::Enter, _) => state.submit_form(),
        (code, modifiers) => {
            let Mode::Form(form) = &mut state.mode else {
                return;
            };
            match (code, modifiers) {
                (KeyCode::Tab, _) | (KeyCode::Down, _) => {
                    form.focus = (form.focus + 1) % app::ColorForm::FIELDS;
                }
                (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
                    form.focus =
                        (form.focus + app::ColorForm::FIELDS - 1) % app::ColorForm::FIELDS;
                }
                (KeyCode::Backspace, _) => {
                    form.field_mut().pop();
                    form.error = None;
                }
                (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                    form.field_mut().push(c);
                    form.error = None;
                }
                _ => {}
            }
        }
    }
}

/// Fire the renderer without blocking the UI; a failure lands in the
/// status line whenever it settles. Repeated launches stack windows.
fn spawn_launch(
    state: &mut State,
    overlay: &Overlay,
    launch_tx: &mpsc::UnboundedSender<String>,
    cli: &cli::Opts,
    hex: String,
    hex2: Option<String>,
) {
    let label = match &hex2 {
        Some(hex2) => format!("{} → {}", hex, hex2),
        None => hex.clone(),
    };

    if cli.no_exec {
        state.status = format!("Would show {}", label);
        return;
    }
    state.status = format!("Showing {}", label);

    let overlay = overlay.clone();
    let tx = launch_tx.clone();
    tokio::spawn(async move {
        if let Err(error) = overlay.launch(&hex, hex2.as_deref()).await {
            let _ = tx.send(format!("Launch failed: {}", error));
        }
    });
}
