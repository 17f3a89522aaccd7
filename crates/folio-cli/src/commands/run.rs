use std::io;
use std::rc::Rc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use folio_core::{Coordinator, FolioConfig, FrameLoop, SystemClock};
use folio_tui::{
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    load_theme, App, TerminalRenderer,
};

pub fn run(config: &FolioConfig) -> Result<()> {
    let deck = super::load_deck(config)?;
    let coordinator = Coordinator::new(config, &deck, Rc::new(SystemClock))?;
    let mut app = App::new(coordinator, config, load_theme(&config.ui.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("folio"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, config);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!(section = app.coordinator.current_section(), "Presentation closed");
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &FolioConfig,
) -> Result<()> {
    let event_handler = EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.animation_fps);
    let mut frame_loop = FrameLoop::new();

    loop {
        // Smoothed wheel motion, then one animation frame
        app.update_smoothing();
        let mut renderer = TerminalRenderer::new(terminal, app.view());
        let outcome = frame_loop.pump(&app.coordinator, &mut renderer);
        app.on_tick(outcome);

        if frame_loop.is_halted() && app.status_message.is_none() {
            app.status_message = Some("Drawing failed, resize the terminal to retry".to_string());
        }

        // Poll faster while a transition or wheel motion is running
        let event = if app.needs_fast_update() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => app.handle_action(handle_key_event(key)),
                AppEvent::Wheel(lines) => app.on_wheel(lines),
                AppEvent::Resize(_, _) => {
                    if frame_loop.is_halted() {
                        app.status_message = None;
                    }
                    frame_loop.resume();
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
