use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{info, warn};

use crate::pipeline::Pipeline;

/// Terminal hotkey loop, run on the main thread until quit or shutdown:
/// Space toggles capture (push-to-talk), Right nudges the position forward,
/// `q`/Esc/Ctrl-C quits.
pub fn run(pipeline: &mut Pipeline) -> std::io::Result<()> {
    terminal::enable_raw_mode()?;
    println!("--- Ready ---\r");
    println!("[SPACE] start/stop listening   [RIGHT] manual forward   [Q] quit\r");

    let result = event_loop(pipeline);

    terminal::disable_raw_mode()?;
    result
}

fn event_loop(pipeline: &mut Pipeline) -> std::io::Result<()> {
    loop {
        if pipeline.shutdown_token().is_signalled() {
            return Ok(());
        }
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char(' ') => match pipeline.toggle_capture() {
                Ok(true) => info!("Listening"),
                Ok(false) => info!("Paused"),
                Err(e) => {
                    warn!("Could not start capture: {e}");
                    return Err(std::io::Error::other(e.to_string()));
                }
            },
            KeyCode::Right => pipeline.nudge_forward(),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(());
            }
            _ => {}
        }
    }
}
