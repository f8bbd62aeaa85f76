use std::io::{self, Stderr};
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::widget::Completion;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

#[derive(Debug)]
#[allow(dead_code)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    Joke(Completion),
}

/// Key presses, mouse and resize events; everything else is dropped.
fn terminal_event(evt: io::Result<Event>) -> Option<AppEvent> {
    match evt {
        // Only handle key press events, not release
        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Ok(Event::Mouse(mouse)) => Some(AppEvent::Mouse(mouse)),
        Ok(Event::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "terminal event read failed");
            None
        }
    }
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    /// Merges terminal input, a tick timer and joke completions into one stream.
    pub fn new(mut completions: mpsc::UnboundedReceiver<Completion>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _tx = tx.clone();

        // Spawn event reader task
        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(evt) = reader.next().await {
                let app_event = terminal_event(evt);

                if let Some(event) = app_event {
                    if tx_events.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        // Completions keep their arrival order
        let tx_jokes = tx.clone();
        tokio::spawn(async move {
            while let Some(completion) = completions.recv().await {
                if tx_jokes.send(AppEvent::Joke(completion)).is_err() {
                    break;
                }
            }
        });

        // Spawn tick timer for the loading spinner (300ms interval)
        let tx_tick = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_millis(300));
            loop {
                interval.tick().await;
                if tx_tick.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

/// Raw mode, alternate screen and mouse capture on stderr, so stdout stays free.
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

/// Undo [`init`]. Every step runs even if an earlier one fails; the first
/// failure is returned.
pub fn restore() -> Result<()> {
    let screen = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);
    let raw = disable_raw_mode();
    if let Err(e) = &screen {
        tracing::warn!(error = %e, "could not leave the alternate screen");
    }
    if let Err(e) = &raw {
        tracing::warn!(error = %e, "could not leave raw mode");
    }
    screen?;
    raw?;
    Ok(())
}

/// Restores the terminal and records the panic in the log file before the
/// default hook prints it.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        tracing::error!(panic = %info, "joke page panicked");
        default_hook(info);
    }));
}
