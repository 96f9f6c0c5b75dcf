//! Async input handling using crossterm's EventStream

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Builder for `AsyncInput`
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub tick_rate: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }
}

impl Config {
    /// Creates a new async `AsyncInput` with the configuration in `Self`
    pub fn init(self) -> AsyncInput {
        AsyncInput::with_config(self)
    }
}

#[derive(Debug)]
pub enum Event {
    Input(KeyEvent),
    Tick,
    Render,
}

/// Async input handler using crossterm's EventStream
pub struct AsyncInput {
    rx: mpsc::UnboundedReceiver<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl AsyncInput {
    pub fn with_config(config: Config) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let _task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut tick_interval = interval(config.tick_rate);

            loop {
                tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(CrosstermEvent::Key(key))) => {
                                // KeyPress only (avoid duplicate events on some platforms)
                                if key.kind == crossterm::event::KeyEventKind::Press
                                    && tx.send(Event::Input(key)).is_err()
                                {
                                    return;
                                }
                            }
                            Some(Ok(CrosstermEvent::Resize(_, _))) => {
                                let _ = tx.send(Event::Render);
                            }
                            Some(Ok(_)) => {}
                            Some(Err(_)) | None => return,
                        }
                    }
                    _ = tick_interval.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Self { rx, _task }
    }

    /// Next event, or `None` once the reader task has stopped
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
