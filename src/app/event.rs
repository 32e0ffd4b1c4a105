//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task
//! that forwards them over a channel so the main loop stays non-blocking.
//! The tick doubles as the animation frame clock: when no input arrives
//! within the tick rate, a `Tick` is emitted so in-flight scroll
//! animations and scheduled drain batches still advance.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Spawns a background task that polls the terminal for events and sends
/// them through the returned channel.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let has_event = event::poll(tick_rate).unwrap_or(false);
            if has_event {
                if let Ok(ev) = event::read() {
                    let app_event = match ev {
                        CtEvent::Key(k) => AppEvent::Key(k),
                        CtEvent::Mouse(m) => AppEvent::Mouse(m),
                        CtEvent::Resize(w, h) => AppEvent::Resize(w, h),
                        _ => continue,
                    };
                    if tx.send(app_event).is_err() {
                        break; // receiver dropped
                    }
                }
            } else {
                // No input within the tick rate — emit a frame tick.
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        }
    });

    rx
}
