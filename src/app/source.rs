//! Feed intake — where messages come from.
//!
//! Two providers behind the same channel shape: a stdin line reader (pipe
//! a transcript or `tail -f` output in) and a synthetic demo feed for
//! trying the scroll behavior without a real source.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::core::transcript::Message;

/// Feed source failures surfaced to the status bar.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("stdin read failed: {0}")]
    Stdin(#[from] std::io::Error),
}

pub type FeedItem = Result<Message, FeedError>;

/// Spawns a task that reads lines from stdin and forwards them as
/// messages.  Lines shaped like `nick: text` are split into author and
/// body; anything else becomes an author-less message.
pub fn spawn_stdin_feed() -> mpsc::UnboundedReceiver<FeedItem> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim_end();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(Ok(parse_line(line))).is_err() {
                        break; // receiver dropped
                    }
                }
                Ok(None) => break, // EOF — feed is done, the UI stays up
                Err(err) => {
                    let _ = tx.send(Err(FeedError::Stdin(err)));
                    break;
                }
            }
        }
    });

    rx
}

/// Spawns a task that emits synthetic chat traffic on an interval.
pub fn spawn_demo_feed(interval: Duration) -> mpsc::UnboundedReceiver<FeedItem> {
    const AUTHORS: &[&str] = &["ada", "brin", "cass", "dov", "edda"];
    const PHRASES: &[&str] = &[
        "did anyone look at the deploy logs yet?",
        "yeah, rolling restart finished a minute ago",
        "the latency graph looks normal again",
        "I still see a handful of 502s on the edge, retrying the canary now with the cache disabled to rule out a stale entry",
        "ok",
        "ship it",
        "pushing the follow-up fix, one sec",
        "that flaky test is back — third time this week",
        "lunch?",
    ];

    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut i = 0usize;
        loop {
            tokio::time::sleep(interval).await;
            let msg = Message::new(AUTHORS[i % AUTHORS.len()], PHRASES[i % PHRASES.len()]);
            if tx.send(Ok(msg)).is_err() {
                break;
            }
            i = i.wrapping_add(1);
        }
    });

    rx
}

/// Split `nick: text` into author and body.  Authors are short,
/// space-free tokens; anything that doesn't look like one stays in the
/// body so arbitrary piped text is never mangled.
fn parse_line(line: &str) -> Message {
    if let Some((author, body)) = line.split_once(": ") {
        let author = author.trim();
        if !author.is_empty() && author.len() <= 20 && !author.contains(' ') {
            return Message::new(author, body.trim_start());
        }
    }
    Message::new("", line)
}
