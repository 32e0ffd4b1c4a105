//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event
//! handling).  The scroller, transcript, and viewport are separate fields
//! so the event loop can borrow them disjointly.

use std::time::Duration;

use crate::config::AppConfig;
use crate::core::scroller::ChatScroller;
use crate::core::transcript::Transcript;
use crate::ui::feed_widget::FeedViewport;

/// Top-level application state.
pub struct AppState {
    /// The live message list plus the pause buffer.
    pub transcript: Transcript,
    /// The scroll-state machine (live / paused, animation, drain).
    pub scroller: ChatScroller,
    /// Scroll position and measured geometry of the feed pane.
    pub viewport: FeedViewport,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional message shown in the status bar instead of the hints.
    pub status_message: Option<String>,
    /// Title shown above the feed.
    pub title: String,
    /// User configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, title: String) -> Self {
        Self {
            transcript: Transcript::new(config.line_limit),
            scroller: ChatScroller::new(Duration::from_millis(config.smooth_scroll_ms)),
            viewport: FeedViewport::default(),
            should_quit: false,
            status_message: None,
            title,
            config,
        }
    }
}
