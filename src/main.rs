//! Follow a live, append-only chat feed in the terminal.
//!
//! Pipe a transcript in (`tail -f chat.log | tailview`) or run with
//! `--demo` for synthetic traffic.  The feed stays pinned to the newest
//! message until you scroll up; scroll back to the bottom (or press End)
//! to catch up.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    source::{self, FeedItem},
    state::AppState,
};
use crate::core::scroller::ScrollMode;
use crate::ui::{feed_widget::FeedWidget, layout::AppLayout, theme::Theme};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Live feed viewer with smart auto-scroll")]
struct Cli {
    /// Emit synthetic chat traffic instead of reading stdin.
    #[arg(long)]
    demo: bool,

    /// Milliseconds between demo messages.
    #[arg(long, default_value_t = 400)]
    demo_interval: u64,

    /// Title shown above the feed.
    #[arg(long, default_value = "live feed")]
    title: String,
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let user_config = config::AppConfig::load();
    if let Err(err) = user_config.ensure_on_disk() {
        tracing::debug!(%err, "could not write default config");
    }
    let mut state = AppState::new(user_config, cli.title.clone());

    // ── feed + event channels ─────────────────────────────────
    let mut feed = if cli.demo {
        source::spawn_demo_feed(Duration::from_millis(cli.demo_interval.max(10)))
    } else {
        source::spawn_stdin_feed()
    };
    let mut events = spawn_event_reader(Duration::from_millis(33));
    let mut notices = state.scroller.subscribe();

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── event loop ────────────────────────────────────────────
    loop {
        // ── draw first ─────────────────────────────────────────
        // Rendering is also the measurement pass: the feed widget
        // recounts wrapped rows and updates the viewport geometry.
        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());

            let feed_block = Block::default()
                .title(format!(" {} ({}) ", state.title, state.transcript.len()))
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());

            let feed = FeedWidget::new(&state.transcript).block(feed_block);
            frame.render_stateful_widget(feed, layout.feed_area, &mut state.viewport);

            let status = Paragraph::new(status_line(&state)).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);
        })?;

        // ── post-layout: measure, then advance scheduled work ──
        // Layout has settled, so the viewport numbers are trustworthy:
        // complete any pending scroll classification against them, then
        // step the animation and release due drain batches.
        let now = Instant::now();
        let measurement = state.viewport.measurement();
        state
            .scroller
            .apply_measurement(now, measurement, &mut state.transcript);
        state
            .scroller
            .tick(now, &mut state.viewport, &mut state.transcript);

        while let Ok(notice) = notices.try_recv() {
            tracing::debug!(?notice, "scroll transition");
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => {}
                }
            }

            Some(item) = feed.recv() => {
                apply_feed_item(&mut state, item);
                // Batch-drain whatever else is already queued so a burst
                // of messages costs one redraw, not one per message.
                while let Ok(more) = feed.try_recv() {
                    apply_feed_item(&mut state, more);
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

/// Route one feed item: live messages append and pin to the bottom;
/// messages arriving during a pause go to the backlog instead.
fn apply_feed_item(state: &mut AppState, item: FeedItem) {
    match item {
        Ok(msg) => {
            // The feed is healthy again; drop any lingering error banner.
            state.status_message = None;
            if state.scroller.is_paused() {
                state.transcript.add(msg, false);
            } else {
                state.transcript.add(msg, true);
                state.scroller.request_live_scroll();
            }
        }
        Err(err) => {
            tracing::warn!(%err, "feed source error");
            state.status_message = Some(format!("feed error: {err}"));
        }
    }
}

/// Build the status bar: a mode badge plus key hints (or an error).
fn status_line(state: &AppState) -> Line<'static> {
    if let Some(msg) = &state.status_message {
        return Line::from(msg.clone());
    }

    match state.scroller.mode() {
        ScrollMode::Initializing => Line::from(" …"),
        ScrollMode::Live => {
            let hint = if state.scroller.is_live() {
                "scroll up to pause · q quit"
            } else {
                "catching up · q quit"
            };
            Line::from(vec![
                Span::styled(" LIVE ", Theme::live_badge_style()),
                Span::raw(hint),
            ])
        }
        ScrollMode::Paused => Line::from(vec![
            Span::styled(" PAUSED ", Theme::paused_badge_style()),
            Span::raw(format!(
                "{} new · End or scroll down to resume · q quit",
                state.transcript.backlog()
            )),
        ]),
    }
}
