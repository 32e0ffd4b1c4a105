//! Input handling — maps key/mouse events to scroller and viewport calls.
//!
//! Every manual viewport move is followed by `on_scroll()` so the core
//! classifies it on the next measurement.  Upward moves also register as
//! deliberate intent; downward ones never do, so riding the feed to the
//! bottom resumes live mode instead of pausing it.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use super::state::AppState;
use crate::core::scroller::ScrollMode;

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Char('p') => toggle_pause(state),
        KeyCode::End | KeyCode::Char('G') => resume_live(state),
        KeyCode::Up | KeyCode::Char('k') => {
            state.scroller.notify_user_active();
            scroll_by(state, -1);
        }
        KeyCode::Down | KeyCode::Char('j') => scroll_by(state, 1),
        KeyCode::PageUp => {
            state.scroller.notify_user_active();
            let page = state.viewport.page() as isize;
            scroll_by(state, -page);
        }
        KeyCode::PageDown => {
            let page = state.viewport.page() as isize;
            scroll_by(state, page);
        }
        KeyCode::Home => {
            state.scroller.notify_user_active();
            state.viewport.scroll_to_top();
            state.scroller.on_scroll();
        }
        _ => {}
    }
}

/// Process a mouse event.  Wheel-up is the canonical "I want to read
/// older messages" signal.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    // Wheel input is meaningless before the first render has wired the
    // viewport.  After that it always counts: the core's own guards take
    // care of the drain frame.
    if state.scroller.mode() == ScrollMode::Initializing {
        return;
    }
    let step = state.config.wheel_step as isize;
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            state.scroller.on_wheel(-1);
            scroll_by(state, -step);
        }
        MouseEventKind::ScrollDown => {
            state.scroller.on_wheel(1);
            scroll_by(state, step);
        }
        _ => {}
    }
}

fn scroll_by(state: &mut AppState, delta: isize) {
    state.viewport.scroll_by(delta);
    state.scroller.on_scroll();
}

fn toggle_pause(state: &mut AppState) {
    if state.scroller.is_paused() {
        state
            .scroller
            .unpause(Instant::now(), &mut state.transcript);
    } else {
        state.scroller.pause();
    }
}

/// Jump back to live.  An explicit request overrides a pause: resume
/// first (draining any backlog), then scroll to the bottom.
fn resume_live(state: &mut AppState) {
    if state.scroller.is_paused() {
        state
            .scroller
            .unpause(Instant::now(), &mut state.transcript);
    }
    state.scroller.request_live_scroll();
}
