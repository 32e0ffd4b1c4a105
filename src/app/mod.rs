//! Application orchestration — state, terminal events, feed intake, and
//! input handling.

pub mod event;
pub mod handler;
pub mod source;
pub mod state;
