//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer turns the transcript into rows on the terminal and reports
//! the measured geometry back to the core after each draw.  No feed I/O
//! happens here.

pub mod feed_widget;
pub mod layout;
pub mod theme;
