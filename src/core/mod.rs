//! Core scroll behavior — state machine, animator, and backlog drain.
//!
//! Nothing in this module depends on any TUI or rendering crate.  The
//! viewport and the message store are reached through small traits so the
//! whole unit can be driven by fakes in tests.

pub mod animator;
pub mod drain;
pub mod scroller;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testutil;
