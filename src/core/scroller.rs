//! Live/paused scroll-state machine for the feed viewport.
//!
//! The feed stays pinned to the newest message ("live") until the user
//! deliberately scrolls up, at which point auto-scroll is suspended
//! ("paused") and incoming messages accumulate in the transcript's pause
//! buffer.  Scrolling back to the bottom resumes live mode and drains the
//! backlog in staggered batches (see [`crate::core::drain`]).
//!
//! Scroll position alone cannot tell "the user scrolled up" apart from
//! "our own animation moved the viewport": the `sys` flag swallows exactly
//! one classification after each programmatic scroll, and the `user_input`
//! counter is only bumped by deliberate gestures (wheel-up, direct
//! manipulation).  A scroll event is trusted as user intent only when both
//! guards agree.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use super::animator::{AnimStep, Animation};
use super::drain::{self, MessageSink, PauseBuffer, PendingTask};

/// Geometry abstraction over the scrollable feed pane.  Units are terminal
/// rows.  Implemented by the UI's viewport state and by test fakes.
pub trait Viewport {
    /// First visible content row.
    fn scroll_top(&self) -> usize;
    /// Total content height in rows.
    fn content_height(&self) -> usize;
    /// Visible pane height in rows.
    fn viewport_height(&self) -> usize;
    /// Move the viewport.  Implementations clamp to the usable range.
    fn set_scroll_top(&mut self, top: usize);

    /// Largest valid `scroll_top` (bottom of the feed).
    fn max_scroll_top(&self) -> usize {
        self.content_height().saturating_sub(self.viewport_height())
    }
}

/// A post-layout snapshot of the viewport, taken after a render pass so the
/// numbers are trustworthy.  Completes the two-phase measurement protocol:
/// [`ChatScroller::on_scroll`] requests one, the host supplies it via
/// [`ChatScroller::apply_measurement`] once layout has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub scroll_top: usize,
    pub content_height: usize,
    pub viewport_height: usize,
}

/// Current scroll policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// Viewport not wired yet — every operation is a no-op.
    Initializing,
    /// Pinned to the bottom; new messages auto-scroll into view.
    Live,
    /// User is reading older content; auto-scroll suspended.
    Paused,
}

/// Published to subscribers on state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollNotice {
    /// Policy changed (live ↔ paused, or wiring completed).
    Mode(ScrollMode),
    /// Position changed relative to the bottom.  This reflects position,
    /// not policy — it is reported even while paused.
    Live(bool),
}

/// Is the viewport at the bottom?  One row of tolerance absorbs rounding
/// from wrapped-line recounts; a negative usable range (content shorter
/// than the pane) clamps to zero, which always counts as bottom.
pub(crate) fn at_bottom(m: &Measurement) -> bool {
    let usable = m.content_height.saturating_sub(m.viewport_height);
    m.scroll_top + 1 >= usable
}

/// One scroller per feed view.  All operations take `&mut self`; the value
/// is owned by the event-loop task, so no synchronization is needed —
/// ordering between ticks is enforced by the `sys` / `init` guards.
pub struct ChatScroller {
    /// Auto-scroll suspended by a deliberate user scroll.
    pub(crate) paused: bool,
    /// Guard set while a drain is being scheduled, so scroll events caused
    /// by the drain's own scroll-to-bottom are not reclassified as pause
    /// triggers.  Cleared on the tick after the drain is issued.
    pub(crate) init: bool,
    /// The next scroll classification was caused by us, not the user.
    /// Starts true: the initial layout scroll must not be classified.
    pub(crate) sys: bool,
    /// Position flag: viewport is at the bottom.
    pub(crate) live: bool,
    /// Deliberate upward gestures since the last classification.
    pub(crate) user_input: u32,
    /// Last measured geometry.  `None` until the first render wires us up.
    pub(crate) geometry: Option<Measurement>,
    /// A scroll event happened; classify on the next measurement.
    pub(crate) measure_pending: bool,
    /// In-flight scroll-to-bottom animation, if any.
    pub(crate) animation: Option<Animation>,
    /// Scheduled work: drain batches, deferred scrolls, guard clears.
    pub(crate) pending: Vec<PendingTask>,
    /// Configured smooth-scroll duration.
    pub(crate) duration: Duration,
    subscribers: Vec<mpsc::UnboundedSender<ScrollNotice>>,
}

impl ChatScroller {
    pub fn new(duration: Duration) -> Self {
        Self {
            paused: false,
            init: false,
            sys: true,
            live: false,
            user_input: 0,
            geometry: None,
            measure_pending: false,
            animation: None,
            pending: Vec::new(),
            duration,
            subscribers: Vec::new(),
        }
    }

    // ── observable state ────────────────────────────────────────

    pub fn mode(&self) -> ScrollMode {
        if self.geometry.is_none() {
            ScrollMode::Initializing
        } else if self.paused {
            ScrollMode::Paused
        } else {
            ScrollMode::Live
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Position flag: at the bottom of the feed (independent of `paused`).
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Register an observer.  Transitions are published as they happen;
    /// receivers that have been dropped are pruned on the next publish.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ScrollNotice> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, notice: ScrollNotice) {
        self.subscribers.retain(|tx| tx.send(notice).is_ok());
    }

    // ── event handlers ──────────────────────────────────────────

    /// The viewport's scroll position changed (user or system).  Records
    /// that a classification is due; the host completes it with
    /// [`apply_measurement`](Self::apply_measurement) after the next render.
    pub fn on_scroll(&mut self) {
        self.measure_pending = true;
    }

    /// Wheel input.  Upward intent (`delta_y < 0`) is the signal that the
    /// user wants to leave the bottom; downward wheel is not intent.
    pub fn on_wheel(&mut self, delta_y: i32) {
        if delta_y < 0 {
            self.user_input += 1;
        }
    }

    /// Direct manipulation of the viewport (keyboard paging, scrollbar
    /// drag).  Counts as intent regardless of direction.
    pub fn notify_user_active(&mut self) {
        self.user_input += 1;
    }

    /// Feed in post-layout geometry.  Called by the host after every draw:
    /// the first call completes wiring, later calls keep the stored
    /// geometry fresh, and any pending scroll classification runs against
    /// the settled numbers.
    pub fn apply_measurement(
        &mut self,
        now: Instant,
        m: Measurement,
        buf: &mut impl PauseBuffer,
    ) {
        let first = self.geometry.is_none();
        self.geometry = Some(m);
        if first {
            tracing::debug!(?m, "viewport wired");
            self.publish(ScrollNotice::Mode(self.mode()));
        }
        if self.measure_pending {
            self.measure_pending = false;
            self.classify(now, m, buf);
        }
    }

    /// Classify one scroll event against settled geometry.
    fn classify(&mut self, now: Instant, m: Measurement, buf: &mut impl PauseBuffer) {
        let live = at_bottom(&m);
        self.set_live(live);

        if self.init {
            return;
        }
        if self.sys {
            self.sys = false;
            return;
        }
        if self.user_input > 0 {
            self.user_input = 0;
            self.pause();
        } else if live {
            self.unpause(now, buf);
        }
    }

    fn set_live(&mut self, live: bool) {
        if self.live != live {
            self.live = live;
            self.publish(ScrollNotice::Live(live));
        }
    }

    // ── commands ────────────────────────────────────────────────

    /// Suspend auto-scroll.  New messages are buffered until
    /// [`unpause`](Self::unpause).
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            tracing::debug!("auto-scroll paused");
            self.publish(ScrollNotice::Mode(self.mode()));
        }
    }

    /// Resume live mode and schedule a staggered drain of the backlog.
    pub fn unpause(&mut self, now: Instant, buf: &mut impl PauseBuffer) {
        if self.paused {
            self.paused = false;
            tracing::debug!(backlog = buf.backlog(), "resuming live scroll");
            self.publish(ScrollNotice::Mode(self.mode()));
        }
        drain::schedule_drain(self, now, buf);
    }

    /// Scroll to the bottom of the feed.  No-op until the viewport is
    /// wired, and never fights a deliberate pause.  A zero (or sub-frame)
    /// duration scrolls instantaneously; otherwise an animation is started
    /// whose start row is captured after the next render settles.
    pub fn scroll_to_live(&mut self, duration: Duration, viewport: &mut impl Viewport) {
        if self.geometry.is_none() || self.paused {
            return;
        }
        self.cancel_animation();
        self.sys = true;
        if duration < Duration::from_millis(1) {
            viewport.set_scroll_top(viewport.max_scroll_top());
            self.on_scroll();
            return;
        }
        self.animation = Some(Animation::new(duration));
    }

    /// Request a scroll to the bottom at the configured duration, deferred
    /// until after the next render has applied any freshly appended
    /// messages (so the target height is up to date).
    pub fn request_live_scroll(&mut self) {
        if self.paused {
            return;
        }
        self.pending.push(PendingTask::ScrollLive {
            duration: self.duration,
        });
    }

    /// Cancel any in-flight animation.  Idempotent; safe with none active.
    /// The animation performs no further mutation once canceled.
    pub fn cancel_animation(&mut self) {
        if let Some(anim) = self.animation.as_mut() {
            anim.cancel();
        }
    }

    /// Advance time-driven work: release due drain batches, run deferred
    /// scrolls, clear guards, and step the animation.  Called once per
    /// event-loop iteration, after the draw.
    pub fn tick(&mut self, now: Instant, viewport: &mut impl Viewport, sink: &mut impl MessageSink) {
        drain::run_due_tasks(self, now, viewport, sink);

        if let Some(mut anim) = self.animation.take() {
            if anim.is_canceled() || self.paused {
                return;
            }
            match anim.step(now, viewport) {
                AnimStep::Started => self.animation = Some(anim),
                AnimStep::Moved => {
                    self.on_scroll();
                    self.animation = Some(anim);
                }
                AnimStep::Finished => self.on_scroll(),
            }
        }
    }
}
