//! Time-boxed scroll-to-bottom animation.
//!
//! Linear interpolation from a captured start row toward the feed's
//! maximum scroll position.  The target is re-read every step, so a feed
//! that keeps growing mid-animation is chased rather than undershot.  The
//! start row is captured on the first step after the animation is created,
//! which the host runs after a render pass — pending layout has settled by
//! then, so the captured row is trustworthy.

use std::time::{Duration, Instant};

use super::scroller::Viewport;

/// What a single animation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimStep {
    /// Start row captured; no movement yet.
    Started,
    /// Viewport moved; more steps needed.
    Moved,
    /// Reached the target; the caller should re-measure geometry.
    Finished,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Waiting for the first step to capture the start row.
    PendingStart,
    Running { from: f64, started: Instant },
}

/// One in-flight scroll-to-bottom.  At most one exists per viewport; a
/// replacement cancels its predecessor.
#[derive(Debug)]
pub(crate) struct Animation {
    duration: Duration,
    phase: Phase,
    canceled: bool,
}

impl Animation {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            duration,
            phase: Phase::PendingStart,
            canceled: false,
        }
    }

    /// Request cancellation.  Checked at the top of every step: once set,
    /// the animation mutates nothing further.  Idempotent.
    pub(crate) fn cancel(&mut self) {
        self.canceled = true;
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Advance the animation by one frame.
    pub(crate) fn step(&mut self, now: Instant, viewport: &mut impl Viewport) -> AnimStep {
        match self.phase {
            Phase::PendingStart => {
                self.phase = Phase::Running {
                    from: viewport.scroll_top() as f64,
                    started: now,
                };
                AnimStep::Started
            }
            Phase::Running { from, started } => {
                // Zero duration never reaches here via the scroller (it
                // takes the instantaneous path), but guard the division.
                let t = if self.duration.is_zero() {
                    1.0
                } else {
                    (now.duration_since(started).as_secs_f64() / self.duration.as_secs_f64())
                        .min(1.0)
                };
                let target = viewport.max_scroll_top() as f64;
                let top = from + t * (target - from);
                viewport.set_scroll_top(top.max(0.0).floor() as usize);
                if t >= 1.0 {
                    AnimStep::Finished
                } else {
                    AnimStep::Moved
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scroller::ChatScroller;
    use crate::core::testutil::FakeViewport;
    use crate::core::transcript::Transcript;

    fn wired(content: usize, view: usize) -> (ChatScroller, FakeViewport, Transcript) {
        let mut s = ChatScroller::new(Duration::from_millis(300));
        let mut vp = FakeViewport::new(content, view);
        let mut tr = Transcript::new(100);
        s.apply_measurement(Instant::now(), vp.measurement(), &mut tr);
        (s, vp, tr)
    }

    #[test]
    fn interpolates_linearly_to_the_bottom() {
        let (mut s, mut vp, mut tr) = wired(200, 50); // max 150
        s.scroll_to_live(Duration::from_millis(500), &mut vp);
        let t0 = Instant::now();
        s.tick(t0, &mut vp, &mut tr);
        assert_eq!(vp.top, 0); // capture step does not move

        s.tick(t0 + Duration::from_millis(250), &mut vp, &mut tr);
        assert_eq!(vp.top, 75);

        s.tick(t0 + Duration::from_millis(600), &mut vp, &mut tr);
        assert_eq!(vp.top, 150);
        assert!(s.animation.is_none());
    }

    #[test]
    fn cancel_stops_mid_flight() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        s.scroll_to_live(Duration::from_millis(500), &mut vp);
        let t0 = Instant::now();
        s.tick(t0, &mut vp, &mut tr);
        s.tick(t0 + Duration::from_millis(250), &mut vp, &mut tr);
        let mid = vp.top;
        assert!(mid > 0 && mid < 150);

        s.cancel_animation();
        s.tick(t0 + Duration::from_millis(400), &mut vp, &mut tr);
        s.tick(t0 + Duration::from_secs(2), &mut vp, &mut tr);
        assert_eq!(vp.top, mid);
        assert!(s.animation.is_none());
    }

    #[test]
    fn cancel_with_no_animation_is_safe() {
        let (mut s, _vp, _tr) = wired(200, 50);
        s.cancel_animation();
        s.cancel_animation();
    }

    #[test]
    fn growing_content_is_chased() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        s.scroll_to_live(Duration::from_millis(500), &mut vp);
        let t0 = Instant::now();
        s.tick(t0, &mut vp, &mut tr);
        vp.content = 300; // feed grew mid-animation; max is now 250
        s.tick(t0 + Duration::from_millis(600), &mut vp, &mut tr);
        assert_eq!(vp.top, 250);
    }

    #[test]
    fn pausing_drops_the_animation() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        s.scroll_to_live(Duration::from_millis(500), &mut vp);
        let t0 = Instant::now();
        s.tick(t0, &mut vp, &mut tr);
        s.pause();
        s.tick(t0 + Duration::from_millis(250), &mut vp, &mut tr);
        assert_eq!(vp.top, 0);
        assert!(s.animation.is_none());
    }

    #[test]
    fn replacement_cancels_predecessor() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        s.scroll_to_live(Duration::from_millis(500), &mut vp);
        let t0 = Instant::now();
        s.tick(t0, &mut vp, &mut tr);
        // A new scroll request replaces the in-flight animation; only one
        // animation is ever active per viewport.
        s.scroll_to_live(Duration::from_millis(100), &mut vp);
        s.tick(t0 + Duration::from_millis(50), &mut vp, &mut tr);
        s.tick(t0 + Duration::from_millis(200), &mut vp, &mut tr);
        assert_eq!(vp.top, 150);
        assert!(s.animation.is_none());
    }
}
