//! Staggered release of the pause-buffer backlog.
//!
//! Dumping a large backlog into the feed in one step stalls the render
//! loop; instead the backlog is split into small batches released on a
//! growing delay, so the feed visibly "catches up" instead of freezing.
//! Batches are removed from the shared buffer eagerly at schedule time —
//! re-entrant pause/unpause cycling can never duplicate or lose a message
//! because each scheduled batch owns a disjoint slice.

use std::time::{Duration, Instant};

use super::scroller::{ChatScroller, Viewport};
use super::transcript::Message;

/// Messages released per batch.
pub(crate) const DRAIN_BATCH: usize = 5;

/// Delay growth per scheduled batch.  Unbounded across a drain: a very
/// large backlog produces a proportionally long total drain.
pub(crate) const DRAIN_DELAY_STEP: Duration = Duration::from_millis(50);

/// Backlog side of the message store: ordered items received while
/// paused, removed in batches.
pub trait PauseBuffer {
    /// Remove and return up to `max` items from the front.
    fn take_batch(&mut self, max: usize) -> Vec<Message>;
    /// Items currently waiting.
    fn backlog(&self) -> usize;
}

/// Live side of the message store: where drained batches land.
pub trait MessageSink {
    fn append(&mut self, msg: Message);
}

/// Work scheduled against the event-loop tick.
#[derive(Debug)]
pub(crate) enum PendingTask {
    /// Append these messages to the live feed once due, then pin to the
    /// bottom on the following tick.
    ReleaseBatch { due: Instant, items: Vec<Message> },
    /// Scroll to the bottom on the next tick (after the render has applied
    /// any freshly appended messages, so the target height is current).
    ScrollLive { duration: Duration },
    /// Clear the drain's `init` guard on the next tick.
    ClearInitGuard,
}

/// Split the backlog into batches and schedule their release.  Also used
/// for the empty backlog: a no-op drain that still sets and later clears
/// the guard.
pub(crate) fn schedule_drain(s: &mut ChatScroller, now: Instant, buf: &mut impl PauseBuffer) {
    s.init = true;

    let mut delay = Duration::ZERO;
    while buf.backlog() > 0 {
        let items = buf.take_batch(DRAIN_BATCH);
        if items.is_empty() {
            break;
        }
        delay += DRAIN_DELAY_STEP;
        s.pending.push(PendingTask::ReleaseBatch {
            due: now + delay,
            items,
        });
    }

    s.pending.push(PendingTask::ClearInitGuard);
}

/// Run every scheduled task that is due.  Tasks scheduled while running
/// (the pin-to-bottom follow-up of a released batch) land on the next
/// tick, never the current one.
pub(crate) fn run_due_tasks(
    s: &mut ChatScroller,
    now: Instant,
    viewport: &mut impl Viewport,
    sink: &mut impl MessageSink,
) {
    if s.pending.is_empty() {
        return;
    }

    let tasks = std::mem::take(&mut s.pending);
    let mut later = Vec::new();
    for task in tasks {
        match task {
            PendingTask::ReleaseBatch { due, items } if due <= now => {
                tracing::debug!(count = items.len(), "releasing drained batch");
                for msg in items {
                    sink.append(msg);
                }
                s.pending.push(PendingTask::ScrollLive {
                    duration: Duration::ZERO,
                });
            }
            PendingTask::ScrollLive { duration } => {
                s.scroll_to_live(duration, viewport);
            }
            PendingTask::ClearInitGuard => {
                s.init = false;
            }
            not_due => later.push(not_due),
        }
    }
    later.append(&mut s.pending);
    s.pending = later;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scroller::ScrollMode;
    use crate::core::testutil::FakeViewport;
    use crate::core::transcript::Transcript;

    fn wired(content: usize, view: usize) -> (ChatScroller, FakeViewport, Transcript) {
        let mut s = ChatScroller::new(Duration::from_millis(300));
        let mut vp = FakeViewport::new(content, view);
        let mut tr = Transcript::new(100);
        s.apply_measurement(Instant::now(), vp.measurement(), &mut tr);
        (s, vp, tr)
    }

    fn buffer_messages(tr: &mut Transcript, n: usize) {
        for i in 0..n {
            tr.add(Message::new("a", format!("m{i}")), false);
        }
    }

    fn scheduled_batches(s: &ChatScroller) -> Vec<(Instant, usize)> {
        s.pending
            .iter()
            .filter_map(|t| match t {
                PendingTask::ReleaseBatch { due, items } => Some((*due, items.len())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn twelve_items_make_three_batches_with_increasing_delays() {
        let (mut s, _vp, mut tr) = wired(200, 50);
        buffer_messages(&mut tr, 12);
        s.pause();
        let t0 = Instant::now();
        s.unpause(t0, &mut tr);

        let batches = scheduled_batches(&s);
        assert_eq!(
            batches.iter().map(|&(_, n)| n).collect::<Vec<_>>(),
            vec![5, 5, 2]
        );
        assert!(batches.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(batches[0].0, t0 + Duration::from_millis(50));
        assert_eq!(batches[2].0, t0 + Duration::from_millis(150));
        // Removal is eager: the shared buffer is already empty.
        assert_eq!(tr.backlog(), 0);
    }

    #[test]
    fn empty_unpause_is_a_safe_noop_drain() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        s.pause();
        let t0 = Instant::now();
        s.unpause(t0, &mut tr);
        assert_eq!(s.mode(), ScrollMode::Live);
        assert!(scheduled_batches(&s).is_empty());
        assert!(s.init);
        s.tick(t0, &mut vp, &mut tr);
        assert!(!s.init);
    }

    #[test]
    fn due_batches_append_then_pin_to_bottom() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        buffer_messages(&mut tr, 3);
        s.pause();
        let t0 = Instant::now();
        s.unpause(t0, &mut tr);

        s.tick(t0, &mut vp, &mut tr);
        assert_eq!(tr.len(), 0); // first batch not due for another 50ms

        s.tick(t0 + Duration::from_millis(60), &mut vp, &mut tr);
        assert_eq!(tr.len(), 3);
        assert_eq!(vp.top, 0); // pin is deferred until after the render

        s.tick(t0 + Duration::from_millis(61), &mut vp, &mut tr);
        assert_eq!(vp.top, vp.max_top());
    }

    #[test]
    fn batches_preserve_arrival_order() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        buffer_messages(&mut tr, 7);
        s.pause();
        let t0 = Instant::now();
        s.unpause(t0, &mut tr);
        s.tick(t0 + Duration::from_millis(200), &mut vp, &mut tr);
        let bodies: Vec<_> = tr.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["m0", "m1", "m2", "m3", "m4", "m5", "m6"]);
    }

    #[test]
    fn reentrant_unpause_neither_duplicates_nor_drops() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        buffer_messages(&mut tr, 7);
        s.pause();
        let t0 = Instant::now();
        s.unpause(t0, &mut tr);

        // Pause again before the first batch fires; three more arrive.
        s.pause();
        buffer_messages(&mut tr, 3);
        s.unpause(t0 + Duration::from_millis(10), &mut tr);

        // Earlier batches continue independently; slices are disjoint.
        for ms in [50u64, 100, 150, 200, 250] {
            s.tick(t0 + Duration::from_millis(ms), &mut vp, &mut tr);
        }
        assert_eq!(tr.len(), 10);
        assert_eq!(tr.backlog(), 0);
    }

    #[test]
    fn batches_fire_even_if_paused_again_but_do_not_scroll() {
        let (mut s, mut vp, mut tr) = wired(200, 50);
        buffer_messages(&mut tr, 2);
        s.pause();
        let t0 = Instant::now();
        s.unpause(t0, &mut tr);
        s.pause();

        s.tick(t0 + Duration::from_millis(60), &mut vp, &mut tr);
        assert_eq!(tr.len(), 2); // the scheduled slice still lands
        s.tick(t0 + Duration::from_millis(61), &mut vp, &mut tr);
        assert_eq!(vp.top, 0); // but the pin respects the new pause
    }
}
