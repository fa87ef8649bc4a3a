// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-driven frame clock.
//!
//! The host calls [`FrameClock::advance`] once per animation frame. The
//! clock renders every registered timeline, fires expired timers and then
//! resolves the matching [`Completion`] futures.

use crate::timeline::{Timeline, TimelineId};
use futures::channel::oneshot;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Resolves when a timeline finishes, is killed, or a timer expires.
///
/// A killed timeline resolves its completion immediately instead of
/// leaving the awaiting task parked forever.
#[derive(Debug)]
#[must_use = "completions do nothing unless awaited"]
pub struct Completion {
    rx: Option<oneshot::Receiver<()>>,
}

impl Completion {
    /// A completion that is already resolved
    pub fn ready() -> Self {
        Self { rx: None }
    }

    fn pending(rx: oneshot::Receiver<()>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Whether awaiting would return immediately
    pub fn is_ready(&self) -> bool {
        self.rx.is_none()
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(());
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(_) => {
                self.rx = None;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Slack absorbing `f32` frame deltas summed into the `f64` clock.
const DEADLINE_EPSILON: f64 = 1e-6;

struct Timer {
    deadline: f64,
    done: oneshot::Sender<()>,
}

#[derive(Default)]
struct ClockInner {
    now: f64,
    timelines: IndexMap<TimelineId, Timeline>,
    timers: Vec<Timer>,
}

/// Shared animation clock. Clones share the same registry.
#[derive(Clone, Default)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl FrameClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds advanced since creation
    pub fn now(&self) -> f64 {
        self.inner.borrow().now
    }

    /// Register a timeline and start playing it on the next frame
    pub fn play(&self, mut timeline: Timeline) -> (TimelineId, Completion) {
        let (tx, rx) = oneshot::channel();
        timeline.notify(tx);
        let id = timeline.id;
        tracing::trace!(
            label = %timeline.label,
            duration = timeline.duration(),
            "timeline started"
        );
        self.inner.borrow_mut().timelines.insert(id, timeline);
        (id, Completion::pending(rx))
    }

    /// Stop a timeline where it is. Returns `false` if it already finished.
    pub fn kill(&self, id: TimelineId) -> bool {
        let killed = self.inner.borrow_mut().timelines.shift_remove(&id);
        match killed {
            Some(timeline) => {
                tracing::trace!(label = %timeline.label, "timeline killed");
                // Dropping the sender resolves the completion.
                drop(timeline);
                true
            }
            None => false,
        }
    }

    /// Whether the timeline is still registered
    pub fn is_playing(&self, id: TimelineId) -> bool {
        self.inner.borrow().timelines.contains_key(&id)
    }

    /// Number of timelines currently playing
    pub fn active_timelines(&self) -> usize {
        self.inner.borrow().timelines.len()
    }

    /// Resolve after `secs` of clock time. Non-positive delays resolve
    /// immediately.
    pub fn delay(&self, secs: f32) -> Completion {
        if secs <= 0.0 {
            return Completion::ready();
        }
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.borrow_mut();
        let deadline = inner.now + f64::from(secs);
        inner.timers.push(Timer { deadline, done: tx });
        Completion::pending(rx)
    }

    /// Advance by `dt` seconds: render timelines, then fire completions
    pub fn advance(&self, dt: f32) {
        let (finished, expired) = {
            let mut inner = self.inner.borrow_mut();
            inner.now += f64::from(dt.max(0.0));
            let now = inner.now;

            let done_ids: Vec<TimelineId> = inner
                .timelines
                .iter_mut()
                .filter_map(|(id, timeline)| timeline.advance(dt).then_some(*id))
                .collect();
            let finished: Vec<Timeline> = done_ids
                .iter()
                .filter_map(|id| inner.timelines.shift_remove(id))
                .collect();

            inner.timers.retain(|timer| !timer.done.is_canceled());
            let (expired, waiting): (Vec<Timer>, Vec<Timer>) = inner
                .timers
                .drain(..)
                .partition(|timer| timer.deadline <= now + DEADLINE_EPSILON);
            inner.timers = waiting;

            (finished, expired)
        };

        // Completions are sent after the registry borrow is released so
        // woken tasks may start new timelines.
        for timeline in finished {
            tracing::trace!(label = %timeline.label, "timeline finished");
            timeline.finish();
        }
        for timer in expired {
            let _ = timer.done.send(());
        }
    }
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameClock")
            .field("now", &inner.now)
            .field("timelines", &inner.timelines.len())
            .field("timers", &inner.timers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{Ease, VisualPatch};
    use crate::surface::Surface;
    use crate::timeline::Tween;
    use futures::FutureExt;

    fn fade(surface: &Surface, duration: f32) -> Timeline {
        Timeline::new("fade").with_tween(
            Tween::new(surface.clone(), VisualPatch::opacity(0.0), duration)
                .with_ease(Ease::Linear),
        )
    }

    #[test]
    fn test_completion_resolves_after_duration() {
        let clock = FrameClock::new();
        let surface = Surface::new("hero");
        let (id, mut done) = clock.play(fade(&surface, 0.3));

        clock.advance(0.1);
        assert!((&mut done).now_or_never().is_none());
        assert!(clock.is_playing(id));

        clock.advance(0.25);
        assert!((&mut done).now_or_never().is_some());
        assert!(!clock.is_playing(id));
        assert_eq!(surface.props().opacity, 0.0);
    }

    #[test]
    fn test_kill_resolves_and_freezes() {
        let clock = FrameClock::new();
        let surface = Surface::new("hero");
        let (id, done) = clock.play(fade(&surface, 1.0));

        clock.advance(0.5);
        assert!(clock.kill(id));
        assert!(!clock.kill(id));
        assert!(done.now_or_never().is_some());

        let frozen = surface.props().opacity;
        clock.advance(0.5);
        assert_eq!(surface.props().opacity, frozen);
        assert_eq!(clock.active_timelines(), 0);
    }

    #[test]
    fn test_delay_fires_at_deadline() {
        let clock = FrameClock::new();
        let mut wait = clock.delay(0.3);
        assert!(clock.delay(0.0).is_ready());

        clock.advance(0.2);
        assert!((&mut wait).now_or_never().is_none());
        clock.advance(0.1);
        assert!((&mut wait).now_or_never().is_some());
        assert!((clock.now() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_dropped_timers_are_pruned() {
        let clock = FrameClock::new();
        drop(clock.delay(5.0));
        clock.advance(0.016);
        assert_eq!(clock.inner.borrow().timers.len(), 0);
    }
}
