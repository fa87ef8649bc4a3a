// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tween timelines.

use crate::props::{Ease, Interpolation, VisualPatch, VisualProps};
use crate::surface::Surface;
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slack for accumulated frame deltas when testing for the end
const FINISH_EPSILON: f32 = 1e-5;

/// Unique identifier for a timeline registered on a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single eased property animation on one surface
#[derive(Debug, Clone)]
pub struct Tween {
    /// Animated surface
    pub surface: Surface,
    /// Channels to animate and their end values
    pub target: VisualPatch,
    /// Offset from the timeline start, in seconds
    pub start: f32,
    /// Length in seconds
    pub duration: f32,
    /// Easing curve
    pub ease: Ease,
    /// Values captured when the tween first renders
    from: Option<VisualProps>,
}

impl Tween {
    /// Create a tween starting at the beginning of its timeline
    pub fn new(surface: Surface, target: VisualPatch, duration: f32) -> Self {
        Self {
            surface,
            target,
            start: 0.0,
            duration: duration.max(0.0),
            ease: Ease::default(),
            from: None,
        }
    }

    /// Delay the tween inside its timeline
    pub fn starting_at(mut self, start: f32) -> Self {
        self.start = start.max(0.0);
        self
    }

    /// Set the easing curve
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Timeline time at which this tween finishes
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Render the tween at timeline time `elapsed`
    fn render(&mut self, elapsed: f32) {
        if elapsed < self.start {
            return;
        }
        let from = *self.from.get_or_insert_with(|| self.surface.props());
        let to = self.target.resolve(from);
        let t = self
            .ease
            .apply(Interpolation::progress(elapsed, self.start, self.duration));
        let props = if t >= 1.0 { to } else { from.lerp(&to, t) };
        self.surface.set_props(props);
    }
}

/// A group of tweens played against one clock and completed together
#[derive(Debug)]
pub struct Timeline {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Name used in logs
    pub label: String,
    tweens: Vec<Tween>,
    elapsed: f32,
    done: Option<oneshot::Sender<()>>,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: TimelineId::new(),
            label: label.into(),
            tweens: Vec::new(),
            elapsed: 0.0,
            done: None,
        }
    }

    /// Add a tween
    pub fn with_tween(mut self, tween: Tween) -> Self {
        self.tweens.push(tween);
        self
    }

    /// Tweens in this timeline
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Time at which every tween has finished
    pub fn duration(&self) -> f32 {
        self.tweens.iter().map(Tween::end).fold(0.0, f32::max)
    }

    /// Seconds played so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Attach the completion sender
    pub(crate) fn notify(&mut self, sender: oneshot::Sender<()>) {
        self.done = Some(sender);
    }

    /// Advance by `dt` seconds and render. Returns `true` once finished.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        let duration = self.duration();
        let finished = self.elapsed + FINISH_EPSILON >= duration;
        if finished {
            // Land every tween exactly on its target.
            self.elapsed = self.elapsed.max(duration);
        }
        for tween in &mut self.tweens {
            tween.render(self.elapsed);
        }
        finished
    }

    /// Signal completion to whoever awaits this timeline
    pub(crate) fn finish(mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_covers_offset_tweens() {
        let a = Surface::new("a");
        let b = Surface::new("b");
        let timeline = Timeline::new("crossfade")
            .with_tween(Tween::new(a, VisualPatch::opacity(0.0), 0.3))
            .with_tween(Tween::new(b, VisualPatch::opacity(1.0), 0.3).starting_at(0.18));
        assert!((timeline.duration() - 0.48).abs() < 1e-6);
    }

    #[test]
    fn test_advance_interpolates_from_captured_value() {
        let surface = Surface::new("hero");
        surface.set_props(VisualProps {
            opacity: 0.5,
            ..VisualProps::IDENTITY
        });
        let mut timeline = Timeline::new("fade").with_tween(
            Tween::new(surface.clone(), VisualPatch::opacity(0.0), 1.0).with_ease(Ease::Linear),
        );

        assert!(!timeline.advance(0.5));
        assert!((surface.props().opacity - 0.25).abs() < 1e-6);
        assert_eq!(surface.props().scale, 1.0);

        assert!(timeline.advance(0.5));
        assert_eq!(surface.props().opacity, 0.0);
    }

    #[test]
    fn test_delayed_tween_waits_for_start() {
        let surface = Surface::new("incoming");
        surface.set_props(VisualProps {
            opacity: 0.0,
            ..VisualProps::IDENTITY
        });
        let mut timeline = Timeline::new("in").with_tween(
            Tween::new(surface.clone(), VisualPatch::opacity(1.0), 0.2)
                .starting_at(0.2)
                .with_ease(Ease::Linear),
        );

        timeline.advance(0.1);
        assert_eq!(surface.props().opacity, 0.0);
        timeline.advance(0.2);
        assert!((surface.props().opacity - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_finish_notifies_receiver() {
        let (tx, mut rx) = oneshot::channel();
        let mut timeline = Timeline::new("empty");
        timeline.notify(tx);
        assert!(timeline.advance(0.0));
        timeline.finish();
        assert_eq!(rx.try_recv(), Ok(Some(())));
    }
}
