// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fade/scale/blur transitions on a single surface.
//!
//! A [`TransitionLayer`] owns at most one timeline at a time. Every
//! operation kills whatever the layer was playing before it starts, so
//! calls may be repeated freely without tearing.

use crate::clock::{Completion, FrameClock};
use crate::style::{Direction, StyleSpec, TransitionStyle};
use crate::surface::Surface;
use crate::timeline::{Timeline, TimelineId, Tween};
use std::cell::Cell;

/// One visual hand-off between two containers
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    /// Outgoing container
    pub from: Option<Surface>,
    /// Incoming container
    pub to: Option<Surface>,
    /// Which way the page is moving
    pub direction: Direction,
}

impl TransitionRequest {
    /// Create a request
    pub fn new(from: Option<Surface>, to: Option<Surface>, direction: Direction) -> Self {
        Self {
            from,
            to,
            direction,
        }
    }

    /// Layer over the outgoing container, facing this request's direction
    pub fn layer(&self, clock: FrameClock, style: TransitionStyle) -> TransitionLayer {
        TransitionLayer::new(self.from.clone(), clock, style).with_direction(self.direction)
    }
}

/// Transition primitive wrapping one surface
#[derive(Debug)]
pub struct TransitionLayer {
    surface: Option<Surface>,
    clock: FrameClock,
    spec: StyleSpec,
    reduced_motion: bool,
    direction: Direction,
    overlap: f32,
    active: Cell<Option<TimelineId>>,
}

impl TransitionLayer {
    /// Fraction of the total duration after which the incoming surface
    /// starts during a cross-fade
    pub const DEFAULT_OVERLAP: f32 = 0.3;

    /// Create a layer. A `None` surface turns every operation into a no-op.
    pub fn new(surface: Option<Surface>, clock: FrameClock, style: TransitionStyle) -> Self {
        Self {
            surface,
            clock,
            spec: style.spec(),
            reduced_motion: false,
            direction: Direction::Forward,
            overlap: Self::DEFAULT_OVERLAP,
            active: Cell::new(None),
        }
    }

    /// Replace the style with the opacity-only fallback when `reduced` is set
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Override the style's total duration
    pub fn with_duration(mut self, secs: f32) -> Self {
        self.spec = self.spec.with_duration(secs);
        self
    }

    /// Set the cross-fade start offset as a fraction of the total duration
    pub fn with_overlap(mut self, fraction: f32) -> Self {
        self.overlap = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the direction used to orient directional styles
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Wrapped surface
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Effective timing and property table
    pub fn spec(&self) -> StyleSpec {
        if self.reduced_motion {
            StyleSpec::reduced_motion()
        } else {
            self.spec
        }
    }

    /// Whether a timeline started by this layer is still playing
    pub fn is_transitioning(&self) -> bool {
        self.active
            .get()
            .is_some_and(|id| self.clock.is_playing(id))
    }

    /// Stop the running timeline, leaving properties where they are
    pub fn kill(&self) -> bool {
        match self.active.take() {
            Some(id) => self.clock.kill(id),
            None => false,
        }
    }

    /// Animate the surface to its hidden properties over half the duration
    pub fn transition_out(&self) -> Completion {
        self.kill();
        let Some(surface) = &self.surface else {
            return Completion::ready();
        };
        let spec = self.spec();
        let timeline = Timeline::new(format!("{}:out", surface.name())).with_tween(
            Tween::new(surface.clone(), spec.exit_props(self.direction), spec.half())
                .with_ease(spec.ease_out),
        );
        self.start(timeline)
    }

    /// Snap to the hidden properties, then animate in over half the duration
    pub fn transition_in(&self) -> Completion {
        self.kill();
        let Some(surface) = &self.surface else {
            return Completion::ready();
        };
        let spec = self.spec();
        surface.apply(&spec.entry_props(self.direction));
        let timeline = Timeline::new(format!("{}:in", surface.name())).with_tween(
            Tween::new(surface.clone(), spec.in_props, spec.half()).with_ease(spec.ease_in),
        );
        self.start(timeline)
    }

    /// Fade this surface out while `target` fades in, offset by the overlap.
    /// Resolves immediately, without touching either surface, when one of
    /// them is missing.
    pub fn crossfade_to(&self, target: Option<&Surface>) -> Completion {
        self.kill();
        let (Some(surface), Some(target)) = (&self.surface, target) else {
            tracing::debug!("crossfade skipped: container missing");
            return Completion::ready();
        };
        if surface.same_region(target) {
            tracing::debug!(surface = surface.name(), "crossfade skipped: same container");
            return Completion::ready();
        }
        let spec = self.spec();
        target.apply(&spec.entry_props(self.direction));
        let timeline = Timeline::new(format!("{}->{}", surface.name(), target.name()))
            .with_tween(
                Tween::new(surface.clone(), spec.exit_props(self.direction), spec.half())
                    .with_ease(spec.ease_out),
            )
            .with_tween(
                Tween::new(target.clone(), spec.in_props, spec.half())
                    .starting_at(spec.duration * self.overlap)
                    .with_ease(spec.ease_in),
            );
        self.start(timeline)
    }

    /// Show or hide the surface immediately
    pub fn set_visible(&self, visible: bool) {
        self.kill();
        if let Some(surface) = &self.surface {
            let spec = self.spec();
            let patch = if visible {
                spec.in_props
            } else {
                spec.exit_props(self.direction)
            };
            surface.apply(&patch);
        }
    }

    fn start(&self, timeline: Timeline) -> Completion {
        let (id, done) = self.clock.play(timeline);
        self.active.set(Some(id));
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::VisualProps;
    use futures::FutureExt;

    fn layer(surface: &Surface, clock: &FrameClock) -> TransitionLayer {
        TransitionLayer::new(Some(surface.clone()), clock.clone(), TransitionStyle::Crossfade)
    }

    #[test]
    fn test_transition_out_reaches_hidden_props() {
        let clock = FrameClock::new();
        let hero = Surface::new("hero");
        let layer = layer(&hero, &clock);

        let mut done = layer.transition_out();
        assert!(layer.is_transitioning());
        clock.advance(0.15);
        assert!((&mut done).now_or_never().is_none());
        clock.advance(0.15);
        assert!(done.now_or_never().is_some());

        let props = hero.props();
        assert_eq!(props.opacity, 0.0);
        assert_eq!(props.scale, 0.98);
        assert_eq!(props.blur_px, 4.0);
        assert!(!layer.is_transitioning());
    }

    #[test]
    fn test_transition_in_snaps_first() {
        let clock = FrameClock::new();
        let hero = Surface::new("hero");
        let layer = layer(&hero, &clock);

        let done = layer.transition_in();
        assert_eq!(hero.props().opacity, 0.0);
        assert_eq!(hero.props().blur_px, 4.0);

        clock.advance(0.3);
        assert!(done.now_or_never().is_some());
        assert_eq!(hero.props(), VisualProps::IDENTITY);
    }

    #[test]
    fn test_slide_in_starts_from_out_props() {
        let clock = FrameClock::new();
        let hero = Surface::new("hero");
        let next = Surface::new("next");
        let layer = TransitionLayer::new(Some(hero.clone()), clock.clone(), TransitionStyle::Slide);
        let out = layer.spec().out_props;

        let _done = layer.transition_in();
        assert_eq!(Some(hero.props().translate_y), out.translate_y);
        assert_eq!(Some(hero.props().opacity), out.opacity);

        let _done = layer.crossfade_to(Some(&next));
        assert_eq!(Some(next.props().translate_y), out.translate_y);

        let reverse = TransitionLayer::new(Some(next.clone()), clock, TransitionStyle::Slide)
            .with_direction(Direction::Reverse);
        let _done = reverse.transition_in();
        assert_eq!(Some(next.props().translate_y), out.mirrored().translate_y);
    }

    #[test]
    fn test_new_operation_kills_previous() {
        let clock = FrameClock::new();
        let hero = Surface::new("hero");
        let layer = layer(&hero, &clock);

        let first = layer.transition_out();
        clock.advance(0.1);
        let mut second = layer.transition_in();

        assert!(first.now_or_never().is_some());
        assert_eq!(clock.active_timelines(), 1);
        clock.advance(0.3);
        assert!((&mut second).now_or_never().is_some());
        assert_eq!(hero.props().opacity, 1.0);
    }

    #[test]
    fn test_crossfade_overlaps_incoming() {
        let clock = FrameClock::new();
        let first = Surface::new("section-1");
        let second = Surface::new("section-2");
        let layer = layer(&first, &clock);

        let mut done = layer.crossfade_to(Some(&second));
        assert_eq!(second.props().opacity, 0.0);

        // Incoming starts at 0.3 * 0.6 = 0.18s.
        clock.advance(0.17);
        assert_eq!(second.props().opacity, 0.0);
        assert!(first.props().opacity < 1.0);

        clock.advance(0.2);
        assert!(second.props().opacity > 0.0);
        assert_eq!(first.props().opacity, 0.0);
        assert!((&mut done).now_or_never().is_none());

        // Total = 0.18 + 0.3 = 0.48s.
        clock.advance(0.12);
        assert!(done.now_or_never().is_some());
        assert_eq!(second.props(), VisualProps::IDENTITY);
    }

    #[test]
    fn test_crossfade_without_target_is_noop() {
        let clock = FrameClock::new();
        let first = Surface::new("section-1");
        let layer = layer(&first, &clock);

        let done = layer.crossfade_to(None);
        assert!(done.is_ready());
        assert_eq!(clock.active_timelines(), 0);
        assert_eq!(first.props(), VisualProps::IDENTITY);

        let detached = TransitionLayer::new(None, clock.clone(), TransitionStyle::Blur);
        assert!(detached.crossfade_to(Some(&first)).is_ready());
        assert!(detached.transition_out().is_ready());

        assert!(layer.crossfade_to(Some(&first.clone())).is_ready());
        assert_eq!(clock.active_timelines(), 0);
    }

    #[test]
    fn test_reduced_motion_overrides_style() {
        let clock = FrameClock::new();
        let hero = Surface::new("hero");
        let layer = layer(&hero, &clock).with_reduced_motion(true).with_duration(2.0);

        assert_eq!(layer.spec(), StyleSpec::reduced_motion());
        let done = layer.transition_out();
        clock.advance(0.075);
        assert!(done.now_or_never().is_some());
        assert_eq!(hero.props().opacity, 0.0);
        assert_eq!(hero.props().scale, 1.0);
        assert_eq!(hero.props().blur_px, 0.0);
    }

    #[test]
    fn test_set_visible_cancels_transition() {
        let clock = FrameClock::new();
        let hero = Surface::new("hero");
        let layer = layer(&hero, &clock);

        let done = layer.transition_out();
        clock.advance(0.1);
        layer.set_visible(true);
        assert!(done.now_or_never().is_some());
        assert_eq!(hero.props(), VisualProps::IDENTITY);

        layer.set_visible(false);
        assert_eq!(hero.props().opacity, 0.0);
        assert!(!layer.is_transitioning());
    }
}
