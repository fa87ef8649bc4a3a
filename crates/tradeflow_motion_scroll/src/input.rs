// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wheel and touch classification.
//!
//! Wheel deltas are summed into a single accumulator. When its magnitude
//! exceeds the threshold the accumulator is cleared and its sign becomes a
//! [`ScrollIntent`]. Emission is throttled; accumulation is not, so a
//! burst of small deltas still adds up. While native scrolling is live
//! only upward deltas count. Touch moves are classified directly once
//! they leave a small dead zone, measured from touch-down or from the
//! last classified move.

use crate::config::SequenceConfig;
use crate::state::ScrollIntent;

/// What the host should do with the native event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    /// Suppress native scrolling
    Captured,
    /// Let the page scroll normally
    PassThrough,
}

impl InputDisposition {
    /// Whether the host must prevent the default action
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::Captured)
    }
}

/// Event listener kinds registered while the controller is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Mouse wheel and trackpad
    Wheel,
    /// Touch start and move
    Touch,
    /// Viewport resize
    Resize,
}

impl Listener {
    /// Every listener a mounted controller registers
    pub const ALL: [Listener; 3] = [Listener::Wheel, Listener::Touch, Listener::Resize];
}

#[derive(Debug, Clone, Copy)]
struct TouchAnchor {
    y: f32,
    since: f64,
}

/// Accumulates raw input into classified intents
#[derive(Debug, Clone)]
pub struct InputGate {
    threshold: f32,
    wheel_throttle: f64,
    touch_dead_zone_px: f32,
    touch_dead_zone_secs: f64,
    accumulator: f32,
    last_wheel_intent: Option<f64>,
    touch: Option<TouchAnchor>,
}

impl InputGate {
    /// Create a gate from the sequence tunables. Reduced motion drops the
    /// throttle windows.
    pub fn new(config: &SequenceConfig) -> Self {
        let (wheel_throttle, touch_dead_zone_secs) = if config.reduced_motion {
            (0.0, 0.0)
        } else {
            (
                f64::from(config.wheel_throttle_secs),
                f64::from(config.touch_dead_zone_secs),
            )
        };
        Self {
            threshold: config.intent_threshold,
            wheel_throttle,
            touch_dead_zone_px: config.touch_dead_zone_px,
            touch_dead_zone_secs,
            accumulator: 0.0,
            last_wheel_intent: None,
            touch: None,
        }
    }

    /// Current accumulated wheel delta
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Feed a wheel delta observed at clock time `now`
    pub fn wheel(&mut self, delta_y: f32, now: f64) -> Option<ScrollIntent> {
        if !delta_y.is_finite() {
            return None;
        }
        self.accumulator += delta_y;
        if self.accumulator.abs() <= self.threshold {
            return None;
        }
        if let Some(last) = self.last_wheel_intent {
            if now - last < self.wheel_throttle {
                return None;
            }
        }
        let intent = ScrollIntent::from_delta(self.accumulator);
        self.accumulator = 0.0;
        self.last_wheel_intent = Some(now);
        tracing::trace!(intent = ?intent, "wheel intent classified");
        intent
    }

    /// Feed a wheel delta while the page scrolls natively. Scrolling down
    /// clears the accumulator, so only a fresh upward gesture can emit.
    pub fn wheel_unlocked(&mut self, delta_y: f32, now: f64) -> Option<ScrollIntent> {
        if delta_y >= 0.0 {
            self.accumulator = 0.0;
            return None;
        }
        self.accumulator = self.accumulator.min(0.0);
        self.wheel(delta_y, now)
    }

    /// A finger touched the screen at `client_y` at clock time `now`
    pub fn touch_start(&mut self, client_y: f32, now: f64) {
        self.touch = Some(TouchAnchor {
            y: client_y,
            since: now,
        });
    }

    /// The finger moved to `client_y` at clock time `now`
    pub fn touch_move(&mut self, client_y: f32, now: f64) -> Option<ScrollIntent> {
        let anchor = self.touch?;
        // Dragging the finger up scrolls the page down.
        let delta = anchor.y - client_y;
        if delta.abs() <= self.touch_dead_zone_px || now - anchor.since < self.touch_dead_zone_secs
        {
            return None;
        }
        self.touch = Some(TouchAnchor {
            y: client_y,
            since: now,
        });
        let intent = ScrollIntent::from_delta(delta);
        tracing::trace!(intent = ?intent, "touch intent classified");
        intent
    }

    /// The finger left the screen
    pub fn touch_end(&mut self) {
        self.touch = None;
    }

    /// Forget all partial input
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.touch = None;
        self.last_wheel_intent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> InputGate {
        InputGate::new(&SequenceConfig::default())
    }

    #[test]
    fn test_small_deltas_accumulate() {
        let mut gate = gate();
        assert_eq!(gate.wheel(50.0, 0.0), None);
        assert_eq!(gate.accumulated(), 50.0);
        assert_eq!(gate.wheel(40.0, 0.0), Some(ScrollIntent::Down));
        assert_eq!(gate.accumulated(), 0.0);
    }

    #[test]
    fn test_exact_threshold_does_not_emit() {
        let mut gate = gate();
        assert_eq!(gate.wheel(80.0, 0.0), None);
        assert_eq!(gate.wheel(-200.0, 0.0), Some(ScrollIntent::Up));
    }

    #[test]
    fn test_opposite_deltas_cancel() {
        let mut gate = gate();
        assert_eq!(gate.wheel(60.0, 0.0), None);
        assert_eq!(gate.wheel(-60.0, 0.0), None);
        assert_eq!(gate.accumulated(), 0.0);
    }

    #[test]
    fn test_throttle_holds_emission() {
        let mut gate = gate();
        assert_eq!(gate.wheel(100.0, 0.0), Some(ScrollIntent::Down));
        assert_eq!(gate.wheel(100.0, 0.02), None);
        assert_eq!(gate.accumulated(), 100.0);
        assert_eq!(gate.wheel(1.0, 0.06), Some(ScrollIntent::Down));
        assert_eq!(gate.accumulated(), 0.0);
    }

    #[test]
    fn test_reduced_motion_disables_throttle() {
        let config = SequenceConfig {
            reduced_motion: true,
            ..SequenceConfig::default()
        };
        let mut gate = InputGate::new(&config);
        assert_eq!(gate.wheel(100.0, 0.0), Some(ScrollIntent::Down));
        assert_eq!(gate.wheel(100.0, 0.0), Some(ScrollIntent::Down));
    }

    #[test]
    fn test_touch_dead_zone() {
        let mut gate = gate();
        assert_eq!(gate.touch_move(100.0, 0.0), None);

        gate.touch_start(400.0, 0.0);
        assert_eq!(gate.touch_move(380.0, 0.05), None);
        // Far enough, but too soon after touch-down.
        assert_eq!(gate.touch_move(360.0, 0.08), None);
        assert_eq!(gate.touch_move(360.0, 0.12), Some(ScrollIntent::Down));

        // Re-anchored at 360; a quick reversal inside 100ms is held back.
        assert_eq!(gate.touch_move(400.0, 0.15), None);
        assert_eq!(gate.touch_move(400.0, 0.25), Some(ScrollIntent::Up));

        gate.touch_end();
        assert_eq!(gate.touch_move(0.0, 1.0), None);
    }

    #[test]
    fn test_touch_start_resets_dead_zone_clock() {
        let mut gate = gate();
        gate.touch_start(400.0, 0.0);
        assert_eq!(gate.touch_move(300.0, 0.2), Some(ScrollIntent::Down));
        gate.touch_end();

        gate.touch_start(400.0, 1.0);
        assert_eq!(gate.touch_move(331.0, 1.05), None);
        assert_eq!(gate.touch_move(331.0, 1.15), Some(ScrollIntent::Down));
    }

    #[test]
    fn test_unlocked_wheel_counts_upward_only() {
        let mut gate = gate();
        assert_eq!(gate.wheel_unlocked(70.0, 0.0), None);
        assert_eq!(gate.accumulated(), 0.0);

        // Leftover downward travel from the locked phase is discarded.
        assert_eq!(gate.wheel(70.0, 0.0), None);
        assert_eq!(gate.wheel_unlocked(-50.0, 1.0), None);
        assert_eq!(gate.accumulated(), -50.0);
        assert_eq!(gate.wheel_unlocked(-40.0, 1.0), Some(ScrollIntent::Up));

        assert_eq!(gate.wheel_unlocked(-60.0, 2.0), None);
        assert_eq!(gate.wheel_unlocked(10.0, 2.0), None);
        assert_eq!(gate.accumulated(), 0.0);
        assert_eq!(gate.wheel_unlocked(f32::NAN, 2.0), None);
        assert_eq!(gate.accumulated(), 0.0);
    }

    #[test]
    fn test_non_finite_delta_ignored() {
        let mut gate = gate();
        assert_eq!(gate.wheel(f32::NAN, 0.0), None);
        assert_eq!(gate.wheel(f32::INFINITY, 0.0), None);
        assert_eq!(gate.accumulated(), 0.0);
    }
}
