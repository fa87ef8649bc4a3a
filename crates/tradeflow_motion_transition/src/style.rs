// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named transition styles.

use crate::props::{Ease, VisualPatch};
use serde::{Deserialize, Serialize};

/// Duration of the reduced-motion fallback, in seconds
pub const REDUCED_MOTION_DURATION: f32 = 0.15;

/// Direction of a visual hand-off between sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Moving further down the page
    #[default]
    Forward,
    /// Moving back up the page
    Reverse,
}

impl Direction {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

/// Visual style used by a transition layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransitionStyle {
    /// Opacity, scale and blur
    #[default]
    Crossfade,
    /// Vertical translate and opacity
    Slide,
    /// Opacity and blur
    Blur,
}

impl TransitionStyle {
    /// Get all styles
    pub fn all() -> &'static [TransitionStyle] {
        &[
            TransitionStyle::Crossfade,
            TransitionStyle::Slide,
            TransitionStyle::Blur,
        ]
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crossfade => "crossfade",
            Self::Slide => "slide",
            Self::Blur => "blur",
        }
    }

    /// Timing and property table for this style
    pub fn spec(self) -> StyleSpec {
        match self {
            Self::Crossfade => StyleSpec {
                duration: 0.6,
                ease_out: Ease::Power2In,
                ease_in: Ease::Power2Out,
                out_props: VisualPatch::opacity(0.0).with_scale(0.98).with_blur(4.0),
                in_props: VisualPatch::opacity(1.0).with_scale(1.0).with_blur(0.0),
            },
            Self::Slide => StyleSpec {
                duration: 0.6,
                ease_out: Ease::Power2In,
                ease_in: Ease::Power3Out,
                out_props: VisualPatch::opacity(0.0).with_translate_y(-40.0),
                in_props: VisualPatch::opacity(1.0).with_translate_y(0.0),
            },
            Self::Blur => StyleSpec {
                duration: 0.5,
                ease_out: Ease::Power1InOut,
                ease_in: Ease::Power1InOut,
                out_props: VisualPatch::opacity(0.0).with_blur(8.0),
                in_props: VisualPatch::opacity(1.0).with_blur(0.0),
            },
        }
    }
}

/// Resolved timing and property table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Total duration in seconds. Each half-transition takes half of it.
    pub duration: f32,
    /// Curve for the outgoing half
    pub ease_out: Ease,
    /// Curve for the incoming half
    pub ease_in: Ease,
    /// Properties of a hidden surface
    pub out_props: VisualPatch,
    /// Properties of a shown surface
    pub in_props: VisualPatch,
}

impl StyleSpec {
    /// Fast opacity-only fallback used whenever reduced motion is requested
    pub fn reduced_motion() -> Self {
        Self {
            duration: REDUCED_MOTION_DURATION,
            ease_out: Ease::Linear,
            ease_in: Ease::Linear,
            out_props: VisualPatch::opacity(0.0),
            in_props: VisualPatch::opacity(1.0),
        }
    }

    /// Length of one half-transition
    pub fn half(&self) -> f32 {
        self.duration / 2.0
    }

    /// Override the total duration
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Hidden properties for the surface leaving in `direction`
    pub fn exit_props(&self, direction: Direction) -> VisualPatch {
        match direction {
            Direction::Forward => self.out_props,
            Direction::Reverse => self.out_props.mirrored(),
        }
    }

    /// Hidden properties the surface arriving in `direction` snaps to
    /// before animating in. These are the same out values a leaving
    /// surface ends on.
    pub fn entry_props(&self, direction: Direction) -> VisualPatch {
        self.exit_props(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossfade_table() {
        let spec = TransitionStyle::Crossfade.spec();
        assert_eq!(spec.duration, 0.6);
        assert!((spec.half() - 0.3).abs() < 1e-6);
        assert_eq!(spec.out_props.opacity, Some(0.0));
        assert_eq!(spec.out_props.scale, Some(0.98));
        assert_eq!(spec.out_props.blur_px, Some(4.0));
        assert_eq!(spec.out_props.translate_y, None);
    }

    #[test]
    fn test_reduced_motion_is_opacity_only() {
        let spec = StyleSpec::reduced_motion();
        assert_eq!(spec.duration, REDUCED_MOTION_DURATION);
        assert_eq!(spec.out_props, VisualPatch::opacity(0.0));
        assert_eq!(spec.in_props, VisualPatch::opacity(1.0));
    }

    #[test]
    fn test_slide_mirrors_by_direction() {
        let spec = TransitionStyle::Slide.spec();
        assert_eq!(spec.exit_props(Direction::Forward).translate_y, Some(-40.0));
        assert_eq!(spec.entry_props(Direction::Forward), spec.out_props);
        assert_eq!(spec.exit_props(Direction::Reverse).translate_y, Some(40.0));
        assert_eq!(spec.entry_props(Direction::Reverse), spec.out_props.mirrored());
    }
}
