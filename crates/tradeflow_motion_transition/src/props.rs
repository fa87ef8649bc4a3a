// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable surface properties and easing curves.

use serde::{Deserialize, Serialize};

/// Full set of animatable properties on a surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualProps {
    /// Opacity in [0, 1]
    pub opacity: f32,
    /// Uniform scale around the surface center
    pub scale: f32,
    /// Gaussian blur radius in CSS pixels
    pub blur_px: f32,
    /// Vertical offset in CSS pixels (positive moves down)
    pub translate_y: f32,
}

impl VisualProps {
    /// Fully visible, untransformed
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        scale: 1.0,
        blur_px: 0.0,
        translate_y: 0.0,
    };

    /// Interpolate every channel toward `other`
    pub fn lerp(&self, other: &VisualProps, t: f32) -> VisualProps {
        VisualProps {
            opacity: Interpolation::lerp(self.opacity, other.opacity, t),
            scale: Interpolation::lerp(self.scale, other.scale, t),
            blur_px: Interpolation::lerp(self.blur_px, other.blur_px, t),
            translate_y: Interpolation::lerp(self.translate_y, other.translate_y, t),
        }
    }
}

impl Default for VisualProps {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Partial property target. Only `Some` channels are written.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualPatch {
    /// Target opacity
    pub opacity: Option<f32>,
    /// Target scale
    pub scale: Option<f32>,
    /// Target blur radius
    pub blur_px: Option<f32>,
    /// Target vertical offset
    pub translate_y: Option<f32>,
}

impl VisualPatch {
    /// Patch that only touches opacity
    pub const fn opacity(value: f32) -> Self {
        Self {
            opacity: Some(value),
            scale: None,
            blur_px: None,
            translate_y: None,
        }
    }

    /// Set the scale channel
    pub const fn with_scale(mut self, value: f32) -> Self {
        self.scale = Some(value);
        self
    }

    /// Set the blur channel
    pub const fn with_blur(mut self, value: f32) -> Self {
        self.blur_px = Some(value);
        self
    }

    /// Set the vertical translate channel
    pub const fn with_translate_y(mut self, value: f32) -> Self {
        self.translate_y = Some(value);
        self
    }

    /// Overlay this patch on `base`
    pub fn resolve(&self, base: VisualProps) -> VisualProps {
        VisualProps {
            opacity: self.opacity.unwrap_or(base.opacity),
            scale: self.scale.unwrap_or(base.scale),
            blur_px: self.blur_px.unwrap_or(base.blur_px),
            translate_y: self.translate_y.unwrap_or(base.translate_y),
        }
    }

    /// Same patch with the vertical offset negated
    pub fn mirrored(self) -> Self {
        Self {
            translate_y: self.translate_y.map(|y| -y),
            ..self
        }
    }

    /// Whether the patch writes nothing
    pub fn is_empty(&self) -> bool {
        self.opacity.is_none()
            && self.scale.is_none()
            && self.blur_px.is_none()
            && self.translate_y.is_none()
    }
}

/// Easing curve applied to normalized tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ease {
    /// Constant velocity
    Linear,
    /// Quadratic in-out
    Power1InOut,
    /// Cubic ease-in
    Power2In,
    /// Cubic ease-out
    #[default]
    Power2Out,
    /// Cubic in-out
    Power2InOut,
    /// Quartic ease-out
    Power3Out,
}

impl Ease {
    /// Map progress `t` in [0, 1] to eased progress in [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::Power2In => t * t * t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::Power3Out => 1.0 - (1.0 - t).powi(4),
        }
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Normalized progress of `elapsed` inside a window starting at `start`
    /// and lasting `duration`. Zero-length windows jump straight to 1.
    pub fn progress(elapsed: f32, start: f32, duration: f32) -> f32 {
        if duration <= 0.0 {
            return if elapsed >= start { 1.0 } else { 0.0 };
        }
        ((elapsed - start) / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        for ease in [
            Ease::Linear,
            Ease::Power1InOut,
            Ease::Power2In,
            Ease::Power2Out,
            Ease::Power2InOut,
            Ease::Power3Out,
        ] {
            assert_eq!(ease.apply(0.0), 0.0, "{ease:?} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease:?} at 1");
            assert_eq!(ease.apply(-3.0), 0.0);
        }
    }

    #[test]
    fn test_ease_in_is_slower_than_ease_out() {
        assert!(Ease::Power2In.apply(0.3) < Ease::Linear.apply(0.3));
        assert!(Ease::Power2Out.apply(0.3) > Ease::Linear.apply(0.3));
    }

    #[test]
    fn test_patch_resolve_keeps_untouched_channels() {
        let base = VisualProps {
            opacity: 0.5,
            scale: 1.2,
            blur_px: 1.0,
            translate_y: 10.0,
        };
        let resolved = VisualPatch::opacity(0.0).with_blur(4.0).resolve(base);
        assert_eq!(resolved.opacity, 0.0);
        assert_eq!(resolved.blur_px, 4.0);
        assert_eq!(resolved.scale, 1.2);
        assert_eq!(resolved.translate_y, 10.0);
    }

    #[test]
    fn test_mirrored_only_flips_translate() {
        let patch = VisualPatch::opacity(0.0).with_translate_y(-40.0).with_scale(0.98);
        let mirrored = patch.mirrored();
        assert_eq!(mirrored.translate_y, Some(40.0));
        assert_eq!(mirrored.scale, Some(0.98));
        assert!(VisualPatch::default().is_empty());
    }

    #[test]
    fn test_progress_zero_duration() {
        assert_eq!(Interpolation::progress(0.0, 0.0, 0.0), 1.0);
        assert_eq!(Interpolation::progress(0.1, 0.2, 0.0), 0.0);
        assert_eq!(Interpolation::progress(0.15, 0.1, 0.1), 0.5);
    }
}
