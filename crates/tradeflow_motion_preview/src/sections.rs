// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mock hero sections painted from their surfaces.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::rc::Rc;
use tradeflow_motion_scroll::SectionHandle;
use tradeflow_motion_transition::{FrameClock, Surface, TransitionLayer, TransitionStyle, VisualProps};

/// Length of a section's own headline animation, in seconds
const HEADLINE_DURATION: f32 = 1.2;

/// A full-bleed hero panel with an animated headline
pub struct HeroSection {
    title: &'static str,
    tagline: &'static str,
    accent: egui::Color32,
    container: Surface,
    headline: TransitionLayer,
    reveals: bool,
}

impl HeroSection {
    /// Create a section. A revealing section starts with its headline
    /// hidden and slides it in when played forward; otherwise forward
    /// playback slides the headline away.
    pub fn new(
        title: &'static str,
        tagline: &'static str,
        accent: egui::Color32,
        reveals: bool,
        clock: &FrameClock,
        reduced_motion: bool,
    ) -> Rc<Self> {
        let headline = TransitionLayer::new(
            Some(Surface::new(format!("{title}:headline"))),
            clock.clone(),
            TransitionStyle::Slide,
        )
        .with_duration(HEADLINE_DURATION)
        .with_reduced_motion(reduced_motion);
        headline.set_visible(!reveals);

        Rc::new(Self {
            title,
            tagline,
            accent,
            container: Surface::new(title),
            headline,
            reveals,
        })
    }

    /// Section title
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Current container properties
    pub fn container_props(&self) -> VisualProps {
        self.container.props()
    }

    /// Paint into `rect` using the current surface properties
    pub fn paint(&self, ui: &egui::Ui, rect: egui::Rect) {
        let props = self.container.props();
        if props.opacity <= 0.0 {
            return;
        }
        let painter = ui.painter_at(rect);
        let frame = egui::Rect::from_center_size(
            rect.center() + egui::vec2(0.0, props.translate_y),
            rect.size() * props.scale,
        );
        // No blur in the painter; soften the fill instead.
        let softness = 1.0 - (props.blur_px / 16.0).clamp(0.0, 0.5);
        painter.rect_filled(
            frame,
            12.0,
            self.accent.gamma_multiply(props.opacity * softness),
        );

        let text = self.headline.surface().map(Surface::props).unwrap_or_default();
        let alpha = props.opacity * text.opacity;
        let center = frame.center() + egui::vec2(0.0, text.translate_y);
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            self.title,
            egui::FontId::proportional(44.0 * props.scale),
            egui::Color32::WHITE.gamma_multiply(alpha),
        );
        painter.text(
            center + egui::vec2(0.0, 48.0),
            egui::Align2::CENTER_CENTER,
            self.tagline,
            egui::FontId::proportional(18.0 * props.scale),
            egui::Color32::from_gray(220).gamma_multiply(alpha),
        );
    }
}

impl SectionHandle for HeroSection {
    fn container(&self) -> Option<Surface> {
        Some(self.container.clone())
    }

    fn play_forward(&self) -> LocalBoxFuture<'static, ()> {
        let done = if self.reveals {
            self.headline.transition_in()
        } else {
            self.headline.transition_out()
        };
        done.boxed_local()
    }

    fn play_reverse(&self) -> LocalBoxFuture<'static, ()> {
        let done = if self.reveals {
            self.headline.transition_out()
        } else {
            self.headline.transition_in()
        };
        done.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revealing_section_starts_hidden() {
        let clock = FrameClock::new();
        let section = HeroSection::new("Trade", "", egui::Color32::BLUE, true, &clock, false);
        let headline = section.headline.surface().map(Surface::props);
        assert_eq!(headline.map(|p| p.opacity), Some(0.0));

        let done = section.play_forward();
        clock.advance(HEADLINE_DURATION / 2.0);
        assert!(done.now_or_never().is_some());
        assert_eq!(section.headline.surface().map(Surface::props), Some(VisualProps::IDENTITY));
    }

    #[test]
    fn test_dismissing_section_plays_out() {
        let clock = FrameClock::new();
        let section = HeroSection::new("Flow", "", egui::Color32::RED, false, &clock, false);
        let mut done = section.play_forward();
        assert!((&mut done).now_or_never().is_none());
        clock.advance(HEADLINE_DURATION / 2.0);
        assert!(done.now_or_never().is_some());
        let headline = section.headline.surface().map(Surface::props);
        assert_eq!(headline.map(|p| p.opacity), Some(0.0));
    }
}
