// SPDX-License-Identifier: MIT OR Apache-2.0
//! The landing page under preview: two hero sections, the static page
//! below them, and the controller driving the hand-off.

use crate::sections::HeroSection;
use futures::executor::LocalPool;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tradeflow_motion_scroll::{
    InputDisposition, PageScroll, ScrollSequenceController, SequenceConfig, SequenceState,
};
use tradeflow_motion_transition::FrameClock;

/// Number of recent states kept for the status bar
const HISTORY_LEN: usize = 6;

/// Static page rows rendered below the sequence
const STATIC_ROWS: &[(&str, &str)] = &[
    ("Live order book", "Depth across every venue, merged in one view."),
    ("Smart routing", "Orders split by liquidity and fee tier."),
    ("Risk guards", "Position limits enforced before submission."),
    ("Settlement", "T+0 reconciliation with exportable audit trails."),
    ("API access", "REST and streaming endpoints with scoped keys."),
    ("Pricing", "Flat monthly tiers, no per-trade markup."),
];

/// Touch phase forwarded from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// Finger down
    Start,
    /// Finger moved
    Move,
    /// Finger lifted or the gesture was cancelled
    End,
}

/// Preview page state
pub struct Stage {
    pool: LocalPool,
    clock: FrameClock,
    page: PageScroll,
    opening: Rc<HeroSection>,
    follow_up: Rc<HeroSection>,
    controller: ScrollSequenceController,
    history: Rc<RefCell<VecDeque<SequenceState>>>,
}

impl Stage {
    /// Build the page and mount its controller
    pub fn new(config: SequenceConfig) -> Self {
        let pool = LocalPool::new();
        let clock = FrameClock::new();
        let page = PageScroll::new();
        let reduced_motion = config.reduced_motion;

        let opening = HeroSection::new(
            "Trade without friction",
            "Scroll to see how orders flow",
            egui::Color32::from_rgb(32, 84, 160),
            false,
            &clock,
            reduced_motion,
        );
        let follow_up = HeroSection::new(
            "Every venue, one ticket",
            "Routing, risk and settlement in a single pass",
            egui::Color32::from_rgb(22, 128, 104),
            true,
            &clock,
            reduced_motion,
        );

        let history = Rc::new(RefCell::new(VecDeque::with_capacity(HISTORY_LEN)));
        let recent = Rc::clone(&history);
        let controller = ScrollSequenceController::builder(config)
            .clock(clock.clone())
            .page_scroll(page.clone())
            .section1(&opening)
            .section2(&follow_up)
            .on_state_change(move |state| {
                let mut recent = recent.borrow_mut();
                if recent.len() == HISTORY_LEN {
                    recent.pop_front();
                }
                recent.push_back(state);
            })
            .on_complete(|| tracing::info!("static page reached"))
            .mount(pool.spawner());

        Self {
            pool,
            clock,
            page,
            opening,
            follow_up,
            controller,
            history,
        }
    }

    /// Advance animations by `dt` seconds and resume waiting hand-offs
    pub fn tick(&mut self, dt: f32) {
        self.clock.advance(dt);
        self.pool.run_until_stalled();
    }

    /// Forward a wheel delta in CSS pixels, positive scrolling down
    pub fn on_wheel(&self, delta_y: f32) -> InputDisposition {
        self.controller.handle_wheel(delta_y)
    }

    /// Forward a touch event at logical `y`
    pub fn on_touch(&self, phase: TouchPhase, y: f32) -> InputDisposition {
        match phase {
            TouchPhase::Start => self.controller.handle_touch_start(y),
            TouchPhase::Move => self.controller.handle_touch_move(y),
            TouchPhase::End => {
                self.controller.handle_touch_end();
                InputDisposition::PassThrough
            }
        }
    }

    /// Forward a viewport resize in logical pixels
    pub fn on_resize(&self, width: f32, height: f32) {
        self.controller.handle_resize(width, height);
    }

    /// Draw the status bar and the page
    pub fn ui(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("sequence_status").show(ctx, |ui| {
            self.status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.controller.state() == SequenceState::StaticActive {
                self.static_page(ui);
            } else {
                let rect = ui.available_rect_before_wrap();
                self.opening.paint(ui, rect);
                self.follow_up.paint(ui, rect);
            }
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        let controller = &self.controller;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(controller.state().name()).monospace().strong());
            ui.separator();

            let (lock, lock_color) = if controller.is_scroll_locked() {
                ("scroll locked", egui::Color32::from_rgb(255, 200, 80))
            } else {
                ("native scroll", egui::Color32::from_rgb(120, 200, 120))
            };
            ui.colored_label(lock_color, lock);
            ui.separator();

            if controller.is_transitioning() {
                ui.spinner();
                ui.label("in flight");
            } else {
                ui.label("idle");
            }
            ui.separator();

            if controller.config().reduced_motion {
                ui.label("reduced motion");
                ui.separator();
            }

            let opening = self.opening.container_props();
            let follow_up = self.follow_up.container_props();
            ui.label(
                egui::RichText::new(format!(
                    "{} {:.2} | {} {:.2}",
                    self.opening.title(),
                    opening.opacity,
                    self.follow_up.title(),
                    follow_up.opacity
                ))
                .weak(),
            );
        });

        let history = self.history.borrow();
        if !history.is_empty() {
            let trail: Vec<&str> = history.iter().map(SequenceState::name).collect();
            ui.label(egui::RichText::new(trail.join(" -> ")).small().monospace());
        }
    }

    fn static_page(&self, ui: &mut egui::Ui) {
        let output = egui::ScrollArea::vertical()
            .id_salt("static_page")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(24.0);
                ui.heading("Tradeflow");
                ui.label("Scroll back to the top and keep scrolling up to replay the sequence.");
                ui.add_space(24.0);
                for (title, body) in STATIC_ROWS.iter().cycle().take(STATIC_ROWS.len() * 4) {
                    ui.group(|ui| {
                        ui.set_width(ui.available_width());
                        ui.strong(*title);
                        ui.label(*body);
                    });
                    ui.add_space(12.0);
                }
            });
        self.page.set_offset(output.state.offset.y);
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.controller.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_walks_forward() {
        let mut stage = Stage::new(SequenceConfig::default());
        assert_eq!(stage.on_wheel(120.0), InputDisposition::Captured);
        assert_eq!(stage.controller.state(), SequenceState::S1ActiveForward);

        for _ in 0..300 {
            stage.tick(1.0 / 60.0);
        }
        assert_eq!(stage.controller.state(), SequenceState::StaticActive);
        assert_eq!(stage.on_wheel(120.0), InputDisposition::PassThrough);
        assert!(stage.history.borrow().len() <= HISTORY_LEN);
    }

    #[test]
    fn test_reduced_motion_stage_is_static() {
        let config = SequenceConfig {
            reduced_motion: true,
            ..SequenceConfig::default()
        };
        let stage = Stage::new(config);
        assert_eq!(stage.controller.state(), SequenceState::StaticActive);
        assert_eq!(stage.on_touch(TouchPhase::Start, 300.0), InputDisposition::PassThrough);
    }
}
