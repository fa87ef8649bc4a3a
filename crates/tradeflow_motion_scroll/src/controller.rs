// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll sequence controller.
//!
//! The controller captures wheel and touch input while the sequence is
//! locked, turns it into intents, and walks the state path one state at a
//! time. Each entered state's effect (section playback, cross-fade or
//! settle delay) is awaited before the next state is entered, so at most
//! one hand-off is ever running.
//!
//! The walk runs as a task on the host's local executor. It is polled once
//! inline when an intent is accepted, which makes the first state change
//! synchronous and lets reduced-motion walks finish without the executor.

use crate::config::SequenceConfig;
use crate::input::{InputDisposition, InputGate, Listener};
use crate::section::{PageScroll, SectionHandle};
use crate::state::{Effect, ScrollIntent, SectionSlot, SequenceState};
use futures::future::{self, Either};
use futures::task::{LocalSpawn, LocalSpawnExt, SpawnError};
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tradeflow_motion_transition::{
    Completion, Direction, FrameClock, Surface, TransitionLayer, TransitionRequest,
};

/// Sequence runtime errors. None of these reach callers of the controller;
/// they are logged and the sequence degrades to a no-op.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The local executor refused the sequence task
    #[error("Failed to schedule scroll sequence: {0}")]
    Spawn(#[from] SpawnError),
}

type StateCallback = Box<dyn FnMut(SequenceState)>;
type CompleteCallback = Box<dyn FnOnce()>;

fn downgrade<S: SectionHandle + 'static>(section: &Rc<S>) -> Weak<dyn SectionHandle> {
    let section: Rc<dyn SectionHandle> = section.clone();
    Rc::downgrade(&section)
}

/// Builder for [`ScrollSequenceController`]
pub struct ControllerBuilder {
    config: SequenceConfig,
    clock: FrameClock,
    page: PageScroll,
    section1: Option<Weak<dyn SectionHandle>>,
    section2: Option<Weak<dyn SectionHandle>>,
    on_state_change: Option<StateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl ControllerBuilder {
    /// Clock driving cross-fades, settle delays and timeouts
    pub fn clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Native page offset shared with the host
    pub fn page_scroll(mut self, page: PageScroll) -> Self {
        self.page = page;
        self
    }

    /// Opening section. Held weakly.
    pub fn section1<S: SectionHandle + 'static>(mut self, section: &Rc<S>) -> Self {
        self.section1 = Some(downgrade(section));
        self
    }

    /// Follow-up section. Held weakly.
    pub fn section2<S: SectionHandle + 'static>(mut self, section: &Rc<S>) -> Self {
        self.section2 = Some(downgrade(section));
        self
    }

    /// Override the config's reduced-motion flag
    pub fn reduced_motion(mut self, reduced: bool) -> Self {
        self.config.reduced_motion = reduced;
        self
    }

    /// Called once for every state entered
    pub fn on_state_change(mut self, callback: impl FnMut(SequenceState) + 'static) -> Self {
        self.on_state_change = Some(Box::new(callback));
        self
    }

    /// Called the first time the static page is reached
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Register input listeners and start in `S1Idle`, or jump straight to
    /// `StaticActive` when reduced motion is requested.
    pub fn mount(self, spawner: impl LocalSpawn + 'static) -> ScrollSequenceController {
        let reduced_motion = self.config.reduced_motion;
        let shared = Rc::new(Shared {
            input: RefCell::new(InputGate::new(&self.config)),
            config: self.config,
            clock: self.clock,
            page: self.page,
            spawner: Box::new(spawner),
            section1: self.section1,
            section2: self.section2,
            state: Cell::new(SequenceState::S1Idle),
            in_flight: Cell::new(false),
            mounted: Cell::new(true),
            listeners: RefCell::new(Listener::ALL.to_vec()),
            crossfade: RefCell::new(None),
            on_state_change: RefCell::new(self.on_state_change),
            on_complete: RefCell::new(self.on_complete),
        });

        if reduced_motion {
            shared.in_flight.set(true);
            shared.enter(SequenceState::StaticActive);
            shared.in_flight.set(false);
        } else {
            shared.prepare_sections();
        }
        tracing::debug!(reduced_motion, "scroll sequence mounted");

        ScrollSequenceController { shared }
    }
}

struct Shared {
    config: SequenceConfig,
    clock: FrameClock,
    page: PageScroll,
    spawner: Box<dyn LocalSpawn>,
    section1: Option<Weak<dyn SectionHandle>>,
    section2: Option<Weak<dyn SectionHandle>>,
    state: Cell<SequenceState>,
    in_flight: Cell<bool>,
    mounted: Cell<bool>,
    input: RefCell<InputGate>,
    listeners: RefCell<Vec<Listener>>,
    crossfade: RefCell<Option<TransitionLayer>>,
    on_state_change: RefCell<Option<StateCallback>>,
    on_complete: RefCell<Option<CompleteCallback>>,
}

impl Shared {
    fn section(&self, slot: SectionSlot) -> Option<Rc<dyn SectionHandle>> {
        let section = match slot {
            SectionSlot::First => self.section1.as_ref(),
            SectionSlot::Second => self.section2.as_ref(),
        };
        section.and_then(Weak::upgrade)
    }

    fn container(&self, slot: SectionSlot) -> Option<Surface> {
        self.section(slot).and_then(|section| section.container())
    }

    /// Show section 1 and hide section 2 before the first hand-off
    fn prepare_sections(&self) {
        for (slot, visible) in [(SectionSlot::First, true), (SectionSlot::Second, false)] {
            if let Some(container) = self.container(slot) {
                TransitionLayer::new(Some(container), self.clock.clone(), self.config.style)
                    .set_visible(visible);
            }
        }
    }

    fn enter(&self, state: SequenceState) {
        let previous = self.state.replace(state);
        tracing::debug!(from = %previous, to = %state, "sequence state entered");

        match self.on_state_change.try_borrow_mut() {
            Ok(mut callback) => {
                if let Some(callback) = callback.as_mut() {
                    callback(state);
                }
            }
            Err(_) => tracing::warn!(state = %state, "re-entrant state notification skipped"),
        }

        match state {
            SequenceState::StaticActive => {
                let done = self.on_complete.borrow_mut().take();
                if let Some(done) = done {
                    tracing::info!("scroll sequence complete");
                    done();
                }
            }
            SequenceState::S1Idle => tracing::info!("scroll sequence rewound to start"),
            _ => {}
        }
    }

    async fn run(self: Rc<Self>, first: SequenceState) {
        let mut next = Some(first);
        while let Some(state) = next {
            if !self.mounted.get() {
                tracing::debug!(state = %state, "sequence abandoned after unmount");
                break;
            }
            self.in_flight.set(true);
            self.enter(state);
            // Only hand-offs hold the flag once the state is reported.
            self.in_flight.set(state.procedure().is_some());
            self.perform(state).await;
            next = state.successor();
        }
        self.in_flight.set(false);
    }

    async fn perform(&self, state: SequenceState) {
        if self.config.reduced_motion {
            return;
        }
        if let Some(procedure) = state.procedure() {
            tracing::debug!(procedure = procedure.name(), "hand-off started");
        }
        match state.entry_effect() {
            Effect::None => {}
            Effect::Settle => self.clock.delay(self.config.settle_delay_secs).await,
            Effect::Crossfade {
                from,
                to,
                direction,
            } => self.crossfade(from, to, direction).await,
            Effect::Play { slot, direction } => self.play(slot, direction).await,
        }
    }

    fn crossfade(&self, from: SectionSlot, to: SectionSlot, direction: Direction) -> Completion {
        let request = TransitionRequest::new(self.container(from), self.container(to), direction);
        let layer = request
            .layer(self.clock.clone(), self.config.style)
            .with_duration(self.config.crossfade_duration_secs)
            .with_overlap(self.config.crossfade_overlap);
        let done = layer.crossfade_to(request.to.as_ref());
        *self.crossfade.borrow_mut() = Some(layer);
        done
    }

    async fn play(&self, slot: SectionSlot, direction: Direction) {
        let Some(section) = self.section(slot) else {
            tracing::debug!(?slot, "section not mounted; continuing");
            return;
        };
        let playback = match direction {
            Direction::Forward => section.play_forward(),
            Direction::Reverse => section.play_reverse(),
        };
        drop(section);

        let Some(limit) = self.config.section_timeout_secs else {
            playback.await;
            return;
        };
        match future::select(playback, self.clock.delay(limit)).await {
            Either::Left(_) => {}
            Either::Right(_) => tracing::warn!(
                ?slot,
                direction = direction.name(),
                timeout_secs = limit,
                "section animation timed out; advancing"
            ),
        }
    }
}

/// Drives the two-section scroll sequence.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct ScrollSequenceController {
    shared: Rc<Shared>,
}

impl ScrollSequenceController {
    /// Start building a controller
    pub fn builder(config: SequenceConfig) -> ControllerBuilder {
        ControllerBuilder {
            config,
            clock: FrameClock::new(),
            page: PageScroll::new(),
            section1: None,
            section2: None,
            on_state_change: None,
            on_complete: None,
        }
    }

    /// Current state
    pub fn state(&self) -> SequenceState {
        self.shared.state.get()
    }

    /// Whether native scrolling is being captured
    pub fn is_scroll_locked(&self) -> bool {
        self.shared.mounted.get() && self.state().locks_scroll()
    }

    /// Whether a hand-off between sections is running. Section playback
    /// in the active states does not count.
    pub fn is_transitioning(&self) -> bool {
        self.shared.in_flight.get()
    }

    /// Whether the controller is still mounted
    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.get()
    }

    /// Tunables the controller was mounted with
    pub fn config(&self) -> &SequenceConfig {
        &self.shared.config
    }

    /// Listeners currently registered
    pub fn listeners(&self) -> Vec<Listener> {
        self.shared.listeners.borrow().clone()
    }

    /// Inject a classified intent.
    ///
    /// Intents arriving during a hand-off are dropped. Intents that the
    /// current state does not react to are ignored, which covers section
    /// playback in the active states.
    pub fn handle_scroll_intent(&self, intent: ScrollIntent) {
        let shared = &self.shared;
        if !shared.mounted.get() {
            return;
        }
        let current = shared.state.get();
        if shared.in_flight.get() {
            tracing::debug!(
                intent = intent.name(),
                state = %current,
                "intent dropped: transition in flight"
            );
            return;
        }
        let Some(first) =
            current.on_intent(intent, shared.page.offset(), shared.config.top_tolerance_px)
        else {
            tracing::trace!(intent = intent.name(), state = %current, "intent ignored");
            return;
        };

        tracing::debug!(intent = intent.name(), from = %current, "intent accepted");
        shared.in_flight.set(true);
        let mut walk = Rc::clone(shared).run(first).boxed_local();
        if (&mut walk).now_or_never().is_some() {
            return;
        }
        if let Err(err) = shared.spawner.spawn_local(walk).map_err(SequenceError::from) {
            tracing::warn!("{err}");
            shared.in_flight.set(false);
        }
    }

    /// Feed a wheel event
    pub fn handle_wheel(&self, delta_y: f32) -> InputDisposition {
        if !self.is_listening(Listener::Wheel) {
            return InputDisposition::PassThrough;
        }
        let disposition = self.disposition();
        let now = self.shared.clock.now();
        let intent = {
            let mut input = self.shared.input.borrow_mut();
            match disposition {
                InputDisposition::Captured => input.wheel(delta_y, now),
                InputDisposition::PassThrough => input.wheel_unlocked(delta_y, now),
            }
        };
        if let Some(intent) = intent {
            self.handle_scroll_intent(intent);
        }
        disposition
    }

    /// Feed a touch start
    pub fn handle_touch_start(&self, client_y: f32) -> InputDisposition {
        if !self.is_listening(Listener::Touch) {
            return InputDisposition::PassThrough;
        }
        self.shared
            .input
            .borrow_mut()
            .touch_start(client_y, self.shared.clock.now());
        self.disposition()
    }

    /// Feed a touch move
    pub fn handle_touch_move(&self, client_y: f32) -> InputDisposition {
        if !self.is_listening(Listener::Touch) {
            return InputDisposition::PassThrough;
        }
        let disposition = self.disposition();
        let intent = self
            .shared
            .input
            .borrow_mut()
            .touch_move(client_y, self.shared.clock.now());
        if let Some(intent) = intent {
            self.handle_scroll_intent(intent);
        }
        disposition
    }

    /// Feed a touch end or cancel
    pub fn handle_touch_end(&self) {
        if self.is_listening(Listener::Touch) {
            self.shared.input.borrow_mut().touch_end();
        }
    }

    /// Feed a viewport resize. Layout is owned by the host, so this only
    /// records the event.
    pub fn handle_resize(&self, width: f32, height: f32) {
        if self.is_listening(Listener::Resize) {
            tracing::trace!(width, height, "viewport resized");
        }
    }

    /// Deregister listeners, stop the running cross-fade and release the
    /// scroll lock. A walk waiting on a section finishes silently.
    pub fn unmount(&self) {
        let shared = &self.shared;
        if !shared.mounted.replace(false) {
            return;
        }
        shared.listeners.borrow_mut().clear();
        shared.input.borrow_mut().reset();
        let layer = shared.crossfade.borrow_mut().take();
        if let Some(layer) = layer {
            layer.kill();
        }
        tracing::debug!(state = %shared.state.get(), "scroll sequence unmounted");
    }

    fn is_listening(&self, listener: Listener) -> bool {
        self.shared.listeners.borrow().contains(&listener)
    }

    fn disposition(&self) -> InputDisposition {
        if self.is_scroll_locked() {
            InputDisposition::Captured
        } else {
            InputDisposition::PassThrough
        }
    }
}

impl fmt::Debug for ScrollSequenceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSequenceController")
            .field("state", &self.state())
            .field("in_flight", &self.is_transitioning())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::LocalPool;

    struct StaticSection {
        container: Surface,
    }

    impl SectionHandle for StaticSection {
        fn container(&self) -> Option<Surface> {
            Some(self.container.clone())
        }
    }

    #[test]
    fn test_mount_prepares_sections() {
        let pool = LocalPool::new();
        let s1 = Rc::new(StaticSection {
            container: Surface::new("s1"),
        });
        let s2 = Rc::new(StaticSection {
            container: Surface::new("s2"),
        });
        let controller = ScrollSequenceController::builder(SequenceConfig::default())
            .section1(&s1)
            .section2(&s2)
            .mount(pool.spawner());

        assert_eq!(controller.state(), SequenceState::S1Idle);
        assert!(controller.is_scroll_locked());
        assert_eq!(s1.container.props().opacity, 1.0);
        assert_eq!(s2.container.props().opacity, 0.0);
        assert_eq!(controller.listeners(), Listener::ALL.to_vec());
    }

    #[test]
    fn test_missing_sections_do_not_stall() {
        let mut pool = LocalPool::new();
        let clock = FrameClock::new();
        let controller = ScrollSequenceController::builder(SequenceConfig::default())
            .clock(clock.clone())
            .mount(pool.spawner());

        controller.handle_scroll_intent(ScrollIntent::Down);
        // No sections: playback and cross-fade resolve immediately and the
        // walk parks on the settle delay.
        assert_eq!(controller.state(), SequenceState::S2TransitionToStatic);

        clock.advance(0.3);
        pool.run_until_stalled();
        assert_eq!(controller.state(), SequenceState::StaticActive);
        assert!(!controller.is_transitioning());
        assert!(!controller.is_scroll_locked());
    }

    #[test]
    fn test_dropped_section_is_skipped() {
        let mut pool = LocalPool::new();
        let clock = FrameClock::new();
        let s1 = Rc::new(StaticSection {
            container: Surface::new("s1"),
        });
        let controller = ScrollSequenceController::builder(SequenceConfig::default())
            .clock(clock.clone())
            .section1(&s1)
            .mount(pool.spawner());
        drop(s1);

        controller.handle_scroll_intent(ScrollIntent::Down);
        clock.advance(0.3);
        pool.run_until_stalled();
        assert_eq!(controller.state(), SequenceState::StaticActive);
    }

    #[test]
    fn test_unmount_releases_lock_and_listeners() {
        let pool = LocalPool::new();
        let controller =
            ScrollSequenceController::builder(SequenceConfig::default()).mount(pool.spawner());
        assert!(controller.is_scroll_locked());

        controller.unmount();
        assert!(!controller.is_mounted());
        assert!(!controller.is_scroll_locked());
        assert!(controller.listeners().is_empty());
        assert_eq!(controller.handle_wheel(500.0), InputDisposition::PassThrough);

        controller.handle_scroll_intent(ScrollIntent::Down);
        assert_eq!(controller.state(), SequenceState::S1Idle);
        controller.unmount();
    }
}
