// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll sequence states and their pure transition rules.
//!
//! Everything here is free of side effects: the controller asks a state
//! which state an intent leads to, which effect to run on entry, and which
//! state follows once that effect has finished.

use serde::{Deserialize, Serialize};
use tradeflow_motion_transition::Direction;

/// Classified scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollIntent {
    /// Toward the top of the page
    Up,
    /// Toward the bottom of the page
    Down,
}

impl ScrollIntent {
    /// Classify a signed delta. Positive deltas scroll down.
    pub fn from_delta(delta: f32) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Down)
        } else if delta < 0.0 {
            Some(Self::Up)
        } else {
            None
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Which managed section an effect targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionSlot {
    /// The opening hero section
    First,
    /// The follow-up section
    Second,
}

/// Async work performed on entering a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to wait for
    None,
    /// Play a section's own animation
    Play {
        /// Section to play
        slot: SectionSlot,
        /// Forward or reverse playback
        direction: Direction,
    },
    /// Cross-fade one section container into the other
    Crossfade {
        /// Outgoing section
        from: SectionSlot,
        /// Incoming section
        to: SectionSlot,
        /// Page direction
        direction: Direction,
    },
    /// Wait for the fixed settle delay
    Settle,
}

/// Named hand-off procedures, one per transient state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    /// Section 1 hands off to section 2
    TransitionToS2,
    /// Section 2 hands off to the static page
    TransitionToStatic,
    /// The static page hands back to section 2
    TransitionBackToS2,
    /// Section 2 hands back to section 1
    TransitionToS1,
}

impl Procedure {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransitionToS2 => "transition_to_s2",
            Self::TransitionToStatic => "transition_to_static",
            Self::TransitionBackToS2 => "transition_back_to_s2",
            Self::TransitionToS1 => "transition_to_s1",
        }
    }
}

/// State of the scroll sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequenceState {
    /// Section 1 waiting for the first scroll
    #[default]
    S1Idle,
    /// Section 1 playing forward
    S1ActiveForward,
    /// Cross-fading from section 1 to section 2
    S1TransitionToS2,
    /// Section 2 playing forward
    S2ActiveForward,
    /// Settling before native scroll resumes
    S2TransitionToStatic,
    /// Static content with native scroll
    StaticActive,
    /// Settling before section 2 reverses
    StaticTransitionToS2,
    /// Section 2 playing in reverse
    S2ActiveReverse,
    /// Cross-fading from section 2 back to section 1
    S2TransitionToS1,
    /// Section 1 playing in reverse
    S1ActiveReverse,
}

impl SequenceState {
    /// Every state, forward path first
    pub const ALL: [SequenceState; 10] = [
        SequenceState::S1Idle,
        SequenceState::S1ActiveForward,
        SequenceState::S1TransitionToS2,
        SequenceState::S2ActiveForward,
        SequenceState::S2TransitionToStatic,
        SequenceState::StaticActive,
        SequenceState::StaticTransitionToS2,
        SequenceState::S2ActiveReverse,
        SequenceState::S2TransitionToS1,
        SequenceState::S1ActiveReverse,
    ];

    /// Canonical upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            Self::S1Idle => "S1_IDLE",
            Self::S1ActiveForward => "S1_ACTIVE_FORWARD",
            Self::S1TransitionToS2 => "S1_TRANSITION_TO_S2",
            Self::S2ActiveForward => "S2_ACTIVE_FORWARD",
            Self::S2TransitionToStatic => "S2_TRANSITION_TO_STATIC",
            Self::StaticActive => "STATIC_ACTIVE",
            Self::StaticTransitionToS2 => "STATIC_TRANSITION_TO_S2",
            Self::S2ActiveReverse => "S2_ACTIVE_REVERSE",
            Self::S2TransitionToS1 => "S2_TRANSITION_TO_S1",
            Self::S1ActiveReverse => "S1_ACTIVE_REVERSE",
        }
    }

    /// Whether the state is only entered by the sequence itself
    pub fn is_transient(&self) -> bool {
        self.procedure().is_some()
    }

    /// Whether the sequence rests here until the next intent
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::S1Idle | Self::StaticActive)
    }

    /// Whether native scrolling is captured in this state
    pub fn locks_scroll(&self) -> bool {
        !matches!(self, Self::StaticActive)
    }

    /// Hand-off procedure a transient state belongs to
    pub fn procedure(&self) -> Option<Procedure> {
        match self {
            Self::S1TransitionToS2 => Some(Procedure::TransitionToS2),
            Self::S2TransitionToStatic => Some(Procedure::TransitionToStatic),
            Self::StaticTransitionToS2 => Some(Procedure::TransitionBackToS2),
            Self::S2TransitionToS1 => Some(Procedure::TransitionToS1),
            _ => None,
        }
    }

    /// First state entered in response to `intent`, or `None` for a no-op.
    ///
    /// `scroll_offset` is the native page offset and only matters in
    /// `StaticActive`, where an upward intent rewinds the sequence only at
    /// the very top of the page.
    pub fn on_intent(
        self,
        intent: ScrollIntent,
        scroll_offset: f32,
        top_tolerance: f32,
    ) -> Option<SequenceState> {
        match (self, intent) {
            (Self::S1Idle, ScrollIntent::Down) => Some(Self::S1ActiveForward),
            (Self::StaticActive, ScrollIntent::Up) if scroll_offset <= top_tolerance => {
                Some(Self::StaticTransitionToS2)
            }
            _ => None,
        }
    }

    /// State that follows once this state's entry effect has finished.
    /// Stable states have no successor.
    pub fn successor(self) -> Option<SequenceState> {
        match self {
            Self::S1Idle | Self::StaticActive => None,
            Self::S1ActiveForward => Some(Self::S1TransitionToS2),
            Self::S1TransitionToS2 => Some(Self::S2ActiveForward),
            Self::S2ActiveForward => Some(Self::S2TransitionToStatic),
            Self::S2TransitionToStatic => Some(Self::StaticActive),
            Self::StaticTransitionToS2 => Some(Self::S2ActiveReverse),
            Self::S2ActiveReverse => Some(Self::S2TransitionToS1),
            Self::S2TransitionToS1 => Some(Self::S1ActiveReverse),
            Self::S1ActiveReverse => Some(Self::S1Idle),
        }
    }

    /// Work to perform on entering this state
    pub fn entry_effect(self) -> Effect {
        match self {
            Self::S1Idle | Self::StaticActive => Effect::None,
            Self::S1ActiveForward => Effect::Play {
                slot: SectionSlot::First,
                direction: Direction::Forward,
            },
            Self::S1TransitionToS2 => Effect::Crossfade {
                from: SectionSlot::First,
                to: SectionSlot::Second,
                direction: Direction::Forward,
            },
            Self::S2ActiveForward => Effect::Play {
                slot: SectionSlot::Second,
                direction: Direction::Forward,
            },
            Self::S2TransitionToStatic | Self::StaticTransitionToS2 => Effect::Settle,
            Self::S2ActiveReverse => Effect::Play {
                slot: SectionSlot::Second,
                direction: Direction::Reverse,
            },
            Self::S2TransitionToS1 => Effect::Crossfade {
                from: SectionSlot::Second,
                to: SectionSlot::First,
                direction: Direction::Reverse,
            },
            Self::S1ActiveReverse => Effect::Play {
                slot: SectionSlot::First,
                direction: Direction::Reverse,
            },
        }
    }

    /// States walked from `first` until the next stable state, inclusive
    pub fn path_from(first: SequenceState) -> Vec<SequenceState> {
        let mut path = vec![first];
        let mut current = first;
        while let Some(next) = current.successor() {
            path.push(next);
            current = next;
        }
        path
    }
}

impl std::fmt::Display for SequenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
