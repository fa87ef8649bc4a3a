// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll-sequenced section orchestration.
//!
//! A [`ScrollSequenceController`] captures page scrolling while two hero
//! sections play in order, cross-fades between them, and then hands
//! control back to the page. Scrolling up at the top of the page plays the
//! whole sequence in reverse.

pub mod config;
pub mod controller;
pub mod input;
pub mod section;
pub mod state;

pub use config::{ConfigError, SequenceConfig};
pub use controller::{ControllerBuilder, ScrollSequenceController, SequenceError};
pub use input::{InputDisposition, InputGate, Listener};
pub use section::{PageScroll, SectionHandle};
pub use state::{Effect, Procedure, ScrollIntent, SectionSlot, SequenceState};
