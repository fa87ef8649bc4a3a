// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition primitives for the Tradeflow landing pages.
//!
//! This crate provides the visual hand-off layer used by the scroll
//! sequence:
//! - Animatable surface properties (opacity, scale, blur, translate)
//! - Eased tween timelines with start offsets
//! - A host-driven frame clock with timers
//! - Named transition styles with a reduced-motion fallback
//! - `TransitionLayer` fade/scale/blur operations
//!
//! ## Architecture
//!
//! Everything is single-threaded. The host advances a shared
//! [`FrameClock`] once per animation frame; timelines registered on it
//! write interpolated [`VisualProps`] into their [`Surface`]s and resolve
//! a [`Completion`] future when they finish or are killed.

pub mod clock;
pub mod layer;
pub mod props;
pub mod style;
pub mod surface;
pub mod timeline;

pub use clock::{Completion, FrameClock};
pub use layer::{TransitionLayer, TransitionRequest};
pub use props::{Ease, Interpolation, VisualPatch, VisualProps};
pub use style::{Direction, StyleSpec, TransitionStyle};
pub use surface::Surface;
pub use timeline::{Timeline, TimelineId, Tween};
