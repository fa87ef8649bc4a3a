// SPDX-License-Identifier: MIT OR Apache-2.0
//! Contract implemented by the page sections the sequence drives.

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::Cell;
use std::rc::Rc;
use tradeflow_motion_transition::Surface;

/// A managed page section.
///
/// The controller only holds a weak reference to each section. Both play
/// methods are optional: the defaults resolve immediately so the sequence
/// simply moves on.
pub trait SectionHandle {
    /// Container cross-faded when the sequence hands off to or from this
    /// section. `None` while the section is not rendered.
    fn container(&self) -> Option<Surface>;

    /// Play the section's own entrance animation
    fn play_forward(&self) -> LocalBoxFuture<'static, ()> {
        future::ready(()).boxed_local()
    }

    /// Play the section's own animation backwards
    fn play_reverse(&self) -> LocalBoxFuture<'static, ()> {
        future::ready(()).boxed_local()
    }
}

/// Native page scroll offset, written by the host and read by the
/// controller
#[derive(Debug, Clone, Default)]
pub struct PageScroll {
    offset: Rc<Cell<f32>>,
}

impl PageScroll {
    /// Create a page scrolled to the top
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset from the top in CSS pixels
    pub fn offset(&self) -> f32 {
        self.offset.get()
    }

    /// Record the page's offset after a native scroll
    pub fn set_offset(&self, offset: f32) {
        self.offset.set(offset.max(0.0));
    }
}
