// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared visual region written by tweens and read by renderers.

use crate::props::{VisualPatch, VisualProps};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A rendered region whose visual properties can be animated.
///
/// Cloning a surface clones the handle, not the region: every clone reads
/// and writes the same properties.
#[derive(Clone)]
pub struct Surface {
    inner: Rc<SurfaceInner>,
}

struct SurfaceInner {
    name: String,
    props: Cell<VisualProps>,
}

impl Surface {
    /// Create a fully visible surface
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(SurfaceInner {
                name: name.into(),
                props: Cell::new(VisualProps::IDENTITY),
            }),
        }
    }

    /// Region name, used in logs
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current properties
    pub fn props(&self) -> VisualProps {
        self.inner.props.get()
    }

    /// Replace all properties
    pub fn set_props(&self, props: VisualProps) {
        self.inner.props.set(props);
    }

    /// Write the channels present in `patch`
    pub fn apply(&self, patch: &VisualPatch) {
        self.set_props(patch.resolve(self.props()));
    }

    /// Whether both handles point at the same region
    pub fn same_region(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("name", &self.inner.name)
            .field("props", &self.props())
            .finish()
    }
}
