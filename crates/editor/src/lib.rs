//! Client side of the annotation tool: turns map gestures into markers and
//! parking polygons, and keeps them in step with the backend.
//!
//! The pieces, leaf first:
//!
//! - [`ring`] collects the tapped points of the parking being drawn,
//! - [`synthesize`] turns a closed ring into a polygon with vertex handles,
//! - [`vertex`] keeps the polygon in step with its dragged handles,
//! - [`gateway`] talks to the REST backend,
//! - [`editor`] owns all of the above and reacts to typed commands,
//! - [`session`] runs an [`editor::Editor`] as a single task event loop.

use std::fmt;

use serde::Serialize;

pub mod config;
pub mod editor;
pub mod gateway;
pub mod gesture;
pub mod projection;
pub mod ring;
pub mod scene;
pub mod session;
pub mod synthesize;
pub mod vertex;

/// Client side identity of a shape. Assigned when the shape is created
/// locally, long before the backend hands out its own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LocalId(u64);

impl LocalId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
