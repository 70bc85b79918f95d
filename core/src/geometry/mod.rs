//! Geometry module - Pure geometric operations
//!
//! Triangles, trigonometry in degrees, and degeneracy checks. No fact store
//! access happens here.

pub mod check;
pub mod triangle;
pub mod trig;

pub use check::*;
pub use triangle::*;
pub use trig::*;
