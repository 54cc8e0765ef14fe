//! Geometric primitives shared by the frustum and bounding volumes

mod plane;
mod rect;

pub use plane::Plane;
pub use rect::Rect;
