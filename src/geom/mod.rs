//! Geometry primitives: affine transforms, bounding boxes, path data.

pub mod bbox;
pub mod path;
pub mod transform;

pub use bbox::BoundingBox;
pub use transform::Transform;
