pub mod color;
pub mod geometry;
pub mod ids;

pub use color::Color;
pub use geometry::{EPSILON, Point, Rect, Size};
pub use ids::NodeId;
