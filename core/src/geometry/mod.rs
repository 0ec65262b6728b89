pub mod transform;
pub mod vector;

pub use transform::{CoordinateTransform, DisplayPosition, DisplayUnit, EARTH_RADIUS_KM};
pub use vector::Vector3;
