//! Cameras, projection strategies and view frusta

mod camera;
mod frustum;
mod projection;

pub use camera::Camera;
pub use frustum::{Frustum, FrustumSide, Plane};
pub use projection::{Projection, Viewport};
