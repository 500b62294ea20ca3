use nalgebra::Vector3;

pub mod misc;
pub mod progress;

/// Absolute tool position in millimeters.
pub type Pos = Vector3<f64>;
