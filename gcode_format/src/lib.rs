//! Reading of textual G-code: resolving linear moves into an ordered
//! waypoint sequence, and scanning slicer headers for print metadata. The
//! two halves are independent, the metadata scan works on the raw lines and
//! shares no state with the motion parser.

pub mod metadata;
pub mod motion;

pub use metadata::Summary;
pub use motion::{parse_waypoints, MotionState, Waypoint};
