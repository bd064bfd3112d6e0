pub mod angle;
pub mod landmark;
pub mod topology;

pub use angle::{angle_at, interior_angle};
pub use landmark::{Landmark, LandmarkFrame, PoseLandmark, RunningMode};
pub use topology::{Topology, POSE_CONNECTIONS};
