pub mod config;
pub mod error;
pub mod pose;
pub mod render;
pub mod replay;
pub mod rules;
pub mod session;
pub mod technique;

pub use error::{OverlayError, OverlayResult};
pub use session::OverlaySession;
