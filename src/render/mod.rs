pub mod color;
pub mod mapper;
pub mod plan;
pub mod raster;
#[cfg(feature = "viewer")]
pub mod window;

pub use color::{Color, DeviationColorizer};
pub use mapper::{FitMode, ScaleTransform, ScreenPoint, Size};
pub use plan::{frame_transform, DrawPlan, LineSegment, OverlayRenderer, PointMarker, Surface, TextLabel};
pub use raster::PixelCanvas;
#[cfg(feature = "viewer")]
pub use window::OverlayWindow;
