use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};
use crate::pose::{Landmark, RunningMode};

/// 画像をビューポートに合わせる方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// 全体が収まるように縮小 (静止画・録画)
    Contain,
    /// ビューポートを埋めるように拡大 (ライブプレビューの FILL_START に合わせる)
    Cover,
}

impl From<RunningMode> for FitMode {
    fn from(mode: RunningMode) -> Self {
        match mode {
            RunningMode::Image | RunningMode::Video => FitMode::Contain,
            RunningMode::LiveStream => FitMode::Cover,
        }
    }
}

/// ピクセル単位のサイズ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// スクリーン座標 (ピクセル)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

/// 正規化座標 → スクリーン座標の一様スケール
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTransform {
    image: Size,
    scale: f32,
}

impl ScaleTransform {
    /// 画像サイズかビューポートサイズが 0 以下なら `DegenerateViewport`
    pub fn new(image: Size, viewport: Size, fit: FitMode) -> OverlayResult<Self> {
        if !image.is_positive() || !viewport.is_positive() {
            return Err(OverlayError::DegenerateViewport {
                image_width: image.width,
                image_height: image.height,
                viewport_width: viewport.width,
                viewport_height: viewport.height,
            });
        }

        let sx = viewport.width / image.width;
        let sy = viewport.height / image.height;
        let scale = match fit {
            FitMode::Contain => sx.min(sy),
            FitMode::Cover => sx.max(sy),
        };

        Ok(Self { image, scale })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn map(&self, landmark: &Landmark) -> ScreenPoint {
        ScreenPoint {
            x: landmark.x * self.image.width * self.scale,
            y: landmark.y * self.image.height * self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_contain_uses_min_ratio() {
        let t = ScaleTransform::new(Size::new(640.0, 480.0), Size::new(1280.0, 1440.0), FitMode::Contain)
            .unwrap();
        assert!(approx_eq(t.scale(), 2.0));
    }

    #[test]
    fn test_cover_uses_max_ratio() {
        let t = ScaleTransform::new(Size::new(640.0, 480.0), Size::new(1280.0, 1440.0), FitMode::Cover)
            .unwrap();
        assert!(approx_eq(t.scale(), 3.0));
    }

    #[test]
    fn test_map_landmark() {
        let t = ScaleTransform::new(Size::new(640.0, 480.0), Size::new(320.0, 240.0), FitMode::Contain)
            .unwrap();
        let p = t.map(&Landmark::new(0.5, 0.25));
        assert!(approx_eq(p.x, 160.0));
        assert!(approx_eq(p.y, 60.0));
    }

    #[test]
    fn test_fit_mode_from_running_mode() {
        assert_eq!(FitMode::from(RunningMode::Image), FitMode::Contain);
        assert_eq!(FitMode::from(RunningMode::Video), FitMode::Contain);
        assert_eq!(FitMode::from(RunningMode::LiveStream), FitMode::Cover);
    }

    #[test]
    fn test_degenerate_sizes() {
        let image = Size::new(640.0, 480.0);
        for viewport in [Size::new(0.0, 480.0), Size::new(640.0, 0.0), Size::new(-1.0, 10.0)] {
            assert!(matches!(
                ScaleTransform::new(image, viewport, FitMode::Contain),
                Err(OverlayError::DegenerateViewport { .. })
            ));
        }
        assert!(ScaleTransform::new(Size::new(0.0, 0.0), Size::new(640.0, 480.0), FitMode::Cover).is_err());
        assert!(ScaleTransform::new(image, Size::new(f32::NAN, 480.0), FitMode::Cover).is_err());
    }
}
