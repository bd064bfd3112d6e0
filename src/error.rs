use thiserror::Error;

/// オーバーレイ処理のエラー
///
/// フレーム単位のエラー (`InvalidJointIndex`, `DegenerateViewport`) は
/// レンダラー内部で握りつぶされ、呼び出し側には設定時のエラーだけが届く。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    #[error("joint index {index} is out of range ({available} landmarks available)")]
    InvalidJointIndex { index: usize, available: usize },

    #[error(
        "degenerate viewport: image {image_width}x{image_height}, viewport {viewport_width}x{viewport_height}"
    )]
    DegenerateViewport {
        image_width: f32,
        image_height: f32,
        viewport_width: f32,
        viewport_height: f32,
    },

    #[error("malformed rule configuration: {0}")]
    MalformedRuleConfiguration(String),
}

pub type OverlayResult<T> = std::result::Result<T, OverlayError>;
