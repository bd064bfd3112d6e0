use serde::{Deserialize, Serialize};

/// BlazePose の 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    const ALL: [PoseLandmark; 33] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 相対深度。描画・角度計算では使わない
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// 推論モード。スケールの合わせ方が変わる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningMode {
    #[default]
    Image,
    Video,
    LiveStream,
}

/// 1回の検出結果
///
/// 画像サイズはピクセル単位。ランドマークは検出器が返した順序のまま保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub landmarks: Vec<Landmark>,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(default)]
    pub mode: RunningMode,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>, image_width: u32, image_height: u32, mode: RunningMode) -> Self {
        Self {
            landmarks,
            image_width,
            image_height,
            mode,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_landmark_count() {
        assert_eq!(PoseLandmark::COUNT, 33);
        assert_eq!(PoseLandmark::RightFootIndex.index(), 32);
    }

    #[test]
    fn test_pose_landmark_from_index() {
        assert_eq!(PoseLandmark::from_index(0), Some(PoseLandmark::Nose));
        assert_eq!(PoseLandmark::from_index(26), Some(PoseLandmark::RightKnee));
        assert_eq!(PoseLandmark::from_index(33), None);
    }

    #[test]
    fn test_from_index_roundtrips_discriminant() {
        for i in 0..PoseLandmark::COUNT {
            assert_eq!(PoseLandmark::from_index(i).map(PoseLandmark::index), Some(i));
        }
    }

    #[test]
    fn test_frame_is_empty() {
        let frame = LandmarkFrame::new(vec![Landmark::new(0.5, 0.5)], 640, 480, RunningMode::Video);
        assert!(!frame.is_empty());
        assert!(LandmarkFrame::new(Vec::new(), 640, 480, RunningMode::Video).is_empty());
    }

    #[test]
    fn test_frame_deserialize_defaults() {
        let json = r#"{"landmarks":[{"x":0.25,"y":0.75}],"image_width":640,"image_height":480}"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.mode, RunningMode::Image);
        assert_eq!(frame.landmarks[0], Landmark::new(0.25, 0.75));
    }

    #[test]
    fn test_running_mode_snake_case() {
        let mode: RunningMode = serde_json::from_str("\"live_stream\"").unwrap();
        assert_eq!(mode, RunningMode::LiveStream);
    }
}
