use std::borrow::Cow;

use super::landmark::PoseLandmark::{self, *};

/// BlazePose の骨格接続 (開始ランドマーク, 終了ランドマーク)
pub const POSE_CONNECTIONS: [(PoseLandmark, PoseLandmark); 35] = [
    // 顔
    (Nose, LeftEyeInner),
    (LeftEyeInner, LeftEye),
    (LeftEye, LeftEyeOuter),
    (LeftEyeOuter, LeftEar),
    (Nose, RightEyeInner),
    (RightEyeInner, RightEye),
    (RightEye, RightEyeOuter),
    (RightEyeOuter, RightEar),
    (MouthLeft, MouthRight),
    // 上半身
    (LeftShoulder, RightShoulder),
    (LeftShoulder, LeftElbow),
    (LeftElbow, LeftWrist),
    (LeftWrist, LeftPinky),
    (LeftWrist, LeftIndex),
    (LeftWrist, LeftThumb),
    (LeftPinky, LeftIndex),
    (RightShoulder, RightElbow),
    (RightElbow, RightWrist),
    (RightWrist, RightPinky),
    (RightWrist, RightIndex),
    (RightWrist, RightThumb),
    (RightPinky, RightIndex),
    // 胴体
    (LeftShoulder, LeftHip),
    (RightShoulder, RightHip),
    (LeftHip, RightHip),
    // 下半身
    (LeftHip, LeftKnee),
    (RightHip, RightKnee),
    (LeftKnee, LeftAnkle),
    (RightKnee, RightAnkle),
    (LeftAnkle, LeftHeel),
    (RightAnkle, RightHeel),
    (LeftHeel, LeftFootIndex),
    (RightHeel, RightFootIndex),
    (LeftAnkle, LeftFootIndex),
    (RightAnkle, RightFootIndex),
];

/// ランドマーク数と骨格接続の定義
///
/// 検出モデル側が決めるもの。BlazePose 以外のモデルでも使えるよう
/// インデックスの組で持つ。
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    landmark_count: usize,
    connections: Cow<'static, [(usize, usize)]>,
}

const BLAZE_POSE_EDGES: [(usize, usize); 35] = {
    let mut edges = [(0usize, 0usize); 35];
    let mut i = 0;
    while i < POSE_CONNECTIONS.len() {
        edges[i] = (POSE_CONNECTIONS[i].0 as usize, POSE_CONNECTIONS[i].1 as usize);
        i += 1;
    }
    edges
};

impl Topology {
    pub fn new(landmark_count: usize, connections: Vec<(usize, usize)>) -> Self {
        Self {
            landmark_count,
            connections: Cow::Owned(connections),
        }
    }

    /// BlazePose 33点トポロジー
    pub fn blaze_pose() -> Self {
        Self {
            landmark_count: PoseLandmark::COUNT,
            connections: Cow::Borrowed(&BLAZE_POSE_EDGES[..]),
        }
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    pub fn connections(&self) -> &[(usize, usize)] {
        &self.connections
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.landmark_count
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::blaze_pose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blaze_pose_edges_match_connections() {
        let topology = Topology::blaze_pose();
        assert_eq!(topology.landmark_count(), 33);
        assert_eq!(topology.connections().len(), POSE_CONNECTIONS.len());
        assert_eq!(topology.connections()[0], (0, 1));
        assert!(topology.connections().contains(&(24, 26)));
        assert!(topology.connections().contains(&(26, 28)));
    }

    #[test]
    fn test_all_edges_in_range() {
        let topology = Topology::blaze_pose();
        for &(a, b) in topology.connections() {
            assert!(topology.contains(a) && topology.contains(b), "({}, {})", a, b);
        }
    }

    #[test]
    fn test_custom_topology() {
        let topology = Topology::new(3, vec![(0, 1), (1, 2)]);
        assert!(topology.contains(2));
        assert!(!topology.contains(3));
        assert_eq!(topology.connections(), &[(0, 1), (1, 2)]);
    }
}
