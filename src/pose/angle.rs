//! 関節角度の計算
//!
//! 頂点から見た2本の光線 (vertex→a, vertex→b) の方位角の差を取り、
//! 0〜180度に折り返す。a と b を入れ替えても同じ値になる。

use crate::error::{OverlayError, OverlayResult};

use super::landmark::Landmark;

/// 頂点 `vertex` における内角 (度, 0.0〜180.0)
pub fn interior_angle(vertex: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let bearing_a = (a.1 - vertex.1).atan2(a.0 - vertex.0);
    let bearing_b = (b.1 - vertex.1).atan2(b.0 - vertex.0);

    let normalized = (bearing_b - bearing_a).to_degrees().abs() % 360.0;
    if normalized > 180.0 {
        360.0 - normalized
    } else {
        normalized
    }
}

/// ランドマーク列からインデックス指定で内角を求める
///
/// どれかのインデックスが範囲外なら `InvalidJointIndex`。
pub fn angle_at(landmarks: &[Landmark], vertex: usize, a: usize, b: usize) -> OverlayResult<f32> {
    let lookup = |index: usize| {
        landmarks
            .get(index)
            .map(|lm| (lm.x, lm.y))
            .ok_or(OverlayError::InvalidJointIndex {
                index,
                available: landmarks.len(),
            })
    };

    Ok(interior_angle(lookup(vertex)?, lookup(a)?, lookup(b)?))
}
