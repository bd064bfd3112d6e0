use log::{debug, trace};
use serde::Serialize;

use crate::pose::{angle_at, LandmarkFrame};

use super::rule::{JointRule, RuleSet};

/// 1ルール分の評価結果 (フレームごとに再計算)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// ルールセット内での位置
    pub rule_index: usize,
    pub rule: JointRule,
    /// 計測角度 (度)
    pub angle: f32,
    /// |angle - expected|
    pub deviation: f32,
    pub within_tolerance: bool,
}

impl EvaluationResult {
    pub fn from_measurement(rule_index: usize, rule: JointRule, angle: f32) -> Self {
        let deviation = (angle - rule.expected_angle()).abs();
        Self {
            rule_index,
            rule,
            angle,
            deviation,
            within_tolerance: deviation <= rule.tolerance(),
        }
    }

    /// 許容範囲に対する逸脱の割合 (0.0〜1.0 に飽和)
    pub fn deviation_fraction(&self) -> f32 {
        (self.deviation / self.rule.tolerance()).clamp(0.0, 1.0)
    }
}

/// フレーム内の全ルールを評価する
///
/// 結果の順序はルールの順序と同じ。ランドマークが足りないルールは
/// 結果から除外される (0度扱いにはしない)。
pub fn evaluate(frame: &LandmarkFrame, rules: &RuleSet) -> Vec<EvaluationResult> {
    rules
        .rules()
        .iter()
        .enumerate()
        .filter_map(|(i, rule)| {
            match angle_at(&frame.landmarks, rule.vertex(), rule.joint_a(), rule.joint_b()) {
                Ok(angle) => {
                    let result = EvaluationResult::from_measurement(i, *rule, angle);
                    trace!(
                        "rule #{} {:?}: angle {:.1}, deviation {:.1}, within {}",
                        i,
                        rule.joints(),
                        result.angle,
                        result.deviation,
                        result.within_tolerance
                    );
                    Some(result)
                }
                Err(e) => {
                    debug!("skipping rule #{} {:?}: {}", i, rule.joints(), e);
                    None
                }
            }
        })
        .collect()
}
