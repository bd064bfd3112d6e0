use serde::Serialize;

use crate::error::{OverlayError, OverlayResult};
use crate::pose::Topology;
use crate::technique::TechniqueKey;

/// 許容範囲のデフォルト (度)
pub const DEFAULT_TOLERANCE: f32 = 30.0;

/// 1つの関節角度ルール
///
/// `vertex` での `joint_a`–`vertex`–`joint_b` の内角を `expected_angle` と比べる。
/// 生成時に検証済みなので、保持している値は常に有効。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointRule {
    vertex: usize,
    joint_a: usize,
    joint_b: usize,
    expected_angle: f32,
    tolerance: f32,
}

impl JointRule {
    pub fn new(
        vertex: usize,
        joint_a: usize,
        joint_b: usize,
        expected_angle: f32,
        tolerance: f32,
    ) -> OverlayResult<Self> {
        if !(0.0..=180.0).contains(&expected_angle) {
            return Err(OverlayError::MalformedRuleConfiguration(format!(
                "expected angle {} is outside [0, 180]",
                expected_angle
            )));
        }
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(OverlayError::MalformedRuleConfiguration(format!(
                "tolerance must be a positive number of degrees, got {}",
                tolerance
            )));
        }

        Ok(Self {
            vertex,
            joint_a,
            joint_b,
            expected_angle,
            tolerance,
        })
    }

    /// カタログ形式 `(joint1, joint2, joint3, expected)` から生成。中央が頂点
    pub fn from_triple(
        joint1: usize,
        joint2: usize,
        joint3: usize,
        expected_angle: f32,
        tolerance: f32,
    ) -> OverlayResult<Self> {
        Self::new(joint2, joint1, joint3, expected_angle, tolerance)
    }

    pub fn vertex(&self) -> usize {
        self.vertex
    }

    pub fn joint_a(&self) -> usize {
        self.joint_a
    }

    pub fn joint_b(&self) -> usize {
        self.joint_b
    }

    pub fn expected_angle(&self) -> f32 {
        self.expected_angle
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn joints(&self) -> [usize; 3] {
        [self.joint_a, self.vertex, self.joint_b]
    }

    /// 接続 (start, end) がこのルールの3関節のうち2つを結んでいるか
    pub fn governs(&self, start: usize, end: usize) -> bool {
        let joints = self.joints();
        start != end && joints.contains(&start) && joints.contains(&end)
    }

    /// トポロジーに存在しない関節を参照していればエラー
    pub fn validate_against(&self, topology: &Topology) -> OverlayResult<()> {
        match self.joints().into_iter().find(|&j| !topology.contains(j)) {
            Some(joint) => Err(OverlayError::MalformedRuleConfiguration(format!(
                "joint {} is not part of a topology with {} landmarks",
                joint,
                topology.landmark_count()
            ))),
            None => Ok(()),
        }
    }
}

/// 1つの技術に対するルール一式。差し替えは丸ごと行う
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    key: Option<TechniqueKey>,
    rules: Vec<JointRule>,
}

impl RuleSet {
    pub fn new(key: Option<TechniqueKey>, rules: Vec<JointRule>) -> Self {
        Self { key, rules }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&TechniqueKey> {
        self.key.as_ref()
    }

    pub fn rules(&self) -> &[JointRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate_against(&self, topology: &Topology) -> OverlayResult<()> {
        self.rules.iter().try_for_each(|rule| rule.validate_against(topology))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triple_uses_middle_as_vertex() {
        let rule = JointRule::from_triple(24, 26, 28, 90.0, 30.0).unwrap();
        assert_eq!(rule.vertex(), 26);
        assert_eq!(rule.joint_a(), 24);
        assert_eq!(rule.joint_b(), 28);
        assert_eq!(rule.joints(), [24, 26, 28]);
    }

    #[test]
    fn test_rejects_non_positive_tolerance() {
        assert!(matches!(
            JointRule::new(1, 0, 2, 90.0, 0.0),
            Err(OverlayError::MalformedRuleConfiguration(_))
        ));
        assert!(JointRule::new(1, 0, 2, 90.0, -5.0).is_err());
        assert!(JointRule::new(1, 0, 2, 90.0, f32::NAN).is_err());
    }

    #[test]
    fn test_rejects_expected_angle_out_of_range() {
        assert!(JointRule::new(1, 0, 2, 181.0, 30.0).is_err());
        assert!(JointRule::new(1, 0, 2, -1.0, 30.0).is_err());
        assert!(JointRule::new(1, 0, 2, f32::NAN, 30.0).is_err());
        assert!(JointRule::new(1, 0, 2, 0.0, 30.0).is_ok());
        assert!(JointRule::new(1, 0, 2, 180.0, 30.0).is_ok());
    }

    #[test]
    fn test_governs_any_pair_of_its_joints() {
        let rule = JointRule::from_triple(24, 26, 28, 90.0, 30.0).unwrap();
        assert!(rule.governs(24, 26));
        assert!(rule.governs(26, 28));
        assert!(rule.governs(28, 26));
        assert!(rule.governs(28, 24));
        assert!(!rule.governs(23, 25));
        assert!(!rule.governs(26, 26));
    }

    #[test]
    fn test_validate_against_topology() {
        let topology = Topology::new(3, vec![(0, 1), (1, 2)]);
        let ok = RuleSet::new(None, vec![JointRule::new(1, 0, 2, 90.0, 30.0).unwrap()]);
        assert!(ok.validate_against(&topology).is_ok());

        let bad = RuleSet::new(None, vec![JointRule::new(1, 0, 7, 90.0, 30.0).unwrap()]);
        assert!(matches!(
            bad.validate_against(&topology),
            Err(OverlayError::MalformedRuleConfiguration(_))
        ));
    }
}
