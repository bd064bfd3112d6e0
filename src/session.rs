use crate::config::OverlayConfig;
use crate::error::OverlayResult;
use crate::pose::{LandmarkFrame, Topology};
use crate::render::{frame_transform, DrawPlan, OverlayRenderer, ScaleTransform, Size};
use crate::rules::ActiveRules;

/// 1セッション分のオーバーレイ状態
///
/// フレームをまたいで保持するのは、現在のルールセット (差し替えは
/// `ActiveRules` 経由で丸ごと) と最後に成功したスケールだけ。
pub struct OverlaySession {
    renderer: OverlayRenderer,
    topology: Topology,
    rules: ActiveRules,
    last_transform: Option<ScaleTransform>,
}

impl OverlaySession {
    pub fn new(config: &OverlayConfig, topology: Topology, rules: ActiveRules) -> OverlayResult<Self> {
        config.validate()?;
        Ok(Self {
            renderer: OverlayRenderer::from_config(config),
            topology,
            rules,
            last_transform: None,
        })
    }

    pub fn last_transform(&self) -> Option<&ScaleTransform> {
        self.last_transform.as_ref()
    }

    /// 最新のルールスナップショットで1フレーム分の描画計画を作る
    pub fn render(&mut self, frame: &LandmarkFrame, viewport: Size) -> DrawPlan {
        let snapshot = self.rules.snapshot();

        let Some(transform) = frame_transform(frame, viewport) else {
            return DrawPlan {
                generation: snapshot.generation,
                ..DrawPlan::empty()
            };
        };
        self.last_transform = Some(transform);

        let mut plan = self
            .renderer
            .build_with_transform(frame, &snapshot.rules, &self.topology, &transform);
        plan.generation = snapshot.generation;
        plan
    }

    /// 結果表示をリセット
    pub fn clear(&mut self) {
        self.last_transform = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, RunningMode};
    use crate::render::Color;
    use crate::rules::{JointRule, RuleSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn frame() -> LandmarkFrame {
        LandmarkFrame::new(
            vec![
                Landmark::new(0.0, 0.0),
                Landmark::new(1.0, 0.0),
                Landmark::new(0.0, 1.0),
            ],
            640,
            480,
            RunningMode::LiveStream,
        )
    }

    fn topology() -> Topology {
        Topology::new(3, vec![(0, 1), (0, 2)])
    }

    fn set(expected: f32, count: usize) -> RuleSet {
        let rule = JointRule::from_triple(1, 0, 2, expected, 30.0).unwrap();
        RuleSet::new(None, vec![rule; count])
    }

    #[test]
    fn test_rejects_malformed_config() {
        let config = OverlayConfig {
            tolerance: -1.0,
            ..OverlayConfig::default()
        };
        assert!(OverlaySession::new(&config, topology(), ActiveRules::default()).is_err());
    }

    #[test]
    fn test_render_uses_latest_rules() {
        let active = ActiveRules::new(set(90.0, 1));
        let mut session = OverlaySession::new(&OverlayConfig::default(), topology(), active.clone()).unwrap();

        let plan = session.render(&frame(), Size::new(1280.0, 720.0));
        assert_eq!(plan.generation, 0);
        assert_eq!(plan.lines[0].color, Color::GREEN);

        active.publish(set(60.0, 1));
        let plan = session.render(&frame(), Size::new(1280.0, 720.0));
        assert_eq!(plan.generation, 1);
        assert_eq!(plan.lines[0].color, Color::RED);
    }

    #[test]
    fn test_live_stream_uses_cover_scale() {
        let mut session =
            OverlaySession::new(&OverlayConfig::default(), topology(), ActiveRules::default()).unwrap();
        session.render(&frame(), Size::new(1280.0, 1440.0));
        let scale = session.last_transform().unwrap().scale();
        assert!((scale - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_viewport_keeps_last_transform() {
        let mut session =
            OverlaySession::new(&OverlayConfig::default(), topology(), ActiveRules::default()).unwrap();
        session.render(&frame(), Size::new(640.0, 480.0));
        let before = *session.last_transform().unwrap();

        let plan = session.render(&frame(), Size::new(0.0, 480.0));
        assert!(plan.is_empty());
        assert_eq!(session.last_transform(), Some(&before));

        session.clear();
        assert!(session.last_transform().is_none());
    }

    #[test]
    fn test_replacement_never_mixes_rule_sets() {
        // 偶数世代は 90度×2、奇数世代は 120度×3
        let active = ActiveRules::new(set(90.0, 2));
        let mut session = OverlaySession::new(&OverlayConfig::default(), topology(), active.clone()).unwrap();

        let stop = Arc::new(AtomicBool::new(false));
        let producer = {
            let active = active.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                let mut n = 0u32;
                while !stop.load(Ordering::Relaxed) {
                    n += 1;
                    if n % 2 == 1 {
                        active.publish(set(120.0, 3));
                    } else {
                        active.publish(set(90.0, 2));
                    }
                }
            })
        };

        for _ in 0..2000 {
            let plan = session.render(&frame(), Size::new(640.0, 480.0));
            let expected: Vec<f32> = plan
                .evaluations
                .iter()
                .map(|e| e.rule.expected_angle())
                .collect();
            if plan.generation % 2 == 0 {
                assert_eq!(expected, vec![90.0; 2]);
            } else {
                assert_eq!(expected, vec![120.0; 3]);
            }
        }

        stop.store(true, Ordering::Relaxed);
        producer.join().unwrap();
    }
}
