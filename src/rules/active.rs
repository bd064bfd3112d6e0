use std::sync::{Arc, Mutex, PoisonError};

use log::info;

use super::rule::RuleSet;

/// ある時点で有効なルールセット
///
/// `generation` は publish のたびに増える。
#[derive(Debug, Clone)]
pub struct RuleSnapshot {
    pub generation: u64,
    pub rules: Arc<RuleSet>,
}

/// 現在のルールセットを共有するハンドル
///
/// 別スレッド (カタログ読み込みなど) から `publish` で丸ごと差し替え、
/// 描画側は `snapshot` で最新の一式を取得する。ロック中は Arc の付け替えしか
/// しないので、読み手が新旧の混ざった状態を見ることはない。
#[derive(Debug, Clone)]
pub struct ActiveRules {
    current: Arc<Mutex<RuleSnapshot>>,
}

impl ActiveRules {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: Arc::new(Mutex::new(RuleSnapshot {
                generation: 0,
                rules: Arc::new(rules),
            })),
        }
    }

    /// ルールセットを差し替え、新しい世代番号を返す
    pub fn publish(&self, rules: RuleSet) -> u64 {
        let rules = Arc::new(rules);
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = guard.generation + 1;
        info!(
            "publishing rule set {:?} ({} rules, generation {})",
            rules.key(),
            rules.len(),
            generation
        );
        *guard = RuleSnapshot { generation, rules };
        generation
    }

    pub fn snapshot(&self) -> RuleSnapshot {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ActiveRules {
    fn default() -> Self {
        Self::new(RuleSet::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::JointRule;

    #[test]
    fn test_initial_generation() {
        let active = ActiveRules::default();
        let snapshot = active.snapshot();
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.rules.is_empty());
    }

    #[test]
    fn test_publish_replaces_wholesale() {
        let active = ActiveRules::default();
        let before = active.snapshot();

        let rule = JointRule::from_triple(24, 26, 28, 90.0, 30.0).unwrap();
        let generation = active.publish(RuleSet::new(None, vec![rule, rule]));
        assert_eq!(generation, 1);

        let after = active.snapshot();
        assert_eq!(after.generation, 1);
        assert_eq!(after.rules.len(), 2);
        // 古いスナップショットは影響を受けない
        assert!(before.rules.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let active = ActiveRules::default();
        let producer = active.clone();
        let rule = JointRule::from_triple(23, 25, 27, 120.0, 30.0).unwrap();
        producer.publish(RuleSet::new(None, vec![rule]));
        assert_eq!(active.snapshot().rules.rules(), &[rule]);
    }
}
