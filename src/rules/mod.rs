pub mod active;
pub mod evaluator;
pub mod rule;

pub use active::{ActiveRules, RuleSnapshot};
pub use evaluator::{evaluate, EvaluationResult};
pub use rule::{JointRule, RuleSet, DEFAULT_TOLERANCE};
