pub mod criteria;
pub mod dates;
pub mod engine;
pub mod rules;

pub use engine::{breakdown_at, score, score_at, Criterion, CriterionScore, ScoreBreakdown};
pub use rules::{Band, Matcher, Rule, RuleTable, TextMatch};
