pub mod checker;
pub mod cli;
pub mod config;
pub mod format;
pub mod rules;
pub mod session;
pub mod timecode;

pub use checker::Proofreader;
pub use config::Config;
pub use rules::{Rule, RuleCategory, RuleSet};
pub use session::ReviewSession;
pub use timecode::Timecode;

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub flagged_count: usize,
    pub fixed_count: usize,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub key: String,
    pub replacement: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
    /// Byte span of the matched key within `context`.
    pub context_span: (usize, usize),
}
