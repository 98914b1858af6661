pub mod normalize;
pub mod remote;
pub mod ruleset;
pub mod scanner;

pub use ruleset::{Rule, RuleCategory, RuleSet};
pub use scanner::{find_next, find_prev, occurrences, Occurrence, Occurrences};
