use std::collections::HashMap;

/// How a rule key is treated when it is found in checked text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    /// The key is already correct. The scanner never stops on it and
    /// `correction_for` hands the key back unchanged.
    Correct,
    /// The key should be flagged and replaced with the rule's value.
    Replace,
}

/// One parsed rule: the replacement text and its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub value: String,
    pub category: RuleCategory,
}

/// A parsed rule document.
///
/// Keys iterate in first-insertion order. Redefining a key updates its rule
/// but keeps its original position, so the scanner's same-index tie-break
/// stays stable when a document overrides an earlier definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: HashMap<String, Rule>,
    order: Vec<String>,
    source: String,
}

impl RuleSet {
    /// Parse a rule document. Parsing never fails: lines that do not define
    /// a rule are skipped.
    ///
    /// Each line is trimmed first. Blank lines and lines starting with `'`
    /// are comments. A line starting with `[correct]` opens a correct-term
    /// section and any other `[` line a replacement section; definitions
    /// before the first marker are replacements. Everything else is
    /// `key=value`, where empty `=`-separated tokens are dropped and tokens
    /// past the second are ignored.
    pub fn parse(text: &str) -> Self {
        let mut set = RuleSet {
            source: text.to_string(),
            ..RuleSet::default()
        };

        let mut category = RuleCategory::Replace;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('\'') {
                continue;
            }
            if line.starts_with('[') {
                category = if line.starts_with("[correct]") {
                    RuleCategory::Correct
                } else {
                    RuleCategory::Replace
                };
                continue;
            }

            let mut tokens = line.split('=').filter(|t| !t.is_empty());
            let key = match tokens.next() {
                Some(key) => key,
                None => continue,
            };
            let value = tokens.next().unwrap_or("");
            set.insert(
                key.to_string(),
                Rule {
                    value: value.to_string(),
                    category,
                },
            );
        }

        set
    }

    fn insert(&mut self, key: String, rule: Rule) {
        if !self.rules.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.rules.insert(key, rule);
    }

    /// The corrected form of `key`: the mapped value for replacement rules,
    /// the key itself for correct terms and for text no rule covers.
    pub fn correction_for<'a>(&'a self, key: &'a str) -> &'a str {
        match self.rules.get(key) {
            Some(rule) if rule.category == RuleCategory::Replace => &rule.value,
            _ => key,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Rules in first-insertion order. The scanner resolves same-index ties
    /// in favor of the earliest key here.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.order.iter().map(move |key| (key.as_str(), &self.rules[key]))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The raw document text this set was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Overlay `other` onto this set. Shared keys take the other rule while
    /// keeping their original position; new keys are appended after the
    /// existing ones.
    pub fn merge(&mut self, mut other: RuleSet) {
        for key in other.order.drain(..) {
            if let Some(rule) = other.rules.remove(&key) {
                self.insert(key, rule);
            }
        }
        if !other.source.is_empty() {
            if !self.source.is_empty() {
                self.source.push('\n');
            }
            self.source.push_str(&other.source);
        }
    }

    /// Keep only the rules for which `keep` returns true. Surviving keys
    /// keep their relative order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Rule) -> bool) {
        let rules = &mut self.rules;
        self.order.retain(|key| {
            let kept = keep(key, &rules[key]);
            if !kept {
                rules.remove(key);
            }
            kept
        });
    }
}
