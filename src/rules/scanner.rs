use crate::rules::ruleset::{RuleCategory, RuleSet};

/// A found occurrence of a rule key.
///
/// `index` is a byte offset into the scanned text. The key borrows from the
/// rule set that produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'r> {
    pub index: usize,
    pub key: &'r str,
}

impl<'r> Occurrence<'r> {
    /// Byte offset one past the matched span.
    pub fn end(&self) -> usize {
        self.index + self.key.len()
    }
}

/// Find the nearest flaggable occurrence at or after `from`.
///
/// Every replacement key is searched and the leftmost match wins; when two
/// keys match at the same index, the one defined first in the document wins.
/// Correct-term matches are invisible: the search resumes just past them
/// instead of stopping. `from` may be any byte offset; it is clamped to the
/// text and snapped forward to a character boundary.
pub fn find_next<'r>(rules: &'r RuleSet, text: &str, from: usize) -> Option<Occurrence<'r>> {
    let mut scan_from = ceil_char_boundary(text, from);

    loop {
        let mut best: Option<(Occurrence<'r>, RuleCategory)> = None;
        for (key, rule) in rules.iter() {
            if key.is_empty() {
                continue;
            }
            if let Some(pos) = text[scan_from..].find(key) {
                let index = scan_from + pos;
                if best.map_or(true, |(b, _)| index < b.index) {
                    best = Some((Occurrence { index, key }, rule.category));
                }
            }
        }

        match best {
            None => return None,
            Some((occ, RuleCategory::Correct)) => scan_from = occ.end(),
            Some((occ, RuleCategory::Replace)) => return Some(occ),
        }
    }
}

/// Find the nearest flaggable occurrence that starts strictly before `upto`,
/// searching backward. A match may extend past `upto`; only its start is
/// bounded. Correct-term matches pull the bound down to their own start and
/// the search repeats. Ties resolve like [`find_next`].
pub fn find_prev<'r>(rules: &'r RuleSet, text: &str, upto: usize) -> Option<Occurrence<'r>> {
    let mut scan_upto = ceil_char_boundary(text, upto);

    loop {
        let mut best: Option<(Occurrence<'r>, RuleCategory)> = None;
        for (key, rule) in rules.iter() {
            if key.is_empty() {
                continue;
            }
            if let Some(index) = rfind_before(text, key, scan_upto) {
                if best.map_or(true, |(b, _)| index > b.index) {
                    best = Some((Occurrence { index, key }, rule.category));
                }
            }
        }

        match best {
            None => return None,
            Some((occ, RuleCategory::Correct)) => scan_upto = occ.index,
            Some((occ, RuleCategory::Replace)) => return Some(occ),
        }
    }
}

/// All flaggable occurrences in order, each search resuming at the end of
/// the previous match. Matches never overlap.
pub fn occurrences<'r, 't>(rules: &'r RuleSet, text: &'t str) -> Occurrences<'r, 't> {
    Occurrences {
        rules,
        text,
        cursor: 0,
    }
}

pub struct Occurrences<'r, 't> {
    rules: &'r RuleSet,
    text: &'t str,
    cursor: usize,
}

impl<'r, 't> Iterator for Occurrences<'r, 't> {
    type Item = Occurrence<'r>;

    fn next(&mut self) -> Option<Occurrence<'r>> {
        let occ = find_next(self.rules, self.text, self.cursor)?;
        self.cursor = occ.end();
        Some(occ)
    }
}

/// Rightmost start of `needle` strictly below `limit`.
fn rfind_before(text: &str, needle: &str, limit: usize) -> Option<usize> {
    let mut found = None;
    for (index, _) in text.match_indices(needle) {
        if index >= limit {
            break;
        }
        found = Some(index);
    }
    found
}

/// Clamp `index` to the text and snap it forward to a character boundary.
fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
