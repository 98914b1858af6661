use crate::rules::{scanner, RuleSet};

/// The span most recently located or produced by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub index: usize,
    pub text: String,
}

impl Found {
    pub fn end(&self) -> usize {
        self.index + self.text.len()
    }
}

/// One applied correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub index: usize,
    pub old: String,
    pub new: String,
}

/// A find/replace pass over one body of text.
///
/// The session owns the text, the scan cursor and the last-found span; the
/// rule set is only read. Forward finds park the cursor at the end of the
/// match and backward finds at its start, so repeated calls walk the text
/// the way find-next and find-previous do in an editor.
pub struct ReviewSession<'r> {
    rules: &'r RuleSet,
    text: String,
    cursor: usize,
    found: Option<Found>,
}

impl<'r> ReviewSession<'r> {
    pub fn new(rules: &'r RuleSet, text: impl Into<String>) -> Self {
        ReviewSession {
            rules,
            text: text.into(),
            cursor: 0,
            found: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the scan cursor. Out-of-range positions are clamped by the next
    /// find rather than rejected here.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn last_found(&self) -> Option<&Found> {
        self.found.as_ref()
    }

    /// Forget the last-found span. Corrections need a find first again.
    pub fn clear_found(&mut self) {
        self.found = None;
    }

    /// Find the next flagged occurrence at or after the cursor and remember
    /// it as the last-found span. The cursor moves to the end of the match.
    pub fn find_next(&mut self) -> Option<Found> {
        let occ = scanner::find_next(self.rules, &self.text, self.cursor)?;
        self.cursor = occ.end();
        let found = Found {
            index: occ.index,
            text: occ.key.to_string(),
        };
        self.found = Some(found.clone());
        Some(found)
    }

    /// Find the nearest flagged occurrence before the cursor and remember
    /// it. The cursor moves to the start of the match.
    pub fn find_prev(&mut self) -> Option<Found> {
        let occ = scanner::find_prev(self.rules, &self.text, self.cursor)?;
        self.cursor = occ.index;
        let found = Found {
            index: occ.index,
            text: occ.key.to_string(),
        };
        self.found = Some(found.clone());
        Some(found)
    }

    /// Replace the last-found span with its correction. The replacement
    /// becomes the new last-found span and the cursor lands at its end, so
    /// the next forward find cannot re-report text the correction produced.
    ///
    /// Returns `None` when there is no last-found span.
    pub fn apply_correction(&mut self) -> Option<Applied> {
        let found = self.found.take()?;
        let new = self.rules.correction_for(&found.text).to_string();

        self.text.replace_range(found.index..found.end(), &new);
        self.cursor = found.index + new.len();
        self.found = Some(Found {
            index: found.index,
            text: new.clone(),
        });

        Some(Applied {
            index: found.index,
            old: found.text,
            new,
        })
    }

    /// Find and correct everything from the cursor onward. Returns the
    /// number of replacements made.
    pub fn apply_all(&mut self) -> usize {
        let mut applied = 0;
        while self.find_next().is_some() {
            if self.apply_correction().is_some() {
                applied += 1;
            }
        }
        applied
    }
}
