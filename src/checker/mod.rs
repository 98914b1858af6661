use crate::cli::output::{self, Choice, OutputFormat};
use crate::format;
use crate::rules::{scanner, RuleCategory, RuleSet};
use crate::session::ReviewSession;
use crate::{CheckResult, Config, Finding};
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::mem;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

pub struct Proofreader {
    rules: RuleSet,
    context_window: usize,
}

impl Proofreader {
    pub fn new(config: &Config) -> Result<Self> {
        // Load main rule document
        let mut rules = match &config.rules {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read rule document: {}", path.display()))?;
                RuleSet::parse(&text)
            }
            None => RuleSet::default(),
        };

        // Merge personal rules over it; personal definitions win
        if let Some(path) = &config.personal_rules {
            if path.exists() {
                let text =
                    fs::read_to_string(path).context("Failed to read personal rules file")?;
                rules.merge(RuleSet::parse(&text));
            }
        }

        // Compile ignore patterns
        let mut ignore_patterns = Vec::new();
        for pattern in &config.ignore_keys {
            match Regex::new(pattern) {
                Ok(re) => ignore_patterns.push(re),
                Err(e) => eprintln!("Warning: Invalid regex pattern '{}': {}", pattern, e),
            }
        }

        // Drop ignored replacement keys up front so check, fix and session
        // views agree. Correct terms stay: dropping one would change what
        // the scanner skips.
        if !ignore_patterns.is_empty() {
            rules.retain(|key, rule| {
                rule.category == RuleCategory::Correct
                    || !ignore_patterns.iter().any(|re| re.is_match(key))
            });
        }

        if rules.is_empty() {
            eprintln!(
                "Warning: no rules loaded; run 'subchk rules fetch <url-or-doc-id> --save' to install a rule document"
            );
        }

        Ok(Self {
            rules,
            context_window: config.context_window,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn check(
        &self,
        file_path: &Path,
        colored: bool,
        format: &OutputFormat,
    ) -> Result<CheckResult> {
        let result = self.scan(file_path)?;
        output::print_findings(file_path, &result, colored, format);
        Ok(result)
    }

    /// Collect every flagged occurrence in the file without printing.
    pub fn scan(&self, file_path: &Path) -> Result<CheckResult> {
        let content = read(file_path)?;
        let doc = format::parse(file_path, &content)?;

        let mut findings = Vec::new();
        for unit in doc.units() {
            for occ in scanner::occurrences(&self.rules, unit.text) {
                let (line_delta, column) = format::line_col_at(unit.text, occ.index);
                let (context, context_span) =
                    context_around(unit.text, occ.index, occ.end(), self.context_window);

                findings.push(Finding {
                    key: occ.key.to_string(),
                    replacement: self.rules.correction_for(occ.key).to_string(),
                    line: unit.line + line_delta,
                    column: locate_column(unit.column, line_delta, column),
                    context,
                    context_span,
                });
            }
        }

        Ok(CheckResult {
            flagged_count: findings.len(),
            fixed_count: 0,
            findings,
        })
    }

    pub fn fix_auto(&self, file_path: &Path) -> Result<CheckResult> {
        let content = read(file_path)?;
        let mut doc = format::parse(file_path, &content)?;

        let mut fixed_count = 0;
        for field in doc.texts_mut() {
            let mut session = ReviewSession::new(&self.rules, mem::take(field));
            fixed_count += session.apply_all();
            *field = session.into_text();
        }

        // Write back to file
        if fixed_count > 0 {
            fs::write(file_path, doc.render())
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        Ok(CheckResult {
            flagged_count: 0,
            fixed_count,
            findings: Vec::new(),
        })
    }

    pub fn fix_interactive(
        &self,
        file_path: &Path,
        config: &Config,
        colored: bool,
    ) -> Result<CheckResult> {
        let content = read(file_path)?;
        let mut doc = format::parse(file_path, &content)?;

        // units() and texts_mut() enumerate the same fields in the same
        // order, so the origins can be captured before mutation starts.
        let origins: Vec<(usize, usize)> = doc.units().iter().map(|u| (u.line, u.column)).collect();

        let mut fixed_count = 0;
        let mut keys_to_add: Vec<String> = Vec::new();
        let mut quit = false;

        for (field, (line, column)) in doc.texts_mut().into_iter().zip(origins) {
            if quit {
                break;
            }

            let mut session = ReviewSession::new(&self.rules, mem::take(field));
            while let Some(found) = session.find_next() {
                // Already marked correct earlier in this run
                if keys_to_add.iter().any(|key| key == &found.text) {
                    continue;
                }

                let (context, span) =
                    context_around(session.text(), found.index, found.end(), self.context_window);
                let (line_delta, col) = format::line_col_at(session.text(), found.index);

                match output::print_interactive_prompt(
                    &found.text,
                    self.rules.correction_for(&found.text),
                    &context,
                    span,
                    line + line_delta,
                    locate_column(column, line_delta, col),
                    colored,
                ) {
                    Choice::Apply => {
                        if session.apply_correction().is_some() {
                            fixed_count += 1;
                        }
                    }
                    Choice::Skip => {}
                    Choice::AddCorrect => keys_to_add.push(found.text.clone()),
                    Choice::Quit => {
                        quit = true;
                        break;
                    }
                }
            }
            *field = session.into_text();
        }

        // Write back to file
        if fixed_count > 0 {
            fs::write(file_path, doc.render())
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        // Record accepted keys as correct terms in the personal rules file
        if !keys_to_add.is_empty() {
            if let Some(personal_path) = &config.personal_rules {
                let mut rules_text = if personal_path.exists() {
                    fs::read_to_string(personal_path)?
                } else {
                    String::new()
                };

                if !rules_text.is_empty() && !rules_text.ends_with('\n') {
                    rules_text.push('\n');
                }
                rules_text.push_str("[correct]\n");
                for key in keys_to_add {
                    rules_text.push_str(&key);
                    rules_text.push('\n');
                }

                fs::write(personal_path, rules_text)?;
            }
        }

        Ok(CheckResult {
            flagged_count: 0,
            fixed_count,
            findings: Vec::new(),
        })
    }
}

fn read(file_path: &Path) -> Result<String> {
    fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read file: {}", file_path.display()))
}

/// File column of a match: on the unit's first line positions shift by the
/// unit's own column origin, below it they are absolute.
fn locate_column(unit_column: usize, line_delta: usize, column: usize) -> usize {
    if line_delta == 0 {
        unit_column + column - 1
    } else {
        column
    }
}

/// A one-line excerpt around the span `[start, end)`: up to `window`
/// graphemes on each side, stopping at line breaks. Returns the excerpt and
/// the byte span of the match within it.
fn context_around(
    text: &str,
    start: usize,
    end: usize,
    window: usize,
) -> (String, (usize, usize)) {
    let mut ctx_start = start;
    for (i, g) in text[..start].grapheme_indices(true).rev().take(window) {
        if g.contains('\n') {
            break;
        }
        ctx_start = i;
    }

    let mut ctx_end = end;
    for (i, g) in text[end..].grapheme_indices(true).take(window) {
        if g.contains('\n') {
            break;
        }
        ctx_end = end + i + g.len();
    }

    (
        text[ctx_start..ctx_end].to_string(),
        (start - ctx_start, end - ctx_start),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config_with_rules(dir: &TempDir, rule_text: &str) -> Config {
        let rules = write_file(dir, "test.rules", rule_text);
        Config {
            rules: Some(rules),
            personal_rules: None,
            ..Config::default()
        }
    }

    #[test]
    fn test_scan_transcript() {
        let dir = TempDir::new().unwrap();
        let config = config_with_rules(&dir, "[correct]\n好的\n[replace]\n好=不好");
        let file = write_file(&dir, "notes.txt", "他說好的\n好棒\n");

        let checker = Proofreader::new(&config).unwrap();
        let result = checker.scan(&file).unwrap();

        assert_eq!(result.flagged_count, 1);
        let finding = &result.findings[0];
        assert_eq!(finding.key, "好");
        assert_eq!(finding.replacement, "不好");
        assert_eq!((finding.line, finding.column), (2, 1));
        assert_eq!(finding.context, "好棒");
        assert_eq!(&finding.context[finding.context_span.0..finding.context_span.1], "好");
    }

    #[test]
    fn test_scan_table_flags_only_prose_cells() {
        let dir = TempDir::new().unwrap();
        let config = config_with_rules(&dir, "好=不好");
        let file = write_file(&dir, "cues.tsv", "好先生\t0:01.000\t好棒\t0:02.000\t再見\n");

        let checker = Proofreader::new(&config).unwrap();
        let result = checker.scan(&file).unwrap();

        // the speaker cell contains 好 but is not scanned
        assert_eq!(result.flagged_count, 1);
        assert_eq!(result.findings[0].line, 1);
        // columns: 好先生(3) tab 0:01.000(8) tab → 14
        assert_eq!(result.findings[0].column, 14);
    }

    #[test]
    fn test_scan_srt_line_numbers() {
        let dir = TempDir::new().unwrap();
        let config = config_with_rules(&dir, "好=不好");
        let file = write_file(
            &dir,
            "ep.srt",
            "1\n00:00:01,000 --> 00:00:02,000\n你好\n\n2\n00:00:03,000 --> 00:00:04,000\n好棒\n",
        );

        let checker = Proofreader::new(&config).unwrap();
        let result = checker.scan(&file).unwrap();

        assert_eq!(result.flagged_count, 2);
        assert_eq!(result.findings[0].line, 3);
        assert_eq!(result.findings[1].line, 7);
    }

    #[test]
    fn test_fix_auto_rewrites_the_file() {
        let dir = TempDir::new().unwrap();
        let config = config_with_rules(&dir, "好=不好\n呃=");
        let file = write_file(&dir, "notes.txt", "呃他說好棒");

        let checker = Proofreader::new(&config).unwrap();
        let result = checker.fix_auto(&file).unwrap();

        assert_eq!(result.fixed_count, 2);
        assert_eq!(fs::read_to_string(&file).unwrap(), "他說不好棒");
    }

    #[test]
    fn test_fix_auto_without_findings_leaves_the_file_alone() {
        let dir = TempDir::new().unwrap();
        let config = config_with_rules(&dir, "好=不好");
        let file = write_file(&dir, "notes.txt", "全部正確");

        let checker = Proofreader::new(&config).unwrap();
        let result = checker.fix_auto(&file).unwrap();

        assert_eq!(result.fixed_count, 0);
        assert_eq!(fs::read_to_string(&file).unwrap(), "全部正確");
    }

    #[test]
    fn test_fix_auto_preserves_srt_structure() {
        let dir = TempDir::new().unwrap();
        let config = config_with_rules(&dir, "好=不好");
        let file = write_file(
            &dir,
            "ep.srt",
            "1\n00:00:01,000 --> 00:00:02,000\n好棒\n",
        );

        let checker = Proofreader::new(&config).unwrap();
        checker.fix_auto(&file).unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "1\n00:00:01,000 --> 00:00:02,000\n不好棒\n"
        );
    }

    #[test]
    fn test_personal_rules_override_the_main_document() {
        let dir = TempDir::new().unwrap();
        let rules = write_file(&dir, "main.rules", "好=不好");
        let personal = write_file(&dir, "personal.rules", "[correct]\n好");
        let config = Config {
            rules: Some(rules),
            personal_rules: Some(personal),
            ..Config::default()
        };
        let file = write_file(&dir, "notes.txt", "好棒");

        let checker = Proofreader::new(&config).unwrap();
        assert_eq!(checker.scan(&file).unwrap().flagged_count, 0);
    }

    #[test]
    fn test_ignore_keys_drop_replacements_but_not_correct_terms() {
        let dir = TempDir::new().unwrap();
        let rules = write_file(&dir, "main.rules", "好棒=很棒\n呃=\n[correct]\n好棒的");
        let config = Config {
            rules: Some(rules),
            ignore_keys: vec!["^好".to_string()],
            ..Config::default()
        };

        let checker = Proofreader::new(&config).unwrap();
        assert!(checker.rules().get("好棒").is_none());
        assert!(checker.rules().contains("呃"));
        // correct terms survive the pattern so skip semantics are unchanged
        assert!(checker.rules().contains("好棒的"));
    }

    #[test]
    fn test_invalid_ignore_pattern_is_skipped() {
        let dir = TempDir::new().unwrap();
        let rules = write_file(&dir, "main.rules", "好=不好");
        let config = Config {
            rules: Some(rules),
            ignore_keys: vec!["[".to_string()],
            ..Config::default()
        };

        let checker = Proofreader::new(&config).unwrap();
        assert!(checker.rules().contains("好"));
    }

    #[test]
    fn test_context_around_windows() {
        let text = "0123456789好abcdefghij";
        let (context, span) = context_around(text, 10, 13, 3);
        assert_eq!(context, "789好abc");
        assert_eq!(&context[span.0..span.1], "好");
    }

    #[test]
    fn test_context_around_stops_at_line_breaks() {
        let (context, span) = context_around("第一行\n好棒\n第三行", 10, 13, 20);
        assert_eq!(context, "好棒");
        assert_eq!(span, (0, 3));
    }

    #[test]
    fn test_context_around_at_text_edges() {
        let (context, span) = context_around("好", 0, 3, 20);
        assert_eq!(context, "好");
        assert_eq!(span, (0, 3));
    }
}
