use crate::{CheckResult, Finding};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonFinding {
    file: String,
    line: usize,
    column: usize,
    key: String,
    replacement: String,
    context: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    files_checked: usize,
    total_flagged: usize,
    findings: Vec<JsonFinding>,
}

pub fn print_findings(
    file_path: &Path,
    result: &CheckResult,
    colored_output: bool,
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Text => print_text_findings(file_path, result, colored_output),
        OutputFormat::Json => print_json_findings(file_path, result),
    }
}

fn print_text_findings(file_path: &Path, result: &CheckResult, colored_output: bool) {
    if result.findings.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for finding in &result.findings {
        let line_info = format!("{}:{}", finding.line, finding.column);
        let replacement = describe_replacement(&finding.replacement);

        if colored_output {
            println!(
                "  {} {} → {}",
                line_info.blue().bold(),
                finding.key.red().bold(),
                replacement.green()
            );
        } else {
            println!("  {} {} → {}", line_info, finding.key, replacement);
        }
        println!(
            "    {}",
            highlight_span(&finding.context, finding.context_span, colored_output)
        );
    }
}

fn print_json_findings(file_path: &Path, result: &CheckResult) {
    let json_findings: Vec<JsonFinding> = result
        .findings
        .iter()
        .map(|f| JsonFinding {
            file: file_path.display().to_string(),
            line: f.line,
            column: f.column,
            key: f.key.clone(),
            replacement: f.replacement.clone(),
            context: f.context.clone(),
        })
        .collect();

    let output = JsonOutput {
        files_checked: 1,
        total_flagged: result.flagged_count,
        findings: json_findings,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

/// Render `context` with the matched span marked. The colored form puts the
/// match on a blue background, the way the editor highlight did.
fn highlight_span(context: &str, span: (usize, usize), colored: bool) -> String {
    let (start, end) = span;
    if colored {
        format!(
            "{}{}{}",
            &context[..start],
            context[start..end].white().on_blue(),
            &context[end..]
        )
    } else {
        context.to_string()
    }
}

fn describe_replacement(replacement: &str) -> &str {
    if replacement.is_empty() {
        "(delete)"
    } else {
        replacement
    }
}

pub fn print_check_summary(total_flagged: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_flagged == 0 {
        if colored {
            println!("{}", "✓ No flagged terms found!".green().bold());
        } else {
            println!("✓ No flagged terms found!");
        }
    } else {
        let term_word = if total_flagged == 1 { "term" } else { "terms" };
        if colored {
            println!(
                "{} {} flagged {} found in {} {}",
                "✗".red().bold(),
                total_flagged.to_string().red().bold(),
                term_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✗ {} flagged {} found in {} {}",
                total_flagged,
                term_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total_fixed == 1 { "correction" } else { "corrections" };
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✓ {} {} applied to {} {}",
                total_fixed,
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

/// What the user chose for one flagged occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Apply,
    Skip,
    AddCorrect,
    Quit,
}

pub fn print_interactive_prompt(
    key: &str,
    replacement: &str,
    context: &str,
    span: (usize, usize),
    line: usize,
    column: usize,
    colored: bool,
) -> Choice {
    if colored {
        println!(
            "\n{} {}:{}",
            "Flagged term:".yellow().bold(),
            line.to_string().blue(),
            column.to_string().blue()
        );
    } else {
        println!("\nFlagged term: {}:{}", line, column);
    }
    println!("  {}", highlight_span(context, span, colored));
    println!();

    let action = if replacement.is_empty() {
        format!("[y] Delete '{}'", key)
    } else if colored {
        format!("[y] Replace with {}", replacement.green())
    } else {
        format!("[y] Replace with {}", replacement)
    };
    println!("  {}", action);
    println!("  [s] Skip");
    println!("  [a] Add to personal rules as correct");
    println!("  [q] Quit");

    print!("\nChoice: ");
    use std::io::{self, Write};
    io::stdout().flush().unwrap();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return Choice::Quit;
    }

    match input.trim() {
        "y" | "Y" => Choice::Apply,
        "a" | "A" => Choice::AddCorrect,
        "q" | "Q" => Choice::Quit,
        _ => Choice::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_round_trip() {
        assert!(matches!("text".parse(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse(), Ok(OutputFormat::Json)));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_highlight_span_plain() {
        assert_eq!(highlight_span("他說好棒", (6, 9), false), "他說好棒");
    }

    #[test]
    fn test_highlight_span_marks_the_match() {
        let marked = highlight_span("ab好cd", (2, 5), true);
        assert!(marked.starts_with("ab"));
        assert!(marked.ends_with("cd"));
        assert!(marked.contains('好'));
    }

    #[test]
    fn test_describe_replacement() {
        assert_eq!(describe_replacement(""), "(delete)");
        assert_eq!(describe_replacement("不好"), "不好");
    }
}
