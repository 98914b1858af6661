use crate::format::ScanUnit;
use crate::timecode::Timecode;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TIMING: Regex =
        Regex::new(r"^(\d{1,2}:\d{2}:\d{2}[,.]\d{1,3})\s*-->\s*(\d{1,2}:\d{2}:\d{2}[,.]\d{1,3})$")
            .unwrap();
}

/// One SubRip cue: number, timing, text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub index: usize,
    pub start: Timecode,
    pub end: Timecode,
    pub text: String,
    /// 1-based source line of the first text line.
    pub line: usize,
}

impl Cue {
    pub fn unit(&self) -> ScanUnit<'_> {
        ScanUnit {
            text: &self.text,
            line: self.line,
            column: 1,
        }
    }
}

/// Parse SubRip content. A cue with a malformed number or timing line is a
/// hard error: fixing re-renders the whole file, and a silently dropped cue
/// would lose content.
pub fn parse(content: &str) -> Result<Vec<Cue>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let index: usize = lines[i].trim().parse().with_context(|| {
            format!("line {}: expected a cue number, found {:?}", i + 1, lines[i])
        })?;
        i += 1;

        let timing = lines.get(i).map(|l| l.trim()).unwrap_or("");
        let caps = TIMING.captures(timing).with_context(|| {
            format!("line {}: expected a timing line, found {:?}", i + 1, timing)
        })?;
        let start = parse_timestamp(&caps[1])?;
        let end = parse_timestamp(&caps[2])?;
        i += 1;

        let text_line = i + 1;
        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i]);
            i += 1;
        }

        cues.push(Cue {
            index,
            start,
            end,
            text: text_lines.join("\n"),
            line: text_line,
        });
    }

    Ok(cues)
}

/// SubRip writes `,` before the milliseconds; `Timecode` speaks `.`.
fn parse_timestamp(s: &str) -> Result<Timecode> {
    s.replace(',', ".")
        .parse()
        .with_context(|| format!("invalid timestamp {:?}", s))
}

fn render_timestamp(tc: Timecode) -> String {
    tc.format(true).replace('.', ",")
}

/// Serialize cues back to SubRip with canonical `HH:MM:SS,mmm` timestamps.
pub fn render(cues: &[Cue]) -> String {
    let mut out = String::new();
    for cue in cues {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            render_timestamp(cue.start),
            render_timestamp(cue.end),
            cue.text
        ));
    }
    if out.ends_with("\n\n") {
        out.pop();
    }
    out
}
