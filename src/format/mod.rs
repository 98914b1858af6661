pub mod srt;
pub mod table;

use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// SubRip subtitles.
    Srt,
    /// Tab-separated five-column cue table.
    Table,
    /// Anything else: one plain text body.
    Transcript,
}

impl FileKind {
    /// Detect file kind from extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "srt" => FileKind::Srt,
            "tsv" | "tab" => FileKind::Table,
            _ => FileKind::Transcript,
        }
    }
}

/// A parsed input file, ready for scanning and rewriting.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Transcript(String),
    Table(Vec<table::Row>),
    Subtitle(Vec<srt::Cue>),
}

/// One scannable body of text and where it starts in the source file.
#[derive(Debug, Clone, Copy)]
pub struct ScanUnit<'a> {
    pub text: &'a str,
    /// 1-based line of the unit's first character.
    pub line: usize,
    /// 1-based character column of the unit's first character.
    pub column: usize,
}

/// Parse `content` according to the file's extension. A leading BOM is
/// dropped before any format sees the text.
pub fn parse(path: &Path, content: &str) -> Result<Document> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    match FileKind::from_path(path) {
        FileKind::Srt => Ok(Document::Subtitle(srt::parse(content)?)),
        FileKind::Table => Ok(Document::Table(table::parse(content))),
        FileKind::Transcript => Ok(Document::Transcript(content.to_string())),
    }
}

impl Document {
    /// The scannable text units in source order.
    ///
    /// Timing and speaker fields are not scanned; only prose is. This
    /// enumerates the same fields in the same order as [`texts_mut`],
    /// which fixing relies on.
    ///
    /// [`texts_mut`]: Document::texts_mut
    pub fn units(&self) -> Vec<ScanUnit<'_>> {
        match self {
            Document::Transcript(text) => vec![ScanUnit {
                text,
                line: 1,
                column: 1,
            }],
            Document::Table(rows) => rows.iter().flat_map(table::Row::units).collect(),
            Document::Subtitle(cues) => cues.iter().map(srt::Cue::unit).collect(),
        }
    }

    /// Mutable access to every scannable text field, for applying fixes.
    pub fn texts_mut(&mut self) -> Vec<&mut String> {
        match self {
            Document::Transcript(text) => vec![text],
            Document::Table(rows) => rows
                .iter_mut()
                .flat_map(|row| [&mut row.start_text, &mut row.end_text])
                .collect(),
            Document::Subtitle(cues) => cues.iter_mut().map(|cue| &mut cue.text).collect(),
        }
    }

    /// Serialize back to file content.
    pub fn render(&self) -> String {
        match self {
            Document::Transcript(text) => text.clone(),
            Document::Table(rows) => table::render(rows),
            Document::Subtitle(cues) => srt::render(cues),
        }
    }
}

/// Line delta and 1-based character column of `index` within `text`.
/// `index` must sit on a character boundary.
pub(crate) fn line_col_at(text: &str, index: usize) -> (usize, usize) {
    let before = &text[..index];
    let line_delta = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line_delta, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_kind_detection() {
        assert_eq!(FileKind::from_path(&PathBuf::from("ep01.srt")), FileKind::Srt);
        assert_eq!(FileKind::from_path(&PathBuf::from("EP01.SRT")), FileKind::Srt);
        assert_eq!(FileKind::from_path(&PathBuf::from("cues.tsv")), FileKind::Table);
        assert_eq!(FileKind::from_path(&PathBuf::from("cues.tab")), FileKind::Table);
        assert_eq!(
            FileKind::from_path(&PathBuf::from("notes.txt")),
            FileKind::Transcript
        );
        assert_eq!(
            FileKind::from_path(&PathBuf::from("no_extension")),
            FileKind::Transcript
        );
    }

    #[test]
    fn test_transcript_is_one_unit() {
        let doc = parse(&PathBuf::from("notes.txt"), "line one\nline two").unwrap();
        let units = doc.units();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "line one\nline two");
        assert_eq!((units[0].line, units[0].column), (1, 1));
    }

    #[test]
    fn test_transcript_renders_verbatim() {
        let text = "他說好的\n好棒\n";
        let doc = parse(&PathBuf::from("notes.txt"), text).unwrap();
        assert_eq!(doc.render(), text);
    }

    #[test]
    fn test_bom_is_stripped() {
        let doc = parse(&PathBuf::from("notes.txt"), "\u{feff}abc").unwrap();
        assert_eq!(doc.units()[0].text, "abc");
    }

    #[test]
    fn test_units_and_texts_mut_line_up() {
        let content = "甲\t0:01.000\t前段\t0:02.000\t後段\n";
        let mut doc = parse(&PathBuf::from("cues.tsv"), content).unwrap();

        let unit_texts: Vec<String> = doc.units().iter().map(|u| u.text.to_string()).collect();
        let field_texts: Vec<String> = doc.texts_mut().iter().map(|t| t.to_string()).collect();
        assert_eq!(unit_texts, field_texts);
    }

    #[test]
    fn test_line_col_at() {
        assert_eq!(line_col_at("abc", 0), (0, 1));
        assert_eq!(line_col_at("abc", 2), (0, 3));
        assert_eq!(line_col_at("ab\ncd", 3), (1, 1));
        assert_eq!(line_col_at("ab\ncd", 4), (1, 2));
        // columns count characters, not bytes
        assert_eq!(line_col_at("好的a", 6), (0, 3));
    }
}
