use crate::format::ScanUnit;

/// One row of the five-column cue table: speaker name, start time, start
/// text, end time, end text. Cells are stored trimmed, the way the original
/// sheet hands them out; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub start_time: String,
    pub start_text: String,
    pub end_time: String,
    pub end_text: String,
    /// 1-based source line this row came from.
    pub line: usize,
}

impl Row {
    fn from_line(line_no: usize, line: &str) -> Option<Row> {
        if line.trim().is_empty() {
            return None;
        }

        // cells past the fifth are ignored, like the fixed-width grid
        let mut cells = line.split('\t').map(str::trim);
        Some(Row {
            name: cells.next().unwrap_or("").to_string(),
            start_time: cells.next().unwrap_or("").to_string(),
            start_text: cells.next().unwrap_or("").to_string(),
            end_time: cells.next().unwrap_or("").to_string(),
            end_text: cells.next().unwrap_or("").to_string(),
            line: line_no,
        })
    }

    /// The two prose cells. Columns refer to the normalized row, with cells
    /// trimmed and tab-separated.
    pub fn units(&self) -> Vec<ScanUnit<'_>> {
        let start_col = self.name.chars().count() + self.start_time.chars().count() + 3;
        let end_col =
            start_col + self.start_text.chars().count() + self.end_time.chars().count() + 2;

        vec![
            ScanUnit {
                text: &self.start_text,
                line: self.line,
                column: start_col,
            },
            ScanUnit {
                text: &self.end_text,
                line: self.line,
                column: end_col,
            },
        ]
    }
}

/// Parse tab-separated content. Blank lines are dropped, everything else
/// becomes a row.
pub fn parse(content: &str) -> Vec<Row> {
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| Row::from_line(i + 1, line))
        .collect()
}

pub fn render(rows: &[Row]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            row.name, row.start_time, row.start_text, row.end_time, row.end_text
        ));
    }
    out
}
