/// Normalize a fetched rule document: trim every line and collapse each run
/// of blank lines down to a single one. Google Doc exports pad documents
/// with trailing whitespace and stacked empty lines that are just noise to
/// the parser.
pub fn document(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            // leading and repeated blanks add nothing
            if kept.last().map_or(true, |last| last.is_empty()) {
                continue;
            }
        }
        kept.push(line);
    }
    if kept.last() == Some(&"") {
        kept.pop();
    }

    kept.join("\n")
}
