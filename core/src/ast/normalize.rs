/// A physical source line after comment and whitespace stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based physical line number.
    pub number: usize,
    /// 1-based column of the first kept character.
    pub column: usize,
    pub text: String,
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

/// Cut a line at the first `%`.
pub fn strip_comment(line: &str) -> &str {
    match line.find('%') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Strip comments and surrounding whitespace from every line, dropping the
/// lines left empty.
pub fn normalize_source(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let code = strip_comment(raw);
            let rest = code.trim_start_matches(is_blank);
            let text = rest.trim_end_matches(is_blank);
            if text.is_empty() {
                return None;
            }
            Some(SourceLine {
                number: idx + 1,
                column: code.len() - rest.len() + 1,
                text: text.to_string(),
            })
        })
        .collect()
}
