//! Whitespace normalization and truncation shared by the extractors

/// Appended when text is cut at the extractor bound
pub const TRUNCATION_MARKER: &str = "...";

/// Collapse runs of spaces and tabs, trim every line, and keep at most one
/// blank line between paragraphs.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_run = false;

    for line in text.lines() {
        let line = collapse_whitespace(line);
        if line.is_empty() {
            blank_run = !result.is_empty();
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
            if blank_run {
                result.push('\n');
            }
        }
        result.push_str(&line);
        blank_run = false;
    }

    result
}

/// Collapse every whitespace run (newlines included) into a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to `max_chars` characters plus a marker.
///
/// Returns the text and whether it was truncated.
pub fn truncate_with_marker(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let mut cut = text[..idx].trim_end().to_string();
            cut.push_str(TRUNCATION_MARKER);
            (cut, true)
        }
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        let input = "  Hello \t  World  \n\n\n\n  Test  \nline\t two ";
        assert_eq!(normalize_whitespace(input), "Hello World\n\nTest\nline two");
    }

    #[test]
    fn test_normalize_drops_leading_and_trailing_blanks() {
        assert_eq!(normalize_whitespace("\n\n  a  \n\n"), "a");
        assert_eq!(normalize_whitespace("   \n \t \n"), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace(" one\n two\t\tthree  "), "one two three");
    }

    #[test]
    fn test_truncate_with_marker() {
        assert_eq!(truncate_with_marker("short", 10), ("short".to_string(), false));
        assert_eq!(truncate_with_marker("exactly10!", 10), ("exactly10!".to_string(), false));

        let (cut, truncated) = truncate_with_marker("hello world again", 6);
        assert!(truncated);
        assert_eq!(cut, "hello...");

        let (cut, _) = truncate_with_marker("ééééé", 3);
        assert_eq!(cut, "ééé...");
    }
}
