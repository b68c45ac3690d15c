use lazy_static::lazy_static;
use regex::Regex;

/// Words per minute used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 150;

lazy_static! {
    static ref BLANK_LINE: Regex = Regex::new(r"\n[ \t]*\n").unwrap();
    static ref LINE_BREAK_TAG: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref BLOCK_END_TAG: Regex =
        Regex::new(r"(?i)</(p|h[1-6]|li|tr|th|td|blockquote|pre|figcaption|div|table|ul|ol)>")
            .unwrap();
    static ref ANY_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref NEWLINE_RUN: Regex = Regex::new(r"\n{2,}").unwrap();
}

/// Convert streamed plain text into paragraph markup.
///
/// Paragraphs are separated by blank lines; blank paragraphs are dropped and
/// single newlines inside a paragraph become `<br>`. Text is escaped, so every
/// returned fragment is balanced on its own.
pub fn text_to_markup(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    BLANK_LINE
        .split(&normalized)
        .map(|para| para.trim_matches('\n'))
        .filter(|para| !para.trim().is_empty())
        .map(|para| format!("<p>{}</p>", escape_html(para).replace('\n', "<br>")))
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Plain-text projection of serialized markup: one line per block, tags removed.
pub fn text_content(html: &str) -> String {
    let text = LINE_BREAK_TAG.replace_all(html, "\n");
    let text = BLOCK_END_TAG.replace_all(&text, "$0\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    NEWLINE_RUN.replace_all(&text, "\n").trim().to_string()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read `words` words, never less than one.
pub fn reading_time(words: usize) -> u32 {
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_and_line_breaks() {
        assert_eq!(text_to_markup("A\n\nB\nC"), "<p>A</p><p>B<br>C</p>");
    }

    #[test]
    fn test_blank_input_yields_nothing() {
        assert_eq!(text_to_markup(""), "");
        assert_eq!(text_to_markup("  \n\n \n\t\n"), "");
    }

    #[test]
    fn test_extra_blank_lines_do_not_leak_breaks() {
        assert_eq!(text_to_markup("A\n\n\nB\r\n\r\nC"), "<p>A</p><p>B</p><p>C</p>");
    }

    #[test]
    fn test_markup_in_response_is_escaped() {
        assert_eq!(
            text_to_markup("R&D <div> growth"),
            "<p>R&amp;D &lt;div&gt; growth</p>"
        );
    }

    #[test]
    fn test_text_content_separates_blocks() {
        let html = "<h2>Overview</h2><p>Team <strong>Wendy</strong> &amp; co.<br>Line two</p><ul><li><p>One</p></li></ul>";
        assert_eq!(text_content(html), "Overview\nTeam Wendy & co.\nLine two\nOne");
    }

    #[test]
    fn test_reading_time_boundaries() {
        let minutes: Vec<u32> = [0, 1, 149, 150, 151].into_iter().map(reading_time).collect();
        assert_eq!(minutes, vec![1, 1, 1, 1, 2]);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree\t four "), 4);
        assert_eq!(word_count(""), 0);
    }
}
