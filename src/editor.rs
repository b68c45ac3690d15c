use crate::markup::{reading_time, text_content, word_count};
use crate::schema::Document;

/// In-memory mirror of the document being edited.
///
/// While a session is open this is the source of truth for the report body;
/// the store only sees it when the session saves.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSurface {
    document: Document,
}

impl EditorSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn html(&self) -> &str {
        &self.document.content
    }

    pub fn title(&self) -> &str {
        &self.document.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.title = title.into();
    }

    /// Replace the whole body.
    pub fn set_content(&mut self, html: impl Into<String>) {
        self.document.content = html.into();
    }

    /// Concatenate `html` after the existing body.
    pub fn append(&mut self, html: &str) {
        self.document.content.push_str(html);
    }

    pub fn text(&self) -> String {
        text_content(&self.document.content)
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text())
    }

    /// Snapshot of the document with a freshly computed reading time.
    pub fn to_document(&self) -> Document {
        Document {
            reading_time: reading_time(self.word_count()),
            ..self.document.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> EditorSurface {
        EditorSurface::new(Document {
            title: "Report".to_string(),
            content: String::new(),
            cover: String::new(),
            author: "Analyst".to_string(),
            reading_time: 1,
            created_at: "Jan, 30 2025".to_string(),
        })
    }

    #[test]
    fn test_append_concatenates_markup() {
        let mut editor = blank();
        editor.set_content("<p>old</p>");
        editor.append("<p>new</p>");
        assert_eq!(editor.html(), "<p>old</p><p>new</p>");
        assert_eq!(editor.text(), "old\nnew");
    }

    #[test]
    fn test_snapshot_recomputes_reading_time() {
        let mut editor = blank();
        let words = vec!["word"; 151].join(" ");
        editor.set_content(format!("<p>{}</p>", words));
        let doc = editor.to_document();
        assert_eq!(doc.reading_time, 2);
        assert_eq!(doc.author, "Analyst");
    }
}
