//! Report exports: Markdown, standalone HTML and paginated PDF.

use crate::error::{ReportError, Result};
use crate::markup::{decode_entities, escape_html, text_content};
use crate::schema::Document;
use lazy_static::lazy_static;
use log::info;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream, StringFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

lazy_static! {
    static ref H1: Regex = Regex::new(r"<h1>(.*?)</h1>").unwrap();
    static ref H2: Regex = Regex::new(r"<h2>(.*?)</h2>").unwrap();
    static ref H3: Regex = Regex::new(r"<h3>(.*?)</h3>").unwrap();
    static ref PARAGRAPH: Regex = Regex::new(r"<p>(.*?)</p>").unwrap();
    static ref STRONG: Regex = Regex::new(r"<strong>(.*?)</strong>").unwrap();
    static ref EMPHASIS: Regex = Regex::new(r"<em>(.*?)</em>").unwrap();
    static ref BREAK: Regex = Regex::new(r"<br\s*/?>").unwrap();
    static ref ANY_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref NON_SLUG: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

const REPORT_STYLESHEET: &str = r#"
    body { font-family: Arial, sans-serif; max-width: 800px; margin: 40px auto; padding: 20px; line-height: 1.6; }
    h1, h2, h3 { color: #333; margin-top: 24px; }
    p { margin-bottom: 16px; }
    table { border-collapse: collapse; width: 100%; margin: 20px 0; }
    th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
    th { background-color: #f4f4f4; }
"#;

// A4 in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const FONT_SIZE: i64 = 11;
const LEADING: i64 = 14;
const LINE_CHARS: usize = 88;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Html,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Html => "text/html",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn render(&self, document: &Document, client_name: &str) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Markdown => Ok(to_markdown(&document.content).into_bytes()),
            ExportFormat::Html => Ok(to_html_document(&document.content, client_name).into_bytes()),
            ExportFormat::Pdf => to_pdf(document),
        }
    }
}

/// Lower-case, dash separated form of the client name.
pub fn client_slug(client_name: &str) -> String {
    let lowered = client_name.to_lowercase();
    NON_SLUG.replace_all(&lowered, "-").trim_matches('-').to_string()
}

/// Default download name, e.g. `team-wendy-report.md`.
pub fn export_file_name(client_name: &str, format: ExportFormat) -> String {
    match client_slug(client_name).as_str() {
        "" => format!("report.{}", format.extension()),
        slug => format!("{}-report.{}", slug, format.extension()),
    }
}

pub fn to_markdown(html: &str) -> String {
    let text = H1.replace_all(html, "# ${1}\n\n");
    let text = H2.replace_all(&text, "## ${1}\n\n");
    let text = H3.replace_all(&text, "### ${1}\n\n");
    let text = PARAGRAPH.replace_all(&text, "${1}\n\n");
    let text = STRONG.replace_all(&text, "**${1}**");
    let text = EMPHASIS.replace_all(&text, "*${1}*");
    let text = BREAK.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    decode_entities(&text)
}

pub fn to_html_document(html: &str, client_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{} Market Report</title>
  <style>{}  </style>
</head>
<body>
  {}
</body>
</html>"#,
        escape_html(client_name),
        REPORT_STYLESHEET,
        html
    )
}

/// Render the title and plain-text projection of the document as an A4 PDF.
pub fn to_pdf(document: &Document) -> Result<Vec<u8>> {
    let mut lines = Vec::new();
    if !document.title.trim().is_empty() {
        lines.push(document.title.trim().to_string());
        lines.push(String::new());
    }
    for paragraph in text_content(&document.content).lines() {
        lines.extend(wrap_line(paragraph, LINE_CHARS));
        lines.push(String::new());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![lines.as_slice()]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut kids = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let content = page_content(chunk);
        let encoded = content
            .encode()
            .map_err(|e| ReportError::Export(format!("Failed to encode page: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(&document.title), StringFormat::Literal),
        "Author" => Object::String(win_ansi(&document.author), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ReportError::Export(format!("Failed to write PDF: {}", e)))?;
    info!("PDF export: {} pages, {} bytes", count, buffer.len());
    Ok(buffer)
}

/// Write `document` into `dir` under its default export name.
pub fn export_to_dir(
    dir: &Path,
    document: &Document,
    client_name: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    let bytes = format.render(document, client_name)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(client_name, format));
    std::fs::write(&path, bytes)?;
    info!("Exported {} ({})", path.display(), format.mime_type());
    Ok(path)
}

fn page_content(lines: &[String]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for line in lines {
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(line), StringFormat::Literal)],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_line(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(word.drain(..width).collect());
        }
        let len = word.len();
        if len == 0 {
            continue;
        }
        if current_len > 0 && current_len + 1 + len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word);
        current_len += len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Latin-1 bytes for the standard Helvetica encoding; other characters become '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            '\u{2013}' | '\u{2014}' => b'-',
            c if (c as u32) < 0x100 => c as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(content: &str) -> Document {
        Document {
            title: "Market Report".to_string(),
            content: content.to_string(),
            cover: String::new(),
            author: "Strategy Team".to_string(),
            reading_time: 1,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_markdown_conversion() {
        let html = "<h1>Intro</h1><p>Sales <strong>rose</strong> &amp; <em>margins</em> held</p><p>a<br>b</p>";
        assert_eq!(
            to_markdown(html),
            "# Intro\n\nSales **rose** & *margins* held\n\na\nb\n\n"
        );
    }

    #[test]
    fn test_markdown_strips_unknown_tags() {
        assert_eq!(to_markdown("<ul><li>one</li></ul>"), "one");
    }

    #[test]
    fn test_html_document_shell() {
        let out = to_html_document("<p>Body</p>", "Team Wendy");
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<title>Team Wendy Market Report</title>"));
        assert!(out.contains("border-collapse: collapse"));
        assert!(out.contains("<p>Body</p>"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(export_file_name("Team Wendy", ExportFormat::Markdown), "team-wendy-report.md");
        assert_eq!(export_file_name("  Acme & Co. ", ExportFormat::Pdf), "acme-co-report.pdf");
        assert_eq!(export_file_name("", ExportFormat::Html), "report.html");
    }

    #[test]
    fn test_wrap_line() {
        assert_eq!(wrap_line("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap_line("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap_line("   ", 10).is_empty());
    }

    #[test]
    fn test_pdf_paginates() {
        let short = to_pdf(&document("<p>Hello</p>")).unwrap();
        assert!(short.starts_with(b"%PDF"));
        let loaded = lopdf::Document::load_mem(&short).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);

        let body: String = (0..120).map(|i| format!("<p>Paragraph {}</p>", i)).collect();
        let long = to_pdf(&document(&body)).unwrap();
        let loaded = lopdf::Document::load_mem(&long).unwrap();
        assert!(loaded.get_pages().len() > 1);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let mut doc = document("");
        doc.title = String::new();
        let pdf = to_pdf(&doc).unwrap();
        let loaded = lopdf::Document::load_mem(&pdf).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }
}
