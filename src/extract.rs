//! Text extraction from uploaded PDF reference documents.

use crate::error::{ReportError, Result};
use crate::schema::UploadedReference;
use log::{debug, info};
use lopdf::{Document, Object};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_FILENAME: &str = "document.pdf";

/// Result of processing one uploaded PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPdf {
    pub success: bool,
    pub filename: String,
    pub text: String,
    pub pages: u32,
    /// Entries of the document information dictionary (Title, Author, ...).
    pub info: BTreeMap<String, String>,
}

impl ExtractedPdf {
    pub fn into_upload(self) -> UploadedReference {
        UploadedReference::new(self.filename, self.text)
    }
}

pub fn is_pdf_filename(filename: &str) -> bool {
    mime_guess::from_path(filename)
        .first()
        .is_some_and(|mime| mime == mime_guess::mime::APPLICATION_PDF)
}

pub fn has_pdf_signature(data: &[u8]) -> bool {
    data.len() > 4 && &data[0..4] == b"%PDF"
}

/// Extract text, page count and metadata from raw PDF bytes.
///
/// # Arguments
/// * `data` - The raw file body
/// * `filename` - Name reported by the uploader; blank means [`DEFAULT_FILENAME`]
pub fn extract_pdf(data: &[u8], filename: &str) -> Result<ExtractedPdf> {
    let filename = match filename.trim() {
        "" => DEFAULT_FILENAME,
        name => name,
    };

    if !is_pdf_filename(filename) {
        return Err(ReportError::Extraction(format!(
            "Please upload a PDF file (got '{}')",
            filename
        )));
    }
    if !has_pdf_signature(data) {
        return Err(ReportError::Extraction(format!(
            "'{}' is not a PDF document",
            filename
        )));
    }

    let doc = Document::load_mem(data)
        .map_err(|e| ReportError::Extraction(format!("Failed to load PDF: {}", e)))?;
    let pages = doc.get_pages().len() as u32;
    let info = document_info(&doc);

    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| ReportError::Extraction(format!("Failed to process PDF: {}", e)))?;

    info!("PDF processed: {}", filename);
    debug!("Pages: {}, text length: {}", pages, text.len());

    Ok(ExtractedPdf {
        success: true,
        filename: filename.to_string(),
        text,
        pages,
        info,
    })
}

fn document_info(doc: &Document) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    let dict = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };
    let Some(dict) = dict else {
        return info;
    };

    for (key, value) in dict.iter() {
        if let Object::String(bytes, _) = value {
            info.insert(String::from_utf8_lossy(key).into_owned(), decode_pdf_string(bytes));
        }
    }
    info
}

/// PDF text strings are UTF-16BE when they carry a byte-order mark.
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}
