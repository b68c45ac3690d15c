//! Outbound message text for each step and for the chat assistant.
//!
//! Everything here is a pure function of its inputs.

use crate::error::{ReportError, Result};
use crate::schema::{StepId, UploadedReference};

/// Appended to every step that extends an existing report.
pub const APPEND_INSTRUCTION: &str = "IMPORTANT: The report above already exists. Your task is to ADD a new section to it. Do NOT regenerate or modify existing sections. Only APPEND your new section at the end of the report.";

/// Longest prefix of uploaded text attached to a regular step.
pub const UPLOAD_EXCERPT_CHARS: usize = 10_000;

/// Longest prefix of the report embedded in a chat system message.
pub const CHAT_DOCUMENT_CHARS: usize = 15_000;

pub fn execute_line(step: StepId, client_name: &str) -> String {
    format!("Execute prompt: {} for {}", step, client_name)
}

/// Build the single user message sent for `step`.
///
/// # Arguments
/// * `step` - The step being executed
/// * `document_text` - Plain-text projection of the current report
/// * `upload` - Uploaded reference text, if any. Blank text counts as absent.
/// * `client_name` - Company the report is about
pub fn assemble_context(
    step: StepId,
    document_text: &str,
    upload: Option<&UploadedReference>,
    client_name: &str,
) -> Result<String> {
    let upload = upload.filter(|u| !u.text.is_empty());

    match step {
        StepId::Introduction => Ok(execute_line(step, client_name)),
        StepId::PdfRefinement => {
            let upload = upload.ok_or_else(|| {
                ReportError::Precondition(
                    "upload required: the refinement step needs an annual report".to_string(),
                )
            })?;
            Ok(format!(
                "EXISTING REPORT TO ENRICH:\n{}\n\n\
                 ANNUAL REPORT CONTEXT:\n{}\n\n\
                 Task: Enrich the existing report above with specific insights, data, and facts from the annual report context.",
                document_text, upload.text
            ))
        }
        _ => {
            let mut content = format!(
                "CURRENT REPORT CONTENT:\n{}\n\n---\n\n{}\n\n{}",
                document_text,
                execute_line(step, client_name),
                APPEND_INSTRUCTION
            );
            if let Some(upload) = upload {
                content.push_str(&format!(
                    "\n\nAnnual Report Context ({}):\n{}",
                    upload.filename,
                    truncate_chars(&upload.text, UPLOAD_EXCERPT_CHARS)
                ));
            }
            Ok(content)
        }
    }
}

/// System message for the chat assistant.
pub fn chat_system_prompt(document_text: &str, client_name: &str) -> String {
    if document_text.is_empty() {
        format!(
            "You are a helpful strategy consultant assistant for {}. Note: No report has been generated yet, so provide general guidance.",
            client_name
        )
    } else {
        format!(
            "You are a strategy consultant assistant. Answer questions about the {} market report below. Always cite specific sections when answering.\n\nREPORT CONTENT:\n{}",
            client_name,
            truncate_chars(document_text, CHAT_DOCUMENT_CHARS)
        )
    }
}

/// Prefix of at most `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
