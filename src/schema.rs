use crate::error::{ReportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight fixed stages of the report, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepId {
    #[serde(rename = "01-introduction")]
    Introduction,
    #[serde(rename = "02-offerings")]
    Offerings,
    #[serde(rename = "03-segments")]
    Segments,
    #[serde(rename = "04-geographies")]
    Geographies,
    #[serde(rename = "05-existing-matrix")]
    ExistingMatrix,
    #[serde(rename = "06-adjacent-new-matrix")]
    AdjacentNewMatrix,
    #[serde(rename = "07-synthesis")]
    Synthesis,
    #[serde(rename = "08-pdf-refinement")]
    PdfRefinement,
}

impl StepId {
    pub const ALL: [StepId; 8] = [
        StepId::Introduction,
        StepId::Offerings,
        StepId::Segments,
        StepId::Geographies,
        StepId::ExistingMatrix,
        StepId::AdjacentNewMatrix,
        StepId::Synthesis,
        StepId::PdfRefinement,
    ];

    /// Wire token sent as the prompt selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Introduction => "01-introduction",
            StepId::Offerings => "02-offerings",
            StepId::Segments => "03-segments",
            StepId::Geographies => "04-geographies",
            StepId::ExistingMatrix => "05-existing-matrix",
            StepId::AdjacentNewMatrix => "06-adjacent-new-matrix",
            StepId::Synthesis => "07-synthesis",
            StepId::PdfRefinement => "08-pdf-refinement",
        }
    }

    /// The step whose output replaces the document instead of extending it.
    pub fn is_first(&self) -> bool {
        matches!(self, StepId::Introduction)
    }

    pub fn title(&self) -> &'static str {
        match self {
            StepId::Introduction => "Company Overview",
            StepId::Offerings => "Offerings Analysis",
            StepId::Segments => "Customer Segments",
            StepId::Geographies => "Geographies",
            StepId::ExistingMatrix => "Existing Market Matrix",
            StepId::AdjacentNewMatrix => "Adjacent & New Markets",
            StepId::Synthesis => "Synthesis & Q&A",
            StepId::PdfRefinement => "Refine with PDF",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StepId::Introduction => "Generate comprehensive company overview with web search",
            StepId::Offerings => "Identify Existing/Adjacent/New offerings",
            StepId::Segments => "Define market segments (MECE approach)",
            StepId::Geographies => "Map geographic markets",
            StepId::ExistingMatrix => "Generate existing market combinations",
            StepId::AdjacentNewMatrix => "Identify expansion opportunities",
            StepId::Synthesis => "Generate strategic insights",
            StepId::PdfRefinement => "Enrich report with annual report insights",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = ReportError;

    /// Accepts the numbered wire token (`"03-segments"`) or the bare name (`"segments"`).
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        StepId::ALL
            .into_iter()
            .find(|id| {
                let wire = id.as_str();
                wire == token || wire.get(3..) == Some(token)
            })
            .ok_or_else(|| ReportError::UnknownStep(token.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
}

impl Step {
    pub fn pending(id: StepId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            description: id.description().to_string(),
            status: StepStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of an outbound message list. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The persisted report record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    /// Serialized rich markup (HTML).
    pub content: String,
    pub cover: String,
    pub author: String,
    pub reading_time: u32,
    pub created_at: String,
}

/// A partial document used for saves. Absent fields fall back to the bundled sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl DocumentPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Overlay the present fields onto `base`.
    pub fn apply_to(self, base: &Document) -> Document {
        Document {
            title: self.title.unwrap_or_else(|| base.title.clone()),
            content: self.content.unwrap_or_else(|| base.content.clone()),
            cover: self.cover.unwrap_or_else(|| base.cover.clone()),
            author: self.author.unwrap_or_else(|| base.author.clone()),
            reading_time: self.reading_time.unwrap_or(base.reading_time),
            created_at: self.created_at.unwrap_or_else(|| base.created_at.clone()),
        }
    }
}

impl From<&Document> for DocumentPatch {
    fn from(doc: &Document) -> Self {
        Self {
            title: Some(doc.title.clone()),
            content: Some(doc.content.clone()),
            cover: Some(doc.cover.clone()),
            author: Some(doc.author.clone()),
            reading_time: Some(doc.reading_time),
            created_at: Some(doc.created_at.clone()),
        }
    }
}

/// Text taken from an uploaded reference document (typically an annual report).
/// Lives only in session memory.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedReference {
    pub filename: String,
    pub text: String,
}

impl UploadedReference {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    /// Stand-in text naming the file, used when the upload is not parsed.
    pub fn placeholder(filename: impl Into<String>, client_name: &str) -> Self {
        let filename = filename.into();
        let text = format!(
            "This is the {} annual report. Please analyze it for {} market insights.",
            filename, client_name
        );
        Self { filename, text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}
