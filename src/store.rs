//! Single-record document persistence.
//!
//! The report is stored as one JSON blob under [`DOCUMENT_KEY`]. Loading a
//! missing record yields (and writes) the bundled sample; saving a record with
//! blank content writes the sample instead.

use crate::error::{ReportError, Result};
use crate::schema::{Document, DocumentPatch};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DOCUMENT_KEY: &str = "post";

const SAMPLE_CONTENT: &str = include_str!("../assets/sample_document.html");

pub fn sample_document() -> Document {
    Document {
        title: "Market Report".to_string(),
        content: SAMPLE_CONTENT.trim().to_string(),
        cover: "https://images.unsplash.com/photo-1499951360447-b19be8fe80f5?w=1200&h=800&fit=crop"
            .to_string(),
        author: "Strategy Team".to_string(),
        reading_time: 1,
        created_at: "Jan, 30 2025".to_string(),
    }
}

/// Resolve a save request into the full record that gets written.
pub fn resolve_patch(patch: DocumentPatch) -> Document {
    let sample = sample_document();
    let has_content = patch
        .content
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty());
    if has_content {
        patch.apply_to(&sample)
    } else {
        sample
    }
}

pub trait DocumentStore: Send + Sync {
    /// Load the stored record, writing and returning the sample when none exists.
    fn load(&self) -> Result<Document>;

    /// Full-record overwrite. Fields absent from `patch` come from the sample.
    fn save(&self, patch: DocumentPatch) -> Result<()>;
}

/// Stores the record as `<dir>/post.json`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", DOCUMENT_KEY))
    }

    fn write_record(&self, doc: &Document) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        write_then_rename(&self.dir, &tmp, &path, json.as_bytes()).map_err(|e| {
            ReportError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

fn write_then_rename(dir: &Path, tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(tmp, bytes)?;
    fs::rename(tmp, path)
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Document> {
        let path = self.path();
        if !path.exists() {
            debug!("No stored document at {}, seeding sample", path.display());
            let sample = sample_document();
            if let Err(e) = self.write_record(&sample) {
                warn!("Could not seed sample document: {}", e);
            }
            return Ok(sample);
        }

        let raw = fs::read_to_string(&path).map_err(|e| {
            ReportError::Persistence(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ReportError::Persistence(format!("Stored document is corrupt: {}", e))
        })
    }

    fn save(&self, patch: DocumentPatch) -> Result<()> {
        self.write_record(&resolve_patch(patch))
    }
}

/// Keeps the serialized record in memory. Used for tests and short-lived sessions.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<String> {
        self.record.lock().ok().and_then(|r| r.clone())
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Document> {
        let mut record = self
            .record
            .lock()
            .map_err(|_| ReportError::Persistence("store lock poisoned".to_string()))?;
        match record.as_deref() {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => {
                let sample = sample_document();
                *record = Some(serde_json::to_string(&sample)?);
                Ok(sample)
            }
        }
    }

    fn save(&self, patch: DocumentPatch) -> Result<()> {
        let json = serde_json::to_string(&resolve_patch(patch))?;
        let mut record = self
            .record
            .lock()
            .map_err(|_| ReportError::Persistence("store lock poisoned".to_string()))?;
        *record = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_seeds_sample() {
        let store = MemoryStore::new();
        assert!(store.raw().is_none());
        let doc = store.load().unwrap();
        assert_eq!(doc, sample_document());
        assert!(store.raw().is_some());
    }

    #[test]
    fn test_round_trip_defaults_missing_fields() {
        let store = MemoryStore::new();
        store.save(DocumentPatch::content("hello")).unwrap();
        let doc = store.load().unwrap();
        let sample = sample_document();
        assert_eq!(doc.content, "hello");
        assert_eq!(doc.title, sample.title);
        assert_eq!(doc.author, sample.author);
        assert_eq!(doc.created_at, sample.created_at);
    }

    #[test]
    fn test_blank_content_saves_sample() {
        let store = MemoryStore::new();
        store
            .save(DocumentPatch {
                title: Some("Ignored".to_string()),
                content: Some("   ".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.load().unwrap(), sample_document());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        let first = store.load().unwrap();
        assert_eq!(first, sample_document());
        assert!(store.path().exists());

        store
            .save(DocumentPatch {
                title: Some("Team Wendy".to_string()),
                content: Some("<p>hello</p>".to_string()),
                reading_time: Some(4),
                ..Default::default()
            })
            .unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.title, "Team Wendy");
        assert_eq!(doc.content, "<p>hello</p>");
        assert_eq!(doc.reading_time, 4);
        assert_eq!(doc.cover, sample_document().cover);
    }

    #[test]
    fn test_corrupt_record_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(ReportError::Persistence(_))));
    }

    #[test]
    fn test_unreadable_record_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::create_dir_all(store.path()).unwrap();
        assert!(matches!(store.load(), Err(ReportError::Persistence(m)) if m.contains("Failed to read")));
    }
}
