use crate::context::assemble_context;
use crate::editor::EditorSurface;
use crate::error::{ReportError, Result};
use crate::llm::client::CompletionClient;
use crate::llm::decode::collect_text;
use crate::llm::types::StepEvent;
use crate::markup::text_to_markup;
use crate::schema::{Document, DocumentPatch, Message, Step, StepId, StepStatus, UploadedReference};
use crate::steps::StepRegistry;
use crate::store::DocumentStore;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio::sync::Semaphore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives report steps end to end: guards, context, streaming, merge, status.
///
/// At most one step runs at a time; a second `run_step` while one is in flight
/// fails with [`ReportError::Guard`] instead of racing on the document body.
pub struct StepExecutor {
    client: Arc<dyn CompletionClient>,
    client_name: String,
    registry: Mutex<StepRegistry>,
    editor: Mutex<Option<EditorSurface>>,
    upload: Mutex<Option<UploadedReference>>,
    store: Option<Arc<dyn DocumentStore>>,
    in_flight: Semaphore,
    progress: Option<Sender<StepEvent>>,
}

impl StepExecutor {
    pub fn new(client: Arc<dyn CompletionClient>, client_name: impl Into<String>) -> Self {
        Self {
            client,
            client_name: client_name.into(),
            registry: Mutex::new(StepRegistry::new()),
            editor: Mutex::new(None),
            upload: Mutex::new(None),
            store: None,
            in_flight: Semaphore::new(1),
            progress: None,
        }
    }

    /// Persist the document after every successful merge.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_progress(mut self, progress: Sender<StepEvent>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn attach_editor(&self, editor: EditorSurface) {
        *lock(&self.editor) = Some(editor);
    }

    /// Load the stored document into a fresh editor.
    pub fn open_from_store(&self) -> Result<()> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ReportError::Persistence("no document store attached".to_string()))?;
        let document = store.load()?;
        info!("Opened document '{}'", document.title);
        self.attach_editor(EditorSurface::new(document));
        Ok(())
    }

    pub fn set_upload(&self, upload: UploadedReference) {
        info!(
            "Reference document '{}' attached ({} chars)",
            upload.filename,
            upload.text.len()
        );
        *lock(&self.upload) = Some(upload);
    }

    pub fn clear_upload(&self) {
        *lock(&self.upload) = None;
    }

    pub fn upload(&self) -> Option<UploadedReference> {
        lock(&self.upload).clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        lock(&self.registry).list_steps().to_vec()
    }

    pub fn status(&self, step: StepId) -> Option<StepStatus> {
        lock(&self.registry).status(step)
    }

    pub fn document_html(&self) -> Option<String> {
        lock(&self.editor).as_ref().map(|e| e.html().to_string())
    }

    /// Point-in-time plain-text snapshot, e.g. for the chat assistant.
    pub fn document_text(&self) -> Option<String> {
        lock(&self.editor).as_ref().map(|e| e.text())
    }

    pub fn document(&self) -> Option<Document> {
        lock(&self.editor).as_ref().map(|e| e.to_document())
    }

    /// Write the current document to the attached store.
    pub fn save(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let document = self
            .document()
            .ok_or_else(|| ReportError::Guard("editor is not ready yet".to_string()))?;
        store.save(DocumentPatch::from(&document))
    }

    /// Execute one step. Guard failures return `ReportError::Guard` and leave
    /// every status untouched; any later failure marks the step as errored.
    pub async fn run_step(&self, step: StepId) -> Result<()> {
        let document_text = self
            .document_text()
            .ok_or_else(|| ReportError::Guard("editor is not ready yet".to_string()))?;

        let upload = self.upload();
        let has_upload = upload.as_ref().is_some_and(|u| !u.text.is_empty());
        if step == StepId::PdfRefinement && !has_upload {
            return Err(ReportError::Guard(
                "please upload the annual report PDF first".to_string(),
            ));
        }

        let _permit = self.in_flight.try_acquire().map_err(|_| {
            ReportError::Guard("another step is already running".to_string())
        })?;

        debug_assert!(lock(&self.registry).running().is_none());
        self.set_status(step, StepStatus::Running);
        self.send_event(StepEvent::Started { step });
        info!("Starting step {}", step);

        match self.execute(step, &document_text, upload.as_ref()).await {
            Ok(()) => {
                self.set_status(step, StepStatus::Completed);
                self.send_event(StepEvent::Completed { step });
                info!("Step {} completed", step);
                Ok(())
            }
            Err(e) => {
                error!("Error executing step {}: {}", step, e);
                self.set_status(step, StepStatus::Error);
                self.send_event(StepEvent::Failed {
                    step,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Run `steps` in order, stopping at the first failure.
    pub async fn run_steps(&self, steps: &[StepId]) -> Result<()> {
        for step in steps {
            self.run_step(*step).await?;
        }
        let registry = lock(&self.registry);
        info!(
            "{} of {} steps completed",
            registry.count_with(StepStatus::Completed),
            registry.list_steps().len()
        );
        Ok(())
    }

    async fn execute(
        &self,
        step: StepId,
        document_text: &str,
        upload: Option<&UploadedReference>,
    ) -> Result<()> {
        let content = assemble_context(step, document_text, upload, &self.client_name)?;
        debug!("Step {} request: {} chars", step, content.len());

        let stream = self
            .client
            .send(vec![Message::user(content)], Some(step))
            .await?;
        let (full_content, fragments) = collect_text(stream).await?;
        debug!(
            "Stream finished for {}: {} fragments, {} chars",
            step,
            fragments,
            full_content.len()
        );
        self.send_event(StepEvent::Received {
            step,
            fragments,
            chars: full_content.len(),
        });

        if full_content.trim().is_empty() {
            warn!("No content received for step {}", step);
            return Ok(());
        }

        let markup = text_to_markup(&full_content);
        let replaced = self.merge(step, &markup)?;
        self.send_event(StepEvent::Merged { step, replaced });

        if let Err(e) = self.save() {
            error!("Error saving document after step {}: {}", step, e);
        }
        Ok(())
    }

    /// Replace the body for the first step, append otherwise.
    fn merge(&self, step: StepId, markup: &str) -> Result<bool> {
        let mut editor = lock(&self.editor);
        let editor = editor
            .as_mut()
            .ok_or_else(|| ReportError::Guard("editor is not ready yet".to_string()))?;
        if step.is_first() {
            debug!("Setting initial content");
            editor.set_content(markup);
            Ok(true)
        } else {
            debug!("Appending new content to existing report");
            editor.append(markup);
            Ok(false)
        }
    }

    fn set_status(&self, step: StepId, status: StepStatus) {
        if let Err(e) = lock(&self.registry).set_status(step, status) {
            warn!("Could not update status of {}: {}", step, e);
        }
    }

    /// Never waits: a full channel drops the event so an undrained receiver
    /// cannot hold the in-flight permit.
    fn send_event(&self, event: StepEvent) {
        let Some(tx) = &self.progress else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => warn!("Progress channel full, dropping {:?}", event),
            Err(TrySendError::Closed(_)) => debug!("Progress receiver dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::decode::TextStream;
    use crate::schema::Document;
    use async_trait::async_trait;
    use futures::stream::{self, StreamExt};

    struct Replay(Vec<&'static str>);

    #[async_trait]
    impl CompletionClient for Replay {
        async fn send(&self, _messages: Vec<Message>, _step: Option<StepId>) -> Result<TextStream> {
            let fragments: Vec<Result<String>> =
                self.0.iter().map(|f| Ok(f.to_string())).collect();
            Ok(stream::iter(fragments).boxed())
        }
    }

    fn editor(body: &str) -> EditorSurface {
        EditorSurface::new(Document {
            title: "Report".to_string(),
            content: body.to_string(),
            cover: String::new(),
            author: String::new(),
            reading_time: 1,
            created_at: String::new(),
        })
    }

    #[tokio::test]
    async fn test_first_step_replaces_body() {
        let exec = StepExecutor::new(Arc::new(Replay(vec!["new"])), "Team Wendy");
        exec.attach_editor(editor("<p>old</p>"));
        exec.run_step(StepId::Introduction).await.unwrap();
        assert_eq!(exec.document_html().unwrap(), "<p>new</p>");
        assert_eq!(exec.status(StepId::Introduction), Some(StepStatus::Completed));
    }

    #[tokio::test]
    async fn test_later_step_appends() {
        let exec = StepExecutor::new(Arc::new(Replay(vec!["ne", "w"])), "Team Wendy");
        exec.attach_editor(editor("<p>old</p>"));
        exec.run_step(StepId::Offerings).await.unwrap();
        assert_eq!(exec.document_html().unwrap(), "<p>old</p><p>new</p>");
    }

    #[tokio::test]
    async fn test_missing_editor_is_guard_without_transition() {
        let exec = StepExecutor::new(Arc::new(Replay(vec!["x"])), "Team Wendy");
        let err = exec.run_step(StepId::Offerings).await.unwrap_err();
        assert!(err.is_guard());
        assert_eq!(exec.status(StepId::Offerings), Some(StepStatus::Pending));
    }

    #[tokio::test]
    async fn test_refinement_without_upload_is_guard() {
        let exec = StepExecutor::new(Arc::new(Replay(vec!["x"])), "Team Wendy");
        exec.attach_editor(editor("<p>old</p>"));
        let err = exec.run_step(StepId::PdfRefinement).await.unwrap_err();
        assert!(err.is_guard());
        assert_eq!(exec.status(StepId::PdfRefinement), Some(StepStatus::Pending));

        exec.set_upload(UploadedReference::new("ar.pdf", "Revenue grew 12%."));
        exec.run_step(StepId::PdfRefinement).await.unwrap();
        assert_eq!(exec.status(StepId::PdfRefinement), Some(StepStatus::Completed));

        exec.clear_upload();
        assert!(exec.upload().is_none());
    }

    #[tokio::test]
    async fn test_whitespace_response_leaves_document() {
        let exec = StepExecutor::new(Arc::new(Replay(vec!["  \n\n "])), "Team Wendy");
        exec.attach_editor(editor("<p>old</p>"));
        exec.run_step(StepId::Introduction).await.unwrap();
        assert_eq!(exec.document_html().unwrap(), "<p>old</p>");
        assert_eq!(exec.status(StepId::Introduction), Some(StepStatus::Completed));
    }

    #[tokio::test]
    async fn test_undrained_progress_channel_does_not_block() {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let exec = StepExecutor::new(Arc::new(Replay(vec!["section"])), "Team Wendy")
            .with_progress(tx);
        exec.attach_editor(editor("<p>old</p>"));

        exec.run_step(StepId::Introduction).await.unwrap();
        exec.run_step(StepId::Offerings).await.unwrap();

        assert_eq!(exec.status(StepId::Offerings), Some(StepStatus::Completed));
        assert_eq!(rx.len(), 1);
    }
}
