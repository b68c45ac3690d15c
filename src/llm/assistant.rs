use chrono::Utc;
use log::{error, info};
use std::sync::Arc;

use crate::context::chat_system_prompt;
use crate::error::Result;
use crate::llm::client::CompletionClient;
use crate::llm::decode::collect_text;
use crate::schema::{ChatEntry, Message, Role};

/// Shown in place of an answer when the request fails.
pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

/// Question answering over a snapshot of the report.
pub struct ReportAssistant {
    client: Arc<dyn CompletionClient>,
    client_name: String,
    transcript: Vec<ChatEntry>,
}

impl ReportAssistant {
    pub fn new(client: Arc<dyn CompletionClient>, client_name: impl Into<String>) -> Self {
        Self {
            client,
            client_name: client_name.into(),
            transcript: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    /// Ask a question about the report.
    ///
    /// # Arguments
    /// * `question` - The user's question. Blank questions are ignored and return `None`.
    /// * `document_text` - Plain text of the report at the time of asking
    ///
    /// Failures never propagate: the fallback apology becomes the answer.
    pub async fn ask(&mut self, question: &str, document_text: &str) -> Option<String> {
        if question.trim().is_empty() {
            return None;
        }
        info!("Report text length: {}", document_text.len());
        self.record(Role::User, question.to_string());

        let answer = match self.request(question, document_text).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Error sending message: {}", e);
                CHAT_FALLBACK.to_string()
            }
        };

        self.record(Role::Assistant, answer.clone());
        Some(answer)
    }

    async fn request(&self, question: &str, document_text: &str) -> Result<String> {
        let messages = vec![
            Message::system(chat_system_prompt(document_text, &self.client_name)),
            Message::user(question),
        ];
        let stream = self.client.send(messages, None).await?;
        let (answer, _) = collect_text(stream).await?;
        Ok(answer)
    }

    fn record(&mut self, role: Role, text: String) {
        self.transcript.push(ChatEntry {
            role,
            text,
            timestamp: Utc::now(),
        });
    }
}
