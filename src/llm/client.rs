use crate::error::Result;
use crate::llm::decode::TextStream;
use crate::schema::{Message, StepId};
use async_trait::async_trait;

/// Opens one streamed completion.
///
/// `step` selects the system prompt on the remote side; `None` is a plain chat
/// request. The returned stream yields fragments in receipt order and cannot be
/// restarted: consuming the answer again needs another `send`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn send(&self, messages: Vec<Message>, step: Option<StepId>) -> Result<TextStream>;
}

#[cfg(feature = "http")]
pub use remote::{HttpStepClient, OpenAiClient};

#[cfg(feature = "http")]
mod remote {
    use super::*;
    use crate::error::ReportError;
    use crate::llm::decode::{delta_stream, text_stream};
    use crate::llm::prompts::system_prompt;
    use crate::llm::types::{ChatRequest, EndpointError, StepRequest};
    use crate::schema::Role;
    use async_openai::config::OpenAIConfig;
    use async_openai::types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse,
    };
    use log::debug;
    use reqwest::{Client, Response};

    const DEFAULT_MODEL: &str = "gpt-4o";
    const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Reject a response that failed before any body was streamed.
    async fn check_status(res: Response) -> Result<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<EndpointError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(ReportError::Transport(format!(
            "API call failed (status {}): {}",
            status, detail
        )))
    }

    /// Talks to the report endpoints: a step endpoint that picks the system
    /// prompt from `promptType`, and a chat endpoint. Both answer with a
    /// chunked `text/plain` body.
    #[derive(Clone)]
    pub struct HttpStepClient {
        client: Client,
        step_endpoint: String,
        chat_endpoint: String,
    }

    impl HttpStepClient {
        pub fn new(step_endpoint: impl Into<String>, chat_endpoint: impl Into<String>) -> Self {
            Self {
                client: Client::new(),
                step_endpoint: step_endpoint.into(),
                chat_endpoint: chat_endpoint.into(),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for HttpStepClient {
        async fn send(&self, messages: Vec<Message>, step: Option<StepId>) -> Result<TextStream> {
            let request = match step {
                Some(prompt_type) => self.client.post(&self.step_endpoint).json(&StepRequest {
                    messages,
                    prompt_type,
                }),
                None => self
                    .client
                    .post(&self.chat_endpoint)
                    .json(&ChatRequest { messages }),
            };

            let res = request
                .send()
                .await
                .map_err(|e| ReportError::Transport(e.to_string()))?;
            debug!("Endpoint responded with status {}", res.status());
            let res = check_status(res).await?;

            Ok(text_stream(res.bytes_stream()))
        }
    }

    /// Calls the chat-completions API directly, doing the endpoint's job in-process:
    /// the step's system prompt is prepended before the request is streamed.
    #[derive(Clone)]
    pub struct OpenAiClient {
        client: async_openai::Client<OpenAIConfig>,
        api_key: String,
        model: String,
        temperature: f32,
        client_name: String,
    }

    impl OpenAiClient {
        pub fn new(api_key: String, client_name: impl Into<String>) -> Self {
            let config = OpenAIConfig::new().with_api_key(api_key.clone());
            Self {
                client: async_openai::Client::with_config(config),
                api_key,
                model: DEFAULT_MODEL.to_string(),
                temperature: DEFAULT_TEMPERATURE,
                client_name: client_name.into(),
            }
        }

        /// Point the client at an OpenAI-compatible server, e.g. `http://localhost:8080/v1`.
        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            let config = OpenAIConfig::new()
                .with_api_key(self.api_key.clone())
                .with_api_base(base_url);
            self.client = async_openai::Client::with_config(config);
            self
        }

        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = temperature;
            self
        }
    }

    fn request_message(message: Message) -> ChatCompletionRequestMessage {
        match message.role {
            Role::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: message.content.into(),
                ..Default::default()
            }),
            Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: message.content.into(),
                ..Default::default()
            }),
            Role::Assistant => {
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(message.content.into()),
                    ..Default::default()
                })
            }
        }
    }

    fn delta_text(chunk: CreateChatCompletionStreamResponse) -> String {
        chunk
            .choices
            .into_iter()
            .filter_map(|choice| choice.delta.content)
            .collect()
    }

    #[async_trait]
    impl CompletionClient for OpenAiClient {
        async fn send(&self, messages: Vec<Message>, step: Option<StepId>) -> Result<TextStream> {
            let mut full = Vec::with_capacity(messages.len() + 1);
            if let Some(step) = step {
                full.push(Message::system(system_prompt(step, &self.client_name)));
            }
            full.extend(messages);
            debug!("Sending {} messages to {}", full.len(), self.model);

            let request = CreateChatCompletionRequestArgs::default()
                .model(self.model.as_str())
                .temperature(self.temperature)
                .messages(full.into_iter().map(request_message).collect::<Vec<_>>())
                .build()
                .map_err(|e| ReportError::Transport(format!("Invalid completion request: {}", e)))?;

            let stream = self
                .client
                .chat()
                .create_stream(request)
                .await
                .map_err(|e| ReportError::Transport(format!("API call failed: {}", e)))?;

            Ok(delta_stream(stream, delta_text))
        }
    }
}
