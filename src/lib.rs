//! # Strategy Report Builder
//!
//! A library for assembling a client market/strategy report section by section
//! with a streaming language model, then questioning and exporting the result.
//!
//! ## Core Concepts
//!
//! - **Steps**: Eight fixed report sections, run in any order, each with a status
//! - **Context**: Every request carries the current report text; later steps are told to append
//! - **Merge**: The introduction replaces the document body, every other step appends to it
//! - **Single flight**: Only one step may run at a time against a document
//! - **Reference upload**: Text extracted from an annual-report PDF feeds the refinement step
//! - **Chat**: Questions are answered from a snapshot of the report text
//!
//! ## Example
//!
//! ```rust,ignore
//! use strategy_report_builder::*;
//! use std::sync::Arc;
//!
//! let config = ReportConfig::from_env()?;
//! let client = Arc::new(HttpStepClient::new(&config.step_endpoint, &config.chat_endpoint));
//! let store = Arc::new(JsonFileStore::new(&config.store_dir));
//!
//! let executor = StepExecutor::new(client.clone(), &config.client_name).with_store(store);
//! executor.open_from_store()?;
//! executor.run_steps(&StepId::ALL[..7]).await?;
//!
//! let mut assistant = ReportAssistant::new(client, &config.client_name);
//! let text = executor.document_text().unwrap_or_default();
//! let answer = assistant.ask("Who are the main competitors?", &text).await;
//! ```

pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod export;
pub mod extract;
pub mod llm;
pub mod markup;
pub mod schema;
pub mod steps;
pub mod store;

pub use config::ReportConfig;
pub use context::{assemble_context, chat_system_prompt};
pub use editor::EditorSurface;
pub use error::{ReportError, Result};
pub use export::{export_file_name, export_to_dir, to_html_document, to_markdown, to_pdf, ExportFormat};
pub use extract::{extract_pdf, ExtractedPdf};
pub use llm::*;
pub use schema::*;
pub use steps::StepRegistry;
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
