use dotenv::dotenv;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use strategy_report_builder::markup::{text_content, word_count};
use strategy_report_builder::{
    export_to_dir, extract_pdf, CompletionClient, ExportFormat, HttpStepClient, JsonFileStore,
    OpenAiClient, ReportConfig, StepEvent, StepExecutor, StepId,
};
use tokio::sync::mpsc;

/// Arguments are step tokens (`03-segments` or `segments`) and an optional PDF path.
/// With no step tokens, every step runs in order.
fn parse_args() -> Result<(Vec<StepId>, Option<String>), Box<dyn Error>> {
    let mut steps = Vec::new();
    let mut pdf_path = None;
    for arg in std::env::args().skip(1) {
        if arg.to_lowercase().ends_with(".pdf") {
            pdf_path = Some(arg);
        } else {
            steps.push(arg.parse::<StepId>()?);
        }
    }
    Ok((steps, pdf_path))
}

fn build_client(config: &ReportConfig) -> Arc<dyn CompletionClient> {
    match &config.api_key {
        Some(key) => Arc::new(
            OpenAiClient::new(key.clone(), &config.client_name)
                .with_model(&config.model)
                .with_temperature(config.temperature),
        ),
        None => Arc::new(HttpStepClient::new(&config.step_endpoint, &config.chat_endpoint)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let config = ReportConfig::from_env()?;

    println!("📝 Building the {} market report...\n", config.client_name);

    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                StepEvent::Started { step } => println!("▶️  {} ({})", step.title(), step),
                StepEvent::Received { fragments, chars, .. } => {
                    println!("   received {} chars in {} fragments", chars, fragments)
                }
                StepEvent::Merged { replaced, .. } => {
                    println!("   {}", if replaced { "replaced body" } else { "appended section" })
                }
                StepEvent::Completed { step } => println!("✅ {}", step.title()),
                StepEvent::Failed { step, reason } => println!("❌ {}: {}", step.title(), reason),
            }
        }
    });

    let store = Arc::new(JsonFileStore::new(&config.store_dir));
    let executor = StepExecutor::new(build_client(&config), &config.client_name)
        .with_store(store)
        .with_progress(tx);
    executor.open_from_store()?;

    let (mut steps, pdf_path) = parse_args()?;
    if steps.is_empty() {
        steps = StepId::ALL
            .iter()
            .copied()
            .filter(|s| *s != StepId::PdfRefinement || pdf_path.is_some())
            .collect();
    }

    if let Some(pdf_path) = pdf_path {
        let bytes = std::fs::read(&pdf_path)?;
        let filename = Path::new(&pdf_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extracted = extract_pdf(&bytes, &filename)?;
        println!(
            "📄 Extracted {} pages from {} ({} chars)\n",
            extracted.pages,
            extracted.filename,
            extracted.text.len()
        );
        executor.set_upload(extracted.into_upload());
    }

    executor.run_steps(&steps).await?;

    let document = executor
        .document()
        .ok_or("report editor was not opened")?;
    let out_dir = Path::new("exports");
    for format in [ExportFormat::Markdown, ExportFormat::Html, ExportFormat::Pdf] {
        let path = export_to_dir(out_dir, &document, &config.client_name, format)?;
        println!("💾 Saved {}", path.display());
    }

    drop(executor);
    printer.await?;

    println!(
        "\n📊 {} words, about {} min read",
        word_count(&text_content(&document.content)),
        document.reading_time
    );
    Ok(())
}
