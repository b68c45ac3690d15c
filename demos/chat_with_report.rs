use dotenv::dotenv;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use strategy_report_builder::{
    CompletionClient, DocumentStore, EditorSurface, HttpStepClient, JsonFileStore, OpenAiClient,
    ReportAssistant, ReportConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let config = ReportConfig::from_env()?;

    println!("💬 Starting Report Chat...\n");

    let client: Arc<dyn CompletionClient> = match &config.api_key {
        Some(key) => Arc::new(
            OpenAiClient::new(key.clone(), &config.client_name)
                .with_model(&config.model)
                .with_temperature(config.temperature),
        ),
        None => Arc::new(HttpStepClient::new(&config.step_endpoint, &config.chat_endpoint)),
    };

    let store = JsonFileStore::new(&config.store_dir);
    let document = store.load()?;
    let editor = EditorSurface::new(document);
    println!(
        "✅ Loaded '{}' ({} words).\n",
        editor.title(),
        editor.word_count()
    );

    let mut assistant = ReportAssistant::new(client, &config.client_name);

    println!("🤖 Ready! Ask questions about the report (type 'quit' to exit).");
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let prompt = input.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            break;
        }

        println!("\nThinking...");

        if let Some(answer) = assistant.ask(prompt, &editor.text()).await {
            println!("\n{}\n", answer);
            println!("------------------------------------------------------------------");
        }
    }

    println!("Asked {} questions.", assistant.transcript().len() / 2);
    Ok(())
}
