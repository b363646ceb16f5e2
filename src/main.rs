use std::sync::Arc;

use fz_assist::cli;
use fz_assist::config::Settings;
use fz_assist::recommend::Requester;
use fz_assist::retrieval::{CloudIndexClient, QueryEngine};
use fz_assist::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("🏢 Free Zone Sales Assistant v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Index: {} (project: {})",
        settings.index_name, settings.project_name
    );

    let engine: Arc<dyn QueryEngine> = Arc::new(CloudIndexClient::new(&settings));
    let requester = Arc::new(Requester::new(Arc::clone(&engine)));

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => cli::run(&requester).await,
        Some("serve") => {
            eprintln!("   API: http://0.0.0.0:{}/api/sessions", settings.port);
            web::serve(requester, settings.port).await
        }
        Some("probe") => {
            let query = args.collect::<Vec<_>>().join(" ");
            let query = if query.is_empty() {
                "I want to start a printing business in Dubai".to_string()
            } else {
                query
            };
            probe(engine.as_ref(), &query).await
        }
        Some(other) => {
            eprintln!("Unknown mode '{other}'. Usage: fz-assist [serve | probe <query>]");
            std::process::exit(2);
        }
    }
}

/// Diagnostic probe against the hosted index: raw retrieval scores first,
/// then one synthesized answer.
async fn probe(engine: &dyn QueryEngine, query: &str) -> anyhow::Result<()> {
    let rule = "=".repeat(80);

    println!("Query: {query}\n");
    println!("Searching the business activities index...\n");

    let chunks = engine.retrieve(query, 3).await?;
    println!("{rule}");
    println!("TOP {} MATCHING BUSINESS ACTIVITIES", chunks.len());
    println!("{rule}");
    for (i, chunk) in chunks.iter().enumerate() {
        println!("\n--- Result {} ---", i + 1);
        println!("Score: {:.4}", chunk.score);
        let preview: String = chunk.text.chars().take(500).collect();
        println!("Content:\n{preview}...");
        println!("{}", "-".repeat(80));
    }

    let question = format!(
        "{query}. Please provide the activity code, name, third-party approvals, \
         risk rating, and a brief description."
    );
    let response = engine.query(&question, 3).await?;
    println!("\n{rule}");
    println!("AI RECOMMENDATION");
    println!("{rule}");
    println!("{}", response.text);
    println!("{rule}");

    Ok(())
}
