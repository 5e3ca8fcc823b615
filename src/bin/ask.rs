use clap::Parser;

use places_chat_backend::{
    api::chat::{ChatRequest, ChatResponse},
    config::AppConfig,
    pipeline,
};

/// Run a single chat prompt through the place-search pipeline and print
/// the reply as JSON.
#[derive(Parser, Debug)]
#[command(name = "ask", version)]
struct Args {
    /// The chat prompt, e.g. "seafood in Bandung"
    prompt: String,

    /// Maximum number of places to return
    #[arg(long)]
    max_results: Option<usize>,

    /// City used when the prompt does not name one
    #[arg(long)]
    city: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::from_env();
    if let Some(max_results) = args.max_results {
        config.max_results = max_results;
    }
    if let Some(city) = args.city {
        config.default_location = city;
    }

    let request = ChatRequest { prompt: args.prompt };
    request.validate()?;

    let result = pipeline::run(&config, &request.prompt).await;
    match ChatResponse::assemble(result) {
        Ok(reply) => {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
