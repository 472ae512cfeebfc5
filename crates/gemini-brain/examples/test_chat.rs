//! Send a single prompt to Gemini and print the reply.
//!
//! Usage:
//!   GEMINI_API_KEY=... cargo run -p gemini-brain --example test_chat -- "Hello there"

use gemini_brain::{ChatTurn, GeminiClient, GenerateRequest, ModelClient, ModelType};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let prompt = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let prompt = if prompt.is_empty() {
        "Say hello in Portuguese.".to_string()
    } else {
        prompt
    };

    let client = GeminiClient::from_env()?;
    let reply = client
        .generate(GenerateRequest {
            model: ModelType::Flash,
            system_instruction: "You are a helpful WhatsApp assistant. Keep answers short."
                .to_string(),
            temperature: 0.7,
            contents: vec![ChatTurn::user(prompt)],
        })
        .await?;

    println!("{}", reply);
    Ok(())
}
