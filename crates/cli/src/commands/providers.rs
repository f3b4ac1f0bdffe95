//! `stepwise providers`: list supported LLM providers.

use stepwise_providers::router::known_base_url;

/// Providers with a built-in base URL, and whether they need a key.
const BUILT_IN: &[(&str, bool)] = &[
    ("openai", true),
    ("openrouter", true),
    ("groq", true),
    ("deepseek", true),
    ("together", true),
    ("fireworks", true),
    ("ollama", false),
    ("vllm", false),
    ("llamacpp", false),
];

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🤖 Supported LLM Providers");
    println!("==========================");
    println!();
    println!("  Constrained steps use `response_format: json_schema`; the");
    println!("  backend must support structured outputs.");
    println!();
    for line in table() {
        println!("  {line}");
    }
    println!();
    println!("  Custom endpoints:");
    println!("    Any OpenAI-compatible API works:");
    println!("    default_provider = \"openai\"");
    println!("    [providers.openai]");
    println!("    api_url = \"https://your-custom-endpoint.com/v1\"");
    println!("    api_key = \"your-key\"");
    println!();
    println!("  Environment variables:");
    println!("    OPENAI_API_KEY, OPENROUTER_API_KEY, STEPWISE_API_KEY");
    println!("    STEPWISE_PROVIDER, STEPWISE_MODEL, STEPWISE_MAX_STEPS");

    Ok(())
}

fn table() -> Vec<String> {
    let mut lines = vec![format!("{:<12} {:<40} {}", "Provider", "Base URL", "Auth")];
    for (name, needs_key) in BUILT_IN {
        let auth = if *needs_key { "API key" } else { "None (local)" };
        let url = known_base_url(name).unwrap_or("-");
        lines.push(format!("{name:<12} {url:<40} {auth}"));
    }
    lines
}
