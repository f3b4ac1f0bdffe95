//! `stepwise ask`: Answer one question with the ReAct loop.

use std::sync::Arc;
use stepwise_agent::ReactController;
use stepwise_config::AppConfig;
use stepwise_core::event::{DomainEvent, EventBus};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

pub struct AskOptions {
    pub question: String,
    pub max_steps: Option<u32>,
    pub model: Option<String>,
    pub json: bool,
    pub verbose: bool,
}

pub async fn run(options: AskOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    apply_overrides(&mut config, options.max_steps, options.model);
    config.validate()?;

    // Check for API key early, with a clear error
    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENAI_API_KEY='sk-...'        (OpenAI direct)");
        eprintln!("    export OPENROUTER_API_KEY='sk-or-...' (OpenRouter)");
        eprintln!("    export STEPWISE_API_KEY='sk-...'      (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = stepwise_providers::build_from_config(&config)?;
    let provider = router.default().ok_or("No default provider configured")?;
    let lookup = stepwise_tools::build_lookup(&config.lookup);

    let event_bus = Arc::new(EventBus::default());
    let progress = options.verbose.then(|| {
        let mut rx = event_bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Some(line) = describe(&event) {
                            eprintln!("  {line}");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        eprintln!("  ({skipped} progress events skipped)");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    });

    let controller =
        ReactController::from_config(provider, lookup, &config).with_event_bus(event_bus.clone());
    let result = controller.ask(&options.question).await;

    // Closing the bus ends the progress task once it has drained
    drop(controller);
    drop(event_bus);
    if let Some(handle) = progress {
        let _ = handle.await;
    }

    let report = result?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.transcript);
    }

    if !report.is_answered() {
        warn!(
            max_steps = config.react.max_steps,
            "No answer within the step budget; transcript is inconclusive"
        );
    }

    Ok(())
}

/// Apply command-line overrides on top of the loaded config.
fn apply_overrides(config: &mut AppConfig, max_steps: Option<u32>, model: Option<String>) {
    if let Some(steps) = max_steps {
        config.react.max_steps = steps;
    }
    if let Some(model) = model {
        config.default_model = model;
    }
}

/// One progress line per event, or `None` for events not worth echoing.
fn describe(event: &DomainEvent) -> Option<String> {
    match event {
        DomainEvent::RunStarted {
            model, max_steps, ..
        } => Some(format!("▶ run started ({model}, up to {max_steps} steps)")),
        DomainEvent::ModeChosen { step, mode, .. } => Some(format!("[{step}] mode {mode}")),
        DomainEvent::ThoughtRecorded { step, thought, .. } => {
            Some(format!("[{step}] thought: {thought}"))
        }
        DomainEvent::ActionChosen {
            step,
            action,
            argument,
            ..
        } => Some(format!("[{step}] {action} '{argument}'")),
        DomainEvent::ObservationRecorded {
            step,
            chars,
            duration_ms,
            ..
        } => Some(format!(
            "[{step}] observation: {chars} chars in {duration_ms}ms"
        )),
        DomainEvent::ResponseGenerated { tokens_used, .. } => {
            Some(format!("  {tokens_used} tokens used"))
        }
        DomainEvent::RunFinished {
            answered, steps, ..
        } => Some(if *answered {
            format!("■ answered after {steps} step(s)")
        } else {
            format!("■ no answer after {steps} step(s)")
        }),
        DomainEvent::ErrorOccurred { .. } => None,
    }
}
