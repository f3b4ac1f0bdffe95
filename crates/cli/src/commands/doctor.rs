//! `stepwise doctor`: diagnose config, provider and lookup settings.

use stepwise_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Stepwise Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file, using defaults (run `stepwise onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else if config.default_provider == "ollama" {
        println!("  ✅ No API key needed for ollama");
    } else {
        println!("  ⚠️  No API key: set OPENAI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    println!(
        "  ✅ Provider: {} (model {}, max {} tokens per call)",
        config.default_provider, config.default_model, config.default_max_tokens
    );
    println!(
        "  ✅ ReAct: up to {} steps, few-shot seed {}",
        config.react.max_steps,
        if config.react.few_shot { "on" } else { "off" }
    );

    match config.lookup.backend.as_str() {
        "static" if config.lookup.entries.is_empty() => {
            println!("  ⚠️  Static lookup has no [lookup.entries]; every search will fail");
            issues += 1;
        }
        "static" => println!(
            "  ✅ Lookup: static ({} entries)",
            config.lookup.entries.len()
        ),
        backend => println!("  ✅ Lookup: {backend} ({})", config.lookup.base_url),
    }

    let router = match stepwise_providers::build_from_config(&config) {
        Ok(router) => {
            println!("  ✅ Providers: {}", router.names().join(", "));
            Some(router)
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
            None
        }
    };

    let reachable_check = config.has_api_key() || config.default_provider == "ollama";
    if let Some(provider) = router.filter(|_| reachable_check).and_then(|r| r.default()) {
        match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider reachable"),
            Ok(false) => {
                println!("  ❌ Provider rejected the health check");
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider unreachable: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
