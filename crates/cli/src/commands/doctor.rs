//! The `doctor` subcommand: configuration diagnostics.

use hackmd_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 HackMD Agent Doctor — Configuration Diagnostics");
    println!("==================================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!(
            "  ⚠️  No config file at {} — defaults and environment apply",
            config_path.display()
        );
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");

            if config.has_api_token() {
                println!("  ✅ HackMD API token configured");
            } else {
                println!("  ❌ No HackMD API token — set HACKMD_API_TOKEN");
                issues += 1;
            }

            if config.has_gemini_key() {
                println!("  ✅ Gemini API key configured");
            } else {
                println!("  ❌ No Gemini API key — set GEMINI_API_KEY");
                issues += 1;
            }

            println!("  ✅ Model: {}", config.agent.model);
            println!("  ✅ API URL: {}", config.hackmd.api_url);
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
        println!();
        println!("  Example config for {}:", AppConfig::config_path().display());
        println!();
        for line in AppConfig::default_toml().lines() {
            println!("    {line}");
        }
    }

    Ok(())
}
