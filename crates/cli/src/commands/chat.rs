//! The `chat` subcommand: interactive or single-message sessions.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use hackmd_agent::AgentLoop;
use hackmd_client::HackMdClient;
use hackmd_config::AppConfig;
use hackmd_core::message::Conversation;
use hackmd_providers::GeminiProvider;
use hackmd_tools::NoteToolbox;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let agent = build_agent(&config)?;

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let outcome = agent.process(&msg, None).await?;
        eprint!("\r              \r");
        if !outcome.tools_used.is_empty() {
            tracing::debug!(tools = %outcome.tools_used.join(", "), "Tools used");
        }
        println!("{}", outcome.response);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  HackMD Agent — Interactive Mode");
    println!();
    println!("  Model:    {}", config.agent.model);
    println!("  API URL:  {}", config.hackmd.api_url);
    println!();
    println!("  Ask about your notes: list, read, create, update, delete, search.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Option<Conversation> = None;

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt()?;
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        eprint!("  ...");
        match agent.process(line, history.clone()).await {
            Ok(outcome) => {
                eprint!("\r     \r");
                if !outcome.tools_used.is_empty() {
                    tracing::debug!(tools = %outcome.tools_used.join(", "), "Tools used");
                }
                println!();
                for out in outcome.response.lines() {
                    println!("  Agent > {out}");
                }
                println!();
                // Failed turns are not carried forward.
                history = Some(outcome.conversation);
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn build_agent(config: &AppConfig) -> Result<AgentLoop, Box<dyn std::error::Error>> {
    let Some(api_token) = config.hackmd.api_token.clone() else {
        print_credential_help(
            "HackMD API token",
            "HACKMD_API_TOKEN",
            "https://hackmd.io/settings#api",
        );
        return Err("No HackMD API token found. See above for setup instructions.".into());
    };
    let Some(api_key) = config.gemini.api_key.clone() else {
        print_credential_help(
            "Gemini API key",
            "GEMINI_API_KEY",
            "https://aistudio.google.com/apikey",
        );
        return Err("No Gemini API key found. See above for setup instructions.".into());
    };

    let client = HackMdClient::new(api_token).with_base_url(config.hackmd.api_url.clone());
    let toolbox = NoteToolbox::new(Arc::new(client));
    let provider = Arc::new(GeminiProvider::new(api_key));

    Ok(AgentLoop::new(provider, toolbox, config.agent.clone()))
}

fn print_credential_help(what: &str, env_var: &str, url: &str) {
    eprintln!();
    eprintln!("  ERROR: No {what} configured!");
    eprintln!();
    eprintln!("  Set the environment variable:");
    eprintln!("    export {env_var}='...'");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    eprintln!("  Get one at: {url}");
    eprintln!();
}
