//! fncall-agent CLI
//!
//! Interactive loop that wires the Gemini client and the file tools into an
//! agent: read a line, run it to a terminal answer, print, repeat.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agent_core::{Agent, AgentBuilder, ModelClient, ToolRegistry};
use agent_runtime::{GeminiClient, GeminiConfig};
use file_tools::{
    FILE_ASSISTANT_PROMPT,
    tools::{ListDirTool, ReadFileTool, WriteFileTool},
};

#[derive(Parser, Debug)]
#[command(name = "agent-cli", about = "Function-calling agent over the local file system")]
struct Cli {
    /// One-shot question; omit for interactive mode
    question: Option<String>,

    /// Model identifier (overrides GEMINI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Maximum model turns per request
    #[arg(long, default_value_t = 10)]
    max_turns: usize,

    /// System instruction override
    #[arg(long)]
    system: Option<String>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize model client
    let mut config = GeminiConfig::from_env()?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    let client = Arc::new(GeminiClient::new(config)?);

    // Verify the service is reachable
    match client.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to Gemini"),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - requests will fail");
            tracing::warn!("  Check GEMINI_API_KEY and network access");
        }
    }

    // Initialize tools
    let mut tools = ToolRegistry::new();
    tools.register(ReadFileTool)?;
    tools.register(WriteFileTool)?;
    tools.register(ListDirTool)?;

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let mut agent = AgentBuilder::new()
        .client(client)
        .tools(tools)
        .system_instruction(
            cli.system
                .clone()
                .unwrap_or_else(|| FILE_ASSISTANT_PROMPT.into()),
        )
        .max_turns(cli.max_turns)
        .build()?;

    // One-shot mode
    if let Some(question) = cli.question {
        let answer = agent.run(&question).await?;
        println!("{answer}");
        return Ok(());
    }

    repl(&mut agent).await
}

/// Interactive loop; terminates on EOF or an explicit quit command
async fn repl(agent: &mut Agent) -> Result<()> {
    println!("Agent ready. Ask it about the files in this directory.");
    println!("Type 'exit' or 'quit' to leave.");
    println!();

    let stdin = io::stdin();

    loop {
        print!("you: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        match agent.run(line).await {
            Ok(answer) => {
                println!("agent: {answer}");
                println!();
            }
            // Rate limiting and outages are worth retrying; history is
            // preserved, so the user just asks again
            Err(err) if err.is_retryable() => {
                eprintln!("agent: {}", err.user_message());
                eprintln!();
            }
            Err(err) => {
                eprintln!("agent: {}", err.user_message());
                return Err(err.into());
            }
        }
    }

    Ok(())
}
