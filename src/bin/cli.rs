//! CLI binary for intervox.

use clap::{Parser, Subcommand};
use intervox::providers::{OpenAiClient, OpenAiLlm, OpenAiStt, OpenAiTts};
use intervox::{
    AgentSession, InterviewAgent, InterviewConfig, InterviewScript, LiveKitConnector,
    PersonaConfig, TavusAvatar, check_environment, render_instructions,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Intervox: voice AI interview agent (LiveKit + OpenAI + Tavus).
#[derive(Parser)]
#[command(name = "intervox", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the interview agent (connect, start avatar, start session).
    Dev,

    /// Check the environment and report anything missing.
    Check,

    /// Print the interview questions in asking order.
    Questions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing — suppress noisy dependency logs by default.
    // Users can override with RUST_LOG=debug to see everything.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("intervox=info,livekit_api=warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = if let Some(ref path) = cli.config {
        InterviewConfig::from_file(path)?
    } else {
        InterviewConfig::default()
    };
    let env: std::collections::HashMap<String, String> = std::env::vars().collect();
    config.apply_env(&env);

    match cli.command.unwrap_or(Command::Dev) {
        Command::Dev => run_dev(config, &env).await,
        Command::Check => run_check(&env),
        Command::Questions => print_questions(),
    }
}

async fn run_dev(
    config: InterviewConfig,
    env: &std::collections::HashMap<String, String>,
) -> anyhow::Result<()> {
    println!("Intervox v{}", env!("CARGO_PKG_VERSION"));

    // Refuse to touch any external platform with an incomplete environment.
    // This is an informational abort, not a failure: exit code stays 0.
    let report = check_environment(env);
    if !report.is_ready() {
        println!("\nMissing required configuration:\n");
        for line in report.render_lines() {
            println!("  {line}");
        }
        println!("\nSet these environment variables and try again.");
        return Ok(());
    }

    println!("Replica: {}", config.avatar.replica_id);
    println!("Persona: {}", config.avatar.persona_id);

    let script = InterviewScript::default();
    println!("\nInterview questions:");
    for line in script.numbered() {
        println!("  {line}");
    }

    let instructions = render_instructions(&PersonaConfig::default(), &script);
    let openai = OpenAiClient::new(config.openai.clone());
    let session = AgentSession::builder()
        .stt(OpenAiStt::new(openai.clone(), config.stt.clone()))
        .llm(OpenAiLlm::new(
            openai.clone(),
            config.llm.clone(),
            instructions,
        ))
        .tts(OpenAiTts::new(openai, config.tts.clone()))
        .build()?;

    let agent = InterviewAgent::new(
        LiveKitConnector::new(config.room.clone()),
        TavusAvatar::new(config.avatar.clone()),
        session,
        config.timeouts.clone(),
    );
    let cancel = agent.cancel_token();

    // Handle Ctrl+C
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel.cancel();
        }
    });

    println!("\nWaiting for the candidate to join the room...\n");
    agent.run().await?;

    Ok(())
}

fn run_check(env: &std::collections::HashMap<String, String>) -> anyhow::Result<()> {
    let report = check_environment(env);
    if report.is_ready() {
        println!("Environment ready.");
    } else {
        for line in report.render_lines() {
            println!("{line}");
        }
    }
    Ok(())
}

fn print_questions() -> anyhow::Result<()> {
    for line in InterviewScript::default().numbered() {
        println!("{line}");
    }
    Ok(())
}
