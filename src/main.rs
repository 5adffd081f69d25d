use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rose_assistant::agent::{Agent, OllamaAgent};
use rose_assistant::voice::{Speech, VoiceHandler};
use rose_assistant::{Config, Daemon};

/// Rose - voice-driven command dispatcher with a local AI fallback
#[derive(Parser)]
#[command(name = "rose", version, about)]
struct Cli {
    /// Ollama model to use
    #[arg(short, long, env = "ROSE_MODEL")]
    model: Option<String>,

    /// External recognizer command (omit for console input)
    #[arg(long, env = "ROSE_LISTEN_COMMAND")]
    listen_command: Option<String>,

    /// Path to config file (defaults to ~/.config/rose/config.toml)
    #[arg(short, long, env = "ROSE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test speech output and one recognition round-trip
    TestVoice,
    /// Test the AI backend with a couple of canned questions
    TestAi,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,rose_assistant=info",
        1 => "info,rose_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(model) = cli.model {
        config.model = model;
    }
    if cli.listen_command.is_some() {
        config.speech.listen_command = cli.listen_command;
    }
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestVoice => test_voice(&config).await,
            Command::TestAi => test_ai(&config).await,
        };
    }

    banner("PROJECT R.O.S.E. - Voice Assistant", Some("Raspberry Operated Speech Engine"));

    // Initialization failures are the only fatal path
    let speech = VoiceHandler::new(&config.speech)?;
    let agent = OllamaAgent::connect(&config.model, config.max_history, config.ask_timeout).await;

    let mut daemon = Daemon::new(config, speech, agent);
    daemon.run().await?;

    banner("PROJECT ROSE TERMINATED", None);
    Ok(())
}

/// Speak a test line, listen once, and echo what was heard
async fn test_voice(config: &Config) -> anyhow::Result<()> {
    let mut voice = VoiceHandler::new(&config.speech)?;

    voice
        .speak("Hello, I am Rose. Voice handler test initiated.")
        .await?;
    voice
        .speak("Please say something to test the microphone.")
        .await?;

    let heard = voice
        .listen(config.listen_timeout, config.phrase_time_limit)
        .await?;

    if heard.is_empty() {
        voice
            .speak("No input detected. Please check your microphone.")
            .await?;
    } else {
        voice.speak(&format!("You said: {heard}")).await?;
        voice.speak("Voice handler test complete.").await?;
    }
    Ok(())
}

/// Probe the AI backend and run two canned questions through it
async fn test_ai(config: &Config) -> anyhow::Result<()> {
    let mut agent =
        OllamaAgent::connect(&config.model, config.max_history, config.ask_timeout).await;

    if !agent.is_available() {
        anyhow::bail!("ollama not available; install it and pull {}", config.model);
    }
    println!("Ollama is available with model '{}'.\n", agent.model());

    for question in [
        "What is a SQL injection attack?",
        "How can I secure SSH?",
    ] {
        println!("Q: {question}");
        println!("Thinking...");
        let answer = agent.ask(question).await?;
        println!("A: {answer}\n");
    }
    Ok(())
}

/// Print a framed console banner
fn banner(title: &str, subtitle: Option<&str>) {
    println!("\n{}", "=".repeat(50));
    println!("    {title}");
    if let Some(subtitle) = subtitle {
        println!("    {subtitle}");
    }
    println!("{}\n", "=".repeat(50));
}
