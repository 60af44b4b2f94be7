use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voicebrief_common::{logger, AppConfig, TranscriberKind};

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "voicebrief")]
#[command(about = "VoiceBrief - Gemini chat relay and audio transcription/summarization API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Transcription strategy: cli or in-process (overrides TRANSCRIBER)
        #[arg(long)]
        transcriber: Option<TranscriberKind>,

        /// Log to the console only
        #[arg(long)]
        console_log: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env at the project root first; from_env() then tries the working directory
    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;
    let mut console_log = false;

    if let Some(Commands::Serve {
        host,
        port,
        transcriber,
        console_log: console_only,
    }) = cli.command
    {
        if let Some(host) = host {
            config.server_host = host;
        }
        if let Some(port) = port {
            config.server_port = port;
        }
        if let Some(transcriber) = transcriber {
            config.transcriber = transcriber;
        }
        console_log = console_only;
        config.validate()?;
    }

    if console_log {
        logger::setup_console_logging(&config.log_level)?;
    } else {
        logger::setup_logging(&config.log_dir, &config.log_level)?;
    }

    tracing::info!("VoiceBrief starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Gemini model: {}", config.gemini_model);
    tracing::info!("  Gemini API key set: {}", config.has_api_key());
    tracing::info!("  Transcriber: {} (default model {})", config.transcriber, config.whisper_model);
    tracing::info!("  Upload dir: {}", config.upload_dir.display());

    println!("Server listening on http://{}", config.server_bind_address());

    voicebrief_server::start_server(config).await?;

    Ok(())
}
