//! holibot: chat front end for a Bedrock agent, plus its holiday function.
//!
//! ```text
//! holibot serve [--host H] [--port P] [--region R] [--replay FILE] [--log-dir DIR]
//! holibot holiday [--event FILE]
//! ```

mod assets;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use holibot_core::agents::{AgentRuntime, BedrockAgentRuntime, ReplayRuntime};
use holibot_core::holidays::{self, FunctionInvocation, HttpHolidaySource, DEFAULT_BASE_URL};
use holibot_core::SessionStore;
use holibot_http::SharedState;

#[derive(Parser)]
#[command(name = "holibot")]
#[command(version, about = "Chat with a Bedrock agent that knows Japanese holidays")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the browser UI, REST API and chat WebSocket
    Serve {
        /// Host to bind to
        #[arg(long, env = "HOLIBOT_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "HOLIBOT_PORT", default_value = "8501")]
        port: u16,

        /// AWS region for the agent runtime (default: AWS config chain)
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,

        /// Replay a JSON-lines event fixture instead of calling AWS
        #[arg(long, env = "HOLIBOT_REPLAY")]
        replay: Option<PathBuf>,

        /// Write per-session transcripts to this directory
        #[arg(long, env = "HOLIBOT_LOG_DIR")]
        log_dir: Option<PathBuf>,

        /// Holiday data API base URL
        #[arg(long, env = "HOLIDAYS_BASE_URL", default_value = DEFAULT_BASE_URL)]
        holidays_url: String,
    },

    /// Run the holiday function once on an invocation event
    Holiday {
        /// Event JSON file (default: stdin)
        #[arg(long)]
        event: Option<PathBuf>,

        /// Holiday data API base URL
        #[arg(long, env = "HOLIDAYS_BASE_URL", default_value = DEFAULT_BASE_URL)]
        holidays_url: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            region,
            replay,
            log_dir,
            holidays_url,
        } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(serve(host, port, region, replay, log_dir, holidays_url))
        }
        Commands::Holiday {
            event,
            holidays_url,
        } => run_holiday(event, holidays_url),
    }
}

async fn serve(
    host: String,
    port: u16,
    region: Option<String>,
    replay: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    holidays_url: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let client: Arc<dyn AgentRuntime> = match replay {
        Some(path) => {
            let replay = ReplayRuntime::load(&path)?;
            log::info!("Replaying {} events from {}", replay.len(), path.display());
            Arc::new(replay)
        }
        None => Arc::new(BedrockAgentRuntime::from_env(region).await),
    };

    if let Some(dir) = &log_dir {
        log::info!("Writing session transcripts to {}", dir.display());
    }

    let state = Arc::new(SharedState::new(
        SessionStore::new(client, log_dir),
        Arc::new(HttpHolidaySource::new(holidays_url)),
    ));
    let app = holibot_http::router(state).fallback(assets::static_handler);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("holibot listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutting down");
        })
        .await?;

    Ok(())
}

/// Read one invocation event, run the function, print the response.
fn run_holiday(
    event: Option<PathBuf>,
    holidays_url: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match event {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let event: FunctionInvocation = serde_json::from_str(&raw)?;
    let response = holidays::handle_invocation(&event, &HttpHolidaySource::new(holidays_url))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
