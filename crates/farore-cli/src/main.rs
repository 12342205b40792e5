//! farore CLI — text-to-speech server and offline synthesis.
//!
//! ```text
//! farore serve [--port 8000] [--host 127.0.0.1]
//! farore synth "你好世界" [--output out.wav] [--sid 0] [--speed 1.0]
//! farore health [--server http://localhost:8000]
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use farore_core::types::VoiceParams;
use farore_lib::config::AppConfig;
use farore_lib::engine::Synthesizer;
use farore_lib::engine::local::init_local;
use farore_lib::server::{AppState, router};

/// farore — TTS server with local and cloud engines
#[derive(Parser)]
#[command(name = "farore", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the farore TTS server
    Serve {
        /// Listen port
        #[arg(long, default_value = "8000")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Synthesize text to a WAV file with the local engine
    Synth {
        /// Text to synthesize
        text: String,
        /// Output WAV path
        #[arg(long, default_value = "output.wav")]
        output: PathBuf,
        /// Speaker id
        #[arg(long, default_value = "0")]
        sid: u32,
        /// Speech speed
        #[arg(long, default_value = "1.0")]
        speed: f32,
    },
    /// Get server health
    Health {
        #[arg(long, default_value = "http://localhost:8000")]
        server: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host } => {
            let config = AppConfig::from_env();
            let state = AppState::from_config(&config);
            let app = router(state);

            let addr = format!("{host}:{port}");
            eprintln!("farore listening on {addr}");

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .expect("failed to bind");

            axum::serve(listener, app).await.expect("server error");
        }

        Command::Synth {
            text,
            output,
            sid,
            speed,
        } => {
            let config = AppConfig::from_env();
            let init = init_local(&config);
            let Some(engine) = init.engine else {
                eprintln!(
                    "local engine unavailable: {}",
                    init.error.unwrap_or_else(|| "unknown".into())
                );
                std::process::exit(1);
            };

            let params = VoiceParams {
                speaker_id: sid,
                speed,
                ..Default::default()
            };
            let result = engine
                .synthesize(&text, &params)
                .await
                .expect("synthesis failed");

            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).expect("failed to create output directory");
                }
            }
            std::fs::write(&output, &result.audio).expect("failed to write output");
            println!("wrote {}", output.display());
        }

        Command::Health { server } => {
            let resp = reqwest::Client::new()
                .get(format!("{server}/health"))
                .send()
                .await
                .expect("request failed");
            println!("{}", resp.text().await.unwrap_or_default());
        }
    }
}
