use clap::{Parser, Subcommand};
use std::path::PathBuf;

use voice_audio_api::config::{DatabaseBackend, ServerConfig};
use voice_audio_api::credentials::load_credentials;
use voice_audio_api::serve;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload and look up language-tagged voice audio clips")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the audio upload and lookup API via HTTP
    Serve {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Serve { config, port } => {
            let mut server_config = ServerConfig::load(&config)?;
            if let Some(port) = port {
                server_config.port = port;
            }
            server_config.validate()?;

            // Passwords live outside the config file; only needed for postgres
            let credentials = match server_config.database.backend {
                DatabaseBackend::Postgres => load_credentials()?,
                DatabaseBackend::Sqlite => None,
            };

            serve::serve_assets(server_config, credentials)
        }
    }
}
