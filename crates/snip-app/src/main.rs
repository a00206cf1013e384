use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use snip_config::{CredentialStore, FileCredentialStore};
use tracing_subscriber::EnvFilter;

mod clipboard;
mod pipeline;
mod profile;

#[derive(Parser, Debug)]
#[command(name = "snip", about = "Crop a viewport capture and extract its text")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crop a selection out of a frame and send it for text extraction
    Capture(CaptureArgs),
    /// Store the recognition service key
    SetKey {
        key: String,
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Print the stored key, masked
    ShowKey {
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Full-viewport PNG in device pixels
    #[arg(long)]
    pub frame: PathBuf,
    #[arg(long)]
    pub left: f64,
    #[arg(long)]
    pub top: f64,
    #[arg(long)]
    pub width: f64,
    #[arg(long)]
    pub height: f64,
    #[arg(long, default_value_t = 1.0)]
    pub dpr: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub scroll_x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub scroll_y: f64,
    /// Write the cropped PNG here
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Only crop, skip the recognition service
    #[arg(long)]
    pub no_extract: bool,
    /// Put recognized text on the clipboard
    #[arg(long)]
    pub copy: bool,
    /// JSON config profile
    #[arg(long)]
    pub profile: Option<PathBuf>,
    /// Credential file consulted when the config has no key
    #[arg(long)]
    pub store: Option<PathBuf>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {e}");
        }
    }

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::Capture(args) => {
            let config = profile::load_config(args.profile.as_deref())?;
            let result = pipeline::run_capture(&args, config).await?;
            if let Some(result) = result {
                println!("{}", result.display_text());
            }
        }
        Command::SetKey { key, store } => {
            if !snip_config::credential_is_plausible(&key) {
                tracing::warn!("Key looks too short to be valid, storing anyway");
            }
            let store = FileCredentialStore::new(profile::store_path(store)?);
            store.set(&key)?;
        }
        Command::ShowKey { store } => {
            let store = FileCredentialStore::new(profile::store_path(store)?);
            match store.get()? {
                Some(key) => println!("{}", profile::mask_key(&key)),
                None => println!("No API key stored"),
            }
        }
    }

    Ok(())
}
