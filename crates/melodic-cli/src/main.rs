mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use melodic_core::config::Config;
use melodic_core::model::AuthProvider;
use melodic_core::{FileStorage, Storage};

#[derive(Parser, Debug)]
#[command(name = "melodic", version, about = "Inspect Melodic's persisted state and normalize provider payloads")]
struct Cli {
    /// Directory holding the store snapshots (overrides `[storage] dir`).
    #[arg(long, global = true, env = "MELODIC_STORE_DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the auth and onboarding state.
    Status,
    /// Start a session for the given user.
    Login {
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, value_enum)]
        provider: ProviderArg,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        profile_image: Option<String>,
    },
    /// End the current session.
    Logout,
    /// Mark the tutorial as seen, or show it again next launch.
    Tutorial {
        #[arg(value_enum)]
        action: TutorialAction,
    },
    /// Normalize a raw provider response read from a JSON file.
    Normalize {
        #[arg(value_enum)]
        kind: PayloadKind,
        path: PathBuf,
        /// Print the canonical song view instead of provider results.
        #[arg(long)]
        songs: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProviderArg {
    Kakao,
    Naver,
    Google,
    Email,
}

impl From<ProviderArg> for AuthProvider {
    fn from(p: ProviderArg) -> Self {
        match p {
            ProviderArg::Kakao  => AuthProvider::Kakao,
            ProviderArg::Naver  => AuthProvider::Naver,
            ProviderArg::Google => AuthProvider::Google,
            ProviderArg::Email  => AuthProvider::Email,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TutorialAction {
    Seen,
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PayloadKind {
    Spotify,
    Youtube,
    YoutubeChannel,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = init_logging()?;
    tracing::info!("melodic starting, log: {}", log_path.display());

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable ({}), using defaults", e);
        Config::default()
    });
    let store_dir = cli.store_dir.unwrap_or(config.storage.dir);
    tracing::debug!("store dir: {}", store_dir.display());
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(store_dir));

    match cli.command {
        Command::Status => commands::status(storage).await,
        Command::Login {
            id,
            name,
            provider,
            email,
            profile_image,
        } => {
            let mut user = melodic_core::model::User::new(id, name, provider.into());
            user.email = email;
            user.profile_image = profile_image;
            commands::login(storage, user).await
        }
        Command::Logout => commands::logout(storage).await,
        Command::Tutorial { action } => commands::tutorial(storage, action).await,
        Command::Normalize { kind, path, songs } => commands::normalize(kind, &path, songs),
    }
}

fn init_logging() -> anyhow::Result<PathBuf> {
    let log_path = melodic_core::platform::log_file();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; default keeps core diagnostics at debug.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,melodic_core=debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    Ok(log_path)
}
