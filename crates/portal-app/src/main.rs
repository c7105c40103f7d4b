//! Portal - login form in the terminal.
//!
//! Runs the login form controller against an in-memory page, persisting the
//! remembered username in SQLite and posting submissions to `--endpoint`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use portal_app::{LoginClient, Session};
use portal_core::{
    AlertMessage, Capabilities, FormController, LoginConfig, MemoryPage, MemoryStore,
    SystemScheduler,
};
use portal_storage::{Database, SqliteStore};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Portal - login form in the terminal
#[derive(Parser, Debug)]
#[command(name = "portal-login", version, about)]
struct Args {
    /// Login endpoint the form posts to
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout: u64,

    /// SQLite file for the remembered username (defaults to the app data directory)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Keep the remembered username in memory only
    #[arg(long, conflicts_with = "store")]
    ephemeral: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with a server-rendered error alert
    #[arg(long)]
    error: Option<String>,

    /// Start with a server-rendered info alert
    #[arg(long)]
    message: Option<String>,

    /// Pretend the page is not served from a secure context
    #[arg(long)]
    insecure_context: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Get the logs directory path.
fn logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "portal", "portal").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging with file rotation.
///
/// Console output goes to stderr so it never interleaves with the page.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("portal={},warn", log_level)));

    if let Some(log_dir) = logs_dir() {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("portal")
                .filename_suffix("log")
                .build(&log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                if args.debug {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(std::io::stderr))
                        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                        .init();
                } else {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                        .init();
                }

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }
    }

    // Fallback: console logging only
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::warn!("File logging unavailable, using console only");
    None
}

fn load_config(args: &Args) -> anyhow::Result<LoginConfig> {
    match &args.config {
        Some(path) => {
            let config = LoginConfig::load(path)
                .map_err(|e| anyhow::anyhow!("Config error in {:?}: {}", path, e))?;
            tracing::info!("Loaded configuration from {:?}", path);
            Ok(config)
        }
        None => Ok(LoginConfig::default()),
    }
}

fn build_page(args: &Args) -> MemoryPage {
    let mut page = MemoryPage::new().with_capabilities(Capabilities {
        secure_context: !args.insecure_context,
        ..Capabilities::default()
    });

    if let Some(error) = &args.error {
        page = page.with_server_alert(AlertMessage::error(error.clone()));
    }
    if let Some(message) = &args.message {
        page = page.with_server_alert(AlertMessage::info(message.clone()));
    }

    page
}

/// Opens the durable store, falling back to memory if the database is unusable.
fn open_store(args: &Args) -> Option<SqliteStore> {
    if args.ephemeral {
        return None;
    }

    let db = match &args.store {
        Some(path) => Database::with_path(path),
        None => Database::new(),
    };

    match db {
        Ok(db) => Some(SqliteStore::new(db)),
        Err(e) => {
            tracing::warn!("Database unavailable, remembered username will not persist: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Keep the guard alive for the duration of the program
    let _log_guard = init_logging(&args);

    tracing::info!("Starting Portal login...");
    tracing::debug!("Args: {:?}", args);

    let config = load_config(&args)?;

    let client = match &args.endpoint {
        Some(endpoint) => Some(
            LoginClient::new(endpoint, Duration::from_secs(args.timeout))
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        ),
        None => {
            tracing::info!("No endpoint configured, submissions stay local");
            None
        }
    };

    let controller = FormController::new(build_page(&args), SystemScheduler::new())
        .with_session_store(MemoryStore::new())
        .with_config(config);
    let mut controller = match open_store(&args) {
        Some(store) => controller.with_durable_store(store),
        None => controller.with_durable_store(MemoryStore::new()),
    };
    controller.init();

    let mut session = Session::new(controller, client);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session.run(stdin, &mut stdout).await?;

    tracing::info!("Portal login shutting down");
    Ok(())
}
