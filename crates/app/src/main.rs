use std::fmt;
use std::sync::Arc;

use services::{AppServices, Clock, QuizConfig, QuizDisplay};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::TerminalDisplay;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  moviequiz [--db <sqlite_url>] [--api-key <key>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://moviequiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MOVIEQUIZ_DB_URL, MOVIEQUIZ_API_KEY, MOVIEQUIZ_API_BASE_URL,");
    eprintln!("  MOVIEQUIZ_RESULT_DELAY_MS, RUST_LOG");
}

struct Args {
    db_url: String,
    api_key: Option<String>,
}

enum Parsed {
    Run(Args),
    Help,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Parsed, ArgsError> {
        let mut args = args.into_iter();
        let mut db_url = std::env::var("MOVIEQUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://moviequiz.sqlite3".into(), normalize_sqlite_url);
        let mut api_key = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api-key" => api_key = Some(require_value(&mut args, "--api-key")?),
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Parsed::Run(Self { db_url, api_key }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = match Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })? {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
    };

    let mut config = QuizConfig::from_env();
    if let Some(key) = args.api_key {
        config = config.with_api_key(key);
    }

    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, config, Clock::system()).await?;
    info!(db = %args.db_url, "statistics store ready");

    let display = Arc::new(TerminalDisplay::default());
    let (controller, events) =
        services.session_controller(Arc::clone(&display) as Arc<dyn QuizDisplay>);
    let session = controller.session_handle();
    let mut game = tokio::spawn(controller.run(events));

    session.start();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            finished = &mut game => {
                finished??;
                return Ok(());
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) if display.dispatch(&line, &session) => {}
                    _ => {
                        session.shutdown();
                        break;
                    }
                }
            }
        }
    }

    game.await??;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
