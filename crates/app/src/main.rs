use std::fmt;
use std::sync::Arc;

use quiz_core::model::Level;
use services::{AppServices, Clock};

mod play;

use play::{TerminalCues, run_games};

const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLevel { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLevel { raw } => {
                write!(f, "invalid --level value: {raw} (expected 0, 1 or 2)")
            }
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
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--level <0|1|2>] [--name <name>]");
    eprintln!();
    eprintln!("Levels:");
    eprintln!("  0  no time limit");
    eprintln!("  1  20 seconds per question");
    eprintln!("  2  10 seconds per question");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --level is asked for interactively");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_LEVEL, QUIZ_USER_NAME, RUST_LOG");
}

struct Args {
    db_url: String,
    level: Option<Level>,
    user_name: Option<String>,
}

fn parse_level(raw: String) -> Result<Level, ArgsError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(|value| Level::try_from(value).ok())
        .ok_or(ArgsError::InvalidLevel { raw })
}

impl Args {
    /// Parse flags on top of defaults taken from `env`. Flags win.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url =
            normalize_sqlite_url(env("QUIZ_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_string()));
        let mut level = env("QUIZ_LEVEL").map(parse_level).transpose()?;
        let mut user_name = env("QUIZ_USER_NAME");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--level" => {
                    level = Some(parse_level(require_value(args, "--level")?)?);
                }
                "--name" => {
                    user_name = Some(require_value(args, "--name")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            level,
            user_name,
        })
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

fn prepare_sqlite_dir(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

    // The database file itself is created on connect; its directory is not.
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite here so the services stay storage-agnostic.
    prepare_sqlite_dir(&args.db_url)?;
    let services =
        AppServices::new_sqlite(&args.db_url, Clock::default_clock(), Arc::new(TerminalCues))
            .await?;
    tracing::debug!(db = %args.db_url, "services ready");

    let profile = services.profile();
    let user_name = match args.user_name.as_deref() {
        Some(name) => profile.set_user_name(name).await?,
        None => profile.user_name().await?,
    };

    run_games(services.engine(), &user_name, args.level).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_flags() {
        let mut argv = ["--db", "sqlite::memory:", "--level", "2", "--name", "Ada"]
            .into_iter()
            .map(String::from);
        let args = Args::parse(&mut argv, no_env).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.level, Some(Level::Timed10));
        assert_eq!(args.user_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn rejects_unknown_level_and_missing_values() {
        let mut argv = ["--level", "5"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut argv, no_env),
            Err(ArgsError::InvalidLevel { .. })
        ));

        let mut argv = ["--name"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut argv, no_env),
            Err(ArgsError::MissingValue { flag: "--name" })
        ));
    }

    #[test]
    fn environment_supplies_defaults_that_flags_override() {
        let env = |key: &str| match key {
            "QUIZ_DB_URL" => Some("sqlite::memory:".to_string()),
            "QUIZ_LEVEL" => Some("1".to_string()),
            "QUIZ_USER_NAME" => Some("Grace".to_string()),
            _ => None,
        };

        let args = Args::parse(&mut std::iter::empty::<String>(), env).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.level, Some(Level::Timed20));
        assert_eq!(args.user_name.as_deref(), Some("Grace"));

        let mut argv = ["--level", "0"].into_iter().map(String::from);
        let args = Args::parse(&mut argv, env).unwrap();
        assert_eq!(args.level, Some(Level::Untimed));
        assert_eq!(args.user_name.as_deref(), Some("Grace"));
    }

    #[test]
    fn no_environment_means_default_database_and_no_level() {
        let args = Args::parse(&mut std::iter::empty::<String>(), no_env).unwrap();
        assert!(args.db_url.starts_with("sqlite:///"));
        assert!(args.db_url.ends_with("quiz.sqlite3"));
        assert_eq!(args.level, None);
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }
}
