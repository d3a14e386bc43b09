use std::fmt;

use quiz_core::model::{InitialSettings, ParsePlayerIdError, PlayerId, QuizResult};
use services::{Clock, QuizService, QuizServiceError};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidPlayer(ParsePlayerIdError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPlayer(err) => write!(f, "invalid --player value: {err}"),
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

struct Args {
    db_url: String,
    player: PlayerId,
    verbose: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--player <id>] [--verbose]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --player local");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_PLAYER, RUST_LOG");
    eprintln!();
    eprintln!("Load hint images first with: cargo run -p storage --bin seed -- --catalog <file>");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut player = std::env::var("QUIZ_PLAYER").unwrap_or_else(|_| "local".into());
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--player" => player = require_value(args, "--player")?,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let player = PlayerId::new(player).map_err(ArgsError::InvalidPlayer)?;
        Ok(Self {
            db_url,
            player,
            verbose,
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

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Guess(String),
    Hint,
    GiveUp,
    Show,
    Restart,
    Help,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => None,
            ":hint" => Some(Self::Hint),
            ":giveup" => Some(Self::GiveUp),
            ":show" => Some(Self::Show),
            ":new" => Some(Self::Restart),
            ":help" => Some(Self::Help),
            ":quit" | ":q" => Some(Self::Quit),
            guess => Some(Self::Guess(guess.to_string())),
        }
    }
}

fn print_commands() {
    println!("Type a word to guess. Commands:");
    println!("  :hint    reveal the next hint image");
    println!("  :giveup  reveal the answer and move on");
    println!("  :show    list hint images revealed so far");
    println!("  :new     start a new session");
    println!("  :quit    leave");
}

fn print_initial(initial: &InitialSettings) {
    println!(
        "New session: {} targets, score {}.",
        initial.hint_images.len(),
        initial.score
    );
    if let Some(first) = initial
        .hint_images
        .get(initial.current_target_index as usize)
        .and_then(|hints| hints.get(initial.current_hint_index as usize))
    {
        println!(
            "Target {}, hint {}: {}",
            initial.current_target_index + 1,
            initial.current_hint_index + 1,
            first.as_str()
        );
    }
}

fn print_result(result: &QuizResult) {
    match (&result.target, result.result) {
        (Some(target), true) => println!("Correct: {target}."),
        (Some(target), false) => println!("The answer was {target}."),
        (None, _) if result.trial > 0 => println!("Wrong ({} of 3 tries on this hint).", result.trial),
        (None, _) => {}
    }

    if result.end {
        println!("Session over. Final score: {}. Type :new to play again.", result.score);
    } else {
        println!(
            "Target {}, hint {}, score {}.",
            result.current_target_index + 1,
            result.current_hint_index + 1,
            result.score
        );
    }
}

async fn show_hints(service: &QuizService, player: &PlayerId) -> Result<(), QuizServiceError> {
    let hints = service.current_hints(player).await?;
    for (n, hint) in hints.iter().enumerate() {
        println!("  hint {}: {}", n + 1, hint.as_str());
    }
    Ok(())
}

/// Storage failures end the loop; everything else is reported and play goes on.
fn recoverable(err: QuizServiceError) -> Result<(), QuizServiceError> {
    match err {
        QuizServiceError::Storage(_) => Err(err),
        other => {
            println!("{other}");
            Ok(())
        }
    }
}

async fn play(service: &QuizService, player: &PlayerId) -> Result<(), Box<dyn std::error::Error>> {
    print_commands();
    print_initial(&service.init(player).await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = Input::parse(&line) else {
            continue;
        };

        let outcome = match input {
            Input::Quit => break,
            Input::Help => {
                print_commands();
                Ok(())
            }
            Input::Restart => service.init(player).await.map(|initial| print_initial(&initial)),
            Input::Show => show_hints(service, player).await,
            Input::Hint => service
                .request_hint(player)
                .await
                .map(|result| print_result(&result)),
            Input::GiveUp => service.give_up(player).await.map(|result| print_result(&result)),
            Input::Guess(word) => service
                .guess(player, &word)
                .await
                .map(|result| print_result(&result)),
        };

        if let Err(err) = outcome {
            recoverable(err)?;
        }
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    tracing::info!(db = %args.db_url, player = %args.player, "storage ready");

    let service = QuizService::from_storage(Clock::system(), &storage);
    play(&service, &args.player).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
