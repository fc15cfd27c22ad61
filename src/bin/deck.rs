//! Interactive deck - draw and shuffle cards from a remote deck.
//!
//! Usage:
//!   cargo run --bin deck
//!   cargo run --bin deck -- --url http://localhost:8000/api/deck/ --timeout-secs 5
//!
//! Commands: draw (d), shuffle (s), init (i), show, json, help, quit (q)

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use deck_session::config::{ClientConfig, SessionConfig, DEFAULT_BASE_URL};
use deck_session::{DeckSession, HttpDeckClient, SessionError, Snapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Draw cards from a remote shuffled deck")]
struct Args {
    /// Card provider base URL
    #[arg(short, long, env = "DECK_API_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Seconds before a pending draw or shuffle counts as failed (0 disables)
    #[arg(long, default_value = "10")]
    timeout_secs: u64,
}

type Session = DeckSession<HttpDeckClient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Draw,
    Shuffle,
    Init,
    Show,
    Json,
    Help,
    Quit,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "d" | "draw" => Some(Self::Draw),
            "s" | "shuffle" => Some(Self::Shuffle),
            "i" | "init" => Some(Self::Init),
            "show" => Some(Self::Show),
            "json" => Some(Self::Json),
            "h" | "help" | "?" => Some(Self::Help),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "commands: draw (d), shuffle (s), init (i), show, json, help, quit (q)";

fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let mut header = format!("[{}]", snapshot.status);
    if let Some(op) = snapshot.pending {
        header.push_str(&format!(" {}…", op.as_str()));
    }
    if let (Some(id), Some(remaining)) = (&snapshot.deck_id, snapshot.remaining) {
        header.push_str(&format!(" deck {} - {} left", id, remaining));
    }
    out.push_str(&header);
    out.push('\n');

    let mut actions = Vec::new();
    if snapshot.can_draw {
        actions.push("DRAW");
    }
    if snapshot.can_shuffle {
        actions.push("SHUFFLE DECK");
    }
    if !actions.is_empty() {
        out.push_str(&format!("  available: {}\n", actions.join(" | ")));
    }

    for (i, card) in snapshot.history.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {:<16} {}\n", i + 1, card.label, card.image_ref));
    }

    if let Some(error) = &snapshot.last_error {
        out.push_str(&format!("  ! {}\n", error));
    }
    out
}

async fn run(session: Arc<Session>, command: Command) {
    let result = match command {
        Command::Draw => session.draw().await,
        Command::Shuffle => session.reshuffle().await,
        Command::Init => session.initialize().await,
        _ => return,
    };
    if let Err(SessionError::Rejected(transition)) = result {
        println!("  ({:?} ignored: {})", command, transition.reason);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client_config = ClientConfig::default().with_base_url(args.url.clone());
    let operation_timeout = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));
    let session_config = SessionConfig::default().with_operation_timeout(operation_timeout);

    let client = HttpDeckClient::new(&client_config).context("Failed to build deck client")?;
    info!(base_url = %client.base_url(), "using deck provider");
    let session = Arc::new(DeckSession::with_config(client, session_config));

    // Render every published snapshot
    let mut updates = session.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            print!("{}", render(&snapshot));
        }
    });

    tokio::spawn(run(session.clone(), Command::Init));
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = Command::parse(&line) else {
            warn!(input = %line.trim(), "unknown command");
            println!("{}", HELP);
            continue;
        };
        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Show => print!("{}", render(&session.current_snapshot())),
            Command::Json => println!(
                "{}",
                serde_json::to_string_pretty(&session.current_snapshot().to_json()?)?
            ),
            // Each action runs on its own task so a second one typed while
            // the first is in flight meets the busy guard
            _ => {
                tokio::spawn(run(session.clone(), command));
            }
        }
    }

    renderer.abort();
    Ok(())
}
