//! reptty: opening repertoires in the terminal.
//!
//! Every invocation loads the persisted collection from the data directory
//! (see [`config`]), applies one command through the repertoire
//! [`Workspace`], and hands the result to the debounced saver, which is
//! flushed before the process exits. Logs go to a daily rolling file so the
//! terminal stays clean for `drill`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chess::{PieceColor, StandardRules};
use clap::{Parser, Subcommand};
use repertoire::persistence::{decode, encode};
use repertoire::{
    Collection, DebouncedSaver, FileStore, KeyValueStore, SaveEvent, Settings, Workspace, COLLECTION_KEY,
    SETTINGS_KEY,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod drill;

#[derive(Parser)]
#[command(name = "reptty", about = "Build and drill chess opening repertoires")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the repertoires of both sides. `*` marks the active one.
    List,
    /// Create a repertoire and make it active.
    New {
        side: PieceColor,
        name: Option<String>,
    },
    Rename {
        side: PieceColor,
        name: String,
        new_name: String,
    },
    /// Delete a repertoire. The default one is protected.
    Delete { side: PieceColor, name: String },
    /// Select a repertoire, or browse all of them when no name is given.
    Activate {
        side: PieceColor,
        name: Option<String>,
    },
    /// Merge a PGN file into the active repertoire.
    Import {
        side: PieceColor,
        file: PathBuf,
        /// Import into a new repertoire with this name instead.
        #[arg(long)]
        new: Option<String>,
    },
    /// Write the active repertoire as PGN.
    Export {
        side: PieceColor,
        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add a line, in SAN or move codes from the start position.
    Add {
        side: PieceColor,
        #[arg(required = true)]
        moves: Vec<String>,
    },
    /// Show the position after a line and the moves prepared from there.
    Show { side: PieceColor, moves: Vec<String> },
    /// Set which color is at the bottom of the board for a side.
    Orient { side: PieceColor, bottom: PieceColor },
    /// Train the active repertoire interactively.
    Drill {
        side: PieceColor,
        /// Seed for the line selection, for repeatable drills.
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Commands {
    fn mutates(&self) -> bool {
        !matches!(
            self,
            Commands::List
                | Commands::Export { .. }
                | Commands::Show { .. }
                | Commands::Drill { .. }
                | Commands::Orient { .. }
        )
    }
}

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no {side} repertoire named '{name}'")]
    UnknownRepertoire { side: PieceColor, name: String },

    /// The workspace declined the operation; the message says why.
    #[error("{0}")]
    Refused(String),

    #[error("invalid move: {0}")]
    Move(#[from] chess::MoveError),

    #[error("cannot draw position: {0}")]
    Board(#[from] chess::DisplayBoardError),

    #[error("storage error: {0}")]
    Storage(#[from] repertoire::PersistenceError),

    #[error("failed to save {key}: {error}")]
    SaveFailed { key: String, error: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What a run starts from. `rewrite` is set when a legacy payload was
/// migrated and should be stored back in the current schema.
struct Stored {
    collection: Collection,
    settings: Settings,
    rewrite: bool,
}

fn load(store: &FileStore) -> Result<Stored, CliError> {
    let (collection, rewrite) = match store.get(COLLECTION_KEY)? {
        Some(text) => {
            let loaded = decode(&text);
            (loaded.collection, loaded.migrated)
        }
        None => (Collection::default(), false),
    };
    let settings = store
        .get(SETTINGS_KEY)?
        .map(|text| Settings::decode(&text))
        .unwrap_or_default();
    Ok(Stored {
        collection,
        settings,
        rewrite,
    })
}

fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "reptty");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    guard
}

async fn execute(ws: &mut Workspace, settings: &mut Settings, command: Commands) -> anyhow::Result<()> {
    let output = match command {
        Commands::List => commands::list(ws),
        Commands::New { side, name } => commands::new(ws, side, name.as_deref()),
        Commands::Rename { side, name, new_name } => commands::rename(ws, side, &name, &new_name)?,
        Commands::Delete { side, name } => commands::delete(ws, side, &name)?,
        Commands::Activate { side, name } => commands::activate(ws, side, name.as_deref())?,
        Commands::Import { side, file, new } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            commands::import(ws, side, &text, new.as_deref())?
        }
        Commands::Export { side, output } => {
            let pgn = commands::export(ws, side)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &pgn)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    format!("Wrote {}", path.display())
                }
                None => pgn,
            }
        }
        Commands::Add { side, moves } => commands::add(ws, side, &moves)?,
        Commands::Show { side, moves } => commands::show(ws, side, &moves)?,
        Commands::Orient { side, bottom } => {
            ws.set_orientation(side, bottom);
            *settings.orientation.get_mut(side) = bottom;
            commands::render_board(ws, side)?
        }
        Commands::Drill { side, .. } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            drill::run(ws, side, stdin, &mut std::io::stdout()).await?;
            return Ok(());
        }
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_logging();
    let cli = Cli::parse();

    let data_dir = config::get_data_dir();
    tracing::debug!(data_dir = %data_dir.display(), "Starting reptty");
    let store = Arc::new(FileStore::new(data_dir));
    let loaded = load(&store)?;

    let mut ws = Workspace::new(StandardRules, loaded.collection);
    if let Commands::Drill { seed: Some(seed), .. } = &cli.command {
        ws = ws.with_seed(*seed);
    }
    for side in PieceColor::BOTH {
        ws.set_orientation(side, *loaded.settings.orientation.get(side));
    }

    let save_collection = loaded.rewrite || cli.command.mutates();
    let save_settings = matches!(cli.command, Commands::Orient { .. });
    let mut settings = loaded.settings;
    let result = execute(&mut ws, &mut settings, cli.command).await;

    if save_collection || save_settings {
        let (saver, mut events) = DebouncedSaver::spawn(Arc::clone(&store), config::get_save_debounce());
        if save_collection {
            saver.save(COLLECTION_KEY, encode(ws.collection())?);
        }
        if save_settings {
            saver.save(SETTINGS_KEY, settings.encode()?);
        }
        saver.shutdown().await;
        while let Ok(event) = events.try_recv() {
            if let SaveEvent::Failed { key, error } = event {
                return Err(CliError::SaveFailed { key, error }.into());
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_side_and_moves() {
        let cli = Cli::try_parse_from(["reptty", "show", "black", "e4", "c5"]).unwrap();
        match cli.command {
            Commands::Show { side, moves } => {
                assert_eq!(side, PieceColor::Black);
                assert_eq!(moves, vec!["e4", "c5"]);
            }
            _ => panic!("expected show"),
        }
        assert!(Cli::try_parse_from(["reptty", "show", "green"]).is_err());
        assert!(Cli::try_parse_from(["reptty", "add", "white"]).is_err());
    }

    #[test]
    fn test_read_only_commands_do_not_save() {
        let list = Cli::try_parse_from(["reptty", "list"]).unwrap();
        assert!(!list.command.mutates());
        let import = Cli::try_parse_from(["reptty", "import", "white", "a.pgn", "--new", "Ruy"]).unwrap();
        assert!(import.command.mutates());
    }

    #[test]
    fn test_load_round_trips_through_file_store() {
        let tempdir = tempfile::tempdir().expect("failed to create temp dir");
        let store = FileStore::new(tempdir.path());

        let fresh = load(&store).unwrap();
        assert!(!fresh.rewrite);
        for side in PieceColor::BOTH {
            let entries = &fresh.collection.side(side).entries;
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].name, repertoire::DEFAULT_NAME);
            assert!(entries[0].tree.is_empty());
            assert_eq!(fresh.collection.side(side).active_id.as_deref(), Some(entries[0].id.as_str()));
        }

        let mut ws = Workspace::new(StandardRules, fresh.collection);
        commands::add(&mut ws, PieceColor::White, &["e4".to_string()]).unwrap();
        store.set(COLLECTION_KEY, &encode(ws.collection()).unwrap()).unwrap();

        let reloaded = load(&store).unwrap();
        assert_eq!(&reloaded.collection, ws.collection());
    }

    #[test]
    fn test_load_rewrites_only_migrated_payloads() {
        let tempdir = tempfile::tempdir().expect("failed to create temp dir");
        let store = FileStore::new(tempdir.path());

        store.set(COLLECTION_KEY, r#"{"version": 1}"#).unwrap();
        assert!(load(&store).unwrap().rewrite);

        // A payload from a newer schema is left on disk untouched.
        store.set(COLLECTION_KEY, r#"{"version": 99}"#).unwrap();
        assert!(!load(&store).unwrap().rewrite);
    }
}
