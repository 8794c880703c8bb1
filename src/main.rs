//! Citadel CLI - host a game stored in a JSON file.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use citadel::variant::DEFAULT_VARIANT;
use citadel::{ActionKind, Coord, Target};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Citadel - a tile-placement strategy game engine
#[derive(Parser, Debug)]
#[command(name = "citadel")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new game file in the lobby
    New {
        /// Game file (JSON)
        game: PathBuf,

        /// Player names in seating order (2-6, comma separated)
        #[arg(short, long, required = true, num_args = 2..=6, value_delimiter = ',')]
        players: Vec<String>,

        /// Rule variant
        #[arg(short, long, default_value = DEFAULT_VARIANT)]
        variant: String,

        /// Actions each player may take per turn
        #[arg(short, long, default_value = "1")]
        actions: u32,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Open the setup phase
    Setup {
        /// Game file (JSON)
        game: PathBuf,
    },

    /// Start play once every player has a citadel on the board
    Begin {
        /// Game file (JSON)
        game: PathBuf,
    },

    /// Place a piece from the stash or the shared pool
    Place {
        /// Game file (JSON)
        game: PathBuf,

        /// Piece id, e.g. alice:citadel:0 or pool:land:3
        piece: String,

        /// Target cell as x,y
        #[arg(allow_hyphen_values = true)]
        at: Coord,
    },

    /// Perform any action
    Act {
        /// Game file (JSON)
        game: PathBuf,

        /// Piece id
        piece: String,

        /// Action name, e.g. slide or shiftTerrain
        action: ActionKind,

        /// Target as x,y or x,y>x,y
        #[arg(allow_hyphen_values = true)]
        target: Target,
    },

    /// End the current player's turn
    EndTurn {
        /// Game file (JSON)
        game: PathBuf,
    },

    /// Take back the last log entry
    Undo {
        /// Game file (JSON)
        game: PathBuf,
    },

    /// List the valid targets of a piece
    Targets {
        /// Game file (JSON)
        game: PathBuf,

        /// Piece id
        piece: String,

        /// Only this action (default: every action)
        action: Option<ActionKind>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Print the board
    Show {
        /// Game file (JSON)
        game: PathBuf,

        /// Show the state after the first N log entries
        #[arg(short = 'n', long)]
        at: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Use ANSI colors
        #[arg(long)]
        color: bool,
    },

    /// Replay a game file and check it for consistency
    Verify {
        /// Game file (JSON)
        game: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::New {
            game,
            players,
            variant,
            actions,
            force,
        } => cli::lifecycle::create(&game, players, variant, actions, force),
        Commands::Setup { game } => cli::lifecycle::open_setup(&game),
        Commands::Begin { game } => cli::lifecycle::begin(&game),
        Commands::Place { game, piece, at } => cli::play::place(&game, &piece, at),
        Commands::Act {
            game,
            piece,
            action,
            target,
        } => cli::play::act(&game, &piece, action, target),
        Commands::EndTurn { game } => cli::play::end_turn(&game),
        Commands::Undo { game } => cli::lifecycle::undo(&game),
        Commands::Targets {
            game,
            piece,
            action,
            format,
        } => cli::inspect::targets(&game, &piece, action, format),
        Commands::Show {
            game,
            at,
            format,
            color,
        } => cli::inspect::show(&game, at, format, color),
        Commands::Verify { game } => cli::inspect::verify(&game),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
