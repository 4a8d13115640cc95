//! Codetrail CLI - trail command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod diff_utils;
mod util;

/// Codetrail - Never lose a line of learner code
#[derive(Parser)]
#[command(name = "trail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store directory (default: nearest .trail/ above the current directory)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a store in the current directory
    Init,
    /// Manage learners
    #[command(subcommand)]
    User(UserCommands),
    /// Manage exercises
    #[command(subcommand)]
    Game(GameCommands),
    /// Save a program (reads stdin when no file is given)
    Save {
        /// Learner id or name
        user: String,
        /// Exercise id or name
        game: String,
        /// File holding the program text
        file: Option<PathBuf>,
        /// Record a checkpoint (never deduplicated)
        #[arg(short, long)]
        checkpoint: bool,
        /// Annotation for the saved version
        #[arg(short, long)]
        message: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the current program
    Load {
        user: String,
        game: String,
        #[arg(long)]
        json: bool,
    },
    /// Show version history, newest first
    Log {
        user: String,
        game: String,
        /// Versions per page (default from config)
        #[arg(long)]
        limit: Option<usize>,
        /// Continue after a previous page
        #[arg(long)]
        cursor: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show one version
    Show {
        /// Version ID
        version: u64,
        #[arg(long)]
        json: bool,
    },
    /// Show diff between two versions
    Diff {
        /// Older version ID
        from: u64,
        /// Newer version ID
        to: u64,
        /// Number of context lines (default: 3)
        #[arg(short = 'U', long, default_value = "3")]
        context: usize,
        #[arg(long)]
        json: bool,
    },
    /// Make an old version current again (appends a checkpoint)
    Restore {
        user: String,
        game: String,
        /// Version ID to restore
        version: u64,
        #[arg(long)]
        json: bool,
    },
    /// Show one learner's saves across every game
    History {
        /// Learner id or name
        user: String,
        /// Newest versions listed per game
        #[arg(long, default_value = "5")]
        recent: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show user, game and save counts
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// View and edit store configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a learner
    Add { name: String },
    /// List learners
    List {
        #[arg(long)]
        json: bool,
    },
    /// Remove a learner and all of their history
    Remove {
        user: String,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum GameCommands {
    /// Register an exercise
    Add {
        name: String,
        /// Human readable title (default: name)
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// File holding the starting program
        #[arg(long)]
        template: Option<PathBuf>,
    },
    /// List exercises
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show all values
    List,
    /// Print one value
    Get { key: String },
    /// Change one value
    Set { key: String, value: String },
    /// Print the config file location
    Path,
    /// Print a commented example config
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let dir = cli.dir.as_deref();

    match cli.command {
        Commands::Init => cmd::init::run(dir),
        Commands::User(user_cmd) => match user_cmd {
            UserCommands::Add { name } => cmd::user::run_add(dir, &name),
            UserCommands::List { json } => cmd::user::run_list(dir, json),
            UserCommands::Remove { user, yes } => cmd::user::run_remove(dir, &user, yes),
        },
        Commands::Game(game_cmd) => match game_cmd {
            GameCommands::Add { name, display_name, description, template } => {
                cmd::game::run_add(dir, &name, display_name, description, template.as_deref())
            }
            GameCommands::List { json } => cmd::game::run_list(dir, json),
        },
        Commands::Save { user, game, file, checkpoint, message, json } => {
            cmd::save::run(dir, &user, &game, file.as_deref(), checkpoint, message.as_deref(), json)
        }
        Commands::Load { user, game, json } => cmd::load::run(dir, &user, &game, json),
        Commands::Log { user, game, limit, cursor, json } => {
            cmd::log::run(dir, &user, &game, limit, cursor.as_deref(), json)
        }
        Commands::Show { version, json } => cmd::show::run(dir, version, json),
        Commands::Diff { from, to, context, json } => cmd::diff::run(dir, from, to, context, json),
        Commands::Restore { user, game, version, json } => {
            cmd::restore::run(dir, &user, &game, version, json)
        }
        Commands::History { user, recent, json } => cmd::history::run(dir, &user, recent, json),
        Commands::Stats { json } => cmd::stats::run(dir, json),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(dir),
            ConfigCommands::Get { key } => cmd::config::run_get(dir, &key),
            ConfigCommands::Set { key, value } => cmd::config::run_set(dir, &key, &value),
            ConfigCommands::Path => cmd::config::run_path(dir),
            ConfigCommands::Example => cmd::config::run_example(),
        },
    }
}
