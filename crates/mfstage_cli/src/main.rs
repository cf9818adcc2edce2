//! mfstage CLI - Command-line interface for staged namespace edits.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "mfstage")]
#[command(about = "Staged edits of a mutable namespace over a content-addressed store", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./mfstage.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect, create the data root if needed, and write a config file
    Init,
    /// Print the hash a path resolves to
    Stat {
        /// Logical path, e.g. /data/users
        path: String,
    },
    /// Print a file's content to stdout
    Cat {
        path: String,
    },
    /// Write a file from stdin or a local file
    Write {
        path: String,
        /// Read content from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Create a directory and its parents
    Mkdir {
        path: String,
    },
    /// Remove a path
    Rm {
        path: String,
        /// Remove directories and their contents
        #[arg(short, long)]
        recursive: bool,
    },
    /// Link immutable content by hash at a path
    Cp {
        /// Content hash
        hash: String,
        /// Destination path
        path: String,
        /// Replace whatever is at the destination
        #[arg(short, long)]
        force: bool,
        /// The content is a directory
        #[arg(short, long)]
        recursive: bool,
    },
    /// Ingest a local file or directory and link it at a path
    Import {
        /// Local file or directory
        local: PathBuf,
        /// Destination path
        path: String,
        /// Import a directory tree
        #[arg(short, long)]
        recursive: bool,
        /// Replace whatever is at the destination
        #[arg(short, long)]
        force: bool,
    },
    /// Show the cached data root hash
    Root,
    /// Edit a file through a staging context
    ///
    /// The command runs with the local working copy's path; `{}` in the
    /// arguments is replaced by it, otherwise it is appended. A non-zero exit
    /// abandons the edit.
    Edit {
        path: String,
        /// Extension for the local working copy (e.g. txt)
        #[arg(long)]
        ext: Option<String>,
        /// Command to run
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Edit a directory tree through a staging context
    EditDir {
        path: String,
        /// Command to run
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Show the paths owned by an account
    Account {
        /// Account identifier
        id: String,
        /// Also show the credential marker for this secret
        #[arg(long)]
        secret: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::init::run(config).await,
        Commands::Stat { path } => commands::fs::stat(config, &path).await,
        Commands::Cat { path } => commands::fs::cat(config, &path).await,
        Commands::Write { path, file } => commands::fs::write(config, &path, file.as_deref()).await,
        Commands::Mkdir { path } => commands::fs::mkdir(config, &path).await,
        Commands::Rm { path, recursive } => commands::fs::rm(config, &path, recursive).await,
        Commands::Cp {
            hash,
            path,
            force,
            recursive,
        } => commands::fs::cp(config, &hash, &path, force, recursive).await,
        Commands::Import {
            local,
            path,
            recursive,
            force,
        } => commands::fs::import(config, &local, &path, recursive, force).await,
        Commands::Root => commands::root::run(config).await,
        Commands::Edit { path, ext, command } => {
            commands::edit::file(config, &path, ext.as_deref(), &command).await
        }
        Commands::EditDir { path, command } => {
            commands::edit::folder(config, &path, &command).await
        }
        Commands::Account { id, secret } => {
            commands::account::run(config, &id, secret.as_deref()).await
        }
    }
}
