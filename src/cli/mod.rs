pub mod import;
pub mod init;
pub mod migrate;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sensive")]
#[command(version)]
#[command(about = "A small blog with popularity-ranked listings", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "sensive.toml", env = "SENSIVE_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new site directory with a default config
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Start the web server
    Serve {
        /// Overrides server.host from the config
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Overrides server.port from the config
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Load users, tags, posts, likes and comments from a TOML fixture
    Import {
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        username: String,
        /// Staff users may author posts
        #[arg(long)]
        staff: bool,
    },
    List,
}
