pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "salbum")]
#[command(about = "Salbum CLI - command-line client for the Salbum music API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, verification codes and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Listen list of albums, tracks and artists")]
    Listen {
        #[command(subcommand)]
        cmd: commands::listen::ListenCommands,
    },

    #[command(about = "Show or update your profile")]
    Profile {
        #[command(subcommand)]
        cmd: commands::profile::ProfileCommands,
    },

    #[command(about = "Activity feed of the people you follow")]
    Feed(commands::feed::FeedArgs),

    #[command(about = "Search the music catalog")]
    Search(commands::search::SearchArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let session = config::CliSession::open()?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &session, output_format).await,
        Commands::Listen { cmd } => commands::listen::handle(cmd, &session, output_format).await,
        Commands::Profile { cmd } => commands::profile::handle(cmd, &session, output_format).await,
        Commands::Feed(args) => commands::feed::handle(args, &session, output_format).await,
        Commands::Search(args) => commands::search::handle(args, &session, output_format).await,
    };

    // Cookies may have rotated even when the command failed
    session.save()?;
    result
}
