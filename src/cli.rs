use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sync-tool")]
#[command(about = "Sync terminal configuration files to a WebDAV server", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every file in a remote directory
    FetchFiles(ConnectionArgs),
    /// Upload files read from stdin into a remote directory
    UploadFiles(ConnectionArgs),
    /// Delete a remote directory and the files in it
    DeleteDirectory(ConnectionArgs),
}

impl Commands {
    pub fn connection(&self) -> &ConnectionArgs {
        match self {
            Commands::FetchFiles(args)
            | Commands::UploadFiles(args)
            | Commands::DeleteDirectory(args) => args,
        }
    }
}

/// Connection flags shared by every subcommand.
///
/// All values default to empty strings: presence is checked in the command
/// layer so a missing credential is reported as a normal error rather than
/// a usage error.
#[derive(Parser)]
pub struct ConnectionArgs {
    /// WebDAV server URL
    #[arg(short = 'u', long, default_value = "")]
    pub url: String,

    /// WebDAV username
    #[arg(short = 'U', long, default_value = "")]
    pub username: String,

    /// WebDAV password
    #[arg(short = 'p', long, default_value = "")]
    pub password: String,

    /// Combined "username:password" credentials, consulted when --username
    /// and --password are not given
    #[arg(short = 't', long, default_value = "")]
    pub token: String,

    /// Remote directory name
    #[arg(short = 'd', long = "dir", default_value = "")]
    pub directory: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
