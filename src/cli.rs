use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// rewind: snapshot database tables before a destructive run and restore them afterwards
#[derive(Parser, Debug)]
#[command(name = "rewind", version, about = "Snapshot and restore database tables around test runs.", long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Connection string (defaults to the last entry of rewind.json or REWIND_CONNECTION_STRING)
    #[arg(short = 'c', long = "connection", global = true)]
    pub connection: Option<String>,

    /// Path to a rewind.json file (defaults to searching the current directory and its parents)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log every statement sent to the database
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Comma-separated tables to track (defaults to every user table)
    #[arg(short = 't', long = "tables", value_delimiter = ',')]
    pub tables: Option<Vec<String>>,

    /// Suffix for backup tables (defaults to the local time as HHMM)
    #[arg(short = 's', long = "suffix")]
    pub suffix: Option<String>,

    /// Rediscover tables even when a list is known
    #[arg(long)]
    pub discover: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy tables to backups and remember them for a later `revert`
    Snapshot {
        #[command(flatten)]
        args: SnapshotArgs,

        /// Leave backups of an earlier unreverted snapshot in place
        #[arg(long)]
        no_revert_previous: bool,
    },

    /// Restore tables from the backups of the last `snapshot`
    Revert,

    /// Snapshot, run a command, then revert whatever the command did
    Run {
        #[command(flatten)]
        args: SnapshotArgs,

        /// Command to run between snapshot and revert
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// List the tables discovery would track
    Tables,

    /// Print CLI version
    Version,
}
