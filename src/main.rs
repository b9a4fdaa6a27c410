mod cli;
mod ops;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use ops::Target;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    rewind::logging::init(cli.verbose);

    let target = Target {
        connection: cli.connection,
        config: cli.config,
    };

    match cli.command {
        Commands::Snapshot { args, no_revert_previous } => {
            ops::do_snapshot(&target, args, !no_revert_previous)?;
        }
        Commands::Revert => {
            ops::do_revert(&target)?;
        }
        Commands::Run { args, command } => {
            return ops::do_run(&target, args, command);
        }
        Commands::Tables => {
            ops::do_tables(&target)?;
        }
        Commands::Version => {
            ops::do_version();
        }
    }

    Ok(0)
}
