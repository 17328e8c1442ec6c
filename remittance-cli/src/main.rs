//! Remittance CLI - move money between accounts from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{balance, config, logs, transfer};

/// remit - money transfers between accounts
#[derive(Parser)]
#[command(name = "remit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer money between two accounts stored in the configured DuckDB file
    ///
    /// Both accounts must already exist in the configured DuckDB file
    /// (see `remit config show`); this command never creates accounts.
    Transfer {
        /// Sender account ID
        #[arg(allow_negative_numbers = true)]
        from: i64,
        /// Recipient account ID
        #[arg(allow_negative_numbers = true)]
        to: i64,
        /// Amount in minor currency units (e.g. cents)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an account balance
    Balance {
        /// Account ID
        #[arg(allow_negative_numbers = true)]
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect transfer outcomes in the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Transfer { from, to, amount, json } => transfer::run(from, to, amount, json),
        Commands::Balance { id, json } => balance::run(id, json),
        Commands::Logs { command } => logs::run(command),
        Commands::Config { command } => config::run(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_transfer_help_says_accounts_must_exist() {
        let cli = Cli::command();
        let transfer = cli.find_subcommand("transfer").unwrap();

        let short = transfer.get_about().unwrap().to_string();
        assert!(short.contains("configured DuckDB file"));

        let long = transfer.get_long_about().unwrap().to_string();
        assert!(long.contains("must already exist"));
    }
}
