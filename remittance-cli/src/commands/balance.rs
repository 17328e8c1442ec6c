//! Balance command - show a stored account

use std::process::exit;

use anyhow::Result;
use colored::Colorize;

use remittance_core::{AccountId, AccountStore, Error, LogEvent, OperationResult};

use super::{get_context, get_logger, log_event};
use crate::output;

pub fn run(id: i64, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::command_executed("balance"));

    let ctx = get_context()?;
    let id = AccountId::new(id);

    let account = ctx
        .store
        .load_by_id(id)
        .map_err(Error::store)
        .and_then(|found| found.ok_or(Error::NotFound(id)));

    if json {
        let output: OperationResult<_> = account.into();
        println!("{}", serde_json::to_string_pretty(&output)?);
        if !output.success {
            exit(1);
        }
        return Ok(());
    }

    let account = account?;
    println!("{}", format!("Account {}", account.id).bold());
    println!(
        "Balance: {} ({} minor units)",
        output::format_amount(account.balance),
        account.balance
    );

    Ok(())
}
