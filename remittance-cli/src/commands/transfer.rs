//! Transfer command - move money between two stored accounts

use std::process::exit;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use remittance_core::{AccountId, AccountStore, LogEvent, OperationResult};

use super::{get_context, get_logger, log_event};
use crate::output;

/// JSON payload of a completed transfer
#[derive(Debug, Serialize)]
struct TransferReceipt {
    from: AccountId,
    to: AccountId,
    amount: i64,
    from_balance: i64,
    to_balance: i64,
}

pub fn run(from: i64, to: i64, amount: i64, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::command_executed("transfer"));

    let ctx = get_context()?;
    let (from, to) = (AccountId::new(from), AccountId::new(to));

    let result = ctx.transfer_service.transfer_by_ids(from, to, amount);
    match &result {
        Ok(()) => log_event(&logger, LogEvent::transfer_completed()),
        Err(e) => log_event(&logger, LogEvent::transfer_failed(e)),
    }

    let receipt = match result {
        Ok(()) => {
            let from_balance = ctx.store.load_by_id(from)?.map(|a| a.balance).unwrap_or_default();
            let to_balance = ctx.store.load_by_id(to)?.map(|a| a.balance).unwrap_or_default();
            Ok(TransferReceipt {
                from,
                to,
                amount,
                from_balance,
                to_balance,
            })
        }
        Err(e) => Err(e),
    };

    if json {
        let output: OperationResult<TransferReceipt> = receipt.into();
        println!("{}", serde_json::to_string_pretty(&output)?);
        if !output.success {
            exit(1);
        }
        return Ok(());
    }

    let receipt = receipt?;
    output::success(&format!(
        "Transferred {} from account {} to account {}",
        output::format_amount(receipt.amount),
        receipt.from,
        receipt.to
    ));

    let mut table = output::create_table();
    table.set_header(vec!["Account", "Balance"]);
    table.add_row(vec![receipt.from.to_string(), output::format_amount(receipt.from_balance)]);
    table.add_row(vec![receipt.to.to_string(), output::format_amount(receipt.to_balance)]);
    println!("{}", table);
    println!("{}", "Amounts are shown in major units (minor units / 100)".dimmed());

    Ok(())
}
