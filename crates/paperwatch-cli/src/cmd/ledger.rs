//! `paperwatch ledger` - inspect the seen-paper ledger

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Subcommand};
use paperwatch_store::Ledger;

use super::table;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub action: LedgerAction,
}

#[derive(Subcommand, Debug)]
pub enum LedgerAction {
    /// List seen paper IDs with the time they were first reported
    List,
}

pub fn run(args: LedgerArgs, config: &Config) -> Result<ExitCode> {
    match args.action {
        LedgerAction::List => list(&Ledger::load(&config.storage.ledger_path)),
    }
}

fn list(ledger: &Ledger) -> Result<ExitCode> {
    if ledger.is_empty() {
        eprintln!("No papers seen yet ({}).", ledger.path().display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = table(&["ID", "Seen"]);
    for (id, seen) in ledger.iter() {
        table.add_row(vec![id, seen]);
    }
    eprintln!("\n{table}");
    eprintln!("{} papers seen", ledger.len());
    Ok(ExitCode::SUCCESS)
}
