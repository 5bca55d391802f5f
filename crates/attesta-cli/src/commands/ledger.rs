//! `attesta ledger`: Bootstrap, move and inspect credits.

use clap::{Args, Subcommand};

use attesta_ledger::{Party, TransactionKind};

use super::{parse_did, parse_party, Context};

#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Mint the system pool. Allowed once.
    Bootstrap {
        amount: u64,
    },
    /// Move credits. `--from pool` allocates from the system pool.
    Transfer {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "transfer")]
        description: String,
    },
    /// Spend credits from an identity.
    Consume {
        did: String,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        description: String,
    },
    /// Show a balance (`pool` or a DID).
    Balance {
        party: String,
    },
    /// Show transaction history (`pool` or a DID).
    History {
        party: String,
    },
}

pub async fn run(args: &LedgerArgs, ctx: &Context) -> anyhow::Result<()> {
    let ledger = ctx.platform.ledger();
    match &args.command {
        LedgerCommand::Bootstrap { amount } => {
            ctx.platform.bootstrap(*amount).await?;
            println!("Pool bootstrapped with {} credits", amount);
        }
        LedgerCommand::Transfer {
            from,
            to,
            amount,
            description,
        } => {
            let from = parse_party(from)?;
            let to = parse_party(to)?;
            ledger.transfer(&from, &to, *amount, description).await?;
            println!("Transferred {} from {} to {}", amount, from, to);
            println!("  {} balance: {}", from, ledger.balance(&from).await?);
            println!("  {} balance: {}", to, ledger.balance(&to).await?);
        }
        LedgerCommand::Consume {
            did,
            amount,
            description,
        } => {
            let did = parse_did(did)?;
            ctx.platform.consume(&did, *amount, description).await?;
            let balance = ledger.balance(&Party::Identity(did)).await?;
            println!("Consumed {} ({}); balance {}", amount, description, balance);
        }
        LedgerCommand::Balance { party } => {
            let party = parse_party(party)?;
            println!("{}", ctx.platform.balance(&party).await?);
        }
        LedgerCommand::History { party } => {
            let party = parse_party(party)?;
            let history = ctx.platform.history(&party).await?;
            if history.is_empty() {
                println!("No transactions.");
            }
            for tx in history {
                let kind = match tx.kind {
                    TransactionKind::Credit => "credit",
                    TransactionKind::Debit => "debit ",
                };
                println!(
                    "{}  {}  {:>8}  {}  ({})",
                    tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    kind,
                    tx.delta,
                    tx.description,
                    tx.counterparty
                );
            }
        }
    }
    Ok(())
}
