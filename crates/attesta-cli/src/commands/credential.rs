//! `attesta credential`: Issue and verify credentials.

use clap::{Args, Subcommand};

use super::{parse_did, read_json, Context};

#[derive(Args, Debug)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub command: CredentialCommand,
}

#[derive(Subcommand, Debug)]
pub enum CredentialCommand {
    /// Stamp a credential with a digest proof, paying the issuance fee.
    Issue {
        /// Issuer DID; its account pays the fee.
        #[arg(long)]
        issuer: String,
        /// Credential JSON (as string or path to file).
        #[arg(short, long)]
        credential: String,
    },
    /// Check a credential against its proof.
    Verify {
        /// Credential JSON (as string or path to file).
        #[arg(short, long)]
        credential: String,
    },
}

pub async fn run(args: &CredentialArgs, ctx: &Context) -> anyhow::Result<()> {
    match &args.command {
        CredentialCommand::Issue { issuer, credential } => {
            let issuer = parse_did(issuer)?;
            let doc = read_json(credential)?;
            let issued = ctx.platform.issue_credential_value(&issuer, &doc).await?;
            println!("{}", serde_json::to_string_pretty(&issued)?);
        }
        CredentialCommand::Verify { credential } => {
            let doc = read_json(credential)?;
            let result = ctx.platform.verify_credential(&doc);
            if result.valid {
                println!("Credential is VALID");
            } else {
                println!("Credential is INVALID");
            }
            println!();
            for check in &result.checks {
                let mark = if check.passed { "PASS" } else { "FAIL" };
                match &check.detail {
                    Some(detail) => println!("  [{}] {}: {}", mark, check.name, detail),
                    None => println!("  [{}] {}", mark, check.name),
                }
            }
            println!("  State: {}", attesta_credentials::classify(&doc));
            if !result.valid {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
