//! `attesta member`: Add and remove organization members.

use clap::{Args, Subcommand};

use attesta_core::Role;
use attesta_identity::NewMember;

use super::{parse_did, print_seed, Context};

#[derive(Args, Debug)]
pub struct MemberArgs {
    #[command(subcommand)]
    pub command: MemberCommand,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// Add a member with its own identity.
    Add {
        /// Organization DID.
        #[arg(long)]
        org: String,
        /// Display name (people) or serial tag (machines).
        #[arg(long)]
        label: String,
        /// Operator, Machine or Creator.
        #[arg(long, default_value = "Operator")]
        role: String,
    },
    /// Remove a member and close its credit account.
    Remove {
        /// Organization DID.
        #[arg(long)]
        org: String,
        /// Member DID.
        did: String,
    },
}

pub async fn run(args: &MemberArgs, ctx: &Context) -> anyhow::Result<()> {
    match &args.command {
        MemberCommand::Add { org, label, role } => {
            let org = parse_did(org)?;
            let role: Role = role.parse()?;
            let new_member = match role {
                Role::Machine => NewMember::machine(label.clone()),
                other => NewMember::named(label.clone(), other),
            };

            let key = ctx.sealing_key()?;
            let (member, seed) = ctx.platform.add_member(&org, new_member, &key).await?;
            println!("Member added");
            println!("  Label:  {}", member.label);
            println!("  Role:   {}", member.role);
            println!("  DID:    {}", member.identity);
            print_seed(&seed);
        }
        MemberCommand::Remove { org, did } => {
            let org = parse_did(org)?;
            let did = parse_did(did)?;
            let member = ctx.platform.remove_member(&org, &did).await?;
            println!("Removed {} ({})", member.label, member.identity);
        }
    }
    Ok(())
}
