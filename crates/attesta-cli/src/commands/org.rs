//! `attesta org`: Register, list and remove organizations.

use clap::{Args, Subcommand};

use super::{parse_did, print_seed, Context};

#[derive(Args, Debug)]
pub struct OrgArgs {
    #[command(subcommand)]
    pub command: OrgCommand,
}

#[derive(Subcommand, Debug)]
pub enum OrgCommand {
    /// Register a new organization with a fresh identity.
    Register {
        /// Organization name.
        name: String,
    },
    /// List organizations and their members.
    List,
    /// Remove an organization, its members and their credit accounts.
    Remove {
        /// Organization DID.
        did: String,
    },
}

pub async fn run(args: &OrgArgs, ctx: &Context) -> anyhow::Result<()> {
    match &args.command {
        OrgCommand::Register { name } => {
            let key = ctx.sealing_key()?;
            let (org, seed) = ctx.platform.register_organization(name, &key).await?;
            println!("Organization registered");
            println!("  Name:  {}", org.name);
            println!("  DID:   {}", org.identity);
            print_seed(&seed);
        }
        OrgCommand::List => {
            let orgs = ctx.platform.directory().organizations().await?;
            if orgs.is_empty() {
                println!("No organizations.");
            }
            for org in orgs {
                println!("{}  {}", org.identity, org.name);
                for member in &org.members {
                    println!("    {}  {} ({})", member.identity, member.label, member.role);
                }
            }
        }
        OrgCommand::Remove { did } => {
            let did = parse_did(did)?;
            let org = ctx.platform.remove_organization(&did).await?;
            println!(
                "Removed {} and {} member(s)",
                org.name,
                org.members.len()
            );
        }
    }
    Ok(())
}
