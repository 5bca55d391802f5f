//! `attesta lookup`: Find the entity a seed phrase belongs to.

use clap::Args;

use attesta_crypto::SecretSeed;
use attesta_identity::EntityKind;

use super::Context;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// The 12-word seed phrase, quoted.
    pub phrase: String,
}

pub async fn run(args: &LookupArgs, ctx: &Context) -> anyhow::Result<()> {
    let seed = SecretSeed::parse(&args.phrase)?;
    let key = ctx.sealing_key()?;
    let found = ctx.platform.find_by_secret(&seed, &key).await?;

    match found.kind {
        EntityKind::Organization => {
            println!("Organization {}", found.organization.name);
            println!("  DID:  {}", found.organization.identity);
        }
        EntityKind::Member => {
            if let Some(member) = &found.member {
                println!("Member {} ({})", member.label, member.role);
                println!("  DID:           {}", member.identity);
            }
            println!("  Organization:  {}", found.organization.name);
        }
    }
    Ok(())
}
