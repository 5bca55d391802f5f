use std::sync::Arc;

use attesta_core::{Did, PlatformConfig, Store};
use attesta_credentials::{CredentialDocument, CredentialKind, VerificationResult};
use attesta_crypto::SecretSeed;
use attesta_identity::{
    EntityDirectory, IdentityManager, LookupMatch, Member, NewMember, Organization, SecretKey,
};
use attesta_ledger::{CreditLedger, Party, Transaction};
use serde_json::Value;

use crate::error::PlatformError;

/// The platform's action layer.
///
/// Owns the entity directory and the credit ledger over one shared store and
/// keeps them in step: new identities get ledger accounts, removed ones have
/// their accounts closed back into the pool.
pub struct Platform {
    config: PlatformConfig,
    directory: EntityDirectory,
    ledger: CreditLedger,
}

impl Platform {
    pub fn new(store: Arc<dyn Store>, config: PlatformConfig) -> Self {
        let identities = IdentityManager::new(config.kdf);
        Self {
            directory: EntityDirectory::new(store.clone(), identities),
            ledger: CreditLedger::new(store),
            config,
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn directory(&self) -> &EntityDirectory {
        &self.directory
    }

    pub fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    /// Pick the sealing key: an explicit password wins, otherwise the
    /// configured legacy app key.
    pub fn sealing_key(&self, password: Option<String>) -> Result<SecretKey, PlatformError> {
        match (password, &self.config.legacy_app_key) {
            (Some(pw), _) if !pw.is_empty() => Ok(SecretKey::Password(pw)),
            (_, Some(app_key)) if !app_key.is_empty() => Ok(SecretKey::AppKey(app_key.clone())),
            _ => Err(PlatformError::Validation(
                "a password is required when no legacy app key is configured".into(),
            )),
        }
    }

    // ---- Entities ----

    /// Register an organization and open its ledger account.
    pub async fn register_organization(
        &self,
        name: &str,
        key: &SecretKey,
    ) -> Result<(Organization, SecretSeed), PlatformError> {
        let (org, seed) = self.directory.register_organization(name, key).await?;
        if let Err(e) = self.ledger.open_account(&org.identity).await {
            tracing::warn!(did = %org.identity, error = %e, "rolling back organization");
            self.directory.remove_organization(&org.identity).await?;
            return Err(e.into());
        }
        Ok((org, seed))
    }

    /// Add a member, charging the organization `member_fee` first.
    pub async fn add_member(
        &self,
        org_did: &Did,
        new_member: NewMember,
        key: &SecretKey,
    ) -> Result<(Member, SecretSeed), PlatformError> {
        // Bad input and unknown organizations must fail before anything is charged.
        new_member.validate()?;
        self.directory.organization(org_did).await?;

        let fee = self.config.member_fee;
        if fee > 0 {
            self.ledger.consume(org_did, fee, "add member").await?;
        }

        let added = match self.directory.add_member(org_did, new_member, key).await {
            Ok(added) => added,
            Err(e) => {
                if fee > 0 {
                    self.refund(org_did, fee, "refund: add member", e.to_string())
                        .await?;
                }
                return Err(e.into());
            }
        };
        self.ledger.open_account(&added.0.identity).await?;
        Ok(added)
    }

    /// Remove a member and close its ledger account.
    pub async fn remove_member(
        &self,
        org_did: &Did,
        member_did: &Did,
    ) -> Result<Member, PlatformError> {
        let member = self.directory.remove_member(org_did, member_did).await?;
        match self
            .ledger
            .close_accounts(std::slice::from_ref(&member.identity))
            .await
        {
            Ok(returned) => {
                tracing::info!(did = %member.identity, returned, "member account closed");
                Ok(member)
            }
            Err(e) => {
                tracing::warn!(did = %member.identity, error = %e, "rolling back member removal");
                self.directory.restore_member(org_did, member).await?;
                Err(e.into())
            }
        }
    }

    /// Remove an organization, its members, and all of their ledger accounts.
    pub async fn remove_organization(&self, org_did: &Did) -> Result<Organization, PlatformError> {
        let org = self.directory.remove_organization(org_did).await?;
        match self.ledger.close_accounts(&org.all_identities()).await {
            Ok(returned) => {
                tracing::info!(did = %org.identity, returned, "organization accounts closed");
                Ok(org)
            }
            Err(e) => {
                tracing::warn!(did = %org.identity, error = %e, "rolling back organization removal");
                self.directory.restore_organization(org).await?;
                Err(e.into())
            }
        }
    }

    pub async fn find_by_secret(
        &self,
        secret: &SecretSeed,
        key: &SecretKey,
    ) -> Result<LookupMatch, PlatformError> {
        Ok(self.directory.find_by_secret(secret, key).await?)
    }

    // ---- Credentials ----

    /// Issue a credential on behalf of `issuer`, paying `issuance_fee` first.
    /// On a failed payment the document is not stamped and nothing changes.
    pub async fn issue_credential(
        &self,
        issuer: &Did,
        doc: &CredentialDocument,
    ) -> Result<CredentialDocument, PlatformError> {
        doc.validate()?;
        self.charge_issuance(issuer, &doc.kind()).await?;
        Ok(attesta_credentials::issue(doc, issuer)?)
    }

    /// Raw-JSON variant of [`Platform::issue_credential`].
    pub async fn issue_credential_value(
        &self,
        issuer: &Did,
        doc: &Value,
    ) -> Result<Value, PlatformError> {
        if !doc.is_object() {
            return Err(PlatformError::Validation(
                "credential document must be a JSON object".into(),
            ));
        }
        let kind = doc
            .get("type")
            .and_then(|t| serde_json::from_value::<Vec<String>>(t.clone()).ok())
            .map(|types| CredentialKind::from_types(&types))
            .unwrap_or_else(|| CredentialKind::Custom("credential".into()));
        self.charge_issuance(issuer, &kind).await?;
        Ok(attesta_credentials::issue_value(doc, issuer)?)
    }

    pub fn verify_credential(&self, doc: &Value) -> VerificationResult {
        attesta_credentials::verify_value(doc)
    }

    async fn charge_issuance(&self, issuer: &Did, kind: &CredentialKind) -> Result<(), PlatformError> {
        let fee = self.config.issuance_fee;
        if fee == 0 {
            return Ok(());
        }
        self.ledger
            .consume(issuer, fee, &format!("issue {}", kind))
            .await?;
        Ok(())
    }

    // ---- Ledger ----

    pub async fn bootstrap(&self, amount: u64) -> Result<(), PlatformError> {
        Ok(self.ledger.bootstrap(amount).await?)
    }

    /// Move credits from the pool to an identity.
    pub async fn fund(&self, did: &Did, amount: u64, description: &str) -> Result<(), PlatformError> {
        Ok(self
            .ledger
            .transfer(&Party::Pool, &Party::Identity(did.clone()), amount, description)
            .await?)
    }

    pub async fn transfer(
        &self,
        from: &Did,
        to: &Did,
        amount: u64,
        description: &str,
    ) -> Result<(), PlatformError> {
        Ok(self
            .ledger
            .transfer(&Party::from(from), &Party::from(to), amount, description)
            .await?)
    }

    pub async fn consume(&self, did: &Did, amount: u64, description: &str) -> Result<(), PlatformError> {
        Ok(self.ledger.consume(did, amount, description).await?)
    }

    pub async fn balance(&self, party: &Party) -> Result<u64, PlatformError> {
        Ok(self.ledger.balance(party).await?)
    }

    pub async fn history(&self, party: &Party) -> Result<Vec<Transaction>, PlatformError> {
        Ok(self.ledger.history(party).await?)
    }

    /// Return a fee charged for an action that then failed with `cause`.
    async fn refund(
        &self,
        did: &Did,
        amount: u64,
        description: &str,
        cause: String,
    ) -> Result<(), PlatformError> {
        self.ledger
            .transfer(&Party::Pool, &Party::Identity(did.clone()), amount, description)
            .await
            .map_err(|source| {
                tracing::error!(did = %did, amount, error = %source, "refund failed");
                PlatformError::RefundFailed {
                    did: did.to_string(),
                    amount,
                    cause,
                    source,
                }
            })
    }
}
