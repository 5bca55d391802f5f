//! Entity Directory: organizations and their members, persisted as one
//! whole aggregate under [`DIRECTORY_KEY`].

use std::sync::Arc;

use attesta_core::store::{load, save};
use attesta_core::{Did, Store};
use attesta_crypto::SecretSeed;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::entity::{EntityKind, LookupMatch, Member, NewMember, Organization};
use crate::error::IdentityError;
use crate::manager::{IdentityManager, SecretKey};

/// Store key holding every organization.
pub const DIRECTORY_KEY: &str = "directory";

#[derive(Debug, Default, Serialize, Deserialize)]
struct DirectoryState {
    organizations: Vec<Organization>,
}

impl DirectoryState {
    fn position(&self, did: &Did) -> Result<usize, IdentityError> {
        self.organizations
            .iter()
            .position(|o| &o.identity == did)
            .ok_or_else(|| IdentityError::NotFound(format!("organization {}", did)))
    }
}

/// Manages organizations and members on top of a [`Store`].
///
/// Each mutation holds the write lock across read → compute → write and ends
/// in a single `set`, so callers sharing this directory never lose updates.
pub struct EntityDirectory {
    store: Arc<dyn Store>,
    identities: IdentityManager,
    write_lock: Mutex<()>,
}

impl EntityDirectory {
    pub fn new(store: Arc<dyn Store>, identities: IdentityManager) -> Self {
        Self {
            store,
            identities,
            write_lock: Mutex::new(()),
        }
    }

    /// The identity manager used to mint and open secrets.
    pub fn identities(&self) -> &IdentityManager {
        &self.identities
    }

    async fn load_state(&self) -> Result<DirectoryState, IdentityError> {
        Ok(load(self.store.as_ref(), DIRECTORY_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn save_state(&self, state: &DirectoryState) -> Result<(), IdentityError> {
        save(self.store.as_ref(), DIRECTORY_KEY, state).await?;
        Ok(())
    }

    /// Register a new organization with a freshly minted identity.
    ///
    /// The returned seed is the only copy in plaintext; show it once.
    pub async fn register_organization(
        &self,
        name: &str,
        key: &SecretKey,
    ) -> Result<(Organization, SecretSeed), IdentityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::Validation(
                "organization name must not be empty".into(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;

        let minted = self.identities.mint(key)?;
        if state
            .organizations
            .iter()
            .any(|o| o.identity == minted.identity.did)
        {
            return Err(IdentityError::Validation(format!(
                "organization {} already exists",
                minted.identity.did
            )));
        }

        let org = Organization {
            name: name.to_string(),
            identity: minted.identity.did.clone(),
            encrypted_secret: minted.blob.clone(),
            members: Vec::new(),
            created_at: Utc::now(),
        };
        state.organizations.push(org.clone());
        self.save_state(&state).await?;

        tracing::info!(did = %org.identity, name = %org.name, "organization registered");
        Ok((org, minted.seed))
    }

    /// Add a member with its own scoped identity to an organization.
    pub async fn add_member(
        &self,
        org_did: &Did,
        new_member: NewMember,
        key: &SecretKey,
    ) -> Result<(Member, SecretSeed), IdentityError> {
        new_member.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        let idx = state.position(org_did)?;

        let minted = self.identities.mint(key)?;
        let did = minted.identity.did.clone();
        let org = &mut state.organizations[idx];
        if org.identity == did || org.member(&did).is_some() {
            return Err(IdentityError::Validation(format!(
                "member {} already exists in {}",
                did, org_did
            )));
        }

        let member = Member {
            label: new_member.label,
            role: new_member.role,
            identity: did.clone(),
            encrypted_secret: minted.blob.clone(),
            balance_ref: did.to_string(),
            created_at: Utc::now(),
        };
        org.members.push(member.clone());
        self.save_state(&state).await?;

        tracing::info!(
            org = %org_did,
            did = %member.identity,
            role = %member.role,
            "member added"
        );
        Ok((member, minted.seed))
    }

    /// Remove one member from an organization.
    pub async fn remove_member(
        &self,
        org_did: &Did,
        member_did: &Did,
    ) -> Result<Member, IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        let idx = state.position(org_did)?;

        let org = &mut state.organizations[idx];
        let pos = org
            .members
            .iter()
            .position(|m| &m.identity == member_did)
            .ok_or_else(|| {
                IdentityError::NotFound(format!("member {} in {}", member_did, org_did))
            })?;
        let removed = org.members.remove(pos);
        self.save_state(&state).await?;

        tracing::info!(org = %org_did, did = %member_did, "member removed");
        Ok(removed)
    }

    /// Remove an organization together with all of its members.
    pub async fn remove_organization(&self, org_did: &Did) -> Result<Organization, IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        let idx = state.position(org_did)?;

        let removed = state.organizations.remove(idx);
        self.save_state(&state).await?;

        tracing::info!(
            did = %org_did,
            members = removed.members.len(),
            "organization removed"
        );
        Ok(removed)
    }

    /// Put back an organization taken out by
    /// [`remove_organization`](Self::remove_organization), at its
    /// registration position.
    pub async fn restore_organization(&self, org: Organization) -> Result<(), IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        if state.organizations.iter().any(|o| o.identity == org.identity) {
            return Err(IdentityError::Validation(format!(
                "organization {} already exists",
                org.identity
            )));
        }

        let at = state
            .organizations
            .partition_point(|o| o.created_at <= org.created_at);
        tracing::warn!(did = %org.identity, "organization restored");
        state.organizations.insert(at, org);
        self.save_state(&state).await
    }

    /// Put back a member taken out by [`remove_member`](Self::remove_member).
    pub async fn restore_member(&self, org_did: &Did, member: Member) -> Result<(), IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        let idx = state.position(org_did)?;

        let org = &mut state.organizations[idx];
        if org.member(&member.identity).is_some() {
            return Err(IdentityError::Validation(format!(
                "member {} already exists in {}",
                member.identity, org_did
            )));
        }
        let at = org
            .members
            .partition_point(|m| m.created_at <= member.created_at);
        tracing::warn!(org = %org_did, did = %member.identity, "member restored");
        org.members.insert(at, member);
        self.save_state(&state).await
    }

    /// All organizations, in registration order.
    pub async fn organizations(&self) -> Result<Vec<Organization>, IdentityError> {
        Ok(self.load_state().await?.organizations)
    }

    /// One organization by DID.
    pub async fn organization(&self, did: &Did) -> Result<Organization, IdentityError> {
        let mut state = self.load_state().await?;
        let idx = state.position(did)?;
        Ok(state.organizations.swap_remove(idx))
    }

    /// One member of an organization.
    pub async fn member(&self, org_did: &Did, member_did: &Did) -> Result<Member, IdentityError> {
        let org = self.organization(org_did).await?;
        org.member(member_did).cloned().ok_or_else(|| {
            IdentityError::NotFound(format!("member {} in {}", member_did, org_did))
        })
    }

    /// Find the entity whose sealed secret opens to `secret` under `key`.
    ///
    /// Linear scan over every organization and member, opening each blob and
    /// comparing; the first match wins. Records that do not open under `key`
    /// are skipped.
    pub async fn find_by_secret(
        &self,
        secret: &SecretSeed,
        key: &SecretKey,
    ) -> Result<LookupMatch, IdentityError> {
        let state = self.load_state().await?;
        let mut attempts = 0usize;

        for org in &state.organizations {
            attempts += 1;
            if self.opens_to(&org.encrypted_secret, secret, key, &org.identity) {
                tracing::debug!(did = %org.identity, attempts, "secret matched organization");
                return Ok(LookupMatch {
                    kind: EntityKind::Organization,
                    organization: org.clone(),
                    member: None,
                });
            }
            for member in &org.members {
                attempts += 1;
                if self.opens_to(&member.encrypted_secret, secret, key, &member.identity) {
                    tracing::debug!(did = %member.identity, attempts, "secret matched member");
                    return Ok(LookupMatch {
                        kind: EntityKind::Member,
                        organization: org.clone(),
                        member: Some(member.clone()),
                    });
                }
            }
        }

        tracing::debug!(attempts, "no entity matched secret");
        Err(IdentityError::NotFound("no entity matches the given secret".into()))
    }

    fn opens_to(
        &self,
        blob: &crate::manager::EncryptedSecretBlob,
        secret: &SecretSeed,
        key: &SecretKey,
        did: &Did,
    ) -> bool {
        match self.identities.decrypt_secret(blob, key) {
            Ok(stored) => stored == *secret,
            Err(e) => {
                tracing::trace!(did = %did, error = %e, "record skipped during lookup");
                false
            }
        }
    }

    /// Re-seal every secret under `new_key` in one aggregate write. Fails
    /// without writing if any record does not open under `old_key`.
    pub async fn rewrap_secrets(
        &self,
        old_key: &SecretKey,
        new_key: &SecretKey,
    ) -> Result<usize, IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load_state().await?;
        let mut count = 0usize;

        for org in &mut state.organizations {
            org.encrypted_secret =
                self.identities
                    .rewrap_secret(&org.encrypted_secret, old_key, new_key)?;
            count += 1;
            for member in &mut org.members {
                member.encrypted_secret =
                    self.identities
                        .rewrap_secret(&member.encrypted_secret, old_key, new_key)?;
                count += 1;
            }
        }
        self.save_state(&state).await?;

        tracing::info!(records = count, "secrets rewrapped");
        Ok(count)
    }
}
