use std::fmt;

use crate::error::CoreError;

/// Integrity states of a credential document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CredentialState {
    /// No proof attached yet.
    Draft,
    /// Proof attached and it matches the payload.
    Issued,
    /// Proof attached but the payload no longer matches it.
    Tampered,
}

impl CredentialState {
    /// Whether the document currently carries a proof.
    pub fn has_proof(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Issued => write!(f, "Issued"),
            Self::Tampered => write!(f, "Tampered"),
        }
    }
}

/// Events that move a credential between integrity states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// A fresh proof is computed over the current payload.
    Issue,
    /// The payload changed after the proof was computed.
    Tamper,
}

/// Credential integrity transitions.
///
/// Valid transitions:
/// - Draft → Issued (Issue)
/// - Issued → Issued (Issue, re-issuance)
/// - Tampered → Issued (Issue)
/// - Issued → Tampered (Tamper)
///
/// There is no repair path out of `Tampered` other than a fresh issuance.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(
        current: CredentialState,
        event: CredentialEvent,
    ) -> Result<CredentialState, CoreError> {
        let new_state = match (current, event) {
            (_, CredentialEvent::Issue) => CredentialState::Issued,
            (CredentialState::Issued, CredentialEvent::Tamper) => CredentialState::Tampered,
            (from, CredentialEvent::Tamper) => {
                return Err(CoreError::InvalidStateTransition {
                    from,
                    to: CredentialState::Tampered,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "credential state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialState, event: CredentialEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
