// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use chrono::Utc;
use contrib_events::{
    ContributionEvent, ContributionRevealed, ContributionTotalDecrypted, DecryptionRequested,
    RequestId, TotalDecryptionRequested, UpdateSubmitted,
};
use contrib_fhe::Ciphertext;
use contrib_ledger::{EncryptedUpdate, ProtocolError, ProtocolStore};
use contrib_oracle::{CallbackTarget, Cleartexts, DecryptionOracle, DecryptionProof, OracleVerifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Read view of a contribution record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedContribution {
    pub id: u64,
    pub value: u32,
    pub revealed: bool,
}

/// Cleartext of an aggregate total as delivered by the oracle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalDecrypted {
    pub id: u64,
    pub request_id: RequestId,
    pub value: u64,
}

/// The protocol state machine. Every mutating operation runs to completion or fails without
/// changing state, and returns the notification it produced alongside its result.
pub struct ContributionProtocol<C: Ciphertext> {
    store: ProtocolStore<C>,
    verifier: Arc<dyn OracleVerifier>,
    oracle: Arc<dyn DecryptionOracle<C>>,
}

impl<C: Ciphertext> ContributionProtocol<C> {
    pub fn new(verifier: Arc<dyn OracleVerifier>, oracle: Arc<dyn DecryptionOracle<C>>) -> Self {
        Self {
            store: ProtocolStore::default(),
            verifier,
            oracle,
        }
    }

    /// Resume from a stored state. The oracle is told the highest request id already issued so
    /// a restarted oracle does not hand out an id that is still pending or was already answered.
    pub fn from_store(
        store: ProtocolStore<C>,
        verifier: Arc<dyn OracleVerifier>,
        oracle: Arc<dyn DecryptionOracle<C>>,
    ) -> Result<Self, ProtocolError> {
        if let Some(last) = store.requests().last_issued() {
            oracle.resume_after(last)?;
        }
        Ok(Self {
            store,
            verifier,
            oracle,
        })
    }

    pub fn store(&self) -> &ProtocolStore<C> {
        &self.store
    }

    pub fn submit_encrypted_update(
        &mut self,
        encrypted_weights: C,
        encrypted_metrics: C,
    ) -> (u64, ContributionEvent) {
        let submitted_at = Utc::now();
        let id = self
            .store
            .submit(encrypted_weights, encrypted_metrics, submitted_at);
        (id, UpdateSubmitted { id, submitted_at }.into())
    }

    pub fn request_update_decryption(
        &mut self,
        id: u64,
    ) -> Result<(RequestId, ContributionEvent), ProtocolError> {
        let request_id = self
            .store
            .issue_update_decryption(id, self.oracle.as_ref())?;
        info!(id, %request_id, "Update decryption requested");
        Ok((request_id, DecryptionRequested { id, request_id }.into()))
    }

    /// Oracle callback for a contribution request
    pub fn decrypt_contribution(
        &mut self,
        request_id: RequestId,
        cleartexts: &Cleartexts,
        proof: &DecryptionProof,
    ) -> Result<(DecryptedContribution, ContributionEvent), ProtocolError> {
        self.verify(request_id, cleartexts, proof)?;
        let id = self
            .store
            .requests()
            .resolve(request_id, CallbackTarget::DecryptContribution)?
            .target_id;
        let value = cleartexts
            .decode_u32(0)
            .map_err(|source| ProtocolError::MalformedCleartext { request_id, source })?;
        self.store.reveal(request_id, value)?;

        Ok((
            DecryptedContribution {
                id,
                value,
                revealed: true,
            },
            ContributionRevealed {
                id,
                request_id,
                value,
            }
            .into(),
        ))
    }

    pub fn get_decrypted_contribution(&self, id: u64) -> Option<DecryptedContribution> {
        self.store
            .contributions()
            .get(id)
            .map(|record| DecryptedContribution {
                id: record.participant_id,
                value: record.shapley_value,
                revealed: record.revealed,
            })
    }

    pub fn get_encrypted_contribution_total(&self, id: u64) -> Option<C> {
        self.store.aggregates().get_total(id).cloned()
    }

    pub fn request_contribution_total_decryption(
        &mut self,
        id: u64,
    ) -> Result<(RequestId, ContributionEvent), ProtocolError> {
        let request_id = self
            .store
            .issue_total_decryption(id, self.oracle.as_ref())?;
        info!(id, %request_id, "Total decryption requested");
        Ok((request_id, TotalDecryptionRequested { id, request_id }.into()))
    }

    /// Oracle callback for a total request. The value is only delivered, nothing else changes.
    pub fn decrypt_total_contribution(
        &mut self,
        request_id: RequestId,
        cleartexts: &Cleartexts,
        proof: &DecryptionProof,
    ) -> Result<(TotalDecrypted, ContributionEvent), ProtocolError> {
        self.verify(request_id, cleartexts, proof)?;
        self.store
            .requests()
            .resolve(request_id, CallbackTarget::DecryptTotalContribution)?;
        let value = cleartexts
            .decode_u64(0)
            .map_err(|source| ProtocolError::MalformedCleartext { request_id, source })?;
        let pending = self.store.complete_total(request_id)?;
        let id = pending.target_id;
        info!(id, %request_id, value, "Contribution total decrypted");

        Ok((
            TotalDecrypted {
                id,
                request_id,
                value,
            },
            ContributionTotalDecrypted {
                id,
                request_id,
                value,
            }
            .into(),
        ))
    }

    pub fn get_encrypted_update(&self, id: u64) -> Option<EncryptedUpdate<C>> {
        self.store.get_update(id).cloned()
    }

    pub fn participants(&self) -> Vec<u64> {
        self.store.aggregates().participants().to_vec()
    }

    fn verify(
        &self,
        request_id: RequestId,
        cleartexts: &Cleartexts,
        proof: &DecryptionProof,
    ) -> Result<(), ProtocolError> {
        if self.verifier.verify(request_id, cleartexts, proof) {
            return Ok(());
        }
        warn!(%request_id, "Rejecting callback with invalid decryption proof");
        Err(ProtocolError::VerificationFailed(request_id))
    }
}
