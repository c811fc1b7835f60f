// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    AggregationEngine, ContributionLedger, EncryptedUpdate, PendingRequest, ProtocolError,
    RequestTracker, UpdateLedger,
};
use chrono::{DateTime, Utc};
use contrib_events::RequestId;
use contrib_fhe::Ciphertext;
use contrib_oracle::{CallbackTarget, DecryptionOracle};
use serde::{Deserialize, Serialize};
use tracing::info;

/// All protocol state in one serializable value. Every method either fails without mutating
/// anything or applies its whole change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Ciphertext")]
pub struct ProtocolStore<C> {
    updates: UpdateLedger<C>,
    contributions: ContributionLedger,
    requests: RequestTracker,
    aggregates: AggregationEngine<C>,
}

impl<C: Ciphertext> Default for ProtocolStore<C> {
    fn default() -> Self {
        Self {
            updates: UpdateLedger::default(),
            contributions: ContributionLedger::default(),
            requests: RequestTracker::default(),
            aggregates: AggregationEngine::default(),
        }
    }
}

impl<C: Ciphertext> ProtocolStore<C> {
    pub fn updates(&self) -> &UpdateLedger<C> {
        &self.updates
    }

    pub fn contributions(&self) -> &ContributionLedger {
        &self.contributions
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    pub fn aggregates(&self) -> &AggregationEngine<C> {
        &self.aggregates
    }

    /// Store the update and open an unrevealed contribution record for it
    pub fn submit(
        &mut self,
        encrypted_weights: C,
        encrypted_metrics: C,
        submitted_at: DateTime<Utc>,
    ) -> u64 {
        let id = self
            .updates
            .submit(encrypted_weights, encrypted_metrics, submitted_at);
        self.contributions.open(id);
        info!(id, "Encrypted update stored");
        id
    }

    pub fn get_update(&self, id: u64) -> Option<&EncryptedUpdate<C>> {
        self.updates.get(id)
    }

    /// Ask the oracle to decrypt the update's handles and remember the request
    pub fn issue_update_decryption(
        &mut self,
        id: u64,
        oracle: &dyn DecryptionOracle<C>,
    ) -> Result<RequestId, ProtocolError> {
        let update = self.updates.get(id).ok_or(ProtocolError::NotFound(id))?;
        if self.contributions.is_revealed(id) {
            return Err(ProtocolError::AlreadyRevealed(id));
        }
        let handles = vec![
            update.encrypted_metrics.clone(),
            update.encrypted_weights.clone(),
        ];
        let request_id = oracle.request_decryption(handles, CallbackTarget::DecryptContribution)?;
        self.requests
            .track(request_id, id, CallbackTarget::DecryptContribution)?;
        Ok(request_id)
    }

    /// Ask the oracle to decrypt the id's aggregate total
    pub fn issue_total_decryption(
        &mut self,
        id: u64,
        oracle: &dyn DecryptionOracle<C>,
    ) -> Result<RequestId, ProtocolError> {
        let total = self
            .aggregates
            .get_total(id)
            .ok_or(ProtocolError::NotFound(id))?;
        let request_id =
            oracle.request_decryption(vec![total.clone()], CallbackTarget::DecryptTotalContribution)?;
        self.requests
            .track(request_id, id, CallbackTarget::DecryptTotalContribution)?;
        Ok(request_id)
    }

    /// Record a verified Shapley value for the request's target. Consumes the request along with
    /// every other pending contribution request for the same target, marks the record revealed and
    /// adds the value to the target's total.
    pub fn reveal(
        &mut self,
        request_id: RequestId,
        shapley_value: u32,
    ) -> Result<PendingRequest, ProtocolError> {
        let pending = self
            .requests
            .resolve(request_id, CallbackTarget::DecryptContribution)?
            .clone();
        let id = pending.target_id;
        match self.contributions.get(id) {
            None => return Err(ProtocolError::NotFound(id)),
            Some(record) if record.revealed => return Err(ProtocolError::AlreadyRevealed(id)),
            Some(_) => {}
        }

        self.requests
            .invalidate_target(id, CallbackTarget::DecryptContribution);
        self.contributions.mark_revealed(id, shapley_value)?;
        self.aggregates.accumulate(id, shapley_value);
        info!(id, %request_id, shapley_value, "Contribution revealed");
        Ok(pending)
    }

    /// Consume a verified total decryption request
    pub fn complete_total(&mut self, request_id: RequestId) -> Result<PendingRequest, ProtocolError> {
        self.requests
            .resolve(request_id, CallbackTarget::DecryptTotalContribution)?;
        self.requests
            .consume(request_id)
            .ok_or(ProtocolError::UnknownRequest(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use contrib_fhe::TaggedCiphertext;
    use contrib_oracle::{OracleError, OracleGateway};
    use proptest::prelude::*;

    fn submit(store: &mut ProtocolStore<TaggedCiphertext>, value: u64) -> u64 {
        store.submit(
            TaggedCiphertext::encrypt(1),
            TaggedCiphertext::encrypt(value),
            Utc::now(),
        )
    }

    #[test]
    fn submit_opens_unrevealed_record() {
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        let id = submit(&mut store, 30);
        assert!(store.get_update(id).is_some());
        assert_eq!(
            store.contributions().get(id).map(|r| r.revealed),
            Some(false)
        );
        assert!(store.aggregates().participants().is_empty());
    }

    #[test]
    fn update_decryption_sends_metrics_then_weights() -> Result<()> {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        let id = store.submit(
            TaggedCiphertext::encrypt(7),
            TaggedCiphertext::encrypt(30),
            Utc::now(),
        );
        let request_id = store.issue_update_decryption(id, &gateway)?;

        let jobs = gateway.take_pending()?;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].request_id, request_id);
        assert_eq!(
            jobs[0].handles,
            vec![TaggedCiphertext::encrypt(30), TaggedCiphertext::encrypt(7)]
        );
        assert_eq!(store.requests().pending_for(id), vec![request_id]);
        Ok(())
    }

    #[test]
    fn unknown_update_cannot_be_requested() {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        assert_eq!(
            store.issue_update_decryption(4, &gateway),
            Err(ProtocolError::NotFound(4))
        );
        assert!(store.requests().is_empty());
    }

    #[test]
    fn reveal_consumes_all_sibling_requests() -> Result<()> {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        let id = submit(&mut store, 30);
        let first = store.issue_update_decryption(id, &gateway)?;
        let second = store.issue_update_decryption(id, &gateway)?;

        store.reveal(second, 30)?;
        assert!(store.requests().is_empty());
        assert_eq!(
            store.reveal(first, 30),
            Err(ProtocolError::UnknownRequest(first))
        );
        assert_eq!(
            store.aggregates().get_total(id).and_then(|t| t.reveal()),
            Some(30)
        );
        assert_eq!(
            store.issue_update_decryption(id, &gateway),
            Err(ProtocolError::AlreadyRevealed(id))
        );
        Ok(())
    }

    #[test]
    fn total_lane_does_not_answer_contribution_requests() -> Result<()> {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        let id = submit(&mut store, 30);
        let request_id = store.issue_update_decryption(id, &gateway)?;

        let before = store.clone();
        assert_eq!(
            store.complete_total(request_id),
            Err(ProtocolError::UnknownRequest(request_id))
        );
        assert_eq!(store, before);
        Ok(())
    }

    #[test]
    fn total_requires_an_aggregate() -> Result<()> {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        let id = submit(&mut store, 30);
        assert_eq!(
            store.issue_total_decryption(id, &gateway),
            Err(ProtocolError::NotFound(id))
        );

        let request_id = store.issue_update_decryption(id, &gateway)?;
        store.reveal(request_id, 30)?;
        let total_request = store.issue_total_decryption(id, &gateway)?;
        let pending = store.complete_total(total_request)?;
        assert_eq!(pending.target_id, id);
        assert_eq!(
            store.complete_total(total_request),
            Err(ProtocolError::UnknownRequest(total_request))
        );
        Ok(())
    }

    struct RefusingOracle;

    impl DecryptionOracle<TaggedCiphertext> for RefusingOracle {
        fn request_decryption(
            &self,
            _: Vec<TaggedCiphertext>,
            _: CallbackTarget,
        ) -> Result<RequestId, OracleError> {
            Err(OracleError::Unavailable)
        }
    }

    #[test]
    fn oracle_refusal_leaves_no_pending_request() {
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        let id = submit(&mut store, 30);
        assert_eq!(
            store.issue_update_decryption(id, &RefusingOracle),
            Err(ProtocolError::Oracle(OracleError::Unavailable))
        );
        assert!(store.requests().is_empty());
    }

    #[test]
    fn snapshot_survives_serialization() -> Result<()> {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let mut store = ProtocolStore::<TaggedCiphertext>::default();
        let id = submit(&mut store, 30);
        let request_id = store.issue_update_decryption(id, &gateway)?;
        store.reveal(request_id, 30)?;
        submit(&mut store, 4);
        store.issue_update_decryption(2, &gateway)?;

        let bytes = bincode::serialize(&store)?;
        let back: ProtocolStore<TaggedCiphertext> = bincode::deserialize(&bytes)?;
        assert_eq!(back, store);
        Ok(())
    }

    proptest! {
        #[test]
        fn totals_never_mix_between_ids(values in prop::collection::vec(0u32..1_000_000, 1..16)) {
            let gateway = OracleGateway::<TaggedCiphertext>::new();
            let mut store = ProtocolStore::<TaggedCiphertext>::default();
            for value in &values {
                let id = submit(&mut store, u64::from(*value));
                let request_id = store.issue_update_decryption(id, &gateway).unwrap();
                store.reveal(request_id, *value).unwrap();
            }
            for (index, value) in values.iter().enumerate() {
                let id = index as u64 + 1;
                let total = store.aggregates().get_total(id).and_then(|t| t.reveal());
                prop_assert_eq!(total, Some(u64::from(*value)));
            }
            prop_assert_eq!(store.aggregates().participants().len(), values.len());
        }
    }
}
