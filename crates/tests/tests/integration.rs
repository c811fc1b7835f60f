// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use anyhow::Result;
use contrib_data::{DataStore, SledStore};
use contrib_events::{
    ContributionErrorType, ContributionEvent, ErrorEvent, Event, EventBus, GetEvents, TakeEvents,
};
use contrib_fhe::TaggedCiphertext;
use contrib_ledger::ProtocolError;
use contrib_logger::{GetLoggedCount, SimpleLogger};
use contrib_oracle::{Cleartexts, DecryptionProof, DigestVerifier, RequestId};
use contrib_protocol::{
    DecryptContribution, DecryptedContribution, GetDecryptedContribution, GetEncryptedContributionTotal,
    GetEncryptedUpdate, GetParticipants, RequestContributionTotalDecryption,
    RequestUpdateDecryption,
};
use contrib_test_helpers::{
    deliver_to, setup_test_tracing, AcceptAllVerifier, Delivered, ProtocolHarness,
    RejectAllVerifier, TEST_ORACLE_KEY,
};
use std::sync::Arc;
use std::time::Duration;

fn event_types(events: &[ContributionEvent]) -> Vec<String> {
    events.iter().map(|e| e.event_type()).collect()
}

#[actix::test]
async fn test_round_trip_reveals_and_notifies() -> Result<()> {
    setup_test_tracing();
    let harness = ProtocolHarness::new().await?;

    let id = harness.submit(30).await?;
    assert_eq!(id, 1);
    let decrypted = harness.reveal(id).await?;
    assert_eq!(decrypted.value, 30);
    assert!(decrypted.revealed);

    let stored = harness
        .protocol
        .send(GetDecryptedContribution { id })
        .await?;
    assert_eq!(stored, Some(decrypted));

    let events = harness.history.send(TakeEvents::new(3)).await?;
    assert_eq!(
        event_types(&events),
        vec![
            "UpdateSubmitted",
            "DecryptionRequested",
            "ContributionRevealed"
        ]
    );
    assert!(events.iter().all(|e| e.get_target_id() == Some(id)));
    Ok(())
}

#[actix::test]
async fn test_totals_are_isolated_per_participant() -> Result<()> {
    let harness = ProtocolHarness::new().await?;

    let first = harness.submit(30).await?;
    let second = harness.submit(12).await?;
    harness.reveal(first).await?;

    // Only the revealed id has an aggregate so far
    let pending_total = harness
        .protocol
        .send(GetEncryptedContributionTotal::<TaggedCiphertext>::new(second))
        .await?;
    assert_eq!(pending_total, None);

    harness.reveal(second).await?;

    assert_eq!(harness.reveal_total(first).await?.value, 30);
    assert_eq!(harness.reveal_total(second).await?.value, 12);
    assert_eq!(
        harness.protocol.send(GetParticipants).await?,
        vec![first, second]
    );

    let total = harness
        .protocol
        .send(GetEncryptedContributionTotal::<TaggedCiphertext>::new(first))
        .await?;
    assert_eq!(total, Some(TaggedCiphertext::encrypt(30)));
    Ok(())
}

#[actix::test]
async fn test_replayed_callback_is_rejected_and_broadcast() -> Result<()> {
    let harness = ProtocolHarness::new().await?;
    let id = harness.submit(30).await?;
    harness
        .protocol
        .send(RequestUpdateDecryption { id })
        .await??;
    let responses = harness.relay()?;
    let response = &responses[0];

    assert!(matches!(
        harness.deliver(response).await?,
        Ok(Delivered::Contribution(_))
    ));
    for _ in 0..2 {
        assert_eq!(
            harness.deliver(response).await?,
            Err(ProtocolError::UnknownRequest(response.request_id))
        );
    }

    let errors = harness.errors.send(TakeEvents::new(2)).await?;
    let err_types: Vec<_> = errors
        .iter()
        .filter_map(|e| e.as_error().map(|e| e.err_type.clone()))
        .collect();
    assert_eq!(
        err_types,
        vec![
            ContributionErrorType::UnknownRequest,
            ContributionErrorType::UnknownRequest
        ]
    );

    assert_eq!(harness.reveal_total(id).await?.value, 30);
    Ok(())
}

#[actix::test]
async fn test_rejected_proof_changes_nothing() -> Result<()> {
    let harness = ProtocolHarness::with_verifier(Arc::new(RejectAllVerifier)).await?;
    let id = harness.submit(30).await?;
    harness
        .protocol
        .send(RequestUpdateDecryption { id })
        .await??;
    let responses = harness.relay()?;
    let response = &responses[0];

    assert_eq!(
        harness.deliver(response).await?,
        Err(ProtocolError::VerificationFailed(response.request_id))
    );
    let record = harness
        .protocol
        .send(GetDecryptedContribution { id })
        .await?;
    assert_eq!(record.map(|r| r.revealed), Some(false));
    assert!(harness.protocol.send(GetParticipants).await?.is_empty());

    let errors = harness.errors.send(TakeEvents::new(1)).await?;
    assert_eq!(
        errors[0].as_error().map(|e| e.err_type.clone()),
        Some(ContributionErrorType::Verification)
    );
    Ok(())
}

#[actix::test]
async fn test_verifier_is_the_only_gate_on_cleartexts() -> Result<()> {
    let harness = ProtocolHarness::with_verifier(Arc::new(AcceptAllVerifier)).await?;
    let id = harness.submit(30).await?;
    let request_id = harness
        .protocol
        .send(RequestUpdateDecryption { id })
        .await??;

    let decrypted = harness
        .protocol
        .send(DecryptContribution {
            request_id,
            cleartexts: Cleartexts::encode(&[7]),
            proof: DecryptionProof::new(Vec::new()),
        })
        .await??;
    assert_eq!(decrypted.value, 7);
    Ok(())
}

#[actix::test]
async fn test_decryption_preconditions() -> Result<()> {
    let harness = ProtocolHarness::new().await?;

    assert_eq!(
        harness
            .protocol
            .send(RequestUpdateDecryption { id: 5 })
            .await?,
        Err(ProtocolError::NotFound(5))
    );

    let id = harness.submit(30).await?;
    assert_eq!(
        harness
            .protocol
            .send(RequestContributionTotalDecryption { id })
            .await?,
        Err(ProtocolError::NotFound(id))
    );

    harness.reveal(id).await?;
    assert_eq!(
        harness
            .protocol
            .send(RequestUpdateDecryption { id })
            .await?,
        Err(ProtocolError::AlreadyRevealed(id))
    );
    assert_eq!(harness.gateway.pending_count()?, 0);
    Ok(())
}

#[actix::test]
async fn test_unissued_request_is_unknown() -> Result<()> {
    let harness = ProtocolHarness::with_verifier(Arc::new(AcceptAllVerifier)).await?;
    harness.submit(30).await?;
    let request_id = RequestId::new(42);
    assert_eq!(
        harness
            .protocol
            .send(DecryptContribution {
                request_id,
                cleartexts: Cleartexts::encode(&[30]),
                proof: DecryptionProof::new(Vec::new()),
            })
            .await?,
        Err(ProtocolError::UnknownRequest(request_id))
    );
    Ok(())
}

#[actix::test]
async fn test_pending_request_survives_restart() -> Result<()> {
    let harness = ProtocolHarness::new().await?;
    let id = harness.submit(30).await?;
    harness
        .protocol
        .send(RequestUpdateDecryption { id })
        .await??;
    let responses = harness.relay()?;
    let response = &responses[0];

    let restarted = harness.restart().await?;
    let update = restarted
        .send(GetEncryptedUpdate::<TaggedCiphertext>::new(id))
        .await?;
    assert_eq!(
        update.map(|u| u.encrypted_metrics),
        Some(TaggedCiphertext::encrypt(30))
    );

    assert!(matches!(
        deliver_to(&restarted, response).await?,
        Ok(Delivered::Contribution(_))
    ));
    assert_eq!(
        deliver_to(&restarted, response).await?,
        Err(ProtocolError::UnknownRequest(response.request_id))
    );

    // Ids keep counting from the snapshot
    let next = restarted
        .send(contrib_protocol::SubmitEncryptedUpdate {
            encrypted_weights: TaggedCiphertext::encrypt(1),
            encrypted_metrics: TaggedCiphertext::encrypt(2),
        })
        .await?;
    assert_eq!(next, id + 1);
    Ok(())
}

#[actix::test]
async fn test_reopened_process_does_not_rebind_request_ids() -> Result<()> {
    let harness = ProtocolHarness::new().await?;
    let first = harness.submit(30).await?;
    harness
        .protocol
        .send(RequestUpdateDecryption { id: first })
        .await??;
    let stale = harness.relay()?;

    let reopened = harness.reopen().await?;
    let second = reopened.submit(999).await?;
    let second_request = reopened
        .protocol
        .send(RequestUpdateDecryption { id: second })
        .await??;
    assert!(second_request > stale[0].request_id);

    assert_eq!(
        reopened.deliver(&stale[0]).await?,
        Ok(Delivered::Contribution(DecryptedContribution {
            id: first,
            value: 30,
            revealed: true,
        }))
    );
    let untouched = reopened
        .protocol
        .send(GetDecryptedContribution { id: second })
        .await?;
    assert_eq!(untouched.map(|r| r.revealed), Some(false));

    let fresh = reopened.relay()?;
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].request_id, second_request);
    assert_eq!(
        reopened.deliver(&fresh[0]).await?,
        Ok(Delivered::Contribution(DecryptedContribution {
            id: second,
            value: 999,
            revealed: true,
        }))
    );
    Ok(())
}

#[actix::test]
async fn test_sled_backed_protocol_restores_reveals() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let bus = EventBus::<ContributionEvent>::default().start();
    let sled = SledStore::new(&bus, &tmp.path().join("contrib.db"))?;
    let store = DataStore::from(&sled);
    let verifier = Arc::new(DigestVerifier::from_hex(TEST_ORACLE_KEY)?);

    let harness = ProtocolHarness::with_store(store, verifier).await?;
    let id = harness.submit(30).await?;
    harness.reveal(id).await?;

    let restarted = harness.restart().await?;
    let record = restarted.send(GetDecryptedContribution { id }).await?;
    assert_eq!(record.map(|r| (r.value, r.revealed)), Some((30, true)));
    assert_eq!(restarted.send(GetParticipants).await?, vec![id]);
    Ok(())
}

#[actix::test]
async fn test_logger_sees_protocol_events() -> Result<()> {
    let harness = ProtocolHarness::new().await?;
    let logger = SimpleLogger::attach("observer", harness.bus.clone());

    let id = harness.submit(30).await?;
    harness.reveal(id).await?;
    harness.history.send(TakeEvents::new(3)).await?;

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(logger.send(GetLoggedCount).await?, 3);
    assert!(harness.history.send(GetEvents::new()).await?.is_empty());
    Ok(())
}
