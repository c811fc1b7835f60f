// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ContributionProtocol, DecryptedContribution, TotalDecrypted};
use actix::prelude::*;
use anyhow::Result;
use async_trait::async_trait;
use contrib_data::{Checkpoint, FromSnapshotWithParams, Repository, Snapshot};
use contrib_events::{ContributionError, ContributionEvent, EventBus, RequestId};
use contrib_fhe::Ciphertext;
use contrib_ledger::{EncryptedUpdate, ProtocolError, ProtocolStore};
use contrib_oracle::{Cleartexts, DecryptionOracle, DecryptionProof, OracleVerifier};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};

//////////////////////////////////////////////////////////////////////////////
// Messages
//////////////////////////////////////////////////////////////////////////////

#[derive(Message, Clone, Debug)]
#[rtype(result = "u64")]
pub struct SubmitEncryptedUpdate<C: Ciphertext> {
    pub encrypted_weights: C,
    pub encrypted_metrics: C,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RequestId, ProtocolError>")]
pub struct RequestUpdateDecryption {
    pub id: u64,
}

/// Oracle callback for the contribution lane
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<DecryptedContribution, ProtocolError>")]
pub struct DecryptContribution {
    pub request_id: RequestId,
    pub cleartexts: Cleartexts,
    pub proof: DecryptionProof,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Option<DecryptedContribution>")]
pub struct GetDecryptedContribution {
    pub id: u64,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Option<C>")]
pub struct GetEncryptedContributionTotal<C: Ciphertext> {
    pub id: u64,
    _p: PhantomData<C>,
}

impl<C: Ciphertext> GetEncryptedContributionTotal<C> {
    pub fn new(id: u64) -> Self {
        Self { id, _p: PhantomData }
    }
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RequestId, ProtocolError>")]
pub struct RequestContributionTotalDecryption {
    pub id: u64,
}

/// Oracle callback for the total lane
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<TotalDecrypted, ProtocolError>")]
pub struct DecryptTotalContribution {
    pub request_id: RequestId,
    pub cleartexts: Cleartexts,
    pub proof: DecryptionProof,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Option<EncryptedUpdate<C>>")]
pub struct GetEncryptedUpdate<C: Ciphertext> {
    pub id: u64,
    _p: PhantomData<C>,
}

impl<C: Ciphertext> GetEncryptedUpdate<C> {
    pub fn new(id: u64) -> Self {
        Self { id, _p: PhantomData }
    }
}

#[derive(Message, Clone, Debug, Default)]
#[rtype(result = "Vec<u64>")]
pub struct GetParticipants;

//////////////////////////////////////////////////////////////////////////////
// Actor
//////////////////////////////////////////////////////////////////////////////

pub struct ProtocolParams<C: Ciphertext> {
    pub bus: Addr<EventBus<ContributionEvent>>,
    pub repository: Repository<ProtocolStore<C>>,
    pub verifier: Arc<dyn OracleVerifier>,
    pub oracle: Arc<dyn DecryptionOracle<C>>,
}

/// Single writer around `ContributionProtocol`. Operations are processed one at a time in mailbox
/// order. Notifications go to the bus and the store is checkpointed after every successful
/// mutation.
pub struct ProtocolActor<C: Ciphertext> {
    protocol: ContributionProtocol<C>,
    bus: Addr<EventBus<ContributionEvent>>,
    repository: Repository<ProtocolStore<C>>,
}

impl<C: Ciphertext> Actor for ProtocolActor<C> {
    type Context = Context<Self>;
}

impl<C: Ciphertext> ProtocolActor<C> {
    pub fn from_params(params: ProtocolParams<C>) -> Self {
        Self {
            protocol: ContributionProtocol::new(params.verifier, params.oracle),
            bus: params.bus,
            repository: params.repository,
        }
    }

    /// Start the actor, hydrating from the repository when a snapshot has been written before
    pub async fn load(params: ProtocolParams<C>) -> Result<Addr<Self>> {
        let actor = match params.repository.read().await? {
            Some(snapshot) => {
                info!("Hydrating protocol from snapshot");
                Self::from_snapshot(params, snapshot).await?
            }
            None => Self::from_params(params),
        };
        Ok(actor.start())
    }

    fn publish(&self, event: ContributionEvent) {
        self.bus.do_send(event);
    }

    fn commit(&self, event: ContributionEvent) {
        self.checkpoint();
        self.publish(event);
    }

    fn reject(&self, err: &ProtocolError) {
        warn!(error = %err, "Protocol operation rejected");
        self.publish(ContributionError::new(err.err_type(), &err.to_string()).into());
    }

    fn apply<T>(
        &self,
        result: Result<(T, ContributionEvent), ProtocolError>,
    ) -> Result<T, ProtocolError> {
        match result {
            Ok((value, event)) => {
                self.commit(event);
                Ok(value)
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }
}

impl<C: Ciphertext> Handler<SubmitEncryptedUpdate<C>> for ProtocolActor<C> {
    type Result = u64;

    fn handle(&mut self, msg: SubmitEncryptedUpdate<C>, _: &mut Self::Context) -> Self::Result {
        let (id, event) = self
            .protocol
            .submit_encrypted_update(msg.encrypted_weights, msg.encrypted_metrics);
        self.commit(event);
        id
    }
}

impl<C: Ciphertext> Handler<RequestUpdateDecryption> for ProtocolActor<C> {
    type Result = Result<RequestId, ProtocolError>;

    fn handle(&mut self, msg: RequestUpdateDecryption, _: &mut Self::Context) -> Self::Result {
        let result = self.protocol.request_update_decryption(msg.id);
        self.apply(result)
    }
}

impl<C: Ciphertext> Handler<DecryptContribution> for ProtocolActor<C> {
    type Result = Result<DecryptedContribution, ProtocolError>;

    fn handle(&mut self, msg: DecryptContribution, _: &mut Self::Context) -> Self::Result {
        let result = self
            .protocol
            .decrypt_contribution(msg.request_id, &msg.cleartexts, &msg.proof);
        self.apply(result)
    }
}

impl<C: Ciphertext> Handler<GetDecryptedContribution> for ProtocolActor<C> {
    type Result = Option<DecryptedContribution>;

    fn handle(&mut self, msg: GetDecryptedContribution, _: &mut Self::Context) -> Self::Result {
        self.protocol.get_decrypted_contribution(msg.id)
    }
}

impl<C: Ciphertext> Handler<GetEncryptedContributionTotal<C>> for ProtocolActor<C> {
    type Result = Option<C>;

    fn handle(
        &mut self,
        msg: GetEncryptedContributionTotal<C>,
        _: &mut Self::Context,
    ) -> Self::Result {
        self.protocol.get_encrypted_contribution_total(msg.id)
    }
}

impl<C: Ciphertext> Handler<RequestContributionTotalDecryption> for ProtocolActor<C> {
    type Result = Result<RequestId, ProtocolError>;

    fn handle(
        &mut self,
        msg: RequestContributionTotalDecryption,
        _: &mut Self::Context,
    ) -> Self::Result {
        let result = self.protocol.request_contribution_total_decryption(msg.id);
        self.apply(result)
    }
}

impl<C: Ciphertext> Handler<DecryptTotalContribution> for ProtocolActor<C> {
    type Result = Result<TotalDecrypted, ProtocolError>;

    fn handle(&mut self, msg: DecryptTotalContribution, _: &mut Self::Context) -> Self::Result {
        let result =
            self.protocol
                .decrypt_total_contribution(msg.request_id, &msg.cleartexts, &msg.proof);
        self.apply(result)
    }
}

impl<C: Ciphertext> Handler<GetEncryptedUpdate<C>> for ProtocolActor<C> {
    type Result = Option<EncryptedUpdate<C>>;

    fn handle(&mut self, msg: GetEncryptedUpdate<C>, _: &mut Self::Context) -> Self::Result {
        self.protocol.get_encrypted_update(msg.id)
    }
}

impl<C: Ciphertext> Handler<GetParticipants> for ProtocolActor<C> {
    type Result = Vec<u64>;

    fn handle(&mut self, _: GetParticipants, _: &mut Self::Context) -> Self::Result {
        self.protocol.participants()
    }
}

//////////////////////////////////////////////////////////////////////////////
// Persistence
//////////////////////////////////////////////////////////////////////////////

impl<C: Ciphertext> Snapshot for ProtocolActor<C> {
    type Snapshot = ProtocolStore<C>;

    fn snapshot(&self) -> Result<Self::Snapshot> {
        Ok(self.protocol.store().clone())
    }
}

impl<C: Ciphertext> Checkpoint for ProtocolActor<C> {
    fn repository(&self) -> &Repository<ProtocolStore<C>> {
        &self.repository
    }
}

#[async_trait]
impl<C: Ciphertext> FromSnapshotWithParams for ProtocolActor<C> {
    type Params = ProtocolParams<C>;

    async fn from_snapshot(params: Self::Params, snapshot: Self::Snapshot) -> Result<Self> {
        Ok(Self {
            protocol: ContributionProtocol::from_store(snapshot, params.verifier, params.oracle)?,
            bus: params.bus,
            repository: params.repository,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProtocolRepositoryFactory, SubmitEncryptedUpdate};
    use contrib_data::{DataStore, GetLog, InMemStore};
    use contrib_events::{ErrorEvent, TakeEvents};
    use contrib_fhe::TaggedCiphertext;
    use contrib_oracle::{DigestVerifier, OracleGateway};

    const KEY: &str = "000102030405060708090a0b0c0d0e0f";

    async fn start(
        store: &DataStore,
        bus: &Addr<EventBus<ContributionEvent>>,
    ) -> Result<Addr<ProtocolActor<TaggedCiphertext>>> {
        ProtocolActor::<TaggedCiphertext>::load(ProtocolParams {
            bus: bus.clone(),
            repository: store.protocol(),
            verifier: Arc::new(DigestVerifier::from_hex(KEY)?),
            oracle: Arc::new(OracleGateway::<TaggedCiphertext>::new()),
        })
        .await
    }

    fn update(value: u64) -> SubmitEncryptedUpdate<TaggedCiphertext> {
        SubmitEncryptedUpdate {
            encrypted_weights: TaggedCiphertext::encrypt(1),
            encrypted_metrics: TaggedCiphertext::encrypt(value),
        }
    }

    #[actix::test]
    async fn only_successful_operations_checkpoint() -> Result<()> {
        let store_addr = InMemStore::new(true).start();
        let store = DataStore::from(&store_addr);
        let bus = EventBus::<ContributionEvent>::default().start();
        let errors = EventBus::<ContributionEvent>::error(&bus);
        let actor = start(&store, &bus).await?;

        let id = actor.send(update(30)).await?;
        let request_id = actor.send(RequestUpdateDecryption { id }).await??;
        assert_eq!(store_addr.send(GetLog).await?.len(), 2);

        let forged = actor
            .send(DecryptContribution {
                request_id,
                cleartexts: Cleartexts::encode(&[30]),
                proof: DecryptionProof::new(vec![1u8; 32]),
            })
            .await?;
        assert_eq!(forged, Err(ProtocolError::VerificationFailed(request_id)));
        assert_eq!(
            actor.send(RequestUpdateDecryption { id: 9 }).await?,
            Err(ProtocolError::NotFound(9))
        );
        assert_eq!(store_addr.send(GetLog).await?.len(), 2);

        let reported = errors.send(TakeEvents::new(2)).await?;
        assert!(reported.iter().all(|e| e.as_error().is_some()));

        let snapshot = store.protocol::<TaggedCiphertext>().read().await?;
        assert_eq!(
            snapshot.map(|s| s.requests().pending_for(id)),
            Some(vec![request_id])
        );
        Ok(())
    }

    #[actix::test]
    async fn load_hydrates_from_snapshot() -> Result<()> {
        let store = DataStore::from(&InMemStore::new(false).start());
        let bus = EventBus::<ContributionEvent>::default().start();

        let first = start(&store, &bus).await?;
        first.send(update(1)).await?;
        first.send(update(2)).await?;

        let second = start(&store, &bus).await?;
        assert_eq!(second.send(update(3)).await?, 3);
        let stored = second
            .send(GetEncryptedUpdate::<TaggedCiphertext>::new(2))
            .await?;
        assert_eq!(
            stored.map(|u| u.encrypted_metrics),
            Some(TaggedCiphertext::encrypt(2))
        );
        Ok(())
    }

    #[actix::test]
    async fn loaded_actor_resumes_request_numbering() -> Result<()> {
        let store = DataStore::from(&InMemStore::new(false).start());
        let bus = EventBus::<ContributionEvent>::default().start();

        let first = start(&store, &bus).await?;
        let id = first.send(update(1)).await?;
        let issued = first.send(RequestUpdateDecryption { id }).await??;

        let second = start(&store, &bus).await?;
        let other = second.send(update(2)).await?;
        let next = second
            .send(RequestUpdateDecryption { id: other })
            .await??;
        assert!(next > issued);
        Ok(())
    }
}
