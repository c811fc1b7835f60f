// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use anyhow::{bail, Result};
use contrib_data::{DataStore, InMemStore};
use contrib_events::{ContributionEvent, EventBus, HistoryCollector};
use contrib_fhe::TaggedCiphertext;
use contrib_ledger::ProtocolError;
use contrib_oracle::{
    CallbackTarget, DecryptionResponse, DigestSigner, DigestVerifier, OracleGateway,
    OracleRelayer, OracleVerifier, TaggedDecryptor,
};
use contrib_protocol::{
    DecryptContribution, DecryptTotalContribution, DecryptedContribution, ProtocolActor,
    ProtocolParams, ProtocolRepositoryFactory, RequestContributionTotalDecryption,
    RequestUpdateDecryption, SubmitEncryptedUpdate, TotalDecrypted,
};
use std::sync::Arc;

pub const TEST_ORACLE_KEY: &str = "0x74657374206f7261636c65206b657921";

/// What the protocol said to a delivered oracle response
#[derive(Clone, Debug, PartialEq)]
pub enum Delivered {
    Contribution(DecryptedContribution),
    Total(TotalDecrypted),
}

/// A wired up protocol: bus with history, store, oracle gateway, relayer and the protocol actor.
pub struct ProtocolHarness {
    pub bus: Addr<EventBus<ContributionEvent>>,
    pub history: Addr<HistoryCollector<ContributionEvent>>,
    pub errors: Addr<HistoryCollector<ContributionEvent>>,
    pub store: DataStore,
    pub gateway: OracleGateway<TaggedCiphertext>,
    pub relayer: OracleRelayer<TaggedCiphertext, TaggedDecryptor>,
    pub protocol: Addr<ProtocolActor<TaggedCiphertext>>,
    verifier: Arc<dyn OracleVerifier>,
}

impl ProtocolHarness {
    /// In memory store with a digest verifier sharing the relayer's key
    pub async fn new() -> Result<Self> {
        Self::with_verifier(Arc::new(DigestVerifier::from_hex(TEST_ORACLE_KEY)?)).await
    }

    pub async fn with_verifier(verifier: Arc<dyn OracleVerifier>) -> Result<Self> {
        let store = DataStore::from(&InMemStore::new(true).start());
        Self::with_store(store, verifier).await
    }

    pub async fn with_store(store: DataStore, verifier: Arc<dyn OracleVerifier>) -> Result<Self> {
        let bus = EventBus::<ContributionEvent>::default().start();
        let history = EventBus::history(&bus);
        let errors = EventBus::<ContributionEvent>::error(&bus);
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let relayer = OracleRelayer::new(
            gateway.clone(),
            TaggedDecryptor,
            DigestSigner::from_hex(TEST_ORACLE_KEY)?,
        );
        let protocol = ProtocolActor::<TaggedCiphertext>::load(ProtocolParams {
            bus: bus.clone(),
            repository: store.protocol(),
            verifier: verifier.clone(),
            oracle: Arc::new(gateway.clone()),
        })
        .await?;

        Ok(Self {
            bus,
            history,
            errors,
            store,
            gateway,
            relayer,
            protocol,
            verifier,
        })
    }

    /// Start another protocol actor over the same store, bus and gateway
    pub async fn restart(&self) -> Result<Addr<ProtocolActor<TaggedCiphertext>>> {
        ProtocolActor::<TaggedCiphertext>::load(ProtocolParams {
            bus: self.bus.clone(),
            repository: self.store.protocol(),
            verifier: self.verifier.clone(),
            oracle: Arc::new(self.gateway.clone()),
        })
        .await
    }

    /// A whole new process over the same store: fresh bus, oracle gateway, relayer and actor
    pub async fn reopen(&self) -> Result<Self> {
        Self::with_store(self.store.clone(), self.verifier.clone()).await
    }

    /// Submit an update whose metrics encrypt `value`
    pub async fn submit(&self, value: u64) -> Result<u64> {
        Ok(self
            .protocol
            .send(SubmitEncryptedUpdate {
                encrypted_weights: TaggedCiphertext::encrypt(1),
                encrypted_metrics: TaggedCiphertext::encrypt(value),
            })
            .await?)
    }

    /// Let the oracle answer everything queued so far
    pub fn relay(&self) -> Result<Vec<DecryptionResponse>> {
        Ok(self.relayer.relay()?)
    }

    /// Hand a response to the callback it names
    pub async fn deliver(
        &self,
        response: &DecryptionResponse,
    ) -> Result<Result<Delivered, ProtocolError>> {
        deliver_to(&self.protocol, response).await
    }

    /// Request, relay and deliver the decryption of an update
    pub async fn reveal(&self, id: u64) -> Result<DecryptedContribution> {
        self.protocol.send(RequestUpdateDecryption { id }).await??;
        match self.deliver_single().await?? {
            Delivered::Contribution(decrypted) => Ok(decrypted),
            other => bail!("expected a contribution, got {:?}", other),
        }
    }

    /// Request, relay and deliver the decryption of an aggregate total
    pub async fn reveal_total(&self, id: u64) -> Result<TotalDecrypted> {
        self.protocol
            .send(RequestContributionTotalDecryption { id })
            .await??;
        match self.deliver_single().await?? {
            Delivered::Total(total) => Ok(total),
            other => bail!("expected a total, got {:?}", other),
        }
    }

    async fn deliver_single(&self) -> Result<Result<Delivered, ProtocolError>> {
        let responses = self.relay()?;
        let [response] = responses.as_slice() else {
            bail!("expected one oracle response, got {}", responses.len());
        };
        self.deliver(response).await
    }
}

/// Route an oracle response to the matching callback message
pub async fn deliver_to(
    protocol: &Addr<ProtocolActor<TaggedCiphertext>>,
    response: &DecryptionResponse,
) -> Result<Result<Delivered, ProtocolError>> {
    let result = match response.callback {
        CallbackTarget::DecryptContribution => protocol
            .send(DecryptContribution {
                request_id: response.request_id,
                cleartexts: response.cleartexts.clone(),
                proof: response.proof.clone(),
            })
            .await?
            .map(Delivered::Contribution),
        CallbackTarget::DecryptTotalContribution => protocol
            .send(DecryptTotalContribution {
                request_id: response.request_id,
                cleartexts: response.cleartexts.clone(),
                proof: response.proof.clone(),
            })
            .await?
            .map(Delivered::Total),
    };
    Ok(result)
}
