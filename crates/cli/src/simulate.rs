// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use actix::prelude::*;
use anyhow::{Context, Result};
use contrib_config::{AppConfig, DbConfig};
use contrib_data::{DataStore, InMemStore, SledStore};
use contrib_events::{ContributionEvent, EventBus, EventBusConfig};
use contrib_fhe::TaggedCiphertext;
use contrib_logger::SimpleLogger;
use contrib_oracle::{
    CallbackTarget, DecryptionResponse, DigestSigner, DigestVerifier, OracleGateway,
    OracleRelayer, TaggedDecryptor,
};
use contrib_protocol::{
    DecryptContribution, DecryptTotalContribution, ProtocolActor, ProtocolParams,
    ProtocolRepositoryFactory, RequestContributionTotalDecryption, RequestUpdateDecryption,
    SubmitEncryptedUpdate,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

type Protocol = Addr<ProtocolActor<TaggedCiphertext>>;

#[derive(Default)]
struct Row {
    submitted: u32,
    revealed: Option<u32>,
    total: Option<u64>,
}

fn setup_store(config: &AppConfig, bus: &Addr<EventBus<ContributionEvent>>) -> Result<DataStore> {
    Ok(match &config.db {
        DbConfig::InMem => DataStore::from(&InMemStore::new(false).start()),
        DbConfig::Sled { path } => DataStore::from(&SledStore::new(bus, path)?),
    })
}

pub async fn execute(config: &AppConfig, values: Vec<u32>) -> Result<()> {
    let bus = EventBus::<ContributionEvent>::new(EventBusConfig {
        deduplicate: config.events.deduplicate,
    })
    .start();
    SimpleLogger::attach(&config.name, bus.clone());

    let store = setup_store(config, &bus)?;
    let gateway = OracleGateway::<TaggedCiphertext>::new();
    let key = &config.oracle.verifier_key;
    let relayer = OracleRelayer::new(gateway.clone(), TaggedDecryptor, DigestSigner::from_hex(key)?);
    let protocol = ProtocolActor::<TaggedCiphertext>::load(ProtocolParams {
        bus: bus.clone(),
        repository: store.protocol(),
        verifier: Arc::new(DigestVerifier::from_hex(key)?),
        oracle: Arc::new(gateway),
    })
    .await
    .context("Could not start protocol")?;

    let mut rows: BTreeMap<u64, Row> = BTreeMap::new();
    for value in values {
        let id = protocol
            .send(SubmitEncryptedUpdate {
                encrypted_weights: TaggedCiphertext::encrypt(1),
                encrypted_metrics: TaggedCiphertext::encrypt(u64::from(value)),
            })
            .await?;
        protocol.send(RequestUpdateDecryption { id }).await??;
        rows.insert(
            id,
            Row {
                submitted: value,
                ..Row::default()
            },
        );
    }

    for response in relayer.relay()? {
        deliver(&protocol, response, &mut rows).await?;
    }

    for id in rows.keys().copied().collect::<Vec<_>>() {
        protocol
            .send(RequestContributionTotalDecryption { id })
            .await??;
    }

    for response in relayer.relay()? {
        deliver(&protocol, response, &mut rows).await?;
    }

    info!("Simulation complete");
    print_table(&rows);
    Ok(())
}

async fn deliver(
    protocol: &Protocol,
    response: DecryptionResponse,
    rows: &mut BTreeMap<u64, Row>,
) -> Result<()> {
    let DecryptionResponse {
        request_id,
        cleartexts,
        proof,
        callback,
    } = response;

    match callback {
        CallbackTarget::DecryptContribution => {
            match protocol
                .send(DecryptContribution {
                    request_id,
                    cleartexts,
                    proof,
                })
                .await?
            {
                Ok(decrypted) => rows.entry(decrypted.id).or_default().revealed = Some(decrypted.value),
                Err(err) => warn!(%request_id, "Callback rejected: {err}"),
            }
        }
        CallbackTarget::DecryptTotalContribution => {
            match protocol
                .send(DecryptTotalContribution {
                    request_id,
                    cleartexts,
                    proof,
                })
                .await?
            {
                Ok(total) => rows.entry(total.id).or_default().total = Some(total.value),
                Err(err) => warn!(%request_id, "Callback rejected: {err}"),
            }
        }
    }
    Ok(())
}

fn show<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_table(rows: &BTreeMap<u64, Row>) {
    println!("{:>6} {:>10} {:>10} {:>12}", "id", "submitted", "revealed", "total");
    for (id, row) in rows {
        println!(
            "{:>6} {:>10} {:>10} {:>12}",
            id,
            row.submitted,
            show(row.revealed),
            show(row.total)
        );
    }
}
