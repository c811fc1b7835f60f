// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    CallbackTarget, Cleartexts, DecryptionJob, DecryptionProof, DigestSigner, OracleError,
    OracleGateway,
};
use contrib_events::RequestId;
use contrib_fhe::{Ciphertext, TaggedCiphertext};
use tracing::info;

/// Decryption capability of the oracle
pub trait Decryptor<C>: Send + Sync + 'static {
    fn decrypt(&self, handle: &C) -> Option<u64>;
}

/// Reads the value carried by a `TaggedCiphertext`
#[derive(Clone, Copy, Debug, Default)]
pub struct TaggedDecryptor;

impl Decryptor<TaggedCiphertext> for TaggedDecryptor {
    fn decrypt(&self, handle: &TaggedCiphertext) -> Option<u64> {
        handle.reveal()
    }
}

/// The oracle's answer to one decryption request
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptionResponse {
    pub request_id: RequestId,
    pub cleartexts: Cleartexts,
    pub proof: DecryptionProof,
    pub callback: CallbackTarget,
}

/// Simulates the off-system oracle: drains the gateway, decrypts and signs every job.
pub struct OracleRelayer<C, D> {
    gateway: OracleGateway<C>,
    decryptor: D,
    signer: DigestSigner,
}

impl<C: Ciphertext, D: Decryptor<C>> OracleRelayer<C, D> {
    pub fn new(gateway: OracleGateway<C>, decryptor: D, signer: DigestSigner) -> Self {
        Self {
            gateway,
            decryptor,
            signer,
        }
    }

    pub fn answer(&self, job: &DecryptionJob<C>) -> Result<DecryptionResponse, OracleError> {
        let values = job
            .handles
            .iter()
            .map(|handle| self.decryptor.decrypt(handle))
            .collect::<Option<Vec<u64>>>()
            .ok_or(OracleError::UninitializedHandle(job.request_id))?;
        let cleartexts = Cleartexts::encode(&values);
        let proof = self.signer.sign(job.request_id, &cleartexts);
        Ok(DecryptionResponse {
            request_id: job.request_id,
            cleartexts,
            proof,
            callback: job.callback,
        })
    }

    /// Answer every pending job
    pub fn relay(&self) -> Result<Vec<DecryptionResponse>, OracleError> {
        let jobs = self.gateway.take_pending()?;
        info!("Relaying {} oracle responses", jobs.len());
        jobs.iter().map(|job| self.answer(job)).collect()
    }
}
