// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Cleartexts, OracleError};
use contrib_events::RequestId;
use serde::{Deserialize, Serialize};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

const DOMAIN: &[u8] = b"contrib/decryption-proof/v1";
const MIN_KEY_LEN: usize = 16;

type ProofMac = Hmac<Sha256>;

/// Opaque proof attached by the oracle to a decryption result
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecryptionProof(Vec<u8>);

impl DecryptionProof {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for DecryptionProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecryptionProof(0x{})", hex::encode(&self.0))
    }
}

/// Checks that a batch of cleartexts and its proof really are the oracle's answer to the given
/// request.
pub trait OracleVerifier: Send + Sync + 'static {
    fn verify(&self, request_id: RequestId, cleartexts: &Cleartexts, proof: &DecryptionProof)
        -> bool;
}

impl<V: OracleVerifier + ?Sized> OracleVerifier for Arc<V> {
    fn verify(
        &self,
        request_id: RequestId,
        cleartexts: &Cleartexts,
        proof: &DecryptionProof,
    ) -> bool {
        (**self).verify(request_id, cleartexts, proof)
    }
}

/// Secret shared between the oracle and the protocol
#[derive(Clone)]
struct DigestKey(ProofMac);

impl DigestKey {
    fn from_hex(key: &str) -> Result<Self, OracleError> {
        let bytes = hex::decode(key.trim_start_matches("0x"))
            .map_err(|e| OracleError::InvalidKey(e.to_string()))?;
        if bytes.len() < MIN_KEY_LEN {
            return Err(OracleError::InvalidKey(format!(
                "key must be at least {MIN_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mac =
            ProofMac::new_from_slice(&bytes).map_err(|e| OracleError::InvalidKey(e.to_string()))?;
        Ok(Self(mac))
    }

    /// HMAC-SHA256 over the domain tag, the request id and the cleartext words
    fn mac(&self, request_id: RequestId, cleartexts: &Cleartexts) -> ProofMac {
        let mut mac = self.0.clone();
        mac.update(DOMAIN);
        mac.update(&request_id.to_be_bytes());
        mac.update(&(cleartexts.len() as u64).to_be_bytes());
        mac.update(cleartexts.as_bytes());
        mac
    }
}

/// Produces proofs on the oracle side
#[derive(Clone)]
pub struct DigestSigner {
    key: DigestKey,
}

impl DigestSigner {
    pub fn from_hex(key: &str) -> Result<Self, OracleError> {
        Ok(Self {
            key: DigestKey::from_hex(key)?,
        })
    }

    pub fn sign(&self, request_id: RequestId, cleartexts: &Cleartexts) -> DecryptionProof {
        let tag = self.key.mac(request_id, cleartexts).finalize().into_bytes();
        DecryptionProof::new(tag.to_vec())
    }
}

/// Verifies HMAC-SHA256 proofs produced by a `DigestSigner` holding the same key
#[derive(Clone)]
pub struct DigestVerifier {
    key: DigestKey,
}

impl DigestVerifier {
    pub fn from_hex(key: &str) -> Result<Self, OracleError> {
        Ok(Self {
            key: DigestKey::from_hex(key)?,
        })
    }
}

impl OracleVerifier for DigestVerifier {
    fn verify(
        &self,
        request_id: RequestId,
        cleartexts: &Cleartexts,
        proof: &DecryptionProof,
    ) -> bool {
        self.key
            .mac(request_id, cleartexts)
            .verify_slice(proof.as_bytes())
            .is_ok()
    }
}
