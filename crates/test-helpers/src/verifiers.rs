// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use contrib_oracle::{Cleartexts, DecryptionProof, OracleVerifier, RequestId};

/// Accepts any proof
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVerifier;

impl OracleVerifier for AcceptAllVerifier {
    fn verify(&self, _: RequestId, _: &Cleartexts, _: &DecryptionProof) -> bool {
        true
    }
}

/// Rejects every proof
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectAllVerifier;

impl OracleVerifier for RejectAllVerifier {
    fn verify(&self, _: RequestId, _: &Cleartexts, _: &DecryptionProof) -> bool {
        false
    }
}
