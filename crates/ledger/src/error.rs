// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use contrib_events::{ContributionErrorType, RequestId};
use contrib_oracle::{CleartextError, OracleError};
use thiserror::Error;

/// Failures of a protocol operation. Any of these means the whole operation was rejected and no
/// state was changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Contribution {0} has already been revealed")]
    AlreadyRevealed(u64),
    #[error("Unknown decryption request {0}")]
    UnknownRequest(RequestId),
    #[error("Oracle issued request id {0} which was already used")]
    RequestIdReused(RequestId),
    #[error("Decryption proof for request {0} failed verification")]
    VerificationFailed(RequestId),
    #[error("Nothing recorded for id {0}")]
    NotFound(u64),
    #[error("Malformed cleartext for request {request_id}: {source}")]
    MalformedCleartext {
        request_id: RequestId,
        #[source]
        source: CleartextError,
    },
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl ProtocolError {
    pub fn err_type(&self) -> ContributionErrorType {
        match self {
            ProtocolError::AlreadyRevealed(_) => ContributionErrorType::AlreadyRevealed,
            ProtocolError::UnknownRequest(_) => ContributionErrorType::UnknownRequest,
            ProtocolError::RequestIdReused(_) => ContributionErrorType::Oracle,
            ProtocolError::VerificationFailed(_) => ContributionErrorType::Verification,
            ProtocolError::NotFound(_) => ContributionErrorType::NotFound,
            ProtocolError::MalformedCleartext { .. } => ContributionErrorType::Decoding,
            ProtocolError::Oracle(_) => ContributionErrorType::Oracle,
        }
    }
}
