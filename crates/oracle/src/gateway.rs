// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::OracleError;
use contrib_events::RequestId;
use contrib_fhe::Ciphertext;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::info;

/// The entry point the oracle must deliver its answer to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackTarget {
    DecryptContribution,
    DecryptTotalContribution,
}

/// Work item handed to the off-system oracle
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptionJob<C> {
    pub request_id: RequestId,
    pub handles: Vec<C>,
    pub callback: CallbackTarget,
}

/// Hands ciphertext handles to the decryption oracle. The returned request id is the only link
/// between the request and the callback that eventually answers it.
pub trait DecryptionOracle<C: Ciphertext>: Send + Sync + 'static {
    fn request_decryption(
        &self,
        handles: Vec<C>,
        callback: CallbackTarget,
    ) -> Result<RequestId, OracleError>;

    /// Continue numbering after `last`, the highest request id the protocol has already seen.
    /// Oracles that keep their own durable counter can ignore this.
    fn resume_after(&self, _last: RequestId) -> Result<(), OracleError> {
        Ok(())
    }
}

struct GatewayState<C> {
    last_request_id: u64,
    pending: VecDeque<DecryptionJob<C>>,
}

/// In process gateway to the oracle. Request ids come from a counter starting at 1 and jobs are
/// queued until the oracle side drains them with `take_pending`. Clones share the same queue.
pub struct OracleGateway<C> {
    state: Arc<Mutex<GatewayState<C>>>,
}

impl<C> Clone for OracleGateway<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<C: Ciphertext> Default for OracleGateway<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Ciphertext> OracleGateway<C> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GatewayState {
                last_request_id: 0,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Drain every job issued so far
    pub fn take_pending(&self) -> Result<Vec<DecryptionJob<C>>, OracleError> {
        let mut state = self.state.lock().map_err(|_| OracleError::Unavailable)?;
        Ok(state.pending.drain(..).collect())
    }

    pub fn pending_count(&self) -> Result<usize, OracleError> {
        let state = self.state.lock().map_err(|_| OracleError::Unavailable)?;
        Ok(state.pending.len())
    }
}

impl<C: Ciphertext> DecryptionOracle<C> for OracleGateway<C> {
    fn request_decryption(
        &self,
        handles: Vec<C>,
        callback: CallbackTarget,
    ) -> Result<RequestId, OracleError> {
        if handles.is_empty() {
            return Err(OracleError::EmptyRequest);
        }
        let mut state = self.state.lock().map_err(|_| OracleError::Unavailable)?;
        state.last_request_id += 1;
        let request_id = RequestId::new(state.last_request_id);
        info!(request_id = %request_id, handles = handles.len(), ?callback, "Decryption requested from oracle");
        state.pending.push_back(DecryptionJob {
            request_id,
            handles,
            callback,
        });
        Ok(request_id)
    }

    fn resume_after(&self, last: RequestId) -> Result<(), OracleError> {
        let mut state = self.state.lock().map_err(|_| OracleError::Unavailable)?;
        if last.as_u64() > state.last_request_id {
            info!(request_id = %last, "Oracle gateway resuming after previously issued request");
            state.last_request_id = last.as_u64();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrib_fhe::TaggedCiphertext;

    #[test]
    fn request_ids_are_fresh_and_jobs_queue_in_order() -> anyhow::Result<()> {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        let first = gateway.request_decryption(
            vec![TaggedCiphertext::encrypt(1)],
            CallbackTarget::DecryptContribution,
        )?;
        let second = gateway.request_decryption(
            vec![TaggedCiphertext::encrypt(2)],
            CallbackTarget::DecryptTotalContribution,
        )?;
        assert_eq!(first, RequestId::new(1));
        assert_eq!(second, RequestId::new(2));

        let jobs = gateway.clone().take_pending()?;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].request_id, first);
        assert_eq!(jobs[1].callback, CallbackTarget::DecryptTotalContribution);
        assert_eq!(gateway.pending_count()?, 0);
        Ok(())
    }

    #[test]
    fn resumed_gateway_never_reissues_ids() -> anyhow::Result<()> {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        gateway.resume_after(RequestId::new(4))?;
        gateway.resume_after(RequestId::new(2))?;
        let next = gateway.request_decryption(
            vec![TaggedCiphertext::encrypt(1)],
            CallbackTarget::DecryptContribution,
        )?;
        assert_eq!(next, RequestId::new(5));
        Ok(())
    }

    #[test]
    fn empty_request_is_refused() {
        let gateway = OracleGateway::<TaggedCiphertext>::new();
        assert_eq!(
            gateway.request_decryption(vec![], CallbackTarget::DecryptContribution),
            Err(OracleError::EmptyRequest)
        );
    }
}
