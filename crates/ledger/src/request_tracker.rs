// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ProtocolError;
use contrib_events::RequestId;
use contrib_oracle::CallbackTarget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A decryption request that has been handed to the oracle and not yet answered
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub request_id: RequestId,
    pub target_id: u64,
    pub callback: CallbackTarget,
}

/// Maps oracle request ids back to the id they were issued for. An entry only resolves on the
/// callback it was issued for. Request ids must strictly increase over the life of the tracker,
/// including across snapshots, so an id is never bound to two targets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestTracker {
    pending: BTreeMap<RequestId, PendingRequest>,
    last_issued: Option<RequestId>,
}

impl RequestTracker {
    pub fn track(
        &mut self,
        request_id: RequestId,
        target_id: u64,
        callback: CallbackTarget,
    ) -> Result<(), ProtocolError> {
        if self.last_issued.is_some_and(|last| request_id <= last) {
            return Err(ProtocolError::RequestIdReused(request_id));
        }
        debug!(%request_id, target_id, ?callback, "Tracking decryption request");
        self.last_issued = Some(request_id);
        self.pending.insert(
            request_id,
            PendingRequest {
                request_id,
                target_id,
                callback,
            },
        );
        Ok(())
    }

    /// Highest request id ever tracked
    pub fn last_issued(&self) -> Option<RequestId> {
        self.last_issued
    }

    /// Look up a request without consuming it
    pub fn resolve(
        &self,
        request_id: RequestId,
        callback: CallbackTarget,
    ) -> Result<&PendingRequest, ProtocolError> {
        self.pending
            .get(&request_id)
            .filter(|p| p.callback == callback)
            .ok_or(ProtocolError::UnknownRequest(request_id))
    }

    pub fn consume(&mut self, request_id: RequestId) -> Option<PendingRequest> {
        self.pending.remove(&request_id)
    }

    /// Drop every pending request for the target on the given callback. Returns the dropped ids.
    pub fn invalidate_target(&mut self, target_id: u64, callback: CallbackTarget) -> Vec<RequestId> {
        let dropped: Vec<RequestId> = self
            .pending
            .values()
            .filter(|p| p.target_id == target_id && p.callback == callback)
            .map(|p| p.request_id)
            .collect();
        for request_id in &dropped {
            self.pending.remove(request_id);
        }
        dropped
    }

    pub fn pending_for(&self, target_id: u64) -> Vec<RequestId> {
        self.pending
            .values()
            .filter(|p| p.target_id == target_id)
            .map(|p| p.request_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
