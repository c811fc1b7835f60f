// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::Repository;
use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::error;

/// This trait enables the self type to report their state snapshot
pub trait Snapshot
where
    Self: Sized,
{
    /// The Snapshot should represent all the dynamic data managed within the Actor or Object
    ///
    /// The state must be serializable so that it can be stored as a value
    type Snapshot: Serialize + DeserializeOwned;

    /// Return the Snapshot object for the implementor
    fn snapshot(&self) -> Result<Self::Snapshot>;
}

/// This trait enables the self type to checkpoint its state
pub trait Checkpoint: Snapshot {
    /// Declare the Repository instance available on the object
    fn repository(&self) -> &Repository<Self::Snapshot>;

    /// Write the current snapshot to the `Repository` provided by `repository()`
    fn checkpoint(&self) {
        match self.snapshot() {
            Ok(snapshot) => self.repository().write(&snapshot),
            Err(err) => error!("Not saving data because snapshot failed: '{err}'"),
        }
    }
}

/// Enable the self type to be reconstituted from the parameters coupled with the Snapshot
#[async_trait]
pub trait FromSnapshotWithParams: Snapshot {
    type Params: Send + 'static;

    /// Return an instance of the persistable object at the state given by the snapshot
    async fn from_snapshot(params: Self::Params, snapshot: Self::Snapshot) -> Result<Self>;
}
