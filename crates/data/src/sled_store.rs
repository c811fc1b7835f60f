// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Get, Insert, InsertSync, Remove, SledDb};
use actix::{Actor, Addr, Handler};
use anyhow::Result;
use contrib_events::{ContributionErrorType, ContributionEvent, ErrorEvent, EventBus};
use std::path::Path;
use tracing::{error, info};

/// Persistent store backed by sled. Write failures cannot be returned to fire and forget callers
/// so they are published on the bus as `Data` errors.
pub struct SledStore {
    db: SledDb,
    bus: Addr<EventBus<ContributionEvent>>,
}

impl Actor for SledStore {
    type Context = actix::Context<Self>;

    fn stopped(&mut self, _: &mut Self::Context) {
        if let Err(err) = self.db.flush() {
            error!("Could not flush sled store on stop: {err}");
        }
    }
}

impl SledStore {
    pub fn new(bus: &Addr<EventBus<ContributionEvent>>, path: &Path) -> Result<Addr<Self>> {
        info!("Starting SledStore with {:?}", path);
        let db = SledDb::new(path, "datastore")?;
        Ok(Self {
            db,
            bus: bus.clone(),
        }
        .start())
    }

    fn err(&self, err: anyhow::Error) {
        error!("{err}");
        self.bus
            .do_send(ContributionEvent::from_error(ContributionErrorType::Data, err));
    }
}

impl Handler<Insert> for SledStore {
    type Result = ();

    fn handle(&mut self, event: Insert, _: &mut Self::Context) -> Self::Result {
        if let Err(err) = self.db.insert(event) {
            self.err(err)
        }
    }
}

impl Handler<InsertSync> for SledStore {
    type Result = Result<()>;

    fn handle(&mut self, event: InsertSync, _: &mut Self::Context) -> Self::Result {
        self.db.insert(event.into())
    }
}

impl Handler<Remove> for SledStore {
    type Result = ();

    fn handle(&mut self, event: Remove, _: &mut Self::Context) -> Self::Result {
        if let Err(err) = self.db.remove(event) {
            self.err(err)
        }
    }
}

impl Handler<Get> for SledStore {
    type Result = Option<Vec<u8>>;

    fn handle(&mut self, event: Get, _: &mut Self::Context) -> Self::Result {
        match self.db.get(event) {
            Ok(v) => v,
            Err(err) => {
                self.err(err);
                None
            }
        }
    }
}
