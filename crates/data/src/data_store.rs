// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Get, InMemStore, Insert, InsertSync, IntoKey, Remove, SledStore};
use actix::{Addr, Recipient};
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;
use tracing::error;

/// Scopable proxy to the key value store actor. Cloning is cheap and every clone talks to the
/// same underlying store.
#[derive(Clone, Debug)]
pub struct DataStore {
    scope: Vec<u8>,
    get: Recipient<Get>,
    insert: Recipient<Insert>,
    insert_sync: Recipient<InsertSync>,
    remove: Recipient<Remove>,
}

impl DataStore {
    /// Read data at the scope location
    pub async fn read<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let Some(bytes) = self.get.send(Get::new(&self.scope)).await? else {
            return Ok(None);
        };

        let value = bincode::deserialize(&bytes)
            .with_context(|| format!("Could not deserialize value at {}", self.get_scope()))?;
        Ok(Some(value))
    }

    /// Writes data to the scope location without waiting for the store
    pub fn write<T: Serialize>(&self, value: &T) {
        let Ok(serialized) = bincode::serialize(value) else {
            error!("Could not serialize value passed to {}", self.get_scope());
            return;
        };
        self.insert.do_send(Insert::new(&self.scope, serialized))
    }

    /// Writes data to the scope location and waits for the store to confirm
    pub async fn write_sync<T: Serialize>(&self, value: &T) -> Result<()> {
        let serialized = bincode::serialize(value)
            .with_context(|| format!("Could not serialize value passed to {}", self.get_scope()))?;
        self.insert_sync
            .send(InsertSync::new(&self.scope, serialized))
            .await??;
        Ok(())
    }

    /// Removes data from the scope location
    pub fn clear(&self) {
        self.remove.do_send(Remove::new(&self.scope))
    }

    pub fn get_scope(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.scope)
    }

    /// Changes the scope for the data store.
    /// Note that if the scope does not start with a slash one is appended.
    /// ```
    /// use contrib_data::{DataStore, InMemStore};
    /// use actix::Actor;
    ///
    /// #[actix::main]
    /// async fn main() {
    ///   let addr = InMemStore::new(false).start();
    ///   let store = DataStore::from(&addr);
    ///   assert_eq!(store.scope("//contrib").scope("protocol").get_scope(), "//contrib/protocol");
    /// }
    /// ```
    pub fn scope<K: IntoKey>(&self, key: K) -> Self {
        let mut scope = self.scope.clone();
        let encoded_key = key.into_key();
        if !encoded_key.starts_with(b"/") {
            scope.push(b'/');
        }
        scope.extend(encoded_key);
        Self {
            scope,
            ..self.clone()
        }
    }
}

impl From<&Addr<SledStore>> for DataStore {
    fn from(addr: &Addr<SledStore>) -> Self {
        Self {
            scope: vec![],
            get: addr.clone().recipient(),
            insert: addr.clone().recipient(),
            insert_sync: addr.clone().recipient(),
            remove: addr.clone().recipient(),
        }
    }
}

impl From<&Addr<InMemStore>> for DataStore {
    fn from(addr: &Addr<InMemStore>) -> Self {
        Self {
            scope: vec![],
            get: addr.clone().recipient(),
            insert: addr.clone().recipient(),
            insert_sync: addr.clone().recipient(),
            remove: addr.clone().recipient(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DataStore;
    use crate::InMemStore;
    use actix::Actor;
    use anyhow::Result;

    #[actix::test]
    async fn scoped_stores_do_not_collide() -> Result<()> {
        let addr = InMemStore::new(false).start();
        let root = DataStore::from(&addr).scope("//contrib");
        let a = root.scope("a");
        let b = root.scope("b");

        a.write_sync(&1u64).await?;
        b.write_sync(&2u64).await?;

        assert_eq!(a.read::<u64>().await?, Some(1));
        assert_eq!(b.read::<u64>().await?, Some(2));
        assert_eq!(root.read::<u64>().await?, None);
        Ok(())
    }

    #[actix::test]
    async fn clear_removes_value() -> Result<()> {
        let addr = InMemStore::new(false).start();
        let store = DataStore::from(&addr).scope("value");
        store.write_sync(&"hello".to_string()).await?;
        store.clear();
        assert_eq!(store.read::<String>().await?, None);
        Ok(())
    }
}
