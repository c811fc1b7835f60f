// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::IntoKey;
use actix::Message;
use anyhow::Result;

/// Defines a keyed store command. Every command carries the full scoped key it acts on.
macro_rules! store_command {
    ($(#[$meta:meta])* $name:ident => $result:tt) => {
        $(#[$meta])*
        #[derive(Message, Clone, Debug, PartialEq, Eq, Hash)]
        #[rtype(result = $result)]
        pub struct $name(Vec<u8>);

        impl $name {
            pub fn new<K: IntoKey>(key: K) -> Self {
                Self(key.into_key())
            }

            pub fn key(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

store_command!(
    /// Read the value stored at a key
    Get => "Option<Vec<u8>>"
);

store_command!(
    /// Delete the value stored at a key
    Remove => "()"
);

/// Fire and forget write of a value
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash)]
#[rtype(result = "()")]
pub struct Insert {
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Insert {
    pub fn new<K: IntoKey>(key: K, value: Vec<u8>) -> Self {
        Self {
            key: key.into_key(),
            value,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// Write of a value that reports back once the store has applied it
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash)]
#[rtype(result = "Result<()>")]
pub struct InsertSync(Insert);

impl InsertSync {
    pub fn new<K: IntoKey>(key: K, value: Vec<u8>) -> Self {
        Self(Insert::new(key, value))
    }

    pub fn key(&self) -> &[u8] {
        self.0.key()
    }

    pub fn value(&self) -> &[u8] {
        self.0.value()
    }
}

impl From<InsertSync> for Insert {
    fn from(value: InsertSync) -> Self {
        value.0
    }
}
