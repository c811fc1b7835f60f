// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use contrib_data::{DataStore, Repository};
use contrib_fhe::Ciphertext;
use contrib_ledger::ProtocolStore;

pub const PROTOCOL_SCOPE: &str = "//contrib/protocol";

pub trait ProtocolRepositoryFactory {
    fn protocol<C: Ciphertext>(&self) -> Repository<ProtocolStore<C>>;
}

impl ProtocolRepositoryFactory for DataStore {
    fn protocol<C: Ciphertext>(&self) -> Repository<ProtocolStore<C>> {
        Repository::new(self.scope(PROTOCOL_SCOPE))
    }
}
