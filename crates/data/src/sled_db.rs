// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Get, Insert, Remove};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use sled::{Db, Tree};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::info;

// sled allows a single open handle per path and process
static SLED_CACHE: Lazy<Mutex<HashMap<PathBuf, Db>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn get_or_open_db(path: &Path) -> Result<Db> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Could not create database dir '{}'", path.display()))?;
    let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let mut cache = SLED_CACHE
        .lock()
        .map_err(|_| anyhow::anyhow!("sled cache lock poisoned"))?;
    if let Some(db) = cache.get(&key) {
        return Ok(db.clone());
    }

    let db = sled::open(path)
        .with_context(|| format!("Could not open database at path '{}'", path.display()))?;
    if db.was_recovered() {
        info!("recovered db at: {:?}", path);
    } else {
        info!("created db at: {:?}", path);
    }
    cache.insert(key, db.clone());
    Ok(db)
}

pub struct SledDb {
    db: Tree,
}

impl SledDb {
    pub fn new(path: &Path, tree: &str) -> Result<Self> {
        let db = get_or_open_db(path)?.open_tree(tree)?;
        Ok(Self { db })
    }

    pub fn insert(&mut self, msg: Insert) -> Result<()> {
        self.db
            .insert(msg.key(), msg.value())
            .context("Could not insert data into db")?;
        Ok(())
    }

    pub fn remove(&mut self, msg: Remove) -> Result<()> {
        self.db
            .remove(msg.key())
            .context("Could not remove data from db")?;
        Ok(())
    }

    pub fn get(&self, msg: Get) -> Result<Option<Vec<u8>>> {
        let res = self.db.get(msg.key()).with_context(|| {
            format!("Failed to fetch {}", String::from_utf8_lossy(msg.key()))
        })?;
        Ok(res.map(|v| v.to_vec()))
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush().context("Could not flush db")?;
        Ok(())
    }
}
