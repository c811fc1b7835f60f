// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{bail, Context, Result};

pub const MIN_KEY_BYTES: usize = 16;

/// Check that a hex encoded key, optionally prefixed with `0x`, decodes to enough bytes
pub fn validate_hex_key(key: &str) -> Result<()> {
    let trimmed = key.strip_prefix("0x").unwrap_or(key);
    let bytes = hex::decode(trimmed).context("verifier key is not valid hex")?;
    if bytes.len() < MIN_KEY_BYTES {
        bail!(
            "verifier key must be at least {} bytes but was {}",
            MIN_KEY_BYTES,
            bytes.len()
        );
    }
    Ok(())
}
