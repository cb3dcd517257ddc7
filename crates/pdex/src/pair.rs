//! Pool pair identifiers.

use crate::error::PoolError;
use crate::types::{TokenId, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a pool pair.
///
/// Formatted as `token0-token1-nft`, three 32-byte hashes in lowercase hex
/// without a `0x` prefix. Several pools may connect the same two tokens;
/// the NFT hash tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PoolPairId(String);

impl PoolPairId {
    /// Build the identifier of the pool created for `nft_id`.
    pub fn new(token0: TokenId, token1: TokenId, nft_id: B256) -> Self {
        Self(format!("{token0:x}-{token1:x}-{nft_id:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two tokens the pool connects, in pool order.
    pub fn tokens(&self) -> (TokenId, TokenId) {
        let mut parts = self.0.split('-').filter_map(|p| B256::from_str(p).ok());
        // validated on construction
        let token0 = parts.next().unwrap_or_default();
        let token1 = parts.next().unwrap_or_default();
        (token0, token1)
    }
}

impl FromStr for PoolPairId {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(PoolError::InvalidPairId(s.to_string()));
        }
        let mut hashes = Vec::with_capacity(3);
        for part in parts {
            let hash =
                B256::from_str(part).map_err(|_| PoolError::InvalidPairId(s.to_string()))?;
            hashes.push(hash);
        }
        Ok(Self::new(hashes[0], hashes[1], hashes[2]))
    }
}

impl TryFrom<String> for PoolPairId {
    type Error = PoolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PoolPairId> for String {
    fn from(id: PoolPairId) -> Self {
        id.0
    }
}

impl fmt::Display for PoolPairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
