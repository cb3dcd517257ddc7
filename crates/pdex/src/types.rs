//! Core type definitions for the estimator.
//!
//! Token identifiers are 32-byte hashes (alloy's `B256`); amounts are the
//! chain's native 64-bit unsigned integers.

use crate::error::OrderError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub use alloy_primitives::B256;

/// Unique identifier for a token.
pub type TokenId = B256;

/// PRV, the native token, is the hash `00..04`.
pub const PRV_TOKEN: TokenId = B256::with_last_byte(4);

/// Amount of tokens in the smallest unit.
pub type Amount = u64;

/// Which of a pool's two tokens is being sold.
///
/// On the wire this is a single byte: 0 for sell0, 1 for sell1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TradeDirection {
    /// Sell token0, buy token1.
    Sell0,
    /// Sell token1, buy token0.
    Sell1,
}

impl TradeDirection {
    /// The direction of the counterparty.
    pub fn opposite(self) -> Self {
        match self {
            TradeDirection::Sell0 => TradeDirection::Sell1,
            TradeDirection::Sell1 => TradeDirection::Sell0,
        }
    }
}

impl TryFrom<u8> for TradeDirection {
    type Error = OrderError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TradeDirection::Sell0),
            1 => Ok(TradeDirection::Sell1),
            other => Err(OrderError::InvalidDirection(other)),
        }
    }
}

impl From<TradeDirection> for u8 {
    fn from(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Sell0 => 0,
            TradeDirection::Sell1 => 1,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Sell0 => write!(f, "sell0"),
            TradeDirection::Sell1 => write!(f, "sell1"),
        }
    }
}

/// Exchange rate of an order as the ratio `token0 : token1`.
///
/// The effective rate is `token1 / token0`; it is never materialized as a
/// float, comparisons cross-multiply instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rate {
    pub token0: u64,
    pub token1: u64,
}

impl Rate {
    pub fn new(token0: u64, token1: u64) -> Self {
        Self { token0, token1 }
    }

    /// Compare two rates by `token1 / token0`.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        // a/b vs c/d as a*d vs c*b; u64 products are exact in u128
        let lhs = self.token1 as u128 * other.token0 as u128;
        let rhs = other.token1 as u128 * self.token0 as u128;
        lhs.cmp(&rhs)
    }

    /// Rate components as `(sell side, buy side)` for an incoming trade.
    pub fn oriented(&self, direction: TradeDirection) -> (u64, u64) {
        match direction {
            TradeDirection::Sell0 => (self.token0, self.token1),
            TradeDirection::Sell1 => (self.token1, self.token0),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.token0 == 0 || self.token1 == 0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.token0, self.token1)
    }
}
