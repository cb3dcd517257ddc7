//! Error types for order-book maintenance and trade estimation.

use crate::pair::PoolPairId;
use crate::types::{Amount, TokenId};

/// Errors that can occur when working with orders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// A raw trade direction outside {sell0, sell1}.
    #[error("invalid trade direction {0}")]
    InvalidDirection(u8),

    #[error("invalid order index {index} for order book length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The incoming trade sells the same token as the order.
    #[error("cannot match trade with order {0} of the same direction")]
    SameDirection(String),

    #[error("order {0} has a zero rate component")]
    ZeroRate(String),
}

/// Errors that can occur while simulating a trade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("insufficient input amount")]
    InsufficientInput,

    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// A swap would drive a real reserve below zero.
    #[error("not enough token{token} liquidity for trade")]
    NegativeReserve { token: u8 },

    #[error("{0} exceeds uint64 range")]
    RangeOverflow(&'static str),

    /// Reserve deltas must have opposite signs, or both be zero.
    #[error("invalid signs for reserve changes")]
    InvalidReserveChange,

    #[error(
        "trade path vs directions vs order books length mismatch ({pools} vs {directions} vs {order_books})"
    )]
    PathMismatch {
        pools: usize,
        directions: usize,
        order_books: usize,
    },

    #[error("trade path is empty")]
    EmptyPath,

    #[error("trade input {amount_in} insufficient for trading fee {fee}")]
    FeeExceedsInput { amount_in: Amount, fee: Amount },

    #[error("min acceptable amount {min_amount} not reached - trade output {received}")]
    SlippageNotMet { min_amount: Amount, received: Amount },

    #[error("no trading path found for {sell}-{buy} within {max_hops} hops")]
    NoPathFound {
        sell: TokenId,
        buy: TokenId,
        max_hops: usize,
    },

    #[error("path contains nonexistent pair {0}")]
    PairNotFound(PoolPairId),

    #[error("incompatible selling token {token} vs next pair {pool_id}")]
    IncompatibleSellToken { token: TokenId, pool_id: PoolPairId },

    #[error("invalid pool pair id {0:?}")]
    InvalidPairId(String),

    /// Selling a token for itself.
    #[error("invalid pair")]
    InvalidPair,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("maximum trading path length allowed {max}, got {got}")]
    InvalidMaxPathLength { max: usize, got: usize },

    #[error("malformed pool snapshot: {0}")]
    Snapshot(String),

    #[error("order error: {0}")]
    Order(#[from] OrderError),
}
