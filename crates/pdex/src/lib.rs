//! Off-chain trade estimation for a hybrid AMM / order-book DEX.
//!
//! Every pool pairs a constant-product AMM over amplified virtual reserves
//! with a book of fixed-rate limit orders. This library provides:
//! - Exact simulation of a trade through one or more pools, matching
//!   against both the AMM curve and resting orders
//! - Bounded, liquidity-guided search for a good multi-hop path
//! - A quoting facade over a snapshot of all pools
//!
//! Nothing here talks to a node: callers fetch the snapshot and hand it
//! over, and every estimate works on cloned state.

pub mod config;
pub mod error;
pub mod matching;
pub mod order;
pub mod orderbook;
pub mod pair;
pub mod pool;
pub mod pool_manager;
pub mod router;
pub mod serde_utils;
pub mod types;

pub use config::EstimatorConfig;
pub use error::{OrderError, PoolError};
pub use matching::{estimate_output, trade_path_from_state, TradePathState};
pub use order::{Order, OrderMatch};
pub use orderbook::OrderBook;
pub use pair::PoolPairId;
pub use pool::{PoolPair, PoolSnapshot, SwapOutcome, TradingPair};
pub use pool_manager::{PoolManager, Quote};
pub use router::{choose_best_pool_from_pair, find_good_trade_path, PoolChoice, Router, TradePath};
pub use types::{Amount, Rate, TokenId, TradeDirection, B256, PRV_TOKEN};
