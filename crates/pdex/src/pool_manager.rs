//! Pool manager: quoting over one pool snapshot.

use crate::config::EstimatorConfig;
use crate::error::PoolError;
use crate::matching::estimate_path_output;
use crate::pair::PoolPairId;
use crate::pool::{PoolPair, PoolSnapshot};
use crate::router::{self, PoolChoice, TradePath};
use crate::types::{Amount, TokenId};
use tracing::debug;

/// Entry point for estimating trades against a snapshot of the pools.
///
/// The snapshot is never mutated: every estimate works on cloned pool
/// state, so one manager can serve any number of quotes.
#[derive(Debug, Clone, Default)]
pub struct PoolManager {
    /// Configuration for path finding and quoting.
    config: EstimatorConfig,
    /// All pools indexed by pair ID.
    pools: PoolSnapshot,
}

/// A priced trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub sell_token: TokenId,
    pub buy_token: TokenId,
    pub sell_amount: Amount,
    /// Trading fee taken from the input before the first hop.
    pub fee: Amount,
    /// Pools the trade goes through, in order.
    pub pool_ids: Vec<PoolPairId>,
    /// Expected output, at least the requested minimum.
    pub amount_out: Amount,
}

impl PoolManager {
    /// Create a pool manager over `pools` with default configuration.
    pub fn new(pools: PoolSnapshot) -> Self {
        Self::with_config(pools, EstimatorConfig::default())
    }

    /// Create a pool manager with custom configuration.
    pub fn with_config(pools: PoolSnapshot, config: EstimatorConfig) -> Self {
        Self { config, pools }
    }

    /// Parse a snapshot in the node's JSON layout: an object mapping pool
    /// pair IDs to `{"State": .., "Orderbook": ..}`.
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        let pools: PoolSnapshot =
            serde_json::from_str(json).map_err(|err| PoolError::Snapshot(err.to_string()))?;
        debug!(pools = pools.len(), "Loaded pool snapshot");
        Ok(Self::new(pools))
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EstimatorConfig) {
        self.config = config;
    }

    pub fn pools(&self) -> &PoolSnapshot {
        &self.pools
    }

    pub fn pool(&self, id: &PoolPairId) -> Option<&PoolPair> {
        self.pools.get(id)
    }

    /// Add or replace a pool.
    pub fn insert_pool(&mut self, id: PoolPairId, pool: PoolPair) -> Option<PoolPair> {
        self.pools.insert(id, pool)
    }

    /// Estimate selling `sell_amount` of `sell_token` along `path`.
    pub fn estimate_output(
        &self,
        path: &[PoolPairId],
        sell_token: TokenId,
        sell_amount: Amount,
        fee: Amount,
        min_amount: Amount,
    ) -> Result<Amount, PoolError> {
        estimate_path_output(&self.pools, path, sell_token, sell_amount, fee, min_amount)
    }

    /// Find a good path of at most `max_hops` pools.
    pub fn find_good_trade_path(
        &self,
        max_hops: usize,
        sell_token: TokenId,
        buy_token: TokenId,
        sell_amount: Amount,
    ) -> Result<TradePath<'_>, PoolError> {
        self.check_max_hops(max_hops)?;
        router::find_good_trade_path(
            &self.config,
            max_hops,
            &self.pools,
            sell_token,
            buy_token,
            sell_amount,
        )
    }

    /// Price a trade.
    ///
    /// Uses `path` when given, otherwise searches for one with the
    /// configured hop cap. The fee is taken from the input and the output
    /// must reach `min_amount`.
    pub fn get_quote(
        &self,
        sell_token: TokenId,
        buy_token: TokenId,
        sell_amount: Amount,
        fee: Amount,
        min_amount: Amount,
        path: Option<&[PoolPairId]>,
    ) -> Result<Quote, PoolError> {
        if sell_token == buy_token {
            return Err(PoolError::InvalidPair);
        }
        if sell_amount == 0 {
            return Err(PoolError::InvalidAmount);
        }

        let pool_ids = match path {
            Some(path) => {
                if let Some(missing) = path.iter().find(|id| !self.pools.contains_key(*id)) {
                    return Err(PoolError::PairNotFound(missing.clone()));
                }
                path.to_vec()
            }
            None => {
                self.find_good_trade_path(
                    self.config.max_path_len,
                    sell_token,
                    buy_token,
                    sell_amount,
                )?
                .pool_ids
            }
        };
        if pool_ids.is_empty() {
            return Err(PoolError::EmptyPath);
        }
        self.check_max_hops(pool_ids.len())?;

        let amount_out = self.estimate_output(&pool_ids, sell_token, sell_amount, fee, min_amount)?;
        debug!(
            sell = %sell_token,
            buy = %buy_token,
            sell_amount,
            amount_out,
            hops = pool_ids.len(),
            "Quoted trade"
        );

        Ok(Quote {
            sell_token,
            buy_token,
            sell_amount,
            fee,
            pool_ids,
            amount_out,
        })
    }

    /// Best single pool for selling `sell_amount` of `sell_token` directly
    /// into `buy_token`.
    pub fn check_price(
        &self,
        sell_token: TokenId,
        buy_token: TokenId,
        sell_amount: Amount,
    ) -> Result<PoolChoice<'_>, PoolError> {
        if sell_token == buy_token {
            return Err(PoolError::InvalidPair);
        }
        if sell_amount == 0 {
            return Err(PoolError::InvalidAmount);
        }
        router::choose_best_pool_from_pair(&self.pools, sell_token, buy_token, sell_amount).ok_or(
            PoolError::NoPathFound {
                sell: sell_token,
                buy: buy_token,
                max_hops: 1,
            },
        )
    }

    fn check_max_hops(&self, hops: usize) -> Result<(), PoolError> {
        if hops > self.config.max_path_len {
            return Err(PoolError::InvalidMaxPathLength {
                max: self.config.max_path_len,
                got: hops,
            });
        }
        Ok(())
    }
}
