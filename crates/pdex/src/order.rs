//! Resting limit orders and their matching primitive.

use crate::error::{OrderError, PoolError};
use crate::types::{Amount, Rate, TradeDirection};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A resting limit order in a pool's order book.
///
/// The order sells one token of the pool at the fixed ratio
/// `token0_rate : token1_rate` and accumulates the other token as it gets
/// matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    /// Unique order identifier within a book.
    pub id: String,
    /// NFT that owns the order.
    #[serde(rename = "NftID", default)]
    pub nft_id: String,
    pub token0_rate: u64,
    pub token1_rate: u64,
    pub token0_balance: Amount,
    pub token1_balance: Amount,
    /// The token this order sells.
    pub trade_direction: TradeDirection,
    #[serde(default)]
    pub fee: Amount,
}

/// Result of matching an incoming trade against one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMatch {
    /// Amount of the buy token taken from the order.
    pub bought: Amount,
    /// Part of the incoming sell amount the order could not absorb.
    pub remaining: Amount,
    /// Change applied to the order's token0 balance.
    pub token0_change: BigInt,
    /// Change applied to the order's token1 balance.
    pub token1_change: BigInt,
}

impl Order {
    /// Create a new order selling `balance` of the token given by `direction`.
    pub fn new(
        id: impl Into<String>,
        direction: TradeDirection,
        rate: Rate,
        balance: Amount,
    ) -> Self {
        let (token0_balance, token1_balance) = match direction {
            TradeDirection::Sell0 => (balance, 0),
            TradeDirection::Sell1 => (0, balance),
        };
        Self {
            id: id.into(),
            nft_id: String::new(),
            token0_rate: rate.token0,
            token1_rate: rate.token1,
            token0_balance,
            token1_balance,
            trade_direction: direction,
            fee: 0,
        }
    }

    pub fn rate(&self) -> Rate {
        Rate::new(self.token0_rate, self.token1_rate)
    }

    /// Outstanding balance of the token this order sells.
    pub fn balance_to_sell(&self) -> Amount {
        match self.trade_direction {
            TradeDirection::Sell0 => self.token0_balance,
            TradeDirection::Sell1 => self.token1_balance,
        }
    }

    /// Check if this order can take the other side of an incoming trade.
    pub fn can_match(&self, incoming: TradeDirection) -> bool {
        self.trade_direction != incoming && self.balance_to_sell() != 0
    }

    /// Match up to `max_sell` of an incoming trade against this order.
    ///
    /// The order pays `floor(sell * rate_out / rate_in)`. When that exceeds
    /// its balance the order is drained instead, and the sell amount it
    /// consumed is rounded up so the order is never under-paid.
    pub fn match_trade(
        &mut self,
        max_sell: Amount,
        incoming: TradeDirection,
    ) -> Result<OrderMatch, PoolError> {
        if incoming == self.trade_direction {
            return Err(OrderError::SameDirection(self.id.clone()).into());
        }
        let rate = self.rate();
        if rate.is_zero() {
            return Err(OrderError::ZeroRate(self.id.clone()).into());
        }

        let (rate_in, rate_out) = rate.oriented(incoming);
        let (rate_in, rate_out) = (rate_in as u128, rate_out as u128);
        let balance_out = self.balance_to_sell();

        let full_buy = max_sell as u128 * rate_out / rate_in;
        let (bought, sold) = if full_buy <= balance_out as u128 {
            (full_buy as Amount, max_sell)
        } else {
            let sold = (balance_out as u128 * rate_in).div_ceil(rate_out);
            let sold = Amount::try_from(sold).map_err(|_| PoolError::RangeOverflow("order fill"))?;
            (balance_out, sold)
        };
        let remaining = max_sell.saturating_sub(sold);

        let (balance_in, balance_out) = match incoming {
            TradeDirection::Sell0 => (&mut self.token0_balance, &mut self.token1_balance),
            TradeDirection::Sell1 => (&mut self.token1_balance, &mut self.token0_balance),
        };
        *balance_in = balance_in
            .checked_add(sold)
            .ok_or(PoolError::RangeOverflow("order balance"))?;
        *balance_out -= bought;

        let gained = BigInt::from(sold);
        let paid = -BigInt::from(bought);
        let (token0_change, token1_change) = match incoming {
            TradeDirection::Sell0 => (gained, paid),
            TradeDirection::Sell1 => (paid, gained),
        };

        Ok(OrderMatch {
            bought,
            remaining,
            token0_change,
            token1_change,
        })
    }
}
