//! Constant-product pools over real and amplified virtual reserves.

use crate::config::BASE_AMPLIFIER;
use crate::error::{OrderError, PoolError};
use crate::order::Order;
use crate::orderbook::OrderBook;
use crate::pair::PoolPairId;
use crate::serde_utils::bigint_string;
use crate::types::{Amount, TokenId, TradeDirection};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pool states by identifier, as fetched from a node at one chain height.
///
/// Ordered so that iteration, and therefore tie-breaking, is deterministic.
pub type PoolSnapshot = BTreeMap<PoolPairId, PoolPair>;

/// The AMM side of a pool.
///
/// Prices come from the virtual reserves, which are the real reserves
/// scaled by the amplifier; the real reserves bound what can be paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TradingPair {
    #[serde(rename = "Token0ID")]
    pub token0_id: TokenId,
    #[serde(rename = "Token1ID")]
    pub token1_id: TokenId,
    pub token0_real_amount: Amount,
    pub token1_real_amount: Amount,
    #[serde(with = "bigint_string")]
    pub token0_virtual_amount: BigInt,
    #[serde(with = "bigint_string")]
    pub token1_virtual_amount: BigInt,
    pub amplifier: u32,
    #[serde(default)]
    pub share_amount: Amount,
}

/// A pool: its AMM reserves plus its resting order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPair {
    #[serde(rename = "State")]
    pub state: TradingPair,
    #[serde(rename = "Orderbook", default)]
    pub order_book: OrderBook,
}

/// Result of a (possibly partial) swap against the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Amount of the buy token paid out by the pool.
    pub bought: Amount,
    /// Part of the sell amount left for the order book.
    pub remaining: Amount,
    pub token0_change: BigInt,
    pub token1_change: BigInt,
}

impl SwapOutcome {
    /// Nothing swapped; the whole amount goes to the order.
    fn deferred(amount: Amount) -> Self {
        Self {
            bought: 0,
            remaining: amount,
            token0_change: BigInt::default(),
            token1_change: BigInt::default(),
        }
    }
}

impl TradingPair {
    /// Create an unamplified pair; virtual reserves equal real ones.
    pub fn new(
        token0_id: TokenId,
        token1_id: TokenId,
        token0_real_amount: Amount,
        token1_real_amount: Amount,
    ) -> Self {
        Self {
            token0_id,
            token1_id,
            token0_real_amount,
            token1_real_amount,
            token0_virtual_amount: BigInt::from(token0_real_amount),
            token1_virtual_amount: BigInt::from(token1_real_amount),
            amplifier: BASE_AMPLIFIER,
            share_amount: 0,
        }
    }

    /// Rescale the virtual reserves to `real * amplifier / BASE_AMPLIFIER`.
    pub fn with_amplifier(mut self, amplifier: u32) -> Self {
        let scale = |real: Amount| BigInt::from(real) * amplifier / BASE_AMPLIFIER;
        self.token0_virtual_amount = scale(self.token0_real_amount);
        self.token1_virtual_amount = scale(self.token1_real_amount);
        self.amplifier = amplifier;
        self
    }

    pub fn has_insufficient_liquidity(&self) -> bool {
        self.token0_real_amount == 0 || self.token1_real_amount == 0
    }

    /// The direction of a trade selling `token` into this pair.
    pub fn direction_for(&self, token: TokenId) -> Option<TradeDirection> {
        if token == self.token0_id {
            Some(TradeDirection::Sell0)
        } else if token == self.token1_id {
            Some(TradeDirection::Sell1)
        } else {
            None
        }
    }

    /// The token received by a trade in `direction`.
    pub fn token_to_buy(&self, direction: TradeDirection) -> TokenId {
        match direction {
            TradeDirection::Sell0 => self.token1_id,
            TradeDirection::Sell1 => self.token0_id,
        }
    }

    /// Real and virtual reserves as (in, out, virtual in, virtual out).
    fn reserves(&self, direction: TradeDirection) -> (Amount, Amount, &BigInt, &BigInt) {
        match direction {
            TradeDirection::Sell0 => (
                self.token0_real_amount,
                self.token1_real_amount,
                &self.token0_virtual_amount,
                &self.token1_virtual_amount,
            ),
            TradeDirection::Sell1 => (
                self.token1_real_amount,
                self.token0_real_amount,
                &self.token1_virtual_amount,
                &self.token0_virtual_amount,
            ),
        }
    }

    /// Output for selling `sell_amount`. Deduct fees before calling this.
    ///
    /// `floor(sell * virtual_out / (sell + virtual_in))`
    pub fn buy_amount(
        &self,
        sell_amount: Amount,
        direction: TradeDirection,
    ) -> Result<Amount, PoolError> {
        if sell_amount == 0 {
            return Err(PoolError::InsufficientInput);
        }
        let (reserve_in, reserve_out, virtual_in, virtual_out) = self.reserves(direction);
        if reserve_in == 0 || reserve_out == 0 {
            return Err(PoolError::InsufficientLiquidity);
        }

        let amount = BigInt::from(sell_amount);
        let numerator = &amount * virtual_out;
        let denominator = &amount + virtual_in;
        if denominator.sign() != Sign::Plus {
            return Err(PoolError::InsufficientLiquidity);
        }
        (numerator / denominator)
            .to_u64()
            .ok_or(PoolError::RangeOverflow("buy amount"))
    }

    /// Input needed to receive `buy_amount`, rounded up.
    ///
    /// `floor(virtual_in * buy / (virtual_out - buy)) + 1`
    pub fn amount_to_sell(
        &self,
        buy_amount: Amount,
        direction: TradeDirection,
    ) -> Result<Amount, PoolError> {
        if buy_amount == 0 {
            return Err(PoolError::InsufficientInput);
        }
        let (reserve_in, reserve_out, virtual_in, virtual_out) = self.reserves(direction);
        if reserve_in == 0 || reserve_out == 0 {
            return Err(PoolError::InsufficientLiquidity);
        }

        let amount = BigInt::from(buy_amount);
        if virtual_out <= &amount {
            return Err(PoolError::InsufficientLiquidity);
        }
        let result: BigInt = virtual_in * &amount / (virtual_out - &amount) + 1;
        result
            .to_u64()
            .ok_or(PoolError::RangeOverflow("sell amount"))
    }

    /// Swap at most `max_sell` through the pool, stopping where the pool's
    /// marginal price reaches `order`'s rate.
    ///
    /// With `L = xV * yV`, the pool meets the order's rate `xOrd:yOrd` once
    /// the sell-side virtual reserve reaches `sqrt(L * xOrd / yOrd)`. Only
    /// the distance to that point is swapped; the rest is left for the
    /// order. Reserve changes are applied to `self` on success.
    pub fn swap_to_reach_order_rate(
        &mut self,
        max_sell: Amount,
        direction: TradeDirection,
        order: Option<&Order>,
    ) -> Result<SwapOutcome, PoolError> {
        if self.has_insufficient_liquidity() {
            return Err(PoolError::InsufficientLiquidity);
        }
        let (_, _, x_v, y_v) = self.reserves(direction);
        if x_v.sign() != Sign::Plus || y_v.sign() != Sign::Plus {
            return Err(PoolError::InsufficientLiquidity);
        }

        let target_delta_x = match order {
            Some(order) => {
                if order.trade_direction == direction {
                    return Err(OrderError::SameDirection(order.id.clone()).into());
                }
                let rate = order.rate();
                if rate.is_zero() {
                    return Err(OrderError::ZeroRate(order.id.clone()).into());
                }
                let (x_ord, y_ord) = rate.oriented(direction);
                let invariant = x_v * y_v;
                Some((invariant * x_ord / y_ord).sqrt() - x_v)
            }
            None => None,
        };

        let max_delta_x = BigInt::from(max_sell);
        let (sell_amount, remaining) = match target_delta_x {
            Some(target) if target < max_delta_x => {
                if target.sign() != Sign::Plus {
                    // pool price already past the order rate
                    return Ok(SwapOutcome::deferred(max_sell));
                }
                // 0 < target < max_sell, so it fits
                let target = target
                    .to_u64()
                    .ok_or(PoolError::RangeOverflow("target sell amount"))?;
                (target, max_sell - target)
            }
            _ => (max_sell, 0),
        };

        let bought = self.buy_amount(sell_amount, direction)?;
        if remaining > 0 && bought == 0 {
            // close enough to the order rate
            return Ok(SwapOutcome::deferred(max_sell));
        }

        let sold = BigInt::from(sell_amount);
        let paid = -BigInt::from(bought);
        let (token0_change, token1_change) = match direction {
            TradeDirection::Sell0 => (sold, paid),
            TradeDirection::Sell1 => (paid, sold),
        };
        self.apply_reserve_changes(&token0_change, &token1_change)?;

        Ok(SwapOutcome {
            bought,
            remaining,
            token0_change,
            token1_change,
        })
    }

    /// Apply signed deltas to both real and virtual reserves.
    ///
    /// The deltas must have opposite signs or both be zero. Nothing is
    /// written unless both real reserves stay within `0..=u64::MAX`.
    pub fn apply_reserve_changes(
        &mut self,
        change0: &BigInt,
        change1: &BigInt,
    ) -> Result<(), PoolError> {
        let valid = matches!(
            (change0.sign(), change1.sign()),
            (Sign::NoSign, Sign::NoSign) | (Sign::Plus, Sign::Minus) | (Sign::Minus, Sign::Plus)
        );
        if !valid {
            return Err(PoolError::InvalidReserveChange);
        }

        let real0 = updated_real(self.token0_real_amount, change0, 0)?;
        let real1 = updated_real(self.token1_real_amount, change1, 1)?;

        self.token0_real_amount = real0;
        self.token1_real_amount = real1;
        self.token0_virtual_amount += change0;
        self.token1_virtual_amount += change1;
        Ok(())
    }
}

fn updated_real(real: Amount, change: &BigInt, token: u8) -> Result<Amount, PoolError> {
    let updated = BigInt::from(real) + change;
    if updated.sign() == Sign::Minus {
        return Err(PoolError::NegativeReserve { token });
    }
    updated
        .to_u64()
        .ok_or(PoolError::RangeOverflow("real reserve"))
}

impl PoolPair {
    /// Create a pool with an empty order book.
    pub fn new(state: TradingPair) -> Self {
        Self {
            state,
            order_book: OrderBook::new(),
        }
    }

    /// Create a pool with the given resting orders.
    pub fn with_orders(state: TradingPair, orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            state,
            order_book: OrderBook::from_orders(orders),
        }
    }

    /// Check if this pool trades `token_a` against `token_b`, in either order.
    pub fn connects(&self, token_a: TokenId, token_b: TokenId) -> bool {
        (self.state.token0_id == token_a && self.state.token1_id == token_b)
            || (self.state.token0_id == token_b && self.state.token1_id == token_a)
    }
}
