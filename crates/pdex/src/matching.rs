//! Trade estimation across one or more hops.
//!
//! Each hop alternates between the pool's AMM and its order book: the pool
//! is swapped until its price reaches the best resting order, the order
//! absorbs what it can at its fixed rate, and the loop moves on to the next
//! order until the hop's input is used up.

use crate::error::PoolError;
use crate::orderbook::OrderBook;
use crate::pair::PoolPairId;
use crate::pool::{PoolSnapshot, TradingPair};
use crate::types::{Amount, TokenId, TradeDirection};
use tracing::trace;

/// Estimate the output of selling `amount_in` along a path of pools.
///
/// `pairs`, `directions` and `order_books` hold one entry per hop. The fee
/// is deducted once from the first hop's input and each hop's output is
/// the next hop's input. The pairs and books are mutated as the trade
/// would mutate them, so callers pass cloned state (see
/// [`trade_path_from_state`]).
///
/// Fails with [`PoolError::SlippageNotMet`] when the output is below
/// `min_amount`.
pub fn estimate_output(
    amount_in: Amount,
    fee: Amount,
    pairs: &mut [TradingPair],
    directions: &[TradeDirection],
    min_amount: Amount,
    order_books: &mut [OrderBook],
) -> Result<Amount, PoolError> {
    if directions.len() != pairs.len() || order_books.len() != pairs.len() {
        return Err(PoolError::PathMismatch {
            pools: pairs.len(),
            directions: directions.len(),
            order_books: order_books.len(),
        });
    }
    if pairs.is_empty() {
        return Err(PoolError::EmptyPath);
    }
    if amount_in < fee {
        return Err(PoolError::FeeExceedsInput { amount_in, fee });
    }

    let mut sell_amount = amount_in - fee;
    let mut received = 0;
    let hops = pairs.iter_mut().zip(directions).zip(order_books.iter_mut());
    for (hop, ((pair, &direction), book)) in hops.enumerate() {
        received = estimate_hop(pair, book, direction, sell_amount)?;
        trace!(hop, %direction, sold = sell_amount, bought = received, "Estimated hop");
        sell_amount = received;
    }

    if received < min_amount {
        return Err(PoolError::SlippageNotMet {
            min_amount,
            received,
        });
    }
    Ok(received)
}

/// Sell `sell_amount` into one pool and its book, returning the amount bought.
fn estimate_hop(
    pair: &mut TradingPair,
    book: &mut OrderBook,
    direction: TradeDirection,
    sell_amount: Amount,
) -> Result<Amount, PoolError> {
    let mut remaining = sell_amount;
    let mut bought: Amount = 0;

    loop {
        let order = book.next_order_mut(direction);
        let swap = pair.swap_to_reach_order_rate(remaining, direction, order.as_deref())?;
        bought = bought
            .checked_add(swap.bought)
            .ok_or(PoolError::RangeOverflow("bought amount after swapping in pool"))?;
        remaining = swap.remaining;
        if remaining == 0 {
            break;
        }

        let Some(order) = order else {
            break;
        };
        let matched = order.match_trade(remaining, direction)?;
        bought = bought
            .checked_add(matched.bought)
            .ok_or(PoolError::RangeOverflow("bought amount after matching order"))?;
        remaining = matched.remaining;
        if remaining == 0 {
            break;
        }
    }

    Ok(bought)
}

/// Cloned per-hop state for one trade path, ready to be mutated by an
/// estimation without touching the snapshot it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePathState {
    pub pairs: Vec<TradingPair>,
    pub order_books: Vec<OrderBook>,
    pub directions: Vec<TradeDirection>,
    /// The token received at the end of the path.
    pub buy_token: TokenId,
}

impl TradePathState {
    /// Run [`estimate_output`] over this state.
    pub fn estimate(
        &mut self,
        amount_in: Amount,
        fee: Amount,
        min_amount: Amount,
    ) -> Result<Amount, PoolError> {
        estimate_output(
            amount_in,
            fee,
            &mut self.pairs,
            &self.directions,
            min_amount,
            &mut self.order_books,
        )
    }
}

/// Clone the pools of `path` out of the snapshot and work out the direction
/// of each hop, starting from `sell_token`.
pub fn trade_path_from_state(
    sell_token: TokenId,
    path: &[PoolPairId],
    pools: &PoolSnapshot,
) -> Result<TradePathState, PoolError> {
    let mut state = TradePathState {
        pairs: Vec::with_capacity(path.len()),
        order_books: Vec::with_capacity(path.len()),
        directions: Vec::with_capacity(path.len()),
        buy_token: sell_token,
    };

    for pool_id in path {
        let pool = pools
            .get(pool_id)
            .ok_or_else(|| PoolError::PairNotFound(pool_id.clone()))?;
        let direction = pool.state.direction_for(state.buy_token).ok_or_else(|| {
            PoolError::IncompatibleSellToken {
                token: state.buy_token,
                pool_id: pool_id.clone(),
            }
        })?;

        state.buy_token = pool.state.token_to_buy(direction);
        state.pairs.push(pool.state.clone());
        state.order_books.push(pool.order_book.clone());
        state.directions.push(direction);
    }

    Ok(state)
}

/// Estimate selling `amount_in` of `sell_token` along `path` in the snapshot.
pub fn estimate_path_output(
    pools: &PoolSnapshot,
    path: &[PoolPairId],
    sell_token: TokenId,
    amount_in: Amount,
    fee: Amount,
    min_amount: Amount,
) -> Result<Amount, PoolError> {
    trade_path_from_state(sell_token, path, pools)?.estimate(amount_in, fee, min_amount)
}
