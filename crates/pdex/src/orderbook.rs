//! Order book of a single pool.

use crate::error::OrderError;
use crate::order::Order;
use crate::types::TradeDirection;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The resting limit orders of one pool.
///
/// Orders are kept in one list sorted ascending by effective rate
/// (`token1_rate / token0_rate`):
/// - a sell0 trade takes the best rate from the tail
/// - a sell1 trade takes the best rate from the head
///
/// On equal rates sell0 orders precede sell1 orders; among the same
/// direction sell0 ties sort by id ascending and sell1 ties by id
/// descending, so either scan meets the smallest id first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOrderBook")]
pub struct OrderBook {
    orders: Vec<Order>,
}

/// Wire shape of a book; orders are re-inserted to restore the ordering.
#[derive(Deserialize)]
struct RawOrderBook {
    #[serde(default)]
    orders: Vec<Order>,
}

impl From<RawOrderBook> for OrderBook {
    fn from(raw: RawOrderBook) -> Self {
        Self::from_orders(raw.orders)
    }
}

impl OrderBook {
    /// Create an empty order book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book by inserting every order in turn.
    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let mut book = Self::new();
        for order in orders {
            book.insert_order(order);
        }
        book
    }

    /// Insert an order, keeping the book sorted.
    pub fn insert_order(&mut self, order: Order) {
        let index = self
            .orders
            .partition_point(|existing| !goes_before(&order, existing));
        self.orders.insert(index, order);
    }

    /// Index of the best order that can take the other side of `direction`.
    pub fn next_order_index(&self, direction: TradeDirection) -> Option<usize> {
        match direction {
            TradeDirection::Sell0 => self.orders.iter().rposition(|o| o.can_match(direction)),
            TradeDirection::Sell1 => self.orders.iter().position(|o| o.can_match(direction)),
        }
    }

    /// The best order that can take the other side of `direction`,
    /// or `None` when no active order is left.
    pub fn next_order(&self, direction: TradeDirection) -> Option<&Order> {
        let index = self.next_order_index(direction)?;
        Some(&self.orders[index])
    }

    /// Mutable access to the next order, for matching.
    pub fn next_order_mut(&mut self, direction: TradeDirection) -> Option<&mut Order> {
        let index = self.next_order_index(direction)?;
        Some(&mut self.orders[index])
    }

    /// Remove one order by its position.
    pub fn remove_order(&mut self, index: usize) -> Result<Order, OrderError> {
        if index >= self.orders.len() {
            return Err(OrderError::IndexOutOfRange {
                index,
                len: self.orders.len(),
            });
        }
        Ok(self.orders.remove(index))
    }

    /// Get an order by id.
    pub fn get_order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Whether `new` sorts strictly before `existing`.
fn goes_before(new: &Order, existing: &Order) -> bool {
    match existing.rate().cmp_value(&new.rate()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            if new.trade_direction != existing.trade_direction {
                return new.trade_direction == TradeDirection::Sell0;
            }
            match new.trade_direction {
                TradeDirection::Sell0 => new.id < existing.id,
                TradeDirection::Sell1 => new.id > existing.id,
            }
        }
    }
}
