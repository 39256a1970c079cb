use crate::collections::PriorityQueue;
use crate::error::Result;
use crate::event::info::{Direction, OrderInfo};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single side (bid or ask) of one symbol's order book: a price-priority
/// priority queue of live orders.
#[derive(Debug)]
pub struct OrderBook {
    symbol: &'static str,
    direction: Direction,
    orders: PriorityQueue<OrderInfo>,
}

impl OrderBook {
    pub fn new(symbol: &'static str, direction: Direction) -> Self {
        Self { symbol, direction, orders: PriorityQueue::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Accepts `order` only if it belongs to this book's symbol and
    /// direction; mismatched orders are silently rejected.
    pub fn put(&mut self, order: OrderInfo) -> Result<()> {
        if order.symbol != self.symbol || order.direction != self.direction {
            return Ok(());
        }
        self.orders.put(order)
    }

    /// Removes every resting order with the given id.
    pub fn cancel(&mut self, id: Uuid) -> Result<()> {
        self.orders.remove_all(|order| order.id == id)
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }

    /// Repeatedly pops the top of book while it is marketable against
    /// `reference_price`: for a bid book, while `top.price >=
    /// reference_price`; for an ask book, while `top.price <=
    /// reference_price`.
    pub fn cross(&mut self, reference_price: Decimal) -> Result<Vec<OrderInfo>> {
        let mut filled = Vec::new();
        loop {
            let marketable = match self.orders.peek() {
                Ok(top) => match self.direction {
                    Direction::Buy => top.price >= reference_price,
                    Direction::Sell => top.price <= reference_price,
                },
                Err(_) => false,
            };

            if !marketable {
                break;
            }
            filled.push(self.orders.pop()?);
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::info::{OpenClose, OrderType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(price: Decimal, direction: Direction) -> OrderInfo {
        OrderInfo {
            symbol: "X",
            timestamp: Utc::now(),
            direction,
            open_or_close: OpenClose::Open,
            price,
            volume: dec!(100),
            id: Uuid::new_v4(),
            order_type: OrderType::Tbf,
        }
    }

    #[test]
    fn rejects_order_of_wrong_symbol_or_direction() {
        let mut book = OrderBook::new("X", Direction::Buy);
        let mut wrong_symbol = order(dec!(5), Direction::Buy);
        wrong_symbol.symbol = "Y";
        book.put(wrong_symbol).unwrap();
        book.put(order(dec!(5), Direction::Sell)).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn bid_book_top_has_maximum_price() {
        let mut book = OrderBook::new("X", Direction::Buy);
        for price in [dec!(5.0), dec!(5.2), dec!(4.8)] {
            book.put(order(price, Direction::Buy)).unwrap();
        }
        assert_eq!(book.cross(dec!(5.2)).unwrap().len(), 1);
    }

    #[test]
    fn ask_book_top_has_minimum_price() {
        let mut book = OrderBook::new("X", Direction::Sell);
        for price in [dec!(5.0), dec!(4.8), dec!(5.2)] {
            book.put(order(price, Direction::Sell)).unwrap();
        }
        assert_eq!(book.cross(dec!(4.8)).unwrap().len(), 1);
    }

    #[test]
    fn cross_drains_every_marketable_order_in_price_order() {
        let mut book = OrderBook::new("X", Direction::Buy);
        for price in [dec!(5.0), dec!(5.2), dec!(4.8), dec!(5.1)] {
            book.put(order(price, Direction::Buy)).unwrap();
        }
        let filled = book.cross(dec!(5.0)).unwrap();
        let prices: Vec<_> = filled.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![dec!(5.2), dec!(5.1), dec!(5.0)]);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn cancel_removes_matching_id() {
        let mut book = OrderBook::new("X", Direction::Buy);
        let target = order(dec!(5), Direction::Buy);
        book.put(target).unwrap();
        book.put(order(dec!(4.9), Direction::Buy)).unwrap();
        book.cancel(target.id).unwrap();
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn clear_empties_book_and_is_idempotent() {
        let mut book = OrderBook::new("X", Direction::Buy);
        book.put(order(dec!(5), Direction::Buy)).unwrap();
        book.clear();
        book.clear();
        assert!(book.is_empty());
    }
}
