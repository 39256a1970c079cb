use crate::error::Result;
use crate::event::info::{CancelInfo, Direction, FillInfo, OrderInfo};
use crate::event::Event;
use crate::exchange::order_book::OrderBook;
use crate::market::{slice_bar, SliceMode};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Per-symbol exchange state machine: tracks last/current price and the two
/// order books, and turns Bar/Price/Order/Cancel events into Fill events.
#[derive(Debug)]
pub struct ExchangeUnit {
    symbol: &'static str,
    last_price: Decimal,
    current_price: Decimal,
    last_timestamp: DateTime<Utc>,
    bid_book: OrderBook,
    ask_book: OrderBook,
    slice_mode: SliceMode,
}

impl ExchangeUnit {
    pub fn new(symbol: &'static str, last_timestamp: DateTime<Utc>, slice_mode: SliceMode) -> Self {
        Self {
            symbol,
            last_price: Decimal::ZERO,
            current_price: Decimal::ZERO,
            last_timestamp,
            bid_book: OrderBook::new(symbol, Direction::Buy),
            ask_book: OrderBook::new(symbol, Direction::Sell),
            slice_mode,
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.last_timestamp
    }

    fn advance_tick(&mut self, tick_offset_seconds: i64) -> DateTime<Utc> {
        self.last_timestamp += Duration::seconds(tick_offset_seconds);
        self.last_timestamp
    }

    /// Slices the bar into its four Price events; does not itself cross.
    pub fn on_bar(&mut self, bar: &crate::event::info::BarInfo) -> Vec<Event> {
        self.last_timestamp = bar.timestamp;
        slice_bar(bar, self.slice_mode).into_iter().map(Event::price).collect()
    }

    /// Updates last/current price then crosses the relevant book, emitting
    /// one Fill per matched order.
    pub fn on_price(
        &mut self,
        price: &crate::event::info::PriceInfo,
        tick_offset_seconds: i64,
    ) -> Result<Vec<Event>> {
        self.last_timestamp = price.timestamp;
        self.last_price = self.current_price;
        self.current_price = price.current_price;
        self.cross(tick_offset_seconds)
    }

    /// If `current_price == 0`, no matching takes place. A downward move
    /// matches the bid book; an upward move matches the ask book.
    fn cross(&mut self, tick_offset_seconds: i64) -> Result<Vec<Event>> {
        if self.current_price.is_zero() {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        if self.current_price < self.last_price {
            for order in self.bid_book.cross(self.current_price)? {
                events.push(self.order_to_fill(&order, tick_offset_seconds));
            }
        } else if self.current_price > self.last_price {
            for order in self.ask_book.cross(self.current_price)? {
                events.push(self.order_to_fill(&order, tick_offset_seconds));
            }
        }
        Ok(events)
    }

    fn order_to_fill(&mut self, order: &OrderInfo, tick_offset_seconds: i64) -> Event {
        let timestamp = self.advance_tick(tick_offset_seconds);
        Event::fill(FillInfo {
            id: order.id,
            symbol: order.symbol,
            timestamp,
            direction: order.direction,
            open_or_close: order.open_or_close,
            filled_price: order.price,
            volume: order.volume,
            partial: false,
        })
    }

    /// Immediately fills a marketable order; otherwise rests it in the
    /// matching book.
    pub fn on_order(&mut self, order: OrderInfo, tick_offset_seconds: i64) -> Result<Vec<Event>> {
        self.last_timestamp = order.timestamp;

        let marketable = !self.current_price.is_zero()
            && match order.direction {
                Direction::Buy => order.price >= self.current_price,
                Direction::Sell => order.price <= self.current_price,
            };

        if marketable {
            Ok(vec![self.order_to_fill(&order, tick_offset_seconds)])
        } else {
            match order.direction {
                Direction::Buy => self.bid_book.put(order)?,
                Direction::Sell => self.ask_book.put(order)?,
            }
            Ok(Vec::new())
        }
    }

    pub fn on_cancel(&mut self, cancel: &CancelInfo) -> Result<()> {
        self.last_timestamp = cancel.timestamp;
        match cancel.direction {
            Direction::Buy => self.bid_book.cancel(cancel.id),
            Direction::Sell => self.ask_book.cancel(cancel.id),
        }
    }

    pub fn cancel_all(&mut self) {
        self.bid_book.clear();
        self.ask_book.clear();
    }
}
