use crate::collections::PriorityOrd;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Trade direction: buy (+1) or sell (−1).
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Direction {
    #[display("买入")]
    Buy,
    #[display("卖出")]
    Sell,
}

impl Direction {
    pub fn sign(self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }
}

/// Open/close flag carried alongside a direction: opening (+1) or closing (−1).
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum OpenClose {
    #[display("开仓")]
    Open,
    #[display("平仓")]
    Close,
}

/// A signal's liveness policy, ordered by priority (higher wins): `FOK <
/// IOC < FOW < TBF`.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum SignalType {
    #[display("FOK")]
    Fok,
    #[display("IOC")]
    Ioc,
    #[display("FOW")]
    Fow,
    #[display("TBF")]
    Tbf,
}

impl SignalType {
    fn priority(self) -> u8 {
        match self {
            SignalType::Fok => 10,
            SignalType::Ioc => 20,
            SignalType::Fow => 30,
            SignalType::Tbf => 40,
        }
    }

    /// The order type a portfolio emits in response to a signal of this
    /// type: `FOK->FOK, IOC->IOC, FOW->TBF, TBF->TBF`.
    pub fn to_order_type(self) -> OrderType {
        match self {
            SignalType::Fok => OrderType::Fok,
            SignalType::Ioc => OrderType::Ioc,
            SignalType::Fow => OrderType::Tbf,
            SignalType::Tbf => OrderType::Tbf,
        }
    }
}

/// An order's liveness policy at the exchange.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum OrderType {
    #[display("FOK")]
    Fok,
    #[display("IOC")]
    Ioc,
    #[display("TBF")]
    Tbf,
    #[display("GFD")]
    Gfd,
}

/// A symbol's OHLCV record over an interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarInfo {
    pub symbol: &'static str,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub turnover: Decimal,
}

/// A point-in-time quote synthesized from a bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceInfo {
    pub symbol: &'static str,
    pub timestamp: DateTime<Utc>,
    pub current_price: Decimal,
    pub last_price: Decimal,
    pub volume: Decimal,
}

/// A strategy's trade intention, annotated with a liveness policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalInfo {
    pub symbol: &'static str,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub open_or_close: OpenClose,
    pub price: Decimal,
    pub volume: Decimal,
    pub amount: Decimal,
    pub currency: &'static str,
    pub signal_type: SignalType,
    pub id: Uuid,
}

impl PriorityOrd for SignalInfo {
    fn better_than(&self, other: &Self) -> Result<bool> {
        let (sp, op) = (self.signal_type.priority(), other.signal_type.priority());
        Ok(sp > op || (sp == op && self.amount < other.amount))
    }
}

/// A portfolio's concrete trade instruction sent to the exchange.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderInfo {
    pub symbol: &'static str,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub open_or_close: OpenClose,
    pub price: Decimal,
    pub volume: Decimal,
    pub id: Uuid,
    pub order_type: OrderType,
}

impl PriorityOrd for OrderInfo {
    /// Price-priority, timestamp tie-break. Comparing orders of opposite
    /// direction is undefined (the source raises); this never happens in
    /// practice because a single order book only ever holds one direction.
    fn better_than(&self, other: &Self) -> Result<bool> {
        if self.direction != other.direction {
            return Err(Error::DirectionMismatch(self.direction, other.direction));
        }

        Ok(match self.direction {
            Direction::Buy => {
                self.price > other.price || (self.price == other.price && self.timestamp < other.timestamp)
            }
            Direction::Sell => {
                self.price < other.price || (self.price == other.price && self.timestamp < other.timestamp)
            }
        })
    }
}

/// An exchange's report that a resting or routed order was cancelled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CancelInfo {
    pub id: Uuid,
    pub symbol: &'static str,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
}

/// An exchange's report that an order was partially or fully executed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillInfo {
    pub id: Uuid,
    pub symbol: &'static str,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub open_or_close: OpenClose,
    pub filled_price: Decimal,
    pub volume: Decimal,
    pub partial: bool,
}
