/// Typed information payloads (`BarInfo`, `PriceInfo`, `SignalInfo`, ...)
/// carried by an [`Event`] envelope.
pub mod info;

use crate::collections::PriorityOrd;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use info::{BarInfo, CancelInfo, FillInfo, OrderInfo, PriceInfo, SignalInfo};

/// The kind of an [`Event`], also used as the key into the dispatcher's
/// `kind -> handlers` map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Default,
    Bar,
    Price,
    Cancel,
    Fill,
    Order,
    Signal,
    Clear,
    End,
}

impl EventKind {
    /// Higher wins; `Default` is the floor, `End` the ceiling.
    fn priority(self) -> i8 {
        match self {
            EventKind::Default => -1,
            EventKind::Bar => 10,
            EventKind::Price => 20,
            EventKind::Cancel => 30,
            EventKind::Fill => 40,
            EventKind::Order => 50,
            EventKind::Signal => 60,
            EventKind::Clear => 70,
            EventKind::End => 80,
        }
    }

    /// Whether events of this kind never carry a payload.
    fn is_payload_less(self) -> bool {
        matches!(self, EventKind::Default | EventKind::Clear | EventKind::End)
    }
}

/// Sum type of every payload an [`Event`] may carry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    None,
    Bar(BarInfo),
    Price(PriceInfo),
    Signal(SignalInfo),
    Order(OrderInfo),
    Cancel(CancelInfo),
    Fill(FillInfo),
}

impl Payload {
    fn kind(&self) -> EventKind {
        match self {
            Payload::None => EventKind::Default,
            Payload::Bar(_) => EventKind::Bar,
            Payload::Price(_) => EventKind::Price,
            Payload::Signal(_) => EventKind::Signal,
            Payload::Order(_) => EventKind::Order,
            Payload::Cancel(_) => EventKind::Cancel,
            Payload::Fill(_) => EventKind::Fill,
        }
    }
}

/// An event posted to the shared queue: a kind, a timestamp, and a
/// kind-matched payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: Payload,
}

impl Event {
    /// Constructs an event, failing with [`Error::EventKindMismatch`] unless
    /// `kind` is payload-less or matches `payload`'s own kind.
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>, payload: Payload) -> Result<Self> {
        if !kind.is_payload_less() && payload.kind() != kind {
            return Err(Error::EventKindMismatch {
                envelope_kind: kind,
                payload_kind: payload.kind(),
            });
        }

        Ok(Self { kind, timestamp, payload })
    }

    pub fn default_at(timestamp: DateTime<Utc>) -> Self {
        Self { kind: EventKind::Default, timestamp, payload: Payload::None }
    }

    pub fn clear_at(timestamp: DateTime<Utc>) -> Self {
        Self { kind: EventKind::Clear, timestamp, payload: Payload::None }
    }

    pub fn end_at(timestamp: DateTime<Utc>) -> Self {
        Self { kind: EventKind::End, timestamp, payload: Payload::None }
    }

    pub fn bar(info: BarInfo) -> Self {
        Self { kind: EventKind::Bar, timestamp: info.timestamp, payload: Payload::Bar(info) }
    }

    pub fn price(info: PriceInfo) -> Self {
        Self { kind: EventKind::Price, timestamp: info.timestamp, payload: Payload::Price(info) }
    }

    pub fn signal(info: SignalInfo) -> Self {
        Self { kind: EventKind::Signal, timestamp: info.timestamp, payload: Payload::Signal(info) }
    }

    pub fn order(info: OrderInfo) -> Self {
        Self { kind: EventKind::Order, timestamp: info.timestamp, payload: Payload::Order(info) }
    }

    pub fn cancel(info: CancelInfo) -> Self {
        Self { kind: EventKind::Cancel, timestamp: info.timestamp, payload: Payload::Cancel(info) }
    }

    pub fn fill(info: FillInfo) -> Self {
        Self { kind: EventKind::Fill, timestamp: info.timestamp, payload: Payload::Fill(info) }
    }
}

impl PriorityOrd for Event {
    /// `a > b` iff `priority(a) > priority(b)` OR (equal and `a.timestamp <
    /// b.timestamp`): higher-priority kinds preempt lower ones, and within a
    /// kind, older events fire first.
    fn better_than(&self, other: &Self) -> Result<bool> {
        let (sp, op) = (self.kind.priority(), other.kind.priority());
        Ok(sp > op || (sp == op && self.timestamp < other.timestamp))
    }
}
