use crate::collections::PriorityQueue;
use crate::error::Result;
use crate::event::info::{Direction, SignalInfo};
use uuid::Uuid;

/// Priority queue of pending buy signals a portfolio could not fully fund
/// immediately, ordered by [`SignalType`](crate::event::info::SignalType)
/// priority then by smaller budget first.
#[derive(Debug, Default)]
pub struct BuySignalQueue {
    queue: PriorityQueue<SignalInfo>,
}

impl BuySignalQueue {
    pub fn new() -> Self {
        Self { queue: PriorityQueue::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn peek(&self) -> Result<&SignalInfo> {
        self.queue.peek()
    }

    pub fn peek_mut(&mut self) -> Result<&mut SignalInfo> {
        self.queue.peek_mut()
    }

    pub fn pop(&mut self) -> Result<SignalInfo> {
        self.queue.pop()
    }

    /// Accepts the signal only if it is a buy; sells are silently dropped.
    pub fn put(&mut self, signal: SignalInfo) -> Result<()> {
        if signal.direction == Direction::Buy {
            self.queue.put(signal)?;
        }
        Ok(())
    }

    pub fn cancel(&mut self, id: Uuid) -> Result<()> {
        self.queue.remove_all(|signal| signal.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::info::{OpenClose, SignalType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn signal(direction: Direction, signal_type: SignalType, amount: rust_decimal::Decimal, id: Uuid) -> SignalInfo {
        SignalInfo {
            symbol: "X",
            timestamp: Utc::now(),
            direction,
            open_or_close: OpenClose::Open,
            price: dec!(5),
            volume: dec!(100),
            amount,
            currency: "CNY",
            signal_type,
            id,
        }
    }

    #[test]
    fn sell_signals_are_silently_dropped() {
        let mut queue = BuySignalQueue::new();
        queue.put(signal(Direction::Sell, SignalType::Tbf, dec!(500), Uuid::new_v4())).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn pops_in_priority_then_smaller_amount_order() {
        let mut queue = BuySignalQueue::new();
        queue.put(signal(Direction::Buy, SignalType::Tbf, dec!(500), Uuid::new_v4())).unwrap();
        queue.put(signal(Direction::Buy, SignalType::Fok, dec!(100), Uuid::new_v4())).unwrap();
        assert_eq!(queue.pop().unwrap().signal_type, SignalType::Tbf);
        assert_eq!(queue.pop().unwrap().signal_type, SignalType::Fok);
    }

    #[test]
    fn cancel_removes_by_id() {
        let mut queue = BuySignalQueue::new();
        let id = Uuid::new_v4();
        queue.put(signal(Direction::Buy, SignalType::Tbf, dec!(500), id)).unwrap();
        queue.put(signal(Direction::Buy, SignalType::Tbf, dec!(200), Uuid::new_v4())).unwrap();
        queue.cancel(id).unwrap();
        assert_eq!(queue.pop().unwrap().amount, dec!(200));
        assert!(queue.is_empty());
    }

    #[test]
    fn peek_mut_allows_shrinking_top_in_place() {
        let mut queue = BuySignalQueue::new();
        queue.put(signal(Direction::Buy, SignalType::Tbf, dec!(500), Uuid::new_v4())).unwrap();
        queue.peek_mut().unwrap().volume = dec!(40);
        assert_eq!(queue.peek().unwrap().volume, dec!(40));
    }
}
