use crate::config::Config;
use crate::error::Result;
use crate::event::info::{BarInfo, CancelInfo, OrderInfo, PriceInfo};
use crate::event::Event;
use crate::exchange::unit::ExchangeUnit;
use crate::market::SliceMode;
use chrono::{DateTime, Datelike, Duration, Utc};
use std::collections::HashMap;

/// Maps symbol to exchange unit, lazily constructing units on first sight
/// and fanning Clear/End synchronization events out to every unit.
#[derive(Debug)]
pub struct ExchangeRouter {
    units: HashMap<&'static str, ExchangeUnit>,
    last_timestamp: DateTime<Utc>,
    slice_mode: SliceMode,
}

impl ExchangeRouter {
    pub fn new(config: &Config, slice_mode: SliceMode) -> Self {
        Self {
            units: HashMap::new(),
            last_timestamp: config.start_time,
            slice_mode,
        }
    }

    fn unit_mut(&mut self, symbol: &'static str, timestamp: DateTime<Utc>) -> &mut ExchangeUnit {
        self.units
            .entry(symbol)
            .or_insert_with(|| ExchangeUnit::new(symbol, timestamp, self.slice_mode))
    }

    /// If the calendar day changed since the last Bar, posts a Clear for the
    /// previous day (at `last_timestamp + 59 minutes`) ahead of the Bar's
    /// own Price events, then forwards the Bar to its (possibly newly
    /// registered) unit.
    ///
    /// Preserves the source's exact day-change test: it compares only the
    /// day-of-month component, not the full date, so e.g. the 1st of one
    /// month to the 1st of the next does not trigger a Clear. See DESIGN.md.
    pub fn on_bar(&mut self, bar: &BarInfo) -> Vec<Event> {
        let mut events = Vec::new();

        if self.last_timestamp.day() != bar.timestamp.day() {
            self.last_timestamp += Duration::minutes(59);
            events.push(Event::clear_at(self.last_timestamp));
        }
        self.last_timestamp = bar.timestamp;

        events.extend(self.unit_mut(bar.symbol, bar.timestamp).on_bar(bar));
        events
    }

    pub fn on_price(&mut self, price: &PriceInfo, tick_offset_seconds: i64) -> Result<Vec<Event>> {
        self.last_timestamp = price.timestamp;
        self.unit_mut(price.symbol, price.timestamp).on_price(price, tick_offset_seconds)
    }

    pub fn on_order(&mut self, order: OrderInfo, tick_offset_seconds: i64) -> Result<Vec<Event>> {
        self.last_timestamp = order.timestamp;
        self.unit_mut(order.symbol, order.timestamp).on_order(order, tick_offset_seconds)
    }

    pub fn on_cancel(&mut self, cancel: &CancelInfo) -> Result<()> {
        self.last_timestamp = cancel.timestamp;
        if let Some(unit) = self.units.get_mut(cancel.symbol) {
            unit.on_cancel(cancel)?;
        }
        Ok(())
    }

    /// Clear events fan out to every registered unit (each unit is a no-op
    /// on Clear, so this is a pass-through today, but is kept to mirror the
    /// source's broadcast and allow future per-unit Clear behavior).
    pub fn on_clear(&mut self) {}

    /// Posts a final Clear at `last_timestamp + 60 minutes`.
    pub fn on_end(&mut self) -> Event {
        self.last_timestamp += Duration::minutes(60);
        Event::clear_at(self.last_timestamp)
    }

    pub fn cancel_all(&mut self) {
        for unit in self.units.values_mut() {
            unit.cancel_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn bar(symbol: &'static str, timestamp: DateTime<Utc>) -> BarInfo {
        BarInfo {
            symbol,
            timestamp,
            open: dec!(5.00),
            high: dec!(5.20),
            low: dec!(4.90),
            close: dec!(5.10),
            volume: dec!(0),
            turnover: dec!(0),
        }
    }

    #[test]
    fn lazily_registers_unit_on_first_bar() {
        let config = Config::default();
        let mut router = ExchangeRouter::new(&config, SliceMode::Minute);
        let t0 = Utc.with_ymd_and_hms(2021, 1, 1, 9, 0, 0).unwrap();
        let events = router.on_bar(&bar("X", t0));
        assert_eq!(events.len(), 4);
        assert!(router.units.contains_key("X"));
    }

    #[test]
    fn posts_clear_before_bar_on_day_change() {
        let config = Config::default();
        let mut router = ExchangeRouter::new(&config, SliceMode::Minute);
        let day1 = Utc.with_ymd_and_hms(2021, 1, 1, 9, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2021, 1, 2, 9, 0, 0).unwrap();

        router.on_bar(&bar("X", day1));
        let events = router.on_bar(&bar("X", day2));

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].kind, crate::event::EventKind::Clear);
        assert_eq!(events[0].timestamp, day1 + Duration::minutes(59));
    }

    #[test]
    fn on_end_posts_final_clear_sixty_minutes_later() {
        let config = Config::default();
        let mut router = ExchangeRouter::new(&config, SliceMode::Minute);
        let t0 = Utc.with_ymd_and_hms(2021, 1, 1, 9, 0, 0).unwrap();
        router.on_bar(&bar("X", t0));
        let end_clear = router.on_end();
        assert_eq!(end_clear.timestamp, t0 + Duration::minutes(60));
    }
}
