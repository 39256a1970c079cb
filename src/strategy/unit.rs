use crate::config::Config;
use crate::event::info::{Direction, FillInfo, OpenClose, PriceInfo, SignalInfo, SignalType};
use crate::event::Event;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use uuid::Uuid;

/// Snapshot of a [`MaStrategyUnit`], the row shape of the strategy log:
/// `crt_price,short_ma,long_ma,crt_direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaStrategyInfo {
    pub crt_price: Decimal,
    pub short_ma: Decimal,
    pub long_ma: Decimal,
    pub crt_direction: i64,
}

/// Dual simple-moving-average crossover strategy, one instance per symbol.
///
/// Maintains a circular buffer of the last `long` prices so both averages
/// update in O(1) per tick without re-summing. Only activates once the
/// buffer has wrapped once (`long` prices observed); before that, `on_price`
/// updates the averages but never signals.
#[derive(Clone, Debug)]
pub struct MaStrategyUnit {
    symbol: &'static str,
    last_timestamp: DateTime<Utc>,
    short: usize,
    long: usize,
    volume: Decimal,
    prices: Vec<Decimal>,
    idx: usize,
    short_sum: Decimal,
    long_sum: Decimal,
    is_active: bool,
    crt_price: Decimal,
    last_direction: i64,
}

impl MaStrategyUnit {
    pub fn new(symbol: &'static str, last_timestamp: DateTime<Utc>, short: usize, long: usize, volume: Decimal) -> Self {
        Self {
            symbol,
            last_timestamp,
            short,
            long,
            volume,
            prices: vec![Decimal::ZERO; long],
            idx: 0,
            short_sum: Decimal::ZERO,
            long_sum: Decimal::ZERO,
            is_active: false,
            crt_price: Decimal::ZERO,
            last_direction: 0,
        }
    }

    pub fn from_fill(fill: &FillInfo, config: &Config) -> Self {
        Self::new(fill.symbol, fill.timestamp, config.short_window, config.long_window, config.volume)
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Slides the circular buffer by one price, maintaining both running
    /// sums incrementally. Activation flips once the buffer has wrapped.
    fn update_price(&mut self, price: Decimal) {
        let short_idx = (self.idx + self.long - self.short) % self.long;
        let last_long = self.prices[self.idx];
        let last_short = self.prices[short_idx];
        self.prices[self.idx] = price;
        self.long_sum = self.long_sum - last_long + price;
        self.short_sum = self.short_sum - last_short + price;
        self.idx = (self.idx + 1) % self.long;

        if self.idx == 0 {
            self.is_active = true;
        }
    }

    pub fn info(&self) -> MaStrategyInfo {
        MaStrategyInfo {
            crt_price: self.crt_price,
            short_ma: (self.short_sum / Decimal::from(self.short)).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
            long_ma: (self.long_sum / Decimal::from(self.long)).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
            crt_direction: self.last_direction,
        }
    }

    pub fn on_bar(&mut self) -> Vec<Event> {
        Vec::new()
    }

    /// Half-sized signal on first activation, full-sized signal on every
    /// later crossover; no signal in between or before activation.
    pub fn on_price(&mut self, price: &PriceInfo) -> Vec<Event> {
        self.crt_price = price.current_price;
        self.update_price(price.current_price);
        self.last_timestamp = price.timestamp;

        if !self.is_active {
            return Vec::new();
        }

        let short_ma = self.short_sum / Decimal::from(self.short);
        let long_ma = self.long_sum / Decimal::from(self.long);
        let direction = if short_ma >= long_ma { 1 } else { -1 };

        let events = if self.last_direction == 0 {
            vec![self.signal(direction, self.volume / Decimal::from(2))]
        } else if self.last_direction * direction < 0 {
            vec![self.signal(direction, self.volume)]
        } else {
            Vec::new()
        };

        self.last_direction = direction;
        events
    }

    fn signal(&self, direction: i64, volume: Decimal) -> Event {
        let (direction, open_or_close) = if direction >= 0 {
            (Direction::Buy, OpenClose::Open)
        } else {
            (Direction::Sell, OpenClose::Close)
        };

        Event::signal(SignalInfo {
            symbol: self.symbol,
            timestamp: self.last_timestamp,
            direction,
            open_or_close,
            price: self.crt_price,
            volume,
            amount: Decimal::ZERO,
            currency: "CNY",
            signal_type: SignalType::Fow,
            id: Uuid::new_v4(),
        })
    }

    pub fn on_fill(&mut self) -> Vec<Event> {
        Vec::new()
    }

    pub fn on_clear(&mut self) -> Vec<Event> {
        Vec::new()
    }

    pub fn on_end(&mut self) -> Vec<Event> {
        Vec::new()
    }
}
