use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Read-only-after-construction simulation configuration, the systems
/// equivalent of the source's keyed global constants store.
///
/// Unlike the source's dynamically-keyed `CONST` singleton, every field
/// here is a named, typed member: there is no runtime key lookup that can
/// fail. [`Config::get_path`] is kept to model the source's `UndefinedConstant`
/// failure mode for the one genuinely dynamic lookup (output record paths).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub reference_currency: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub default_queue_size: usize,
    pub tick_offset_seconds: i64,
    pub per_hand: u32,
    pub per_price: Decimal,
    pub bid_commission: Decimal,
    pub bid_commission_rate: Decimal,
    pub ask_commission: Decimal,
    pub ask_commission_rate: Decimal,
    pub bid_tax: Decimal,
    pub bid_tax_rate: Decimal,
    pub ask_tax: Decimal,
    pub ask_tax_rate: Decimal,
    pub crt_price: Decimal,
    pub net_price: Decimal,
    pub book_value: Decimal,
    pub volume: Decimal,
    pub multiplier: i64,
    pub margin_rate: Decimal,
    pub short_window: usize,
    pub long_window: usize,
    record_paths: RecordPaths,
}

/// Output record destinations, one per logger unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordPaths {
    pub queue: Option<String>,
    pub default: Option<String>,
    pub bar: Option<String>,
    pub price: Option<String>,
    pub signal: Option<String>,
    pub order: Option<String>,
    pub cancel: Option<String>,
    pub fill: Option<String>,
    pub portfolio: Option<String>,
    pub strategy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_currency: "CNY".to_string(),
            start_time: DateTime::from_naive_utc_and_offset(
                NaiveDate::from_ymd_opt(1900, 1, 1)
                    .expect("valid date")
                    .and_hms_opt(0, 0, 0)
                    .expect("valid time"),
                Utc,
            ),
            end_time: DateTime::from_naive_utc_and_offset(
                NaiveDate::from_ymd_opt(2099, 12, 31)
                    .expect("valid date")
                    .and_hms_opt(23, 59, 59)
                    .expect("valid time"),
                Utc,
            ),
            default_queue_size: 16,
            tick_offset_seconds: 1,
            per_hand: 100,
            per_price: dec!(0.01),
            bid_commission: dec!(0),
            bid_commission_rate: dec!(0.00015),
            ask_commission: dec!(0),
            ask_commission_rate: dec!(0.00015),
            bid_tax: dec!(0),
            bid_tax_rate: dec!(0),
            ask_tax: dec!(0),
            ask_tax_rate: dec!(0.001),
            crt_price: dec!(0),
            net_price: dec!(0),
            book_value: dec!(1),
            volume: dec!(0),
            multiplier: 1,
            margin_rate: dec!(1),
            short_window: 5,
            long_window: 20,
            record_paths: RecordPaths::default(),
        }
    }
}

impl Config {
    /// Returns a [`ConfigBuilder`] pre-populated with the source's documented
    /// defaults, ready to have individual fields overridden.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder(Config::default())
    }

    /// Looks up a configured output record path by name, failing with
    /// [`Error::UndefinedConstant`] if the caller never set one.
    pub fn get_path(&self, name: &str) -> Result<&str> {
        let path = match name {
            "queue" => &self.record_paths.queue,
            "default" => &self.record_paths.default,
            "bar" => &self.record_paths.bar,
            "price" => &self.record_paths.price,
            "signal" => &self.record_paths.signal,
            "order" => &self.record_paths.order,
            "cancel" => &self.record_paths.cancel,
            "fill" => &self.record_paths.fill,
            "portfolio" => &self.record_paths.portfolio,
            "strategy" => &self.record_paths.strategy,
            _ => return Err(Error::UndefinedConstant(name.to_string())),
        };

        path.as_deref()
            .ok_or_else(|| Error::UndefinedConstant(name.to_string()))
    }
}

/// Fluent builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder(Config);

impl ConfigBuilder {
    pub fn reference_currency(mut self, currency: impl Into<String>) -> Self {
        self.0.reference_currency = currency.into();
        self
    }

    pub fn tick_offset_seconds(mut self, seconds: i64) -> Self {
        self.0.tick_offset_seconds = seconds;
        self
    }

    pub fn per_hand(mut self, per_hand: u32) -> Self {
        self.0.per_hand = per_hand;
        self
    }

    pub fn record_paths(mut self, record_paths: RecordPaths) -> Self {
        self.0.record_paths = record_paths;
        self
    }

    pub fn moving_average_windows(mut self, short: usize, long: usize) -> Self {
        self.0.short_window = short;
        self.0.long_window = long;
        self
    }

    pub fn build(self) -> Config {
        self.0
    }
}
