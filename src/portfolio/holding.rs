use crate::currency::FxTable;
use crate::error::Result;
use crate::event::info::{Direction, FillInfo, PriceInfo};
use crate::portfolio::capability::Capability;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Per-symbol position: signed volume, average open price, and the
/// reference-currency valuations derived from them.
#[derive(Clone, Copy, Debug)]
pub struct HoldingUnit {
    pub symbol: &'static str,
    pub last_timestamp: DateTime<Utc>,
    pub capability: Capability,
    pub current_price: Decimal,
    pub open_price: Decimal,
    pub net_price: Decimal,
    pub book_value: Decimal,
    pub volume: Decimal,
    pub multiplier: i64,
    pub margin_rate: Decimal,
    pub current_value: Decimal,
    pub net_value: Decimal,
    pub book_value_ref: Decimal,
}

impl HoldingUnit {
    pub fn new(symbol: &'static str, last_timestamp: DateTime<Utc>, capability: Capability, config: &crate::config::Config, fx: &FxTable) -> Result<Self> {
        let mut unit = Self {
            symbol,
            last_timestamp,
            capability,
            current_price: config.crt_price,
            open_price: config.crt_price,
            net_price: config.net_price,
            book_value: config.book_value,
            volume: config.volume,
            multiplier: config.multiplier,
            margin_rate: config.margin_rate,
            current_value: Decimal::ZERO,
            net_value: Decimal::ZERO,
            book_value_ref: Decimal::ZERO,
        };
        unit.refresh(fx)?;
        Ok(unit)
    }

    /// Builds a unit straight from the opening fill, the source's
    /// simplified constructor path for lazily-registered holdings.
    pub fn from_fill(fill: &FillInfo, capability: Capability, config: &crate::config::Config, fx: &FxTable) -> Result<Self> {
        let mut unit = Self {
            symbol: fill.symbol,
            last_timestamp: fill.timestamp,
            capability,
            current_price: fill.filled_price,
            open_price: fill.filled_price,
            net_price: config.net_price,
            book_value: config.book_value,
            volume: fill.volume,
            multiplier: config.multiplier,
            margin_rate: config.margin_rate,
            current_value: Decimal::ZERO,
            net_value: Decimal::ZERO,
            book_value_ref: Decimal::ZERO,
        };
        unit.refresh(fx)?;
        Ok(unit)
    }

    fn refresh(&mut self, fx: &FxTable) -> Result<()> {
        let multiplier = Decimal::from(self.multiplier);
        self.current_value = fx.amount_to_ref(self.capability.currency, self.current_price * self.volume * multiplier)?;
        self.net_value = fx.amount_to_ref(self.capability.currency, self.net_price * self.volume * multiplier)?;
        self.book_value_ref = fx.amount_to_ref(self.capability.currency, self.book_value * self.volume * multiplier)?;
        Ok(())
    }

    pub fn on_price(&mut self, price: &PriceInfo, fx: &FxTable) -> Result<()> {
        self.last_timestamp = price.timestamp;
        self.current_price = price.current_price;
        self.refresh(fx)
    }

    /// VWAP-style average open price update, signed by fill direction;
    /// a fill that flattens the position resets the open price to zero.
    pub fn on_fill(&mut self, fill: &FillInfo, fx: &FxTable) -> Result<()> {
        self.last_timestamp = fill.timestamp;
        self.current_price = fill.filled_price;

        let signed_volume = fill.volume * Decimal::from(fill.direction.sign());
        let new_volume = self.volume + signed_volume;

        self.open_price = if new_volume.is_zero() {
            Decimal::ZERO
        } else {
            (self.open_price * self.volume + fill.filled_price * signed_volume) / new_volume
        };
        self.volume = new_volume;

        self.refresh(fx)
    }

    pub fn volume_to_amount(&self, fx: &FxTable, volume: Decimal, price: Decimal, direction: Direction) -> Result<Decimal> {
        self.capability.volume_to_amount(fx, volume, price, direction)
    }

    pub fn amount_to_volume(&self, fx: &FxTable, amount: Decimal, price: Decimal, direction: Direction) -> Result<Decimal> {
        self.capability.amount_to_volume(fx, amount, price, direction)
    }

    pub fn volume_to_cash_flow(&self, fx: &FxTable, volume: Decimal, price: Decimal, direction: Direction) -> Result<crate::currency::CashFlow> {
        self.capability.volume_to_cash_flow(fx, volume, price, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::event::info::OpenClose;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn capability() -> Capability {
        Capability {
            per_hand: 100,
            bid_commission: Decimal::ZERO,
            bid_commission_rate: Decimal::ZERO,
            ask_commission: Decimal::ZERO,
            ask_commission_rate: Decimal::ZERO,
            bid_tax: Decimal::ZERO,
            bid_tax_rate: Decimal::ZERO,
            ask_tax: Decimal::ZERO,
            ask_tax_rate: Decimal::ZERO,
            currency: "CNY",
        }
    }

    fn fill(direction: Direction, volume: Decimal, price: Decimal) -> FillInfo {
        FillInfo {
            id: uuid::Uuid::new_v4(),
            symbol: "X",
            timestamp: Utc::now(),
            direction,
            open_or_close: OpenClose::Open,
            filled_price: price,
            volume,
            partial: false,
        }
    }

    #[test]
    fn opening_fill_sets_open_price_to_fill_price() {
        let fx = FxTable::new("CNY");
        let config = Config::default();
        let unit = HoldingUnit::from_fill(&fill(Direction::Buy, dec!(100), dec!(5.0)), capability(), &config, &fx).unwrap();
        assert_eq!(unit.volume, dec!(100));
        assert_eq!(unit.open_price, dec!(5.0));
        assert_eq!(unit.current_value, dec!(500));
    }

    #[test]
    fn flattening_fill_resets_open_price_to_zero() {
        let fx = FxTable::new("CNY");
        let config = Config::default();
        let mut unit = HoldingUnit::from_fill(&fill(Direction::Buy, dec!(100), dec!(5.0)), capability(), &config, &fx).unwrap();
        unit.on_fill(&fill(Direction::Sell, dec!(100), dec!(5.5)), &fx).unwrap();
        assert_eq!(unit.volume, Decimal::ZERO);
        assert_eq!(unit.open_price, Decimal::ZERO);
    }

    #[test]
    fn partial_add_averages_open_price_by_volume() {
        let fx = FxTable::new("CNY");
        let config = Config::default();
        let mut unit = HoldingUnit::from_fill(&fill(Direction::Buy, dec!(100), dec!(5.0)), capability(), &config, &fx).unwrap();
        unit.on_fill(&fill(Direction::Buy, dec!(100), dec!(6.0)), &fx).unwrap();
        assert_eq!(unit.volume, dec!(200));
        assert_eq!(unit.open_price, dec!(5.5));
    }

    #[test]
    fn on_price_refreshes_current_value() {
        let fx = FxTable::new("CNY");
        let config = Config::default();
        let mut unit = HoldingUnit::from_fill(&fill(Direction::Buy, dec!(100), dec!(5.0)), capability(), &config, &fx).unwrap();
        unit.on_price(&PriceInfo { symbol: "X", timestamp: Utc::now(), current_price: dec!(6.0), last_price: dec!(5.0), volume: dec!(0) }, &fx).unwrap();
        assert_eq!(unit.current_value, dec!(600));
    }
}
