use crate::currency::{CashFlow, FxTable};
use crate::error::Result;
use crate::event::info::Direction;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Shared per-symbol state and fee/tax conversion math used by the exchange
/// unit, holding unit, and strategy unit alike. The source expresses this
/// as an abstract base class (`Subject`) that all three inherit from; here
/// it is a plain struct plus the conversion methods below, composed into
/// each unit rather than inherited.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capability {
    pub per_hand: u32,
    pub bid_commission: Decimal,
    pub bid_commission_rate: Decimal,
    pub ask_commission: Decimal,
    pub ask_commission_rate: Decimal,
    pub bid_tax: Decimal,
    pub bid_tax_rate: Decimal,
    pub ask_tax: Decimal,
    pub ask_tax_rate: Decimal,
    pub currency: &'static str,
}

impl Capability {
    pub fn from_config(config: &crate::config::Config, currency: &'static str) -> Self {
        Self {
            per_hand: config.per_hand,
            bid_commission: config.bid_commission,
            bid_commission_rate: config.bid_commission_rate,
            ask_commission: config.ask_commission,
            ask_commission_rate: config.ask_commission_rate,
            bid_tax: config.bid_tax,
            bid_tax_rate: config.bid_tax_rate,
            ask_tax: config.ask_tax,
            ask_tax_rate: config.ask_tax_rate,
            currency,
        }
    }

    /// Maximum whole-lot volume a reference-currency `amount` buys, or the
    /// minimum whole-lot volume that must be sold to net `amount`.
    pub fn amount_to_volume(&self, fx: &FxTable, amount: Decimal, price: Decimal, direction: Direction) -> Result<Decimal> {
        let local = fx.from_amount_of_ref(self.currency, amount)?;
        Ok(self.local_amount_to_volume(local, price, direction))
    }

    /// As [`Self::amount_to_volume`], but the budget is given as a
    /// [`CashFlow`] (converted into this unit's currency first if needed).
    pub fn cash_flow_to_volume(&self, fx: &FxTable, cash_flow: &CashFlow, price: Decimal, direction: Direction) -> Result<Decimal> {
        let local = if cash_flow.currency == self.currency {
            cash_flow.amount
        } else {
            fx.from_amount_of_ref(self.currency, cash_flow.to_reference(fx)?)?
        };
        Ok(self.local_amount_to_volume(local, price, direction))
    }

    fn local_amount_to_volume(&self, local_amount: Decimal, price: Decimal, direction: Direction) -> Decimal {
        let per_hand = Decimal::from(self.per_hand);
        match direction {
            Direction::Buy => {
                let net = ((local_amount - (self.bid_commission + self.bid_tax))
                    / (Decimal::ONE + self.bid_commission_rate + self.bid_tax_rate))
                    .max(Decimal::ZERO);
                trunc_lots(net / price, per_hand) * per_hand
            }
            Direction::Sell => {
                let net = (local_amount + (self.ask_commission + self.ask_tax))
                    / (Decimal::ONE - self.ask_commission_rate - self.ask_tax_rate);
                (trunc_lots(net / price, per_hand) + Decimal::ONE) * per_hand
            }
        }
    }

    /// Reference-currency notional of buying/selling `volume` at `price`.
    pub fn volume_to_amount(&self, fx: &FxTable, volume: Decimal, price: Decimal, direction: Direction) -> Result<Decimal> {
        let local = self.volume_to_local_amount(volume, price, direction);
        fx.amount_to_ref(self.currency, local.max(Decimal::ZERO))
    }

    /// As [`Self::volume_to_amount`], but returned as a [`CashFlow`] in this
    /// unit's own currency rather than converted to the reference currency.
    pub fn volume_to_cash_flow(&self, fx: &FxTable, volume: Decimal, price: Decimal, direction: Direction) -> Result<CashFlow> {
        let local = self.volume_to_local_amount(volume, price, direction).max(Decimal::ZERO);
        CashFlow::new(fx, self.currency, local)
    }

    fn volume_to_local_amount(&self, volume: Decimal, price: Decimal, direction: Direction) -> Decimal {
        let gross = volume * price;
        match direction {
            Direction::Buy => gross * (Decimal::ONE + self.bid_commission_rate + self.bid_tax_rate) + (self.bid_commission + self.bid_tax),
            Direction::Sell => gross / (Decimal::ONE - self.ask_commission_rate - self.ask_tax_rate) - (self.ask_commission + self.ask_tax),
        }
    }
}

/// Truncates `x` to a whole number of lots (matches the source's `int(...)`
/// truncation-toward-zero, not a rounding division).
fn trunc_lots(x: Decimal, per_hand: Decimal) -> Decimal {
    let lots = (x / per_hand).to_i64().unwrap_or(0);
    Decimal::from(lots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fx() -> FxTable {
        FxTable::new("CNY")
    }

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

    #[test]
    fn required_amount_scales_with_price_and_volume() {
        let cap = capability();
        let required = cap
            .volume_to_amount(&fx(), dec!(1000), dec!(10), Direction::Buy)
            .unwrap();
        assert_eq!(required, dec!(10000));
        assert!(required > dec!(1000));
    }

    #[test]
    fn buy_side_amount_to_volume_floors_to_whole_lots() {
        let cap = capability();
        let volume = cap
            .amount_to_volume(&fx(), dec!(1000), dec!(10), Direction::Buy)
            .unwrap();
        assert_eq!(volume, dec!(100));
    }

    #[test]
    fn zero_fees_round_trip_amount_and_volume() {
        let cap = capability();
        let amount = cap
            .volume_to_amount(&fx(), dec!(100), dec!(10), Direction::Buy)
            .unwrap();
        assert_eq!(amount, dec!(1000));
    }

    #[test]
    fn sell_side_includes_fees_and_taxes() {
        let mut cap = capability();
        cap.ask_tax_rate = dec!(0.001);
        let proceeds = cap
            .volume_to_amount(&fx(), dec!(100), dec!(10), Direction::Sell)
            .unwrap();
        assert!(proceeds < dec!(1000));
    }
}
