use crate::currency::{CashFlow, FxTable};
use crate::error::Result;
use crate::event::info::{Direction, FillInfo};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Cash management for one portfolio. All cash is held in the table's
/// reference currency; inflows are sold into it at the live rate, outflows
/// are bought at the live rate.
#[derive(Clone, Debug, Default)]
pub struct Wallet {
    cash_available: Decimal,
    cash_frozen: HashMap<(Uuid, &'static str), Decimal>,
}

impl Wallet {
    pub fn new() -> Self {
        Self { cash_available: Decimal::ZERO, cash_frozen: HashMap::new() }
    }

    /// Available cash plus every frozen amount, in reference currency.
    pub fn total(&self) -> Decimal {
        self.cash_available + self.cash_frozen.values().sum::<Decimal>()
    }

    pub fn available(&self) -> Decimal {
        self.cash_available
    }

    pub fn has_available(&self, fx: &FxTable, currency: &str, amount: Decimal) -> Result<bool> {
        Ok(fx.amount_to_ref(currency, amount)? <= self.cash_available)
    }

    /// Sells `cash_flow` into the reference currency and adds it to available cash.
    pub fn input(&mut self, fx: &FxTable, cash_flow: &CashFlow) -> Result<()> {
        self.cash_available += cash_flow.to_reference(fx)?;
        Ok(())
    }

    /// Buys `amount` of `currency` out of available cash, if enough is on
    /// hand; otherwise returns `Ok(None)` without changing any balance.
    pub fn output(&mut self, fx: &FxTable, currency: &'static str, amount: Decimal) -> Result<Option<CashFlow>> {
        let cost = fx.amount_from_ref(currency, amount)?;
        if cost > Decimal::ZERO && cost <= self.cash_available {
            self.cash_available -= cost;
            Ok(Some(CashFlow::new(fx, currency, amount)?))
        } else {
            Ok(None)
        }
    }

    /// Moves `amount` of `currency` (converted to reference currency) from
    /// available to frozen, keyed by order id and symbol.
    pub fn freeze(&mut self, fx: &FxTable, id: Uuid, symbol: &'static str, currency: &str, amount: Decimal) -> Result<()> {
        let reference_amount = fx.amount_to_ref(currency, amount)?;
        self.cash_available -= reference_amount;
        *self.cash_frozen.entry((id, symbol)).or_insert(Decimal::ZERO) += reference_amount;
        Ok(())
    }

    /// Releases the frozen amount for `(id, symbol)` back to available cash,
    /// if one exists; otherwise a no-op.
    pub fn release(&mut self, id: Uuid, symbol: &'static str) {
        if let Some(frozen) = self.cash_frozen.remove(&(id, symbol)) {
            self.cash_available += frozen;
        }
    }

    pub fn release_all(&mut self) {
        self.cash_available += self.cash_frozen.values().sum::<Decimal>();
        self.cash_frozen.clear();
    }

    /// A partial fill against a frozen buy order draws down the freeze
    /// directly; anything else (a sell, or a buy with nothing frozen)
    /// moves available cash by `amount * direction`.
    pub fn process_partial_fill(&mut self, fill: &FillInfo, cash_flow: &CashFlow, fx: &FxTable) -> Result<()> {
        let amount = cash_flow.to_reference(fx)?;
        let key = (fill.id, fill.symbol);
        if fill.direction == Direction::Buy && self.cash_frozen.contains_key(&key) {
            *self.cash_frozen.get_mut(&key).expect("checked above") -= amount;
        } else {
            self.cash_available -= amount * Decimal::from(fill.direction.sign());
        }
        Ok(())
    }

    /// A full fill releases any remaining freeze for a buy before debiting
    /// or crediting available cash by `amount * direction`.
    pub fn process_full_fill(&mut self, fill: &FillInfo, cash_flow: &CashFlow, fx: &FxTable) -> Result<()> {
        let key = (fill.id, fill.symbol);
        if fill.direction == Direction::Buy && self.cash_frozen.contains_key(&key) {
            self.release(fill.id, fill.symbol);
        }
        let amount = cash_flow.to_reference(fx)?;
        self.cash_available -= amount * Decimal::from(fill.direction.sign());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::info::OpenClose;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn fx() -> FxTable {
        FxTable::new("CNY")
    }

    fn fill(direction: Direction, id: Uuid) -> FillInfo {
        FillInfo {
            id,
            symbol: "X",
            timestamp: Utc::now(),
            direction,
            open_or_close: OpenClose::Open,
            filled_price: dec!(5),
            volume: dec!(100),
            partial: false,
        }
    }

    #[test]
    fn input_credits_available_cash() {
        let fx = fx();
        let mut wallet = Wallet::new();
        wallet.input(&fx, &CashFlow::new(&fx, "CNY", dec!(1000)).unwrap()).unwrap();
        assert_eq!(wallet.available(), dec!(1000));
    }

    #[test]
    fn output_fails_when_insufficient_cash() {
        let fx = fx();
        let mut wallet = Wallet::new();
        assert!(wallet.output(&fx, "CNY", dec!(100)).unwrap().is_none());
        assert_eq!(wallet.available(), Decimal::ZERO);
    }

    #[test]
    fn freeze_then_release_restores_available_cash() {
        let fx = fx();
        let mut wallet = Wallet::new();
        wallet.input(&fx, &CashFlow::new(&fx, "CNY", dec!(1000)).unwrap()).unwrap();
        let id = Uuid::new_v4();
        wallet.freeze(&fx, id, "X", "CNY", dec!(500)).unwrap();
        assert_eq!(wallet.available(), dec!(500));
        assert_eq!(wallet.total(), dec!(1000));

        wallet.release(id, "X");
        assert_eq!(wallet.available(), dec!(1000));
    }

    #[test]
    fn release_all_clears_every_frozen_entry() {
        let fx = fx();
        let mut wallet = Wallet::new();
        wallet.input(&fx, &CashFlow::new(&fx, "CNY", dec!(1000)).unwrap()).unwrap();
        wallet.freeze(&fx, Uuid::new_v4(), "X", "CNY", dec!(300)).unwrap();
        wallet.freeze(&fx, Uuid::new_v4(), "Y", "CNY", dec!(200)).unwrap();
        wallet.release_all();
        assert_eq!(wallet.available(), dec!(1000));
        assert_eq!(wallet.total(), dec!(1000));
    }

    #[test]
    fn partial_fill_on_frozen_buy_draws_down_the_freeze_not_available() {
        let fx = fx();
        let mut wallet = Wallet::new();
        wallet.input(&fx, &CashFlow::new(&fx, "CNY", dec!(1000)).unwrap()).unwrap();
        let id = Uuid::new_v4();
        wallet.freeze(&fx, id, "X", "CNY", dec!(500)).unwrap();

        let cash_flow = CashFlow::new(&fx, "CNY", dec!(200)).unwrap();
        wallet.process_partial_fill(&fill(Direction::Buy, id), &cash_flow, &fx).unwrap();

        assert_eq!(wallet.available(), dec!(500));
        assert_eq!(wallet.total(), dec!(800));
    }

    #[test]
    fn full_fill_on_frozen_buy_releases_then_debits_available() {
        let fx = fx();
        let mut wallet = Wallet::new();
        wallet.input(&fx, &CashFlow::new(&fx, "CNY", dec!(1000)).unwrap()).unwrap();
        let id = Uuid::new_v4();
        wallet.freeze(&fx, id, "X", "CNY", dec!(500)).unwrap();

        let cash_flow = CashFlow::new(&fx, "CNY", dec!(500)).unwrap();
        wallet.process_full_fill(&fill(Direction::Buy, id), &cash_flow, &fx).unwrap();

        assert_eq!(wallet.available(), dec!(500));
        assert_eq!(wallet.total(), dec!(500));
    }

    #[test]
    fn full_fill_sell_credits_available_cash() {
        let fx = fx();
        let mut wallet = Wallet::new();
        let cash_flow = CashFlow::new(&fx, "CNY", dec!(500)).unwrap();
        wallet.process_full_fill(&fill(Direction::Sell, Uuid::new_v4()), &cash_flow, &fx).unwrap();
        assert_eq!(wallet.available(), dec!(500));
    }
}
