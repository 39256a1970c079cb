use crate::currency::fx::FxTable;
use crate::error::{Error, Result};
use rust_decimal::Decimal;

/// A non-negative amount of a single currency.
///
/// Validated at construction: the currency must be registered in the
/// [`FxTable`] supplied, and the amount must be non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CashFlow {
    pub currency: &'static str,
    pub amount: Decimal,
}

impl CashFlow {
    pub fn new(fx: &FxTable, currency: &'static str, amount: Decimal) -> Result<Self> {
        if !fx.is_valid_currency(currency) {
            return Err(Error::InvalidCurrency(currency.to_string()));
        }
        if amount.is_sign_negative() {
            return Err(Error::InvalidAmount(
                amount.try_into().unwrap_or(f64::NAN),
            ));
        }
        Ok(Self { currency, amount })
    }

    /// Reference-currency proceeds of selling this cash flow.
    pub fn to_reference(&self, fx: &FxTable) -> Result<Decimal> {
        fx.amount_to_ref(self.currency, self.amount)
    }

    /// Exchanges this cash flow into an equal-value cash flow denominated in
    /// `currency`. Returns the flow unchanged if already in that currency.
    pub fn exchange(&self, fx: &FxTable, currency: &'static str) -> Result<CashFlow> {
        if !fx.is_valid_currency(currency) {
            return Err(Error::InvalidCurrency(currency.to_string()));
        }
        if currency == self.currency {
            return Ok(*self);
        }

        let reference_amount = self.to_reference(fx)?;
        let amount = if currency == fx.reference_currency() {
            reference_amount
        } else {
            fx.from_amount_of_ref(currency, reference_amount)?
        };
        CashFlow::new(fx, currency, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table() -> FxTable {
        let mut fx = FxTable::new("CNY");
        fx.set_rate("HKD", Some(dec!(0.82510)), Some(dec!(0.82490)));
        fx
    }

    #[test]
    fn should_reject_invalid_currency() {
        let fx = table();
        assert_eq!(
            CashFlow::new(&fx, "USD", dec!(10)),
            Err(Error::InvalidCurrency("USD".to_string()))
        );
    }

    #[test]
    fn should_reject_negative_amount() {
        let fx = table();
        assert!(matches!(
            CashFlow::new(&fx, "CNY", dec!(-1)),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn should_exchange_into_reference_currency() {
        let fx = table();
        let flow = CashFlow::new(&fx, "HKD", dec!(100)).unwrap();
        let exchanged = flow.exchange(&fx, "CNY").unwrap();
        assert_eq!(exchanged.amount, dec!(82.49));
    }

    #[test]
    fn exchange_into_same_currency_is_identity() {
        let fx = table();
        let flow = CashFlow::new(&fx, "HKD", dec!(50)).unwrap();
        assert_eq!(flow.exchange(&fx, "HKD").unwrap(), flow);
    }
}
