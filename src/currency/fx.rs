use crate::error::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use std::collections::HashMap;

/// Process-wide table of currency conversion rates against a single
/// reference currency (CNY by default).
///
/// Two independent rates are kept per currency: `from_ref` is the rate used
/// when *buying* that currency with the reference currency (an outflow of
/// reference cash), `to_ref` is the rate used when *selling* that currency
/// into the reference currency (an inflow of reference cash). The reference
/// currency itself always has both rates equal to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct FxTable {
    reference: String,
    from_ref: HashMap<String, Decimal>,
    to_ref: HashMap<String, Decimal>,
}

impl FxTable {
    /// Constructs a table with only the reference currency registered.
    pub fn new(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        let mut from_ref = HashMap::new();
        let mut to_ref = HashMap::new();
        from_ref.insert(reference.clone(), Decimal::ONE);
        to_ref.insert(reference.clone(), Decimal::ONE);
        Self {
            reference,
            from_ref,
            to_ref,
        }
    }

    pub fn reference_currency(&self) -> &str {
        &self.reference
    }

    /// Registers or updates the buy and/or sell rate for a currency. Passing
    /// `None` for a rate leaves the existing entry (if any) untouched.
    pub fn set_rate(&mut self, currency: impl Into<String>, from_ref: Option<Decimal>, to_ref: Option<Decimal>) {
        let currency = currency.into();
        if let Some(rate) = from_ref {
            self.from_ref.insert(currency.clone(), rate);
        }
        if let Some(rate) = to_ref {
            self.to_ref.insert(currency, rate);
        }
    }

    pub fn is_valid_currency(&self, currency: &str) -> bool {
        self.from_ref.contains_key(currency) && self.to_ref.contains_key(currency)
    }

    /// Reference-currency cost of buying `amount` of `currency`.
    pub fn amount_from_ref(&self, currency: &str, amount: Decimal) -> Result<Decimal> {
        let rate = self.from_rate(currency)?;
        Ok(round2(amount * rate))
    }

    /// Amount of `currency` obtainable by spending `amount` of reference currency.
    pub fn from_amount_of_ref(&self, currency: &str, amount: Decimal) -> Result<Decimal> {
        let rate = self.from_rate(currency)?;
        Ok(round2(amount / rate))
    }

    /// Reference-currency proceeds of selling `amount` of `currency`.
    pub fn amount_to_ref(&self, currency: &str, amount: Decimal) -> Result<Decimal> {
        let rate = self.to_rate(currency)?;
        Ok(round2(amount * rate))
    }

    /// Amount of `currency` that must be sold to net `amount` of reference currency.
    pub fn to_amount_of_ref(&self, currency: &str, amount: Decimal) -> Result<Decimal> {
        let rate = self.to_rate(currency)?;
        Ok(round2(amount / rate))
    }

    fn from_rate(&self, currency: &str) -> Result<Decimal> {
        self.from_ref
            .get(currency)
            .copied()
            .ok_or_else(|| Error::InvalidCurrency(currency.to_string()))
    }

    fn to_rate(&self, currency: &str) -> Result<Decimal> {
        self.to_ref
            .get(currency)
            .copied()
            .ok_or_else(|| Error::InvalidCurrency(currency.to_string()))
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
