use crate::config::Config;
use crate::currency::{CashFlow, FxTable};
use crate::error::Result;
use crate::event::info::{Direction, FillInfo, OpenClose, OrderInfo, PriceInfo, SignalInfo, SignalType};
use crate::event::Event;
use crate::portfolio::buy_signal_queue::BuySignalQueue;
use crate::portfolio::capability::Capability;
use crate::portfolio::holding::HoldingUnit;
use crate::portfolio::wallet::Wallet;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Snapshot of portfolio-level accounting, the row shape of the portfolio
/// log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortfolioInfo {
    pub cash: Decimal,
    pub amount: Decimal,
    pub asset: Decimal,
    pub debt: Decimal,
    pub net_asset: Decimal,
    pub share: Decimal,
    pub net_price: Decimal,
}

/// Portfolio-level router: wallet + per-symbol holdings + buy-signal
/// allocation queue + active-order bookkeeping.
#[derive(Debug)]
pub struct PortfolioRouter {
    last_timestamp: DateTime<Utc>,
    tick_offset_seconds: i64,
    default_currency: &'static str,
    wallet: Wallet,
    holdings: HashMap<&'static str, HoldingUnit>,
    bid_queue: BuySignalQueue,
    active_orders: HashMap<Uuid, HashSet<&'static str>>,
    active_symbols: HashMap<&'static str, HashSet<Uuid>>,
    share: Decimal,
    debt: Decimal,
    net_price: Decimal,
    net_last: Decimal,
    cash: Decimal,
    amount: Decimal,
    asset: Decimal,
    net_asset: Decimal,
}

impl PortfolioRouter {
    pub fn new(config: &Config) -> Self {
        Self {
            last_timestamp: config.start_time,
            tick_offset_seconds: config.tick_offset_seconds,
            default_currency: "CNY",
            wallet: Wallet::new(),
            holdings: HashMap::new(),
            bid_queue: BuySignalQueue::new(),
            active_orders: HashMap::new(),
            active_symbols: HashMap::new(),
            share: Decimal::ZERO,
            debt: Decimal::ZERO,
            net_price: Decimal::ONE,
            net_last: Decimal::ONE,
            cash: Decimal::ZERO,
            amount: Decimal::ZERO,
            asset: Decimal::ZERO,
            net_asset: Decimal::ZERO,
        }
    }

    fn advance_tick(&mut self) -> DateTime<Utc> {
        self.last_timestamp += Duration::seconds(self.tick_offset_seconds);
        self.last_timestamp
    }

    /// Recomputes `cash`, `amount`, `asset`, `net_asset`, `net_price`. A
    /// zero share count (no subscriptions issued yet, or a full redemption)
    /// leaves `net_price` at its last value rather than dividing by zero.
    pub fn refresh(&mut self) {
        self.cash = self.wallet.total();
        self.amount = self.holdings.values().map(|h| h.current_value).sum();
        self.asset = round2(self.cash + self.amount);
        self.net_asset = self.asset - self.debt;

        self.net_last = self.net_price;
        if !self.share.is_zero() {
            self.net_price = (self.net_asset / self.share).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
        }
    }

    pub fn info(&self) -> PortfolioInfo {
        PortfolioInfo {
            cash: self.cash,
            amount: self.amount,
            asset: self.asset,
            debt: self.debt,
            net_asset: self.net_asset,
            share: self.share,
            net_price: self.net_price,
        }
    }

    pub fn subscribe(&mut self, fx: &FxTable, amount: Decimal, currency: &'static str) -> Result<()> {
        let flow = CashFlow::new(fx, currency, amount)?;
        let reference_amount = flow.to_reference(fx)?;
        self.wallet.input(fx, &flow)?;
        self.share += round2(reference_amount / self.net_price);
        self.refresh();
        Ok(())
    }

    pub fn redeem_amount(&mut self, fx: &FxTable, amount: Decimal, currency: &'static str) -> Result<Option<CashFlow>> {
        let flow = self.wallet.output(fx, currency, amount)?;
        if flow.is_some() {
            let reference_cost = fx.amount_from_ref(currency, amount)?;
            self.share -= round2(reference_cost / self.net_price);
        }
        Ok(flow)
    }

    /// Unlike [`Self::redeem_amount`], routes the computed cash flow through
    /// the FX table's reference conversion one extra time before returning
    /// it, matching an asymmetry observed in the source (`redeem_amount`'s
    /// input is already a reference-currency amount and skips this step).
    pub fn redeem_share(&mut self, fx: &FxTable, share: Decimal, currency: &'static str) -> Result<Option<CashFlow>> {
        let share = share.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let flow = self.wallet.output(fx, self.default_currency, share * self.net_price)?;
        if flow.is_none() {
            return Ok(None);
        }
        self.share -= share;
        Ok(Some(flow.expect("checked above").exchange(fx, currency)?))
    }

    pub fn borrow(&mut self, fx: &FxTable, amount: Decimal, currency: &'static str) -> Result<()> {
        let flow = CashFlow::new(fx, currency, amount)?;
        self.wallet.input(fx, &flow)?;
        self.debt += flow.to_reference(fx)?;
        self.refresh();
        Ok(())
    }

    pub fn repay(&mut self, fx: &FxTable, amount: Decimal, currency: &'static str) -> Result<Option<CashFlow>> {
        let flow = self.wallet.output(fx, currency, amount)?;
        if flow.is_some() {
            self.debt -= fx.amount_from_ref(currency, amount)?;
        }
        Ok(flow)
    }

    fn register(&mut self, holding: HoldingUnit) {
        self.holdings.entry(holding.symbol).or_insert(holding);
    }

    fn get_holding(&mut self, fx: &FxTable, config: &Config, symbol: &'static str) -> Result<&mut HoldingUnit> {
        if !self.holdings.contains_key(symbol) {
            let capability = Capability::from_config(config, self.default_currency);
            let holding = HoldingUnit::new(symbol, self.last_timestamp, capability, config, fx)?;
            self.register(holding);
        }
        Ok(self.holdings.get_mut(symbol).expect("just inserted if missing"))
    }

    pub fn on_price(&mut self, fx: &FxTable, price: &PriceInfo) -> Result<()> {
        self.last_timestamp = price.timestamp;
        if let Some(holding) = self.holdings.get_mut(price.symbol) {
            holding.on_price(price, fx)?;
        }
        Ok(())
    }

    /// Releases any frozen budget for `(id, symbol)` and, if still active,
    /// posts a Cancel for both directions at the advanced tick (the source
    /// posts both regardless of the order's actual side).
    pub fn cancel(&mut self, id: Uuid, symbol: &'static str) -> Vec<Event> {
        self.wallet.release(id, symbol);

        let mut events = Vec::new();
        if self.active_orders.get(&id).is_some_and(|symbols| symbols.contains(symbol)) {
            let timestamp = self.advance_tick();
            events.push(Event::cancel(crate::event::info::CancelInfo { id, symbol, timestamp, direction: Direction::Buy }));
            events.push(Event::cancel(crate::event::info::CancelInfo { id, symbol, timestamp, direction: Direction::Sell }));
            self.active_orders.get_mut(&id).expect("checked above").remove(symbol);
        }
        events
    }

    /// Releases every frozen budget and cancels every active order. Unlike
    /// `cancel`, this does not advance the clock: every posted cancel shares
    /// the current `last_timestamp`, matching the source which never calls
    /// its tick-offset step here. Leaves `active_symbols` untouched, matching
    /// the source's own omission.
    pub fn cancel_all(&mut self) -> Vec<Event> {
        self.wallet.release_all();

        let timestamp = self.last_timestamp;
        let mut events = Vec::new();
        for (&id, symbols) in self.active_orders.iter() {
            for &symbol in symbols {
                events.push(Event::cancel(crate::event::info::CancelInfo { id, symbol, timestamp, direction: Direction::Buy }));
                events.push(Event::cancel(crate::event::info::CancelInfo { id, symbol, timestamp, direction: Direction::Sell }));
            }
        }
        self.active_orders.clear();
        events
    }

    fn put_bid_order(&mut self, fx: &FxTable, order: OrderInfo, amount: Decimal) -> Result<Event> {
        let timestamp = self.advance_tick();
        let mut order = order;
        order.timestamp = timestamp;

        self.wallet.freeze(fx, order.id, order.symbol, fx.reference_currency(), amount)?;
        self.active_orders.entry(order.id).or_default().insert(order.symbol);
        self.active_symbols.entry(order.symbol).or_default().insert(order.id);

        Ok(Event::order(order))
    }

    pub fn process_bid_signal(&mut self, fx: &FxTable, config: &Config, signal: &mut SignalInfo) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let holding_price = signal.price;
        let required = self.get_holding(fx, config, signal.symbol)?.volume_to_amount(fx, signal.volume, holding_price, Direction::Buy)?;
        signal.amount = required;

        let rest_volume = if self.wallet.available() >= required {
            let order = OrderInfo {
                symbol: signal.symbol,
                timestamp: self.last_timestamp,
                direction: Direction::Buy,
                open_or_close: signal.open_or_close,
                price: signal.price,
                volume: signal.volume,
                id: signal.id,
                order_type: signal.signal_type.to_order_type(),
            };
            events.push(self.put_bid_order(fx, order, required)?);
            Decimal::ZERO
        } else if matches!(signal.signal_type, SignalType::Tbf | SignalType::Ioc) {
            let available = self.wallet.available();
            let affordable = self.get_holding(fx, config, signal.symbol)?.amount_to_volume(fx, available, signal.price, Direction::Buy)?;
            if affordable > Decimal::ZERO {
                let affordable_amount = self.get_holding(fx, config, signal.symbol)?.volume_to_amount(fx, affordable, signal.price, Direction::Buy)?;
                let order = OrderInfo {
                    symbol: signal.symbol,
                    timestamp: self.last_timestamp,
                    direction: Direction::Buy,
                    open_or_close: signal.open_or_close,
                    price: signal.price,
                    volume: affordable,
                    id: Uuid::new_v4(),
                    order_type: signal.signal_type.to_order_type(),
                };
                events.push(self.put_bid_order(fx, order, affordable_amount)?);
            }
            signal.volume - affordable
        } else {
            signal.volume
        };

        if rest_volume > Decimal::ZERO && matches!(signal.signal_type, SignalType::Tbf | SignalType::Fow) {
            let mut queued = *signal;
            if rest_volume < signal.volume {
                queued.volume = rest_volume;
                queued.amount = self.get_holding(fx, config, signal.symbol)?.volume_to_amount(fx, rest_volume, signal.price, Direction::Buy)?;
            }
            self.bid_queue.put(queued)?;
        }

        Ok(events)
    }

    pub fn process_ask_signal(&mut self, signal: &SignalInfo, holding: &HoldingUnit) -> Vec<Event> {
        let tmp_volume = if holding.volume >= signal.volume {
            signal.volume
        } else if holding.volume > Decimal::ZERO && matches!(signal.signal_type, SignalType::Tbf | SignalType::Ioc) {
            holding.volume
        } else {
            Decimal::ZERO
        };

        if tmp_volume <= Decimal::ZERO {
            return Vec::new();
        }

        let timestamp = self.advance_tick();
        let order = OrderInfo {
            symbol: signal.symbol,
            timestamp,
            direction: signal.direction,
            open_or_close: signal.open_or_close,
            price: signal.price,
            volume: tmp_volume,
            id: signal.id,
            order_type: signal.signal_type.to_order_type(),
        };
        self.active_orders.entry(signal.id).or_default().insert(signal.symbol);
        self.active_symbols.entry(signal.symbol).or_default().insert(signal.id);
        vec![Event::order(order)]
    }

    pub fn on_signal(&mut self, fx: &FxTable, config: &Config, mut signal: SignalInfo) -> Result<Vec<Event>> {
        self.last_timestamp = signal.timestamp;
        match signal.direction {
            Direction::Buy => self.process_bid_signal(fx, config, &mut signal),
            Direction::Sell => {
                let holding = self.get_holding(fx, config, signal.symbol)?.clone();
                Ok(self.process_ask_signal(&signal, &holding))
            }
        }
    }

    /// Drains as much of the buy-signal queue as current cash allows, then
    /// (if anything remains) sizes the top `TBF` entry down to whatever one
    /// more lot purchase the wallet can still afford, in place.
    pub fn process_bid_signal_queue(&mut self, fx: &FxTable, config: &Config) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        while !self.bid_queue.is_empty() && self.wallet.available() >= self.bid_queue.peek()?.amount {
            let signal = self.bid_queue.pop()?;
            let order = OrderInfo {
                symbol: signal.symbol,
                timestamp: self.last_timestamp,
                direction: Direction::Buy,
                open_or_close: signal.open_or_close,
                price: signal.price,
                volume: signal.volume,
                id: signal.id,
                order_type: signal.signal_type.to_order_type(),
            };
            events.push(self.put_bid_order(fx, order, signal.amount)?);
        }

        if self.bid_queue.is_empty() {
            return Ok(events);
        }

        let (symbol, price, signal_type) = {
            let top = self.bid_queue.peek()?;
            (top.symbol, top.price, top.signal_type)
        };
        let available = self.wallet.available();
        let tmp_volume = self.get_holding(fx, config, symbol)?.amount_to_volume(fx, available, price, Direction::Buy)?;

        if tmp_volume > Decimal::ZERO && signal_type == SignalType::Tbf {
            let amount = self.get_holding(fx, config, symbol)?.volume_to_amount(fx, tmp_volume, price, Direction::Buy)?;
            let order = OrderInfo {
                symbol,
                timestamp: self.last_timestamp,
                direction: Direction::Buy,
                open_or_close: self.bid_queue.peek()?.open_or_close,
                price,
                volume: tmp_volume,
                id: Uuid::new_v4(),
                order_type: signal_type.to_order_type(),
            };
            events.push(self.put_bid_order(fx, order, amount)?);

            let residual_volume = self.bid_queue.peek()?.volume - tmp_volume;
            let residual_amount = self.get_holding(fx, config, symbol)?.volume_to_amount(fx, residual_volume, price, Direction::Buy)?;
            let top = self.bid_queue.peek_mut()?;
            top.volume = residual_volume;
            top.amount = residual_amount;
        }

        Ok(events)
    }

    /// On an unknown buy-open fill, lazily instantiates the holding from the
    /// fill itself; otherwise forwards to the existing holding. Either way,
    /// settles cash against the wallet and, on a full fill, cancels the
    /// originating order.
    pub fn on_fill(&mut self, fx: &FxTable, config: &Config, fill: &FillInfo) -> Result<Vec<Event>> {
        self.last_timestamp = fill.timestamp;

        if !self.holdings.contains_key(fill.symbol) && fill.direction == Direction::Buy && fill.open_or_close == OpenClose::Open {
            let capability = Capability::from_config(config, self.default_currency);
            let holding = HoldingUnit::from_fill(fill, capability, config, fx)?;
            self.register(holding);
        } else if let Some(holding) = self.holdings.get_mut(fill.symbol) {
            holding.on_fill(fill, fx)?;
        }

        let holding = self.get_holding(fx, config, fill.symbol)?;
        let flow = holding.volume_to_cash_flow(fx, fill.volume, fill.filled_price, fill.direction)?;

        if fill.partial {
            self.wallet.process_partial_fill(fill, &flow, fx)?;
            Ok(Vec::new())
        } else {
            self.wallet.process_full_fill(fill, &flow, fx)?;
            Ok(self.cancel(fill.id, fill.symbol))
        }
    }

    pub fn on_clear(&mut self, fx: &FxTable, config: &Config) -> Result<Vec<Event>> {
        self.refresh();
        self.process_bid_signal_queue(fx, config)
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fx() -> FxTable {
        FxTable::new("CNY")
    }

    fn config() -> Config {
        Config::builder().build()
    }

    #[test]
    fn subscribe_credits_wallet_and_grants_share_at_par() {
        let fx = fx();
        let config = config();
        let mut router = PortfolioRouter::new(&config);
        router.subscribe(&fx, dec!(1000), "CNY").unwrap();
        assert_eq!(router.share, dec!(1000));
        assert_eq!(router.cash, dec!(1000));
    }

    #[test]
    fn redeem_amount_fails_when_wallet_has_insufficient_cash() {
        let fx = fx();
        let config = config();
        let mut router = PortfolioRouter::new(&config);
        router.subscribe(&fx, dec!(100), "CNY").unwrap();
        assert!(router.redeem_amount(&fx, dec!(1000), "CNY").unwrap().is_none());
        assert_eq!(router.share, dec!(100));
    }

    #[test]
    fn redeem_amount_debits_share_proportionally() {
        let fx = fx();
        let config = config();
        let mut router = PortfolioRouter::new(&config);
        router.subscribe(&fx, dec!(1000), "CNY").unwrap();
        let flow = router.redeem_amount(&fx, dec!(400), "CNY").unwrap().unwrap();
        assert_eq!(flow.amount, dec!(400));
        assert_eq!(router.share, dec!(600));
    }

    #[test]
    fn borrow_increases_debt_and_cash() {
        let fx = fx();
        let config = config();
        let mut router = PortfolioRouter::new(&config);
        router.borrow(&fx, dec!(500), "CNY").unwrap();
        assert_eq!(router.debt, dec!(500));
        assert_eq!(router.cash, dec!(500));
    }

    #[test]
    fn buy_signal_freezes_required_budget_and_emits_order() {
        let fx = fx();
        let config = config();
        let mut router = PortfolioRouter::new(&config);
        router.subscribe(&fx, dec!(10000), "CNY").unwrap();

        let mut signal = SignalInfo {
            symbol: "X",
            timestamp: router.last_timestamp,
            direction: Direction::Buy,
            open_or_close: OpenClose::Open,
            price: dec!(10),
            volume: dec!(100),
            amount: Decimal::ZERO,
            currency: "CNY",
            signal_type: SignalType::Tbf,
            id: Uuid::new_v4(),
        };
        let events = router.process_bid_signal(&fx, &config, &mut signal).unwrap();
        assert_eq!(events.len(), 1);
        assert!(router.wallet.available() < dec!(10000));
        assert!(router.bid_queue.is_empty());
    }

    #[test]
    fn undersized_buy_signal_queues_the_remainder() {
        let fx = fx();
        let config = config();
        let mut router = PortfolioRouter::new(&config);
        router.subscribe(&fx, dec!(500), "CNY").unwrap();

        let mut signal = SignalInfo {
            symbol: "X",
            timestamp: router.last_timestamp,
            direction: Direction::Buy,
            open_or_close: OpenClose::Open,
            price: dec!(10),
            volume: dec!(1000),
            amount: Decimal::ZERO,
            currency: "CNY",
            signal_type: SignalType::Tbf,
            id: Uuid::new_v4(),
        };
        router.process_bid_signal(&fx, &config, &mut signal).unwrap();
        assert!(!router.bid_queue.is_empty());
    }

    #[test]
    fn sell_signal_beyond_holding_is_sized_down_for_tbf() {
        let config = config();
        let mut router = PortfolioRouter::new(&config);
        let fx = fx();
        let capability = Capability::from_config(&config, "CNY");
        let holding = HoldingUnit::new("X", router.last_timestamp, capability, &config, &fx).unwrap();
        let signal = SignalInfo {
            symbol: "X",
            timestamp: router.last_timestamp,
            direction: Direction::Sell,
            open_or_close: OpenClose::Close,
            price: dec!(10),
            volume: dec!(100),
            amount: Decimal::ZERO,
            currency: "CNY",
            signal_type: SignalType::Tbf,
            id: Uuid::new_v4(),
        };
        let events = router.process_ask_signal(&signal, &holding);
        assert!(events.is_empty());
    }
}
