use crate::config::Config;
use crate::event::info::{BarInfo, Direction, FillInfo, OpenClose, PriceInfo};
use crate::event::Event;
use crate::strategy::unit::MaStrategyUnit;
use std::collections::HashMap;

/// Maps symbol to strategy unit, lazily constructing a unit from a buy-open
/// Fill the first time its symbol is seen, and fanning Clear/End out to
/// every registered unit.
#[derive(Debug, Default)]
pub struct StrategyRouter {
    units: HashMap<&'static str, MaStrategyUnit>,
}

impl StrategyRouter {
    pub fn new() -> Self {
        Self { units: HashMap::new() }
    }

    fn register(&mut self, unit: MaStrategyUnit) {
        self.units.entry(unit.symbol()).or_insert(unit);
    }

    pub fn on_bar(&mut self, bar: &BarInfo) -> Vec<Event> {
        match self.units.get_mut(bar.symbol) {
            Some(unit) => unit.on_bar(),
            None => Vec::new(),
        }
    }

    pub fn on_price(&mut self, price: &PriceInfo) -> Vec<Event> {
        match self.units.get_mut(price.symbol) {
            Some(unit) => unit.on_price(price),
            None => Vec::new(),
        }
    }

    pub fn on_fill(&mut self, config: &Config, fill: &FillInfo) -> Vec<Event> {
        if !self.units.contains_key(fill.symbol) && fill.direction == Direction::Buy && fill.open_or_close == OpenClose::Open {
            self.register(MaStrategyUnit::from_fill(fill, config));
        }

        match self.units.get_mut(fill.symbol) {
            Some(unit) => unit.on_fill(),
            None => Vec::new(),
        }
    }

    pub fn on_clear(&mut self) -> Vec<Event> {
        self.units.values_mut().flat_map(|unit| unit.on_clear()).collect()
    }

    pub fn on_end(&mut self) -> Vec<Event> {
        self.units.values_mut().flat_map(|unit| unit.on_end()).collect()
    }

    /// Snapshot of every registered unit, the rows the strategy logger
    /// writes on Clear.
    pub fn info_rows(&self) -> Vec<(&'static str, crate::strategy::unit::MaStrategyInfo)> {
        self.units.iter().map(|(&symbol, unit)| (symbol, unit.info())).collect()
    }
}
