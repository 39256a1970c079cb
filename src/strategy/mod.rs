/// Dual simple-moving-average crossover strategy, one instance per symbol.
pub mod unit;
/// Maps symbol to strategy unit and fans Clear/End events out.
pub mod router;

pub use router::StrategyRouter;
pub use unit::{MaStrategyInfo, MaStrategyUnit};
