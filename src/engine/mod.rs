/// Single-threaded event dispatcher: owns the priority queue, the per-kind
/// handler table, and the exchange/portfolio/strategy routers a backtest
/// drives events through.
pub mod dispatcher;

pub use dispatcher::{Dispatcher, Handler};
