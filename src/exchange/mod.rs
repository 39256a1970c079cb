/// Price-priority order book, one per symbol per side.
pub mod order_book;
/// Per-symbol exchange state machine built on two [`order_book::OrderBook`]s.
pub mod unit;
/// Maps symbol to exchange unit and fans session-boundary Clear events out.
pub mod router;

pub use order_book::OrderBook;
pub use router::ExchangeRouter;
pub use unit::ExchangeUnit;
