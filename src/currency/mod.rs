/// Defines [`cash_flow::CashFlow`], a validated (currency, non-negative
/// amount) value, and [`fx::FxTable`], the process-wide lookup of
/// currency conversion rates it is validated and converted against.
pub mod cash_flow;
pub mod fx;

pub use cash_flow::CashFlow;
pub use fx::FxTable;
