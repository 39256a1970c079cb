/// CSV-like record formatting and the string-accumulating log unit every
/// logger (event, portfolio, strategy) is built on.
pub mod record;

pub use record::{format_event_record, format_portfolio_record, format_strategy_record, StringLogUnit};
