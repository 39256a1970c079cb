//! A discrete-event simulation core for backtesting trading strategies.
//!
//! The system is built around a single-threaded [`engine::Dispatcher`] that
//! pulls timestamp-ordered [`event::Event`]s off a priority queue and routes
//! each one through whichever of the exchange, portfolio, and strategy
//! modules care about its kind, enqueueing whatever new events each produces.
//! There is no concurrency inside one run: a backtest is a pure function of
//! its input event stream and [`config::Config`].
//!
//! ## Overview
//! * **Event**: [`event::Event`] and [`event::info`] define every kind of
//!   thing that can flow through the queue — Bar, Price, Signal, Order,
//!   Cancel, Fill, Clear, End, Default — plus the [`collections::PriorityQueue`]
//!   that orders them by timestamp (and a secondary priority within a tick).
//! * **Market**: [`market::slice_bar`] turns one OHLC bar into the four
//!   intrabar price points the exchange matches orders against.
//! * **Exchange**: [`exchange::ExchangeRouter`] holds one matching unit per
//!   symbol, fills marketable orders against incoming prices, and is the
//!   source of Fill and Cancel events.
//! * **Portfolio**: [`portfolio::PortfolioRouter`] tracks cash, holdings, and
//!   debt across symbols and currencies, turning Signals into Orders and
//!   Fills into updated holdings.
//! * **Strategy**: [`strategy::StrategyRouter`] runs one dual moving-average
//!   unit per symbol, lazily created on that symbol's first buy-open Fill.
//! * **Logging**: [`logging::StringLogUnit`] and its CSV formatters record
//!   every dispatched event, and the portfolio/strategy snapshots taken on
//!   each Clear.
//! * **Engine**: [`engine::Dispatcher`] owns the queue, the routers, and the
//!   per-kind handler table, and drives a run to completion.

/// Error and result types shared across the crate.
pub mod error;

/// Runtime configuration: starting cash, trading calendar, fees, and output
/// paths for a backtest run.
pub mod config;

/// Currency conversion between a symbol's trading currency and the
/// portfolio's reference currency.
pub mod currency;

/// Generic data structures shared by more than one module, currently the
/// timestamp-ordered [`collections::PriorityQueue`].
pub mod collections;

/// Defines [`event::Event`] and its payload types, the currency every other
/// module communicates in.
pub mod event;

/// Pure bar-to-price slicing: turns a single [`event::info::BarInfo`] into
/// the four [`event::info::PriceInfo`] points the exchange matches orders
/// against.
pub mod market;

/// Per-symbol order book simulation: matches Orders against Prices and Bars,
/// producing Fill and Cancel events.
pub mod exchange;

/// Per-symbol and aggregate portfolio accounting: cash, holdings, debt, and
/// the translation of advisory Signals into Orders.
pub mod portfolio;

/// Dual simple-moving-average crossover strategy, one instance per symbol.
pub mod strategy;

/// CSV-like record formatting and the string-accumulating log unit every
/// logger (event, portfolio, strategy) is built on.
pub mod logging;

/// The single-threaded event dispatcher that drives a backtest to
/// completion.
pub mod engine;
