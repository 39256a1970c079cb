use thiserror::Error;

/// All errors generated by the backtest-core simulation.
///
/// Every variant here is fatal: each one signals programmer error or a
/// misconfigured data set, and the run that produced it must terminate.
/// Domain-level "failures" (insufficient cash, an unmarketable order, a
/// dropped sell signal) are never represented as an [`Error`]; they are
/// ordinary return values instead.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("currency `{0}` is not registered in the FX table")]
    InvalidCurrency(String),

    #[error("cash flow amount must be non-negative, got {0}")]
    InvalidAmount(f64),

    #[error("configuration key `{0}` is not defined")]
    UndefinedConstant(String),

    #[error("peek/pop on an empty priority queue")]
    EmptyQueue,

    #[error("pop_at index {index} out of range (len {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("event envelope kind {envelope_kind:?} does not match payload kind {payload_kind:?}")]
    EventKindMismatch {
        envelope_kind: crate::event::EventKind,
        payload_kind: crate::event::EventKind,
    },

    #[error("cannot compare orders of opposite direction ({0:?} vs {1:?})")]
    DirectionMismatch(crate::event::info::Direction, crate::event::info::Direction),
}

pub type Result<T> = std::result::Result<T, Error>;
