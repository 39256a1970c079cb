/// Shared per-symbol fee/tax/lot conversion math, composed into holding
/// units rather than inherited.
pub mod capability;
/// Cash management: available balance plus per-order frozen sub-balances.
pub mod wallet;
/// Per-symbol position: signed volume, average open price, valuations.
pub mod holding;
/// Priority queue of buy signals a portfolio could not immediately fund.
pub mod buy_signal_queue;
/// Portfolio-level router tying wallet, holdings, and signal processing together.
pub mod router;

pub use buy_signal_queue::BuySignalQueue;
pub use capability::Capability;
pub use holding::HoldingUnit;
pub use router::{PortfolioInfo, PortfolioRouter};
pub use wallet::Wallet;
