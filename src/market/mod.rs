/// Pure bar-to-price slicing: turns a single [`crate::event::info::BarInfo`]
/// into the four [`crate::event::info::PriceInfo`] points the exchange
/// matches orders against.
pub mod slicer;

pub use slicer::{slice_bar, SliceMode};
