/// Generic max-heap priority queue over a user-provided total-order
/// relation, the primitive both order books and the buy-signal queue are
/// built on.
pub mod priority_queue;

pub use priority_queue::{PriorityOrd, PriorityQueue};
