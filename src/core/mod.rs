pub mod aggregator;
pub mod dynamic;
pub mod transform;

pub use aggregator::Aggregator;
