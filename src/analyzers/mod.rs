pub mod aggregator;
pub mod classifier;
pub mod extractor;
pub mod location;

pub use aggregator::DependencyAggregator;
pub use classifier::PlainDataClassifier;
pub use extractor::DependencyExtractor;
pub use location::{LocationCache, ResolvedLocation};
