//! APM transaction-duration distribution
//!
//! Builds the histogram aggregation query over transaction durations, sizes
//! its buckets from the slowest matching transaction, and parses the buckets
//! (each with one sample transaction) out of the response.

pub mod distribution;
pub mod error;
pub mod fields;
pub mod filters;

pub use distribution::{
    BucketSample, DistributionBucket, DistributionFetcher, DistributionQueryParams,
    DistributionRequest, TransactionDistribution, bucket_size, build_distribution_query,
    build_max_duration_query,
};
pub use error::{ApmError, ApmResult};
pub use filters::{phrase_filter, phrase_filter_clause, range_filter};
