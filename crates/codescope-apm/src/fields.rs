//! Elasticsearch field names of APM transaction documents

pub const SERVICE_NAME: &str = "service.name";
pub const PROCESSOR_EVENT: &str = "processor.event";
pub const TRACE_ID: &str = "trace.id";
pub const TRANSACTION_DURATION: &str = "transaction.duration.us";
pub const TRANSACTION_ID: &str = "transaction.id";
pub const TRANSACTION_NAME: &str = "transaction.name";
pub const TRANSACTION_SAMPLED: &str = "transaction.sampled";
pub const TRANSACTION_TYPE: &str = "transaction.type";
pub const TIMESTAMP: &str = "@timestamp";

/// `processor.event` value of transaction documents
pub const TRANSACTION_EVENT: &str = "transaction";
