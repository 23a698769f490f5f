//! Transaction duration histogram

use crate::fields::{
    PROCESSOR_EVENT, SERVICE_NAME, TRACE_ID, TRANSACTION_DURATION, TRANSACTION_EVENT,
    TRANSACTION_ID, TRANSACTION_NAME, TRANSACTION_SAMPLED, TRANSACTION_TYPE,
};
use crate::filters::range_filter;
use crate::{ApmError, ApmResult};
use codescope_common::CorrelationId;
use codescope_config::ApmConfig;
use codescope_es::query::term;
use codescope_es::{EsSearchResponse, SearchBackend};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

const DISTRIBUTION_AGG: &str = "distribution";
const SAMPLE_AGG: &str = "sample";
const MAX_DURATION_AGG: &str = "stats";

/// Transactions whose distribution is requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRequest {
    pub service_name: String,
    pub transaction_name: String,
    pub transaction_type: String,
    pub transaction_id: Option<String>,
    pub trace_id: Option<String>,
    /// Epoch milliseconds
    pub start: i64,
    /// Epoch milliseconds
    pub end: i64,
    /// Extra filter clauses appended to the query
    #[serde(default)]
    pub ui_filters: Vec<Value>,
}

/// Everything the histogram query depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionQueryParams {
    pub service_name: String,
    pub transaction_name: String,
    pub transaction_type: String,
    pub transaction_id: Option<String>,
    pub trace_id: Option<String>,
    pub bucket_size: u64,
    pub start: i64,
    pub end: i64,
    pub bucket_target_count: u64,
    #[serde(default)]
    pub ui_filters: Vec<Value>,
}

impl DistributionQueryParams {
    pub fn new(request: &DistributionRequest, bucket_size: u64, bucket_target_count: u64) -> Self {
        Self {
            service_name: request.service_name.clone(),
            transaction_name: request.transaction_name.clone(),
            transaction_type: request.transaction_type.clone(),
            transaction_id: request.transaction_id.clone(),
            trace_id: request.trace_id.clone(),
            bucket_size,
            start: request.start,
            end: request.end,
            bucket_target_count,
            ui_filters: request.ui_filters.clone(),
        }
    }
}

fn transaction_filters(
    service_name: &str,
    transaction_type: &str,
    transaction_name: &str,
    start: i64,
    end: i64,
    ui_filters: &[Value],
) -> Vec<Value> {
    let mut filter = vec![
        term(SERVICE_NAME, service_name),
        term(PROCESSOR_EVENT, TRANSACTION_EVENT),
        term(TRANSACTION_TYPE, transaction_type),
        term(TRANSACTION_NAME, transaction_name),
        json!({ "range": range_filter(start, end) }),
    ];
    filter.extend(ui_filters.iter().cloned());
    filter
}

/// Histogram query with one sample transaction per bucket
///
/// The `should` clauses bias each bucket's sample toward the requested trace
/// and transaction, then toward sampled transactions. A missing trace or
/// transaction id drops its clause.
pub fn build_distribution_query(params: &DistributionQueryParams) -> Value {
    let filter = transaction_filters(
        &params.service_name,
        &params.transaction_type,
        &params.transaction_name,
        params.start,
        params.end,
        &params.ui_filters,
    );

    let mut should = Vec::with_capacity(3);
    if let Some(trace_id) = &params.trace_id {
        should.push(term(TRACE_ID, trace_id.as_str()));
    }
    if let Some(transaction_id) = &params.transaction_id {
        should.push(term(TRANSACTION_ID, transaction_id.as_str()));
    }
    should.push(term(TRANSACTION_SAMPLED, true));

    json!({
        "size": 0,
        "query": {
            "bool": {
                "filter": filter,
                "should": should
            }
        },
        "aggs": {
            DISTRIBUTION_AGG: {
                "histogram": {
                    "field": TRANSACTION_DURATION,
                    "interval": params.bucket_size,
                    "min_doc_count": 0,
                    "extended_bounds": {
                        "min": 0,
                        "max": params.bucket_size.saturating_mul(params.bucket_target_count)
                    }
                },
                "aggs": {
                    SAMPLE_AGG: {
                        "top_hits": {
                            "_source": [TRANSACTION_ID, TRANSACTION_SAMPLED, TRACE_ID],
                            "size": 1
                        }
                    }
                }
            }
        }
    })
}

/// Slowest matching transaction, used to size the buckets
pub fn build_max_duration_query(request: &DistributionRequest) -> Value {
    json!({
        "size": 0,
        "query": {
            "bool": {
                "filter": transaction_filters(
                    &request.service_name,
                    &request.transaction_type,
                    &request.transaction_name,
                    request.start,
                    request.end,
                    &request.ui_filters,
                )
            }
        },
        "aggs": {
            MAX_DURATION_AGG: { "max": { "field": TRANSACTION_DURATION } }
        }
    })
}

/// Bucket width giving about `target_count` buckets up to `max_duration`
///
/// Never below `min_bucket_size`.
pub const fn bucket_size(max_duration: u64, target_count: u64, min_bucket_size: u64) -> u64 {
    if max_duration == 0 || target_count == 0 {
        return min_bucket_size;
    }
    let size = max_duration.div_ceil(target_count);
    if size > min_bucket_size {
        size
    } else {
        min_bucket_size
    }
}

/// Sample transaction of one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BucketSample {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    pub sampled: bool,
}

/// One histogram bucket; `key` is its lower bound in microseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DistributionBucket {
    pub key: u64,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<BucketSample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDistribution {
    pub total_hits: u64,
    pub bucket_size: u64,
    pub buckets: Vec<DistributionBucket>,
}

/// Durations and histogram keys arrive as JSON floats
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_micros(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.ceil() as u64
    } else {
        0
    }
}

fn parse_sample(bucket: &Value) -> Option<BucketSample> {
    let source = bucket
        .get(SAMPLE_AGG)?
        .pointer("/hits/hits")?
        .as_array()?
        .first()?
        .get("_source")?;

    Some(BucketSample {
        transaction_id: source.pointer("/transaction/id")?.as_str()?.to_string(),
        trace_id: source
            .pointer("/trace/id")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        sampled: source
            .pointer("/transaction/sampled")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// Parse `aggregations.distribution.buckets`
///
/// # Errors
/// Returns `ApmError::MissingAggregation` if the response has no histogram
pub fn parse_buckets(
    response: &EsSearchResponse,
    correlation_id: &CorrelationId,
) -> ApmResult<Vec<DistributionBucket>> {
    let buckets = response
        .aggregation(DISTRIBUTION_AGG)
        .and_then(|agg| agg.get("buckets"))
        .and_then(Value::as_array)
        .ok_or_else(|| ApmError::MissingAggregation {
            name: DISTRIBUTION_AGG.to_string(),
            correlation_id: correlation_id.clone(),
        })?;

    Ok(buckets
        .iter()
        .map(|bucket| DistributionBucket {
            key: whole_micros(bucket.get("key").and_then(Value::as_f64).unwrap_or_default()),
            count: bucket.get("doc_count").and_then(Value::as_u64).unwrap_or_default(),
            sample: parse_sample(bucket),
        })
        .collect())
}

/// Runs distribution queries against the transaction indices
pub struct DistributionFetcher {
    backend: Arc<dyn SearchBackend>,
    index: String,
    bucket_target_count: u64,
    min_bucket_size: u64,
}

impl DistributionFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &ApmConfig) -> Self {
        Self {
            backend,
            index: config.transaction_indices.clone(),
            bucket_target_count: config.bucket_target_count,
            min_bucket_size: config.min_bucket_size,
        }
    }

    pub const fn bucket_target_count(&self) -> u64 {
        self.bucket_target_count
    }

    async fn search(&self, body: Value, correlation_id: &CorrelationId) -> ApmResult<EsSearchResponse> {
        self.backend
            .search(&self.index, body, correlation_id)
            .await
            .map_err(|source| ApmError::Backend {
                correlation_id: correlation_id.clone(),
                source,
            })
    }

    /// Run the histogram query and parse its buckets
    ///
    /// # Errors
    /// Returns backend failures and responses without the histogram
    #[instrument(skip(self, params, correlation_id), fields(correlation_id = %correlation_id))]
    pub async fn fetch_buckets(
        &self,
        params: &DistributionQueryParams,
        correlation_id: &CorrelationId,
    ) -> ApmResult<Vec<DistributionBucket>> {
        let response = self
            .search(build_distribution_query(params), correlation_id)
            .await?;
        parse_buckets(&response, correlation_id)
    }

    /// Size the buckets from the slowest transaction, then fetch them
    ///
    /// No histogram query is sent when nothing matches.
    ///
    /// # Errors
    /// Returns backend failures and responses without the histogram
    #[instrument(
        skip(self, request, correlation_id),
        fields(correlation_id = %correlation_id, service = %request.service_name)
    )]
    pub async fn distribution(
        &self,
        request: &DistributionRequest,
        correlation_id: &CorrelationId,
    ) -> ApmResult<TransactionDistribution> {
        let stats = self
            .search(build_max_duration_query(request), correlation_id)
            .await?;
        let total_hits = stats.total();
        let max_duration = stats
            .aggregation(MAX_DURATION_AGG)
            .and_then(|agg| agg.get("value"))
            .and_then(Value::as_f64)
            .map_or(0, whole_micros);

        let bucket_size = bucket_size(max_duration, self.bucket_target_count, self.min_bucket_size);

        if total_hits == 0 {
            debug!(correlation_id = %correlation_id, "No transactions in range");
            return Ok(TransactionDistribution {
                total_hits,
                bucket_size,
                buckets: Vec::new(),
            });
        }

        let params = DistributionQueryParams::new(request, bucket_size, self.bucket_target_count);
        let buckets = self.fetch_buckets(&params, correlation_id).await?;
        debug!(
            correlation_id = %correlation_id,
            total_hits,
            bucket_size,
            buckets = buckets.len(),
            "Fetched transaction distribution"
        );

        Ok(TransactionDistribution {
            total_hits,
            bucket_size,
            buckets,
        })
    }
}
