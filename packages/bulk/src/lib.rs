#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scores many properties in one request.
//!
//! Items are scored on the blocking thread pool with a bounded number in
//! flight. Each item succeeds or fails on its own: an invalid item or a
//! scorer panic becomes a failed entry in the response, and every other
//! item is still scored. Results come back in request order.

pub mod progress;

use std::any::Any;
use std::sync::Arc;

use climarisk_ensemble::LocationScorer;
use climarisk_request_models::{BulkItem, BulkScoreRequest, ValidationError};
use climarisk_risk_models::{Coordinate, ScoreResult};
use futures::stream::{self, StreamExt as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progress::ProgressCallback;

/// Environment variable overriding [`BulkConfig::concurrency`].
pub const CONCURRENCY_ENV: &str = "CLIMARISK_BULK_CONCURRENCY";

/// Environment variable overriding [`BulkConfig::max_items`].
pub const MAX_ITEMS_ENV: &str = "CLIMARISK_BULK_MAX_ITEMS";

/// Default number of properties scored at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default cap on properties per request.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Errors that reject a bulk request as a whole.
#[derive(Debug, Error)]
pub enum BulkError {
    /// The request envelope is invalid (empty or too large).
    #[error("Invalid bulk request: {0}")]
    Validation(#[from] ValidationError),
}

/// Limits for a bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkConfig {
    /// Properties scored at once. Zero is treated as one.
    pub concurrency: usize,
    /// Largest accepted request.
    pub max_items: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl BulkConfig {
    /// Reads [`CONCURRENCY_ENV`] and [`MAX_ITEMS_ENV`], falling back to the
    /// defaults when a variable is unset or not a positive integer.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: usize| {
            lookup(key).map_or(default, |raw| {
                raw.trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|v| *v > 0)
                    .unwrap_or_else(|| {
                        log::warn!("Ignoring {key}={raw:?}; using {default}");
                        default
                    })
            })
        };

        Self {
            concurrency: read(CONCURRENCY_ENV, DEFAULT_CONCURRENCY),
            max_items: read(MAX_ITEMS_ENV, DEFAULT_MAX_ITEMS),
        }
    }

    /// Returns a copy with `concurrency` replaced when `Some`.
    #[must_use]
    pub fn with_concurrency(self, concurrency: Option<usize>) -> Self {
        Self {
            concurrency: concurrency.unwrap_or(self.concurrency),
            ..self
        }
    }
}

/// Outcome for one property. Exactly one of `score` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    /// Caller-supplied identifier, empty when none was given.
    pub property_id: String,
    pub coordinate: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkItemResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.score.is_some()
    }
}

/// Response to a bulk request. `successful + failed == total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkScoreResponse {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// One entry per requested property, in request order.
    pub items: Vec<BulkItemResult>,
}

/// Scores every property in `request`.
///
/// # Errors
///
/// * If the request is empty or exceeds `config.max_items`
pub async fn score_bulk<S: LocationScorer + 'static>(
    scorer: Arc<S>,
    request: BulkScoreRequest,
    config: &BulkConfig,
    progress: Arc<dyn ProgressCallback>,
) -> Result<BulkScoreResponse, BulkError> {
    request.validate(config.max_items)?;

    let total = request.properties.len();
    let concurrency = config.concurrency.max(1);
    log::info!("Scoring {total} properties (concurrency={concurrency})");
    progress.set_total(total as u64);
    progress.set_message("Scoring properties".to_string());

    let items: Vec<BulkItemResult> = stream::iter(request.properties.into_iter().map(|item| {
        let scorer = Arc::clone(&scorer);
        let progress = Arc::clone(&progress);
        async move {
            let result = score_item(scorer, item).await;
            progress.inc(1);
            result
        }
    }))
    .buffered(concurrency)
    .collect()
    .await;

    let successful = items.iter().filter(|item| item.is_success()).count();
    let failed = total - successful;

    log::info!("Bulk scoring finished: {successful} succeeded, {failed} failed");
    progress.finish(format!("{successful}/{total} scored"));

    Ok(BulkScoreResponse {
        total,
        successful,
        failed,
        items,
    })
}

async fn score_item<S: LocationScorer + 'static>(
    scorer: Arc<S>,
    item: BulkItem,
) -> BulkItemResult {
    let property_id = item.property_id.clone().unwrap_or_default();
    let coordinate = Coordinate::new(item.latitude, item.longitude);

    let outcome = match item.validate() {
        Ok((point, context)) => {
            tokio::task::spawn_blocking(move || scorer.score(point, &context))
                .await
                .map_err(|e| {
                    if e.is_panic() {
                        format!("Internal error: {}", panic_message(&*e.into_panic()))
                    } else {
                        format!("Internal error: {e}")
                    }
                })
        }
        Err(e) => Err(e.to_string()),
    };

    match outcome {
        Ok(score) => BulkItemResult {
            property_id,
            coordinate,
            score: Some(score),
            error: None,
        },
        Err(error) => {
            log::warn!(
                "Failed to score property '{property_id}' at ({}, {}): {error}",
                coordinate.latitude,
                coordinate.longitude
            );
            BulkItemResult {
                property_id,
                coordinate,
                score: None,
                error: Some(error),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "scorer panicked".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    use climarisk_ensemble::EnsembleScorer;
    use climarisk_risk_models::{PropertyContext, RiskBreakdown, RiskLevel};

    use super::*;
    use crate::progress::null_progress;

    /// Scores like the ensemble but panics at latitude 13.
    struct FlakyScorer;

    impl LocationScorer for FlakyScorer {
        fn score(&self, point: Coordinate, context: &PropertyContext) -> ScoreResult {
            assert!(
                (point.latitude - 13.0).abs() > f64::EPSILON,
                "sensor feed unavailable for latitude 13"
            );
            EnsembleScorer::new().score(point, context)
        }
    }

    /// Returns the latitude as the composite so ordering is observable.
    struct EchoScorer;

    impl LocationScorer for EchoScorer {
        fn score(&self, point: Coordinate, _context: &PropertyContext) -> ScoreResult {
            ScoreResult {
                composite_score: point.latitude,
                breakdown: RiskBreakdown::default(),
                risk_level: RiskLevel::from_score(point.latitude),
                confidence: 1.0,
                calculated_at: chrono::Utc::now(),
            }
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        total: AtomicU64,
        done: AtomicU64,
    }

    impl ProgressCallback for CountingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }
        fn inc(&self, delta: u64) {
            self.done.fetch_add(delta, Ordering::SeqCst);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {}
    }

    fn item(id: &str, latitude: f64, longitude: f64) -> BulkItem {
        BulkItem {
            property_id: Some(id.to_string()),
            latitude,
            longitude,
            ..BulkItem::default()
        }
    }

    #[tokio::test]
    async fn scores_every_item_in_request_order() {
        let request = BulkScoreRequest {
            properties: (1..=20).map(|i| item(&format!("p{i}"), f64::from(i), 77.0)).collect(),
        };
        let config = BulkConfig {
            concurrency: 4,
            ..BulkConfig::default()
        };
        let response = score_bulk(Arc::new(EchoScorer), request, &config, null_progress())
            .await
            .unwrap();

        assert_eq!(response.total, 20);
        assert_eq!(response.successful, 20);
        assert_eq!(response.failed, 0);
        for (i, result) in response.items.iter().enumerate() {
            assert_eq!(result.property_id, format!("p{}", i + 1));
            let score = result.score.as_ref().unwrap();
            assert!((score.composite_score - (i as f64 + 1.0)).abs() < f64::EPSILON);
        }
    }

    #[tokio::test]
    async fn panicking_item_fails_alone() {
        let request = BulkScoreRequest {
            properties: vec![
                item("delhi", 28.6139, 77.209),
                item("chennai", 13.0, 80.27),
                item("mumbai", 19.076, 72.8777),
            ],
        };
        let response = score_bulk(
            Arc::new(FlakyScorer),
            request,
            &BulkConfig::default(),
            null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(response.total, 3);
        assert_eq!(response.successful + response.failed, response.total);
        assert_eq!(response.failed, 1);

        let by_id: HashMap<_, _> = response
            .items
            .iter()
            .map(|r| (r.property_id.as_str(), r))
            .collect();
        let failed = by_id["chennai"];
        assert!(failed.score.is_none());
        let message = failed.error.as_deref().unwrap();
        assert!(message.contains("sensor feed unavailable"), "got {message}");
        assert!(by_id["delhi"].score.is_some());
        assert!(by_id["mumbai"].score.is_some());
    }

    #[tokio::test]
    async fn invalid_items_fail_without_scoring() {
        let mut bad_type = item("bad-type", 12.97, 77.59);
        bad_type.property_type = Some("castle".to_string());

        let request = BulkScoreRequest {
            properties: vec![item("ok", 12.97, 77.59), item("bad-lat", 95.0, 77.0), bad_type],
        };
        let response = score_bulk(
            Arc::new(EnsembleScorer::new()),
            request,
            &BulkConfig::default(),
            null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(response.successful, 1);
        assert_eq!(response.failed, 2);
        assert!(response.items[1].error.as_deref().unwrap().contains("Latitude"));
        assert!(response.items[2].error.as_deref().unwrap().contains("castle"));
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized_requests() {
        let config = BulkConfig {
            concurrency: 2,
            max_items: 2,
        };
        let empty = score_bulk(
            Arc::new(EchoScorer),
            BulkScoreRequest::default(),
            &config,
            null_progress(),
        )
        .await;
        assert!(matches!(
            empty,
            Err(BulkError::Validation(ValidationError::EmptyBulkRequest))
        ));

        let oversized = BulkScoreRequest {
            properties: vec![item("a", 1.0, 1.0); 3],
        };
        let result = score_bulk(Arc::new(EchoScorer), oversized, &config, null_progress()).await;
        assert!(matches!(
            result,
            Err(BulkError::Validation(ValidationError::TooManyBulkItems { count: 3, max: 2 }))
        ));
    }

    #[tokio::test]
    async fn reports_progress_per_item() {
        let progress = Arc::new(CountingProgress::default());
        let request = BulkScoreRequest {
            properties: vec![item("a", 10.0, 70.0); 5],
        };
        score_bulk(
            Arc::new(EchoScorer),
            request,
            &BulkConfig::default(),
            progress.clone(),
        )
        .await
        .unwrap();

        assert_eq!(progress.total.load(Ordering::SeqCst), 5);
        assert_eq!(progress.done.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn config_reads_overrides_and_ignores_garbage() {
        let env = HashMap::from([
            (CONCURRENCY_ENV, "16".to_string()),
            (MAX_ITEMS_ENV, "not-a-number".to_string()),
        ]);
        let config = BulkConfig::from_lookup(|key| env.get(key).cloned());
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.max_items, DEFAULT_MAX_ITEMS);

        let zero = HashMap::from([(CONCURRENCY_ENV, "0".to_string())]);
        let config = BulkConfig::from_lookup(|key| zero.get(key).cloned());
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);

        assert_eq!(
            BulkConfig::default().with_concurrency(Some(3)).concurrency,
            3
        );
    }
}
