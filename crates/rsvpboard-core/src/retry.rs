//! Retry bookkeeping for per-guest scraping.
//!
//! Each target gets a few immediate attempts; whatever still fails is tried
//! again in a slower retry pass at the end. Failures that survive both are
//! written to a `failed_guests_<timestamp>.json` log so a later run can
//! target just those guests.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::source::snapshot::snapshot_timestamp;
use crate::source::TIMESTAMP_FORMAT;

/// File name prefix of failure logs.
const FAILURE_LOG_PREFIX: &str = "failed_guests_";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per target before moving on.
    pub max_immediate_retries: u32,
    /// Whether to retry all failures once more at the end.
    pub retry_pass_enabled: bool,
    /// Attempts per target in the retry pass.
    pub retry_pass_max_attempts: u32,
    pub base_delay_ms: u64,
    /// Pacing grows by this factor with every attempt.
    pub retry_delay_multiplier: f64,
    /// Pacing base used in the retry pass.
    pub slow_mode_delay_ms: u64,
    /// More unresolved failures than this fail the run.
    pub max_acceptable_failures: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_immediate_retries: 3,
            retry_pass_enabled: true,
            retry_pass_max_attempts: 2,
            base_delay_ms: 800,
            retry_delay_multiplier: 1.5,
            slow_mode_delay_ms: 2000,
            max_acceptable_failures: 5,
        }
    }
}

impl RetryConfig {
    /// Delay the operation should pace itself with on `attempt` (1-based).
    pub fn pacing(&self, attempt: u32, retry_pass: bool) -> Duration {
        let base = if retry_pass {
            self.slow_mode_delay_ms
        } else {
            self.base_delay_ms
        };
        let exponent = attempt.saturating_sub(1) as i32;
        let ms = base as f64 * self.retry_delay_multiplier.powi(exponent);
        Duration::from_millis(ms as u64)
    }

    /// Wait after failed `attempt` before the next one.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self.base_delay_ms as f64 * (attempt as f64 * 0.5);
        Duration::from_millis(ms as u64)
    }
}

// ============================================================================
// Targets and results
// ============================================================================

/// One unit of work, e.g. the guest at position `index` in the guest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryTarget {
    pub index: usize,
    pub display_name: String,
}

impl RetryTarget {
    pub fn new(index: usize, display_name: impl Into<String>) -> Self {
        Self {
            index,
            display_name: display_name.into(),
        }
    }
}

/// Passed to the operation on every try.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    /// 1-based, restarting in the retry pass.
    pub number: u32,
    pub retry_pass: bool,
    pub pacing: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub index: usize,
    pub display_name: String,
    /// Reason reported by the last attempt.
    pub reason: String,
    /// Attempts across both passes.
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct RetryOutcome<T> {
    /// `(target index, value)` in target order.
    pub succeeded: Vec<(usize, T)>,
    /// Targets that never succeeded, in target order.
    pub failed: Vec<FailedItem>,
    /// Targets the retry pass turned into successes.
    pub recovered: usize,
    max_acceptable_failures: usize,
}

impl<T> RetryOutcome<T> {
    pub fn is_acceptable(&self) -> bool {
        self.failed.len() <= self.max_acceptable_failures
    }

    /// Log of the unresolved failures, or `None` when there are none.
    pub fn failure_log(&self, timestamp: NaiveDateTime) -> Option<FailureLog> {
        if self.failed.is_empty() {
            return None;
        }
        Some(FailureLog::new(timestamp, self.failed.clone()))
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Run `op` for every target, one at a time, with immediate retries and an
/// optional final retry pass.
///
/// `op` reports failure with a short reason string.
pub async fn run_with_retries<T, F, Fut>(
    targets: &[RetryTarget],
    config: &RetryConfig,
    mut op: F,
) -> RetryOutcome<T>
where
    F: FnMut(&RetryTarget, Attempt) -> Fut,
    Fut: Future<Output = std::result::Result<T, String>>,
{
    let mut succeeded: Vec<(usize, usize, T)> = Vec::new();
    let mut failed: Vec<(usize, FailedItem)> = Vec::new();

    for (position, target) in targets.iter().enumerate() {
        match attempt_target(target, config, false, &mut op).await {
            Ok(value) => succeeded.push((position, target.index, value)),
            Err(failure) => failed.push((position, failure)),
        }
    }

    let mut recovered = 0;
    if config.retry_pass_enabled && !failed.is_empty() {
        info!(count = failed.len(), "Starting retry pass");
        let mut still_failed = Vec::new();

        for (position, previous) in failed {
            let target = &targets[position];
            match attempt_target(target, config, true, &mut op).await {
                Ok(value) => {
                    info!(index = target.index, name = %target.display_name, "Recovered in retry pass");
                    recovered += 1;
                    succeeded.push((position, target.index, value));
                }
                Err(mut failure) => {
                    failure.attempts += previous.attempts;
                    still_failed.push((position, failure));
                }
            }
        }

        failed = still_failed;
        info!(still_failed = failed.len(), recovered, "Retry pass complete");
    }

    succeeded.sort_by_key(|(position, _, _)| *position);
    failed.sort_by_key(|(position, _)| *position);

    RetryOutcome {
        succeeded: succeeded
            .into_iter()
            .map(|(_, index, value)| (index, value))
            .collect(),
        failed: failed.into_iter().map(|(_, failure)| failure).collect(),
        recovered,
        max_acceptable_failures: config.max_acceptable_failures,
    }
}

async fn attempt_target<T, F, Fut>(
    target: &RetryTarget,
    config: &RetryConfig,
    retry_pass: bool,
    op: &mut F,
) -> std::result::Result<T, FailedItem>
where
    F: FnMut(&RetryTarget, Attempt) -> Fut,
    Fut: Future<Output = std::result::Result<T, String>>,
{
    let max_attempts = if retry_pass {
        config.retry_pass_max_attempts
    } else {
        config.max_immediate_retries
    };

    let mut reason = String::from("Not attempted");
    let mut made = 0;

    for number in 1..=max_attempts {
        made = number;
        let attempt = Attempt {
            number,
            retry_pass,
            pacing: config.pacing(number, retry_pass),
        };

        match op(target, attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                reason = e;
                if number < max_attempts {
                    debug!(
                        index = target.index,
                        attempt = number,
                        max_attempts,
                        reason = %reason,
                        "Attempt failed, will retry"
                    );
                    tokio::time::sleep(config.backoff(number)).await;
                }
            }
        }
    }

    warn!(
        index = target.index,
        name = %target.display_name,
        attempts = made,
        reason = %reason,
        retry_pass,
        "Exhausted attempts"
    );
    Err(FailedItem {
        index: target.index,
        display_name: target.display_name.clone(),
        reason,
        attempts: made,
    })
}

// ============================================================================
// Failure log
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLog {
    /// Run timestamp, also embedded in the file name.
    pub timestamp: String,
    pub total_failed: usize,
    pub guests: Vec<FailedItem>,
}

impl FailureLog {
    pub fn new(timestamp: NaiveDateTime, guests: Vec<FailedItem>) -> Self {
        Self {
            timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
            total_failed: guests.len(),
            guests,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}{}.json", FAILURE_LOG_PREFIX, self.timestamp)
    }

    /// Write the log into `dir`, returning its path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), failed = self.total_failed, "Saved failure log");
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid failure log {}", path.display()))
    }

    /// Path of the newest failure log in `dir`, if any.
    pub fn latest_in(dir: &Path) -> Result<Option<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?;

        let latest = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(FAILURE_LOG_PREFIX) && name.ends_with(".json"))
            .filter_map(|name| snapshot_timestamp(&name).map(|ts| (ts, name)))
            .max()
            .map(|(_, name)| dir.join(name));

        Ok(latest)
    }

    /// Target indices, for re-running only the failed guests.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.guests.iter().map(|g| g.index).collect()
    }

    pub fn targets(&self) -> Vec<RetryTarget> {
        self.guests
            .iter()
            .map(|g| RetryTarget::new(g.index, g.display_name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn instant() -> RetryConfig {
        RetryConfig {
            base_delay_ms: 0,
            slow_mode_delay_ms: 0,
            ..Default::default()
        }
    }

    fn targets(n: usize) -> Vec<RetryTarget> {
        (0..n)
            .map(|i| RetryTarget::new(i, format!("Guest {}", i + 1)))
            .collect()
    }

    fn timestamp() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-05-01_18-30-00", TIMESTAMP_FORMAT).unwrap()
    }

    // -------------------------------------------------------------------------
    // Delays
    // -------------------------------------------------------------------------

    #[test]
    fn test_default_delays() {
        let config = RetryConfig::default();
        assert_eq!(config.pacing(1, false), Duration::from_millis(800));
        assert_eq!(config.pacing(2, false), Duration::from_millis(1200));
        assert_eq!(config.pacing(3, false), Duration::from_millis(1800));
        assert_eq!(config.pacing(1, true), Duration::from_millis(2000));
        assert_eq!(config.pacing(2, true), Duration::from_millis(3000));

        assert_eq!(config.backoff(1), Duration::from_millis(400));
        assert_eq!(config.backoff(2), Duration::from_millis(800));
    }

    // -------------------------------------------------------------------------
    // Runner
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_success_on_second_attempt_is_not_a_failure() {
        let mut calls: HashMap<usize, u32> = HashMap::new();
        let outcome = run_with_retries(&targets(2), &instant(), |target, attempt| {
            *calls.entry(target.index).or_default() += 1;
            let result = if target.index == 1 && attempt.number < 2 {
                Err("Modal did not open".to_string())
            } else {
                Ok(target.index * 10)
            };
            async move { result }
        })
        .await;

        assert_eq!(outcome.succeeded, vec![(0, 0), (1, 10)]);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.recovered, 0);
        assert_eq!(calls[&1], 2);
    }

    #[tokio::test]
    async fn test_persistent_failure_reports_attempts_across_passes() {
        let outcome: RetryOutcome<()> = run_with_retries(&targets(1), &instant(), |_, attempt| {
            let reason = if attempt.retry_pass { "Timeout" } else { "Modal did not open" };
            async move { Err(reason.to_string()) }
        })
        .await;

        assert_eq!(
            outcome.failed,
            vec![FailedItem {
                index: 0,
                display_name: "Guest 1".to_string(),
                reason: "Timeout".to_string(),
                attempts: 5,
            }]
        );
        assert!(outcome.is_acceptable());
    }

    #[tokio::test]
    async fn test_retry_pass_recovers_and_keeps_order() {
        let outcome = run_with_retries(&targets(3), &instant(), |target, attempt| {
            let result = if target.index == 0 && !attempt.retry_pass {
                Err("Timeout".to_string())
            } else {
                Ok(target.display_name.clone())
            };
            async move { result }
        })
        .await;

        assert_eq!(outcome.recovered, 1);
        let order: Vec<usize> = outcome.succeeded.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_retry_pass_can_be_disabled() {
        let config = RetryConfig {
            retry_pass_enabled: false,
            ..instant()
        };
        let mut retry_pass_calls = 0;
        let outcome: RetryOutcome<()> = run_with_retries(&targets(1), &config, |_, attempt| {
            if attempt.retry_pass {
                retry_pass_calls += 1;
            }
            async { Err("Timeout".to_string()) }
        })
        .await;

        assert_eq!(retry_pass_calls, 0);
        assert_eq!(outcome.failed[0].attempts, 3);
    }

    #[tokio::test]
    async fn test_failure_threshold() {
        let config = RetryConfig {
            max_acceptable_failures: 2,
            retry_pass_enabled: false,
            max_immediate_retries: 1,
            ..instant()
        };

        let fail_all = |_: &RetryTarget, _: Attempt| async { Err::<(), _>("Timeout".to_string()) };
        assert!(run_with_retries(&targets(2), &config, fail_all).await.is_acceptable());
        assert!(!run_with_retries(&targets(3), &config, fail_all).await.is_acceptable());
    }

    #[tokio::test]
    async fn test_attempts_carry_pacing() {
        let config = RetryConfig {
            base_delay_ms: 0,
            ..Default::default()
        };
        let mut seen = Vec::new();
        let _: RetryOutcome<()> = run_with_retries(&targets(1), &config, |_, attempt| {
            seen.push(attempt);
            async { Err("Timeout".to_string()) }
        })
        .await;

        assert_eq!(seen.len(), 5);
        assert!(seen[..3].iter().all(|a| !a.retry_pass && a.pacing.is_zero()));
        assert_eq!(seen[3].number, 1);
        assert!(seen[3].retry_pass);
        assert_eq!(seen[3].pacing, Duration::from_millis(2000));
        assert_eq!(seen[4].pacing, Duration::from_millis(3000));
    }

    // -------------------------------------------------------------------------
    // Failure log
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_failure_log_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let outcome: RetryOutcome<()> = run_with_retries(&targets(2), &instant(), |target, _| {
            let result = if target.index == 1 {
                Err("Failed to extract data from modal".to_string())
            } else {
                Ok(())
            };
            async move { result }
        })
        .await;

        let log = outcome.failure_log(timestamp()).unwrap();
        assert_eq!(log.total_failed, 1);
        let path = log.save(dir.path()).unwrap();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("failed_guests_2024-05-01_18-30-00.json")
        );

        let loaded = FailureLog::load(&path).unwrap();
        assert_eq!(loaded, log);
        assert_eq!(loaded.failed_indices(), vec![1]);
        assert_eq!(loaded.targets(), vec![RetryTarget::new(1, "Guest 2")]);
    }

    #[test]
    fn test_no_failures_no_log() {
        let outcome: RetryOutcome<()> = RetryOutcome {
            succeeded: vec![(0, ())],
            failed: Vec::new(),
            recovered: 0,
            max_acceptable_failures: 5,
        };
        assert!(outcome.failure_log(timestamp()).is_none());
    }

    #[test]
    fn test_latest_failure_log() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FailureLog::latest_in(dir.path()).unwrap().is_none());

        for name in [
            "failed_guests_2024-05-01_18-30-00.json",
            "failed_guests_2024-05-03_08-00-00.json",
            "zola_guests_2024-06-01_00-00-00.csv",
        ] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }

        let latest = FailureLog::latest_in(dir.path()).unwrap().unwrap();
        assert!(latest.ends_with("failed_guests_2024-05-03_08-00-00.json"));
    }

    #[test]
    fn test_log_json_shape() {
        let log = FailureLog::new(
            timestamp(),
            vec![FailedItem {
                index: 4,
                display_name: "Patel, Asha".to_string(),
                reason: "Timeout".to_string(),
                attempts: 5,
            }],
        );
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["timestamp"], "2024-05-01_18-30-00");
        assert_eq!(value["total_failed"], 1);
        assert_eq!(value["guests"][0]["display_name"], "Patel, Asha");
        assert_eq!(value["guests"][0]["attempts"], 5);
    }
}
