//! Scan orchestration.
//!
//! Drives the pipeline across the instrument universe in batches, owns the
//! run-level result cache and the alert dedup map, and is the only place
//! with scheduling or timing concerns. Both caches are written exclusively
//! from the orchestrator after a batch completes or at run end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::config::{Config, ScanConfig};
use crate::notify::{format_signal, RecipientStore, TelegramNotifier};
use crate::pipeline;
use crate::sources::CandleSource;
use crate::types::{
    Granularity, GradeCounts, InstrumentResult, InstrumentStatus, ScanResult, Signal,
};

/// Startup delay before the immediate first scheduled run.
const FIRST_RUN_DELAY_SECS: u64 = 5;

/// Dedup entries older than this are purged each run.
const DEDUP_RETENTION_HOURS: i64 = 24;

struct CachedScan {
    result: ScanResult,
    computed_at: i64,
}

/// The scan orchestrator.
///
/// Generic over the candle source so tests can inject canned data.
pub struct Scanner<S> {
    source: Arc<S>,
    config: Arc<Config>,
    /// Latest scan snapshot per timeframe, replaced wholesale each run.
    results: DashMap<String, CachedScan>,
    /// Alert dedup: signal key -> last-sent unix millis.
    dedup: DashMap<String, i64>,
    /// Prevents a scheduled run from starting while one is in flight.
    run_in_progress: AtomicBool,
}

impl<S: CandleSource> Scanner<S> {
    pub fn new(source: Arc<S>, config: Arc<Config>) -> Arc<Self> {
        Arc::new(Self {
            source,
            config,
            results: DashMap::new(),
            dedup: DashMap::new(),
            run_in_progress: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the cached snapshot when fresh and computed with the same
    /// settings, otherwise run a fresh scan.
    pub async fn latest_or_scan(&self, cfg: &ScanConfig) -> ScanResult {
        let now = chrono::Utc::now().timestamp_millis();
        let key = cfg.timeframe.code().to_string();

        if let Some(cached) = self.results.get(&key) {
            let fresh =
                now - cached.computed_at < self.config.result_cache_ttl_secs * 1000;
            if fresh && cached.result.applied_config == *cfg {
                debug!("Serving cached scan for {}", key);
                return cached.result.clone();
            }
        }

        self.run_scan(cfg).await
    }

    /// Signals from the latest snapshot for a timeframe, without triggering
    /// a scan. Empty when no run has completed yet.
    pub fn cached_signals(&self, timeframe: Granularity) -> Vec<Signal> {
        self.results
            .get(timeframe.code())
            .map(|cached| cached.result.signals.clone())
            .unwrap_or_default()
    }

    /// Run one full scan pass over the instrument universe.
    pub async fn run_scan(&self, cfg: &ScanConfig) -> ScanResult {
        let started = chrono::Utc::now().timestamp_millis();
        self.purge_dedup(started);

        info!(
            "Scanning {} instruments on {} in batches of {}",
            self.config.instruments.len(),
            cfg.timeframe.code(),
            self.config.scan_batch_size
        );

        let batch_size = self.config.scan_batch_size.max(1);
        let mut results: Vec<InstrumentResult> = Vec::with_capacity(self.config.instruments.len());

        let batches: Vec<&[String]> = self.config.instruments.chunks(batch_size).collect();
        let batch_count = batches.len();
        for (index, batch) in batches.into_iter().enumerate() {
            let analyses = batch
                .iter()
                .map(|instrument| self.analyze_instrument(instrument, cfg));
            results.extend(join_all(analyses).await);

            if index + 1 < batch_count {
                tokio::time::sleep(Duration::from_millis(self.config.scan_batch_delay_ms)).await;
            }
        }

        let mut signals: Vec<Signal> = results
            .iter()
            .flat_map(|r| r.signals.iter().cloned())
            .collect();
        signals.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.level_priority.cmp(&b.level_priority))
        });

        let mut grade_counts = GradeCounts::default();
        for signal in &signals {
            grade_counts.record(signal.grade);
        }

        let finished = chrono::Utc::now().timestamp_millis();
        let result = ScanResult {
            timestamp: finished,
            timeframe: cfg.timeframe.code().to_string(),
            signals_found: signals.len(),
            signals,
            grade_counts,
            results,
            applied_config: cfg.clone(),
        };

        info!(
            "Scan complete on {}: {} signals ({} instruments errored)",
            cfg.timeframe.code(),
            result.signals_found,
            result
                .results
                .iter()
                .filter(|r| r.status == InstrumentStatus::Error)
                .count()
        );

        // Replace the previous snapshot wholesale.
        self.results.insert(
            cfg.timeframe.code().to_string(),
            CachedScan {
                result: result.clone(),
                computed_at: finished,
            },
        );

        result
    }

    /// One instrument through the whole pipeline. Fetch failures become an
    /// error entry for this instrument only and never abort the run.
    pub async fn analyze_instrument(&self, instrument: &str, cfg: &ScanConfig) -> InstrumentResult {
        let (analysis, daily, htf) = tokio::join!(
            self.source.fetch_candles(
                instrument,
                cfg.timeframe,
                self.config.analysis_candle_count
            ),
            self.source
                .fetch_candles(instrument, Granularity::D, self.config.daily_candle_count),
            self.source.fetch_candles(
                instrument,
                cfg.timeframe.htf(),
                self.config.htf_candle_count
            ),
        );

        let analysis = match analysis {
            Ok(candles) if !candles.is_empty() => candles,
            Ok(_) => return InstrumentResult::error(instrument, "no candles returned"),
            Err(e) => {
                warn!("Candle fetch failed for {}: {}", instrument, e);
                return InstrumentResult::error(instrument, e.to_string());
            }
        };
        // Daily and HTF windows degrade rather than fail: no previous-day
        // levels / neutral bias.
        let daily = daily.unwrap_or_else(|e| {
            debug!("Daily fetch failed for {}: {}", instrument, e);
            Vec::new()
        });
        let htf = htf.unwrap_or_else(|e| {
            debug!("HTF fetch failed for {}: {}", instrument, e);
            Vec::new()
        });

        let levels =
            pipeline::extract_levels(&analysis, &daily, cfg.equal_level_tolerance, cfg.max_equal_levels);
        let atr = pipeline::average_true_range(&analysis, cfg.atr_period);
        let bias = pipeline::classify_bias(&htf);

        debug!(
            "{}: {} levels, ATR {:?}, bias {:?}",
            instrument,
            levels.len(),
            atr,
            bias
        );

        let timestamp = chrono::Utc::now().timestamp_millis();
        let mut accepted: Vec<Signal> = Vec::new();

        // Levels arrive priority-ordered; stop as soon as the cap is met so
        // higher-priority levels win.
        for level in &levels {
            if accepted.len() >= cfg.max_signals_per_instrument {
                break;
            }

            let Some(sweep) = pipeline::detect_sweep(&analysis, level, atr) else {
                continue;
            };

            if let Some(filter) = cfg.direction_filter {
                if sweep.direction != filter {
                    continue;
                }
            }
            if cfg.require_displacement && sweep.displacement_ratio < cfg.displacement_multiple {
                continue;
            }
            if cfg.require_fvg && sweep.gap.is_none() {
                continue;
            }

            let Some(signal) = pipeline::build_signal(
                instrument,
                &sweep,
                &levels,
                atr,
                bias,
                cfg,
                cfg.timeframe,
                timestamp,
            ) else {
                continue;
            };

            if signal.grade < cfg.min_grade {
                debug!(
                    "{}: {} graded {} below floor {}",
                    instrument,
                    signal.setup_label,
                    signal.grade.label(),
                    cfg.min_grade.label()
                );
                continue;
            }

            accepted.push(signal);
        }

        let status = if accepted.is_empty() {
            InstrumentStatus::Dropped
        } else {
            InstrumentStatus::Accepted
        };

        InstrumentResult {
            instrument: instrument.to_string(),
            status,
            signals: accepted,
            levels,
            error: None,
        }
    }

    /// Whether an alert for this signal key may be sent now. Claims the
    /// cooldown slot when it may.
    pub fn should_notify(&self, key: &str, now_ms: i64) -> bool {
        let cooldown_ms = self.config.alert_cooldown_mins * 60_000;
        if let Some(last) = self.dedup.get(key) {
            if now_ms - *last < cooldown_ms {
                return false;
            }
        }
        self.dedup.insert(key.to_string(), now_ms);
        true
    }

    fn purge_dedup(&self, now_ms: i64) {
        let cutoff = now_ms - DEDUP_RETENTION_HOURS * 3_600_000;
        self.dedup.retain(|_, last_sent| *last_sent >= cutoff);
    }
}

/// Periodic scan driver: an immediate first run shortly after startup,
/// then one scan per interval. A tick is skipped when the previous run is
/// still in flight; there is no mid-run abort path.
pub async fn run_scheduler<S: CandleSource>(
    scanner: Arc<Scanner<S>>,
    notifier: Option<TelegramNotifier>,
    recipients: Arc<RecipientStore>,
) {
    let interval = Duration::from_secs(scanner.config.scan_interval_secs);
    tokio::time::sleep(Duration::from_secs(FIRST_RUN_DELAY_SECS)).await;

    loop {
        if scanner.run_in_progress.swap(true, Ordering::SeqCst) {
            warn!("Previous scan still in flight, skipping tick");
        } else {
            let cfg = scanner.config.scan_defaults.clone();
            let result = scanner.run_scan(&cfg).await;

            if let Some(ref notifier) = notifier {
                dispatch_alerts(&scanner, notifier, &recipients, &result).await;
            }

            scanner.run_in_progress.store(false, Ordering::SeqCst);
        }

        tokio::time::sleep(interval).await;
    }
}

/// Fan out fresh signals to eligible recipients, paced to respect the
/// notification API's throughput limits. Dedup-suppressed signals are
/// skipped entirely.
async fn dispatch_alerts<S: CandleSource>(
    scanner: &Scanner<S>,
    notifier: &TelegramNotifier,
    recipients: &RecipientStore,
    result: &ScanResult,
) {
    let eligible = recipients.active_premium_recipients();
    if eligible.is_empty() {
        debug!("No eligible recipients, skipping alert dispatch");
        return;
    }

    let now = chrono::Utc::now().timestamp_millis();
    for signal in &result.signals {
        if !scanner.should_notify(&signal.dedup_key(), now) {
            debug!("Alert suppressed by cooldown: {}", signal.dedup_key());
            continue;
        }

        let text = format_signal(signal);
        for recipient in &eligible {
            notifier.send_logged(&recipient.channel_id, &text).await;
            tokio::time::sleep(Duration::from_millis(scanner.config.notify_delay_ms)).await;
        }
    }
}
