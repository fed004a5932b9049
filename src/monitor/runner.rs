//! The polling loop
//!
//! Each cycle reads the persisted position, fetches the three timeframes
//! concurrently, enriches them, asks the state machine for at most one
//! transition and, if there is one, persists it before alerting and
//! forwarding it to the execution port.

use futures_util::future::join3;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::common::channels::{is_shutdown, ShutdownReceiver};
use crate::common::errors::{MonitorError, Result};
use crate::common::retry::{retry_with_backoff, RetryPolicy};
use crate::common::traits::{AlertSink, BalanceSource, CandleSource, StateStore};
use crate::common::types::{CandleSeries, HistoryPoint, PositionState, TimeframeRole};
use crate::config::types::AppConfig;
use crate::indicators::{enrich, IndicatorError};
use crate::position::{
    ExecutionIntent, ExecutionPort, NoopExecution, PositionStateMachine, Transition,
};
use crate::strategy::{PositionSizer, SignalRules, TimeframeFrames, TrendChannelRules};

use super::status::StatusSnapshot;

/// Why a cycle stopped before evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A timeframe could not be fetched after retries
    FetchFailed,
    /// Fewer bars than the configured minimum or the indicator lookback
    InsufficientData,
    /// An indicator column stayed undefined after filling
    Indicators,
}

/// Result of one monitor cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Evaluated, no transition
    Held(PositionState),
    /// A transition was persisted and committed
    Transitioned(Transition),
    Skipped(SkipReason),
}

pub struct Monitor {
    config: Arc<AppConfig>,
    source: Arc<dyn CandleSource>,
    store: Arc<dyn StateStore>,
    alerts: Arc<dyn AlertSink>,
    execution: Arc<dyn ExecutionPort>,
    balances: Option<Arc<dyn BalanceSource>>,
    rules: Arc<dyn SignalRules>,
    sizer: PositionSizer,
    retry: RetryPolicy,
}

impl Monitor {
    /// Monitor with the trend-channel rules and no-op execution
    pub fn new(
        config: Arc<AppConfig>,
        source: Arc<dyn CandleSource>,
        store: Arc<dyn StateStore>,
        alerts: Arc<dyn AlertSink>,
    ) -> Result<Self> {
        let sizer = PositionSizer::new(&config.risk)?;
        let retry = RetryPolicy::new(
            config.monitor.retry_attempts,
            Duration::from_millis(config.monitor.retry_base_delay_ms),
        )
        .with_max_delay(config.monitor.error_cooldown());
        let rules = Arc::new(TrendChannelRules::new(config.rules.clone()));

        Ok(Self {
            config,
            source,
            store,
            alerts,
            execution: Arc::new(NoopExecution),
            balances: None,
            rules,
            sizer,
            retry,
        })
    }

    pub fn with_execution(mut self, execution: Arc<dyn ExecutionPort>) -> Self {
        self.execution = execution;
        self
    }

    /// Enable percentage-of-balance sizing for entry intents
    pub fn with_balance_source(mut self, balances: Arc<dyn BalanceSource>) -> Self {
        self.balances = Some(balances);
        self
    }

    pub fn with_rules(mut self, rules: Arc<dyn SignalRules>) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run until the shutdown signal fires
    pub async fn run(&self, mut shutdown: ShutdownReceiver) -> Result<()> {
        info!(
            symbol = %self.config.symbol,
            source = self.source.source_name(),
            rules = self.rules.name(),
            fast = %self.config.timeframes.fast,
            medium = %self.config.timeframes.medium,
            slow = %self.config.timeframes.slow,
            interval_secs = self.config.monitor.check_interval_seconds,
            "Monitor started"
        );

        loop {
            if is_shutdown(&shutdown) {
                break;
            }

            let pause = match self.run_cycle().await {
                Ok(outcome) => {
                    debug!(?outcome, "Cycle complete");
                    self.config.monitor.check_interval()
                }
                Err(e) => {
                    error!(error = %e, "Cycle failed, cooling down");
                    self.config.monitor.error_cooldown()
                }
            };

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || is_shutdown(&shutdown) {
                        break;
                    }
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Monitor stopped");
        Ok(())
    }

    /// One full fetch → enrich → evaluate → persist → alert pass
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let record = self.store.load_position().await?;
        let mut machine = PositionStateMachine::new(record);

        let [fast, medium, slow] = match self.fetch_all().await {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "Fetch failed, skipping cycle");
                return Ok(CycleOutcome::Skipped(SkipReason::FetchFailed));
            }
        };

        let min_bars = self.config.monitor.min_data_bars;
        for (role, series) in TimeframeRole::ALL.iter().zip([&fast, &medium, &slow]) {
            if series.len() < min_bars {
                warn!(
                    timeframe = %role,
                    bars = series.len(),
                    required = min_bars,
                    "Not enough bars, skipping cycle"
                );
                return Ok(CycleOutcome::Skipped(SkipReason::InsufficientData));
            }
        }

        let frames = match self.enrich_all(&fast, &medium, &slow) {
            Ok(frames) => frames,
            Err(e @ IndicatorError::InsufficientData { .. }) => {
                warn!(error = %e, "Skipping cycle");
                return Ok(CycleOutcome::Skipped(SkipReason::InsufficientData));
            }
            Err(e) => {
                warn!(error = %e, "Skipping cycle");
                return Ok(CycleOutcome::Skipped(SkipReason::Indicators));
            }
        };

        self.record_history(&frames).await;

        let price = frames.price().unwrap_or_default();
        info!(
            symbol = %self.config.symbol,
            price = %format!("{:.4}", price),
            state = %machine.state(),
            "Cycle"
        );

        let Some(transition) =
            machine.evaluate(&frames, self.rules.as_ref(), &self.config.risk)
        else {
            return Ok(CycleOutcome::Held(machine.state()));
        };

        // Nothing is announced unless the new state is durable
        self.store.save_position(&transition.record()).await?;
        machine.commit(&transition)?;

        info!(
            from = %transition.from,
            to = %transition.to,
            price = transition.price,
            rationale = %transition.rationale,
            "Position transition"
        );

        self.alerts
            .send_alert(&transition.message(&self.config.symbol), transition.category)
            .await;
        self.execute(&transition).await;

        Ok(CycleOutcome::Transitioned(transition))
    }

    /// Fetch and enrich once, then report price, RSI and the stored position
    ///
    /// Rules are not evaluated and nothing is persisted or alerted.
    pub async fn status(&self) -> Result<StatusSnapshot> {
        let record = self.store.load_position().await?;
        let [fast, medium, slow] = self.fetch_all().await?;
        let frames = self
            .enrich_all(&fast, &medium, &slow)
            .map_err(|e| MonitorError::InvalidSeries(e.to_string()))?;

        StatusSnapshot::from_frames(
            &self.config.symbol,
            &self.config.timeframes,
            &frames,
            record,
        )
        .ok_or_else(|| MonitorError::InvalidSeries("empty timeframe".to_string()))
    }

    async fn fetch_all(&self) -> Result<[CandleSeries; 3]> {
        let symbol = self.config.symbol.as_str();
        let limit = self.config.monitor.fetch_limit;
        let [fast_iv, medium_iv, slow_iv] =
            TimeframeRole::ALL.map(|role| self.config.timeframes.interval(role));

        let (fast, medium, slow) = join3(
            retry_with_backoff(self.retry, "fetch fast", || {
                self.source.fetch_candles(symbol, fast_iv, limit)
            }),
            retry_with_backoff(self.retry, "fetch medium", || {
                self.source.fetch_candles(symbol, medium_iv, limit)
            }),
            retry_with_backoff(self.retry, "fetch slow", || {
                self.source.fetch_candles(symbol, slow_iv, limit)
            }),
        )
        .await;

        Ok([fast?, medium?, slow?])
    }

    fn enrich_all(
        &self,
        fast: &CandleSeries,
        medium: &CandleSeries,
        slow: &CandleSeries,
    ) -> std::result::Result<TimeframeFrames, IndicatorError> {
        let params = &self.config.indicators;
        Ok(TimeframeFrames::new(
            enrich(fast, params)?,
            enrich(medium, params)?,
            enrich(slow, params)?,
        ))
    }

    async fn record_history(&self, frames: &TimeframeFrames) {
        let (Some(fast), Some(medium)) = (frames.fast.last(), frames.medium.last()) else {
            return;
        };
        let point = HistoryPoint {
            timestamp: fast.timestamp,
            price: fast.close,
            rsi: medium.rsi,
        };
        if let Err(e) = self.store.record_history(&point).await {
            warn!(error = %e, "Failed to record history");
        }
    }

    async fn execute(&self, transition: &Transition) {
        let mut intent = ExecutionIntent::from_transition(&self.config.symbol, transition);

        if transition.is_entry() {
            if let Some(balances) = &self.balances {
                let (_, quote) = self.config.assets();
                match balances.free_balance(quote).await {
                    Ok(balance) => {
                        if let Some(size) = self.sizer.size(balance, transition.price) {
                            debug!(%balance, notional = %size.notional, quantity = %size.quantity, "Sized entry");
                            intent = intent.with_quantity(size.quantity);
                        }
                    }
                    Err(e) => warn!(error = %e, asset = quote, "Balance unavailable, intent unsized"),
                }
            }
        }

        if let Err(e) = self.execution.execute(&intent).await {
            error!(error = %e, action = ?intent.action, "Execution failed");
        }
    }
}
