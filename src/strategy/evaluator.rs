//! Multi-timeframe trend-channel rules
//!
//! Long entries walk an ordered filter chain; the first filter that fails
//! names the rejection. Short entries mirror it. Exits look at the medium
//! timeframe only.

use crate::common::types::TimeframeRole;
use crate::config::types::RuleConfig;
use crate::indicators::{IndicatorFrame, IndicatorRow};
use crate::strategy::traits::SignalRules;
use crate::strategy::types::{SignalDecision, TimeframeFrames};

/// Slow close above the long EMA with a non-negative MACD histogram
pub fn is_uptrend(slow: &IndicatorFrame) -> bool {
    if slow.len() < 2 {
        return false;
    }
    slow.last()
        .map(|r| r.close > r.ema_long && r.macd_hist >= 0.0)
        .unwrap_or(false)
}

/// Slow close below the long EMA with a non-positive MACD histogram
pub fn is_downtrend(slow: &IndicatorFrame) -> bool {
    if slow.len() < 2 {
        return false;
    }
    slow.last()
        .map(|r| r.close < r.ema_long && r.macd_hist <= 0.0)
        .unwrap_or(false)
}

pub fn check_long_entry(
    fast: &IndicatorFrame,
    medium: &IndicatorFrame,
    slow: &IndicatorFrame,
    rules: &RuleConfig,
) -> SignalDecision {
    into_decision(long_entry(fast, medium, slow, rules))
}

pub fn check_short_entry(
    fast: &IndicatorFrame,
    medium: &IndicatorFrame,
    slow: &IndicatorFrame,
    rules: &RuleConfig,
) -> SignalDecision {
    into_decision(short_entry(fast, medium, slow, rules))
}

/// Close above the upper band, or the MACD histogram turned down
pub fn check_long_exit(medium: &IndicatorFrame, _rules: &RuleConfig) -> SignalDecision {
    let Some(last) = medium.last() else {
        return SignalDecision::rejected(insufficient(TimeframeRole::Medium));
    };
    if last.close > last.bbu {
        return SignalDecision::triggered(format!(
            "target reached: close {:.4} above upper band {:.4}",
            last.close, last.bbu
        ));
    }
    if let Some((h2, h1)) = last_two_hist(medium) {
        if h1 < h2 {
            return SignalDecision::triggered(format!(
                "momentum fading: MACD histogram fell from {:.5} to {:.5}",
                h2, h1
            ));
        }
    }
    SignalDecision::rejected("hold long")
}

/// Close below the lower band, or the MACD histogram turned up
pub fn check_short_exit(medium: &IndicatorFrame, _rules: &RuleConfig) -> SignalDecision {
    let Some(last) = medium.last() else {
        return SignalDecision::rejected(insufficient(TimeframeRole::Medium));
    };
    if last.close < last.bbl {
        return SignalDecision::triggered(format!(
            "target reached: close {:.4} below lower band {:.4}",
            last.close, last.bbl
        ));
    }
    if let Some((h2, h1)) = last_two_hist(medium) {
        if h1 > h2 {
            return SignalDecision::triggered(format!(
                "momentum fading: MACD histogram rose from {:.5} to {:.5}",
                h2, h1
            ));
        }
    }
    SignalDecision::rejected("hold short")
}

fn long_entry(
    fast: &IndicatorFrame,
    medium: &IndicatorFrame,
    slow: &IndicatorFrame,
    rules: &RuleConfig,
) -> Result<String, String> {
    if !is_uptrend(slow) {
        return Err("no uptrend on slow timeframe".to_string());
    }

    let m = latest(medium, TimeframeRole::Medium)?;
    if m.close < m.ema_short {
        return Err(format!(
            "close {:.4} below EMA_short {:.4} on medium",
            m.close, m.ema_short
        ));
    }

    if m.rsi < rules.rsi_oversold {
        return Err(format!(
            "RSI {:.1} below floor {:.1}",
            m.rsi, rules.rsi_oversold
        ));
    }

    let f = latest(fast, TimeframeRole::Fast)?;
    check_timing(f, rules)?;
    check_volume(fast, rules)?;

    if m.bbp > rules.upper_band_guard {
        return Err(format!("%B {:.2} too close to upper band", m.bbp));
    }

    Ok(format!("LONG {:.4} | RSI:{:.1}", f.close, m.rsi))
}

fn short_entry(
    fast: &IndicatorFrame,
    medium: &IndicatorFrame,
    slow: &IndicatorFrame,
    rules: &RuleConfig,
) -> Result<String, String> {
    if !is_downtrend(slow) {
        return Err("no downtrend on slow timeframe".to_string());
    }

    let m = latest(medium, TimeframeRole::Medium)?;
    if m.close > m.ema_short {
        return Err(format!(
            "close {:.4} above EMA_short {:.4} on medium",
            m.close, m.ema_short
        ));
    }

    if m.rsi > rules.rsi_overbought {
        return Err(format!(
            "RSI {:.1} above ceiling {:.1}",
            m.rsi, rules.rsi_overbought
        ));
    }

    let f = latest(fast, TimeframeRole::Fast)?;
    check_timing(f, rules)?;
    check_volume(fast, rules)?;

    if m.bbp < rules.lower_band_guard {
        return Err(format!("%B {:.2} too close to lower band", m.bbp));
    }

    Ok(format!("SHORT {:.4} | RSI:{:.1}", f.close, m.rsi))
}

/// Fast close must sit within the tolerance band around EMA_short
fn check_timing(fast: &IndicatorRow, rules: &RuleConfig) -> Result<(), String> {
    let tolerance = fast.ema_short.abs() * rules.entry_tolerance_pct / 100.0;
    if (fast.close - fast.ema_short).abs() > tolerance {
        return Err(format!(
            "price {:.4} too far from EMA_short {:.4} on fast",
            fast.close, fast.ema_short
        ));
    }
    Ok(())
}

/// Trailing fast volumes must be rising
fn check_volume(fast: &IndicatorFrame, rules: &RuleConfig) -> Result<(), String> {
    let Some(volumes) = fast.last_volumes(rules.volume_lookback) else {
        return Err("volume: not enough fast bars".to_string());
    };
    let rising = volumes.windows(2).all(|w| {
        if rules.volume_allow_ties {
            w[0] <= w[1]
        } else {
            w[0] < w[1]
        }
    });
    if !rising {
        return Err(format!("volume not rising on fast {:?}", volumes));
    }
    Ok(())
}

fn latest(frame: &IndicatorFrame, role: TimeframeRole) -> Result<&IndicatorRow, String> {
    frame.last().ok_or_else(|| insufficient(role))
}

fn insufficient(role: TimeframeRole) -> String {
    format!("no bars on {} timeframe", role)
}

/// Previous and latest histogram values, once at least three bars exist
fn last_two_hist(frame: &IndicatorFrame) -> Option<(f64, f64)> {
    if frame.len() < 3 {
        return None;
    }
    Some((frame.from_end(1)?.macd_hist, frame.from_end(0)?.macd_hist))
}

fn into_decision(result: Result<String, String>) -> SignalDecision {
    match result {
        Ok(reason) => SignalDecision::triggered(reason),
        Err(reason) => SignalDecision::rejected(reason),
    }
}

/// EMA channel entries confirmed across three timeframes
#[derive(Debug, Clone, Default)]
pub struct TrendChannelRules {
    config: RuleConfig,
}

impl TrendChannelRules {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }
}

impl SignalRules for TrendChannelRules {
    fn name(&self) -> &str {
        "trend_channel"
    }

    fn check_long_entry(&self, frames: &TimeframeFrames) -> SignalDecision {
        check_long_entry(&frames.fast, &frames.medium, &frames.slow, &self.config)
    }

    fn check_short_entry(&self, frames: &TimeframeFrames) -> SignalDecision {
        check_short_entry(&frames.fast, &frames.medium, &frames.slow, &self.config)
    }

    fn check_long_exit(&self, frames: &TimeframeFrames) -> SignalDecision {
        check_long_exit(&frames.medium, &self.config)
    }

    fn check_short_exit(&self, frames: &TimeframeFrames) -> SignalDecision {
        check_short_exit(&frames.medium, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Candle;
    use chrono::{TimeZone, Utc};

    fn row(i: i64, close: f64) -> IndicatorRow {
        let ts = Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap();
        IndicatorRow::neutral(&Candle::new(ts, close, close, close, close, 1.0))
    }

    fn frame(rows: Vec<IndicatorRow>) -> IndicatorFrame {
        IndicatorFrame::from_rows(rows)
    }

    fn slow_trend(close: f64, ema_long: f64, hist: f64) -> IndicatorFrame {
        let mut last = row(1, close);
        last.ema_long = ema_long;
        last.macd_hist = hist;
        frame(vec![row(0, close), last])
    }

    fn medium(close: f64, ema_short: f64, rsi: f64, bbp: f64) -> IndicatorFrame {
        let mut last = row(2, close);
        last.ema_short = ema_short;
        last.rsi = rsi;
        last.bbp = bbp;
        last.bbu = close + 5.0;
        last.bbl = close - 5.0;
        frame(vec![row(0, close), row(1, close), last])
    }

    fn fast(close: f64, ema_short: f64, volumes: [f64; 3]) -> IndicatorFrame {
        let rows = volumes
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut r = row(i as i64, close);
                r.ema_short = ema_short;
                r.volume = *v;
                r
            })
            .collect();
        frame(rows)
    }

    fn hist_frame(hists: [f64; 3]) -> IndicatorFrame {
        let rows = hists
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let mut r = row(i as i64, 100.0);
                r.bbu = 105.0;
                r.bbl = 95.0;
                r.macd_hist = *h;
                r
            })
            .collect();
        frame(rows)
    }

    #[test]
    fn test_trend_predicates() {
        assert!(is_uptrend(&slow_trend(110.0, 100.0, 0.0)));
        assert!(!is_uptrend(&slow_trend(110.0, 100.0, -0.1)));
        assert!(is_downtrend(&slow_trend(90.0, 100.0, 0.0)));
        assert!(!is_downtrend(&slow_trend(110.0, 100.0, -1.0)));
        assert!(!is_uptrend(&frame(vec![row(0, 200.0)])));
    }

    #[test]
    fn test_long_entry_fires_when_all_filters_pass() {
        let decision = check_long_entry(
            &fast(100.0, 100.05, [10.0, 20.0, 30.0]),
            &medium(100.0, 99.0, 50.0, 0.5),
            &slow_trend(110.0, 100.0, 0.5),
            &RuleConfig::default(),
        );
        assert!(decision.is_triggered, "{}", decision.rationale);
        assert_eq!(decision.rationale, "LONG 100.0000 | RSI:50.0");
    }

    #[test]
    fn test_first_failing_filter_names_rejection() {
        let rules = RuleConfig::default();
        let cases = [
            (slow_trend(90.0, 100.0, 0.5), medium(100.0, 99.0, 50.0, 0.5), fast(100.0, 100.0, [1.0, 2.0, 3.0]), "uptrend"),
            (slow_trend(110.0, 100.0, 0.5), medium(98.0, 99.0, 20.0, 0.99), fast(100.0, 100.0, [1.0, 2.0, 3.0]), "below EMA_short"),
            (slow_trend(110.0, 100.0, 0.5), medium(100.0, 99.0, 20.0, 0.99), fast(100.0, 100.0, [1.0, 2.0, 3.0]), "RSI 20.0"),
            (slow_trend(110.0, 100.0, 0.5), medium(100.0, 99.0, 50.0, 0.99), fast(101.0, 100.0, [3.0, 2.0, 1.0]), "too far"),
            (slow_trend(110.0, 100.0, 0.5), medium(100.0, 99.0, 50.0, 0.99), fast(100.0, 100.0, [3.0, 2.0, 1.0]), "volume"),
            (slow_trend(110.0, 100.0, 0.5), medium(100.0, 99.0, 50.0, 0.99), fast(100.0, 100.0, [1.0, 2.0, 3.0]), "upper band"),
        ];
        for (slow, med, fst, expected) in cases {
            let decision = check_long_entry(&fst, &med, &slow, &rules);
            assert!(!decision.is_triggered);
            assert!(
                decision.rationale.contains(expected),
                "expected {:?} in {:?}",
                expected,
                decision.rationale
            );
        }
    }

    #[test]
    fn test_volume_ties_rejected_unless_allowed() {
        let mut rules = RuleConfig::default();
        let args = (
            fast(100.0, 100.0, [10.0, 10.0, 30.0]),
            medium(100.0, 99.0, 50.0, 0.5),
            slow_trend(110.0, 100.0, 0.5),
        );
        assert!(!check_long_entry(&args.0, &args.1, &args.2, &rules).is_triggered);
        rules.volume_allow_ties = true;
        assert!(check_long_entry(&args.0, &args.1, &args.2, &rules).is_triggered);
    }

    #[test]
    fn test_short_entry_mirror() {
        let rules = RuleConfig::default();
        let decision = check_short_entry(
            &fast(100.0, 99.95, [10.0, 20.0, 30.0]),
            &medium(100.0, 101.0, 50.0, 0.5),
            &slow_trend(90.0, 100.0, -0.5),
            &rules,
        );
        assert!(decision.is_triggered, "{}", decision.rationale);
        assert!(decision.rationale.starts_with("SHORT"));

        let guarded = check_short_entry(
            &fast(100.0, 99.95, [10.0, 20.0, 30.0]),
            &medium(100.0, 101.0, 50.0, 0.01),
            &slow_trend(90.0, 100.0, -0.5),
            &rules,
        );
        assert!(!guarded.is_triggered);
        assert!(guarded.rationale.contains("lower band"));

        let overbought = check_short_entry(
            &fast(100.0, 99.95, [10.0, 20.0, 30.0]),
            &medium(100.0, 101.0, 80.0, 0.5),
            &slow_trend(90.0, 100.0, -0.5),
            &rules,
        );
        assert!(overbought.rationale.contains("ceiling"));
    }

    #[test]
    fn test_long_exit_on_upper_band() {
        let mut m = hist_frame([0.1, 0.2, 0.3]);
        let mut rows = m.rows().to_vec();
        rows[2].close = 110.0;
        m = frame(rows);
        let decision = check_long_exit(&m, &RuleConfig::default());
        assert!(decision.is_triggered);
        assert!(decision.rationale.contains("upper band"));
    }

    #[test]
    fn test_long_exit_when_histogram_falls() {
        let rules = RuleConfig::default();
        assert!(check_long_exit(&hist_frame([0.1, 0.3, 0.2]), &rules).is_triggered);
        // already falling before the entry still exits
        let falling = check_long_exit(&hist_frame([0.4, 0.3, 0.2]), &rules);
        assert!(falling.is_triggered);
        assert!(falling.rationale.contains("momentum fading"));
        assert!(!check_long_exit(&hist_frame([0.1, 0.2, 0.3]), &rules).is_triggered);
        assert!(!check_long_exit(&hist_frame([0.3, 0.2, 0.2]), &rules).is_triggered);
    }

    #[test]
    fn test_histogram_exit_needs_three_bars() {
        let rows = hist_frame([0.4, 0.3, 0.2]).rows()[1..].to_vec();
        assert!(!check_long_exit(&frame(rows), &RuleConfig::default()).is_triggered);
    }

    #[test]
    fn test_short_exit_on_trough_or_lower_band() {
        let rules = RuleConfig::default();
        assert!(check_short_exit(&hist_frame([-0.1, -0.3, -0.2]), &rules).is_triggered);
        assert!(check_short_exit(&hist_frame([-0.4, -0.3, -0.2]), &rules).is_triggered);
        assert!(!check_short_exit(&hist_frame([-0.1, -0.2, -0.3]), &rules).is_triggered);

        let mut rows = hist_frame([-0.1, -0.2, -0.3]).rows().to_vec();
        rows[2].close = 90.0;
        let decision = check_short_exit(&frame(rows), &rules);
        assert!(decision.is_triggered);
        assert!(decision.rationale.contains("lower band"));
    }

    #[test]
    fn test_empty_frames_never_trigger() {
        let empty = IndicatorFrame::default();
        let rules = RuleConfig::default();
        assert!(!check_long_entry(&empty, &empty, &empty, &rules).is_triggered);
        assert!(!check_long_exit(&empty, &rules).is_triggered);
        assert!(!check_short_exit(&empty, &rules).is_triggered);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let rules = TrendChannelRules::new(RuleConfig::default());
        let frames = TimeframeFrames::new(
            fast(100.0, 100.05, [30.0, 20.0, 10.0]),
            medium(100.0, 99.0, 50.0, 0.5),
            slow_trend(110.0, 100.0, 0.5),
        );
        let first = rules.check_long_entry(&frames);
        let second = rules.check_long_entry(&frames);
        assert_eq!(first, second);
        assert_eq!(rules.check_short_entry(&frames), rules.check_short_entry(&frames));
    }
}
