use super::ema::ema;

/// MACD line, its signal line and the histogram between them
#[derive(Debug, Clone, PartialEq)]
pub struct MacdColumns {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub hist: Vec<f64>,
}

/// `MACD = EMA(fast) − EMA(slow)`, `signal = EMA(MACD, signal)`, `hist = MACD − signal`
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdColumns {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal);
    let hist = line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdColumns {
        macd: line,
        signal: signal_line,
        hist,
    }
}
