use crate::config::types::RsiSmoothing;

/// Relative strength index of a close column.
///
/// Gains and losses are the positive and negative parts of the bar-to-bar
/// change. With [`RsiSmoothing::Simple`] both are averaged with a rolling
/// mean over `length` changes; with [`RsiSmoothing::Wilder`] the first
/// average is the same mean and later ones follow
/// `avg = (avg·(length−1) + x) / length`.
///
/// The first `length` rows are undefined, as is any row whose average loss
/// is zero.
pub fn rsi(closes: &[f64], length: usize, smoothing: RsiSmoothing) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if length == 0 || n <= length {
        return out;
    }

    // changes[i] is close[i] - close[i-1]; index 0 has no change
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let len = length as f64;
    let mut avg_gain = gains[1..=length].iter().sum::<f64>() / len;
    let mut avg_loss = losses[1..=length].iter().sum::<f64>() / len;
    out[length] = value(avg_gain, avg_loss);

    for i in (length + 1)..n {
        match smoothing {
            RsiSmoothing::Simple => {
                let window = i + 1 - length..=i;
                avg_gain = gains[window.clone()].iter().sum::<f64>() / len;
                avg_loss = losses[window].iter().sum::<f64>() / len;
            }
            RsiSmoothing::Wilder => {
                avg_gain = (avg_gain * (len - 1.0) + gains[i]) / len;
                avg_loss = (avg_loss * (len - 1.0) + losses[i]) / len;
            }
        }
        out[i] = value(avg_gain, avg_loss);
    }
    out
}

fn value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss <= 0.0 {
        return None;
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
