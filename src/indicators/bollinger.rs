/// Bollinger Bands columns; `None` marks the warm-up region or a zero-width band
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerColumns {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub percent: Vec<Option<f64>>,
}

/// Rolling SMA ± `num_std` population standard deviations (ddof = 0).
///
/// The first `length - 1` rows are undefined. `%B` is
/// `(close − lower) / (upper − lower)` and undefined when the band has
/// zero width.
pub fn bollinger(closes: &[f64], length: usize, num_std: f64) -> BollingerColumns {
    let n = closes.len();
    let mut cols = BollingerColumns {
        middle: vec![None; n],
        upper: vec![None; n],
        lower: vec![None; n],
        percent: vec![None; n],
    };
    if length == 0 {
        return cols;
    }

    for end in (length - 1)..n {
        let window = &closes[end + 1 - length..=end];
        let mean = window.iter().sum::<f64>() / length as f64;
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / length as f64;
        let std = variance.max(0.0).sqrt();

        let upper = mean + num_std * std;
        let lower = mean - num_std * std;

        cols.middle[end] = Some(mean);
        cols.upper[end] = Some(upper);
        cols.lower[end] = Some(lower);
        cols.percent[end] = if upper > lower {
            Some((closes[end] - lower) / (upper - lower))
        } else {
            None
        };
    }
    cols
}
