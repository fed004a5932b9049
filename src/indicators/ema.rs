/// Exponential moving average over a whole column.
///
/// `adjust=false` semantics: the first output equals the first input and
/// every later value is `α·x + (1−α)·prev` with `α = 2/(span+1)`. There is
/// no priming window, so every output is defined.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_matches_ewm_adjust_false() {
        // alpha = 2/(3+1) = 0.5
        let out = ema(&[10.0, 11.0, 12.0, 13.0], 3);
        let expected = [10.0, 10.5, 11.25, 12.125];
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_constant_series_is_fixed_point() {
        for span in [1, 6, 99] {
            let out = ema(&[42.5; 150], span);
            assert!(out.iter().all(|v| (*v - 42.5).abs() < 1e-9));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(ema(&[], 6).is_empty());
    }
}
