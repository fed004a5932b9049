/// Forward-fill then back-fill undefined entries in place.
///
/// Returns `false` when the column has no defined value at all, in which
/// case it is left untouched.
pub fn fill_gaps(column: &mut [Option<f64>]) -> bool {
    let Some(first_defined) = column.iter().position(Option::is_some) else {
        return false;
    };

    let mut last = None;
    for slot in column.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => *slot = last,
        }
    }

    let seed = column[first_defined];
    for slot in column[..first_defined].iter_mut() {
        *slot = seed;
    }
    true
}

/// Fill a column and unwrap it, `None` when nothing could be filled
pub fn filled(mut column: Vec<Option<f64>>) -> Option<Vec<f64>> {
    if !fill_gaps(&mut column) {
        return None;
    }
    column.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_then_backward() {
        let mut col = vec![None, None, Some(1.0), None, Some(3.0), None];
        assert!(fill_gaps(&mut col));
        assert_eq!(
            col,
            vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn test_all_undefined() {
        let mut col = vec![None; 4];
        assert!(!fill_gaps(&mut col));
        assert!(filled(col).is_none());
    }

    #[test]
    fn test_filled_unwraps() {
        assert_eq!(filled(vec![None, Some(2.0)]), Some(vec![2.0, 2.0]));
    }
}
