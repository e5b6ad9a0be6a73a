use crate::error::{ResampleError, Result};

/// Value at `t` of the line through `(t1, s1)` and `(t2, s2)`.
///
/// Returns `Ok(None)` when `t` lies outside `[t1, t2]` or either endpoint is
/// missing. Equal bracket timestamps have no defined slope and are an error.
pub fn interpolate(
    t1: i64,
    s1: Option<f64>,
    t2: i64,
    s2: Option<f64>,
    t: f64,
) -> Result<Option<f64>> {
    if t1 == t2 {
        return Err(ResampleError::DegenerateBracket(t1));
    }

    let (s1, s2) = match (s1, s2) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok(None),
    };

    let (t1, t2) = (t1 as f64, t2 as f64);
    if t < t1 || t > t2 {
        return Ok(None);
    }

    // Offset from t1 so epoch-millisecond timestamps keep their precision.
    let m = (s2 - s1) / (t2 - t1);
    Ok(Some(s1 + m * (t - t1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_of_rising_line() {
        let v = interpolate(0, Some(0.0), 100, Some(10.0), 50.0).unwrap();
        assert_eq!(v, Some(5.0));
    }

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(
            interpolate(10, Some(3.0), 20, Some(7.0), 10.0).unwrap(),
            Some(3.0)
        );
        assert_eq!(
            interpolate(10, Some(3.0), 20, Some(7.0), 20.0).unwrap(),
            Some(7.0)
        );
    }

    #[test]
    fn fractional_target_between_irregular_samples() {
        let v = interpolate(48, Some(5.0), 75, Some(9.0), 50.0)
            .unwrap()
            .unwrap();
        assert!((v - 5.296_296).abs() < 1e-5);
    }

    #[test]
    fn epoch_scale_timestamps_keep_precision() {
        let base = 1_500_000_000_000;
        let v = interpolate(base - 1, Some(100.0), base + 47, Some(103.0), base as f64)
            .unwrap()
            .unwrap();
        assert!((v - (100.0 + 3.0 / 48.0)).abs() < 1e-9);
    }

    #[test]
    fn outside_bracket_is_missing() {
        assert_eq!(interpolate(0, Some(0.0), 10, Some(1.0), -1.0).unwrap(), None);
        assert_eq!(interpolate(0, Some(0.0), 10, Some(1.0), 10.5).unwrap(), None);
    }

    #[test]
    fn missing_endpoint_is_missing() {
        assert_eq!(interpolate(0, None, 10, Some(1.0), 5.0).unwrap(), None);
        assert_eq!(interpolate(0, Some(1.0), 10, None, 5.0).unwrap(), None);
    }

    #[test]
    fn equal_timestamps_fail() {
        assert_eq!(
            interpolate(42, Some(1.0), 42, Some(2.0), 42.0),
            Err(ResampleError::DegenerateBracket(42))
        );
    }
}
