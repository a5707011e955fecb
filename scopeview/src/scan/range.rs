//! Evenly spaced axis positions.

use serde::Serialize;

use crate::scan::{ScanError, ScanResult};

/// Tolerance when deciding whether `stop` lands on a step boundary.
const STEP_EPSILON: f64 = 1e-9;

/// Largest number of points allowed along one axis.
pub const MAX_AXIS_POINTS: usize = 100_000;

/// `num` evenly spaced positions from `start` toward `stop`.
///
/// `stop` is included when it lies on a whole number of steps from
/// `start`. A descending range (`stop < start`) steps downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearRange {
    pub start: f64,
    pub stop: f64,
    /// Distance between neighboring positions (always positive).
    pub step: f64,
    pub num: usize,
}

impl LinearRange {
    /// Range with a fixed step; `num = floor(|stop - start| / step) + 1`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::NonFinite`, `ScanError::InvalidStep`, or
    /// `ScanError::TooManyPoints` beyond [`MAX_AXIS_POINTS`].
    pub fn from_step(start: f64, stop: f64, step: f64) -> ScanResult<Self> {
        if !start.is_finite() || !stop.is_finite() || !step.is_finite() {
            return Err(ScanError::NonFinite { start, stop, step });
        }
        if step <= 0.0 {
            return Err(ScanError::InvalidStep(step));
        }
        let steps = ((stop - start).abs() / step + STEP_EPSILON).floor();
        if !steps.is_finite() || steps >= MAX_AXIS_POINTS as f64 {
            return Err(ScanError::TooManyPoints {
                points: steps + 1.0,
                max: MAX_AXIS_POINTS,
            });
        }
        Ok(Self {
            start,
            stop,
            step,
            num: steps as usize + 1,
        })
    }

    /// Range of exactly `num` points spanning `start..=stop`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::EmptyRange` for `num == 0`,
    /// `ScanError::TooManyPoints` or `ScanError::NonFinite`.
    pub fn from_num(start: f64, stop: f64, num: usize) -> ScanResult<Self> {
        if num == 0 {
            return Err(ScanError::EmptyRange);
        }
        if num > MAX_AXIS_POINTS {
            return Err(ScanError::TooManyPoints {
                points: num as f64,
                max: MAX_AXIS_POINTS,
            });
        }
        if !start.is_finite() || !stop.is_finite() {
            return Err(ScanError::NonFinite {
                start,
                stop,
                step: f64::NAN,
            });
        }
        let step = if num > 1 {
            (stop - start).abs() / (num - 1) as f64
        } else {
            0.0
        };
        Ok(Self { start, stop, step, num })
    }

    /// Position of point `index`.
    pub fn at(&self, index: usize) -> f64 {
        let direction = if self.stop < self.start { -1.0 } else { 1.0 };
        self.start + direction * self.step * index as f64
    }

    /// All positions.
    pub fn array(&self) -> Vec<f64> {
        (0..self.num).map(|i| self.at(i)).collect()
    }

    pub fn first(&self) -> f64 {
        self.start
    }

    pub fn last(&self) -> f64 {
        self.at(self.num.saturating_sub(1))
    }

    pub fn len(&self) -> usize {
        self.num
    }

    pub fn is_empty(&self) -> bool {
        self.num == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_axis() {
        let range = LinearRange::from_step(25.0, 45.0, 1.0).unwrap();
        assert_eq!(range.num, 21);
        assert_eq!(range.first(), 25.0);
        assert_eq!(range.last(), 45.0);
    }

    #[test]
    fn test_stop_not_on_step_is_excluded() {
        let range = LinearRange::from_step(0.0, 1.0, 0.3).unwrap();
        assert_eq!(range.num, 4);
        assert!((range.last() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_float_step_hits_endpoint() {
        // 0.1 is not exact in binary; the endpoint must still be included
        let range = LinearRange::from_step(0.0, 1.0, 0.1).unwrap();
        assert_eq!(range.num, 11);
    }

    #[test]
    fn test_descending_range() {
        let range = LinearRange::from_step(10.0, 7.0, 1.0).unwrap();
        assert_eq!(range.array(), vec![10.0, 9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_from_num() {
        let range = LinearRange::from_num(0.0, 10.0, 5).unwrap();
        assert_eq!(range.step, 2.5);
        assert_eq!(range.array(), vec![0.0, 2.5, 5.0, 7.5, 10.0]);

        let single = LinearRange::from_num(3.0, 9.0, 1).unwrap();
        assert_eq!(single.array(), vec![3.0]);
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!(LinearRange::from_step(0.0, 1.0, 0.0), Err(ScanError::InvalidStep(0.0)));
        assert!(matches!(
            LinearRange::from_step(f64::NAN, 1.0, 1.0),
            Err(ScanError::NonFinite { .. })
        ));
        assert_eq!(LinearRange::from_num(0.0, 1.0, 0), Err(ScanError::EmptyRange));
    }

    #[test]
    fn test_oversized_ranges_are_rejected() {
        assert!(matches!(
            LinearRange::from_step(0.0, 1e300, 1e-300),
            Err(ScanError::TooManyPoints { max: MAX_AXIS_POINTS, .. })
        ));
        // Span overflows to infinity
        assert!(matches!(
            LinearRange::from_step(-1.5e308, 1.5e308, 1.0),
            Err(ScanError::TooManyPoints { .. })
        ));
        assert!(matches!(
            LinearRange::from_num(0.0, 1.0, MAX_AXIS_POINTS + 1),
            Err(ScanError::TooManyPoints { .. })
        ));

        let widest = LinearRange::from_step(0.0, (MAX_AXIS_POINTS - 1) as f64, 1.0).unwrap();
        assert_eq!(widest.num, MAX_AXIS_POINTS);
    }

    proptest! {
        #[test]
        fn prop_positions_stay_within_bounds(
            start in -100.0f64..100.0,
            span in 0.0f64..100.0,
            step in 0.01f64..10.0,
        ) {
            let range = LinearRange::from_step(start, start + span, step).unwrap();
            prop_assert!(range.num >= 1);
            for v in range.array() {
                prop_assert!(v >= start - 1e-9 && v <= start + span + 1e-6);
            }
        }
    }
}
