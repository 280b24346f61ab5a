//! Explicit missing-value arithmetic
//!
//! Gridded observation products mark unobserved cells with a fill value.
//! Instead of carrying a sentinel float through every computation, `Mv` wraps
//! `Option<f64>` and propagates "unset" through arithmetic, so a missing cell
//! stays missing no matter what is added to or multiplied into it.

use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// A scalar value that may be missing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mv(pub Option<f64>);

impl Mv {
    /// The missing value
    pub const NONE: Mv = Mv(None);

    /// Wrap a present value
    #[must_use]
    pub const fn some(v: f64) -> Self {
        Mv(Some(v))
    }

    /// True if the value is unset
    #[must_use]
    pub const fn is_missing(self) -> bool {
        self.0.is_none()
    }

    /// The inner value, if present
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        self.0
    }

    /// The inner value, or the given default when missing
    #[must_use]
    pub fn unwrap_or(self, default: f64) -> f64 {
        self.0.unwrap_or(default)
    }

    /// Apply a function to the value, keeping missing as missing
    #[must_use]
    pub fn map<F: FnOnce(f64) -> f64>(self, f: F) -> Self {
        Mv(self.0.map(f))
    }
}

impl From<f64> for Mv {
    /// Non-finite floats (NaN from fill values, infinities) become missing
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Mv(Some(v))
        } else {
            Mv(None)
        }
    }
}

impl Add for Mv {
    type Output = Mv;
    fn add(self, rhs: Mv) -> Mv {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Mv(Some(a + b)),
            _ => Mv(None),
        }
    }
}

impl Sub for Mv {
    type Output = Mv;
    fn sub(self, rhs: Mv) -> Mv {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Mv(Some(a - b)),
            _ => Mv(None),
        }
    }
}

impl Mul for Mv {
    type Output = Mv;
    fn mul(self, rhs: Mv) -> Mv {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Mv(Some(a * b)),
            _ => Mv(None),
        }
    }
}

impl Div for Mv {
    type Output = Mv;
    fn div(self, rhs: Mv) -> Mv {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) if b != 0.0 => Mv(Some(a / b)),
            _ => Mv(None),
        }
    }
}

impl AddAssign for Mv {
    fn add_assign(&mut self, rhs: Mv) {
        *self = *self + rhs;
    }
}

/// Sum of the present values in an iterator
///
/// Missing elements are skipped, matching the missing-value convention of the
/// upstream data format: the sum is missing only when no element is present.
pub fn masked_sum<I: IntoIterator<Item = Mv>>(values: I) -> Mv {
    let mut sum = 0.0_f64;
    let mut count = 0_usize;
    for v in values {
        if let Some(x) = v.value() {
            sum += x;
            count += 1;
        }
    }
    if count > 0 {
        Mv::some(sum)
    } else {
        Mv::NONE
    }
}

/// Weighted mean of the present values in an iterator of (value, weight)
///
/// Missing elements drop out of both numerator and denominator.
pub fn masked_weighted_mean<I: IntoIterator<Item = (Mv, f64)>>(values: I) -> Mv {
    let mut num = 0.0_f64;
    let mut den = 0.0_f64;
    for (v, w) in values {
        if let Some(x) = v.value() {
            num += x * w;
            den += w;
        }
    }
    if den > 0.0 {
        Mv::some(num / den)
    } else {
        Mv::NONE
    }
}

/// Mean and sample standard deviation of the present values
///
/// Returns `(mean, stddev)`. The mean needs at least one present value, the
/// sample standard deviation at least two; otherwise the respective entry is
/// missing.
pub fn masked_mean_stddev<I: IntoIterator<Item = Mv>>(values: I) -> (Mv, Mv) {
    let present: Vec<f64> = values.into_iter().filter_map(Mv::value).collect();
    if present.is_empty() {
        return (Mv::NONE, Mv::NONE);
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    if present.len() < 2 {
        return (Mv::some(mean), Mv::NONE);
    }
    let var = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (Mv::some(mean), Mv::some(var.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_propagates_missing() {
        let a = Mv::some(2.0);
        let b = Mv::NONE;
        assert!((a + b).is_missing());
        assert!((a - b).is_missing());
        assert!((a * b).is_missing());
        assert!((b / a).is_missing());
        assert_eq!((a + Mv::some(3.0)).value(), Some(5.0));
        assert_eq!((a * Mv::some(3.0)).value(), Some(6.0));
    }

    #[test]
    fn non_finite_becomes_missing() {
        assert!(Mv::from(f64::NAN).is_missing());
        assert!(Mv::from(f64::INFINITY).is_missing());
        assert_eq!(Mv::from(1.5).value(), Some(1.5));
    }

    #[test]
    fn masked_sum_skips_missing() {
        let sum = masked_sum([Mv::some(1.0), Mv::NONE, Mv::some(2.0)]);
        assert_eq!(sum.value(), Some(3.0));
        assert!(masked_sum([Mv::NONE, Mv::NONE]).is_missing());
    }

    #[test]
    fn weighted_mean_drops_missing_weights() {
        let mean = masked_weighted_mean([(Mv::some(1.0), 31.0), (Mv::NONE, 28.0), (Mv::some(3.0), 31.0)]);
        assert_eq!(mean.value(), Some(2.0));
    }

    #[test]
    fn mean_stddev_sample_formula() {
        let (mean, std) = masked_mean_stddev([Mv::some(1.0), Mv::some(3.0)]);
        assert_eq!(mean.value(), Some(2.0));
        // Sample standard deviation with n-1 in the denominator
        assert!((std.unwrap_or(0.0) - (2.0_f64).sqrt()).abs() < 1e-12);

        let (mean1, std1) = masked_mean_stddev([Mv::some(4.0)]);
        assert_eq!(mean1.value(), Some(4.0));
        assert!(std1.is_missing());
    }
}
