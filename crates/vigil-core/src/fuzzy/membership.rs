//! Triangular membership functions.

use serde::{Deserialize, Serialize};

/// A triangular membership function `(a, b, c)` with `a <= b <= c`.
///
/// Membership is 0 outside `[a, c]`, peaks at 1 at `b`, and rises/falls
/// linearly in between. When `a == b` the left side is a shoulder (full
/// membership at the lower edge); when `b == c` the right side is one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Lower bound of the support.
    pub a: f64,
    /// Peak.
    pub b: f64,
    /// Upper bound of the support.
    pub c: f64,
}

impl Triangle {
    /// Creates a triangle, ordering the points if needed so `a <= b <= c`.
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        let mut points = [a, b, c];
        points.sort_by(|x, y| x.partial_cmp(y).expect("membership points are finite"));
        Self {
            a: points[0],
            b: points[1],
            c: points[2],
        }
    }

    /// Membership degree of `x` in this fuzzy set, in `[0, 1]`.
    pub fn membership(&self, x: f64) -> f64 {
        if x < self.a || x > self.c {
            return 0.0;
        }
        if x == self.b {
            return 1.0;
        }
        if x < self.b {
            if self.b == self.a {
                1.0
            } else {
                (x - self.a) / (self.b - self.a)
            }
        } else if self.c == self.b {
            1.0
        } else {
            (self.c - x) / (self.c - self.b)
        }
    }
}
