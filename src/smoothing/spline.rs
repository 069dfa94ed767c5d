//! Penalized natural cubic smoothing spline on ordinal positions.
//!
//! Implements the Reinsch formulation: for observations `y` at unit-spaced
//! positions 0..n-1, the fitted curve minimizes
//! `sum (y_i - g_i)^2 + lambda * integral g''^2`. The solution is obtained
//! from the banded symmetric positive-definite system
//! `(R + lambda * Q'Q) gamma = Q'y`, then `g = y - lambda * Q gamma`.
//!
//! Fitting always happens over ordinal positions, never raw dates: date
//! differences would violate the solver's strictly-increasing-spacing
//! assumption, and the result is re-indexed onto the original dates by the
//! caller. With unit spacing the matrix bands are constant:
//! `R` is tridiagonal (2/3 on the diagonal, 1/6 off) and `Q'Q` is
//! pentadiagonal (6, -4, 1).

/// Map an R-style smoothing parameter (`spar`) to the penalty `lambda`.
///
/// `lambda = n * 256^(3*spar - 1)`: monotone in `spar`, so higher values
/// always smooth harder, and scaled by the series length so a given `spar`
/// behaves comparably across short and long series. Follows the shape of
/// R's `smooth.spline` parameterization; not a bit-for-bit port.
pub fn lambda_for_spar(n: usize, spar: f64) -> f64 {
    n as f64 * 256f64.powf(3.0 * spar - 1.0)
}

/// Range searched when no smoothing parameter is supplied.
pub const AUTO_SPAR_RANGE: (f64, f64) = (-1.5, 1.5);

/// Fit the penalized spline and return the fitted values at each position.
///
/// Series of fewer than three points have no interior curvature to
/// penalize and are returned unchanged.
pub fn fit_penalized(values: &[f64], lambda: f64) -> Vec<f64> {
    let n = values.len();
    if n < 3 || lambda <= 0.0 {
        return values.to_vec();
    }
    let gamma = solve_gamma(values, lambda);
    fitted_from_gamma(values, lambda, &gamma)
}

/// Select `spar` by generalized cross-validation.
///
/// Minimizes `GCV(lambda) = (RSS/n) / (1 - tr(A)/n)^2` over
/// [`AUTO_SPAR_RANGE`] with a golden-section search. Deterministic for a
/// given input.
pub fn select_spar(values: &[f64]) -> f64 {
    let (mut lo, mut hi) = AUTO_SPAR_RANGE;
    let n = values.len();
    if n < 4 {
        return lo;
    }
    let phi = (5f64.sqrt() - 1.0) / 2.0;
    let score = |spar: f64| gcv_score(values, lambda_for_spar(n, spar));

    let mut a = hi - phi * (hi - lo);
    let mut b = lo + phi * (hi - lo);
    let mut fa = score(a);
    let mut fb = score(b);
    for _ in 0..48 {
        if fa < fb {
            hi = b;
            b = a;
            fb = fa;
            a = hi - phi * (hi - lo);
            fa = score(a);
        } else {
            lo = a;
            a = b;
            fa = fb;
            b = lo + phi * (hi - lo);
            fb = score(b);
        }
    }
    (lo + hi) / 2.0
}

/// GCV objective for a fixed penalty.
pub fn gcv_score(values: &[f64], lambda: f64) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::INFINITY;
    }
    let gamma = solve_gamma(values, lambda);
    let fitted = fitted_from_gamma(values, lambda, &gamma);
    let rss: f64 = values
        .iter()
        .zip(&fitted)
        .map(|(y, g)| (y - g) * (y - g))
        .sum();
    let trace = hat_trace(n, lambda);
    let denom = 1.0 - trace / n as f64;
    if denom <= 0.0 {
        return f64::INFINITY;
    }
    (rss / n as f64) / (denom * denom)
}

/// Solve `(R + lambda Q'Q) gamma = Q'y` for the interior curvatures.
fn solve_gamma(values: &[f64], lambda: f64) -> Vec<f64> {
    let n = values.len();
    let m = n - 2;
    let rhs: Vec<f64> = (0..m)
        .map(|j| values[j] - 2.0 * values[j + 1] + values[j + 2])
        .collect();
    let bands = PentaBands::reinsch(m, lambda);
    bands.solve(&rhs)
}

/// Recover fitted values: `g = y - lambda * Q gamma`.
fn fitted_from_gamma(values: &[f64], lambda: f64, gamma: &[f64]) -> Vec<f64> {
    let n = values.len();
    let g_ext = |i: isize| -> f64 {
        if i < 0 || i as usize >= gamma.len() {
            0.0
        } else {
            gamma[i as usize]
        }
    };
    (0..n)
        .map(|i| {
            let i = i as isize;
            values[i as usize] - lambda * (g_ext(i) - 2.0 * g_ext(i - 1) + g_ext(i - 2))
        })
        .collect()
}

/// Trace of the smoother (hat) matrix `A = I - lambda Q M^-1 Q'`.
///
/// Computed as `n - lambda * tr(M^-1 Q'Q)` by solving one banded system
/// per column of `Q'Q`. O(n^2), which is acceptable here: series are a few
/// hundred points and the primitive's contract is correctness over speed.
fn hat_trace(n: usize, lambda: f64) -> f64 {
    let m = n - 2;
    let bands = PentaBands::reinsch(m, lambda);
    let mut trace_mb = 0.0;
    let mut rhs = vec![0.0; m];
    for j in 0..m {
        for slot in rhs.iter_mut() {
            *slot = 0.0;
        }
        // Column j of Q'Q: (1, -4, 6, -4, 1) centered on j, clipped.
        if j >= 2 {
            rhs[j - 2] = 1.0;
        }
        if j >= 1 {
            rhs[j - 1] = -4.0;
        }
        rhs[j] = 6.0;
        if j + 1 < m {
            rhs[j + 1] = -4.0;
        }
        if j + 2 < m {
            rhs[j + 2] = 1.0;
        }
        let z = bands.solve(&rhs);
        trace_mb += z[j];
    }
    n as f64 - lambda * trace_mb
}

/// LDL' factorization of the symmetric pentadiagonal Reinsch matrix.
struct PentaBands {
    d: Vec<f64>,
    l1: Vec<f64>,
    l2: Vec<f64>,
}

impl PentaBands {
    /// Factor `M = R + lambda Q'Q` for `m` interior points, unit spacing.
    fn reinsch(m: usize, lambda: f64) -> Self {
        let a = 2.0 / 3.0 + 6.0 * lambda; // diagonal
        let b = 1.0 / 6.0 - 4.0 * lambda; // first off-diagonal
        let c = lambda; // second off-diagonal

        let mut d = vec![0.0; m];
        let mut l1 = vec![0.0; m];
        let mut l2 = vec![0.0; m];
        for i in 0..m {
            let e2 = if i >= 2 { c / d[i - 2] } else { 0.0 };
            let e1 = if i >= 1 {
                let num = if i >= 2 { b - e2 * l1[i - 1] * d[i - 2] } else { b };
                num / d[i - 1]
            } else {
                0.0
            };
            let mut di = a;
            if i >= 1 {
                di -= e1 * e1 * d[i - 1];
            }
            if i >= 2 {
                di -= e2 * e2 * d[i - 2];
            }
            d[i] = di;
            l1[i] = e1;
            l2[i] = e2;
        }
        Self { d, l1, l2 }
    }

    /// Solve `M x = rhs` via forward/back substitution.
    fn solve(&self, rhs: &[f64]) -> Vec<f64> {
        let m = rhs.len();
        let mut x = vec![0.0; m];
        // L z = rhs
        for i in 0..m {
            let mut z = rhs[i];
            if i >= 1 {
                z -= self.l1[i] * x[i - 1];
            }
            if i >= 2 {
                z -= self.l2[i] * x[i - 2];
            }
            x[i] = z;
        }
        // D w = z
        for i in 0..m {
            x[i] /= self.d[i];
        }
        // L' out = w
        for i in (0..m).rev() {
            if i + 1 < m {
                x[i] -= self.l1[i + 1] * x[i + 1];
            }
            if i + 2 < m {
                x[i] -= self.l2[i + 2] * x[i + 2];
            }
        }
        x
    }
}
