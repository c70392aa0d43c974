//! Least-squares polynomial fitting and the interactive log-quadratic fit overlay.
//!
//! The overlay fits `ln(y) = a·x² + b·x + c` through the user's control points
//! and draws `y = exp(a·x² + b·x + c)` across the visible range.

use crate::data::view::ViewRect;
use crate::error::FitError;

/// A polynomial fitted in centered/scaled coordinates `u = (x - center) / scale`.
///
/// Timestamps sit around `1.7e9`; raising them to the second power in the
/// normal equations would lose all precision, so the fit runs on `u` and only
/// [`raw_coefficients`](Self::raw_coefficients) converts back.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Ascending powers of `u`.
    coeffs: Vec<f64>,
    center: f64,
    scale: f64,
}

impl Polynomial {
    pub fn eval(&self, x: f64) -> f64 {
        let u = (x - self.center) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * u + c)
    }

    /// Coefficients in ascending powers of raw `x`.
    pub fn raw_coefficients(&self) -> Vec<f64> {
        let n = self.coeffs.len();
        let mut out = vec![0.0; n];
        // u^k expanded in x, ascending powers
        let mut u_pow = vec![1.0];
        for &c in &self.coeffs {
            for (o, p) in out.iter_mut().zip(&u_pow) {
                *o += c * p;
            }
            let mut next = vec![0.0; u_pow.len() + 1];
            for (i, p) in u_pow.iter().enumerate() {
                next[i] -= p * self.center / self.scale;
                next[i + 1] += p / self.scale;
            }
            u_pow = next;
        }
        out
    }
}

/// Least-squares fit of a polynomial of the given `order` through `(xs, ys)`.
pub fn polyfit(xs: &[f64], ys: &[f64], order: usize) -> Result<Polynomial, FitError> {
    let n = xs.len().min(ys.len());
    if n < order + 1 {
        return Err(FitError::TooFewPoints { got: n });
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let center = xs[..n].iter().sum::<f64>() / n as f64;
    let spread = xs[..n]
        .iter()
        .map(|x| (x - center).abs())
        .fold(0.0, f64::max);
    let scale = if spread > 0.0 { spread } else { 1.0 };

    // Normal equations: (VᵀV) c = Vᵀy with V the Vandermonde matrix in u.
    let m = order + 1;
    let mut a = vec![vec![0.0; m + 1]; m];
    for (&x, &y) in xs.iter().zip(ys).take(n) {
        let u = (x - center) / scale;
        let powers: Vec<f64> = (0..2 * m - 1)
            .scan(1.0, |p, _| {
                let cur = *p;
                *p *= u;
                Some(cur)
            })
            .collect();
        for (r, row) in a.iter_mut().enumerate() {
            for c in 0..m {
                row[c] += powers[r + c];
            }
            row[m] += powers[r] * y;
        }
    }

    let coeffs = solve_augmented(a)?;
    Ok(Polynomial {
        coeffs,
        center,
        scale,
    })
}

/// Gaussian elimination with partial pivoting on an `m × (m+1)` augmented matrix.
fn solve_augmented(mut a: Vec<Vec<f64>>) -> Result<Vec<f64>, FitError> {
    let m = a.len();
    for col in 0..m {
        let pivot = (col..m)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .ok_or(FitError::Singular)?;
        if a[pivot][col].abs() < 1e-12 {
            return Err(FitError::Singular);
        }
        a.swap(col, pivot);
        for row in col + 1..m {
            let f = a[row][col] / a[col][col];
            for k in col..=m {
                let v = f * a[col][k];
                a[row][k] -= v;
            }
        }
    }
    let mut x = vec![0.0; m];
    for row in (0..m).rev() {
        let tail: f64 = (row + 1..m).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][m] - tail) / a[row][row];
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(FitError::Singular);
    }
    Ok(x)
}

/// Fit of `ln(y)` against `x`, order 2 when there are enough points.
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuadFit {
    poly: Polynomial,
}

impl LogQuadFit {
    pub const MAX_ORDER: usize = 2;

    /// Fit through `points`. Every `y` must be strictly positive. The order
    /// drops to 1 when the points only cover two distinct x values.
    pub fn fit(points: &[[f64; 2]]) -> Result<Self, FitError> {
        if points.len() < 2 {
            return Err(FitError::TooFewPoints { got: points.len() });
        }
        if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !(p[1] > 0.0)) {
            if p[1].is_nan() {
                return Err(FitError::NonFinite);
            }
            return Err(FitError::NonPositive { index, y: p[1] });
        }
        let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        let ln_ys: Vec<f64> = points.iter().map(|p| p[1].ln()).collect();
        let mut distinct = xs.clone();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(FitError::Singular);
        }
        let order = Self::MAX_ORDER.min(distinct.len() - 1);
        Ok(Self {
            poly: polyfit(&xs, &ln_ys, order)?,
        })
    }

    /// `[a, b, c]` of `ln(y) = a·x² + b·x + c` in raw x units.
    pub fn coefficients(&self) -> [f64; 3] {
        let raw = self.poly.raw_coefficients();
        let at = |i: usize| raw.get(i).copied().unwrap_or(0.0);
        [at(2), at(1), at(0)]
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.poly.eval(x).exp()
    }

    /// Evaluate on `samples` evenly spaced x values over `[x_min, x_max]`.
    pub fn sample(&self, x_min: f64, x_max: f64, samples: usize) -> Vec<[f64; 2]> {
        let samples = samples.max(2);
        let step = (x_max - x_min) / (samples - 1) as f64;
        (0..samples)
            .map(|i| {
                let x = x_min + step * i as f64;
                [x, self.eval(x)]
            })
            .collect()
    }
}

/// Editable region plus its derived curve.
#[derive(Debug, Clone)]
pub struct FitOverlay {
    control_points: Vec<[f64; 2]>,
    fitted: Vec<[f64; 2]>,
    fit: Option<LogQuadFit>,
}

impl FitOverlay {
    /// Two control points: one at `anchor`, one a tenth of the view width to
    /// its right.
    pub fn anchored_at(anchor: [f64; 2], view: &ViewRect) -> Self {
        let dx = view.width() * 0.1;
        let dx = if dx.is_finite() && dx > 0.0 { dx } else { 1.0 };
        Self {
            control_points: vec![anchor, [anchor[0] + dx, anchor[1]]],
            fitted: Vec::new(),
            fit: None,
        }
    }

    pub fn control_points(&self) -> &[[f64; 2]] {
        &self.control_points
    }

    pub fn fitted(&self) -> &[[f64; 2]] {
        &self.fitted
    }

    pub fn fit(&self) -> Option<&LogQuadFit> {
        self.fit.as_ref()
    }

    /// Move control point `index`; returns `false` if there is no such point.
    pub fn move_point(&mut self, index: usize, to: [f64; 2]) -> bool {
        match self.control_points.get_mut(index) {
            Some(p) => {
                *p = to;
                true
            }
            None => false,
        }
    }

    /// Add a control point, keeping the polyline ordered by x.
    pub fn insert_point(&mut self, p: [f64; 2]) -> usize {
        let at = self.control_points.partition_point(|q| q[0] <= p[0]);
        self.control_points.insert(at, p);
        at
    }

    /// Refit from the current control points and resample across the wider of
    /// the visible x range and the control points' own span. On error the
    /// previous curve stays as it was.
    pub fn recompute(&mut self, view_x: (f64, f64), samples: usize) -> Result<(), FitError> {
        let fit = LogQuadFit::fit(&self.control_points)?;
        let (px_min, px_max) = self
            .control_points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[0]), hi.max(p[0]))
            });
        let x_min = view_x.0.min(px_min);
        let x_max = view_x.1.max(px_max);
        self.fitted = fit.sample(x_min, x_max, samples);
        self.fit = Some(fit);
        Ok(())
    }
}
