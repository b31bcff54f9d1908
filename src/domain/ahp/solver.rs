//! Priority Solver - Weight derivation and consistency checking.
//!
//! Turns a reciprocal comparison matrix into a normalized priority vector and
//! measures how self-contradictory the comparisons are (Saaty's consistency
//! ratio against the Random Index table).

use nalgebra::linalg::Schur;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::domain::foundation::ValidationError;

/// Largest matrix with a Random Index reference value.
pub const MAX_MATRIX_SIZE: usize = 15;

/// Saaty's acceptability cutoff for the consistency ratio.
pub const CONSISTENCY_THRESHOLD: f64 = 0.1;

/// Random Index by matrix size, n = 1..=15.
pub const RANDOM_INDEX: [f64; MAX_MATRIX_SIZE] = [
    0.00, 0.00, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.53, 1.56, 1.57, 1.59,
];

/// Weights at or below this are treated as zero when computing λmax.
const NEAR_ZERO_WEIGHT: f64 = 1e-10;

const SCHUR_MAX_ITERATIONS: usize = 10_000;
const SVD_MAX_ITERATIONS: usize = 10_000;
const POWER_MAX_ITERATIONS: usize = 1_000;
const POWER_TOLERANCE: f64 = 1e-12;

/// Returns the Random Index for a matrix of size `n`, if one exists.
pub fn random_index(n: usize) -> Option<f64> {
    if n == 0 {
        return None;
    }
    RANDOM_INDEX.get(n - 1).copied()
}

/// How priority weights are derived from a comparison matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMethod {
    /// Principal right eigenvector (Saaty's original method).
    #[default]
    Eigenvector,
    /// Normalized n-th root of each row product.
    GeometricMean,
    /// Average of each row after normalizing columns to sum 1.
    NormalizedSum,
}

impl WeightMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightMethod::Eigenvector => "eigenvector",
            WeightMethod::GeometricMean => "geometric_mean",
            WeightMethod::NormalizedSum => "normalized_sum",
        }
    }
}

impl fmt::Display for WeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WeightMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eigenvector" => Ok(WeightMethod::Eigenvector),
            "geometric_mean" => Ok(WeightMethod::GeometricMean),
            "normalized_sum" => Ok(WeightMethod::NormalizedSum),
            other => Err(ValidationError::invalid_format(
                "weight_method",
                format!("unknown method '{}'", other),
            )),
        }
    }
}

/// Consistency ratio and its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyRatio {
    pub ratio: f64,
    /// True when `ratio < 0.1`.
    pub is_acceptable: bool,
}

/// Full consistency diagnostics for one matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub n: usize,
    pub weights: Vec<f64>,
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub consistency_ratio: f64,
    pub random_index: Option<f64>,
    pub is_consistent: bool,
}

/// Weight derivation and consistency functions.
pub struct PrioritySolver;

impl PrioritySolver {
    /// Derives normalized priority weights.
    ///
    /// The result is non-negative and sums to 1. All three methods agree on
    /// a perfectly consistent matrix.
    ///
    /// # Errors
    /// - `NotSquare` for a non-square matrix
    /// - `TooFewCriteria` for an empty matrix
    pub fn weights(
        matrix: &DMatrix<f64>,
        method: WeightMethod,
    ) -> Result<Vec<f64>, ValidationError> {
        let n = check_square(matrix)?;
        if n == 1 {
            return Ok(vec![1.0]);
        }

        let weights = match method {
            WeightMethod::Eigenvector => eigenvector_weights(matrix),
            WeightMethod::GeometricMean => geometric_mean_weights(matrix),
            WeightMethod::NormalizedSum => normalized_sum_weights(matrix),
        };
        Ok(weights)
    }

    /// Estimates λmax as the mean of `(A·w)_i / w_i`.
    ///
    /// Entries with a near-zero weight contribute `n` instead of a ratio.
    pub fn lambda_max(matrix: &DMatrix<f64>, weights: &[f64]) -> f64 {
        let n = matrix.nrows();
        if n == 0 || weights.len() != n {
            return n as f64;
        }
        let w = DVector::from_column_slice(weights);
        let aw = matrix * &w;

        let total: f64 = (0..n)
            .map(|i| {
                if w[i] > NEAR_ZERO_WEIGHT {
                    aw[i] / w[i]
                } else {
                    n as f64
                }
            })
            .sum();
        total / n as f64
    }

    /// Consistency Index `(λmax − n)/(n − 1)`; exactly 0 for n ≤ 2.
    ///
    /// Weights default to the eigenvector method when not supplied.
    pub fn consistency_index(
        matrix: &DMatrix<f64>,
        weights: Option<&[f64]>,
    ) -> Result<f64, ValidationError> {
        let n = check_square(matrix)?;
        if n <= 2 {
            return Ok(0.0);
        }
        let lambda_max = match weights {
            Some(w) => Self::lambda_max(matrix, w),
            None => Self::lambda_max(matrix, &Self::weights(matrix, WeightMethod::default())?),
        };
        Ok((lambda_max - n as f64) / (n as f64 - 1.0))
    }

    /// Consistency Ratio `CI / RI(n)`.
    ///
    /// # Errors
    /// - `SizeLimit` for matrices larger than 15 (no RI reference)
    pub fn consistency_ratio(
        matrix: &DMatrix<f64>,
        weights: Option<&[f64]>,
    ) -> Result<ConsistencyRatio, ValidationError> {
        let n = check_square(matrix)?;
        if n > MAX_MATRIX_SIZE {
            return Err(ValidationError::SizeLimit {
                size: n,
                max: MAX_MATRIX_SIZE,
            });
        }
        if n <= 2 {
            return Ok(ConsistencyRatio {
                ratio: 0.0,
                is_acceptable: true,
            });
        }

        let ri = random_index(n).unwrap_or(0.0);
        if ri == 0.0 {
            return Ok(ConsistencyRatio {
                ratio: 0.0,
                is_acceptable: true,
            });
        }

        let ratio = Self::consistency_index(matrix, weights)? / ri;
        Ok(ConsistencyRatio {
            ratio,
            is_acceptable: ratio < CONSISTENCY_THRESHOLD,
        })
    }

    /// Computes weights and every consistency diagnostic in one pass.
    pub fn validate(
        matrix: &DMatrix<f64>,
        method: WeightMethod,
        threshold: f64,
    ) -> Result<ConsistencyReport, ValidationError> {
        let n = check_square(matrix)?;
        let weights = Self::weights(matrix, method)?;
        let lambda_max = Self::lambda_max(matrix, &weights);
        let consistency_index = Self::consistency_index(matrix, Some(&weights))?;
        let cr = Self::consistency_ratio(matrix, Some(&weights))?;

        Ok(ConsistencyReport {
            n,
            weights,
            lambda_max,
            consistency_index,
            consistency_ratio: cr.ratio,
            random_index: random_index(n),
            is_consistent: cr.ratio < threshold,
        })
    }
}

/// Formats weights as `name: weight (pct%)` lines.
pub fn format_weights<S: AsRef<str>>(weights: &[f64], names: &[S]) -> String {
    names
        .iter()
        .zip(weights)
        .map(|(name, w)| format!("  {}: {:.4} ({:.1}%)", name.as_ref(), w, w * 100.0))
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_square(matrix: &DMatrix<f64>) -> Result<usize, ValidationError> {
    if matrix.nrows() != matrix.ncols() {
        return Err(ValidationError::NotSquare {
            rows: matrix.nrows(),
            cols: matrix.ncols(),
        });
    }
    if matrix.nrows() == 0 {
        return Err(ValidationError::TooFewCriteria { count: 0 });
    }
    Ok(matrix.nrows())
}

fn eigenvector_weights(matrix: &DMatrix<f64>) -> Vec<f64> {
    match principal_eigenvector(matrix) {
        Some(weights) => weights,
        None => {
            warn!(
                n = matrix.nrows(),
                "Eigen decomposition did not converge, using power iteration"
            );
            power_iteration(matrix)
        }
    }
}

/// Eigenvector of the largest real eigenvalue, normalized to sum 1.
///
/// The eigenvalues come from a real Schur decomposition; the eigenvector is
/// the right singular vector of `A − λI` with the smallest singular value.
fn principal_eigenvector(matrix: &DMatrix<f64>) -> Option<Vec<f64>> {
    let n = matrix.nrows();
    let schur = Schur::try_new(matrix.clone(), f64::EPSILON, SCHUR_MAX_ITERATIONS)?;
    let lambda = schur
        .complex_eigenvalues()
        .iter()
        .map(|c| c.re)
        .fold(f64::NEG_INFINITY, f64::max);
    if !lambda.is_finite() {
        return None;
    }

    let shifted = matrix - DMatrix::<f64>::identity(n, n) * lambda;
    let svd = shifted.try_svd(false, true, f64::EPSILON, SVD_MAX_ITERATIONS)?;
    let v_t = svd.v_t?;
    let (null_idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;

    let mut vector: Vec<f64> = v_t.row(null_idx).iter().copied().collect();

    // Eigenvectors are defined up to sign.
    let negatives = vector.iter().filter(|v| **v < 0.0).count();
    if vector.iter().sum::<f64>() < 0.0 || negatives * 2 > n {
        vector.iter_mut().for_each(|v| *v = -*v);
    }
    vector.iter_mut().for_each(|v| *v = v.max(0.0));

    normalize(vector)
}

/// Perron vector of a positive matrix by repeated multiplication.
fn power_iteration(matrix: &DMatrix<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    let mut w = DVector::from_element(n, 1.0 / n as f64);

    for _ in 0..POWER_MAX_ITERATIONS {
        let next = matrix * &w;
        let sum = next.sum();
        if sum <= 0.0 || !sum.is_finite() {
            break;
        }
        let next = next / sum;
        let delta = (&next - &w).amax();
        w = next;
        if delta < POWER_TOLERANCE {
            break;
        }
    }

    normalize(w.iter().map(|v| v.max(0.0)).collect()).unwrap_or_else(|| vec![1.0 / n as f64; n])
}

fn geometric_mean_weights(matrix: &DMatrix<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    let means: Vec<f64> = matrix
        .row_iter()
        .map(|row| row.iter().map(|v| v.ln()).sum::<f64>() / n as f64)
        .map(f64::exp)
        .collect();
    normalize(means).unwrap_or_else(|| vec![1.0 / n as f64; n])
}

fn normalized_sum_weights(matrix: &DMatrix<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    let mut normalized = matrix.clone();
    for mut column in normalized.column_iter_mut() {
        let sum = column.sum();
        if sum > 0.0 {
            column /= sum;
        }
    }
    let means: Vec<f64> = normalized.row_iter().map(|row| row.sum() / n as f64).collect();
    normalize(means).unwrap_or_else(|| vec![1.0 / n as f64; n])
}

fn normalize(values: Vec<f64>) -> Option<Vec<f64>> {
    let sum: f64 = values.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return None;
    }
    Some(values.into_iter().map(|v| v / sum).collect())
}
