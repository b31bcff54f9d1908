//! Pairwise Matrix - Saaty-scale reciprocal comparison matrices.

use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::criteria::MainCriterion;
use crate::domain::foundation::ValidationError;

/// Smallest admissible comparison value (reciprocal of absolute importance).
pub const SAATY_MIN: f64 = 1.0 / 9.0;

/// Largest admissible comparison value (absolute importance).
pub const SAATY_MAX: f64 = 9.0;

/// Relative tolerance used when checking reciprocity.
const RECIPROCITY_RTOL: f64 = 1e-5;

/// Absolute tolerance paired with the relative ones below.
const ATOL: f64 = 1e-8;

/// Verbal meaning of the integer Saaty intensities.
pub const SAATY_SCALE: &[(u8, &str)] = &[
    (1, "Equal importance"),
    (2, "Weak importance (intermediate)"),
    (3, "Moderate importance"),
    (4, "Moderate plus (intermediate)"),
    (5, "Strong importance"),
    (6, "Strong plus (intermediate)"),
    (7, "Very strong importance"),
    (8, "Very, very strong (intermediate)"),
    (9, "Absolute importance"),
];

/// Returns the verbal label for an integer Saaty intensity.
pub fn saaty_label(intensity: u8) -> Option<&'static str> {
    SAATY_SCALE
        .iter()
        .find(|(value, _)| *value == intensity)
        .map(|(_, label)| *label)
}

/// Outcome of a structural validity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixValidity {
    pub is_valid: bool,
    /// Description of the first violation found.
    pub reason: Option<String>,
}

impl MatrixValidity {
    fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Reciprocal comparison matrix over an ordered, unique list of criteria.
///
/// Entry `(i, j)` says how much more important criterion `i` is than
/// criterion `j`. The only mutation path writes both `(i, j)` and its
/// reciprocal, so a matrix built through this type stays reciprocal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseMatrix {
    criteria: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    values: DMatrix<f64>,
}

impl PairwiseMatrix {
    /// Creates an all-ones matrix ("equal importance") over the criteria.
    ///
    /// # Errors
    /// - `TooFewCriteria` for fewer than 2 names
    /// - `DuplicateCriterion` if a name repeats
    pub fn new<S: AsRef<str>>(criteria: &[S]) -> Result<Self, ValidationError> {
        if criteria.len() < 2 {
            return Err(ValidationError::TooFewCriteria {
                count: criteria.len(),
            });
        }

        let mut index = HashMap::with_capacity(criteria.len());
        for (i, name) in criteria.iter().enumerate() {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return Err(ValidationError::empty_field("criterion"));
            }
            if index.insert(name.to_string(), i).is_some() {
                return Err(ValidationError::DuplicateCriterion {
                    criterion: name.to_string(),
                });
            }
        }

        let n = criteria.len();
        Ok(Self {
            criteria: criteria.iter().map(|c| c.as_ref().to_string()).collect(),
            index,
            values: DMatrix::from_element(n, n, 1.0),
        })
    }

    /// Creates a matrix from the `n(n-1)/2` upper-triangle values in
    /// row-major `i < j` order. Every value passes through the same setter.
    pub fn from_upper_triangle<S: AsRef<str>>(
        criteria: &[S],
        values: &[f64],
    ) -> Result<Self, ValidationError> {
        let mut matrix = Self::new(criteria)?;
        let n = matrix.len();
        let expected = n * (n - 1) / 2;
        if values.len() != expected {
            return Err(ValidationError::WrongLength {
                expected,
                actual: values.len(),
            });
        }

        let mut idx = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                matrix.set_comparison_by_index(i, j, values[idx])?;
                idx += 1;
            }
        }
        Ok(matrix)
    }

    /// Wraps an externally supplied matrix without enforcing reciprocity.
    ///
    /// Only the shape is checked; use [`PairwiseMatrix::is_valid`] to inspect
    /// the content before trusting it.
    pub fn from_matrix<S: AsRef<str>>(
        criteria: &[S],
        values: DMatrix<f64>,
    ) -> Result<Self, ValidationError> {
        let mut matrix = Self::new(criteria)?;
        if values.nrows() != values.ncols() {
            return Err(ValidationError::NotSquare {
                rows: values.nrows(),
                cols: values.ncols(),
            });
        }
        if values.nrows() != matrix.len() {
            return Err(ValidationError::WrongLength {
                expected: matrix.len(),
                actual: values.nrows(),
            });
        }
        matrix.values = values;
        Ok(matrix)
    }

    /// Records that `criterion_a` is `value` times as important as `criterion_b`.
    ///
    /// Writes `value` at (a, b) and `1/value` at (b, a).
    ///
    /// # Errors
    /// - `UnknownCriterion` if either name is absent
    /// - `OutOfRange` unless `1/9 <= value <= 9`
    pub fn set_comparison(
        &mut self,
        criterion_a: &str,
        criterion_b: &str,
        value: f64,
    ) -> Result<(), ValidationError> {
        let i = self.index_of(criterion_a)?;
        let j = self.index_of(criterion_b)?;
        self.set_comparison_by_index(i, j, value)
    }

    /// Index-based variant of [`PairwiseMatrix::set_comparison`].
    pub fn set_comparison_by_index(
        &mut self,
        i: usize,
        j: usize,
        value: f64,
    ) -> Result<(), ValidationError> {
        let n = self.len();
        if i >= n || j >= n {
            return Err(ValidationError::invalid_format(
                "index",
                format!("indices out of range: ({}, {})", i, j),
            ));
        }
        check_saaty_value(value)?;

        if i == j {
            // The diagonal is fixed at 1.
            if (value - 1.0).abs() > f64::EPSILON {
                return Err(ValidationError::invalid_format(
                    "comparison",
                    format!("a criterion compared with itself must be 1, got {}", value),
                ));
            }
            return Ok(());
        }

        self.values[(i, j)] = value;
        self.values[(j, i)] = 1.0 / value;
        Ok(())
    }

    /// Returns the comparison value of `criterion_a` over `criterion_b`.
    pub fn get_comparison(
        &self,
        criterion_a: &str,
        criterion_b: &str,
    ) -> Result<f64, ValidationError> {
        let i = self.index_of(criterion_a)?;
        let j = self.index_of(criterion_b)?;
        Ok(self.values[(i, j)])
    }

    /// Returns an independent copy of the matrix values.
    pub fn get_matrix(&self) -> DMatrix<f64> {
        self.values.clone()
    }

    /// Borrows the matrix values.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Returns the criterion names in matrix order.
    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    /// Returns the number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Always false: a matrix holds at least two criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns true if the criterion is part of this matrix.
    pub fn contains(&self, criterion: &str) -> bool {
        self.index.contains_key(criterion)
    }

    /// Returns the matrix position of a criterion.
    pub fn index_of(&self, criterion: &str) -> Result<usize, ValidationError> {
        self.index
            .get(criterion)
            .copied()
            .ok_or_else(|| ValidationError::unknown_criterion(criterion))
    }

    /// Checks diagonal == 1, reciprocity and positivity.
    ///
    /// Reports the first violation found.
    pub fn is_valid(&self) -> MatrixValidity {
        let n = self.len();

        for i in 0..n {
            if !is_close(self.values[(i, i)], 1.0, RECIPROCITY_RTOL) {
                return MatrixValidity::invalid("Diagonal elements must be 1");
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let expected = 1.0 / self.values[(i, j)];
                if !is_close(self.values[(j, i)], expected, RECIPROCITY_RTOL) {
                    return MatrixValidity::invalid(format!(
                        "Reciprocity violated at ({},{})",
                        i, j
                    ));
                }
            }
        }

        if self.values.iter().any(|v| *v <= 0.0 || !v.is_finite()) {
            return MatrixValidity::invalid("All values must be positive");
        }

        MatrixValidity::valid()
    }

    /// Rejects a matrix that could not have been built through the setter.
    ///
    /// Beyond [`PairwiseMatrix::is_valid`], every off-diagonal entry must lie
    /// in `[1/9, 9]` (with a relative slack for reciprocal round-off).
    ///
    /// # Errors
    /// - `InvalidFormat` naming `field` and the first violation
    pub fn ensure_valid(&self, field: &str) -> Result<(), ValidationError> {
        let validity = self.is_valid();
        if !validity.is_valid {
            return Err(ValidationError::invalid_format(
                field,
                validity.reason.unwrap_or_else(|| "invalid matrix".to_string()),
            ));
        }

        let n = self.len();
        for i in 0..n {
            for j in 0..n {
                let value = self.values[(i, j)];
                if i != j && !within_saaty_range(value) {
                    return Err(ValidationError::invalid_format(
                        field,
                        format!(
                            "entry ({},{}) = {} is outside [1/9, 9]",
                            i, j, value
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Default comparisons between the three main criteria.
    pub fn default_main() -> Self {
        Self::seeded(
            &MainCriterion::names(),
            &[
                ("Comfort", "Health", 1.2),
                ("Comfort", "Usability", 2.0),
                ("Health", "Usability", 1.5),
            ],
        )
    }

    /// Default comparisons between the sub-criteria of a main criterion.
    pub fn default_for(main: MainCriterion) -> Self {
        let seeds: &[(&str, &str, f64)] = match main {
            MainCriterion::Comfort => &[
                ("Temperature", "Lighting", 2.0),
                ("Temperature", "Noise", 2.0),
                ("Temperature", "Humidity", 3.0),
                ("Lighting", "Noise", 1.0),
                ("Lighting", "Humidity", 2.0),
                ("Noise", "Humidity", 2.0),
            ],
            MainCriterion::Health => &[
                ("CO2", "AirQuality", 2.0),
                ("CO2", "VOC", 2.0),
                ("AirQuality", "VOC", 1.5),
            ],
            MainCriterion::Usability => &[
                ("SeatingCapacity", "Equipment", 2.0),
                ("SeatingCapacity", "AVFacilities", 3.0),
                ("Equipment", "AVFacilities", 2.0),
            ],
        };
        Self::seeded(&main.leaf_names(), seeds)
    }

    // The seed tables above are static, hold unique names and only Saaty
    // values, so they are written directly instead of through the fallible
    // setter. `default_matrices_are_valid` pins this down.
    fn seeded(criteria: &[&str], seeds: &[(&str, &str, f64)]) -> Self {
        let n = criteria.len();
        let mut index = HashMap::with_capacity(n);
        for (i, name) in criteria.iter().enumerate() {
            index.insert(name.to_string(), i);
        }
        let mut values = DMatrix::from_element(n, n, 1.0);
        for (a, b, value) in seeds {
            let (i, j) = (index[*a], index[*b]);
            values[(i, j)] = *value;
            values[(j, i)] = 1.0 / *value;
        }
        Self {
            criteria: criteria.iter().map(|c| c.to_string()).collect(),
            index,
            values,
        }
    }
}

impl fmt::Display for PairwiseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "        ")?;
        let header: Vec<String> = self
            .criteria
            .iter()
            .map(|c| format!("{:>6}", short_label(c)))
            .collect();
        writeln!(f, "{}", header.join("  "))?;

        for (i, criterion) in self.criteria.iter().enumerate() {
            let row: Vec<String> = (0..self.len())
                .map(|j| format!("{:6.3}", self.values[(i, j)]))
                .collect();
            write!(f, "{:>6}  {}", short_label(criterion), row.join("  "))?;
            if i + 1 < self.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Rejects values outside the Saaty range, including NaN.
pub fn check_saaty_value(value: f64) -> Result<(), ValidationError> {
    if !(SAATY_MIN..=SAATY_MAX).contains(&value) {
        return Err(ValidationError::out_of_range(
            "comparison",
            SAATY_MIN,
            SAATY_MAX,
            value,
        ));
    }
    Ok(())
}

fn within_saaty_range(value: f64) -> bool {
    value.is_finite()
        && value >= SAATY_MIN * (1.0 - RECIPROCITY_RTOL)
        && value <= SAATY_MAX * (1.0 + RECIPROCITY_RTOL)
}

fn short_label(name: &str) -> String {
    name.chars().take(6).collect()
}

fn is_close(a: f64, b: f64, rtol: f64) -> bool {
    (a - b).abs() <= ATOL + rtol * b.abs()
}
