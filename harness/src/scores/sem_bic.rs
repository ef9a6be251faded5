//! Linear-Gaussian BIC score.
//!
//! For node `i` with parents `P` (k = |P|) over n samples:
//!
//! ```text
//! σ²   = Σᵢᵢ − Σᵢₚ Σₚₚ⁻¹ Σₚᵢ            (residual variance, Cholesky solve)
//! lik  = −n/2 · (ln(2π σ²) + 1)
//! score = 2·lik − c · k · ln n
//! ```
//!
//! A parent covariance block that is not positive definite, or a residual
//! variance that is not positive, yields NaN (unscorable).

use causal_kernel::score::ScoreProvider;
use causal_kernel::variable::VariableSetV1;

use crate::data::{DataError, DataSetV1};

/// Pivot floor (relative to the block's largest diagonal) for the Cholesky
/// factorization.
const SINGULARITY_TOLERANCE: f64 = 1e-10;

/// BIC for linear-Gaussian data, computed from the sample covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct SemBicScore {
    variables: VariableSetV1,
    covariance: Vec<Vec<f64>>,
    sample_size: usize,
    penalty_discount: f64,
}

impl SemBicScore {
    /// Score over `data`; the covariance is computed once here.
    #[must_use]
    pub fn new(data: &DataSetV1, penalty_discount: f64) -> Self {
        Self {
            variables: data.variables().clone(),
            covariance: data.covariance(),
            sample_size: data.num_rows(),
            penalty_discount,
        }
    }

    /// Score over a precomputed covariance matrix.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::RaggedRow`] if `covariance` is not `p × p` for
    /// the `p` variables, or [`DataError::Empty`] for a zero sample size.
    pub fn from_covariance(
        variables: VariableSetV1,
        covariance: Vec<Vec<f64>>,
        sample_size: usize,
        penalty_discount: f64,
    ) -> Result<Self, DataError> {
        if sample_size == 0 {
            return Err(DataError::Empty);
        }
        let p = variables.len();
        if covariance.len() != p {
            return Err(DataError::RaggedRow {
                row: covariance.len(),
                expected: p,
                found: covariance.len(),
            });
        }
        if let Some((row, r)) = covariance.iter().enumerate().find(|(_, r)| r.len() != p) {
            return Err(DataError::RaggedRow {
                row,
                expected: p,
                found: r.len(),
            });
        }
        Ok(Self {
            variables,
            covariance,
            sample_size,
            penalty_discount,
        })
    }

    #[must_use]
    pub fn penalty_discount(&self) -> f64 {
        self.penalty_discount
    }

    /// Residual variance of `node` regressed on `parents`, or `None` when the
    /// regression is singular.
    #[must_use]
    pub fn residual_variance(&self, node: usize, parents: &[usize]) -> Option<f64> {
        let syy = self.covariance[node][node];
        if parents.is_empty() {
            return (syy > 0.0).then_some(syy);
        }
        let sxx: Vec<Vec<f64>> = parents
            .iter()
            .map(|&a| parents.iter().map(|&b| self.covariance[a][b]).collect())
            .collect();
        let sxy: Vec<f64> = parents.iter().map(|&a| self.covariance[a][node]).collect();
        let l = cholesky(&sxx)?;
        let b = cholesky_solve(&l, &sxy);
        let explained: f64 = sxy.iter().zip(&b).map(|(s, c)| s * c).sum();
        let var = syy - explained;
        (var > 0.0).then_some(var)
    }
}

impl ScoreProvider for SemBicScore {
    fn variables(&self) -> &VariableSetV1 {
        &self.variables
    }

    #[allow(clippy::cast_precision_loss)]
    fn local_score(&self, node: usize, parents: &[usize]) -> f64 {
        let Some(var) = self.residual_variance(node, parents) else {
            return f64::NAN;
        };
        let n = self.sample_size as f64;
        let lik = -0.5 * n * ((2.0 * std::f64::consts::PI * var).ln() + 1.0);
        let score = 2.0 * lik - self.penalty_discount * parents.len() as f64 * n.ln();
        if score.is_finite() {
            score
        } else {
            f64::NAN
        }
    }

    fn sample_size(&self) -> Option<usize> {
        Some(self.sample_size)
    }

    fn score_id(&self) -> &str {
        "sem_bic"
    }
}

/// Lower-triangular `L` with `L Lᵀ = a`, or `None` if `a` is not (numerically)
/// positive definite.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let k = a.len();
    let scale = a
        .iter()
        .enumerate()
        .map(|(i, row)| row[i].abs())
        .fold(0.0_f64, f64::max);
    let floor = SINGULARITY_TOLERANCE * scale.max(f64::MIN_POSITIVE);
    let mut l = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in 0..=i {
            let dot: f64 = l[i][..j].iter().zip(&l[j][..j]).map(|(x, y)| x * y).sum();
            let v = a[i][j] - dot;
            if i == j {
                if v <= floor {
                    return None;
                }
                l[i][j] = v.sqrt();
            } else {
                l[i][j] = v / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L Lᵀ x = b`.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let k = l.len();
    let mut y = vec![0.0; k];
    for i in 0..k {
        let dot: f64 = l[i][..i].iter().zip(&y[..i]).map(|(x, v)| x * v).sum();
        y[i] = (b[i] - dot) / l[i][i];
    }
    let mut x = vec![0.0; k];
    for i in (0..k).rev() {
        let dot: f64 = (i + 1..k).map(|j| l[j][i] * x[j]).sum();
        x[i] = (y[i] - dot) / l[i][i];
    }
    x
}
