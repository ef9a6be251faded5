//! Seeded linear-Gaussian SEM simulator.
//!
//! Draws a random causal order, adds each forward pair as an edge with
//! probability `avg_degree / (n − 1)`, gives each edge a weight uniform in
//! `±[0.3, 1.0]`, and samples every variable as the weighted sum of its
//! parents plus standard normal noise. The same config always produces the
//! same bits.

use causal_kernel::graph::MixedGraphV1;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, Uniform};
use thiserror::Error;

use crate::data::{DataError, DataSetV1};

const WEIGHT_LOW: f64 = 0.3;
const WEIGHT_HIGH: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulateError {
    #[error("invalid simulation config: {detail}")]
    InvalidConfig { detail: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSemConfigV1 {
    pub num_variables: usize,
    /// Expected number of edges touching a variable.
    pub avg_degree: f64,
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for LinearSemConfigV1 {
    fn default() -> Self {
        Self {
            num_variables: 10,
            avg_degree: 2.0,
            sample_size: 1000,
            seed: 0,
        }
    }
}

impl LinearSemConfigV1 {
    /// # Errors
    ///
    /// Returns [`SimulateError::InvalidConfig`] for fewer than two variables,
    /// fewer than two samples, or a degree outside `[0, n − 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<(), SimulateError> {
        let invalid = |detail: &str| {
            Err(SimulateError::InvalidConfig {
                detail: detail.to_string(),
            })
        };
        if self.num_variables < 2 {
            return invalid("num_variables must be at least 2");
        }
        if self.sample_size < 2 {
            return invalid("sample_size must be at least 2");
        }
        if !(0.0..=(self.num_variables - 1) as f64).contains(&self.avg_degree) {
            return invalid("avg_degree must lie in [0, num_variables - 1]");
        }
        Ok(())
    }
}

/// Simulated data with its generating model.
#[derive(Debug, Clone)]
pub struct SimulationV1 {
    pub data: DataSetV1,
    /// The generating DAG.
    pub truth: MixedGraphV1,
    /// `(from, to, weight)` for every edge, in ascending `(from, to)` order.
    pub weights: Vec<(usize, usize, f64)>,
    /// The causal order the DAG was drawn along.
    pub causal_order: Vec<usize>,
}

/// Simulate a linear SEM per `config`. Variables are named `X1..Xn`.
///
/// # Errors
///
/// Returns [`SimulateError`] for an invalid config.
#[allow(clippy::cast_precision_loss)]
pub fn simulate_linear_sem(config: &LinearSemConfigV1) -> Result<SimulationV1, SimulateError> {
    config.validate()?;
    let n = config.num_variables;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let mut causal_order: Vec<usize> = (0..n).collect();
    causal_order.shuffle(&mut rng);

    let edge_probability = config.avg_degree / (n - 1) as f64;
    let magnitude = Uniform::new_inclusive(WEIGHT_LOW, WEIGHT_HIGH);
    let mut truth = MixedGraphV1::new(n);
    let mut weights = Vec::new();
    for (i, &from) in causal_order.iter().enumerate() {
        for &to in &causal_order[i + 1..] {
            if rng.gen_bool(edge_probability.min(1.0)) {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                truth.add_directed(from, to);
                weights.push((from, to, sign * magnitude.sample(&mut rng)));
            }
        }
    }
    weights.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let noise = Normal::new(0.0, 1.0).map_err(|e| SimulateError::InvalidConfig {
        detail: e.to_string(),
    })?;
    let mut rows = vec![vec![0.0; n]; config.sample_size];
    for row in &mut rows {
        for &v in &causal_order {
            let signal: f64 = weights
                .iter()
                .filter(|&&(_, to, _)| to == v)
                .map(|&(from, _, w)| w * row[from])
                .sum();
            row[v] = signal + noise.sample(&mut rng);
        }
    }

    let names: Vec<String> = (1..=n).map(|i| format!("X{i}")).collect();
    let data = DataSetV1::from_rows(&names, &rows)?;
    Ok(SimulationV1 {
        data,
        truth,
        weights,
        causal_order,
    })
}
