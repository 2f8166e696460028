//! Weng-Lin Bayesian rating with the Plackett-Luce ranking model.
//!
//! Every candidate is a one-player team with a Gaussian skill belief
//! `N(mu, sigma^2)`. A match is an ordered list of teams; the update moves
//! each mean by how surprising its placement was and shrinks each sigma.

use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

use crate::error::ConfigError;

/// Default prior mean
pub const DEFAULT_MU: f64 = 25.0;

/// Default prior standard deviation
pub const DEFAULT_SIGMA: f64 = DEFAULT_MU / 3.0;

/// Default performance noise
pub const DEFAULT_BETA: f64 = DEFAULT_SIGMA / 2.0;

/// Lower bound on the sigma shrink factor
pub const DEFAULT_KAPPA: f64 = 1e-4;

/// Gaussian skill belief for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Conservative skill estimate, `mu - 3 sigma`
    pub fn ordinal(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::new(DEFAULT_MU, DEFAULT_SIGMA)
    }
}

/// Parameters of the rating model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Prior mean for unrated candidates
    pub mu: f64,
    /// Prior standard deviation for unrated candidates
    pub sigma: f64,
    /// Per-match performance noise
    pub beta: f64,
    /// Floor on the variance shrink factor
    pub kappa: f64,
    /// Additive dynamics, added to sigma in quadrature before each match
    pub tau: f64,
    /// Never let a match increase sigma above its pre-match value
    pub limit_sigma: bool,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            mu: DEFAULT_MU,
            sigma: DEFAULT_SIGMA,
            beta: DEFAULT_BETA,
            kappa: DEFAULT_KAPPA,
            tau: 0.0,
            limit_sigma: false,
        }
    }
}

impl ModelParams {
    pub fn prior(&self) -> Rating {
        Rating::new(self.mu, self.sigma)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [self.mu, self.sigma, self.beta, self.kappa, self.tau]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(ConfigError::InvalidModel(
                "parameters must be finite".to_string(),
            ));
        }
        if self.sigma <= 0.0 || self.beta <= 0.0 {
            return Err(ConfigError::InvalidModel(format!(
                "sigma ({}) and beta ({}) must be positive",
                self.sigma, self.beta
            )));
        }
        if self.kappa < 0.0 || self.tau < 0.0 {
            return Err(ConfigError::InvalidModel(format!(
                "kappa ({}) and tau ({}) must not be negative",
                self.kappa, self.tau
            )));
        }
        Ok(())
    }
}

/// Standard normal CDF
pub fn phi_major(x: f64) -> f64 {
    0.5 * libm::erfc(-x / SQRT_2)
}

/// One Plackett-Luce match. `ranks[i]` is the placement of `teams[i]`,
/// 0 = best; equal ranks are ties. Returns the posteriors in input order.
pub fn plackett_luce(params: &ModelParams, teams: &[Rating], ranks: &[usize]) -> Vec<Rating> {
    debug_assert_eq!(teams.len(), ranks.len());
    let n = teams.len();
    if n < 2 {
        return teams.to_vec();
    }

    let tau_sq = params.tau * params.tau;
    let priors: Vec<Rating> = teams
        .iter()
        .map(|r| Rating::new(r.mu, (r.sigma * r.sigma + tau_sq).sqrt()))
        .collect();

    let beta_sq = params.beta * params.beta;
    let c = priors
        .iter()
        .map(|r| r.sigma * r.sigma + beta_sq)
        .sum::<f64>()
        .sqrt();

    // exp(mu / c), shifted by the max so large means cannot overflow; only
    // ratios of these terms are used.
    let shift = priors.iter().map(|r| r.mu / c).fold(f64::MIN, f64::max);
    let strength: Vec<f64> = priors.iter().map(|r| (r.mu / c - shift).exp()).collect();

    // sum_q[q]: total strength of everyone placed at or below q
    let sum_q: Vec<f64> = ranks
        .iter()
        .map(|&rank_q| {
            ranks
                .iter()
                .zip(&strength)
                .filter(|&(&rank_i, _)| rank_i >= rank_q)
                .map(|(_, s)| s)
                .sum::<f64>()
        })
        .collect();

    // a[q]: size of the tie at q's placement
    let a: Vec<f64> = ranks
        .iter()
        .map(|&rank_q| ranks.iter().filter(|&&r| r == rank_q).count() as f64)
        .collect();

    priors
        .iter()
        .enumerate()
        .map(|(i, prior)| {
            let sigma_sq = prior.sigma * prior.sigma;
            let mut omega_sum = 0.0;
            let mut delta_sum = 0.0;

            for q in 0..n {
                if ranks[q] > ranks[i] {
                    continue;
                }
                let p = strength[i] / sum_q[q];
                delta_sum += p * (1.0 - p) / a[q];
                if q == i {
                    omega_sum += (1.0 - p) / a[q];
                } else {
                    omega_sum -= p / a[q];
                }
            }

            let omega = omega_sum * sigma_sq / c;
            let gamma = sigma_sq.sqrt() / c;
            let delta = gamma * delta_sum * sigma_sq / (c * c);

            let mu = prior.mu + omega;
            let mut sigma = prior.sigma * (1.0 - delta).max(params.kappa).sqrt();
            if params.limit_sigma {
                sigma = sigma.min(teams[i].sigma);
            }
            Rating::new(mu, sigma)
        })
        .collect()
}

/// Probability that each rating wins a free-for-all against all others.
///
/// Averages the pairwise normal-CDF win probabilities over the
/// `n (n - 1) / 2` pairs, so the result sums to 1.
pub fn predict_win(params: &ModelParams, ratings: &[Rating]) -> Vec<f64> {
    let n = ratings.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }

    let noise = n as f64 * params.beta * params.beta;
    let pairs = (n * (n - 1)) as f64 / 2.0;

    ratings
        .iter()
        .enumerate()
        .map(|(i, a)| {
            ratings
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| {
                    let spread = (noise + a.sigma * a.sigma + b.sigma * b.sigma).sqrt();
                    phi_major((a.mu - b.mu) / spread)
                })
                .sum::<f64>()
                / pairs
        })
        .collect()
}
