//! Skill ranking engine.
//!
//! Each group ranking is treated as one match between the candidates. The
//! engine folds matches into a [`RatingState`] in a fixed order and, at the
//! end, turns the final beliefs into win probabilities.
//!
//! Every candidate on the method axis is seeded with the prior before the
//! first match, so a candidate that never competes keeps the prior.

pub mod model;

pub use model::{ModelParams, Rating};

use serde::Serialize;
use tracing::debug;

use crate::error::ConfigError;

/// Candidates of one group ordered fastest to slowest. Names are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Ranking {
    placements: Vec<String>,
}

impl Ranking {
    /// Build from an ordering; later duplicates of a name are dropped
    pub fn new<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut placements: Vec<String> = Vec::new();
        for name in order {
            let name = name.into();
            if !placements.contains(&name) {
                placements.push(name);
            }
        }
        Self { placements }
    }

    pub fn placements(&self) -> &[String] {
        &self.placements
    }

    pub fn winner(&self) -> Option<&str> {
        self.placements.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// A match needs at least two distinct candidates
    pub fn is_informative(&self) -> bool {
        self.placements.len() >= 2
    }
}

/// Ratings of every seeded candidate, in seeding order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingState {
    ratings: Vec<(String, Rating)>,
    matches: usize,
}

impl RatingState {
    pub fn get(&self, candidate: &str) -> Option<Rating> {
        self.ratings
            .iter()
            .find(|(name, _)| name == candidate)
            .map(|(_, r)| *r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rating)> {
        self.ratings.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Matches applied so far
    pub fn matches(&self) -> usize {
        self.matches
    }

    fn position(&self, candidate: &str) -> Option<usize> {
        self.ratings.iter().position(|(name, _)| name == candidate)
    }
}

/// Applies rating updates and win predictions.
#[derive(Debug, Clone)]
pub struct SkillEngine {
    params: ModelParams,
}

impl SkillEngine {
    pub fn new(params: ModelParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Initial state: every candidate at the prior.
    pub fn seed<I, S>(&self, candidates: I) -> RatingState
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ratings: Vec<(String, Rating)> = Vec::new();
        for name in candidates {
            let name = name.into();
            if !ratings.iter().any(|(n, _)| *n == name) {
                ratings.push((name, self.params.prior()));
            }
        }
        RatingState {
            ratings,
            matches: 0,
        }
    }

    /// Apply one match. Rankings with fewer than two candidates carry no
    /// information and return the state untouched.
    pub fn update(
        &self,
        state: RatingState,
        ranking: &Ranking,
    ) -> Result<RatingState, ConfigError> {
        if !ranking.is_informative() {
            debug!(placements = ranking.len(), "skipping uninformative ranking");
            return Ok(state);
        }

        let positions = ranking
            .placements()
            .iter()
            .map(|name| {
                state
                    .position(name)
                    .ok_or_else(|| ConfigError::UnknownCandidate { name: name.clone() })
            })
            .collect::<Result<Vec<usize>, ConfigError>>()?;

        let teams: Vec<Rating> = positions.iter().map(|&p| state.ratings[p].1).collect();
        let ranks: Vec<usize> = (0..teams.len()).collect();
        let posterior = model::plackett_luce(&self.params, &teams, &ranks);

        let mut state = state;
        for (&p, rating) in positions.iter().zip(posterior) {
            state.ratings[p].1 = rating;
        }
        state.matches += 1;
        debug!(
            winner = ranking.winner().unwrap_or_default(),
            matches = state.matches,
            "applied ranking update"
        );
        Ok(state)
    }

    /// Fold a sequence of rankings, in order.
    pub fn update_all<'a, I>(
        &self,
        state: RatingState,
        rankings: I,
    ) -> Result<RatingState, ConfigError>
    where
        I: IntoIterator<Item = &'a Ranking>,
    {
        rankings
            .into_iter()
            .try_fold(state, |state, ranking| self.update(state, ranking))
    }

    /// Closed-form win probability of every candidate, in state order.
    pub fn predict_win(&self, state: &RatingState) -> Vec<(String, f64)> {
        let ratings: Vec<Rating> = state.ratings.iter().map(|(_, r)| *r).collect();
        state
            .ratings
            .iter()
            .map(|(name, _)| name.clone())
            .zip(model::predict_win(&self.params, &ratings))
            .collect()
    }
}
