//! Sparse categorical distributions over model outcomes.

use rand::Rng;

/// Tolerance used when checking that probabilities sum to one.
pub const PROB_TOLERANCE: f64 = 1e-9;

/// A finite probability distribution stored as `(outcome, probability)` pairs.
///
/// Invariants:
/// - Outcomes are distinct
/// - Probabilities are strictly positive
/// - Probabilities sum to 1 (within [`PROB_TOLERANCE`])
///
/// Outcomes keep the order in which they were first added, which makes
/// sampling reproducible for a seeded RNG.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical<T> {
    support: Vec<(T, f64)>,
}

impl<T: PartialEq> Categorical<T> {
    /// A point mass on `outcome`.
    pub fn point(outcome: T) -> Self {
        Self {
            support: vec![(outcome, 1.0)],
        }
    }

    /// Builds a distribution by accumulating weight per outcome.
    ///
    /// Repeated outcomes are merged and zero weights are dropped. Callers are
    /// expected to supply weights that already sum to one.
    pub fn from_weights<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut support: Vec<(T, f64)> = Vec::new();
        for (outcome, weight) in weights {
            if weight <= 0.0 {
                continue;
            }
            match support.iter_mut().find(|(existing, _)| *existing == outcome) {
                Some((_, total)) => *total += weight,
                None => support.push((outcome, weight)),
            }
        }
        debug_assert!(
            (support.iter().map(|(_, p)| p).sum::<f64>() - 1.0).abs() <= PROB_TOLERANCE,
            "categorical weights must sum to one"
        );
        Self { support }
    }

    /// Uniform distribution over the given outcomes.
    ///
    /// # Panics
    ///
    /// Panics if `outcomes` is empty.
    pub fn uniform(outcomes: Vec<T>) -> Self {
        assert!(
            !outcomes.is_empty(),
            "Cannot create uniform distribution over empty set"
        );
        let p = 1.0 / outcomes.len() as f64;
        Self {
            support: outcomes.into_iter().map(|outcome| (outcome, p)).collect(),
        }
    }

    /// Probability assigned to `outcome` (zero if it is not in the support).
    pub fn probability(&self, outcome: &T) -> f64 {
        self.support
            .iter()
            .find(|(existing, _)| existing == outcome)
            .map_or(0.0, |(_, p)| *p)
    }

    /// Iterates over `(outcome, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.support.iter().map(|(outcome, p)| (outcome, *p))
    }

    /// Outcomes with non-zero probability.
    pub fn support(&self) -> impl Iterator<Item = &T> {
        self.support.iter().map(|(outcome, _)| outcome)
    }

    /// Number of outcomes with non-zero probability.
    pub fn len(&self) -> usize {
        self.support.len()
    }

    pub fn is_empty(&self) -> bool {
        self.support.is_empty()
    }

    /// Sum of all probabilities; one up to floating point error.
    pub fn total(&self) -> f64 {
        self.support.iter().map(|(_, p)| p).sum()
    }

    /// Applies `f` to every outcome, merging outcomes that collide.
    pub fn map<U: PartialEq, F: FnMut(&T) -> U>(&self, mut f: F) -> Categorical<U> {
        Categorical::from_weights(self.support.iter().map(|(outcome, p)| (f(outcome), *p)))
    }

    /// Draws an outcome using inverse transform sampling.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &T {
        let threshold: f64 = rng.random::<f64>() * self.total();
        let mut cumulative = 0.0;
        for (outcome, p) in &self.support {
            cumulative += p;
            if threshold < cumulative {
                return outcome;
            }
        }
        // Rounding can leave the threshold just above the final cumulative sum.
        &self.support[self.support.len() - 1].0
    }
}
