//! Sparse scored mappings with deterministic iteration.
//!
//! A [`Counter`] maps keys to `f64` scores and answers absent keys with a
//! configurable default. It is used both for raw counts during training and
//! for log-probability rows once a table has been normalized.
//!
//! Storage is a [`DeterministicMap`] so that every traversal (normalization,
//! arg-max tie-breaking, weighted draws) visits keys in the same order on
//! every platform.

use crate::errors::{LabelingError, LabelingResult};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Map with ordered iteration, used wherever traversal order affects output.
pub type DeterministicMap<K, V> = BTreeMap<K, V>;

/// Sparse key to score mapping with a default for absent keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter<K: Ord> {
    values: DeterministicMap<K, f64>,
    default: f64,
}

impl<K: Ord> Default for Counter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> Counter<K> {
    /// Create an empty counter whose absent keys score `0.0`.
    pub fn new() -> Self {
        Self::with_default(0.0)
    }

    /// Create an empty counter with the given default score.
    pub fn with_default(default: f64) -> Self {
        Self {
            values: DeterministicMap::new(),
            default,
        }
    }

    /// Score reported for keys that are not stored.
    pub fn default_value(&self) -> f64 {
        self.default
    }

    /// Replace the default score.
    pub fn set_default(&mut self, default: f64) {
        self.default = default;
    }

    /// Stored score for `key`, or the default.
    pub fn get<Q>(&self, key: &Q) -> f64
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.values.get(key).copied().unwrap_or(self.default)
    }

    /// Whether `key` has an explicitly stored score.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.values.contains_key(key)
    }

    /// Store a score, replacing any previous value.
    pub fn set(&mut self, key: K, value: f64) {
        self.values.insert(key, value);
    }

    /// Add `amount` to the score of `key`, starting from the default.
    pub fn increment(&mut self, key: K, amount: f64) {
        let default = self.default;
        *self.values.entry(key).or_insert(default) += amount;
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stored keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.values.keys()
    }

    /// Stored `(key, score)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.values.iter().map(|(k, &v)| (k, v))
    }

    /// Sum of all stored scores.
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    /// Divide every stored score by the total.
    ///
    /// A zero total leaves the counter untouched; normalization cannot
    /// repair an all-zero row.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total == 0.0 {
            return;
        }
        for value in self.values.values_mut() {
            *value /= total;
        }
    }

    /// Replace every score (and the default) with its natural logarithm.
    ///
    /// Non-positive values map to `-inf`.
    pub fn log(&mut self) {
        for value in self.values.values_mut() {
            *value = safe_ln(*value);
        }
        self.default = safe_ln(self.default);
    }

    /// Key with the highest score; the first such key in key order on ties.
    pub fn arg_max(&self) -> LabelingResult<&K> {
        let mut best: Option<(&K, f64)> = None;
        for (key, &value) in &self.values {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                Some(_) if value.is_nan() => {}
                _ => best = Some((key, value)),
            }
        }
        best.map(|(key, _)| key)
            .ok_or_else(|| LabelingError::EmptyDistribution {
                operation: "Counter::arg_max".to_string(),
            })
    }

    /// Pick a key by walking probability-space scores against a uniform draw.
    ///
    /// Returns `None` when the row's mass does not cover `draw`.
    pub fn draw_linear(&self, draw: f64) -> Option<&K> {
        self.draw_with(draw, |value| value)
    }

    /// Same as [`Counter::draw_linear`] for log-space scores.
    pub fn draw_log(&self, draw: f64) -> Option<&K> {
        self.draw_with(draw, f64::exp)
    }

    fn draw_with(&self, draw: f64, to_mass: impl Fn(f64) -> f64) -> Option<&K> {
        let mut remaining = draw;
        for (key, &value) in &self.values {
            remaining -= to_mass(value);
            if remaining <= 0.0 {
                return Some(key);
            }
        }
        None
    }
}

impl<K: Ord + Clone> Counter<K> {
    /// Elementwise sum over the union of keys, using each side's default for
    /// keys it lacks. The result's default is the sum of both defaults.
    pub fn combine(&self, other: &Counter<K>) -> Counter<K> {
        let mut combined = self.clone();
        combined += other;
        combined
    }
}

impl<K: Ord + Clone> AddAssign<&Counter<K>> for Counter<K> {
    fn add_assign(&mut self, other: &Counter<K>) {
        let own_default = self.default;
        for (key, value) in self.values.iter_mut() {
            *value += other.get(key);
        }
        for (key, &value) in &other.values {
            if !self.values.contains_key(key) {
                self.values.insert(key.clone(), own_default + value);
            }
        }
        self.default = own_default + other.default;
    }
}

impl<K: Ord> FromIterator<(K, f64)> for Counter<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut counter = Counter::new();
        for (key, value) in iter {
            counter.set(key, value);
        }
        counter
    }
}

fn safe_ln(value: f64) -> f64 {
    if value > 0.0 {
        value.ln()
    } else {
        f64::NEG_INFINITY
    }
}
