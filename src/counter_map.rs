//! Conditional distribution tables.
//!
//! A [`CounterMap`] maps a context to a [`Counter`] row. Rows are created on
//! first write and inherit the table's default, so lookups under a context
//! that was never trained still answer with that default.

use crate::counter::{Counter, DeterministicMap};
use crate::errors::{LabelingError, LabelingResult};
use std::borrow::Borrow;
use std::fmt::Display;

/// Context to scored-row table with lazily created rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterMap<K: Ord, V: Ord> {
    rows: DeterministicMap<K, Counter<V>>,
    default: f64,
}

impl<K: Ord, V: Ord> Default for CounterMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V: Ord> CounterMap<K, V> {
    /// Create an empty table whose rows default to `0.0`.
    pub fn new() -> Self {
        Self::with_default(0.0)
    }

    /// Create an empty table whose rows default to `default`.
    pub fn with_default(default: f64) -> Self {
        Self {
            rows: DeterministicMap::new(),
            default,
        }
    }

    /// Default carried by new rows and by lookups under unseen contexts.
    pub fn default_value(&self) -> f64 {
        self.default
    }

    /// Mutable row for `context`, created empty if absent.
    pub fn entry(&mut self, context: K) -> &mut Counter<V> {
        let default = self.default;
        self.rows
            .entry(context)
            .or_insert_with(|| Counter::with_default(default))
    }

    /// Row for `context`, if one was ever written.
    pub fn row<Q>(&self, context: &Q) -> Option<&Counter<V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.get(context)
    }

    /// Whether a row exists for `context`.
    pub fn contains_key<Q>(&self, context: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.contains_key(context)
    }

    /// Score of `key` under `context`, falling back to the row or table default.
    pub fn get<Q, R>(&self, context: &Q, key: &R) -> f64
    where
        K: Borrow<Q>,
        V: Borrow<R>,
        Q: Ord + ?Sized,
        R: Ord + ?Sized,
    {
        self.rows
            .get(context)
            .map_or(self.default, |row| row.get(key))
    }

    /// Add `amount` to `key` under `context`.
    pub fn increment(&mut self, context: K, key: V, amount: f64) {
        self.entry(context).increment(key, amount);
    }

    /// Number of contexts.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Contexts in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }

    /// `(context, row)` pairs in context order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Counter<V>)> {
        self.rows.iter()
    }

    /// Normalize every row independently.
    pub fn normalize_rows(&mut self) {
        for row in self.rows.values_mut() {
            row.normalize();
        }
    }

    /// Log-transform every row independently; the table default follows.
    pub fn log_rows(&mut self) {
        for row in self.rows.values_mut() {
            row.log();
        }
        self.default = if self.default > 0.0 {
            self.default.ln()
        } else {
            f64::NEG_INFINITY
        };
    }
}

impl<K: Ord + Clone, V: Ord + Clone> CounterMap<K, V> {
    /// Swap contexts and keys: `inverted[key][context] = self[context][key]`.
    ///
    /// Rows of the inverted table default to `default`, so pairs that never
    /// appeared in `self` read back as `default` rather than `0.0`.
    pub fn invert(&self, default: f64) -> CounterMap<V, K> {
        let mut inverted = CounterMap::with_default(default);
        for (context, row) in &self.rows {
            for (key, score) in row.iter() {
                inverted.entry(key.clone()).set(context.clone(), score);
            }
        }
        inverted
    }
}

impl<K: Ord + Display, V: Ord> CounterMap<K, V> {
    /// Check that every log-space row carries probability mass 1 within `tolerance`.
    pub fn validate_rows(&self, tolerance: f64) -> LabelingResult<()> {
        for (context, row) in &self.rows {
            let mass: f64 = row.iter().map(|(_, score)| score.exp()).sum();
            if !((mass - 1.0).abs() <= tolerance) {
                return Err(LabelingError::DistributionInvariant {
                    context: context.to_string(),
                    mass,
                });
            }
        }
        Ok(())
    }
}
