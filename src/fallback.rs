//! Fallback label distributions for emissions absent from training.
//!
//! The primary tables are never smoothed. When decoding or scoring meets an
//! emission with no row in the label-emission table, the model asks its
//! [`Fallback`] for a log-distribution over labels instead.

use crate::counter::Counter;
use crate::counter_map::CounterMap;
use crate::errors::{validate_order, LabelingError, LabelingResult};
use crate::history::{Emission, Label};
use std::fmt;

/// Auxiliary classifier consulted for unseen emissions.
pub trait FallbackModel: fmt::Debug {
    /// Fit the classifier on non-sentinel `(label, emission)` pairs.
    ///
    /// Classifiers that need no fitting override this with `Ok(())`.
    fn train(&mut self, pairs: &[(Label, Emission)]) -> LabelingResult<()> {
        let _ = pairs;
        Err(LabelingError::NotImplemented {
            feature: format!("{:?}::train", self),
        })
    }

    /// Log-probability of each label given `emission`.
    fn label_distribution(&self, emission: &str) -> Counter<Label>;
}

/// How a model handles emissions it never saw.
#[derive(Debug, Default)]
pub enum Fallback {
    /// Uniform log-distribution over every known label.
    #[default]
    Uniform,
    /// Delegate to an auxiliary classifier trained alongside the model.
    Delegate(Box<dyn FallbackModel>),
}

impl Fallback {
    /// Wrap an untrained classifier.
    pub fn delegate(model: impl FallbackModel + 'static) -> Self {
        Fallback::Delegate(Box::new(model))
    }

    /// Whether no auxiliary classifier is configured.
    pub fn is_uniform(&self) -> bool {
        matches!(self, Fallback::Uniform)
    }
}

/// Label prior estimated from the training pairs, ignoring the emission.
#[derive(Debug, Clone)]
pub struct LabelPriorFallback {
    prior: Counter<Label>,
}

impl LabelPriorFallback {
    /// Untrained prior.
    pub fn new() -> Self {
        Self {
            prior: Counter::with_default(f64::NEG_INFINITY),
        }
    }
}

impl Default for LabelPriorFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackModel for LabelPriorFallback {
    fn train(&mut self, pairs: &[(Label, Emission)]) -> LabelingResult<()> {
        self.prior = log_prior(pairs);
        Ok(())
    }

    fn label_distribution(&self, _emission: &str) -> Counter<Label> {
        self.prior.clone()
    }
}

/// Label distribution conditioned on the emission's trailing characters.
///
/// Looks up the longest suffix seen in training, backing off to shorter
/// suffixes and finally to the label prior.
#[derive(Debug, Clone)]
pub struct SuffixFallback {
    max_suffix: usize,
    suffixes: CounterMap<String, Label>,
    prior: Counter<Label>,
}

impl SuffixFallback {
    /// Untrained classifier over suffixes of up to `max_suffix` characters.
    pub fn new(max_suffix: usize) -> LabelingResult<Self> {
        validate_order(max_suffix, 1, usize::MAX, "max_suffix")?;
        Ok(Self {
            max_suffix,
            suffixes: CounterMap::new(),
            prior: Counter::with_default(f64::NEG_INFINITY),
        })
    }

    /// Longest suffix length considered.
    pub fn max_suffix(&self) -> usize {
        self.max_suffix
    }
}

impl FallbackModel for SuffixFallback {
    fn train(&mut self, pairs: &[(Label, Emission)]) -> LabelingResult<()> {
        let mut suffixes = CounterMap::new();
        for (label, emission) in pairs {
            let chars: Vec<char> = emission.chars().collect();
            for length in 1..=self.max_suffix.min(chars.len()) {
                let suffix: String = chars[chars.len() - length..].iter().collect();
                suffixes.increment(suffix, label.clone(), 1.0);
            }
        }
        suffixes.normalize_rows();
        suffixes.log_rows();

        self.suffixes = suffixes;
        self.prior = log_prior(pairs);
        Ok(())
    }

    fn label_distribution(&self, emission: &str) -> Counter<Label> {
        let chars: Vec<char> = emission.chars().collect();
        for length in (1..=self.max_suffix.min(chars.len())).rev() {
            let suffix: String = chars[chars.len() - length..].iter().collect();
            if let Some(row) = self.suffixes.row(suffix.as_str()) {
                return row.clone();
            }
        }
        self.prior.clone()
    }
}

fn log_prior(pairs: &[(Label, Emission)]) -> Counter<Label> {
    let mut prior = Counter::new();
    for (label, _) in pairs {
        prior.increment(label.clone(), 1.0);
    }
    prior.normalize();
    prior.log();
    prior
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(Label, Emission)> {
        raw.iter()
            .map(|(l, e)| (l.to_string(), e.to_string()))
            .collect()
    }

    #[test]
    fn test_label_prior() {
        let mut model = LabelPriorFallback::new();
        model
            .train(&pairs(&[("N", "dog"), ("N", "cat"), ("V", "runs"), ("N", "fish")]))
            .unwrap();
        let dist = model.label_distribution("anything");
        assert_approx_eq!(dist.get("N"), 0.75f64.ln(), 1e-12);
        assert_approx_eq!(dist.get("V"), 0.25f64.ln(), 1e-12);
        assert_eq!(dist.get("ADJ"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_untrained_fallback_is_empty() {
        let model = LabelPriorFallback::new();
        let dist = model.label_distribution("x");
        assert!(dist.is_empty());
        assert_eq!(dist.get("N"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_suffix_prefers_longest_match() {
        let mut model = SuffixFallback::new(3).unwrap();
        model
            .train(&pairs(&[
                ("V", "walking"),
                ("V", "talking"),
                ("N", "king"),
                ("N", "dog"),
            ]))
            .unwrap();

        // "ing" is shared by V and N; "ing" row is V:2, N:1.
        let dist = model.label_distribution("singing");
        assert_approx_eq!(dist.get("V"), (2.0f64 / 3.0).ln(), 1e-12);
        assert_approx_eq!(dist.get("N"), (1.0f64 / 3.0).ln(), 1e-12);

        // backs off to the one-character suffix "g"
        let dist = model.label_distribution("hug");
        assert_approx_eq!(dist.get("N"), 0.5f64.ln(), 1e-12);
    }

    #[test]
    fn test_suffix_backs_off_to_prior() {
        let mut model = SuffixFallback::new(2).unwrap();
        model.train(&pairs(&[("A", "xa"), ("B", "yb")])).unwrap();
        let dist = model.label_distribution("zzz");
        assert_approx_eq!(dist.get("A"), 0.5f64.ln(), 1e-12);
        assert_approx_eq!(dist.get("B"), 0.5f64.ln(), 1e-12);
    }

    #[test]
    fn test_zero_suffix_length_rejected() {
        assert!(SuffixFallback::new(0).is_err());
    }

    #[derive(Debug)]
    struct Untrainable;

    impl FallbackModel for Untrainable {
        fn label_distribution(&self, _emission: &str) -> Counter<Label> {
            Counter::with_default(f64::NEG_INFINITY)
        }
    }

    #[test]
    fn test_missing_train_reports_not_implemented() {
        let mut model = Untrainable;
        match model.train(&pairs(&[("A", "a")])) {
            Err(LabelingError::NotImplemented { feature }) => {
                assert_eq!(feature, "Untrainable::train")
            }
            other => panic!("Expected NotImplemented error, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_variants() {
        assert!(Fallback::default().is_uniform());
        assert!(!Fallback::delegate(LabelPriorFallback::new()).is_uniform());
    }
}
