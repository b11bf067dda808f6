//! # Sequence HMM
//!
//! Supervised Hidden Markov Model sequence labeling over symbolic labels and
//! emissions.
//!
//! A model is estimated once from a labeled corpus by relative-frequency
//! counting, then answers three kinds of query: the most probable labeling
//! of an emission sequence (Viterbi decoding), the log-probability of a
//! given labeling, and an unbounded stream of `(label, emission)` samples.
//!
//! ## Key Features
//!
//! - **Log-space tables**: every distribution is stored as log-probabilities
//!   in deterministic, ordered maps
//! - **Label histories**: transition tables are estimated for every history
//!   order up to a configured maximum; any of them can drive decoding
//! - **Sequence boundaries**: `<START>`/`<STOP>` sentinels pad each sequence
//!   and may be embedded to concatenate a corpus
//! - **Unseen emissions**: a pluggable [`Fallback`] supplies label
//!   distributions for emissions absent from training
//! - **Reproducible sampling**: seeded ChaCha20 random sources
//!
//! ## Quick Start
//!
//! ```rust
//! use sequence_hmm::{Fallback, HiddenMarkovModel, SamplingConfig, TrainingConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let corpus = vec![
//!         ("DET", "the"), ("NOUN", "dog"), ("VERB", "barks"),
//!         ("DET", "a"), ("NOUN", "cat"), ("VERB", "sleeps"),
//!     ];
//!     let model = HiddenMarkovModel::train(corpus, &TrainingConfig::default(), Fallback::Uniform)?;
//!
//!     let labels = model.label(&["the", "cat", "barks"])?;
//!     assert_eq!(labels, vec!["DET", "NOUN", "VERB"]);
//!
//!     let score = model.score(&[("DET", "the"), ("NOUN", "cat"), ("VERB", "barks")])?;
//!     assert!(score.is_finite());
//!
//!     let sampled: Vec<_> = model
//!         .sample(None, &SamplingConfig::seeded(42))?
//!         .take(10)
//!         .collect::<Result<_, _>>()?;
//!     assert_eq!(sampled.len(), 10);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! [`Counter`] and [`CounterMap`] are the scored-map primitives every table is
//! built from. [`history`] turns a padded labeled sequence into per-position
//! [`LabelHistory`] contexts. [`HiddenMarkovModel`] owns the trained tables
//! and implements training, scoring, decoding and sampling.
//! [`SyntheticChain`] draws ground-truth sequences from hand-written chains.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod counter;
pub mod counter_map;
pub mod errors;
pub mod history;
pub mod rng;

// Model
pub mod fallback;
pub mod generators;
pub mod hmm;

// Re-exports for convenience - main public API
pub use config::{SamplingConfig, TrainingConfig, MAX_HISTORY_ORDER};
pub use counter::{Counter, DeterministicMap};
pub use counter_map::CounterMap;
pub use errors::{LabelingError, LabelingResult};
pub use fallback::{Fallback, FallbackModel, LabelPriorFallback, SuffixFallback};
pub use generators::SyntheticChain;
pub use history::{Emission, Label, LabelHistory, START_LABEL, STOP_LABEL};
pub use hmm::{HiddenMarkovModel, Sampler};
pub use rng::SequenceRng;
