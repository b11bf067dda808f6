//! Synthetic labeled sequences from explicit Markov chains.
//!
//! A [`SyntheticChain`] holds linear-space transition and emission tables
//! written by hand, and draws labeled trajectories from them. It is the
//! ground truth against which a trained model's decoder can be checked.

use crate::counter_map::CounterMap;
use crate::errors::{LabelingError, LabelingResult};
use crate::history::{Emission, Label};
use crate::rng::SequenceRng;

/// Tolerance on the probability mass of each hand-written row.
const ROW_MASS_TOLERANCE: f64 = 1e-9;

/// Markov chain with known transition and emission probabilities
#[derive(Debug, Clone)]
pub struct SyntheticChain {
    transitions: CounterMap<Label, Label>,
    emissions: CounterMap<Label, Emission>,
}

impl SyntheticChain {
    /// Build a chain from probability (not log) tables.
    ///
    /// Every transition row and every emission row must sum to one, and
    /// every label reachable by a transition must have an emission row.
    pub fn new(
        transitions: CounterMap<Label, Label>,
        emissions: CounterMap<Label, Emission>,
    ) -> LabelingResult<Self> {
        let chain = Self {
            transitions,
            emissions,
        };
        chain.validate()?;
        Ok(chain)
    }

    /// Check row masses and that every label can emit.
    pub fn validate(&self) -> LabelingResult<()> {
        if self.transitions.is_empty() {
            return Err(LabelingError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        for (context, row) in self.transitions.iter().chain(self.emissions.iter()) {
            let mass = row.total();
            if (mass - 1.0).abs() > ROW_MASS_TOLERANCE {
                return Err(LabelingError::DistributionInvariant {
                    context: context.clone(),
                    mass,
                });
            }
        }
        for (context, row) in self.transitions.iter() {
            for label in std::iter::once(context).chain(row.keys()) {
                if !self.emissions.contains_key(label.as_str()) {
                    return Err(LabelingError::UnknownLabel {
                        label: label.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Labels with outgoing transitions, in order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.transitions.keys()
    }

    /// Label chosen uniformly among those with outgoing transitions.
    pub fn random_label(&self, rng: &mut SequenceRng) -> Label {
        let labels: Vec<&Label> = self.labels().collect();
        labels[rng.usize(0..labels.len())].clone()
    }

    /// Draw the successor of `label`.
    pub fn next_label(&self, label: &str, rng: &mut SequenceRng) -> LabelingResult<Label> {
        Self::draw(&self.transitions, label, "transition", rng)
    }

    /// Draw an emission for `label`.
    pub fn emit(&self, label: &str, rng: &mut SequenceRng) -> LabelingResult<Emission> {
        Self::draw(&self.emissions, label, "emission", rng)
    }

    /// Walk `steps` transitions from `start` and return where the walk ends.
    pub fn burn_in(
        &self,
        start: &str,
        steps: usize,
        rng: &mut SequenceRng,
    ) -> LabelingResult<Label> {
        let mut label = start.to_string();
        for _ in 0..steps {
            label = self.next_label(&label, rng)?;
        }
        Ok(label)
    }

    /// `length` labeled pairs starting at `start`.
    pub fn trajectory(
        &self,
        start: &str,
        length: usize,
        rng: &mut SequenceRng,
    ) -> LabelingResult<Vec<(Label, Emission)>> {
        let mut pairs = Vec::with_capacity(length);
        let mut label = start.to_string();
        for step in 0..length {
            let emission = self.emit(&label, rng)?;
            let next = if step + 1 < length {
                Some(self.next_label(&label, rng)?)
            } else {
                None
            };
            pairs.push((label, emission));
            match next {
                Some(next) => label = next,
                None => break,
            }
        }
        Ok(pairs)
    }

    fn draw(
        table: &CounterMap<Label, String>,
        context: &str,
        kind: &str,
        rng: &mut SequenceRng,
    ) -> LabelingResult<String> {
        let row = table
            .row(context)
            .ok_or_else(|| LabelingError::UnknownLabel {
                label: context.to_string(),
            })?;
        let draw = rng.f64();
        row.draw_linear(draw)
            .cloned()
            .ok_or_else(|| LabelingError::DistributionExhausted {
                context: format!("{} from {} (draw #{})", kind, context, rng.draws()),
                draw,
            })
    }
}
