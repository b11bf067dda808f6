//! Hidden Markov Model sequence labeler.
//!
//! The model is estimated once from a labeled corpus by relative-frequency
//! counting. All tables are kept in log space. Decoding is Viterbi over
//! label-history contexts of the active order; for the default first-order
//! model a context is simply the previous label.
//!
//! Lifecycle: [`HiddenMarkovModel::train`] is the only constructor and every
//! query takes `&self`, so a model cannot be queried while it is being
//! trained and cannot be retrained in place.

use crate::{
    config::{SamplingConfig, TrainingConfig},
    counter::{Counter, DeterministicMap},
    counter_map::CounterMap,
    errors::{validate_sequence_length, LabelingError, LabelingResult},
    fallback::Fallback,
    history::{
        expand_histories, is_boundary, pad_emissions, pad_pairs, Emission, ExpandedPosition,
        Label, LabelHistory, START_LABEL, STOP_LABEL,
    },
    rng::SequenceRng,
};
use std::borrow::Cow;

/// Allowed deviation of a trained row's probability mass from one.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// Consecutive sentinel transitions the sampler tolerates before giving up.
pub const MAX_BOUNDARY_STEPS: usize = 1000;

/// Context to next-label log-probabilities.
pub type TransitionTable = CounterMap<LabelHistory, Label>;

/// Next-label to context log-probabilities; the decoder's predecessor index.
pub type ReverseTransitionTable = CounterMap<Label, LabelHistory>;

type Backpointers = DeterministicMap<LabelHistory, LabelHistory>;

/// Supervised Hidden Markov Model over symbolic labels and emissions
#[derive(Debug)]
pub struct HiddenMarkovModel {
    /// Known non-sentinel labels, sorted
    labels: Vec<Label>,
    history_order: usize,
    active_order: usize,
    /// One table per order `1..=history_order`
    transitions: Vec<TransitionTable>,
    reverse_transitions: Vec<ReverseTransitionTable>,
    /// p(emission | label)
    emission: CounterMap<Label, Emission>,
    /// p(label | emission)
    label_emissions: CounterMap<Emission, Label>,
    fallback: Fallback,
}

impl HiddenMarkovModel {
    /// Estimate a model from one labeled sequence.
    ///
    /// Embedded `(STOP, STOP)`/`(START, START)` pairs may be used to
    /// concatenate several independent sequences. A delegating `fallback` is
    /// trained on the non-sentinel pairs, capped at
    /// `config.fallback_training_limit`.
    pub fn train<L, E, I>(
        labeled_sequence: I,
        config: &TrainingConfig,
        fallback: Fallback,
    ) -> LabelingResult<Self>
    where
        I: IntoIterator<Item = (L, E)>,
        L: Into<Label>,
        E: Into<Emission>,
    {
        config.validate()?;

        let padded = pad_pairs(labeled_sequence);
        validate_sequence_length(padded.len() - 2, 1)?;

        let order = config.history_order;
        let expanded = expand_histories(&padded, order);

        let mut emission = CounterMap::new();
        let mut label_emissions = CounterMap::new();
        let mut transitions: Vec<TransitionTable> = (0..order).map(|_| CounterMap::new()).collect();

        let mut previous: Option<&ExpandedPosition> = None;
        for position in &expanded {
            let label = position.label();
            // Emissions are conditioned on the plain label only
            emission.increment(label.to_string(), position.emission.clone(), 1.0);
            label_emissions.increment(position.emission.clone(), label.to_string(), 1.0);

            if let Some(previous) = previous {
                for (index, table) in transitions.iter_mut().enumerate() {
                    table.increment(previous.history(index + 1).clone(), label.to_string(), 1.0);
                }
            }
            previous = Some(position);
        }

        emission.normalize_rows();
        emission.log_rows();
        label_emissions.normalize_rows();
        label_emissions.log_rows();
        for table in &mut transitions {
            table.normalize_rows();
            table.log_rows();
        }

        emission.validate_rows(NORMALIZATION_TOLERANCE)?;
        label_emissions.validate_rows(NORMALIZATION_TOLERANCE)?;
        for table in &transitions {
            table.validate_rows(NORMALIZATION_TOLERANCE)?;
        }

        let reverse_transitions = transitions
            .iter()
            .map(|table| table.invert(f64::NEG_INFINITY))
            .collect();

        let labels: Vec<Label> = emission
            .keys()
            .filter(|label| !is_boundary(label))
            .cloned()
            .collect();
        validate_sequence_length(labels.len(), 1)?;

        let mut fallback = fallback;
        if let Fallback::Delegate(model) = &mut fallback {
            let mut pairs: Vec<(Label, Emission)> = expanded
                .iter()
                .filter(|position| !position.is_boundary())
                .map(|position| (position.label().to_string(), position.emission.clone()))
                .collect();
            if let Some(limit) = config.fallback_training_limit {
                if pairs.len() > limit {
                    log::warn!(
                        "Fallback training truncated to {} of {} pairs",
                        limit,
                        pairs.len()
                    );
                    pairs.truncate(limit);
                }
            }
            model.train(&pairs)?;
        }

        log::debug!(
            "Trained HMM: {} labels, {} emissions, transition contexts per order {:?}, active order {}",
            labels.len(),
            label_emissions.len(),
            transitions.iter().map(CounterMap::len).collect::<Vec<_>>(),
            config.active_order
        );

        Ok(Self {
            labels,
            history_order: order,
            active_order: config.active_order,
            transitions,
            reverse_transitions,
            emission,
            label_emissions,
            fallback,
        })
    }

    /// Known labels, excluding sentinels.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Highest history order a transition table was estimated for.
    pub fn history_order(&self) -> usize {
        self.history_order
    }

    /// Order used by scoring, decoding and sampling.
    pub fn active_order(&self) -> usize {
        self.active_order
    }

    /// Transition table of a given order (1-based).
    pub fn transition(&self, order: usize) -> Option<&TransitionTable> {
        order.checked_sub(1).and_then(|index| self.transitions.get(index))
    }

    /// Reverse transition table of a given order (1-based).
    pub fn reverse_transition(&self, order: usize) -> Option<&ReverseTransitionTable> {
        order
            .checked_sub(1)
            .and_then(|index| self.reverse_transitions.get(index))
    }

    /// Transition table of the active order.
    pub fn active_transition(&self) -> &TransitionTable {
        &self.transitions[self.active_order - 1]
    }

    /// Reverse transition table of the active order.
    pub fn active_reverse_transition(&self) -> &ReverseTransitionTable {
        &self.reverse_transitions[self.active_order - 1]
    }

    /// log p(emission | label).
    pub fn emission(&self) -> &CounterMap<Label, Emission> {
        &self.emission
    }

    /// log p(label | emission), the table consulted when scoring and decoding.
    pub fn label_emissions(&self) -> &CounterMap<Emission, Label> {
        &self.label_emissions
    }

    /// Configured fallback.
    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Label distribution for an emission the label-emission table may not know.
    ///
    /// Delegates to the fallback classifier when one is configured, otherwise
    /// returns `ln(1/|labels|)` for every known label.
    pub fn fallback_probs(&self, emission: &str) -> Counter<Label> {
        match &self.fallback {
            Fallback::Delegate(model) => model.label_distribution(emission),
            Fallback::Uniform => {
                let uniform = (1.0 / self.labels.len() as f64).ln();
                let mut distribution = Counter::with_default(f64::NEG_INFINITY);
                for label in &self.labels {
                    distribution.set(label.clone(), uniform);
                }
                distribution
            }
        }
    }

    fn emission_scores(&self, emission: &str) -> Cow<'_, Counter<Label>> {
        match self.label_emissions.row(emission) {
            Some(row) => Cow::Borrowed(row),
            None => {
                log::trace!("Emission {:?} unseen in training, using fallback", emission);
                Cow::Owned(self.fallback_probs(emission))
            }
        }
    }

    /// Total log-probability of a fully labeled sequence.
    ///
    /// Returns `-inf` when any transition or emission has zero probability.
    pub fn score<L, E>(&self, labeled_sequence: &[(L, E)]) -> LabelingResult<f64>
    where
        L: AsRef<str>,
        E: AsRef<str>,
    {
        validate_sequence_length(labeled_sequence.len(), 1)?;
        let transition = self.active_transition();

        let mut score = self.emission_scores(START_LABEL).get(START_LABEL);
        let mut context = LabelHistory::start();
        for (label, emission) in labeled_sequence {
            let (label, emission) = (label.as_ref(), emission.as_ref());
            score += self.emission_scores(emission).get(label);
            score += transition.get(&context, label);
            context = context.extend(label, self.active_order);
        }
        score += transition.get(&context, STOP_LABEL);
        score += self.emission_scores(STOP_LABEL).get(STOP_LABEL);

        Ok(score)
    }

    /// Most probable label sequence for `emissions`.
    pub fn label<E: AsRef<str>>(&self, emissions: &[E]) -> LabelingResult<Vec<Label>> {
        self.label_with_score(emissions).map(|(labels, _)| labels)
    }

    /// Most probable label sequence and its log-score at `STOP`.
    ///
    /// When no finite path reaches some position, backtracking substitutes
    /// `STOP` for the unreachable label and continues from there; the score
    /// is then `-inf`.
    pub fn label_with_score<E: AsRef<str>>(
        &self,
        emissions: &[E],
    ) -> LabelingResult<(Vec<Label>, f64)> {
        validate_sequence_length(emissions.len(), 1)?;

        let padded = pad_emissions(emissions);
        let last = padded.len() - 1;
        let stop_only = [STOP_LABEL.to_string()];

        let mut columns: Vec<Counter<LabelHistory>> = Vec::with_capacity(padded.len());
        let mut backtrack: Vec<Backpointers> = Vec::with_capacity(padded.len());

        let mut initial = Counter::with_default(f64::NEG_INFINITY);
        initial.set(LabelHistory::start(), 0.0);
        columns.push(initial);
        backtrack.push(Backpointers::new());

        for (position, &emission) in padded.iter().enumerate().skip(1) {
            let candidates: &[Label] = if position == last {
                &stop_only
            } else {
                &self.labels
            };
            let emission_scores = self.emission_scores(emission);
            let (column, pointers) =
                self.viterbi_step(&columns[position - 1], candidates, &emission_scores);
            columns.push(column);
            backtrack.push(pointers);
        }

        let score = columns[last].get(&LabelHistory::stop());
        Ok((Self::backtrack(&backtrack), score))
    }

    fn viterbi_step(
        &self,
        previous: &Counter<LabelHistory>,
        candidates: &[Label],
        emission_scores: &Counter<Label>,
    ) -> (Counter<LabelHistory>, Backpointers) {
        let reverse = self.active_reverse_transition();
        let mut column = Counter::with_default(f64::NEG_INFINITY);
        let mut pointers = Backpointers::new();

        for label in candidates {
            let row = match reverse.row(label.as_str()) {
                Some(row) => row,
                None => continue,
            };
            let arrivals = previous.combine(row);

            // Several predecessors can share a successor context at order > 1
            let mut best: DeterministicMap<LabelHistory, (f64, &LabelHistory)> =
                DeterministicMap::new();
            for (context, score) in arrivals.iter() {
                if !score.is_finite() {
                    continue;
                }
                let next = context.extend(label, self.active_order);
                let improves = best
                    .get(&next)
                    .map_or(true, |&(best_score, _)| score > best_score);
                if improves {
                    best.insert(next, (score, context));
                }
            }

            let emission_score = emission_scores.get(label.as_str());
            for (next, (score, context)) in best {
                pointers.insert(next.clone(), context.clone());
                column.set(next, score + emission_score);
            }
        }

        (column, pointers)
    }

    fn backtrack(pointers: &[Backpointers]) -> Vec<Label> {
        let mut labels = Vec::with_capacity(pointers.len());
        let mut current = LabelHistory::stop();

        for position in (1..pointers.len()).rev() {
            current = match pointers[position].get(&current) {
                Some(previous) => previous.clone(),
                None => {
                    log::warn!(
                        "No finite path reaches {} at position {}, substituting {}",
                        current,
                        position,
                        STOP_LABEL
                    );
                    LabelHistory::stop()
                }
            };
            labels.push(current.last().to_string());
        }

        // The last recovered label sits at position 0
        labels.pop();
        labels.reverse();
        labels
    }

    /// Lazy, unbounded stream of `(label, emission)` pairs drawn from the model.
    ///
    /// Sampling starts from a trained context of the active order: one ending
    /// in `start` when given, otherwise any, walked `config.burn_in_steps`
    /// transitions before the first pair is produced. A sentinel `start`
    /// begins a fresh sequence. The consumer bounds the stream, e.g. with
    /// [`Iterator::take`].
    pub fn sample(
        &self,
        start: Option<&str>,
        config: &SamplingConfig,
    ) -> LabelingResult<Sampler<'_>> {
        self.sample_with_rng(
            start,
            config.burn_in_steps,
            SequenceRng::from_seed_option(config.seed),
        )
    }

    /// [`HiddenMarkovModel::sample`] with an explicit random source.
    pub fn sample_with_rng(
        &self,
        start: Option<&str>,
        burn_in_steps: usize,
        mut rng: SequenceRng,
    ) -> LabelingResult<Sampler<'_>> {
        let context = match start {
            Some(label) if is_boundary(label) => {
                self.next_state(&LabelHistory::start(), &mut rng)?
            }
            Some(label) => {
                if !self.labels.iter().any(|known| known == label) {
                    return Err(LabelingError::UnknownLabel {
                        label: label.to_string(),
                    });
                }
                self.start_context(|context| context.last() == label, &mut rng)?
            }
            None => {
                let mut context = self.start_context(|_| true, &mut rng)?;
                for _ in 0..burn_in_steps {
                    context = self.next_state(&context, &mut rng)?;
                }
                context
            }
        };

        Ok(Sampler {
            model: self,
            rng,
            context,
            pending: None,
            finished: false,
        })
    }

    /// Uniform choice among trained non-sentinel contexts of the active order.
    fn start_context<F>(&self, accept: F, rng: &mut SequenceRng) -> LabelingResult<LabelHistory>
    where
        F: Fn(&LabelHistory) -> bool,
    {
        let candidates: Vec<&LabelHistory> = self
            .active_transition()
            .keys()
            .filter(|context| !context.is_boundary() && accept(*context))
            .collect();
        if candidates.is_empty() {
            return Err(LabelingError::UnreachableState {
                reason: format!(
                    "no trained context of order {} to start sampling from",
                    self.active_order
                ),
            });
        }
        Ok(candidates[rng.usize(0..candidates.len())].clone())
    }

    /// Next non-sentinel context; reaching `STOP` restarts from `START`.
    fn next_state(
        &self,
        context: &LabelHistory,
        rng: &mut SequenceRng,
    ) -> LabelingResult<LabelHistory> {
        let mut current = context.clone();
        for _ in 0..MAX_BOUNDARY_STEPS {
            let label = self.draw_transition(&current, rng)?;
            current = if label == STOP_LABEL {
                LabelHistory::start()
            } else {
                current.extend(&label, self.active_order)
            };
            if !current.is_boundary() {
                return Ok(current);
            }
        }
        Err(LabelingError::UnreachableState {
            reason: format!(
                "no labeled state reached from {} within {} transitions",
                context, MAX_BOUNDARY_STEPS
            ),
        })
    }

    fn draw_transition(
        &self,
        context: &LabelHistory,
        rng: &mut SequenceRng,
    ) -> LabelingResult<Label> {
        let row = self.active_transition().row(context).ok_or_else(|| {
            LabelingError::UnreachableState {
                reason: format!("no transitions out of {}", context),
            }
        })?;
        let draw = rng.f64();
        row.draw_log(draw)
            .cloned()
            .ok_or_else(|| LabelingError::DistributionExhausted {
                context: format!("transition from {} (draw #{})", context, rng.draws()),
                draw,
            })
    }

    fn draw_emission(&self, label: &str, rng: &mut SequenceRng) -> LabelingResult<Emission> {
        let row = self
            .emission
            .row(label)
            .ok_or_else(|| LabelingError::UnknownLabel {
                label: label.to_string(),
            })?;
        let draw = rng.f64();
        row.draw_log(draw)
            .cloned()
            .ok_or_else(|| LabelingError::DistributionExhausted {
                context: format!("emission from {} (draw #{})", label, rng.draws()),
                draw,
            })
    }
}

/// Unbounded iterator of sampled `(label, emission)` pairs.
///
/// A failed draw is yielded once as an error, after which the iterator ends.
/// When the transition after a pair fails, the pair is still yielded and the
/// error follows on the next call.
#[derive(Debug)]
pub struct Sampler<'a> {
    model: &'a HiddenMarkovModel,
    rng: SequenceRng,
    context: LabelHistory,
    pending: Option<LabelingError>,
    finished: bool,
}

impl Sampler<'_> {
    /// Label the next yielded pair will carry.
    pub fn current_label(&self) -> &str {
        self.context.last()
    }

    fn step(&mut self) -> LabelingResult<(Label, Emission)> {
        let label = self.context.last().to_string();
        let emission = self.model.draw_emission(&label, &mut self.rng)?;
        match self.model.next_state(&self.context, &mut self.rng) {
            Ok(next) => self.context = next,
            Err(error) => self.pending = Some(error),
        }
        Ok((label, emission))
    }
}

impl Iterator for Sampler<'_> {
    type Item = LabelingResult<(Label, Emission)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(error) = self.pending.take() {
            self.finished = true;
            return Some(Err(error));
        }
        let step = self.step();
        if step.is_err() {
            self.finished = true;
        }
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::LabelPriorFallback;
    use assert_approx_eq::assert_approx_eq;

    /// Short chain with an embedded sequence boundary.
    fn debug_chain() -> Vec<(&'static str, &'static str)> {
        let states = [
            "1", "1", "1", "2", "3", "3", "3", "3", STOP_LABEL, START_LABEL, "2", "3", "3",
        ];
        let emissions = [
            "y", "m", "y", "m", "n", "m", "n", "m", STOP_LABEL, START_LABEL, "m", "n", "n",
        ];
        states.into_iter().zip(emissions).collect()
    }

    fn trained(config: &TrainingConfig) -> HiddenMarkovModel {
        HiddenMarkovModel::train(debug_chain(), config, Fallback::Uniform).unwrap()
    }

    fn zip<'a>(labels: &'a [Label], emissions: &'a [&'a str]) -> Vec<(&'a str, &'a str)> {
        labels
            .iter()
            .map(String::as_str)
            .zip(emissions.iter().copied())
            .collect()
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let empty: Vec<(String, String)> = Vec::new();
        let result = HiddenMarkovModel::train(empty, &TrainingConfig::default(), Fallback::Uniform);
        assert!(matches!(
            result,
            Err(LabelingError::InsufficientData { required: 1, actual: 0 })
        ));
    }

    #[test]
    fn test_labels_exclude_sentinels() {
        let model = trained(&TrainingConfig::default());
        assert_eq!(model.labels(), &["1", "2", "3"]);
        assert_eq!(model.history_order(), 2);
        assert_eq!(model.active_order(), 1);
        assert!(model.transition(2).is_some());
        assert!(model.transition(3).is_none());
        assert!(model.transition(0).is_none());
    }

    #[test]
    fn test_transition_estimates() {
        let model = trained(&TrainingConfig::first_order());
        let transition = model.active_transition();
        let from_one = LabelHistory::single("1");
        // 1 -> 1 twice, 1 -> 2 once
        assert_approx_eq!(transition.get(&from_one, "1"), (2.0f64 / 3.0).ln(), 1e-12);
        assert_approx_eq!(transition.get(&from_one, "2"), (1.0f64 / 3.0).ln(), 1e-12);
        assert_eq!(transition.get(&from_one, "3"), f64::NEG_INFINITY);
        assert_eq!(transition.get(&LabelHistory::stop(), START_LABEL), 0.0);
    }

    #[test]
    fn test_reverse_transition_is_inverse() {
        let model = trained(&TrainingConfig::default());
        let forward = model.active_transition();
        let reverse = model.active_reverse_transition();
        for (context, row) in forward.iter() {
            for (label, score) in row.iter() {
                assert_eq!(reverse.get(label.as_str(), context), score);
            }
        }
        assert_eq!(
            reverse.get("1", &LabelHistory::single("3")),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_second_order_contexts() {
        let model = trained(&TrainingConfig::default());
        let second = model.transition(2).unwrap();
        let context = LabelHistory::start().extend("1", 2).extend("1", 2);
        assert_eq!(context.to_string(), "1::1");
        assert_approx_eq!(second.get(&context, "1"), 0.5f64.ln(), 1e-12);
        assert_approx_eq!(second.get(&context, "2"), 0.5f64.ln(), 1e-12);
    }

    #[test]
    fn test_decoder_is_not_beaten_by_reference_labels() {
        let model = trained(&TrainingConfig::default());
        let cases: [(&[&str], &[&str]); 3] = [
            (
                &["y", "y", "y", "m", "n", "m", "n", "m"],
                &["1", "1", "1", "2", "3", "3", "3", "3"],
            ),
            (&["y", "m", "n"], &["1", "2", "3"]),
            (&["m", "n", "n", "n"], &["2", "3", "3", "3"]),
        ];

        for (emissions, reference) in cases {
            let (guessed, viterbi_score) = model.label_with_score(emissions).unwrap();
            assert_eq!(guessed.len(), emissions.len());
            let guessed_score = model.score(&zip(&guessed, emissions)).unwrap();
            let reference: Vec<Label> = reference.iter().map(|l| l.to_string()).collect();
            let reference_score = model.score(&zip(&reference, emissions)).unwrap();
            assert!(
                guessed_score >= reference_score,
                "Decoder sub-optimality: {:?} ({}) vs {:?} ({})",
                guessed,
                guessed_score,
                reference,
                reference_score
            );
            assert_approx_eq!(guessed_score, viterbi_score, 1e-9);
        }
    }

    #[test]
    fn test_single_emission_returns_one_label() {
        let model = trained(&TrainingConfig::default());
        let labels = model.label(&["m"]).unwrap();
        assert_eq!(labels.len(), 1);
        assert!(model.label::<&str>(&[]).is_err());
    }

    #[test]
    fn test_unseen_emission_uses_uniform_fallback() {
        let model = trained(&TrainingConfig::default());
        let dist = model.fallback_probs("never-seen");
        assert_eq!(dist.len(), 3);
        for label in model.labels() {
            assert_approx_eq!(dist.get(label.as_str()), (1.0f64 / 3.0).ln(), 1e-12);
        }
        assert_eq!(dist.get(START_LABEL), f64::NEG_INFINITY);

        let labels = model.label(&["y", "never-seen", "n"]).unwrap();
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_delegate_fallback_is_trained_and_used() {
        let config = TrainingConfig::default().fallback_training_limit(4);
        let model = HiddenMarkovModel::train(
            debug_chain(),
            &config,
            Fallback::delegate(LabelPriorFallback::new()),
        )
        .unwrap();
        // first four non-sentinel pairs are labels 1, 1, 1, 2
        let dist = model.fallback_probs("zzz");
        assert_approx_eq!(dist.get("1"), 0.75f64.ln(), 1e-12);
        assert_approx_eq!(dist.get("2"), 0.25f64.ln(), 1e-12);
        assert_eq!(dist.get("3"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_score_impossible_labeling_is_negative_infinity() {
        let model = trained(&TrainingConfig::default());
        // 1 never transitions to 3
        let score = model.score(&[("1", "y"), ("3", "n")]).unwrap();
        assert_eq!(score, f64::NEG_INFINITY);
        assert!(model.score::<&str, &str>(&[]).is_err());
    }

    #[test]
    fn test_sampler_never_yields_sentinels() {
        let model = trained(&TrainingConfig::default());
        let sampler = model.sample(None, &SamplingConfig::seeded(3)).unwrap();
        let drawn: Vec<(Label, Emission)> = sampler.take(500).collect::<Result<_, _>>().unwrap();
        assert_eq!(drawn.len(), 500);
        for (label, emission) in &drawn {
            assert!(!is_boundary(label));
            assert!(!is_boundary(emission));
            assert!(model.emission().get(label.as_str(), emission.as_str()).is_finite());
        }
    }

    #[test]
    fn test_sampler_respects_start_label() {
        let model = trained(&TrainingConfig::default());
        let mut sampler = model.sample(Some("3"), &SamplingConfig::seeded(9)).unwrap();
        assert_eq!(sampler.current_label(), "3");
        let (label, emission) = sampler.next().unwrap().unwrap();
        assert_eq!(label, "3");
        assert!(emission == "n" || emission == "m");

        assert!(matches!(
            model.sample(Some("9"), &SamplingConfig::default()),
            Err(LabelingError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let model = trained(&TrainingConfig::default());
        let draw = |seed| -> Vec<(Label, Emission)> {
            model
                .sample(None, &SamplingConfig::seeded(seed))
                .unwrap()
                .take(50)
                .collect::<Result<_, _>>()
                .unwrap()
        };
        assert_eq!(draw(11), draw(11));
    }

    fn alternating(config: &TrainingConfig) -> HiddenMarkovModel {
        let corpus = vec![("A", "a"), ("B", "b"), ("A", "a")];
        HiddenMarkovModel::train(corpus, config, Fallback::Uniform).unwrap()
    }

    #[test]
    fn test_unreachable_stop_substitutes_stop_labels() {
        let model = alternating(&TrainingConfig::first_order());
        // B is never followed by STOP, so no labeling of ["a", "b"] is possible
        let (labels, score) = model.label_with_score(&["a", "b"]).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels, vec![STOP_LABEL, STOP_LABEL]);
        assert_eq!(score, f64::NEG_INFINITY);
    }

    #[test]
    fn test_sampler_yields_pair_before_transition_error() {
        let model = alternating(&TrainingConfig::with_history_order(2));
        // A single-label context never occurs at order 2
        let mut sampler = Sampler {
            model: &model,
            rng: SequenceRng::with_seed(4),
            context: LabelHistory::single("A"),
            pending: None,
            finished: false,
        };
        let (label, emission) = sampler.next().unwrap().unwrap();
        assert_eq!((label.as_str(), emission.as_str()), ("A", "a"));
        assert!(matches!(
            sampler.next(),
            Some(Err(LabelingError::UnreachableState { .. }))
        ));
        assert!(sampler.next().is_none());
    }

    #[test]
    fn test_higher_order_sampling_starts_from_trained_context() {
        let model = alternating(&TrainingConfig::with_history_order(2));
        let mut sampler = model.sample(Some("B"), &SamplingConfig::seeded(1)).unwrap();
        assert_eq!(sampler.current_label(), "B");
        let drawn: Vec<(Label, Emission)> = sampler
            .by_ref()
            .take(20)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(drawn[0].0, "B");
    }
}
