//! Sentinels, label-history contexts and sequence expansion.
//!
//! Every sequence is bounded by [`START_LABEL`] and [`STOP_LABEL`]. A
//! [`LabelHistory`] is the composite context formed by the most recent labels
//! up to some order; sentinels collapse it to a single element and reset the
//! window, so a history never reaches back across a sequence boundary.

use std::collections::VecDeque;
use std::fmt;

/// Symbolic state identifier.
pub type Label = String;

/// Observed token at a sequence position.
pub type Emission = String;

/// Sentinel opening every sequence.
pub const START_LABEL: &str = "<START>";

/// Sentinel closing every sequence.
pub const STOP_LABEL: &str = "<STOP>";

/// Separator used when a history is rendered as a single key.
pub const HISTORY_SEPARATOR: &str = "::";

/// Whether `label` is one of the two sequence sentinels.
pub fn is_boundary(label: &str) -> bool {
    label == START_LABEL || label == STOP_LABEL
}

/// The most recent labels up to some order, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelHistory(Vec<Label>);

impl LabelHistory {
    /// History consisting of a single label.
    pub fn single(label: impl Into<Label>) -> Self {
        Self(vec![label.into()])
    }

    /// Degenerate history at the start of a sequence.
    pub fn start() -> Self {
        Self::single(START_LABEL)
    }

    /// Degenerate history at the end of a sequence.
    pub fn stop() -> Self {
        Self::single(STOP_LABEL)
    }

    /// Labels, oldest first.
    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    /// Number of labels in the history.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the history holds no labels. Histories built by this module never are.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent label.
    pub fn last(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or(START_LABEL)
    }

    /// Whether this is a degenerate sentinel history.
    pub fn is_boundary(&self) -> bool {
        self.0.len() == 1 && is_boundary(&self.0[0])
    }

    /// History after observing `label`, keeping at most `order` labels.
    ///
    /// A sentinel label resets the history to itself.
    pub fn extend(&self, label: &str, order: usize) -> Self {
        if is_boundary(label) {
            return Self::single(label);
        }
        let keep = order.max(1);
        let mut labels: Vec<Label> = self
            .0
            .iter()
            .skip((self.0.len() + 1).saturating_sub(keep))
            .cloned()
            .collect();
        labels.push(label.to_string());
        Self(labels)
    }
}

impl fmt::Display for LabelHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(HISTORY_SEPARATOR))
    }
}

/// One position of an expanded training sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedPosition {
    /// Histories for orders `1..=k`, or a single degenerate history at sentinels.
    pub histories: Vec<LabelHistory>,
    /// Emission observed at this position.
    pub emission: Emission,
}

impl ExpandedPosition {
    /// History for `order`, collapsing to the degenerate history at sentinels.
    pub fn history(&self, order: usize) -> &LabelHistory {
        let index = order.clamp(1, self.histories.len()) - 1;
        &self.histories[index]
    }

    /// Plain label at this position.
    pub fn label(&self) -> &str {
        self.histories[0].last()
    }

    /// Whether this position is a sentinel.
    pub fn is_boundary(&self) -> bool {
        is_boundary(self.label())
    }
}

/// Wrap labeled pairs with `(START, START)` and `(STOP, STOP)`.
pub fn pad_pairs<L, E, I>(sequence: I) -> Vec<(Label, Emission)>
where
    I: IntoIterator<Item = (L, E)>,
    L: Into<Label>,
    E: Into<Emission>,
{
    let mut padded = vec![(START_LABEL.to_string(), START_LABEL.to_string())];
    padded.extend(
        sequence
            .into_iter()
            .map(|(label, emission)| (label.into(), emission.into())),
    );
    padded.push((STOP_LABEL.to_string(), STOP_LABEL.to_string()));
    padded
}

/// Wrap emissions with `START` and `STOP`.
pub fn pad_emissions<E: AsRef<str>>(emissions: &[E]) -> Vec<&str> {
    let mut padded = Vec::with_capacity(emissions.len() + 2);
    padded.push(START_LABEL);
    padded.extend(emissions.iter().map(AsRef::as_ref));
    padded.push(STOP_LABEL);
    padded
}

/// Expand a labeled sequence into per-position histories of orders `1..=order`.
///
/// The window starts as `[START]` and is reset at every sentinel, which
/// yields a single degenerate history regardless of `order`.
///
/// ```rust
/// use sequence_hmm::history::expand_histories;
///
/// let expanded = expand_histories(&[("A", "3"), ("B", "4"), ("C", "5")], 2);
/// let keys: Vec<Vec<String>> = expanded
///     .iter()
///     .map(|p| p.histories.iter().map(|h| h.to_string()).collect())
///     .collect();
/// assert_eq!(keys[0], vec!["A", "<START>::A"]);
/// assert_eq!(keys[1], vec!["B", "A::B"]);
/// assert_eq!(keys[2], vec!["C", "B::C"]);
/// ```
pub fn expand_histories<L, E>(sequence: &[(L, E)], order: usize) -> Vec<ExpandedPosition>
where
    L: AsRef<str>,
    E: AsRef<str>,
{
    let order = order.max(1);
    let mut window: VecDeque<&str> = VecDeque::with_capacity(order + 1);
    window.push_back(START_LABEL);

    sequence
        .iter()
        .map(|(label, emission)| {
            let label = label.as_ref();
            let histories = if is_boundary(label) {
                window.clear();
                window.push_back(label);
                vec![LabelHistory::single(label)]
            } else {
                window.push_back(label);
                while window.len() > order {
                    window.pop_front();
                }
                (1..=order)
                    .map(|length| {
                        let take = length.min(window.len());
                        LabelHistory(
                            window
                                .iter()
                                .skip(window.len() - take)
                                .map(|l| l.to_string())
                                .collect(),
                        )
                    })
                    .collect()
            };
            ExpandedPosition {
                histories,
                emission: emission.as_ref().to_string(),
            }
        })
        .collect()
}
