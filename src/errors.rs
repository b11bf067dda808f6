//! Error types and validation functions for sequence labeling.
//!
//! Numerical edge cases (a `-inf` score for an impossible labeling) are not
//! errors and flow through scoring and decoding as ordinary values. Only
//! malformed input and violated distribution invariants surface here.

use thiserror::Error;

/// Error types for training, scoring, decoding and sampling.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LabelingError {
    /// Input sequence is too short for the requested operation.
    #[error("Insufficient data: need at least {required} elements, got {actual}")]
    InsufficientData {
        /// Minimum number of elements
        required: usize,
        /// Number of elements provided
        actual: usize,
    },

    /// Invalid configuration value.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: usize,
        /// Valid range or constraint description
        constraint: String,
    },

    /// A label that the trained model has never seen.
    #[error("Unknown label: {label}")]
    UnknownLabel {
        /// The offending label
        label: String,
    },

    /// Arg-max or draw requested on a mapping with no entries.
    #[error("Empty distribution in {operation}")]
    EmptyDistribution {
        /// Operation that needed at least one entry
        operation: String,
    },

    /// A weighted draw walked off the end of a row without selecting an outcome.
    #[error("Distribution exhausted for {context}: draw {draw} not covered by row mass")]
    DistributionExhausted {
        /// Row context the draw was taken from
        context: String,
        /// Uniform draw that was not covered
        draw: f64,
    },

    /// A trained row does not sum to one in probability space.
    #[error("Distribution invariant violated for {context}: row mass {mass}")]
    DistributionInvariant {
        /// Row context
        context: String,
        /// Observed probability mass
        mass: f64,
    },

    /// The model cannot reach a non-boundary state.
    #[error("Unreachable state: {reason}")]
    UnreachableState {
        /// What the walk was trying to do
        reason: String,
    },

    /// Collaborator method that a concrete implementation must provide.
    #[error("Feature not implemented: {feature}")]
    NotImplemented {
        /// Feature that is not yet implemented
        feature: String,
    },
}

/// Result type for sequence labeling operations.
pub type LabelingResult<T> = Result<T, LabelingError>;

/// Validates that a sequence has at least `min_required` elements.
///
/// # Example
/// ```rust
/// use sequence_hmm::errors::validate_sequence_length;
///
/// assert!(validate_sequence_length(3, 1).is_ok());
/// assert!(validate_sequence_length(0, 1).is_err());
/// ```
pub fn validate_sequence_length(actual: usize, min_required: usize) -> LabelingResult<()> {
    if actual < min_required {
        Err(LabelingError::InsufficientData {
            required: min_required,
            actual,
        })
    } else {
        Ok(())
    }
}

/// Validates that an order-like parameter lies in `[min, max]`.
///
/// # Example
/// ```rust
/// use sequence_hmm::errors::validate_order;
///
/// assert!(validate_order(2, 1, 3, "history_order").is_ok());
/// assert!(validate_order(0, 1, 3, "history_order").is_err());
/// ```
pub fn validate_order(value: usize, min: usize, max: usize, name: &str) -> LabelingResult<()> {
    if value < min || value > max {
        Err(LabelingError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}
