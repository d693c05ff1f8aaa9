//! Turning zone counts into exact per-party probabilities.

mod cancel;
mod estimate;
mod estimator;
mod summary;
pub mod union;

use crate::model::party::Party;
use thiserror::Error;

pub use cancel::CancelFlag;
pub use estimate::{Estimate, PartyEstimate};
pub use estimator::ProbabilityEstimator;
pub use summary::{
    AttributeSummary, CompositionSummary, EstimateSummary, PartySummary, parse_probability,
};
pub use union::union_probability;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    #[error("estimation pass was cancelled")]
    Cancelled,
    #[error("hand sizes admit no consistent deal of the live items")]
    NoConsistentDeal,
    #[error("{0} is not part of this estimate")]
    UnknownParty(Party),
}
