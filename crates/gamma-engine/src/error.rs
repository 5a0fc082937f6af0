//! Engine error and warning types

use crate::types::ChainSection;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failures that abort a single poll. Engine state is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GammaError {
    /// The snapshot root is not a JSON object
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// `underlyingPrice` is present but is not a number
    #[error("Invalid underlying price: {0}")]
    InvalidUnderlyingPrice(String),
}

/// Recoverable conditions reported next to a normal result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineWarning {
    /// Spot price was zero or missing, so every exposure is zero
    DegenerateSpotPrice { spot: Option<f64> },
    /// A call or put section was absent and counted as empty
    MissingChainSection { section: ChainSection },
    /// Contracts dropped because gamma, volume or strike did not parse
    SkippedContracts { count: usize },
}

impl fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineWarning::DegenerateSpotPrice { spot: Some(spot) } => {
                write!(f, "degenerate spot price {spot}, exposures are zero")
            }
            EngineWarning::DegenerateSpotPrice { spot: None } => {
                write!(f, "missing spot price, exposures are zero")
            }
            EngineWarning::MissingChainSection { section } => {
                write!(f, "missing chain section {section}")
            }
            EngineWarning::SkippedContracts { count } => {
                write!(f, "{count} malformed contracts skipped")
            }
        }
    }
}
