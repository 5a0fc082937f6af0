//! Dealer Gamma Exposure Engine
//!
//! Turns index option-chain snapshots into a per-strike gamma exposure
//! surface, tracks how it moves between polls and keeps rolling statistics
//! on the strikes of the largest movers.
//!
//! # Pipeline
//!
//! Each poll runs these stages once, in order:
//!
//! - [`snapshot`] - flatten the nested broker chain into contracts
//! - [`exposure`] - signed $bn-per-1% exposure summed per strike
//! - [`delta`] - change against the previous poll (stateful)
//! - [`ranking`] - top-K changes by magnitude
//! - [`rolling`] - sliding windows of mover strikes (stateful)
//!
//! [`engine::GammaEngine`] wires them together and owns the state.
//!
//! # Key Invariants
//!
//! - Strike keys are canonical floats; `"4500"` and `4500.0` are one strike
//! - Exposure values are finite; bad contracts are skipped, never summed
//! - Deltas exist only for strikes seen in both polls
//! - A zero or missing spot is reported as a warning, never silently zeroed

pub mod delta;
pub mod engine;
pub mod error;
pub mod exposure;
pub mod history;
pub mod ranking;
pub mod rolling;
pub mod snapshot;
pub mod types;

pub use delta::DeltaTracker;
pub use engine::{GammaEngine, PollReport};
pub use error::{EngineWarning, GammaError};
pub use exposure::{ExposureAggregator, ExposureSurface};
pub use history::{ExposureHistory, TotalExposurePoint};
pub use ranking::TopKRanker;
pub use rolling::{RollingStats, RollingStatsTracker, RollingWindow, WindowStats};
pub use snapshot::{parse_snapshot, ParsedContract, ParsedSnapshot, SkipReason, SkippedContract};
pub use types::{
    ChainSection, ContractRecord, DeltaMap, EngineSettings, ExposureMap, OptionType, RankedChange,
    SignConvention, Strike, StrikeValue,
};

pub type Result<T> = std::result::Result<T, GammaError>;
