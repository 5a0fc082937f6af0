//! Per-poll pipeline: parse, aggregate, diff, rank, roll
//!
//! [`GammaEngine`] owns all cross-poll state. It does no locking; a caller
//! driving it from several tasks must serialize access itself.

use crate::delta::DeltaTracker;
use crate::error::{EngineWarning, GammaError};
use crate::exposure::ExposureAggregator;
use crate::history::{ExposureHistory, TotalExposurePoint};
use crate::ranking::TopKRanker;
use crate::rolling::{RollingStats, RollingStatsTracker, WindowStats};
use crate::snapshot::{parse_snapshot, SkippedContract};
use crate::types::{serialize_strike_map, DeltaMap, EngineSettings, ExposureMap, RankedChange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Everything one poll produced, detached from engine state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollReport {
    pub observed_at: DateTime<Utc>,
    pub spot_price: Option<f64>,
    pub total_exposure: f64,
    #[serde(serialize_with = "serialize_strike_map")]
    pub exposure: ExposureMap,
    #[serde(serialize_with = "serialize_strike_map")]
    pub deltas: DeltaMap,
    pub top_changes: Vec<RankedChange>,
    pub rolling: RollingStats,
    pub contracts_used: usize,
    pub skipped: Vec<SkippedContract>,
    pub warnings: Vec<EngineWarning>,
}

impl PollReport {
    pub fn has_degenerate_spot(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, EngineWarning::DegenerateSpotPrice { .. }))
    }
}

#[derive(Debug, Clone)]
pub struct GammaEngine {
    settings: EngineSettings,
    aggregator: ExposureAggregator,
    deltas: DeltaTracker,
    ranker: TopKRanker,
    rolling: RollingStatsTracker,
    history: ExposureHistory,
}

impl GammaEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            aggregator: ExposureAggregator::with_settings(
                settings.contract_size,
                settings.sign_convention,
            ),
            deltas: DeltaTracker::new(),
            ranker: TopKRanker::with_k(settings.top_k),
            rolling: RollingStatsTracker::with_capacity(settings.window_capacity),
            history: ExposureHistory::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run one poll cycle over a raw broker snapshot.
    ///
    /// Fails only on structurally impossible input, in which case no state
    /// is modified and the next poll diffs against the last good one.
    #[instrument(skip(self, raw))]
    pub fn process(&mut self, raw: &Value, observed_at: DateTime<Utc>) -> Result<PollReport, GammaError> {
        let snapshot = parse_snapshot(raw)?;

        let mut warnings = Vec::new();
        for section in snapshot.missing_sections() {
            warn!(%section, "Chain section missing, treating as empty");
            warnings.push(EngineWarning::MissingChainSection { section });
        }

        let spot_price = snapshot.spot_price();
        let surface = self.aggregator.aggregate(spot_price, snapshot.contracts());
        warnings.extend(surface.warnings);

        let deltas = self.deltas.compute(&surface.by_strike);
        let top_changes = self.ranker.rank(&deltas, observed_at);
        let rolling = self.rolling.update(&top_changes);
        self.history.record(observed_at, surface.total, spot_price);

        info!(
            spot = ?spot_price,
            total_exposure = surface.total,
            strikes = surface.by_strike.len(),
            deltas = deltas.len(),
            skipped = surface.skipped.len(),
            "Poll processed"
        );

        Ok(PollReport {
            observed_at,
            spot_price,
            total_exposure: surface.total,
            exposure: surface.by_strike,
            deltas,
            top_changes,
            rolling,
            contracts_used: surface.contracts_used,
            skipped: surface.skipped,
            warnings,
        })
    }

    /// Forget the previous exposure map, both rolling windows and all history
    pub fn reset(&mut self) {
        self.deltas.reset();
        self.rolling.reset();
        self.history.clear();
        info!("Engine state reset");
    }

    pub fn previous_exposure(&self) -> &ExposureMap {
        self.deltas.previous()
    }

    pub fn rolling_stats(&self) -> RollingStats {
        self.rolling.stats()
    }

    pub fn positive_history(&self) -> &[WindowStats] {
        self.rolling.positive_history()
    }

    pub fn negative_history(&self) -> &[WindowStats] {
        self.rolling.negative_history()
    }

    pub fn exposure_history(&self) -> &[TotalExposurePoint] {
        self.history.points()
    }
}

impl Default for GammaEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
