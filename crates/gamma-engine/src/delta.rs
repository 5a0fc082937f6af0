use crate::types::{DeltaMap, ExposureMap};

/// Diffs each poll's exposure map against the previous one
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    previous: ExposureMap,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes for strikes present in both maps, then remember `current`.
    ///
    /// Strikes that are new in `current` (or gone from it) get no entry.
    pub fn compute(&mut self, current: &ExposureMap) -> DeltaMap {
        let deltas = current
            .iter()
            .filter_map(|(strike, exposure)| {
                self.previous
                    .get(strike)
                    .map(|previous| (*strike, exposure - previous))
            })
            .collect();

        self.previous = current.clone();
        deltas
    }

    pub fn previous(&self) -> &ExposureMap {
        &self.previous
    }

    pub fn reset(&mut self) {
        self.previous.clear();
    }
}
