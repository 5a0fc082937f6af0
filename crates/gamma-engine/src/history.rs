use chrono::{DateTime, Utc};
use serde::Serialize;

/// Total exposure and spot at one poll
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalExposurePoint {
    pub observed_at: DateTime<Utc>,
    pub total_exposure: f64,
    pub spot_price: Option<f64>,
}

/// Unbounded time series of total exposure, one point per successful poll
#[derive(Debug, Clone, Default)]
pub struct ExposureHistory {
    points: Vec<TotalExposurePoint>,
}

impl ExposureHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, observed_at: DateTime<Utc>, total_exposure: f64, spot_price: Option<f64>) {
        self.points.push(TotalExposurePoint {
            observed_at,
            total_exposure,
            spot_price,
        });
    }

    pub fn points(&self) -> &[TotalExposurePoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&TotalExposurePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
