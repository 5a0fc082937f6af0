//! Top-K selection of the largest exposure changes

use crate::types::{DeltaMap, RankedChange, DEFAULT_TOP_K};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy)]
pub struct TopKRanker {
    k: usize,
}

impl TopKRanker {
    pub fn new() -> Self {
        Self { k: DEFAULT_TOP_K }
    }

    pub fn with_k(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Largest `|delta|` first, equal magnitudes by ascending strike.
    /// Every item carries the same `observed_at`.
    pub fn rank(&self, deltas: &DeltaMap, observed_at: DateTime<Utc>) -> Vec<RankedChange> {
        let mut entries: Vec<(f64, f64)> = deltas
            .iter()
            .map(|(strike, delta)| (strike.into_inner(), *delta))
            .collect();

        entries.sort_by(|(strike_a, delta_a), (strike_b, delta_b)| {
            delta_b
                .abs()
                .total_cmp(&delta_a.abs())
                .then_with(|| strike_a.total_cmp(strike_b))
        });
        entries.truncate(self.k);

        entries
            .into_iter()
            .map(|(strike, delta)| RankedChange {
                strike,
                delta,
                observed_at,
            })
            .collect()
    }
}

impl Default for TopKRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strike;

    fn deltas(entries: &[(f64, f64)]) -> DeltaMap {
        entries.iter().map(|(k, v)| (Strike::from(*k), *v)).collect()
    }

    #[test]
    fn test_orders_by_magnitude() {
        let ranker = TopKRanker::with_k(3);
        let now = Utc::now();
        let ranked = ranker.rank(
            &deltas(&[(100.0, 0.1), (105.0, -0.9), (110.0, 0.5), (115.0, -0.05)]),
            now,
        );

        let strikes: Vec<f64> = ranked.iter().map(|r| r.strike).collect();
        assert_eq!(strikes, vec![105.0, 110.0, 100.0]);
        assert!(ranked.iter().all(|r| r.observed_at == now));
    }

    #[test]
    fn test_ties_break_by_ascending_strike() {
        let ranker = TopKRanker::with_k(5);
        let ranked = ranker.rank(
            &deltas(&[(120.0, 0.5), (100.0, -0.5), (110.0, 0.5), (90.0, 0.1)]),
            Utc::now(),
        );
        let strikes: Vec<f64> = ranked.iter().map(|r| r.strike).collect();
        assert_eq!(strikes, vec![100.0, 110.0, 120.0, 90.0]);
    }

    #[test]
    fn test_truncates_to_k() {
        let ranker = TopKRanker::new();
        let map = deltas(
            &(0..20)
                .map(|i| (4400.0 + i as f64 * 5.0, i as f64 * 0.01))
                .collect::<Vec<_>>(),
        );
        let ranked = ranker.rank(&map, Utc::now());
        assert_eq!(ranked.len(), 5);

        for pair in ranked.windows(2) {
            let (a, b) = (pair[0].delta.abs(), pair[1].delta.abs());
            assert!(a > b || (a == b && pair[0].strike < pair[1].strike));
        }
    }

    #[test]
    fn test_empty_input_and_zero_k() {
        assert!(TopKRanker::new().rank(&DeltaMap::new(), Utc::now()).is_empty());
        let map = deltas(&[(100.0, 1.0)]);
        assert!(TopKRanker::with_k(0).rank(&map, Utc::now()).is_empty());
    }
}
