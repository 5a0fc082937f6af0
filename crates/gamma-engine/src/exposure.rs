//! Per-strike dealer gamma exposure
//!
//! `exposure = sign * spot^2 * gamma * volume * contract_size * 0.01 / 1e9`,
//! i.e. dollars of hedging flow per 1% move, expressed in billions.
//! Contributions from every expiration are summed into their strike.

use crate::error::EngineWarning;
use crate::snapshot::{ParsedContract, SkipReason, SkippedContract};
use crate::types::{ContractRecord, ExposureMap, SignConvention, Strike, DEFAULT_CONTRACT_SIZE};
use tracing::warn;

/// Fraction of the underlying the exposure is quoted against (1%)
pub const MOVE_FRACTION: f64 = 0.01;
/// Dollars per reported unit
pub const BILLION: f64 = 1e9;

/// Result of aggregating one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureSurface {
    pub by_strike: ExposureMap,
    /// Sum of `by_strike`
    pub total: f64,
    pub contracts_used: usize,
    pub skipped: Vec<SkippedContract>,
    pub warnings: Vec<EngineWarning>,
}

impl ExposureSurface {
    pub fn is_degenerate(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, EngineWarning::DegenerateSpotPrice { .. }))
    }
}

#[derive(Debug, Clone)]
pub struct ExposureAggregator {
    contract_size: f64,
    convention: SignConvention,
}

impl ExposureAggregator {
    pub fn new() -> Self {
        Self {
            contract_size: DEFAULT_CONTRACT_SIZE,
            convention: SignConvention::default(),
        }
    }

    pub fn with_settings(contract_size: f64, convention: SignConvention) -> Self {
        Self {
            contract_size,
            convention,
        }
    }

    pub fn contract_size(&self) -> f64 {
        self.contract_size
    }

    pub fn convention(&self) -> SignConvention {
        self.convention
    }

    /// Exposure contributed by one contract at `spot`
    ///
    /// Zero gamma or zero volume is exactly zero, whatever the spot. Other
    /// inputs can still overflow; callers check the result.
    pub fn contract_exposure(&self, contract: &ContractRecord, spot: f64) -> f64 {
        if contract.gamma == 0.0 || contract.volume == 0.0 {
            return 0.0;
        }
        let sign = self
            .convention
            .sign(contract.option_type, contract.strike, spot);
        sign * spot
            * spot
            * contract.gamma
            * contract.volume
            * self.contract_size
            * MOVE_FRACTION
            / BILLION
    }

    /// Aggregate parsed contracts into an [`ExposureSurface`]
    ///
    /// A zero or missing `spot` still produces a map (all zeros) but is
    /// flagged with [`EngineWarning::DegenerateSpotPrice`].
    pub fn aggregate<I>(&self, spot: Option<f64>, contracts: I) -> ExposureSurface
    where
        I: IntoIterator<Item = ParsedContract>,
    {
        let mut warnings = Vec::new();
        let effective_spot = match spot {
            Some(s) if s != 0.0 => s,
            _ => {
                warn!(spot = ?spot, "Degenerate spot price, exposures collapse to zero");
                warnings.push(EngineWarning::DegenerateSpotPrice { spot });
                0.0
            }
        };

        let mut by_strike = ExposureMap::new();
        let mut skipped = Vec::new();
        let mut contracts_used = 0;
        let mut running_total = 0.0;

        for parsed in contracts {
            let contract = match parsed {
                Ok(contract) => contract,
                Err(skip) => {
                    skipped.push(skip);
                    continue;
                }
            };

            let strike = Strike::from(contract.strike);
            let exposure = self.contract_exposure(&contract, effective_spot);
            let strike_sum = by_strike.get(&strike).copied().unwrap_or(0.0) + exposure;
            if !exposure.is_finite() || !strike_sum.is_finite() || !(running_total + exposure).is_finite() {
                warn!(
                    option_type = %contract.option_type,
                    strike = contract.strike,
                    "Exposure overflowed, skipping contract"
                );
                skipped.push(SkippedContract {
                    option_type: contract.option_type,
                    strike: contract.strike.to_string(),
                    reason: SkipReason::NonFiniteExposure,
                });
                continue;
            }

            by_strike.insert(strike, strike_sum);
            running_total += exposure;
            contracts_used += 1;
        }

        if !skipped.is_empty() {
            warn!(count = skipped.len(), "Skipped malformed contracts");
            warnings.push(EngineWarning::SkippedContracts {
                count: skipped.len(),
            });
        }

        let total = by_strike.values().sum();

        ExposureSurface {
            by_strike,
            total,
            contracts_used,
            skipped,
            warnings,
        }
    }
}

impl Default for ExposureAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionType;

    fn contract(option_type: OptionType, strike: f64, gamma: f64, volume: f64) -> ParsedContract {
        Ok(ContractRecord {
            option_type,
            strike,
            gamma,
            volume,
        })
    }

    #[test]
    fn test_single_call_exposure() {
        let aggregator = ExposureAggregator::new();
        let surface = aggregator.aggregate(
            Some(4500.0),
            vec![contract(OptionType::Call, 4500.0, 0.002, 1000.0)],
        );

        // 4500^2 * 0.002 * 1000 * 100 * 0.01 / 1e9
        let exposure = surface.by_strike[&Strike::from(4500.0)];
        assert!((exposure - 0.0405).abs() < 1e-12);
        assert!(surface.warnings.is_empty());
        assert_eq!(surface.contracts_used, 1);
    }

    #[test]
    fn test_puts_are_negative() {
        let aggregator = ExposureAggregator::new();
        let surface = aggregator.aggregate(
            Some(4500.0),
            vec![contract(OptionType::Put, 4400.0, 0.002, 1000.0)],
        );
        assert!((surface.by_strike[&Strike::from(4400.0)] + 0.0405).abs() < 1e-12);
    }

    #[test]
    fn test_expirations_sum_into_one_strike() {
        let aggregator = ExposureAggregator::new();
        let surface = aggregator.aggregate(
            Some(100.0),
            vec![
                contract(OptionType::Call, 100.0, 0.5, 10.0),
                contract(OptionType::Call, 100.0, 0.5, 10.0),
                contract(OptionType::Put, 100.0, 0.25, 10.0),
            ],
        );
        assert_eq!(surface.by_strike.len(), 1);
        let single = aggregator.contract_exposure(
            &ContractRecord {
                option_type: OptionType::Call,
                strike: 100.0,
                gamma: 0.5,
                volume: 10.0,
            },
            100.0,
        );
        let expected = 2.0 * single - single / 2.0;
        assert!((surface.by_strike[&Strike::from(100.0)] - expected).abs() < 1e-15);
    }

    #[test]
    fn test_zero_volume_contributes_nothing() {
        let aggregator = ExposureAggregator::new();
        for gamma in [0.0, 0.001, 5.0, -3.0] {
            let surface = aggregator.aggregate(
                Some(4500.0),
                vec![contract(OptionType::Call, 4500.0, gamma, 0.0)],
            );
            assert_eq!(surface.by_strike[&Strike::from(4500.0)], 0.0);
        }
    }

    #[test]
    fn test_huge_spot_never_yields_nan() {
        let aggregator = ExposureAggregator::new();
        let surface = aggregator.aggregate(
            Some(1e200),
            vec![
                contract(OptionType::Call, 100.0, 0.5, 0.0),
                contract(OptionType::Call, 200.0, 0.5, 10.0),
                contract(OptionType::Put, 200.0, 0.5, 10.0),
            ],
        );

        assert!(surface.by_strike.values().all(|v| v.is_finite()));
        assert!(surface.total.is_finite());
        assert_eq!(surface.by_strike[&Strike::from(100.0)], 0.0);
        assert!(!surface.by_strike.contains_key(&Strike::from(200.0)));
        assert_eq!(surface.contracts_used, 1);
        assert_eq!(surface.skipped.len(), 2);
        assert!(surface
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::NonFiniteExposure));
        assert_eq!(
            surface.warnings,
            vec![EngineWarning::SkippedContracts { count: 2 }]
        );
    }

    #[test]
    fn test_total_matches_sum_of_strikes() {
        let aggregator = ExposureAggregator::new();
        let contracts: Vec<ParsedContract> = (0..40)
            .map(|i| {
                let option_type = if i % 3 == 0 { OptionType::Put } else { OptionType::Call };
                contract(option_type, 4400.0 + (i % 7) as f64 * 5.0, 0.001 * i as f64, 37.0 * i as f64)
            })
            .collect();
        let surface = aggregator.aggregate(Some(4455.5), contracts);
        let sum: f64 = surface.by_strike.values().sum();
        assert!((surface.total - sum).abs() < 1e-9);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let aggregator = ExposureAggregator::new();
        let contracts = || {
            vec![
                contract(OptionType::Call, 4500.0, 0.002, 1000.0),
                contract(OptionType::Put, 4450.0, 0.001, 300.0),
            ]
        };
        let first = aggregator.aggregate(Some(4500.0), contracts());
        let second = aggregator.aggregate(Some(4500.0), contracts());
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_spot_is_flagged() {
        let aggregator = ExposureAggregator::new();
        let surface = aggregator.aggregate(
            Some(0.0),
            vec![
                contract(OptionType::Call, 4500.0, 0.002, 1000.0),
                contract(OptionType::Put, 4400.0, 0.004, 900.0),
            ],
        );
        assert!(surface.is_degenerate());
        assert_eq!(surface.by_strike.len(), 2);
        assert!(surface.by_strike.values().all(|v| *v == 0.0));
        assert_eq!(surface.total, 0.0);
    }

    #[test]
    fn test_missing_spot_is_flagged() {
        let aggregator = ExposureAggregator::new();
        let surface = aggregator.aggregate(None, vec![contract(OptionType::Call, 1.0, 1.0, 1.0)]);
        assert_eq!(
            surface.warnings,
            vec![EngineWarning::DegenerateSpotPrice { spot: None }]
        );
    }

    #[test]
    fn test_skipped_contracts_are_counted() {
        let aggregator = ExposureAggregator::new();
        let surface = aggregator.aggregate(
            Some(100.0),
            vec![
                contract(OptionType::Call, 100.0, 0.1, 1.0),
                Err(SkippedContract {
                    option_type: OptionType::Put,
                    strike: "x".to_string(),
                    reason: SkipReason::InvalidStrike,
                }),
            ],
        );
        assert_eq!(surface.contracts_used, 1);
        assert_eq!(surface.skipped.len(), 1);
        assert_eq!(
            surface.warnings,
            vec![EngineWarning::SkippedContracts { count: 1 }]
        );
    }

    #[test]
    fn test_moneyness_convention_flips_itm_call() {
        let aggregator = ExposureAggregator::with_settings(100.0, SignConvention::Moneyness);
        let surface = aggregator.aggregate(
            Some(4500.0),
            vec![contract(OptionType::Call, 4400.0, 0.002, 1000.0)],
        );
        assert!(surface.by_strike[&Strike::from(4400.0)] < 0.0);
    }
}
