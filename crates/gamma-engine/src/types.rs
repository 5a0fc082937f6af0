//! Shared types for the gamma exposure engine

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Standard US equity-index option multiplier
pub const DEFAULT_CONTRACT_SIZE: f64 = 100.0;
/// Number of movers kept per poll
pub const DEFAULT_TOP_K: usize = 5;
/// Capacity of each rolling strike window
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// Canonical strike key. String and numeric strikes from the broker both
/// end up here, so `"4500"` and `4500.0` share one entry.
pub type Strike = OrderedFloat<f64>;

/// Strike -> signed exposure in $ billions per 1% move of the underlying
pub type ExposureMap = BTreeMap<Strike, f64>;

/// Strike -> change in exposure since the previous poll
pub type DeltaMap = BTreeMap<Strike, f64>;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Dealer long-gamma sign: calls add exposure, puts remove it
    pub fn sign(self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// True when the contract is in the money at `spot`
    pub fn is_itm(self, strike: f64, spot: f64) -> bool {
        match self {
            OptionType::Call => strike < spot,
            OptionType::Put => strike > spot,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// One side of the broker option chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainSection {
    Calls,
    Puts,
}

impl ChainSection {
    pub const ALL: [ChainSection; 2] = [ChainSection::Calls, ChainSection::Puts];

    /// Key of this section in the raw snapshot
    pub fn key(self) -> &'static str {
        match self {
            ChainSection::Calls => "callExpDateMap",
            ChainSection::Puts => "putExpDateMap",
        }
    }

    pub fn option_type(self) -> OptionType {
        match self {
            ChainSection::Calls => OptionType::Call,
            ChainSection::Puts => OptionType::Put,
        }
    }
}

impl fmt::Display for ChainSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single option contract flattened out of the chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractRecord {
    pub option_type: OptionType,
    pub strike: f64,
    pub gamma: f64,
    pub volume: f64,
}

/// One of the largest exposure changes of a poll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedChange {
    pub strike: f64,
    pub delta: f64,
    pub observed_at: DateTime<Utc>,
}

/// How contract exposure is signed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Calls positive, puts negative, regardless of moneyness
    #[default]
    CallPositive,
    /// Like `CallPositive`, but in-the-money contracts are flipped
    Moneyness,
}

impl SignConvention {
    pub fn sign(self, option_type: OptionType, strike: f64, spot: f64) -> f64 {
        let base = option_type.sign();
        match self {
            SignConvention::CallPositive => base,
            SignConvention::Moneyness if option_type.is_itm(strike, spot) => -base,
            SignConvention::Moneyness => base,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignConvention::CallPositive => "call_positive",
            SignConvention::Moneyness => "moneyness",
        }
    }
}

/// Tunables for one engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_contract_size")]
    pub contract_size: f64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    #[serde(default)]
    pub sign_convention: SignConvention,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            contract_size: DEFAULT_CONTRACT_SIZE,
            top_k: DEFAULT_TOP_K,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            sign_convention: SignConvention::default(),
        }
    }
}

fn default_contract_size() -> f64 {
    DEFAULT_CONTRACT_SIZE
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_window_capacity() -> usize {
    DEFAULT_WINDOW_CAPACITY
}

/// A strike-keyed value in serialized output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrikeValue {
    pub strike: f64,
    pub value: f64,
}

/// Flatten a strike-keyed map into points, ascending by strike
pub fn to_points(map: &BTreeMap<Strike, f64>) -> Vec<StrikeValue> {
    map.iter()
        .map(|(strike, value)| StrikeValue {
            strike: strike.into_inner(),
            value: *value,
        })
        .collect()
}

/// Serialize a strike-keyed map as a list of [`StrikeValue`]s, since JSON
/// object keys cannot be floats
pub fn serialize_strike_map<S>(map: &BTreeMap<Strike, f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(to_points(map))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_convention_ignores_moneyness() {
        let convention = SignConvention::CallPositive;
        assert_eq!(convention.sign(OptionType::Call, 4400.0, 4500.0), 1.0);
        assert_eq!(convention.sign(OptionType::Put, 4600.0, 4500.0), -1.0);
    }

    #[test]
    fn test_moneyness_convention_flips_itm() {
        let convention = SignConvention::Moneyness;
        // ITM call / ITM put
        assert_eq!(convention.sign(OptionType::Call, 4400.0, 4500.0), -1.0);
        assert_eq!(convention.sign(OptionType::Put, 4600.0, 4500.0), 1.0);
        // OTM and ATM keep the plain sign
        assert_eq!(convention.sign(OptionType::Call, 4600.0, 4500.0), 1.0);
        assert_eq!(convention.sign(OptionType::Put, 4500.0, 4500.0), -1.0);
    }

    #[test]
    fn test_settings_defaults_from_empty_map() {
        let settings: EngineSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.sign_convention, SignConvention::CallPositive);
    }

    #[test]
    fn test_strike_map_serializes_as_points() {
        #[derive(Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_strike_map")]
            map: ExposureMap,
        }

        let mut map = ExposureMap::new();
        map.insert(Strike::from(4510.0), -0.25);
        map.insert(Strike::from(4500.0), 1.5);
        let json = serde_json::to_value(Wrapper { map }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "map": [
                { "strike": 4500.0, "value": 1.5 },
                { "strike": 4510.0, "value": -0.25 }
            ]})
        );
    }

    #[test]
    fn test_section_keys() {
        assert_eq!(ChainSection::Calls.key(), "callExpDateMap");
        assert_eq!(ChainSection::Puts.option_type(), OptionType::Put);
    }
}
