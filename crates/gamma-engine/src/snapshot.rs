//! Option chain snapshot parsing
//!
//! Flattens the broker's nested `{section -> expiry -> strike -> [contract]}`
//! layout into [`ContractRecord`]s. Parsing is lazy and per-contract:
//! a bad contract yields a [`SkippedContract`] and the walk moves on.

use crate::error::GammaError;
use crate::types::{ChainSection, ContractRecord, OptionType};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

pub const UNDERLYING_PRICE_KEY: &str = "underlyingPrice";
pub const GAMMA_KEY: &str = "gamma";
pub const VOLUME_KEY: &str = "totalVolume";

/// Why a contract was left out of aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "field", rename_all = "snake_case")]
pub enum SkipReason {
    InvalidStrike,
    MissingField(&'static str),
    NotANumber(&'static str),
    NotFinite(&'static str),
    /// Inputs were finite but the product overflowed
    NonFiniteExposure,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidStrike => write!(f, "strike is not a finite number"),
            SkipReason::MissingField(field) => write!(f, "missing field '{field}'"),
            SkipReason::NotANumber(field) => write!(f, "field '{field}' is not a number"),
            SkipReason::NotFinite(field) => write!(f, "field '{field}' is not finite"),
            SkipReason::NonFiniteExposure => write!(f, "exposure is not finite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedContract {
    pub option_type: OptionType,
    pub strike: String,
    pub reason: SkipReason,
}

pub type ParsedContract = Result<ContractRecord, SkippedContract>;

/// A validated view over one raw snapshot
#[derive(Debug, Clone)]
pub struct ParsedSnapshot<'a> {
    root: &'a Map<String, Value>,
    spot_price: Option<f64>,
}

impl<'a> ParsedSnapshot<'a> {
    /// `None` when `underlyingPrice` is absent or null
    pub fn spot_price(&self) -> Option<f64> {
        self.spot_price
    }

    /// Sections that are absent (or not an object) in this snapshot
    pub fn missing_sections(&self) -> Vec<ChainSection> {
        ChainSection::ALL
            .into_iter()
            .filter(|section| !matches!(self.root.get(section.key()), Some(Value::Object(_))))
            .collect()
    }

    /// Lazily walk every contract, calls first
    pub fn contracts(&self) -> impl Iterator<Item = ParsedContract> + 'a {
        let root = self.root;
        ChainSection::ALL
            .into_iter()
            .flat_map(move |section| section_contracts(root, section))
    }
}

/// Validate the snapshot envelope
///
/// Only structural problems fail here; everything below the section level
/// is reported per contract by [`ParsedSnapshot::contracts`].
pub fn parse_snapshot(raw: &Value) -> Result<ParsedSnapshot<'_>, GammaError> {
    let root = raw.as_object().ok_or_else(|| {
        GammaError::MalformedSnapshot(format!("expected a JSON object, got {}", kind_of(raw)))
    })?;

    let spot_price = match root.get(UNDERLYING_PRICE_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            return Err(GammaError::InvalidUnderlyingPrice(format!(
                "expected a number, got {}",
                kind_of(other)
            )))
        }
    };

    Ok(ParsedSnapshot { root, spot_price })
}

fn section_contracts(
    root: &Map<String, Value>,
    section: ChainSection,
) -> impl Iterator<Item = ParsedContract> + '_ {
    let option_type = section.option_type();
    root.get(section.key())
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|expirations| expirations.values())
        .filter_map(Value::as_object)
        .flat_map(|strikes| strikes.iter())
        .flat_map(move |(strike, entry)| {
            let contracts = match entry {
                Value::Array(items) => items.as_slice(),
                other => std::slice::from_ref(other),
            };
            contracts
                .iter()
                .map(move |contract| parse_contract(option_type, strike, contract))
        })
}

fn parse_contract(option_type: OptionType, strike: &str, contract: &Value) -> ParsedContract {
    let skip = |reason: SkipReason| {
        debug!(%option_type, strike, %reason, "Skipping contract");
        SkippedContract {
            option_type,
            strike: strike.to_string(),
            reason,
        }
    };

    let strike_value = match strike.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return Err(skip(SkipReason::InvalidStrike)),
    };
    let gamma = numeric_field(contract, GAMMA_KEY).map_err(skip)?;
    let volume = numeric_field(contract, VOLUME_KEY).map_err(skip)?;

    Ok(ContractRecord {
        option_type,
        strike: strike_value,
        gamma,
        volume,
    })
}

fn numeric_field(contract: &Value, field: &'static str) -> Result<f64, SkipReason> {
    let value = match contract.get(field) {
        None | Some(Value::Null) => return Err(SkipReason::MissingField(field)),
        Some(Value::Number(n)) => n.as_f64().ok_or(SkipReason::NotANumber(field))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| SkipReason::NotANumber(field))?,
        Some(_) => return Err(SkipReason::NotANumber(field)),
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(SkipReason::NotFinite(field))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
