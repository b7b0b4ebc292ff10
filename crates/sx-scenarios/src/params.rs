//! Typed scenario parameters.
//!
//! Each scenario declares its parameters as [`ParamSpec`]s. User input
//! (YAML run configs, `key=value` overrides) arrives as [`ParamValue`]s and
//! is merged over the defaults by [`ParamSet::resolve`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Float,
    Int,
    Text,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Float => "float",
            ParamKind::Int => "int",
            ParamKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A parameter value as written by the user.
///
/// Integers are tried before floats so `4` stays an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    fn describe(&self) -> String {
        match self {
            ParamValue::Int(v) => format!("integer {v}"),
            ParamValue::Float(v) => format!("number {v}"),
            ParamValue::Text(v) => format!("text {v:?}"),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub help: &'static str,
}

impl ParamSpec {
    pub fn float(name: &'static str, default: f64, help: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default: ParamValue::Float(default),
            help,
        }
    }

    pub fn int(name: &'static str, default: i64, help: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            default: ParamValue::Int(default),
            help,
        }
    }

    pub fn text(name: &'static str, default: &str, help: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            default: ParamValue::Text(default.to_string()),
            help,
        }
    }

    /// Parse a raw command-line string according to this parameter's kind.
    pub fn parse(&self, raw: &str) -> ScenarioResult<ParamValue> {
        let raw = raw.trim();
        match self.kind {
            ParamKind::Float => raw
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|_| self.mismatch(&ParamValue::Text(raw.to_string()))),
            ParamKind::Int => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| self.mismatch(&ParamValue::Text(raw.to_string()))),
            ParamKind::Text => Ok(ParamValue::Text(raw.to_string())),
        }
    }

    /// Coerce `value` to this parameter's kind. Integers widen to floats.
    pub fn coerce(&self, value: &ParamValue) -> ScenarioResult<ParamValue> {
        match (self.kind, value) {
            (ParamKind::Float, ParamValue::Float(v)) => Ok(ParamValue::Float(*v)),
            (ParamKind::Float, ParamValue::Int(v)) => Ok(ParamValue::Float(*v as f64)),
            (ParamKind::Int, ParamValue::Int(v)) => Ok(ParamValue::Int(*v)),
            (ParamKind::Text, ParamValue::Text(v)) => Ok(ParamValue::Text(v.clone())),
            _ => Err(self.mismatch(value)),
        }
    }

    fn mismatch(&self, value: &ParamValue) -> ScenarioError {
        ScenarioError::TypeMismatch {
            name: self.name.to_string(),
            expected: self.kind,
            found: value.describe(),
        }
    }
}

/// Fully resolved parameters: every declared name has a value of its kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParamSet {
    /// Merge `overrides` over the defaults in `specs`, type-checking each.
    pub fn resolve(
        scenario: &str,
        specs: &[ParamSpec],
        overrides: &BTreeMap<String, ParamValue>,
    ) -> ScenarioResult<Self> {
        if let Some(name) = overrides
            .keys()
            .find(|name| !specs.iter().any(|s| s.name == name.as_str()))
        {
            return Err(ScenarioError::UnknownParam {
                scenario: scenario.to_string(),
                name: name.clone(),
            });
        }

        let mut values = BTreeMap::new();
        for spec in specs {
            let value = match overrides.get(spec.name) {
                Some(v) => spec.coerce(v)?,
                None => spec.default.clone(),
            };
            values.insert(spec.name.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn float(&self, name: &str) -> ScenarioResult<f64> {
        match self.values.get(name) {
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            other => Err(missing(name, ParamKind::Float, other)),
        }
    }

    pub fn int(&self, name: &str) -> ScenarioResult<i64> {
        match self.values.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            other => Err(missing(name, ParamKind::Int, other)),
        }
    }

    pub fn text(&self, name: &str) -> ScenarioResult<&str> {
        match self.values.get(name) {
            Some(ParamValue::Text(v)) => Ok(v.as_str()),
            other => Err(missing(name, ParamKind::Text, other)),
        }
    }
}

fn missing(name: &str, expected: ParamKind, found: Option<&ParamValue>) -> ScenarioError {
    ScenarioError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.map_or_else(|| "nothing".to_string(), ParamValue::describe),
    }
}

/// Split a `key=value` override.
pub fn parse_assignment(raw: &str) -> ScenarioResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ScenarioError::InvalidValue {
            name: raw.to_string(),
            reason: "expected key=value".to_string(),
        }),
    }
}
