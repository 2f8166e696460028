//! Parameter grid: axes, configurations and candidate dispatch.
//!
//! A grid is an ordered list of [`ParameterAxis`]. Enumeration walks the
//! Cartesian product lexicographically in declaration order (the last axis
//! varies fastest), so the same declaration always yields the same
//! configuration sequence.

use crate::error::{CandidateFailure, ConfigError};
use crate::registry::{Candidate, CandidateRegistry};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Name of the axis whose values select the candidate to run
pub const METHOD_AXIS: &str = "method";

/// A single value on a parameter axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        self.as_i64().and_then(|v| usize::try_from(v).ok())
    }

    /// Integers widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A named, ordered list of candidate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAxis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

impl ParameterAxis {
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// The configuration space, in caller-declared axis order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Axes {
    axes: Vec<ParameterAxis>,
}

impl Axes {
    pub fn new() -> Self {
        Self { axes: Vec::new() }
    }

    /// Append an axis (builder style)
    pub fn with_axis<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.axes.push(ParameterAxis::new(name, values));
        self
    }

    /// Append the `method` axis
    pub fn with_methods<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_axis(METHOD_AXIS, names.into_iter().map(|n| ParamValue::Text(n.into())))
    }

    pub fn push(&mut self, axis: ParameterAxis) {
        self.axes.push(axis);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterAxis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterAxis> {
        self.axes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Candidate names on the method axis, in declared order
    pub fn method_names(&self) -> Result<Vec<String>, ConfigError> {
        let axis = self.get(METHOD_AXIS).ok_or(ConfigError::MissingMethodAxis)?;
        axis.values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::InvalidMethodValue {
                        value: v.to_string(),
                    })
            })
            .collect()
    }

    /// Number of configurations, `None` on overflow
    pub fn grid_size(&self) -> Option<usize> {
        self.axes
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.values.len()))
    }

    /// Structural checks that need no candidate registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.axes.is_empty() {
            return Err(ConfigError::EmptyAxes);
        }
        for (idx, axis) in self.axes.iter().enumerate() {
            if axis.values.is_empty() {
                return Err(ConfigError::EmptyAxis {
                    axis: axis.name.clone(),
                });
            }
            if self.axes[..idx].iter().any(|a| a.name == axis.name) {
                return Err(ConfigError::DuplicateAxis {
                    axis: axis.name.clone(),
                });
            }
            for (pos, value) in axis.values.iter().enumerate() {
                if axis.values[..pos].contains(value) {
                    return Err(ConfigError::DuplicateValue {
                        axis: axis.name.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        self.method_names()?;
        self.grid_size().ok_or(ConfigError::GridTooLarge)?;
        Ok(())
    }

    /// Lazily enumerate every configuration.
    pub fn enumerate(&self) -> ConfigurationIter<'_> {
        ConfigurationIter::new(&self.axes)
    }
}

/// One point of the grid: exactly one value per axis, in axis order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    entries: Vec<(String, ParamValue)>,
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let mut config = Self::new();
        for (k, v) in pairs {
            config.insert(k, v);
        }
        config
    }

    /// Set a value, replacing an existing entry in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Candidate selected by this configuration
    pub fn method(&self) -> Option<&str> {
        self.get(METHOD_AXIS).and_then(ParamValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this configuration with one axis removed
    pub fn without(&self, axis: &str) -> Configuration {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| k != axis)
                .cloned()
                .collect(),
        }
    }

    /// Compact canonical key, e.g. `method=a,n1=2,n2=3`
    pub fn key(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.key())
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Odometer over the Cartesian product of a set of axes.
pub struct ConfigurationIter<'a> {
    axes: &'a [ParameterAxis],
    indices: Vec<usize>,
    remaining: usize,
}

impl<'a> ConfigurationIter<'a> {
    fn new(axes: &'a [ParameterAxis]) -> Self {
        let remaining = axes
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.values.len()))
            .unwrap_or(usize::MAX);
        Self {
            axes,
            indices: vec![0; axes.len()],
            remaining,
        }
    }

    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.axes[pos].values.len() {
                return;
            }
            self.indices[pos] = 0;
        }
    }
}

impl Iterator for ConfigurationIter<'_> {
    type Item = Configuration;

    fn next(&mut self) -> Option<Configuration> {
        if self.remaining == 0 {
            return None;
        }
        let entries = self
            .axes
            .iter()
            .zip(&self.indices)
            .map(|(axis, &idx)| (axis.name.clone(), axis.values[idx].clone()))
            .collect();
        self.remaining -= 1;
        self.advance();
        Some(Configuration { entries })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ConfigurationIter<'_> {}

/// Value computed from a configuration for reporting only (e.g. `size = n1 * n2`).
///
/// Derived values are never passed to candidates and never split groups.
pub struct DerivedAxis {
    name: String,
    compute: Box<dyn Fn(&Configuration) -> ParamValue + Send + Sync>,
}

impl DerivedAxis {
    pub fn new<F>(name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Configuration) -> ParamValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            compute: Box::new(compute),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compute(&self, config: &Configuration) -> ParamValue {
        (self.compute)(config)
    }
}

impl fmt::Debug for DerivedAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedAxis").field("name", &self.name).finish()
    }
}

/// The subset of a configuration a candidate accepts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    values: Vec<(String, ParamValue)>,
}

impl Arguments {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn usize(&self, name: &str) -> Result<usize, CandidateFailure> {
        self.get(name)
            .and_then(ParamValue::as_usize)
            .ok_or_else(|| CandidateFailure::argument(name, "a non-negative integer"))
    }

    pub fn i64(&self, name: &str) -> Result<i64, CandidateFailure> {
        self.get(name)
            .and_then(ParamValue::as_i64)
            .ok_or_else(|| CandidateFailure::argument(name, "an integer"))
    }

    pub fn f64(&self, name: &str) -> Result<f64, CandidateFailure> {
        self.get(name)
            .and_then(ParamValue::as_f64)
            .ok_or_else(|| CandidateFailure::argument(name, "a number"))
    }

    pub fn bool(&self, name: &str) -> Result<bool, CandidateFailure> {
        self.get(name)
            .and_then(ParamValue::as_bool)
            .ok_or_else(|| CandidateFailure::argument(name, "a boolean"))
    }

    pub fn str(&self, name: &str) -> Result<&str, CandidateFailure> {
        self.get(name)
            .and_then(ParamValue::as_str)
            .ok_or_else(|| CandidateFailure::argument(name, "text"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Maps configurations to a registered candidate plus its bound arguments.
pub struct GridDriver<'r> {
    registry: &'r CandidateRegistry,
}

impl<'r> GridDriver<'r> {
    pub fn new(registry: &'r CandidateRegistry) -> Self {
        Self { registry }
    }

    /// Select the candidate named by the `method` entry and keep only the
    /// entries it accepts. Everything else (grouping axes, unknown names)
    /// is dropped.
    pub fn dispatch(
        &self,
        config: &Configuration,
    ) -> Result<(&'r Candidate, Arguments), ConfigError> {
        let method = match config.get(METHOD_AXIS) {
            Some(ParamValue::Text(name)) => name,
            Some(other) => {
                return Err(ConfigError::InvalidMethodValue {
                    value: other.to_string(),
                })
            }
            None => return Err(ConfigError::MissingMethodAxis),
        };
        let candidate = self
            .registry
            .find(method)
            .ok_or_else(|| ConfigError::UnknownCandidate {
                name: method.clone(),
            })?;
        let values = config
            .iter()
            .filter(|(name, _)| candidate.accepts(name))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        Ok((candidate, Arguments { values }))
    }
}
