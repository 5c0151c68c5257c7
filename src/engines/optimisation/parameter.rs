use crate::error::{Result, ShapetuneError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Decimal places kept for float attribute values
pub const DEFAULT_PRECISION: u32 = 5;

/// Value of a discrete optimisation attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
}

impl ParamValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::Bool(_) => ValueKind::Bool,
            ParamValue::Int(_) => ValueKind::Int,
            ParamValue::Float(_) => ValueKind::Float,
        }
    }

    /// Round floats to `precision` decimal places, other kinds pass through
    pub fn snapped(self, precision: u32) -> Self {
        match self {
            ParamValue::Float(v) => {
                let scale = 10f64.powi(precision as i32);
                ParamValue::Float((v * scale).round() / scale)
            }
            other => other,
        }
    }

    /// Total order within a kind; kinds order as Bool < Int < Float
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a.cmp(b),
            (ParamValue::Int(a), ParamValue::Int(b)) => a.cmp(b),
            (ParamValue::Float(a), ParamValue::Float(b)) => a.total_cmp(b),
            _ => (self.kind() as u8).cmp(&(other.kind() as u8)),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Bool(_) => None,
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// Sorted, deduplicated set of acceptable values for one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    values: Vec<ParamValue>,
    precision: u32,
}

impl Domain {
    pub fn new(values: Vec<ParamValue>, precision: u32) -> Result<Self> {
        let kind = values
            .first()
            .map(|v| v.kind())
            .ok_or_else(|| ShapetuneError::Input("Domain cannot be empty".to_string()))?;
        if values.iter().any(|v| v.kind() != kind) {
            return Err(ShapetuneError::Input(
                "Domain values must all have the same type".to_string(),
            ));
        }
        if values
            .iter()
            .any(|v| matches!(v, ParamValue::Float(f) if !f.is_finite()))
        {
            return Err(ShapetuneError::Input(
                "Domain values must be finite".to_string(),
            ));
        }

        let mut values: Vec<ParamValue> = values.into_iter().map(|v| v.snapped(precision)).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);

        Ok(Self { values, precision })
    }

    /// `start, start + step, ...` up to but excluding `stop`
    pub fn int_range(start: i64, stop: i64, step: i64) -> Result<Self> {
        if step <= 0 || stop <= start {
            return Err(ShapetuneError::Input(format!(
                "Empty integer range {}..{} step {}",
                start, stop, step
            )));
        }
        let values = (start..stop)
            .step_by(step as usize)
            .map(ParamValue::Int)
            .collect();
        Self::new(values, DEFAULT_PRECISION)
    }

    /// Float counterpart of `int_range`, computed by index to avoid drift
    pub fn float_range(start: f64, stop: f64, step: f64, precision: u32) -> Result<Self> {
        if !(step > 0.0) || !(stop > start) {
            return Err(ShapetuneError::Input(format!(
                "Empty float range {}..{} step {}",
                start, stop, step
            )));
        }
        let count = ((stop - start) / step - 1e-9).ceil() as usize;
        let values = (0..count)
            .map(|i| ParamValue::Float(start + i as f64 * step))
            .collect();
        Self::new(values, precision)
    }

    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn kind(&self) -> ValueKind {
        self.values[0].kind()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of a value after snapping, by binary search
    pub fn locate(&self, value: ParamValue) -> Option<usize> {
        let snapped = value.snapped(self.precision);
        self.values
            .binary_search_by(|probe| probe.total_cmp(&snapped))
            .ok()
    }

    /// Immediate successor then predecessor of `current` in the domain.
    ///
    /// Values at either end yield a single candidate. A value that is not
    /// part of the domain is a `DomainLookupMiss`.
    pub fn neighbors(&self, attribute: &str, current: ParamValue) -> Result<Vec<ParamValue>> {
        let idx = self
            .locate(current)
            .ok_or_else(|| ShapetuneError::DomainLookupMiss {
                attribute: attribute.to_string(),
                value: current.to_string(),
            })?;

        let mut candidates = Vec::with_capacity(2);
        if idx + 1 < self.values.len() {
            candidates.push(self.values[idx + 1]);
        }
        if idx > 0 {
            candidates.push(self.values[idx - 1]);
        }
        Ok(candidates)
    }
}

/// Attributes of one host object together with their domains
#[derive(Debug, Clone)]
pub struct OptimizationParameter {
    object: String,
    attributes: Vec<(String, Domain)>,
}

impl OptimizationParameter {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            attributes: Vec::new(),
        }
    }

    /// Register an attribute; re-adding a name replaces its domain
    pub fn add_attribute(&mut self, name: impl Into<String>, domain: Domain) -> &mut Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = domain,
            None => self.attributes.push((name, domain)),
        }
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, domain: Domain) -> Self {
        self.add_attribute(name, domain);
        self
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn attributes(&self) -> &[(String, Domain)] {
        &self.attributes
    }

    pub fn domain(&self, attribute: &str) -> Option<&Domain> {
        self.attributes
            .iter()
            .find(|(n, _)| n == attribute)
            .map(|(_, d)| d)
    }
}
