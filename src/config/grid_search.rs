use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::optimisation::parameter::{
    Domain, OptimizationParameter, ParamValue, DEFAULT_PRECISION,
};
use crate::error::{Result, ShapetuneError};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSearchConfig {
    pub max_steps: usize,
    pub precision: u32,
    pub warmup_steps: u32,
    pub target_ratio: f64,
    pub ratio_epsilon: f64,
    pub parameters: Vec<ParameterSpec>,
}

/// Domains for the attributes of one host object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub object: String,
    pub attributes: Vec<AttributeSpec>,
}

/// Either an explicit value list or a half-open range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<ParamValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSpec {
    pub start: ParamValue,
    pub stop: ParamValue,
    pub step: ParamValue,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            precision: DEFAULT_PRECISION,
            warmup_steps: 21,
            // Width over length of a 45 degree splash
            target_ratio: 45f64.to_radians().asin(),
            ratio_epsilon: 1e-5,
            parameters: Vec::new(),
        }
    }
}

impl AttributeSpec {
    pub fn to_domain(&self, precision: u32) -> Result<Domain> {
        let domain = match (&self.values, &self.range) {
            (Some(values), None) => Domain::new(values.clone(), precision),
            (None, Some(range)) => range.to_domain(precision),
            _ => {
                return Err(ShapetuneError::Configuration(format!(
                    "Attribute '{}' needs exactly one of `values` or `range`",
                    self.name
                )))
            }
        };
        domain.map_err(|e| {
            ShapetuneError::Configuration(format!("Attribute '{}': {}", self.name, e))
        })
    }
}

impl RangeSpec {
    pub fn to_domain(&self, precision: u32) -> Result<Domain> {
        match (self.start, self.stop, self.step) {
            (ParamValue::Int(start), ParamValue::Int(stop), ParamValue::Int(step)) => {
                Domain::int_range(start, stop, step)
            }
            (start, stop, step) => match (start.as_f64(), stop.as_f64(), step.as_f64()) {
                (Some(start), Some(stop), Some(step)) => {
                    Domain::float_range(start, stop, step, precision)
                }
                _ => Err(ShapetuneError::Input(
                    "Ranges need numeric bounds".to_string(),
                )),
            },
        }
    }
}

impl ParameterSpec {
    pub fn to_parameter(&self, precision: u32) -> Result<OptimizationParameter> {
        let mut parameter = OptimizationParameter::new(self.object.clone());
        for attribute in &self.attributes {
            parameter.add_attribute(attribute.name.clone(), attribute.to_domain(precision)?);
        }
        Ok(parameter)
    }
}

impl GridSearchConfig {
    pub fn build_parameters(&self) -> Result<Vec<OptimizationParameter>> {
        self.parameters
            .iter()
            .map(|spec| spec.to_parameter(self.precision))
            .collect()
    }
}

impl ConfigSection for GridSearchConfig {
    fn section_name() -> &'static str {
        "grid_search"
    }

    fn validate(&self) -> Result<()> {
        if self.precision > 12 {
            return Err(ShapetuneError::Configuration(
                "Precision above 12 decimal places is not representable".to_string(),
            ));
        }
        if !(self.ratio_epsilon > 0.0) {
            return Err(ShapetuneError::Configuration(
                "Ratio epsilon must be positive".to_string(),
            ));
        }
        for spec in &self.parameters {
            if spec.attributes.is_empty() {
                return Err(ShapetuneError::Configuration(format!(
                    "Parameter group '{}' has no attributes",
                    spec.object
                )));
            }
        }
        self.build_parameters().map(|_| ())
    }

    fn to_manifest(&self) -> ConfigManifest {
        let defaults = Self::default();
        ConfigManifest {
            section: "Grid Search".to_string(),
            fields: vec![
                FieldManifest::new(
                    "max_steps",
                    "integer",
                    json!(defaults.max_steps),
                    "Upper bound on coordinate descent rounds",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "precision",
                    "integer",
                    json!(defaults.precision),
                    "Decimal places float values are snapped to",
                )
                .bounded(Some(0.0), Some(12.0)),
                FieldManifest::new(
                    "warmup_steps",
                    "integer",
                    json!(defaults.warmup_steps),
                    "Simulation steps skipped before measuring",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "target_ratio",
                    "float",
                    json!(defaults.target_ratio),
                    "Derived ratio the simulation should reach",
                ),
                FieldManifest::new(
                    "ratio_epsilon",
                    "float",
                    json!(defaults.ratio_epsilon),
                    "Guard added to the squared ratio error",
                )
                .bounded(Some(0.0), None),
                FieldManifest::new(
                    "parameters",
                    "list",
                    json!([]),
                    "Objects and the attribute domains to search",
                ),
            ],
        }
    }
}
