//! Physical parameters and parameter sets
//!
//! A `ParameterSet` is the ordered collection produced by the dimensional
//! analysis engine. Insertion order is significant: it drives repetitiveness
//! priority and output placement, so the set is backed by a `Vec` rather than
//! a hash map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Bounds of a positive parameter: a range, or a single value for constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    Range { lower: f64, upper: f64 },
    Constant(f64),
}

impl Bounds {
    /// Build bounds from a 1 or 2 element list (the engine's constructor form)
    pub fn from_values(name: &str, values: &[f64]) -> Result<Self> {
        match values {
            [value] => Ok(Bounds::Constant(*value)),
            [lower, upper] => Ok(Bounds::Range { lower: *lower, upper: *upper }),
            _ => Err(ModelError::InvalidBounds { name: name.to_string(), count: values.len() }),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match *self {
            Bounds::Range { lower, upper } => vec![lower, upper],
            Bounds::Constant(value) => vec![value],
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Bounds::Constant(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub bounds: Bounds,
    pub units: String,
    pub description: String,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        bounds: Bounds,
        units: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        Ok(Self { name, bounds, units: units.into(), description: description.into() })
    }

    pub fn ranged(
        name: impl Into<String>,
        lower: f64,
        upper: f64,
        units: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        Self::new(name, Bounds::Range { lower, upper }, units, description)
    }

    pub fn constant(
        name: impl Into<String>,
        value: f64,
        units: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        Self::new(name, Bounds::Constant(value), units, description)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.bounds {
            Bounds::Range { lower, upper } => {
                write!(f, "{} in [{:?}, {:?}] {}", self.name, lower, upper, self.units)?
            }
            Bounds::Constant(value) => write!(f, "{} = {:?} {}", self.name, value, self.units)?,
        }
        if !self.description.is_empty() {
            write!(f, ", {}", self.description)?;
        }
        Ok(())
    }
}

/// Ordered mapping from unique parameter name to its definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set keeping the iteration order of `params`
    pub fn from_parameters(params: impl IntoIterator<Item = Parameter>) -> Result<Self> {
        let mut set = Self::new();
        for param in params {
            set.insert(param)?;
        }
        Ok(set)
    }

    /// Build the physical parameter set from the parameter table rows.
    /// Rows without a lower bound become constants valued at their upper bound.
    pub fn from_records(records: &[ParameterRecord]) -> Result<Self> {
        Self::from_parameters(
            records
                .iter()
                .map(|record| {
                    let bounds = match record.lower_bound {
                        Some(lower) => Bounds::Range { lower, upper: record.upper_bound },
                        None => Bounds::Constant(record.upper_bound),
                    };
                    Parameter::new(
                        record.name.clone(),
                        bounds,
                        record.unit.clone(),
                        record.description.clone(),
                    )
                })
                .collect::<Result<Vec<_>>>()?,
        )
    }

    pub fn insert(&mut self, param: Parameter) -> Result<()> {
        if self.contains(&param.name) {
            return Err(ModelError::DuplicateParameter(param.name));
        }
        self.params.push(param);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for param in &self.params {
            writeln!(f, "{}", param)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Input,
    Output,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Input => "Input",
            Role::Output => "Output",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Input" => Ok(Role::Input),
            "Output" => Ok(Role::Output),
            other => Err(format!("unknown parameter role '{}'", other)),
        }
    }
}

/// One row of the physical parameter table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    pub description: String,
    pub unit: String,
    /// Absent for constant parameters
    pub lower_bound: Option<f64>,
    pub upper_bound: f64,
    pub role: Role,
}

impl ParameterRecord {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        lower_bound: Option<f64>,
        upper_bound: f64,
        role: Role,
    ) -> Result<Self> {
        let record = Self {
            name: name.into(),
            description: description.into(),
            unit: unit.into(),
            lower_bound,
            upper_bound,
            role,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        if !self.upper_bound.is_finite() || self.upper_bound <= 0.0 {
            return Err(ModelError::InvalidUpperBound {
                name: self.name.clone(),
                value: self.upper_bound,
            });
        }
        Ok(())
    }

    pub fn is_constant(&self) -> bool {
        self.lower_bound.is_none()
    }
}
