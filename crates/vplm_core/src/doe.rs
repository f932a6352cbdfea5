//! Design of experiment inputs and generated sample arrays

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoeKind {
    #[default]
    FullFact,
    Latin,
}

impl DoeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoeKind::FullFact => "Full Fact",
            DoeKind::Latin => "Latin",
        }
    }
}

impl FromStr for DoeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full Fact" => Ok(DoeKind::FullFact),
            "Latin" => Ok(DoeKind::Latin),
            other => Err(format!("unknown DOE type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoeScale {
    #[default]
    Log,
    Linear,
}

impl DoeScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoeScale::Log => "Log",
            DoeScale::Linear => "Linear",
        }
    }
}

impl FromStr for DoeScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Log" => Ok(DoeScale::Log),
            "Linear" => Ok(DoeScale::Linear),
            other => Err(format!("unknown DOE scale '{}'", other)),
        }
    }
}

/// Widget states between constraint definition and DOE generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoeParams {
    pub kind: DoeKind,
    pub scale: DoeScale,
    pub anticipated_model_order: u32,
}

impl Default for DoeParams {
    fn default() -> Self {
        Self { kind: DoeKind::FullFact, scale: DoeScale::Log, anticipated_model_order: 1 }
    }
}

/// Raw constraint texts of the DOE tab, one constraint per line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoeConstraints {
    pub physical: String,
    pub pi: String,
}

impl DoeConstraints {
    pub fn physical_lines(&self) -> Vec<&str> {
        constraint_lines(&self.physical)
    }

    pub fn pi_lines(&self) -> Vec<&str> {
        constraint_lines(&self.pi)
    }
}

fn constraint_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Intermediate DOEs shown by the DOE tab plots.
///
/// By convention the caller stores either nothing or six arrays: elected,
/// all feasible, nearest to objective, active objective, all objective, and the
/// physical-space source. The format itself does not fix the count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoeBundle {
    pub arrays: Vec<DMatrix<f64>>,
}

impl DoeBundle {
    pub fn new(arrays: Vec<DMatrix<f64>>) -> Self {
        Self { arrays }
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DMatrix<f64>> {
        self.arrays.iter()
    }
}
