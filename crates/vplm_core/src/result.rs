//! Imported experimental results and dependency analysis state

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ModelError, Result};

/// Synthetic index column present in every result row
pub const MEASURE_KEY: &str = "Measure";

const DEFAULT_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResult {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl Default for ImportedResult {
    /// Headers shown by the result table before anything is imported
    fn default() -> Self {
        Self { headers: vec![MEASURE_KEY.to_string(), "Parameters".to_string()], rows: Vec::new() }
    }
}

impl ImportedResult {
    /// Build a result from value rows aligned with `headers` (excluding `Measure`).
    /// Rows are numbered from 1 in the `Measure` column.
    pub fn from_rows(headers: Vec<String>, values: Vec<Vec<String>>) -> Self {
        let data_headers: Vec<&String> = headers.iter().filter(|h| *h != MEASURE_KEY).collect();
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let mut item = BTreeMap::new();
                item.insert(MEASURE_KEY.to_string(), (i + 1).to_string());
                for (header, value) in data_headers.iter().zip(row) {
                    item.insert((*header).clone(), value);
                }
                item
            })
            .collect();

        let mut all_headers = headers;
        if !all_headers.iter().any(|h| h == MEASURE_KEY) {
            all_headers.insert(0, MEASURE_KEY.to_string());
        }
        Self { headers: all_headers, rows }
    }

    /// Headers carrying measured values, in table order
    pub fn data_headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(String::as_str).filter(|h| *h != MEASURE_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Checkbox and slider state of the dependency analysis tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyState {
    /// One entry per pi number
    pub checks: Vec<bool>,
    /// R^2 threshold within [0, 1]
    pub threshold: f64,
}

impl Default for DependencyState {
    fn default() -> Self {
        Self { checks: Vec::new(), threshold: DEFAULT_THRESHOLD }
    }
}

impl DependencyState {
    pub fn new(checks: Vec<bool>, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ModelError::InvalidThreshold(threshold));
        }
        Ok(Self { checks, threshold })
    }
}
