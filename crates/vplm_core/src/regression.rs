//! Fitted regression models and the regression tab state

use serde::{Deserialize, Serialize};

/// Display names of the four error metrics, in storage order
pub const METRIC_NAMES: [&str; 4] = ["max |e|", "ave. |e|", "ave. e", "sigma e"];

/// The four error metrics of one model on one data split
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub max_abs: f64,
    pub mean_abs: f64,
    pub mean: f64,
    pub sigma: f64,
}

impl ErrorMetrics {
    pub fn to_array(&self) -> [f64; 4] {
        [self.max_abs, self.mean_abs, self.mean, self.sigma]
    }

    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [max_abs, mean_abs, mean, sigma] => Some(Self {
                max_abs: *max_abs,
                mean_abs: *mean_abs,
                mean: *mean,
                sigma: *sigma,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub expression: String,
    pub coefficients: Vec<f64>,
    pub train_errors: ErrorMetrics,
    pub test_errors: ErrorMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPair {
    pub train: Vec<f64>,
    pub test: Vec<f64>,
}

/// Across-model curves of each metric (one point per term count)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorCurves {
    pub max_abs: SeriesPair,
    pub mean_abs: SeriesPair,
    pub mean: SeriesPair,
    pub sigma: SeriesPair,
}

impl ErrorCurves {
    /// Curves in `METRIC_NAMES` order
    pub fn pairs(&self) -> [&SeriesPair; 4] {
        [&self.max_abs, &self.mean_abs, &self.mean, &self.sigma]
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().iter().all(|p| p.train.is_empty() && p.test.is_empty())
    }
}

/// Models keyed by term count `1..=N`, plus the across-model curves.
///
/// `models[i]` holds the model with `i + 1` terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCollection {
    pub models: Vec<RegressionModel>,
    pub curves: ErrorCurves,
}

impl ModelCollection {
    pub fn model(&self, term_count: usize) -> Option<&RegressionModel> {
        term_count.checked_sub(1).and_then(|i| self.models.get(i))
    }

    pub fn term_counts(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.models.len()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionTabState {
    pub selected_output_pi: String,
    pub criterion: String,
    pub model_order: u32,
    pub regression_kind: String,
    pub chosen_term_count: u32,
}

impl Default for RegressionTabState {
    fn default() -> Self {
        Self {
            selected_output_pi: String::new(),
            criterion: "max(error)".to_string(),
            model_order: 1,
            regression_kind: "Power Law".to_string(),
            chosen_term_count: 0,
        }
    }
}
